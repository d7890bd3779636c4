// Resource catalog
//
// Each entity the client can browse is described once here: its endpoint,
// its table columns and (for editable entities) its form fields. List screens,
// the headless `list` command and export all read from this catalog.

use super::models::{Address, Batch, Category, NewsArticle, Order, Product};
use crate::form::{FieldSpec, Rule};
use crate::i18n::Locale;
use crate::table::{Align, CellText, Column, Format, ResponsiveConfig, TableRow, Tone};
use clap::ValueEnum;
use serde::de::DeserializeOwned;

/// Browsable resources, as named on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum)]
pub enum ResourceKind {
    Products,
    Categories,
    Orders,
    News,
    Batches,
    Addresses,
}

impl ResourceKind {
    pub const ALL: [ResourceKind; 6] = [
        ResourceKind::Products,
        ResourceKind::Categories,
        ResourceKind::Orders,
        ResourceKind::News,
        ResourceKind::Batches,
        ResourceKind::Addresses,
    ];

    pub fn path(&self) -> &'static str {
        match self {
            ResourceKind::Products => Products::PATH,
            ResourceKind::Categories => Categories::PATH,
            ResourceKind::Orders => Orders::PATH,
            ResourceKind::News => News::PATH,
            ResourceKind::Batches => Batches::PATH,
            ResourceKind::Addresses => Addresses::PATH,
        }
    }

    /// Spreadsheet export endpoint
    pub fn export_path(&self) -> String {
        format!("{}/export", self.path())
    }

    pub fn title(&self, locale: Locale) -> &'static str {
        match self {
            ResourceKind::Products => Products::title(locale),
            ResourceKind::Categories => Categories::title(locale),
            ResourceKind::Orders => Orders::title(locale),
            ResourceKind::News => News::title(locale),
            ResourceKind::Batches => Batches::title(locale),
            ResourceKind::Addresses => Addresses::title(locale),
        }
    }
}

/// Static description of one browsable entity
pub trait Resource: Send + Sync + 'static {
    type Row: TableRow + DeserializeOwned + Clone + Send + Sync + 'static;

    const KIND: ResourceKind;
    const PATH: &'static str;

    fn title(locale: Locale) -> &'static str;

    fn columns(locale: Locale) -> Vec<Column<Self::Row>>;

    /// Per-entity responsive rules; `None` keeps the table defaults
    fn responsive() -> Option<ResponsiveConfig> {
        None
    }

    /// Fields of the create/edit form. Empty means read-only.
    fn form_fields(_locale: Locale) -> Vec<FieldSpec> {
        Vec::new()
    }

    fn item_path(id: &str) -> String {
        format!("{}/{}", Self::PATH, id)
    }
}

pub struct Products;
pub struct Categories;
pub struct Orders;
pub struct News;
pub struct Batches;
pub struct Addresses;

impl Resource for Products {
    type Row = Product;
    const KIND: ResourceKind = ResourceKind::Products;
    const PATH: &'static str = "/products";

    fn title(locale: Locale) -> &'static str {
        locale.pick("Sản phẩm", "Products")
    }

    fn columns(locale: Locale) -> Vec<Column<Product>> {
        vec![
            Column::new("name", locale.pick("Tên", "Name")).max_width(28),
            Column::new("category.name", locale.pick("Danh mục", "Category")).max_width(16),
            Column::new("sellingPrice", locale.pick("Giá bán", "Price"))
                .format(Format::Price)
                .align(Align::Right),
            Column::new("quantity", locale.pick("Tồn kho", "Stock"))
                .format(Format::Number)
                .align(Align::Right),
            Column::new("images", locale.pick("Ảnh", "Image")).format(Format::Images),
            Column::new("tags", locale.pick("Nhãn", "Tags")).format(Format::Array),
            Column::new("createdAt", locale.pick("Ngày tạo", "Created")).format(Format::Date),
            Column::new("isDeleted", locale.pick("Bán", "Sale")).format(Format::Deleted),
            Column::new("status", locale.pick("Trạng thái", "Status")).format(Format::Status),
        ]
    }

    fn form_fields(locale: Locale) -> Vec<FieldSpec> {
        vec![
            FieldSpec::text("name", locale.pick("Tên", "Name"))
                .rule(Rule::Required)
                .rule(Rule::MaxLen(120)),
            FieldSpec::text("sku", "SKU").rule(Rule::MaxLen(32)),
            FieldSpec::text("categoryId", locale.pick("Mã danh mục", "Category id"))
                .rule(Rule::Required)
                .prefill_from("category.id"),
            FieldSpec::number("sellingPrice", locale.pick("Giá bán", "Price"))
                .rule(Rule::Required)
                .rule(Rule::Numeric)
                .rule(Rule::Min(0.0)),
            FieldSpec::number("quantity", locale.pick("Tồn kho", "Stock"))
                .rule(Rule::Numeric)
                .rule(Rule::Min(0.0)),
            FieldSpec::text("description", locale.pick("Mô tả", "Description"))
                .rule(Rule::MaxLen(500)),
        ]
    }
}

impl Resource for Categories {
    type Row = Category;
    const KIND: ResourceKind = ResourceKind::Categories;
    const PATH: &'static str = "/categories";

    fn title(locale: Locale) -> &'static str {
        locale.pick("Danh mục", "Categories")
    }

    fn columns(locale: Locale) -> Vec<Column<Category>> {
        vec![
            Column::new("name", locale.pick("Tên", "Name")).max_width(24),
            Column::new("description", locale.pick("Mô tả", "Description")).max_width(40),
            Column::new("productCount", locale.pick("Số sản phẩm", "Products"))
                .format(Format::Number)
                .align(Align::Right),
            Column::new("status", locale.pick("Trạng thái", "Status")).format(Format::Status),
            Column::new("createdAt", locale.pick("Ngày tạo", "Created")).format(Format::DateTime),
        ]
    }

    fn form_fields(locale: Locale) -> Vec<FieldSpec> {
        vec![
            FieldSpec::text("name", locale.pick("Tên", "Name"))
                .rule(Rule::Required)
                .rule(Rule::MaxLen(80)),
            FieldSpec::text("description", locale.pick("Mô tả", "Description"))
                .rule(Rule::MaxLen(500)),
        ]
    }
}

impl Resource for Orders {
    type Row = Order;
    const KIND: ResourceKind = ResourceKind::Orders;
    const PATH: &'static str = "/orders";

    fn title(locale: Locale) -> &'static str {
        locale.pick("Đơn hàng", "Orders")
    }

    fn columns(locale: Locale) -> Vec<Column<Order>> {
        let units = locale.pick("sp", "pcs");
        vec![
            Column::new("code", locale.pick("Mã đơn", "Code")).min_width(8),
            Column::new("customer.name", locale.pick("Khách hàng", "Customer")).max_width(24),
            Column::new("totalPrice", locale.pick("Tổng tiền", "Total"))
                .format(Format::Price)
                .align(Align::Right),
            Column::new("items", locale.pick("Số lượng", "Items"))
                .align(Align::Right)
                .render(move |_, order: &Order| {
                    let count: i64 = order.items.iter().map(|l| l.quantity).sum();
                    if order.items.is_empty() {
                        CellText::toned("-", Tone::Muted)
                    } else {
                        CellText::plain(format!("{} {}", count, units))
                    }
                }),
            Column::new("isPaid", locale.pick("Đã thanh toán", "Paid")).format(Format::Boolean),
            Column::new("status", locale.pick("Trạng thái", "Status")).format(Format::Status),
            Column::new("createdAt", locale.pick("Ngày đặt", "Placed")).format(Format::DateTime),
        ]
    }
}

impl Resource for News {
    type Row = NewsArticle;
    const KIND: ResourceKind = ResourceKind::News;
    const PATH: &'static str = "/news";

    fn title(locale: Locale) -> &'static str {
        locale.pick("Tin tức", "News")
    }

    fn columns(locale: Locale) -> Vec<Column<NewsArticle>> {
        vec![
            Column::new("title", locale.pick("Tiêu đề", "Title")).max_width(40),
            Column::new("author", locale.pick("Tác giả", "Author")).max_width(18),
            Column::new("images", locale.pick("Ảnh bìa", "Cover")).format(Format::Images),
            Column::new("tags", locale.pick("Nhãn", "Tags")).format(Format::Array),
            Column::new("publishedAt", locale.pick("Ngày đăng", "Published"))
                .format(Format::DateTime),
            Column::new("status", locale.pick("Trạng thái", "Status")).format(Format::Status),
        ]
    }
}

impl Resource for Batches {
    type Row = Batch;
    const KIND: ResourceKind = ResourceKind::Batches;
    const PATH: &'static str = "/batches";

    fn title(locale: Locale) -> &'static str {
        locale.pick("Lô hàng", "Batches")
    }

    fn columns(locale: Locale) -> Vec<Column<Batch>> {
        vec![
            Column::new("code", locale.pick("Mã lô", "Code")).min_width(8),
            Column::new("product.name", locale.pick("Sản phẩm", "Product")).max_width(24),
            Column::new("quantity", locale.pick("Số lượng", "Quantity"))
                .format(Format::Number)
                .align(Align::Right),
            Column::new("importPrice", locale.pick("Giá nhập", "Cost"))
                .format(Format::Price)
                .align(Align::Right),
            Column::new("manufacturedDate", locale.pick("NSX", "Made")).format(Format::Date),
            Column::new("expiryDate", locale.pick("HSD", "Expires")).format(Format::DateTime),
            Column::new("isDeleted", locale.pick("Bán", "Sale")).format(Format::Deleted),
        ]
    }

    /// Expiry matters on every screen size, so keep it visible on tablets
    fn responsive() -> Option<ResponsiveConfig> {
        Some(ResponsiveConfig {
            tablet_hidden_formats: vec![Format::Boolean],
            ..ResponsiveConfig::default()
        })
    }
}

impl Resource for Addresses {
    type Row = Address;
    const KIND: ResourceKind = ResourceKind::Addresses;
    const PATH: &'static str = "/addresses";

    fn title(locale: Locale) -> &'static str {
        locale.pick("Địa chỉ", "Addresses")
    }

    fn columns(locale: Locale) -> Vec<Column<Address>> {
        vec![
            Column::new("receiverName", locale.pick("Người nhận", "Receiver")).max_width(22),
            Column::new("phone", locale.pick("Điện thoại", "Phone")),
            Column::new("street", locale.pick("Địa chỉ", "Street")).max_width(32),
            Column::new("city", locale.pick("Tỉnh/TP", "City")),
            Column::new("role", locale.pick("Vai trò", "Role")).format(Format::Role),
            Column::new("isDefault", locale.pick("Mặc định", "Default")).format(Format::Boolean),
        ]
    }

    fn responsive() -> Option<ResponsiveConfig> {
        Some(ResponsiveConfig {
            mobile_hidden_ids: vec!["street".into(), "phone".into()],
            tablet_hidden_ids: vec!["street".into()],
            ..ResponsiveConfig::default()
        })
    }
}
