// Localized display strings
//
// Two catalogs ship with the client: Vietnamese (the storefront's home
// locale, and the default) and English. Shared strings live in `Labels`;
// one-off strings such as column headers use `Locale::pick`.

use serde::Deserialize;

/// Display locale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    Vi,
    En,
}

impl Locale {
    /// Parse a locale code from config/env. Unknown codes fall back to `vi`.
    pub fn from_code(code: &str) -> Self {
        match code.trim().to_lowercase().as_str() {
            "en" | "en-us" | "en-gb" => Locale::En,
            _ => Locale::Vi,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Locale::Vi => "vi",
            Locale::En => "en",
        }
    }

    /// Choose between a Vietnamese and an English string
    pub fn pick(&self, vi: &'static str, en: &'static str) -> &'static str {
        match self {
            Locale::Vi => vi,
            Locale::En => en,
        }
    }

    /// Thousands and decimal separators for number grouping
    pub fn separators(&self) -> (char, char) {
        match self {
            Locale::Vi => ('.', ','),
            Locale::En => (',', '.'),
        }
    }

    pub fn labels(&self) -> &'static Labels {
        match self {
            Locale::Vi => &VI,
            Locale::En => &EN,
        }
    }
}

/// Shared UI strings for one locale
#[derive(Debug)]
pub struct Labels {
    pub yes: &'static str,
    pub no: &'static str,
    pub no_data: &'static str,
    pub no_expiry: &'static str,
    pub available: &'static str,
    pub unavailable: &'static str,
    pub active: &'static str,
    pub inactive: &'static str,
    pub role_admin: &'static str,
    pub role_manager: &'static str,
    pub role_staff: &'static str,
    pub role_customer: &'static str,
    pub rows_per_page: &'static str,
    pub of: &'static str,
    pub page: &'static str,
    pub search: &'static str,
    pub status_all: &'static str,
    pub loading: &'static str,

    // Notices
    pub network_error: &'static str,
    pub load_failed: &'static str,
    pub unauthorized: &'static str,
    pub saved: &'static str,
    pub save_failed: &'static str,
    pub deleted: &'static str,
    pub delete_failed: &'static str,
    pub cart_sync_failed: &'static str,
    pub cart_remove_failed: &'static str,
    pub cart_removed: &'static str,
    pub copied: &'static str,
    pub copy_failed: &'static str,
    pub form_invalid: &'static str,

    // Validation
    pub field_required: &'static str,
    pub field_numeric: &'static str,
    pub field_min: &'static str,
    pub field_email: &'static str,
    pub field_too_long: &'static str,
}

static VI: Labels = Labels {
    yes: "Có",
    no: "Không",
    no_data: "Không có dữ liệu",
    no_expiry: "Không thời hạn",
    available: "Còn hàng",
    unavailable: "Ngừng kinh doanh",
    active: "Hoạt động",
    inactive: "Ngừng hoạt động",
    role_admin: "Quản trị viên",
    role_manager: "Quản lý",
    role_staff: "Nhân viên",
    role_customer: "Khách hàng",
    rows_per_page: "Số dòng mỗi trang",
    of: "trên",
    page: "Trang",
    search: "Tìm kiếm",
    status_all: "Tất cả",
    loading: "Đang tải...",

    network_error: "Không thể kết nối tới máy chủ",
    load_failed: "Tải dữ liệu thất bại",
    unauthorized: "Phiên đăng nhập đã hết hạn",
    saved: "Đã lưu thành công",
    save_failed: "Lưu thất bại",
    deleted: "Đã xóa thành công",
    delete_failed: "Xóa thất bại",
    cart_sync_failed: "Cập nhật số lượng thất bại",
    cart_remove_failed: "Xóa sản phẩm khỏi giỏ hàng thất bại",
    cart_removed: "Đã xóa sản phẩm khỏi giỏ hàng",
    copied: "Đã sao chép",
    copy_failed: "Sao chép thất bại",
    form_invalid: "Vui lòng kiểm tra lại thông tin",

    field_required: "Trường này là bắt buộc",
    field_numeric: "Giá trị phải là số",
    field_min: "Giá trị quá nhỏ",
    field_email: "Email không hợp lệ",
    field_too_long: "Giá trị quá dài",
};

static EN: Labels = Labels {
    yes: "Yes",
    no: "No",
    no_data: "No data",
    no_expiry: "No expiry",
    available: "Available",
    unavailable: "Unavailable",
    active: "Active",
    inactive: "Inactive",
    role_admin: "Administrator",
    role_manager: "Manager",
    role_staff: "Staff",
    role_customer: "Customer",
    rows_per_page: "Rows per page",
    of: "of",
    page: "Page",
    search: "Search",
    status_all: "All",
    loading: "Loading...",

    network_error: "Could not reach the server",
    load_failed: "Failed to load data",
    unauthorized: "Your session has expired",
    saved: "Saved",
    save_failed: "Save failed",
    deleted: "Deleted",
    delete_failed: "Delete failed",
    cart_sync_failed: "Failed to update quantity",
    cart_remove_failed: "Failed to remove item from cart",
    cart_removed: "Item removed from cart",
    copied: "Copied to clipboard",
    copy_failed: "Failed to copy",
    form_invalid: "Please check the highlighted fields",

    field_required: "This field is required",
    field_numeric: "Must be a number",
    field_min: "Value is too small",
    field_email: "Invalid email address",
    field_too_long: "Value is too long",
};
