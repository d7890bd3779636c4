// Wire models for the storefront API
//
// Field names follow the server's camelCase JSON. Optional fields default so
// a partially populated entity still decodes; the table renders the gaps
// blank.

use crate::table::TableRow;
use serde::{Deserialize, Serialize};

/// One page of a list endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
    #[serde(default)]
    pub total_items_count: usize,
}

impl<T> Page<T> {
    pub fn empty() -> Self {
        Self {
            items: Vec::new(),
            total_items_count: 0,
        }
    }
}

/// `{ "message": "..." }` bodies returned by mutations and errors
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MessageResponse {
    pub message: String,
}

/// Outcome of a mutation: the server answers with the entity, a message, or nothing
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Mutation<T> {
    Message(MessageResponse),
    Entity(T),
    Empty,
}

impl<T> Mutation<T> {
    pub fn message(&self) -> Option<&str> {
        match self {
            Mutation::Message(m) => Some(&m.message),
            _ => None,
        }
    }
}

/// Embedded `{ id, name }` reference to another entity
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EntityRef {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub sku: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: Option<EntityRef>,
    #[serde(default)]
    pub selling_price: Option<f64>,
    #[serde(default)]
    pub quantity: Option<i64>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub is_deleted: bool,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub product_count: Option<i64>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub product_name: String,
    pub quantity: i64,
    pub price: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: String,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub customer: Option<EntityRef>,
    #[serde(default)]
    pub total_price: Option<f64>,
    #[serde(default)]
    pub items: Vec<OrderLine>,
    #[serde(default)]
    pub is_paid: bool,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsArticle {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub images: Vec<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub published_at: Option<String>,
}

/// A received lot of a product, with its expiry
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Batch {
    pub id: String,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub product: Option<EntityRef>,
    #[serde(default)]
    pub quantity: Option<i64>,
    #[serde(default)]
    pub import_price: Option<f64>,
    #[serde(default)]
    pub manufactured_date: Option<String>,
    #[serde(default)]
    pub expiry_date: Option<String>,
    #[serde(default)]
    pub is_deleted: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub id: String,
    #[serde(default)]
    pub receiver_name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub street: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub is_default: bool,
}

/// A line in the signed-in customer's cart
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartItem {
    pub id: String,
    pub product_id: String,
    #[serde(default)]
    pub product_name: String,
    pub quantity: u32,
    pub remaining_quantity: u32,
    #[serde(default)]
    pub selling_price: f64,
    #[serde(default)]
    pub images: Vec<String>,
}

macro_rules! impl_table_row {
    ($($ty:ty),* $(,)?) => {
        $(
            impl TableRow for $ty {
                fn row_id(&self) -> String {
                    self.id.clone()
                }
            }
        )*
    };
}

impl_table_row!(Product, Category, Order, NewsArticle, Batch, Address, CartItem);

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn page_decodes_camel_case_total() {
        let page: Page<Category> = serde_json::from_value(json!({
            "items": [{"id": "c1", "name": "Đồ uống"}],
            "totalItemsCount": 41
        }))
        .unwrap();
        assert_eq!(page.total_items_count, 41);
        assert_eq!(page.items[0].name, "Đồ uống");
    }

    #[test]
    fn page_tolerates_missing_fields() {
        let page: Page<Category> = serde_json::from_value(json!({})).unwrap();
        assert_eq!(page, Page::empty());
    }

    #[test]
    fn mutation_distinguishes_message_from_entity() {
        let msg: Mutation<Category> =
            serde_json::from_value(json!({"message": "Deleted"})).unwrap();
        assert_eq!(msg.message(), Some("Deleted"));

        let entity: Mutation<Category> =
            serde_json::from_value(json!({"id": "c1", "name": "Snacks"})).unwrap();
        assert!(matches!(entity, Mutation::Entity(ref c) if c.id == "c1"));

        let empty: Mutation<Category> = serde_json::from_value(json!(null)).unwrap();
        assert_eq!(empty, Mutation::Empty);
    }

    #[test]
    fn rows_serialize_for_dotted_paths() {
        let product = Product {
            id: "p1".into(),
            name: "Trà xanh".into(),
            category: Some(EntityRef {
                id: "c1".into(),
                name: "Đồ uống".into(),
            }),
            ..Default::default()
        };
        let value = serde_json::to_value(&product).unwrap();
        assert_eq!(
            crate::table::resolve_path(&value, "category.name"),
            Some(&json!("Đồ uống"))
        );
        assert_eq!(product.row_id(), "p1");
    }
}
