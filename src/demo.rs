// Demo mode: in-process mock of the storefront API
//
// Serves seeded products, categories, orders, news, batches, addresses and a
// cart over the same wire conventions as the real API: pageIndex/pageSize/
// SearchTerm/Status list parameters, `{ items, totalItemsCount }` pages,
// `{ message }` bodies for mutations and errors, and a bearer-protected cart.
//
// Run with: STOREDESK_DEMO=1 cargo run --release
//
// The API client tests also run against this server on an ephemeral port.

use crate::api::SPREADSHEET_MIME;
use anyhow::{Context, Result};
use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::{Duration as ChronoDuration, Utc};
use serde::Deserialize;
use serde_json::{json, Map, Value};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::oneshot;

/// Resources served by the demo, in route order
const RESOURCES: [&str; 7] = [
    "products",
    "categories",
    "orders",
    "news",
    "batches",
    "addresses",
    "carts",
];

/// Resources that accept POST/PUT from the form screens
const WRITABLE: [&str; 2] = ["products", "categories"];

// ─────────────────────────────────────────────────────────────────────────────
// State
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Clone)]
struct DemoState {
    store: Arc<Mutex<DemoStore>>,
    /// Added to every response so skeleton rows are visible
    latency: Duration,
}

struct DemoStore {
    collections: HashMap<&'static str, Vec<Value>>,
    next_id: u64,
}

impl DemoStore {
    fn seeded() -> Self {
        let mut collections = HashMap::new();
        collections.insert("categories", seed_categories());
        collections.insert("products", seed_products());
        collections.insert("orders", seed_orders());
        collections.insert("news", seed_news());
        collections.insert("batches", seed_batches());
        collections.insert("addresses", seed_addresses());
        collections.insert("carts", seed_cart());
        Self {
            collections,
            next_id: 100,
        }
    }

    fn collection(&mut self, resource: &str) -> Result<&mut Vec<Value>, DemoError> {
        self.collections
            .get_mut(resource)
            .ok_or_else(|| DemoError::not_found(resource))
    }
}

impl DemoState {
    async fn with_store<T>(
        &self,
        f: impl FnOnce(&mut DemoStore) -> Result<T, DemoError>,
    ) -> Result<T, DemoError> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        let mut store = self.store.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut store)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Errors
// ─────────────────────────────────────────────────────────────────────────────

struct DemoError {
    status: StatusCode,
    message: String,
}

impl DemoError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    fn not_found(what: &str) -> Self {
        Self::new(StatusCode::NOT_FOUND, format!("{} not found", what))
    }

    fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }
}

impl IntoResponse for DemoError {
    fn into_response(self) -> Response {
        tracing::debug!("Demo API error: {} - {}", self.status, self.message);
        (self.status, Json(json!({ "message": self.message }))).into_response()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Server
// ─────────────────────────────────────────────────────────────────────────────

/// Start the demo API without artificial latency
///
/// Returns the bound address (useful with port 0).
pub async fn start_demo_server(
    bind_addr: SocketAddr,
    shutdown_rx: oneshot::Receiver<()>,
) -> Result<SocketAddr> {
    start_demo_server_with_latency(bind_addr, Duration::ZERO, shutdown_rx).await
}

pub async fn start_demo_server_with_latency(
    bind_addr: SocketAddr,
    latency: Duration,
    shutdown_rx: oneshot::Receiver<()>,
) -> Result<SocketAddr> {
    let state = DemoState {
        store: Arc::new(Mutex::new(DemoStore::seeded())),
        latency,
    };

    let app = Router::new()
        .route("/:resource", get(list_items).post(create_item))
        .route(
            "/:resource/:id",
            get(get_item)
                .put(update_item)
                .patch(patch_item)
                .delete(delete_item),
        )
        .with_state(state);

    let listener = TcpListener::bind(bind_addr)
        .await
        .with_context(|| format!("Failed to bind demo API to {}", bind_addr))?;
    let local_addr = listener
        .local_addr()
        .context("Failed to read demo API address")?;

    tracing::info!("Demo API listening on {}", local_addr);

    tokio::spawn(async move {
        let result = axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                shutdown_rx.await.ok();
            })
            .await;
        match result {
            Ok(()) => tracing::info!("Demo API shut down gracefully"),
            Err(e) => tracing::error!("Demo API error: {}", e),
        }
    });

    Ok(local_addr)
}

fn require_known(resource: &str) -> Result<(), DemoError> {
    if RESOURCES.contains(&resource) {
        Ok(())
    } else {
        Err(DemoError::not_found(resource))
    }
}

/// The cart belongs to a signed-in customer
fn require_auth(resource: &str, headers: &HeaderMap) -> Result<(), DemoError> {
    if resource != "carts" {
        return Ok(());
    }
    let authorized = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .is_some_and(|token| !token.trim().is_empty());
    if authorized {
        Ok(())
    } else {
        Err(DemoError::new(StatusCode::UNAUTHORIZED, "Unauthorized"))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct ListParams {
    #[serde(rename = "pageIndex", default)]
    page_index: usize,
    #[serde(rename = "pageSize", default = "default_page_size")]
    page_size: usize,
    #[serde(rename = "SearchTerm")]
    search_term: Option<String>,
    #[serde(rename = "Status")]
    status: Option<String>,
}

fn default_page_size() -> usize {
    10
}

/// Fields the search term is matched against
const SEARCH_FIELDS: [&str; 5] = ["name", "title", "code", "receiverName", "productName"];

fn matches(item: &Value, params: &ListParams) -> bool {
    let search_ok = match params.search_term.as_deref().map(str::trim) {
        Some(term) if !term.is_empty() => {
            let term = term.to_lowercase();
            SEARCH_FIELDS.iter().any(|f| {
                item.get(f)
                    .and_then(Value::as_str)
                    .is_some_and(|s| s.to_lowercase().contains(&term))
            })
        }
        _ => true,
    };
    let status_ok = match params.status.as_deref() {
        Some(status) if !status.is_empty() => {
            item.get("status").and_then(Value::as_str) == Some(status)
        }
        _ => true,
    };
    search_ok && status_ok
}

fn filtered<'a>(items: &'a [Value], params: &'a ListParams) -> impl Iterator<Item = &'a Value> {
    items.iter().filter(move |item| matches(item, params))
}

async fn list_items(
    State(state): State<DemoState>,
    Path(resource): Path<String>,
    Query(params): Query<ListParams>,
    headers: HeaderMap,
) -> Result<Json<Value>, DemoError> {
    require_known(&resource)?;
    require_auth(&resource, &headers)?;

    state
        .with_store(|store| {
            let items = store.collection(&resource)?;
            let size = params.page_size.max(1);
            let total = filtered(items, &params).count();
            let page: Vec<Value> = filtered(items, &params)
                .skip(params.page_index * size)
                .take(size)
                .cloned()
                .collect();
            Ok(Json(json!({ "items": page, "totalItemsCount": total })))
        })
        .await
}

async fn get_item(
    State(state): State<DemoState>,
    Path((resource, id)): Path<(String, String)>,
    Query(params): Query<ListParams>,
    headers: HeaderMap,
) -> Result<Response, DemoError> {
    require_known(&resource)?;
    require_auth(&resource, &headers)?;

    if id == "export" {
        return export(&state, &resource, &params).await;
    }

    state
        .with_store(|store| {
            store
                .collection(&resource)?
                .iter()
                .find(|item| item["id"] == id.as_str())
                .cloned()
                .map(|item| Json(item).into_response())
                .ok_or_else(|| DemoError::not_found(&id))
        })
        .await
}

/// Spreadsheet export stub: CSV content under the spreadsheet MIME type
async fn export(
    state: &DemoState,
    resource: &str,
    params: &ListParams,
) -> Result<Response, DemoError> {
    let csv = state
        .with_store(|store| {
            let items = store.collection(resource)?;
            Ok(to_csv(filtered(items, params)))
        })
        .await?;

    let filename = format!("attachment; filename=\"{}.xlsx\"", resource);
    Ok((
        [
            (header::CONTENT_TYPE, SPREADSHEET_MIME.to_string()),
            (header::CONTENT_DISPOSITION, filename),
        ],
        csv.into_bytes(),
    )
        .into_response())
}

fn to_csv<'a>(items: impl Iterator<Item = &'a Value>) -> String {
    let mut out = String::new();
    let mut columns: Vec<String> = Vec::new();
    for item in items {
        let Some(obj) = item.as_object() else {
            continue;
        };
        if columns.is_empty() {
            columns = obj
                .iter()
                .filter(|(_, v)| !v.is_object() && !v.is_array())
                .map(|(k, _)| k.clone())
                .collect();
            out.push_str(&columns.join(","));
            out.push('\n');
        }
        let row: Vec<String> = columns
            .iter()
            .map(|c| match obj.get(c) {
                Some(Value::String(s)) => format!("\"{}\"", s.replace('"', "\"\"")),
                Some(Value::Null) | None => String::new(),
                Some(other) => other.to_string(),
            })
            .collect();
        out.push_str(&row.join(","));
        out.push('\n');
    }
    out
}

async fn create_item(
    State(state): State<DemoState>,
    Path(resource): Path<String>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, DemoError> {
    if !WRITABLE.contains(&resource.as_str()) {
        return Err(DemoError::new(
            StatusCode::METHOD_NOT_ALLOWED,
            format!("{} is read-only", resource),
        ));
    }
    let fields = validate_entity(body)?;

    state
        .with_store(|store| {
            store.next_id += 1;
            let id = format!("{}-{}", &resource[..1], store.next_id);

            let mut entity = fields;
            entity.insert("id".into(), json!(id));
            entity.insert("status".into(), json!("Active"));
            entity.insert("createdAt".into(), json!(Utc::now().to_rfc3339()));
            link_category(store, &mut entity);

            let entity = Value::Object(entity);
            store.collection(&resource)?.insert(0, entity.clone());
            tracing::info!(%resource, %id, "Demo entity created");
            Ok(Json(entity))
        })
        .await
}

async fn update_item(
    State(state): State<DemoState>,
    Path((resource, id)): Path<(String, String)>,
    Json(body): Json<Value>,
) -> Result<Json<Value>, DemoError> {
    if !WRITABLE.contains(&resource.as_str()) {
        return Err(DemoError::new(
            StatusCode::METHOD_NOT_ALLOWED,
            format!("{} is read-only", resource),
        ));
    }
    let mut fields = validate_entity(body)?;

    state
        .with_store(|store| {
            link_category(store, &mut fields);
            let item = store
                .collection(&resource)?
                .iter_mut()
                .find(|item| item["id"] == id.as_str())
                .ok_or_else(|| DemoError::not_found(&id))?;
            if let Some(obj) = item.as_object_mut() {
                for (k, v) in fields {
                    obj.insert(k, v);
                }
            }
            Ok(Json(item.clone()))
        })
        .await
}

/// Only cart lines are patched: `{ "quantity": n }` within stock
async fn patch_item(
    State(state): State<DemoState>,
    Path((resource, id)): Path<(String, String)>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Result<Json<Value>, DemoError> {
    if resource != "carts" {
        return Err(DemoError::new(
            StatusCode::METHOD_NOT_ALLOWED,
            "Only cart lines can be patched",
        ));
    }
    require_auth(&resource, &headers)?;

    let quantity = body
        .get("quantity")
        .and_then(Value::as_u64)
        .ok_or_else(|| DemoError::bad_request("quantity is required"))?;

    state
        .with_store(|store| {
            let line = store
                .collection("carts")?
                .iter_mut()
                .find(|item| item["id"] == id.as_str())
                .ok_or_else(|| DemoError::not_found(&id))?;
            let remaining = line["remainingQuantity"].as_u64().unwrap_or(0);
            if quantity < 1 {
                return Err(DemoError::bad_request("Quantity must be at least 1"));
            }
            if quantity > remaining {
                return Err(DemoError::bad_request("Quantity exceeds stock"));
            }
            line["quantity"] = json!(quantity);
            Ok(Json(line.clone()))
        })
        .await
}

async fn delete_item(
    State(state): State<DemoState>,
    Path((resource, id)): Path<(String, String)>,
    headers: HeaderMap,
) -> Result<Json<Value>, DemoError> {
    require_known(&resource)?;
    require_auth(&resource, &headers)?;

    state
        .with_store(|store| {
            let items = store.collection(&resource)?;
            let before = items.len();
            items.retain(|item| item["id"] != id.as_str());
            if items.len() == before {
                return Err(DemoError::not_found(&id));
            }
            tracing::info!(%resource, %id, "Demo entity deleted");
            Ok(Json(json!({ "message": "Deleted successfully" })))
        })
        .await
}

/// Forms send flat fields; names must be present
fn validate_entity(body: Value) -> Result<Map<String, Value>, DemoError> {
    let Value::Object(fields) = body else {
        return Err(DemoError::bad_request("Expected a JSON object"));
    };
    let name_ok = fields
        .get("name")
        .and_then(Value::as_str)
        .is_some_and(|s| !s.trim().is_empty());
    if !name_ok {
        return Err(DemoError::bad_request("Name is required"));
    }
    Ok(fields
        .into_iter()
        .filter(|(k, _)| k != "id")
        .collect())
}

/// Expand a form's `categoryId` into the embedded `category` reference
fn link_category(store: &mut DemoStore, entity: &mut Map<String, Value>) {
    let Some(category_id) = entity.get("categoryId").and_then(Value::as_str) else {
        return;
    };
    let category = store
        .collections
        .get("categories")
        .and_then(|cats| cats.iter().find(|c| c["id"] == category_id))
        .map(|c| json!({ "id": c["id"], "name": c["name"] }))
        .unwrap_or_else(|| json!({ "id": category_id, "name": "" }));
    entity.insert("category".into(), category);
}

// ─────────────────────────────────────────────────────────────────────────────
// Seed data
// ─────────────────────────────────────────────────────────────────────────────

const CATEGORIES: [(&str, &str, &str); 5] = [
    ("c-1", "Đồ uống", "Nước giải khát, trà, cà phê"),
    ("c-2", "Sữa & chế phẩm", "Sữa tươi, sữa chua, phô mai"),
    ("c-3", "Bánh kẹo", "Bánh quy, kẹo, snack"),
    ("c-4", "Gia vị", "Nước mắm, dầu ăn, hạt nêm"),
    ("c-5", "Rau củ", "Rau sạch theo mùa"),
];

fn days_ago(days: i64) -> String {
    (Utc::now() - ChronoDuration::days(days)).to_rfc3339()
}

fn days_ahead(days: i64) -> String {
    (Utc::now() + ChronoDuration::days(days)).to_rfc3339()
}

fn category_ref(index: usize) -> Value {
    let (id, name, _) = CATEGORIES[index % CATEGORIES.len()];
    json!({ "id": id, "name": name })
}

fn seed_categories() -> Vec<Value> {
    CATEGORIES
        .iter()
        .enumerate()
        .map(|(i, (id, name, description))| {
            json!({
                "id": id,
                "name": name,
                "description": description,
                "productCount": 3 + i * 2,
                "status": if i == 4 { "UnActive" } else { "Active" },
                "createdAt": days_ago(200 - i as i64 * 15),
            })
        })
        .collect()
}

fn seed_products() -> Vec<Value> {
    let products: [(&str, usize, u64, u64, &[&str]); 14] = [
        ("Trà xanh không độ 500ml", 0, 10_000, 240, &["bán chạy"]),
        ("Cà phê sữa đá lon", 0, 15_000, 120, &["mới"]),
        ("Nước khoáng 1.5L", 0, 8_000, 500, &[]),
        ("Sữa tươi tiệt trùng 1L", 1, 32_000, 80, &["bán chạy", "khuyến mãi"]),
        ("Sữa chua uống vị dâu", 1, 7_500, 300, &[]),
        ("Phô mai con bò cười", 1, 45_000, 40, &["nhập khẩu"]),
        ("Sữa đặc có đường", 1, 24_000, 0, &[]),
        ("Bánh quy bơ Danisa", 2, 135_000, 25, &["quà tặng", "nhập khẩu", "hộp thiếc"]),
        ("Kẹo dừa Bến Tre", 2, 38_000, 60, &["đặc sản"]),
        ("Snack khoai tây", 2, 12_000, 150, &[]),
        ("Nước mắm Phú Quốc 500ml", 3, 68_000, 90, &["đặc sản"]),
        ("Dầu ăn 1L", 3, 52_000, 110, &[]),
        ("Hạt nêm 400g", 3, 31_000, 75, &["khuyến mãi"]),
        ("Rau muống (bó)", 4, 6_000, 30, &[]),
    ];

    products
        .iter()
        .enumerate()
        .map(|(i, (name, cat, price, qty, tags))| {
            json!({
                "id": format!("p-{}", i + 1),
                "name": name,
                "sku": format!("SKU{:04}", 1000 + i * 7),
                "description": format!("{} - hàng chính hãng", name),
                "category": category_ref(*cat),
                "sellingPrice": price,
                "quantity": qty,
                "images": if i % 4 == 3 { vec![] } else {
                    vec![format!("https://cdn.storedesk.local/products/p-{}.jpg", i + 1)]
                },
                "tags": tags,
                "isDeleted": *qty == 0,
                "status": if i % 5 == 4 { "UnActive" } else { "Active" },
                "createdAt": days_ago(90 - i as i64 * 5),
            })
        })
        .collect()
}

fn seed_orders() -> Vec<Value> {
    let customers = [
        "Nguyễn Văn An",
        "Trần Thị Bình",
        "Lê Hoàng Cường",
        "Phạm Thu Dung",
        "Võ Minh Em",
    ];
    let statuses = ["Active", "Active", "UnActive", "Active"];

    (0..12)
        .map(|i: usize| {
            let lines: Vec<Value> = (0..(1 + i % 3))
                .map(|k| {
                    json!({
                        "productName": format!("Sản phẩm {}", k + 1),
                        "quantity": 1 + (i + k) % 4,
                        "price": 10_000 + k * 5_000,
                    })
                })
                .collect();
            let total: u64 = lines
                .iter()
                .map(|l| l["quantity"].as_u64().unwrap_or(0) * l["price"].as_u64().unwrap_or(0))
                .sum();
            json!({
                "id": format!("o-{}", i + 1),
                "code": format!("DH{:05}", 24001 + i),
                "customer": { "id": format!("u-{}", i % customers.len()), "name": customers[i % customers.len()] },
                "totalPrice": total,
                "items": lines,
                "isPaid": i % 3 != 1,
                "status": statuses[i % statuses.len()],
                "createdAt": days_ago(i as i64),
            })
        })
        .collect()
}

fn seed_news() -> Vec<Value> {
    let articles = [
        ("Khai trương chi nhánh mới tại Quận 7", "Ban biên tập"),
        ("Tuần lễ sữa: giảm 20% toàn bộ sữa tươi", "Marketing"),
        ("Hướng dẫn bảo quản rau củ tươi lâu", "Bếp nhà"),
        ("Đặc sản ba miền về kệ", "Ban biên tập"),
        ("Chương trình tích điểm 2024", "Marketing"),
        ("Lịch nghỉ lễ và giờ mở cửa", "Vận hành"),
    ];
    articles
        .iter()
        .enumerate()
        .map(|(i, (title, author))| {
            json!({
                "id": format!("n-{}", i + 1),
                "title": title,
                "author": author,
                "images": [format!("https://cdn.storedesk.local/news/cover-{}.png", i + 1)],
                "tags": if i % 2 == 0 { vec!["tin tức"] } else { vec!["khuyến mãi", "sự kiện"] },
                "status": if i == 5 { "UnActive" } else { "Active" },
                "publishedAt": days_ago(i as i64 * 6),
            })
        })
        .collect()
}

fn seed_batches() -> Vec<Value> {
    (0..8)
        .map(|i: usize| {
            let product = i % 6;
            json!({
                "id": format!("b-{}", i + 1),
                "code": format!("LO{:04}", 310 + i),
                "product": { "id": format!("p-{}", product + 1), "name": format!("Sản phẩm {}", product + 1) },
                "quantity": 50 + i * 25,
                "importPrice": 5_000 + i * 1_500,
                "manufacturedDate": days_ago(60 + i as i64),
                // Dry goods have no expiry
                "expiryDate": if i % 3 == 2 { Value::Null } else { json!(days_ahead(30 * (i as i64 + 1))) },
                "isDeleted": i == 7,
            })
        })
        .collect()
}

fn seed_addresses() -> Vec<Value> {
    let rows = [
        ("Nguyễn Văn An", "0901234567", "12 Lê Lợi", "TP. Hồ Chí Minh", "Customer", true),
        ("Trần Thị Bình", "0912345678", "45 Hai Bà Trưng", "Hà Nội", "Customer", false),
        ("Kho trung tâm", "02838123456", "KCN Tân Bình", "TP. Hồ Chí Minh", "Staff", true),
        ("Lê Hoàng Cường", "0987654321", "8 Trần Phú", "Đà Nẵng", "Manager", false),
        ("Văn phòng", "02439876543", "1 Tràng Tiền", "Hà Nội", "Admin", true),
    ];
    rows.iter()
        .enumerate()
        .map(|(i, (name, phone, street, city, role, default))| {
            json!({
                "id": format!("a-{}", i + 1),
                "receiverName": name,
                "phone": phone,
                "street": street,
                "city": city,
                "role": role,
                "isDefault": default,
            })
        })
        .collect()
}

fn seed_cart() -> Vec<Value> {
    vec![
        json!({
            "id": "cart-1",
            "productId": "p-1",
            "productName": "Trà xanh không độ 500ml",
            "quantity": 2,
            "remainingQuantity": 12,
            "sellingPrice": 10_000,
            "images": ["https://cdn.storedesk.local/products/p-1.jpg"],
        }),
        json!({
            "id": "cart-2",
            "productId": "p-6",
            "productName": "Phô mai con bò cười",
            "quantity": 1,
            "remainingQuantity": 3,
            "sellingPrice": 45_000,
            "images": [],
        }),
        json!({
            "id": "cart-3",
            "productId": "p-8",
            "productName": "Bánh quy bơ Danisa",
            "quantity": 1,
            "remainingQuantity": 5,
            "sellingPrice": 135_000,
            "images": [],
        }),
    ]
}
