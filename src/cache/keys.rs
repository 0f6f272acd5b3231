//! Cache key encoding for catalog pages.

use base64::{Engine as _, engine::general_purpose::STANDARD};
use serde_json::json;

use crate::application::repos::CoffeePageQuery;

/// Namespace grouping every cached menu page, dropped as a unit on writes.
pub const MENU_NAMESPACE: &str = "menu";

/// Deterministic key for one menu page query.
///
/// The query is rendered as JSON with sorted keys and then base64 encoded, so
/// equal queries share a key and different queries never collide.
pub fn menu_page_key(query: &CoffeePageQuery) -> String {
    let canonical = json!({
        "in_stock": query.in_stock,
        "page": query.page.page(),
        "page_size": query.page.page_size(),
    });
    STANDARD.encode(canonical.to_string())
}
