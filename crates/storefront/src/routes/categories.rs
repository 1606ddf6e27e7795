//! Category route handlers.

use axum::{Json, extract::State};

use crate::catalog::{CatalogBackend, CategorySnapshot};
use crate::state::AppState;

/// The live category tree, as last loaded.
///
/// Always answers from memory; a failed load shows up as `status: "errored"`
/// with an empty tree.
pub async fn list<B: CatalogBackend>(State(state): State<AppState<B>>) -> Json<CategorySnapshot> {
    Json(state.categories().snapshot().await)
}
