use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};

use crate::{
    dto::menu::{CategoryList, MenuFilter, MenuItemList},
    response::{ApiResponse, Meta},
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/categories", get(list_categories))
        .route("/items", get(list_items))
}

#[utoipa::path(
    get,
    path = "/api/menu/categories",
    responses(
        (status = 200, description = "Categories by display order", body = ApiResponse<CategoryList>)
    ),
    tag = "Menu"
)]
pub async fn list_categories(State(state): State<AppState>) -> Json<ApiResponse<CategoryList>> {
    let items = state.catalog.read().await.categories();
    Json(ApiResponse::ok(CategoryList { items }))
}

#[utoipa::path(
    get,
    path = "/api/menu/items",
    params(
        ("category" = Option<String>, Query, description = "Category ID, `all` for every category"),
        ("q" = Option<String>, Query, description = "Search in names and descriptions")
    ),
    responses(
        (status = 200, description = "Menu items", body = ApiResponse<MenuItemList>)
    ),
    tag = "Menu"
)]
pub async fn list_items(
    State(state): State<AppState>,
    Query(filter): Query<MenuFilter>,
) -> Json<ApiResponse<MenuItemList>> {
    let items = state.catalog.read().await.list(&filter);
    let meta = Meta::unpaged(items.len());
    Json(ApiResponse::success("OK", MenuItemList { items }, Some(meta)))
}
