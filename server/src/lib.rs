use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use engine::{Listing, ListingStore, Order, QueryParams, SearchEngine, SortKey};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

/// Largest page a caller may request.
const MAX_PAGE_SIZE: i64 = 40;

#[derive(Debug, Deserialize)]
pub struct ListingsParams {
    pub query: Option<String>,
    pub category: Option<String>,
    #[serde(rename = "subCategory")]
    pub sub_category: Option<String>,
    pub sort: Option<SortKey>,
    #[serde(default)]
    pub order: Order,
    #[serde(default = "default_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_limit() -> i64 {
    10
}

#[derive(Debug, Serialize)]
pub struct ListingsMeta {
    pub total: usize,
    pub took_s: f64,
    pub limit: i64,
    pub offset: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_query: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ListingsResponse {
    pub meta: ListingsMeta,
    pub data: Vec<Listing>,
}

pub fn build_app<S: ListingStore>(engine: Arc<SearchEngine<S>>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/listings", get(listings_handler::<S>))
        .with_state(engine)
        .layer(cors)
}

pub async fn listings_handler<S: ListingStore>(
    State(engine): State<Arc<SearchEngine<S>>>,
    Query(params): Query<ListingsParams>,
) -> Result<Json<ListingsResponse>, (StatusCode, String)> {
    if params.limit > MAX_PAGE_SIZE {
        return Err((
            StatusCode::BAD_REQUEST,
            format!("limit must be at most {MAX_PAGE_SIZE}"),
        ));
    }
    if params.limit < 0 || params.offset < 0 {
        return Err((
            StatusCode::BAD_REQUEST,
            "offset and limit must be non-negative".into(),
        ));
    }

    let results = engine
        .query(QueryParams {
            query: params.query.clone(),
            offset: params.offset,
            limit: params.limit,
            category: params.category,
            sub_category: params.sub_category,
            sort: params.sort,
            order: params.order,
        })
        .await
        .map_err(|err| {
            tracing::error!(%err, "listing query failed");
            (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
        })?;

    Ok(Json(ListingsResponse {
        meta: ListingsMeta {
            total: results.total,
            took_s: results.took_s,
            limit: params.limit,
            offset: params.offset,
            query: params.query,
            suggested_query: results.suggested_query,
        },
        data: results.listings,
    }))
}
