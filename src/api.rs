// 🌐 Web API - axum router for the browser dashboard
//
// The server is stateless with respect to the filter: the page owns its
// selection and asks for `/api/view/:selection` after every button press.

use crate::config::{Basemap, BasemapInfo};
use crate::merchant::{Dataset, MerchantRecord, VoucherType};
use crate::render::{self, DerivedView, PointStyle, ViewState, INITIAL_VIEW, POINT_STYLE};
use crate::selection::FilterSelection;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{debug, warn};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    dataset: Dataset,
    basemap: Arc<Basemap>,
}

impl AppState {
    pub fn new(dataset: Dataset, basemap: Basemap) -> Self {
        Self {
            dataset,
            basemap: Arc::new(basemap),
        }
    }
}

/// API Response wrapper
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl<T> ApiResponse<T> {
    fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LegendEntry {
    code: &'static str,
    label: &'static str,
    color: String,
}

/// Everything the page needs to set up the map once
#[derive(Debug, Serialize)]
pub struct MapConfig {
    view: ViewState,
    point_style: PointStyle,
    basemap: BasemapInfo,
    legend: Vec<LegendEntry>,
}

// ============================================================================
// API Handlers
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> impl IntoResponse {
    Json(ApiResponse::ok("OK"))
}

/// GET /api/merchants - The whole dataset in file order
async fn get_merchants(State(state): State<AppState>) -> impl IntoResponse {
    let merchants: Vec<MerchantRecord> = state.dataset.records().to_vec();
    Json(ApiResponse::ok(merchants))
}

/// GET /api/view/:selection - Filtered records, KPIs, map layer and columns
async fn get_view(State(state): State<AppState>, Path(selection): Path<String>) -> Response {
    match selection.parse::<FilterSelection>() {
        Ok(selection) => {
            let view: DerivedView = render::render(&state.dataset, selection);
            debug!("Rendered view '{}' with {} merchants", selection, view.kpis.total);
            (StatusCode::OK, Json(ApiResponse::ok(view))).into_response()
        }
        Err(e) => {
            warn!("Rejected view request: {}", e);
            (
                StatusCode::BAD_REQUEST,
                Json(ApiResponse::<DerivedView>::err(e.to_string())),
            )
                .into_response()
        }
    }
}

/// GET /api/map-config - Camera, point style, basemap and legend
async fn get_map_config(State(state): State<AppState>) -> impl IntoResponse {
    let legend = VoucherType::ALL
        .iter()
        .map(|t| LegendEntry {
            code: t.code(),
            label: t.label_ko(),
            color: t.hex(),
        })
        .collect();

    Json(ApiResponse::ok(MapConfig {
        view: INITIAL_VIEW,
        point_style: POINT_STYLE,
        basemap: BasemapInfo::from(state.basemap.as_ref()),
        legend,
    }))
}

/// GET / - Serve the dashboard page
async fn serve_index() -> impl IntoResponse {
    Html(include_str!("../web/index.html"))
}

pub fn router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/merchants", get(get_merchants))
        .route("/view/:selection", get(get_view))
        .route("/map-config", get(get_map_config))
        .with_state(state);

    Router::new()
        .route("/", get(serve_index))
        .nest("/api", api_routes)
        .layer(CorsLayer::permissive())
}
