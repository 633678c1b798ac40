use actix_web::{web, HttpResponse, Responder};
use std::sync::Arc;
use validator::Validate;

use crate::core::Ranker;
use crate::models::{
    CartResponse, ErrorResponse, HealthResponse, Item, RecommendationsRequest, RecommendationsResponse,
    RecordViewRequest, SignalKind, SignalsResponse, VisitorQuery,
};
use crate::services::{CacheKey, CacheManager, CatalogClient, CatalogError, PostgresClient, SessionRegistry};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<CatalogClient>,
    pub cache: Arc<CacheManager>,
    pub postgres: Arc<PostgresClient>,
    pub sessions: Arc<SessionRegistry>,
    pub ranker: Ranker,
    pub swipe_threshold: f64,
}

/// Configure recommendation, signal and cart routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/recommendations", web::post().to(recommendations))
        .route("/signals", web::get().to(get_signals))
        .route("/signals", web::delete().to(clear_signals))
        .route("/signals/viewed", web::post().to(record_view))
        .route("/catalog/refresh", web::post().to(refresh_catalog))
        .route("/cart", web::get().to(get_cart));
}

pub(crate) fn error_response(status: actix_web::http::StatusCode, error: &str, message: String) -> HttpResponse {
    HttpResponse::build(status).json(ErrorResponse {
        error: error.to_string(),
        message,
        status_code: status.as_u16(),
    })
}

pub(crate) fn catalog_error_response(e: &CatalogError) -> HttpResponse {
    error_response(
        actix_web::http::StatusCode::BAD_GATEWAY,
        "Failed to fetch catalog",
        e.to_string(),
    )
}

/// Catalog snapshot, served from cache when possible
///
/// Cache failures are logged and fall through to the provider; provider
/// failures are returned unchanged.
pub(crate) async fn load_catalog(state: &AppState) -> Result<Vec<Item>, CatalogError> {
    let key = CacheKey::catalog();

    match state.cache.get_optional::<Vec<Item>>(&key).await {
        Ok(Some(items)) => return Ok(items),
        Ok(None) => {}
        Err(e) => tracing::warn!("Catalog cache read failed, fetching from provider: {}", e),
    }

    let items = state.catalog.fetch_items().await?;

    if let Err(e) = state.cache.set(&key, &items).await {
        tracing::warn!("Failed to cache catalog: {}", e);
    }

    Ok(items)
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let pg_healthy = state.postgres.health_check().await.unwrap_or(false);

    let status = if pg_healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Rank recommendations for a visitor
///
/// POST /api/v1/recommendations
///
/// Request body:
/// ```json
/// { "visitorId": "string" }
/// ```
///
/// A visitor with no viewed items gets an empty list, not an error.
async fn recommendations(
    state: web::Data<AppState>,
    req: web::Json<RecommendationsRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return error_response(
            actix_web::http::StatusCode::BAD_REQUEST,
            "Validation failed",
            errors.to_string(),
        );
    }

    let visitor_id = &req.visitor_id;

    let profile = match state.postgres.load_profile(visitor_id).await {
        Ok(profile) => profile,
        Err(e) => {
            tracing::error!("Failed to load profile for {}: {}", visitor_id, e);
            return error_response(
                actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to load preferences",
                e.to_string(),
            );
        }
    };

    let catalog = match load_catalog(&state).await {
        Ok(items) => items,
        Err(e) => {
            tracing::error!("Failed to load catalog for {}: {}", visitor_id, e);
            return catalog_error_response(&e);
        }
    };

    let ranked = state.ranker.rank_profile(&catalog, &profile);

    tracing::info!(
        "Returning {} recommendations for visitor {} (catalog: {}, viewed: {}, liked: {})",
        ranked.len(),
        visitor_id,
        catalog.len(),
        profile.viewed.len(),
        profile.liked.len()
    );

    HttpResponse::Ok().json(RecommendationsResponse {
        recommendations: ranked,
        catalog_size: catalog.len(),
    })
}

/// Record that an item was displayed
///
/// POST /api/v1/signals/viewed
async fn record_view(
    state: web::Data<AppState>,
    req: web::Json<RecordViewRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return error_response(
            actix_web::http::StatusCode::BAD_REQUEST,
            "Validation failed",
            errors.to_string(),
        );
    }

    match state
        .postgres
        .record_signal(&req.visitor_id, req.item_id, SignalKind::Viewed)
        .await
    {
        Ok(()) => HttpResponse::NoContent().finish(),
        Err(e) => {
            tracing::error!("Failed to record view for {}: {}", req.visitor_id, e);
            error_response(
                actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to record view",
                e.to_string(),
            )
        }
    }
}

/// Stored signal for a visitor
///
/// GET /api/v1/signals?visitorId={visitorId}
async fn get_signals(
    state: web::Data<AppState>,
    query: web::Query<VisitorQuery>,
) -> impl Responder {
    match state.postgres.load_profile(&query.visitor_id).await {
        Ok(profile) => HttpResponse::Ok().json(SignalsResponse {
            visitor_id: query.visitor_id.clone(),
            viewed: profile.viewed.into_iter().collect(),
            liked: profile.liked.into_iter().collect(),
        }),
        Err(e) => {
            tracing::error!("Failed to fetch signals for {}: {}", query.visitor_id, e);
            error_response(
                actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to fetch signals",
                e.to_string(),
            )
        }
    }
}

/// Forget everything stored for a visitor
///
/// DELETE /api/v1/signals?visitorId={visitorId}
async fn clear_signals(
    state: web::Data<AppState>,
    query: web::Query<VisitorQuery>,
) -> impl Responder {
    match state.postgres.clear_signals(&query.visitor_id).await {
        Ok(removed) => HttpResponse::Ok().json(serde_json::json!({
            "visitorId": query.visitor_id,
            "removed": removed,
        })),
        Err(e) => {
            tracing::error!("Failed to clear signals for {}: {}", query.visitor_id, e);
            error_response(
                actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to clear signals",
                e.to_string(),
            )
        }
    }
}

/// Drop the cached catalog so the next ranking refetches it
///
/// POST /api/v1/catalog/refresh
async fn refresh_catalog(state: web::Data<AppState>) -> impl Responder {
    if let Err(e) = state.cache.delete(&CacheKey::catalog()).await {
        tracing::warn!("Failed to invalidate catalog cache: {}", e);
    }

    match load_catalog(&state).await {
        Ok(items) => HttpResponse::Ok().json(serde_json::json!({ "catalogSize": items.len() })),
        Err(e) => {
            tracing::error!("Failed to refresh catalog: {}", e);
            catalog_error_response(&e)
        }
    }
}

/// Items forwarded to a visitor's cart
///
/// GET /api/v1/cart?visitorId={visitorId}
async fn get_cart(
    state: web::Data<AppState>,
    query: web::Query<VisitorQuery>,
) -> impl Responder {
    match state.postgres.get_cart(&query.visitor_id).await {
        Ok(items) => HttpResponse::Ok().json(CartResponse {
            visitor_id: query.visitor_id.clone(),
            items,
        }),
        Err(e) => {
            tracing::error!("Failed to fetch cart for {}: {}", query.visitor_id, e);
            error_response(
                actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to fetch cart",
                e.to_string(),
            )
        }
    }
}
