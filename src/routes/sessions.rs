use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse, Responder};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::models::{
    CreateSessionRequest, DecideRequest, DecideResponse, Item, PreferenceProfile, SessionResponse, SignalKind,
};
use crate::routes::recommendations::{catalog_error_response, error_response, load_catalog, AppState};
use crate::services::{DecisionReport, PostgresCart, SessionRegistry};

/// Configure swipe session routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/sessions", web::post().to(create_session))
        .route("/sessions/{id}", web::get().to(get_session))
        .route("/sessions/{id}", web::delete().to(close_session))
        .route("/sessions/{id}/decide", web::post().to(decide))
        .route("/sessions/{id}/displayed", web::post().to(displayed))
        .route("/sessions/{id}/reload", web::post().to(reload_session));
}

fn session_not_found(id: &Uuid) -> HttpResponse {
    error_response(StatusCode::NOT_FOUND, "Session not found", format!("No session {}", id))
}

/// Rank the visitor's recommendations and strip the scores
async fn ranked_candidates(
    state: &AppState,
    profile: &PreferenceProfile,
) -> Result<Vec<Item>, HttpResponse> {
    let catalog = load_catalog(state).await.map_err(|e| {
        tracing::error!("Failed to load catalog for session: {}", e);
        catalog_error_response(&e)
    })?;

    Ok(state
        .ranker
        .rank_profile(&catalog, profile)
        .into_iter()
        .map(|candidate| candidate.item)
        .collect())
}

/// Open a swipe session over the visitor's current recommendations
///
/// POST /api/v1/sessions
///
/// An empty ranking still opens a session; its snapshot is `idle` and the
/// client shows the empty state.
async fn create_session(
    state: web::Data<AppState>,
    req: web::Json<CreateSessionRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        return error_response(StatusCode::BAD_REQUEST, "Validation failed", errors.to_string());
    }

    let visitor_id = &req.visitor_id;

    let profile = match state.postgres.load_profile(visitor_id).await {
        Ok(profile) => profile,
        Err(e) => {
            tracing::error!("Failed to load profile for {}: {}", visitor_id, e);
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to load preferences",
                e.to_string(),
            );
        }
    };

    let candidates = match ranked_candidates(&state, &profile).await {
        Ok(candidates) => candidates,
        Err(response) => return response,
    };

    let cart = Arc::new(PostgresCart::new(state.postgres.clone(), visitor_id.clone()));
    let (session_id, snapshot) = state.sessions.open(visitor_id, profile, candidates, cart).await;

    HttpResponse::Created().json(SessionResponse {
        session_id: session_id.to_string(),
        visitor_id: visitor_id.clone(),
        snapshot,
    })
}

/// GET /api/v1/sessions/{id}
async fn get_session(state: web::Data<AppState>, path: web::Path<Uuid>) -> impl Responder {
    let session_id = path.into_inner();

    match state.sessions.snapshot(&session_id).await {
        Some((visitor_id, snapshot)) => HttpResponse::Ok().json(SessionResponse {
            session_id: session_id.to_string(),
            visitor_id,
            snapshot,
        }),
        None => session_not_found(&session_id),
    }
}

/// DELETE /api/v1/sessions/{id}
async fn close_session(state: web::Data<AppState>, path: web::Path<Uuid>) -> impl Responder {
    let session_id = path.into_inner();

    if state.sessions.close(&session_id).await {
        HttpResponse::NoContent().finish()
    } else {
        session_not_found(&session_id)
    }
}

/// Route a decide request to its session
///
/// A request that resolves to no direction (short drag, empty body) is a
/// snap-back: the session is left untouched and its snapshot returned.
async fn resolve_decision(
    sessions: &SessionRegistry,
    session_id: &Uuid,
    req: &DecideRequest,
    swipe_threshold: f64,
) -> Result<DecisionReport, HttpResponse> {
    let report = match req.resolve(swipe_threshold) {
        Some(direction) => sessions.decide(session_id, direction).await,
        None => sessions
            .snapshot(session_id)
            .await
            .map(|(visitor_id, snapshot)| DecisionReport {
                visitor_id,
                event: None,
                snapshot,
            }),
    };

    report.ok_or_else(|| session_not_found(session_id))
}

fn decision_response(report: DecisionReport) -> HttpResponse {
    HttpResponse::Ok().json(DecideResponse {
        applied: report.event.is_some(),
        snapshot: report.snapshot,
    })
}

/// Decide on the presented candidate
///
/// POST /api/v1/sessions/{id}/decide
///
/// Request body, one of:
/// ```json
/// { "direction": "accept|reject" }
/// { "button": "like|skip" }
/// { "offsetX": 140.0 }
/// ```
///
/// Ignored input (mid-transition, exhausted, short drag) answers 200 with
/// `applied: false`.
async fn decide(
    state: web::Data<AppState>,
    path: web::Path<Uuid>,
    req: web::Json<DecideRequest>,
) -> impl Responder {
    let session_id = path.into_inner();

    let report = match resolve_decision(&state.sessions, &session_id, &req, state.swipe_threshold).await {
        Ok(report) => report,
        Err(response) => return response,
    };

    if let Some(event) = &report.event {
        let kinds: &[SignalKind] = if event.direction.is_accept() {
            &[SignalKind::Viewed, SignalKind::Liked]
        } else {
            &[SignalKind::Viewed]
        };

        if let Err(e) = state
            .postgres
            .record_signals(&report.visitor_id, event.item.id, kinds)
            .await
        {
            tracing::error!(
                "Decision on item {} applied but not persisted for {}: {}",
                event.item.id,
                report.visitor_id,
                e
            );
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to persist decision",
                e.to_string(),
            );
        }

        tracing::info!(
            "Visitor {} {:?} item {} in session {}",
            report.visitor_id,
            event.direction,
            event.item.id,
            session_id
        );
    }

    decision_response(report)
}

/// Mark the presented candidate as viewed without deciding
///
/// POST /api/v1/sessions/{id}/displayed
async fn displayed(state: web::Data<AppState>, path: web::Path<Uuid>) -> impl Responder {
    let session_id = path.into_inner();

    let (visitor_id, item_id) = match state.sessions.mark_displayed(&session_id).await {
        Some(result) => result,
        None => return session_not_found(&session_id),
    };

    if let Some(item_id) = item_id {
        if let Err(e) = state.postgres.record_signal(&visitor_id, item_id, SignalKind::Viewed).await {
            tracing::error!("Failed to record display of {} for {}: {}", item_id, visitor_id, e);
            return error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to record view",
                e.to_string(),
            );
        }
    }

    HttpResponse::Ok().json(serde_json::json!({ "itemId": item_id }))
}

/// Re-rank with the session's current signal and load the result
///
/// POST /api/v1/sessions/{id}/reload
async fn reload_session(state: web::Data<AppState>, path: web::Path<Uuid>) -> impl Responder {
    let session_id = path.into_inner();

    let profile = match state.sessions.profile(&session_id).await {
        Some(profile) => profile,
        None => return session_not_found(&session_id),
    };

    let candidates = match ranked_candidates(&state, &profile).await {
        Ok(candidates) => candidates,
        Err(response) => return response,
    };

    match state.sessions.reload(&session_id, candidates).await {
        Some((visitor_id, snapshot)) => HttpResponse::Ok().json(SessionResponse {
            session_id: session_id.to_string(),
            visitor_id,
            snapshot,
        }),
        None => session_not_found(&session_id),
    }
}
