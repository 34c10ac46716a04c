//! Inbound HTTP ingress (spec §4.5, §6 "Inbound events"): four routes
//! under `/events` that deserialize a small JSON body, resolve the named
//! component, and dispatch to the registry.
//!
//! Grounded in the teacher pack's `abathur-mcp-*-http` binaries, which
//! wrap a small `axum::Router` with JSON handlers returning typed error
//! bodies (see `examples/odgrim-abathur-swarm/src/bin/abathur-mcp-memory-http.rs`).

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::domain::errors::DomainError;
use crate::services::events::ControllerEvent;
use crate::services::registry::ControllerRegistry;

pub fn router(registry: Arc<ControllerRegistry>) -> Router {
    Router::new()
        .route("/events/:user_id/dialog-completed", post(dialog_completed))
        .route("/events/:user_id/dialog-rescheduled", post(dialog_rescheduled))
        .route("/events/:user_id/user-trigger", post(user_trigger))
        .route("/events/new-day", post(new_day))
        .with_state(registry)
}

#[derive(Debug, Deserialize)]
struct ComponentBody {
    component_name: String,
}

#[derive(Debug, Deserialize)]
struct RescheduleBody {
    component_name: String,
    new_datetime_iso: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
struct NewDayBody {
    date_iso: NaiveDate,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

async fn dialog_completed(
    State(registry): State<Arc<ControllerRegistry>>,
    Path(user_id): Path<Uuid>,
    Json(body): Json<ComponentBody>,
) -> Response {
    dispatch_component_event(&registry, user_id, &body.component_name, ControllerEvent::DialogCompleted).await
}

async fn dialog_rescheduled(
    State(registry): State<Arc<ControllerRegistry>>,
    Path(user_id): Path<Uuid>,
    Json(body): Json<RescheduleBody>,
) -> Response {
    dispatch_component_event(&registry, user_id, &body.component_name, move |c| {
        ControllerEvent::DialogRescheduled(c, body.new_datetime_iso)
    })
    .await
}

async fn user_trigger(
    State(registry): State<Arc<ControllerRegistry>>,
    Path(user_id): Path<Uuid>,
    Json(body): Json<ComponentBody>,
) -> Response {
    dispatch_component_event(&registry, user_id, &body.component_name, ControllerEvent::UserTrigger).await
}

async fn new_day(State(registry): State<Arc<ControllerRegistry>>, Json(body): Json<NewDayBody>) -> Response {
    registry.broadcast_new_day(body.date_iso).await;
    StatusCode::ACCEPTED.into_response()
}

async fn dispatch_component_event(
    registry: &ControllerRegistry,
    user_id: Uuid,
    component_name: &str,
    to_event: impl FnOnce(crate::domain::models::ComponentName) -> ControllerEvent,
) -> Response {
    let component = match registry.resolve_component(component_name).await {
        Ok(c) => c,
        Err(e) => return map_domain_error(e),
    };

    match registry.dispatch(user_id, to_event(component)).await {
        Ok(()) => StatusCode::ACCEPTED.into_response(),
        Err(e) => map_domain_error(e),
    }
}

/// Map domain errors to HTTP status per spec §7's error-kind policy.
fn map_domain_error(err: DomainError) -> Response {
    let status = match err {
        DomainError::UserNotFound(_) | DomainError::ComponentNotFound(_) | DomainError::ControllerNotFound(_) => {
            StatusCode::NOT_FOUND
        }
        DomainError::Validation(_) => StatusCode::BAD_REQUEST,
        DomainError::IllegalTransition { .. } => {
            // Logged at INFO and ignored per §7; the event was still
            // accepted, it just had no effect in the current phase.
            warn!(error = %err, "illegal transition, ignored");
            return StatusCode::ACCEPTED.into_response();
        }
        DomainError::PersistenceFailure(_) | DomainError::ScheduleFailure(_) => StatusCode::SERVICE_UNAVAILABLE,
        DomainError::DeliveryFailure(_) => StatusCode::BAD_GATEWAY,
    };
    (status, Json(ErrorBody { error: err.to_string() })).into_response()
}
