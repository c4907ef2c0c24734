//! HTTP handlers for the gatecard relay.

use actix_web::{HttpResponse, Responder, get, post, web};
use gatecard_core::{AnalysisReport, CardOptions, NotificationCard, build_card_with};
use utoipa::OpenApi;

use crate::dispatch::CardDispatcher;
use crate::openapi::ApiDoc;

/// Shared application state for handlers.
#[derive(Clone)]
pub struct AppState {
    /// Outbound card delivery.
    pub dispatcher: CardDispatcher,
    /// Card formatting options.
    pub card_options: CardOptions,
}

fn prepare_card(body: &[u8], options: &CardOptions) -> gatecard_core::Result<NotificationCard> {
    let report = AnalysisReport::from_json(body)?;
    log::debug!("received sonar payload: {report:?}");
    build_card_with(&report, options)
}

#[utoipa::path(
    post,
    path = "/webhook/sonar",
    request_body = AnalysisReport,
    responses(
        (status = 200, description = "Card built and delivery attempted", body = String),
        (status = 500, description = "Payload could not be processed", body = String)
    ),
    tag = "webhook"
)]
#[post("/webhook/sonar")]
/// Receive a SonarQube webhook and relay it to Feishu as a card.
pub async fn sonar_webhook(state: web::Data<AppState>, body: web::Bytes) -> impl Responder {
    let card = match prepare_card(&body, &state.card_options) {
        Ok(card) => card,
        Err(err) => {
            log::warn!("error processing sonar webhook: {err}");
            return HttpResponse::InternalServerError().body("error");
        }
    };
    log::info!(
        "relaying quality gate card: {}",
        card.card.header.subtitle.content
    );
    state.dispatcher.dispatch(&card).await;
    HttpResponse::Ok().body("ok")
}

#[utoipa::path(
    get,
    path = "/healthz",
    responses(
        (status = 200, description = "Service is up", body = String)
    ),
    tag = "system"
)]
#[get("/healthz")]
/// Liveness probe.
pub async fn healthz() -> impl Responder {
    HttpResponse::Ok().body("ok")
}

#[utoipa::path(
    get,
    path = "/api/openapi.json",
    responses(
        (status = 200, description = "OpenAPI document", body = serde_json::Value)
    ),
    tag = "system"
)]
#[get("/api/openapi.json")]
/// Serve the OpenAPI document.
pub async fn openapi_json() -> impl Responder {
    HttpResponse::Ok().json(ApiDoc::openapi())
}
