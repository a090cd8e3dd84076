use actix_web::{
    error::{InternalError, JsonPayloadError},
    http::Method,
    web, HttpRequest, HttpResponse, Result as WebResult,
};
use tracing::error;

use crate::api::models::{ChatRequest, EscalateRequest, EscalateResponse, ErrorResponse};
use crate::chat::ChatService;
use crate::error::ChatError;

fn error_response(context: &str, err: &ChatError) -> HttpResponse {
    error!("{} error: {}", context, err);
    HttpResponse::InternalServerError().json(ErrorResponse {
        error: err.to_string(),
    })
}

fn json_error_handler(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    error!("Rejected request body: {}", err);
    let response = HttpResponse::InternalServerError().json(ErrorResponse {
        error: err.to_string(),
    });
    InternalError::from_response(err, response).into()
}

pub async fn preflight() -> HttpResponse {
    HttpResponse::Ok().finish()
}

pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({"status": "healthy"}))
}

// --- Chat ---

pub async fn chat(
    service: web::Data<ChatService>,
    req: web::Json<ChatRequest>,
) -> WebResult<HttpResponse> {
    let req = req.into_inner();

    match service.handle_message(&req.session_id, &req.message).await {
        Ok(reply) => Ok(HttpResponse::Ok().json(reply)),
        Err(e) => Ok(error_response("Chat", &e)),
    }
}

pub async fn escalate(
    service: web::Data<ChatService>,
    req: web::Json<EscalateRequest>,
) -> WebResult<HttpResponse> {
    let req = req.into_inner();

    match service.escalate(&req.session_id, req.user_message.as_deref()) {
        Ok(message) => Ok(HttpResponse::Ok().json(EscalateResponse {
            success: true,
            message,
        })),
        Err(e) => Ok(error_response("Escalation", &e)),
    }
}

// --- Sessions ---

pub async fn create_session(service: web::Data<ChatService>) -> WebResult<HttpResponse> {
    match service.create_session() {
        Ok(session) => Ok(HttpResponse::Created().json(session)),
        Err(e) => Ok(error_response("Session", &e)),
    }
}

pub async fn get_messages(
    service: web::Data<ChatService>,
    id: web::Path<String>,
) -> WebResult<HttpResponse> {
    match service.history(&id.into_inner()) {
        Ok(messages) => Ok(HttpResponse::Ok().json(messages)),
        Err(e) => Ok(error_response("History", &e)),
    }
}

pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.app_data(web::JsonConfig::default().error_handler(json_error_handler))
        .route("/health", web::get().to(health))
        .service(
            web::resource("/chat")
                .route(web::post().to(chat))
                .route(web::method(Method::OPTIONS).to(preflight)),
        )
        .service(
            web::resource("/escalate")
                .route(web::post().to(escalate))
                .route(web::method(Method::OPTIONS).to(preflight)),
        )
        .service(web::resource("/sessions").route(web::post().to(create_session)))
        .service(web::resource("/sessions/{id}/messages").route(web::get().to(get_messages)));
}
