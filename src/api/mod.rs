pub mod models;
pub mod routes;

use actix_web::middleware::DefaultHeaders;

/// Permissive CORS headers attached to every response so the widget can be
/// embedded on any origin.
pub fn cors_headers() -> DefaultHeaders {
    DefaultHeaders::new()
        .add(("Access-Control-Allow-Origin", "*"))
        .add((
            "Access-Control-Allow-Headers",
            "authorization, x-client-info, apikey, content-type",
        ))
}
