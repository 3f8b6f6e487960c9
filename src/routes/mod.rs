use actix_web::error::InternalError;
use actix_web::{HttpResponse, web};
use serde_json::json;

use crate::services::ServiceError;

pub mod api;

/// Translate a service failure into the JSON error body returned to clients.
pub fn error_response(err: ServiceError) -> HttpResponse {
    let message = err.to_string();
    match err {
        ServiceError::NotFound(_) => HttpResponse::NotFound().json(json!({
            "error": "NotFound",
            "message": message,
        })),
        ServiceError::Conflict(_) | ServiceError::Form(_) => {
            HttpResponse::BadRequest().json(json!({
                "error": "BadRequest",
                "message": message,
            }))
        }
        ServiceError::Internal => HttpResponse::InternalServerError().json(json!({
            "error": "InternalServerError",
            "message": message,
        })),
    }
}

/// Response for a path segment that should have been a UUID.
pub fn invalid_id_response(value: &str) -> HttpResponse {
    HttpResponse::BadRequest().json(json!({
        "error": "BadRequest",
        "message": format!("Invalid UUID: {value}"),
    }))
}

/// JSON body extractor settings: size limit and JSON error bodies.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(1 << 20)
        .error_handler(|err, _req| {
            let response = HttpResponse::BadRequest().json(json!({
                "error": "BadRequest",
                "message": err.to_string(),
            }));
            InternalError::from_response(err, response).into()
        })
}

/// Query string extractor settings returning JSON error bodies.
pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req| {
        let response = HttpResponse::BadRequest().json(json!({
            "error": "BadRequest",
            "message": err.to_string(),
        }));
        InternalError::from_response(err, response).into()
    })
}
