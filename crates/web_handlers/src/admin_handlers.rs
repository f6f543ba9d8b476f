use actix_web::{HttpResponse, Result};

/// Health check endpoint, reachable without a token
pub async fn health() -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "service": "checkin",
        "status": "healthy",
        "timestamp": chrono::Utc::now()
    })))
}
