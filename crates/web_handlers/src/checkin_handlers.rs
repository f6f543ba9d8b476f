use actix_web::{HttpRequest, HttpResponse, Result, http::Method, web};
use checkin_core::wire::{Action, ApiResponse, ApiStatus, CheckinRequest, RejectRequest};
use registration_services::{CheckinOutcome, RegistrationService};
use validator::Validate;

use crate::checkin_types::*;

/// Path of the registration endpoint within the API scope.
pub const REGISTRY_PATH: &str = "/registry";

/// Registers the registration endpoint. Mount inside a scope guarded by
/// `auth_services::middleware::ApiTokenGuard`.
pub fn configure_registry_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource(REGISTRY_PATH).route(web::route().to(dispatch_action)));
}

/// Routes a request to the operation named by its `action` query parameter
pub async fn dispatch_action(
    service: web::Data<RegistrationService>,
    req: HttpRequest,
    body: web::Bytes,
) -> Result<HttpResponse, ApiError> {
    let query = web::Query::<ActionQuery>::from_query(req.query_string())
        .map(web::Query::into_inner)
        .unwrap_or_default();

    let action = query
        .action
        .as_deref()
        .and_then(|a| a.parse::<Action>().ok())
        .ok_or(ApiError::UnknownAction)?;

    let (expected, allowed) = if action.is_read_only() {
        (Method::GET, "GET")
    } else {
        (Method::POST, "POST")
    };
    if req.method() != expected {
        return Err(ApiError::MethodNotAllowed { allowed });
    }

    log::debug!("Dispatching action '{}'", action);

    match action {
        Action::CheckIn => check_in(&service, &body).await,
        Action::RegisteredIds => registered_ids(&service).await,
        Action::Clear => clear(&service).await,
        Action::Reject => reject(&service, &body).await,
    }
}

/// Checks a scanned identifier in
async fn check_in(service: &RegistrationService, body: &[u8]) -> Result<HttpResponse, ApiError> {
    let request: CheckinRequest = parse_json_body(body)?;
    let id = request.id.trim();

    let response = match service.check_in(id).await? {
        CheckinOutcome::Accepted => HttpResponse::Ok().json(ApiResponse::new(
            ApiStatus::Ok,
            format!("ID '{}' checked in successfully.", id),
        )),
        CheckinOutcome::AlreadyRegistered => HttpResponse::Ok().json(ApiResponse::new(
            ApiStatus::AlreadyRegistered,
            format!("ID '{}' was already checked in.", id),
        )),
        CheckinOutcome::Rejected { reason } => HttpResponse::Ok().json(ApiResponse::rejected(
            format!("ID '{}' has been rejected and cannot check in.", id),
            reason,
        )),
        CheckinOutcome::Unknown => HttpResponse::NotFound().json(ApiResponse::new(
            ApiStatus::IdNotKnown,
            format!("ID '{}' is not recognized.", id),
        )),
    };

    Ok(response)
}

/// Lists every checked-in identifier, ascending
async fn registered_ids(service: &RegistrationService) -> Result<HttpResponse, ApiError> {
    let ids = service.list_registered().await?;
    Ok(HttpResponse::Ok().json(ids))
}

/// Deletes every check-in record
async fn clear(service: &RegistrationService) -> Result<HttpResponse, ApiError> {
    service.clear_all().await?;
    Ok(HttpResponse::Ok().json(ApiResponse::new(
        ApiStatus::Ok,
        "All registered IDs have been cleared.",
    )))
}

/// Blocks an identifier from future check-ins
async fn reject(service: &RegistrationService, body: &[u8]) -> Result<HttpResponse, ApiError> {
    let request: RejectRequest = parse_json_body(body)?;
    request
        .validate()
        .map_err(|e| ApiError::BadRequest(format!("Validation error: {}", e)))?;

    let record = service
        .reject(&request.id, &request.reason, request.rejected_by.as_deref())
        .await?;

    Ok(HttpResponse::Ok().json(ApiResponse::new(
        ApiStatus::Ok,
        format!("ID '{}' has been rejected.", record.identifier),
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{App, body::MessageBody, dev::ServiceResponse, http::StatusCode, test};
    use auth_services::middleware::ApiTokenGuard;
    use auth_services::token::ServerSecret;
    use checkin_core::wire::API_TOKEN_HEADER;
    use registration_services::{GuestList, MemoryStore};
    use std::sync::Arc;

    const TOKEN: &str = "test-token";

    fn registry(guest_list: Option<GuestList>) -> RegistrationService {
        RegistrationService::new(Arc::new(MemoryStore::new()), guest_list)
    }

    macro_rules! app {
        ($service:expr) => {
            test::init_service(
                App::new().app_data(web::Data::new($service)).service(
                    web::scope("/api")
                        .wrap(ApiTokenGuard::new(Some(ServerSecret::new(TOKEN).unwrap())))
                        .configure(configure_registry_routes),
                ),
            )
            .await
        };
    }

    fn post(action: &str, body: serde_json::Value) -> test::TestRequest {
        test::TestRequest::post()
            .uri(&format!("/api/registry?action={}", action))
            .insert_header((API_TOKEN_HEADER, TOKEN))
            .set_json(body)
    }

    async fn json_body<B: MessageBody>(resp: ServiceResponse<B>) -> serde_json::Value {
        test::read_body_json(resp).await
    }

    #[actix_web::test]
    async fn test_check_in_then_duplicate() {
        let app = app!(registry(None));

        let resp = test::call_service(&app, post("checkin", serde_json::json!({"id": "guest-42"})).to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body = json_body(resp).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["message"], "ID 'guest-42' checked in successfully.");

        let resp = test::call_service(&app, post("checkin", serde_json::json!({"id": "guest-42"})).to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(json_body(resp).await["status"], "already registered");
    }

    #[actix_web::test]
    async fn test_invalid_id_is_bad_request() {
        let app = app!(registry(None));

        for body in [
            serde_json::json!({"id": "bad"}),
            serde_json::json!({"id": "guest_42"}),
            serde_json::json!({}),
        ] {
            let resp = test::call_service(&app, post("checkin", body).to_request()).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
            let body = json_body(resp).await;
            assert_eq!(body["status"], "error");
            assert_eq!(body["message"], "Invalid request: ID has an invalid format.");
        }
    }

    #[actix_web::test]
    async fn test_rejected_id_reports_reason() {
        let app = app!(registry(None));

        let resp = test::call_service(
            &app,
            post("reject", serde_json::json!({"id": "guest-42", "reason": "banned", "rejected_by": "door"}))
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(json_body(resp).await["status"], "ok");

        let resp = test::call_service(&app, post("checkin", serde_json::json!({"id": "guest-42"})).to_request()).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body = json_body(resp).await;
        assert_eq!(body["status"], "rejected");
        assert_eq!(body["reason"], "banned");

        let resp = test::call_service(
            &app,
            post("reject", serde_json::json!({"id": "guest-42", "reason": "again"})).to_request(),
        )
        .await;
        assert_eq!(resp.status(), StatusCode::CONFLICT);
        assert_eq!(json_body(resp).await["status"], "error");
    }

    #[actix_web::test]
    async fn test_reject_requires_reason() {
        let app = app!(registry(None));

        let resp = test::call_service(&app, post("reject", serde_json::json!({"id": "guest-42"})).to_request()).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_unknown_guest_is_not_found() {
        let guests = GuestList::parse("guest-1\n");
        let app = app!(registry(Some(guests)));

        let resp = test::call_service(&app, post("checkin", serde_json::json!({"id": "guest-2"})).to_request()).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        assert_eq!(json_body(resp).await["status"], "id not known");
    }

    #[actix_web::test]
    async fn test_list_and_clear() {
        let app = app!(registry(None));
        for id in ["guest-b", "guest-a"] {
            test::call_service(&app, post("checkin", serde_json::json!({"id": id})).to_request()).await;
        }

        let req = test::TestRequest::get()
            .uri("/api/registry?action=registered-ids")
            .insert_header((API_TOKEN_HEADER, TOKEN))
            .to_request();
        let ids: Vec<String> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(ids, vec!["guest-a", "guest-b"]);

        let req = test::TestRequest::post()
            .uri("/api/registry?action=clear")
            .insert_header((API_TOKEN_HEADER, TOKEN))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let req = test::TestRequest::get()
            .uri("/api/registry?action=registered-ids")
            .insert_header((API_TOKEN_HEADER, TOKEN))
            .to_request();
        let ids: Vec<String> = test::call_and_read_body_json(&app, req).await;
        assert!(ids.is_empty());
    }

    #[actix_web::test]
    async fn test_wrong_method_and_unknown_action() {
        let app = app!(registry(None));

        let req = test::TestRequest::get()
            .uri("/api/registry?action=checkin")
            .insert_header((API_TOKEN_HEADER, TOKEN))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::METHOD_NOT_ALLOWED);

        let req = test::TestRequest::post()
            .uri("/api/registry?action=registered-ids")
            .insert_header((API_TOKEN_HEADER, TOKEN))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::METHOD_NOT_ALLOWED);

        for uri in ["/api/registry", "/api/registry?action=nope"] {
            let req = test::TestRequest::post()
                .uri(uri)
                .insert_header((API_TOKEN_HEADER, TOKEN))
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::NOT_FOUND);
            assert_eq!(json_body(resp).await["status"], "error");
        }
    }

    #[actix_web::test]
    async fn test_bad_credential_on_every_action_is_unauthorized() {
        let app = app!(registry(None));

        for (method, action) in [
            (Method::POST, "checkin"),
            (Method::GET, "registered-ids"),
            (Method::POST, "clear"),
            (Method::POST, "reject"),
            (Method::POST, "nope"),
        ] {
            let req = test::TestRequest::default()
                .method(method)
                .uri(&format!("/api/registry?action={}", action))
                .insert_header((API_TOKEN_HEADER, "wrong-token"))
                .set_json(serde_json::json!({"id": "guest-42", "reason": "x"}))
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::UNAUTHORIZED, "{}", action);
            assert_eq!(json_body(resp).await["status"], "error");
        }
    }
}
