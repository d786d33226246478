use actix_web::body::to_bytes;
use actix_web::http::StatusCode;
use actix_web::{App, HttpResponse, test, web};
use chrono::Utc;
use pointhub_backend::config::ReferralConfig;
use pointhub_backend::database::DbPool;
use pointhub_backend::entities::users::{self, UserStatus};
use pointhub_backend::handlers;
use pointhub_backend::middlewares::AuthMiddleware;
use pointhub_backend::services::{AuthService, AuthUser, AuthzService, ReferralService};
use pointhub_backend::swagger::swagger_config;
use pointhub_backend::utils::JwtService;
use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase};
use serde_json::{Value, json};
use std::sync::Arc;

fn jwt() -> JwtService {
    JwtService::new("integration-secret", 3600, 7200)
}

fn offline() -> DbPool {
    Arc::new(DatabaseConnection::Disconnected)
}

fn user(id: i64) -> users::Model {
    users::Model {
        id,
        name: "alice".to_string(),
        email: "alice@example.com".to_string(),
        password_hash: "x".to_string(),
        role_id: 2,
        status: UserStatus::Active,
        balance: 0,
        ton_balance: 0,
        referral_code: "ABCD1234".to_string(),
        referrer_id: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
        deleted_at: None,
    }
}

async fn whoami(user: AuthUser) -> HttpResponse {
    HttpResponse::Ok().json(json!({ "success": true, "data": { "id": user.id } }))
}

async fn pong() -> HttpResponse {
    HttpResponse::Ok().json(json!({ "success": true, "data": "pong" }))
}

macro_rules! init_app {
    ($authz:expr) => {
        test::init_service(
            App::new()
                .wrap(AuthMiddleware::new(jwt(), $authz.clone()))
                .configure(swagger_config)
                .service(
                    web::scope("/api/v1")
                        .route("/auth/login", web::post().to(pong))
                        .route("/metadata/ping", web::get().to(pong))
                        .route("/whoami", web::get().to(whoami))
                        .configure(handlers::wheel_config),
                ),
        )
        .await
    };
}

#[actix_web::test]
async fn test_missing_token_is_unauthorized() {
    let authz = AuthzService::new(offline());
    let app = init_app!(authz);

    let req = test::TestRequest::get().uri("/api/v1/wheels").to_request();
    let err = match test::try_call_service(&app, req).await {
        Ok(_) => panic!("request without token should be rejected"),
        Err(e) => e,
    };
    assert_eq!(err.as_response_error().status_code(), StatusCode::UNAUTHORIZED);

    let resp = err.error_response();
    let body: Value = serde_json::from_slice(&to_bytes(resp.into_body()).await.unwrap()).unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "AUTH_ERROR");
}

#[actix_web::test]
async fn test_public_paths_pass_without_token() {
    let authz = AuthzService::new(offline());
    let app = init_app!(authz);

    let req = test::TestRequest::post().uri("/api/v1/auth/login").to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let req = test::TestRequest::get().uri("/api/v1/metadata/ping").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body, json!({ "success": true, "data": "pong" }));
}

#[actix_web::test]
async fn test_refresh_accepts_expired_access_token() {
    // 两次刷新各读取一次用户
    let pool: DbPool = Arc::new(
        MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![user(42)], vec![user(42)]])
            .into_connection(),
    );
    let auth = AuthService::new(
        pool.clone(),
        jwt(),
        ReferralService::new(pool.clone(), ReferralConfig::default()),
    );
    let authz = AuthzService::new(pool);
    let app = test::init_service(
        App::new()
            .wrap(AuthMiddleware::new(jwt(), authz))
            .app_data(web::Data::new(auth))
            .service(web::scope("/api/v1").configure(handlers::auth_config)),
    )
    .await;

    let expired = JwtService::new("integration-secret", -600, 7200)
        .generate_access_token(42, 2)
        .unwrap();
    let refresh_token = jwt().generate_refresh_token(42, 2).unwrap();

    let req = test::TestRequest::post()
        .uri("/api/v1/auth/refresh")
        .insert_header(("Authorization", format!("Bearer {expired}")))
        .set_json(json!({ "refresh_token": refresh_token }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["success"], true);
    let access = body["data"]["access_token"].as_str().unwrap();
    assert_eq!(jwt().verify_access_token(access).unwrap().user_id().unwrap(), 42);

    // 不带 Authorization 也只依赖 refresh_token
    let req = test::TestRequest::post()
        .uri("/api/v1/auth/refresh")
        .set_json(json!({ "refresh_token": refresh_token }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn test_refresh_rejects_access_token_in_body() {
    let authz = AuthzService::new(offline());
    let auth = AuthService::new(
        offline(),
        jwt(),
        ReferralService::new(offline(), ReferralConfig::default()),
    );
    let app = test::init_service(
        App::new()
            .wrap(AuthMiddleware::new(jwt(), authz))
            .app_data(web::Data::new(auth))
            .service(web::scope("/api/v1").configure(handlers::auth_config)),
    )
    .await;

    let access = jwt().generate_access_token(42, 2).unwrap();
    let req = test::TestRequest::post()
        .uri("/api/v1/auth/refresh")
        .set_json(json!({ "refresh_token": access }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_valid_token_reaches_handler() {
    let authz = AuthzService::new(offline());
    let app = init_app!(authz);
    let token = jwt().generate_access_token(42, 2).unwrap();

    let req = test::TestRequest::get()
        .uri("/api/v1/whoami")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["id"], 42);
}

#[actix_web::test]
async fn test_refresh_token_is_not_an_access_token() {
    let authz = AuthzService::new(offline());
    let app = init_app!(authz);
    let token = jwt().generate_refresh_token(42, 2).unwrap();

    let req = test::TestRequest::get()
        .uri("/api/v1/whoami")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .to_request();
    let err = test::try_call_service(&app, req).await.err().unwrap();
    assert_eq!(err.as_response_error().status_code(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_banned_user_is_forbidden() {
    let authz = AuthzService::new(offline());
    authz.ban(&[7]);
    let app = init_app!(authz);
    let token = jwt().generate_access_token(7, 2).unwrap();

    let req = test::TestRequest::get()
        .uri("/api/v1/whoami")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .to_request();
    let err = test::try_call_service(&app, req).await.err().unwrap();
    assert_eq!(err.as_response_error().status_code(), StatusCode::FORBIDDEN);

    authz.unban(&[7]);
    let req = test::TestRequest::get()
        .uri("/api/v1/whoami")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn test_openapi_document_is_public() {
    let authz = AuthzService::new(offline());
    let app = init_app!(authz);

    let req = test::TestRequest::get()
        .uri("/api-docs/openapi.json")
        .to_request();
    let doc: Value = test::call_and_read_body_json(&app, req).await;
    assert!(doc["paths"]["/wheels/play"].is_object());
    assert!(doc["paths"]["/admin/swaps/{id}/rollback"].is_object());
    assert!(doc["components"]["securitySchemes"]["bearer_auth"].is_object());
}
