use std::sync::Arc;

use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use cmsadmin_auth::SessionStore;
use cmsadmin_client::types::{LoginRequest, VerifyTotpRequest};
use cmsadmin_client::{AdminApi, ApiError, AuthError, AuthFlow, HttpAdminApi, LoginOutcome};
use cmsadmin_core::Preferences;

fn ok(data: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_json(json!({ "code": 0, "message": "success", "data": data }))
}

fn fail(code: i64, message: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "code": code, "message": message }))
}

async fn api(server: &MockServer) -> HttpAdminApi {
    HttpAdminApi::new(format!("{}/", server.uri())).expect("client")
}

#[tokio::test]
async fn login_posts_credentials_and_decodes_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .and(body_json(json!({ "username": "admin", "password": "secret", "tenant": "acme" })))
        .respond_with(ok(json!({ "token": "jwt-1", "require_totp": false })))
        .expect(1)
        .mount(&server)
        .await;

    let resp = api(&server)
        .await
        .login(&LoginRequest {
            username: "admin".into(),
            password: "secret".into(),
            tenant: Some("acme".into()),
        })
        .await
        .unwrap();
    assert_eq!(resp.token.as_deref(), Some("jwt-1"));
}

#[tokio::test]
async fn non_zero_code_is_rejected_with_the_backend_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/verify-totp"))
        .respond_with(fail(1007, "验证码错误"))
        .mount(&server)
        .await;

    let err = api(&server)
        .await
        .verify_totp(&VerifyTotpRequest {
            code: "1".into(),
            temp_token: "tmp".into(),
        })
        .await
        .unwrap_err();
    assert_eq!(err, ApiError::rejected(1007, "验证码错误"));
    assert_eq!(err.to_string(), "验证码错误");
}

#[tokio::test]
async fn http_401_maps_to_unauthorized() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/auth/user-info"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let err = api(&server).await.user_info("expired").await.unwrap_err();
    assert_eq!(err, ApiError::Unauthorized);
}

#[tokio::test]
async fn error_status_with_envelope_keeps_the_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/forgot-password"))
        .respond_with(
            ResponseTemplate::new(429).set_body_json(json!({ "code": 429, "message": "请求过于频繁" })),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/reset-password"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .mount(&server)
        .await;

    let api = api(&server).await;
    let err = api
        .forgot_password(&cmsadmin_client::types::ForgotPasswordRequest {
            email: "a@example.com".into(),
        })
        .await
        .unwrap_err();
    assert_eq!(err, ApiError::rejected(429, "请求过于频繁"));

    let err = api
        .reset_password(&cmsadmin_client::types::ResetPasswordRequest {
            email: "a@example.com".into(),
            code: "1".into(),
            new_password: "x".into(),
        })
        .await
        .unwrap_err();
    assert_eq!(err, ApiError::Http(502, "bad gateway".into()));
}

#[tokio::test]
async fn missing_data_is_a_parse_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "code": 0 })))
        .mount(&server)
        .await;

    let err = api(&server).await.refresh().await.unwrap_err();
    assert!(matches!(err, ApiError::Parse(_)));
}

#[tokio::test]
async fn full_flow_over_http_with_second_factor() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ok(json!({ "require_totp": true, "temp_token": "tmp-9" })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/verify-totp"))
        .and(body_json(json!({ "code": "654321", "temp_token": "tmp-9" })))
        .respond_with(ok(json!({ "token": "jwt-9" })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/auth/user-info"))
        .and(header("authorization", "Bearer jwt-9"))
        .respond_with(ok(json!({
            "id": 3, "username": "editor", "nickname": "",
            "roles": ["editor"], "permissions": ["cms:article:edit"]
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/menus/user"))
        .and(header("authorization", "Bearer jwt-9"))
        .respond_with(ok(json!([{
            "id": 10, "parentId": 0, "name": "cms", "path": "/cms",
            "redirect": "/cms/article",
            "meta": { "title": "Content", "icon": "lucide:book" },
            "children": [{ "id": 11, "parentId": 10, "name": "article", "path": "/cms/article",
                           "component": "/cms/article/index", "meta": { "keepAlive": false } }]
        }])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/logout"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let api = Arc::new(api(&server).await);
    let flow = AuthFlow::new(api, SessionStore::new(), Preferences::default());

    let outcome = flow.login("editor", "pw", None).await.unwrap();
    let LoginOutcome::SecondFactorRequired(challenge) = outcome else {
        panic!("expected a second-factor challenge");
    };
    assert!(flow.session().access_token().is_none());

    flow.verify_second_factor(&challenge, "654321").await.unwrap();
    let profile = flow.complete_login().await.unwrap();
    assert_eq!(profile.real_name, "editor");

    let menus = flow.session().access_menus();
    assert_eq!(menus[0].redirect.as_deref(), Some("/cms/article"));
    assert_eq!(menus[0].meta.title, "Content");
    assert_eq!(menus[0].children()[0].component, "/cms/article/index");
    assert!(!menus[0].children()[0].meta.keep_alive);
    assert!(flow.session().access_codes().contains_str("cms:article:edit"));

    flow.logout().await;
    assert!(!flow.session().is_authenticated());
    assert!(flow.session().access_menus().is_empty());
}

#[tokio::test]
async fn refresh_rejection_expires_the_session() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/refresh"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let store = SessionStore::new();
    store.begin("jwt-old".into());
    let flow = AuthFlow::new(Arc::new(api(&server).await), store, Preferences::default());

    let err = flow.refresh().await.unwrap_err();
    assert_eq!(err, AuthError::SessionExpired(ApiError::Unauthorized));
    assert!(flow.session().access_token().is_none());
}
