mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};

use common::*;

#[tokio::test]
async fn anonymous_page_redirects_to_login_with_path() {
    let upstream = spawn_upstream().await;
    let app = build_app(&upstream);

    let res = get_anonymous(&app, "/entities/products").await;

    assert_eq!(res.status, StatusCode::SEE_OTHER);
    assert_eq!(res.location(), Some("/login?redirect=%2Fentities%2Fproducts"));
    assert!(upstream.requests_to("/instances").is_empty());
}

#[tokio::test]
async fn anonymous_api_call_is_unauthorized_json() {
    let upstream = spawn_upstream().await;
    let app = build_app(&upstream);

    let res = get_anonymous(&app, "/api/entities").await;

    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
    assert_eq!(res.json()["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn public_routes_need_no_session() {
    let upstream = spawn_upstream().await;
    let app = build_app(&upstream);

    let health = get_anonymous(&app, "/health").await;
    assert_eq!(health.status, StatusCode::OK);
    assert_eq!(health.json()["data"]["status"], "ok");

    let login = get_anonymous(&app, "/login?error=auth_failed&passwordUpdated=true").await;
    assert_eq!(login.status, StatusCode::OK);
    assert!(login.body.contains("Authentication failed. Please try again."));
    assert!(login.body.contains("Password updated successfully!"));

    let reset = get_anonymous(&app, "/auth/reset-password?error=invalid_token").await;
    assert_eq!(reset.status, StatusCode::OK);
    assert!(reset.body.contains("invalid or has expired"));
}

#[tokio::test]
async fn callback_exchanges_code_and_sets_session_cookie() {
    let upstream = spawn_upstream().await;
    let app = build_app(&upstream);

    let res = get_anonymous(&app, &format!("/auth/callback?code={}&next=%2Fentities%2Fproducts", VALID_CODE)).await;

    assert_eq!(res.status, StatusCode::SEE_OTHER);
    assert_eq!(res.location(), Some("/entities/products"));
    let cookie = res.headers.get("set-cookie").unwrap().to_str().unwrap();
    assert!(cookie.starts_with(&format!("session={};", SESSION_TOKEN)), "{}", cookie);
    assert_eq!(upstream.requests_to("/auth/exchange").len(), 1);
}

#[tokio::test]
async fn failed_exchange_goes_back_to_login() {
    let upstream = spawn_upstream().await;
    let app = build_app(&upstream);

    let res = get_anonymous(&app, "/auth/callback?code=stale&next=/profile").await;

    assert_eq!(res.status, StatusCode::SEE_OTHER);
    assert_eq!(res.location(), Some("/login?error=auth_failed"));
    assert!(res.headers.get("set-cookie").is_none());
}

#[tokio::test]
async fn recovery_without_session_is_invalid_token() {
    let upstream = spawn_upstream().await;
    let app = build_app(&upstream);

    let res = get_anonymous(&app, "/auth/callback?type=recovery").await;
    assert_eq!(res.location(), Some("/auth/reset-password?error=invalid_token"));

    let request = Request::builder()
        .uri("/auth/callback?next=/auth/reset-password")
        .header("cookie", format!("session={}", SESSION_TOKEN))
        .body(Body::empty())
        .unwrap();
    let res = send(&app, request).await;
    assert_eq!(res.location(), Some("/auth/reset-password"));
}

#[tokio::test]
async fn offsite_next_is_ignored() {
    let upstream = spawn_upstream().await;
    let app = build_app(&upstream);

    let res = get_anonymous(&app, &format!("/auth/callback?code={}&next=https://evil.test", VALID_CODE)).await;

    assert_eq!(res.location(), Some("/"));
}

#[tokio::test]
async fn session_cookie_identifies_user() {
    let upstream = spawn_upstream().await;
    let app = build_app(&upstream);

    let request = Request::builder()
        .uri("/profile")
        .header("cookie", format!("theme=dark; session={}", SESSION_TOKEN))
        .body(Body::empty())
        .unwrap();
    let res = send(&app, request).await;

    assert_eq!(res.status, StatusCode::OK);
    assert!(res.body.contains("ada@example.com"));
    assert!(res.body.contains("Ada Lovelace"));

    let request = Request::builder()
        .uri("/profile")
        .header("cookie", "session=expired")
        .body(Body::empty())
        .unwrap();
    let res = send(&app, request).await;
    assert_eq!(res.status, StatusCode::SEE_OTHER);
}

#[tokio::test]
async fn logout_expires_cookie() {
    let upstream = spawn_upstream().await;
    let app = build_app(&upstream);

    let res = get_anonymous(&app, "/logout").await;

    assert_eq!(res.location(), Some("/login"));
    let cookie = res.headers.get("set-cookie").unwrap().to_str().unwrap();
    assert!(cookie.contains("Max-Age=0"));
}
