use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, app_with, Account};
use serde_json::Value;
use tower::ServiceExt;

const TOKEN: &str = "abc123";

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn patch_account(body: &str, header_token: Option<&str>, cookie_token: Option<&str>) -> Request<String> {
    let mut builder = Request::builder()
        .method("PATCH")
        .uri("/api/account")
        .header(http::header::CONTENT_TYPE, "application/json");
    if let Some(token) = header_token {
        builder = builder.header("X-CSRF-Token", token);
    }
    if let Some(token) = cookie_token {
        builder = builder.header(http::header::COOKIE, format!("CSRF-Token={token}"));
    }
    builder.body(body.to_string()).unwrap()
}

fn get_account(token: &str) -> Request<String> {
    Request::builder()
        .uri("/api/account")
        .header("X-CSRF-Token", token)
        .header(http::header::COOKIE, format!("session=1; CSRF-Token={token}"))
        .body(String::new())
        .unwrap()
}

// --- CSRF cookie issuance ---

#[tokio::test]
async fn page_without_cookie_issues_csrf_cookie() {
    let resp = app()
        .oneshot(Request::builder().uri("/account").body(String::new()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let set_cookie = resp
        .headers()
        .get(http::header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(set_cookie.starts_with("CSRF-Token="));
    assert!(set_cookie.ends_with("; Path=/"));

    let content_type = resp.headers().get(http::header::CONTENT_TYPE).unwrap();
    assert!(content_type.to_str().unwrap().starts_with("text/html"));
    let body = body_bytes(resp).await;
    assert!(String::from_utf8_lossy(&body).contains("display-name-input"));
}

#[tokio::test]
async fn existing_cookie_is_not_replaced() {
    let resp = app().oneshot(get_account(TOKEN)).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.headers().get(http::header::SET_COOKIE).is_none());
}

// --- CSRF check ---

#[tokio::test]
async fn patch_without_header_is_forbidden() {
    let resp = app()
        .oneshot(patch_account(r#"{"display_name":"Ada"}"#, None, Some(TOKEN)))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    let body: Value = body_json(resp).await;
    assert_eq!(body["error"], "missing CSRF token");
}

#[tokio::test]
async fn patch_with_empty_header_and_no_cookie_is_forbidden() {
    let resp = app()
        .oneshot(patch_account(r#"{"display_name":"Ada"}"#, Some(""), None))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert!(resp.headers().get(http::header::SET_COOKIE).is_some());
}

#[tokio::test]
async fn patch_with_mismatched_token_is_forbidden() {
    let resp = app()
        .oneshot(patch_account(r#"{"display_name":"Ada"}"#, Some("other"), Some(TOKEN)))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

// --- account changes ---

#[tokio::test]
async fn get_account_returns_settings() {
    let account = Account {
        display_name: "Grace".to_string(),
        receive_summary_email: true,
    };
    let resp = app_with(account.clone()).oneshot(get_account(TOKEN)).await.unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers().get(http::header::CONTENT_TYPE).unwrap(),
        "application/json"
    );
    let fetched: Account = body_json(resp).await;
    assert_eq!(fetched, account);
}

#[tokio::test]
async fn empty_display_name_is_rejected() {
    let resp = app()
        .oneshot(patch_account(r#"{"display_name":""}"#, Some(TOKEN), Some(TOKEN)))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = body_json(resp).await;
    assert_eq!(body["errors"]["display_name"][0], "This field is required.");
}

#[tokio::test]
async fn empty_change_is_rejected() {
    let resp = app()
        .oneshot(patch_account("{}", Some(TOKEN), Some(TOKEN)))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn malformed_json_is_rejected() {
    let resp = app()
        .oneshot(patch_account(r#"{"receive_summary_email":"yes"}"#, Some(TOKEN), Some(TOKEN)))
        .await
        .unwrap();

    assert!(resp.status().is_client_error());
}

// --- full settings flow ---

#[tokio::test]
async fn change_settings_lifecycle() {
    use tower::Service;

    let mut app = app().into_service();

    // display name
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(patch_account(r#"{"display_name":"Ada"}"#, Some(TOKEN), Some(TOKEN)))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = body_json(resp).await;
    assert_eq!(body, serde_json::json!({}));

    // summary email opt-in
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(patch_account(r#"{"receive_summary_email":true}"#, Some(TOKEN), Some(TOKEN)))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    // both changes visible
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get_account(TOKEN))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let account: Account = body_json(resp).await;
    assert_eq!(account.display_name, "Ada");
    assert!(account.receive_summary_email);

    // rejected change leaves state alone
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(patch_account(r#"{"display_name":"  "}"#, Some(TOKEN), Some(TOKEN)))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get_account(TOKEN))
        .await
        .unwrap();
    let account: Account = body_json(resp).await;
    assert_eq!(account.display_name, "Ada");
}

#[tokio::test]
async fn account_page_escapes_display_name() {
    let account = Account {
        display_name: r#""><script>alert(1)</script>"#.to_string(),
        receive_summary_email: false,
    };
    let resp = app_with(account)
        .oneshot(Request::builder().uri("/account").body(String::new()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let html = String::from_utf8(body_bytes(resp).await.to_vec()).unwrap();
    assert!(!html.contains("<script>"));
    assert!(html.contains(
        r#"value="&quot;&gt;&lt;script&gt;alert(1)&lt;/script&gt;""#
    ));
}
