use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, HeaderValue, StatusCode},
    middleware::{self, Next},
    response::{Html, IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

pub const CSRF_COOKIE: &str = "CSRF-Token";
pub const CSRF_HEADER: &str = "X-CSRF-Token";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub display_name: String,
    pub receive_summary_email: bool,
}

impl Default for Account {
    fn default() -> Self {
        Self {
            display_name: "Account Holder".to_string(),
            receive_summary_email: false,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ChangeAccount {
    pub display_name: Option<String>,
    pub receive_summary_email: Option<bool>,
}

pub type Db = Arc<RwLock<Account>>;

pub fn app() -> Router {
    app_with(Account::default())
}

pub fn app_with(account: Account) -> Router {
    let db: Db = Arc::new(RwLock::new(account));
    let api = Router::new()
        .route("/account", get(get_account).patch(change_account))
        .layer(middleware::from_fn(check_csrf_token));
    Router::new()
        .route("/account", get(account_page))
        .nest("/api", api)
        .layer(middleware::from_fn(issue_csrf_cookie))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

/// Value of cookie `name` from the request's `Cookie` headers.
pub fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .find_map(|pair| {
            let (key, value) = pair.trim().split_once('=')?;
            (key == name).then(|| value.to_string())
        })
}

/// Hand out a CSRF cookie to any client that does not have one yet.
async fn issue_csrf_cookie(request: Request, next: Next) -> Response {
    let has_cookie = cookie_value(request.headers(), CSRF_COOKIE).is_some();
    let mut response = next.run(request).await;
    if !has_cookie {
        let token = Uuid::new_v4().simple().to_string();
        let cookie = format!("{CSRF_COOKIE}={token}; Path=/");
        if let Ok(value) = HeaderValue::from_str(&cookie) {
            response.headers_mut().append(header::SET_COOKIE, value);
        }
    }
    response
}

/// Reject API calls whose header token is missing or differs from the cookie.
async fn check_csrf_token(request: Request, next: Next) -> Response {
    let cookie = cookie_value(request.headers(), CSRF_COOKIE);
    let header = request
        .headers()
        .get(CSRF_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    match (header, cookie) {
        (Some(header), Some(cookie)) if !cookie.is_empty() && header == cookie => {
            next.run(request).await
        }
        _ => {
            tracing::warn!(path = %request.uri().path(), "rejecting request without CSRF token");
            (
                StatusCode::FORBIDDEN,
                Json(json!({"error": "missing CSRF token"})),
            )
                .into_response()
        }
    }
}

async fn account_page(State(db): State<Db>) -> Html<String> {
    let account = db.read().await;
    Html(format!(
        "<html><body><h1>Account</h1><input id=\"display-name-input\" value=\"{}\"></body></html>",
        escape_html(&account.display_name)
    ))
}

/// Escape text for use in HTML content or a quoted attribute.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}

async fn get_account(State(db): State<Db>) -> Json<Account> {
    Json(db.read().await.clone())
}

async fn change_account(
    State(db): State<Db>,
    Json(input): Json<ChangeAccount>,
) -> Result<Json<Value>, (StatusCode, Json<Value>)> {
    if input.display_name.is_none() && input.receive_summary_email.is_none() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(json!({"errors": {"account": ["No changes given."]}})),
        ));
    }
    if input.display_name.as_deref().is_some_and(|name| name.trim().is_empty()) {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(json!({"errors": {"display_name": ["This field is required."]}})),
        ));
    }

    let mut account = db.write().await;
    if let Some(name) = input.display_name {
        account.display_name = name;
    }
    if let Some(receive) = input.receive_summary_email {
        account.receive_summary_email = receive;
    }
    tracing::info!(
        display_name = %account.display_name,
        receive_summary_email = account.receive_summary_email,
        "account updated"
    );
    Ok(Json(json!({})))
}
