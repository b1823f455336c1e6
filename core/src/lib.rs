//! Request helper for account-settings calls.
//!
//! # Overview
//! `Requests` builds one HTTP request for a method and URL, optionally with
//! a JSON body and a CSRF token header read from a cookie, issues it on its
//! own thread and calls back once with `(status, body)`. `AccountClient`
//! uses it to change the display name and the summary-email opt-in, and
//! applies each outcome to the matching form control.
//!
//! # Design
//! - The helper is an explicit value; nothing is registered globally.
//! - CSRF support is a `RequestConfig` option, not a separate helper.
//! - `send` never fails. Status interpretation happens at the call site
//!   (`account::check_status`).
//! - Network I/O sits behind the `Transport` trait; `UreqTransport` is the
//!   default and tests substitute their own.

pub mod account;
pub mod builder;
pub mod config;
pub mod cookie;
pub mod error;
pub mod form;
pub mod http;
pub mod transport;
pub mod types;

pub use account::AccountClient;
pub use builder::{MethodBuilder, PendingRequest, RequestHandle, RequestState, Requests};
pub use config::{CsrfConfig, RequestConfig};
pub use cookie::{read_cookie, CookieJar};
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse, ParsedResponse, ResponseBody};
pub use transport::{Transport, UreqTransport};
pub use types::{Account, ChangeAccount};
