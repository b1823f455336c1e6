//! Request helper: method, then URL, then optional body, then send.
//!
//! # Design
//! `Requests` is an explicit value holding the configuration, the shared
//! cookie jar and a transport. `requests.method(m)` yields a reusable
//! `MethodBuilder`; `MethodBuilder::url` yields a one-shot `RequestHandle`.
//! `RequestHandle::send` consumes the handle, so a request is immutable once
//! issued, and runs the round trip on its own thread. The completion callback
//! fires exactly once with `(status, body)`, whatever the outcome.

use std::fmt;
use std::sync::Arc;
use std::thread::JoinHandle;

use serde::Serialize;

use crate::config::RequestConfig;
use crate::cookie::CookieJar;
use crate::error::ApiError;
use crate::http::{
    HttpMethod, HttpRequest, ParsedResponse, ResponseBody, APPLICATION_JSON, CONTENT_TYPE, COOKIE,
    SET_COOKIE,
};
use crate::transport::{Transport, UreqTransport};

#[derive(Clone)]
pub struct Requests {
    config: RequestConfig,
    cookies: CookieJar,
    transport: Arc<dyn Transport>,
}

impl fmt::Debug for Requests {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Requests")
            .field("config", &self.config)
            .field("cookies", &self.cookies)
            .finish_non_exhaustive()
    }
}

impl Requests {
    pub fn new(config: RequestConfig, cookies: CookieJar, transport: Arc<dyn Transport>) -> Self {
        Self {
            config,
            cookies,
            transport,
        }
    }

    /// Helper that talks to the network through `ureq`.
    pub fn with_ureq(config: RequestConfig, cookies: CookieJar) -> Self {
        Self::new(config, cookies, Arc::new(UreqTransport::new()))
    }

    pub fn config(&self) -> &RequestConfig {
        &self.config
    }

    pub fn cookies(&self) -> &CookieJar {
        &self.cookies
    }

    pub fn method(&self, method: HttpMethod) -> MethodBuilder {
        MethodBuilder {
            requests: self.clone(),
            method,
        }
    }

    pub fn get(&self, url: impl Into<String>) -> RequestHandle {
        self.method(HttpMethod::Get).url(url)
    }

    pub fn post(&self, url: impl Into<String>) -> RequestHandle {
        self.method(HttpMethod::Post).url(url)
    }

    pub fn put(&self, url: impl Into<String>) -> RequestHandle {
        self.method(HttpMethod::Put).url(url)
    }

    pub fn patch(&self, url: impl Into<String>) -> RequestHandle {
        self.method(HttpMethod::Patch).url(url)
    }

    pub fn delete(&self, url: impl Into<String>) -> RequestHandle {
        self.method(HttpMethod::Delete).url(url)
    }
}

/// A helper bound to one method; call `url` as many times as needed.
#[derive(Debug, Clone)]
pub struct MethodBuilder {
    requests: Requests,
    method: HttpMethod,
}

impl MethodBuilder {
    pub fn url(&self, url: impl Into<String>) -> RequestHandle {
        RequestHandle {
            requests: self.requests.clone(),
            method: self.method,
            url: url.into(),
            body: None,
        }
    }
}

/// A single request that has not been issued yet.
#[derive(Debug)]
pub struct RequestHandle {
    requests: Requests,
    method: HttpMethod,
    url: String,
    body: Option<String>,
}

impl RequestHandle {
    pub fn method(&self) -> HttpMethod {
        self.method
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Serialize `value` as the JSON body. Calling it again replaces the body.
    pub fn with_body<T: Serialize + ?Sized>(mut self, value: &T) -> Result<Self, ApiError> {
        let body = serde_json::to_string(value).map_err(ApiError::Encoding)?;
        self.body = Some(body);
        Ok(self)
    }

    /// The request exactly as `send` would issue it right now.
    ///
    /// With CSRF enabled the token header is attached for every method. A
    /// missing cookie yields an empty header value rather than an error.
    pub fn build(&self) -> HttpRequest {
        let mut headers = Vec::new();
        if let Some(csrf) = &self.requests.config.csrf {
            let token = self.requests.cookies.get(&csrf.cookie_name).unwrap_or_default();
            headers.push((csrf.header_name.clone(), token));
        }
        if self.body.is_some() {
            headers.push((CONTENT_TYPE.to_string(), APPLICATION_JSON.to_string()));
        }
        HttpRequest {
            method: self.method,
            url: self.url.clone(),
            headers,
            body: self.body.clone(),
        }
    }

    /// Issue the request and call `callback(status, body)` when it completes.
    ///
    /// The jar's cookies ride along in a `Cookie` header, as a page's would.
    /// The callback runs on the request's own thread. Dropping the returned
    /// `PendingRequest` does not cancel anything.
    pub fn send<F, R>(self, callback: F) -> PendingRequest<R>
    where
        F: FnOnce(u16, ResponseBody) -> R + Send + 'static,
        R: Send + 'static,
    {
        let mut request = self.build();
        let Requests {
            cookies, transport, ..
        } = self.requests;

        let cookie_header = cookies.cookie_string();
        if !cookie_header.is_empty() {
            request.headers.push((COOKIE.to_string(), cookie_header));
        }

        tracing::debug!(method = %request.method, url = %request.url, "issuing request");
        let handle = std::thread::spawn(move || {
            let response = transport.execute(&request);
            for set_cookie in response.header_values(SET_COOKIE) {
                cookies.store_set_cookie(set_cookie);
            }
            let parsed = ParsedResponse::from_http(response);
            tracing::debug!(
                method = %request.method,
                url = %request.url,
                status = parsed.status,
                "request completed"
            );
            callback(parsed.status, parsed.body)
        });

        PendingRequest { handle }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestState {
    Pending,
    Completed,
}

/// An issued request. Completed once its callback has returned.
#[derive(Debug)]
pub struct PendingRequest<R> {
    handle: JoinHandle<R>,
}

impl<R> PendingRequest<R> {
    pub fn state(&self) -> RequestState {
        if self.handle.is_finished() {
            RequestState::Completed
        } else {
            RequestState::Pending
        }
    }

    /// Block until the callback has run and return what it returned.
    pub fn wait(self) -> Result<R, ApiError> {
        self.handle.join().map_err(|_| ApiError::CallbackPanicked)
    }
}
