//! Executes `HttpRequest` values against the network.
//!
//! # Design
//! A `Transport` performs one blocking round trip and always returns a
//! response. Connection-level failures become status `0`, the same terminal
//! state the callback sees for any other outcome.

use crate::http::{HttpMethod, HttpRequest, HttpResponse};

pub trait Transport: Send + Sync {
    fn execute(&self, request: &HttpRequest) -> HttpResponse;
}

/// `Transport` backed by a `ureq` agent.
///
/// 4xx/5xx responses are returned as data rather than `Err` so status
/// interpretation stays with the caller.
#[derive(Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl UreqTransport {
    pub fn new() -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self { agent }
    }

    fn round_trip(&self, req: &HttpRequest) -> Result<HttpResponse, ureq::Error> {
        let url = req.url.as_str();
        let body = req.body.as_deref().map(str::as_bytes);

        let mut response = match req.method {
            HttpMethod::Get => with_headers(self.agent.get(url), req).call(),
            HttpMethod::Delete => match body {
                Some(bytes) => with_headers(self.agent.delete(url).force_send_body(), req).send(bytes),
                None => with_headers(self.agent.delete(url), req).call(),
            },
            HttpMethod::Post => send_body(with_headers(self.agent.post(url), req), body),
            HttpMethod::Put => send_body(with_headers(self.agent.put(url), req), body),
            HttpMethod::Patch => send_body(with_headers(self.agent.patch(url), req), body),
        }?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let body = response.body_mut().read_to_string()?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

fn with_headers<B>(mut builder: ureq::RequestBuilder<B>, req: &HttpRequest) -> ureq::RequestBuilder<B> {
    for (name, value) in &req.headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}

fn send_body(
    builder: ureq::RequestBuilder<ureq::typestate::WithBody>,
    body: Option<&[u8]>,
) -> Result<ureq::http::Response<ureq::Body>, ureq::Error> {
    match body {
        Some(bytes) => builder.send(bytes),
        None => builder.send_empty(),
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: &HttpRequest) -> HttpResponse {
        if request.body.is_some() && request.method == HttpMethod::Get {
            tracing::warn!(url = %request.url, "body dropped from GET request");
        }
        match self.round_trip(request) {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(method = %request.method, url = %request.url, "transport failure: {e}");
                HttpResponse::transport_failure()
            }
        }
    }
}
