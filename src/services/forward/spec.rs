//! Building the downstream request from an inbound one.
//!
//! The target comes from the `swagger_url` header. Downstream services sit
//! behind the legacy swagger-ui convention, so the outbound `host` is the raw
//! IPv4 literal of the target and `referer` points at its swagger-ui page.
//! DNS hostnames are rejected.

use std::net::Ipv4Addr;

use axum::body::Bytes;
use axum::http::{HeaderMap, HeaderValue, Method, header};
use url::{Host, Url};

/// Inbound header carrying the absolute downstream URL.
pub const TARGET_HEADER: &str = "swagger_url";

/// Local validation failures; no network call has been made when these occur.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ForwardError {
    #[error("Missing 'swagger_url' in headers")]
    MissingTarget,
    #[error("Invalid 'swagger_url' format")]
    InvalidTargetFormat,
    #[error("Invalid JSON payload")]
    InvalidPayload,
}

#[derive(Debug, Clone)]
pub struct ForwardSpec {
    pub method: Method,
    pub target_url: Url,
    pub headers: HeaderMap,
    pub body: Option<Bytes>,
}

impl ForwardSpec {
    /// Reads the target from the inbound `swagger_url` header.
    pub fn from_inbound(
        method: Method,
        inbound: &HeaderMap,
        body: Bytes,
    ) -> Result<Self, ForwardError> {
        let target = match inbound.get(TARGET_HEADER) {
            None => return Err(ForwardError::MissingTarget),
            Some(value) => value
                .to_str()
                .map_err(|_| ForwardError::InvalidTargetFormat)?,
        };
        Self::build(method, target, inbound, body)
    }

    pub fn build(
        method: Method,
        target: &str,
        inbound: &HeaderMap,
        body: Bytes,
    ) -> Result<Self, ForwardError> {
        let target = target.trim();
        if target.is_empty() {
            return Err(ForwardError::MissingTarget);
        }

        let target_url = Url::parse(target).map_err(|_| ForwardError::InvalidTargetFormat)?;
        if !matches!(target_url.scheme(), "http" | "https") {
            return Err(ForwardError::InvalidTargetFormat);
        }
        let host = ipv4_host(&target_url).ok_or(ForwardError::InvalidTargetFormat)?;

        let body = (!body.is_empty()).then_some(body);
        if method == Method::DELETE
            && let Some(payload) = &body
            && serde_json::from_slice::<serde::de::IgnoredAny>(payload).is_err()
        {
            return Err(ForwardError::InvalidPayload);
        }

        let headers = rewrite_headers(inbound, host, body.as_ref());

        Ok(Self {
            method,
            target_url,
            headers,
            body,
        })
    }
}

pub fn ipv4_host(url: &Url) -> Option<Ipv4Addr> {
    match url.host()? {
        Host::Ipv4(ip) => Some(ip),
        Host::Ipv6(_) | Host::Domain(_) => None,
    }
}

pub fn swagger_ui_referer(host: Ipv4Addr) -> String {
    format!("http://{host}/swagger-ui/index.html")
}

// Hop-by-hop headers describe the inbound connection only. The body is
// already buffered, so framing is re-derived from its length.
const HOP_BY_HOP: [header::HeaderName; 6] = [
    header::CONNECTION,
    header::TE,
    header::TRAILER,
    header::TRANSFER_ENCODING,
    header::UPGRADE,
    header::PROXY_AUTHORIZATION,
];

fn rewrite_headers(inbound: &HeaderMap, host: Ipv4Addr, body: Option<&Bytes>) -> HeaderMap {
    let mut headers = inbound.clone();
    for name in HOP_BY_HOP {
        headers.remove(name);
    }
    headers.remove("keep-alive");
    headers.remove("proxy-connection");
    headers.remove(header::HOST);
    headers.remove(header::CONTENT_LENGTH);
    // The client negotiates its own encoding and decodes the response before it is read.
    headers.remove(header::ACCEPT_ENCODING);

    // Both values are built from an Ipv4Addr, so they are always valid header values.
    if let Ok(value) = HeaderValue::from_str(&host.to_string()) {
        headers.insert(header::HOST, value);
    }
    if let Ok(value) = HeaderValue::from_str(&swagger_ui_referer(host)) {
        headers.insert(header::REFERER, value);
    }
    if let Some(body) = body {
        headers.insert(header::CONTENT_LENGTH, HeaderValue::from(body.len()));
    }
    headers
}
