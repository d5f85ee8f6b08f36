use std::{error::Error as StdError, time::Duration};

use axum::body::Bytes;
use axum::http::{HeaderMap, Method};
use tracing::{debug, warn};

use crate::services::forward::{ForwardError, ForwardResult, ForwardSpec};

/// Issues exactly one downstream call per inbound request.
///
/// Holds only a `reqwest::Client` (connection pool, internally `Arc`), so it is
/// cheap to clone and shares no per-call state. Calls are awaited in the
/// caller's task: dropping the inbound request drops the downstream call.
#[derive(Clone, Debug)]
pub struct Forwarder {
    client: reqwest::Client,
}

impl Forwarder {
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::none())
            // downstream services are addressed by raw IPv4, never through a proxy
            .no_proxy()
            .build()?;

        Ok(Self { client })
    }

    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    /// Validate the inbound request, then execute it.
    pub async fn forward(
        &self,
        method: Method,
        inbound_headers: &HeaderMap,
        inbound_body: Bytes,
    ) -> Result<ForwardResult, ForwardError> {
        let spec = ForwardSpec::from_inbound(method, inbound_headers, inbound_body)?;
        Ok(self.execute(spec).await)
    }

    pub async fn execute(&self, spec: ForwardSpec) -> ForwardResult {
        let ForwardSpec {
            method,
            target_url,
            headers,
            body,
        } = spec;

        debug!(method = %method, target = %target_url, "forwarding request");

        let mut request = self
            .client
            .request(method.clone(), target_url.clone())
            .headers(headers);
        if let Some(body) = body {
            request = request.body(body);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(err) => {
                let error = describe(&err);
                warn!(method = %method, target = %target_url, error = %error, "downstream transport failure");
                return ForwardResult::transport_failed(error);
            }
        };

        let status = response.status();
        let text = match response.text().await {
            Ok(text) => text,
            Err(err) => {
                let error = describe(&err);
                warn!(method = %method, target = %target_url, error = %error, "failed to read downstream body");
                return ForwardResult::transport_failed(error);
            }
        };

        if !status.is_success() {
            warn!(method = %method, target = %target_url, status = %status, "downstream returned error status");
        }
        ForwardResult::from_upstream(status, &text)
    }
}

// "Request failed: <error>: <cause>: ..." without any backtrace.
fn describe(err: &reqwest::Error) -> String {
    let mut message = format!("Request failed: {err}");
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
