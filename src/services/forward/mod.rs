//! Generic downstream request forwarder.
//!
//! `Idle → Validating → (Rejected) → Forwarding → (TransportFailed | UpstreamError | Success)`
//!
//! - `spec`: inbound → [`ForwardSpec`] (target validation, header rewrite)
//! - `client`: one downstream call per invocation, no retries
//! - `outcome`: normalization into [`ForwardResult`]

mod client;
mod outcome;
mod spec;

pub use client::Forwarder;
pub use outcome::ForwardResult;
pub use spec::{ForwardError, ForwardSpec, TARGET_HEADER};
