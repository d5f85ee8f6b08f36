/*
 * Responsibility
 * - middleware の公開インターフェース
 * - auth (Bearer 検証 → Principal), cors, http (request-id/limit/timeout/trace), security_headers
 */
pub mod auth;
pub mod cors;
pub mod http;
pub mod security_headers;
