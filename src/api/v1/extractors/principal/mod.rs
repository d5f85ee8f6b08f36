/*!
 * Capability-checked principal extractor
 *
 * Responsibility:
 * - middleware が extensions に入れた Principal を PermissionGate に通し、
 *   認可済みの TeamPrincipal を handler に渡す
 * - HTTP / axum 依存は core に閉じ込め、capability 別の型は types に分離する
 *
 * Public API:
 * - RequireRead / RequireWrite / RequireAdmin (Authorized<R> の alias)
 */

mod core;
mod types;

pub use self::types::*;
