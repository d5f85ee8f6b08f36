/*
 * Responsibility
 * - handler に渡す extractor の公開
 */
mod principal;

pub use principal::{RequireAdmin, RequireRead, RequireWrite};
