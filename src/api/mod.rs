/*
 * Responsibility
 * - API バージョンの束ね (現在は v1 のみ)
 */
pub mod v1;
