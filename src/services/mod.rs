/*
 * Responsibility
 * - ドメインロジック (認証/認可, 下流 API 転送, swagger 取得) の公開
 */
pub mod auth;
pub mod forward;
pub mod swagger;
