/*
 * Responsibility
 * - v1 handler の束ね
 * - scope: token の active team → TeamScope / TeamRecord の解決 (handler 共通)
 */
pub mod activity;
pub mod health;
pub mod projects;
pub mod proxy;
pub mod swagger;
pub mod teams;

mod scope;
