pub mod activity;
pub mod projects;
pub mod teams;
