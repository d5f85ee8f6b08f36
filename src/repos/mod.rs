/*
 * Responsibility
 * - プロジェクト/チーム/アクティビティの永続化 (ProjectDirectory)
 * - Postgres 実装と、テスト用のインメモリ実装
 */
pub mod directory;
pub mod error;
pub mod postgres;

#[cfg(test)]
pub mod memory;

pub use directory::{
    ActivityRecord, Environment, ProjectDirectory, ProjectFields, ProjectRecord, TeamRecord,
    TeamScope,
};
pub use error::RepoError;
pub use postgres::PgDirectory;
