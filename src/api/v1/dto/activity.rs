/*
 * Responsibility
 * - activity log / statistics の DTO
 */
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::repos::ActivityRecord;

pub const DEFAULT_RECENT: i64 = 5;
pub const MAX_RECENT: i64 = 100;

#[derive(Debug, Deserialize)]
pub struct RecentActivityQuery {
    pub k: Option<i64>,
}

impl RecentActivityQuery {
    pub fn limit(&self) -> Result<i64, &'static str> {
        match self.k {
            None => Ok(DEFAULT_RECENT),
            Some(k) if (1..=MAX_RECENT).contains(&k) => Ok(k),
            Some(_) => Err("k must be between 1 and 100"),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ActivityResponse {
    pub uuid: Uuid,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

impl From<ActivityRecord> for ActivityResponse {
    fn from(a: ActivityRecord) -> Self {
        Self {
            uuid: a.log_id,
            message: a.message,
            timestamp: a.logged_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StatisticsResponse {
    pub registered_projects: i64,
}
