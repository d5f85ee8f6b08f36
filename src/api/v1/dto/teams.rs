use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::repos::TeamRecord;

#[derive(Debug, Deserialize)]
pub struct CreateTeamRequest {
    pub team_name: String,
}

impl CreateTeamRequest {
    // Team names double as the `<team>` segment of claim keys.
    pub fn validate(&self) -> Result<&str, &'static str> {
        let name = self.team_name.trim();
        if name.is_empty() {
            return Err("team_name is required");
        }
        if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err("team_name may only contain letters, digits and '_'");
        }
        Ok(name)
    }
}

#[derive(Debug, Serialize)]
pub struct TeamResponse {
    pub team_id: Uuid,
    pub team_name: String,
}

impl From<TeamRecord> for TeamResponse {
    fn from(t: TeamRecord) -> Self {
        Self {
            team_id: t.team_id,
            team_name: t.team_name,
        }
    }
}
