//! Team-scoped permission extraction from a verified claim map.
//!
//! Claim keys look like `<namespace>.<team>.<capability>`, e.g.
//! `flipdocs.payments.write`. A single pass over the mapping builds a
//! [`TeamPermissionSet`]; keys that do not have exactly that shape are skipped.

use std::{fmt, str::FromStr};

use serde_json::{Map, Value};

/// A permission bit scoped to a team.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    Read,
    Write,
    Admin,
}

impl Capability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Write => "write",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Capability {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "read" => Ok(Self::Read),
            "write" => Ok(Self::Write),
            "admin" => Ok(Self::Admin),
            _ => Err(()),
        }
    }
}

/// Capability bits for one team. Bits never mentioned in the claims stay `false`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Permissions {
    pub admin: bool,
    pub read: bool,
    pub write: bool,
}

impl Permissions {
    fn set(&mut self, capability: Capability, value: bool) {
        match capability {
            Capability::Read => self.read = value,
            Capability::Write => self.write = value,
            Capability::Admin => self.admin = value,
        }
    }

    pub fn any(&self) -> bool {
        self.admin || self.read || self.write
    }

    /// `admin` implies `read` and `write`.
    pub fn grants(&self, required: Capability) -> bool {
        if self.admin {
            return true;
        }
        match required {
            Capability::Read => self.read,
            Capability::Write => self.write,
            Capability::Admin => false,
        }
    }
}

/// Team → permissions, kept in first-seen claim order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TeamPermissionSet {
    teams: Vec<(String, Permissions)>,
}

impl TeamPermissionSet {
    #[cfg(test)]
    pub fn get(&self, team: &str) -> Option<&Permissions> {
        self.teams
            .iter()
            .find(|(name, _)| name == team)
            .map(|(_, perms)| perms)
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.teams.len()
    }

    fn entry(&mut self, team: &str) -> &mut Permissions {
        let idx = match self.teams.iter().position(|(name, _)| name == team) {
            Some(idx) => idx,
            None => {
                self.teams.push((team.to_string(), Permissions::default()));
                self.teams.len() - 1
            }
        };
        &mut self.teams[idx].1
    }

    /// Selects the first team (claim order) holding at least one capability.
    ///
    /// Tokens spanning several teams still resolve to exactly one active team
    /// per request; the remaining grants are ignored.
    pub fn effective_principal(&self) -> Principal {
        self.teams
            .iter()
            .find(|(_, perms)| perms.any())
            .map(|(team, perms)| {
                Principal::Active(TeamPrincipal {
                    team: team.clone(),
                    permissions: *perms,
                })
            })
            .unwrap_or(Principal::NoActiveTeam)
    }
}

/// The active team a request is authorized as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TeamPrincipal {
    pub team: String,
    pub permissions: Permissions,
}

impl TeamPrincipal {
    pub fn is_admin(&self) -> bool {
        self.permissions.admin
    }

    /// Case-insensitive, matching how team names are looked up in the directory.
    pub fn belongs_to(&self, team_name: &str) -> bool {
        self.team.eq_ignore_ascii_case(team_name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Principal {
    Active(TeamPrincipal),
    NoActiveTeam,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ClaimsError {
    #[error("claims are not a key/value mapping")]
    NotAMapping,
}

#[derive(Debug, Clone)]
pub struct ClaimsParser {
    namespace: String,
}

impl ClaimsParser {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
        }
    }

    /// Locates the team grants inside a token payload (`roles.<namespace>`).
    pub fn scoped_claims<'a>(&self, claims: &'a Map<String, Value>) -> Option<&'a Value> {
        claims
            .get("roles")
            .and_then(|roles| roles.get(&self.namespace))
            .filter(|scoped| scoped.is_object())
    }

    pub fn parse(&self, raw: &Value) -> Result<TeamPermissionSet, ClaimsError> {
        let map = raw.as_object().ok_or(ClaimsError::NotAMapping)?;

        let mut set = TeamPermissionSet::default();
        for (key, value) in map {
            if let Some((team, capability)) = self.match_key(key) {
                set.entry(team).set(capability, coerce_bool(value));
            }
        }
        Ok(set)
    }

    fn match_key<'k>(&self, key: &'k str) -> Option<(&'k str, Capability)> {
        let mut segments = key.split('.');
        let (namespace, team, capability) = (segments.next()?, segments.next()?, segments.next()?);
        if segments.next().is_some() || namespace != self.namespace {
            return None;
        }
        if team.is_empty() || !team.chars().all(|c| c.is_alphanumeric() || c == '_') {
            return None;
        }
        let capability = capability.parse().ok()?;
        Some((team, capability))
    }
}

// Strings only count when they spell a truthy literal.
fn coerce_bool(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => matches!(
            s.trim().to_ascii_lowercase().as_str(),
            "true" | "1" | "yes"
        ),
        _ => false,
    }
}
