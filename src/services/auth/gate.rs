use crate::services::auth::claims::{Capability, Principal, TeamPrincipal};

/// Authorization failure naming the capability that was missing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("{} permission required", capitalize(.required.as_str()))]
pub struct Denied {
    pub required: Capability,
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Stateless pass/fail check run before every team- or admin-scoped operation.
pub struct PermissionGate;

impl PermissionGate {
    pub fn authorize(
        principal: &Principal,
        required: Capability,
    ) -> Result<&TeamPrincipal, Denied> {
        match principal {
            Principal::Active(team) if team.permissions.grants(required) => Ok(team),
            _ => Err(Denied { required }),
        }
    }
}
