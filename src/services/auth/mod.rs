pub mod claims;
pub mod factory;
pub mod gate;
pub mod token;

pub use claims::{Capability, ClaimsParser, Principal, TeamPrincipal};
pub use factory::build_auth_service;
pub use gate::{Denied, PermissionGate};
pub use token::{AuthService, TokenError};
