//! Superadmin gate for create/update/delete actions.

use crate::models::notice::Notice;
use crate::models::session::Session;

pub const SUPERADMIN_ROLE: &str = "superadmin";

/// Refusal from [`require_super_admin`]: where to send the browser and what
/// to tell the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessDenied {
    pub redirect_to: String,
    pub notice: Notice,
}

pub fn is_super_admin(session: &Session) -> bool {
    session
        .roles
        .iter()
        .any(|role| role.name.eq_ignore_ascii_case(SUPERADMIN_ROLE))
}

pub fn require_super_admin(session: &Session, redirect_to: &str) -> Result<(), AccessDenied> {
    if is_super_admin(session) {
        Ok(())
    } else {
        Err(AccessDenied {
            redirect_to: redirect_to.to_string(),
            notice: Notice::access_denied(),
        })
    }
}
