use crate::auth::{CallerIdentity, CredentialError};

/// PrivilegeLevel
///
/// Authorization tier of a caller. Variant order is the privilege order, so a new
/// role is added by inserting a variant at its rank; policy code only ever compares.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum PrivilegeLevel {
    Anonymous,
    User,
    Moderator,
    Admin,
}

impl PrivilegeLevel {
    pub const ALL: [PrivilegeLevel; 4] = [
        PrivilegeLevel::Anonymous,
        PrivilegeLevel::User,
        PrivilegeLevel::Moderator,
        PrivilegeLevel::Admin,
    ];

    /// Maps a stored role to its tier. Unknown roles are plain users.
    pub fn from_role(role: &str) -> Self {
        match role {
            "admin" => PrivilegeLevel::Admin,
            "moderator" => PrivilegeLevel::Moderator,
            _ => PrivilegeLevel::User,
        }
    }

    /// True when this level meets `required`.
    pub fn satisfies(self, required: PrivilegeLevel) -> bool {
        self >= required
    }
}

/// classify
///
/// Turns the identity resolved by the authentication layer into a privilege level.
/// A credential that was presented but could not be used is an error here: it is
/// never downgraded to `Anonymous`.
pub fn classify(identity: &CallerIdentity) -> Result<PrivilegeLevel, CredentialError> {
    match identity {
        CallerIdentity::Anonymous => Ok(PrivilegeLevel::Anonymous),
        CallerIdentity::Authenticated(user) => Ok(PrivilegeLevel::from_role(&user.role)),
        CallerIdentity::InvalidCredential(err) => Err(err.clone()),
    }
}
