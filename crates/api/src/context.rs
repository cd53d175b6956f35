use placemate_auth::Role;
use placemate_core::PrincipalId;

/// Verified access-token identity for a request.
///
/// Inserted by the session middleware; the role is as of token issue.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct SessionContext {
    principal_id: PrincipalId,
    role: Role,
}

impl SessionContext {
    pub fn new(principal_id: PrincipalId, role: Role) -> Self {
        Self { principal_id, role }
    }

    pub fn principal_id(&self) -> PrincipalId {
        self.principal_id
    }

    pub fn role(&self) -> Role {
        self.role
    }
}
