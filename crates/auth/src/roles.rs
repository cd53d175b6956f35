use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Portal role of a principal.
///
/// The set is closed: anything the backend sends that is not one of the
/// named roles collapses to [`Role::Unrecognized`] and is routed like a
/// guest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Admin,
    Recruiter,
    Spoc,
    Student,
    Unauthenticated,
    Unrecognized,
}

/// Path prefixes owned by a portal role.
pub const RESERVED_PREFIXES: [&str; 4] = ["/admin", "/recruiter", "/spoc", "/student"];

impl Role {
    /// Parse a role name, ignoring case and surrounding whitespace. Never fails.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "admin" => Role::Admin,
            "recruiter" => Role::Recruiter,
            "spoc" => Role::Spoc,
            "student" => Role::Student,
            "" | "unauthenticated" => Role::Unauthenticated,
            _ => Role::Unrecognized,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Recruiter => "recruiter",
            Role::Spoc => "spoc",
            Role::Student => "student",
            Role::Unauthenticated => "unauthenticated",
            Role::Unrecognized => "unrecognized",
        }
    }

    /// The path prefix this role owns, if any.
    pub fn reserved_prefix(&self) -> Option<&'static str> {
        match self {
            Role::Admin => Some("/admin"),
            Role::Recruiter => Some("/recruiter"),
            Role::Spoc => Some("/spoc"),
            Role::Student => Some("/student"),
            Role::Unauthenticated | Role::Unrecognized => None,
        }
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for Role {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Role {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Role::parse(&raw))
    }
}
