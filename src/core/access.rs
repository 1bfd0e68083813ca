//! Roles and the tariff-table capability they grant

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Workspace roles
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum, PartialOrd, Ord,
)]
#[serde(rename_all = "snake_case")]
#[value(rename_all = "snake_case")]
pub enum Role {
    #[default]
    Viewer,
    Staff,
    Admin,
    SuperAdmin,
}

impl Role {
    /// Capability this role has over the global tariff table.
    /// Only a super admin may change rates or locks.
    pub fn tariff_access(&self) -> TariffAccess {
        match self {
            Role::SuperAdmin => TariffAccess::ReadWrite,
            Role::Admin | Role::Staff | Role::Viewer => TariffAccess::ReadOnly,
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Viewer => write!(f, "viewer"),
            Role::Staff => write!(f, "staff"),
            Role::Admin => write!(f, "admin"),
            Role::SuperAdmin => write!(f, "super_admin"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "viewer" => Ok(Role::Viewer),
            "staff" => Ok(Role::Staff),
            "admin" => Ok(Role::Admin),
            "super_admin" | "superadmin" => Ok(Role::SuperAdmin),
            _ => Err(format!(
                "Unknown role: {}. Use viewer, staff, admin, or super_admin",
                s
            )),
        }
    }
}

/// What a caller may do with the tariff table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TariffAccess {
    #[default]
    ReadOnly,
    ReadWrite,
}

impl TariffAccess {
    pub fn can_write(&self) -> bool {
        matches!(self, TariffAccess::ReadWrite)
    }
}

impl std::fmt::Display for TariffAccess {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TariffAccess::ReadOnly => write!(f, "read-only"),
            TariffAccess::ReadWrite => write!(f, "read-write"),
        }
    }
}
