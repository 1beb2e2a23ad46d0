//! Core record types shared between the gateway and its store

use serde::{Deserialize, Serialize};

/// Role carried by a verified credential and by user records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Admin,
    User,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::User => "USER",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "ADMIN" => Some(Role::Admin),
            "USER" => Some(Role::User),
            _ => None,
        }
    }
}

/// A managed server (one Proxmox VM)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerRecord {
    /// Proxmox VM id
    pub vmid: u32,
    pub name: String,
    /// Hypervisor node hosting the VM
    pub node: String,
    /// Owning division; non-admin access is scoped to it
    pub division: String,
    pub ip_address_id: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

/// An allocatable IP address record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IpAddressRecord {
    pub id: i64,
    pub address: String,
    pub gateway: Option<String>,
    /// VM currently holding this address, if any
    pub server_vmid: Option<u32>,
    pub updated_at: i64,
}

/// Partial update for an IP address record. `None` fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct IpAddressUpdate {
    pub address: Option<String>,
    pub gateway: Option<String>,
    pub server_vmid: Option<u32>,
}

/// A gateway user with its division
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: i64,
    pub username: String,
    pub role: Role,
    pub division: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_serde_uses_uppercase() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"ADMIN\"");
        assert_eq!(
            serde_json::from_str::<Role>("\"USER\"").unwrap(),
            Role::User
        );
        assert!(serde_json::from_str::<Role>("\"root\"").is_err());
    }

    #[test]
    fn test_role_parse_round_trip() {
        for role in [Role::Admin, Role::User] {
            assert_eq!(Role::parse(role.as_str()), Some(role));
        }
        assert_eq!(Role::parse("admin"), None);
    }
}
