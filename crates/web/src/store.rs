//! Record store: the narrow relational collaborator.
//!
//! The gateway only needs three lookups around the proxy core (server by
//! vmid, user with division, IP-address update); insert helpers exist for
//! bootstrapping and tests. All queries run through the shared [`Database`]
//! handle injected at startup.

use rusqlite::{params, OptionalExtension};
use tracing::debug;

use pvegate_common::{
    Database, Error, IpAddressRecord, IpAddressUpdate, Result, Role, ServerRecord, UserRecord,
};

/// Typed query layer over the shared state database.
#[derive(Clone)]
pub struct RecordStore {
    db: Database,
}

impl RecordStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Look up a server record by Proxmox VM id.
    pub fn find_server(&self, vmid: u32) -> Result<Option<ServerRecord>> {
        let conn_arc = self.db.connection();
        let conn = conn_arc.lock();

        let row = conn
            .query_row(
                "SELECT vmid, name, node, division, ip_address_id, created_at, updated_at
                 FROM servers WHERE vmid = ?1",
                params![vmid],
                |row| {
                    Ok(ServerRecord {
                        vmid: row.get(0)?,
                        name: row.get(1)?,
                        node: row.get(2)?,
                        division: row.get(3)?,
                        ip_address_id: row.get(4)?,
                        created_at: row.get(5)?,
                        updated_at: row.get(6)?,
                    })
                },
            )
            .optional()?;

        Ok(row)
    }

    /// Look up a user and its division by id.
    pub fn find_user_with_division(&self, id: i64) -> Result<Option<UserRecord>> {
        let conn_arc = self.db.connection();
        let conn = conn_arc.lock();

        let row = conn
            .query_row(
                "SELECT id, username, role, division FROM users WHERE id = ?1",
                params![id],
                |row| {
                    let role: String = row.get(2)?;
                    Ok((
                        row.get::<_, i64>(0)?,
                        row.get::<_, String>(1)?,
                        role,
                        row.get::<_, String>(3)?,
                    ))
                },
            )
            .optional()?;

        match row {
            Some((id, username, role, division)) => {
                let role = Role::parse(&role)
                    .ok_or_else(|| Error::Internal(format!("unknown role in store: {role}")))?;
                Ok(Some(UserRecord {
                    id,
                    username,
                    role,
                    division,
                }))
            }
            None => Ok(None),
        }
    }

    /// Partially update an IP address record.
    ///
    /// Returns the updated record, or `None` when the id does not exist;
    /// absence is a lookup result, never a fault.
    pub fn update_ip_address(
        &self,
        id: i64,
        update: &IpAddressUpdate,
    ) -> Result<Option<IpAddressRecord>> {
        {
            let conn_arc = self.db.connection();
            let conn = conn_arc.lock();
            let now = chrono::Utc::now().timestamp();

            let changed = conn.execute(
                "UPDATE ip_addresses SET
                     address = COALESCE(?1, address),
                     gateway = COALESCE(?2, gateway),
                     server_vmid = COALESCE(?3, server_vmid),
                     updated_at = ?4
                 WHERE id = ?5",
                params![update.address, update.gateway, update.server_vmid, now, id],
            )?;

            if changed == 0 {
                return Ok(None);
            }
            debug!(id, "updated ip address record");
        }

        self.get_ip_address(id)
    }

    /// Fetch an IP address record by id.
    pub fn get_ip_address(&self, id: i64) -> Result<Option<IpAddressRecord>> {
        let conn_arc = self.db.connection();
        let conn = conn_arc.lock();

        let row = conn
            .query_row(
                "SELECT id, address, gateway, server_vmid, updated_at
                 FROM ip_addresses WHERE id = ?1",
                params![id],
                |row| {
                    Ok(IpAddressRecord {
                        id: row.get(0)?,
                        address: row.get(1)?,
                        gateway: row.get(2)?,
                        server_vmid: row.get(3)?,
                        updated_at: row.get(4)?,
                    })
                },
            )
            .optional()?;

        Ok(row)
    }

    /// Insert a server record.
    pub fn insert_server(&self, server: &ServerRecord) -> Result<()> {
        let conn_arc = self.db.connection();
        let conn = conn_arc.lock();

        conn.execute(
            "INSERT INTO servers (vmid, name, node, division, ip_address_id, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                server.vmid,
                server.name,
                server.node,
                server.division,
                server.ip_address_id,
                server.created_at,
                server.updated_at,
            ],
        )?;

        debug!(vmid = server.vmid, "inserted server record");
        Ok(())
    }

    /// Insert an IP address; returns the generated id.
    pub fn insert_ip_address(
        &self,
        address: &str,
        gateway: Option<&str>,
        server_vmid: Option<u32>,
    ) -> Result<i64> {
        let conn_arc = self.db.connection();
        let conn = conn_arc.lock();
        let now = chrono::Utc::now().timestamp();

        conn.execute(
            "INSERT INTO ip_addresses (address, gateway, server_vmid, updated_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![address, gateway, server_vmid, now],
        )?;

        Ok(conn.last_insert_rowid())
    }

    /// Insert a user; returns the generated id.
    pub fn insert_user(&self, username: &str, role: Role, division: &str) -> Result<i64> {
        let conn_arc = self.db.connection();
        let conn = conn_arc.lock();

        conn.execute(
            "INSERT INTO users (username, role, division) VALUES (?1, ?2, ?3)",
            params![username, role.as_str(), division],
        )?;

        Ok(conn.last_insert_rowid())
    }
}
