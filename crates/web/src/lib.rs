//! PVEGate Web Gateway
//!
//! Authenticated HTTP proxy in front of a Proxmox VE management API:
//! verifies the `token` cookie, enforces role/division authorization, and
//! forwards template-listing and VNC console-proxy calls upstream.

pub mod auth;
pub mod config;
pub mod proxmox;
pub mod server;
pub mod store;

pub use config::GatewayConfig;
pub use proxmox::{ProxmoxClient, ProxmoxConfig};
pub use server::GatewayState;
pub use store::RecordStore;
