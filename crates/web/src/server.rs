//! Gateway server: router, handlers, and startup.

use std::sync::Arc;

use axum::{
    extract::rejection::JsonRejection,
    extract::{Path, State},
    middleware,
    routing::{get, post, put},
    Extension, Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use pvegate_common::{Database, Envelope, Error, IpAddressUpdate, Result, Role};

use crate::auth::{require_roles, AuthenticatedClaims, TokenCodec};
use crate::config::GatewayConfig;
use crate::proxmox::ProxmoxClient;
use crate::store::RecordStore;

/// Roles allowed to reach the upstream proxy routes.
const PROXY_ROLES: &[Role] = &[Role::Admin, Role::User];
/// Roles allowed on the record administration routes.
const ADMIN_ROLES: &[Role] = &[Role::Admin];

/// Shared gateway state.
///
/// Everything here is immutable process configuration or a handle that is
/// safe to use concurrently; requests share no mutable state.
pub struct GatewayState {
    pub codec: TokenCodec,
    pub proxmox: ProxmoxClient,
    pub store: RecordStore,
}

/// Open the database, build the state, and run the gateway.
pub async fn serve(cfg: GatewayConfig) -> anyhow::Result<()> {
    if let Some(parent) = cfg.db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let db = Database::open(&cfg.db_path)?;

    let state = Arc::new(GatewayState {
        codec: TokenCodec::new(&cfg.jwt_secret),
        proxmox: ProxmoxClient::new(cfg.proxmox.clone())?,
        store: RecordStore::new(db),
    });

    info!("Gateway listening on http://{}", cfg.addr);

    let listener = tokio::net::TcpListener::bind(cfg.addr).await?;
    axum::serve(listener, router(state)).await?;

    Ok(())
}

/// Create router
pub fn router(state: Arc<GatewayState>) -> Router {
    // Upstream proxy routes. The guard is mandatory here: a proxy route
    // reachable without it is a security gap.
    let proxy_routes = Router::new()
        .route("/proxmox/templates", get(list_templates_handler))
        .route("/proxmox/vnc", post(vnc_proxy_handler))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_roles(PROXY_ROLES),
        ));

    // Record administration routes (narrow store surface)
    let record_routes = Router::new()
        .route("/api/servers/:vmid", get(get_server_handler))
        .route("/api/users/:id", get(get_user_handler))
        .route("/api/ips/:id", put(update_ip_address_handler))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_roles(ADMIN_ROLES),
        ));

    Router::new()
        .route("/api/health", get(health_handler))
        .merge(proxy_routes)
        .merge(record_routes)
        .fallback(not_found_handler)
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ============================================================================
// Handlers
// ============================================================================

async fn health_handler() -> Envelope {
    Envelope::success(
        "service healthy",
        json!({
            "service": "pvegate-web",
            "version": pvegate_common::VERSION,
        }),
    )
}

async fn not_found_handler() -> Envelope {
    Envelope::failure("route not found", axum::http::StatusCode::NOT_FOUND)
}

async fn list_templates_handler(State(state): State<Arc<GatewayState>>) -> Result<Envelope> {
    let members = state.proxmox.list_templates().await?;
    Ok(Envelope::success("templates fetched", members))
}

#[derive(Debug, Deserialize)]
struct VncProxyRequest {
    vmid: Option<u32>,
    node: Option<String>,
}

async fn vnc_proxy_handler(
    State(state): State<Arc<GatewayState>>,
    Extension(AuthenticatedClaims(claims)): Extension<AuthenticatedClaims>,
    payload: std::result::Result<Json<VncProxyRequest>, JsonRejection>,
) -> Result<Envelope> {
    let Json(req) = payload.map_err(|e| Error::Validation(e.body_text()))?;

    let vmid = req
        .vmid
        .ok_or_else(|| Error::Validation("vmid is required".into()))?;
    let node = req
        .node
        .filter(|n| !n.trim().is_empty())
        .ok_or_else(|| Error::Validation("node is required".into()))?;

    let server = state
        .store
        .find_server(vmid)?
        .ok_or_else(|| Error::not_found("server", vmid))?;

    // Non-admin access is scoped to the caller's division.
    if claims.role != Role::Admin && server.division != claims.division {
        return Err(Error::Forbidden(format!(
            "server {vmid} belongs to another division"
        )));
    }

    let session = state.proxmox.vnc_proxy(&node, vmid).await?;
    info!(identity = %claims.identity, vmid, node = %node, "console session opened");
    Ok(Envelope::success("console session created", session))
}

async fn get_server_handler(
    State(state): State<Arc<GatewayState>>,
    Path(vmid): Path<u32>,
) -> Result<Envelope> {
    let server = state
        .store
        .find_server(vmid)?
        .ok_or_else(|| Error::not_found("server", vmid))?;
    Ok(Envelope::success(
        "server fetched",
        serde_json::to_value(server)?,
    ))
}

async fn get_user_handler(
    State(state): State<Arc<GatewayState>>,
    Path(id): Path<i64>,
) -> Result<Envelope> {
    let user = state
        .store
        .find_user_with_division(id)?
        .ok_or_else(|| Error::not_found("user", id))?;
    Ok(Envelope::success(
        "user fetched",
        serde_json::to_value(user)?,
    ))
}

async fn update_ip_address_handler(
    State(state): State<Arc<GatewayState>>,
    Path(id): Path<i64>,
    payload: std::result::Result<Json<IpAddressUpdate>, JsonRejection>,
) -> Result<Envelope> {
    let Json(update) = payload.map_err(|e| Error::Validation(e.body_text()))?;

    let record = state
        .store
        .update_ip_address(id, &update)?
        .ok_or_else(|| Error::not_found("ip address", id))?;
    Ok(Envelope::success(
        "ip address updated",
        serde_json::to_value(record)?,
    ))
}
