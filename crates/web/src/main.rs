use tracing::info;

use pvegate_web::GatewayConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    // Fails fast when a required secret is unset; there is no insecure default.
    let cfg = GatewayConfig::from_env()?;

    info!(
        "Starting PVEGate on http://{} (upstream: {})",
        cfg.addr, cfg.proxmox.api_url
    );

    pvegate_web::server::serve(cfg).await
}
