use alfanero_leads::{LeadService, SqliteStore, http::router, notifier_for};
use anyhow::{Context, Result};
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;

use super::load_site;

/// Serve the lead API with the generated site as the fallback.
///
/// Directory requests resolve to their `index.html`, so every generated
/// route is reachable at its own path.
pub async fn run(config: PathBuf, dist: Option<PathBuf>, bind: IpAddr, port: u16) -> Result<()> {
    println!("🛥  Starting server...");

    let site = load_site(&config, dist)?;
    let dist_dir = site.site.dist_dir.clone();
    let leads = site.leads;

    if !dist_dir.exists() {
        println!(
            "   ⚠ {} does not exist yet, static pages will 404",
            dist_dir.display()
        );
    }
    if leads.admin_token.is_none() {
        println!("   ⚠ No admin token configured, admin endpoints are disabled");
    }

    let store = SqliteStore::open(&leads.database)
        .with_context(|| format!("Failed to open {}", leads.database.display()))?;
    println!("   ✓ Database: {}", leads.database.display());
    println!("   ✓ Site: {}", dist_dir.display());

    let notifier = notifier_for(
        leads.notify_webhook.as_deref(),
        Duration::from_secs(leads.notify_timeout_secs.max(1)),
    )
    .context("Failed to build webhook client")?;
    let service = Arc::new(LeadService::new(Arc::new(store), notifier, leads));

    let app = router(service)
        .fallback_service(ServeDir::new(&dist_dir))
        .layer(TraceLayer::new_for_http());

    let addr = SocketAddr::new(bind, port);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;

    println!("\n🚀 Ready at: http://{}", addr);
    println!("   Press Ctrl+C to stop\n");
    info!(%addr, "listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("Server error")?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        std::future::pending::<()>().await;
    }
}
