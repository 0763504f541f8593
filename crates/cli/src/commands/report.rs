use alfanero_leads::{LeadService, SqliteStore, notifier_for};
use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use super::load_site;

/// Send the weekly inquiry report once, outside the HTTP server
pub async fn run(config: PathBuf) -> Result<()> {
    let site = load_site(&config, None)?;
    let leads = site.leads;

    println!("📊 Generating weekly report...");
    println!("   Database: {}", leads.database.display());
    if leads.notify_webhook.is_none() {
        println!("   ⚠ No notify_webhook configured, report goes to the log only");
    }

    let store = SqliteStore::open(&leads.database)
        .with_context(|| format!("Failed to open {}", leads.database.display()))?;
    let notifier = notifier_for(
        leads.notify_webhook.as_deref(),
        Duration::from_secs(leads.notify_timeout_secs.max(1)),
    )
    .context("Failed to build webhook client")?;
    let service = LeadService::new(Arc::new(store), notifier, leads);

    let report = service
        .generate_weekly_report()
        .await
        .context("Failed to send weekly report")?;

    println!();
    println!("✅ Report sent");
    println!("   Submissions: {}", report.stats.total);
    println!("{}", serde_json::to_string_pretty(&report.stats)?);

    Ok(())
}
