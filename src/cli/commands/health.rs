//! Provider health reporting.

use super::build_aggregator;
use crate::config::Config;

pub fn cmd_health(config: &Config) -> anyhow::Result<()> {
    let aggregator = build_aggregator(config);
    let report = aggregator.health_status();

    println!("Provider Health");
    println!("===============");
    for provider in &report.providers {
        let icon = if provider.healthy { "✓" } else { "✗" };
        println!("{} {}: {}", icon, provider.source, provider.message);
    }

    println!();
    if report.all_healthy {
        println!("All providers available.");
    } else if report.any_healthy {
        println!("Degraded: some providers unavailable, searches still work.");
    } else {
        println!("All providers unavailable. Searches will return no results.");
    }

    Ok(())
}
