//! The `check` subcommand: configuration validation.

use std::path::Path;

use crate::cli::output;
use crate::config::Config;

pub fn check(config_path: &Path, json: bool) -> anyhow::Result<()> {
    let config = match Config::load(config_path) {
        Ok(config) => config,
        Err(e) => {
            output::failure(&format!("{}: {e}", config_path.display()));
            anyhow::bail!("configuration is invalid");
        }
    };

    if json {
        let summary = serde_json::json!({
            "config": config_path.display().to_string(),
            "feed_url": config.source.feed_url,
            "consumers": config.consumers.len(),
            "max_attempts": config.delivery.max_attempts,
            "suspension_threshold": config.registry.suspension_threshold,
            "admin_enabled": config.admin.enabled,
            "admin_bind": config.admin.bind,
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    output::success(&format!("{} is valid", config_path.display()));
    output::note(&format!("feed: {}", config.source.feed_url));
    output::note(&format!(
        "consumers: {} registered, suspension after {} consecutive failures",
        config.consumers.len(),
        config.registry.suspension_threshold
    ));
    output::note(&format!(
        "delivery: {} attempt(s), first retry after {}ms",
        config.delivery.max_attempts, config.delivery.first_interval_ms
    ));
    if config.admin.enabled {
        output::note(&format!("admin API: {}", config.admin.bind));
    } else {
        output::note("admin API: disabled");
    }
    Ok(())
}
