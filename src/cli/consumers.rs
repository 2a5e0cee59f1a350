//! The `consumers` subcommand: admin API client.

use anyhow::Context;
use owo_colors::OwoColorize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::cli::output;
use crate::cli::ConsumersCommand;
use crate::domain::{Consumer, ConsumerState};

/// Thin client for a running daemon's admin API.
pub struct AdminClient {
    base_url: String,
    client: reqwest::Client,
}

impl AdminClient {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client: reqwest::Client::new(),
        }
    }

    pub async fn list(&self) -> anyhow::Result<Vec<Consumer>> {
        let url = format!("{}/api/consumers", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("failed to reach admin API at {url}"))?;
        anyhow::ensure!(
            response.status().is_success(),
            "admin API returned {}",
            response.status()
        );
        Ok(response.json().await?)
    }

    pub async fn mutate(&self, action: &str, endpoint: &str) -> anyhow::Result<()> {
        let url = format!("{}/api/consumers/{action}", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&serde_json::json!({ "endpoint": endpoint }))
            .send()
            .await
            .with_context(|| format!("failed to reach admin API at {url}"))?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            anyhow::bail!("unknown consumer: {endpoint}");
        }
        anyhow::ensure!(
            response.status().is_success(),
            "admin API returned {}",
            response.status()
        );
        Ok(())
    }
}

#[derive(Tabled)]
struct ConsumerRow {
    #[tabled(rename = "ENDPOINT")]
    endpoint: String,
    #[tabled(rename = "STATE")]
    state: String,
    #[tabled(rename = "FAILURES")]
    failures: u32,
}

impl From<&Consumer> for ConsumerRow {
    fn from(consumer: &Consumer) -> Self {
        let state = match consumer.state {
            ConsumerState::Active => consumer.state.to_string().green().to_string(),
            ConsumerState::Suspended => consumer.state.to_string().red().to_string(),
        };
        Self {
            endpoint: consumer.id.to_string(),
            state,
            failures: consumer.consecutive_failures,
        }
    }
}

pub async fn handle(
    admin_url: &str,
    command: &ConsumersCommand,
    json: bool,
) -> anyhow::Result<()> {
    let client = AdminClient::new(admin_url);

    match command {
        ConsumersCommand::List => {
            let consumers = client.list().await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&consumers)?);
                return Ok(());
            }
            if consumers.is_empty() {
                output::note("no consumers registered");
                return Ok(());
            }
            let rows: Vec<ConsumerRow> = consumers.iter().map(ConsumerRow::from).collect();
            let mut table = Table::new(rows);
            table.with(Style::rounded());
            println!("{table}");
        }
        ConsumersCommand::Suspend { endpoint } => {
            client.mutate("suspend", endpoint).await?;
            output::success(&format!("suspended {endpoint}"));
        }
        ConsumersCommand::Reactivate { endpoint } => {
            client.mutate("reactivate", endpoint).await?;
            output::success(&format!("reactivated {endpoint}"));
        }
    }
    Ok(())
}
