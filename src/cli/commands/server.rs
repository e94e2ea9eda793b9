use clap::Subcommand;
use serde_json::json;

use crate::cli::client::ApiClient;
use crate::cli::utils::{output_record, output_success};
use crate::cli::OutputFormat;

#[derive(Subcommand)]
pub enum ServerCommands {
    #[command(about = "Point the CLI at an API server")]
    Set {
        #[arg(help = "Server URL, e.g. http://localhost:3000")]
        url: String,
    },

    #[command(about = "Show the configured server and session")]
    Show,

    #[command(about = "Check server health status from API /health endpoint")]
    Health,
}

pub async fn handle(cmd: ServerCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let mut client = ApiClient::load()?;

    match cmd {
        ServerCommands::Set { url } => {
            let parsed = url::Url::parse(&url).map_err(|e| anyhow::anyhow!("Invalid server URL '{}': {}", url, e))?;
            if !matches!(parsed.scheme(), "http" | "https") {
                anyhow::bail!("Server URL must use http or https");
            }

            let config = client.config_mut();
            if config.server_url != url {
                // A token from one server means nothing to another
                config.clear_session();
            }
            config.server_url = url.clone();
            client.save()?;

            output_success(&output_format, &format!("Using server {}", url), Some(json!({ "server_url": url })))
        }
        ServerCommands::Show => {
            let config = client.config();
            let details = json!({
                "server_url": config.server_url,
                "logged_in": config.token.is_some(),
                "user": config.session.as_ref().map(|s| s.username.clone()),
                "role": config.session.as_ref().map(|s| s.role.clone()),
                "tenant_id": config.session.as_ref().map(|s| s.tenant_id),
            });
            output_record(&output_format, &details, &["server_url", "logged_in", "user", "role", "tenant_id"])
        }
        ServerCommands::Health => {
            let health = client.get("/health").await?;
            output_success(&output_format, &format!("{} is healthy", client.config().server_url), Some(health))
        }
    }
}
