use clap::Subcommand;

use crate::cli::client::ApiClient;
use crate::cli::utils::output_table;
use crate::cli::OutputFormat;

#[derive(Subcommand)]
pub enum UserCommands {
    #[command(about = "List users in your tenant (admin only)")]
    List,
}

pub async fn handle(cmd: UserCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let mut client = ApiClient::load()?;

    match cmd {
        UserCommands::List => {
            let users = client.get("/api/users").await?;
            output_table(&output_format, "users", &users, &["id", "username", "email", "role"])
        }
    }
}
