use chrono::Utc;
use clap::Subcommand;
use serde_json::{json, Value};

use crate::cli::client::ApiClient;
use crate::cli::config::SessionInfo;
use crate::cli::utils::{output_record, output_success};
use crate::cli::OutputFormat;

const USER_FIELDS: &[&str] = &["id", "username", "email", "role", "tenant_id", "created_at"];

#[derive(Subcommand)]
pub enum AuthCommands {
    #[command(about = "Register new user and log in")]
    Register {
        #[arg(help = "Username")]
        username: String,
        #[arg(help = "Email")]
        email: String,
        #[arg(long, help = "Password (at least 8 characters)")]
        password: String,
        #[arg(long, help = "Create and join a new tenant with this name")]
        tenant_name: Option<String>,
    },

    #[command(about = "Login to server")]
    Login {
        #[arg(help = "Email")]
        email: String,
        #[arg(long, help = "Password")]
        password: String,
    },

    #[command(about = "Forget the saved token")]
    Logout,

    #[command(about = "Show current user information")]
    Profile,
}

pub async fn handle(cmd: AuthCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let mut client = ApiClient::load()?;

    match cmd {
        AuthCommands::Register {
            username,
            email,
            password,
            tenant_name,
        } => {
            let mut body = json!({ "username": username, "email": email, "password": password });
            if let Some(name) = tenant_name {
                body["tenant_name"] = json!(name);
            }
            let payload = client.post("/api/auth/register", body).await?;
            start_session(&mut client, &payload)?;
            output_success(&output_format, "Registered and logged in", Some(json!({ "user": payload["user"] })))
        }
        AuthCommands::Login { email, password } => {
            let payload = client
                .post("/api/auth/login", json!({ "email": email, "password": password }))
                .await?;
            start_session(&mut client, &payload)?;
            output_success(&output_format, "Logged in", Some(json!({ "user": payload["user"] })))
        }
        AuthCommands::Logout => {
            client.config_mut().clear_session();
            client.save()?;
            output_success(&output_format, "Logged out", None)
        }
        AuthCommands::Profile => {
            let user = client.get("/api/auth/profile").await?;
            output_record(&output_format, &user, USER_FIELDS)
        }
    }
}

/// Save the token and user summary from a register or login reply.
fn start_session(client: &mut ApiClient, payload: &Value) -> anyhow::Result<()> {
    let token = payload["token"]
        .as_str()
        .ok_or_else(|| anyhow::anyhow!("Server reply did not include a token"))?;
    let session = session_from_user(&payload["user"])?;

    let config = client.config_mut();
    config.token = Some(token.to_string());
    config.session = Some(session);
    client.save()
}

fn session_from_user(user: &Value) -> anyhow::Result<SessionInfo> {
    let text = |key: &str| user[key].as_str().unwrap_or_default().to_string();
    Ok(SessionInfo {
        user_id: user["id"]
            .as_i64()
            .ok_or_else(|| anyhow::anyhow!("Server reply did not include a user id"))?,
        username: text("username"),
        email: text("email"),
        role: text("role"),
        tenant_id: user["tenant_id"].as_i64().unwrap_or_default(),
        logged_in_at: Utc::now(),
    })
}
