use clap::Subcommand;
use serde_json::{json, Map, Value};

use crate::cli::client::ApiClient;
use crate::cli::utils::{output_record, output_success, output_table, set_if_some};
use crate::cli::OutputFormat;

const PROJECT_FIELDS: &[&str] = &["id", "name", "description", "status", "created_by", "tenant_id", "updated_at"];

#[derive(Subcommand)]
pub enum ProjectCommands {
    #[command(about = "List projects in your tenant")]
    List,

    #[command(about = "Show one project")]
    Get {
        #[arg(help = "Project ID")]
        id: i32,
    },

    #[command(about = "Create a project")]
    Create {
        #[arg(help = "Project name")]
        name: String,
        #[arg(long)]
        description: Option<String>,
        #[arg(long, help = "active, completed or on-hold")]
        status: Option<String>,
    },

    #[command(about = "Update a project (creator or admin)")]
    Update {
        #[arg(help = "Project ID")]
        id: i32,
        #[arg(long)]
        name: Option<String>,
        #[arg(long, conflicts_with = "clear_description")]
        description: Option<String>,
        #[arg(long, help = "Remove the description")]
        clear_description: bool,
        #[arg(long, help = "active, completed or on-hold")]
        status: Option<String>,
    },

    #[command(about = "Delete a project and its tasks (creator or admin)")]
    Delete {
        #[arg(help = "Project ID")]
        id: i32,
    },
}

pub async fn handle(cmd: ProjectCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let mut client = ApiClient::load()?;

    match cmd {
        ProjectCommands::List => {
            let projects = client.get("/api/projects").await?;
            output_table(&output_format, "projects", &projects, &["id", "name", "status", "created_by"])
        }
        ProjectCommands::Get { id } => {
            let project = client.get(&format!("/api/projects/{}", id)).await?;
            output_record(&output_format, &project, PROJECT_FIELDS)
        }
        ProjectCommands::Create {
            name,
            description,
            status,
        } => {
            let mut body = Map::new();
            body.insert("name".to_string(), json!(name));
            set_if_some(&mut body, "description", description);
            set_if_some(&mut body, "status", status);

            let project = client.post("/api/projects", Value::Object(body)).await?;
            output_success(
                &output_format,
                &format!("Created project {}", project["id"]),
                Some(json!({ "project": project })),
            )
        }
        ProjectCommands::Update {
            id,
            name,
            description,
            clear_description,
            status,
        } => {
            let body = update_body(name, description, clear_description, status);
            if body.is_empty() {
                anyhow::bail!("Nothing to update; pass --name, --description, --clear-description or --status");
            }
            let project = client.put(&format!("/api/projects/{}", id), Value::Object(body)).await?;
            output_success(&output_format, &format!("Updated project {}", id), Some(json!({ "project": project })))
        }
        ProjectCommands::Delete { id } => {
            client.delete(&format!("/api/projects/{}", id)).await?;
            output_success(&output_format, &format!("Deleted project {}", id), None)
        }
    }
}

fn update_body(
    name: Option<String>,
    description: Option<String>,
    clear_description: bool,
    status: Option<String>,
) -> Map<String, Value> {
    let mut body = Map::new();
    set_if_some(&mut body, "name", name);
    set_if_some(&mut body, "description", description);
    if clear_description {
        body.insert("description".to_string(), Value::Null);
    }
    set_if_some(&mut body, "status", status);
    body
}
