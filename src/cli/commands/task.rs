use clap::{Args, Subcommand};
use serde_json::{json, Map, Value};

use crate::cli::client::ApiClient;
use crate::cli::utils::{output_record, output_success, output_table, set_if_some};
use crate::cli::OutputFormat;

const TASK_FIELDS: &[&str] = &[
    "id",
    "title",
    "description",
    "status",
    "priority",
    "due_date",
    "assigned_to",
    "created_by",
    "project_id",
    "updated_at",
];

#[derive(Subcommand)]
pub enum TaskCommands {
    #[command(about = "List tasks in a project")]
    List {
        #[arg(help = "Project ID")]
        project: i32,
    },

    #[command(about = "Show one task")]
    Get {
        #[arg(help = "Project ID")]
        project: i32,
        #[arg(help = "Task ID")]
        task: i32,
    },

    #[command(about = "Create a task")]
    Create {
        #[arg(help = "Project ID")]
        project: i32,
        #[arg(help = "Task title")]
        title: String,
        #[command(flatten)]
        fields: TaskFields,
    },

    #[command(about = "Update a task (creator, assignee or admin)")]
    Update {
        #[arg(help = "Project ID")]
        project: i32,
        #[arg(help = "Task ID")]
        task: i32,
        #[arg(long)]
        title: Option<String>,
        #[command(flatten)]
        fields: TaskFields,
        #[arg(long, conflicts_with = "assign", help = "Remove the assignee")]
        unassign: bool,
        #[arg(long, conflicts_with = "due", help = "Remove the due date")]
        clear_due: bool,
        #[arg(long, conflicts_with = "description", help = "Remove the description")]
        clear_description: bool,
    },

    #[command(about = "Delete a task (creator or admin)")]
    Delete {
        #[arg(help = "Project ID")]
        project: i32,
        #[arg(help = "Task ID")]
        task: i32,
    },
}

#[derive(Args, Debug, Default)]
pub struct TaskFields {
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long, help = "pending, in-progress or completed")]
    pub status: Option<String>,
    #[arg(long, help = "low, medium or high")]
    pub priority: Option<String>,
    #[arg(long, help = "Due date, YYYY-MM-DD")]
    pub due: Option<String>,
    #[arg(long, help = "User ID to assign")]
    pub assign: Option<i32>,
}

impl TaskFields {
    fn into_body(self) -> Map<String, Value> {
        let mut body = Map::new();
        set_if_some(&mut body, "description", self.description);
        set_if_some(&mut body, "status", self.status);
        set_if_some(&mut body, "priority", self.priority);
        set_if_some(&mut body, "due_date", self.due);
        set_if_some(&mut body, "assigned_to", self.assign);
        body
    }
}

pub async fn handle(cmd: TaskCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let mut client = ApiClient::load()?;

    match cmd {
        TaskCommands::List { project } => {
            let tasks = client.get(&tasks_path(project)).await?;
            output_table(
                &output_format,
                "tasks",
                &tasks,
                &["id", "title", "status", "priority", "due_date", "assigned_to"],
            )
        }
        TaskCommands::Get { project, task } => {
            let record = client.get(&task_path(project, task)).await?;
            output_record(&output_format, &record, TASK_FIELDS)
        }
        TaskCommands::Create { project, title, fields } => {
            let mut body = fields.into_body();
            body.insert("title".to_string(), json!(title));

            let task = client.post(&tasks_path(project), Value::Object(body)).await?;
            output_success(&output_format, &format!("Created task {}", task["id"]), Some(json!({ "task": task })))
        }
        TaskCommands::Update {
            project,
            task,
            title,
            fields,
            unassign,
            clear_due,
            clear_description,
        } => {
            let clears = Clears {
                assignee: unassign,
                due_date: clear_due,
                description: clear_description,
            };
            let body = update_body(title, fields, clears);
            if body.is_empty() {
                anyhow::bail!("Nothing to update");
            }
            let updated = client.put(&task_path(project, task), Value::Object(body)).await?;
            output_success(&output_format, &format!("Updated task {}", task), Some(json!({ "task": updated })))
        }
        TaskCommands::Delete { project, task } => {
            client.delete(&task_path(project, task)).await?;
            output_success(&output_format, &format!("Deleted task {}", task), None)
        }
    }
}

fn tasks_path(project: i32) -> String {
    format!("/api/projects/{}/tasks", project)
}

fn task_path(project: i32, task: i32) -> String {
    format!("/api/projects/{}/tasks/{}", project, task)
}

/// Nullable columns the update should reset.
#[derive(Debug, Default, Clone, Copy)]
struct Clears {
    assignee: bool,
    due_date: bool,
    description: bool,
}

fn update_body(title: Option<String>, fields: TaskFields, clears: Clears) -> Map<String, Value> {
    let mut body = fields.into_body();
    set_if_some(&mut body, "title", title);
    for (key, clear) in [
        ("assigned_to", clears.assignee),
        ("due_date", clears.due_date),
        ("description", clears.description),
    ] {
        if clear {
            body.insert(key.to_string(), Value::Null);
        }
    }
    body
}
