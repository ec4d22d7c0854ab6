use std::path::PathBuf;

use clap::{Args, Subcommand};
use serde_json::json;

use crate::app::App;
use crate::cli::utils::{output_empty_collection, output_success};
use crate::cli::OutputFormat;
use crate::projects::{ImageUpload, Project, ProjectForm};
use crate::routing::View;

#[derive(Args)]
pub struct FormArgs {
    #[arg(long, help = "Project title")]
    title: String,
    #[arg(long, help = "Project description")]
    description: String,
    #[arg(long, help = "GitHub repository link")]
    github: Option<String>,
    #[arg(long, help = "Live demo link")]
    demo: Option<String>,
    #[arg(long, help = "Image file to upload")]
    image: Option<PathBuf>,
}

impl FormArgs {
    fn into_form(self) -> anyhow::Result<ProjectForm> {
        let image = match &self.image {
            Some(path) => Some(
                ImageUpload::from_path(path)
                    .map_err(|e| anyhow::anyhow!("Failed to read image {}: {}", path.display(), e))?,
            ),
            None => None,
        };
        Ok(ProjectForm {
            title: self.title,
            description: self.description,
            github_link: self.github,
            live_demo: self.demo,
            image,
        })
    }
}

#[derive(Subcommand)]
pub enum ProjectCommands {
    #[command(about = "List all projects")]
    List,

    #[command(about = "Show a single project")]
    Show {
        #[arg(help = "Project ID")]
        id: String,
    },

    #[command(about = "Create a project (admin)")]
    Create(FormArgs),

    #[command(about = "Update a project (admin)")]
    Update {
        #[arg(help = "Project ID")]
        id: String,
        #[command(flatten)]
        form: FormArgs,
    },

    #[command(about = "Delete a project (admin)")]
    Delete {
        #[arg(help = "Project ID")]
        id: String,
    },
}

/// Mutations follow the same guard as the projects screen
fn require_admin(app: &App) -> anyhow::Result<()> {
    let resolved = app.shell.navigate("/projects");
    if resolved.view != View::Projects {
        return Err(anyhow::anyhow!("Admin login required"));
    }
    Ok(())
}

fn print_project(output_format: &OutputFormat, project: &Project) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(project)?),
        OutputFormat::Text => {
            println!("{}  {}", project.id.as_deref().unwrap_or("-"), project.title);
            println!("    {}", project.description);
            if let Some(link) = &project.github_link {
                println!("    github: {}", link);
            }
            if let Some(link) = &project.live_demo {
                println!("    demo:   {}", link);
            }
        }
    }
    Ok(())
}

pub async fn handle(cmd: ProjectCommands, app: &App, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        ProjectCommands::List => {
            let projects = app.projects.list().await?;
            if projects.is_empty() {
                return output_empty_collection(&output_format, "projects", "No projects found");
            }
            match output_format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(projects.as_slice())?),
                OutputFormat::Text => {
                    for project in projects.iter() {
                        print_project(&output_format, project)?;
                    }
                    if let Some(entry) = app.projects.cache().peek() {
                        println!("({} projects, fetched {})", entry.data.len(), entry.fetched_at.to_rfc3339());
                    }
                }
            }
            Ok(())
        }
        ProjectCommands::Show { id } => {
            let project = app.projects.get(&id).await?;
            print_project(&output_format, &project)
        }
        ProjectCommands::Create(form) => {
            require_admin(app)?;
            let project = app.projects.create(&form.into_form()?).await?;
            output_success(
                &output_format,
                &format!("Created project '{}'", project.title),
                Some(json!({ "project": project })),
            )
        }
        ProjectCommands::Update { id, form } => {
            require_admin(app)?;
            let project = app.projects.update(&id, &form.into_form()?).await?;
            output_success(
                &output_format,
                &format!("Updated project '{}'", project.title),
                Some(json!({ "project": project })),
            )
        }
        ProjectCommands::Delete { id } => {
            require_admin(app)?;
            let message = app.projects.delete(&id).await?;
            let message = if message.is_empty() {
                format!("Deleted project {}", id)
            } else {
                message
            };
            output_success(&output_format, &message, None)
        }
    }
}
