use std::io::{self, BufRead, Write};

use clap::Subcommand;
use serde_json::json;

use crate::app::App;
use crate::cli::utils::{output_error, output_resolved, output_success};
use crate::cli::OutputFormat;
use crate::session::SessionState;

#[derive(Subcommand)]
pub enum AuthCommands {
    #[command(about = "Login to server")]
    Login {
        #[arg(help = "Email")]
        email: String,
        #[arg(long, help = "Password (will prompt if not provided)")]
        password: Option<String>,
    },

    #[command(about = "Logout and forget the stored credential")]
    Logout,

    #[command(about = "Show current authentication status")]
    Status,

    #[command(about = "Show current user information")]
    Whoami,
}

fn prompt_password() -> anyhow::Result<String> {
    eprint!("Password: ");
    io::stderr().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

pub async fn handle(cmd: AuthCommands, app: &App, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        AuthCommands::Login { email, password } => {
            let password = match password {
                Some(password) => password,
                None => prompt_password()?,
            };

            match app.login(&email, &password).await {
                Ok(resolved) => {
                    output_success(
                        &output_format,
                        &format!("Logged in as {}", email),
                        Some(json!({ "landing": resolved.location.href() })),
                    )?;
                    output_resolved(&output_format, &resolved)
                }
                Err(e) => {
                    output_error(&output_format, e.message(), Some("AUTHENTICATION_FAILED"))?;
                    Err(anyhow::anyhow!("login failed"))
                }
            }
        }
        AuthCommands::Logout => {
            let resolved = app.logout()?;
            output_success(
                &output_format,
                "Logged out",
                Some(json!({ "landing": resolved.location.href() })),
            )
        }
        AuthCommands::Status => {
            let state = app.state();
            let authorization = state.authorization();
            match output_format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&json!({
                        "authenticated": authorization.is_authenticated(),
                        "authorization": authorization,
                        "session": state,
                    }))?);
                }
                OutputFormat::Text => match &state {
                    SessionState::Anonymous => println!("Not logged in"),
                    SessionState::Authenticated { role, expires_at, .. } => {
                        println!("Logged in ({}), expires {}", role.as_str(), expires_at);
                    }
                },
            }
            Ok(())
        }
        AuthCommands::Whoami => match app.state() {
            SessionState::Anonymous => {
                output_error(&output_format, "Not logged in", Some("UNAUTHENTICATED"))?;
                Err(anyhow::anyhow!("not logged in"))
            }
            SessionState::Authenticated { role, subject_id, email, .. } => match output_format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&json!({
                        "id": subject_id,
                        "email": email,
                        "role": role,
                    }))?);
                    Ok(())
                }
                OutputFormat::Text => {
                    println!("ID: {}", subject_id);
                    if let Some(email) = email {
                        println!("Email: {}", email);
                    }
                    println!("Role: {}", role.as_str());
                    Ok(())
                }
            },
        },
    }
}
