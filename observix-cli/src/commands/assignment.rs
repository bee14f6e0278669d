//! Assignment command handlers

use anyhow::Result;
use clap::Subcommand;
use colored::*;
use observix_core::dto::assignment::CreateAssignment;
use uuid::Uuid;

use crate::config::Config;
use observix_client::ControlPlaneClient;

/// Assignment subcommands
#[derive(Subcommand)]
pub enum AssignmentCommands {
    /// Bind a pipeline to an agent and region
    Create {
        /// Agent ID
        #[arg(long)]
        agent_id: String,

        /// Region
        #[arg(long)]
        region: String,

        /// Pipeline ID
        #[arg(long)]
        pipeline_id: Uuid,
    },
    /// Delete an assignment by ID
    Delete {
        /// Assignment ID
        id: Uuid,
    },
    /// Show what an agent in a region is expected to run
    Get {
        /// Agent ID
        #[arg(long)]
        agent_id: String,

        /// Region
        #[arg(long)]
        region: String,
    },
}

/// Handle assignment commands
pub async fn handle_assignment_command(command: AssignmentCommands, config: &Config) -> Result<()> {
    let client = ControlPlaneClient::new(&config.control_plane_url);

    match command {
        AssignmentCommands::Create {
            agent_id,
            region,
            pipeline_id,
        } => {
            let assignment = client
                .create_assignment(CreateAssignment {
                    agent_id,
                    region,
                    pipeline_id,
                })
                .await?;

            println!("{}", "✓ Assignment created!".green().bold());
            println!(
                "  ID:       {}",
                assignment.assignment_id.to_string().cyan()
            );
            println!("  Agent:    {} ({})", assignment.agent_id, assignment.region);
            println!("  Pipeline: {}", assignment.pipeline_id.to_string().dimmed());
            Ok(())
        }
        AssignmentCommands::Delete { id } => {
            client.delete_assignment(id).await?;
            println!(
                "{}",
                format!("✓ Assignment {} deleted successfully!", id)
                    .green()
                    .bold()
            );
            Ok(())
        }
        AssignmentCommands::Get { agent_id, region } => {
            let view = client
                .poll_assignments(&agent_id, &region, None)
                .await?
                .ok_or_else(|| {
                    anyhow::anyhow!("control plane returned 304 to an unconditional poll")
                })?;

            println!("Revision: {}", view.revision.dimmed());
            if view.pipelines.is_empty() {
                println!("{}", "No pipelines assigned.".yellow());
            } else {
                for pipeline in view.pipelines {
                    let state = if pipeline.enabled {
                        "enabled".green()
                    } else {
                        "disabled".yellow()
                    };
                    println!(
                        "  {} {} v{} ({})",
                        "▸".cyan(),
                        pipeline.name.bold(),
                        pipeline.version,
                        state
                    );
                    println!(
                        "    ID: {}",
                        pipeline.pipeline_id.to_string().dimmed()
                    );
                }
            }
            Ok(())
        }
    }
}
