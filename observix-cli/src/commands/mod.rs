//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod agent;
mod assignment;
mod pipeline;

pub use agent::AgentCommands;
pub use assignment::AssignmentCommands;
pub use pipeline::PipelineCommands;

use anyhow::Result;
use clap::Subcommand;
use observix_client::ControlPlaneClient;

use crate::config::Config;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Pipeline management
    Pipeline {
        #[command(subcommand)]
        command: PipelineCommands,
    },
    /// Assignment management
    Assignment {
        #[command(subcommand)]
        command: AssignmentCommands,
    },
    /// Agent inspection
    Agent {
        #[command(subcommand)]
        command: AgentCommands,
    },
    /// Check control plane liveness
    Health,
}

/// Handle a CLI command
///
/// Routes the command to the appropriate handler module.
pub async fn handle_command(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Pipeline { command } => pipeline::handle_pipeline_command(command, config).await,
        Commands::Assignment { command } => {
            assignment::handle_assignment_command(command, config).await
        }
        Commands::Agent { command } => agent::handle_agent_command(command, config).await,
        Commands::Health => {
            let client = ControlPlaneClient::new(&config.control_plane_url);
            client.health().await?;
            println!("ok");
            Ok(())
        }
    }
}
