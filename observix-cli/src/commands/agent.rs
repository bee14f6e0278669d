//! Agent command handlers

use anyhow::Result;
use clap::Subcommand;
use colored::*;
use observix_core::domain::agent::AgentStatus;

use crate::config::Config;
use observix_client::ControlPlaneClient;

/// Agent subcommands
#[derive(Subcommand)]
pub enum AgentCommands {
    /// List registered agents with their computed status
    List,
}

/// Handle agent commands
pub async fn handle_agent_command(command: AgentCommands, config: &Config) -> Result<()> {
    let client = ControlPlaneClient::new(&config.control_plane_url);

    match command {
        AgentCommands::List => {
            let agents = client.list_agents().await?;

            if agents.is_empty() {
                println!("{}", "No agents registered.".yellow());
                return Ok(());
            }

            println!("{}", format!("Found {} agent(s):", agents.len()).bold());
            println!();
            for agent in agents {
                let status = match agent.status {
                    AgentStatus::Online => "online".green(),
                    AgentStatus::Offline => "offline".red(),
                };
                println!("  {} {} ({})", "▸".cyan(), agent.agent_id.bold(), status);
                println!("    Region:    {}", agent.region);
                println!(
                    "    Last seen: {}",
                    agent
                        .last_seen_at
                        .format("%Y-%m-%d %H:%M:%S")
                        .to_string()
                        .dimmed()
                );
                println!();
            }
            Ok(())
        }
    }
}
