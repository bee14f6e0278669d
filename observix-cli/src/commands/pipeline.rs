//! Pipeline command handlers
//!
//! Handles pipeline creation, listing, updating, and deletion.

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::*;
use observix_core::domain::pipeline::{Pipeline, PipelineSpec};
use observix_core::dto::pipeline::{CreatePipeline, UpdatePipeline};
use uuid::Uuid;

use crate::config::Config;
use observix_client::ControlPlaneClient;

/// Pipeline subcommands
#[derive(Subcommand)]
pub enum PipelineCommands {
    /// Create a new pipeline from a JSON spec file
    Create {
        /// Pipeline name
        #[arg(short, long)]
        name: String,

        /// Path to a JSON file with source/processor/destination/batching
        #[arg(short = 'f', long)]
        spec_file: String,

        /// Create the pipeline disabled
        #[arg(long)]
        disabled: bool,
    },
    /// List all pipelines
    List,
    /// Update a pipeline; omitted fields are left unchanged
    Update {
        /// Pipeline ID
        id: Uuid,

        /// New pipeline name
        #[arg(short, long)]
        name: Option<String>,

        /// Enable or disable the pipeline (omit to leave unchanged)
        #[arg(long)]
        enabled: Option<bool>,

        /// Path to a JSON file with a replacement spec
        #[arg(short = 'f', long)]
        spec_file: Option<String>,
    },
    /// Delete a pipeline (its assignments are removed too)
    Delete {
        /// Pipeline ID
        id: Uuid,
    },
}

/// Handle pipeline commands
pub async fn handle_pipeline_command(command: PipelineCommands, config: &Config) -> Result<()> {
    let client = ControlPlaneClient::new(&config.control_plane_url);

    match command {
        PipelineCommands::Create {
            name,
            spec_file,
            disabled,
        } => create_pipeline(&client, &name, &spec_file, !disabled).await,
        PipelineCommands::List => list_pipelines(&client).await,
        PipelineCommands::Update {
            id,
            name,
            enabled,
            spec_file,
        } => update_pipeline(&client, id, name, enabled, spec_file).await,
        PipelineCommands::Delete { id } => delete_pipeline(&client, id).await,
    }
}

fn read_spec(path: &str) -> Result<PipelineSpec> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read spec file: {}", path))?;
    serde_json::from_str(&contents).with_context(|| format!("Invalid pipeline spec in {}", path))
}

/// Create a new pipeline from a JSON spec file
async fn create_pipeline(
    client: &ControlPlaneClient,
    name: &str,
    spec_file: &str,
    enabled: bool,
) -> Result<()> {
    let spec = read_spec(spec_file)?;

    let created = client
        .create_pipeline(CreatePipeline {
            name: name.to_string(),
            enabled,
            spec,
        })
        .await?;

    println!("{}", "✓ Pipeline created successfully!".green().bold());
    println!("  ID:      {}", created.pipeline_id.to_string().cyan());
    println!("  Name:    {}", name.bold());
    println!("  Version: {}", created.version);

    Ok(())
}

/// List all pipelines
async fn list_pipelines(client: &ControlPlaneClient) -> Result<()> {
    let pipelines = client.list_pipelines().await?;

    if pipelines.is_empty() {
        println!("{}", "No pipelines found.".yellow());
    } else {
        println!(
            "{}",
            format!("Found {} pipeline(s):", pipelines.len()).bold()
        );
        println!();
        for pipeline in pipelines {
            print_pipeline_summary(&pipeline);
        }
    }

    Ok(())
}

/// Update a pipeline
async fn update_pipeline(
    client: &ControlPlaneClient,
    id: Uuid,
    name: Option<String>,
    enabled: Option<bool>,
    spec_file: Option<String>,
) -> Result<()> {
    let spec = spec_file.as_deref().map(read_spec).transpose()?;

    let updated = client
        .update_pipeline(
            id,
            UpdatePipeline {
                name,
                enabled,
                spec,
            },
        )
        .await?;

    println!("{}", "✓ Pipeline updated!".green().bold());
    println!("  ID:      {}", id.to_string().cyan());
    println!("  Version: {}", updated.version);

    Ok(())
}

/// Delete a pipeline
async fn delete_pipeline(client: &ControlPlaneClient, id: Uuid) -> Result<()> {
    client.delete_pipeline(id).await?;

    println!(
        "{}",
        format!("✓ Pipeline {} deleted successfully!", id)
            .green()
            .bold()
    );

    Ok(())
}

/// Print a pipeline summary
fn print_pipeline_summary(pipeline: &Pipeline) {
    let state = if pipeline.enabled {
        "enabled".green()
    } else {
        "disabled".yellow()
    };

    println!(
        "  {} {} ({})",
        "▸".cyan(),
        pipeline.name.bold(),
        state
    );
    println!("    ID:      {}", pipeline.pipeline_id.to_string().dimmed());
    println!("    Version: {}", pipeline.version);
    println!(
        "    Updated: {}",
        pipeline
            .updated_at
            .format("%Y-%m-%d %H:%M:%S")
            .to_string()
            .dimmed()
    );
    println!();
}
