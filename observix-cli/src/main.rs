//! Observix CLI
//!
//! Thin HTTP wrapper over the control plane API. The CLI never reads or
//! writes agent state directly.
//!
//! Exit codes: 0 on success, 1 on transport failure, 2 on a non-2xx response
//! with the response body printed to stderr.

mod commands;
mod config;

use std::process::ExitCode;

use clap::Parser;
use commands::{Commands, handle_command};
use config::Config;
use observix_client::ClientError;

#[derive(Parser)]
#[command(name = "observix")]
#[command(about = "Observix log-forwarding platform CLI", long_about = None)]
struct Cli {
    /// Control plane URL
    #[arg(
        long,
        env = "OBSERVIX_CP_URL",
        default_value = "http://127.0.0.1:7000"
    )]
    control_plane_url: String,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = Config {
        control_plane_url: cli.control_plane_url,
    };

    match handle_command(cli.command, &config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => ExitCode::from(exit_code_for(&e)),
    }
}

fn exit_code_for(err: &anyhow::Error) -> u8 {
    // A non-2xx response surfaces its body verbatim; everything else
    // (transport, parse, local file errors) is a plain failure.
    if let Some(ClientError::ApiError { message, .. }) = err.downcast_ref::<ClientError>() {
        eprintln!("{}", message);
        return 2;
    }
    eprintln!("{:#}", err);
    1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_errors_map_to_exit_code_2() {
        let err = anyhow::Error::new(ClientError::api_error(409, "conflict"));
        assert_eq!(exit_code_for(&err), 2);
    }

    #[test]
    fn transport_errors_map_to_exit_code_1() {
        let err = anyhow::Error::new(ClientError::ParseError("bad json".to_string()));
        assert_eq!(exit_code_for(&err), 1);

        let err = anyhow::anyhow!("no such file");
        assert_eq!(exit_code_for(&err), 1);
    }
}
