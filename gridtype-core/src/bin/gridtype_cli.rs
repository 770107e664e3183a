//! Gridtype CLI - JSON bridge interface
//!
//! Commands: styles, render, qc
//! Outputs JSON to stdout (or the bare block with `render --text`)
//! Exit codes: 0 ok, 2 QC/validation failure, 1 malformed input

use clap::{Parser, Subcommand};
use serde::Serialize;
use std::process::ExitCode;

use gridtype_core::{
    palette::STYLE_PACKS,
    pipeline::{PipelineError, QcRequest},
    validation::Grade,
    RenderPipeline, RenderRequest,
};

#[derive(Parser)]
#[command(name = "gridtype-cli")]
#[command(about = "Gridtype CLI - fixed-width text layout with self-verifying QC")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List available style packs
    Styles,

    /// Render a block
    Render {
        /// JSON payload (RenderRequest)
        #[arg(short, long)]
        payload: String,

        /// Print the block and footer instead of the JSON artifact
        #[arg(long)]
        text: bool,
    },

    /// Run the validation suite over existing text
    Qc {
        /// JSON payload (QcRequest)
        #[arg(short, long)]
        payload: String,
    },
}

/// Pretty-print to stdout; false when serialization failed.
fn print_json<T: Serialize>(value: &T) -> bool {
    match serde_json::to_string_pretty(value) {
        Ok(json) => {
            println!("{json}");
            true
        }
        Err(e) => {
            eprintln!("{}", serde_json::json!({"error": format!("Serialization failed: {e}")}));
            false
        }
    }
}

fn exit_for(printed: bool) -> ExitCode {
    if printed {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();
    let pipeline = RenderPipeline::new();

    match cli.command {
        Commands::Styles => {
            let styles: Vec<_> = STYLE_PACKS
                .iter()
                .map(|p| serde_json::json!({
                    "name": p.name,
                    "fill": p.fill.to_string(),
                    "empty": p.empty.to_string(),
                    "ruler": p.ruler.to_string(),
                    "ascii": p.name == "minimal_ascii",
                }))
                .collect();
            exit_for(print_json(&styles))
        }

        Commands::Render { payload, text } => {
            let request: RenderRequest = match serde_json::from_str(&payload) {
                Ok(r) => r,
                Err(e) => {
                    println!("{}", serde_json::json!({"success": false, "error": format!("Invalid payload: {e}")}));
                    return ExitCode::FAILURE;
                }
            };

            match pipeline.render(&request) {
                Ok(artifact) if text => {
                    println!("{}", artifact.display_text());
                    ExitCode::SUCCESS
                }
                Ok(artifact) => exit_for(print_json(&serde_json::json!({
                    "success": true,
                    "artifact": artifact,
                }))),
                Err(e) => {
                    println!("{}", serde_json::json!({"success": false, "error": e.to_string()}));
                    match e {
                        PipelineError::QcRejected(_) => ExitCode::from(2),
                        _ => ExitCode::FAILURE,
                    }
                }
            }
        }

        Commands::Qc { payload } => {
            let request: QcRequest = match serde_json::from_str(&payload) {
                Ok(r) => r,
                Err(e) => {
                    println!("{}", serde_json::json!({"valid": false, "error": format!("Invalid payload: {e}")}));
                    return ExitCode::FAILURE;
                }
            };

            let summary = pipeline.validate(&request);
            if !print_json(&summary) {
                return ExitCode::FAILURE;
            }
            match summary.overall_grade {
                Grade::Pass => ExitCode::SUCCESS,
                Grade::Fail => ExitCode::from(2), // Validation failure
            }
        }
    }
}
