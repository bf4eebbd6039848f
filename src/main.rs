mod cli;
mod commands;
mod formatting;
mod settings;

use std::process::ExitCode;

use cli::Commands;
use commands::{run_audit_command, run_capture_command, run_diff_command, AuditArgs};
use theme_audit_lib::Tolerance;

#[tokio::main]
async fn main() -> ExitCode {
    run().await
}

/// Logs go to stderr so stdout stays a clean report.
fn init_logging(verbose: bool) {
    let default_level = if verbose { "info" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

async fn run() -> ExitCode {
    let raw_args: Vec<String> = std::env::args().collect();
    let args = cli::parse();
    init_logging(args.verbose);

    match args.command {
        Commands::Audit {
            sites,
            viewport,
            only,
            focus,
            skip_responsive,
            tolerance_px,
            tolerance_color,
            tolerance_alpha,
            format,
            output,
        } => {
            run_audit_command(
                &raw_args,
                args.config,
                args.verbose,
                AuditArgs {
                    sites,
                    viewport,
                    only,
                    focus,
                    skip_responsive,
                    tolerance: Tolerance {
                        px: tolerance_px,
                        color: tolerance_color,
                        alpha: tolerance_alpha,
                    },
                    format,
                    output,
                },
            )
            .await
        }
        Commands::Diff {
            sites,
            out_dir,
            format,
            output,
        } => run_diff_command(args.config, args.verbose, sites, out_dir, format, output).await,
        Commands::Capture {
            sites,
            out_dir,
            format,
            output,
        } => run_capture_command(args.config, args.verbose, sites, out_dir, format, output).await,
    }
}
