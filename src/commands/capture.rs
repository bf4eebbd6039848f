use std::path::PathBuf;
use std::process::ExitCode;

use theme_audit_lib::output::CaptureReport;
use theme_audit_lib::{run_capture, AuditError, AuditOutput, RemoteBrowser, AUDIT_OUTPUT_VERSION};

use crate::cli::{OutputFormat, SiteArgs};
use crate::formatting::{render_error, write_output};
use crate::settings::{
    apply_out_dir, apply_site_args, format_effective_config, load_config, validate_config,
};

/// Run the capture command.
pub async fn run_capture_command(
    config_path: Option<PathBuf>,
    verbose: bool,
    sites: SiteArgs,
    out_dir: Option<PathBuf>,
    format: OutputFormat,
    output: Option<PathBuf>,
) -> ExitCode {
    let mut config = match load_config(config_path.as_deref()) {
        Ok(cfg) => cfg,
        Err(err) => return render_error(err, format, output),
    };
    apply_site_args(&mut config, &sites);
    apply_out_dir(&mut config, out_dir);
    if let Err(err) = validate_config(&config, config_path.as_deref()) {
        return render_error(err, format, output);
    }
    if verbose {
        eprintln!("{}", format_effective_config(&config, config_path.as_deref()));
    }

    let browser = match RemoteBrowser::new(config.browser.clone()) {
        Ok(browser) => browser,
        Err(err) => return render_error(err, format, output),
    };
    let run = match run_capture(&browser, &config, &config.output_dir).await {
        Ok(run) => run,
        Err(err) => return render_error(err, format, output),
    };

    let body = AuditOutput::Capture(CaptureReport {
        version: AUDIT_OUTPUT_VERSION.to_string(),
        output_dir: config.output_dir.clone(),
        shots: run.shots,
        failures: run.failures,
    });
    if let Err(e) = write_output(&body, format, output.clone()) {
        return render_error(AuditError::Unknown(e.to_string()), format, output);
    }
    ExitCode::SUCCESS
}
