use std::path::PathBuf;
use std::process::ExitCode;

use theme_audit_lib::output::DiffReport;
use theme_audit_lib::{run_diff, AuditError, AuditOutput, RemoteBrowser, AUDIT_OUTPUT_VERSION};

use crate::cli::{OutputFormat, SiteArgs};
use crate::formatting::{render_error, write_output};
use crate::settings::{
    apply_out_dir, apply_site_args, format_effective_config, load_config, validate_config,
};

/// Run the diff command. Regions that differ are reported, not failed: the
/// exit code is non-zero only when the run itself could not complete.
pub async fn run_diff_command(
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
    let run = match run_diff(&browser, &config, &config.output_dir).await {
        Ok(run) => run,
        Err(err) => return render_error(err, format, output),
    };

    if verbose {
        eprintln!(
            "Diffed {} region(s), {} breakpoint(s) skipped; images in {}",
            run.regions.len(),
            run.failures.len(),
            config.output_dir.display()
        );
    }

    let body = AuditOutput::Diff(DiffReport {
        version: AUDIT_OUTPUT_VERSION.to_string(),
        reference_url: config.reference_url.clone(),
        target_url: config.target_url.clone(),
        output_dir: config.output_dir.clone(),
        regions: run.regions,
        failures: run.failures,
    });
    if let Err(e) = write_output(&body, format, output.clone()) {
        return render_error(AuditError::Unknown(e.to_string()), format, output);
    }
    ExitCode::SUCCESS
}
