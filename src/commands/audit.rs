use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;

use theme_audit_lib::audit::{run_audit, AuditOptions};
use theme_audit_lib::{AuditError, AuditOutput, Category, RemoteBrowser, Tolerance, Viewport};

use crate::cli::{OutputFormat, SiteArgs};
use crate::formatting::{exit_code_for_audit, render_error, write_output};
use crate::settings::{
    apply_site_args, format_effective_config, load_config, resolve_audit_settings,
    validate_config, AuditFlagSources,
};

/// Flags of the audit subcommand, as parsed.
pub struct AuditArgs {
    pub sites: SiteArgs,
    pub viewport: Viewport,
    pub only: Vec<String>,
    pub focus: Option<String>,
    pub skip_responsive: bool,
    pub tolerance: Tolerance,
    pub format: OutputFormat,
    pub output: Option<PathBuf>,
}

fn parse_categories(raw: &[String]) -> Result<Vec<Category>, AuditError> {
    raw.iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(Category::from_str)
        .collect()
}

/// Run the audit command.
pub async fn run_audit_command(
    raw_args: &[String],
    config_path: Option<PathBuf>,
    verbose: bool,
    args: AuditArgs,
) -> ExitCode {
    let AuditArgs {
        sites,
        viewport,
        only,
        focus,
        skip_responsive,
        tolerance,
        format,
        output,
    } = args;

    let mut config = match load_config(config_path.as_deref()) {
        Ok(cfg) => cfg,
        Err(err) => return render_error(err, format, output),
    };
    apply_site_args(&mut config, &sites);
    let flag_sources = AuditFlagSources::from_args(raw_args);
    resolve_audit_settings(&mut config, viewport, tolerance, &flag_sources);
    if let Err(err) = validate_config(&config, config_path.as_deref()) {
        return render_error(err, format, output);
    }

    let only = match parse_categories(&only) {
        Ok(only) => only,
        Err(err) => return render_error(err, format, output),
    };

    if verbose {
        eprintln!("{}", format_effective_config(&config, config_path.as_deref()));
        if !only.is_empty() {
            let names: Vec<String> = only.iter().map(|c| c.to_string()).collect();
            eprintln!("Running categories: {}", names.join(", "));
        }
    }

    let browser = match RemoteBrowser::new(config.browser.clone()) {
        Ok(browser) => browser,
        Err(err) => return render_error(err, format, output),
    };
    let options = AuditOptions {
        only,
        focus,
        skip_responsive,
    };

    let report = match run_audit(&browser, &config, &options).await {
        Ok(report) => report,
        Err(err) => return render_error(err, format, output),
    };

    if verbose {
        eprintln!(
            "Audit finished: {}/{} pass",
            report.summary.overall.pass, report.summary.overall.total
        );
    }

    let passed = report.passed();
    let body = AuditOutput::Audit(report);
    if let Err(e) = write_output(&body, format, output.clone()) {
        return render_error(AuditError::Unknown(e.to_string()), format, output);
    }
    exit_code_for_audit(passed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_categories_accepts_known_names() {
        let raw = vec!["css".to_string(), " dom ".to_string(), String::new()];
        let parsed = parse_categories(&raw).expect("known categories");
        assert_eq!(parsed, vec![Category::Css, Category::Dom]);
    }

    #[test]
    fn parse_categories_rejects_unknown_names() {
        let raw = vec!["css".to_string(), "fonts".to_string()];
        let err = parse_categories(&raw).expect_err("unknown category");
        assert!(matches!(err, AuditError::Config(_)));
    }
}
