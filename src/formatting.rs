use std::fmt::Write as FmtWrite;
use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use theme_audit_lib::output::{AuditReport, CaptureReport, DiffReport};
use theme_audit_lib::suites::{CssElementResult, CssStatus};
use theme_audit_lib::{AuditError, AuditOutput, Category, ErrorOutput, AUDIT_OUTPUT_VERSION};

use crate::cli::OutputFormat;

/// Other mismatches listed per element before the rest are summarized.
const MAX_OTHER_MISMATCHES: usize = 5;

/// Write output in the requested format.
pub fn write_output(
    body: &AuditOutput,
    format: OutputFormat,
    output: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    match format {
        OutputFormat::Json => write_json_output(body, output.as_deref())?,
        OutputFormat::Pretty => write_pretty_output(body, output.as_deref())?,
    };
    Ok(())
}

/// Render an error and return the appropriate exit code.
pub fn render_error(err: AuditError, format: OutputFormat, output: Option<PathBuf>) -> ExitCode {
    let error_payload = err.to_payload();
    let payload = AuditOutput::Error(ErrorOutput {
        version: AUDIT_OUTPUT_VERSION.to_string(),
        message: Some(error_payload.message.clone()),
        error: error_payload,
    });

    match format {
        OutputFormat::Json => {
            let content =
                serde_json::to_string(&payload).unwrap_or_else(|_| "{\"mode\":\"error\"}".into());
            if let Some(path) = output {
                if let Err(write_err) = std::fs::write(&path, &content) {
                    eprintln!("Failed to write error output: {}", write_err);
                    println!("{content}");
                }
            } else {
                println!("{content}");
            }
        }
        OutputFormat::Pretty => {
            if let Err(write_err) = write_pretty_output(&payload, output.as_deref()) {
                eprintln!("Failed to write error output: {}", write_err);
            }
        }
    };

    // Reserve exit code 2 for fatal/errors; check failures use 1.
    ExitCode::from(2)
}

/// Write JSON output to file or stdout.
fn write_json_output(body: &AuditOutput, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    let content = serde_json::to_string(body)?;
    if let Some(path) = output {
        std::fs::write(path, content)?;
    } else {
        println!("{content}");
    }
    Ok(())
}

/// Write pretty output to file or stdout.
fn write_pretty_output(body: &AuditOutput, output: Option<&Path>) -> io::Result<()> {
    let stdout_is_tty = std::io::stdout().is_terminal();
    let use_human = output.is_none() && stdout_is_tty;

    if use_human {
        let content = format_pretty(body, true);
        println!("{content}");
        return Ok(());
    }

    // Non-tty or file output: keep JSON shape for pipelines/files.
    let content =
        serde_json::to_string_pretty(body).unwrap_or_else(|_| "{\"mode\":\"error\"}".to_string());
    if let Some(path) = output {
        std::fs::write(path, &content)?;
    } else {
        println!("{content}");
    }
    Ok(())
}

/// Format output for human consumption in a terminal.
pub fn format_pretty(body: &AuditOutput, colorize: bool) -> String {
    match body {
        AuditOutput::Audit(report) => format_audit(report, colorize),
        AuditOutput::Diff(report) => format_diff(report, colorize),
        AuditOutput::Capture(report) => format_capture(report, colorize),
        AuditOutput::Error(out) => {
            let mut buf = String::new();
            let header = color("[ERROR]", "31", colorize);
            let message = out
                .message
                .as_deref()
                .unwrap_or_else(|| out.error.message.as_str());
            writeln!(buf, "{} {}", header, message).ok();
            if let Some(remediation) = &out.error.remediation {
                writeln!(buf, "Hint: {}", remediation).ok();
            }
            buf
        }
    }
}

fn banner(buf: &mut String, title: &str) {
    writeln!(buf, "╔══════════════════════════════════════════════════════════════╗").ok();
    writeln!(buf, "║{:^62}║", title).ok();
    writeln!(buf, "╚══════════════════════════════════════════════════════════════╝").ok();
    writeln!(buf).ok();
}

fn section(buf: &mut String, title: &str) {
    let rule = "─".repeat(56usize.saturating_sub(title.chars().count()));
    writeln!(buf, "── {title} ──{rule}").ok();
    writeln!(buf).ok();
}

fn css_icon(status: CssStatus) -> &'static str {
    match status {
        CssStatus::Pass => "✅",
        CssStatus::Fail => "❌",
        CssStatus::Skip => "⏭️",
        CssStatus::Error => "⚠️",
    }
}

fn quoted(value: Option<&str>) -> String {
    value.map_or_else(|| "null".to_string(), |v| format!("\"{v}\""))
}

fn format_css_element(buf: &mut String, r: &CssElementResult, colorize: bool) {
    let score = if r.checked > 0 {
        format!(" ({}/{} props)", r.matched, r.checked)
    } else {
        String::new()
    };
    writeln!(buf, "{} {}{} — {}", css_icon(r.status), r.element, score, r.description).ok();
    if let Some(detail) = &r.detail {
        writeln!(buf, "   {detail}").ok();
    }
    if !r.focus_mismatches.is_empty() {
        writeln!(buf, "   {}", color("CRITICAL mismatches (focus properties):", "31", colorize)).ok();
        for m in &r.focus_mismatches {
            writeln!(
                buf,
                "     ├─ {}: almond={} vs doc={}",
                m.property,
                quoted(m.reference.as_deref()),
                quoted(m.target.as_deref())
            )
            .ok();
        }
    }
    if !r.other_mismatches.is_empty() {
        writeln!(buf, "   Other mismatches ({}):", r.other_mismatches.len()).ok();
        for m in r.other_mismatches.iter().take(MAX_OTHER_MISMATCHES) {
            writeln!(
                buf,
                "     ├─ {}: {} vs {}",
                m.property,
                quoted(m.reference.as_deref()),
                quoted(m.target.as_deref())
            )
            .ok();
        }
        let more = r.other_mismatches.len().saturating_sub(MAX_OTHER_MISMATCHES);
        if more > 0 {
            writeln!(buf, "     └─ ... and {more} more").ok();
        }
    }
    writeln!(buf).ok();
}

fn capitalized(category: Category) -> String {
    let name = category.to_string();
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => name,
    }
}

fn format_audit(report: &AuditReport, colorize: bool) -> String {
    let mut buf = String::new();
    banner(&mut buf, "MINTYSAURUS THEME AUDIT REPORT");

    if let Some(css) = report.css.as_deref().filter(|c| !c.is_empty()) {
        section(&mut buf, Category::Css.title());
        for r in css {
            format_css_element(&mut buf, r, colorize);
        }
    }

    for category in Category::all() {
        let Some(tests) = report.tests(category).filter(|t| !t.is_empty()) else {
            continue;
        };
        section(&mut buf, category.title());
        for t in tests {
            writeln!(buf, "{} {}", if t.pass { "✅" } else { "❌" }, t.name).ok();
            if !t.pass && !t.detail.is_empty() {
                writeln!(buf, "     {}", t.detail).ok();
            }
        }
        writeln!(buf).ok();
    }

    section(&mut buf, "Summary");
    for c in report.summary.categories.iter().filter(|c| c.counts.total > 0) {
        let label = capitalized(c.category);
        let pad = " ".repeat(14usize.saturating_sub(label.len()));
        let failing = if c.counts.fail > 0 {
            color(&format!(" ({} failing)", c.counts.fail), "31", colorize)
        } else {
            String::new()
        };
        writeln!(buf, "  {label}:{pad}{}/{} pass{failing}", c.counts.pass, c.counts.total).ok();
    }
    let overall = report.summary.overall;
    writeln!(buf, "  ─────────────────────────").ok();
    writeln!(buf, "  OVERALL:      {}/{} pass", overall.pass, overall.total).ok();
    writeln!(buf).ok();
    if overall.fail > 0 {
        writeln!(buf, "  ⚠️  {}", color(&format!("{} test(s) failing", overall.fail), "33", colorize)).ok();
    } else {
        writeln!(buf, "  🎉 {}", color("All tests passing!", "32", colorize)).ok();
    }
    buf
}

fn format_diff(report: &DiffReport, colorize: bool) -> String {
    let mut buf = String::new();
    banner(&mut buf, "SCREENSHOT DIFF REPORT");

    let mut current = None;
    for r in &report.regions {
        let heading = (r.breakpoint.as_str(), r.scroll);
        if current != Some(heading) {
            current = Some(heading);
            section(&mut buf, &format!("{}px {}", r.breakpoint, r.scroll));
        }
        match (r.diff_percent, r.diff_pixels) {
            (Some(p), Some(px)) if px > 0 => {
                let total = r.total_pixels.unwrap_or_default();
                let size = r.size.as_deref().unwrap_or("?");
                let pct = color(&format!("{p}%"), "31", colorize);
                writeln!(buf, "   {}: {pct} different ({px}/{total} px) [{size}]", r.region).ok();
            }
            (Some(_), Some(_)) => {
                writeln!(buf, "   {}: {}", r.region, color("0% identical", "32", colorize)).ok();
            }
            (p, _) => {
                let detail = r.detail.as_deref().unwrap_or("no data");
                let pct = p.map(|p| format!(" ({p}%)")).unwrap_or_default();
                writeln!(buf, "⚠️  {}: {detail}{pct}", r.region).ok();
            }
        }
    }
    for f in &report.failures {
        writeln!(buf, "{} {}px: {}", color("[SKIPPED]", "33", colorize), f.breakpoint, f.message).ok();
    }
    writeln!(buf).ok();
    writeln!(buf, "Diff images: {}/diff-*.png", report.output_dir.display()).ok();
    buf
}

fn format_capture(report: &CaptureReport, colorize: bool) -> String {
    let mut buf = String::new();
    let header = color("[CAPTURE]", "36", colorize);
    writeln!(buf, "{header} {} screenshot(s)", report.shots.len()).ok();
    for shot in &report.shots {
        let name = shot
            .path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| shot.path.display().to_string());
        writeln!(buf, "  {name} ({} bytes)", shot.bytes).ok();
    }
    for f in &report.failures {
        writeln!(buf, "{} {}px: {}", color("[FAILED]", "31", colorize), f.breakpoint, f.message).ok();
    }
    writeln!(buf, "Screenshots saved to {}/", report.output_dir.display()).ok();
    buf
}

/// Apply ANSI color codes when enabled.
fn color(text: &str, code: &str, colorize: bool) -> String {
    if colorize {
        format!("\x1b[{}m{}\x1b[0m", code, text)
    } else {
        text.to_string()
    }
}

/// 0 when every check passed, 1 when any failed.
pub fn exit_code_for_audit(passed: bool) -> ExitCode {
    if passed {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(1)
    }
}
