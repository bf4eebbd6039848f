use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use theme_audit_lib::Viewport;

#[derive(Parser)]
#[command(name = "theme-audit")]
#[command(
    version,
    about = "Theme Audit - Compare a themed docs site against its hosted reference",
    long_about = "Theme Audit\n\nModes:\n- audit: run the css, behavioral, layout, dom, visual and responsive checks against a remote Chromium.\n- diff: capture both sites at every breakpoint and write exact pixel diffs per region.\n- capture: save top/middle/bottom screenshots of both sites for manual review.\n\nUse --help on any subcommand for details."
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(
        long,
        global = true,
        value_name = "PATH",
        help = "Optional config file (TOML, or YAML by extension) for URLs, tolerances, thresholds and breakpoints; CLI flags override config"
    )]
    pub config: Option<PathBuf>,
}

/// Which two pages to compare and where the browser listens.
#[derive(Args, Debug, Clone, Default)]
pub struct SiteArgs {
    #[arg(long, value_name = "URL", help = "Reference page (the hosted original)")]
    pub reference_url: Option<String>,

    #[arg(long, value_name = "URL", help = "Target page (the themed rebuild)")]
    pub target_url: Option<String>,

    #[arg(long, value_name = "HOST", help = "Remote debugging host of the Chromium instance")]
    pub cdp_host: Option<String>,

    #[arg(long, value_name = "PORT", help = "Remote debugging port of the Chromium instance")]
    pub cdp_port: Option<u16>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the audit categories and report pass/fail per check
    Audit {
        #[command(flatten)]
        sites: SiteArgs,

        #[arg(
            long,
            default_value = "1440x900",
            help = "Viewport for the desktop categories (WIDTHxHEIGHT)"
        )]
        viewport: Viewport,

        #[arg(
            long,
            value_delimiter = ',',
            value_name = "CATEGORY",
            help = "Only run these categories (css,behavioral,layout,dom,responsive,visual); repeatable"
        )]
        only: Vec<String>,

        #[arg(long, value_name = "ELEMENT", help = "Restrict the css category to one registry element")]
        focus: Option<String>,

        #[arg(long, help = "Skip the per-breakpoint responsive checks")]
        skip_responsive: bool,

        #[arg(long, default_value = "1", help = "Allowed px difference for lengths")]
        tolerance_px: f64,

        #[arg(long, default_value = "3", help = "Allowed per-channel difference for colors (0-255)")]
        tolerance_color: f64,

        #[arg(long, default_value = "0.03", help = "Allowed alpha difference for colors (0-1)")]
        tolerance_alpha: f64,

        #[arg(long, value_enum, default_value = "json", help = "Output format")]
        format: OutputFormat,

        #[arg(long, short, help = "Output file path (stdout if omitted)")]
        output: Option<PathBuf>,
    },

    /// Capture both sites at every breakpoint and diff their regions pixel by pixel
    Diff {
        #[command(flatten)]
        sites: SiteArgs,

        #[arg(long, value_name = "PATH", help = "Directory for screenshots and diff images")]
        out_dir: Option<PathBuf>,

        #[arg(long, value_enum, default_value = "json", help = "Output format")]
        format: OutputFormat,

        #[arg(long, short, help = "Output file path (stdout if omitted)")]
        output: Option<PathBuf>,
    },

    /// Save top, middle and bottom screenshots of both sites at every breakpoint
    Capture {
        #[command(flatten)]
        sites: SiteArgs,

        #[arg(long, value_name = "PATH", help = "Directory for the screenshots")]
        out_dir: Option<PathBuf>,

        #[arg(long, value_enum, default_value = "json", help = "Output format")]
        format: OutputFormat,

        #[arg(long, short, help = "Output file path (stdout if omitted)")]
        output: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Json,
    Pretty,
}

pub fn parse() -> Cli {
    Cli::parse()
}
