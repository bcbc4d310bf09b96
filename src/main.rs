use anyhow::Context;
use clap::{Parser, ValueEnum};
use photo_weather::PhotoWeather;
use photo_weather::config::Settings;
use photo_weather::report::{ArtifactKind, ReportFormat};
use photo_weather::shell::choose_folders;
use std::io;
use std::path::PathBuf;

/// Report formats accepted by `--format`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum FormatArg {
    /// Markdown document plus an HTML map.
    Document,
    /// `points.json` with charts, plus a static page rendering it.
    Feed,
    /// Both.
    All,
}

impl From<FormatArg> for ReportFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Document => Self::Document,
            FormatArg::Feed => Self::Feed,
            FormatArg::All => Self::All,
        }
    }
}

/// Map geotagged photos and report the weather at the time and place they were taken.
#[derive(Debug, Parser)]
#[command(name = "photo_weather", version, about)]
struct Cli {
    /// Folder with photos. Asked for when omitted.
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Folder to write the report to. Asked for when omitted.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Report to produce. Overrides the configured format.
    #[arg(short, long, value_enum)]
    format: Option<FormatArg>,

    /// Extra configuration file, applied above the standard ones.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Always query the weather service, never the response cache.
    #[arg(long)]
    no_cache: bool,

    /// Open the generated map in the default browser.
    #[arg(long)]
    open: bool,

    /// Log debug output.
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log errors.
    #[arg(short, long)]
    quiet: bool,
}

fn init_tracing(quiet: bool, verbose: bool) -> anyhow::Result<()> {
    let level = if quiet {
        "error"
    } else if verbose {
        "debug"
    } else {
        "info"
    };

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    if let Err(error) = run().await {
        eprintln!("photo_weather error: {error:#}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.quiet, cli.verbose)?;

    let mut settings = Settings::load(cli.config.as_deref()).context("loading configuration")?;
    if cli.no_cache {
        settings.cache.enabled = false;
    }
    let format = cli.format.map_or(settings.report.format, ReportFormat::from);

    let folders = choose_folders(cli.input, cli.output, io::stdin().lock(), io::stdout())?;

    let client = settings
        .weather_client()
        .context("creating the weather client")?;
    let mut pipeline = PhotoWeather::builder()
        .maybe_exiftool_path(settings.exiftool_path.clone())
        .client(client)
        .scan(settings.scan.clone())
        .build()
        .context("starting exiftool")?;

    let artifacts = pipeline
        .run(&folders.input, &folders.output, format)
        .await
        .with_context(|| format!("building the report for {}", folders.input.display()))?;

    for artifact in &artifacts {
        println!("{} saved as {}", artifact.kind, artifact.path.display());
    }

    if cli.open {
        let map = artifacts
            .iter()
            .find(|a| a.kind == ArtifactKind::Map)
            .or_else(|| artifacts.iter().find(|a| a.kind == ArtifactKind::Page));
        if let Some(map) = map {
            opener::open(&map.path).with_context(|| format!("opening {}", map.path.display()))?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_format_flag_maps_to_report_format() {
        let cli = Cli::try_parse_from(["photo_weather", "--format", "feed"]).unwrap();
        assert_eq!(cli.format.map(ReportFormat::from), Some(ReportFormat::Feed));

        let cli = Cli::try_parse_from(["photo_weather"]).unwrap();
        assert!(cli.format.is_none());
    }

    #[test]
    fn test_unknown_format_is_rejected() {
        assert!(Cli::try_parse_from(["photo_weather", "--format", "docx"]).is_err());
    }
}
