mod echo;

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use alertsift_core::{
    Alert, AnalysisReport, Channel, ExtractConfig, ListConfig, ListFormat, extract_actual_url, format_article_list,
    is_excluded_domain_with, is_redirect_url, load_report, parse_eml, render_analysis_markdown, split_by_channel,
};
use anyhow::{Context, bail};
use clap::{Args, Parser, Subcommand};
use owo_colors::OwoColorize;
use tracing_subscriber::EnvFilter;

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Output format for extracted alerts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AlertFormat {
    Json,
    Text,
}

impl FromStr for AlertFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "text" | "txt" => Ok(Self::Text),
            _ => Err(format!("Invalid format: {}. Valid options: json, text", s)),
        }
    }
}

/// Extract, resolve and list articles from Google Alert and Scholar Alert emails
#[derive(Parser, Debug)]
#[command(name = "alertsift")]
#[command(author = "alertsift contributors")]
#[command(version)]
#[command(about = "Article lists from Google Alert and Scholar Alert emails", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract the articles from alert emails (.eml files)
    Extract(ExtractArgs),
    /// Print a chronological article list from analysis reports
    List(ListArgs),
    /// Render an analysis report as Markdown
    Report(ReportArgs),
    /// Unwrap redirect URLs and check them against the exclusion list
    Resolve(ResolveArgs),
}

#[derive(Args, Debug)]
struct ExtractArgs {
    /// Email files to read
    #[arg(value_name = "EML", required = true)]
    files: Vec<PathBuf>,

    /// Alert channel (google, scholar); guessed from the subject when omitted
    #[arg(short, long, value_name = "CHANNEL")]
    channel: Option<Channel>,

    /// Output format (json, text)
    #[arg(short, long, default_value = "json", value_name = "FORMAT")]
    format: AlertFormat,

    /// Additional domain to exclude (repeatable)
    #[arg(long = "exclude", value_name = "DOMAIN")]
    exclude: Vec<String>,
}

#[derive(Args, Debug)]
struct ListArgs {
    /// Google Alerts analysis report
    #[arg(long, default_value = "report.json", value_name = "PATH")]
    google_alerts: PathBuf,

    /// Scholar Alerts analysis report
    #[arg(long, default_value = "scholar_report.json", value_name = "PATH")]
    scholar_alerts: PathBuf,

    /// Only list articles from Google Alerts
    #[arg(long, conflicts_with = "scholar_alerts_only")]
    google_alerts_only: bool,

    /// Only list articles from Scholar Alerts
    #[arg(long)]
    scholar_alerts_only: bool,

    /// Output format (text, markdown, json)
    #[arg(short, long, default_value = "text", value_name = "FORMAT")]
    format: ListFormat,

    /// Output file (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Include articles judged not relevant
    #[arg(long)]
    show_all: bool,

    /// Write one file per channel next to --output
    #[arg(long, requires = "output")]
    separate: bool,
}

#[derive(Args, Debug)]
struct ReportArgs {
    /// Analysis report JSON
    #[arg(value_name = "REPORT")]
    report: PathBuf,

    /// Channel the report was produced for (google, scholar)
    #[arg(short, long, default_value = "google", value_name = "CHANNEL")]
    channel: Channel,

    /// Output file (default: stdout)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct ResolveArgs {
    /// URLs to resolve
    #[arg(value_name = "URL", required = true)]
    urls: Vec<String>,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).with_target(false).init();
}

fn write_output(path: Option<&Path>, content: &str) -> anyhow::Result<()> {
    match path {
        Some(path) => {
            fs::write(path, content).with_context(|| format!("Failed to write to file: {}", path.display()))?;
            echo::print_success(&format!("Output written to {}", path.display().bright_white()));
        }
        None => print!("{}", content),
    }
    Ok(())
}

fn render_alert_text(alert: &Alert) -> String {
    let mut out = format!("{} ({})\n", alert.alert_query, alert.date);
    for (i, article) in alert.articles.iter().enumerate() {
        out.push_str(&format!("{}. {}\n   {}\n", i + 1, article.title, article.url));
    }
    out
}

fn run_extract(args: ExtractArgs, verbose: bool) -> anyhow::Result<()> {
    let mut config = ExtractConfig::default();
    config.exclude_domains.extend(args.exclude);

    let total = args.files.len();
    let mut alerts = Vec::with_capacity(total);

    for (i, path) in args.files.iter().enumerate() {
        if verbose {
            echo::print_step(i + 1, total, &format!("Reading {}", path.display().bright_white()));
        }

        let bytes = fs::read(path).with_context(|| format!("Failed to read file: {}", path.display()))?;
        let (message, _) = parse_eml(&bytes).with_context(|| format!("Failed to parse email: {}", path.display()))?;

        let channel = match args.channel {
            Some(channel) => channel,
            None => Channel::from_subject(&message.subject).unwrap_or_else(|| {
                echo::print_warning(&format!("No alert prefix in subject of {}, assuming google", path.display()));
                Channel::GoogleAlerts
            }),
        };

        let alert = Alert::from_message(&message, channel, &config);
        if verbose {
            echo::print_detail("Query", &alert.alert_query);
            echo::print_detail("Articles", &alert.articles.len().to_string());
        }
        alerts.push(alert);
    }

    let output = match args.format {
        AlertFormat::Json => serde_json::to_string_pretty(&alerts).context("Failed to serialize alerts")? + "\n",
        AlertFormat::Text => alerts.iter().map(render_alert_text).collect::<Vec<_>>().join("\n"),
    };
    write_output(None, &output)
}

fn run_list(args: &ListArgs) -> anyhow::Result<()> {
    let mut sources = Vec::new();
    if !args.scholar_alerts_only {
        sources.push((Channel::GoogleAlerts, &args.google_alerts));
    }
    if !args.google_alerts_only {
        sources.push((Channel::ScholarAlerts, &args.scholar_alerts));
    }

    let mut articles = Vec::new();
    for (channel, path) in sources {
        if !path.exists() {
            echo::print_warning(&format!("{}s file not found: {}", channel.label(), path.display()));
            continue;
        }
        echo::print_info(&format!("Reading {}s from: {}", channel.label(), path.display()));
        let found = load_report(path, channel);
        echo::print_detail("Found", &format!("{} articles", found.len()));
        articles.extend(found);
    }

    if articles.is_empty() {
        echo::print_error("No articles found in any report files.");
        bail!("no articles to list");
    }
    echo::print_success(&format!("Total articles collected: {}", articles.len()));

    let config = ListConfig { format: args.format, include_irrelevant: args.show_all };

    match args.output.as_deref() {
        Some(output) if args.separate => {
            let stem = output.file_stem().and_then(|s| s.to_str()).unwrap_or("articles");
            let extension = output.extension().and_then(|s| s.to_str()).map(|e| format!(".{}", e)).unwrap_or_default();

            for (channel, list) in split_by_channel(&articles) {
                let path = output.with_file_name(format!("{}_{}{}", stem, channel.file_suffix(), extension));
                let content = format_article_list(list, &config)?;
                write_output(Some(path.as_path()), &content)?;
            }
            Ok(())
        }
        output => {
            let content = format_article_list(articles, &config)?;
            write_output(output, &content)
        }
    }
}

fn run_report(args: &ReportArgs) -> anyhow::Result<()> {
    let text = fs::read_to_string(&args.report)
        .with_context(|| format!("Failed to read report: {}", args.report.display()))?;
    let report: AnalysisReport = serde_json::from_str(&text)
        .with_context(|| format!("Invalid report JSON: {}", args.report.display()))?;

    write_output(args.output.as_deref(), &render_analysis_markdown(&report, args.channel))
}

fn run_resolve(args: &ResolveArgs) -> anyhow::Result<()> {
    let config = ExtractConfig::default();
    for url in &args.urls {
        let resolved = extract_actual_url(url);
        let excluded = is_redirect_url(&resolved) || is_excluded_domain_with(&resolved, &config.exclude_domains);
        let status = if excluded { "excluded" } else { "kept" };
        println!("{}\t{}", resolved, status);
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if cli.verbose {
        echo::print_banner();
        echo::print_info("Debug logging enabled");
        eprintln!();
    }

    match cli.command {
        Command::Extract(args) => run_extract(args, cli.verbose),
        Command::List(args) => run_list(&args),
        Command::Report(args) => run_report(&args),
        Command::Resolve(args) => run_resolve(&args),
    }
}
