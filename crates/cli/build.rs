use std::{env, error::Error, fs, path::PathBuf};

use clap::{Command, arg, value_parser};
use clap_complete::shells::{Bash, Fish, PowerShell, Zsh};

fn cli() -> Command {
    let channel = || arg!(-c --channel <CHANNEL> "Alert channel (google, scholar)").value_parser(["google", "scholar"]);
    let output = || arg!(-o --output <FILE> "Output file (default: stdout)").value_parser(value_parser!(PathBuf));

    Command::new("alertsift")
        .about("Article lists from Google Alert and Scholar Alert emails")
        .arg(arg!(-v --verbose "Enable debug logging").global(true))
        .subcommand(
            Command::new("extract")
                .about("Extract the articles from alert emails (.eml files)")
                .arg(arg!(<EML> ... "Email files to read").value_parser(value_parser!(PathBuf)))
                .arg(channel())
                .arg(arg!(-f --format <FORMAT> "Output format").value_parser(["json", "text"]))
                .arg(arg!(--exclude <DOMAIN> ... "Additional domain to exclude")),
        )
        .subcommand(
            Command::new("list")
                .about("Print a chronological article list from analysis reports")
                .arg(arg!(--"google-alerts" <PATH> "Google Alerts analysis report").value_parser(value_parser!(PathBuf)))
                .arg(arg!(--"scholar-alerts" <PATH> "Scholar Alerts analysis report").value_parser(value_parser!(PathBuf)))
                .arg(arg!(--"google-alerts-only" "Only list articles from Google Alerts"))
                .arg(arg!(--"scholar-alerts-only" "Only list articles from Scholar Alerts"))
                .arg(arg!(-f --format <FORMAT> "Output format").value_parser(["text", "markdown", "json"]))
                .arg(output())
                .arg(arg!(--"show-all" "Include articles judged not relevant"))
                .arg(arg!(--separate "Write one file per channel next to --output")),
        )
        .subcommand(
            Command::new("report")
                .about("Render an analysis report as Markdown")
                .arg(arg!(<REPORT> "Analysis report JSON").value_parser(value_parser!(PathBuf)))
                .arg(channel())
                .arg(output()),
        )
        .subcommand(
            Command::new("resolve")
                .about("Unwrap redirect URLs and check them against the exclusion list")
                .arg(arg!(<URL> ... "URLs to resolve")),
        )
}

fn main() -> Result<(), Box<dyn Error>> {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-env-changed=OUT_DIR");

    let out_dir = PathBuf::from(env::var("OUT_DIR")?);
    let completions_dir = out_dir.join("completions");
    fs::create_dir_all(&completions_dir)?;

    let mut cmd = cli();
    clap_complete::generate_to(Bash, &mut cmd, "alertsift", &completions_dir)?;
    clap_complete::generate_to(Zsh, &mut cmd, "alertsift", &completions_dir)?;
    clap_complete::generate_to(Fish, &mut cmd, "alertsift", &completions_dir)?;
    clap_complete::generate_to(PowerShell, &mut cmd, "alertsift", &completions_dir)?;

    println!("cargo:warning=Shell completions generated in: {}", completions_dir.display());
    Ok(())
}
