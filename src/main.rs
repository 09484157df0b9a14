//! Management CLI for the SVG upload pipeline
//! Reads and toggles feature flags in the options file, and offers an
//! ad-hoc `check` command that runs the sanitizer against a local file.

use std::path::{Path, PathBuf};
use std::process;

use clap::{Arg, ArgAction, Command};
use svguard::{Options, Sanitizer};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let matches = build_cli().get_matches();

    let verbose = matches
        .get_one::<String>("verbose")
        .map(String::as_str)
        .unwrap_or("info");
    init_logging(verbose);

    let config_path = PathBuf::from(matches.get_one::<String>("config").unwrap());

    let outcome = match matches.subcommand() {
        Some(("list", _)) => list_features(&config_path),
        Some(("enable", sub)) => {
            set_feature(&config_path, sub.get_one::<String>("feature").unwrap(), true)
        }
        Some(("disable", sub)) => {
            set_feature(&config_path, sub.get_one::<String>("feature").unwrap(), false)
        }
        Some(("enable-all", _)) => set_all(&config_path, true),
        Some(("disable-all", _)) => set_all(&config_path, false),
        Some(("check", sub)) => {
            check_file(Path::new(sub.get_one::<String>("file").unwrap())).await
        }
        _ => unreachable!("subcommand is required"),
    };

    if let Err(e) = outcome {
        error!("{}", e);
        process::exit(1);
    }
}

fn build_cli() -> Command {
    Command::new("svguard")
        .version("0.1.0")
        .about("SVG upload sanitization and feature management")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .default_value("svguard.json")
                .global(true)
                .help("Options file (JSON or YAML)"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .value_name("LEVEL")
                .default_value("info")
                .global(true)
                .help("Logging verbosity (error/warn/info/debug/trace)"),
        )
        .subcommand(Command::new("list").about("List all features and their status"))
        .subcommand(
            Command::new("enable").about("Enable a feature").arg(
                Arg::new("feature")
                    .value_name("FEATURE")
                    .required(true)
                    .help("The feature to enable"),
            ),
        )
        .subcommand(
            Command::new("disable").about("Disable a feature").arg(
                Arg::new("feature")
                    .value_name("FEATURE")
                    .required(true)
                    .help("The feature to disable"),
            ),
        )
        .subcommand(Command::new("enable-all").about("Enable all features"))
        .subcommand(Command::new("disable-all").about("Disable all features"))
        .subcommand(
            Command::new("check")
                .about("Run the sanitizer against a local SVG file")
                .arg(
                    Arg::new("file")
                        .value_name("FILE")
                        .required(true)
                        .action(ArgAction::Set)
                        .help("Path of the SVG file to check"),
                ),
        )
}

fn init_logging(level: &str) {
    use tracing_subscriber::{EnvFilter, FmtSubscriber};

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::new(format!("svguard={}", level)))
        .with_target(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");
}

fn list_features(config_path: &Path) -> svguard::Result<()> {
    let options = Options::load(config_path)?;

    println!("{:<12} {}", "FEATURE", "STATUS");
    for (feature, enabled) in options.features() {
        let status = if enabled { "enabled" } else { "disabled" };
        println!("{:<12} {}", feature, status);
    }
    Ok(())
}

fn set_feature(config_path: &Path, feature: &str, enabled: bool) -> svguard::Result<()> {
    let mut options = Options::load(config_path)?;
    options.set(feature, enabled)?;
    options.save(config_path)?;

    let action = if enabled { "enabled" } else { "disabled" };
    info!("Feature '{}' {}.", feature, action);
    Ok(())
}

fn set_all(config_path: &Path, enabled: bool) -> svguard::Result<()> {
    let mut options = Options::load(config_path)?;
    options.set_all(enabled);
    options.save(config_path)?;

    let action = if enabled { "enabled" } else { "disabled" };
    info!("All features {}.", action);
    Ok(())
}

async fn check_file(path: &Path) -> svguard::Result<()> {
    let content = tokio::fs::read(path).await?;

    if Sanitizer::is_valid_bytes(&content) {
        println!("{}: valid", path.display());
        Ok(())
    } else {
        println!("{}: rejected", path.display());
        process::exit(1);
    }
}
