//! Binary entrypoint for the Chatipelago admin CLI.
//!
//! Local commands:
//! - `init` - write a default `chatipelago-admin.toml`
//! - `check-content <file>` - detect, normalize and validate a content list
//! - `check-config <file>` - validate a client configuration JSON file
//! - `check-template <file>...` - validate message template files
//! - `build-content` - assemble a content list from line files or a YAML file
//!
//! Remote commands (feature `api`) talk to the client's admin API:
//! `status`, `pull-config`, `push-config`, `messages`, `pull-message`,
//! `push-message`, `restart`, `connect`, `logs` and `download-url`.
use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use log::{debug, info, warn};
use std::path::{Path, PathBuf};

use chatipelago_admin::client_config::ClientConfig;
use chatipelago_admin::config::{AdminConfig, DEFAULT_CONFIG_FILE};
use chatipelago_admin::content::{load_content_file, ContentSpec, ManualEntry};
use chatipelago_admin::template::{load_template_file, MessageTemplate};
use chatipelago_admin::validation::{validate_content, ValidationReport};

#[derive(Parser)]
#[command(name = "chatipelago-admin")]
#[command(about = "Operator tooling for the Chatipelago Archipelago chat client")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Settings file path (can be used before or after subcommand)
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE, global = true)]
    config: String,

    /// Verbose logging (-v, -vv for more; may appear before or after subcommand)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default settings file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Validate a content list YAML file and show list sizes
    CheckContent {
        file: PathBuf,
        /// Also write the normalized (nested) YAML here
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Validate a client configuration JSON file
    CheckConfig {
        file: PathBuf,
        /// Print errors as nested JSON grouped by section
        #[arg(long)]
        json: bool,
    },
    /// Validate one or more message template JSON files
    CheckTemplate {
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Build a normalized content list from line files or a content YAML file
    BuildContent {
        /// Generic items, one per line
        #[arg(long)]
        items: Option<PathBuf>,
        /// Progression items, one per line
        #[arg(long)]
        prog_items: Option<PathBuf>,
        /// Trap items, one per line
        #[arg(long)]
        trap_items: Option<PathBuf>,
        /// Locations, one per line
        #[arg(long)]
        locations: Option<PathBuf>,
        /// Priority locations, one per line
        #[arg(long)]
        prog_locations: Option<PathBuf>,
        /// Existing content YAML (nested or flat) instead of line files
        #[arg(short, long, conflicts_with_all = ["items", "prog_items", "trap_items", "locations", "prog_locations"])]
        file: Option<PathBuf>,
        /// Where to write the YAML (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Send the result to the bundle builder
        #[cfg(feature = "api")]
        #[arg(long)]
        submit: bool,
        /// After a successful build, save the bundle here
        #[cfg(feature = "api")]
        #[arg(long, requires = "submit")]
        download: Option<PathBuf>,
    },
    /// Show client status
    #[cfg(feature = "api")]
    Status,
    /// Fetch the client configuration
    #[cfg(feature = "api")]
    PullConfig {
        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Validate and upload a client configuration file
    #[cfg(feature = "api")]
    PushConfig { file: PathBuf },
    /// List message template files
    #[cfg(feature = "api")]
    Messages,
    /// Fetch one message template file
    #[cfg(feature = "api")]
    PullMessage {
        name: String,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Validate and upload one message template file
    #[cfg(feature = "api")]
    PushMessage { name: String, file: PathBuf },
    /// Restart the client
    #[cfg(feature = "api")]
    Restart,
    /// Ask the client to (re)connect a service
    #[cfg(feature = "api")]
    Connect {
        #[arg(value_enum)]
        target: ConnectTarget,
    },
    /// Follow the client console until interrupted
    #[cfg(feature = "api")]
    Logs {
        /// Only show entries at this level
        #[arg(short, long)]
        level: Option<chatipelago_admin::console::LogLevel>,
        /// On exit, save the history (default name when no path is given)
        #[arg(long, num_args = 0..=1)]
        export: Option<Option<PathBuf>>,
    },
    /// Print the download URL for a file served by the client
    #[cfg(feature = "api")]
    DownloadUrl { name: String },
}

#[cfg(feature = "api")]
#[derive(Clone, Copy, clap::ValueEnum)]
enum ConnectTarget {
    Streamerbot,
    Archipelago,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Init writes the settings file, so it must not require one.
    let config = match cli.command {
        Commands::Init { .. } => AdminConfig::default(),
        _ => AdminConfig::load_or_default(&cli.config).await?,
    };
    init_logging(&config, cli.verbose);
    debug!("Using settings from {}", cli.config);

    match cli.command {
        Commands::Init { force } => {
            if !force && tokio::fs::try_exists(&cli.config).await.unwrap_or(false) {
                println!(
                    "Error: {} already exists (use --force to overwrite).",
                    cli.config
                );
                std::process::exit(1);
            }
            AdminConfig::create_default(&cli.config).await?;
            info!("Configuration file created at {}", cli.config);
        }
        Commands::CheckContent { file, output } => {
            let doc = load_content_file(&file)
                .await
                .map_err(|e| anyhow!("Failed to load {}: {}", file.display(), e))?;
            let layout = if doc.is_nested() { "nested" } else { "flat" };
            println!("{}: {} layout", file.display(), layout);

            let report = validate_content(&doc, &config.flat_counts());
            let normalized = doc.normalize();
            for line in normalized.counts().render(&config.flat_counts()) {
                println!("  {}", line);
            }
            exit_on_errors(&report);

            if let Some(output) = output {
                let spec = ContentSpec::from_document(normalized)?;
                write_yaml(&spec, Some(&output)).await?;
            }
            println!("Content is valid.");
        }
        Commands::CheckConfig { file, json } => {
            let text = read_text(&file).await?;
            let client = ClientConfig::from_json_str(&text)
                .map_err(|e| anyhow!("Failed to parse {}: {}", file.display(), e))?;
            info!("Integration mode: {}", client.integration);
            let report = client.validate();
            if report.is_valid() {
                println!("Configuration is valid.");
                return Ok(());
            }
            if json {
                println!("{}", serde_json::to_string_pretty(&report.to_nested())?);
            } else {
                for error in report.errors() {
                    println!("  {}: {}", error.path, error.message);
                }
            }
            std::process::exit(1);
        }
        Commands::CheckTemplate { files } => {
            let variables = config.variables();
            let mut failed = false;
            for file in files {
                let value = match load_template_file(&file).await {
                    Ok(value) => value,
                    Err(e) => {
                        println!("{}: {}", file.display(), e);
                        failed = true;
                        continue;
                    }
                };
                match MessageTemplate::check(&value, &variables) {
                    Ok(MessageTemplate::KeyValue(entries)) => {
                        println!("{}: ok ({} keyed messages)", file.display(), entries.len())
                    }
                    Ok(template) => println!(
                        "{}: ok ({} messages)",
                        file.display(),
                        template.messages().map_or(0, <[String]>::len)
                    ),
                    Err(report) => {
                        println!("{}:", file.display());
                        print_errors(&report);
                        failed = true;
                    }
                }
            }
            if failed {
                std::process::exit(1);
            }
        }
        Commands::BuildContent {
            items,
            prog_items,
            trap_items,
            locations,
            prog_locations,
            file,
            output,
            #[cfg(feature = "api")]
            submit,
            #[cfg(feature = "api")]
            download,
        } => {
            let doc = match file {
                Some(path) => load_content_file(&path)
                    .await
                    .map_err(|e| anyhow!("Failed to load {}: {}", path.display(), e))?,
                None => {
                    let entry = ManualEntry {
                        items: read_optional(items.as_deref()).await?,
                        prog_items: read_optional(prog_items.as_deref()).await?,
                        trap_items: read_optional(trap_items.as_deref()).await?,
                        locations: read_optional(locations.as_deref()).await?,
                        prog_locations: read_optional(prog_locations.as_deref()).await?,
                    };
                    entry
                        .normalize()
                        .ok_or_else(|| anyhow!("No content provided"))?
                }
            };

            exit_on_errors(&validate_content(&doc, &config.flat_counts()));
            let spec = ContentSpec::from_document(doc)?;

            #[cfg(feature = "api")]
            if submit {
                let builder = chatipelago_admin::api::BundleBuilder::from_config(&config.builder);
                let url = builder.build(&spec).await?;
                println!("Build complete: {}", url);
                if let Some(dest) = download {
                    let bytes = builder.download(&dest).await?;
                    info!("Saved {} bytes to {}", bytes, dest.display());
                }
                if output.is_none() {
                    return Ok(());
                }
            }

            write_yaml(&spec, output.as_deref()).await?;
        }
        #[cfg(feature = "api")]
        command => remote::run(command, &config).await?,
    }

    Ok(())
}

fn print_errors(report: &ValidationReport) {
    for error in report.errors() {
        println!("  - {}", error);
    }
}

fn exit_on_errors(report: &ValidationReport) {
    if !report.is_valid() {
        println!("Validation failed:");
        print_errors(report);
        std::process::exit(1);
    }
}

async fn read_text(path: &Path) -> Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|e| anyhow!("Failed to read {}: {}", path.display(), e))
}

async fn read_optional(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => read_text(path).await,
        None => Ok(String::new()),
    }
}

async fn write_yaml(spec: &ContentSpec, output: Option<&Path>) -> Result<()> {
    let yaml = spec.to_yaml()?;
    match output {
        Some(path) => {
            tokio::fs::write(path, yaml)
                .await
                .map_err(|e| anyhow!("Failed to write {}: {}", path.display(), e))?;
            info!("Wrote normalized content to {}", path.display());
        }
        None => print!("{}", yaml),
    }
    Ok(())
}

#[cfg(feature = "api")]
mod remote {
    use super::*;
    use chatipelago_admin::api::AdminApi;
    use chatipelago_admin::client_config::ConfigDraft;
    use chatipelago_admin::console::{export_file_name, LogBuffer};
    use chatipelago_admin::logutil::format_console_entry;

    pub(super) async fn run(command: Commands, config: &AdminConfig) -> Result<()> {
        let api = AdminApi::from_config(&config.api);
        debug!("Admin API at {}", api.base_url());

        match command {
            Commands::Status => {
                let status = api.get_status().await?;
                for line in status.summary() {
                    println!("{}", line);
                }
            }
            Commands::PullConfig { output } => {
                let client = api.get_config().await?;
                for error in client.validate().errors() {
                    warn!("Remote configuration: {}: {}", error.path, error.message);
                }
                let text = serde_json::to_string_pretty(&client)?;
                write_or_print(&text, output.as_deref()).await?;
            }
            Commands::PushConfig { file } => {
                let local = ClientConfig::from_json_str(&read_text(&file).await?)
                    .map_err(|e| anyhow!("Failed to parse {}: {}", file.display(), e))?;

                let mut draft = ConfigDraft::new(api.get_config().await?);
                draft.edit(|c| *c = local);
                if !draft.has_changes() {
                    println!("No changes to save.");
                    return Ok(());
                }
                let report = draft.validate();
                if !report.is_valid() {
                    println!("Validation failed:");
                    for error in report.errors() {
                        println!("  {}: {}", error.path, error.message);
                    }
                    std::process::exit(1);
                }
                api.update_config(draft.local()).await?;
                draft.mark_saved();
                println!("Configuration saved.");
            }
            Commands::Messages => {
                for name in api.list_message_files().await? {
                    println!("{}", name);
                }
            }
            Commands::PullMessage { name, output } => {
                let value = api.get_message_file(&name).await?;
                if MessageTemplate::detect(&value).is_none() {
                    warn!("{} does not look like a message template", name);
                }
                let text = serde_json::to_string_pretty(&value)?;
                write_or_print(&text, output.as_deref()).await?;
            }
            Commands::PushMessage { name, file } => {
                let value = load_template_file(&file)
                    .await
                    .map_err(|e| anyhow!("Failed to load {}: {}", file.display(), e))?;
                let template = match MessageTemplate::check(&value, &config.variables()) {
                    Ok(template) => template,
                    Err(report) => {
                        exit_on_errors(&report);
                        return Ok(());
                    }
                };
                api.update_message_file(&name, &template.to_value()).await?;
                println!("Saved {}.", name);
            }
            Commands::Restart => {
                api.restart_client().await?;
                println!("Restart requested.");
            }
            Commands::Connect { target } => {
                match target {
                    ConnectTarget::Streamerbot => api.connect_streamerbot().await?,
                    ConnectTarget::Archipelago => api.connect_archipelago().await?,
                };
                println!("Connection requested.");
            }
            Commands::Logs { level, export } => {
                let mut buffer = LogBuffer::new(config.console.max_messages);
                let stream = api.stream_console(|entry| {
                    if level.map_or(true, |l| entry.level == l) {
                        println!("{}", format_console_entry(&entry));
                    }
                    buffer.push(entry);
                });
                tokio::select! {
                    res = stream => res?,
                    _ = tokio::signal::ctrl_c() => info!("Interrupted"),
                }

                if let Some(path) = export {
                    let path = path.unwrap_or_else(|| {
                        PathBuf::from(export_file_name(chrono::Local::now().date_naive()))
                    });
                    tokio::fs::write(&path, buffer.export())
                        .await
                        .map_err(|e| anyhow!("Failed to write {}: {}", path.display(), e))?;
                    info!("Exported {} log entries to {}", buffer.len(), path.display());
                }
            }
            Commands::DownloadUrl { name } => println!("{}", api.download_url(&name)),
            Commands::Init { .. }
            | Commands::CheckContent { .. }
            | Commands::CheckConfig { .. }
            | Commands::CheckTemplate { .. }
            | Commands::BuildContent { .. } => unreachable!("local commands are handled in main"),
        }
        Ok(())
    }

    async fn write_or_print(text: &str, output: Option<&Path>) -> Result<()> {
        match output {
            Some(path) => {
                tokio::fs::write(path, text)
                    .await
                    .map_err(|e| anyhow!("Failed to write {}: {}", path.display(), e))?;
                info!("Wrote {}", path.display());
            }
            None => println!("{}", text),
        }
        Ok(())
    }
}

fn init_logging(config: &AdminConfig, verbosity: u8) {
    use std::io::Write;
    let mut builder = env_logger::Builder::new();
    // CLI verbosity overrides the configured level
    let base_level = match verbosity {
        0 => config
            .logging
            .level
            .parse()
            .unwrap_or(log::LevelFilter::Info),
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    builder.filter_level(base_level);

    let file = config.logging.file.as_ref().and_then(|path| {
        std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .ok()
    });

    if let Some(f) = file {
        let write_mutex = std::sync::Arc::new(std::sync::Mutex::new(f));
        // Mirror to the console only when someone is watching
        let is_tty = atty::is(atty::Stream::Stderr);
        builder.format(move |fmt, record| {
            let ts = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
            let line = format!("{} [{}] {}", ts, record.level(), record.args());
            if let Ok(mut guard) = write_mutex.lock() {
                let _ = writeln!(guard, "{}", line);
            }
            if is_tty {
                writeln!(fmt, "{}", line)
            } else {
                Ok(())
            }
        });
    } else {
        builder.format(|fmt, record| {
            let ts = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
            writeln!(fmt, "{} [{}] {}", ts, record.level(), record.args())
        });
    }
    let _ = builder.try_init();
}
