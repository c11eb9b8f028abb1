use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use log::info;
use std::fs;
use std::path::{Path, PathBuf};

mod cli;

use cli::Cli;
use cli::commands::{Commands, FileVersion, PrefsCommands};
use olive::config::{Config, load_config};
use olive::document::{OliFile, write_document};
use olive::preferences::{PreferenceFile, PreferencesPatch, UserPreferences};

fn setup_logging() -> Result<()> {
    // Create log directory
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("olive")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let log_file = log_dir.join("olive.log");

    // Setup env_logger with file output
    let target = Box::new(
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .context("Failed to open log file")?,
    );

    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Pipe(target))
        .init();

    info!("Logging initialized, writing to: {}", log_file.display());
    Ok(())
}

async fn run_application(cli: &Cli, config: &Config) -> Result<()> {
    info!("Starting application");

    if cli.is_verbose() {
        println!("{}", "Verbose mode enabled".yellow());
    }

    match &cli.command {
        Commands::Inspect { file } => handle_inspect_command(file).await,
        Commands::Convert { file, to, output } => handle_convert_command(file, *to, output.as_deref(), config).await,
        Commands::Prefs { command } => handle_prefs_command(command, config),
    }
}

async fn read_file(file: &Path) -> Result<OliFile> {
    let bytes = tokio::fs::read(file)
        .await
        .context(format!("Failed to read {}", file.display()))?;
    OliFile::decode(&bytes).context(format!("Unable to open {}", file.display()))
}

async fn handle_inspect_command(file: &Path) -> Result<()> {
    info!("Inspecting {}", file.display());
    let decoded = read_file(file).await?;
    let version = decoded.version();
    let doc = decoded.into_verbose();

    println!("{} {}", "Document:".green(), file.display());
    println!("  version:     {:.1}", version);
    println!(
        "  characters:  {} ({} printed, {} erased)",
        doc.content.len(),
        doc.printed_characters().count(),
        doc.content.len() - doc.printed_characters().count()
    );
    println!(
        "  pen:         {} samples in {} strokes",
        doc.pen_markings.iter().filter(|m| m.is_some()).count(),
        doc.stroke_count()
    );
    match doc.paper_color {
        Some(color) => println!("  paper color: {}", color),
        None => println!("  paper color: {}", "unset".dimmed()),
    }
    Ok(())
}

async fn handle_convert_command(file: &Path, to: FileVersion, output: Option<&Path>, config: &Config) -> Result<()> {
    info!("Converting {} to {:?}", file.display(), to);
    let doc = read_file(file).await?.into_verbose();
    let target = output.unwrap_or(file);
    let written = write_document(target, &doc, to.into(), config.documents.pretty)
        .await
        .context(format!("Failed to write {}", target.display()))?;
    println!("{} {}", "Wrote:".green(), written.display());
    Ok(())
}

fn handle_prefs_command(command: &PrefsCommands, config: &Config) -> Result<()> {
    let file = PreferenceFile::new(&config.preferences.path);
    info!("Handling prefs command {:?} on {}", command, file.path().display());

    match command {
        PrefsCommands::Show => {
            let stored = PreferencesPatch::from_value(&file.get());
            let mut prefs = UserPreferences::default();
            prefs.apply(&stored);

            println!("{} {}", "Preferences:".green(), file.path().display());
            let color = prefs
                .default_paper_color
                .map(|c| c.to_string())
                .unwrap_or_else(|| "random".to_string());
            println!("  defaultPaperColor: {}", color);
            println!("  inkBleed:          {}", prefs.ink_bleed);
            println!("  pageMarkers:       {}", prefs.page_markers);
            println!("  bellSound:         {}", prefs.bell_sound);
            println!("  otherSounds:       {}", prefs.other_sounds);
        }
        PrefsCommands::Reset => {
            file.clear().context("Failed to reset preferences")?;
            println!("{}", "Preferences reset to defaults".yellow());
        }
        PrefsCommands::Set { key, value } => {
            let mut stored = PreferencesPatch::from_value(&file.get());
            stored.set(key, value)?;
            file.set(&stored.to_value()?).context("Failed to store preferences")?;
            println!("{} {} = {}", "Set:".green(), key, value);
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Setup logging first
    setup_logging().context("Failed to setup logging")?;

    // Parse CLI arguments
    let cli = Cli::parse();

    // Load configuration
    let config = load_config(cli.config.as_ref()).context("Failed to load configuration")?;

    info!("Starting with config from: {:?}", cli.config);

    // Run the main application logic
    run_application(&cli, &config).await.context("Application failed")?;

    Ok(())
}
