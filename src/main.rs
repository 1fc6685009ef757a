//! imgconv — command-line client for the image conversion service.

use std::path::PathBuf;
use std::time::Duration;

use clap::{ArgAction, Args, Parser, Subcommand};

use imgconv::app::App;
use imgconv::config::{ServiceConfig, ENV_SETTINGS_PATH};
use imgconv::format::format_file_size;
use imgconv::managers::options_editor::OptionsEditorTrait;
use imgconv::managers::result_manager::{ResultManagerTrait, ResultSummary};
use imgconv::managers::upload_manager::UploadManagerTrait;
use imgconv::services::conversion_orchestrator::ConversionOutcome;
use imgconv::services::image_service::ImageServiceTrait;
use imgconv::services::theme_engine::ThemeEngineTrait;
use imgconv::types::errors::OptionsError;
use imgconv::types::options::ImageFormat;

type CliResult<T> = Result<T, Box<dyn std::error::Error>>;

#[derive(Parser, Debug)]
#[command(
    name = "imgconv",
    version,
    about = "Convert images through the imgconv conversion service"
)]
struct Cli {
    /// Settings file (defaults to the platform config directory)
    #[arg(long, global = true)]
    settings: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Convert one image and save the result
    Convert(ConvertArgs),
    /// Print the formats the service accepts and produces
    Formats,
    /// Show or toggle the UI theme
    Theme(ThemeArgs),
}

#[derive(Args, Debug)]
struct ConvertArgs {
    /// Image to convert (png, jpg, jpeg, webp, bmp, tiff; at most 50 MB)
    input: PathBuf,
    /// Target format: webp, jpeg, png or jpg
    #[arg(long, short)]
    format: Option<String>,
    /// Quality for lossy formats (1-100)
    #[arg(long, short, value_parser = clap::value_parser!(u8).range(1..=100))]
    quality: Option<u8>,
    /// Maximum width in pixels
    #[arg(long)]
    max_width: Option<String>,
    /// Maximum height in pixels
    #[arg(long)]
    max_height: Option<String>,
    /// Maximum output size in megabytes
    #[arg(long)]
    max_size_mb: Option<String>,
    /// Directory to save into (defaults to the configured download directory)
    #[arg(long, short)]
    output_dir: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct ThemeArgs {
    /// Switch between light and dark
    #[arg(long, action = ArgAction::SetTrue)]
    toggle: bool,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(err) = run().await {
        eprintln!("error: {}", err);
        std::process::exit(1);
    }
}

async fn run() -> CliResult<()> {
    let cli = Cli::parse();
    let settings_path = cli
        .settings
        .or_else(|| std::env::var(ENV_SETTINGS_PATH).ok());
    let app = App::new(ServiceConfig::from_env(), settings_path)?;

    match cli.command {
        Commands::Convert(args) => command_convert(&app, args).await,
        Commands::Formats => command_formats(&app).await,
        Commands::Theme(args) => command_theme(&app, args),
    }
}

async fn command_convert(app: &App, args: ConvertArgs) -> CliResult<()> {
    app.uploads().select_path(&args.input)?;

    let editor = &app.options_editor;
    if let Some(name) = &args.format {
        let format =
            ImageFormat::parse(name).ok_or_else(|| OptionsError::UnknownFormat(name.clone()))?;
        editor.select_format(format);
    }
    if let Some(quality) = args.quality {
        editor.set_quality(quality);
    }
    if let Some(width) = &args.max_width {
        editor.set_max_width(width)?;
    }
    if let Some(height) = &args.max_height {
        editor.set_max_height(height)?;
    }
    if let Some(size) = &args.max_size_mb {
        editor.set_max_size_mb(size)?;
    }

    let watcher = spawn_progress_logger(app.state.clone());
    let outcome = app.orchestrator.convert().await;
    watcher.abort();

    match outcome {
        ConversionOutcome::Succeeded => {
            if let Some(summary) = app.result_manager.summary() {
                print_summary(&summary);
            }
            let path = app.save_result(args.output_dir.as_deref())?;
            println!("Saved: {}", path.display());
            Ok(())
        }
        ConversionOutcome::Failed(message) => Err(message.into()),
        ConversionOutcome::Skipped => Err("nothing to convert".into()),
    }
}

/// Logs progress changes until aborted.
fn spawn_progress_logger(
    state: imgconv::managers::image_state_manager::SharedImageState,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut last = None;
        let mut interval = tokio::time::interval(Duration::from_millis(250));
        loop {
            interval.tick().await;
            let progress = state.lock().progress().clone();
            if progress.is_converting && last != Some(progress.progress) {
                log::info!("{:>3}% {}", progress.progress, progress.message);
                last = Some(progress.progress);
            }
        }
    })
}

fn print_summary(summary: &ResultSummary) {
    println!("Format:     {}", summary.format);
    if let Some(dimensions) = &summary.dimensions {
        println!("Image:      {}", dimensions);
    }
    if let Some(quality) = &summary.quality {
        println!("Quality:    {}", quality);
    }
    if let Some(limit) = &summary.dimension_limit {
        println!("Max size:   {}", limit);
    }
    if let Some(limit) = &summary.size_limit {
        println!("File limit: {}", limit);
    }
}

async fn command_formats(app: &App) -> CliResult<()> {
    let formats = app.orchestrator.service().get_supported_formats().await;
    println!("Output: {}", formats.supported_formats.join(", "));
    println!("Input:  {}", formats.input_formats.join(", "));
    println!("Upload limit: {}", format_file_size(imgconv::types::file::MAX_FILE_SIZE));
    Ok(())
}

fn command_theme(app: &App, args: ThemeArgs) -> CliResult<()> {
    let theme = if args.toggle {
        app.themes().toggle_theme()?
    } else {
        app.themes().get_theme()
    };
    println!("{}", theme);
    Ok(())
}
