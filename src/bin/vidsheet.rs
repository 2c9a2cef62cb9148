use std::{error::Error, path::PathBuf, sync::Arc};

use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use log::LevelFilter;
use serde_json::json;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use vidsheet::{
    FfmpegDecoder, FrameDecoder, NoOpProgress, OperationType, ProgressCallback, ProgressInfo,
    SheetOptions, sheet, sync_ffmpeg_log_level, validation::validate_metadata,
};

const CLI_AFTER_HELP: &str = "Examples:\n  vidsheet sheet movie.mkv\n  vidsheet sheet *.mp4 --numcaps 16 --columns 4 --skip-blank --webvtt --progress\n  vidsheet info movie.mkv --json\n  vidsheet completions zsh > _vidsheet";

#[derive(Debug, Parser)]
#[command(
    name = "vidsheet",
    version,
    about = "Generate contact sheets (thumbnail grids) from video files",
    after_help = CLI_AFTER_HELP
)]
struct Cli {
    #[command(flatten)]
    global: GlobalOptions,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Args, Clone, Default)]
struct GlobalOptions {
    /// Show debug logging and full error details.
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Show a progress bar.
    #[arg(long, global = true)]
    progress: bool,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Generate a contact sheet for each input file.
    #[command(
        about = "Generate contact sheets",
        after_help = "Examples:\n  vidsheet sheet movie.mkv --numcaps 12 --columns 3\n  vidsheet sheet movie.mkv --interval 60 --from 00:05:00 --skip-credits\n  vidsheet sheet movie.mkv --output 'sheets/{{.Name}}.png' --overwrite"
    )]
    Sheet {
        /// Input video files.
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        #[command(flatten)]
        flags: SheetFlags,
    },

    /// Print metadata for a video file.
    #[command(
        about = "Print video metadata",
        visible_alias = "probe",
        after_help = "Examples:\n  vidsheet info movie.mkv\n  vidsheet info movie.mkv --json"
    )]
    Info {
        /// Input video file.
        input: PathBuf,

        /// Output metadata as machine-readable JSON.
        #[arg(long)]
        json: bool,
    },

    /// Generate shell completion scripts.
    #[command(about = "Generate shell completions")]
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Command-line overrides for [`SheetOptions`]. Unset flags keep the value
/// from the configuration file or the default.
#[derive(Debug, Args, Clone, Default)]
struct SheetFlags {
    /// Configuration file (default: ./vidsheet.toml when present).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of thumbnails.
    #[arg(long, short = 'n')]
    numcaps: Option<u32>,
    /// Seconds between thumbnails instead of a fixed count.
    #[arg(long, short = 'i')]
    interval: Option<u32>,
    /// Start time (HH:MM:SS).
    #[arg(long)]
    from: Option<String>,
    /// End time (HH:MM:SS).
    #[arg(long)]
    to: Option<String>,
    /// Leave out the closing credits.
    #[arg(long)]
    skip_credits: bool,
    /// Seek to keyframes only (faster, less accurate).
    #[arg(long)]
    fast: bool,

    /// Thumbnails per row.
    #[arg(long, short = 'c')]
    columns: Option<u32>,
    /// Thumbnail width.
    #[arg(long, short = 'W')]
    width: Option<u32>,
    /// Thumbnail height (0 keeps the aspect ratio).
    #[arg(long, short = 'H')]
    height: Option<u32>,
    /// Padding between thumbnails.
    #[arg(long, short = 'p')]
    padding: Option<u32>,
    /// Border width around thumbnails.
    #[arg(long)]
    border: Option<u32>,
    /// Font file for labels and header.
    #[arg(long)]
    font: Option<PathBuf>,
    /// Font size.
    #[arg(long)]
    font_size: Option<f32>,

    /// Leave out the header.
    #[arg(long)]
    no_header: bool,
    /// Add codec, frame rate and bit rate to the header.
    #[arg(long)]
    header_meta: bool,
    /// Extra header line.
    #[arg(long)]
    comment: Option<String>,
    /// Leave out the timestamp labels.
    #[arg(long)]
    no_timestamps: bool,

    /// Retry blank frames.
    #[arg(long)]
    skip_blank: bool,
    /// Blank detection threshold (0-100).
    #[arg(long)]
    blank_threshold: Option<u8>,
    /// Retry blurry frames.
    #[arg(long)]
    skip_blurry: bool,
    /// Blur detection threshold (0-100).
    #[arg(long)]
    blur_threshold: Option<u8>,
    /// Retry frames dominated by skin tones (experimental).
    #[arg(long)]
    sfw: bool,
    /// Decode attempts per thumbnail.
    #[arg(long)]
    max_retries: Option<u32>,

    /// Background colour (R,G,B).
    #[arg(long)]
    background: Option<String>,
    /// Header background colour.
    #[arg(long)]
    header_background: Option<String>,
    /// Header text colour.
    #[arg(long)]
    header_font_color: Option<String>,
    /// Timestamp text colour.
    #[arg(long)]
    timestamp_font_color: Option<String>,
    /// Border colour.
    #[arg(long)]
    border_color: Option<String>,

    /// Comma-separated filters (greyscale, sepia, invert, cross, strip, fancy).
    #[arg(long)]
    filters: Option<String>,
    /// Image centred on the sheet.
    #[arg(long)]
    watermark: Option<PathBuf>,
    /// Image placed on every thumbnail.
    #[arg(long)]
    watermark_all: Option<PathBuf>,
    /// Seed for randomised filters.
    #[arg(long)]
    seed: Option<u64>,

    /// Output path pattern ({{.Path}} and {{.Name}} are replaced).
    #[arg(long, short = 'o')]
    output: Option<String>,
    /// Also save every thumbnail frame.
    #[arg(long)]
    single_images: bool,
    /// Also write a WebVTT cue sheet.
    #[arg(long)]
    webvtt: bool,
    /// Replace existing output files.
    #[arg(long)]
    overwrite: bool,
    /// Skip inputs whose output already exists.
    #[arg(long)]
    skip_existing: bool,
}

impl SheetFlags {
    fn resolve(&self) -> Result<SheetOptions, Box<dyn Error>> {
        let mut options = SheetOptions::load_or_default(self.config.as_deref())?;

        macro_rules! override_with {
            ($($field:ident),* $(,)?) => {
                $(if let Some(value) = &self.$field {
                    options.$field = value.clone();
                })*
            };
        }
        override_with!(
            numcaps,
            interval,
            from,
            columns,
            width,
            height,
            padding,
            border,
            font_size,
            blank_threshold,
            blur_threshold,
            max_retries,
            background,
            header_background,
            header_font_color,
            timestamp_font_color,
            border_color,
            output,
        );

        macro_rules! override_optional {
            ($($field:ident),* $(,)?) => {
                $(if self.$field.is_some() {
                    options.$field = self.$field.clone();
                })*
            };
        }
        override_optional!(to, font, comment, filters, watermark, watermark_all, seed);

        macro_rules! enable {
            ($($field:ident),* $(,)?) => {
                $(if self.$field {
                    options.$field = true;
                })*
            };
        }
        enable!(
            skip_credits,
            fast,
            header_meta,
            skip_blank,
            skip_blurry,
            sfw,
            single_images,
            webvtt,
            overwrite,
            skip_existing,
        );
        if self.no_header {
            options.header = false;
        }
        if self.no_timestamps {
            options.timestamps = false;
        }

        options.validate()?;
        Ok(options)
    }
}

struct BarProgress {
    bar: ProgressBar,
}

impl BarProgress {
    fn new(label: String) -> Result<Self, Box<dyn Error>> {
        let bar = ProgressBar::new(0);
        let style = ProgressStyle::with_template(
            "{spinner:.green} {prefix} {bar:40.cyan/blue} {pos}/{len} {msg}",
        )?;
        bar.set_style(style.progress_chars("##-"));
        bar.set_prefix(label);
        Ok(Self { bar })
    }
}

impl ProgressCallback for BarProgress {
    fn on_progress(&self, info: &ProgressInfo) {
        if let Some(total) = info.total {
            self.bar.set_length(total);
        }
        self.bar.set_position(info.current);
        self.bar.set_message(match info.operation {
            OperationType::FrameAcquisition => "decoding",
            OperationType::Composition => "composing",
            _ => "",
        });
    }
}

fn init_logging(verbose: bool) {
    let default_directives = if verbose { "debug" } else { "warn,vidsheet=info" };
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives)),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
    sync_ffmpeg_log_level(if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    });
}

fn run_sheets(
    inputs: &[PathBuf],
    flags: &SheetFlags,
    global: &GlobalOptions,
) -> Result<(), Box<dyn Error>> {
    let options = flags.resolve()?;
    let resources = sheet::SheetResources::load(&options)?;
    let mut failures = 0_usize;

    for input in inputs {
        let bar = if global.progress {
            Some(Arc::new(BarProgress::new(input.display().to_string())?))
        } else {
            None
        };
        let progress: Arc<dyn ProgressCallback> = match &bar {
            Some(bar) => Arc::clone(bar) as Arc<dyn ProgressCallback>,
            None => Arc::new(NoOpProgress),
        };

        let result = sheet::run_with_resources(input, &options, &resources, progress);
        if let Some(bar) = bar {
            bar.bar.finish_and_clear();
        }

        match result {
            Ok(summary) if summary.skipped => {
                println!("{} {}", "skipped".yellow().bold(), input.display());
            }
            Ok(summary) => {
                let written = summary
                    .composite
                    .iter()
                    .chain(&summary.single_images)
                    .chain(&summary.cue_sheet);
                for path in written {
                    println!("{} {}", "saved".green().bold(), path.display());
                }
            }
            Err(error) => {
                failures += 1;
                report_error(&format!("{}: {error}", input.display()), &error, global.verbose);
            }
        }
    }

    if failures > 0 {
        return Err(format!("{failures} of {} file(s) failed", inputs.len()).into());
    }
    Ok(())
}

fn print_info(input: &PathBuf, json: bool) -> Result<(), Box<dyn Error>> {
    let decoder = FfmpegDecoder::open(input)?;
    let metadata = decoder.metadata();
    let report = validate_metadata(metadata);

    if json {
        let payload = json!({
            "metadata": metadata,
            "duration_seconds": metadata.duration.as_secs_f64(),
            "validation": {
                "valid": report.is_valid(),
                "info": report.info,
                "warnings": report.warnings,
                "errors": report.errors,
            },
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else {
        println!("File: {}", metadata.filename);
        println!("Format: {}", metadata.format);
        println!("Duration: {:?}", metadata.duration);
        println!(
            "Video: {}x{} @ {:.2} fps [{}]",
            metadata.width, metadata.height, metadata.frame_rate, metadata.video_codec,
        );
        if let Some(audio) = &metadata.audio_codec {
            println!("Audio: {audio}");
        }
        println!("Bit rate: {} kb/s", metadata.bit_rate / 1000);
        print!("{report}");
    }
    Ok(())
}

fn report_error(message: &str, error: &dyn Error, verbose: bool) {
    eprintln!("{} {}", "error:".red().bold(), message.red());
    if verbose {
        eprintln!("{error:?}");
        let mut source = error.source();
        while let Some(cause) = source {
            eprintln!("  caused by: {cause}");
            source = cause.source();
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    match &cli.command {
        Commands::Sheet { inputs, flags } => run_sheets(inputs, flags, &cli.global),
        Commands::Info { input, json } => print_info(input, *json),
        Commands::Completions { shell } => {
            let mut command = Cli::command();
            clap_complete::generate(*shell, &mut command, "vidsheet", &mut std::io::stdout());
            Ok(())
        }
    }
}

fn main() {
    let cli = Cli::parse();
    let verbose = cli.global.verbose;
    init_logging(verbose);

    if let Err(error) = run(cli) {
        report_error(&error.to_string(), error.as_ref(), verbose);
        std::process::exit(1);
    }
}
