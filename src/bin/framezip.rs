use std::{
    fs,
    io::{self, BufRead, Write},
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use colored::Colorize;
use framezip::{
    ExtractOptions, FfmpegLogLevel, FfmpegMedia, FramezipError, Limits, MediaElement,
    OperationType, PixelFormat, ProgressCallback, ProgressInfo, Session, SourceCandidate,
    archive, configuration, sampler, validation,
};
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::json;

const CLI_AFTER_HELP: &str = "Examples:\n  framezip extract input.mp4 --interval 2 --name holiday --out archives --progress\n  framezip extract input.webm --browse\n  framezip inspect input.mov --interval 0.5 --json\n  framezip completions zsh > _framezip";

#[derive(Debug, Parser)]
#[command(
    name = "framezip",
    version,
    about = "Sample still frames from a video and bundle them as a zip archive",
    after_help = CLI_AFTER_HELP
)]
struct Cli {
    #[command(flatten)]
    global: GlobalOptions,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Parser, Clone, Default)]
struct GlobalOptions {
    /// Show additional output.
    #[arg(long)]
    verbose: bool,

    /// Show a progress bar during extraction.
    #[arg(long)]
    progress: bool,

    /// Allow overwriting an existing archive.
    #[arg(long)]
    overwrite: bool,

    /// FFmpeg log level (quiet, fatal, error, warning, info, debug).
    #[arg(long)]
    log_level: Option<String>,

    /// Pixel format frames are rasterized in before PNG encoding (rgb8, rgba8, gray8).
    #[arg(long)]
    pixel_format: Option<String>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Sample frames and write them as a zip archive.
    #[command(
        about = "Extract frames into a zip archive",
        after_help = "Examples:\n  framezip extract input.mp4 --interval 2.5 --name clip\n  framezip extract input.mp4 --out archives --overwrite --browse"
    )]
    Extract {
        /// Input video path.
        input: PathBuf,
        /// Seconds between captured frames (0.1 to 60).
        #[arg(long)]
        interval: Option<String>,
        /// Archive base name; sanitized before use.
        #[arg(long)]
        name: Option<String>,
        /// Directory the archive is written to.
        #[arg(long, default_value = ".")]
        out: PathBuf,
        /// Declared content type; inferred from the extension when absent.
        #[arg(long)]
        content_type: Option<String>,
        /// Browse the captured frames interactively after extraction.
        #[arg(long)]
        browse: bool,
    },

    /// Print metadata and a validation report without extracting.
    #[command(
        about = "Inspect and validate a video",
        visible_alias = "validate",
        after_help = "Examples:\n  framezip inspect input.mp4\n  framezip inspect input.mp4 --interval 0.2 --json"
    )]
    Inspect {
        /// Input video path.
        input: PathBuf,
        /// Interval to run the frame-count check with.
        #[arg(long)]
        interval: Option<String>,
        /// Output as machine-readable JSON.
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

fn parse_pixel_format(value: &str) -> Option<PixelFormat> {
    match value.to_ascii_lowercase().as_str() {
        "rgb8" | "rgb" => Some(PixelFormat::Rgb8),
        "rgba8" | "rgba" => Some(PixelFormat::Rgba8),
        "gray8" | "gray" | "greyscale" | "grayscale" => Some(PixelFormat::Gray8),
        _ => None,
    }
}

fn ensure_writable_path(path: &Path, overwrite: bool) -> Result<(), Box<dyn std::error::Error>> {
    if path.exists() {
        if overwrite {
            eprintln!(
                "{} {}",
                "warning:".yellow().bold(),
                format!("overwriting {}", path.display()).yellow()
            );
        } else {
            return Err(format!(
                "output already exists: {} (use --overwrite to replace)",
                path.display()
            )
            .into());
        }
    }
    Ok(())
}

fn apply_global_options(global: &GlobalOptions) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(level) = &global.log_level {
        let parsed: FfmpegLogLevel = level.parse()?;
        framezip::set_ffmpeg_log_level(parsed);
    }
    Ok(())
}

fn base_extract_options(
    global: &GlobalOptions,
) -> Result<ExtractOptions, Box<dyn std::error::Error>> {
    let mut options = ExtractOptions::new();

    if let Some(pixel_str) = &global.pixel_format {
        let pixel = parse_pixel_format(pixel_str)
            .ok_or(format!("unsupported --pixel-format: {pixel_str}"))?;
        options = options.with_pixel_format(pixel);
    }

    if global.progress {
        options = options.with_progress(Arc::new(TerminalProgress::new()?));
    }

    Ok(options)
}

fn interval_or_default(value: Option<&str>) -> Result<Duration, FramezipError> {
    match value {
        Some(value) => configuration::parse_interval(value),
        None => Ok(Duration::from_secs_f64(
            configuration::DEFAULT_INTERVAL_SECONDS,
        )),
    }
}

/// Percentage bar shared by the capture and archive phases.
struct TerminalProgress {
    bar: ProgressBar,
}

impl TerminalProgress {
    fn new() -> Result<Self, Box<dyn std::error::Error>> {
        let bar = ProgressBar::new(100);
        let style = ProgressStyle::with_template(
            "{spinner:.green} {bar:40.cyan/blue} {pos:>3}% {msg}",
        )?;
        bar.set_style(style.progress_chars("##-"));
        Ok(Self { bar })
    }
}

impl ProgressCallback for TerminalProgress {
    fn on_progress(&self, info: &ProgressInfo) {
        let phase = match info.operation {
            OperationType::FrameExtraction => "capturing",
            OperationType::ArchiveAssembly => "archiving",
            _ => "working",
        };
        match info.total {
            Some(total) => self
                .bar
                .set_message(format!("{phase} {}/{total}", info.current)),
            None => self.bar.set_message(phase),
        }
        self.bar.set_position(u64::from(info.percentage));
        if info.percentage >= 100 && info.operation == OperationType::ArchiveAssembly {
            self.bar.finish_with_message("done");
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BrowseCommand {
    Next,
    Previous,
    Open(usize),
    Close,
    Quit,
}

fn parse_browse_command(line: &str) -> Option<BrowseCommand> {
    let line = line.trim();
    match line.to_ascii_lowercase().as_str() {
        "n" | "next" => Some(BrowseCommand::Next),
        "p" | "prev" | "previous" => Some(BrowseCommand::Previous),
        "c" | "close" => Some(BrowseCommand::Close),
        "q" | "quit" | "exit" => Some(BrowseCommand::Quit),
        _ => line
            .parse::<usize>()
            .ok()
            .filter(|number| *number > 0)
            .map(|number| BrowseCommand::Open(number - 1)),
    }
}

fn describe_selection(session: &Session) -> String {
    let lightbox = session.lightbox();
    match (session.selected_frame(), lightbox.position()) {
        (Some(frame), Some((position, count))) => {
            let (width, height) = frame.dimensions();
            let mut navigation = Vec::new();
            if lightbox.has_previous() {
                navigation.push("[p]rev");
            }
            if lightbox.has_next() {
                navigation.push("[n]ext");
            }
            navigation.push("[c]lose");
            format!(
                "{position}/{count} {} ({width}x{height}, {} bytes)  {}",
                frame.file_name(),
                frame.png_bytes().len(),
                navigation.join(" "),
            )
        }
        _ => format!(
            "{} frames; enter a frame number to open it, [q]uit",
            lightbox.frame_count()
        ),
    }
}

fn browse(session: &mut Session) -> Result<(), Box<dyn std::error::Error>> {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    println!("{}", describe_selection(session));

    for line in stdin.lock().lines() {
        let line = line?;
        let Some(command) = parse_browse_command(&line) else {
            eprintln!("{} unrecognized command: {}", "warning:".yellow().bold(), line.trim());
            continue;
        };

        let lightbox = session.lightbox_mut();
        match command {
            BrowseCommand::Next => {
                lightbox.show_next();
            }
            BrowseCommand::Previous => {
                lightbox.show_previous();
            }
            BrowseCommand::Open(index) => {
                if let Err(error) = lightbox.open(index) {
                    eprintln!("{} {error}", "warning:".yellow().bold());
                }
            }
            BrowseCommand::Close => lightbox.close(),
            BrowseCommand::Quit => break,
        }
        println!("{}", describe_selection(session));
        stdout.flush()?;
    }

    Ok(())
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    apply_global_options(&cli.global)?;

    match cli.command {
        Commands::Extract {
            input,
            interval,
            name,
            out,
            content_type,
            browse: browse_frames,
        } => {
            let mut candidate = SourceCandidate::from_path(&input)?;
            if let Some(content_type) = content_type {
                candidate = candidate.with_content_type(content_type);
            }

            let mut session = Session::new();
            session.set_options(base_extract_options(&cli.global)?);
            if let Some(interval) = &interval {
                session.set_interval(interval)?;
            }
            if let Some(name) = &name {
                session.set_archive_name(name);
            }

            let output_path = out.join(archive::archive_file_name(
                session.options().archive_name(),
            ));
            ensure_writable_path(&output_path, cli.global.overwrite)?;

            session.load(candidate)?;
            if let Some(source) = session.source().filter(|_| cli.global.verbose) {
                let (width, height) = source.metadata().dimensions();
                eprintln!(
                    "loaded {} ({width}x{height}, {:.2}s)",
                    source.candidate().name,
                    source.metadata().duration.as_secs_f64(),
                );
            }

            let frames = session.extract()?;
            if cli.global.verbose {
                for frame in frames {
                    eprintln!(
                        "captured {} at {:.2}s",
                        frame.file_name(),
                        frame.timestamp().as_secs_f64()
                    );
                }
            }

            match session.archive()? {
                Some(archive) => {
                    fs::create_dir_all(&out)?;
                    let path = archive.save_in(&out)?;
                    println!(
                        "{} {}",
                        "success:".green().bold(),
                        format!(
                            "Extracted {} frame(s) to {}",
                            archive.entry_count(),
                            path.display()
                        )
                        .green()
                    );
                }
                None => eprintln!(
                    "{} {}",
                    "warning:".yellow().bold(),
                    "no frames were captured; nothing to save".yellow()
                ),
            }

            if browse_frames && !session.frames().is_empty() {
                browse(&mut session)?;
            }
        }
        Commands::Inspect {
            input,
            interval,
            json,
        } => {
            let interval = interval_or_default(interval.as_deref())?;
            let limits = Limits::default();
            let candidate = SourceCandidate::from_path(&input)?;
            let media = match FfmpegMedia::open(&input) {
                Ok(media) => Some(media),
                Err(error) => {
                    if cli.global.verbose {
                        eprintln!("{} {error}", "warning:".yellow().bold());
                    }
                    None
                }
            };
            let metadata = media.as_ref().map(|media| media.metadata());
            let report = validation::inspect(&candidate, metadata, interval, &limits);

            if json {
                let payload = json!({
                    "file": {
                        "name": candidate.name,
                        "size": candidate.size,
                        "content_type": candidate.content_type,
                    },
                    "format": metadata.map(|metadata| metadata.format.clone()),
                    "duration_seconds": metadata.map(|metadata| metadata.duration.as_secs_f64()),
                    "video": metadata.and_then(|metadata| metadata.video.as_ref()).map(|video| json!({
                        "width": video.width,
                        "height": video.height,
                        "fps": video.frames_per_second,
                        "frame_count": video.frame_count,
                        "codec": video.codec,
                    })),
                    "interval_seconds": interval.as_secs_f64(),
                    "planned_frames": metadata.map(|metadata| {
                        sampler::planned_frame_count(metadata.duration, interval)
                    }),
                    "minimum_interval_seconds": metadata.map(|metadata| {
                        sampler::minimum_interval(metadata.duration, limits.max_frames)
                    }),
                    "valid": report.is_valid(),
                    "info": report.info,
                    "warnings": report.warnings,
                    "errors": report.errors,
                });
                println!("{}", serde_json::to_string_pretty(&payload)?);
            } else {
                if let Some(metadata) = metadata {
                    println!("Format: {}", metadata.format);
                    println!("Duration: {:.2}s", metadata.duration.as_secs_f64());
                }
                print!("{report}");
            }
        }
        Commands::Completions { shell } => {
            let mut command = Cli::command();
            clap_complete::generate(shell, &mut command, "framezip", &mut io::stdout());
        }
    }

    Ok(())
}

fn main() {
    if let Err(error) = run() {
        eprintln!("error: {error}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::{BrowseCommand, interval_or_default, parse_browse_command, parse_pixel_format};

    #[test]
    fn parse_pixel_format_aliases() {
        assert!(parse_pixel_format("rgb").is_some());
        assert!(parse_pixel_format("RGBA8").is_some());
        assert!(parse_pixel_format("grayscale").is_some());
        assert!(parse_pixel_format("yuv420p").is_none());
    }

    #[test]
    fn parse_browse_commands() {
        assert_eq!(parse_browse_command("n"), Some(BrowseCommand::Next));
        assert_eq!(parse_browse_command(" Prev "), Some(BrowseCommand::Previous));
        assert_eq!(parse_browse_command("3"), Some(BrowseCommand::Open(2)));
        assert_eq!(parse_browse_command("c"), Some(BrowseCommand::Close));
        assert_eq!(parse_browse_command("q"), Some(BrowseCommand::Quit));
        assert_eq!(parse_browse_command("0"), None);
        assert_eq!(parse_browse_command("jump"), None);
    }

    #[test]
    fn interval_defaults_to_one_second() {
        assert_eq!(interval_or_default(None).unwrap().as_secs_f64(), 1.0);
        assert_eq!(interval_or_default(Some("0.5")).unwrap().as_millis(), 500);
        assert!(interval_or_default(Some("0.05")).is_err());
    }
}
