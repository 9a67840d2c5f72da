use clap::{ArgAction, Parser, Subcommand};
use imgfit::imaging::{
    CropPolicy, Dimension, MAX_CANVAS_EDGE, OutputFormat, ParseError, Quality, RustBackend,
    SizeOption, get_image_info, resize,
};
use imgfit::{config, output};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

fn version_string() -> &'static str {
    if env!("IMGFIT_RELEASE") == "true" {
        return env!("CARGO_PKG_VERSION");
    }
    match env!("IMGFIT_GIT_HASH") {
        "" => "dev@unknown",
        // Leaked once at startup
        hash => Box::leak(format!("dev@{hash}").into_boxed_str()),
    }
}

#[derive(Parser)]
#[command(name = "imgfit")]
#[command(about = "Fit images to a target size, ratio and format")]
#[command(long_about = "\
Fit images to a target size, ratio and format

Sizing (explicit values win over derived ones):
  width + height   exact output size
  width or height  the other side follows the ratio
  neither          source width, height follows the ratio
  ratio            defaults to the source aspect ratio; accepts 1.5 or 16:9

Crop policies when the output ratio differs from the source:
  auto       stretch the whole source over the whole output
  autofill   fit the whole source, pad the rest with the canvas background
  cut        fill the whole output, crop the overflowing source axis

Input formats are detected from content (PNG, GIF, WBMP, JPEG), never from
the file extension. JPEG EXIF orientation is applied before sizing.

Run 'imgfit gen-config' to generate a documented imgfit.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Config file (missing file means stock defaults)
    #[arg(long, default_value = config::CONFIG_FILE, global = true)]
    config: PathBuf,

    /// Log more (-v info, -vv debug, -vvv trace). RUST_LOG takes precedence.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the detected format and dimensions of an image
    Info {
        path: PathBuf,
        /// Emit JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Resize an image and optionally save it as `{save}.{ext}`
    Resize(ResizeArgs),
    /// Print a stock imgfit.toml with all options documented
    GenConfig,
}

#[derive(clap::Args)]
struct ResizeArgs {
    /// Source image
    path: PathBuf,

    /// Output path without extension; the extension follows the format
    #[arg(long)]
    save: Option<PathBuf>,

    /// Output width in pixels, or "auto"
    #[arg(long, value_parser = parse_edge)]
    width: Option<Dimension>,

    /// Output height in pixels, or "auto"
    #[arg(long, value_parser = parse_edge)]
    height: Option<Dimension>,

    /// Output aspect ratio: 1.5, 16:9 or "auto"
    #[arg(long)]
    ratio: Option<Dimension>,

    /// Crop policy: auto, autofill, cut
    #[arg(long)]
    crop: Option<CropPolicy>,

    /// Output format: auto, png, gif, jpg, wbmp
    #[arg(long)]
    format: Option<OutputFormat>,

    /// JPEG quality, clamped to 0-100
    #[arg(long)]
    quality: Option<u32>,

    /// Emit JSON instead of text
    #[arg(long)]
    json: bool,
}

/// Width and height flags: a [`Dimension`] no larger than the canvas limit.
fn parse_edge(s: &str) -> Result<Dimension, ParseError> {
    s.parse::<Dimension>()?.within_edge(MAX_CANVAS_EDGE)
}

impl ResizeArgs {
    fn size_option(&self) -> SizeOption {
        SizeOption {
            format: self.format,
            crop: self.crop,
            width: self.width,
            height: self.height,
            ratio: self.ratio,
            quality: self.quality.map(Quality::new),
        }
    }
}

fn init_tracing(verbose: u8) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(match verbose {
            0 => "warn",
            1 => "info",
            2 => "debug",
            _ => "trace",
        })
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Info { path, json } => {
            let backend = RustBackend::new();
            let info = get_image_info(&backend, &path);
            if json {
                let report = output::info_report(&path, &info);
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                output::print_info(&path, &info);
            }
            if !info.is_readable() {
                return Err(format!("{}: unrecognized image", path.display()).into());
            }
        }
        Command::Resize(args) => {
            let config = config::load_config(&cli.config)?;
            let backend = RustBackend::new()
                .with_filter(config.resample.filter.into())
                .with_background(config.canvas.background);
            let option = args.size_option().or(&config.defaults);
            let resized = resize(&backend, &args.path, args.save.as_deref(), &option)?;
            if args.json {
                let report = output::resize_report(&args.path, &resized);
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                output::print_resize(&args.path, &resized);
            }
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}
