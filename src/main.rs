use clap::{Parser, Subcommand};
use image_tag::config::{self, CONFIG_FILENAME};
use image_tag::imaging::RustBackend;
use image_tag::output;
use image_tag::tag::{Renderer, SitePaths, TagKind};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Environment variable holding a tracing filter (e.g. `image_tag=debug`).
const LOG_ENV: &str = "IMAGE_TAG_LOG";

/// Shared flags for commands that read directives.
#[derive(clap::Args, Clone)]
struct TagArgs {
    /// Treat directives as responsive pictures (size token names a picture preset)
    #[arg(long)]
    picture: bool,
}

impl TagArgs {
    fn kind(&self) -> TagKind {
        if self.picture {
            TagKind::Picture
        } else {
            TagKind::Image
        }
    }
}

#[derive(Parser)]
#[command(name = "image-tag")]
#[command(about = "Resize images for static sites from inline directives")]
#[command(long_about = "\
Resize images for static sites from inline directives

A directive names an optional size, a source image, and HTML attributes:

  poster.jpg alt=\"Poster\"                       # native size
  gallery poster.jpg class=\"wide\"               # preset from _image.toml
  350xauto posters/poster.jpg alt=\"Poster\"      # explicit size, height from ratio

Generated files are content-addressed:

  _site/generated/posters/poster-350x525-1a2b3c.jpg

so repeated builds reuse them. Images are never upscaled.

Run 'image-tag gen-config' to generate a documented _image.toml.")]
#[command(version)]
struct Cli {
    /// Site source directory (images are read from here)
    #[arg(long, default_value = ".", global = true)]
    site_source: PathBuf,

    /// Site destination directory (generated images are written here)
    #[arg(long, default_value = "_site", global = true)]
    site_dest: PathBuf,

    /// Config file, relative to the site source directory
    #[arg(long, default_value = CONFIG_FILENAME, global = true)]
    config: PathBuf,

    /// Log each generated image
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render one directive and print its markup
    Render {
        #[command(flatten)]
        tag: TagArgs,
        /// The directive, e.g. `gallery poster.jpg alt="Poster"`
        directive: String,
    },
    /// Render every directive in a file (one per line) in parallel
    Batch {
        #[command(flatten)]
        tag: TagArgs,
        /// File with one directive per line; blank and `#` lines are skipped
        file: PathBuf,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Parse and resolve directives without opening any image
    Check {
        #[command(flatten)]
        tag: TagArgs,
        /// File with one directive per line; blank and `#` lines are skipped
        file: PathBuf,
    },
    /// Print a stock _image.toml with all options documented
    GenConfig,
}

fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Command::GenConfig = cli.command {
        print!("{}", config::stock_config_toml());
        return Ok(ExitCode::SUCCESS);
    }

    let site_config = config::load_config(&cli.site_source.join(&cli.config))?;
    init_thread_pool(&site_config.processing);
    let site = SitePaths::new(&cli.site_source, &cli.site_dest);
    let renderer = Renderer::new(site, site_config, RustBackend::new());

    match cli.command {
        Command::Render { tag, directive } => {
            let rendered = renderer.render(tag.kind(), &directive)?;
            output::print_rendered(&rendered);
        }
        Command::Batch { tag, file, json } => {
            let directives = read_directives(&file)?;
            let report = renderer.render_batch(tag.kind(), &directives);
            if json {
                println!("{}", output::format_batch_json(&report)?);
            } else {
                output::print_batch_output(&report);
            }
            if !report.is_success() {
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::Check { tag, file } => {
            let directives = read_directives(&file)?;
            let checked: Vec<_> = directives
                .into_iter()
                .map(|raw| {
                    let result = renderer.prepare(tag.kind(), &raw);
                    (raw, result)
                })
                .collect();
            output::print_check_output(&checked);
            if checked.iter().any(|(_, result)| result.is_err()) {
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::GenConfig => {}
    }

    Ok(ExitCode::SUCCESS)
}

/// Send diagnostics to stderr so stdout stays clean markup.
///
/// `IMAGE_TAG_LOG` wins over `--verbose`.
fn init_tracing(verbose: bool) {
    let default_level = if verbose { "info" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

/// Initialize the rayon thread pool based on processing config.
///
/// Capped at the number of CPU cores; config can lower it, not raise it.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}

/// Directive lines of a file, skipping blanks and `#` comments.
fn read_directives(path: &Path) -> std::io::Result<Vec<String>> {
    let text = std::fs::read_to_string(path)?;
    Ok(text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect())
}
