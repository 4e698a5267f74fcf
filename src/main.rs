use clap::{Parser, Subcommand};
use moodboard::config::{self, MoodboardConfig};
use moodboard::deliver::{self, Mailer, OutboxMailer};
use moodboard::pipeline::{Collaborators, Pipeline, PipelineError};
use moodboard::render::{AssetSource, DirAssets, HtmlEngine, StaticAssets, flipbook_url};
use moodboard::showcase::{FileContent, Showcase};
use moodboard::store::{JsonStore, MoodboardStore};
use moodboard::token::{RandomTokens, ShareToken};
use moodboard::types::{MoodboardRef, NewMoodboard};
use moodboard::{logging, output};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "moodboard")]
#[command(about = "Compose, render and deliver product moodboards")]
#[command(long_about = "\
Compose, render and deliver product moodboards

A moodboard is an ordered selection of catalog products. Each board gets a
public share token; rendering lays the selections out on a responsive grid
and produces a paged document that is emailed to the requester (and their
designer, when asked) and served at {base_url}/moodboard/{token}.

Data directory (see [store] data_dir):

  data/
  ├── products.json      # Product catalog (read-only to this tool)
  └── moodboards.json    # Created moodboards

References accept either a moodboard id (UUID) or its share token.

Run 'moodboard gen-config' to generate a documented moodboard.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Directory containing moodboard.toml; relative paths in it resolve from here
    #[arg(long, default_value = ".", global = true)]
    config_dir: PathBuf,

    /// Log level (error, warn, info, debug, trace); overrides [logging] level
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create a moodboard from a JSON request file
    Create {
        /// Path to the request JSON
        request: PathBuf,
    },
    /// Render a moodboard to a document without sending it
    Render {
        /// Moodboard id or share token
        reference: String,
        /// Layout style (magazine, catalog)
        #[arg(long)]
        style: Option<String>,
        /// Output file (defaults to the document's own file name)
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Render a moodboard and email it to its recipients
    Send {
        /// Moodboard id or share token
        reference: String,
        /// Layout style (magazine, catalog)
        #[arg(long)]
        style: Option<String>,
    },
    /// Show the public flipbook for a share token
    View {
        token: String,
        /// Print the full flipbook state as JSON
        #[arg(long)]
        json: bool,
    },
    /// List the product catalog
    Products,
    /// Show showcase content, with defaults for missing collections
    Showcase {
        /// Content JSON file (relative to the config directory)
        #[arg(long, default_value = "showcase.json")]
        content: PathBuf,
    },
    /// Print a stock moodboard.toml with all options documented
    GenConfig,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match err.downcast_ref::<PipelineError>() {
                Some(pipeline_err) => output::print_pipeline_error(pipeline_err),
                None => eprintln!("error: {err}"),
            }
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    if let Command::GenConfig = cli.command {
        print!("{}", config::stock_config_toml());
        return Ok(());
    }

    let mut config = config::load_config(&cli.config_dir)?;
    logging::init(&config.logging, cli.log_level.as_deref())?;
    init_thread_pool(&config.processing);
    resolve_paths(&mut config, &cli.config_dir);

    let store = JsonStore::open(&config.store.data_dir)?;
    let assets = asset_source(&config);
    let engine = HtmlEngine::new(&config.colors);
    let mailer: Box<dyn Mailer> = match cli.command {
        Command::Send { .. } => deliver::mailer_from_config(&config.mail)?,
        _ => Box::new(OutboxMailer::new(&config.mail.outbox_dir)),
    };
    let pipeline = Pipeline::new(
        Collaborators {
            store: &store,
            tokens: &RandomTokens,
            assets: assets.as_ref(),
            engine: &engine,
            mailer: mailer.as_ref(),
        },
        &config,
    );

    match cli.command {
        Command::Create { request } => {
            let content = std::fs::read_to_string(&request)?;
            let request: NewMoodboard = serde_json::from_str(&content)?;
            let created = pipeline.create_moodboard(request)?;
            let url = flipbook_url(&config.render.base_url, &created.share_token);
            output::print_created(&created, &url);
        }
        Command::Render {
            reference,
            style,
            out,
        } => {
            let reference: MoodboardRef = reference.parse()?;
            let (_, rendered) = pipeline.render(&reference, style.as_deref())?;
            let path = out.unwrap_or_else(|| PathBuf::from(&rendered.document.filename));
            std::fs::write(&path, &rendered.document.bytes)?;
            output::print_rendered(&rendered, Some(&path.display().to_string()));
        }
        Command::Send { reference, style } => {
            let reference: MoodboardRef = reference.parse()?;
            let outcome = pipeline.render_and_deliver(&reference, style.as_deref())?;
            output::print_delivery(&outcome);
        }
        Command::View { token, json } => {
            let token: ShareToken = token.parse()?;
            let flipbook = pipeline.view(&token)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&flipbook)?);
            } else {
                output::print_flipbook(&flipbook);
            }
        }
        Command::Products => {
            output::print_products(&store.list_products()?);
        }
        Command::Showcase { content } => {
            let source = FileContent::new(cli.config_dir.join(content));
            output::print_showcase(&Showcase::load(&source));
        }
        Command::GenConfig => print!("{}", config::stock_config_toml()),
    }

    Ok(())
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}

/// Make config-relative paths absolute against the config directory.
fn resolve_paths(config: &mut MoodboardConfig, dir: &Path) {
    let resolve = |p: &str| dir.join(p).display().to_string();
    config.store.data_dir = resolve(&config.store.data_dir);
    config.mail.outbox_dir = resolve(&config.mail.outbox_dir);
    config.render.asset_dir = config.render.asset_dir.as_deref().map(resolve);
}

fn asset_source(config: &MoodboardConfig) -> Box<dyn AssetSource> {
    let base = config.render.asset_base_url.clone();
    match &config.render.asset_dir {
        Some(dir) => Box::new(DirAssets::new(dir, base)),
        None => Box::new(StaticAssets::new(base)),
    }
}
