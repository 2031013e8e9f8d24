use awesome_viewer::builder::{BuildSettings, SiteBuilder, SourceInfo};
use awesome_viewer::config::{self, Overrides, SiteConfig};
use awesome_viewer::filter::{FilterState, filter_catalog};
use awesome_viewer::parse::SourceDocument;
use awesome_viewer::serve::SiteServer;
use awesome_viewer::types::{Catalog, PreviewMode};
use awesome_viewer::{fingerprint, normalize, output, preview};
use clap::{Parser, Subcommand};
use std::error::Error;
use std::io::{self, IsTerminal};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

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
#[command(name = "awesome-viewer")]
#[command(about = "Turn a curated awesome-list README into a searchable static site")]
#[command(long_about = "\
Turn a curated awesome-list README into a searchable static site

Every `## Heading` in the source becomes a category and every list item of the
form `- [Name](url) - Description` becomes an entry:

  ## Web Frameworks
  - [Django](https://www.djangoproject.com/) - Batteries-included web framework.
  - [Flask](https://flask.palletsprojects.com/) - Microframework. (⭐ 68k)

  ## HTTP Clients
  * [requests](https://requests.readthedocs.io/) - HTTP for humans.

The build writes index.html, catalog.json, manifest.json, style.css and app.js
into the output directory. Sections such as Contents, Resources, Contributing
and License are skipped.

Settings are read from viewer.toml next to the source file (or --config).
Run 'awesome-viewer gen-config' to print a documented viewer.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Markdown catalog to read
    #[arg(long, alias = "readme", default_value = "README.md", global = true)]
    source: PathBuf,

    /// Output directory [default: `output` from viewer.toml, "site"]
    #[arg(long, global = true)]
    output: Option<PathBuf>,

    /// Config file [default: viewer.toml next to the source]
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Number of categories to preview after a build (0 disables)
    #[arg(long, global = true, allow_negative_numbers = true)]
    preview_limit: Option<i64>,

    /// Preview style: list, or step to pause between categories
    #[arg(long, global = true)]
    preview_mode: Option<PreviewMode>,

    /// Show diagnostics such as skipped malformed lines
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Clone)]
enum Command {
    /// Parse the source and write the site (default)
    Build,
    /// Build, then serve the output directory on 127.0.0.1
    Serve(ServeArgs),
    /// Parse without writing and report whether the site is up to date
    Check,
    /// Search the catalog from the terminal
    Search(SearchArgs),
    /// Print a stock viewer.toml with all options documented
    GenConfig,
}

#[derive(clap::Args, Clone)]
struct ServeArgs {
    /// Port to listen on [default: serve.port from viewer.toml, 8000]
    #[arg(long)]
    port: Option<u16>,

    /// Serve the existing output without rebuilding
    #[arg(long)]
    no_build: bool,
}

#[derive(clap::Args, Clone)]
struct SearchArgs {
    /// Words that must all appear in the entry, its description or its category
    #[arg(required = true)]
    terms: Vec<String>,

    /// Only search the category with this slug
    #[arg(long)]
    category: Option<String>,
}

/// Resolved inputs shared by every command.
struct Context {
    config: SiteConfig,
    source: PathBuf,
    /// Directory relative config paths resolve against.
    config_dir: PathBuf,
    output_dir: PathBuf,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    initialize_tracing(cli.verbose);

    match run(&cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<ExitCode, Box<dyn Error>> {
    match cli.command.clone().unwrap_or(Command::Build) {
        Command::Build => {
            let ctx = load_context(cli, None)?;
            build(&ctx)?;
        }
        Command::Serve(args) => {
            let ctx = load_context(cli, args.port)?;
            if !args.no_build {
                build(&ctx)?;
            }
            let server = SiteServer::bind(&ctx.output_dir, ctx.config.serve.port)?;
            output::print_serve_banner(&ctx.output_dir, &server.url());
            server.run()?;
        }
        Command::Check => {
            let ctx = load_context(cli, None)?;
            let document = SourceDocument::load(&ctx.source)?;
            let (catalog, malformed) = parse(&ctx, &document)?;
            let hash = fingerprint::hash_bytes(document.text.as_bytes());
            let freshness = fingerprint::freshness(&ctx.output_dir, &hash);
            output::print_check_output(
                catalog.totals(),
                malformed,
                &ctx.output_dir,
                &freshness,
                &hash,
            );
            if freshness != fingerprint::Freshness::UpToDate {
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::Search(args) => {
            let ctx = load_context(cli, None)?;
            let document = SourceDocument::load(&ctx.source)?;
            let (catalog, _) = parse(&ctx, &document)?;
            let query = args.terms.join(" ");
            let mut state = FilterState::new(query.as_str());
            if let Some(slug) = args.category {
                if catalog.category(&slug).is_none() {
                    return Err(format!("unknown category '{slug}'").into());
                }
                state = state.with_category(slug);
            }
            output::print_search_output(&filter_catalog(&catalog, &state), &query);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(ExitCode::SUCCESS)
}

/// Install the stderr `tracing` subscriber.
///
/// `RUST_LOG` wins when set; otherwise `-v` shows debug output for this crate.
fn initialize_tracing(verbose: bool) {
    let default = if verbose { "awesome_viewer=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .without_time()
        .init();
}

/// Load config, apply CLI overrides, and resolve paths.
///
/// Runs before any file is written so a bad flag fails the command cleanly.
fn load_context(cli: &Cli, port: Option<u16>) -> Result<Context, Box<dyn Error>> {
    let (mut config, config_dir) = match &cli.config {
        Some(path) => (config::load_config_file(path)?, parent_dir(path)),
        None => {
            let dir = parent_dir(&cli.source);
            (config::load_config(&dir)?, dir)
        }
    };
    config.apply_overrides(&Overrides {
        preview_limit: cli.preview_limit,
        preview_mode: cli.preview_mode,
        port,
    })?;

    let output_dir = match &cli.output {
        Some(dir) => dir.clone(),
        None => config.output_dir(&config_dir),
    };
    tracing::debug!(
        source = %cli.source.display(),
        output = %output_dir.display(),
        "resolved paths"
    );

    Ok(Context {
        config,
        source: cli.source.clone(),
        config_dir,
        output_dir,
    })
}

/// Directory containing `path`; `.` for bare file names.
fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Parse and normalize. Returns the catalog and the malformed-line count.
fn parse(ctx: &Context, document: &SourceDocument) -> Result<(Catalog, usize), Box<dyn Error>> {
    let parsed = document.parse(&ctx.config.parse_options());
    let malformed = parsed.malformed.len();
    let catalog = normalize::normalize(
        parsed,
        &ctx.config.normalize_options(),
        &document.path.display().to_string(),
    )?;
    Ok((catalog, malformed))
}

/// Full pipeline: load → parse → normalize → write site → preview.
fn build(ctx: &Context) -> Result<(), Box<dyn Error>> {
    let document = SourceDocument::load(&ctx.source)?;
    let (catalog, malformed) = parse(ctx, &document)?;

    let settings = BuildSettings::from_config(&ctx.config, &ctx.config_dir);
    let result = SiteBuilder::new(&ctx.output_dir, settings)
        .build(&catalog, &SourceInfo::of(&document))?;
    output::print_build_output(&catalog, &result, malformed);

    let stdin = io::stdin();
    let interactive = stdin.is_terminal();
    preview::run_preview(
        catalog.categories(),
        &ctx.config.preview,
        interactive,
        &mut stdin.lock(),
        &mut io::stdout().lock(),
    )?;
    Ok(())
}
