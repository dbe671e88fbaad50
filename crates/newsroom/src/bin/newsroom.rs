// ABOUTME: CLI binary for the newsroom engine.
// ABOUTME: Runs link discovery or article extraction over saved HTML pages and prints the results.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use digests_newsroom::source::read_html_file;
use digests_newsroom::{ContentType, DiscoveryReport, Newsroom, StaticRenderer};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "newsroom")]
#[command(about = "Discover press-release links and extract labeled articles")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Find the press-release link group on a saved listing page
    Discover(DiscoverArgs),
    /// Label and prune a saved article page
    Extract(ExtractArgs),
}

#[derive(Args, Debug)]
struct DiscoverArgs {
    /// Saved listing page
    #[arg(long = "html")]
    html: PathBuf,

    /// URL the page was saved from
    #[arg(long = "url")]
    url: String,

    /// Pagination attempt budget
    #[arg(long = "max-attempts", default_value_t = 5)]
    max_attempts: usize,

    /// Output file path (default: stdout)
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct ExtractArgs {
    /// Saved article page
    #[arg(long = "html")]
    html: PathBuf,

    /// URL the page was saved from
    #[arg(long = "url")]
    url: String,

    /// Output format: html (default), markdown/md, text/txt
    #[arg(short = 'f', long = "format", default_value = "html")]
    format: String,

    /// Output the full extracted article as JSON instead of the rendered body
    #[arg(long = "json")]
    json_output: bool,

    /// Output file path (default: stdout)
    #[arg(short = 'o', long = "output")]
    output: Option<PathBuf>,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("newsroom=info,digests_newsroom=info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn read_page(path: &Path) -> Result<String, String> {
    read_html_file(path).map_err(|e| format!("error reading file {:?}: {}", path, e))
}

fn run_discover(args: &DiscoverArgs) -> Result<String, String> {
    let html = read_page(&args.html)?;
    let newsroom = Newsroom::builder().max_attempts(args.max_attempts).build();
    let mut renderer = StaticRenderer::new(args.url.clone(), html);
    let session = newsroom
        .discover(&mut renderer, &args.url)
        .map_err(|e| format!("error discovering links: {}", e))?;
    serde_json::to_string_pretty(&DiscoveryReport::from(&session))
        .map_err(|e| format!("error serializing report: {}", e))
}

fn run_extract(args: &ExtractArgs) -> Result<String, String> {
    let html = read_page(&args.html)?;
    let newsroom = Newsroom::builder()
        .content_type(ContentType::from(args.format.as_str()))
        .build();
    let article = newsroom
        .extract_html(&html, &args.url)
        .map_err(|e| format!("error extracting article: {}", e))?;
    if args.json_output {
        serde_json::to_string_pretty(&article)
            .map_err(|e| format!("error serializing article: {}", e))
    } else {
        Ok(article.rendered)
    }
}

fn emit(output: Option<&Path>, text: &str) -> Result<(), String> {
    match output {
        Some(path) => {
            fs::write(path, text).map_err(|e| format!("error writing to {:?}: {}", path, e))
        }
        None => {
            println!("{}", text);
            Ok(())
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing();

    let result = match &cli.command {
        Command::Discover(args) => {
            run_discover(args).and_then(|out| emit(args.output.as_deref(), &out))
        }
        Command::Extract(args) => {
            run_extract(args).and_then(|out| emit(args.output.as_deref(), &out))
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("{}", message);
            ExitCode::from(1)
        }
    }
}
