use clap::Parser;
use std::io::{self, Read};
use std::path::PathBuf;
use std::sync::Arc;
use wiki2html::{DirPageStore, MarkdownRenderer, RenderConfig};

/// Render wiki-flavored markdown to HTML.
#[derive(Debug, Parser)]
#[command(name = "wiki2html", version)]
struct Cli {
    /// Markdown file to render; stdin when omitted or `-`.
    input: Option<PathBuf>,

    /// Directory of `.md` pages used to flag links to missing pages.
    #[arg(short, long)]
    pages: Option<PathBuf>,

    /// YAML config file.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// URL prefix for wiki links (overrides the config).
    #[arg(long)]
    url_prefix: Option<String>,

    /// Print only the table of contents markup.
    #[arg(long, conflicts_with = "json")]
    toc: bool,

    /// Print the HTML, TOC markup and heading tree as JSON.
    #[arg(long)]
    json: bool,

    /// Print the highlight stylesheet and exit.
    #[arg(long)]
    css: bool,
}

fn main() {
    init_logging();
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> wiki2html::Result<()> {
    let mut config = match &cli.config {
        Some(path) => RenderConfig::load(path)?,
        None => RenderConfig::default(),
    };
    if let Some(prefix) = cli.url_prefix {
        config.url_prefix = prefix;
    }

    let mut renderer = MarkdownRenderer::new(config);

    if cli.css {
        let css = renderer
            .highlighter()
            .stylesheet(&renderer.config().highlight_theme)?;
        print!("{}", css);
        return Ok(());
    }

    if let Some(dir) = cli.pages {
        renderer = renderer.with_store(Arc::new(DirPageStore::new(dir)?));
    }

    let text = read_input(cli.input.as_ref())?;
    let out = renderer.render(&text);

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else if cli.toc {
        println!("{}", out.toc_html);
    } else {
        print!("{}", out.html);
    }
    Ok(())
}

fn read_input(path: Option<&PathBuf>) -> wiki2html::Result<String> {
    match path {
        Some(p) if p.as_os_str() != "-" => {
            std::fs::read_to_string(p).map_err(|source| wiki2html::Error::Io {
                path: p.clone(),
                source,
            })
        }
        _ => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .map_err(|source| wiki2html::Error::Io {
                    path: PathBuf::from("<stdin>"),
                    source,
                })?;
            Ok(buf)
        }
    }
}

fn init_logging() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_timestamp_millis()
        .init();
}
