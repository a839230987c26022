//! rag-query: terminal front end for the RAG query service.
//! With a question argument, submits it once and prints the answer and sources.
//! Without one, reads one query per stdin line; lines starting with `:` are commands.

use rag_query_client::config::{self, ConfigSource};
use rag_query_client::{format, ClientError, QueryClient, QueryView};
use std::path::{Path, PathBuf};
use std::process;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::EnvFilter;

const USAGE: &str =
    "usage: rag-query [--config <path>] [--json] [--write-config [--base-url <url>]] [question...]";

#[derive(Debug, Default)]
struct Args {
    config: Option<PathBuf>,
    json: bool,
    write_config: bool,
    base_url: Option<String>,
    question: Option<String>,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Args, String> {
    let mut parsed = Args::default();
    let mut words = Vec::new();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                let path = args.next().ok_or("--config needs a path")?;
                parsed.config = Some(PathBuf::from(path));
            }
            "--json" => parsed.json = true,
            "--write-config" => parsed.write_config = true,
            "--base-url" => {
                parsed.base_url = Some(args.next().ok_or("--base-url needs a URL")?);
            }
            "-h" | "--help" => return Err(USAGE.into()),
            _ => words.push(arg),
        }
    }
    if !words.is_empty() {
        parsed.question = Some(words.join(" "));
    }
    Ok(parsed)
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_logging();

    let args = match parse_args(std::env::args().skip(1)) {
        Ok(a) => a,
        Err(msg) => {
            eprintln!("{}", msg);
            process::exit(2);
        }
    };

    let source = config::resolve_config_path(args.config.as_deref()).unwrap_or_else(|| {
        eprintln!("Error: unable to determine config path (set --config or RAG_QUERY_CONFIG)");
        process::exit(1);
    });
    if args.write_config {
        process::exit(write_config(&source, args.base_url));
    }

    let cfg = match config::load_from(&source) {
        Ok(c) => c,
        Err(e) => {
            eprintln!(
                "Error: failed to load config from {}: {}",
                source.path().display(),
                e
            );
            process::exit(1);
        }
    };
    tracing::debug!(
        path = %source.path().display(),
        explicit = matches!(source, ConfigSource::Explicit(_)),
        base_url = cfg.base_url(),
        "config resolved"
    );

    let client = match QueryClient::new(cfg.base_url()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    let mut view = QueryView::new(cfg.date_format());
    if args.json {
        view.toggle_json_view();
    }

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap_or_else(|e| {
            eprintln!("Error: failed to create runtime: {}", e);
            process::exit(1);
        });

    let question = args.question;
    let code = rt.block_on(async {
        match question {
            Some(question) => {
                view.set_query(question);
                match submit(&mut view, &client).await {
                    Ok(()) => 0,
                    Err(_) => 1,
                }
            }
            None => interactive(&mut view, &client, cfg.date_format()).await,
        }
    });
    process::exit(code);
}

/// Write the effective config (defaults filled in) to the resolved path.
fn write_config(source: &ConfigSource, base_url: Option<String>) -> i32 {
    let path = source.path();
    let mut cfg = if path.exists() {
        match config::load(path) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error: failed to load config from {}: {}", path.display(), e);
                return 1;
            }
        }
    } else {
        config::Config::default()
    };
    if let Some(url) = base_url {
        if let Err(e) = QueryClient::new(&url) {
            eprintln!("Error: {}", e);
            return 1;
        }
        cfg.api.base_url = Some(url);
    }
    cfg.api.base_url = Some(cfg.base_url().to_string());
    cfg.display.date_format = Some(cfg.date_format().to_string());

    match config::save(path, &cfg) {
        Ok(()) => {
            println!("Wrote {}", path.display());
            0
        }
        Err(e) => {
            eprintln!("Error: failed to write config to {}: {}", path.display(), e);
            1
        }
    }
}

/// Submit the view's current query and print the result.
async fn submit(view: &mut QueryView, client: &QueryClient) -> Result<(), ClientError> {
    let pending = view.begin_submit();
    eprintln!("{}", view.submit_label());
    let result = client.query(pending.text()).await;
    let outcome = view.complete(pending, result);
    print!("{}", view.render());
    outcome
}

async fn interactive(view: &mut QueryView, client: &QueryClient, date_format: &str) -> i32 {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = match lines.next_line().await {
            Ok(Some(l)) => l,
            Ok(None) => return 0,
            Err(e) => {
                eprintln!("Error: failed to read stdin: {}", e);
                return 1;
            }
        };
        let line = line.trim_end_matches('\r');

        match line.split_once(' ').unwrap_or((line, "")) {
            (":quit", _) | (":q", _) => return 0,
            (":json", _) => {
                view.toggle_json_view();
                if view.has_sources() {
                    print!("{}", view.render_sources());
                } else {
                    eprintln!("No sources to show");
                }
            }
            (":docs", _) => match client.list_documents().await {
                Ok(list) => {
                    for doc in list.documents {
                        println!(
                            "{}  {} KB  {}",
                            doc.name,
                            format::kilobytes(doc.size),
                            format::epoch_date(doc.last_modified)
                                .map(|d| format::format_date(d, date_format))
                                .unwrap_or_else(|| format::UNKNOWN.into())
                        );
                    }
                }
                Err(e) => eprintln!("Error: {}", e),
            },
            (":reload", _) => match client.reload_index().await {
                Ok(status) => println!("{}", status.message),
                Err(e) => eprintln!("Error: {}", e),
            },
            (":upload", path) if !path.trim().is_empty() => {
                match client.upload(Path::new(path.trim())).await {
                    Ok(status) => println!("{}", status.message),
                    Err(e) => eprintln!("Error: {}", e),
                }
            }
            (":upload", _) => eprintln!("usage: :upload <path>"),
            _ => {
                view.set_query(line);
                let _ = submit(view, client).await;
            }
        }
    }
}
