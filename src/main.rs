use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, bail};
use clap::Parser;
use tracing::info;

use buffer_words::cache::DEFAULT_PAGE_SIZE;
use buffer_words::host::memory::MemoryHost;
use buffer_words::words::DEFAULT_KEYWORD_PATTERN;
use buffer_words::{BufferHost, BufferSource, SourceParams, logging};

/// Print the completion candidates offered by a set of buffers
#[derive(Parser, Debug)]
#[command(name = "buffer-words")]
#[command(version)]
struct Args {
    /// Files to load as buffers; the first one is the buffer being edited
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Keyword pattern (regular expression)
    #[arg(short, long, default_value = DEFAULT_KEYWORD_PATTERN)]
    pattern: String,

    /// File type of the completion request (defaults to the first file's)
    #[arg(short, long)]
    filetype: Option<String>,

    /// Source params as a JSON object, e.g. '{"bufferNameStyle":"basename"}'
    #[arg(long, default_value = "{}")]
    params: String,

    /// Lines fetched per host request
    #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
    page_size: usize,

    /// Log level (overrides RUST_LOG)
    #[arg(long)]
    log_level: Option<String>,

    /// Append a debug log to PATH, or to a session log in the cache directory
    /// when no PATH is given
    #[arg(long, num_args = 0..=1)]
    log_file: Option<Option<PathBuf>>,

    /// Disable ANSI colors in log output
    #[arg(long)]
    no_color: bool,
}

/// File type named after the extension, the way editors guess it for
/// unknown file types
fn guess_file_type(path: &Path) -> String {
    path.extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or_default()
        .to_string()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let log_file = match &args.log_file {
        Some(Some(path)) => Some(path.clone()),
        Some(None) => Some(logging::session_log_path().context("Failed to create log directory")?),
        None => None,
    };
    let _guard = logging::init_logger(args.no_color, args.log_level.as_deref(), log_file.as_deref())
        .context("Failed to initialize logging")?;

    let params: serde_json::Value =
        serde_json::from_str(&args.params).context("--params is not valid JSON")?;
    if !params.is_object() {
        bail!("--params must be a JSON object");
    }
    let config = SourceParams::from_json(params)?.normalize();

    let host = Arc::new(MemoryHost::new());
    for path in &args.files {
        let id = host
            .load_file(path, &guess_file_type(path))
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        host.show(id);
    }

    let source = BufferSource::with_page_size(Arc::clone(&host), args.page_size);
    let summary = source.on_init(&args.pattern, &config).await?;
    info!("Initial pass: {:?}", summary);

    let file_type = match args.filetype {
        Some(file_type) => file_type,
        None => host.file_type(host.current_buffer().await?).await?,
    };

    let candidates = source
        .gather_candidates(&file_type, &args.pattern, &config)
        .await?;

    let mut out = io::BufWriter::new(io::stdout().lock());
    for candidate in &candidates {
        serde_json::to_writer(&mut out, candidate)?;
        writeln!(out)?;
    }
    out.flush()?;

    info!("{} candidates, {:?}", candidates.len(), source.stats());
    source.shutdown();

    Ok(())
}
