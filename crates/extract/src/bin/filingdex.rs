//! filingdex: command-line access to the filing extraction engine.
//!
//! Prints each operation's result envelope as JSON on stdout; logs go to
//! stderr.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::info;

use filingdex_core::config::{load_dotenv, Config};
use filingdex_extract::service::{
    to_response, DocumentRequest, FilingService, ReadSectionRequest, StreamRequest,
};
use filingdex_extract::source::{EdgarSource, FileSource, RawDocumentSource};

// ── CLI ─────────────────────────────────────────────────────────────

/// Navigate large filings as sections and size-bounded chunks.
#[derive(Parser, Debug)]
#[command(name = "filingdex", version, about)]
struct Cli {
    /// Where raw documents come from.
    #[arg(long, env = "FILINGDEX_SOURCE", value_enum, default_value_t = SourceKind::File)]
    source: SourceKind,

    /// Root of the local `{cik}/{accession}/{document}` mirror (file source).
    #[arg(long, env = "DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Pretty-print JSON output.
    #[arg(long)]
    pretty: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum SourceKind {
    File,
    Edgar,
}

#[derive(Args, Debug)]
struct DocumentArgs {
    /// Issuer CIK.
    #[arg(long)]
    cik: String,

    /// Accession number, with or without dashes.
    #[arg(long)]
    accession: String,

    /// Document inside the filing; defaults to the full `.txt` submission.
    #[arg(long)]
    document: Option<String>,
}

impl DocumentArgs {
    fn request(&self) -> DocumentRequest {
        DocumentRequest {
            cik: self.cik.clone(),
            accession_number: self.accession.clone(),
            document_name: self.document.clone(),
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Full normalized text of a document.
    Fetch(DocumentArgs),

    /// Sections found in a document.
    Sections(DocumentArgs),

    /// One chunk of one section.
    Section {
        #[command(flatten)]
        doc: DocumentArgs,

        /// Section type, e.g. `item_1a` or `risk_factors`.
        #[arg(long = "type")]
        section_type: String,

        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        chunk_index: i64,

        #[arg(long, allow_negative_numbers = true)]
        chunk_size: Option<i64>,

        #[arg(long, allow_negative_numbers = true)]
        overlap: Option<i64>,
    },

    /// A window of the document-wide chunk stream.
    Stream {
        #[command(flatten)]
        doc: DocumentArgs,

        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        start_chunk: i64,

        #[arg(long, allow_negative_numbers = true)]
        max_chunks: Option<i64>,

        #[arg(long, allow_negative_numbers = true)]
        chunk_size: Option<i64>,

        #[arg(long, allow_negative_numbers = true)]
        overlap: Option<i64>,
    },
}

fn build_source(kind: SourceKind, config: &Config) -> anyhow::Result<Arc<dyn RawDocumentSource>> {
    Ok(match kind {
        SourceKind::File => {
            let source = FileSource::new(&config.source.data_dir);
            tracing::debug!(root = %source.root().display(), "Reading filings from local mirror");
            Arc::new(source)
        }
        SourceKind::Edgar => Arc::new(EdgarSource::new(&config.source)?),
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    load_dotenv();
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let mut config = Config::from_env();
    if let Some(dir) = cli.data_dir.clone() {
        config.source.data_dir = dir;
    }
    config.log_summary();

    let source = build_source(cli.source, &config)?;
    info!(source = source.name(), "source ready");
    let service = FilingService::from_config(source, &config);

    let response = match cli.command {
        Command::Fetch(doc) => to_response(&service.fetch_document(&doc.request()).await),
        Command::Sections(doc) => to_response(&service.list_sections(&doc.request()).await),
        Command::Section {
            doc,
            section_type,
            chunk_index,
            chunk_size,
            overlap,
        } => {
            let req = ReadSectionRequest {
                document: doc.request(),
                section_type,
                chunk_size,
                overlap,
                chunk_index,
            };
            to_response(&service.read_section(&req).await)
        }
        Command::Stream {
            doc,
            start_chunk,
            max_chunks,
            chunk_size,
            overlap,
        } => {
            let req = StreamRequest {
                document: doc.request(),
                chunk_size,
                overlap,
                start_chunk,
                max_chunks,
            };
            to_response(&service.stream_chunks(&req).await)
        }
    };

    let out = if cli.pretty {
        serde_json::to_string_pretty(&response)?
    } else {
        serde_json::to_string(&response)?
    };
    println!("{out}");

    let succeeded = response["success"].as_bool().unwrap_or(false);
    Ok(if succeeded { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}
