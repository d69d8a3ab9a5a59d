mod display;

use std::io::{Read, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};

use billdiff_ai::{AnalysisClient, AnalyzeError};
use billdiff_core::BillChangeSet;
use billdiff_fetch::FetchClient;

#[derive(Parser)]
#[command(name = "billdiff", version, about = "Show what a bill amendment actually changes")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Parse bill markup into segments, tagged text, and statistics
    Parse {
        /// Saved bill HTML file; reads stdin when omitted
        file: Option<PathBuf>,
        /// Fetch the markup from an ILGA.gov bill URL instead
        #[arg(long, conflicts_with = "file")]
        url: Option<String>,
        /// Emit the change set as JSON instead of the card display
        #[arg(long)]
        json: bool,
    },
    /// Parse and stream an AI analysis of the changes
    Analyze {
        file: Option<PathBuf>,
        #[arg(long, conflicts_with = "file")]
        url: Option<String>,
        /// Analysis service base URL
        #[arg(long, env = "BILLDIFF_ANALYSIS_URL", default_value = "http://localhost:8000")]
        service: String,
    },
    /// Print the tagged text with the copy-for-AI preamble
    Copy {
        file: Option<PathBuf>,
        #[arg(long, conflicts_with = "file")]
        url: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();
    tracing::info!("billdiff v{}", env!("CARGO_PKG_VERSION"));

    let cli = Cli::parse();
    match cli.command {
        Command::Parse { file, url, json } => {
            let set = load_and_parse(file, url).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&set)?);
            } else {
                display::print_change_set(&set);
            }
            if !set.has_changes() {
                eprintln!(
                    "note: no legislative formatting detected; \
                     the markup may lack underline/strikethrough tags"
                );
            }
        }
        Command::Analyze { file, url, service } => {
            let set = load_and_parse(file, url).await?;
            if !set.has_changes() {
                anyhow::bail!(
                    "no legislative formatting detected; nothing to analyze"
                );
            }
            run_analysis(&service, &set).await?;
        }
        Command::Copy { file, url } => {
            let set = load_and_parse(file, url).await?;
            println!("{}", billdiff_ai::copy_for_ai(&set.tagged_text));
        }
    }
    Ok(())
}

async fn load_and_parse(file: Option<PathBuf>, url: Option<String>) -> anyhow::Result<BillChangeSet> {
    let markup = if let Some(url) = url {
        FetchClient::new().fetch_bill_html(&url).await?
    } else if let Some(path) = file {
        std::fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))?
    } else {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("reading bill markup from stdin")?;
        buf
    };
    Ok(billdiff_core::parse_bill_markup(&markup))
}

async fn run_analysis(service: &str, set: &BillChangeSet) -> anyhow::Result<()> {
    let (too_long, words) = billdiff_ai::check_length(&set.tagged_text);
    if too_long {
        eprintln!(
            "note: this bill contains {words} words, over the recommended limit of {}; \
             the analysis may be incomplete",
            billdiff_ai::client::WORD_LIMIT
        );
    }

    let client = AnalysisClient::new(service.to_string());
    let mut stream = match client.analyze(&set.tagged_text).await {
        Ok(stream) => stream,
        Err(err) => return Err(manual_fallback(err)),
    };

    while let Some(fragment) = stream.next_fragment().await {
        match fragment {
            Ok(text) => {
                print!("{text}");
                std::io::stdout().flush().ok();
            }
            Err(err) => {
                // Fragments already printed stand; the failure ends the stream.
                println!();
                return Err(manual_fallback(err));
            }
        }
    }
    println!();
    Ok(())
}

/// Wrap a stream failure with the manual-path instruction.
fn manual_fallback(err: AnalyzeError) -> anyhow::Error {
    anyhow::anyhow!(
        "{err}\n\nAutomated analysis is unavailable. Run `billdiff copy` and \
         paste the output into any AI chat."
    )
}
