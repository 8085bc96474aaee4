use anyhow::{Context, Result};
use chrono::Local;
use clap::{Parser, Subcommand};
use log::{debug, error, info};
use std::{
    io::Read,
    path::{Path, PathBuf},
};

use newsdigest::config::Config;
use newsdigest::document::{read_summary, SummaryDocument, SummaryResult, Verbosity};
use newsdigest::export::{export_summary, metadata_line, ExportFormat, ExportOptions};
use newsdigest::history::HistoryStore;
use newsdigest::layout::{layout_document, LayoutConfig, LayoutItem};
use newsdigest::metrics::AverageCharWidth;
use newsdigest::plan::Plan;
use newsdigest::summarizer::{GeminiClient, Summarize};

const GENERIC_FAILURE: &str =
    "Ocorreu um erro ao gerar o resumo. Verifique sua chave de API ou tente novamente.";

#[derive(Parser)]
#[command(name = "newsdigest")]
#[command(version, about = "News summaries with markdown and PDF export", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Act as a Pro subscriber (overrides NEWSDIGEST_PLAN)
    #[arg(long, global = true)]
    pro: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Summarize text read from a file or stdin
    Summarize {
        /// Input text file (stdin when omitted)
        #[arg(short, long)]
        input: Option<PathBuf>,
        #[arg(short, long, value_enum, default_value_t = Verbosity::Short)]
        verbosity: Verbosity,
        /// Also export the summary
        #[arg(short, long, value_enum)]
        export: Option<ExportFormat>,
        /// Directory for exported files
        #[arg(short, long, default_value = ".")]
        out: PathBuf,
        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Export a saved summary
    Export {
        /// Summary JSON file
        #[arg(required_unless_present = "id")]
        file: Option<PathBuf>,
        /// History item id (or unique prefix)
        #[arg(long, conflicts_with = "file")]
        id: Option<String>,
        #[arg(short, long, value_enum)]
        format: ExportFormat,
        #[arg(short, long, default_value = ".")]
        out: PathBuf,
    },

    /// Show how a summary is laid out on PDF pages
    Layout {
        /// Summary JSON file
        file: PathBuf,
        /// Print the layout as JSON
        #[arg(long)]
        json: bool,
    },

    /// Browse past summaries
    History {
        #[command(subcommand)]
        action: HistoryAction,
    },
}

#[derive(Subcommand)]
enum HistoryAction {
    /// List past summaries, newest first
    List,
    /// Print one summary as JSON
    Show { id: String },
    /// Delete all past summaries
    Clear,
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let mut config = Config::from_env()?;
    if cli.pro {
        config.plan = Plan::Pro;
    }
    debug!("Running with plan {}", config.plan);

    match run(cli.command, &config) {
        Ok(()) => Ok(()),
        Err(e) => {
            error!("Command failed: {:?}", e);
            Err(e)
        }
    }
}

fn run(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Summarize {
            input,
            verbosity,
            export,
            out,
            json,
        } => run_summarize(config, input.as_deref(), verbosity, export, &out, json),
        Commands::Export {
            file,
            id,
            format,
            out,
        } => {
            let doc = match (file, id) {
                (Some(path), _) => read_summary(&path)?,
                (None, Some(id)) => {
                    let store = HistoryStore::open(&config.history_path)?;
                    store
                        .find(&id, config.plan)?
                        .map(|item| item.result.document.clone())
                        .with_context(|| format!("No history item matches '{id}'"))?
                }
                (None, None) => anyhow::bail!("Either a summary file or --id is required"),
            };
            let path = export_summary(&doc, format, &out, &export_options(config))?;
            println!("{}", path.display());
            Ok(())
        }
        Commands::Layout { file, json } => run_layout(config, &file, json),
        Commands::History { action } => run_history(config, action),
    }
}

fn export_options(config: &Config) -> ExportOptions<AverageCharWidth> {
    ExportOptions {
        plan: config.plan,
        layout: LayoutConfig::default(),
        measure: AverageCharWidth::default(),
        metadata: metadata_line(&config.brand, Local::now().date_naive()),
    }
}

fn read_input(input: Option<&Path>) -> Result<String> {
    match input {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read input file: {}", path.display())),
        None => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read text from stdin")?;
            Ok(text)
        }
    }
}

fn run_summarize(
    config: &Config,
    input: Option<&Path>,
    verbosity: Verbosity,
    export: Option<ExportFormat>,
    out: &Path,
    json: bool,
) -> Result<()> {
    config.plan.check_verbosity(verbosity)?;
    if let Some(format) = export {
        config.plan.check_export(format)?;
    }

    let text = read_input(input)?;
    if text.trim().is_empty() {
        anyhow::bail!("Nothing to summarize: the input text is empty");
    }

    let client = GeminiClient::new(config.gemini()?)?;
    info!("Generating {} summary", verbosity);
    let document = match client.summarize(&text, verbosity) {
        Ok(document) => document,
        Err(e) => {
            error!("Failed to generate summary: {}", e);
            anyhow::bail!(GENERIC_FAILURE);
        }
    };

    let result = SummaryResult::new(document, verbosity, &text);
    let mut store = HistoryStore::open(&config.history_path)?;
    let item = store.record(result)?;

    if json {
        println!("{}", serde_json::to_string_pretty(item)?);
    } else {
        print_summary(&item.result);
        println!("\nid: {}", item.id);
    }

    if let Some(format) = export {
        let path = export_summary(
            &item.result.document,
            format,
            out,
            &export_options(config),
        )?;
        println!("{}", path.display());
    }
    Ok(())
}

fn print_summary(result: &SummaryResult) {
    let doc: &SummaryDocument = &result.document;
    println!(
        "[{}] {} caracteres originais\n",
        result.verbosity.label(),
        result.original_text_length
    );
    println!("{}\n", doc.title);
    for paragraph in doc.paragraphs() {
        println!("{}\n", paragraph);
    }
    if !doc.bullet_points.is_empty() {
        println!("Pontos Chave");
        for point in &doc.bullet_points {
            println!("  • {}", point);
        }
    }
}

fn run_layout(config: &Config, file: &Path, json: bool) -> Result<()> {
    let doc = read_summary(file)?;
    let layout_config = LayoutConfig::default();
    let metadata = metadata_line(&config.brand, Local::now().date_naive());
    let layout = layout_document(&doc, &metadata, &layout_config, AverageCharWidth::default())?;

    if json {
        println!("{}", serde_json::to_string_pretty(&layout)?);
        return Ok(());
    }

    let mut page = 1;
    println!("--- page {page} ---");
    for item in &layout.items {
        match item {
            LayoutItem::PageBreak => {
                page += 1;
                println!("--- page {page} ---");
            }
            LayoutItem::Block(block) => {
                println!(
                    "{:>6.1} {:>6.1}  {:<14} {}",
                    block.x,
                    block.y,
                    format!("{:?}", block.role),
                    block.text
                );
            }
        }
    }
    Ok(())
}

fn run_history(config: &Config, action: HistoryAction) -> Result<()> {
    let mut store = HistoryStore::open(&config.history_path)?;
    match action {
        HistoryAction::List => {
            if store.is_empty() {
                println!("Nenhum resumo ainda.");
                return Ok(());
            }
            let view = store.visible(config.plan);
            for item in view.items {
                let id = item.id.to_string();
                println!(
                    "{}  {}  {:<10}  {}",
                    &id[..8],
                    item.result.timestamp.with_timezone(&Local).format("%d/%m/%Y"),
                    item.result.verbosity,
                    item.result.document.title
                );
            }
            if view.hidden > 0 {
                println!(
                    "+ {} itens antigos ocultos (use --pro para o histórico ilimitado)",
                    view.hidden
                );
            }
        }
        HistoryAction::Show { id } => {
            let item = store
                .find(&id, config.plan)?
                .with_context(|| format!("No history item matches '{id}'"))?;
            println!("{}", serde_json::to_string_pretty(item)?);
        }
        HistoryAction::Clear => {
            config.plan.check_history_clear()?;
            store.clear()?;
            println!("Histórico limpo.");
        }
    }
    Ok(())
}
