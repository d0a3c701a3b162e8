use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use paper_shelf::chat::ChatClient;
use paper_shelf::config::{default_config_path, find_config_file, get_config, load_config, Config, ConfigFile};
use paper_shelf::models::{PaperBuilder, PaperList, PaperRecord, SearchQuery};
use paper_shelf::sources::PaperIndex;
use paper_shelf::store::{JsonStore, PaperStore};
use paper_shelf::ui::{self, Status};
use paper_shelf::utils::{highlight, CitationExport, CitationFormat, DirectorySink, Highlighter, HistoryService};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Paper Shelf - search papers, organize them into lists, chat about them, export citations
#[derive(Parser, Debug)]
#[command(name = "paper-shelf")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Search papers, organize them into lists, chat about them, and export citations", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose logging (can be used multiple times for more verbosity: -v, -vv)
    #[arg(long, short, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(long, short, global = true)]
    quiet: bool,

    /// Output format
    #[arg(long, short, value_enum, global = true, default_value_t = OutputFormat::Auto)]
    output: OutputFormat,

    /// Configuration file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Output format for results
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum OutputFormat {
    /// Automatic based on terminal (text if TTY, JSON otherwise)
    Auto,
    /// Human-readable text
    Text,
    /// JSON format (machine-readable)
    Json,
}

impl OutputFormat {
    fn is_json(self) -> bool {
        match self {
            OutputFormat::Json => true,
            OutputFormat::Text => false,
            OutputFormat::Auto => !ui::is_terminal(),
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Search the paper index
    #[command(alias = "s")]
    Search {
        /// Search query string
        query: String,

        /// Maximum number of results
        #[arg(long, short)]
        limit: Option<usize>,

        /// Number of results to skip
        #[arg(long, default_value_t = 0)]
        offset: usize,

        /// Year filter (e.g., "2020", "2018-2022", "2010-", "-2015")
        #[arg(long)]
        year: Option<String>,

        /// Venue filter
        #[arg(long)]
        venue: Option<String>,

        /// Save all results into this list (created if missing)
        #[arg(long)]
        save_to: Option<String>,
    },

    /// Highlight search terms in a piece of text
    Highlight {
        /// Text to highlight
        text: String,

        /// Search terms (repeatable)
        #[arg(long = "term", short = 't')]
        terms: Vec<String>,

        /// Truncate the text to this many characters before highlighting
        #[arg(long)]
        max_length: Option<usize>,
    },

    /// Manage paper lists
    #[command(subcommand)]
    List(ListCommands),

    /// Export the citations of a list
    Export {
        /// List name
        list: String,

        /// Citation format
        #[arg(long, short, value_enum, ignore_case = true)]
        format: Option<CitationFormat>,

        /// Directory to write the file into
        #[arg(long)]
        output_dir: Option<PathBuf>,

        /// Print to stdout instead of writing a file
        #[arg(long)]
        stdout: bool,
    },

    /// Ask the language model about the papers of a list
    Chat {
        /// List name
        list: String,

        /// Message to send
        message: String,

        /// Continue an existing chat session
        #[arg(long)]
        session: Option<u64>,
    },

    /// Show or clear recent searches
    History {
        /// Maximum number of entries
        #[arg(long, short, default_value_t = 20)]
        limit: usize,

        /// Clear the history
        #[arg(long)]
        clear: bool,
    },

    /// Write a default configuration file
    Init {
        /// Where to write the file (default: platform config dir)
        #[arg(long)]
        path: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(Subcommand, Debug)]
enum ListCommands {
    /// Create a new list
    Create {
        name: String,

        #[arg(long, short)]
        description: Option<String>,
    },

    /// Show all lists
    #[command(alias = "ls")]
    All,

    /// Show the papers of a list
    Show { name: String },

    /// Rename a list
    Rename { name: String, new_name: String },

    /// Delete a list with its papers and chats
    Delete { name: String },

    /// Add a paper to a list by hand
    Add {
        list: String,

        #[arg(long)]
        title: String,

        /// Author (repeatable, in citation order)
        #[arg(long = "author", short = 'a')]
        authors: Vec<String>,

        #[arg(long)]
        year: Option<i32>,

        #[arg(long)]
        journal: Option<String>,

        #[arg(long = "abstract")]
        abstract_text: Option<String>,

        #[arg(long)]
        doi: Option<String>,
    },

    /// Import papers from a JSON array of paper records
    Import { list: String, file: PathBuf },

    /// Remove a saved paper by id
    Remove { paper_id: u64 },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration from file if specified or found in default locations
    let config_path = cli.config.clone().or_else(find_config_file);
    let config = match &config_path {
        Some(path) => load_config(path).with_context(|| format!("Failed to load {}", path.display()))?,
        None => get_config()?,
    };

    // Initialize tracing based on verbosity, falling back to the configured level
    let log_level = match cli.verbose {
        0 => config.logging.level.as_str(),
        1 => "debug",
        _ => "trace",
    };

    let env_filter = if cli.quiet { "error" } else { log_level };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("paper_shelf={}", env_filter)),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Some(path) = &config_path {
        tracing::debug!("Using config file: {}", path.display());
    }

    let json = cli.output.is_json();

    match cli.command {
        Some(Commands::Search {
            query,
            limit,
            offset,
            year,
            venue,
            save_to,
        }) => {
            let mut search_query = SearchQuery::new(&query)
                .limit(limit.unwrap_or(config.index.default_limit))
                .offset(offset);
            search_query.year = year;
            search_query.venue = venue;

            let index = make_index(&config)?;
            let response = index
                .search(&search_query)
                .await
                .with_context(|| format!("Search failed on {}", index.name()))?;

            let history = HistoryService::with_path(config.storage.history_path());
            if let Err(e) = history.add_search(&query, Some(response.papers.len())) {
                tracing::warn!("Could not record search history: {}", e);
            }

            if json {
                println!("{}", serde_json::to_string_pretty(&response)?);
            } else {
                ui::print_status(
                    Status::Search,
                    &format!("{} results for \"{}\" ({} total)", response.papers.len(), query, response.total),
                );
                let highlighter = Highlighter::for_query(&query);
                let abstract_length = Some(config.display.abstract_length);
                for (i, paper) in response.papers.iter().enumerate() {
                    ui::print_paper(offset + i + 1, paper, &highlighter, abstract_length);
                }
                if let Some(next) = response.next {
                    println!();
                    println!("More results: --offset {}", next);
                }
            }

            if let Some(list_name) = save_to {
                let store = open_store(&config)?;
                let list = match store.find_list(&list_name)? {
                    Some(list) => list,
                    None => store.create_list(&list_name, None)?,
                };
                let mut saved = 0;
                for paper in response.papers {
                    match store.add_paper(list.id, paper) {
                        Ok(_) => saved += 1,
                        Err(e) => tracing::debug!("Skipping paper: {}", e),
                    }
                }
                if !cli.quiet {
                    eprintln!("Saved {} papers to '{}'", saved, list.name);
                }
            }
        }

        Some(Commands::Highlight {
            text,
            terms,
            max_length,
        }) => {
            let spans = highlight(&text, &terms, max_length);
            if json {
                println!("{}", serde_json::to_string_pretty(&spans)?);
            } else {
                println!("{}", ui::render_spans(&spans, ui::is_terminal()));
            }
        }

        Some(Commands::List(command)) => {
            let store = open_store(&config)?;
            run_list_command(&store, command, json, cli.quiet)?;
        }

        Some(Commands::Export {
            list,
            format,
            output_dir,
            stdout,
        }) => {
            let store = open_store(&config)?;
            let list = require_list(&store, &list)?;
            let papers = store.paper_records(list.id)?;
            let format = format.unwrap_or(config.export.default_format);

            let Some(export) = CitationExport::build(&papers, format, Some(&list.name)) else {
                ui::print_status(Status::Warning, &format!("'{}' has no papers to export", list.name));
                return Ok(());
            };

            if stdout {
                print!("{}", export.contents);
            } else {
                let sink = DirectorySink::new(output_dir.unwrap_or_else(|| config.export.output_dir.clone()));
                let path = export.save(&sink)?;
                if !cli.quiet {
                    ui::print_status(
                        Status::Success,
                        &format!("Exported {} {} citations to {}", papers.len(), format, path.display()),
                    );
                }
            }
        }

        Some(Commands::Chat {
            list,
            message,
            session,
        }) => {
            let endpoint = config
                .chat
                .endpoint
                .clone()
                .context("No chat endpoint configured (set [chat] endpoint or PAPER_SHELF_CHAT__ENDPOINT)")?;
            let client = ChatClient::new(
                endpoint,
                config.chat.api_key.clone(),
                Duration::from_secs(config.chat.timeout_seconds),
            )?;

            let store = open_store(&config)?;
            let list = require_list(&store, &list)?;

            let turn = client
                .ask(&store, &list, session, &chat_title(&message), &message)
                .await
                .with_context(|| format!("Chat about '{}' failed", list.name))?;
            let (session, reply) = (turn.session, turn.reply);

            if json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&serde_json::json!({
                        "session": session.id,
                        "message": reply,
                    }))?
                );
            } else {
                println!("{}", reply);
                if !cli.quiet {
                    eprintln!();
                    eprintln!("(session {}; continue with --session {})", session.id, session.id);
                }
            }
        }

        Some(Commands::History { limit, clear }) => {
            let history = HistoryService::with_path(config.storage.history_path());
            if clear {
                history.clear()?;
                if !cli.quiet {
                    ui::print_status(Status::Success, "Search history cleared");
                }
            } else {
                let entries = history.recent(limit)?;
                if json {
                    println!("{}", serde_json::to_string_pretty(&entries)?);
                } else if entries.is_empty() {
                    println!("No recent searches");
                } else {
                    for entry in entries {
                        let when = chrono::DateTime::from_timestamp(entry.timestamp, 0)
                            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
                            .unwrap_or_default();
                        let results = entry.results.map(|n| format!(" ({} results)", n)).unwrap_or_default();
                        println!("{}  {}{}", when, entry.query, results);
                    }
                }
            }
        }

        Some(Commands::Init { path, force }) => {
            let path = path
                .or_else(default_config_path)
                .context("Could not determine a config directory; pass --path")?;
            if path.exists() && !force {
                anyhow::bail!("{} already exists (use --force to overwrite)", path.display());
            }
            ConfigFile { config: Config::default() }.save(&path)?;
            ui::print_status(Status::Success, &format!("Wrote {}", path.display()));
        }

        None => {
            // No command provided - show help
            println!("No command provided. Use --help for usage information.");
            println!("Common commands:");
            println!("  search <query>          - Search for papers");
            println!("  list create <name>      - Create a paper list");
            println!("  export <list>           - Export citations of a list");
            println!("  chat <list> <message>   - Ask about the papers in a list");
        }
    }

    Ok(())
}

fn run_list_command(store: &dyn PaperStore, command: ListCommands, json: bool, quiet: bool) -> Result<()> {
    match command {
        ListCommands::Create { name, description } => {
            let list = store.create_list(&name, description.as_deref())?;
            if json {
                println!("{}", serde_json::to_string_pretty(&list)?);
            } else if !quiet {
                ui::print_status(Status::Success, &format!("Created list '{}' ({})", list.name, list.id));
            }
        }

        ListCommands::All => {
            let lists = store.lists()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&lists)?);
            } else if lists.is_empty() {
                println!("No lists yet. Create one with: paper-shelf list create <name>");
            } else {
                for list in &lists {
                    let count = store.papers(list.id)?.len();
                    ui::print_list(list, count);
                }
            }
        }

        ListCommands::Show { name } => {
            let list = require_list(store, &name)?;
            let papers = store.papers(list.id)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&papers)?);
            } else {
                ui::print_section(&list.name);
                if papers.is_empty() {
                    println!("(empty)");
                }
                for saved in &papers {
                    ui::print_saved_paper(saved);
                }
            }
        }

        ListCommands::Rename { name, new_name } => {
            let list = require_list(store, &name)?;
            let list = store.rename_list(list.id, &new_name)?;
            if !quiet {
                ui::print_status(Status::Success, &format!("Renamed to '{}'", list.name));
            }
        }

        ListCommands::Delete { name } => {
            let list = require_list(store, &name)?;
            store.delete_list(list.id)?;
            if !quiet {
                ui::print_status(Status::Success, &format!("Deleted list '{}'", list.name));
            }
        }

        ListCommands::Add {
            list,
            title,
            authors,
            year,
            journal,
            abstract_text,
            doi,
        } => {
            let list = require_list(store, &list)?;
            let mut builder = PaperBuilder::new(title).authors(authors);
            if let Some(year) = year {
                builder = builder.year(year);
            }
            if let Some(journal) = journal {
                builder = builder.journal(journal);
            }
            if let Some(text) = abstract_text {
                builder = builder.abstract_text(text);
            }
            if let Some(doi) = doi {
                builder = builder.doi(doi);
            }

            let saved = store.add_paper(list.id, builder.build())?;
            if !quiet {
                ui::print_status(
                    Status::Success,
                    &format!("Added '{}' to '{}' ({})", saved.paper.title, list.name, saved.id),
                );
            }
        }

        ListCommands::Import { list, file } => {
            let list = require_list(store, &list)?;
            let content = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let papers: Vec<PaperRecord> = serde_json::from_str(&content)
                .with_context(|| format!("{} is not a JSON array of papers", file.display()))?;

            let total = papers.len();
            let mut imported = 0;
            for paper in papers {
                match store.add_paper(list.id, paper) {
                    Ok(_) => imported += 1,
                    Err(e) => tracing::warn!("Skipping paper: {}", e),
                }
            }
            if !quiet {
                ui::print_status(
                    Status::Success,
                    &format!("Imported {} of {} papers into '{}'", imported, total, list.name),
                );
            }
        }

        ListCommands::Remove { paper_id } => {
            store.remove_paper(paper_id)?;
            if !quiet {
                ui::print_status(Status::Success, &format!("Removed paper {}", paper_id));
            }
        }
    }

    Ok(())
}

#[cfg(feature = "source-semantic")]
fn make_index(config: &Config) -> Result<Box<dyn PaperIndex>> {
    let index = paper_shelf::sources::SemanticScholarIndex::with_base_url(
        &config.index.base_url,
        config.index.api_key.clone(),
    )?;
    Ok(Box::new(index))
}

#[cfg(not(feature = "source-semantic"))]
fn make_index(_config: &Config) -> Result<Box<dyn PaperIndex>> {
    anyhow::bail!("No paper index compiled in (enable the `semantic` feature)")
}

fn open_store(config: &Config) -> Result<JsonStore> {
    let path = config.storage.store_path();
    JsonStore::open(&path).with_context(|| format!("Failed to open store at {}", path.display()))
}

fn require_list(store: &dyn PaperStore, name: &str) -> Result<PaperList> {
    store
        .find_list(name)?
        .with_context(|| format!("No list named '{}'", name))
}

/// First few words of the opening message
fn chat_title(message: &str) -> String {
    let words: Vec<&str> = message.split_whitespace().take(6).collect();
    if words.is_empty() {
        "Chat".to_string()
    } else {
        words.join(" ")
    }
}
