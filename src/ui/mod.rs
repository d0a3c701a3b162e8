//! Terminal rendering for papers, lists and highlighted text.
//!
//! Colour is only emitted when stdout is a terminal; piped output gets plain
//! text with matches wrapped in `**`.

use is_terminal::IsTerminal;
use owo_colors::OwoColorize;

use crate::models::{PaperList, PaperRecord, SavedPaper};
use crate::utils::{HighlightSpan, Highlighter};

/// Check if stdout is a terminal.
pub fn is_terminal() -> bool {
    std::io::stdout().is_terminal()
}

/// Status types for colored output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Success,
    Error,
    Warning,
    Info,
    Search,
}

/// Status icons for different operations.
pub fn status_icon(status: Status) -> &'static str {
    match status {
        Status::Success => "✓",
        Status::Error => "✗",
        Status::Warning => "⚠",
        Status::Info => "ℹ",
        Status::Search => "🔍",
    }
}

/// Print a styled status message.
pub fn print_status(status: Status, msg: &str) {
    let icon = status_icon(status);
    if !is_terminal() {
        println!("{} {}", icon, msg);
        return;
    }
    match status {
        Status::Success => println!("{} {}", icon.green().bold(), msg),
        Status::Error => println!("{} {}", icon.red().bold(), msg),
        Status::Warning => println!("{} {}", icon.yellow().bold(), msg),
        Status::Info => println!("{} {}", icon.cyan().bold(), msg),
        Status::Search => println!("{} {}", icon.yellow(), msg),
    }
}

/// Render spans as a single line of text.
///
/// With `color` set, matches are shown black-on-yellow; otherwise they are
/// wrapped in `**` so the emphasis survives in plain output.
pub fn render_spans(spans: &[HighlightSpan], color: bool) -> String {
    spans
        .iter()
        .map(|span| match span {
            HighlightSpan::Plain(text) => text.clone(),
            HighlightSpan::Match(text) if color => text.black().on_yellow().to_string(),
            HighlightSpan::Match(text) => format!("**{}**", text),
        })
        .collect()
}

/// Print a section header.
pub fn print_section(title: &str) {
    println!();
    if is_terminal() {
        println!("{}", format!("━━━ {} ━━━", title).bold().cyan());
    } else {
        println!("━━━ {} ━━━", title);
    }
}

/// Print one search result with query terms highlighted.
pub fn print_paper(index: usize, paper: &PaperRecord, highlighter: &Highlighter, abstract_length: Option<usize>) {
    let color = is_terminal();
    let title = render_spans(&highlighter.highlight(&paper.title, None), color);
    let authors = if paper.authors.is_empty() {
        "Unknown".to_string()
    } else {
        paper.authors.join(", ")
    };
    let year = paper
        .publication_year
        .map(|y| y.to_string())
        .unwrap_or_else(|| "????".to_string());

    println!();
    if color {
        println!("{} {}", format!("{:>3}.", index).dimmed(), title.bold());
        println!("     {} ({})", authors.green(), year.yellow());
    } else {
        println!("{:>3}. {}", index, title);
        println!("     {} ({})", authors, year);
    }
    if let Some(journal) = &paper.journal {
        println!("     {}", journal);
    }
    if let Some(doi) = &paper.doi {
        println!("     https://doi.org/{}", doi);
    }

    let abstract_spans = highlighter.highlight(paper.abstract_text(), abstract_length);
    if !abstract_spans.is_empty() {
        println!("     {}", render_spans(&abstract_spans, color));
    }
}

/// Print a paper list summary line.
pub fn print_list(list: &PaperList, paper_count: usize) {
    let created = list.created_at.format("%Y-%m-%d");
    if is_terminal() {
        println!(
            "{:>4}  {}  {} papers  {}",
            list.id.to_string().dimmed(),
            list.name.blue().bold(),
            paper_count.to_string().yellow(),
            created.to_string().dimmed()
        );
    } else {
        println!("{:>4}  {}  {} papers  {}", list.id, list.name, paper_count, created);
    }
    if let Some(description) = &list.description {
        println!("      {}", description);
    }
}

/// Print a saved paper entry within a list.
pub fn print_saved_paper(saved: &SavedPaper) {
    let paper = &saved.paper;
    let year = paper
        .publication_year
        .map(|y| format!(" ({})", y))
        .unwrap_or_default();
    println!("{:>4}  {}{}", saved.id, paper.title, year);
}

/// Print a divider line.
pub fn print_divider() {
    if is_terminal() {
        println!("{}", "─".repeat(80).dimmed());
    } else {
        println!("{}", "─".repeat(80));
    }
}
