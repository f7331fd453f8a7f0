use env_logger::Env;
use std::io::{BufRead, Write};
use std::sync::Arc;

pub mod card;
pub mod client;
pub mod config;
pub mod normalize;
pub mod query;
pub mod session;

pub use client::{fetch_outcome, OpenLibraryClient, SearchBackend, TransportError};
pub use config::SearchConfig;
pub use normalize::{normalize, BookRecord, SearchOutcome};
pub use query::{build, RequestDescriptor, SearchMode, SearchQuery, ValidationError};
pub use session::{FailureKind, SearchSession, SearchState};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Input {
  Search(String),
  Mode(SearchMode),
  Clear,
  Json,
  Help,
  Quit,
}

fn parse_input(line: &str) -> Input {
  let trimmed = line.trim();
  let Some(command) = trimmed.strip_prefix(':') else {
    // Blank lines are still searches so the session can report the validation message.
    return Input::Search(line.to_string());
  };
  match command.trim().to_ascii_lowercase().as_str() {
    "q" | "quit" | "exit" => Input::Quit,
    "clear" | "c" => Input::Clear,
    "json" => Input::Json,
    "help" | "h" | "?" => Input::Help,
    other => match SearchMode::parse(other) {
      Some(mode) => Input::Mode(mode),
      None => Input::Help,
    },
  }
}

fn render_state(state: &SearchState) -> String {
  match state {
    SearchState::Idle => String::new(),
    SearchState::Validating => String::new(),
    SearchState::Loading { .. } => "Searching...".to_string(),
    SearchState::Success { records } => {
      let mut out = card::results_heading(records.len());
      for (index, book) in card::cards_for(records).iter().enumerate() {
        out.push_str(&format!(
          "\n\n{:>2}. {}\n    By: {}\n    {}",
          index + 1,
          book.title,
          book.authors_line,
          book.year_line
        ));
        if let Some(isbn) = &book.isbn_line {
          out.push_str(&format!("\n    {}", isbn));
        }
        if let Some(subjects) = &book.subjects_line {
          out.push_str(&format!("\n    {}", subjects));
        }
        match &book.cover {
          card::CoverState::Image { url } => out.push_str(&format!("\n    Cover: {}", url)),
          card::CoverState::Placeholder { text } => out.push_str(&format!("\n    [{}]", text)),
        }
      }
      out
    }
    SearchState::Empty { message } => message.clone(),
    SearchState::Failed { message, .. } => format!("! {}", message),
  }
}

const HELP_TEXT: &str = "Type a search and press Enter. :title / :author / :any switch mode, :clear resets, :json dumps the current state, :quit exits.";

pub fn run() {
  env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();

  let config = SearchConfig::from_env();
  let backend: Arc<dyn SearchBackend> = match OpenLibraryClient::new(&config) {
    Ok(client) => Arc::new(client),
    Err(err) => {
      log::error!("failed to build http client: {}", err);
      return;
    }
  };
  log::info!("book finder using {}", config.search_url);

  let session = Arc::new(SearchSession::new(config));
  let updates = session.subscribe();
  std::thread::spawn(move || {
    for state in updates.iter() {
      let rendered = render_state(&state);
      if !rendered.is_empty() {
        println!("{}\n", rendered);
      }
    }
  });

  println!("Book Finder\n{}", HELP_TEXT);
  let mut mode = SearchMode::Title;
  let stdin = std::io::stdin();
  let mut lines = stdin.lock().lines();
  loop {
    print!("[{}] ", mode.placeholder());
    let _ = std::io::stdout().flush();

    let line = match lines.next() {
      Some(Ok(line)) => line,
      Some(Err(err)) => {
        log::error!("failed to read input: {}", err);
        break;
      }
      None => break,
    };

    match parse_input(&line) {
      Input::Quit => break,
      Input::Help => println!("{}", HELP_TEXT),
      Input::Clear => session.clear(),
      Input::Mode(next) => mode = next,
      Input::Json => match serde_json::to_string_pretty(&session.state()) {
        Ok(json) => println!("{}", json),
        Err(err) => log::error!("failed to serialize search state: {}", err),
      },
      Input::Search(text) => {
        // Validation failures are already published to the renderer.
        let _ = session.spawn_search(Arc::clone(&backend), &text, mode);
      }
    }
  }
}
