//! Interactive browse session.
//!
//! Each input line is either a search query or a `:command`. An empty line
//! is delivered as an `Enter` key press and `:esc` as `Escape`, so the key
//! bindings of the application state apply here unchanged.

use super::render;
use super::ui::{self, Spinner};
use super::{prompts, Session};
use crate::output::Output;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use owo_colors::OwoColorize;
use popcorn_config::FileStore;
use popcorn_core::{App, DetailView, KeyEvent, KeyboardEvents, RatingView};

const HELP: &str = "\
  <text>          search for a title
  <empty line>    clear the search (Enter)
  :open <n>       show details of result n (again to close)
  :esc            close the details (Escape)
  :rate <1-10>    rate the open movie
  :add            add the open movie to your watched list
  :delete <id>    remove a movie from your watched list
  :toggle results|watched
  :help           show this help
  :quit           leave";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Panel {
    Results,
    Watched,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum BrowseCommand {
    Query(String),
    Key(&'static str),
    Open(usize),
    Rate(u8),
    Add,
    Delete(String),
    Toggle(Panel),
    Help,
    Quit,
}

fn parse_command(line: &str) -> Result<BrowseCommand, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(BrowseCommand::Key("Enter"));
    }
    let Some(command) = line.strip_prefix(':') else {
        return Ok(BrowseCommand::Query(line.to_string()));
    };

    let mut parts = command.split_whitespace();
    let name = parts.next().unwrap_or_default().to_lowercase();
    let arg = parts.next();

    match (name.as_str(), arg) {
        ("q" | "quit", _) => Ok(BrowseCommand::Quit),
        ("h" | "help", _) => Ok(BrowseCommand::Help),
        ("esc" | "escape", _) => Ok(BrowseCommand::Key("Escape")),
        ("add", _) => Ok(BrowseCommand::Add),
        ("o" | "open", Some(n)) => n
            .parse::<usize>()
            .ok()
            .filter(|n| *n > 0)
            .map(BrowseCommand::Open)
            .ok_or_else(|| format!("'{}' is not a result number", n)),
        ("r" | "rate", Some(n)) => n
            .parse::<u8>()
            .map(BrowseCommand::Rate)
            .map_err(|_| format!("'{}' is not a rating", n)),
        ("d" | "delete", Some(id)) => Ok(BrowseCommand::Delete(id.to_string())),
        ("t" | "toggle", Some(panel)) => match panel {
            "results" => Ok(BrowseCommand::Toggle(Panel::Results)),
            "watched" => Ok(BrowseCommand::Toggle(Panel::Watched)),
            other => Err(format!("Unknown panel '{}'", other)),
        },
        ("o" | "open" | "r" | "rate" | "d" | "delete" | "t" | "toggle", None) => {
            Err(format!(":{} needs an argument", name))
        }
        _ => Err(format!("Unknown command ':{}' (try :help)", name)),
    }
}

pub async fn run_browse(output: &Output) -> Result<()> {
    if !ui::is_interactive() {
        return Err(eyre!("browse needs an interactive terminal"));
    }

    let session = Session::load()?;
    let min_length = session.config.search.min_query_length;
    let mut app = session.app()?;
    let events = KeyboardEvents::new();
    app.bind_keys(&events);

    output.println(format!("{}", "usePopcorn".bright_yellow().bold()));
    output.println("Type a title to search, :help for commands.");
    render_watched(&app, output);

    loop {
        let line = tokio::task::spawn_blocking(|| prompts::prompt_string("popcorn", None))
            .await
            .map_err(|e| eyre!("Input task failed: {}", e))??;

        let command = match parse_command(&line) {
            Ok(command) => command,
            Err(msg) => {
                output.error(msg);
                continue;
            }
        };

        match command {
            BrowseCommand::Quit => break,
            BrowseCommand::Help => {
                output.println(HELP);
                continue;
            }
            BrowseCommand::Query(query) => {
                app.set_query(query.as_str());
                if query.chars().count() < min_length {
                    output.warn(format!("Type at least {} characters to search", min_length));
                }
                wait_for_search(&app, output).await;
            }
            BrowseCommand::Key(code) => {
                events.emit(&KeyEvent::new(code));
                wait_for_search(&app, output).await;
            }
            BrowseCommand::Open(n) => {
                let state = app.search_state();
                let Some(item) = state.items().get(n - 1) else {
                    output.error(format!("There is no result {}", n));
                    continue;
                };
                app.select_movie(&item.imdb_id);
                if app.selected_id().is_some() {
                    let spinner = Spinner::start(format!("Loading {}...", item.title), output);
                    app.wait_detail().await;
                    spinner.finish();
                }
            }
            BrowseCommand::Rate(rating) => {
                if let Err(e) = app.set_user_rating(rating) {
                    output.error(e.to_string());
                    continue;
                }
            }
            BrowseCommand::Add => match app.add_selected_to_watched().await {
                Ok(true) => output.success("Added to your watched list"),
                Ok(false) => output.warn("Already in your watched list"),
                Err(e) => {
                    output.error(e.to_string());
                    continue;
                }
            },
            BrowseCommand::Delete(id) => match app.delete_watched(&id) {
                Ok(true) => output.success(format!("Removed {}", id)),
                Ok(false) => output.warn(format!("{} is not in your watched list", id)),
                Err(e) => output.error(e.to_string()),
            },
            BrowseCommand::Toggle(Panel::Results) => {
                app.toggle_results_panel();
            }
            BrowseCommand::Toggle(Panel::Watched) => {
                app.toggle_watched_panel();
            }
        }

        render_screen(&app, output);
    }

    app.unbind_keys();
    Ok(())
}

async fn wait_for_search(app: &App<FileStore>, output: &Output) {
    let spinner = Spinner::start(format!("Searching for '{}'...", app.query()), output);
    app.wait_search().await;
    spinner.finish();
}

fn render_screen(app: &App<FileStore>, output: &Output) {
    render_results(app, output);
    render_detail(app, output);
    render_watched(app, output);
}

fn render_results(app: &App<FileStore>, output: &Output) {
    let state = app.search_state();
    output.println(format!("\n{}", render::found_line(state.items().len()).bold()));

    if !app.panels().results_open {
        output.println("[+] results hidden");
        return;
    }
    if let Some(error) = &state.error {
        output.error(error);
    } else if !state.items().is_empty() {
        output.println(render::results_table(state.items(), app.watched()).to_string());
    }
}

fn render_detail(app: &App<FileStore>, output: &Output) {
    match app.detail_view() {
        DetailView::Closed => {}
        DetailView::Loading => output.info("Loading..."),
        DetailView::Failed(message) => output.error(message),
        DetailView::Ready { detail, rating } => {
            output.println(render::detail_table(&detail).to_string());
            match rating {
                RatingView::Rated(stored) => output.println(format!(
                    "You rated this movie {} {}",
                    stored,
                    render::stars(stored)
                )),
                RatingView::Input { rating, can_add } => {
                    output.println(format!(
                        "Your rating: {}  (:rate <1-10>)",
                        render::stars(rating)
                    ));
                    if can_add {
                        output.println("Type :add to add it to your watched list");
                    }
                }
            }
        }
    }
}

fn render_watched(app: &App<FileStore>, output: &Output) {
    output.println(format!(
        "\n{} {}",
        "Movies you watched:".bold(),
        render::summary_line(&app.summary())
    ));

    if !app.panels().watched_open {
        output.println("[+] watched list hidden");
        return;
    }
    if !app.watched().is_empty() {
        output.println(render::watched_table(app.watched()).to_string());
    }
}
