use super::render;
use super::ui::Spinner;
use super::Session;
use crate::output::Output;
use crate::WatchedCommands;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use popcorn_config::FileStore;
use popcorn_core::{watched, PersistedValue};
use popcorn_models::{WatchedEntry, WatchedSummary};
use serde_json::json;

pub async fn run_watched(cmd: WatchedCommands, output: &Output) -> Result<()> {
    let session = Session::load()?;
    match cmd {
        WatchedCommands::List => list_watched(&session, output),
        WatchedCommands::Summary => show_summary(&session, output),
        WatchedCommands::Add { id, rating } => add_watched(&session, &id, rating, output).await,
        WatchedCommands::Remove { id } => remove_watched(&session, &id, output),
    }
}

/// The watched list without starting any fetchers
fn load_list(session: &Session) -> Result<PersistedValue<Vec<WatchedEntry>, FileStore>> {
    let store = session.open_store()?;
    Ok(PersistedValue::load(store, &session.config.storage.watched_key, Vec::new()))
}

fn list_watched(session: &Session, output: &Output) -> Result<()> {
    let list = load_list(session)?;
    let entries = list.get();

    output.json(&json!({ "count": entries.len(), "watched": entries }));

    if entries.is_empty() {
        output.info("Your watched list is empty. Add movies with 'popcorn watched add <id> --rating <1-10>' or 'popcorn browse'.");
        return Ok(());
    }
    output.println(render::watched_table(entries).to_string());
    output.println(render::summary_line(&WatchedSummary::from_entries(entries)));
    Ok(())
}

fn show_summary(session: &Session, output: &Output) -> Result<()> {
    let list = load_list(session)?;
    let summary = WatchedSummary::from_entries(list.get());

    // NaN is not representable in JSON; empty averages become null
    let finite = |value: f64| if value.is_nan() { None } else { Some(value) };
    output.json(&json!({
        "count": summary.count,
        "avg_imdb_rating": finite(summary.avg_imdb_rating),
        "avg_user_rating": finite(summary.avg_user_rating),
        "avg_runtime": finite(summary.avg_runtime),
    }));

    output.println(render::summary_line(&summary));
    Ok(())
}

async fn add_watched(session: &Session, imdb_id: &str, rating: u8, output: &Output) -> Result<()> {
    let mut app = session.app()?;
    if let Some(entry) = watched::find(app.watched(), imdb_id) {
        output.warn(format!(
            "{} is already in your watched list (rated {})",
            entry.title, entry.user_rating
        ));
        return Ok(());
    }

    app.select_movie(imdb_id);
    app.set_user_rating(rating).map_err(|e| eyre!("{}", e))?;

    let spinner = Spinner::start(format!("Loading {}...", imdb_id), output);
    let added = app.add_selected_to_watched().await;
    spinner.finish();
    added.map_err(|e| eyre!("{}", e))?;

    if let Some(entry) = watched::find(app.watched(), imdb_id) {
        output.json(&json!({ "added": entry }));
        output.success(format!(
            "Added {} ({}) with rating {}",
            entry.title, entry.year, entry.user_rating
        ));
    }
    Ok(())
}

fn remove_watched(session: &Session, imdb_id: &str, output: &Output) -> Result<()> {
    let mut list = load_list(session)?;
    if !watched::contains(list.get(), imdb_id) {
        output.warn(format!("{} is not in your watched list", imdb_id));
        return Ok(());
    }

    list.update(|entries| watched::remove_by_id(entries, imdb_id))
        .map_err(|e| eyre!("Failed to update watched list: {}", e))?;
    output.success(format!("Removed {} from your watched list", imdb_id));
    Ok(())
}
