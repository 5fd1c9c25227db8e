use super::render;
use super::ui::Spinner;
use super::Session;
use crate::output::Output;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use serde_json::json;

pub async fn run_search(query: &str, output: &Output) -> Result<()> {
    let session = Session::load()?;
    let min_length = session.config.search.min_query_length;
    if query.chars().count() < min_length {
        output.warn(format!("Type at least {} characters to search", min_length));
        return Ok(());
    }

    let app = session.app()?;
    app.set_query(query);

    let spinner = Spinner::start(format!("Searching for '{}'...", query), output);
    let state = app.wait_search().await;
    spinner.finish();

    if let Some(error) = &state.error {
        output.json(&json!({ "query": query, "error": error }));
        return Err(eyre!("{}", error));
    }

    output.json(&json!({
        "query": query,
        "count": state.items().len(),
        "results": state.items(),
    }));

    output.println(render::found_line(state.items().len()));
    if !state.items().is_empty() {
        output.println(render::results_table(state.items(), app.watched()).to_string());
    }
    Ok(())
}
