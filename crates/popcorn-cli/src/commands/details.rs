use super::render;
use super::ui::Spinner;
use super::Session;
use crate::output::Output;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use popcorn_core::watched;
use serde_json::json;

pub async fn run_details(imdb_id: &str, output: &Output) -> Result<()> {
    let session = Session::load()?;
    let app = session.app()?;
    app.select_movie(imdb_id);

    let spinner = Spinner::start(format!("Loading {}...", imdb_id), output);
    let state = app.wait_detail().await;
    spinner.finish();

    if let Some(error) = &state.error {
        return Err(eyre!("{}", error));
    }
    let detail = state
        .detail()
        .ok_or_else(|| eyre!("No details returned for {}", imdb_id))?;
    let entry = watched::find(app.watched(), imdb_id);

    output.json(&json!({
        "detail": detail,
        "watched": entry,
    }));

    output.println(render::detail_table(detail).to_string());
    if let Some(entry) = entry {
        output.println(format!(
            "You rated this movie {} {}",
            entry.user_rating,
            render::stars(entry.user_rating)
        ));
    }
    Ok(())
}
