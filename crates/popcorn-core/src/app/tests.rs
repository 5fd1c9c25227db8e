use super::*;
use crate::keys::KeyEvent;
use crate::testing::{inception_detail, result_item, ScriptedApi};
use popcorn_config::MemoryStore;
use std::time::Duration;

fn create_app(api: &Arc<ScriptedApi>) -> App<MemoryStore> {
    App::new(Arc::clone(api) as Arc<dyn MovieApi>, MemoryStore::new(), &Config::default())
}

fn create_entry(imdb_id: &str, imdb_rating: f64, user_rating: u8, runtime: u32) -> WatchedEntry {
    WatchedEntry {
        imdb_id: imdb_id.to_string(),
        title: format!("Movie {}", imdb_id),
        year: "2000".to_string(),
        poster: String::new(),
        imdb_rating,
        runtime,
        user_rating,
        user_rating_decisions: 1,
        added_at: None,
    }
}

async fn open_inception(app: &App<MemoryStore>, api: &ScriptedApi) {
    app.select_movie("tt1375666");
    api.wait_for_call("i:tt1375666").await;
    api.reply_details("tt1375666", Ok(inception_detail()));
    app.wait_detail().await;
}

#[tokio::test]
async fn test_short_then_long_query() {
    let api = Arc::new(ScriptedApi::new());
    let app = create_app(&api);

    app.set_query("in");
    let state = app.wait_search().await;
    assert!(state.items().is_empty());
    assert!(api.calls().is_empty());

    app.set_query("incep");
    api.wait_for_call("s:incep").await;
    api.reply_search("incep", Ok(vec![result_item("tt1375666", "Inception")]));
    let state = app.wait_search().await;

    assert_eq!(api.calls(), vec!["s:incep".to_string()]);
    assert_eq!(state.items().len(), 1);
    assert_eq!(state.items()[0].title, "Inception");
    assert_eq!(app.result_count(), 1);
}

#[tokio::test]
async fn test_select_toggles() {
    let api = Arc::new(ScriptedApi::new());
    let app = create_app(&api);

    app.select_movie("tt1375666");
    assert_eq!(app.selected_id().as_deref(), Some("tt1375666"));

    app.select_movie("tt0816692");
    assert_eq!(app.selected_id().as_deref(), Some("tt0816692"));

    app.select_movie("tt0816692");
    assert_eq!(app.selected_id(), None);
    assert_eq!(app.detail_view(), DetailView::Closed);
}

#[tokio::test]
async fn test_new_search_closes_detail() {
    let api = Arc::new(ScriptedApi::new());
    let app = create_app(&api);
    app.wait_search().await;

    app.select_movie("tt1375666");
    app.set_query("matrix");
    api.wait_for_call("s:matrix").await;

    assert_eq!(app.selected_id(), None);
}

#[tokio::test]
async fn test_rate_and_add_to_watched() {
    let api = Arc::new(ScriptedApi::new());
    let mut app = create_app(&api);
    open_inception(&app, &api).await;

    match app.detail_view() {
        DetailView::Ready { detail, rating } => {
            assert_eq!(detail.title, "Inception");
            assert_eq!(rating, RatingView::Input { rating: 0, can_add: false });
        }
        other => panic!("unexpected detail view: {:?}", other),
    }

    assert!(app.add_selected_to_watched().await.is_err());

    app.set_user_rating(7).unwrap();
    app.set_user_rating(9).unwrap();
    assert!(app.add_selected_to_watched().await.unwrap());

    let watched = app.watched();
    assert_eq!(watched.len(), 1);
    assert_eq!(watched[0].imdb_id, "tt1375666");
    assert_eq!(watched[0].runtime, 148);
    assert_eq!(watched[0].user_rating, 9);
    assert_eq!(watched[0].user_rating_decisions, 2);
    assert_eq!(app.selected_id(), None);
}

#[tokio::test]
async fn test_watched_title_shows_stored_rating() {
    let api = Arc::new(ScriptedApi::new());
    let mut app = create_app(&api);
    app.add_entry(create_entry("tt1375666", 8.8, 6, 148)).unwrap();

    open_inception(&app, &api).await;

    match app.detail_view() {
        DetailView::Ready { rating, .. } => assert_eq!(rating, RatingView::Rated(6)),
        other => panic!("unexpected detail view: {:?}", other),
    }

    // Adding again is a no-op and still closes the view
    app.set_user_rating(10).unwrap();
    assert!(!app.add_selected_to_watched().await.unwrap());
    assert_eq!(app.watched().len(), 1);
    assert_eq!(app.watched()[0].user_rating, 6);
    assert_eq!(app.selected_id(), None);
}

#[tokio::test]
async fn test_rating_bounds() {
    let api = Arc::new(ScriptedApi::new());
    let mut app = create_app(&api);

    assert!(app.set_user_rating(5).is_err());

    app.select_movie("tt1375666");
    assert!(app.set_user_rating(0).is_err());
    assert!(app.set_user_rating(11).is_err());
    assert!(app.set_user_rating(10).is_ok());
    assert_eq!(app.user_rating(), 10);
}

#[tokio::test]
async fn test_add_and_delete_write_through() {
    let api = Arc::new(ScriptedApi::new());
    let mut app = create_app(&api);

    assert!(app.add_entry(create_entry("tt001", 8.0, 9, 120)).unwrap());
    assert!(app.add_entry(create_entry("tt002", 6.0, 7, 90)).unwrap());
    assert!(app.add_entry(create_entry("tt003", 5.0, 5, 100)).unwrap());
    assert!(!app.add_entry(create_entry("tt001", 1.0, 1, 1)).unwrap());

    assert!(app.delete_watched("tt002").unwrap());
    assert!(!app.delete_watched("tt002").unwrap());

    let ids: Vec<&str> = app.watched().iter().map(|e| e.imdb_id.as_str()).collect();
    assert_eq!(ids, vec!["tt001", "tt003"]);
    assert_eq!(app.watched.store().write_count(), 4);

    let stored: Vec<WatchedEntry> =
        serde_json::from_str(&app.watched.store().read("watched").unwrap().unwrap()).unwrap();
    assert_eq!(stored, app.watched().to_vec());
}

#[tokio::test]
async fn test_summary() {
    let api = Arc::new(ScriptedApi::new());
    let mut app = create_app(&api);
    assert!(app.summary().avg_runtime.is_nan());

    app.add_entry(create_entry("tt001", 8.0, 9, 120)).unwrap();
    app.add_entry(create_entry("tt002", 6.0, 7, 90)).unwrap();

    let summary = app.summary();
    assert_eq!(summary.count, 2);
    assert_eq!(format!("{:.2}", summary.avg_imdb_rating), "7.00");
    assert_eq!(format!("{:.2}", summary.avg_user_rating), "8.00");
    assert_eq!(summary.avg_runtime, 105.0);
}

#[tokio::test]
async fn test_keys_close_detail_and_clear_query() {
    let api = Arc::new(ScriptedApi::new());
    let mut app = create_app(&api);
    let events = KeyboardEvents::new();
    app.bind_keys(&events);
    app.bind_keys(&events);
    assert_eq!(events.listener_count(), 2);

    app.select_movie("tt1375666");
    events.emit(&KeyEvent::new("escape"));
    assert_eq!(app.selected_id(), None);

    app.set_query("ab");
    events.emit(&KeyEvent::new("Enter"));
    assert_eq!(app.query(), "");

    app.unbind_keys();
    assert_eq!(events.listener_count(), 0);
}

#[tokio::test]
async fn test_detail_loading_then_failed() {
    let api = Arc::new(ScriptedApi::new());
    let app = create_app(&api);

    app.select_movie("tt0");
    assert_eq!(app.detail_view(), DetailView::Loading);

    api.wait_for_call("i:tt0").await;
    let not_found = popcorn_sources::FetchError::NotFound("Incorrect IMDb ID.".to_string());
    api.reply_details("tt0", Err(not_found));
    tokio::time::timeout(Duration::from_secs(5), app.wait_detail()).await.unwrap();

    assert_eq!(app.detail_view(), DetailView::Failed("Incorrect IMDb ID.".to_string()));
}

#[tokio::test]
async fn test_panels_toggle() {
    let api = Arc::new(ScriptedApi::new());
    let mut app = create_app(&api);

    assert_eq!(app.panels(), Panels::default());
    assert!(!app.toggle_results_panel());
    assert!(!app.toggle_watched_panel());
    assert!(app.toggle_results_panel());
    assert_eq!(app.panels(), Panels { results_open: true, watched_open: false });
}
