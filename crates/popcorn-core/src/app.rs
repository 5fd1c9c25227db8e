//! Application state: the query, the selected title, and the watched list.
//!
//! `query` and `selected_id` are the only cross-cutting state. Each lives on
//! a watch channel; the search fetcher follows `query` and the detail fetcher
//! follows `selected_id`. The watched list is owned here and only changes
//! through the add/delete methods.

use crate::detail::{DetailFetcher, DetailState};
use crate::fetch::CycleCallback;
use crate::keys::{KeyListener, KeyboardEvents};
use crate::persisted::PersistedValue;
use crate::search::{SearchFetcher, SearchState};
use crate::watched;
use anyhow::{anyhow, bail, Result};
use popcorn_config::{Config, KeyValueStore};
use popcorn_models::{MovieDetail, WatchedEntry, WatchedSummary};
use popcorn_sources::MovieApi;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info};

pub const MAX_RATING: u8 = 10;

/// Open/closed state of the two collapsible panels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Panels {
    pub results_open: bool,
    pub watched_open: bool,
}

impl Default for Panels {
    fn default() -> Self {
        Self {
            results_open: true,
            watched_open: true,
        }
    }
}

/// What the rating area of the detail panel shows
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RatingView {
    /// Already in the watched list with this rating
    Rated(u8),
    /// Rating input; adding becomes possible once a rating is set
    Input { rating: u8, can_add: bool },
}

#[derive(Debug, Clone, PartialEq)]
pub enum DetailView {
    Closed,
    Loading,
    Failed(String),
    Ready { detail: MovieDetail, rating: RatingView },
}

/// Star rating being entered for one title
#[derive(Debug, Default)]
struct RatingInput {
    imdb_id: Option<String>,
    value: u8,
    decisions: u32,
}

impl RatingInput {
    fn for_title(&self, imdb_id: &str) -> (u8, u32) {
        if self.imdb_id.as_deref() == Some(imdb_id) {
            (self.value, self.decisions)
        } else {
            (0, 0)
        }
    }
}

fn close_selection(selected_tx: &watch::Sender<Option<String>>) {
    selected_tx.send_if_modified(|selected| selected.take().is_some());
}

pub struct App<S: KeyValueStore> {
    query_tx: Arc<watch::Sender<String>>,
    selected_tx: Arc<watch::Sender<Option<String>>>,
    search: SearchFetcher,
    detail: DetailFetcher,
    watched: PersistedValue<Vec<WatchedEntry>, S>,
    panels: Panels,
    rating: RatingInput,
    key_listeners: Vec<KeyListener>,
}

impl<S: KeyValueStore> App<S> {
    /// Must be called inside a Tokio runtime; both fetchers start immediately.
    pub fn new(api: Arc<dyn MovieApi>, store: S, config: &Config) -> Self {
        let (query_tx, query_rx) = watch::channel(String::new());
        let (selected_tx, selected_rx) = watch::channel(None);
        let query_tx = Arc::new(query_tx);
        let selected_tx = Arc::new(selected_tx);

        // A new search cycle closes whatever detail view is open
        let selected_for_search = Arc::clone(&selected_tx);
        let on_search: CycleCallback = Arc::new(move || close_selection(&selected_for_search));

        let search = SearchFetcher::spawn(
            Arc::clone(&api),
            query_rx,
            config.search.min_query_length,
            Some(on_search),
        );
        let detail = DetailFetcher::spawn(api, selected_rx);
        let watched = PersistedValue::load(store, &config.storage.watched_key, Vec::new());
        debug!("Loaded {} watched entries", watched.get().len());

        Self {
            query_tx,
            selected_tx,
            search,
            detail,
            watched,
            panels: Panels::default(),
            rating: RatingInput::default(),
            key_listeners: Vec::new(),
        }
    }

    /// `Escape` closes the detail view, `Enter` clears the query
    pub fn bind_keys(&mut self, events: &KeyboardEvents) {
        self.key_listeners.clear();

        let selected_tx = Arc::clone(&self.selected_tx);
        self.key_listeners.push(KeyListener::attach(events, "Escape", move || {
            close_selection(&selected_tx)
        }));

        let query_tx = Arc::clone(&self.query_tx);
        self.key_listeners.push(KeyListener::attach(events, "Enter", move || {
            query_tx.send_replace(String::new());
        }));
    }

    pub fn unbind_keys(&mut self) {
        self.key_listeners.clear();
    }

    pub fn set_query(&self, query: impl Into<String>) {
        self.query_tx.send_replace(query.into());
    }

    pub fn query(&self) -> String {
        self.query_tx.borrow().clone()
    }

    pub fn search_state(&self) -> SearchState {
        self.search.state()
    }

    pub async fn wait_search(&self) -> SearchState {
        self.search.wait_settled().await
    }

    pub fn result_count(&self) -> usize {
        self.search.state().items().len()
    }

    /// Select `imdb_id`, or deselect it if it is already selected
    pub fn select_movie(&self, imdb_id: &str) {
        self.selected_tx.send_modify(|selected| {
            if selected.as_deref() == Some(imdb_id) {
                *selected = None;
            } else {
                *selected = Some(imdb_id.to_string());
            }
        });
    }

    pub fn close_movie(&self) {
        close_selection(&self.selected_tx);
    }

    pub fn selected_id(&self) -> Option<String> {
        self.selected_tx.borrow().clone()
    }

    pub fn detail_state(&self) -> DetailState {
        self.detail.state()
    }

    pub async fn wait_detail(&self) -> DetailState {
        self.detail.wait_settled().await
    }

    /// Set the rating (1-10) for the selected title; every change counts as a decision
    pub fn set_user_rating(&mut self, rating: u8) -> Result<()> {
        let selected = self
            .selected_id()
            .ok_or_else(|| anyhow!("No movie selected"))?;
        if !(1..=MAX_RATING).contains(&rating) {
            bail!("Rating must be between 1 and {}", MAX_RATING);
        }

        let (_, decisions) = self.rating.for_title(&selected);
        self.rating = RatingInput {
            imdb_id: Some(selected),
            value: rating,
            decisions: decisions + 1,
        };
        Ok(())
    }

    pub fn user_rating(&self) -> u8 {
        match self.selected_id() {
            Some(id) => self.rating.for_title(&id).0,
            None => 0,
        }
    }

    pub fn detail_view(&self) -> DetailView {
        let Some(selected) = self.selected_id() else {
            return DetailView::Closed;
        };

        let state = self.detail.state();
        if state.selected_id() != Some(selected.as_str()) || state.is_loading {
            return DetailView::Loading;
        }
        if let Some(error) = state.error {
            return DetailView::Failed(error);
        }
        let Some(detail) = state.data else {
            return DetailView::Loading;
        };

        let rating = match watched::find(self.watched.get(), &selected) {
            Some(entry) => RatingView::Rated(entry.user_rating),
            None => {
                let (rating, _) = self.rating.for_title(&selected);
                RatingView::Input {
                    rating,
                    can_add: rating > 0,
                }
            }
        };
        DetailView::Ready { detail, rating }
    }

    /// Add the selected title with the entered rating, then close the detail
    /// view. Returns `false` when the title was already in the list.
    pub async fn add_selected_to_watched(&mut self) -> Result<bool> {
        let selected = self
            .selected_id()
            .ok_or_else(|| anyhow!("No movie selected"))?;

        if watched::contains(self.watched.get(), &selected) {
            self.close_movie();
            return Ok(false);
        }

        let (rating, decisions) = self.rating.for_title(&selected);
        if rating == 0 {
            bail!("Rate the movie before adding it to the list");
        }

        let state = self.detail.wait_settled().await;
        let detail = match (state.selected_id(), state.detail()) {
            (Some(id), Some(detail)) if id == selected => detail.clone(),
            _ => bail!(
                "{}",
                state.error.clone().unwrap_or_else(|| "Movie details are not available".to_string())
            ),
        };

        let entry = WatchedEntry::from_detail(&selected, &detail, rating, decisions);
        let added = self.add_entry(entry)?;
        self.close_movie();
        Ok(added)
    }

    /// Returns `false` (and writes nothing) when the id is already present
    pub fn add_entry(&mut self, entry: WatchedEntry) -> Result<bool> {
        if watched::contains(self.watched.get(), &entry.imdb_id) {
            debug!("{} is already in the watched list", entry.imdb_id);
            return Ok(false);
        }
        info!("Adding {} ({}) to watched list", entry.title, entry.imdb_id);
        self.watched.update(|list| watched::add_unique(list, entry))
    }

    pub fn delete_watched(&mut self, imdb_id: &str) -> Result<bool> {
        if !watched::contains(self.watched.get(), imdb_id) {
            return Ok(false);
        }
        info!("Removing {} from watched list", imdb_id);
        self.watched.update(|list| watched::remove_by_id(list, imdb_id))
    }

    pub fn watched(&self) -> &[WatchedEntry] {
        self.watched.get()
    }

    pub fn summary(&self) -> WatchedSummary {
        WatchedSummary::from_entries(self.watched.get())
    }

    pub fn panels(&self) -> Panels {
        self.panels
    }

    pub fn toggle_results_panel(&mut self) -> bool {
        self.panels.results_open = !self.panels.results_open;
        self.panels.results_open
    }

    pub fn toggle_watched_panel(&mut self) -> bool {
        self.panels.watched_open = !self.panels.watched_open;
        self.panels.watched_open
    }
}

#[cfg(test)]
mod tests;
