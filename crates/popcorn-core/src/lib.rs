pub mod app;
pub mod detail;
pub mod fetch;
pub mod keys;
pub mod persisted;
pub mod search;
pub mod watched;

#[cfg(test)]
mod testing;

pub use app::{App, DetailView, Panels, RatingView, MAX_RATING};
pub use detail::{DetailFetcher, DetailState};
pub use fetch::{CycleCallback, FetchCycle, FetchState, ReactiveFetch};
pub use keys::{KeyEvent, KeyListener, KeyboardEvents};
pub use persisted::PersistedValue;
pub use search::{SearchFetcher, SearchState};
