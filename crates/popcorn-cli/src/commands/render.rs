//! Table and summary rendering shared by the one-shot commands and browse mode.

use comfy_table::{Attribute, Cell, Color, Table};
use popcorn_core::MAX_RATING;
use popcorn_models::{MovieDetail, SearchResultItem, WatchedEntry, WatchedSummary};

fn styled_table() -> Table {
    let mut table = Table::new();
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
    table
}

fn header(title: &str) -> Cell {
    Cell::new(title).fg(Color::Cyan).add_attribute(Attribute::Bold)
}

/// Average with `decimals` places, or `-` when there is nothing to average
pub fn format_average(value: f64, decimals: usize) -> String {
    if value.is_nan() {
        return "-".to_string();
    }
    format!("{:.*}", decimals, value)
}

pub fn found_line(count: usize) -> String {
    format!("Found {} results", count)
}

pub fn summary_line(summary: &WatchedSummary) -> String {
    format!(
        "{} movies | IMDb {} | Yours {} | {} min",
        summary.count,
        format_average(summary.avg_imdb_rating, 2),
        format_average(summary.avg_user_rating, 2),
        format_average(summary.avg_runtime, 0),
    )
}

pub fn stars(rating: u8) -> String {
    let filled = rating.min(MAX_RATING) as usize;
    format!("{}{}", "★".repeat(filled), "☆".repeat(MAX_RATING as usize - filled))
}

/// Numbered result rows; watched titles are marked
pub fn results_table(items: &[SearchResultItem], watched: &[WatchedEntry]) -> Table {
    let mut table = styled_table();
    table.set_header(vec![
        header("#"),
        header("Title"),
        header("Year"),
        header("IMDb id"),
        header("Watched"),
    ]);

    for (index, item) in items.iter().enumerate() {
        let seen = watched.iter().any(|entry| entry.imdb_id == item.imdb_id);
        table.add_row(vec![
            Cell::new(index + 1),
            Cell::new(&item.title),
            Cell::new(&item.year),
            Cell::new(&item.imdb_id),
            Cell::new(if seen { "✓" } else { "" }).fg(Color::Green),
        ]);
    }
    table
}

pub fn detail_table(detail: &MovieDetail) -> Table {
    let mut table = styled_table();
    table.set_header(vec![
        header(&format!("{} ({})", detail.title, detail.year)),
        Cell::new(&detail.imdb_id),
    ]);

    let rows = [
        ("Released", &detail.released),
        ("Runtime", &detail.runtime),
        ("Genre", &detail.genre),
        ("IMDb rating", &detail.imdb_rating),
        ("Director", &detail.director),
        ("Starring", &detail.actors),
        ("Plot", &detail.plot),
    ];
    for (label, value) in rows {
        table.add_row(vec![Cell::new(label).add_attribute(Attribute::Bold), Cell::new(value)]);
    }
    table
}

pub fn watched_table(entries: &[WatchedEntry]) -> Table {
    let mut table = styled_table();
    table.set_header(vec![
        header("IMDb id"),
        header("Title"),
        header("Year"),
        header("IMDb"),
        header("Yours"),
        header("Runtime"),
    ]);

    for entry in entries {
        table.add_row(vec![
            Cell::new(&entry.imdb_id),
            Cell::new(&entry.title),
            Cell::new(&entry.year),
            Cell::new(format!("{:.1}", entry.imdb_rating)),
            Cell::new(entry.user_rating),
            Cell::new(format!("{} min", entry.runtime)),
        ]);
    }
    table
}
