use super::prompts;
use super::Session;
use crate::output::Output;
use crate::ConfigCommands;
use color_eyre::eyre::eyre;
use color_eyre::Result;
use comfy_table::{Attribute, Cell, Color, Table};
use popcorn_config::{Config, PathManager};
use serde_json::json;

const PLACEHOLDER_API_KEY: &str = "YOUR_API_KEY";

pub fn run_config(cmd: ConfigCommands, output: &Output) -> Result<()> {
    match cmd {
        ConfigCommands::Show { full } => show_config(full, output),
        ConfigCommands::Omdb { api_key } => configure_omdb(api_key, output),
    }
}

fn show_config(full: bool, output: &Output) -> Result<()> {
    let session = Session::load()?;
    let config = &session.config;
    let config_file = session.paths.config_file();
    let key_display = if full {
        config.omdb.api_key.clone()
    } else {
        mask_string(&config.omdb.api_key)
    };
    let timeout_display = config
        .omdb
        .request_timeout_secs
        .map(|secs| format!("{} seconds", secs))
        .unwrap_or_else(|| "none".to_string());

    output.json(&json!({
        "config_file": config_file.display().to_string(),
        "config_file_exists": config_file.exists(),
        "store_file": session.paths.store_file().display().to_string(),
        "omdb": {
            "api_key": key_display,
            "base_url": config.omdb.base_url,
            "request_timeout_secs": config.omdb.request_timeout_secs,
        },
        "search": { "min_query_length": config.search.min_query_length },
        "storage": { "watched_key": config.storage.watched_key },
    }));

    if !output.is_human() {
        return Ok(());
    }

    if !config_file.exists() {
        output.warn(format!("Configuration file not found at: {}", config_file.display()));
        output.info("Defaults are in use. Run 'popcorn config omdb' to store an API key.");
    }

    let mut table = Table::new();
    table.set_header(vec![
        Cell::new("Configuration").fg(Color::Cyan).add_attribute(Attribute::Bold),
        Cell::new(config_file.display().to_string()),
    ]);
    table.add_row(vec![Cell::new("OMDb API key"), Cell::new(key_display)]);
    table.add_row(vec![Cell::new("OMDb base URL"), Cell::new(&config.omdb.base_url)]);
    table.add_row(vec![Cell::new("Request timeout"), Cell::new(timeout_display)]);
    table.add_row(vec![
        Cell::new("Minimum query length"),
        Cell::new(config.search.min_query_length),
    ]);
    table.add_row(vec![
        Cell::new("Watched list"),
        Cell::new(format!(
            "{} (key '{}')",
            session.paths.store_file().display(),
            config.storage.watched_key
        )),
    ]);
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.apply_modifier(comfy_table::modifiers::UTF8_ROUND_CORNERS);
    output.println(table.to_string());

    if std::env::var("OMDB_API_KEY").is_ok() {
        output.info("OMDB_API_KEY is set and overrides the stored key.");
    }
    Ok(())
}

fn configure_omdb(api_key_arg: Option<String>, output: &Output) -> Result<()> {
    let path_manager = PathManager::default();
    path_manager
        .ensure_directories()
        .map_err(|e| eyre!("Failed to create configuration directories: {}", e))?;

    // Read the file directly so an OMDB_API_KEY override is never written back
    let config_file = path_manager.config_file();
    let mut config = if config_file.exists() {
        Config::load_from_file(&config_file)
            .map_err(|e| eyre!("Failed to load config from {}: {}", config_file.display(), e))?
    } else {
        output.info("Configuration file not found. Creating default configuration...");
        Config::default()
    };

    let api_key = match api_key_arg {
        Some(key) => key,
        None => {
            if config.is_omdb_configured()
                && !prompts::prompt_yes_no("An API key is already stored. Replace it?", Some(true))?
            {
                output.info("Keeping the existing API key.");
                return Ok(());
            }
            output.println("Get a free key at https://www.omdbapi.com/apikey.aspx");
            loop {
                let input = prompts::prompt_password("OMDb API key")?;
                match validate_api_key(&input) {
                    Ok(()) => break input,
                    Err(e) => output.error(format!("Validation error: {}", e)),
                }
            }
        }
    };
    validate_api_key(&api_key).map_err(|e| eyre!("{}", e))?;

    config.omdb.api_key = api_key.trim().to_string();
    config
        .save_to_file(&config_file)
        .map_err(|e| eyre!("Failed to save config to {}: {}", config_file.display(), e))?;

    output.success("OMDb API key saved!");
    output.println(format!("  Key: {}", mask_string(&config.omdb.api_key)));
    output.println(format!("  File: {}", config_file.display()));
    Ok(())
}

fn mask_string(s: &str) -> String {
    if s.is_empty() || s == PLACEHOLDER_API_KEY {
        return "<not set>".to_string();
    }
    let chars: Vec<char> = s.chars().collect();
    if chars.len() <= 4 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..2].iter().collect();
    let tail: String = chars[chars.len() - 2..].iter().collect();
    format!("{}***{}", head, tail)
}

/// OMDb keys are short alphanumeric strings
fn validate_api_key(input: &str) -> Result<(), &'static str> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err("API key cannot be empty");
    }
    if trimmed == PLACEHOLDER_API_KEY {
        return Err("Replace the placeholder with your own key");
    }
    if !trimmed.chars().all(|c| c.is_ascii_alphanumeric()) {
        return Err("API key must contain only letters and digits");
    }
    Ok(())
}
