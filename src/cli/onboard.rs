use crate::config::{Config, expand_home, parse_country_code};
use crate::storage::SqliteStore;
use anyhow::{Context, Result};
use dialoguer::{Confirm, Input, Password, theme::ColorfulTheme};

pub fn run_onboarding() -> Result<Config> {
    println!("──────────────────────────────────────────");
    println!("  Welcome to planify onboarding.");
    println!("──────────────────────────────────────────");

    let theme = ColorfulTheme::default();
    let defaults = Config::default();

    println!("\n[1/4] Planner database");
    let db_path_input: String = Input::with_theme(&theme)
        .with_prompt("  Where should the planner be stored?")
        .default(defaults.db_path.display().to_string())
        .interact_text()
        .context("Failed to read database path")?;
    let db_path = expand_home(&db_path_input);
    println!("  ✓ {}", db_path.display());

    println!("\n[2/4] Holiday calendar");
    let country_input: String = Input::with_theme(&theme)
        .with_prompt("  Two-letter country code for public holidays")
        .default(defaults.country_code.clone())
        .validate_with(|input: &String| -> std::result::Result<(), &str> {
            parse_country_code(input)
                .map(|_| ())
                .map_err(|_| "Use a two-letter code (example: US)")
        })
        .interact_text()
        .context("Failed to read country code")?;
    let country_code = parse_country_code(&country_input)?;
    println!("  ✓ Holidays from the {country_code} calendar");

    println!("\n[3/4] Holiday API key");
    let holiday_api_key = prompt_secret(&theme, "Google Calendar API key")?;

    println!("\n[4/4] Places API key");
    let places_api_key = prompt_secret(&theme, "Nearby places API key")?;

    let config = Config {
        db_path,
        country_code,
        holiday_api_key,
        places_api_key,
        ..defaults
    };

    config.ensure_bootstrap_files()?;
    config.save()?;
    let _ = SqliteStore::open(&config.db_path)?;

    println!("\n──────────────────────────────────────────");
    println!("  Onboarding complete!");
    println!("  Run planify show to see the upcoming weekend.");
    println!("──────────────────────────────────────────");

    Ok(config)
}

fn prompt_secret(theme: &ColorfulTheme, label: &str) -> Result<Option<String>> {
    let wants_key = Confirm::with_theme(theme)
        .with_prompt(format!("  Configure the {label} now?"))
        .default(false)
        .interact()
        .context("Failed to read API key prompt input")?;

    if !wants_key {
        println!("  ! Skipped. Lookups stay disabled until a key is set.");
        return Ok(None);
    }

    let key = Password::with_theme(theme)
        .with_prompt(format!("  {label}"))
        .interact()
        .context("Failed to read API key")?;
    println!("  ✓ Key saved");

    Ok(Some(key).filter(|key| !key.trim().is_empty()))
}
