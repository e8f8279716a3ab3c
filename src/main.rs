mod api;
mod cli;
mod config;
mod lookup;
mod planner;
mod session;
mod storage;

use crate::cli::onboard::run_onboarding;
use crate::cli::{CatalogCommands, Cli, Commands, ConfigCommands};
use crate::config::{Config, is_secret_key};
use crate::lookup::{holidays, places};
use crate::planner::ranges::parse_bound;
use crate::planner::{ActivityDraft, Category, DateRange, DayKey, PlannerState};
use crate::session::PlannerSession;
use crate::storage::SqliteStore;
use anyhow::{Context, Result, bail};
use chrono::{Duration, Local, NaiveDate};
use clap::Parser;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::signal;
use tokio::sync::Mutex;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .with_target(false)
        .compact()
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Onboard => {
            let _ = run_onboarding()?;
            Ok(())
        }
        Commands::Config { command } => handle_config_command(command),
        Commands::Status => handle_status(),
        Commands::Show => handle_show(),
        Commands::Range { start, end } => handle_range(&start, &end),
        Commands::Prev => handle_navigate(PlannerState::previous),
        Commands::Next => handle_navigate(PlannerState::next),
        Commands::Ranges { date } => handle_ranges(date),
        Commands::Catalog { command } => handle_catalog_command(command),
        Commands::Add { catalog_id, date } => handle_add(&catalog_id, &date),
        Commands::Edit {
            id,
            title,
            description,
            duration,
            category,
            location,
        } => handle_edit(
            &id,
            ActivityEdit {
                title,
                description,
                duration,
                category,
                location,
            },
        ),
        Commands::Delete { id } => handle_delete(&id),
        Commands::Move { id, target } => handle_move(&id, &target),
        Commands::Holidays { country, year } => handle_holidays(country, year),
        Commands::Nearby {
            lat,
            lng,
            place_type,
            pick,
            day,
        } => handle_nearby(lat, lng, &place_type, pick, day),
        Commands::Serve => {
            let config = load_or_default_config()?;
            run_server(config).await
        }
    }
}

fn handle_config_command(command: ConfigCommands) -> Result<()> {
    match command {
        ConfigCommands::Set { key, value } => {
            let mut config = load_or_default_config()?;
            config.set_value(&key, &value)?;
            config.ensure_bootstrap_files()?;
            config.save()?;

            let masked = if is_secret_key(&key) {
                "***hidden***".to_string()
            } else {
                value
            };
            println!("Config saved: {key} = {masked}");
            Ok(())
        }
        ConfigCommands::Get { key } => {
            let config = load_config()?;
            let value = config
                .get_value(&key)
                .with_context(|| format!("Unsupported config key: {key}"))?;

            println!("{value}");
            Ok(())
        }
    }
}

fn handle_status() -> Result<()> {
    let config = load_or_default_config()?;
    let session = open_session(&config)?;
    let state = session.state();

    println!("planify status");
    println!("- config: {}", Config::config_path()?.display());
    println!("- db_path: {}", config.db_path.display());
    println!("- country_code: {}", config.country_code);
    println!(
        "- weekend_key: {}",
        state
            .current_weekend_key()
            .map(|key| key.to_string())
            .unwrap_or_else(|| "none".to_string())
    );
    println!("- saved_ranges: {}", state.ranges().legend().len());
    println!("- planned_days: {}", state.plan().planned_days());
    println!("- catalog_size: {}", state.catalog().activities().len());
    println!(
        "- places_lookup: {}",
        if lookup::places_api_key(&config).is_some() {
            "configured"
        } else {
            "disabled"
        }
    );
    println!(
        "- holiday_lookup: {}",
        if lookup::holiday_api_key(&config).is_some() {
            "configured"
        } else {
            "disabled"
        }
    );

    session
        .store()
        .entries()?
        .iter()
        .for_each(|entry| println!("- stored {} (updated_at {})", entry.key, entry.updated_at));

    Ok(())
}

fn handle_show() -> Result<()> {
    let config = load_or_default_config()?;
    let session = open_session(&config)?;
    print_plan(&config, session.state());
    Ok(())
}

fn handle_range(start: &str, end: &str) -> Result<()> {
    let range = DateRange::new(parse_bound(start)?, parse_bound(end)?)?;
    let config = load_or_default_config()?;
    let mut session = open_session(&config)?;

    let state = session.apply(|state| state.select_range(range));
    print_plan(&config, state);
    Ok(())
}

fn handle_navigate(step: fn(&PlannerState) -> PlannerState) -> Result<()> {
    let config = load_or_default_config()?;
    let mut session = open_session(&config)?;

    let state = session.apply(step);
    print_plan(&config, state);
    Ok(())
}

fn handle_ranges(date: Option<String>) -> Result<()> {
    let day = date.as_deref().map(parse_date).transpose()?;
    let config = load_or_default_config()?;
    let session = open_session(&config)?;
    let registry = session.state().ranges();
    let legend = registry.legend();

    if let Some(day) = day {
        let verdict = if registry.contains_date(day) {
            "inside"
        } else {
            "outside"
        };
        println!("{} is {verdict} the saved ranges", day.format("%Y-%m-%d"));
    }

    if registry.is_empty() {
        println!("No saved ranges");
        return Ok(());
    }

    println!("Saved ranges");
    legend.iter().for_each(|(range, keys)| {
        let keys = keys.iter().map(|key| key.to_string()).collect::<Vec<_>>();
        println!(
            "- {} .. {} ({} days) under {}",
            range.start().format("%Y-%m-%d"),
            range.end().format("%Y-%m-%d"),
            range.days(),
            keys.join(", ")
        );
    });

    Ok(())
}

fn handle_catalog_command(command: CatalogCommands) -> Result<()> {
    let config = load_or_default_config()?;
    let mut session = open_session(&config)?;

    match command {
        CatalogCommands::List => {}
        CatalogCommands::Add {
            title,
            description,
            duration,
            category,
            location,
        } => {
            let draft = ActivityDraft {
                title,
                description,
                duration,
                category: Category::parse(&category),
                location,
            };
            session.try_apply(|state| state.add_to_catalog(draft))?;
        }
        CatalogCommands::Delete { id } => {
            if session.state().catalog().get(&id).is_none() {
                bail!("No catalog activity with id: {id}");
            }
            session.apply(|state| state.delete_from_catalog(&id));
        }
    }

    let categories = Category::ALL
        .iter()
        .map(Category::as_str)
        .collect::<Vec<_>>();
    println!("Catalog ({})", categories.join(", "));
    session.state().catalog().activities().iter().for_each(|activity| {
        println!(
            "- {} | {} [{}] {} @ {}",
            activity.id, activity.title, activity.category, activity.duration, activity.location
        );
    });

    Ok(())
}

fn handle_add(catalog_id: &str, date: &str) -> Result<()> {
    let column_id = DayKey::from_date(parse_date(date)?);
    let config = load_or_default_config()?;
    let mut session = open_session(&config)?;

    let state = session.try_apply(|state| state.add_from_catalog(catalog_id, column_id))?;
    print_plan(&config, state);
    Ok(())
}

struct ActivityEdit {
    title: Option<String>,
    description: Option<String>,
    duration: Option<String>,
    category: Option<String>,
    location: Option<String>,
}

fn handle_edit(id: &str, edit: ActivityEdit) -> Result<()> {
    let config = load_or_default_config()?;
    let mut session = open_session(&config)?;

    let current = session
        .state()
        .find_activity(id)
        .with_context(|| format!("No activity with id: {id}"))?;
    let base = ActivityDraft::from_activity(current);
    let replacement = ActivityDraft {
        title: edit.title.unwrap_or(base.title),
        description: edit.description.unwrap_or(base.description),
        duration: edit.duration.unwrap_or(base.duration),
        category: edit
            .category
            .as_deref()
            .map(Category::parse)
            .unwrap_or(base.category),
        location: edit.location.unwrap_or(base.location),
    }
    .replacing(id)?;

    let state = session.apply(|state| state.edit_activity(id, &replacement));
    print_plan(&config, state);
    Ok(())
}

fn handle_delete(id: &str) -> Result<()> {
    let config = load_or_default_config()?;
    let mut session = open_session(&config)?;

    if session.state().plan().find_activity(id).is_none() {
        bail!("No planned activity with id: {id}");
    }

    let state = session.apply(|state| state.delete_activity(id));
    print_plan(&config, state);
    Ok(())
}

fn handle_move(id: &str, target: &str) -> Result<()> {
    let config = load_or_default_config()?;
    let mut session = open_session(&config)?;

    if !session
        .state()
        .columns()
        .iter()
        .any(|column| column.contains(id))
    {
        bail!("Activity {id} is not on the selected weekend");
    }

    let over_id = NaiveDate::parse_from_str(target, "%Y-%m-%d")
        .map(|date| DayKey::from_date(date).to_string())
        .unwrap_or_else(|_| target.to_string());

    let state = session.apply(|state| {
        state
            .drag_start(id)
            .drag_over(Some(over_id.as_str()))
            .drag_end(Some(over_id.as_str()))
    });
    print_plan(&config, state);
    Ok(())
}

fn handle_holidays(country: Option<String>, year: bool) -> Result<()> {
    let config = load_or_default_config()?;
    let country = match country {
        Some(code) => config::parse_country_code(&code)?,
        None => config.country_code.clone(),
    };

    if year {
        let (time_min, time_max) = holidays::default_window(Local::now().date_naive());
        let events = holidays::fetch_holidays(&config, &country, time_min, time_max)?;

        println!("Holidays for {country} ({} .. {})", time_min, time_max);
        events
            .iter()
            .for_each(|event| println!("- {} {}", event.date.format("%Y-%m-%d"), event.name));
        return Ok(());
    }

    let session = open_session(&config)?;
    let range = session
        .state()
        .selection()
        .context("No weekend is selected")?;
    let events =
        holidays::fetch_holidays(&config, &country, range.start(), range.end() + Duration::days(1))?;
    let annotated = holidays::annotate(&events, &range);

    if annotated.is_empty() {
        println!(
            "No {country} holidays between {} and {}",
            range.start(),
            range.end()
        );
        return Ok(());
    }

    annotated
        .iter()
        .for_each(|(date, names)| println!("- {} {}", date.format("%a %b %-d"), names.join(", ")));
    Ok(())
}

fn handle_nearby(
    lat: f64,
    lng: f64,
    place_type: &str,
    pick: Option<usize>,
    day: Option<String>,
) -> Result<()> {
    let config = load_or_default_config()?;
    let candidates = places::search_nearby(&config, lat, lng, place_type)?;

    if candidates.is_empty() {
        println!("No places found");
        return Ok(());
    }

    candidates.iter().enumerate().for_each(|(index, place)| {
        let distance = place
            .distance_meters
            .map(|meters| format!(" ({:.1} km)", meters / 1000.0))
            .unwrap_or_default();
        println!(
            "{:>2}. {} - {}{} [{}]",
            index + 1,
            place.primary_name,
            place.secondary_name,
            distance,
            places::category_for_types(&place.types)
        );
    });

    let Some(pick) = pick else {
        return Ok(());
    };
    let candidate = pick
        .checked_sub(1)
        .and_then(|index| candidates.get(index))
        .with_context(|| format!("Pick must be between 1 and {}", candidates.len()))?;
    let column_id = day
        .as_deref()
        .map(parse_date)
        .transpose()?
        .map(DayKey::from_date);

    let mut session = open_session(&config)?;
    let state = session.apply(|state| state.add_place(candidate, column_id));
    print_plan(&config, state);
    Ok(())
}

async fn run_server(config: Config) -> Result<()> {
    config.ensure_bootstrap_files()?;
    let session = Arc::new(Mutex::new(open_session(&config)?));
    let shared_config = Arc::new(config);

    info!("planify service started");

    tokio::select! {
        api_result = api::run_server(shared_config, session) => {
            api_result?;
        }
        _ = signal::ctrl_c() => {
            info!("shutdown signal received");
        }
    }

    Ok(())
}

fn open_session(config: &Config) -> Result<PlannerSession<SqliteStore>> {
    let store = SqliteStore::open(&config.db_path)?;
    Ok(PlannerSession::open(store, Local::now().date_naive()))
}

fn print_plan(config: &Config, state: &PlannerState) {
    let Some(range) = state.selection() else {
        println!("No weekend selected");
        return;
    };

    let holidays = holiday_annotations(config, &range);

    println!(
        "Weekend {} ({} .. {})",
        state
            .current_weekend_key()
            .map(|key| key.to_string())
            .unwrap_or_default(),
        range.start().format("%Y-%m-%d"),
        range.end().format("%Y-%m-%d")
    );

    state.columns().iter().for_each(|column| {
        let title = column.title.replace('\n', ", ");
        match holidays.get(&column.id.date()) {
            Some(names) => println!("\n{title} [{}] ({})", column.id, names.join(", ")),
            None => println!("\n{title} [{}]", column.id),
        }

        if column.activities.is_empty() {
            println!("  (nothing planned)");
        }
        column.activities.iter().for_each(|activity| {
            println!(
                "  - {} | {} [{}] {}",
                activity.id, activity.title, activity.category, activity.duration
            );
        });
    });
}

fn holiday_annotations(config: &Config, range: &DateRange) -> BTreeMap<NaiveDate, Vec<String>> {
    if lookup::holiday_api_key(config).is_none() {
        return BTreeMap::new();
    }

    holidays::fetch_holidays(
        config,
        &config.country_code,
        range.start(),
        range.end() + Duration::days(1),
    )
    .map(|events| holidays::annotate(&events, range))
    .unwrap_or_else(|error| {
        warn!(error = %error, "holiday lookup failed. showing plan without annotations");
        BTreeMap::new()
    })
}

fn parse_date(input: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .with_context(|| format!("Invalid date format: {input}. Example: 2026-02-18"))
}

fn load_or_default_config() -> Result<Config> {
    Config::load().or_else(|_| {
        let config = Config::default();
        config.ensure_bootstrap_files()?;
        config.save()?;
        Ok(config)
    })
}

fn load_config() -> Result<Config> {
    Config::load().with_context(|| "Config file not found. Run `planify onboard` first.".to_string())
}
