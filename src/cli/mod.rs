pub mod onboard;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "planify", about = "Local-first weekend planner")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    Onboard,
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    Status,
    Show,
    Range { start: String, end: String },
    Prev,
    Next,
    Ranges {
        #[arg(long)]
        date: Option<String>,
    },
    Catalog {
        #[command(subcommand)]
        command: CatalogCommands,
    },
    Add { catalog_id: String, date: String },
    Edit {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        duration: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long)]
        location: Option<String>,
    },
    Delete { id: String },
    Move { id: String, target: String },
    Holidays {
        #[arg(long)]
        country: Option<String>,
        #[arg(long, default_value_t = false)]
        year: bool,
    },
    Nearby {
        #[arg(long)]
        lat: f64,
        #[arg(long)]
        lng: f64,
        #[arg(long = "type", default_value = "all")]
        place_type: String,
        #[arg(long)]
        pick: Option<usize>,
        #[arg(long)]
        day: Option<String>,
    },
    Serve,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    Set { key: String, value: String },
    Get { key: String },
}

#[derive(Debug, Subcommand)]
pub enum CatalogCommands {
    List,
    Add {
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: String,
        #[arg(long, default_value = "")]
        duration: String,
        #[arg(long, default_value = "Outdoors")]
        category: String,
        #[arg(long, default_value = "")]
        location: String,
    },
    Delete { id: String },
}
