use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::upload::DEFAULT_CURRENCY;

#[derive(Parser, Debug)]
#[command(name = "shopbot")]
#[command(author, version, about = "Telegram storefront bot backed by the Elasticpath commerce API", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Commands {
    /// Run the bot (long polling)
    Run {
        /// Keep sessions in process memory instead of Redis (local runs only)
        #[arg(long)]
        memory_sessions: bool,
    },

    /// Create products (with main images) from a JSON file
    UploadProducts {
        /// JSON array of {name, description, price, product_image: {url}}
        file: PathBuf,

        /// Price currency code
        #[arg(long, default_value = DEFAULT_CURRENCY)]
        currency: String,
    },

    /// Create shop entries in a flow from a JSON file
    UploadShops {
        /// JSON array of {alias, address: {full}, coordinates: {lat, lon}}
        file: PathBuf,

        /// Slug of the flow to add entries to
        flow_slug: String,
    },

    /// Create the flow (and its fields) that shop entries go into
    SetupShopsFlow {
        /// Slug for the new flow
        slug: String,

        /// Human-readable flow name
        #[arg(long, default_value = "Pizzeria")]
        name: String,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
