//! One-shot rent estimate from the command line.

use anyhow::{Context, Result};
use clap::Parser;
use rentwise_core::{estimate_message, HistoryStore, ListingInput, PredictionPipeline};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "estimate_rent")]
#[command(about = "Estimate the monthly rent of one listing")]
#[command(version)]
struct Cli {
    /// Model artifact
    #[arg(long, default_value = "models/rent_model.json")]
    model: PathBuf,

    /// Encoder artifact
    #[arg(long, default_value = "models/label_encoders.json")]
    encoders: PathBuf,

    /// Area in square feet
    #[arg(long, default_value_t = 1000)]
    area: i64,

    #[arg(long, default_value_t = 2)]
    bedrooms: i64,

    #[arg(long, default_value_t = 2)]
    bathrooms: i64,

    #[arg(long, default_value_t = 1)]
    floor: i64,

    #[arg(long)]
    city: String,

    #[arg(long)]
    neighborhood: String,

    #[arg(long)]
    furnishing: String,

    #[arg(long)]
    area_type: String,

    #[arg(long)]
    tenant_preferred: String,

    /// Currency symbol for the output message
    #[arg(long, default_value = "₹")]
    currency: String,

    /// Print the history record as JSON instead of the message
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let pipeline = PredictionPipeline::load(&cli.model, &cli.encoders).with_context(|| {
        format!(
            "failed to load artifacts ({}, {})",
            cli.model.display(),
            cli.encoders.display()
        )
    })?;

    let listing = ListingInput {
        area: cli.area,
        bedrooms: cli.bedrooms,
        bathrooms: cli.bathrooms,
        floor: cli.floor,
        city: cli.city,
        neighborhood: cli.neighborhood,
        furnishing: cli.furnishing,
        area_type: cli.area_type,
        tenant_preferred: cli.tenant_preferred,
    };

    let mut history = HistoryStore::new();
    let rent = pipeline
        .predict(listing, &mut history)
        .context("prediction failed")?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(history.all())?);
    } else {
        println!("{}", estimate_message(rent, &cli.currency));
    }
    Ok(())
}
