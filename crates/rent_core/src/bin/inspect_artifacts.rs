use anyhow::{Context, Result};
use rentwise_core::{CategoricalField, PredictionPipeline};
use std::env;
use std::path::PathBuf;

fn main() -> Result<()> {
    let mut args = env::args().skip(1);
    let model_path = args
        .next()
        .map(PathBuf::from)
        .context("Usage: inspect_artifacts <model_path> <encoders_path>")?;
    let encoders_path = args
        .next()
        .map(PathBuf::from)
        .context("Usage: inspect_artifacts <model_path> <encoders_path>")?;

    let pipeline = PredictionPipeline::load(&model_path, &encoders_path)
        .context("artifacts failed to load")?;

    println!("model fingerprint: {}", pipeline.model().fingerprint());
    println!("model features:    {}", pipeline.model().feature_count());
    for field in CategoricalField::ALL {
        let vocabulary = pipeline.vocabulary_for(field);
        println!("{:<17} {} -> {}", field.key(), vocabulary.len(), vocabulary.join(", "));
    }
    Ok(())
}
