use std::error::Error;
use std::path::PathBuf;

use chrono::Utc;
use clap::Parser;

use cyboair_embodied_carbon::{
    project_id, run_model, uploader, ElementTrace, KeywordClassifier, MaterialBucket, ModelAccess,
    ModelSnapshot, RecordOutcome, RunConfig,
};

/// Classify a building model export and write its embodied-carbon payload.
#[derive(Debug, Parser)]
#[command(name = "cyboair-embodied-carbon", version)]
struct Cli {
    /// Model snapshot exported as JSON.
    model: PathBuf,
    /// TOML run configuration.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Payload path; overrides the config.
    #[arg(long)]
    output: Option<PathBuf>,
    /// Project title; overrides the config and the model title.
    #[arg(long)]
    title: Option<String>,
    /// Write the payload but do not start the uploader.
    #[arg(long)]
    no_upload: bool,
    /// Only print the bucket summary.
    #[arg(long, short)]
    quiet: bool,
}

fn print_trace(t: &ElementTrace) {
    let materials: Vec<String> = t
        .examined
        .iter()
        .map(|m| format!("{}={}", m.name, m.bucket.name()))
        .collect();
    let chosen = match t.outcome {
        RecordOutcome::Recorded { bucket, .. } => bucket.name(),
        RecordOutcome::Unclassified => "unclassified",
        RecordOutcome::Skipped => "skipped",
    };
    println!(
        "{},{},{:.3},{},{}",
        t.element.id,
        t.element.name,
        t.element.volume_m3,
        chosen,
        materials.join(";")
    );
    if !t.missing_materials.is_empty() {
        eprintln!(
            "warning: element {} references unknown materials {:?}",
            t.element.id, t.missing_materials
        );
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let mut cfg = match &cli.config {
        Some(path) => RunConfig::load(path)?,
        None => RunConfig::default(),
    };
    if let Some(out) = cli.output {
        cfg.output_path = out;
    }
    if cli.no_upload {
        cfg.uploader = None;
    }

    let model = ModelSnapshot::from_path(&cli.model)?;
    let timestamp = Utc::now().timestamp();
    let title = cli
        .title
        .as_deref()
        .or(cfg.project_title.as_deref())
        .or(model.title());
    let pid = project_id(title, timestamp);
    println!("project_id,{pid}");

    let outcome = run_model(&model, &KeywordClassifier, &cfg.target_categories);

    for s in &outcome.skipped {
        eprintln!("warning: skipped element '{}': {}", s.name, s.reason);
    }
    if !cli.quiet {
        println!("element_id,name,volume_m3,bucket,materials");
        for t in outcome.traces.iter().filter(|t| t.outcome != RecordOutcome::Skipped) {
            print_trace(t);
        }
    }

    let payload = outcome.payload(&cfg.factors, pid, timestamp);

    println!("bucket,element_count,volume_m3,mass_kg,a1a3_t,a4_t,a5_t,total_t");
    for bucket in MaterialBucket::TRACKED {
        if let Some(r) = payload.result(bucket) {
            println!(
                "{},{},{:.2},{:.0},{:.3},{:.3},{:.3},{:.3}",
                bucket.name(),
                r.element_count,
                r.volume_m3,
                r.mass_kg,
                r.a1a3,
                r.a4,
                r.a5,
                r.total
            );
        }
    }
    println!("grand_total_t,{:.3}", payload.grand_total);
    if !payload.unclassified_elements.is_empty() {
        println!("unclassified,{}", payload.unclassified_elements.len());
    }

    payload.write_to(&cfg.output_path)?;
    println!("payload,{}", cfg.output_path.display());

    if let Some(up) = &cfg.uploader {
        // The payload is already on disk; a failed launch does not fail the run.
        match uploader::launch(up, &cfg.output_path) {
            Ok(child) => println!("uploader,{},pid={}", up.program, child.id()),
            Err(e) => eprintln!("warning: {e}"),
        }
    }

    Ok(())
}
