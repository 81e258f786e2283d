use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::{error, info, LevelFilter};

use wlasl_lib::api::{EvaluationHarness, HarnessConfig};
use wlasl_lib::core::video::Extraction;
use wlasl_lib::DatasetError;

#[derive(Parser, Debug)]
#[command(author, version, about = "Inspect a WLASL label manifest and decode a few items", long_about = None)]
struct Args {
    /// Harness config (JSON5)
    #[arg(short, long)]
    config: PathBuf,

    /// Number of items to decode
    #[arg(short, long, default_value_t = 5)]
    items: usize,

    /// Per-item debug logging
    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

fn run(args: &Args) -> Result<(), DatasetError> {
    let config = HarnessConfig::from_file(&args.config)?;
    let harness = EvaluationHarness::create(config)?;
    let dataset = harness.dataset();
    let labels = dataset.labels();

    println!("Glosses:   {}", labels.num_classes());
    println!("Instances: {}", dataset.len());
    if let Some(checkpoint) = harness.checkpoint() {
        println!(
            "Checkpoint: {:?} ({:?} classes, {:?} iterations)",
            checkpoint.path, checkpoint.num_classes, checkpoint.iterations
        );
    }

    for index in 0..args.items.min(dataset.len()) {
        let record = dataset.record(index)?;
        let word = dataset.gloss_word(record.gloss_index)?;

        match dataset.item_at(index) {
            Ok(item) => {
                let frames = item.extraction.frames();
                let size = frames
                    .uniform_size()
                    .map(|(w, h)| format!("{}x{}", w, h))
                    .unwrap_or_else(|| "-".to_string());
                let status = match &item.extraction {
                    Extraction::Complete(_) => "complete".to_string(),
                    Extraction::PartialDecode { reason, .. } => format!("partial: {}", reason),
                };
                println!(
                    "#{:<5} {:<8} {:<16} start {:<4} {:>4} frames {:<9} {}",
                    index,
                    item.video_id,
                    word,
                    record.frame_start,
                    frames.len(),
                    size,
                    status
                );
            }
            Err(e) => println!("#{:<5} {:<8} {:<16} error: {}", index, record.video_id, word, e),
        }
    }

    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    wlasl_lib::init_logging_with(if args.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    });
    info!("🔍 inspect_dataset: {:?}", args.config);

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("❌ {}", e);
            ExitCode::FAILURE
        }
    }
}
