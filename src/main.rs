use std::path::PathBuf;

use clap::{Parser, Subcommand};

use fieldmosaic::ops;
use fieldmosaic::{MarkerExtractor, RunState, Workspace};

#[derive(Parser)]
#[command(name = "fieldmosaic")]
#[command(about = "Order drone survey photos by corner markers and stitch a vertical strip mosaic")]
struct Cli {
    /// Workspace directory holding uploads/, masks/, mosaics/ and results/
    #[arg(short, long, value_name = "DIR", default_value = ".")]
    workspace: PathBuf,

    /// Print the run-state log snapshot after the command
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Copy image files into the uploads area
    Ingest {
        /// Image files (png/jpg/jpeg)
        #[arg(value_name = "FILE", required = true)]
        files: Vec<PathBuf>,
    },
    /// Detect and order the markers in all uploaded photos
    Detect {
        /// Skip OCR and rely on the filename fallback only
        #[arg(long)]
        no_ocr: bool,
    },
    /// Generate binary masks for the detected set, or all uploads
    Mask,
    /// Compose both mosaics and count flowers (requires a prior detect)
    Mosaic,
    /// Run the full pipeline: detect, masks, mosaics, flower count
    Run {
        /// Skip OCR and rely on the filename fallback only
        #[arg(long)]
        no_ocr: bool,
    },
    /// Count yellow flowers in an arbitrary image
    Flowers {
        #[arg(value_name = "IMAGE")]
        image: PathBuf,
    },
    /// Print the path of a produced artifact (mask | color | flowers)
    Artifact {
        #[arg(value_name = "KIND")]
        kind: String,
    },
    /// Print the run-state snapshot
    Status,
    /// Print the liveness payload
    Health,
}

fn build_extractor(no_ocr: bool, verbose: bool) -> MarkerExtractor {
    if no_ocr {
        return MarkerExtractor::without_ocr();
    }
    let extractor = MarkerExtractor::new();
    if verbose && !extractor.has_ocr() {
        println!("OCR models unavailable, using filename fallback only");
    }
    extractor
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();
    let ws = Workspace::open(&args.workspace)?;
    let mut state = if args.verbose {
        RunState::with_echo()
    } else {
        RunState::new()
    };

    match args.command {
        Command::Ingest { files } => {
            let mut buffers = Vec::new();
            for file in &files {
                let name = file
                    .file_name()
                    .and_then(|n| n.to_str())
                    .unwrap_or_default()
                    .to_string();
                buffers.push((name, std::fs::read(file)?));
            }
            let report = ops::ingest(&ws, &mut state, &buffers)?;
            print_json(&report)?;
        }
        Command::Detect { no_ocr } => {
            let extractor = build_extractor(no_ocr, args.verbose);
            let report = ops::detect(&ws, &mut state, &extractor)?;
            print_json(&report)?;
        }
        Command::Mask => {
            let report = ops::create_masks(&ws, &mut state)?;
            print_json(&report)?;
        }
        Command::Mosaic => {
            // The detected set lives in process state, so a bare mosaic
            // invocation surfaces the missing-detection precondition.
            let report = ops::create_mosaic(&ws, &mut state)?;
            print_json(&report)?;
        }
        Command::Run { no_ocr } => {
            let extractor = build_extractor(no_ocr, args.verbose);
            ops::detect(&ws, &mut state, &extractor)?;
            ops::create_masks(&ws, &mut state)?;
            let report = ops::create_mosaic(&ws, &mut state)?;
            print_json(&report)?;
        }
        Command::Flowers { image } => {
            let count =
                fieldmosaic::flowers::count_flowers(&image, &ws.flower_result_path(), &mut state);
            print_json(&serde_json::json!({ "flower_count": count }))?;
        }
        Command::Artifact { kind } => {
            let artifact = match kind.as_str() {
                "mask" => ops::Artifact::MaskMosaic,
                "color" => ops::Artifact::ColorMosaic,
                "flowers" => ops::Artifact::Flowers,
                other => anyhow::bail!("unknown artifact kind: {}", other),
            };
            let path = ops::preview(&ws, artifact)?;
            println!("{}", path.display());
        }
        Command::Status => {
            print_json(&ops::status(&state)?)?;
        }
        Command::Health => {
            print_json(&ops::health())?;
        }
    }

    if args.verbose {
        print_json(&state)?;
    }

    Ok(())
}
