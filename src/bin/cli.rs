//! CLI application for skin-tone face region detection.
//!
//! Usage:
//!   skin-face <image>                         # Human-readable output
//!   skin-face <image> --json                  # JSON output
//!   skin-face <image> --model faces.svm.bz2   # Confirm regions with a classifier
//!   skin-face <image> --annotated out.png     # Save image with regions drawn

use clap::Parser;
use serde::Serialize;
use skin_face::{imaging, DetectorConfig, FaceClassifier, FaceDetector, Rectangle, Rgb};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "skin-face")]
#[command(author, version, about = "Skin-tone face region detection", long_about = None)]
struct Args {
    /// Input image file
    #[arg(required = true)]
    image: PathBuf,

    /// Output as JSON
    #[arg(short, long)]
    json: bool,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Linear SVM model used to confirm each region (.bz2 is decompressed)
    #[arg(short, long)]
    model: Option<PathBuf>,

    /// Write a copy of the image with regions outlined (green = confirmed)
    #[arg(long)]
    annotated: Option<PathBuf>,

    /// Write intermediate mask images into this directory
    #[arg(long)]
    progress_images: Option<PathBuf>,

    /// Longest image side processed before downscaling
    #[arg(long, default_value = "200")]
    max_dimension: usize,

    /// Relaxed skin mask expansion passes
    #[arg(long, default_value = "2")]
    relaxed_expansions: usize,

    /// Fraction of each side added to final regions
    #[arg(long, default_value = "0.13")]
    expand_by: f64,

    /// Show verbose output
    #[arg(short, long)]
    verbose: bool,
}

/// Output structure for JSON serialization
#[derive(Serialize)]
struct Output {
    image: String,
    width: u32,
    height: u32,
    regions_detected: usize,
    classifier_used: bool,
    regions: Vec<RegionOutput>,
}

#[derive(Serialize)]
struct RegionOutput {
    /// Region index (1-based)
    index: usize,
    #[serde(flatten)]
    bounds: Rectangle,
    area_percent: f64,
    /// Classifier score; absent without a model
    #[serde(skip_serializing_if = "Option::is_none")]
    score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    is_face: Option<bool>,
}

const CONFIRMED: Rgb = Rgb::new(173, 255, 47);
const UNCONFIRMED: Rgb = Rgb::new(255, 0, 0);

fn main() {
    let args = Args::parse();

    let level = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    if let Err(e) = run(&args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let config = DetectorConfig {
        maximum_image_dimension: args.max_dimension,
        number_of_relaxed_expansions: args.relaxed_expansions,
        percent_to_expand_final_region_by: args.expand_by,
        save_progress_images: args.progress_images.is_some(),
        ..DetectorConfig::default()
    };

    let mut detector = FaceDetector::new(config)?;
    if args.verbose {
        detector = detector.with_progress(|message| eprintln!("{}", message));
    }
    if let Some(ref directory) = args.progress_images {
        detector = detector.with_progress_directory(directory)?;
    }

    let classifier = match args.model {
        Some(ref path) => {
            if args.verbose {
                eprintln!("Loading classifier model from {:?}...", path);
            }
            Some(FaceClassifier::load(path)?)
        }
        None => None,
    };

    if args.verbose {
        eprintln!("Loading image {:?}...", args.image);
    }
    let img = image::open(&args.image)?.to_rgb8();
    let (width, height) = img.dimensions();
    let image_area = width as f64 * height as f64;

    let regions = detector.possible_face_regions(&img)?;
    if args.verbose {
        eprintln!("Found {} possible face region(s)", regions.len());
    }

    let mut region_outputs = Vec::with_capacity(regions.len());
    for (i, region) in regions.iter().enumerate() {
        let score = match classifier {
            Some(ref classifier) => Some(classifier.score(&img, *region)?),
            None => None,
        };
        region_outputs.push(RegionOutput {
            index: i + 1,
            bounds: *region,
            area_percent: region.area() as f64 / image_area * 100.0,
            score,
            is_face: score.map(|s| s >= 0.0),
        });
    }

    if let Some(ref path) = args.annotated {
        let mut annotated = img.clone();
        for region in &region_outputs {
            let colour = if region.is_face.unwrap_or(true) {
                CONFIRMED
            } else {
                UNCONFIRMED
            };
            imaging::draw_rectangle(&mut annotated, region.bounds, colour, 2);
        }
        annotated.save(path)?;
        if args.verbose {
            eprintln!("Annotated image written to {:?}", path);
        }
    }

    let output = Output {
        image: args.image.display().to_string(),
        width,
        height,
        regions_detected: regions.len(),
        classifier_used: classifier.is_some(),
        regions: region_outputs,
    };

    // Generate output
    let output_str = if args.json {
        serde_json::to_string_pretty(&output)?
    } else {
        format_human_readable(&output)
    };

    // Write output
    if let Some(ref path) = args.output {
        std::fs::write(path, &output_str)?;
        if args.verbose {
            eprintln!("Output written to {:?}", path);
        }
    } else {
        println!("{}", output_str);
    }

    Ok(())
}

fn format_human_readable(output: &Output) -> String {
    let mut s = String::new();

    s.push_str(&format!("Image: {} ({}x{})\n", output.image, output.width, output.height));
    s.push_str(&format!("Possible face regions: {}\n", output.regions_detected));

    if output.regions.is_empty() {
        s.push_str("\nNo face regions found.\n");
        return s;
    }

    for region in &output.regions {
        s.push_str(&format!("\n--- Region {} ---\n", region.index));
        s.push_str(&format!(
            "Bounding box: {}x{} at ({}, {})\n",
            region.bounds.width, region.bounds.height, region.bounds.x, region.bounds.y
        ));
        s.push_str(&format!("Coverage: {:.1}% of image\n", region.area_percent));
        if let (Some(score), Some(is_face)) = (region.score, region.is_face) {
            let verdict = if is_face { "face" } else { "not a face" };
            s.push_str(&format!("Classifier: {} (score {:.4})\n", verdict, score));
        }
    }

    if output.classifier_used {
        let confirmed = output
            .regions
            .iter()
            .filter(|r| r.is_face == Some(true))
            .count();
        s.push_str(&format!("\nConfirmed faces: {}\n", confirmed));
    }

    s
}
