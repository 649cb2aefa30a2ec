use clap::Parser;
use image::ImageReader;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use fruitscan::{
    FeatureExtractor, FeatureReport, FeatureVector, FruitConfig, FruitError, NaiveBayes,
    TrainingRecord, TrainingStore,
};

#[derive(Parser)]
#[command(name = "fruitscan")]
#[command(about = "Identify fruit from a self-checkout photograph")]
struct Cli {
    /// Path to input image file
    #[arg(value_name = "IMAGE")]
    image_path: PathBuf,

    /// "train" (or "t") to record a labeled example, "classify" (or "i") to identify
    #[arg(value_name = "MODE")]
    mode: String,

    /// Fruit name for train mode; prompted for when omitted
    #[arg(short, long)]
    label: Option<String>,

    /// JSON configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Training data file (overrides the configuration)
    #[arg(long, value_name = "FILE")]
    training_data: Option<PathBuf>,

    /// Median filter width, odd (overrides the configuration)
    #[arg(long)]
    median_kernel: Option<u32>,

    /// Save intermediate images to directory (must be empty)
    #[arg(long, value_name = "DIR")]
    debug_out: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Train,
    Classify,
}

fn parse_mode(mode: &str) -> Option<Mode> {
    match mode.to_lowercase().as_str() {
        "train" | "t" => Some(Mode::Train),
        "classify" | "identify" | "i" => Some(Mode::Classify),
        _ => None,
    }
}

fn main() -> ExitCode {
    let args = Cli::parse();

    let level = if args.verbose { "debug" } else { "info" };
    simple_log::quick!(level);

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match err.downcast_ref::<FruitError>() {
                Some(e) => {
                    log::error!("{} stage failed: {}", e.stage(), e);
                    eprintln!("{}", e.user_message());
                }
                None => log::error!("{:#}", err),
            }
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Cli) -> anyhow::Result<()> {
    let mut config = match &args.config {
        Some(path) => FruitConfig::from_json_file(path)?,
        None => FruitConfig::default(),
    };
    if let Some(path) = &args.training_data {
        config.training.data_path = path.clone();
    }
    if let Some(kernel) = args.median_kernel {
        config.segmentation.median_kernel = kernel;
    }
    config.validate()?;

    let img = load_image(&args.image_path)?;
    log::info!("Image loaded: {}x{}", img.width(), img.height());

    let mut extractor = FeatureExtractor::with_verbose(&config.segmentation, args.verbose);
    if let Some(debug_dir) = &args.debug_out {
        extractor = extractor.with_debug(debug_dir.clone())?;
    }

    let report = extractor.extract(&img)?;
    print_report(&report);

    match parse_mode(&args.mode) {
        Some(Mode::Train) => {
            println!("Training mode specified!");
            train(args, &config, report.features)
        }
        Some(Mode::Classify) => {
            println!("Identification mode specified!");
            classify(args, &config, &report.features)
        }
        None => {
            log::warn!("Unknown mode {} specified", args.mode);
            println!("Unknown mode {} specified", args.mode);
            Ok(())
        }
    }
}

fn load_image(path: &Path) -> fruitscan::Result<image::DynamicImage> {
    ImageReader::open(path)
        .map_err(|e| FruitError::input(format!("cannot open {}", path.display()), e))?
        .decode()
        .map_err(|e| FruitError::input(format!("cannot decode {}", path.display()), e))
}

fn print_report(report: &FeatureReport) {
    println!("Pixels in color range: {}", report.raw_foreground_pixels);
    println!("Number of contours: {}", report.contours_found);
    println!("{} contours removed.", report.contours_discarded);
    println!("Perimeter: {:.2}", report.perimeter);
    println!("Area: {:.2}", report.area);
    println!("Compactness: {:.2}", report.features.compactness);
    println!("Fruit area: {:.2}%", report.fruit_area_ratio * 100.0);
    println!(
        "Average values, H: {:.2} S: {:.2} V: {:.2}",
        report.features.average_hue,
        report.features.average_saturation,
        report.features.average_value
    );
}

fn prompt_label() -> fruitscan::Result<String> {
    print!("What type of fruit is this?\n> ");
    let _ = std::io::stdout().flush();
    let mut line = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .map_err(|e| FruitError::input("cannot read fruit name", e))?;
    Ok(line.trim().to_string())
}

fn train(args: &Cli, config: &FruitConfig, features: FeatureVector) -> anyhow::Result<()> {
    let label = match &args.label {
        Some(label) => label.trim().to_string(),
        None => prompt_label()?,
    };

    if !config.classifier.candidates.iter().any(|c| *c == label) {
        log::warn!("'{}' is not one of the candidate classes; recording it anyway", label);
    }

    let record = TrainingRecord::new(args.image_path.display().to_string(), label, features);
    let store = TrainingStore::new(&config.training.data_path);
    store.append(&record)?;
    println!("Recorded '{}' in {}", record.label, store.path().display());
    Ok(())
}

fn classify(args: &Cli, config: &FruitConfig, features: &FeatureVector) -> anyhow::Result<()> {
    let store = TrainingStore::new(&config.training.data_path);
    let records = store.load_all()?;

    if args.verbose {
        for record in &records {
            log::debug!("{}\t{}\t{}", record.source, record.label, record.features);
        }
    }

    let model = NaiveBayes::fit_with_floor(&records, config.classifier.variance_floor);
    let posteriors = model.posteriors(&config.classifier.candidates, features)?;
    print!("{}", posteriors);

    let best = posteriors.best().ok_or(FruitError::NoCandidateData)?;
    println!("Most probable class: {} (p={:.4})", best.label, best.probability);
    Ok(())
}
