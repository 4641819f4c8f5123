use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use log::info;
use referee_report::{layout, AgeCategory, DirectoryAssets, ReportGenerator, ReportRecord};

/// Fills referee report templates from a JSON match record.
///
/// Templates are read from `<assets>/reports` and the font from `<assets>/fonts`.
/// Without `--assets` the directory named by `REFEREE_REPORT_ASSETS_DIR`, `assets`
/// next to the binary, or the crate's bundled `assets` is used.
#[derive(Parser)]
#[command(author, version, about = "Referee report PDF generator")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render the report for a record and write it under its derived file name.
    Generate {
        /// Path to the JSON record.
        #[arg(short, long)]
        input: PathBuf,

        /// Asset directory holding `reports/` and `fonts/`.
        #[arg(short, long)]
        assets: Option<PathBuf>,

        /// Directory the PDF is written to.
        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,
    },

    /// Print the placements resolved for a record as JSON.
    Layout {
        /// Path to the JSON record.
        #[arg(short, long)]
        input: PathBuf,
    },

    /// List the supported age categories and their template files.
    Categories,
}

fn read_record(path: &Path) -> Result<ReportRecord, Box<dyn Error>> {
    let json = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&json)?)
}

fn generate(
    input: &Path,
    assets: Option<PathBuf>,
    output_dir: &Path,
) -> Result<(), Box<dyn Error>> {
    let record = read_record(input)?;
    let assets = match assets {
        Some(root) => DirectoryAssets::new(root),
        None => DirectoryAssets::discover()?,
    };
    info!("Using assets from {}", assets.root().display());

    let report = ReportGenerator::new(assets).generate(&record)?;
    fs::create_dir_all(output_dir)?;
    let output_path = output_dir.join(&report.filename);
    fs::write(&output_path, &report.bytes)?;
    println!(
        "Generated {} ({} bytes)",
        output_path.display(),
        report.bytes.len()
    );
    Ok(())
}

fn print_layout(input: &Path) -> Result<(), Box<dyn Error>> {
    let record = read_record(input)?;
    let placements = layout::resolve(&record);
    println!("{}", serde_json::to_string_pretty(&placements)?);
    Ok(())
}

fn print_categories() {
    for category in AgeCategory::ALL {
        println!("{category}\t{}", category.template_file_name());
    }
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Generate {
            input,
            assets,
            output_dir,
        } => generate(&input, assets, &output_dir),
        Commands::Layout { input } => print_layout(&input),
        Commands::Categories => {
            print_categories();
            Ok(())
        }
    };

    if let Err(err) = result {
        eprintln!("Error: {}", err);
        print_error_sources(err.as_ref());
        std::process::exit(1);
    }
}

fn print_error_sources(mut error: &(dyn Error + 'static)) {
    while let Some(source) = error.source() {
        eprintln!("  caused by: {}", source);
        error = source;
    }
}
