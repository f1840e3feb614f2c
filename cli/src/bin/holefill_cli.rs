use clap::{Parser, Subcommand};
use cli::FillJob;
use color_eyre::eyre::{Result, bail};
use holefill::{
    Connectivity, FillParameters, FillReport, FillingStrategy,
    io::{self, MaskRect},
};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::{self, EnvFilter};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fill the holes of an image using the given mask
    Fill {
        /// Path to the image to fill
        image: PathBuf,
        /// Path to the mask; pixels darker than 50% gray are holes
        mask: PathBuf,
        /// Distance exponent of the weight function
        #[arg(short, long, default_value = "3.0")]
        z: f32,
        /// Epsilon added to the weight denominator (must be > 0)
        #[arg(short, long, default_value = "0.01")]
        e: f32,
        /// Pixel connectivity: 4 or 8
        #[arg(short, long, default_value = "8")]
        connectivity: u8,
        /// Strategy name: Exact or Approximate (unknown names use Exact)
        #[arg(short, long, default_value = "Exact")]
        strategy: String,
        /// Cluster count for the approximate strategy (defaults to the connectivity)
        #[arg(long)]
        clusters: Option<usize>,
        /// Output path (defaults to <image>_FILLED.<ext>)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Print the fill report as JSON
        #[arg(long)]
        report: bool,
    },
    /// Run a job described by a .toml or .json file
    Process {
        /// Path to the job file
        #[arg(short, long)]
        config: PathBuf,
        /// Print the fill report as JSON
        #[arg(long)]
        report: bool,
    },
    /// Write a white mask with a black rectangular hole
    Mask {
        /// Take width and height from this image
        #[arg(long, conflicts_with_all = ["width", "height"])]
        like: Option<PathBuf>,
        #[arg(long, required_unless_present = "like")]
        width: Option<u32>,
        #[arg(long, required_unless_present = "like")]
        height: Option<u32>,
        /// Left edge of the hole
        #[arg(long)]
        x: u32,
        /// Top edge of the hole
        #[arg(long)]
        y: u32,
        #[arg(long)]
        hole_width: u32,
        #[arg(long)]
        hole_height: u32,
        /// Where to write the mask
        #[arg(short, long)]
        output: PathBuf,
    },
    /// Print the JSON schema of a job file
    Schema,
}

fn main() -> Result<()> {
    color_eyre::install()?;

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info"))
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Fill {
            image,
            mask,
            z,
            e,
            connectivity,
            strategy,
            clusters,
            output,
            report,
        } => {
            let connectivity = Connectivity::try_from(connectivity)?;
            let strategy = FillingStrategy::from_name(
                &strategy,
                clusters.unwrap_or(connectivity.neighbor_count()),
            );
            let job = FillJob {
                image_path: image.to_string_lossy().into_owned(),
                mask_path: mask.to_string_lossy().into_owned(),
                output_path: output.map(|p| p.to_string_lossy().into_owned()),
                parameters: FillParameters { connectivity, z, e, strategy },
            };
            run_job(&job, report)?;
        }
        Commands::Process { config, report } => {
            let job = FillJob::from_file(&config)?;
            info!("Fill job: {:?}", job);
            run_job(&job, report)?;
        }
        Commands::Mask {
            like,
            width,
            height,
            x,
            y,
            hole_width,
            hole_height,
            output,
        } => {
            let (width, height) = match (like, width, height) {
                (Some(path), _, _) => io::load_rgb(path)?.dimensions(),
                (None, Some(w), Some(h)) => (w, h),
                _ => bail!("either --like or both --width and --height are required"),
            };
            let hole = MaskRect { x, y, width: hole_width, height: hole_height };
            io::rectangular_mask(width, height, hole).save(&output)?;
            info!("Mask saved at: {}", output.display());
        }
        Commands::Schema => {
            println!("{}", serde_json::to_string_pretty(&FillJob::schema())?);
        }
    }

    Ok(())
}

fn run_job(job: &FillJob, print_report: bool) -> Result<FillReport> {
    let report = job.run()?;
    info!(
        "Filled {} hole pixels using {} -> {}",
        report.holes,
        report.strategy,
        job.output_path().display()
    );
    if !report.is_complete() {
        warn!("{} hole pixels could not be filled (no boundary weight)", report.unfilled);
    }
    if print_report {
        println!("{}", report.to_json()?);
    }
    Ok(report)
}
