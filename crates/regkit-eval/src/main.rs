use std::path::PathBuf;

use anyhow::{Context, Result};
use burn_ndarray::NdArray;
use clap::{Args, Parser, Subcommand};
use regkit_eval::config::DEFAULT_OUTPUT_DIR;
use regkit_eval::{EvaluationConfig, Evaluator, Preprocessing};
use regkit_io::{inspect_archive, summarize_volume, VolumeFormat};

type Backend = NdArray<f32>;

#[derive(Parser)]
#[command(name = "regkit-eval")]
#[command(about = "Evaluate registration quality of a fixed/warped volume pair")]
#[command(args_conflicts_with_subcommands = true, subcommand_negates_reqs = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    evaluate: EvaluateArgs,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a volume's shape and geometry, or an HDF5 archive's layout
    Inspect {
        /// Volume or archive to inspect
        path: PathBuf,
    },
}

#[derive(Args)]
struct EvaluateArgs {
    /// Fixed (reference) volume (.nii, .nii.gz, .nrrd, .nhdr, .hdf5, .h5)
    #[arg(long, required = true)]
    fixed: Option<PathBuf>,

    /// Warped volume produced by the registration
    #[arg(long, required = true)]
    warped: Option<PathBuf>,

    /// Transform archive used to map moving points into fixed space
    #[arg(long = "transform_file")]
    transform_file: Option<PathBuf>,

    /// Keypoints in fixed space
    #[arg(long = "kp_fixed", requires_all = ["kp_moving", "transform_file"])]
    kp_fixed: Option<PathBuf>,

    /// Keypoints in moving space
    #[arg(long = "kp_moving", requires_all = ["kp_fixed", "transform_file"])]
    kp_moving: Option<PathBuf>,

    /// Landmarks in fixed space
    #[arg(long = "lm_fixed", requires_all = ["lm_moving", "transform_file"])]
    lm_fixed: Option<PathBuf>,

    /// Landmarks in moving space
    #[arg(long = "lm_moving", requires_all = ["lm_fixed", "transform_file"])]
    lm_moving: Option<PathBuf>,

    /// Directory for result records and figures
    #[arg(long = "output_dir", env = "REGKIT_OUTPUT_DIR", default_value = DEFAULT_OUTPUT_DIR)]
    output_dir: PathBuf,

    /// Intensity normalization applied before the metrics
    #[arg(long, value_enum, default_value_t = Preprocessing::None)]
    preprocess: Preprocessing,

    /// Render a comparison figure of the middle slice
    #[arg(long)]
    plot: bool,
}

impl EvaluateArgs {
    fn into_config(self) -> Result<EvaluationConfig> {
        let fixed = self.fixed.context("--fixed is required")?;
        let warped = self.warped.context("--warped is required")?;

        let mut config = EvaluationConfig::new(fixed, warped)
            .with_output_dir(&self.output_dir)
            .with_preprocessing(self.preprocess)
            .with_plot(self.plot);
        if let Some(path) = self.transform_file {
            config = config.with_transform_file(path);
        }
        if let (Some(fixed), Some(moving)) = (self.kp_fixed, self.kp_moving) {
            config = config.with_keypoints(fixed, moving);
        }
        if let (Some(fixed), Some(moving)) = (self.lm_fixed, self.lm_moving) {
            config = config.with_landmarks(fixed, moving);
        }
        Ok(config)
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive("regkit=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    let device = Default::default();

    match cli.command {
        Some(Commands::Inspect { path }) => {
            if VolumeFormat::from_path(&path)? == VolumeFormat::Hdf5 {
                println!("{}", inspect_archive(&path)?);
            } else {
                println!("{}", summarize_volume::<Backend>(&path, &device)?);
            }
        }
        None => {
            let config = cli.evaluate.into_config()?;
            let report = Evaluator::<Backend>::new(config, device).run()?;

            println!();
            print!("{}", report.result);
            println!("Results saved to {}", report.result_path.display());
            if let Some(figure) = report.figure_path {
                println!("Comparison figure saved to {}", figure.display());
            }
        }
    }

    Ok(())
}
