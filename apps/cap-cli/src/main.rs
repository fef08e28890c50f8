use cap_app::{AppResult, RunOptions, StudyFile, run_service, study};
use cap_sim::{SweepTermination, format_ragone_line, write_ragone_table};
use clap::{Parser, Subcommand};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "cap-cli")]
#[command(about = "Equivalent-circuit supercapacitor discharge and Ragone tool", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a study file
    Validate {
        /// Path to the study YAML (or JSON) file
        study_path: PathBuf,
    },
    /// Run the study's single discharge
    Discharge {
        /// Path to the study YAML (or JSON) file
        study_path: PathBuf,
        /// Compare with the closed-form solution
        #[arg(long)]
        exact: bool,
    },
    /// Run the study's Ragone sweep and print the power/energy table
    Ragone {
        /// Path to the study YAML (or JSON) file
        study_path: PathBuf,
        /// Compare every point with the closed-form solution
        #[arg(long)]
        exact: bool,
        /// Skip cache and force re-run
        #[arg(long)]
        no_cache: bool,
        /// Store the end-of-sweep device state with the results
        #[arg(long)]
        checkpoint: bool,
        /// Write the table to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Discharge the study device and save its state
    Checkpoint {
        /// Path to the study YAML (or JSON) file
        study_path: PathBuf,
        /// Checkpoint file to write
        checkpoint_path: PathBuf,
    },
    /// Restore a device from a checkpoint and print its state
    Restore {
        /// Checkpoint file written by `checkpoint`
        checkpoint_path: PathBuf,
    },
}

fn main() -> AppResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { study_path } => cmd_validate(&study_path),
        Commands::Discharge { study_path, exact } => cmd_discharge(&study_path, exact),
        Commands::Ragone {
            study_path,
            exact,
            no_cache,
            checkpoint,
            output,
        } => cmd_ragone(&study_path, exact, !no_cache, checkpoint, output.as_deref()),
        Commands::Checkpoint {
            study_path,
            checkpoint_path,
        } => cmd_checkpoint(&study_path, &checkpoint_path),
        Commands::Restore { checkpoint_path } => cmd_restore(&checkpoint_path),
    }
}

fn load(study_path: &Path) -> AppResult<StudyFile> {
    tracing::debug!(path = %study_path.display(), "loading study");
    let is_json = study_path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let mut study = if is_json {
        study::load_study_json(study_path)?
    } else {
        study::load_study(study_path)?
    };
    // Relative output directories are resolved next to the study file.
    if let (Some(output), Some(parent)) = (study.output.as_mut(), study_path.parent())
        && output.directory.is_relative()
    {
        output.directory = parent.join(&output.directory);
    }
    Ok(study)
}

fn print_header(device_type: &str, parameters: &BTreeMap<String, f64>) {
    println!("# device {}", device_type);
    for (name, value) in parameters {
        println!("# {} = {}", name, value);
    }
}

fn cmd_validate(study_path: &Path) -> AppResult<()> {
    println!("Validating study: {}", study_path.display());
    let study = load(study_path)?;
    study::validate_study(&study)?;
    println!("✓ Study is valid");
    Ok(())
}

fn cmd_discharge(study_path: &Path, exact: bool) -> AppResult<()> {
    let study = load(study_path)?;
    let options = RunOptions {
        exact,
        ..RunOptions::default()
    };
    let response = run_service::run_discharge(&study, &options)?;
    let outcome = &response.outcome;

    print_header(&response.device_type, &response.device_parameters);
    println!("  Mean power:     {:.7e} W", outcome.power);
    println!("  Energy:         {:.7e} J", outcome.energy);
    println!("  Discharge time: {:.7e} s", outcome.discharge_time);
    println!("  Steps:          {}", outcome.steps);
    println!("  Time step:      {:.7e} s", outcome.time_step);
    if outcome.refinements > 0 {
        println!("  (time step refined after a coarse first pass)");
    }
    if let Some(exact) = &response.exact {
        println!("  Exact time:     {:.7e} s", exact.discharge_time);
        println!("  Exact energy:   {:.7e} J", exact.energy);
        println!("  Exact power:    {:.7e} W", exact.power());
    }
    Ok(())
}

fn cmd_ragone(
    study_path: &Path,
    exact: bool,
    use_cache: bool,
    checkpoint: bool,
    output: Option<&Path>,
) -> AppResult<()> {
    let study = load(study_path)?;
    let options = RunOptions {
        use_cache,
        exact,
        checkpoint,
        ..RunOptions::default()
    };

    let response = match output {
        Some(_) => run_service::run_ragone(&study, &options)?,
        None => run_service::run_ragone_with_progress(
            &study,
            &options,
            Some(&mut |point| print!("{}", format_ragone_line(point))),
        )?,
    };

    match output {
        Some(path) => {
            let mut out = BufWriter::new(File::create(path)?);
            writeln!(out, "# device {}", response.device_type)?;
            write_ragone_table(&mut out, &response.report.points)?;
            println!("✓ Wrote {} points to {}", response.report.points.len(), path.display());
        }
        None if response.loaded_from_cache => {
            let stdout = io::stdout();
            write_ragone_table(&mut stdout.lock(), &response.report.points)?;
        }
        None => {}
    }

    if response.loaded_from_cache {
        println!("# loaded from cache: {}", response.sweep_id);
    } else if response.manifest.is_some() {
        println!("# stored as: {}", response.sweep_id);
    }
    match &response.report.termination {
        SweepTermination::RangeExhausted => println!("# sweep complete"),
        SweepTermination::ResolutionFloor { value } => {
            println!("# sweep stopped at {value:e}: discharge resolved in a single step")
        }
        SweepTermination::NumericalFailure { value, message } => {
            println!("# sweep stopped at {value:e}: {message}")
        }
    }

    if let Some(checked) = &response.cross_checked {
        println!("# swept_value  power_rel_error  energy_rel_error  time_rel_error");
        for row in checked {
            println!(
                "# {:.7e}  {:+.3e}  {:+.3e}  {:+.3e}",
                row.point.swept_value, row.power_rel_error, row.energy_rel_error, row.time_rel_error
            );
        }
    }
    Ok(())
}

fn cmd_checkpoint(study_path: &Path, checkpoint_path: &Path) -> AppResult<()> {
    let study = load(study_path)?;
    let path = run_service::checkpoint_device(&study, checkpoint_path)?;
    println!("✓ Checkpoint written: {}", path.display());
    Ok(())
}

fn cmd_restore(checkpoint_path: &Path) -> AppResult<()> {
    let mut device = run_service::restore_device(checkpoint_path)?;
    let (device_type, parameters) = run_service::describe_device(device.as_mut());
    print_header(&device_type, &parameters);
    println!("  Voltage: {:.7e} V", device.voltage());
    println!("  Current: {:.7e} A", device.current());
    Ok(())
}
