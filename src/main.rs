//! incline3d - directional survey processing from the command line
//!
//! # Usage
//!
//! ```bash
//! # Process a survey and export the trajectory
//! incline3d process survey.las --output trajectory.csv
//!
//! # Check a survey without processing it
//! incline3d validate survey.csv
//!
//! # Compare two wells
//! incline3d analyze base.las offset.zak
//!
//! # Reprocess every well of a project in place
//! incline3d project pad7.inclproj --add 7-112.las
//!
//! # Print the default configuration
//! incline3d config > incline3d.toml
//! ```
//!
//! # Environment Variables
//!
//! - `INCLINE3D_CONFIG`: Path to a TOML configuration file
//! - `RUST_LOG`: Logging level (default: info)

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use serde::Serialize;
use tracing::{info, warn};

use incline3d::io::{self, MeasurementFormat};
use incline3d::{
    analyze_pair, normalize, process_well, validate_survey, AppConfig, IntervalData, MeasurementStation, Method,
    Project, WellMetadata, WellResult,
};

// ============================================================================
// CLI Arguments
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "incline3d")]
#[command(about = "Directional survey processing: trajectory, intensity and uncertainty")]
#[command(version)]
struct CliArgs {
    /// Configuration file (overrides INCLINE3D_CONFIG and ./incline3d.toml)
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: SubCommand,
}

#[derive(clap::Subcommand, Debug)]
enum SubCommand {
    /// Process a measurement file (CSV, LAS or ZAK)
    Process {
        input: PathBuf,
        /// Output file; the format follows the extension (.csv, .las, .zak)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Well name when the file carries none
        #[arg(long)]
        well: Option<String>,
        /// Integration method override
        #[arg(long, value_enum)]
        method: Option<MethodArg>,
        /// Rotor table altitude override (m)
        #[arg(long)]
        altitude: Option<f64>,
    },

    /// Validate a measurement file and print every issue
    Validate {
        input: PathBuf,
        /// Write the auto-fixed survey (sorted, azimuths wrapped) as ZAK
        #[arg(long, value_name = "PATH")]
        fix: Option<PathBuf>,
    },

    /// Proximity and deviation analysis of two wells, printed as JSON
    Analyze { base: PathBuf, target: PathBuf },

    /// Reprocess a project file in place
    Project {
        path: PathBuf,
        /// Measurement files to add as new wells
        #[arg(long)]
        add: Vec<PathBuf>,
        /// Create the project if it does not exist
        #[arg(long)]
        create: bool,
    },

    /// Print the effective configuration as TOML
    Config,

    /// Run the engine on canned surveys and write report.json / report.md
    Selftest {
        #[arg(long, default_value = "selftest-artifacts")]
        out: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum MethodArg {
    AverageAngle,
    BalancedTangential,
    MinimumCurvature,
    MinimumCurvatureIntegral,
    RingArc,
}

impl From<MethodArg> for Method {
    fn from(m: MethodArg) -> Self {
        match m {
            MethodArg::AverageAngle => Self::AverageAngle,
            MethodArg::BalancedTangential => Self::BalancedTangential,
            MethodArg::MinimumCurvature => Self::MinimumCurvature,
            MethodArg::MinimumCurvatureIntegral => Self::MinimumCurvatureIntegral,
            MethodArg::RingArc => Self::RingArc,
        }
    }
}

// ============================================================================
// Configuration
// ============================================================================

fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    match path {
        Some(p) => AppConfig::load_from_file(p).with_context(|| format!("Failed to load config {}", p.display())),
        None => Ok(AppConfig::load()),
    }
}

fn read_survey(path: &Path, well: Option<&str>) -> Result<IntervalData> {
    let fallback = path.file_stem().and_then(|s| s.to_str()).unwrap_or_default();
    let metadata = WellMetadata::named(well.unwrap_or(fallback));
    io::read_measurements(path, metadata).with_context(|| format!("Failed to read {}", path.display()))
}

fn output_format(path: &Path) -> Option<MeasurementFormat> {
    match path.extension()?.to_str()?.to_ascii_lowercase().as_str() {
        "las" => Some(MeasurementFormat::Las),
        "zak" => Some(MeasurementFormat::Zak),
        "csv" | "txt" => Some(MeasurementFormat::Csv),
        _ => None,
    }
}

// ============================================================================
// Subcommands
// ============================================================================

fn cmd_process(
    config: &AppConfig,
    input: &Path,
    output: Option<&Path>,
    well: Option<&str>,
    method: Option<MethodArg>,
    altitude: Option<f64>,
) -> Result<()> {
    let mut survey = read_survey(input, well)?;
    if let Some(alt) = altitude {
        survey.metadata.rotor_table_altitude = incline3d::Meters(alt);
    }

    let report = validate_survey(&survey, &config.validation);
    for w in &report.warnings {
        warn!("{}", w);
    }
    if !report.is_valid() {
        for e in &report.errors {
            warn!("{}", e);
        }
    }

    let mut options = config.processing;
    if let Some(m) = method {
        options.method = m.into();
    }
    let result = process_well(&survey, &options);
    print_summary(&result);

    if let Some(out) = output {
        match output_format(out) {
            Some(MeasurementFormat::Las) => io::export_las(out, &result, &config.export),
            Some(MeasurementFormat::Zak) => io::export_zak(out, &survey, &config.export),
            Some(MeasurementFormat::Csv) | None => io::export_csv(out, &result, &config.export),
        }
        .with_context(|| format!("Failed to write {}", out.display()))?;
        info!(path = %out.display(), "Trajectory written");
    }
    Ok(())
}

fn print_summary(result: &WellResult) {
    let s = &result.statistics;
    println!("Well:            {}", result.metadata.well_name);
    println!("Method:          {}", result.options.method);
    println!("Stations:        {}", result.points.len());
    if let Some(last) = result.last_point() {
        println!("Final MD / TVD:  {:.2} / {:.2} m", last.depth.0, last.tvd.0);
    }
    println!("Final shift:     {:.2} m at {:.2} deg", s.final_shift.0, s.final_direction.0);
    println!("Max inclination: {:.2} deg at {:.2} m", s.max_inclination.0, s.max_inclination_depth.0);
    println!("Max DLS:         {:.3} deg/10m at {:.2} m", s.max_intensity_10m, s.max_intensity_10m_depth.0);
}

fn cmd_validate(config: &AppConfig, input: &Path, fix: Option<&Path>) -> Result<()> {
    let mut survey = read_survey(input, None)?;
    let report = validate_survey(&survey, &config.validation);
    for e in &report.errors {
        println!("ERROR   {e}");
    }
    for w in &report.warnings {
        println!("WARNING {w}");
    }
    println!("{} error(s), {} warning(s)", report.errors.len(), report.warnings.len());

    if let Some(out) = fix {
        let summary = normalize(&mut survey);
        info!(wrapped = summary.wrapped_azimuths, sorted = summary.sorted, "Survey normalized");
        io::export_zak(out, &survey, &config.export).with_context(|| format!("Failed to write {}", out.display()))?;
    }

    report.into_result().map(|_| ()).context("Survey failed validation")
}

fn cmd_analyze(config: &AppConfig, base: &Path, target: &Path) -> Result<()> {
    let base = process_well(&read_survey(base, None)?, &config.processing);
    let target = process_well(&read_survey(target, None)?, &config.processing);
    let report = analyze_pair(&base, &target, &config.analysis);
    println!("{}", serde_json::to_string_pretty(&report).context("Failed to serialise report")?);
    Ok(())
}

fn cmd_project(path: &Path, add: &[PathBuf], create: bool) -> Result<()> {
    let mut project = if create && !path.exists() {
        let name = path.file_stem().and_then(|s| s.to_str()).unwrap_or("project");
        Project::new(name)
    } else {
        io::load_project(path).with_context(|| format!("Failed to load project {}", path.display()))?
    };

    for file in add {
        let survey = read_survey(file, None)?;
        let id = project.add_well(survey);
        info!(%id, path = %file.display(), "Well added");
    }
    project.process_all();
    io::save_project(path, &project).with_context(|| format!("Failed to save project {}", path.display()))?;
    println!("{} well(s) processed", project.wells.len());
    Ok(())
}

// ============================================================================
// Self-test
// ============================================================================

#[derive(Debug, Serialize)]
struct Check {
    name: &'static str,
    passed: bool,
    detail: String,
}

fn check(name: &'static str, passed: bool, detail: String) -> Check {
    Check { name, passed, detail }
}

fn run_checks(config: &AppConfig) -> Vec<Check> {
    let opts = config.processing;
    let mut checks = Vec::new();

    let vertical = IntervalData::new(
        WellMetadata::named("vertical"),
        (0..4).map(|i| MeasurementStation::new(f64::from(i) * 100.0, 0.0)).collect(),
    );
    let r = process_well(&vertical, &opts);
    let max_offset = r.points.iter().map(|p| p.shift.0).fold(0.0, f64::max);
    checks.push(check("vertical_well_stays_on_axis", max_offset == 0.0, format!("max shift {max_offset} m")));

    let mut meta = WellMetadata::named("build-up");
    meta.rotor_table_altitude = incline3d::Meters(120.0);
    meta.magnetic_declination = incline3d::Degrees(8.0);
    let build = IntervalData::new(
        meta,
        [(0.0, 0.0, 0.0), (100.0, 5.0, 30.0), (200.0, 20.0, 60.0), (300.0, 60.0, 90.0), (400.0, 90.0, 110.0), (500.0, 90.0, 120.0)]
            .into_iter()
            .map(|(d, i, a)| MeasurementStation::new(d, i).with_magnetic(a))
            .collect(),
    );
    let r = process_well(&build, &opts);
    let finite = r.points.iter().all(|p| p.x.0.is_finite() && p.y.0.is_finite() && p.tvd.0.is_finite());
    checks.push(check("build_up_is_finite", finite, format!("{} points", r.points.len())));
    let final_shift = r.statistics.final_shift.0;
    checks.push(check("build_up_moves_away", final_shift > 0.0, format!("final shift {final_shift:.2} m")));

    let altitude_ok = r.points.iter().all(|p| p.absolute_altitude.0 == 120.0 - p.tvd.0);
    checks.push(check("absolute_altitude_identity", altitude_ok, String::new()));

    let sigmas_grow = r.points.windows(2).all(|w| w[1].sigma_tvd.0 >= w[0].sigma_tvd.0);
    checks.push(check("uncertainty_grows_with_depth", sigmas_grow, String::new()));

    checks
}

fn cmd_selftest(config: &AppConfig, out: &Path) -> Result<()> {
    let checks = run_checks(config);
    std::fs::create_dir_all(out).with_context(|| format!("Failed to create {}", out.display()))?;

    let json = serde_json::to_string_pretty(&checks).context("Failed to serialise report")?;
    io::atomic::write_atomic(&out.join("report.json"), json.as_bytes()).context("Failed to write report.json")?;

    let mut md = String::from("# incline3d self-test\n\n| Check | Result | Detail |\n|---|---|---|\n");
    for c in &checks {
        md.push_str(&format!("| {} | {} | {} |\n", c.name, if c.passed { "PASS" } else { "FAIL" }, c.detail));
    }
    io::atomic::write_atomic(&out.join("report.md"), md.as_bytes()).context("Failed to write report.md")?;

    let failed = checks.iter().filter(|c| !c.passed).count();
    info!(checks = checks.len(), failed, dir = %out.display(), "Self-test finished");
    if failed > 0 {
        bail!("{failed} self-test check(s) failed");
    }
    Ok(())
}

// ============================================================================
// Entry point
// ============================================================================

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let args = CliArgs::parse();
    let config = load_config(args.config.as_deref())?;

    match args.command {
        SubCommand::Process { input, output, well, method, altitude } => {
            cmd_process(&config, &input, output.as_deref(), well.as_deref(), method, altitude)
        }
        SubCommand::Validate { input, fix } => cmd_validate(&config, &input, fix.as_deref()),
        SubCommand::Analyze { base, target } => cmd_analyze(&config, &base, &target),
        SubCommand::Project { path, add, create } => cmd_project(&path, &add, create),
        SubCommand::Config => {
            print!("{}", config.to_toml().context("Failed to serialise config")?);
            Ok(())
        }
        SubCommand::Selftest { out } => cmd_selftest(&config, &out),
    }
}
