#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! # autograde
//!
//! Grades a Python submission against an assignment file and reports the
//! result for students and CI.
//!
//! Exit codes: `0` for a passing grade, `1` for a failing grade, `2` when the
//! assignment or submission could not be set up.

use std::{path::PathBuf, process::ExitCode};

use anyhow::{Context, Result};
use autograde::{
    AssignmentConfig, CommandRunner, ImplementationDetector, SourceDirDetector,
    emit::{self, console, gradescope},
};
use bpaf::*;
use colored::Colorize;
use dotenvy::dotenv;
use tracing::{Level, metadata::LevelFilter};
use tracing_subscriber::{fmt, prelude::*, util::SubscriberInitExt};

/// Exit code for setup and configuration failures.
const SETUP_FAILURE: u8 = 2;

/// Exit code for a failing grade.
const FAILING_GRADE: u8 = 1;

/// Arguments of `grade`.
#[derive(Debug, Clone)]
struct GradeArgs {
    /// Assignment file.
    assignment: PathBuf,
    /// Submission root.
    dir:        PathBuf,
    /// Report destination override.
    output:     Option<PathBuf>,
    /// Env file that receives CI signals.
    env_file:   Option<PathBuf>,
    /// Gradescope results destination.
    gradescope: Option<PathBuf>,
    /// Skip the table and recommendations.
    quiet:      bool,
}

/// Top-level CLI commands.
#[derive(Debug, Clone)]
enum Cmd {
    /// Grade a submission
    Grade(GradeArgs),
    /// Classify one function
    Detect {
        /// Function name.
        function:   String,
        /// Submission root.
        dir:        PathBuf,
        /// Source directory, relative to the root.
        source_dir: PathBuf,
    },
    /// Check an assignment file
    Validate {
        /// Assignment file.
        assignment: PathBuf,
    },
}

/// Global options plus the command.
#[derive(Debug, Clone)]
struct Options {
    /// Debug-level logging.
    verbose: bool,
    /// Command to run.
    cmd:     Cmd,
}

/// Parse the command line arguments and return `Options`
fn options() -> Options {
    /// parses the assignment file
    fn assignment_file() -> impl Parser<PathBuf> {
        long("assignment")
            .short('a')
            .help("Assignment file (TOML or JSON)")
            .argument::<PathBuf>("FILE")
            .fallback(PathBuf::from("autograde.toml"))
    }

    /// parses the submission root
    fn submission_dir() -> impl Parser<PathBuf> {
        long("dir")
            .short('d')
            .help("Submission root directory")
            .argument::<PathBuf>("DIR")
            .fallback(PathBuf::from("."))
    }

    let verbose = long("verbose")
        .short('v')
        .help("Print debug logs")
        .switch();

    let grade = {
        let assignment = assignment_file();
        let dir = submission_dir();
        let output = long("output")
            .short('o')
            .help("Where to write the JSON report")
            .argument::<PathBuf>("FILE")
            .optional();
        let env_file = long("env-file")
            .env("GITHUB_ENV")
            .help("Append KEY=VALUE grade signals to this file")
            .argument::<PathBuf>("FILE")
            .optional();
        let gradescope = long("gradescope")
            .help("Also write Gradescope results.json here")
            .argument::<PathBuf>("FILE")
            .optional();
        let quiet = long("quiet")
            .short('q')
            .help("Only print the per-component lines and the final grade")
            .switch();

        construct!(GradeArgs {
            assignment,
            dir,
            output,
            env_file,
            gradescope,
            quiet,
        })
        .map(Cmd::Grade)
        .to_options()
        .command("grade")
        .help("Grade a submission")
    };

    let detect = {
        let dir = submission_dir();
        let source_dir = long("source-dir")
            .help("Source directory relative to the submission root")
            .argument::<PathBuf>("DIR")
            .fallback(PathBuf::from("src"));
        let function = positional::<String>("FUNCTION").help("Function to classify");

        construct!(Cmd::Detect {
            dir,
            source_dir,
            function,
        })
        .to_options()
        .command("detect")
        .help("Report whether a function looks implemented")
    };

    let validate = {
        let assignment = assignment_file();
        construct!(Cmd::Validate { assignment })
            .to_options()
            .command("validate")
            .help("Check an assignment file and print its components")
    };

    let cmd = construct!([grade, detect, validate]);

    construct!(Options { verbose, cmd })
        .to_options()
        .descr("Rule-based autograder for Python assignments")
        .run()
}

/// Grades a submission and publishes the report.
async fn grade(args: GradeArgs) -> Result<ExitCode> {
    let config = AssignmentConfig::load(&args.assignment)?;
    let root = std::fs::canonicalize(&args.dir)
        .with_context(|| format!("Submission directory {} not found", args.dir.display()))?;
    let paths = config.paths(&root, args.output.clone());

    let runner = CommandRunner::pytest(config.test_file_path().as_deref(), paths.root_dir());
    let detector = SourceDirDetector::load(paths.source_dir());
    if detector.file_count() == 0 {
        tracing::warn!("No Python files found in {}", paths.source_dir().display());
    }

    let engine = config.engine(runner, detector, paths.clone())?;
    let report = engine.run().await?;

    emit::write_report(&report, paths.report_path())?;
    let signals = emit::signals(&report);
    if let Some(env_file) = &args.env_file {
        emit::append_env_file(&signals, env_file)?;
    }
    if let Some(results) = &args.gradescope {
        gradescope::write_results(&report, results)?;
    }
    console::print_summary(&report, args.quiet);

    Ok(if report.is_passing() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(FAILING_GRADE)
    })
}

/// Prints the detector's verdict for one function.
fn detect(function: &str, dir: PathBuf, source_dir: PathBuf) -> Result<ExitCode> {
    let source_dir = dir.join(source_dir);
    let detector = SourceDirDetector::load(&source_dir);

    let Some(file) = detector.defining_file(function) else {
        println!("{function}: not found in {}", source_dir.display());
        return Ok(ExitCode::from(FAILING_GRADE));
    };

    if detector.is_implemented(function) {
        println!("{function}: implemented ({})", file.display());
        Ok(ExitCode::SUCCESS)
    } else {
        println!("{function}: stub ({})", file.display());
        Ok(ExitCode::from(FAILING_GRADE))
    }
}

/// Loads an assignment and prints its registry.
fn validate(assignment: PathBuf) -> Result<ExitCode> {
    let config = AssignmentConfig::load(&assignment)?;
    let registry = config.registry()?;

    println!("{}", registry.table());
    println!(
        "{}: {} components, {} points",
        config.name,
        registry.len(),
        autograde::registry::format_points(registry.possible_points())
    );
    Ok(ExitCode::SUCCESS)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    dotenv().ok();

    let opts = options();

    let fmt = fmt::layer()
        .without_time()
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr);
    let filter_layer = LevelFilter::from_level(if opts.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    });
    tracing_subscriber::registry()
        .with(fmt)
        .with(filter_layer)
        .init();

    let result = match opts.cmd {
        Cmd::Grade(args) => grade(args).await,
        Cmd::Detect {
            function,
            dir,
            source_dir,
        } => detect(&function, dir, source_dir),
        Cmd::Validate { assignment } => validate(assignment),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {e:#}", "error:".red().bold());
            ExitCode::from(SETUP_FAILURE)
        }
    }
}
