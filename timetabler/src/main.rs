/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::{error, info, warn};

use timetabler::config::SchoolConfig;
use timetabler::model::{SectionId, SemesterId, StudentId};
use timetabler::service::Timetabler;
use timetabler::store::{Dataset, MemoryStore, ScheduleStore};

// ── CLI argument definition ───────────────────────────────────────────────────

/// School timetable generator and enrollment validator.
///
/// Example:
///   timetabler --data demos/dataset.yaml --config demos/school.yaml \
///              generate --semester 1
#[derive(Debug, Parser)]
#[command(
    name = "timetabler",
    about = "School timetable generator and enrollment validator",
    long_about = None,
)]
struct Cli {
    /// Path to the YAML school configuration (school day, lunch, caps).
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Path to the YAML school dataset (courses, teachers, rooms, students).
    #[arg(short = 'd', long = "data")]
    data: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Regenerate the schedule of a semester.
    Generate {
        #[arg(short, long)]
        semester: SemesterId,
    },

    /// Print the schedule of a semester.
    Show {
        #[arg(short, long)]
        semester: SemesterId,
    },

    /// Enroll a student in a comma-separated list of sections.
    Enroll {
        #[arg(long)]
        student: StudentId,
        #[arg(short, long)]
        semester: SemesterId,
        #[arg(long, value_delimiter = ',', required = true)]
        sections: Vec<SectionId>,
    },

    /// Weekly hours per teacher.
    Workload {
        #[arg(short, long)]
        semester: SemesterId,
    },

    /// Weekly occupancy per classroom.
    Rooms {
        #[arg(short, long)]
        semester: SemesterId,
    },

    /// Sections a student can still take, with prerequisite and clash flags.
    Plan {
        #[arg(long)]
        student: StudentId,
        #[arg(short, long)]
        semester: SemesterId,
    },
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() {
    // Initialise structured logging on stderr so stdout stays plain YAML.
    // Level is controlled by the RUST_LOG env-var (e.g. RUST_LOG=debug).
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    info!(
        config = ?cli.config,
        data = %cli.data.display(),
        command = ?cli.command,
        "Configuration"
    );

    // ── Load school configuration ─────────────────────────────────────────────
    let config = match &cli.config {
        Some(path) => match SchoolConfig::load_from_file(path) {
            Ok(config) => config,
            Err(e) => {
                error!("Failed to load school configuration: {:#}", e);
                process::exit(1);
            }
        },
        None => {
            warn!("No school configuration file provided, using default school day");
            SchoolConfig::default()
        }
    };

    // ── Load dataset ──────────────────────────────────────────────────────────
    let dataset = match Dataset::load_from_file(&cli.data) {
        Ok(dataset) => dataset,
        Err(e) => {
            error!("Failed to load school dataset: {:#}", e);
            process::exit(1);
        }
    };

    let service = Timetabler::new(dataset.into_store(), Arc::new(config));

    if let Err(e) = run(&service, cli.command).await {
        error!("{:#}", e);
        process::exit(1);
    }
}

// ── Commands ──────────────────────────────────────────────────────────────────

async fn run(service: &Timetabler<MemoryStore>, command: Command) -> Result<()> {
    match command {
        Command::Generate { semester } => print_yaml(&service.generate_schedule(semester).await?),

        Command::Show { semester } => {
            ensure_generated(service, semester).await?;
            print_yaml(&service.schedule(semester).await?)
        }

        Command::Enroll {
            student,
            semester,
            sections,
        } => {
            ensure_generated(service, semester).await?;
            let outcome = service
                .validate_and_enroll(student, semester, &sections)
                .await?;
            if !outcome.is_enrolled() {
                warn!(student, "{}", outcome.message());
            }
            print_yaml(&outcome)
        }

        Command::Workload { semester } => {
            ensure_generated(service, semester).await?;
            print_yaml(&service.teacher_workload(semester).await?)
        }

        Command::Rooms { semester } => {
            ensure_generated(service, semester).await?;
            print_yaml(&service.room_usage(semester).await?)
        }

        Command::Plan { student, semester } => {
            ensure_generated(service, semester).await?;
            print_yaml(&service.student_plan(student, semester).await?)
        }
    }
}

/// The dataset carries no schedule, so read commands generate one first.
async fn ensure_generated(service: &Timetabler<MemoryStore>, semester: SemesterId) -> Result<()> {
    let existing = service
        .inspect(|store| store.sections_by_semester(semester))
        .await?;
    if existing.is_empty() {
        info!(semester, "no schedule loaded, generating one");
        service.generate_schedule(semester).await?;
    }
    Ok(())
}

fn print_yaml<T: Serialize>(value: &T) -> Result<()> {
    let text = serde_yaml::to_string(value).context("Failed to render result as YAML")?;
    print!("{text}");
    Ok(())
}
