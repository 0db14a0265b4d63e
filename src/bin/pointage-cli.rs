#![forbid(unsafe_code)]
use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use pointage::{
    assembler::resolve_view,
    calendar::Locale,
    cycle::day_index,
    io,
    model::{AssignmentId, EmployeeId},
    resolver::{AnomalyKind, ResolveOptions, ScheduleResolver},
    storage::{JsonSnapshotStore, SnapshotStore},
};
#[cfg(feature = "logging")]
use tracing_subscriber::{fmt::Subscriber, EnvFilter};

/// CLI de résolution des horaires (instantané JSON, sans base de données)
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Active les logs (feature `logging`)
    #[arg(long, global = true)]
    log: bool,

    /// Fichier JSON d'instantané (employés, affectations, gabarits, exceptions)
    #[arg(long, global = true, default_value = "schedule.json")]
    data: String,

    /// Langue des noms de jours (en, fr, es)
    #[arg(long, global = true, default_value = "en")]
    locale: Locale,

    /// Taille maximale d'un intervalle, en jours (sans limite par défaut)
    #[arg(long, global = true)]
    max_range_days: Option<u32>,

    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Résoudre l'horaire d'un employé sur un intervalle (bornes incluses)
    Resolve {
        #[arg(long)]
        employee: i64,
        /// AAAA-MM-JJ
        #[arg(long)]
        start: NaiveDate,
        /// AAAA-MM-JJ
        #[arg(long)]
        end: NaiveDate,
        #[arg(long)]
        out_json: Option<String>,
        #[arg(long)]
        out_csv: Option<String>,
    },

    /// Résoudre la semaine (lundi..dimanche) contenant une date, aujourd'hui par défaut
    Week {
        #[arg(long)]
        employee: i64,
        #[arg(long)]
        of: Option<NaiveDate>,
    },

    /// Afficher l'indice de cycle d'une date pour une affectation
    DayIndex {
        #[arg(long)]
        assignment: i64,
        #[arg(long)]
        date: NaiveDate,
    },

    /// Importer des affectations depuis un CSV
    ImportAssignments {
        #[arg(long)]
        csv: String,
    },

    /// Importer des exceptions depuis un CSV
    ImportExceptions {
        #[arg(long)]
        csv: String,
    },

    /// Signaler chevauchements et exceptions ambiguës
    Check {
        #[arg(long)]
        employee: i64,
        #[arg(long)]
        start: NaiveDate,
        #[arg(long)]
        end: NaiveDate,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    #[cfg(feature = "logging")]
    if cli.log {
        let _ = Subscriber::builder()
            .with_env_filter(EnvFilter::from_default_env())
            .try_init();
    }

    let store = JsonSnapshotStore::open(&cli.data)?;
    let mut snapshot = store.load_or_default()?;
    let opts = ResolveOptions {
        locale: cli.locale,
        max_range_days: cli.max_range_days,
    };

    let code = match cli.cmd {
        Commands::Resolve {
            employee,
            start,
            end,
            out_json,
            out_csv,
        } => {
            let resolver =
                ScheduleResolver::new(&snapshot, &snapshot, &snapshot).with_options(opts);
            let view = resolve_view(&resolver, &snapshot, EmployeeId::new(employee), start, end)?;
            if let Some(path) = out_json {
                io::export_view_json(path, &view)?;
            }
            if let Some(path) = out_csv {
                io::export_days_csv(path, &view.days)?;
            }
            if let Some(name) = &view.display_name {
                println!("{name}");
            }
            print!("{}", io::render_days_table(&view.days));
            0
        }
        Commands::Week { employee, of } => {
            let resolver =
                ScheduleResolver::new(&snapshot, &snapshot, &snapshot).with_options(opts);
            let employee = EmployeeId::new(employee);
            let days = match of {
                Some(day) => resolver.resolve_week_of(employee, day)?,
                None => resolver.resolve_current_week(employee)?,
            };
            print!("{}", io::render_days_table(&days));
            0
        }
        Commands::DayIndex { assignment, date } => {
            let id = AssignmentId::new(assignment);
            let assignment = snapshot
                .find_assignment(id)
                .with_context(|| format!("unknown assignment: {id}"))?;
            let template = snapshot
                .find_template(assignment.template_id)
                .with_context(|| format!("unknown template: {}", assignment.template_id))?;
            if date < assignment.start_date {
                bail!("{date} precedes the start of assignment {id}");
            }
            println!("{}", day_index(date, assignment, template));
            0
        }
        Commands::ImportAssignments { csv } => {
            let rows = io::import_assignments_csv(csv)?;
            println!("imported {} assignment(s)", rows.len());
            snapshot.upsert_assignments(rows);
            store.save(&snapshot)?;
            0
        }
        Commands::ImportExceptions { csv } => {
            let rows = io::import_exceptions_csv(csv)?;
            println!("imported {} exception(s)", rows.len());
            snapshot.upsert_exceptions(rows);
            store.save(&snapshot)?;
            0
        }
        Commands::Check {
            employee,
            start,
            end,
        } => {
            let resolver =
                ScheduleResolver::new(&snapshot, &snapshot, &snapshot).with_options(opts);
            let report = resolver.resolve_with_report(EmployeeId::new(employee), start, end)?;
            if report.anomalies.is_empty() {
                println!("OK: no anomalies");
                0
            } else {
                eprintln!("Found {} anomaly(ies)", report.anomalies.len());
                for anomaly in &report.anomalies {
                    let (kind, what, kept, shadowed) = match &anomaly.kind {
                        AnomalyKind::OverlappingAssignment { kept, shadowed } => (
                            "overlap",
                            "assignment",
                            kept.to_string(),
                            join_ids(shadowed),
                        ),
                        AnomalyKind::AmbiguousException { kept, shadowed } => (
                            "ambiguous",
                            "exception",
                            kept.to_string(),
                            join_ids(shadowed),
                        ),
                    };
                    println!(
                        "{} | {kind} | kept {what} {kept} over {shadowed}",
                        anomaly.date
                    );
                }
                // Code 2 = WARNING
                2
            }
        }
    };

    std::process::exit(code);
}

fn join_ids<T: std::fmt::Display>(ids: &[T]) -> String {
    ids.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}
