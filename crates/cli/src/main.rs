use care_records::CareSnapshot;
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use worklist_core::{
    fetch_timeout_from_env_value, reference_zone_from_env_value, same_local_day_str, view,
    FixedClock, ReferenceZone, SnapshotSource, SortKey, StatusFilter, Task, WorklistAggregator,
    WorklistConfig, WorklistQuery, WorklistSources, WorklistSummary,
};

#[derive(Parser)]
#[command(name = "worklist")]
#[command(about = "Caregiver daily worklist CLI")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show today's worklist for a caregiver
    List {
        /// Care snapshot file (YAML or JSON)
        #[arg(long)]
        snapshot: PathBuf,
        /// Caregiver reference to build the worklist for
        #[arg(long)]
        caregiver: String,
        /// Case-insensitive text to match against title, resident name and location
        #[arg(long)]
        search: Option<String>,
        /// all, pending, completed or overdue
        #[arg(long, default_value = "all")]
        status: String,
        /// due_time, priority or resident_name
        #[arg(long, default_value = "due_time")]
        sort: String,
        /// Reference timezone (defaults to WORKLIST_TIMEZONE, then Asia/Ho_Chi_Minh)
        #[arg(long)]
        zone: Option<String>,
        /// Evaluate as of this RFC 3339 instant instead of now
        #[arg(long)]
        at: Option<String>,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Show pending/completed/overdue counts for a caregiver
    Summary {
        /// Care snapshot file (YAML or JSON)
        #[arg(long)]
        snapshot: PathBuf,
        /// Caregiver reference to build the worklist for
        #[arg(long)]
        caregiver: String,
        /// Reference timezone (defaults to WORKLIST_TIMEZONE, then Asia/Ho_Chi_Minh)
        #[arg(long)]
        zone: Option<String>,
        /// Evaluate as of this RFC 3339 instant instead of now
        #[arg(long)]
        at: Option<String>,
    },
    /// Rewrite a care snapshot as YAML with every record time in `created_at`
    Normalize {
        /// Care snapshot file (YAML or JSON)
        #[arg(long)]
        snapshot: PathBuf,
    },
    /// Check whether two instants fall on the same local day
    SameDay {
        /// Reference instant (RFC 3339)
        reference: String,
        /// Candidate instant (RFC 3339); unparseable values are never "today"
        candidate: String,
        /// Reference timezone (defaults to WORKLIST_TIMEZONE, then Asia/Ho_Chi_Minh)
        #[arg(long)]
        zone: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logs go to stderr so `--json` output stays clean.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("worklist_core=warn".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::List {
            snapshot,
            caregiver,
            search,
            status,
            sort,
            zone,
            at,
            json,
        }) => {
            let query = WorklistQuery::new(
                search,
                status.parse::<StatusFilter>()?,
                sort.parse::<SortKey>()?,
            );
            let zone = resolve_zone(zone)?;
            let now = resolve_now(at)?;
            let tasks = build(&snapshot, &caregiver, zone, now).await?;
            let shown = view::apply(&tasks, &query, now);

            if json {
                println!("{}", serde_json::to_string_pretty(&shown)?);
            } else if shown.is_empty() {
                println!("No tasks found.");
            } else {
                for task in &shown {
                    println!("{}", render_row(task, now));
                }
            }
        }
        Some(Commands::Summary {
            snapshot,
            caregiver,
            zone,
            at,
        }) => {
            let zone = resolve_zone(zone)?;
            let now = resolve_now(at)?;
            let tasks = build(&snapshot, &caregiver, zone, now).await?;
            let summary = WorklistSummary::from_tasks(&tasks, now);
            println!(
                "Residents: {}, Tasks: {}, Pending: {}, Completed: {}, Overdue: {}",
                summary.residents,
                summary.total,
                summary.pending,
                summary.completed,
                summary.overdue
            );
        }
        Some(Commands::Normalize { snapshot }) => {
            print!("{}", normalize(&snapshot)?);
        }
        Some(Commands::SameDay {
            reference,
            candidate,
            zone,
        }) => {
            let zone = resolve_zone(zone)?;
            let reference = parse_instant(&reference)?;
            let same = same_local_day_str(reference, Some(&candidate), &zone);
            println!("{}", if same { "yes" } else { "no" });
        }
        None => {
            println!("Use 'worklist --help' for commands");
        }
    }

    Ok(())
}

fn resolve_zone(flag: Option<String>) -> Result<ReferenceZone, Box<dyn std::error::Error>> {
    let value = flag.or_else(|| std::env::var("WORKLIST_TIMEZONE").ok());
    Ok(reference_zone_from_env_value(value)?)
}

fn resolve_now(at: Option<String>) -> Result<DateTime<Utc>, Box<dyn std::error::Error>> {
    match at {
        Some(raw) => parse_instant(&raw),
        None => Ok(Utc::now()),
    }
}

fn parse_instant(raw: &str) -> Result<DateTime<Utc>, Box<dyn std::error::Error>> {
    let parsed = DateTime::parse_from_rfc3339(raw.trim())
        .map_err(|e| format!("'{raw}' is not an RFC 3339 instant: {e}"))?;
    Ok(parsed.with_timezone(&Utc))
}

async fn build(
    snapshot: &Path,
    caregiver: &str,
    zone: ReferenceZone,
    now: DateTime<Utc>,
) -> Result<Vec<Task>, Box<dyn std::error::Error>> {
    let timeout = fetch_timeout_from_env_value(std::env::var("WORKLIST_FETCH_TIMEOUT_MS").ok())?;
    let cfg = Arc::new(WorklistConfig::new(zone, timeout)?);

    let source = SnapshotSource::load(snapshot)?.for_caregiver(Some(caregiver));
    let aggregator = WorklistAggregator::new(cfg, WorklistSources::from_single(Arc::new(source)))
        .with_clock(Arc::new(FixedClock(now)));

    Ok(aggregator.build_worklist().await?)
}

/// Canonical YAML for the snapshot at `path`. Record times that cannot be resolved are dropped.
fn normalize(path: &Path) -> Result<String, Box<dyn std::error::Error>> {
    let data = CareSnapshot::load(path)?;
    Ok(CareSnapshot::render_yaml(&data)?)
}

fn render_row(task: &Task, now: DateTime<Utc>) -> String {
    let status = if task.is_overdue(now) {
        "OVERDUE".to_string()
    } else {
        format!("{:?}", task.status).to_uppercase()
    };
    format!(
        "[{status:<9}] {title} | {location} | due {due}",
        title = task.title,
        location = task.location,
        due = task.due_at.to_rfc3339(),
    )
}
