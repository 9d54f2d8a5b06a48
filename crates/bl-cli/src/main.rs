//! Backlog RS command line
//!
//! Runs migrations and prints read-only reports against a PostgreSQL store.
//! Reports go to stdout as pretty JSON; logs go to stderr.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing::info;

use bl_core::config::AppConfig;
use bl_core::telemetry::init_tracing;
use bl_core::traits::Id;
use bl_db::{Database, PgStore, Repositories};
use bl_models::{Statut, TaskStatus};
use bl_services::{EffortSummary, Engine};

#[derive(Debug, Parser)]
#[command(name = "backlog", version, about = "Backlog relationship and sprint scheduling engine")]
struct Cli {
    /// Configuration file (TOML); `BACKLOG__*` variables override it
    #[arg(long, short, global = true, env = "BACKLOG_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Create or update the database schema
    Migrate,
    /// Counts of projects with and without backlogs and owners
    ProjectStats,
    /// Sprint backlog, story and sprint totals of a product backlog
    BacklogStats { product_backlog_id: Id },
    /// Completion and status breakdown of a sprint backlog
    SprintProgress { sprint_backlog_id: Id },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SprintProgressReport {
    sprint_backlog_id: Id,
    progress: f64,
    total_user_stories: u64,
    total_tasks: u64,
    tasks: BTreeMap<TaskStatus, u64>,
    user_stories: BTreeMap<Statut, u64>,
    effort: EffortSummary,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = AppConfig::load(cli.config.as_deref()).context("loading configuration")?;
    init_tracing(&config.logging)?;

    info!(version = env!("CARGO_PKG_VERSION"), command = ?cli.command, "starting");

    let db = Database::connect(&config.database)
        .await
        .context("connecting to database")?;
    db.ping().await.context("database did not answer")?;
    let result = run(&cli.command, &db, &config).await;
    db.close().await;
    result
}

async fn run(command: &Command, db: &Database, config: &AppConfig) -> anyhow::Result<()> {
    if let Command::Migrate = command {
        bl_db::postgres::migrate(db.pool())
            .await
            .context("applying schema")?;
        return print_json(&serde_json::json!({ "migrated": true }));
    }

    let repos = Repositories::from_store(Arc::new(PgStore::new(db.pool().clone())));
    let engine = Engine::new(repos, &config.scheduling);

    match *command {
        Command::Migrate => Ok(()),
        Command::ProjectStats => print_json(&engine.progress.project_statistics().await?),
        Command::BacklogStats { product_backlog_id } => print_json(
            &engine
                .progress
                .product_backlog_sprint_statistics(product_backlog_id)
                .await?,
        ),
        Command::SprintProgress { sprint_backlog_id } => {
            let progress = &engine.progress;
            let report = SprintProgressReport {
                sprint_backlog_id,
                progress: progress.calculate_sprint_progress(sprint_backlog_id).await?,
                total_user_stories: progress.count_total_user_stories(sprint_backlog_id).await?,
                total_tasks: progress.count_total_tasks(sprint_backlog_id).await?,
                tasks: progress.task_status_summary(sprint_backlog_id).await?,
                user_stories: progress.user_story_status_summary(sprint_backlog_id).await?,
                effort: progress.effort_summary(sprint_backlog_id).await?,
            };
            print_json(&report)
        }
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_subcommands() {
        let cli =
            Cli::try_parse_from(["backlog", "--config", "backlog.toml", "backlog-stats", "7"])
                .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("backlog.toml")));
        assert!(matches!(cli.command, Command::BacklogStats { product_backlog_id: 7 }));

        let cli = Cli::try_parse_from(["backlog", "sprint-progress", "3"]).unwrap();
        assert!(matches!(cli.command, Command::SprintProgress { sprint_backlog_id: 3 }));

        assert!(Cli::try_parse_from(["backlog", "sprint-progress", "x"]).is_err());
    }

    #[test]
    fn test_report_keys() {
        let report = SprintProgressReport {
            sprint_backlog_id: 1,
            progress: 50.0,
            total_user_stories: 1,
            total_tasks: 2,
            tasks: TaskStatus::ALL.iter().map(|s| (*s, 1)).collect(),
            user_stories: BTreeMap::new(),
            effort: EffortSummary::default(),
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["tasks"]["IN_REVIEW"], 1);
        assert_eq!(json["sprintBacklogId"], 1);
    }
}
