//! Cadence CLI entry point: the `serve` daemon and its operational
//! companion commands (spec §1 "Process shape").

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use comfy_table::Table;
use uuid::Uuid;

use cadence::adapters::clock::SystemClock;
use cadence::adapters::http::{router, HttpTriggerSink};
use cadence::adapters::sqlite::{
    self, SqliteComponentRepository, SqliteComponentStateRepository, SqliteControllerStateRepository,
    SqliteTaskQueue, SqliteUserRepository,
};
use cadence::domain::models::config::Config;
use cadence::domain::models::user::{weekday_from_str, ActivityGroup, DayPart};
use cadence::infrastructure::config::ConfigLoader;
use cadence::infrastructure::logging::LoggerImpl;
use cadence::services::enrollment::{enroll_user, EnrollmentRequest};
use cadence::services::registry::{ControllerRegistry, SharedPorts};

#[derive(Parser)]
#[command(name = "cadence", about = "Per-user intervention controller")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the long-lived daemon: HTTP ingress, daily tick, task reconciler.
    Serve,
    /// Enroll a participant without going through the HTTP ingress.
    BootstrapUser {
        #[arg(long)]
        start_date: NaiveDate,
        #[arg(long)]
        quit_date: NaiveDate,
        #[arg(long, default_value = "high")]
        activity_group: String,
        #[arg(long, default_value = "mon")]
        preferred_weekday: String,
        #[arg(long, default_value = "morning")]
        preferred_daypart: String,
    },
    /// Print a user's controller phase and component states.
    Status {
        user_id: Uuid,
    },
    /// Manually fire a `new-day` tick for every registered user.
    Tick {
        #[arg(long)]
        date: Option<NaiveDate>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = ConfigLoader::load().context("failed to load configuration")?;
    let _logger = LoggerImpl::init(&config.logging).context("failed to initialize logging")?;

    let database_url = format!("sqlite:{}", config.database.path);
    let pool = sqlite::bootstrap(&database_url).await.context("failed to bootstrap database")?;

    let trigger_sink = Arc::new(
        HttpTriggerSink::new(
            config.front_end.base_url.clone(),
            config.front_end.output_channel.clone(),
            config.front_end.timeout_secs,
        )
        .context("failed to build trigger sink")?,
    );
    let task_queue = Arc::new(SqliteTaskQueue::new(pool.clone(), trigger_sink.clone()));
    task_queue.initialize_from_store().await.context("failed to re-arm pending tasks")?;

    let clock = Arc::new(SystemClock::from_config_str(&config.clock.timezone).map_err(|e| anyhow::anyhow!("invalid configured timezone: {e}"))?);

    let shared = SharedPorts {
        user_repo: Arc::new(SqliteUserRepository::new(pool.clone())),
        component_repo: Arc::new(SqliteComponentRepository::new(pool.clone())),
        component_state_repo: Arc::new(SqliteComponentStateRepository::new(pool.clone())),
        controller_state_repo: Arc::new(SqliteControllerStateRepository::new(pool.clone())),
        task_queue: task_queue.clone(),
        clock,
        schedule: config.schedule.clone(),
    };
    let registry = Arc::new(ControllerRegistry::new(shared));
    registry.rehydrate().await.context("failed to rehydrate controller registry")?;

    match cli.command {
        Commands::Serve => serve(registry, task_queue, &config).await,
        Commands::BootstrapUser {
            start_date,
            quit_date,
            activity_group,
            preferred_weekday,
            preferred_daypart,
        } => {
            bootstrap_user(
                &registry,
                &config,
                start_date,
                quit_date,
                &activity_group,
                &preferred_weekday,
                &preferred_daypart,
            )
            .await
        }
        Commands::Status { user_id } => status(&registry, user_id).await,
        Commands::Tick { date } => tick(&registry, &config, date).await,
    }
}

async fn serve(registry: Arc<ControllerRegistry>, task_queue: Arc<SqliteTaskQueue>, config: &Config) -> Result<()> {
    tokio::spawn({
        let task_queue = task_queue.clone();
        async move { task_queue.run_reconciler(std::time::Duration::from_secs(60)).await }
    });

    tokio::spawn({
        let registry = registry.clone();
        let zone: chrono_tz::Tz = config
            .clock
            .timezone
            .parse()
            .expect("timezone already validated by ConfigLoader");
        let tick_hour = config.clock.tick_hour;
        let tick_minute = config.clock.tick_minute;
        async move {
            cadence::services::daily_tick::run_daily_tick_loop(registry, zone, tick_hour, tick_minute).await;
        }
    });

    let listener = tokio::net::TcpListener::bind(&config.server.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.server.bind_addr))?;
    tracing::info!(addr = %config.server.bind_addr, "cadence ingress listening");
    axum::serve(listener, router(registry)).await.context("ingress server stopped")?;
    Ok(())
}

#[allow(clippy::too_many_arguments)]
async fn bootstrap_user(
    registry: &ControllerRegistry,
    config: &Config,
    start_date: NaiveDate,
    quit_date: NaiveDate,
    activity_group: &str,
    preferred_weekday: &str,
    preferred_daypart: &str,
) -> Result<()> {
    let request = EnrollmentRequest {
        user_id: config.test_user_id,
        start_date,
        quit_date,
        activity_group: ActivityGroup::from_str(activity_group)
            .ok_or_else(|| anyhow::anyhow!("unknown activity_group: {activity_group}"))?,
        preferred_weekday: weekday_from_str(preferred_weekday)
            .ok_or_else(|| anyhow::anyhow!("unknown preferred_weekday: {preferred_weekday}"))?,
        preferred_daypart: DayPart::from_str(preferred_daypart)
            .ok_or_else(|| anyhow::anyhow!("unknown preferred_daypart: {preferred_daypart}"))?,
    };
    let user_id = enroll_user(registry, request).await?;
    println!("enrolled user {user_id}");
    Ok(())
}

async fn status(registry: &ControllerRegistry, user_id: Uuid) -> Result<()> {
    let state = registry.controller_state_repo().current_phase_state(user_id).await?;

    let mut summary = Table::new();
    summary.set_header(vec!["field", "value"]);
    summary.add_row(vec!["user_id".to_string(), user_id.to_string()]);
    summary.add_row(vec!["phase".to_string(), state.phase.as_str().to_string()]);
    summary.add_row(vec![
        "execution_week".to_string(),
        state.execution_week.map(|w| w.to_string()).unwrap_or_default(),
    ]);
    println!("{summary}");

    let mut components = Table::new();
    components.set_header(vec!["component", "completed", "next_planned_date", "task_handle"]);
    for name in cadence::domain::models::ComponentName::ALL {
        let Some(row) = registry.component_state_repo().last_state(user_id, *name).await? else {
            continue;
        };
        components.add_row(vec![
            name.as_str().to_string(),
            row.completed.to_string(),
            row.next_planned_date.map(|d| d.to_rfc3339()).unwrap_or_default(),
            row.task_handle.map(|h| h.to_string()).unwrap_or_default(),
        ]);
    }
    println!("{components}");
    Ok(())
}

async fn tick(registry: &ControllerRegistry, config: &Config, date: Option<NaiveDate>) -> Result<()> {
    let zone: chrono_tz::Tz = config.clock.timezone.parse().context("invalid configured timezone")?;
    let today = date.unwrap_or_else(|| chrono::Utc::now().with_timezone(&zone).date_naive());
    registry.broadcast_new_day(today).await;
    println!("broadcast new-day tick for {today}");
    Ok(())
}
