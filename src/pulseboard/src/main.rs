//! Pulseboard: synthetic analytics dashboard on the command line.
//!
//! Logs in to a demo session, then prints generated datasets, dashboard
//! views, KPI deltas, or mock query results to stdout.

use clap::{Parser, Subcommand, ValueEnum};
use pulseboard_core::config::AppConfig;
use pulseboard_core::types::{DataTable, DatasetKind};
use pulseboard_core::PulseError;
use pulseboard_generator::query::sample_query;
use pulseboard_generator::QueryConsole;
use pulseboard_platform::{DeviceType, Platform, Region, SessionContext, SessionFilters};
use pulseboard_reporting::{
    export_csv, export_json, format_period_over_period, Dashboard, DashboardView,
};
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Parser, Debug)]
#[command(name = "pulseboard")]
#[command(about = "Deterministic synthetic analytics dashboard")]
#[command(version)]
struct Cli {
    /// Optional TOML config file
    #[arg(long, env = "PULSEBOARD_CONFIG")]
    config: Option<PathBuf>,

    /// Demo login user
    #[arg(long, env = "PULSEBOARD_USERNAME")]
    username: Option<String>,

    /// Demo login password
    #[arg(long, env = "PULSEBOARD_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Data source shown for this session (must be a configured source)
    #[arg(long)]
    data_source: Option<String>,

    /// RNG seed (overrides config)
    #[arg(long)]
    seed: Option<u64>,

    #[arg(long, default_value = "all")]
    region: Region,

    #[arg(long, default_value = "all")]
    platform: Platform,

    #[arg(long, default_value = "all")]
    device: DeviceType,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print one synthetic dataset
    Generate {
        kind: DatasetKind,
        /// Number of days for daily/revenue (defaults from config)
        #[arg(long, allow_hyphen_values = true)]
        size: Option<i64>,
        #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
    },
    /// Print an assembled dashboard view as JSON
    View { view: DashboardView },
    /// Period-over-period change of one numeric column
    Delta {
        kind: DatasetKind,
        field: String,
        #[arg(long, allow_hyphen_values = true)]
        size: Option<i64>,
        #[arg(long, default_value_t = 7)]
        window: usize,
    },
    /// Run a mock SELECT against canned tables
    Query {
        /// Name of a built-in sample query
        #[arg(long, conflicts_with = "sql")]
        sample: Option<String>,
        sql: Option<String>,
        #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
        format: OutputFormat,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    Json,
    Csv,
}

fn render_table(table: &DataTable, format: OutputFormat) -> anyhow::Result<String> {
    Ok(match format {
        OutputFormat::Json => export_json(table)?,
        OutputFormat::Csv => export_csv(table),
    })
}

fn default_size(config: &AppConfig, kind: DatasetKind) -> i64 {
    match kind {
        DatasetKind::Daily => config.generator.daily_days,
        DatasetKind::Revenue => config.generator.revenue_days,
        _ => 0,
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pulseboard=info".into()),
        )
        .with_writer(std::io::stderr)
        .json()
        .init();

    let cli = Cli::parse();

    let mut config = AppConfig::load(cli.config.as_deref()).unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        AppConfig::default()
    });
    if let Some(seed) = cli.seed {
        config.generator.seed = seed;
    }

    info!(
        seed = config.generator.seed,
        daily_days = config.generator.daily_days,
        max_cache_entries = config.cache.max_entries,
        "Configuration loaded"
    );

    let mut session = SessionContext::new(config.default_data_source());
    let (Some(username), Some(password)) = (cli.username.as_deref(), cli.password.as_deref())
    else {
        return Err(PulseError::Unauthenticated.into());
    };
    session.login(username, password, &config.auth)?;

    if let Some(source) = cli.data_source.as_deref() {
        session.select_data_source(source, &config.data_sources)?;
    }
    session.apply_filters(SessionFilters {
        region: cli.region,
        platform: cli.platform,
        device: cli.device,
    });
    session.require_authenticated()?;

    let dashboard = Dashboard::new(&config);

    let output = match cli.command {
        Command::Generate { kind, size, format } => {
            let size = size.unwrap_or_else(|| default_size(&config, kind));
            let dataset = dashboard.cache().get_or_compute(kind, size);
            render_table(&dataset.to_table(), format)?
        }
        Command::View { view } => serde_json::to_string_pretty(&dashboard.render(view)?)?,
        Command::Delta {
            kind,
            field,
            size,
            window,
        } => {
            let size = size.unwrap_or_else(|| default_size(&config, kind));
            let dataset = dashboard.cache().get_or_compute(kind, size);
            let series = dataset.series(&field)?;
            format_period_over_period(&series, window)
        }
        Command::Query {
            sample,
            sql,
            format,
        } => {
            let sql = match (sample, sql) {
                (Some(name), _) => sample_query(&name)
                    .ok_or_else(|| PulseError::UnknownOption {
                        category: "sample query",
                        value: name.clone(),
                    })?
                    .to_string(),
                (None, Some(sql)) => sql,
                (None, None) => anyhow::bail!("either --sample or a SQL statement is required"),
            };
            let console = QueryConsole::new(*dashboard.cache().generator());
            let result = console.execute(&sql)?;
            info!(
                rows = result.rows_returned,
                execution_time_ms = result.execution_time_ms,
                data_source = session.data_source(),
                "Query executed"
            );
            render_table(&result.table, format)?
        }
    };

    println!("{output}");
    Ok(())
}
