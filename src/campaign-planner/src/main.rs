//! Campaign Planner: period pickers, KPI dashboards, alerts and cohort
//! duplication over a JSON campaign snapshot.

use anyhow::{bail, Context};
use campaign_core::{AppConfig, Campaign, CampaignStatus, ChannelDirectory};
use campaign_management::{
    CampaignRepository, DuplicationEngine, DuplicationTarget, InMemoryCampaignStore,
};
use campaign_planning::{generate_period_catalog, CampaignFilter, DatePreset, Period, PeriodType};
use campaign_reporting::{AlertDetector, CampaignDashboard, KpiEngine};
use chrono::{Datelike, Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "campaign-planner")]
#[command(about = "Marketing campaign planning, duplication and performance reporting")]
#[command(version)]
struct Cli {
    /// Optional TOML config file
    #[arg(long, global = true, env = "CAMPAIGN_PLANNER__CONFIG_FILE")]
    config: Option<String>,

    /// Emit JSON logs (overrides config)
    #[arg(long, global = true, default_value_t = false)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the quarter and month period options for a year
    Periods {
        /// Calendar year (default: current year)
        #[arg(long)]
        year: Option<i32>,
    },

    /// Cross-channel KPIs for the filtered subset
    Kpis(SnapshotArgs),

    /// Performance alerts for the filtered subset, most severe first
    Alerts(SnapshotArgs),

    /// Per-channel rollups for the filtered subset
    Rollup {
        #[command(flatten)]
        snapshot: SnapshotArgs,

        /// Channel directory JSON (default: built-in catalog)
        #[arg(long)]
        directory: Option<PathBuf>,
    },

    /// KPIs, rollups and alerts in one document
    Dashboard(SnapshotArgs),

    /// Copy every campaign of a brand on a channel into a new window
    Duplicate(DuplicateArgs),
}

#[derive(Args, Debug)]
struct SnapshotArgs {
    /// JSON array of campaign records
    #[arg(long, env = "CAMPAIGN_PLANNER__DATA")]
    data: PathBuf,

    /// Range start (YYYY-MM-DD), requires --to
    #[arg(long)]
    from: Option<NaiveDate>,

    /// Range end (YYYY-MM-DD), requires --from
    #[arg(long)]
    to: Option<NaiveDate>,

    /// Trailing or calendar preset: last_7_days, last_30_days, last_90_days,
    /// this_month, this_quarter, this_year
    #[arg(long)]
    preset: Option<String>,

    /// Period label, e.g. "Q3 2025", "March 2025", "2025-01-01 to 2025-02-15"
    #[arg(long)]
    period: Option<String>,

    /// Period type for --period: quarter, month, custom
    #[arg(long, default_value = "quarter")]
    period_type: String,

    #[arg(long)]
    channel: Option<String>,

    #[arg(long)]
    brand: Option<String>,

    /// Status label; legacy labels are migrated
    #[arg(long)]
    status: Option<String>,

    /// Reference date for presets (default: today)
    #[arg(long)]
    today: Option<NaiveDate>,
}

#[derive(Args, Debug)]
struct DuplicateArgs {
    /// JSON array of campaign records
    #[arg(long, env = "CAMPAIGN_PLANNER__DATA")]
    data: PathBuf,

    #[arg(long)]
    brand: String,

    #[arg(long)]
    channel: String,

    /// New window start (YYYY-MM-DD)
    #[arg(long)]
    start: NaiveDate,

    /// New window end (YYYY-MM-DD)
    #[arg(long)]
    end: NaiveDate,

    /// Manager for every copy (default: keep each source's manager)
    #[arg(long)]
    manager: Option<String>,

    /// Notes for every copy (default: source notes marked as a copy)
    #[arg(long)]
    notes: Option<String>,

    /// Force every copy to PLANNED
    #[arg(long, default_value_t = false)]
    set_all_planned: bool,

    /// Explicit status for every copy; wins over --set-all-planned
    #[arg(long)]
    custom_status: Option<String>,

    /// Reference date for status derivation (default: today)
    #[arg(long)]
    today: Option<NaiveDate>,

    /// Write the updated snapshot back to --data
    #[arg(long, default_value_t = false)]
    write: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Config is loaded before tracing because it carries the log settings.
    let (config, config_error) = match AppConfig::load(cli.config.as_deref()) {
        Ok(config) => (config, None),
        Err(e) => (AppConfig::default(), Some(e)),
    };
    init_tracing(&config, cli.json_logs);
    if let Some(e) = config_error {
        warn!(error = %e, "Failed to load config, using defaults");
    }

    match cli.command {
        Commands::Periods { year } => {
            let year = year.unwrap_or_else(|| Local::now().year());
            print_json(&generate_period_catalog(year))?;
        }
        Commands::Kpis(args) => {
            let subset = load_subset(&args)?;
            print_json(&KpiEngine::new(&config).compute_kpis(&subset))?;
        }
        Commands::Alerts(args) => {
            let subset = load_subset(&args)?;
            print_json(&AlertDetector::new(&config).detect_alerts(&subset))?;
        }
        Commands::Rollup {
            snapshot,
            directory,
        } => {
            let subset = load_subset(&snapshot)?;
            let engine = KpiEngine::new(&config);
            match (&snapshot.channel, directory) {
                (Some(channel), None) => {
                    print_json(&engine.compute_channel_rollup(&subset, channel))?
                }
                (_, directory) => {
                    let directory = load_directory(directory.as_deref())?;
                    print_json(&engine.compute_channel_rollups(&subset, &directory))?
                }
            }
        }
        Commands::Dashboard(args) => {
            let subset = load_subset(&args)?;
            let dashboard = CampaignDashboard::new(&config, ChannelDirectory::standard());
            print_json(&dashboard.summarize(&subset))?;
        }
        Commands::Duplicate(args) => duplicate(&config, args).await?,
    }

    Ok(())
}

fn init_tracing(config: &AppConfig, json_override: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.filter));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if config.logging.json || json_override {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn today_or(arg: Option<NaiveDate>) -> NaiveDate {
    arg.unwrap_or_else(|| Local::now().date_naive())
}

fn load_snapshot(path: &Path) -> anyhow::Result<Vec<Campaign>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("reading snapshot {}", path.display()))?;
    let snapshot: Vec<Campaign> = serde_json::from_str(&raw)
        .with_context(|| format!("parsing snapshot {}", path.display()))?;
    for campaign in &snapshot {
        campaign.validate()?;
    }
    info!(path = %path.display(), count = snapshot.len(), "Snapshot loaded");
    Ok(snapshot)
}

fn load_directory(path: Option<&Path>) -> anyhow::Result<ChannelDirectory> {
    match path {
        Some(path) => {
            let raw = std::fs::read_to_string(path)
                .with_context(|| format!("reading channel directory {}", path.display()))?;
            Ok(serde_json::from_str(&raw)?)
        }
        None => Ok(ChannelDirectory::standard()),
    }
}

fn build_filter(args: &SnapshotArgs) -> anyhow::Result<CampaignFilter> {
    let mut filter = CampaignFilter::new();

    match (args.from, args.to, &args.preset) {
        (Some(from), Some(to), None) => filter = filter.with_range(from, to),
        (None, None, Some(preset)) => {
            let (start, end) = preset.parse::<DatePreset>()?.resolve(today_or(args.today));
            filter = filter.with_range(start, end);
        }
        (None, None, None) => {}
        (_, _, Some(_)) => bail!("--preset cannot be combined with --from/--to"),
        _ => bail!("--from and --to must be given together"),
    }

    if let Some(label) = &args.period {
        let period_type: PeriodType = args.period_type.parse()?;
        filter = filter.with_period(Period::parse(label, period_type)?);
    }
    if let Some(channel) = &args.channel {
        filter = filter.with_channel(channel.as_str());
    }
    if let Some(brand) = &args.brand {
        filter = filter.with_brand(brand.as_str());
    }
    if let Some(status) = &args.status {
        filter = filter.with_status(CampaignStatus::from(status.as_str()));
    }
    Ok(filter)
}

fn load_subset(args: &SnapshotArgs) -> anyhow::Result<Vec<Campaign>> {
    let filter = build_filter(args)?;
    let snapshot = load_snapshot(&args.data)?;
    let subset = filter.select(&snapshot);
    info!(total = snapshot.len(), selected = subset.len(), "Working subset selected");
    Ok(subset)
}

async fn duplicate(config: &AppConfig, args: DuplicateArgs) -> anyhow::Result<()> {
    let snapshot = load_snapshot(&args.data)?;
    let store = Arc::new(InMemoryCampaignStore::from_snapshot(snapshot)?);
    let engine = DuplicationEngine::new(Arc::clone(&store), &config.duplication);

    let mut target = DuplicationTarget::new(args.start, args.end);
    target.manager = args.manager;
    target.notes = args.notes;
    target.set_all_to_planned = args.set_all_planned;
    target.custom_status = args.custom_status.as_deref().map(CampaignStatus::from);

    let outcome = engine
        .duplicate_from_store(&args.brand, &args.channel, &target, today_or(args.today))
        .await?;
    print_json(&outcome)?;

    if args.write {
        let updated = store.fetch_all().await?;
        std::fs::write(&args.data, serde_json::to_string_pretty(&updated)?)
            .with_context(|| format!("writing snapshot {}", args.data.display()))?;
        info!(path = %args.data.display(), count = updated.len(), "Snapshot written");
    }
    Ok(())
}
