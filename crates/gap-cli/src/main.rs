//! `timegap` CLI: manage calendar events in a JSON file and find free time.
//!
//! ## Usage
//!
//! ```sh
//! # Add a one-off event and a weekday morning routine
//! timegap add --title "Dentist" --date 2024-06-10 --start 09:00 --end 10:00
//! timegap add --title "Gym" --daily --weekdays 1,3,5 --start 07:00 --end 08:00
//!
//! # Free gaps for one day, a range, or a month (default: current month)
//! timegap gaps --date 2024-06-10
//! timegap gaps --from 2024-06-10 --to 2024-06-16 --min-gap 30
//! timegap gaps --month 2024-06 --json
//!
//! # Time per category and daily occupation
//! timegap metrics --month 2024-06
//!
//! # Back up and restore
//! timegap export -o backup.json
//! timegap import -i backup.json
//! ```
//!
//! The store file defaults to `timegap-events.json` and can be set with
//! `--store` or `TIMEGAP_STORE`. Logs go to stderr; set `RUST_LOG` or pass
//! `-v` for more detail.

use std::io::{self, Read};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::{Datelike, Local, NaiveDate, NaiveTime};
use clap::{Args, Parser, Subcommand};
use gap_engine::config::{DEFAULT_MERGE_TOLERANCE_MINUTES, DEFAULT_MIN_GAP_MINUTES};
use gap_engine::format::gap_label;
use gap_engine::gaps::{find_all_gaps_with_config, find_first_gap_with_config};
use gap_engine::{
    format_duration, parse_clock, parse_date, parse_month, parse_weekdays, DateWindow, Event,
    EventDraft, EventFilter, EventPatch, EventStore, GapConfig, JsonFileStore, MetricsReport,
    OccupiedInterval, TimeGap,
};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "timegap",
    version,
    about = "Manage calendar events and find the free time between them"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Event store file
    #[arg(
        long,
        global = true,
        env = "TIMEGAP_STORE",
        default_value = "timegap-events.json"
    )]
    store: PathBuf,

    /// Print JSON instead of tables
    #[arg(long, global = true)]
    json: bool,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Add an event
    Add(AddArgs),
    /// List stored events
    List(ListArgs),
    /// Show one event
    Show { id: String },
    /// Change fields of an event
    Update(UpdateArgs),
    /// Delete an event
    Remove { id: String },
    /// Expand events into occupied intervals over a window
    Expand {
        #[command(flatten)]
        window: WindowArgs,
    },
    /// Find free gaps over a window
    Gaps {
        #[command(flatten)]
        window: WindowArgs,
        #[command(flatten)]
        thresholds: ThresholdArgs,
        /// Only show the first gap at least this many minutes long
        #[arg(long, value_name = "MINUTES")]
        first: Option<u32>,
    },
    /// Time per category, tasks per day and daily occupation over a window
    Metrics {
        #[command(flatten)]
        window: WindowArgs,
        #[command(flatten)]
        thresholds: ThresholdArgs,
    },
    /// Write all events as a JSON array
    Export {
        /// Output file (writes to stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Replace all events with a JSON array
    Import {
        /// Input file (reads from stdin if omitted)
        #[arg(short, long)]
        input: Option<PathBuf>,
    },
}

#[derive(Args)]
struct AddArgs {
    #[arg(long)]
    title: String,
    /// Start date of a one-off event (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date, required_unless_present = "daily")]
    date: Option<NaiveDate>,
    /// End date of a one-off event (defaults to --date)
    #[arg(long, value_parser = parse_date)]
    end_date: Option<NaiveDate>,
    /// Start time (HH:MM)
    #[arg(long, value_parser = parse_clock)]
    start: NaiveTime,
    /// End time (HH:MM); earlier than --start means the event runs past midnight
    #[arg(long, value_parser = parse_clock)]
    end: NaiveTime,
    /// Repeat every day of the window
    #[arg(long, conflicts_with_all = ["date", "end_date"])]
    daily: bool,
    /// Limit a daily event to these weekdays (0 = Sunday, e.g. "1,3,5")
    #[arg(long, requires = "daily")]
    weekdays: Option<String>,
    #[arg(long, default_value = "#3b82f6")]
    color: String,
    #[arg(long)]
    category: Option<String>,
    #[arg(long)]
    description: Option<String>,
}

#[derive(Args)]
struct ListArgs {
    #[arg(long)]
    category: Option<String>,
    /// Only one-off events starting on or after this date
    #[arg(long, value_parser = parse_date)]
    from: Option<NaiveDate>,
    /// Only one-off events ending on or before this date
    #[arg(long, value_parser = parse_date)]
    to: Option<NaiveDate>,
    /// Only daily events
    #[arg(long, conflicts_with = "one_off")]
    daily: bool,
    /// Only one-off events
    #[arg(long)]
    one_off: bool,
}

#[derive(Args)]
struct UpdateArgs {
    id: String,
    #[arg(long)]
    title: Option<String>,
    #[arg(long, value_parser = parse_date)]
    date: Option<NaiveDate>,
    #[arg(long, value_parser = parse_date)]
    end_date: Option<NaiveDate>,
    #[arg(long, value_parser = parse_clock)]
    start: Option<NaiveTime>,
    #[arg(long, value_parser = parse_clock)]
    end: Option<NaiveTime>,
    /// Make the event daily (true, dropping its dates) or one-off (false)
    #[arg(long, value_name = "BOOL")]
    daily: Option<bool>,
    #[arg(long, conflicts_with = "every_day")]
    weekdays: Option<String>,
    /// Drop the weekday limit so a daily event recurs on every day
    #[arg(long)]
    every_day: bool,
    #[arg(long)]
    color: Option<String>,
    #[arg(long, conflicts_with = "clear_category")]
    category: Option<String>,
    #[arg(long)]
    clear_category: bool,
    #[arg(long, conflicts_with = "clear_description")]
    description: Option<String>,
    #[arg(long)]
    clear_description: bool,
}

/// Which dates to work on. Defaults to the current month.
#[derive(Args)]
struct WindowArgs {
    /// A single date (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date, conflicts_with_all = ["from", "to", "month"])]
    date: Option<NaiveDate>,
    /// First date of a range
    #[arg(long, value_parser = parse_date, requires = "to", conflicts_with = "month")]
    from: Option<NaiveDate>,
    /// Last date of a range
    #[arg(long, value_parser = parse_date, requires = "from")]
    to: Option<NaiveDate>,
    /// A calendar month (YYYY-MM)
    #[arg(long)]
    month: Option<String>,
}

#[derive(Args)]
struct ThresholdArgs {
    /// Occupied blocks this many minutes apart or closer are merged
    #[arg(long, env = "TIMEGAP_MERGE_TOLERANCE", default_value_t = DEFAULT_MERGE_TOLERANCE_MINUTES)]
    merge_tolerance: u32,
    /// Shortest free gap worth reporting, in minutes
    #[arg(long, env = "TIMEGAP_MIN_GAP", default_value_t = DEFAULT_MIN_GAP_MINUTES)]
    min_gap: u32,
}

impl WindowArgs {
    fn resolve(&self) -> Result<DateWindow> {
        if let Some(date) = self.date {
            return Ok(DateWindow::single(date));
        }
        if let (Some(from), Some(to)) = (self.from, self.to) {
            return DateWindow::range(from, to).context("Invalid --from/--to range");
        }
        let (year, month) = match &self.month {
            Some(raw) => parse_month(raw).context("Invalid --month")?,
            None => {
                let today = Local::now().date_naive();
                (today.year(), today.month())
            }
        };
        Ok(DateWindow::month(year, month)?)
    }
}

impl ThresholdArgs {
    fn config(&self) -> GapConfig {
        GapConfig::default()
            .with_merge_tolerance(self.merge_tolerance)
            .with_min_gap(self.min_gap)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let store = JsonFileStore::new(&cli.store);
    tracing::debug!(store = %store.path().display(), "using event store");

    match cli.command {
        Commands::Add(args) => {
            let draft = args.into_draft()?;
            let event = store.add(draft).context("Failed to add event")?;
            if cli.json {
                print_json(&event)?;
            } else {
                println!("Added {} ({})", event.title, event.id);
            }
        }
        Commands::List(args) => {
            let events = store.filter(&args.filter()).context("Failed to read events")?;
            if cli.json {
                print_json(&events)?;
            } else if events.is_empty() {
                println!("No events.");
            } else {
                for event in &events {
                    print_event_row(event);
                }
            }
        }
        Commands::Show { id } => {
            let Some(event) = store.get(&id).context("Failed to read events")? else {
                bail!("No event with id '{}'", id);
            };
            if cli.json {
                print_json(&event)?;
            } else {
                print_event_detail(&event);
            }
        }
        Commands::Update(args) => {
            let patch = args.patch()?;
            let event = store
                .update(&args.id, &patch)
                .with_context(|| format!("Failed to update event '{}'", args.id))?;
            if cli.json {
                print_json(&event)?;
            } else {
                println!("Updated {} ({})", event.title, event.id);
            }
        }
        Commands::Remove { id } => {
            store
                .remove(&id)
                .with_context(|| format!("Failed to remove event '{}'", id))?;
            if !cli.json {
                println!("Removed {}", id);
            }
        }
        Commands::Expand { window } => {
            let window = window.resolve()?;
            let events = store.load_all().context("Failed to read events")?;
            let occupied = gap_engine::expand(&events, &window);
            if cli.json {
                print_json(&occupied)?;
            } else if occupied.is_empty() {
                println!("Nothing scheduled.");
            } else {
                for interval in &occupied {
                    print_interval_row(interval);
                }
            }
        }
        Commands::Gaps {
            window,
            thresholds,
            first,
        } => {
            let window = window.resolve()?;
            let events = store.load_all().context("Failed to read events")?;
            let config = thresholds.config();
            let gaps: Vec<TimeGap> = match first {
                Some(minutes) => find_first_gap_with_config(&events, &window, minutes, &config)
                    .into_iter()
                    .collect(),
                None => find_all_gaps_with_config(&events, &window, &config),
            };
            if cli.json {
                print_json(&gaps)?;
            } else if gaps.is_empty() {
                println!("No free gaps.");
            } else {
                for gap in &gaps {
                    print_gap_row(gap);
                }
            }
        }
        Commands::Metrics { window, thresholds } => {
            let window = window.resolve()?;
            let events = store.load_all().context("Failed to read events")?;
            let report = gap_engine::metrics_report(&events, &window, &thresholds.config());
            if cli.json {
                print_json(&report)?;
            } else {
                print_report(&report);
            }
        }
        Commands::Export { output } => {
            let json = store.export_json().context("Failed to export events")?;
            match output {
                Some(path) => std::fs::write(&path, json)
                    .with_context(|| format!("Failed to write file: {}", path.display()))?,
                None => println!("{}", json),
            }
        }
        Commands::Import { input } => {
            let json = read_input(input.as_deref())?;
            let events = store.import_json(&json).context("Failed to import events")?;
            if cli.json {
                print_json(&events)?;
            } else {
                println!("Imported {} events", events.len());
            }
        }
    }

    Ok(())
}

/// Logs go to stderr so stdout stays parseable. `RUST_LOG` wins over `-v`.
fn init_tracing(verbose: bool) {
    let fallback = if verbose {
        "timegap=debug,gap_engine=debug"
    } else {
        "timegap=warn,gap_engine=warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

impl AddArgs {
    fn into_draft(self) -> Result<EventDraft> {
        let week_days = match &self.weekdays {
            Some(raw) => Some(parse_weekdays(raw).context("Invalid --weekdays")?),
            None => None,
        };
        let (start_date, end_date) = if self.daily {
            (None, None)
        } else {
            (self.date, self.end_date.or(self.date))
        };
        Ok(EventDraft {
            title: self.title,
            start_date,
            start_time: self.start,
            end_date,
            end_time: self.end,
            color: self.color,
            is_daily: self.daily,
            week_days,
            category: self.category,
            description: self.description,
        })
    }
}

impl ListArgs {
    fn filter(&self) -> EventFilter {
        let daily_only = match (self.daily, self.one_off) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        };
        EventFilter {
            category: self.category.clone(),
            date_from: self.from,
            date_to: self.to,
            daily_only,
        }
    }
}

impl UpdateArgs {
    fn patch(&self) -> Result<EventPatch> {
        let week_days = match &self.weekdays {
            Some(raw) => Some(Some(parse_weekdays(raw).context("Invalid --weekdays")?)),
            None if self.every_day => Some(None),
            None => None,
        };
        // Daily events carry no dates.
        let becomes_daily = self.daily == Some(true);
        let date_change = |date: Option<NaiveDate>| match date {
            Some(date) => Some(Some(date)),
            None if becomes_daily => Some(None),
            None => None,
        };
        Ok(EventPatch {
            title: self.title.clone(),
            start_date: date_change(self.date),
            start_time: self.start,
            end_date: date_change(self.end_date),
            end_time: self.end,
            color: self.color.clone(),
            is_daily: self.daily,
            week_days,
            category: clearable(&self.category, self.clear_category),
            description: clearable(&self.description, self.clear_description),
        })
    }
}

fn clearable(value: &Option<String>, clear: bool) -> Option<Option<String>> {
    match value {
        Some(value) => Some(Some(value.clone())),
        None if clear => Some(None),
        None => None,
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{}", json);
    Ok(())
}

fn schedule(event: &Event) -> String {
    let clock = format!(
        "{}-{}",
        event.start_time.format("%H:%M"),
        event.end_time.format("%H:%M")
    );
    if event.is_daily {
        match event.week_days.as_deref() {
            None | Some([]) => format!("daily {}", clock),
            Some(days) => format!("{} {}", weekday_names(days), clock),
        }
    } else {
        match (event.start_date, event.end_date) {
            (Some(start), Some(end)) if start == end => format!("{} {}", start, clock),
            (Some(start), Some(end)) => format!(
                "{} {} - {} {}",
                start,
                event.start_time.format("%H:%M"),
                end,
                event.end_time.format("%H:%M")
            ),
            _ => format!("undated {}", clock),
        }
    }
}

fn weekday_names(days: &[i32]) -> String {
    const NAMES: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];
    days.iter()
        .filter_map(|d| usize::try_from(*d).ok().and_then(|i| NAMES.get(i)))
        .copied()
        .collect::<Vec<_>>()
        .join(",")
}

fn print_event_row(event: &Event) {
    let category = event.category.as_deref().unwrap_or("-");
    println!(
        "{:<36}  {:<24}  {:<12}  {}",
        event.id,
        event.title,
        category,
        schedule(event)
    );
}

fn print_event_detail(event: &Event) {
    println!("id:          {}", event.id);
    println!("title:       {}", event.title);
    println!("schedule:    {}", schedule(event));
    println!("color:       {}", event.color);
    if let Some(category) = &event.category {
        println!("category:    {}", category);
    }
    if let Some(description) = &event.description {
        println!("description: {}", description);
    }
}

fn print_interval_row(interval: &OccupiedInterval) {
    let mut clock = format!(
        "{}-{}",
        interval.start.format("%H:%M"),
        interval.end.format("%H:%M")
    );
    let extra_days = (interval.end.date() - interval.start.date()).num_days();
    if extra_days > 0 {
        clock.push_str(&format!(" (+{}d)", extra_days));
    }
    println!("{}  {:<18}  {}", interval.date, clock, interval.title);
}

fn print_gap_row(gap: &TimeGap) {
    println!(
        "{}  {}-{}  {}",
        gap.date,
        gap.start_clock(),
        gap.end_clock(),
        gap_label(gap)
    );
}

fn print_report(report: &MetricsReport) {
    match (report.window.first(), report.window.last()) {
        (Some(first), Some(last)) => {
            println!("{} .. {} ({} days)", first, last, report.window.len())
        }
        _ => println!("Empty window"),
    }

    println!();
    println!("Time per category:");
    if report.category_minutes.is_empty() {
        println!("  (none)");
    }
    for (category, minutes) in &report.category_minutes {
        println!(
            "  {:<16}  {}",
            category,
            format_duration(u64::from(*minutes) * 60)
        );
    }

    println!();
    println!(
        "{:<10}  {:>5}  {:>9}  {:>9}  {:>4}",
        "date", "tasks", "occupied", "free", "gaps"
    );
    for (day, gaps) in report.occupation.iter().zip(&report.gaps_per_day) {
        println!(
            "{:<10}  {:>5}  {:>9}  {:>9}  {:>4}",
            day.date.to_string(),
            day.task_count,
            format_duration(u64::from(day.occupied_minutes) * 60),
            format_duration(gaps.free_seconds),
            gaps.gap_count
        );
    }

    println!();
    println!(
        "Total: {} tasks, {} occupied, {} free",
        report.total_tasks(),
        format_duration(u64::from(report.total_occupied_minutes()) * 60),
        format_duration(report.total_free_seconds())
    );
}

fn read_input(path: Option<&std::path::Path>) -> Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read file: {}", path.display())),
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}
