use anyhow::Context;
use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::calendar::{InfiniteCalendar, KeyAction, SelectOutcome};
use crate::cli::Command;
use crate::config::CalendarConfig;
use crate::date::parse_date_expr;
use crate::keyboard::Key;
use crate::render::Renderer;
use crate::selection::Toggle;

/// Synthetic clock step between replayed
/// events; longer than the scroll-end
/// debounce so every step settles.
const REPLAY_STEP_MS: u64 = 200;

#[derive(Debug, Serialize)]
struct SelectionReport {
    selected: Vec<NaiveDate>,
    fixed: Vec<NaiveDate>,
    steps: Vec<SelectStep>,
}

#[derive(Debug, Serialize)]
struct SelectStep {
    date: NaiveDate,
    outcome: SelectOutcome,
}

#[instrument(skip(cfg, renderer))]
pub fn dispatch(
    cfg: CalendarConfig,
    today: NaiveDate,
    renderer: &Renderer,
    command: Command,
) -> anyhow::Result<()> {
    debug!(?command, "dispatching command");
    let mut calendar = InfiniteCalendar::new(cfg, today);

    match command {
        Command::Months => cmd_months(&calendar, renderer),
        Command::Show { at, offset } => cmd_show(&mut calendar, renderer, at, offset),
        Command::Select { dates, json } => cmd_select(&mut calendar, &dates, json),
        Command::Offset { date } => cmd_offset(&calendar, &date),
        Command::Keys { keys } => cmd_keys(&mut calendar, &keys),
    }
}

fn parse_arg_date(calendar: &InfiniteCalendar, raw: &str) -> anyhow::Result<NaiveDate> {
    parse_date_expr(raw, calendar.today()).with_context(|| format!("invalid date argument: {raw}"))
}

fn cmd_months(calendar: &InfiniteCalendar, renderer: &Renderer) -> anyhow::Result<()> {
    info!("command months");
    let layout = calendar.layout();
    let locale = &calendar.config().locale;

    let rows = calendar
        .months()
        .iter()
        .enumerate()
        .map(|(idx, month)| {
            vec![
                idx.to_string(),
                format!("{} {}", locale.month_name(month.month), month.year),
                month.row_count().to_string(),
                month.day_count().to_string(),
                layout.month_top(idx).to_string(),
                layout.month_height(idx).to_string(),
            ]
        })
        .collect();

    renderer.print_table(&["#", "month", "rows", "days", "offset", "height"], rows)
}

fn cmd_show(
    calendar: &mut InfiniteCalendar,
    renderer: &Renderer,
    at: Option<String>,
    offset: Option<u32>,
) -> anyhow::Result<()> {
    info!("command show");
    if let Some(raw) = at {
        let date = parse_arg_date(calendar, &raw)?;
        calendar.scroll_to_date(date, 0);
    } else if let Some(px) = offset {
        calendar.scroll_to(px);
    }
    // Settle the indicator state the way a
    // real scroll would.
    let current = calendar.current_offset();
    calendar.on_scroll(current, 0);
    calendar.poll_scroll_end(REPLAY_STEP_MS);

    renderer.print_window(calendar)
}

fn cmd_select(calendar: &mut InfiniteCalendar, dates: &[String], json: bool) -> anyhow::Result<()> {
    info!(count = dates.len(), "command select");
    let mut steps = Vec::with_capacity(dates.len());
    for raw in dates {
        let date = parse_arg_date(calendar, raw)?;
        let outcome = calendar.select_day(date);
        steps.push(SelectStep { date, outcome });
    }

    let selection = calendar.selection();
    let report = SelectionReport {
        selected: selection.removable().collect(),
        fixed: selection
            .dates()
            .filter(|d| selection.is_fixed(*d))
            .collect(),
        steps,
    };

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("failed to encode selection")?
        );
        return Ok(());
    }

    for step in &report.steps {
        println!("{}  {}", step.date, describe_outcome(step.outcome));
    }
    let all = selection.dates().map(|d| d.to_string()).collect::<Vec<_>>();
    if all.is_empty() {
        println!("selected: (none)");
    } else {
        println!("selected: {}", all.join(" "));
    }
    Ok(())
}

fn describe_outcome(outcome: SelectOutcome) -> &'static str {
    match outcome {
        SelectOutcome::Committed(Toggle::Added) => "added",
        SelectOutcome::Committed(Toggle::Removed) => "removed",
        SelectOutcome::Committed(Toggle::Unchanged) => "unchanged",
        SelectOutcome::Vetoed => "vetoed",
        SelectOutcome::Ignored => "ignored",
    }
}

fn cmd_offset(calendar: &InfiniteCalendar, raw: &str) -> anyhow::Result<()> {
    info!("command offset");
    let date = parse_arg_date(calendar, raw)?;
    println!(
        "{date}  row {}  month {}",
        calendar.date_offset(date),
        calendar.month_offset(date)
    );
    Ok(())
}

fn cmd_keys(calendar: &mut InfiniteCalendar, keys: &[Key]) -> anyhow::Result<()> {
    info!(count = keys.len(), "command keys");
    let mut now = 0_u64;

    for key in keys {
        now += REPLAY_STEP_MS;
        let outcome = calendar.handle_key(*key);
        let detail = match outcome.action {
            KeyAction::None => "no-op".to_string(),
            KeyAction::Highlight { date, .. } => format!("highlight {date}"),
            KeyAction::CoarseScroll { date, .. } => {
                // The list moved; the scroll event it
                // triggers lands the highlight.
                let update = calendar.on_scroll(calendar.current_offset(), now);
                if let Some(px) = update.follow_up {
                    calendar.on_scroll(px, now);
                }
                format!("highlight {date} (two-step)")
            }
            KeyAction::Select { date, outcome } => {
                format!("select {date}: {}", describe_outcome(outcome))
            }
            KeyAction::YearHighlight(year) => format!("year {year}"),
            KeyAction::YearSelect { year, outcome } => {
                format!("select year {year}: {}", describe_outcome(outcome))
            }
        };
        calendar.poll_scroll_end(now + REPLAY_STEP_MS);

        let highlighted = calendar
            .highlighted()
            .map(|d| d.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<6} {detail:<32} highlighted {highlighted}  offset {}",
            format!("{key:?}").to_ascii_lowercase(),
            calendar.current_offset()
        );
    }

    let selected = calendar
        .selection()
        .dates()
        .map(|d| d.to_string())
        .collect::<Vec<_>>();
    println!("selected: {}", selected.join(" "));
    Ok(())
}
