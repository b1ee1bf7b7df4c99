use std::cell::RefCell;
use std::collections::BTreeSet;
use std::io::Write;
use std::rc::Rc;

use chrono::NaiveDate;
use infical_core::calendar::{CalendarHooks, InfiniteCalendar, SelectOutcome};
use infical_core::config::CalendarConfig;
use infical_core::date::add_days;
use infical_core::selection::Toggle;

fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

fn year_2020(extra: &str) -> CalendarConfig {
    CalendarConfig::from_toml_str(&format!(
        "min = \"2020-01-01\"\nmax = \"2020-12-31\"\nselected_dates = []\n{extra}"
    ))
    .expect("parse config")
}

#[test]
fn select_then_deselect_in_single_mode() {
    let mut calendar = InfiniteCalendar::new(year_2020(""), ymd(2020, 6, 1));

    calendar.select_day(ymd(2020, 3, 15));
    assert_eq!(
        calendar.selection().dates().collect::<Vec<_>>(),
        vec![ymd(2020, 3, 15)]
    );

    calendar.select_day(ymd(2020, 3, 15));
    assert!(calendar.selection().is_empty());
}

#[test]
fn weekend_days_cannot_be_selected() {
    let mut calendar = InfiniteCalendar::new(
        year_2020("disabled_days = [0, 6]"),
        ymd(2020, 6, 1),
    );
    let before = calendar.selection().clone();

    // 2020-03-14 is a Saturday.
    assert_eq!(calendar.select_day(ymd(2020, 3, 14)), SelectOutcome::Ignored);
    assert_eq!(calendar.selection(), &before);
}

#[test]
fn fixed_dates_survive_toggles() {
    let mut calendar = InfiniteCalendar::new(
        year_2020("multi_date = true\nfixed_selected_dates = [\"2020-05-05\"]"),
        ymd(2020, 6, 1),
    );

    assert_eq!(calendar.select_day(ymd(2020, 5, 5)), SelectOutcome::Ignored);
    calendar.select_day(ymd(2020, 5, 6));
    calendar.select_day(ymd(2020, 5, 7));
    calendar.select_day(ymd(2020, 5, 6));

    assert_eq!(
        calendar.selection().dates().collect::<Vec<_>>(),
        vec![ymd(2020, 5, 5), ymd(2020, 5, 7)]
    );
}

#[test]
fn double_toggle_restores_any_multi_selection() {
    let seed = [ymd(2020, 2, 3), ymd(2020, 7, 9), ymd(2020, 11, 30)];
    let mut calendar = InfiniteCalendar::new(year_2020("multi_date = true"), ymd(2020, 6, 1));
    for date in seed {
        calendar.select_day(date);
    }
    let original = calendar.selection().clone();

    let mut date = ymd(2020, 1, 1);
    while date <= ymd(2020, 12, 31) {
        calendar.select_day(date);
        calendar.select_day(date);
        assert_eq!(calendar.selection(), &original, "toggling {date}");
        date = add_days(date, 13);
    }
}

#[test]
fn scroll_to_date_matches_row_sum() {
    let mut calendar = InfiniteCalendar::new(year_2020("row_height = 40"), ymd(2020, 1, 1));
    let target = ymd(2020, 6, 17);

    let rows_before: usize = calendar
        .months()
        .iter()
        .flat_map(|month| month.rows.iter())
        .filter(|row| row.last().is_some_and(|day| day.date < target))
        .count();

    calendar.scroll_to_date(target, 0);
    assert_eq!(calendar.current_offset(), rows_before as u32 * 40);
}

#[test]
fn scroll_burst_coalesces_into_one_scroll_end() {
    let ends = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&ends);
    let mut calendar = InfiniteCalendar::new(year_2020(""), ymd(2020, 1, 1)).with_hooks(
        CalendarHooks::default().on_scroll_end(move |offset| sink.borrow_mut().push(offset)),
    );

    let mut now = 0;
    for offset in [100, 180, 260, 300, 420] {
        calendar.on_scroll(offset, now);
        assert_eq!(calendar.poll_scroll_end(now), None);
        now += 30;
    }
    assert_eq!(calendar.poll_scroll_end(now + 50), None);
    assert_eq!(calendar.poll_scroll_end(120 + 150), Some(420));
    assert_eq!(calendar.poll_scroll_end(1_000), None);
    assert_eq!(*ends.borrow(), vec![420]);
}

#[test]
fn hooks_see_pending_then_committed_sets() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let (on, after) = (Rc::clone(&log), Rc::clone(&log));
    let mut calendar = InfiniteCalendar::new(year_2020("multi_date = true"), ymd(2020, 1, 1))
        .with_hooks(
            CalendarHooks::default()
                .on_select(move |event| {
                    on.borrow_mut()
                        .push(("on", event.toggle, event.selection.len()));
                })
                .after_select(move |event| {
                    after
                        .borrow_mut()
                        .push(("after", event.toggle, event.selection.len()));
                }),
        );

    calendar.select_day(ymd(2020, 4, 1));
    calendar.select_day(ymd(2020, 4, 1));

    assert_eq!(
        *log.borrow(),
        vec![
            ("on", Toggle::Added, 0),
            ("after", Toggle::Added, 1),
            ("on", Toggle::Removed, 1),
            ("after", Toggle::Removed, 0),
        ]
    );
}

#[test]
fn months_cover_range_once_from_config_file() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    writeln!(
        file,
        "min = \"2019-11-20\"\nmax = \"2020-02-10\"\n[locale]\nweek_starts_on = 1"
    )
    .expect("write config");

    let cfg = CalendarConfig::load_file(file.path()).expect("load config");
    let calendar = InfiniteCalendar::new(cfg, ymd(2020, 1, 1));

    let mut seen = BTreeSet::new();
    for month in calendar.months() {
        for row in &month.rows {
            for day in row {
                assert!(seen.insert(day.date), "duplicate {}", day.date);
            }
        }
    }
    assert_eq!(seen.len(), 83);
    assert_eq!(seen.first().copied(), Some(ymd(2019, 11, 20)));
    assert_eq!(seen.last().copied(), Some(ymd(2020, 2, 10)));
    assert_eq!(calendar.months().len(), 4);
}
