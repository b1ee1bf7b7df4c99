use chrono::{
  Datelike,
  NaiveDate
};
use serde::Serialize;
use tracing::{
  debug,
  warn
};

use crate::date::{
  DayKey,
  add_days,
  first_day_of_month,
  last_day_of_month,
  weekday_index
};

/// One rendered calendar day.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Serialize,
)]
pub struct Day {
  pub date:    NaiveDate,
  pub key:     DayKey,
  /// 0 = Sunday .. 6 = Saturday.
  pub weekday: u32
}

impl Day {
  #[must_use]
  pub fn new(date: NaiveDate) -> Self {
    Self {
      date,
      key: DayKey::of(date),
      weekday: weekday_index(date)
    }
  }
}

pub type Week = Vec<Day>;

#[derive(
  Debug, Clone, PartialEq, Eq, Serialize,
)]
pub struct Month {
  pub year:  i32,
  pub month: u32,
  pub rows:  Vec<Week>
}

impl Month {
  #[must_use]
  pub fn first_day(&self) -> Option<Day> {
    self
      .rows
      .first()
      .and_then(|row| row.first())
      .copied()
  }

  #[must_use]
  pub fn last_day(&self) -> Option<Day> {
    self
      .rows
      .last()
      .and_then(|row| row.last())
      .copied()
  }

  /// The first row starts on the 1st of
  /// the month (it is not clipped by the
  /// min bound).
  #[must_use]
  pub fn starts_on_first(&self) -> bool {
    self
      .first_day()
      .is_some_and(|day| day.date.day() == 1)
  }

  #[must_use]
  pub fn partial_first_row(
    &self
  ) -> bool {
    self
      .rows
      .first()
      .is_some_and(|row| row.len() != 7)
  }

  #[must_use]
  pub fn row_count(&self) -> usize {
    self.rows.len()
  }

  #[must_use]
  pub fn day_count(&self) -> usize {
    self.rows.iter().map(Vec::len).sum()
  }

  #[must_use]
  pub fn contains(
    &self,
    date: NaiveDate
  ) -> bool {
    match (self.first_day(), self.last_day())
    {
      | (Some(first), Some(last)) => {
        first.date <= date
          && date <= last.date
      }
      | _ => false
    }
  }

  /// Index of the row holding `date`, if
  /// the month contains it.
  #[must_use]
  pub fn row_of(
    &self,
    date: NaiveDate
  ) -> Option<usize> {
    let key = DayKey::of(date);
    self.rows.iter().position(|row| {
      row
        .first()
        .zip(row.last())
        .is_some_and(|(a, b)| {
          a.key <= key && key <= b.key
        })
    })
  }

  #[must_use]
  pub fn display_date(
    &self
  ) -> NaiveDate {
    first_day_of_month(
      self.year, self.month
    )
  }
}

/// Builds every month touched by
/// `[min, max]`, clipped to the bounds.
///
/// Rows break before each
/// `week_start` weekday (0 = Sunday), so
/// the first and last rows of a month may
/// hold fewer than seven days.
#[tracing::instrument]
pub fn build_months(
  min: NaiveDate,
  max: NaiveDate,
  week_start: u32
) -> Vec<Month> {
  let (min, max) = if min > max {
    warn!(
      %min,
      %max,
      "min bound after max bound; \
       swapping"
    );
    (max, min)
  } else {
    (min, max)
  };
  let week_start = week_start % 7;

  let mut months = Vec::new();
  let mut year = min.year();
  let mut month = min.month();

  loop {
    let start = first_day_of_month(
      year, month
    )
    .max(min);
    let end = last_day_of_month(
      year, month
    )
    .min(max);

    months.push(Month {
      year,
      month,
      rows: build_rows(
        start, end, week_start
      )
    });

    if year == max.year()
      && month == max.month()
    {
      break;
    }
    if month == 12 {
      year += 1;
      month = 1;
    } else {
      month += 1;
    }
  }

  debug!(
    months = months.len(),
    "built month list"
  );
  months
}

fn build_rows(
  start: NaiveDate,
  end: NaiveDate,
  week_start: u32
) -> Vec<Week> {
  let mut rows: Vec<Week> = Vec::new();
  let mut current: Week =
    Vec::with_capacity(7);
  let mut date = start;

  while date <= end {
    let day = Day::new(date);
    if day.weekday == week_start
      && !current.is_empty()
    {
      rows.push(std::mem::replace(
        &mut current,
        Vec::with_capacity(7)
      ));
    }
    current.push(day);

    let next = add_days(date, 1);
    if next == date {
      break;
    }
    date = next;
  }

  if !current.is_empty() {
    rows.push(current);
  }
  rows
}

/// Index of the month containing `date`,
/// clamped to the ends of the list.
#[must_use]
pub fn month_index_of(
  months: &[Month],
  date: NaiveDate
) -> Option<usize> {
  if months.is_empty() {
    return None;
  }
  let target = (date.year(), date.month());
  let idx = months
    .partition_point(|m| {
      (m.year, m.month) < target
    })
    .min(months.len() - 1);
  Some(idx)
}

#[cfg(test)]
mod tests {
  use std::collections::BTreeSet;

  use chrono::NaiveDate;

  use super::*;

  fn ymd(
    y: i32,
    m: u32,
    d: u32
  ) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d)
      .expect("valid date")
  }

  fn assert_covers(
    min: NaiveDate,
    max: NaiveDate,
    week_start: u32
  ) {
    let months =
      build_months(min, max, week_start);
    let days = months
      .iter()
      .flat_map(|m| m.rows.iter())
      .flatten()
      .map(|d| d.date)
      .collect::<Vec<_>>();

    let expected =
      (max - min).num_days() as usize + 1;
    assert_eq!(days.len(), expected);
    assert_eq!(days.first(), Some(&min));
    assert_eq!(days.last(), Some(&max));
    assert!(
      days
        .windows(2)
        .all(|w| add_days(w[0], 1) == w[1])
    );
    let unique =
      days.iter().collect::<BTreeSet<_>>();
    assert_eq!(unique.len(), days.len());
  }

  #[test]
  fn covers_full_year_exactly_once() {
    assert_covers(
      ymd(2020, 1, 1),
      ymd(2020, 12, 31),
      0
    );
  }

  #[test]
  fn covers_clipped_bounds() {
    assert_covers(
      ymd(2019, 11, 17),
      ymd(2021, 2, 3),
      1
    );
    assert_covers(
      ymd(2024, 2, 29),
      ymd(2024, 2, 29),
      0
    );
  }

  #[test]
  fn rows_break_on_week_start() {
    let months = build_months(
      ymd(2020, 3, 1),
      ymd(2020, 3, 31),
      0
    );
    assert_eq!(months.len(), 1);
    let march = &months[0];
    // Sunday 1st .. Tuesday 31st.
    assert_eq!(march.row_count(), 5);
    assert!(march.starts_on_first());
    assert!(!march.partial_first_row());
    assert_eq!(
      march.rows.last().map(Vec::len),
      Some(3)
    );
    assert!(
      march
        .rows
        .iter()
        .skip(1)
        .all(|row| row[0].weekday == 0)
    );
  }

  #[test]
  fn clipped_first_month_is_partial() {
    let months = build_months(
      ymd(2020, 3, 18),
      ymd(2020, 4, 30),
      0
    );
    assert_eq!(months.len(), 2);
    assert!(!months[0].starts_on_first());
    assert_eq!(
      months[0].rows[0].len(),
      4
    );
    assert_eq!(
      months[0].row_of(ymd(2020, 3, 22)),
      Some(1)
    );
    assert_eq!(
      months[0].row_of(ymd(2020, 3, 1)),
      None
    );
  }

  #[test]
  fn swapped_bounds_are_reordered() {
    let months = build_months(
      ymd(2020, 2, 1),
      ymd(2020, 1, 1),
      0
    );
    assert_eq!(months.len(), 2);
    assert_eq!(months[0].month, 1);
  }

  #[test]
  fn month_index_clamps() {
    let months = build_months(
      ymd(2020, 1, 1),
      ymd(2020, 6, 30),
      0
    );
    assert_eq!(
      month_index_of(
        &months,
        ymd(2020, 4, 9)
      ),
      Some(3)
    );
    assert_eq!(
      month_index_of(
        &months,
        ymd(2019, 4, 9)
      ),
      Some(0)
    );
    assert_eq!(
      month_index_of(
        &months,
        ymd(2030, 1, 1)
      ),
      Some(5)
    );
  }
}
