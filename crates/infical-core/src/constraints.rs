use std::collections::BTreeSet;

use chrono::NaiveDate;

use crate::date::{
  DayKey,
  clamp_date,
  weekday_index
};

/// Which days the user may pick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateConstraints {
  pub min_date:       NaiveDate,
  pub max_date:       NaiveDate,
  /// Weekday indexes, 0 = Sunday.
  pub disabled_days:  BTreeSet<u32>,
  pub disabled_dates: BTreeSet<DayKey>
}

impl DateConstraints {
  #[must_use]
  pub fn new(
    min_date: NaiveDate,
    max_date: NaiveDate
  ) -> Self {
    let (min_date, max_date) =
      if min_date > max_date {
        (max_date, min_date)
      } else {
        (min_date, max_date)
      };
    Self {
      min_date,
      max_date,
      disabled_days: BTreeSet::new(),
      disabled_dates: BTreeSet::new()
    }
  }

  #[must_use]
  pub fn with_disabled_days<I>(
    mut self,
    days: I
  ) -> Self
  where
    I: IntoIterator<Item = u32>
  {
    self.disabled_days = days
      .into_iter()
      .map(|d| d % 7)
      .collect();
    self
  }

  /// Dates outside `[min_date,
  /// max_date]` are dropped: the range
  /// check already disables them.
  #[must_use]
  pub fn with_disabled_dates<I>(
    mut self,
    dates: I
  ) -> Self
  where
    I: IntoIterator<Item = NaiveDate>
  {
    self.disabled_dates = dates
      .into_iter()
      .filter(|d| self.in_range(*d))
      .map(DayKey::of)
      .collect();
    self
  }

  #[must_use]
  pub fn in_range(
    &self,
    date: NaiveDate
  ) -> bool {
    self.min_date <= date
      && date <= self.max_date
  }

  #[must_use]
  pub fn is_disabled(
    &self,
    date: NaiveDate
  ) -> bool {
    !self.in_range(date)
      || self
        .disabled_days
        .contains(&weekday_index(date))
      || self
        .disabled_dates
        .contains(&DayKey::of(date))
  }

  #[must_use]
  pub fn clamp(
    &self,
    date: NaiveDate
  ) -> NaiveDate {
    clamp_date(
      date,
      self.min_date,
      self.max_date
    )
  }
}

#[cfg(test)]
mod tests {
  use chrono::NaiveDate;

  use super::DateConstraints;

  fn ymd(
    y: i32,
    m: u32,
    d: u32
  ) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d)
      .expect("valid date")
  }

  #[test]
  fn disables_out_of_range_weekends_and_listed()
  {
    let constraints = DateConstraints::new(
      ymd(2020, 1, 1),
      ymd(2020, 12, 31)
    )
    .with_disabled_days([0, 6])
    .with_disabled_dates([
      ymd(2020, 3, 17),
      ymd(2019, 5, 5),
    ]);

    assert!(
      constraints
        .is_disabled(ymd(2019, 12, 31))
    );
    assert!(
      constraints
        .is_disabled(ymd(2020, 3, 14))
    );
    assert!(
      constraints
        .is_disabled(ymd(2020, 3, 17))
    );
    assert!(
      !constraints
        .is_disabled(ymd(2020, 3, 16))
    );
    assert_eq!(
      constraints.disabled_dates.len(),
      1
    );
  }

  #[test]
  fn clamps_into_range() {
    let constraints = DateConstraints::new(
      ymd(2020, 1, 1),
      ymd(2020, 12, 31)
    );
    assert_eq!(
      constraints.clamp(ymd(2021, 6, 1)),
      ymd(2020, 12, 31)
    );
    assert_eq!(
      constraints.clamp(ymd(2019, 6, 1)),
      ymd(2020, 1, 1)
    );
  }
}
