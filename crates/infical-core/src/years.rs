use chrono::{
  Datelike,
  NaiveDate
};

use crate::constraints::DateConstraints;
use crate::date::with_year;

/// The year picker shown in
/// [`DisplayMode::Years`](crate::config::DisplayMode::Years).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YearsView {
  first: i32,
  last:  i32
}

impl YearsView {
  #[must_use]
  pub fn new(
    min: NaiveDate,
    max: NaiveDate
  ) -> Self {
    let (a, b) = (min.year(), max.year());
    Self {
      first: a.min(b),
      last:  a.max(b)
    }
  }

  pub fn years(
    &self
  ) -> impl Iterator<Item = i32> {
    self.first..=self.last
  }

  #[must_use]
  pub fn len(&self) -> usize {
    (self.last - self.first + 1) as usize
  }

  #[must_use]
  pub fn is_empty(&self) -> bool {
    false
  }

  #[must_use]
  pub fn contains(&self, year: i32) -> bool {
    (self.first..=self.last).contains(&year)
  }

  #[must_use]
  pub fn step(
    &self,
    year: i32,
    delta: i32
  ) -> i32 {
    year
      .saturating_add(delta)
      .clamp(self.first, self.last)
  }

  /// Date picked when `year` is chosen:
  /// the reference day moved into that
  /// year and clamped into range.
  #[must_use]
  pub fn pick_date(
    &self,
    year: i32,
    reference: NaiveDate,
    constraints: &DateConstraints
  ) -> NaiveDate {
    constraints.clamp(with_year(
      reference,
      year.clamp(self.first, self.last)
    ))
  }

  /// Whether any day of `year` can be
  /// selected.
  #[must_use]
  pub fn is_selectable(
    &self,
    year: i32,
    constraints: &DateConstraints
  ) -> bool {
    constraints.min_date.year() <= year
      && year <= constraints.max_date.year()
  }
}
