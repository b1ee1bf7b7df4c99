//! Selected dates as a persistent value.
//!
//! Every transition returns a new
//! [`Selection`]; a selection handed to a
//! callback or held by the host never
//! changes underneath it.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::constraints::DateConstraints;
use crate::date::DayKey;

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Serialize,
)]
#[serde(rename_all = "snake_case")]
pub enum SelectionMode {
  Single,
  Multiple
}

impl SelectionMode {
  #[must_use]
  pub fn from_multi_date(
    multi_date: bool
  ) -> Self {
    if multi_date {
      Self::Multiple
    } else {
      Self::Single
    }
  }
}

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Serialize,
)]
#[serde(rename_all = "snake_case")]
pub enum DayState {
  Unselected,
  Selected,
  Fixed
}

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Serialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Toggle {
  Added,
  Removed,
  /// Fixed or disabled dates do not
  /// change state.
  Unchanged
}

#[derive(
  Debug,
  Clone,
  PartialEq,
  Eq,
  Default,
  Serialize,
)]
pub struct Selection {
  selected: BTreeMap<DayKey, NaiveDate>,
  fixed:    BTreeMap<DayKey, NaiveDate>
}

impl Selection {
  #[must_use]
  pub fn new() -> Self {
    Self::default()
  }

  /// Builds a selection from host input,
  /// clamping every date into the allowed
  /// range.
  #[must_use]
  pub fn from_dates<I, F>(
    selected: I,
    fixed: F,
    constraints: &DateConstraints
  ) -> Self
  where
    I: IntoIterator<Item = NaiveDate>,
    F: IntoIterator<Item = NaiveDate>
  {
    let clamp = |date: NaiveDate| {
      let date = constraints.clamp(date);
      (DayKey::of(date), date)
    };
    let fixed = fixed
      .into_iter()
      .map(clamp)
      .collect::<BTreeMap<_, _>>();
    let selected = selected
      .into_iter()
      .map(clamp)
      .filter(|(key, _)| {
        !fixed.contains_key(key)
      })
      .collect();

    Self { selected, fixed }
  }

  #[must_use]
  pub fn state(
    &self,
    date: NaiveDate
  ) -> DayState {
    let key = DayKey::of(date);
    if self.fixed.contains_key(&key) {
      DayState::Fixed
    } else if self
      .selected
      .contains_key(&key)
    {
      DayState::Selected
    } else {
      DayState::Unselected
    }
  }

  #[must_use]
  pub fn contains(
    &self,
    date: NaiveDate
  ) -> bool {
    self.state(date)
      != DayState::Unselected
  }

  #[must_use]
  pub fn is_fixed(
    &self,
    date: NaiveDate
  ) -> bool {
    self.state(date) == DayState::Fixed
  }

  #[must_use]
  pub fn len(&self) -> usize {
    self.selected.len() + self.fixed.len()
  }

  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  /// All dates in the set, fixed ones
  /// included, in date order.
  pub fn dates(
    &self
  ) -> impl Iterator<Item = NaiveDate> + '_
  {
    let mut merged = self
      .selected
      .iter()
      .chain(self.fixed.iter())
      .collect::<Vec<_>>();
    merged.sort_by_key(|(key, _)| **key);
    merged.into_iter().map(|(_, d)| *d)
  }

  /// Dates the user may remove.
  pub fn removable(
    &self
  ) -> impl Iterator<Item = NaiveDate> + '_
  {
    self.selected.values().copied()
  }

  #[must_use]
  pub fn first(
    &self
  ) -> Option<NaiveDate> {
    self.dates().next()
  }

  /// The user's own pick: the earliest
  /// removable date, else the earliest
  /// fixed one.
  #[must_use]
  pub fn primary(
    &self
  ) -> Option<NaiveDate> {
    self
      .removable()
      .next()
      .or_else(|| self.first())
  }

  /// The transition a select of `date`
  /// would perform, without performing
  /// it.
  #[must_use]
  pub fn preview(
    &self,
    date: NaiveDate,
    constraints: &DateConstraints
  ) -> Toggle {
    if constraints.is_disabled(date) {
      return Toggle::Unchanged;
    }
    match self.state(date) {
      | DayState::Fixed => {
        Toggle::Unchanged
      }
      | DayState::Selected => {
        Toggle::Removed
      }
      | DayState::Unselected => {
        Toggle::Added
      }
    }
  }

  /// Returns the selection after
  /// selecting `date`, and what happened.
  #[must_use]
  pub fn toggled(
    &self,
    date: NaiveDate,
    mode: SelectionMode,
    constraints: &DateConstraints
  ) -> (Self, Toggle) {
    let toggle =
      self.preview(date, constraints);
    let key = DayKey::of(date);
    let next = match toggle {
      | Toggle::Unchanged => self.clone(),
      | Toggle::Removed => {
        let mut selected =
          self.selected.clone();
        selected.remove(&key);
        Self {
          selected,
          fixed: self.fixed.clone()
        }
      }
      | Toggle::Added => {
        let mut selected = match mode {
          | SelectionMode::Multiple => {
            self.selected.clone()
          }
          | SelectionMode::Single => {
            BTreeMap::new()
          }
        };
        selected.insert(key, date);
        Self {
          selected,
          fixed: self.fixed.clone()
        }
      }
    };
    (next, toggle)
  }

  /// Re-clamps every date after the
  /// bounds changed.
  #[must_use]
  pub fn reclamped(
    &self,
    constraints: &DateConstraints
  ) -> Self {
    Self::from_dates(
      self.selected.values().copied(),
      self.fixed.values().copied(),
      constraints
    )
  }
}

#[cfg(test)]
mod tests {
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

  fn year_2020() -> DateConstraints {
    DateConstraints::new(
      ymd(2020, 1, 1),
      ymd(2020, 12, 31)
    )
  }

  #[test]
  fn double_toggle_restores_original() {
    let constraints = year_2020();
    let original = Selection::from_dates(
      [ymd(2020, 2, 2)],
      [],
      &constraints
    );
    let date = ymd(2020, 3, 15);

    let (once, first) = original.toggled(
      date,
      SelectionMode::Multiple,
      &constraints
    );
    assert_eq!(first, Toggle::Added);
    assert!(once.contains(date));
    assert!(!original.contains(date));

    let (twice, second) = once.toggled(
      date,
      SelectionMode::Multiple,
      &constraints
    );
    assert_eq!(second, Toggle::Removed);
    assert_eq!(twice, original);
  }

  #[test]
  fn single_mode_replaces_but_keeps_fixed() {
    let constraints = year_2020();
    let fixed = ymd(2020, 1, 10);
    let selection = Selection::from_dates(
      [ymd(2020, 2, 2)],
      [fixed],
      &constraints
    );
    let (next, _) = selection.toggled(
      ymd(2020, 4, 4),
      SelectionMode::Single,
      &constraints
    );
    assert_eq!(
      next.dates().collect::<Vec<_>>(),
      vec![fixed, ymd(2020, 4, 4)]
    );
  }

  #[test]
  fn fixed_dates_cannot_be_removed() {
    let constraints = year_2020();
    let fixed = ymd(2020, 5, 5);
    let selection = Selection::from_dates(
      [],
      [fixed],
      &constraints
    );
    let (next, toggle) = selection.toggled(
      fixed,
      SelectionMode::Multiple,
      &constraints
    );
    assert_eq!(toggle, Toggle::Unchanged);
    assert!(next.is_fixed(fixed));
  }

  #[test]
  fn disabled_dates_are_never_added() {
    let constraints = year_2020()
      .with_disabled_days([0, 6]);
    let saturday = ymd(2020, 3, 14);
    let selection = Selection::new();
    let (next, toggle) = selection.toggled(
      saturday,
      SelectionMode::Multiple,
      &constraints
    );
    assert_eq!(toggle, Toggle::Unchanged);
    assert_eq!(next, selection);
  }

  #[test]
  fn out_of_range_input_is_clamped() {
    let constraints = year_2020();
    let selection = Selection::from_dates(
      [ymd(2031, 1, 1), ymd(1999, 1, 1)],
      [],
      &constraints
    );
    assert_eq!(
      selection.dates().collect::<Vec<_>>(),
      vec![
        ymd(2020, 1, 1),
        ymd(2020, 12, 31)
      ]
    );
  }
}
