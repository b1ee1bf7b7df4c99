//! Windowing math for the month list.
//!
//! Every month is `rows * row_height`
//! pixels tall. [`MonthLayout`] keeps the
//! prefix offsets so that both directions
//! of the mapping (offset to month, date to
//! offset) are a binary search away.

use std::ops::Range;

use chrono::NaiveDate;
use serde::Serialize;

use crate::months::{
  Month,
  month_index_of
};

/// Pixel distance along the scroll axis.
pub type Px = u32;

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Serialize,
)]
pub struct VirtualWindow {
  /// First month to render.
  pub start:      usize,
  /// One past the last month to render.
  pub end:        usize,
  /// Height of the skipped months above
  /// `start`.
  pub top_pad:    Px,
  /// Height of the skipped months from
  /// `end` onwards.
  pub bottom_pad: Px
}

impl VirtualWindow {
  #[must_use]
  pub fn len(&self) -> usize {
    self.end.saturating_sub(self.start)
  }

  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.len() == 0
  }

  #[must_use]
  pub fn range(&self) -> Range<usize> {
    self.start..self.end
  }

  #[must_use]
  pub fn contains(
    &self,
    month_index: usize
  ) -> bool {
    self.range().contains(&month_index)
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthLayout {
  row_height: Px,
  /// `offsets[i]` is the top of month
  /// `i`; the final entry is the total
  /// height.
  offsets:    Vec<Px>,
  week_start: u32
}

impl MonthLayout {
  #[must_use]
  pub fn new(
    months: &[Month],
    row_height: Px,
    week_start: u32
  ) -> Self {
    let mut offsets =
      Vec::with_capacity(months.len() + 1);
    let mut acc: Px = 0;
    offsets.push(acc);
    for month in months {
      acc = acc.saturating_add(
        row_height.saturating_mul(
          month.row_count() as Px
        )
      );
      offsets.push(acc);
    }

    Self {
      row_height,
      offsets,
      week_start
    }
  }

  #[must_use]
  pub fn row_height(&self) -> Px {
    self.row_height
  }

  #[must_use]
  pub fn week_start(&self) -> u32 {
    self.week_start
  }

  #[must_use]
  pub fn month_count(&self) -> usize {
    self.offsets.len().saturating_sub(1)
  }

  #[must_use]
  pub fn total_height(&self) -> Px {
    self
      .offsets
      .last()
      .copied()
      .unwrap_or(0)
  }

  /// Largest offset a viewport of
  /// `viewport_height` can scroll to.
  #[must_use]
  pub fn max_offset(
    &self,
    viewport_height: Px
  ) -> Px {
    self
      .total_height()
      .saturating_sub(viewport_height)
  }

  #[must_use]
  pub fn month_top(
    &self,
    index: usize
  ) -> Px {
    let last = self.month_count();
    self.offsets[index.min(last)]
  }

  #[must_use]
  pub fn month_height(
    &self,
    index: usize
  ) -> Px {
    if index >= self.month_count() {
      return 0;
    }
    self.offsets[index + 1]
      - self.offsets[index]
  }

  /// Month whose vertical span holds
  /// `offset`; offsets past the end map to
  /// the last month.
  #[must_use]
  pub fn month_at(
    &self,
    offset: Px
  ) -> usize {
    let count = self.month_count();
    if count == 0 {
      return 0;
    }
    // First prefix offset strictly
    // greater than `offset`, minus one.
    let idx = self
      .offsets
      .partition_point(|&top| {
        top <= offset
      })
      .saturating_sub(1);
    idx.min(count - 1)
  }

  /// Months to mount for the given scroll
  /// position: the visible ones plus
  /// `overscan` on each side.
  #[must_use]
  pub fn window(
    &self,
    scroll_offset: Px,
    viewport_height: Px,
    overscan: usize
  ) -> VirtualWindow {
    let count = self.month_count();
    if count == 0 {
      return VirtualWindow {
        start:      0,
        end:        0,
        top_pad:    0,
        bottom_pad: 0
      };
    }

    let first_visible =
      self.month_at(scroll_offset);
    let bottom = scroll_offset
      .saturating_add(viewport_height);
    let mut last_visible = first_visible;
    while last_visible + 1 < count
      && self.offsets[last_visible + 1]
        < bottom
    {
      last_visible += 1;
    }

    let start =
      first_visible.saturating_sub(overscan);
    let end = (last_visible + 1)
      .saturating_add(overscan)
      .min(count);

    VirtualWindow {
      start,
      end,
      top_pad: self.offsets[start],
      bottom_pad: self.total_height()
        - self.offsets[end]
    }
  }

  /// Top of the month containing `date`.
  #[must_use]
  pub fn month_offset(
    &self,
    months: &[Month],
    date: NaiveDate
  ) -> Px {
    month_index_of(months, date)
      .map(|idx| self.month_top(idx))
      .unwrap_or(0)
  }

  /// Sum of the heights of every row
  /// strictly before the row containing
  /// `date`.
  #[must_use]
  pub fn date_offset(
    &self,
    months: &[Month],
    date: NaiveDate
  ) -> Px {
    let Some(idx) =
      month_index_of(months, date)
    else {
      return 0;
    };
    let month = &months[idx];
    let row = month
      .row_of(date)
      .unwrap_or_else(|| {
        match month.first_day() {
          | Some(first)
            if date < first.date =>
          {
            0
          }
          | _ => {
            month.row_count().saturating_sub(1)
          }
        }
      });

    self.month_top(idx).saturating_add(
      self
        .row_height
        .saturating_mul(row as Px)
    )
  }
}

#[cfg(test)]
mod tests {
  use chrono::NaiveDate;

  use super::*;
  use crate::months::build_months;

  fn ymd(
    y: i32,
    m: u32,
    d: u32
  ) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d)
      .expect("valid date")
  }

  fn year_2020() -> (Vec<Month>, MonthLayout)
  {
    let months = build_months(
      ymd(2020, 1, 1),
      ymd(2020, 12, 31),
      0
    );
    let layout =
      MonthLayout::new(&months, 56, 0);
    (months, layout)
  }

  #[test]
  fn offsets_accumulate_row_heights() {
    let (months, layout) = year_2020();
    let rows: usize = months
      .iter()
      .map(Month::row_count)
      .sum();
    assert_eq!(
      layout.total_height(),
      rows as Px * 56
    );
    // January 2020 starts on a Wednesday
    // and needs five rows.
    assert_eq!(layout.month_height(0), 5 * 56);
    assert_eq!(layout.month_top(1), 5 * 56);
  }

  #[test]
  fn window_covers_viewport_with_overscan() {
    let (_, layout) = year_2020();
    let viewport = 500;
    for offset in (0..layout
      .max_offset(viewport))
      .step_by(37)
    {
      let window =
        layout.window(offset, viewport, 0);
      assert!(
        window.top_pad <= offset,
        "gap above viewport at {offset}"
      );
      assert!(
        layout.total_height()
          - window.bottom_pad
          >= offset + viewport,
        "gap below viewport at {offset}"
      );

      let wide =
        layout.window(offset, viewport, 2);
      assert!(wide.start <= window.start);
      assert!(wide.end >= window.end);
    }
  }

  #[test]
  fn window_clamps_at_ends() {
    let (_, layout) = year_2020();
    let top = layout.window(0, 500, 4);
    assert_eq!(top.start, 0);
    assert_eq!(top.top_pad, 0);

    let past =
      layout.window(1_000_000, 500, 4);
    assert_eq!(past.end, 12);
    assert_eq!(past.bottom_pad, 0);
    assert_eq!(past.start, 7);
  }

  #[test]
  fn date_offset_sums_preceding_rows() {
    let (months, layout) = year_2020();
    let target = ymd(2020, 3, 15);
    let rows_before: usize = months[..2]
      .iter()
      .map(Month::row_count)
      .sum::<usize>()
      + 2;
    assert_eq!(
      layout.date_offset(&months, target),
      rows_before as Px * 56
    );
    assert_eq!(
      layout.month_offset(&months, target),
      layout.month_top(2)
    );
  }

  #[test]
  fn month_at_inverts_month_top() {
    let (_, layout) = year_2020();
    for idx in 0..layout.month_count() {
      assert_eq!(
        layout.month_at(layout.month_top(idx)),
        idx
      );
    }
  }
}
