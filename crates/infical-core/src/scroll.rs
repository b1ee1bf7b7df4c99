use serde::Serialize;

use crate::virtualize::Px;

/// Scroll delta (px per event) at which
/// the month overlay appears.
pub const OVERLAY_SPEED_THRESHOLD: i64 =
  50;

/// Events further apart than this start a
/// new speed measurement.
pub const SPEED_RESET_MS: u64 = 50;

/// Space the floating today helper covers
/// at the top of the list.
pub const TODAY_HELPER_NAV_OFFSET: Px =
  36;

/// Measures scroll speed as the distance
/// travelled since the previous event.
#[derive(Debug, Clone, Default)]
pub struct ScrollSpeed {
  last: Option<(Px, u64)>
}

impl ScrollSpeed {
  #[must_use]
  pub fn new() -> Self {
    Self::default()
  }

  pub fn sample(
    &mut self,
    offset: Px,
    now_ms: u64
  ) -> i64 {
    let delta = match self.last {
      | Some((prev, at))
        if now_ms.saturating_sub(at)
          <= SPEED_RESET_MS =>
      {
        offset as i64 - prev as i64
      }
      | _ => 0
    };
    self.last = Some((offset, now_ms));
    delta
  }

  pub fn reset(&mut self) {
    self.last = None;
  }
}

/// Where "today" sits relative to the
/// viewport.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Default,
  Serialize,
)]
#[serde(rename_all = "snake_case")]
pub enum TodayPosition {
  #[default]
  Hidden,
  /// Scrolled past: today is above the
  /// fold.
  Above,
  /// Today is below the fold.
  Below
}

impl TodayPosition {
  #[must_use]
  pub fn is_shown(self) -> bool {
    self != Self::Hidden
  }
}

#[derive(Debug, Clone, Copy)]
pub struct TodayHelperPolicy {
  pub row_height:      Px,
  pub viewport_height: Px,
  /// Rows of slack before the helper
  /// appears.
  pub row_offset:      u32
}

impl TodayHelperPolicy {
  /// Next helper state, or `None` when it
  /// should stay as it is.
  ///
  /// `today_row_offset` is the offset of
  /// the row holding today.
  #[must_use]
  pub fn next(
    &self,
    current: TodayPosition,
    scroll_offset: Px,
    today_row_offset: Px,
    speed: i64
  ) -> Option<TodayPosition> {
    if scroll_offset == 0 {
      return (current
        != TodayPosition::Hidden)
        .then_some(TodayPosition::Hidden);
    }

    let margin = self
      .row_height
      .saturating_mul(self.row_offset + 1)
      as i64;
    let scroll = scroll_offset as i64;
    let today = today_row_offset as i64;
    let row = self.row_height as i64;
    let height =
      self.viewport_height as i64;

    let next = if scroll >= today + margin
    {
      TodayPosition::Above
    } else if scroll + height
      <= today + row - margin
    {
      TodayPosition::Below
    } else if current.is_shown()
      && speed.abs() <= 1
    {
      TodayPosition::Hidden
    } else {
      return None;
    };

    (next != current).then_some(next)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn policy() -> TodayHelperPolicy {
    TodayHelperPolicy {
      row_height:      56,
      viewport_height: 500,
      row_offset:      4
    }
  }

  #[test]
  fn speed_resets_after_pause() {
    let mut speed = ScrollSpeed::new();
    assert_eq!(speed.sample(100, 0), 0);
    assert_eq!(speed.sample(180, 16), 80);
    assert_eq!(speed.sample(170, 32), -10);
    assert_eq!(speed.sample(400, 500), 0);
  }

  #[test]
  fn today_above_when_scrolled_past() {
    let today = 10_000;
    // Margin is 5 rows.
    assert_eq!(
      policy().next(
        TodayPosition::Hidden,
        today + 5 * 56,
        today,
        0
      ),
      Some(TodayPosition::Above)
    );
    assert_eq!(
      policy().next(
        TodayPosition::Above,
        today + 5 * 56,
        today,
        0
      ),
      None
    );
  }

  #[test]
  fn today_below_when_far_ahead() {
    let today = 10_000;
    let scroll = today + 56 - 5 * 56 - 500;
    assert_eq!(
      policy().next(
        TodayPosition::Hidden,
        scroll,
        today,
        30
      ),
      Some(TodayPosition::Below)
    );
  }

  #[test]
  fn hides_when_in_view_and_idle() {
    let today = 10_000;
    assert_eq!(
      policy().next(
        TodayPosition::Below,
        today - 100,
        today,
        20
      ),
      None
    );
    assert_eq!(
      policy().next(
        TodayPosition::Below,
        today - 100,
        today,
        0
      ),
      Some(TodayPosition::Hidden)
    );
  }

  #[test]
  fn top_of_list_always_hides() {
    assert_eq!(
      policy().next(
        TodayPosition::Below,
        0,
        100_000,
        0
      ),
      Some(TodayPosition::Hidden)
    );
  }
}
