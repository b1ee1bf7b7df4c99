use std::str::FromStr;

use anyhow::anyhow;
use chrono::NaiveDate;
use serde::Serialize;

use crate::constraints::DateConstraints;
use crate::date::add_days;

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Serialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Key {
  Left,
  Right,
  Up,
  Down,
  Enter,
  Other
}

impl Key {
  /// DOM `KeyboardEvent.keyCode`.
  #[must_use]
  pub fn from_key_code(code: u32) -> Self {
    match code {
      | 13 => Self::Enter,
      | 37 => Self::Left,
      | 38 => Self::Up,
      | 39 => Self::Right,
      | 40 => Self::Down,
      | _ => Self::Other
    }
  }

  /// DOM `KeyboardEvent.key`.
  #[must_use]
  pub fn from_dom_key(key: &str) -> Self {
    match key {
      | "Enter" => Self::Enter,
      | "ArrowLeft" | "Left" => Self::Left,
      | "ArrowUp" | "Up" => Self::Up,
      | "ArrowRight" | "Right" => {
        Self::Right
      }
      | "ArrowDown" | "Down" => Self::Down,
      | _ => Self::Other
    }
  }

  #[must_use]
  pub fn is_arrow(self) -> bool {
    matches!(
      self,
      Self::Left
        | Self::Right
        | Self::Up
        | Self::Down
    )
  }

  /// Days the highlight moves in the
  /// days view.
  #[must_use]
  pub fn day_delta(self) -> Option<i64> {
    match self {
      | Self::Left => Some(-1),
      | Self::Right => Some(1),
      | Self::Up => Some(-7),
      | Self::Down => Some(7),
      | Self::Enter | Self::Other => None
    }
  }

  /// Years the highlight moves in the
  /// years view.
  #[must_use]
  pub fn year_delta(self) -> Option<i32> {
    match self {
      | Self::Left | Self::Up => Some(-1),
      | Self::Right | Self::Down => Some(1),
      | Self::Enter | Self::Other => None
    }
  }
}

impl FromStr for Key {
  type Err = anyhow::Error;

  fn from_str(
    s: &str
  ) -> Result<Self, Self::Err> {
    match s.trim().to_ascii_lowercase().as_str()
    {
      | "left" | "h" => Ok(Self::Left),
      | "right" | "l" => Ok(Self::Right),
      | "up" | "k" => Ok(Self::Up),
      | "down" | "j" => Ok(Self::Down),
      | "enter" | "return" => {
        Ok(Self::Enter)
      }
      | other => {
        Err(anyhow!("unknown key: {other}"))
      }
    }
  }
}

/// New highlighted date after `key`,
/// clamped into the selectable range.
#[must_use]
pub fn step_highlight(
  current: NaiveDate,
  key: Key,
  constraints: &DateConstraints
) -> Option<NaiveDate> {
  let delta = key.day_delta()?;
  Some(
    constraints
      .clamp(add_days(current, delta))
  )
}
