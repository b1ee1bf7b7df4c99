use std::fmt::Write;

use chrono::format::{
  Item,
  StrftimeItems
};
use chrono::{
  Datelike,
  NaiveDate
};
use serde::{
  Deserialize,
  Serialize
};

/// Names and labels used by the widget.
///
/// Passed explicitly to whatever formats
/// dates; nothing here is global.
#[derive(
  Debug,
  Clone,
  PartialEq,
  Serialize,
  Deserialize,
)]
#[serde(default)]
pub struct Locale {
  pub name:           String,
  /// Header text when nothing is
  /// selected.
  pub blank:          String,
  /// strftime pattern; `%a`, `%A`,
  /// `%b`, `%B` use the names below and
  /// `%o` is the day with an ordinal
  /// suffix.
  pub header_format:  String,
  pub today_label:    TodayLabel,
  /// Short weekday names, Sunday first.
  pub weekdays:       Vec<String>,
  pub weekdays_long:  Vec<String>,
  pub months:         Vec<String>,
  pub months_short:   Vec<String>,
  /// 0 = Sunday.
  pub week_starts_on: u32
}

#[derive(
  Debug,
  Clone,
  PartialEq,
  Serialize,
  Deserialize,
)]
#[serde(default)]
pub struct TodayLabel {
  pub long:  String,
  pub short: Option<String>
}

impl Default for TodayLabel {
  fn default() -> Self {
    Self {
      long:  "Today".to_string(),
      short: None
    }
  }
}

const DEFAULT_HEADER_FORMAT: &str =
  "%a, %b %o";

fn owned(names: &[&str]) -> Vec<String> {
  names
    .iter()
    .map(|s| (*s).to_string())
    .collect()
}

impl Default for Locale {
  fn default() -> Self {
    Self {
      name:           "en".to_string(),
      blank:          "Select a date..."
        .to_string(),
      header_format:  DEFAULT_HEADER_FORMAT
        .to_string(),
      today_label:    TodayLabel::default(),
      weekdays:       owned(&[
        "Sun", "Mon", "Tue", "Wed", "Thu",
        "Fri", "Sat"
      ]),
      weekdays_long:  owned(&[
        "Sunday",
        "Monday",
        "Tuesday",
        "Wednesday",
        "Thursday",
        "Friday",
        "Saturday"
      ]),
      months:         owned(&[
        "January",
        "February",
        "March",
        "April",
        "May",
        "June",
        "July",
        "August",
        "September",
        "October",
        "November",
        "December"
      ]),
      months_short:   owned(&[
        "Jan", "Feb", "Mar", "Apr", "May",
        "Jun", "Jul", "Aug", "Sep", "Oct",
        "Nov", "Dec"
      ]),
      week_starts_on: 0
    }
  }
}

fn pick<'a>(
  names: &'a [String],
  index: usize,
  fallback: &'a [String]
) -> &'a str {
  names
    .get(index)
    .or_else(|| fallback.get(index))
    .map(String::as_str)
    .unwrap_or("")
}

impl Locale {
  /// Fills any name list of the wrong
  /// length from the English defaults.
  #[must_use]
  pub fn sanitized(mut self) -> Self {
    let defaults = Self::default();
    if self.weekdays.len() != 7 {
      tracing::warn!(
        locale = %self.name,
        len = self.weekdays.len(),
        "weekday names must have 7 \
         entries; using defaults"
      );
      self.weekdays = defaults.weekdays;
    }
    if self.weekdays_long.len() != 7 {
      self.weekdays_long =
        defaults.weekdays_long;
    }
    if self.months.len() != 12 {
      tracing::warn!(
        locale = %self.name,
        len = self.months.len(),
        "month names must have 12 \
         entries; using defaults"
      );
      self.months = defaults.months;
    }
    if self.months_short.len() != 12 {
      self.months_short =
        defaults.months_short;
    }
    self.week_starts_on %= 7;
    let sample = NaiveDate::default();
    if self
      .try_format(sample, &self.header_format)
      .is_none()
    {
      tracing::warn!(
        locale = %self.name,
        pattern = %self.header_format,
        "header format cannot render a \
         date; using default"
      );
      self.header_format =
        DEFAULT_HEADER_FORMAT.to_string();
    }
    self
  }

  #[must_use]
  pub fn month_name(
    &self,
    month: u32
  ) -> &str {
    pick(
      &self.months,
      month.saturating_sub(1) as usize,
      &[]
    )
  }

  #[must_use]
  pub fn month_short(
    &self,
    month: u32
  ) -> &str {
    pick(
      &self.months_short,
      month.saturating_sub(1) as usize,
      &self.months
    )
  }

  #[must_use]
  pub fn weekday_short(
    &self,
    index: u32
  ) -> &str {
    pick(
      &self.weekdays,
      (index % 7) as usize,
      &[]
    )
  }

  /// Header labels in display order.
  #[must_use]
  pub fn weekday_labels(&self) -> Vec<&str> {
    (0..7)
      .map(|i| {
        self.weekday_short(
          self.week_starts_on + i
        )
      })
      .collect()
  }

  #[must_use]
  pub fn today_short(&self) -> &str {
    self
      .today_label
      .short
      .as_deref()
      .filter(|s| !s.is_empty())
      .unwrap_or(&self.today_label.long)
  }

  /// Label of the fast-scroll month
  /// overlay; the year is shown only
  /// outside the current year.
  #[must_use]
  pub fn overlay_label(
    &self,
    year: i32,
    month: u32,
    current_year: i32
  ) -> String {
    let name = self.month_name(month);
    if year == current_year {
      name.to_string()
    } else {
      format!("{name} {year}")
    }
  }

  #[must_use]
  pub fn format_header(
    &self,
    date: NaiveDate
  ) -> String {
    self.format(date, &self.header_format)
  }

  /// strftime with locale names. Patterns
  /// a plain date cannot render fall back
  /// to the default header format.
  #[must_use]
  pub fn format(
    &self,
    date: NaiveDate,
    pattern: &str
  ) -> String {
    if let Some(text) =
      self.try_format(date, pattern)
    {
      return text;
    }
    tracing::warn!(
      pattern,
      "date format failed; using default"
    );
    self
      .try_format(date, DEFAULT_HEADER_FORMAT)
      .unwrap_or_else(|| date.to_string())
  }

  /// `None` when `pattern` has an invalid
  /// specifier or one that needs a time of
  /// day.
  #[must_use]
  pub fn try_format(
    &self,
    date: NaiveDate,
    pattern: &str
  ) -> Option<String> {
    let rewritten =
      self.expand_names(date, pattern);
    let items = StrftimeItems::new(&rewritten)
      .collect::<Vec<_>>();
    if items
      .iter()
      .any(|item| matches!(item, Item::Error))
    {
      return None;
    }
    let mut out = String::new();
    write!(
      out,
      "{}",
      date.format_with_items(items.iter())
    )
    .ok()?;
    Some(out)
  }

  fn expand_names(
    &self,
    date: NaiveDate,
    pattern: &str
  ) -> String {
    let weekday = date
      .weekday()
      .num_days_from_sunday()
      as usize;
    let month0 = date.month0() as usize;

    let mut rewritten =
      String::with_capacity(pattern.len());
    let mut chars = pattern.chars();
    while let Some(ch) = chars.next() {
      if ch != '%' {
        rewritten.push(ch);
        continue;
      }
      let Some(spec) = chars.next() else {
        rewritten.push_str("%%");
        break;
      };
      let literal = match spec {
        | 'a' => {
          Some(
            pick(&self.weekdays, weekday, &[])
              .to_string()
          )
        }
        | 'A' => {
          Some(
            pick(
              &self.weekdays_long,
              weekday,
              &self.weekdays
            )
            .to_string()
          )
        }
        | 'b' => {
          Some(
            pick(
              &self.months_short,
              month0,
              &self.months
            )
            .to_string()
          )
        }
        | 'B' => {
          Some(
            pick(&self.months, month0, &[])
              .to_string()
          )
        }
        | 'o' => Some(ordinal(date.day())),
        | _ => None
      };
      match literal {
        | Some(text) => {
          rewritten
            .push_str(&text.replace('%', "%%"));
        }
        | None => {
          rewritten.push('%');
          rewritten.push(spec);
        }
      }
    }
    rewritten
  }
}

fn ordinal(day: u32) -> String {
  let suffix = match (day % 10, day % 100)
  {
    | (_, 11..=13) => "th",
    | (1, _) => "st",
    | (2, _) => "nd",
    | (3, _) => "rd",
    | _ => "th"
  };
  format!("{day}{suffix}")
}
