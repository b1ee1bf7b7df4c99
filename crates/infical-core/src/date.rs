use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use anyhow::{
  Context,
  anyhow
};
use chrono::{
  Datelike,
  NaiveDate,
  TimeDelta,
  Utc
};
use chrono_tz::Tz;
use regex::Regex;
use serde::{
  Deserialize,
  Deserializer,
  Serialize,
  Serializer
};

const TIMEZONE_ENV_VAR: &str =
  "INFICAL_TIMEZONE";

/// Compact `YYYYMMDD` identity of a
/// calendar day.
///
/// Two dates are the same day iff their
/// keys are equal, and key order is date
/// order.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Hash,
)]
pub struct DayKey(u32);

impl DayKey {
  #[must_use]
  pub fn of(date: NaiveDate) -> Self {
    let year =
      date.year().clamp(0, 9999) as u32;
    Self(
      year * 10_000
        + date.month() * 100
        + date.day()
    )
  }

  #[must_use]
  pub fn to_date(
    self
  ) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(
      (self.0 / 10_000) as i32,
      (self.0 / 100) % 100,
      self.0 % 100
    )
  }

  #[must_use]
  pub fn as_u32(self) -> u32 {
    self.0
  }
}

impl From<NaiveDate> for DayKey {
  fn from(date: NaiveDate) -> Self {
    Self::of(date)
  }
}

impl fmt::Display for DayKey {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>
  ) -> fmt::Result {
    write!(f, "{:08}", self.0)
  }
}

impl FromStr for DayKey {
  type Err = anyhow::Error;

  fn from_str(
    s: &str
  ) -> Result<Self, Self::Err> {
    let date =
      NaiveDate::parse_from_str(
        s.trim(),
        "%Y%m%d"
      )
      .with_context(|| {
        format!(
          "invalid day key: {s}"
        )
      })?;
    Ok(Self::of(date))
  }
}

impl Serialize for DayKey {
  fn serialize<S>(
    &self,
    serializer: S
  ) -> Result<S::Ok, S::Error>
  where
    S: Serializer
  {
    serializer
      .serialize_str(&self.to_string())
  }
}

impl<'de> Deserialize<'de> for DayKey {
  fn deserialize<D>(
    deserializer: D
  ) -> Result<Self, D::Error>
  where
    D: Deserializer<'de>
  {
    let raw =
      String::deserialize(deserializer)?;
    raw
      .parse()
      .map_err(serde::de::Error::custom)
  }
}

/// Weekday index with Sunday as 0.
#[must_use]
pub fn weekday_index(
  date: NaiveDate
) -> u32 {
  date.weekday().num_days_from_sunday()
}

#[must_use]
pub fn first_day_of_month(
  year: i32,
  month: u32
) -> NaiveDate {
  NaiveDate::from_ymd_opt(
    year, month, 1
  )
  .unwrap_or(NaiveDate::MIN)
}

#[must_use]
pub fn last_day_of_month(
  year: i32,
  month: u32
) -> NaiveDate {
  let (next_year, next_month) =
    if month >= 12 {
      (year.saturating_add(1), 1_u32)
    } else {
      (year, month + 1)
    };
  add_days(
    first_day_of_month(
      next_year, next_month
    ),
    -1
  )
}

#[must_use]
pub fn days_in_month(
  year: i32,
  month: u32
) -> u32 {
  last_day_of_month(year, month).day()
}

/// `date` moved by `days`, saturating at
/// the representable range.
#[must_use]
pub fn add_days(
  date: NaiveDate,
  days: i64
) -> NaiveDate {
  checked_add_days(date, days).unwrap_or(
    if days < 0 {
      NaiveDate::MIN
    } else {
      NaiveDate::MAX
    }
  )
}

#[must_use]
pub fn checked_add_days(
  date: NaiveDate,
  days: i64
) -> Option<NaiveDate> {
  TimeDelta::try_days(days)
    .and_then(|delta| {
      date.checked_add_signed(delta)
    })
}

/// Moves by whole months, keeping the
/// day where the target month has it and
/// clamping to the month end otherwise.
#[must_use]
pub fn shift_months(
  date: NaiveDate,
  months: i32
) -> NaiveDate {
  checked_shift_months(
    date,
    i64::from(months)
  )
  .unwrap_or(if months < 0 {
    NaiveDate::MIN
  } else {
    NaiveDate::MAX
  })
}

#[must_use]
pub fn checked_shift_months(
  date: NaiveDate,
  months: i64
) -> Option<NaiveDate> {
  let total = i64::from(date.year())
    .checked_mul(12)?
    .checked_add(i64::from(date.month0()))?
    .checked_add(months)?;
  let year =
    i32::try_from(total.div_euclid(12))
      .ok()?;
  let month =
    u32::try_from(total.rem_euclid(12))
      .ok()?
      + 1;
  NaiveDate::from_ymd_opt(year, month, 1)?;
  let day = date
    .day()
    .min(days_in_month(year, month));
  NaiveDate::from_ymd_opt(year, month, day)
}

#[must_use]
pub fn with_year(
  date: NaiveDate,
  year: i32
) -> NaiveDate {
  let day = date
    .day()
    .min(days_in_month(year, date.month()));
  NaiveDate::from_ymd_opt(
    year,
    date.month(),
    day
  )
  .unwrap_or(date)
}

#[must_use]
pub fn clamp_date(
  date: NaiveDate,
  min: NaiveDate,
  max: NaiveDate
) -> NaiveDate {
  if date < min {
    min
  } else if date > max {
    max
  } else {
    date
  }
}

pub fn resolve_timezone(
  configured: Option<&str>
) -> Tz {
  static ENV_TZ: OnceLock<Option<Tz>> =
    OnceLock::new();

  if let Some(tz) = configured
    .and_then(|raw| {
      parse_timezone(raw, "config")
    })
  {
    return tz;
  }

  ENV_TZ
    .get_or_init(|| {
      std::env::var(TIMEZONE_ENV_VAR)
        .ok()
        .and_then(|raw| {
          parse_timezone(
            &raw,
            TIMEZONE_ENV_VAR
          )
        })
    })
    .unwrap_or(chrono_tz::UTC)
}

fn parse_timezone(
  raw: &str,
  source: &str
) -> Option<Tz> {
  let trimmed = raw.trim();
  if trimmed.is_empty() {
    return None;
  }

  match trimmed.parse::<Tz>() {
    | Ok(tz) => Some(tz),
    | Err(error) => {
      tracing::warn!(
        source,
        timezone = %trimmed,
        error = %error,
        "invalid timezone id; ignoring"
      );
      None
    }
  }
}

#[must_use]
pub fn today_in(tz: Tz) -> NaiveDate {
  Utc::now()
    .with_timezone(&tz)
    .date_naive()
}

/// Parses the date expressions accepted
/// in configuration files and on the
/// command line.
pub fn parse_date_expr(
  input: &str,
  today: NaiveDate
) -> anyhow::Result<NaiveDate> {
  let token =
    input.trim().to_ascii_lowercase();

  let out_of_range = || {
    anyhow!("date out of range: {input}")
  };

  match token.as_str() {
    | "today" | "now" => {
      return Ok(today);
    }
    | "tomorrow" => {
      return checked_add_days(today, 1)
        .ok_or_else(out_of_range);
    }
    | "yesterday" => {
      return checked_add_days(today, -1)
        .ok_or_else(out_of_range);
    }
    | _ => {}
  }

  let rel_re = relative_regex()?;
  if let Some(caps) =
    rel_re.captures(&token)
  {
    let num: i64 = caps
      .name("num")
      .map(|m| m.as_str())
      .ok_or_else(|| {
        anyhow!(
          "missing relative amount"
        )
      })?
      .parse()
      .context(
        "invalid relative number"
      )?;
    let num = if caps
      .name("sign")
      .is_some_and(|m| m.as_str() == "-")
    {
      -num
    } else {
      num
    };
    let unit = caps
      .name("unit")
      .map(|m| m.as_str())
      .unwrap_or("d");

    let shifted = match unit {
      | "w" => {
        num
          .checked_mul(7)
          .and_then(|days| {
            checked_add_days(today, days)
          })
      }
      | "m" => checked_shift_months(today, num),
      | "y" => {
        num
          .checked_mul(12)
          .and_then(|months| {
            checked_shift_months(
              today, months
            )
          })
      }
      | _ => checked_add_days(today, num)
    };
    return shifted.ok_or_else(out_of_range);
  }

  for fmt in ["%Y-%m-%d", "%Y%m%d"] {
    if let Ok(date) =
      NaiveDate::parse_from_str(
        &token, fmt
      )
    {
      return Ok(date);
    }
  }

  if let Ok(dt) =
    chrono::DateTime::parse_from_rfc3339(
      input.trim()
    )
  {
    return Ok(dt.date_naive());
  }

  Err(anyhow!(
    "unrecognized date expression: \
     {input}"
  ))
  .with_context(|| {
    "supported formats: \
     today/tomorrow/yesterday, \
     +Nd/-Nw/+Nm/+Ny, YYYY-MM-DD, \
     YYYYMMDD, RFC3339"
  })
}

fn relative_regex()
-> anyhow::Result<&'static Regex> {
  static RELATIVE: OnceLock<
    Result<Regex, regex::Error>
  > = OnceLock::new();
  RELATIVE
    .get_or_init(|| {
      Regex::new(
        r"^(?P<sign>[+-])(?P<num>\d+)(?P<unit>[dwmy])?$"
      )
    })
    .as_ref()
    .map_err(|e| {
      anyhow!(
        "internal regex compile \
         failure: {e}"
      )
    })
}

/// Serde adapter for dates written as
/// `YYYY-MM-DD` or `YYYYMMDD`.
pub mod flexible_date_serde {
  use chrono::NaiveDate;
  use serde::{
    Deserialize,
    Deserializer,
    Serializer
  };

  pub fn serialize<S>(
    date: &NaiveDate,
    serializer: S
  ) -> Result<S::Ok, S::Error>
  where
    S: Serializer
  {
    serializer.serialize_str(
      &date.format("%Y-%m-%d").to_string()
    )
  }

  pub fn deserialize<'de, D>(
    deserializer: D
  ) -> Result<NaiveDate, D::Error>
  where
    D: Deserializer<'de>
  {
    let raw =
      String::deserialize(deserializer)?;
    parse(&raw)
      .map_err(serde::de::Error::custom)
  }

  pub(crate) fn parse(
    raw: &str
  ) -> Result<NaiveDate, String> {
    let trimmed = raw.trim();
    NaiveDate::parse_from_str(
      trimmed, "%Y-%m-%d"
    )
    .or_else(|_| {
      NaiveDate::parse_from_str(
        trimmed, "%Y%m%d"
      )
    })
    .map_err(|e| {
      format!("invalid date {raw:?}: {e}")
    })
  }

  pub mod option {
    use chrono::NaiveDate;
    use serde::{
      Deserialize,
      Deserializer,
      Serializer
    };

    pub fn serialize<S>(
      date: &Option<NaiveDate>,
      serializer: S
    ) -> Result<S::Ok, S::Error>
    where
      S: Serializer
    {
      match date {
        | Some(value) => {
          super::serialize(
            value, serializer
          )
        }
        | None => {
          serializer.serialize_none()
        }
      }
    }

    pub fn deserialize<'de, D>(
      deserializer: D
    ) -> Result<Option<NaiveDate>, D::Error>
    where
      D: Deserializer<'de>
    {
      Option::<String>::deserialize(
        deserializer
      )?
      .map(|raw| super::parse(&raw))
      .transpose()
      .map_err(serde::de::Error::custom)
    }
  }
}

#[cfg(test)]
mod tests {
  use chrono::NaiveDate;

  use super::{
    DayKey,
    add_days,
    parse_date_expr,
    shift_months
  };

  fn ymd(
    y: i32,
    m: u32,
    d: u32
  ) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d)
      .expect("valid date")
  }

  #[test]
  fn day_key_formats_and_orders() {
    let key = DayKey::of(ymd(2020, 3, 5));
    assert_eq!(key.to_string(), "20200305");
    assert!(
      key < DayKey::of(ymd(2020, 3, 6))
    );
    assert_eq!(
      "20200305"
        .parse::<DayKey>()
        .expect("parse key"),
      key
    );
    assert_eq!(
      key.to_date(),
      Some(ymd(2020, 3, 5))
    );
  }

  #[test]
  fn shift_months_clamps_day() {
    assert_eq!(
      shift_months(ymd(2020, 1, 31), 1),
      ymd(2020, 2, 29)
    );
    assert_eq!(
      shift_months(ymd(2020, 1, 15), -2),
      ymd(2019, 11, 15)
    );
  }

  #[test]
  fn parses_relative_and_absolute() {
    let today = ymd(2026, 2, 17);
    assert_eq!(
      parse_date_expr("+3d", today)
        .expect("relative days"),
      ymd(2026, 2, 20)
    );
    assert_eq!(
      parse_date_expr("-1w", today)
        .expect("relative weeks"),
      ymd(2026, 2, 10)
    );
    assert_eq!(
      parse_date_expr("+1m", today)
        .expect("relative months"),
      ymd(2026, 3, 17)
    );
    assert_eq!(
      parse_date_expr("20200315", today)
        .expect("compact date"),
      ymd(2020, 3, 15)
    );
    assert_eq!(
      parse_date_expr(
        "2020-03-15",
        today
      )
      .expect("iso date"),
      ymd(2020, 3, 15)
    );
    assert!(
      parse_date_expr("soon", today)
        .is_err()
    );
  }

  #[test]
  fn relative_amounts_past_the_calendar_fail() {
    let today = ymd(2020, 3, 1);
    for expr in [
      "+999999999d",
      "+200000000000000d",
      "-9223372036854775807w",
      "+999999999999y",
      "+9999999999m"
    ] {
      let err = parse_date_expr(expr, today)
        .expect_err(expr);
      assert!(
        err.to_string().contains("out of range"),
        "{expr}: {err:#}"
      );
    }
  }

  #[test]
  fn add_days_saturates_at_the_range_ends() {
    assert_eq!(
      add_days(ymd(2020, 3, 1), i64::MAX),
      NaiveDate::MAX
    );
    assert_eq!(
      add_days(ymd(2020, 3, 1), i64::MIN),
      NaiveDate::MIN
    );
  }
}
