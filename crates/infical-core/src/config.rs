use std::fs;
use std::path::Path;
#[cfg(feature = "cli")]
use std::path::PathBuf;

use anyhow::Context;
use chrono::NaiveDate;
use serde::{
  Deserialize,
  Deserializer,
  Serialize
};
use tracing::{
  debug,
  info,
  warn
};

use crate::constraints::DateConstraints;
use crate::date::{
  clamp_date,
  flexible_date_serde
};
use crate::locale::Locale;
use crate::theme::Theme;

#[cfg(feature = "cli")]
const CONFIG_ENV_VAR: &str =
  "INFICAL_CONFIG";
#[cfg(feature = "cli")]
const CONFIG_FILE_NAME: &str =
  "calendar.toml";

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Default,
  Serialize,
  Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
  #[default]
  Days,
  Years
}

#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Default,
  Serialize,
  Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
  #[default]
  Portrait,
  Landscape
}

/// Everything the widget is constructed
/// with. Every key is optional.
#[derive(
  Debug,
  Clone,
  PartialEq,
  Serialize,
  Deserialize,
)]
pub struct CalendarConfig {
  #[serde(
    default = "default_min",
    with = "flexible_date_serde"
  )]
  pub min: NaiveDate,
  #[serde(
    default = "default_max",
    with = "flexible_date_serde"
  )]
  pub max: NaiveDate,
  #[serde(
    default,
    with = "flexible_date_serde::option"
  )]
  pub min_date: Option<NaiveDate>,
  #[serde(
    default,
    with = "flexible_date_serde::option"
  )]
  pub max_date: Option<NaiveDate>,
  #[serde(
    default,
    with = "flexible_date_serde::option"
  )]
  pub init_scroll_date: Option<NaiveDate>,

  /// `None` selects today.
  #[serde(
    default,
    deserialize_with = "lenient_optional_dates"
  )]
  pub selected_dates: Option<Vec<NaiveDate>>,
  #[serde(
    default,
    deserialize_with = "lenient_dates"
  )]
  pub fixed_selected_dates: Vec<NaiveDate>,
  #[serde(default)]
  pub multi_date: bool,
  #[serde(default)]
  pub disabled_days: Vec<u32>,
  #[serde(
    default,
    deserialize_with = "lenient_dates"
  )]
  pub disabled_dates: Vec<NaiveDate>,

  #[serde(default = "default_row_height")]
  pub row_height: u32,
  #[serde(default = "default_width")]
  pub width: u32,
  #[serde(default = "default_height")]
  pub height: u32,
  #[serde(default = "default_overscan")]
  pub overscan_month_count: usize,
  #[serde(
    default = "default_today_row_offset"
  )]
  pub today_helper_row_offset: u32,

  #[serde(default)]
  pub locale: Locale,
  #[serde(default)]
  pub theme: Theme,

  #[serde(default = "calendar_true")]
  pub keyboard_support: bool,
  #[serde(default = "calendar_true")]
  pub auto_focus: bool,
  #[serde(default)]
  pub display: DisplayMode,
  #[serde(default)]
  pub layout: Layout,
  #[serde(default = "calendar_true")]
  pub show_overlay: bool,
  #[serde(default = "calendar_true")]
  pub show_today_helper: bool,
  #[serde(default = "calendar_true")]
  pub show_header: bool,
  #[serde(default = "calendar_true")]
  pub should_header_animate: bool,
  #[serde(default = "calendar_true")]
  pub hide_years_on_select: bool,
  #[serde(default = "default_tab_index")]
  pub tab_index: i32,
  /// IANA zone used to decide which day
  /// is today.
  #[serde(default)]
  pub timezone: Option<String>
}

fn calendar_true() -> bool {
  true
}

fn default_min() -> NaiveDate {
  NaiveDate::from_ymd_opt(1980, 1, 1)
    .unwrap_or(NaiveDate::MIN)
}

fn default_max() -> NaiveDate {
  NaiveDate::from_ymd_opt(2050, 12, 31)
    .unwrap_or(NaiveDate::MAX)
}

fn default_row_height() -> u32 {
  56
}

fn default_width() -> u32 {
  400
}

fn default_height() -> u32 {
  500
}

fn default_overscan() -> usize {
  4
}

fn default_today_row_offset() -> u32 {
  4
}

fn default_tab_index() -> i32 {
  1
}

fn parse_lenient(
  raw: Vec<String>,
  field: &'static str
) -> Vec<NaiveDate> {
  raw
    .into_iter()
    .filter_map(|value| {
      match flexible_date_serde::parse(
        &value
      ) {
        | Ok(date) => Some(date),
        | Err(error) => {
          warn!(
            field,
            %error,
            "skipping unparseable date"
          );
          None
        }
      }
    })
    .collect()
}

fn lenient_dates<'de, D>(
  deserializer: D
) -> Result<Vec<NaiveDate>, D::Error>
where
  D: Deserializer<'de>
{
  let raw =
    Vec::<String>::deserialize(deserializer)?;
  Ok(parse_lenient(raw, "dates"))
}

fn lenient_optional_dates<'de, D>(
  deserializer: D
) -> Result<Option<Vec<NaiveDate>>, D::Error>
where
  D: Deserializer<'de>
{
  let raw = Option::<Vec<String>>::deserialize(
    deserializer
  )?;
  Ok(raw.map(|values| {
    parse_lenient(values, "selected_dates")
  }))
}

impl Default for CalendarConfig {
  fn default() -> Self {
    Self {
      min: default_min(),
      max: default_max(),
      min_date: None,
      max_date: None,
      init_scroll_date: None,
      selected_dates: None,
      fixed_selected_dates: Vec::new(),
      multi_date: false,
      disabled_days: Vec::new(),
      disabled_dates: Vec::new(),
      row_height: default_row_height(),
      width: default_width(),
      height: default_height(),
      overscan_month_count: default_overscan(),
      today_helper_row_offset:
        default_today_row_offset(),
      locale: Locale::default(),
      theme: Theme::default(),
      keyboard_support: true,
      auto_focus: true,
      display: DisplayMode::Days,
      layout: Layout::Portrait,
      show_overlay: true,
      show_today_helper: true,
      show_header: true,
      should_header_animate: true,
      hide_years_on_select: true,
      tab_index: default_tab_index(),
      timezone: None
    }
  }
}

impl CalendarConfig {
  pub fn from_toml_str(
    text: &str
  ) -> anyhow::Result<Self> {
    let cfg: Self = toml::from_str(text)
      .context(
        "failed to parse calendar config"
      )?;
    Ok(cfg.sanitized())
  }

  #[tracing::instrument]
  pub fn load_file(
    path: &Path
  ) -> anyhow::Result<Self> {
    let text = fs::read_to_string(path)
      .with_context(|| {
        format!(
          "failed to read {}",
          path.display()
        )
      })?;
    let cfg = Self::from_toml_str(&text)
      .with_context(|| {
        format!(
          "invalid config file {}",
          path.display()
        )
      })?;
    info!(
      config = %path.display(),
      "loaded calendar config"
    );
    Ok(cfg)
  }

  /// Loads the first config found: the
  /// explicit path, `$INFICAL_CONFIG`,
  /// then the user config directory.
  /// Falls back to defaults.
  #[cfg(feature = "cli")]
  #[tracing::instrument]
  pub fn load(
    override_path: Option<&Path>
  ) -> anyhow::Result<Self> {
    match resolve_config_path(
      override_path
    ) {
      | Some(path) => Self::load_file(&path),
      | None => {
        warn!(
          "no calendar config found; \
           using defaults"
        );
        Ok(Self::default())
      }
    }
  }

  /// Repairs values the widget cannot
  /// work with.
  #[must_use]
  pub fn sanitized(mut self) -> Self {
    if self.min > self.max {
      warn!(
        min = %self.min,
        max = %self.max,
        "min after max; swapping"
      );
      std::mem::swap(
        &mut self.min,
        &mut self.max
      );
    }
    if self.row_height == 0 {
      self.row_height =
        default_row_height();
    }
    if self.width == 0 {
      self.width = default_width();
    }
    if self.height == 0 {
      self.height = default_height();
    }

    let (min_date, max_date) =
      self.selectable_range();
    if min_date > max_date {
      warn!(
        %min_date,
        %max_date,
        "min_date after max_date; \
         resetting to bounds"
      );
      self.min_date = None;
      self.max_date = None;
    }

    let before = self.disabled_days.len();
    self.disabled_days.retain(|d| *d < 7);
    if self.disabled_days.len() != before
    {
      warn!(
        "ignoring disabled_days outside \
         0..=6"
      );
    }

    self.locale = self.locale.sanitized();
    debug!(
      min = %self.min,
      max = %self.max,
      row_height = self.row_height,
      "sanitized calendar config"
    );
    self
  }

  /// `[min_date, max_date]`, each
  /// defaulting to the rendered bounds and
  /// clipped to them.
  #[must_use]
  pub fn selectable_range(
    &self
  ) -> (NaiveDate, NaiveDate) {
    let (min, max) = if self.min <= self.max
    {
      (self.min, self.max)
    } else {
      (self.max, self.min)
    };
    let lo = clamp_date(
      self.min_date.unwrap_or(min),
      min,
      max
    );
    let hi = clamp_date(
      self.max_date.unwrap_or(max),
      min,
      max
    );
    (lo, hi)
  }

  /// Whether the widget takes focus on
  /// mount.
  #[must_use]
  pub fn wants_focus(&self) -> bool {
    self.keyboard_support && self.auto_focus
  }

  #[must_use]
  pub fn constraints(
    &self
  ) -> DateConstraints {
    let (lo, hi) = self.selectable_range();
    DateConstraints::new(lo, hi)
      .with_disabled_days(
        self.disabled_days.iter().copied()
      )
      .with_disabled_dates(
        self.disabled_dates.iter().copied()
      )
  }
}

#[cfg(feature = "cli")]
fn resolve_config_path(
  override_path: Option<&Path>
) -> Option<PathBuf> {
  if let Some(path) = override_path {
    return Some(path.to_path_buf());
  }

  if let Ok(env_path) =
    std::env::var(CONFIG_ENV_VAR)
  {
    if env_path == "/dev/null" {
      return None;
    }
    return Some(PathBuf::from(env_path));
  }

  let candidate = dirs::config_dir()?
    .join("infical")
    .join(CONFIG_FILE_NAME);
  candidate.exists().then_some(candidate)
}
