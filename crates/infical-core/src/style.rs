//! State flags in, class lists and inline
//! declarations out.
//!
//! The browser crate renders these
//! verbatim and the text renderer maps the
//! same classes onto terminal colors, so
//! every visual rule lives here once.

use std::fmt;

use crate::config::Layout;
use crate::scroll::TodayPosition;
use crate::theme::Theme;

/// Ordered CSS declarations.
#[derive(
  Debug, Clone, PartialEq, Eq, Default,
)]
pub struct Declarations(
  Vec<(&'static str, String)>
);

impl Declarations {
  #[must_use]
  pub fn new() -> Self {
    Self::default()
  }

  #[must_use]
  pub fn with(
    mut self,
    property: &'static str,
    value: impl Into<String>
  ) -> Self {
    self.set(property, value);
    self
  }

  pub fn set(
    &mut self,
    property: &'static str,
    value: impl Into<String>
  ) {
    let value = value.into();
    if let Some(slot) = self
      .0
      .iter_mut()
      .find(|(p, _)| *p == property)
    {
      slot.1 = value;
    } else {
      self.0.push((property, value));
    }
  }

  #[must_use]
  pub fn get(
    &self,
    property: &str
  ) -> Option<&str> {
    self
      .0
      .iter()
      .find(|(p, _)| *p == property)
      .map(|(_, v)| v.as_str())
  }

  #[must_use]
  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }
}

impl fmt::Display for Declarations {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>
  ) -> fmt::Result {
    for (idx, (property, value)) in
      self.0.iter().enumerate()
    {
      if idx > 0 {
        f.write_str(" ")?;
      }
      write!(f, "{property}: {value};")?;
    }
    Ok(())
  }
}

#[derive(
  Debug, Clone, PartialEq, Eq, Default,
)]
pub struct Resolved {
  pub classes: Vec<&'static str>,
  pub style:   Declarations
}

impl Resolved {
  #[must_use]
  pub fn has_class(
    &self,
    class: &str
  ) -> bool {
    self.classes.contains(&class)
  }

  #[must_use]
  pub fn class_string(&self) -> String {
    self.classes.join(" ")
  }
}

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default,
)]
pub struct DayFlags {
  pub selected:    bool,
  pub fixed:       bool,
  pub today:       bool,
  pub disabled:    bool,
  pub highlighted: bool
}

#[must_use]
pub fn resolve_day(
  theme: &Theme,
  flags: DayFlags
) -> Resolved {
  let mut classes = vec!["day"];
  let mut style = Declarations::new();

  if flags.today {
    classes.push("today");
    style
      .set("color", &theme.today_color);
  }
  if flags.selected {
    classes.push("selected");
  }
  if flags.fixed {
    classes.push("fixed");
  }
  if flags.highlighted {
    classes.push("highlighted");
  }
  if flags.disabled {
    classes.push("disabled");
  } else {
    classes.push("enabled");
    style.set(
      "background",
      &theme.day_enabled.background
    );
  }

  Resolved { classes, style }
}

/// The bubble drawn over a selected day.
#[must_use]
pub fn resolve_selection(
  theme: &Theme
) -> Resolved {
  Resolved {
    classes: vec!["selection"],
    style:   Declarations::new()
      .with(
        "background-color",
        &theme.selection_color
      )
      .with(
        "color",
        &theme.text_color.active
      )
      .with(
        "background",
        &theme.day_selected.background
      )
  }
}

#[must_use]
pub fn resolve_month(
  theme: &Theme
) -> Resolved {
  Resolved {
    classes: vec!["month"],
    style:   Declarations::new().with(
      "background",
      &theme.month.background
    )
  }
}

#[must_use]
pub fn resolve_row(
  day_count: usize,
  row_height: u32
) -> Resolved {
  let mut classes = vec!["row"];
  if day_count != 7 {
    classes.push("partial");
  }
  Resolved {
    classes,
    style: Declarations::new().with(
      "height",
      format!("{row_height}px")
    )
  }
}

#[must_use]
pub fn resolve_overlay(
  theme: &Theme,
  partial_first_row: bool,
  visible: bool
) -> Resolved {
  let mut classes = vec!["month-label"];
  if partial_first_row {
    classes.push("partial-first-row");
  }
  if visible {
    classes.push("show");
  }
  let mut style = Declarations::new();
  if let Some(color) =
    theme.overlay_color.as_ref()
  {
    style.set("background-color", color);
  }
  Resolved { classes, style }
}

#[must_use]
pub fn resolve_weekdays(
  theme: &Theme
) -> Resolved {
  Resolved {
    classes: vec!["weekdays"],
    style:   Declarations::new()
      .with(
        "background-color",
        &theme.weekday_color
      )
      .with(
        "color",
        &theme.weekday_text_color
      )
      .with(
        "border-bottom",
        &theme.weekday_header_border_bottom
      )
      .with(
        "padding",
        &theme.weekday_padding
      )
  }
}

#[must_use]
pub fn resolve_container(
  theme: &Theme,
  layout: Layout,
  width: u32
) -> Resolved {
  let mut classes = vec!["infinite-calendar"];
  if layout == Layout::Landscape {
    classes.push("landscape");
  }
  Resolved {
    classes,
    style: Declarations::new()
      .with(
        "color",
        &theme.text_color.default
      )
      .with("width", format!("{width}px"))
      .with(
        "font-size",
        &theme.calendar_container.font_size
      )
      .with(
        "font-family",
        &theme
          .calendar_container
          .font_family
      )
  }
}

#[must_use]
pub fn resolve_today_helper(
  theme: &Theme,
  position: TodayPosition
) -> Resolved {
  let mut classes = vec!["today-helper"];
  match position {
    | TodayPosition::Hidden => {}
    | TodayPosition::Above => {
      classes.extend(["show", "above"]);
    }
    | TodayPosition::Below => {
      classes.extend(["show", "below"]);
    }
  }
  Resolved {
    classes,
    style: Declarations::new()
      .with(
        "background-color",
        &theme.floating_nav.background
      )
      .with(
        "color",
        &theme.floating_nav.color
      )
  }
}

#[must_use]
pub fn resolve_chevron(
  theme: &Theme
) -> Declarations {
  Declarations::new().with(
    "fill",
    &theme.floating_nav.chevron
  )
}

#[must_use]
pub fn resolve_header(
  theme: &Theme,
  layout: Layout,
  animate: bool,
  blank: bool
) -> Resolved {
  let mut classes = vec!["header"];
  if layout == Layout::Landscape {
    classes.push("landscape");
  }
  if animate {
    classes.push("animate");
  }
  if blank {
    classes.push("blank");
  }
  Resolved {
    classes,
    style: Declarations::new().with(
      "background-color",
      &theme.header_color
    )
  }
}
