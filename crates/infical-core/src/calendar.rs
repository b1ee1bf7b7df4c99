//! The calendar controller.
//!
//! Owns the month list and every piece of
//! mutable widget state. Front ends feed it
//! events with explicit timestamps and read
//! back snapshots; nothing in here touches
//! a clock or the DOM.

use std::fmt;
use std::rc::Rc;

use chrono::{
  Datelike,
  NaiveDate
};
use serde::Serialize;
use tracing::{
  debug,
  instrument,
  trace
};

use crate::config::{
  CalendarConfig,
  DisplayMode
};
use crate::constraints::DateConstraints;
use crate::debounce::Debouncer;
use crate::keyboard::{
  Key,
  step_highlight
};
use crate::months::{
  Day,
  Month,
  build_months,
  month_index_of
};
use crate::scroll::{
  OVERLAY_SPEED_THRESHOLD,
  ScrollSpeed,
  TODAY_HELPER_NAV_OFFSET,
  TodayHelperPolicy,
  TodayPosition
};
use crate::selection::{
  Selection,
  SelectionMode,
  Toggle
};
use crate::style::DayFlags;
use crate::virtualize::{
  MonthLayout,
  Px,
  VirtualWindow
};
use crate::years::YearsView;

/// Payload handed to the selection hooks.
#[derive(
  Debug, Clone, PartialEq, Eq, Serialize,
)]
pub struct SelectEvent {
  pub date:      NaiveDate,
  pub toggle:    Toggle,
  /// Selected dates before the change
  /// for `before_select`/`on_select`,
  /// after it for `after_select`.
  pub selection: Vec<NaiveDate>
}

pub type SelectGuard =
  Rc<dyn Fn(&SelectEvent) -> bool>;
pub type SelectCallback =
  Rc<dyn Fn(&SelectEvent)>;
pub type OffsetCallback = Rc<dyn Fn(Px)>;
pub type KeyCallback = Rc<dyn Fn(Key)>;

/// Host callbacks. Absent ones are
/// skipped.
#[derive(Clone, Default)]
pub struct CalendarHooks {
  pub before_select: Option<SelectGuard>,
  pub on_select:     Option<SelectCallback>,
  pub after_select:  Option<SelectCallback>,
  pub on_scroll:     Option<OffsetCallback>,
  pub on_scroll_end: Option<OffsetCallback>,
  pub on_key_down:   Option<KeyCallback>
}

impl CalendarHooks {
  #[must_use]
  pub fn before_select(
    mut self,
    f: impl Fn(&SelectEvent) -> bool + 'static
  ) -> Self {
    self.before_select = Some(Rc::new(f));
    self
  }

  #[must_use]
  pub fn on_select(
    mut self,
    f: impl Fn(&SelectEvent) + 'static
  ) -> Self {
    self.on_select = Some(Rc::new(f));
    self
  }

  #[must_use]
  pub fn after_select(
    mut self,
    f: impl Fn(&SelectEvent) + 'static
  ) -> Self {
    self.after_select = Some(Rc::new(f));
    self
  }

  #[must_use]
  pub fn on_scroll(
    mut self,
    f: impl Fn(Px) + 'static
  ) -> Self {
    self.on_scroll = Some(Rc::new(f));
    self
  }

  #[must_use]
  pub fn on_scroll_end(
    mut self,
    f: impl Fn(Px) + 'static
  ) -> Self {
    self.on_scroll_end = Some(Rc::new(f));
    self
  }

  #[must_use]
  pub fn on_key_down(
    mut self,
    f: impl Fn(Key) + 'static
  ) -> Self {
    self.on_key_down = Some(Rc::new(f));
    self
  }
}

impl fmt::Debug for CalendarHooks {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>
  ) -> fmt::Result {
    f.debug_struct("CalendarHooks")
      .field(
        "before_select",
        &self.before_select.is_some()
      )
      .field(
        "on_select",
        &self.on_select.is_some()
      )
      .field(
        "after_select",
        &self.after_select.is_some()
      )
      .field(
        "on_scroll",
        &self.on_scroll.is_some()
      )
      .field(
        "on_scroll_end",
        &self.on_scroll_end.is_some()
      )
      .field(
        "on_key_down",
        &self.on_key_down.is_some()
      )
      .finish()
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
pub struct Viewport {
  pub offset: Px,
  pub height: Px,
  pub window: VirtualWindow
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
pub enum SelectOutcome {
  Committed(Toggle),
  /// `before_select` returned false.
  Vetoed,
  /// Fixed or disabled date.
  Ignored
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
pub enum KeyAction {
  None,
  /// Highlight moved inside the mounted
  /// window; `scroll` is the new offset
  /// when the list had to move.
  Highlight {
    date:   NaiveDate,
    scroll: Option<Px>
  },
  /// Highlight target not mounted yet;
  /// the list jumped to its month and the
  /// highlight lands on the next scroll
  /// update.
  CoarseScroll {
    date:   NaiveDate,
    offset: Px
  },
  Select {
    date:    NaiveDate,
    outcome: SelectOutcome
  },
  YearHighlight(i32),
  YearSelect {
    year:    i32,
    outcome: SelectOutcome
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
pub struct KeyOutcome {
  pub prevent_default: bool,
  pub action:          KeyAction
}

impl KeyOutcome {
  fn ignored() -> Self {
    Self {
      prevent_default: false,
      action:          KeyAction::None
    }
  }
}

/// What changed after a scroll event.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Serialize,
)]
pub struct ScrollUpdate {
  pub offset:    Px,
  pub speed:     i64,
  pub window:    VirtualWindow,
  pub overlay:   bool,
  pub today:     TodayPosition,
  /// Offset to apply next, when a pending
  /// keyboard highlight was finalized.
  pub follow_up: Option<Px>
}

#[derive(
  Debug, Clone, PartialEq, Eq, Serialize,
)]
pub struct HeaderView {
  pub label:      String,
  pub date:       Option<NaiveDate>,
  pub year:       Option<i32>,
  pub blank:      bool,
  pub animate:    bool,
  pub years_open: bool
}

/// Text shown inside a day cell.
#[derive(
  Debug, Clone, PartialEq, Eq, Serialize,
)]
pub struct DayLabels {
  pub number:  u32,
  /// Short month name on the 1st.
  pub month:   Option<String>,
  /// Year on the 1st outside the current
  /// year.
  pub year:    Option<i32>,
  /// Caption of the selection bubble.
  pub caption: Option<String>
}

pub struct InfiniteCalendar {
  config:            CalendarConfig,
  today:             NaiveDate,
  months:            Vec<Month>,
  layout:            MonthLayout,
  constraints:       DateConstraints,
  years:             YearsView,
  selection:         Selection,
  mode:              SelectionMode,
  display:           DisplayMode,
  highlighted:       Option<NaiveDate>,
  pending_highlight: Option<NaiveDate>,
  highlighted_year:  Option<i32>,
  viewport:          Viewport,
  speed:             ScrollSpeed,
  overlay:           bool,
  today_position:    TodayPosition,
  today_offset:      Option<Px>,
  scroll_end:        Debouncer<Px>,
  header_animate:    bool,
  hooks:             CalendarHooks
}

impl fmt::Debug for InfiniteCalendar {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>
  ) -> fmt::Result {
    f.debug_struct("InfiniteCalendar")
      .field("today", &self.today)
      .field("months", &self.months.len())
      .field("selection", &self.selection)
      .field("display", &self.display)
      .field("highlighted", &self.highlighted)
      .field("viewport", &self.viewport)
      .field("hooks", &self.hooks)
      .finish_non_exhaustive()
  }
}

impl InfiniteCalendar {
  #[instrument(skip(config), fields(min = %config.min, max = %config.max))]
  pub fn new(
    config: CalendarConfig,
    today: NaiveDate
  ) -> Self {
    let config = config.sanitized();
    let week_start =
      config.locale.week_starts_on;
    let months = build_months(
      config.min,
      config.max,
      week_start
    );
    let layout = MonthLayout::new(
      &months,
      config.row_height,
      week_start
    );
    let constraints = config.constraints();
    let selection = Selection::from_dates(
      config
        .selected_dates
        .clone()
        .unwrap_or_else(|| vec![today]),
      config.fixed_selected_dates.iter().copied(),
      &constraints
    );
    let window = layout.window(
      0,
      config.height,
      config.overscan_month_count
    );

    let mut calendar = Self {
      mode: SelectionMode::from_multi_date(
        config.multi_date
      ),
      display: config.display,
      years: YearsView::new(
        config.min, config.max
      ),
      today_offset: None,
      header_animate: false,
      viewport: Viewport {
        offset: 0,
        height: config.height,
        window
      },
      config,
      today,
      months,
      layout,
      constraints,
      selection,
      highlighted: None,
      pending_highlight: None,
      highlighted_year: None,
      speed: ScrollSpeed::new(),
      overlay: false,
      today_position: TodayPosition::Hidden,
      scroll_end: Debouncer::default(),
      hooks: CalendarHooks::default()
    };
    calendar.today_offset =
      calendar.compute_today_offset();

    let initial = calendar
      .config
      .init_scroll_date
      .or_else(|| calendar.selection.primary())
      .unwrap_or(today);
    let offset = calendar.scroll_to(
      calendar.date_offset(initial)
    );
    debug!(
      months = calendar.months.len(),
      %initial,
      offset,
      "calendar ready"
    );
    calendar
  }

  #[must_use]
  pub fn with_hooks(
    mut self,
    hooks: CalendarHooks
  ) -> Self {
    self.hooks = hooks;
    self
  }

  pub fn set_hooks(
    &mut self,
    hooks: CalendarHooks
  ) {
    self.hooks = hooks;
  }

  #[must_use]
  pub fn config(&self) -> &CalendarConfig {
    &self.config
  }

  #[must_use]
  pub fn today(&self) -> NaiveDate {
    self.today
  }

  #[must_use]
  pub fn months(&self) -> &[Month] {
    &self.months
  }

  #[must_use]
  pub fn layout(&self) -> &MonthLayout {
    &self.layout
  }

  #[must_use]
  pub fn constraints(
    &self
  ) -> &DateConstraints {
    &self.constraints
  }

  #[must_use]
  pub fn years(&self) -> &YearsView {
    &self.years
  }

  #[must_use]
  pub fn selection(&self) -> &Selection {
    &self.selection
  }

  #[must_use]
  pub fn display(&self) -> DisplayMode {
    self.display
  }

  #[must_use]
  pub fn highlighted(
    &self
  ) -> Option<NaiveDate> {
    self.highlighted
  }

  #[must_use]
  pub fn highlighted_year(
    &self
  ) -> Option<i32> {
    self.highlighted_year
  }

  #[must_use]
  pub fn viewport(&self) -> Viewport {
    self.viewport
  }

  #[must_use]
  pub fn window(&self) -> VirtualWindow {
    self.viewport.window
  }

  /// Months currently mounted.
  #[must_use]
  pub fn mounted_months(&self) -> &[Month] {
    self
      .months
      .get(self.viewport.window.range())
      .unwrap_or(&[])
  }

  #[must_use]
  pub fn overlay_visible(&self) -> bool {
    self.overlay
  }

  #[must_use]
  pub fn today_position(
    &self
  ) -> TodayPosition {
    self.today_position
  }

  /// Instant at which a pending
  /// scroll-end becomes due.
  #[must_use]
  pub fn scroll_end_deadline(
    &self
  ) -> Option<u64> {
    self.scroll_end.deadline()
  }

  /// Rebuilds the months for new bounds
  /// and re-clamps the selection.
  #[instrument(skip(self))]
  pub fn set_bounds(
    &mut self,
    min: NaiveDate,
    max: NaiveDate
  ) {
    let mut config = self.config.clone();
    config.min = min;
    config.max = max;
    self.config = config.sanitized();

    let week_start =
      self.config.locale.week_starts_on;
    self.months = build_months(
      self.config.min,
      self.config.max,
      week_start
    );
    self.layout = MonthLayout::new(
      &self.months,
      self.config.row_height,
      week_start
    );
    self.constraints =
      self.config.constraints();
    self.years = YearsView::new(
      self.config.min,
      self.config.max
    );
    self.selection = self
      .selection
      .reclamped(&self.constraints);
    self.highlighted = None;
    self.pending_highlight = None;
    self.today_offset =
      self.compute_today_offset();
    let offset = self.viewport.offset;
    self.scroll_to(offset);
    debug!(
      months = self.months.len(),
      "rebuilt months"
    );
  }

  /// Replaces the selected dates, keeping
  /// the fixed ones.
  pub fn set_selected_dates<I>(
    &mut self,
    dates: I
  ) where
    I: IntoIterator<Item = NaiveDate>
  {
    let fixed: Vec<NaiveDate> = self
      .config
      .fixed_selected_dates
      .clone();
    self.selection = Selection::from_dates(
      dates,
      fixed,
      &self.constraints
    );
  }

  pub fn set_viewport_height(
    &mut self,
    height: Px
  ) {
    if height == 0
      || height == self.viewport.height
    {
      return;
    }
    self.viewport.height = height;
    let offset = self.viewport.offset;
    self.scroll_to(offset);
  }

  pub fn set_display(
    &mut self,
    mode: DisplayMode
  ) {
    if mode == self.display {
      return;
    }
    debug!(?mode, "display changed");
    self.display = mode;
    self.highlighted_year = match mode {
      | DisplayMode::Years => {
        Some(self.reference_date().year())
      }
      | DisplayMode::Days => None
    };
  }

  #[must_use]
  pub fn current_offset(&self) -> Px {
    self.viewport.offset
  }

  #[must_use]
  pub fn date_offset(
    &self,
    date: NaiveDate
  ) -> Px {
    self.layout.date_offset(&self.months, date)
  }

  #[must_use]
  pub fn month_offset(
    &self,
    date: NaiveDate
  ) -> Px {
    self
      .layout
      .month_offset(&self.months, date)
  }

  /// Moves the list, clamping to the
  /// scrollable range, and returns the
  /// applied offset.
  pub fn scroll_to(
    &mut self,
    offset: Px
  ) -> Px {
    let offset = offset.min(
      self
        .layout
        .max_offset(self.viewport.height)
    );
    self.viewport.offset = offset;
    self.viewport.window = self.layout.window(
      offset,
      self.viewport.height,
      self.config.overscan_month_count
    );
    trace!(
      offset,
      start = self.viewport.window.start,
      end = self.viewport.window.end,
      "viewport moved"
    );
    offset
  }

  /// Scrolls so the row of `date` is at
  /// the top, shifted by `extra` pixels.
  #[instrument(skip(self))]
  pub fn scroll_to_date(
    &mut self,
    date: NaiveDate,
    extra: i64
  ) -> Px {
    if let Some(idx) =
      month_index_of(&self.months, date)
      && !self.viewport.window.contains(idx)
    {
      let coarse = self.month_offset(date);
      debug!(coarse, "target month not mounted");
      self.scroll_to(coarse);
    }
    let target = (self.date_offset(date)
      as i64)
      .saturating_add(extra)
      .clamp(0, Px::MAX as i64)
      as Px;
    self.scroll_to(target)
  }

  pub fn scroll_to_today(&mut self) -> Px {
    let today = self.today;
    self.scroll_to_date(today, 0)
  }

  /// Handles a scroll event at `now_ms`.
  pub fn on_scroll(
    &mut self,
    offset: Px,
    now_ms: u64
  ) -> ScrollUpdate {
    let offset = self.scroll_to(offset);
    let speed =
      self.speed.sample(offset, now_ms);

    if self.config.show_overlay
      && !self.overlay
      && speed.abs() >= OVERLAY_SPEED_THRESHOLD
    {
      trace!(speed, "showing month overlay");
      self.overlay = true;
    }
    self.update_today_position(speed);

    if let Some(on_scroll) =
      self.hooks.on_scroll.as_ref()
    {
      on_scroll(offset);
    }
    self.scroll_end.push(offset, now_ms);

    let follow_up =
      self.finalize_pending_highlight();

    ScrollUpdate {
      offset: self.viewport.offset,
      speed,
      window: self.viewport.window,
      overlay: self.overlay,
      today: self.today_position,
      follow_up
    }
  }

  /// Fires the debounced scroll-end once
  /// the quiet period has passed.
  pub fn poll_scroll_end(
    &mut self,
    now_ms: u64
  ) -> Option<Px> {
    let offset =
      self.scroll_end.poll(now_ms)?;
    self.overlay = false;
    self.speed.reset();
    self.update_today_position(0);
    debug!(offset, "scroll settled");
    if let Some(on_scroll_end) =
      self.hooks.on_scroll_end.as_ref()
    {
      on_scroll_end(offset);
    }
    Some(offset)
  }

  fn compute_today_offset(
    &self
  ) -> Option<Px> {
    (self.config.min <= self.today
      && self.today <= self.config.max)
      .then(|| self.date_offset(self.today))
  }

  fn update_today_position(
    &mut self,
    speed: i64
  ) {
    if !self.config.show_today_helper {
      return;
    }
    let Some(today_offset) =
      self.today_offset
    else {
      return;
    };
    let policy = TodayHelperPolicy {
      row_height:      self.config.row_height,
      viewport_height: self.viewport.height,
      row_offset:      self
        .config
        .today_helper_row_offset
    };
    if let Some(next) = policy.next(
      self.today_position,
      self.viewport.offset,
      today_offset,
      speed
    ) {
      trace!(?next, "today helper moved");
      self.today_position = next;
    }
  }

  fn nav_offset(&self) -> Px {
    if self.today_position.is_shown() {
      TODAY_HELPER_NAV_OFFSET
    } else {
      0
    }
  }

  fn reference_date(&self) -> NaiveDate {
    self.constraints.clamp(
      self
        .selection
        .primary()
        .unwrap_or(self.today)
    )
  }

  /// Runs the select transition for
  /// `date` through the hooks.
  #[instrument(skip(self))]
  pub fn select_day(
    &mut self,
    date: NaiveDate
  ) -> SelectOutcome {
    let toggle = self
      .selection
      .preview(date, &self.constraints);
    if toggle == Toggle::Unchanged {
      debug!("fixed or disabled; ignoring");
      return SelectOutcome::Ignored;
    }

    let event = SelectEvent {
      date,
      toggle,
      selection: self.selection.dates().collect()
    };
    if let Some(guard) =
      self.hooks.before_select.as_ref()
      && !guard(&event)
    {
      debug!("vetoed by before_select");
      return SelectOutcome::Vetoed;
    }
    if let Some(on_select) =
      self.hooks.on_select.as_ref()
    {
      on_select(&event);
    }

    let (next, toggle) = self.selection.toggled(
      date,
      self.mode,
      &self.constraints
    );
    self.selection = next;
    self.highlighted = Some(date);
    self.header_animate =
      self.config.should_header_animate;
    debug!(
      ?toggle,
      selected = self.selection.len(),
      "selection committed"
    );

    if let Some(after_select) =
      self.hooks.after_select.as_ref()
    {
      after_select(&SelectEvent {
        date,
        toggle,
        selection: self
          .selection
          .dates()
          .collect()
      });
    }
    SelectOutcome::Committed(toggle)
  }

  /// Picks the reference day in `year`.
  #[instrument(skip(self))]
  pub fn select_year(
    &mut self,
    year: i32
  ) -> SelectOutcome {
    let date = self.years.pick_date(
      year,
      self.reference_date(),
      &self.constraints
    );
    let outcome = if self.selection.contains(date)
    {
      SelectOutcome::Committed(
        Toggle::Unchanged
      )
    } else {
      self.select_day(date)
    };
    if matches!(
      outcome,
      SelectOutcome::Committed(_)
    ) {
      self.scroll_to_date(date, 0);
      if self.config.hide_years_on_select {
        self.set_display(DisplayMode::Days);
      }
    }
    outcome
  }

  pub fn handle_key(
    &mut self,
    key: Key
  ) -> KeyOutcome {
    if let Some(on_key_down) =
      self.hooks.on_key_down.as_ref()
    {
      on_key_down(key);
    }
    if !self.config.keyboard_support {
      return KeyOutcome::ignored();
    }

    let action = match self.display {
      | DisplayMode::Days => {
        self.handle_day_key(key)
      }
      | DisplayMode::Years => {
        self.handle_year_key(key)
      }
    };
    trace!(?key, ?action, "key handled");
    KeyOutcome {
      prevent_default: key.is_arrow(),
      action
    }
  }

  fn handle_day_key(
    &mut self,
    key: Key
  ) -> KeyAction {
    let current = self
      .highlighted
      .map(|d| self.constraints.clamp(d))
      .unwrap_or_else(|| self.reference_date());
    self.highlighted = Some(current);

    if key == Key::Enter {
      let outcome = self.select_day(current);
      return KeyAction::Select {
        date: current,
        outcome
      };
    }
    let Some(next) = step_highlight(
      current,
      key,
      &self.constraints
    ) else {
      return KeyAction::None;
    };
    self.move_highlight(next)
  }

  fn move_highlight(
    &mut self,
    date: NaiveDate
  ) -> KeyAction {
    let mounted =
      month_index_of(&self.months, date)
        .is_some_and(|idx| {
          self.viewport.window.contains(idx)
        });
    if !mounted {
      let target = self
        .month_offset(date)
        .saturating_sub(self.nav_offset());
      self.pending_highlight = Some(date);
      let offset = self.scroll_to(target);
      debug!(%date, offset, "coarse keyboard scroll");
      return KeyAction::CoarseScroll {
        date,
        offset
      };
    }

    self.pending_highlight = None;
    self.highlighted = Some(date);
    KeyAction::Highlight {
      date,
      scroll: self.scroll_to_highlight(date)
    }
  }

  fn scroll_to_highlight(
    &mut self,
    date: NaiveDate
  ) -> Option<Px> {
    let target = self
      .date_offset(date)
      .saturating_sub(self.config.row_height)
      .saturating_sub(self.nav_offset());
    (target != self.viewport.offset)
      .then(|| self.scroll_to(target))
  }

  /// Lands a highlight deferred by a
  /// coarse scroll once its month is
  /// mounted.
  pub fn finalize_pending_highlight(
    &mut self
  ) -> Option<Px> {
    let date = self.pending_highlight?;
    let mounted =
      month_index_of(&self.months, date)
        .is_some_and(|idx| {
          self.viewport.window.contains(idx)
        });
    if !mounted {
      return None;
    }
    self.pending_highlight = None;
    self.highlighted = Some(date);
    self.scroll_to_highlight(date)
  }

  fn handle_year_key(
    &mut self,
    key: Key
  ) -> KeyAction {
    let current = self
      .highlighted_year
      .unwrap_or_else(|| {
        self.reference_date().year()
      });
    if key == Key::Enter {
      let outcome = self.select_year(current);
      return KeyAction::YearSelect {
        year: current,
        outcome
      };
    }
    let Some(delta) = key.year_delta() else {
      return KeyAction::None;
    };
    let year = self.years.step(current, delta);
    self.highlighted_year = Some(year);
    KeyAction::YearHighlight(year)
  }

  #[must_use]
  pub fn day_flags(
    &self,
    date: NaiveDate
  ) -> DayFlags {
    let fixed = self.selection.is_fixed(date);
    DayFlags {
      selected: fixed
        || self.selection.contains(date),
      fixed,
      today: date == self.today,
      disabled: self.constraints.is_disabled(date),
      highlighted: self.highlighted
        == Some(date)
    }
  }

  #[must_use]
  pub fn day_labels(
    &self,
    day: &Day
  ) -> DayLabels {
    let locale = &self.config.locale;
    let date = day.date;
    let first = date.day() == 1;
    let flags = self.day_flags(date);
    let caption = flags.selected.then(|| {
      if flags.today {
        locale.today_short().to_string()
      } else {
        locale
          .month_short(date.month())
          .to_string()
      }
    });
    DayLabels {
      number: date.day(),
      month: first.then(|| {
        locale
          .month_short(date.month())
          .to_string()
      }),
      year: (first
        && date.year() != self.today.year())
      .then_some(date.year()),
      caption
    }
  }

  #[must_use]
  pub fn overlay_label(
    &self,
    month: &Month
  ) -> String {
    self.config.locale.overlay_label(
      month.year,
      month.month,
      self.today.year()
    )
  }

  #[must_use]
  pub fn header(&self) -> Option<HeaderView> {
    if !self.config.show_header
      || self.config.multi_date
    {
      return None;
    }
    let locale = &self.config.locale;
    let date = self.selection.primary();
    Some(HeaderView {
      label: date
        .map(|d| locale.format_header(d))
        .unwrap_or_else(|| {
          locale.blank.clone()
        }),
      date,
      year: date.map(|d| d.year()),
      blank: date.is_none(),
      animate: self.header_animate,
      years_open: self.display
        == DisplayMode::Years
    })
  }

  /// Header year clicked.
  pub fn open_years(&mut self) {
    self.set_display(DisplayMode::Years);
  }

  /// Header date clicked.
  pub fn scroll_to_selected(
    &mut self
  ) -> Option<Px> {
    let date = self.selection.primary()?;
    self.set_display(DisplayMode::Days);
    Some(self.scroll_to_date(date, 0))
  }
}

#[cfg(test)]
mod tests {
  use std::cell::RefCell;

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

  fn year_2020() -> CalendarConfig {
    CalendarConfig {
      min: ymd(2020, 1, 1),
      max: ymd(2020, 12, 31),
      selected_dates: Some(Vec::new()),
      ..CalendarConfig::default()
    }
  }

  #[test]
  fn selecting_twice_restores_empty_set() {
    let mut cal = InfiniteCalendar::new(
      year_2020(),
      ymd(2020, 6, 1)
    );
    let date = ymd(2020, 3, 15);
    assert_eq!(
      cal.select_day(date),
      SelectOutcome::Committed(Toggle::Added)
    );
    assert_eq!(
      cal.selection().dates().collect::<Vec<_>>(),
      vec![date]
    );
    assert_eq!(
      cal.select_day(date),
      SelectOutcome::Committed(Toggle::Removed)
    );
    assert!(cal.selection().is_empty());
  }

  #[test]
  fn default_selection_is_today() {
    let cfg = CalendarConfig {
      selected_dates: None,
      ..year_2020()
    };
    let cal = InfiniteCalendar::new(
      cfg,
      ymd(2020, 6, 1)
    );
    assert_eq!(
      cal.selection().first(),
      Some(ymd(2020, 6, 1))
    );
  }

  #[test]
  fn veto_keeps_selection() {
    let seen = Rc::new(RefCell::new(0));
    let counter = Rc::clone(&seen);
    let mut cal = InfiniteCalendar::new(
      year_2020(),
      ymd(2020, 6, 1)
    )
    .with_hooks(
      CalendarHooks::default()
        .before_select(|_| false)
        .after_select(move |_| {
          *counter.borrow_mut() += 1;
        })
    );
    assert_eq!(
      cal.select_day(ymd(2020, 3, 15)),
      SelectOutcome::Vetoed
    );
    assert!(cal.selection().is_empty());
    assert_eq!(*seen.borrow(), 0);
  }

  #[test]
  fn after_select_sees_committed_state() {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    let mut cal = InfiniteCalendar::new(
      year_2020(),
      ymd(2020, 6, 1)
    )
    .with_hooks(
      CalendarHooks::default().after_select(
        move |event| {
          sink
            .borrow_mut()
            .push(event.selection.clone());
        }
      )
    );
    cal.select_day(ymd(2020, 3, 15));
    cal.select_day(ymd(2020, 3, 16));
    assert_eq!(
      *seen.borrow(),
      vec![
        vec![ymd(2020, 3, 15)],
        vec![ymd(2020, 3, 16)]
      ]
    );
  }

  #[test]
  fn scroll_to_date_lands_on_row_offset() {
    let mut cal = InfiniteCalendar::new(
      year_2020(),
      ymd(2020, 1, 1)
    );
    let date = ymd(2020, 8, 20);
    let applied = cal.scroll_to_date(date, 0);
    assert_eq!(applied, cal.date_offset(date));
    assert_eq!(cal.current_offset(), applied);
  }

  #[test]
  fn scroll_to_date_saturates() {
    let mut cal = InfiniteCalendar::new(
      year_2020(),
      ymd(2020, 1, 1)
    );
    assert_eq!(
      cal.scroll_to_date(ymd(2020, 1, 1), -500),
      0
    );
    let max = cal
      .layout()
      .max_offset(cal.viewport().height);
    assert_eq!(
      cal.scroll_to_date(
        ymd(2020, 12, 31),
        10_000
      ),
      max
    );
  }

  #[test]
  fn fast_scroll_shows_overlay_until_settled()
  {
    let mut cal = InfiniteCalendar::new(
      year_2020(),
      ymd(2020, 1, 1)
    );
    cal.on_scroll(1000, 0);
    let update = cal.on_scroll(1200, 16);
    assert_eq!(update.speed, 200);
    assert!(update.overlay);
    assert_eq!(cal.poll_scroll_end(100), None);
    assert_eq!(
      cal.poll_scroll_end(16 + 150),
      Some(1200)
    );
    assert!(!cal.overlay_visible());
  }

  #[test]
  fn today_helper_points_back_to_today() {
    let mut cal = InfiniteCalendar::new(
      year_2020(),
      ymd(2020, 1, 15)
    );
    let update = cal.on_scroll(5000, 0);
    assert_eq!(update.today, TodayPosition::Above);
    let update = cal.on_scroll(0, 1000);
    assert_eq!(update.today, TodayPosition::Hidden);
  }

  #[test]
  fn keyboard_moves_highlight_by_week() {
    let cfg = CalendarConfig {
      selected_dates: Some(vec![ymd(2020, 3, 15)]),
      ..year_2020()
    };
    let mut cal =
      InfiniteCalendar::new(cfg, ymd(2020, 3, 1));
    let outcome = cal.handle_key(Key::Down);
    assert!(outcome.prevent_default);
    assert_eq!(
      cal.highlighted(),
      Some(ymd(2020, 3, 22))
    );

    let outcome = cal.handle_key(Key::Enter);
    assert!(!outcome.prevent_default);
    assert_eq!(
      cal.selection().first(),
      Some(ymd(2020, 3, 22))
    );
  }

  #[test]
  fn keyboard_far_jump_is_two_steps() {
    let cfg = CalendarConfig {
      overscan_month_count: 0,
      selected_dates: Some(vec![ymd(2020, 1, 31)]),
      ..year_2020()
    };
    let mut cal =
      InfiniteCalendar::new(cfg, ymd(2020, 1, 1));
    // Force the highlight far from the
    // mounted window.
    cal.highlighted = Some(ymd(2020, 9, 30));
    cal.scroll_to(0);

    let outcome = cal.handle_key(Key::Right);
    let KeyAction::CoarseScroll { date, offset } =
      outcome.action
    else {
      panic!("expected coarse scroll");
    };
    assert_eq!(date, ymd(2020, 10, 1));
    assert_eq!(offset, cal.month_offset(date));
    assert_eq!(cal.highlighted(), Some(ymd(2020, 9, 30)));

    let update = cal.on_scroll(offset, 10);
    assert_eq!(cal.highlighted(), Some(date));
    assert_eq!(update.today, TodayPosition::Above);
    assert_eq!(
      update.follow_up,
      Some(
        offset
          - 56
          - TODAY_HELPER_NAV_OFFSET
      )
    );
  }

  #[test]
  fn keyboard_support_off_still_reports_keys()
  {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    let cfg = CalendarConfig {
      keyboard_support: false,
      ..year_2020()
    };
    let mut cal =
      InfiniteCalendar::new(cfg, ymd(2020, 3, 1))
        .with_hooks(
          CalendarHooks::default().on_key_down(
            move |key| sink.borrow_mut().push(key)
          )
        );
    let outcome = cal.handle_key(Key::Left);
    assert_eq!(outcome.action, KeyAction::None);
    assert!(!outcome.prevent_default);
    assert_eq!(*seen.borrow(), vec![Key::Left]);
    assert_eq!(cal.highlighted(), None);
  }

  #[test]
  fn years_mode_picks_same_day() {
    let cfg = CalendarConfig {
      min: ymd(2018, 1, 1),
      max: ymd(2021, 12, 31),
      selected_dates: Some(vec![ymd(2020, 2, 29)]),
      ..CalendarConfig::default()
    };
    let mut cal =
      InfiniteCalendar::new(cfg, ymd(2020, 1, 1));
    cal.open_years();
    assert_eq!(cal.highlighted_year(), Some(2020));
    cal.handle_key(Key::Up);
    let outcome = cal.handle_key(Key::Enter);
    assert_eq!(
      outcome.action,
      KeyAction::YearSelect {
        year:    2019,
        outcome: SelectOutcome::Committed(
          Toggle::Added
        )
      }
    );
    assert_eq!(
      cal.selection().first(),
      Some(ymd(2019, 2, 28))
    );
    assert_eq!(cal.display(), DisplayMode::Days);
  }

  #[test]
  fn header_hidden_in_multi_mode() {
    let cfg = CalendarConfig {
      multi_date: true,
      ..year_2020()
    };
    let cal =
      InfiniteCalendar::new(cfg, ymd(2020, 3, 1));
    assert!(cal.header().is_none());

    let cal = InfiniteCalendar::new(
      year_2020(),
      ymd(2020, 3, 1)
    );
    let header = cal.header().expect("header");
    assert!(header.blank);
    assert_eq!(header.label, "Select a date...");
  }

  #[test]
  fn header_follows_user_pick_over_earlier_fixed_date() {
    let cfg = CalendarConfig {
      fixed_selected_dates: vec![ymd(2020, 1, 10)],
      ..year_2020()
    };
    let mut cal =
      InfiniteCalendar::new(cfg, ymd(2020, 6, 1));
    cal.select_day(ymd(2020, 3, 15));

    let header = cal.header().expect("header");
    assert_eq!(header.date, Some(ymd(2020, 3, 15)));
    assert_eq!(header.label, "Sun, Mar 15th");

    cal.highlighted = None;
    cal.handle_key(Key::Right);
    assert_eq!(
      cal.highlighted(),
      Some(ymd(2020, 3, 16))
    );
  }

  #[test]
  fn time_only_header_format_renders_default() {
    let mut cfg = year_2020();
    cfg.locale.header_format =
      "%H:%M %a".to_string();
    cfg.selected_dates = Some(vec![ymd(2020, 3, 15)]);
    let cal =
      InfiniteCalendar::new(cfg, ymd(2020, 6, 1));

    let header = cal.header().expect("header");
    assert_eq!(header.label, "Sun, Mar 15th");
  }

  #[test]
  fn year_pick_mounts_target_month_at_offset() {
    let cfg = CalendarConfig {
      min: ymd(2010, 1, 1),
      max: ymd(2030, 12, 31),
      overscan_month_count: 1,
      selected_dates: Some(vec![ymd(2020, 5, 20)]),
      ..CalendarConfig::default()
    };
    let mut cal =
      InfiniteCalendar::new(cfg, ymd(2020, 5, 1));
    cal.open_years();
    cal.select_year(2012);

    let picked = ymd(2012, 5, 20);
    assert_eq!(cal.display(), DisplayMode::Days);
    assert_eq!(cal.current_offset(), cal.date_offset(picked));
    let window = cal.window();
    let idx = month_index_of(cal.months(), picked)
      .expect("month built");
    assert!(window.contains(idx));
    assert!(window.top_pad <= cal.current_offset());
  }

  #[test]
  fn display_switch_tracks_highlighted_year() {
    let cfg = CalendarConfig {
      selected_dates: Some(vec![ymd(2020, 7, 4)]),
      ..year_2020()
    };
    let mut cal =
      InfiniteCalendar::new(cfg, ymd(2020, 6, 1));
    cal.set_display(DisplayMode::Years);
    assert_eq!(cal.highlighted_year(), Some(2020));
    assert!(cal.header().expect("header").years_open);

    cal.set_display(DisplayMode::Days);
    assert_eq!(cal.highlighted_year(), None);
    assert_eq!(cal.display(), DisplayMode::Days);
  }

  #[test]
  fn day_labels_mark_first_of_month() {
    let cfg = CalendarConfig {
      min: ymd(2020, 1, 1),
      max: ymd(2021, 12, 31),
      ..CalendarConfig::default()
    };
    let cal =
      InfiniteCalendar::new(cfg, ymd(2020, 3, 10));
    let labels =
      cal.day_labels(&Day::new(ymd(2021, 4, 1)));
    assert_eq!(labels.month.as_deref(), Some("Apr"));
    assert_eq!(labels.year, Some(2021));
    assert_eq!(labels.caption, None);

    let today =
      cal.day_labels(&Day::new(ymd(2020, 3, 10)));
    assert_eq!(today.caption.as_deref(), Some("Today"));
  }

  #[test]
  fn set_bounds_reclamps_selection() {
    let cfg = CalendarConfig {
      selected_dates: Some(vec![ymd(2020, 11, 20)]),
      ..year_2020()
    };
    let mut cal =
      InfiniteCalendar::new(cfg, ymd(2020, 3, 1));
    cal.set_bounds(ymd(2020, 1, 1), ymd(2020, 6, 30));
    assert_eq!(cal.months().len(), 6);
    assert_eq!(
      cal.selection().first(),
      Some(ymd(2020, 6, 30))
    );
  }
}
