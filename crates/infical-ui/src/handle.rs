use std::cell::RefCell;
use std::rc::Rc;

use chrono::NaiveDate;
use infical_core::InfiniteCalendar;
use infical_core::config::DisplayMode;
use infical_core::virtualize::Px;
use web_sys::Element;
use yew::NodeRef;
use yew::functional::UseForceUpdateHandle;

/// Imperative access to a mounted
/// calendar, handed out through
/// `on_ready`.
///
/// Must not be called from inside one of
/// the calendar's own callbacks: those run
/// while the controller is borrowed, and
/// such calls are dropped with a warning.
#[derive(Clone)]
pub struct CalendarHandle {
  controller: Rc<RefCell<InfiniteCalendar>>,
  list_ref:   NodeRef,
  refresh:    UseForceUpdateHandle
}

impl PartialEq for CalendarHandle {
  fn eq(&self, other: &Self) -> bool {
    Rc::ptr_eq(
      &self.controller,
      &other.controller
    )
  }
}

impl CalendarHandle {
  pub fn new(
    controller: Rc<RefCell<InfiniteCalendar>>,
    list_ref: NodeRef,
    refresh: UseForceUpdateHandle
  ) -> Self {
    Self {
      controller,
      list_ref,
      refresh
    }
  }

  pub fn current_offset(&self) -> Px {
    self
      .controller
      .try_borrow()
      .map(|c| c.current_offset())
      .unwrap_or_default()
  }

  pub fn date_offset(
    &self,
    date: NaiveDate
  ) -> Px {
    self
      .controller
      .try_borrow()
      .map(|c| c.date_offset(date))
      .unwrap_or_default()
  }

  pub fn scroll_to(&self, offset: Px) {
    self.update("scroll_to", |c| {
      c.scroll_to(offset);
    });
  }

  pub fn scroll_to_date(
    &self,
    date: NaiveDate,
    extra: i64
  ) {
    self.update("scroll_to_date", |c| {
      c.scroll_to_date(date, extra);
    });
  }

  pub fn scroll_to_today(&self) {
    self.update("scroll_to_today", |c| {
      c.scroll_to_today();
    });
  }

  pub fn set_display(
    &self,
    display: DisplayMode
  ) {
    self.update("set_display", |c| {
      c.set_display(display);
    });
  }

  /// Runs `f` against the controller,
  /// then moves the list and re-renders.
  pub fn update(
    &self,
    op: &'static str,
    f: impl FnOnce(&mut InfiniteCalendar)
  ) {
    let Ok(mut controller) =
      self.controller.try_borrow_mut()
    else {
      tracing::warn!(
        op,
        "calendar busy; ignoring \
         reentrant call"
      );
      return;
    };
    f(&mut controller);
    let offset = controller.current_offset();
    drop(controller);

    sync_scroll_top(&self.list_ref, offset);
    self.refresh.force_update();
  }
}

/// Moves the scroll container to `offset`
/// unless it is already there.
pub fn sync_scroll_top(
  list_ref: &NodeRef,
  offset: Px
) {
  let Some(element) =
    list_ref.cast::<Element>()
  else {
    return;
  };
  let target =
    i32::try_from(offset).unwrap_or(i32::MAX);
  if element.scroll_top() != target {
    element.set_scroll_top(target);
  }
}
