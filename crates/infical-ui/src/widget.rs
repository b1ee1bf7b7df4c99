//! The infinite calendar as a Yew
//! component.
//!
//! The controller lives in a
//! `use_mut_ref`; DOM events are turned
//! into controller calls and the component
//! re-renders from a fresh snapshot after
//! each one.

use std::rc::Rc;

use chrono::{
  Datelike,
  NaiveDate
};
use gloo::timers::callback::Timeout;
use infical_core::calendar::{
  CalendarHooks,
  InfiniteCalendar,
  KeyAction,
  SelectEvent
};
use infical_core::config::{
  CalendarConfig,
  DisplayMode
};
use infical_core::debounce::SCROLL_DEBOUNCE_MS;
use infical_core::keyboard::Key;
use infical_core::style::{
  resolve_chevron,
  resolve_container,
  resolve_day,
  resolve_header,
  resolve_month,
  resolve_overlay,
  resolve_row,
  resolve_selection,
  resolve_today_helper,
  resolve_weekdays
};
use infical_core::virtualize::Px;
use web_sys::{
  Element,
  HtmlElement,
  KeyboardEvent
};
use yew::functional::use_force_update;
use yew::{
  Callback,
  Event,
  Html,
  Properties,
  function_component,
  html,
  use_effect_with,
  use_mut_ref,
  use_node_ref
};

use crate::components::{
  CalendarHeader,
  DayCell,
  MonthView,
  RowCells,
  TodayHelper,
  Weekdays,
  YearItem,
  YearsList
};
use crate::handle::{
  CalendarHandle,
  sync_scroll_top
};

#[derive(Properties, PartialEq)]
pub struct InfiniteCalendarProps {
  pub config:        Rc<CalendarConfig>,
  pub today:         NaiveDate,
  #[prop_or_default]
  pub before_select:
    Option<Callback<SelectEvent, bool>>,
  #[prop_or_default]
  pub on_select:     Callback<SelectEvent>,
  #[prop_or_default]
  pub after_select:  Callback<SelectEvent>,
  #[prop_or_default]
  pub on_scroll:     Callback<Px>,
  #[prop_or_default]
  pub on_scroll_end: Callback<Px>,
  #[prop_or_default]
  pub on_key_down:   Callback<Key>,
  #[prop_or_default]
  pub on_ready:      Callback<CalendarHandle>
}

fn now_ms() -> u64 {
  js_sys::Date::now().max(0.0) as u64
}

fn hooks_from(
  props: &InfiniteCalendarProps
) -> CalendarHooks {
  let mut hooks = CalendarHooks::default();
  if let Some(guard) =
    props.before_select.clone()
  {
    hooks = hooks.before_select(move |e| {
      guard.emit(e.clone())
    });
  }
  let on_select = props.on_select.clone();
  let after_select =
    props.after_select.clone();
  let on_scroll = props.on_scroll.clone();
  let on_scroll_end =
    props.on_scroll_end.clone();
  let on_key_down =
    props.on_key_down.clone();
  hooks
    .on_select(move |e| {
      on_select.emit(e.clone())
    })
    .after_select(move |e| {
      after_select.emit(e.clone())
    })
    .on_scroll(move |px| on_scroll.emit(px))
    .on_scroll_end(move |px| {
      on_scroll_end.emit(px)
    })
    .on_key_down(move |key| {
      on_key_down.emit(key)
    })
}

#[function_component(InfiniteCalendarView)]
pub fn infinite_calendar_view(
  props: &InfiniteCalendarProps
) -> Html {
  let controller = {
    let config = props.config.clone();
    let today = props.today;
    use_mut_ref(move || {
      InfiniteCalendar::new(
        (*config).clone(),
        today
      )
    })
  };
  let built_from = {
    let config = props.config.clone();
    let today = props.today;
    use_mut_ref(move || (config, today))
  };
  let scroll_end_timer =
    use_mut_ref(|| None::<Timeout>);
  // Offset the list element last reported
  // itself; no need to push it back.
  let dom_offset = use_mut_ref(|| None::<Px>);
  let root_ref = use_node_ref();
  let list_ref = use_node_ref();
  let refresh = use_force_update();

  let stale = {
    let built = built_from.borrow();
    !Rc::ptr_eq(&built.0, &props.config)
      || built.1 != props.today
  };
  if stale {
    tracing::debug!(
      "calendar props changed; rebuilding"
    );
    *controller.borrow_mut() =
      InfiniteCalendar::new(
        (*props.config).clone(),
        props.today
      );
    *built_from.borrow_mut() =
      (props.config.clone(), props.today);
    *scroll_end_timer.borrow_mut() = None;
    *dom_offset.borrow_mut() = None;
  }
  controller
    .borrow_mut()
    .set_hooks(hooks_from(props));

  let (display, offset) = {
    let c = controller.borrow();
    (c.display(), c.current_offset())
  };
  {
    let list_ref = list_ref.clone();
    let dom_offset = dom_offset.clone();
    use_effect_with(
      (display, offset),
      move |(_, offset)| {
        if *dom_offset.borrow() != Some(*offset)
        {
          sync_scroll_top(&list_ref, *offset);
        }
        || ()
      }
    );
  }

  {
    let controller = controller.clone();
    let root_ref = root_ref.clone();
    let list_ref = list_ref.clone();
    let refresh = refresh.clone();
    let on_ready = props.on_ready.clone();
    use_effect_with((), move |_| {
      let (offset, focus) = {
        let c = controller.borrow();
        (
          c.current_offset(),
          c.config().wants_focus()
        )
      };
      sync_scroll_top(&list_ref, offset);
      if focus
        && let Some(element) =
          root_ref.cast::<HtmlElement>()
        && let Err(error) = element.focus()
      {
        tracing::warn!(
          ?error,
          "failed to focus calendar"
        );
      }
      on_ready.emit(CalendarHandle::new(
        controller, list_ref, refresh
      ));
      tracing::info!(offset, "calendar mounted");
      || ()
    });
  }

  let onscroll = {
    let controller = controller.clone();
    let list_ref = list_ref.clone();
    let timer = scroll_end_timer.clone();
    let dom_offset = dom_offset.clone();
    let refresh = refresh.clone();
    Callback::from(move |_: Event| {
      let Some(element) =
        list_ref.cast::<Element>()
      else {
        return;
      };
      let offset =
        Px::try_from(element.scroll_top())
          .unwrap_or(0);
      let now = now_ms();
      let (update, deadline) = {
        let Ok(mut c) =
          controller.try_borrow_mut()
        else {
          return;
        };
        let update = c.on_scroll(offset, now);
        *dom_offset.borrow_mut() =
          Some(c.current_offset());
        (update, c.scroll_end_deadline())
      };
      if let Some(px) = update.follow_up {
        sync_scroll_top(&list_ref, px);
      }

      let due = deadline.unwrap_or(
        now + SCROLL_DEBOUNCE_MS
      );
      let delay = due.saturating_sub(now);
      let controller = controller.clone();
      let refresh_end = refresh.clone();
      // Replacing the timer drops, and so
      // cancels, the previous one.
      *timer.borrow_mut() = Some(
        Timeout::new(
          u32::try_from(delay)
            .unwrap_or(u32::MAX),
          move || {
            let settled = controller
              .try_borrow_mut()
              .ok()
              .and_then(|mut c| {
                c.poll_scroll_end(
                  now_ms().max(due)
                )
              });
            if settled.is_some() {
              refresh_end.force_update();
            }
          }
        )
      );
      refresh.force_update();
    })
  };

  let onkeydown = {
    let controller = controller.clone();
    let list_ref = list_ref.clone();
    let refresh = refresh.clone();
    Callback::from(
      move |event: KeyboardEvent| {
        let key =
          Key::from_dom_key(&event.key());
        let (outcome, offset) = {
          let Ok(mut c) =
            controller.try_borrow_mut()
          else {
            return;
          };
          let outcome = c.handle_key(key);
          (outcome, c.current_offset())
        };
        if outcome.prevent_default {
          event.prevent_default();
        }
        if outcome.action != KeyAction::None
        {
          sync_scroll_top(&list_ref, offset);
          refresh.force_update();
        }
      }
    )
  };

  let handle = CalendarHandle::new(
    controller.clone(),
    list_ref.clone(),
    refresh.clone()
  );
  let on_day = {
    let handle = handle.clone();
    Callback::from(move |date: NaiveDate| {
      handle.update("select_day", |c| {
        c.select_day(date);
      });
    })
  };
  let on_year_header = {
    let handle = handle.clone();
    Callback::from(move |()| {
      handle.update("open_years", |c| {
        c.open_years();
      });
    })
  };
  let on_date_header = {
    let handle = handle.clone();
    Callback::from(move |()| {
      handle.update("scroll_to_selected", |c| {
        c.scroll_to_selected();
      });
    })
  };
  let on_today = {
    let handle = handle.clone();
    Callback::from(move |()| {
      handle.scroll_to_today();
    })
  };
  let on_pick_year = Callback::from(
    move |year: i32| {
      handle.update("select_year", |c| {
        c.select_year(year);
      });
    }
  );

  let calendar = controller.borrow();
  render(
    &calendar,
    &CalendarCallbacks {
      onscroll,
      onkeydown,
      on_day,
      on_year_header,
      on_date_header,
      on_today,
      on_pick_year
    },
    &root_ref,
    &list_ref
  )
}

struct CalendarCallbacks {
  onscroll:       Callback<Event>,
  onkeydown:      Callback<KeyboardEvent>,
  on_day:         Callback<NaiveDate>,
  on_year_header: Callback<()>,
  on_date_header: Callback<()>,
  on_today:       Callback<()>,
  on_pick_year:   Callback<i32>
}

fn render(
  calendar: &InfiniteCalendar,
  callbacks: &CalendarCallbacks,
  root_ref: &yew::NodeRef,
  list_ref: &yew::NodeRef
) -> Html {
  let config = calendar.config();
  let theme = &config.theme;
  let container = resolve_container(
    theme,
    config.layout,
    config.width
  );

  let header = calendar.header().map(|view| {
    let resolved = resolve_header(
      theme,
      config.layout,
      view.animate,
      view.blank
    );
    html! {
      <CalendarHeader
        view={view}
        class={resolved.class_string()}
        style={resolved.style.to_string()}
        on_year={callbacks.on_year_header.clone()}
        on_date={callbacks.on_date_header.clone()}
      />
    }
  });

  let weekdays = resolve_weekdays(theme);
  let weekday_labels = config
    .locale
    .weekday_labels()
    .into_iter()
    .map(str::to_string)
    .collect::<Vec<_>>();

  // The days list stays mounted under the
  // years overlay so its scroll position
  // survives the switch.
  let years = (calendar.display()
    == DisplayMode::Years)
    .then(|| render_years(calendar, callbacks));

  html! {
    <div
      ref={root_ref.clone()}
      class={container.class_string()}
      style={container.style.to_string()}
      tabindex={config.tab_index.to_string()}
      onkeydown={callbacks.onkeydown.clone()}
    >
      { header.unwrap_or_default() }
      <div class="wrapper">
        <Weekdays
          labels={weekday_labels}
          class={weekdays.class_string()}
          style={weekdays.style.to_string()}
        />
        { render_days(calendar, callbacks, list_ref) }
        { years.unwrap_or_default() }
      </div>
    </div>
  }
}

fn render_days(
  calendar: &InfiniteCalendar,
  callbacks: &CalendarCallbacks,
  list_ref: &yew::NodeRef
) -> Html {
  let config = calendar.config();
  let theme = &config.theme;
  let viewport = calendar.viewport();
  let window = viewport.window;
  let row_height = config.row_height;
  let selection_style =
    resolve_selection(theme).style.to_string();
  let month_style = resolve_month(theme);

  let months = calendar
    .mounted_months()
    .iter()
    .map(|month| {
      let overlay = resolve_overlay(
        theme,
        month.partial_first_row(),
        calendar.overlay_visible()
      );
      let rows = month
        .rows
        .iter()
        .map(|row| {
          let resolved =
            resolve_row(row.len(), row_height);
          RowCells {
            class: resolved.class_string(),
            style: resolved.style.to_string(),
            days:  row
              .iter()
              .map(|day| {
                let flags =
                  calendar.day_flags(day.date);
                let resolved =
                  resolve_day(theme, flags);
                DayCell {
                  date:            day.date,
                  class:           resolved
                    .class_string(),
                  style:           resolved
                    .style
                    .to_string(),
                  labels:          calendar
                    .day_labels(day),
                  selected:        flags.selected,
                  selection_style: selection_style
                    .clone(),
                  disabled:        flags.disabled
                }
              })
              .collect()
          }
        })
        .collect::<Vec<_>>();
      html! {
        <MonthView
          key={format!("{}-{}", month.year, month.month)}
          label={calendar.overlay_label(month)}
          class={month_style.class_string()}
          style={month_style.style.to_string()}
          overlay_class={overlay.class_string()}
          overlay_style={overlay.style.to_string()}
          rows={rows}
          on_day={callbacks.on_day.clone()}
        />
      }
    })
    .collect::<Html>();

  let helper = (config.show_today_helper
    && calendar.today_position().is_shown())
  .then(|| {
    let resolved = resolve_today_helper(
      theme,
      calendar.today_position()
    );
    html! {
      <TodayHelper
        label={config.locale.today_label.long.clone()}
        class={resolved.class_string()}
        style={resolved.style.to_string()}
        chevron_style={resolve_chevron(theme).to_string()}
        on_click={callbacks.on_today.clone()}
      />
    }
  });

  html! {
    <div class="list-container">
      { helper.unwrap_or_default() }
      <div
        ref={list_ref.clone()}
        class="list"
        style={format!(
          "height: {}px; overflow-y: auto;",
          viewport.height
        )}
        onscroll={callbacks.onscroll.clone()}
      >
        <div style={format!(
          "padding-top: {}px; padding-bottom: {}px;",
          window.top_pad,
          window.bottom_pad
        )}>
          { months }
        </div>
      </div>
    </div>
  }
}

fn render_years(
  calendar: &InfiniteCalendar,
  callbacks: &CalendarCallbacks
) -> Html {
  let constraints = calendar.constraints();
  let selected_year = calendar
    .selection()
    .primary()
    .map(|d| d.year());
  let years = calendar
    .years()
    .years()
    .map(|year| {
      YearItem {
        year,
        selectable: calendar
          .years()
          .is_selectable(year, constraints),
        selected: selected_year == Some(year),
        highlighted: calendar.highlighted_year()
          == Some(year)
      }
    })
    .collect::<Vec<_>>();

  html! {
    <YearsList
      years={years}
      height={calendar.viewport().height}
      style={format!(
        "color: {};",
        calendar.config().theme.header_color
      )}
      on_select={callbacks.on_pick_year.clone()}
    />
  }
}
