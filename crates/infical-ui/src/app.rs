use std::rc::Rc;

use chrono::NaiveDate;
use infical_core::calendar::SelectEvent;
use infical_core::config::{
  CalendarConfig,
  DisplayMode
};
use infical_core::date::{
  resolve_timezone,
  shift_months,
  today_in
};
use infical_core::keyboard::Key;
use infical_core::virtualize::Px;
use yew::{
  Callback,
  Html,
  MouseEvent,
  Reducible,
  function_component,
  html,
  use_memo,
  use_reducer,
  use_state
};

use crate::handle::CalendarHandle;
use crate::widget::InfiniteCalendarView;

const DEFAULT_CONFIG: &str =
  include_str!("../assets/calendar.toml");
const LOG_LIMIT: usize = 12;

fn load_config() -> CalendarConfig {
  match CalendarConfig::from_toml_str(
    DEFAULT_CONFIG
  ) {
    | Ok(cfg) => cfg,
    | Err(error) => {
      tracing::warn!(
        error = %error,
        "bundled calendar config rejected; \
         using defaults"
      );
      CalendarConfig::default()
    }
  }
}

#[derive(Clone, PartialEq, Default)]
struct EventLog {
  lines: Vec<String>
}

impl Reducible for EventLog {
  type Action = String;

  fn reduce(
    self: Rc<Self>,
    line: String
  ) -> Rc<Self> {
    let mut lines = self.lines.clone();
    lines.push(line);
    if lines.len() > LOG_LIMIT {
      lines.drain(..lines.len() - LOG_LIMIT);
    }
    Rc::new(Self { lines })
  }
}

fn describe(
  stage: &str,
  event: &SelectEvent
) -> String {
  format!(
    "{stage}: {} {:?} ({} selected)",
    event.date,
    event.toggle,
    event.selection.len()
  )
}

#[function_component(App)]
pub fn app() -> Html {
  let base = use_memo((), |_| load_config());
  let today = *use_memo((), |_| {
    today_in(resolve_timezone(
      base.timezone.as_deref()
    ))
  });
  let multi = use_state(|| base.multi_date);
  let locked = use_state(|| false);
  let handle =
    use_state(|| None::<CalendarHandle>);
  let log = use_reducer(EventLog::default);

  let config = {
    let base = base.clone();
    use_memo(*multi, move |multi| {
      let mut cfg = (*base).clone();
      cfg.multi_date = *multi;
      Rc::new(cfg)
    })
  };

  let before_select = {
    let locked = *locked;
    let log = log.dispatcher();
    Callback::from(move |event: SelectEvent| {
      if locked {
        log.dispatch(describe(
          "vetoed",
          &event
        ));
      }
      !locked
    })
  };
  let on_select = {
    let log = log.dispatcher();
    Callback::from(move |event: SelectEvent| {
      log.dispatch(describe("select", &event));
    })
  };
  let after_select = {
    let log = log.dispatcher();
    Callback::from(move |event: SelectEvent| {
      log.dispatch(describe("after", &event));
    })
  };
  let on_scroll_end = {
    let log = log.dispatcher();
    Callback::from(move |offset: Px| {
      log.dispatch(format!(
        "scroll end at {offset}px"
      ));
    })
  };
  let on_key_down = {
    let log = log.dispatcher();
    Callback::from(move |key: Key| {
      if key != Key::Other {
        log.dispatch(format!("key {key:?}"));
      }
    })
  };
  let on_ready = {
    let handle = handle.clone();
    Callback::from(
      move |ready: CalendarHandle| {
        handle.set(Some(ready));
      }
    )
  };

  let jump = |label: &'static str,
              target: NaiveDate| {
    let handle = (*handle).clone();
    let onclick = Callback::from(move |_: MouseEvent| {
      if let Some(handle) = handle.as_ref() {
        handle.scroll_to_date(target, 0);
      }
    });
    html! {
      <button class="btn" {onclick}>{ label }</button>
    }
  };
  let on_today = {
    let handle = (*handle).clone();
    Callback::from(move |_: MouseEvent| {
      if let Some(handle) = handle.as_ref() {
        handle.scroll_to_today();
      }
    })
  };
  let on_years = {
    let handle = (*handle).clone();
    Callback::from(move |_: MouseEvent| {
      if let Some(handle) = handle.as_ref() {
        handle.set_display(DisplayMode::Years);
      }
    })
  };
  let on_toggle_multi = {
    let multi = multi.clone();
    Callback::from(move |_: MouseEvent| {
      multi.set(!*multi);
    })
  };
  let on_toggle_lock = {
    let locked = locked.clone();
    Callback::from(move |_: MouseEvent| {
      locked.set(!*locked);
    })
  };

  html! {
    <div class="demo">
      <InfiniteCalendarView
        config={(*config).clone()}
        today={today}
        before_select={Some(before_select)}
        on_select={on_select}
        after_select={after_select}
        on_scroll_end={on_scroll_end}
        on_key_down={on_key_down}
        on_ready={on_ready}
      />
      <aside class="panel">
        <div class="controls">
          <button class="btn" onclick={on_today}>{ "Today" }</button>
          { jump("-1 year", shift_months(today, -12)) }
          { jump("+1 year", shift_months(today, 12)) }
          <button class="btn" onclick={on_years}>{ "Years" }</button>
          <label>
            <input
              type="checkbox"
              checked={*multi}
              onclick={on_toggle_multi}
            />
            { "Multiple dates" }
          </label>
          <label>
            <input
              type="checkbox"
              checked={*locked}
              onclick={on_toggle_lock}
            />
            { "Lock selection" }
          </label>
        </div>
        <ul class="event-log">
          {
            for log.lines.iter().rev().map(|line| {
              html! { <li>{ line }</li> }
            })
          }
        </ul>
      </aside>
    </div>
  }
}
