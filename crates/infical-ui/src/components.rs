use chrono::NaiveDate;
use infical_core::calendar::{DayLabels, HeaderView};
use infical_core::virtualize::Px;
use yew::{Callback, Html, MouseEvent, Properties, classes, function_component, html};

/// One rendered day, precomputed by the calendar widget.
#[derive(Clone, PartialEq)]
pub struct DayCell {
    pub date: NaiveDate,
    pub class: String,
    pub style: String,
    pub labels: DayLabels,
    pub selected: bool,
    pub selection_style: String,
    pub disabled: bool,
}

#[derive(Clone, PartialEq)]
pub struct RowCells {
    pub class: String,
    pub style: String,
    pub days: Vec<DayCell>,
}

#[derive(Properties, PartialEq)]
pub struct CalendarHeaderProps {
    pub view: HeaderView,
    pub class: String,
    pub style: String,
    pub on_year: Callback<()>,
    pub on_date: Callback<()>,
}

#[function_component(CalendarHeader)]
pub fn calendar_header(props: &CalendarHeaderProps) -> Html {
    let on_year = props.on_year.clone();
    let on_date = props.on_date.clone();
    let view = &props.view;

    html! {
        <div class={props.class.clone()} style={props.style.clone()}>
            {
                match view.year {
                    Some(year) => html! {
                        <span
                            class={classes!("header-year", view.years_open.then_some("active"))}
                            onclick={move |_| on_year.emit(())}
                        >
                            { year }
                        </span>
                    },
                    None => html! {},
                }
            }
            <span
                class={classes!("header-date", (!view.years_open && !view.blank).then_some("active"))}
                onclick={move |_| on_date.emit(())}
            >
                { &view.label }
            </span>
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct WeekdaysProps {
    pub labels: Vec<String>,
    pub class: String,
    pub style: String,
}

#[function_component(Weekdays)]
pub fn weekdays(props: &WeekdaysProps) -> Html {
    html! {
        <ul class={props.class.clone()} style={props.style.clone()}>
            { for props.labels.iter().map(|label| html! { <li class="weekday">{ label }</li> }) }
        </ul>
    }
}

#[derive(Properties, PartialEq)]
pub struct MonthViewProps {
    pub label: String,
    pub class: String,
    pub style: String,
    pub overlay_class: String,
    pub overlay_style: String,
    pub rows: Vec<RowCells>,
    pub on_day: Callback<NaiveDate>,
}

#[function_component(MonthView)]
pub fn month_view(props: &MonthViewProps) -> Html {
    html! {
        <div class={props.class.clone()} style={props.style.clone()}>
            <div class={props.overlay_class.clone()} style={props.overlay_style.clone()}>
                <span>{ &props.label }</span>
            </div>
            {
                for props.rows.iter().map(|row| html! {
                    <ul class={row.class.clone()} style={row.style.clone()}>
                        {
                            for row.days.iter().map(|day| html! {
                                <DayView cell={day.clone()} on_day={props.on_day.clone()} />
                            })
                        }
                    </ul>
                })
            }
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct DayViewProps {
    pub cell: DayCell,
    pub on_day: Callback<NaiveDate>,
}

#[function_component(DayView)]
pub fn day_view(props: &DayViewProps) -> Html {
    let cell = &props.cell;
    let labels = &cell.labels;
    let onclick = if cell.disabled {
        None
    } else {
        let on_day = props.on_day.clone();
        let date = cell.date;
        Some(Callback::from(move |_: MouseEvent| on_day.emit(date)))
    };

    html! {
        <li class={cell.class.clone()} style={cell.style.clone()} {onclick} data-date={cell.date.to_string()}>
            {
                match &labels.month {
                    Some(month) => html! { <span class="month">{ month }</span> },
                    None => html! {},
                }
            }
            <span>{ labels.number }</span>
            {
                match labels.year {
                    Some(year) => html! { <span class="year">{ year }</span> },
                    None => html! {},
                }
            }
            {
                if cell.selected {
                    html! {
                        <div class="selection" style={cell.selection_style.clone()}>
                            <span class="caption">{ labels.caption.clone().unwrap_or_default() }</span>
                            <span class="day-number">{ labels.number }</span>
                        </div>
                    }
                } else {
                    html! {}
                }
            }
        </li>
    }
}

#[derive(Properties, PartialEq)]
pub struct TodayHelperProps {
    pub label: String,
    pub class: String,
    pub style: String,
    pub chevron_style: String,
    pub on_click: Callback<()>,
}

#[function_component(TodayHelper)]
pub fn today_helper(props: &TodayHelperProps) -> Html {
    let on_click = props.on_click.clone();
    html! {
        <div class={props.class.clone()} style={props.style.clone()} onclick={move |_| on_click.emit(())}>
            <svg class="chevron" width="14" height="14" viewBox="0 0 512 512">
                <path
                    style={props.chevron_style.clone()}
                    d="M256,298.3L256,298.3L256,298.3l174.2-167.2c4.3-4.2,11.4-4.1,15.8,0.2l30.6,29.9c4.4,4.3,4.5,11.3,0.2,15.5L264.1,380.9c-2.2,2.2-5.2,3.2-8.1,3c-3,0.1-5.9-0.9-8.1-3L35.2,176.7c-4.3-4.2-4.2-11.2,0.2-15.5L66,131.3c4.4-4.3,11.5-4.4,15.8-0.2L256,298.3z"
                />
            </svg>
            { &props.label }
        </div>
    }
}

#[derive(Clone, PartialEq)]
pub struct YearItem {
    pub year: i32,
    pub selectable: bool,
    pub selected: bool,
    pub highlighted: bool,
}

#[derive(Properties, PartialEq)]
pub struct YearsListProps {
    pub years: Vec<YearItem>,
    pub height: Px,
    pub style: String,
    pub on_select: Callback<i32>,
}

#[function_component(YearsList)]
pub fn years_list(props: &YearsListProps) -> Html {
    html! {
        <div class="years" style={format!("height: {}px; {}", props.height, props.style)}>
            <ul>
                {
                    for props.years.iter().map(|item| {
                        let year = item.year;
                        let on_select = props.on_select.clone();
                        let onclick = item
                            .selectable
                            .then(|| Callback::from(move |_: MouseEvent| on_select.emit(year)));
                        html! {
                            <li
                                class={classes!(
                                    "year",
                                    item.selected.then_some("selected"),
                                    item.highlighted.then_some("highlighted"),
                                    (!item.selectable).then_some("disabled"),
                                )}
                                {onclick}
                            >
                                { year }
                            </li>
                        }
                    })
                }
            </ul>
        </div>
    }
}
