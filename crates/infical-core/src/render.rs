use std::io::{self, IsTerminal, Write};

use anyhow::anyhow;
use chrono::Datelike;
use unicode_width::UnicodeWidthStr;

use crate::calendar::InfiniteCalendar;
use crate::months::Month;
use crate::scroll::TodayPosition;
use crate::style::{Resolved, resolve_day, resolve_today_helper};

const CELL_WIDTH: usize = 4;

#[derive(Debug, Clone)]
pub struct Renderer {
    color: bool,
}

impl Renderer {
    pub fn new(setting: &str) -> anyhow::Result<Self> {
        let color = match setting.to_ascii_lowercase().as_str() {
            "on" | "yes" | "true" | "1" | "auto" => io::stdout().is_terminal(),
            "off" | "no" | "false" | "0" => false,
            other => return Err(anyhow!("invalid color setting: {other}")),
        };
        Ok(Self { color })
    }

    #[must_use]
    pub fn plain() -> Self {
        Self { color: false }
    }

    #[tracing::instrument(skip(self, calendar))]
    pub fn print_window(&self, calendar: &InfiniteCalendar) -> anyhow::Result<()> {
        let mut out = io::stdout().lock();
        self.write_window(&mut out, calendar)
    }

    pub fn write_window<W: Write>(
        &self,
        mut out: W,
        calendar: &InfiniteCalendar,
    ) -> anyhow::Result<()> {
        if let Some(header) = calendar.header() {
            let label = if header.blank {
                self.paint(&header.label, "2")
            } else {
                self.paint(&header.label, "1")
            };
            match header.year {
                Some(year) => writeln!(out, "{year}  {label}")?,
                None => writeln!(out, "{label}")?,
            }
        }

        let helper = resolve_today_helper(&calendar.config().theme, calendar.today_position());
        if helper.has_class("show") {
            let arrow = match calendar.today_position() {
                TodayPosition::Above => "^",
                TodayPosition::Below => "v",
                TodayPosition::Hidden => "",
            };
            let label = calendar.config().locale.today_label.long.as_str();
            writeln!(out, "{}", self.paint(&format!("{arrow} {label}"), "36"))?;
        }

        let weekdays = calendar
            .config()
            .locale
            .weekday_labels()
            .into_iter()
            .map(|name| pad_left(name, CELL_WIDTH))
            .collect::<String>();
        writeln!(out, "{}", self.paint(&weekdays, "36"))?;

        let viewport = calendar.viewport();
        writeln!(
            out,
            "{}",
            self.paint(
                &format!(
                    "offset {} / {}  months {}..{}",
                    viewport.offset,
                    calendar.layout().total_height(),
                    viewport.window.start,
                    viewport.window.end
                ),
                "2"
            )
        )?;

        for month in calendar.mounted_months() {
            self.write_month(&mut out, calendar, month)?;
        }
        Ok(())
    }

    fn write_month<W: Write>(
        &self,
        out: &mut W,
        calendar: &InfiniteCalendar,
        month: &Month,
    ) -> anyhow::Result<()> {
        let week_start = calendar.layout().week_start();
        let theme = &calendar.config().theme;

        writeln!(out)?;
        writeln!(out, "{}", self.paint(&calendar.overlay_label(month), "1"))?;

        for row in &month.rows {
            let mut line = String::new();
            if let Some(first) = row.first() {
                let lead = (first.weekday + 7 - week_start) % 7;
                line.push_str(&" ".repeat(lead as usize * CELL_WIDTH));
            }
            for day in row {
                let resolved = resolve_day(theme, calendar.day_flags(day.date));
                let cell = pad_left(&day.date.day().to_string(), CELL_WIDTH);
                line.push_str(&self.paint_day(&cell, &resolved));
            }
            writeln!(out, "{line}")?;
        }
        Ok(())
    }

    fn paint_day(&self, cell: &str, resolved: &Resolved) -> String {
        let mut codes = Vec::new();
        if resolved.has_class("disabled") {
            codes.push("2");
        }
        if resolved.has_class("today") {
            codes.push("33");
        }
        if resolved.has_class("selected") {
            codes.push("7");
        }
        if resolved.has_class("fixed") {
            codes.push("1");
        }
        if resolved.has_class("highlighted") {
            codes.push("4");
        }

        if !self.color {
            let marker = if resolved.has_class("highlighted") {
                '>'
            } else if resolved.has_class("fixed") {
                '#'
            } else if resolved.has_class("selected") {
                '*'
            } else if resolved.has_class("today") {
                '!'
            } else {
                ' '
            };
            let trimmed = cell.trim_start();
            let pad = CELL_WIDTH.saturating_sub(trimmed.width() + 1);
            return format!("{}{marker}{trimmed}", " ".repeat(pad));
        }
        if codes.is_empty() {
            return cell.to_string();
        }
        format!("\x1b[{}m{cell}\x1b[0m", codes.join(";"))
    }

    #[tracing::instrument(skip(self, rows))]
    pub fn print_table(&self, headers: &[&str], rows: Vec<Vec<String>>) -> anyhow::Result<()> {
        let out = io::stdout().lock();
        write_table(out, headers, rows)
    }

    fn paint(&self, text: &str, code: &str) -> String {
        if !self.color {
            return text.to_string();
        }
        format!("\x1b[{code}m{text}\x1b[0m")
    }
}

fn pad_left(text: &str, width: usize) -> String {
    let visible = UnicodeWidthStr::width(text);
    format!("{}{text}", " ".repeat(width.saturating_sub(visible)))
}

pub fn write_table<W: Write>(
    mut writer: W,
    headers: &[&str],
    rows: Vec<Vec<String>>,
) -> anyhow::Result<()> {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.width()).collect();
    for row in &rows {
        for (idx, cell) in row.iter().enumerate() {
            if let Some(width) = widths.get_mut(idx) {
                *width = (*width).max(cell.width());
            }
        }
    }

    let line = headers
        .iter()
        .zip(&widths)
        .map(|(h, w)| format!("{h}{}", " ".repeat(w.saturating_sub(h.width()))))
        .collect::<Vec<_>>()
        .join(" ");
    writeln!(writer, "{}", line.trim_end())?;
    let rule = widths
        .iter()
        .map(|w| "-".repeat(*w))
        .collect::<Vec<_>>()
        .join(" ");
    writeln!(writer, "{rule}")?;

    for row in rows {
        let line = row
            .iter()
            .zip(&widths)
            .map(|(cell, w)| {
                let pad = w.saturating_sub(cell.width());
                format!("{cell}{}", " ".repeat(pad))
            })
            .collect::<Vec<_>>()
            .join(" ");
        writeln!(writer, "{}", line.trim_end())?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::config::CalendarConfig;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn renders_mounted_months_with_markers() {
        let cfg = CalendarConfig {
            min: ymd(2020, 1, 1),
            max: ymd(2020, 3, 31),
            selected_dates: Some(vec![ymd(2020, 1, 15)]),
            ..CalendarConfig::default()
        };
        let calendar = InfiniteCalendar::new(cfg, ymd(2020, 1, 2));
        let mut buf = Vec::new();
        Renderer::plain()
            .write_window(&mut buf, &calendar)
            .expect("render");
        let text = String::from_utf8(buf).expect("utf8");

        assert!(text.contains("Wed, Jan 15th"));
        assert!(text.contains(" Sun Mon Tue Wed Thu Fri Sat"));
        assert!(text.contains("January"));
        assert!(text.contains("*15"));
        assert!(text.contains(" !2"));
        // January 2020 starts on a Wednesday.
        assert!(text.contains("\n               1  !2   3   4\n"));
    }

    #[test]
    fn table_columns_align_on_display_width() {
        let mut buf = Vec::new();
        write_table(
            &mut buf,
            &["name", "rows"],
            vec![vec!["三月".to_string(), "5".to_string()]],
        )
        .expect("table");
        let text = String::from_utf8(buf).expect("utf8");
        assert_eq!(text, "name rows\n---- ----\n三月 5\n");
    }
}
