//! Date picker: years → months → days
//!
//! ```text
//! years   /        grid of years, paging by whole grids (meta), close
//! months  /        grid of months of one year, paging (meta), back to years
//! days    /        month calendar, paging by month (meta), back to months
//! days    /send    closes the picker and posts the chosen date
//! ```
//!
//! Grid sizes travel in the route (`rows`, `columns`) so no state beyond
//! the navigation history is needed.

use anyhow::Context;
use async_trait::async_trait;
use chrono::{Datelike, Local, Month, NaiveDate};
use std::str::FromStr;

use crate::routing::{CallbackContext, Component, Dispatcher, Route, ViewKey};
use crate::transport::{Button, Keyboard, MessageRef, Target};

pub const YEARS: &str = "years";
pub const MONTHS: &str = "months";
pub const DAYS: &str = "days";

const WEEKDAYS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// Largest grid side accepted from a route
const MAX_GRID: u32 = 6;
const YEAR_RANGE: std::ops::RangeInclusive<i32> = 1..=9999;

/// Route opening the picker on a `rows` x `columns` grid starting at `year`
pub fn years_route(year: i32, rows: u32, columns: u32) -> Route {
    Route::new(YEARS)
        .with_path("/")
        .with_arg("year", year)
        .with_arg("rows", rows)
        .with_arg("columns", columns)
}

fn arg<T>(route: &Route, key: &str) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw = route
        .arg(key)
        .with_context(|| format!("route {route} has no {key:?}"))?;
    raw.parse()
        .with_context(|| format!("route {route}: bad {key:?} value {raw:?}"))
}

/// `rows` x `columns` from a route, both within 1..=MAX_GRID
fn grid(route: &Route) -> anyhow::Result<(u32, u32)> {
    let rows: u32 = arg(route, "rows")?;
    let columns: u32 = arg(route, "columns")?;
    let range = 1..=MAX_GRID;
    anyhow::ensure!(
        range.contains(&rows) && range.contains(&columns),
        "route {route}: grid {rows}x{columns} out of range"
    );
    Ok((rows, columns))
}

fn year(route: &Route) -> anyhow::Result<i32> {
    let year: i32 = arg(route, "year")?;
    anyhow::ensure!(YEAR_RANGE.contains(&year), "route {route}: year {year} out of range");
    Ok(year)
}

fn month_name(month: u32) -> anyhow::Result<&'static str> {
    let month = u8::try_from(month)
        .ok()
        .and_then(|m| Month::try_from(m).ok())
        .with_context(|| format!("no such month {month}"))?;
    Ok(month.name())
}

fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    let next = NaiveDate::from_ymd_opt(next_year, next_month, 1)?;
    u32::try_from((next - first).num_days()).ok()
}

// ─────────────────────────────────────────────────────────────────────────────
// Years
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct YearsComponent;

impl YearsComponent {
    fn keyboard(d: &Dispatcher, start: i32, rows: u32, columns: u32) -> Keyboard {
        let mut keyboard: Keyboard = (0..rows)
            .map(|row| {
                (0..columns)
                    .map(|column| {
                        let year = start + (row * columns + column) as i32;
                        let months = Route::new(MONTHS)
                            .with_path("/")
                            .with_arg("year", year)
                            .with_arg("month", 1)
                            .with_arg("rows", 2)
                            .with_arg("columns", 2);
                        d.button(year.to_string(), &months)
                    })
                    .collect()
            })
            .collect();

        let page = (rows * columns) as i32;
        keyboard.push(vec![
            d.button("<<", &years_route(start - page, rows, columns).meta()),
            d.noop_button(" "),
            d.button(">>", &years_route(start + page, rows, columns).meta()),
        ]);
        keyboard.push(vec![d.close_button("Close")]);
        keyboard
    }

    fn render(route: &Route, d: &Dispatcher) -> anyhow::Result<Keyboard> {
        let (rows, columns) = grid(route)?;
        Ok(Self::keyboard(d, year(route)?, rows, columns))
    }
}

#[async_trait]
impl Component for YearsComponent {
    async fn initialize(
        &self,
        route: &Route,
        target: &Target,
        dispatcher: &Dispatcher,
    ) -> anyhow::Result<Option<MessageRef>> {
        let keyboard = Self::render(route, dispatcher)?;
        let message = dispatcher
            .transport()
            .send_message(target, "Select year", Some(&keyboard))
            .await?;
        Ok(Some(message))
    }

    async fn handle(&self, route: &Route, ctx: &CallbackContext) -> anyhow::Result<()> {
        match route.path() {
            "/" => {
                let keyboard = Self::render(route, &ctx.dispatcher)?;
                ctx.transport()
                    .edit_message(ctx.message, "Select year", Some(&keyboard))
                    .await
            }
            other => anyhow::bail!("years has no path {other:?}"),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Months
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct MonthsComponent;

impl MonthsComponent {
    fn page_route(year: i32, start: u32, rows: u32, columns: u32) -> Route {
        Route::new(MONTHS)
            .with_path("/")
            .with_arg("year", year)
            .with_arg("month", start)
            .with_arg("rows", rows)
            .with_arg("columns", columns)
            .meta()
    }

    fn keyboard(d: &Dispatcher, key: ViewKey, route: &Route) -> anyhow::Result<Keyboard> {
        let year = year(route)?;
        let start: u32 = arg(route, "month")?;
        anyhow::ensure!((1..=12).contains(&start), "route {route}: no month {start}");
        let (rows, columns) = grid(route)?;
        let page = rows * columns;

        let mut keyboard = Keyboard::new();
        for row in 0..rows {
            let mut buttons = Vec::new();
            for column in 0..columns {
                let month = start + row * columns + column;
                if month > 12 {
                    buttons.push(d.noop_button(" "));
                    continue;
                }
                let name = month_name(month)?;
                let days = Route::new(DAYS)
                    .with_path("/")
                    .with_arg("year", year)
                    .with_arg("month", month);
                buttons.push(d.button(&name[..3], &days));
            }
            keyboard.push(buttons);
        }

        let previous = match start.checked_sub(page).filter(|m| *m >= 1) {
            Some(month) => d.button("<<", &Self::page_route(year, month, rows, columns)),
            None => d.noop_button(" "),
        };
        let next = if start + page <= 12 {
            d.button(">>", &Self::page_route(year, start + page, rows, columns))
        } else {
            d.noop_button(" ")
        };
        let back = if d.state().navigation.can_go_back(key) {
            d.back_button(year.to_string(), false)
        } else {
            d.noop_button(year.to_string())
        };
        keyboard.push(vec![previous, back, next]);
        Ok(keyboard)
    }
}

#[async_trait]
impl Component for MonthsComponent {
    async fn handle(&self, route: &Route, ctx: &CallbackContext) -> anyhow::Result<()> {
        match route.path() {
            "/" => {
                let keyboard = Self::keyboard(&ctx.dispatcher, ctx.key(), route)?;
                ctx.transport()
                    .edit_message(ctx.message, "Select month", Some(&keyboard))
                    .await
            }
            other => anyhow::bail!("months has no path {other:?}"),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Days
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
pub struct DaysComponent;

impl DaysComponent {
    fn month_route(year: i32, month: u32) -> Route {
        Route::new(DAYS)
            .with_path("/")
            .with_arg("year", year)
            .with_arg("month", month)
            .meta()
    }

    fn keyboard(d: &Dispatcher, key: ViewKey, year: i32, month: u32) -> anyhow::Result<Keyboard> {
        let first = NaiveDate::from_ymd_opt(year, month, 1)
            .with_context(|| format!("invalid month {year}-{month}"))?;
        let days = days_in_month(year, month)
            .with_context(|| format!("invalid month {year}-{month}"))?;
        let today = Local::now().date_naive();

        let title = format!("{} {}", month_name(month)?, year);
        let header = if d.state().navigation.can_go_back(key) {
            d.back_button(title, false)
        } else {
            d.noop_button(title)
        };
        let mut keyboard = vec![
            vec![header],
            WEEKDAYS.iter().map(|day| d.noop_button(*day)).collect(),
        ];

        let mut week: Vec<Button> = (0..first.weekday().num_days_from_sunday())
            .map(|_| d.noop_button(" "))
            .collect();
        for day in 1..=days {
            let label = if first.with_day(day) == Some(today) {
                format!("({day})")
            } else {
                day.to_string()
            };
            let send = Route::new(DAYS)
                .with_path("/send")
                .with_arg("year", year)
                .with_arg("month", format!("{month:02}"))
                .with_arg("day", format!("{day:02}"));
            week.push(d.button(label, &send));
            if week.len() == WEEKDAYS.len() {
                keyboard.push(std::mem::take(&mut week));
            }
        }
        if !week.is_empty() {
            week.resize_with(WEEKDAYS.len(), || d.noop_button(" "));
            keyboard.push(week);
        }

        let previous = if month > 1 {
            d.button("<<", &Self::month_route(year, month - 1))
        } else {
            d.noop_button(" ")
        };
        let next = if month < 12 {
            d.button(">>", &Self::month_route(year, month + 1))
        } else {
            d.noop_button(" ")
        };
        keyboard.push(vec![previous, d.noop_button(" "), next]);
        Ok(keyboard)
    }

    async fn send_date(route: &Route, ctx: &CallbackContext) -> anyhow::Result<()> {
        let text = format!(
            "You have selected the following date: {}.{}.{}",
            route.arg("day").unwrap_or_default(),
            route.arg("month").unwrap_or_default(),
            route.arg("year").unwrap_or_default(),
        );
        ctx.dispatcher
            .navigate_to(&Route::close(), ctx.message, ctx.from)
            .await?;
        ctx.transport()
            .send_message(&Target::chat(ctx.message.chat_id), &text, None)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl Component for DaysComponent {
    async fn handle(&self, route: &Route, ctx: &CallbackContext) -> anyhow::Result<()> {
        match route.path() {
            "/" => {
                let keyboard =
                    Self::keyboard(&ctx.dispatcher, ctx.key(), year(route)?, arg(route, "month")?)?;
                ctx.transport()
                    .edit_message(ctx.message, "Select day", Some(&keyboard))
                    .await
            }
            "/send" => Self::send_date(route, ctx).await,
            other => anyhow::bail!("days has no path {other:?}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RoutingConfig;
    use crate::routing::{ComponentRegistry, RouterState};
    use crate::transport::MemoryTransport;
    use std::sync::Arc;

    fn dispatcher() -> Dispatcher {
        Dispatcher::new(
            Arc::new(RouterState::default()),
            ComponentRegistry::default(),
            Arc::new(MemoryTransport::new()),
            RoutingConfig::default(),
        )
    }

    #[test]
    fn test_days_in_month() {
        assert_eq!(days_in_month(2024, 2), Some(29));
        assert_eq!(days_in_month(2023, 2), Some(28));
        assert_eq!(days_in_month(2024, 12), Some(31));
        assert_eq!(days_in_month(2024, 13), None);
    }

    #[test]
    fn test_years_grid_and_paging() {
        let d = dispatcher();
        let keyboard = YearsComponent::keyboard(&d, 2024, 2, 3);
        assert_eq!(keyboard.len(), 4);
        let labels: Vec<&str> = keyboard[1].iter().map(|b| b.text.as_str()).collect();
        assert_eq!(labels, vec!["2027", "2028", "2029"]);

        let next = Route::decode(&keyboard[2][2].payload).unwrap();
        assert_eq!(next.arg("year"), Some("2030"));
        assert!(next.is_meta());
        assert_eq!(keyboard[2][1].payload, "none");
        assert_eq!(keyboard[3][0].payload, Route::close().encode());
    }

    #[test]
    fn test_months_paging_stops_at_year_edges() {
        let d = dispatcher();
        let key = ViewKey::new(1, 1);
        let first = MonthsComponent::keyboard(&d, key, &MonthsComponent::page_route(2024, 1, 2, 2)).unwrap();
        let labels: Vec<&str> = first[..2].iter().flatten().map(|b| b.text.as_str()).collect();
        assert_eq!(labels, vec!["Jan", "Feb", "Mar", "Apr"]);
        let footer = &first[2];
        assert_eq!(footer[0].payload, "none");
        assert_eq!(Route::decode(&footer[2].payload).unwrap().arg("month"), Some("5"));

        let last = MonthsComponent::keyboard(&d, key, &MonthsComponent::page_route(2024, 9, 2, 2)).unwrap();
        assert_eq!(last[2][2].payload, "none");
        assert_eq!(Route::decode(&last[2][0].payload).unwrap().arg("month"), Some("5"));
    }

    #[test]
    fn test_days_layout() {
        let d = dispatcher();
        // 1 September 2024 is a Sunday: no leading spacers, 30 days over 5 weeks
        let keyboard = DaysComponent::keyboard(&d, ViewKey::new(1, 1), 2024, 9).unwrap();
        assert_eq!(keyboard[0][0].text, "September 2024");
        assert_eq!(keyboard[1].len(), 7);
        let weeks = &keyboard[2..keyboard.len() - 1];
        assert_eq!(weeks.len(), 5);
        assert!(weeks.iter().all(|week| week.len() == 7));

        let first = Route::decode(&weeks[0][0].payload).unwrap();
        assert_eq!(first.path(), "/send");
        assert_eq!(first.arg("day"), Some("01"));
        assert_eq!(first.arg("month"), Some("09"));

        // 1 February 2024 is a Thursday
        let keyboard = DaysComponent::keyboard(&d, ViewKey::new(1, 1), 2024, 2).unwrap();
        let leading = keyboard[2].iter().take_while(|b| b.payload == "none").count();
        assert_eq!(leading, 4);
    }

    #[test]
    fn test_bad_args_are_errors() {
        let route = Route::new(MONTHS).with_path("/").with_arg("year", "soon");
        assert!(arg::<i32>(&route, "year").is_err());
        assert!(arg::<i32>(&route, "month").is_err());
        assert!(month_name(0).is_err());
    }

    #[test]
    fn test_forged_grid_and_year_are_rejected() {
        let d = dispatcher();
        let huge = years_route(2024, u32::MAX, u32::MAX);
        assert!(YearsComponent::render(&huge, &d).is_err());
        assert!(YearsComponent::render(&years_route(2024, 0, 3), &d).is_err());
        assert!(YearsComponent::render(&years_route(i32::MAX, 2, 3), &d).is_err());
        assert_eq!(YearsComponent::render(&years_route(2024, 6, 6), &d).unwrap().len(), 8);

        let key = ViewKey::new(1, 1);
        let months = MonthsComponent::page_route(2024, u32::MAX, 2, 2);
        assert!(MonthsComponent::keyboard(&d, key, &months).is_err());
        let months = MonthsComponent::page_route(2024, 1, 2, 100);
        assert!(MonthsComponent::keyboard(&d, key, &months).is_err());
    }
}
