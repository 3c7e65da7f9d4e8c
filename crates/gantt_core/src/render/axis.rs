use time::{Date, Month};

/// Linear mapping from calendar dates to horizontal pixel positions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeScale {
    start: Date,
    end: Date,
    left: f64,
    width: f64,
}

impl TimeScale {
    /// A range of zero days is widened to one so every bar has somewhere to sit.
    pub fn new(start: Date, end: Date, left: f64, width: f64) -> Self {
        let (start, end) = if end > start {
            (start, end)
        } else {
            (start, start.next_day().unwrap_or(start))
        };
        Self {
            start,
            end,
            left,
            width,
        }
    }

    pub fn start(&self) -> Date {
        self.start
    }

    pub fn end(&self) -> Date {
        self.end
    }

    pub fn span_days(&self) -> i64 {
        (self.end - self.start).whole_days().max(1)
    }

    pub fn px_per_day(&self) -> f64 {
        self.width / self.span_days() as f64
    }

    pub fn x(&self, date: Date) -> f64 {
        self.left + (date - self.start).whole_days() as f64 * self.px_per_day()
    }
}

/// First day of every month inside `[start, end]`.
pub fn month_ticks(start: Date, end: Date) -> Vec<Date> {
    let mut ticks = Vec::new();
    let Some(mut tick) = first_of_month(start.year(), start.month()) else {
        return ticks;
    };
    if tick < start {
        tick = match next_month(tick) {
            Some(next) => next,
            None => return ticks,
        };
    }

    while tick <= end {
        ticks.push(tick);
        tick = match next_month(tick) {
            Some(next) => next,
            None => break,
        };
    }
    ticks
}

pub fn month_label(date: Date) -> String {
    format!("{:04}-{:02}", date.year(), u8::from(date.month()))
}

fn first_of_month(year: i32, month: Month) -> Option<Date> {
    Date::from_calendar_date(year, month, 1).ok()
}

fn next_month(date: Date) -> Option<Date> {
    let year = if date.month() == Month::December {
        date.year() + 1
    } else {
        date.year()
    };
    first_of_month(year, date.month().next())
}
