use chrono::{Datelike, Local, NaiveDate};

/// Birthday wire format, e.g. `1996.03.14.` (trailing dot included).
pub const BIRTHDAY_FORMAT: &str = "%Y.%m.%d.";

/// App-standard timestamp used for `lastModified`.
const STANDARD_FORMAT: &str = "%Y.%m.%d. %H:%M:%S";

pub fn birthday_string(date: NaiveDate) -> String {
    date.format(BIRTHDAY_FORMAT).to_string()
}

pub fn parse_birthday(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw, BIRTHDAY_FORMAT).ok()
}

pub fn standard_now_string() -> String {
    Local::now().format(STANDARD_FORMAT).to_string()
}

pub fn current_year_month() -> (i32, u32) {
    let now = Local::now();
    (now.year(), now.month())
}
