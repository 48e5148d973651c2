use chrono::NaiveDate;

/// The browser's local calendar date.
#[cfg(target_arch = "wasm32")]
pub fn today() -> NaiveDate {
    let now = js_sys::Date::new_0();
    NaiveDate::from_ymd_opt(
        now.get_full_year() as i32,
        now.get_month() + 1,
        now.get_date(),
    )
    .unwrap_or_default()
}

#[cfg(not(target_arch = "wasm32"))]
pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// Parse the value of an `<input type="date">`.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date_input() {
        assert_eq!(parse_date("2026-03-14"), NaiveDate::from_ymd_opt(2026, 3, 14));
        assert_eq!(parse_date(""), None);
    }
}
