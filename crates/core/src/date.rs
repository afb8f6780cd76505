//! Business dates as the batch drivers accept them.

use chrono::{Datelike, Days, NaiveDate, Weekday};

use crate::error::InvalidDate;

/// Parses `YYYY-MM-DD`, falling back to the Finnish `D.M.YYYY` form.
pub fn parse_business_date(input: &str) -> Result<NaiveDate, InvalidDate> {
	let input = input.trim();
	NaiveDate::parse_from_str(input, "%Y-%m-%d")
		.or_else(|_| NaiveDate::parse_from_str(input, "%d.%m.%Y"))
		.map_err(|_| InvalidDate(input.to_string()))
}

/// Finnish cinema weeks start on Friday.
pub fn next_or_current_friday(from: NaiveDate) -> NaiveDate {
	let days_ahead = (7 + Weekday::Fri.num_days_from_monday() - from.weekday().num_days_from_monday()) % 7;
	from + Days::new(u64::from(days_ahead))
}

/// `days` consecutive dates starting at `start`.
pub fn date_range(start: NaiveDate, days: u64) -> impl Iterator<Item = NaiveDate> {
	(0..days).map(move |offset| start + Days::new(offset))
}

#[cfg(test)]
mod tests {
	use super::*;

	fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
		NaiveDate::from_ymd_opt(y, m, d).unwrap()
	}

	#[test]
	fn iso_and_dotted_forms_parse() {
		assert_eq!(parse_business_date("2026-01-02"), Ok(ymd(2026, 1, 2)));
		assert_eq!(parse_business_date("2.1.2026"), Ok(ymd(2026, 1, 2)));
		assert_eq!(parse_business_date(" 02.01.2026 "), Ok(ymd(2026, 1, 2)));
	}

	#[test]
	fn garbage_is_rejected() {
		assert_eq!(parse_business_date("tomorrow"), Err(InvalidDate("tomorrow".into())));
		assert!(parse_business_date("2026-02-30").is_err());
		assert!(parse_business_date("1.2").is_err());
	}

	#[test]
	fn friday_is_its_own_week_start() {
		assert_eq!(next_or_current_friday(ymd(2026, 1, 2)), ymd(2026, 1, 2));
	}

	#[test]
	fn saturday_rolls_to_next_friday() {
		assert_eq!(next_or_current_friday(ymd(2026, 1, 3)), ymd(2026, 1, 9));
		assert_eq!(next_or_current_friday(ymd(2026, 1, 8)), ymd(2026, 1, 9));
	}

	#[test]
	fn range_covers_a_week() {
		let week: Vec<_> = date_range(ymd(2025, 12, 26), 7).collect();
		assert_eq!(week.len(), 7);
		assert_eq!(week[0], ymd(2025, 12, 26));
		assert_eq!(week[6], ymd(2026, 1, 1));
	}
}
