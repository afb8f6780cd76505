use anyhow::Result;
use chrono::Local;
use showtimes::{date_range, next_or_current_friday, parse_business_date};
use tracing::info;

use super::{BatchSummary, fetch_day};
use crate::context::CommandContext;

const WEEK_DAYS: u64 = 7;

pub async fn execute(start: Option<&str>, ctx: &CommandContext) -> Result<()> {
	let start = match start {
		Some(input) => parse_business_date(input)?,
		None => next_or_current_friday(Local::now().date_naive()),
	};
	let theaters = ctx.theaters()?;
	let mut credential = ctx.credential(false).await?;
	let client = ctx.showtimes_client();

	let mut summary = BatchSummary::default();
	for date in date_range(start, WEEK_DAYS) {
		info!(target = "showtimes", %date, theaters = theaters.len(), "fetching day");
		fetch_day(&client, &theaters, date, &mut credential, &mut summary).await;
	}
	summary.report(&format!("week from {start}"));
	Ok(())
}
