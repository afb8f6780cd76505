use anyhow::Result;
use tracing::info;

use super::{BatchSummary, date_or_today, fetch_day};
use crate::context::CommandContext;

pub async fn execute(date: Option<&str>, ctx: &CommandContext) -> Result<()> {
	let date = date_or_today(date)?;
	let theaters = ctx.theaters()?;
	let mut credential = ctx.credential(false).await?;

	info!(target = "showtimes", %date, theaters = theaters.len(), "fetching all theaters");
	let mut summary = BatchSummary::default();
	fetch_day(&ctx.showtimes_client(), &theaters, date, &mut credential, &mut summary).await;
	summary.report(&date.to_string());
	Ok(())
}
