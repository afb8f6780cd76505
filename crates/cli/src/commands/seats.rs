use anyhow::{Context, Result};
use showtimes::{ShowtimeRequest, parse_business_date, stored_show_refs};
use tracing::{info, warn};

use super::BatchSummary;
use crate::context::CommandContext;

pub async fn execute(site: &str, date: &str, ctx: &CommandContext) -> Result<()> {
	let date = parse_business_date(date)?;
	let layout = ctx.layout();
	let mut credential = ctx.credential(false).await?;

	let mut shows = stored_show_refs(&layout, site, date);
	if shows.is_empty() {
		let request = ShowtimeRequest::new(site, date);
		info!(target = "showtimes", %request, "no stored showtimes; fetching them first");
		ctx.showtimes_client()
			.fetch_showtimes(&mut credential, &request)
			.await
			.with_context(|| format!("failed to fetch showtimes for {request}"))?;
		shows = stored_show_refs(&layout, site, date);
	}
	if shows.is_empty() {
		println!("no shows found for site {site} on {date}");
		return Ok(());
	}

	let client = ctx.seat_client();
	let mut summary = BatchSummary::default();
	for show in &shows {
		match client.fetch_seat_availability(&mut credential, &show.id, date).await {
			Ok(outcome) => {
				println!("{} ({}): {}", show.id, show.starts_at.as_deref().unwrap_or("-"), outcome.path.display());
				summary.saved += 1;
			}
			Err(err) => {
				warn!(target = "showtimes", show_id = %show.id, error = %err, "seat availability fetch failed");
				summary.failed += 1;
			}
		}
	}
	summary.report(&format!("seats for site {site} on {date}"));
	Ok(())
}
