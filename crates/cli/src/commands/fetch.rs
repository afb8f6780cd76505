use anyhow::Result;
use showtimes::{Credential, ShowtimeRequest};
use tracing::info;

use super::date_or_today;
use crate::context::CommandContext;
use crate::theaters::find_theater;

pub async fn execute(site: &str, date: Option<&str>, token: Option<String>, ctx: &CommandContext) -> Result<()> {
	let date = date_or_today(date)?;
	let theaters = ctx.theaters()?;
	let theater = find_theater(&theaters, site)?;

	let mut credential = match token {
		Some(token) => Credential::new(token),
		None => ctx.credential(false).await?,
	};

	let request = ShowtimeRequest::new(&theater.key, date);
	info!(target = "showtimes", theater = theater.label(), %request, "fetching showtimes");
	let outcome = ctx.showtimes_client().fetch_showtimes(&mut credential, &request).await?;
	println!("{} ({}): {}", theater.label(), request, outcome.path.display());
	Ok(())
}
