mod all;
mod fetch;
mod seats;
mod token;
mod week;

use anyhow::Result;
use chrono::{Local, NaiveDate};
use showtimes::{Credential, FetchError, ShowtimeFetchClient, ShowtimeRequest, parse_business_date};
use tracing::warn;

use crate::cli::{Cli, Commands};
use crate::context::CommandContext;
use crate::theaters::Theater;

pub async fn dispatch(cli: Cli) -> Result<()> {
	let ctx = CommandContext::load(cli.config.as_deref(), cli.theaters)?;

	match cli.command {
		Commands::Token { force } => token::execute(force, &ctx).await,
		Commands::Fetch { site, date, token } => fetch::execute(&site, date.as_deref(), token, &ctx).await,
		Commands::All { date } => all::execute(date.as_deref(), &ctx).await,
		Commands::Week { start } => week::execute(start.as_deref(), &ctx).await,
		Commands::Seats { site, date } => seats::execute(&site, &date, &ctx).await,
	}
}

/// Parses `--date`, defaulting to today.
fn date_or_today(input: Option<&str>) -> Result<NaiveDate> {
	match input {
		Some(input) => Ok(parse_business_date(input)?),
		None => Ok(Local::now().date_naive()),
	}
}

/// Tally of a batch run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct BatchSummary {
	saved: usize,
	failed: usize,
}

impl BatchSummary {
	fn report(&self, what: &str) {
		println!("{what}: {} saved, {} failed", self.saved, self.failed);
	}
}

/// Fetches every theater for `date`. A credential refreshed for one theater
/// is carried to the next even when that theater's fetch failed. Failures are
/// logged per theater and do not stop the batch.
async fn fetch_day(
	client: &ShowtimeFetchClient,
	theaters: &[Theater],
	date: NaiveDate,
	credential: &mut Credential,
	summary: &mut BatchSummary,
) {
	for theater in theaters {
		let request = ShowtimeRequest::new(&theater.key, date);
		match client.fetch_showtimes(credential, &request).await {
			Ok(outcome) => {
				println!("{} ({}): {}", theater.label(), request, outcome.path.display());
				summary.saved += 1;
			}
			Err(err) => {
				log_failure(theater, &request, &err);
				summary.failed += 1;
			}
		}
	}
}

fn log_failure(theater: &Theater, request: &ShowtimeRequest, err: &FetchError) {
	warn!(
		target = "showtimes",
		theater = theater.label(),
		site = %request.site_id,
		date = %request.date,
		error = %err,
		"showtimes fetch failed"
	);
}
