use anyhow::Result;
use tracing::info;

use crate::context::CommandContext;

pub async fn execute(force: bool, ctx: &CommandContext) -> Result<()> {
	info!(target = "showtimes", force, "resolving credential");
	let credential = ctx.credential(force).await?;
	info!(target = "showtimes", validity = ?credential.validity(), "credential ready");
	println!("{}", credential.as_str());
	Ok(())
}
