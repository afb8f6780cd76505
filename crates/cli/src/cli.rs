use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "showtimes")]
#[command(about = "Collect cinema showtimes and seat availability from a Vista digital API")]
#[command(version)]
pub struct Cli {
	/// Increase verbosity (-v info, -vv debug, -vvv trace)
	#[arg(short, long, global = true, action = clap::ArgAction::Count)]
	pub verbose: u8,

	/// JSON config file (camelCase keys, all optional)
	#[arg(short, long, global = true, value_name = "FILE")]
	pub config: Option<PathBuf>,

	/// Theater list overriding the configured one
	#[arg(long, global = true, value_name = "FILE")]
	pub theaters: Option<PathBuf>,

	#[command(subcommand)]
	pub command: Commands,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
	/// Print a usable bearer credential, acquiring one if needed
	Token {
		/// Skip the cache and capture a new credential
		#[arg(long)]
		force: bool,
	},

	/// Fetch showtimes for one theater
	Fetch {
		/// Theater key from the theater list (e.g. 1014)
		site: String,
		/// Business date (YYYY-MM-DD or D.M.YYYY); defaults to today
		#[arg(long)]
		date: Option<String>,
		/// Reuse this credential instead of consulting the cache
		#[arg(long)]
		token: Option<String>,
	},

	/// Fetch showtimes for every theater on one date
	All {
		#[arg(long)]
		date: Option<String>,
	},

	/// Fetch seven days of showtimes for every theater
	Week {
		/// First day; defaults to the next or current Friday
		#[arg(long)]
		start: Option<String>,
	},

	/// Fetch seat availability for every show of a theater on a date
	Seats { site: String, date: String },
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn fetch_accepts_date_and_token() {
		let cli = Cli::try_parse_from(["showtimes", "fetch", "1014", "--date", "2.1.2026", "--token", "Bearer x"]).unwrap();
		assert_eq!(
			cli.command,
			Commands::Fetch {
				site: "1014".into(),
				date: Some("2.1.2026".into()),
				token: Some("Bearer x".into()),
			}
		);
	}

	#[test]
	fn global_flags_follow_subcommand() {
		let cli = Cli::try_parse_from(["showtimes", "week", "-vv", "--theaters", "list.json"]).unwrap();
		assert_eq!(cli.verbose, 2);
		assert_eq!(cli.theaters, Some(PathBuf::from("list.json")));
		assert_eq!(cli.command, Commands::Week { start: None });
	}

	#[test]
	fn seats_requires_site_and_date() {
		assert!(Cli::try_parse_from(["showtimes", "seats", "1014"]).is_err());
		let cli = Cli::try_parse_from(["showtimes", "seats", "1014", "2026-01-02"]).unwrap();
		assert_eq!(
			cli.command,
			Commands::Seats {
				site: "1014".into(),
				date: "2026-01-02".into(),
			}
		);
	}

	#[test]
	fn token_force_flag() {
		let cli = Cli::try_parse_from(["showtimes", "token", "--force"]).unwrap();
		assert_eq!(cli.command, Commands::Token { force: true });
	}
}
