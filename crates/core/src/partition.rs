//! On-disk layout of scraped documents.
//!
//! Documents are grouped by ISO-8601 week: `<root>/<ISO year>/week_<NN>/`.
//! Seat lookups find showtimes through the same scheme, so the layout is a
//! contract with downstream readers.

use std::path::{Path, PathBuf};

use chrono::{Datelike, NaiveDate};

/// `YYYY-MM-DD`, the form used in both URLs and file names.
pub fn format_date(date: NaiveDate) -> String {
	date.format("%Y-%m-%d").to_string()
}

#[derive(Debug, Clone)]
pub struct PartitionLayout {
	root: PathBuf,
}

impl PartitionLayout {
	pub fn new(root: impl Into<PathBuf>) -> Self {
		Self { root: root.into() }
	}

	pub fn root(&self) -> &Path {
		&self.root
	}

	pub fn week_dir(&self, date: NaiveDate) -> PathBuf {
		let week = date.iso_week();
		self.root.join(week.year().to_string()).join(format!("week_{:02}", week.week()))
	}

	pub fn showtimes_path(&self, site_id: &str, date: NaiveDate) -> PathBuf {
		self.week_dir(date).join(format!("showtimes_{site_id}_{}.json", format_date(date)))
	}

	pub fn seat_availability_dir(&self, date: NaiveDate) -> PathBuf {
		self.week_dir(date).join("seat_availability")
	}

	/// Path of the stored showtimes document, if it has been fetched.
	pub fn find_showtimes(&self, site_id: &str, date: NaiveDate) -> Option<PathBuf> {
		let path = self.showtimes_path(site_id, date);
		path.is_file().then_some(path)
	}
}
