//! Theater list handling.

use std::path::Path;

use anyhow::{Context, Result, bail};
use serde::Deserialize;

/// One entry of the theater list, e.g.
/// `{"key": "1014", "name": "Tennispalatsi", "urlSegment": "tennispalatsi"}`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Theater {
	pub key: String,
	#[serde(default)]
	pub name: Option<String>,
	#[serde(default)]
	pub url_segment: Option<String>,
}

impl Theater {
	pub fn label(&self) -> &str {
		self.name.as_deref().unwrap_or(&self.key)
	}
}

/// Reads the list, dropping entries with an empty key.
pub fn load_theaters(path: &Path) -> Result<Vec<Theater>> {
	let content = std::fs::read_to_string(path).with_context(|| format!("failed to read theater list {}", path.display()))?;
	let theaters: Vec<Theater> = serde_json::from_str(&content).with_context(|| format!("invalid theater list {}", path.display()))?;
	Ok(theaters.into_iter().filter(|t| !t.key.trim().is_empty()).collect())
}

pub fn find_theater<'a>(theaters: &'a [Theater], key: &str) -> Result<&'a Theater> {
	match theaters.iter().find(|t| t.key == key) {
		Some(theater) => Ok(theater),
		None => bail!("no theater with key {key} in the theater list"),
	}
}

#[cfg(test)]
mod tests {
	use tempfile::TempDir;

	use super::*;

	#[test]
	fn loads_entries_and_skips_blank_keys() {
		let temp = TempDir::new().unwrap();
		let path = temp.path().join("vistacinema_list.json");
		std::fs::write(
			&path,
			r#"[{"key": "1014", "name": "Tennispalatsi", "urlSegment": "tennispalatsi"}, {"key": ""}, {"key": "1004"}]"#,
		)
		.unwrap();

		let theaters = load_theaters(&path).unwrap();
		assert_eq!(theaters.len(), 2);
		assert_eq!(theaters[0].label(), "Tennispalatsi");
		assert_eq!(theaters[1].label(), "1004");
		assert_eq!(find_theater(&theaters, "1004").unwrap().key, "1004");
		assert!(find_theater(&theaters, "9999").is_err());
	}

	#[test]
	fn missing_list_is_an_error() {
		let temp = TempDir::new().unwrap();
		let err = load_theaters(&temp.path().join("absent.json")).unwrap_err();
		assert!(err.to_string().contains("failed to read theater list"));
	}
}
