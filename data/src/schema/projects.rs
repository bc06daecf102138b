use serde::Deserialize;

use crate::Localized;

/// `projects.json`: a list of expedition projects.
#[derive(Deserialize)]
pub struct Project {
	pub id: String,
	#[serde(default)]
	pub name: Localized,
	#[serde(default)]
	pub phases: Vec<Phase>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Phase {
	pub phase: Option<u32>,
	#[serde(default)]
	pub requirement_item_ids: Vec<super::hideout::Requirement>,
}
