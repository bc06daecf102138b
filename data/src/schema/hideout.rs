use serde::Deserialize;

use crate::Localized;

/// One `Hideout/<bench>.json` file.
#[derive(Deserialize)]
pub struct Bench {
	pub id: Option<String>,
	#[serde(default)]
	pub name: Localized,
	#[serde(default)]
	pub levels: Vec<Level>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Level {
	pub level: Option<u32>,
	#[serde(default)]
	pub requirement_item_ids: Vec<Requirement>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Requirement {
	pub item_id: Option<String>,
	pub quantity: Option<u32>,
}

// {
// 	"id": "workbench",
// 	"name": { "en": "Workbench" },
// 	"levels": [
// 		{ "level": 1, "requirementItemIds": [] },
// 		{ "level": 2, "requirementItemIds": [ { "itemId": "metal_parts", "quantity": 20 } ] }
// 	]
// }
