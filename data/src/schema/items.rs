use serde::Deserialize;

use crate::{Localized, Quantities, Rarity};

/// One `Items/<id>.json` file.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
	pub id: Option<String>,
	#[serde(default)]
	pub name: Localized,
	#[serde(default)]
	pub description: Localized,
	#[serde(rename = "type")]
	pub kind: Option<String>,
	#[serde(default)]
	pub rarity: Rarity,
	pub value: Option<u32>,
	pub weight_kg: Option<f32>,
	pub stack_size: Option<u32>,
	pub recipe: Option<Quantities>,
	pub craft_bench: Option<CraftBench>,
	pub recycles_into: Option<Quantities>,
	pub salvages_into: Option<Quantities>,
}

/// `craftBench` is a single id in most files and a list in a few.
#[derive(Deserialize)]
#[serde(untagged)]
pub enum CraftBench {
	One(String),
	Many(Vec<String>),
}

impl CraftBench {
	pub fn first(self) -> Option<String> {
		match self {
			Self::One(id) => Some(id),
			Self::Many(ids) => ids.into_iter().next(),
		}
		.filter(|id| !id.is_empty())
	}
}

// {
// 	"id": "adrenaline_shot",
// 	"name": { "en": "Adrenaline Shot", "ru": "..." },
// 	"type": "Quick Use",
// 	"rarity": "Common",
// 	"value": 300,
// 	"weightKg": 0.2,
// 	"stackSize": 5,
// 	"recipe": { "chemicals": 3, "plastic_parts": 1 },
// 	"craftBench": "medical_lab",
// 	"recyclesInto": { "chemicals": 1 },
// 	"salvagesInto": { "chemicals": 1 }
// }
