//! Reverse lookups derived from the catalog.
//!
//! Both indexes are rebuilt from scratch whenever the catalog changes. The
//! catalog iterates in identifier order, so entries under a key are always
//! in the same order for the same data.

use std::collections::HashMap;

use crate::CatalogStore;

/// An item whose recipe consumes some material.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeUse {
	pub item: String,
	pub count: u32,
}

/// A bench level that requires some item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BenchUsage {
	pub bench: String,
	pub level: u32,
	pub count: u32,
}

/// Material id → items whose recipe uses it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReverseRecipeIndex(HashMap<String, Vec<RecipeUse>>);

impl ReverseRecipeIndex {
	pub fn build(catalog: &CatalogStore) -> Self {
		let mut map = HashMap::<String, Vec<RecipeUse>>::new();
		for item in catalog.items() {
			for (material, &count) in item.recipe.iter().flatten() {
				map.entry(material.clone()).or_default().push(RecipeUse {
					item: item.id.clone(),
					count,
				});
			}
		}
		Self(map)
	}

	pub fn get(&self, material: &str) -> &[RecipeUse] {
		self.0.get(material).map_or(&[], Vec::as_slice)
	}

	/// Number of distinct materials.
	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}

/// Item id → bench levels that require it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HideoutUsageIndex(HashMap<String, Vec<BenchUsage>>);

impl HideoutUsageIndex {
	pub fn build(catalog: &CatalogStore) -> Self {
		let mut map = HashMap::<String, Vec<BenchUsage>>::new();
		for bench in catalog.benches() {
			for (&level, reqs) in &bench.levels {
				for (item, &count) in reqs {
					map.entry(item.clone()).or_default().push(BenchUsage {
						bench: bench.id.clone(),
						level,
						count,
					});
				}
			}
		}
		Self(map)
	}

	pub fn get(&self, item: &str) -> &[BenchUsage] {
		self.0.get(item).map_or(&[], Vec::as_slice)
	}

	pub fn len(&self) -> usize {
		self.0.len()
	}

	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}

pub fn build(catalog: &CatalogStore) -> (ReverseRecipeIndex, HideoutUsageIndex) {
	(ReverseRecipeIndex::build(catalog), HideoutUsageIndex::build(catalog))
}

/// Where a dangling identifier was referenced from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReferenceContext {
	Recipe { item: String },
	Recycle { item: String },
	Salvage { item: String },
	CraftBench { item: String },
	BenchLevel { bench: String, level: u32 },
}

impl std::fmt::Display for ReferenceContext {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Self::Recipe { item } => write!(f, "recipe of '{item}'"),
			Self::Recycle { item } => write!(f, "recycle output of '{item}'"),
			Self::Salvage { item } => write!(f, "salvage output of '{item}'"),
			Self::CraftBench { item } => write!(f, "craft bench of '{item}'"),
			Self::BenchLevel { bench, level } => write!(f, "level {level} of bench '{bench}'"),
		}
	}
}

/// A reference to an identifier the catalog does not contain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DanglingReference {
	pub identifier: String,
	pub context: ReferenceContext,
}

/// Every reference in the catalog that points at a missing item or bench.
pub fn dangling_references(catalog: &CatalogStore) -> Vec<DanglingReference> {
	let mut out = Vec::new();
	let mut check = |id: &str, known: bool, context: ReferenceContext| {
		if !known {
			out.push(DanglingReference {
				identifier: id.to_owned(),
				context,
			});
		}
	};

	for item in catalog.items() {
		let owner = || item.id.clone();
		for id in item.recipe.iter().flat_map(|m| m.keys()) {
			check(id, catalog.get(id).is_some(), ReferenceContext::Recipe { item: owner() });
		}
		for id in item.recycles_into.iter().flat_map(|m| m.keys()) {
			check(id, catalog.get(id).is_some(), ReferenceContext::Recycle { item: owner() });
		}
		for id in item.salvages_into.iter().flat_map(|m| m.keys()) {
			check(id, catalog.get(id).is_some(), ReferenceContext::Salvage { item: owner() });
		}
		if let Some(bench) = &item.craft_bench {
			check(bench, catalog.get_bench(bench).is_some(), ReferenceContext::CraftBench { item: owner() });
		}
	}

	for bench in catalog.benches() {
		for (&level, reqs) in &bench.levels {
			for id in reqs.keys() {
				check(
					id,
					catalog.get(id).is_some(),
					ReferenceContext::BenchLevel {
						bench: bench.id.clone(),
						level,
					},
				);
			}
		}
	}

	out
}
