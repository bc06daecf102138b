//! Localized, read-only views of a single item.

use crate::{CatalogStore, HideoutUsageIndex, Quantities, Rarity, ReverseRecipeIndex};

/// Outcome of a lookup that may name an unknown identifier.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup<T> {
	Found(T),
	NotFound { identifier: String },
}

impl<T> Lookup<T> {
	pub fn into_found(self) -> Option<T> {
		match self {
			Self::Found(v) => Some(v),
			Self::NotFound { .. } => None,
		}
	}

	pub fn is_found(&self) -> bool {
		matches!(self, Self::Found(_))
	}
}

/// An item referenced from another record, with its resolved display name.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemRef {
	pub id: String,
	pub name: Lookup<String>,
	pub count: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BenchRef {
	pub id: String,
	pub name: Lookup<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BenchUse {
	pub bench: BenchRef,
	pub level: u32,
	pub count: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DescribedItem {
	pub id: String,
	pub locale: String,
	pub name: String,
	pub description: Option<String>,
	pub kind: Option<String>,
	pub rarity: Rarity,
	pub value: u32,
	pub weight: f32,
	pub stack_size: u32,
	pub recipe: Vec<ItemRef>,
	pub craft_bench: Option<BenchRef>,
	pub recycles_into: Vec<ItemRef>,
	pub salvages_into: Vec<ItemRef>,
	/// Items whose recipe consumes this one.
	pub used_in: Vec<ItemRef>,
	/// Bench upgrades that consume this one.
	pub bench_usage: Vec<BenchUse>,
	/// Tier numbers that exist for this item's family (`anvil_i` .. `anvil_v`).
	pub tiers: Vec<u32>,
	/// Whether an expedition project needs this item; `None` when no project data was consulted.
	pub required_for_project: Option<bool>,
}

/// Assemble the localized description of `id`.
///
/// Unknown references inside the record resolve to [`Lookup::NotFound`]
/// individually; only an unknown `id` makes the whole result `NotFound`.
pub fn describe(
	id: &str,
	catalog: &CatalogStore,
	reverse: &ReverseRecipeIndex,
	usage: &HideoutUsageIndex,
	locale: &str,
) -> Lookup<DescribedItem> {
	let Some(item) = catalog.resolve(id) else {
		tracing::warn!(id, "item data missing");
		return Lookup::NotFound {
			identifier: id.to_owned(),
		};
	};

	let item_ref = |id: &str, count: u32| ItemRef {
		id: id.to_owned(),
		name: item_name(catalog, id, locale),
		count,
	};
	let refs = |q: &Option<Quantities>| {
		q.iter()
			.flatten()
			.map(|(id, &count)| item_ref(id, count))
			.collect::<Vec<_>>()
	};
	let bench_ref = |id: &str| BenchRef {
		id: id.to_owned(),
		name: match catalog.get_bench(id) {
			Some(bench) => Lookup::Found(bench.display_name(locale).to_owned()),
			None => Lookup::NotFound {
				identifier: id.to_owned(),
			},
		},
	};

	Lookup::Found(DescribedItem {
		id: item.id.clone(),
		locale: locale.to_owned(),
		name: item.display_name(locale).to_owned(),
		description: item.description.get(locale).map(str::to_owned),
		kind: item.kind.clone(),
		rarity: item.rarity,
		value: item.value,
		weight: item.weight,
		stack_size: item.stack_size,
		recipe: refs(&item.recipe),
		craft_bench: item.craft_bench.as_deref().map(bench_ref),
		recycles_into: refs(&item.recycles_into),
		salvages_into: refs(&item.salvages_into),
		used_in: reverse
			.get(&item.id)
			.iter()
			.map(|u| item_ref(&u.item, u.count))
			.collect(),
		bench_usage: usage
			.get(&item.id)
			.iter()
			.map(|u| BenchUse {
				bench: bench_ref(&u.bench),
				level: u.level,
				count: u.count,
			})
			.collect(),
		tiers: catalog.available_tiers(&item.id),
		required_for_project: None,
	})
}

fn item_name(catalog: &CatalogStore, id: &str, locale: &str) -> Lookup<String> {
	match catalog.get(id) {
		Some(item) => Lookup::Found(item.display_name(locale).to_owned()),
		None => Lookup::NotFound {
			identifier: id.to_owned(),
		},
	}
}
