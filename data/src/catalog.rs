//! Item and bench records keyed by identifier.

use std::{
	collections::BTreeMap,
	path::{Path, PathBuf},
	sync::LazyLock,
};

use anyhow::{Result, ensure};

use crate::{BenchRecord, ItemRecord, LoadError, Quantities, schema};

pub const ITEMS_DIR: &str = "Items";
pub const HIDEOUT_DIRS: &[&str] = &["Hideout", "hideout"];

static TIER_REGEX: LazyLock<regex::Regex> =
	LazyLock::new(|| regex::Regex::new(r"^(?<base>.+?)_(?<tier>i|ii|iii|iv|v)$").expect("valid tier regex"));
const TIERS: [&str; 5] = ["i", "ii", "iii", "iv", "v"];

#[derive(Debug, Default)]
pub struct CatalogStore {
	items: BTreeMap<String, ItemRecord>,
	benches: BTreeMap<String, BenchRecord>,
	errors: Vec<LoadError>,
}

impl CatalogStore {
	/// Load `<dir>/Items/**/*.json` and, if present, `<dir>/Hideout/**/*.json`.
	///
	/// Only a missing items directory is fatal. Unreadable, malformed and
	/// duplicate records are skipped and kept in [`CatalogStore::load_errors`].
	pub fn load(dir: impl AsRef<Path>) -> Result<Self> {
		let dir = dir.as_ref();
		let items_dir = dir.join(ITEMS_DIR);
		ensure!(items_dir.is_dir(), "items directory not found: {}", items_dir.display());

		let mut catalog = Self::default();
		for path in json_files(&items_dir) {
			match read_json::<schema::items::Item>(&path).and_then(|raw| item_from_schema(raw, &path)) {
				Ok(item) => catalog.insert_item(item, &path),
				Err(err) => catalog.reject(err),
			}
		}

		match HIDEOUT_DIRS.iter().map(|d| dir.join(d)).find(|d| d.is_dir()) {
			Some(bench_dir) => {
				for path in json_files(&bench_dir) {
					match read_json::<schema::hideout::Bench>(&path) {
						Ok(raw) => match bench_from_schema(raw, &path) {
							Ok(bench) => catalog.insert_bench(bench, &path),
							Err(err) => catalog.reject(err),
						},
						Err(err) => catalog.reject(err),
					}
				}
			}
			None => tracing::info!(dir = %dir.display(), "no hideout directory; bench data disabled"),
		}

		tracing::info!(
			items = catalog.items.len(),
			benches = catalog.benches.len(),
			skipped = catalog.errors.len(),
			"loaded catalog"
		);
		Ok(catalog)
	}

	/// Build a catalog from in-memory records; later duplicates are rejected.
	pub fn from_records(items: impl IntoIterator<Item = ItemRecord>, benches: impl IntoIterator<Item = BenchRecord>) -> Self {
		let mut catalog = Self::default();
		for item in items {
			catalog.insert_item(item, Path::new(""));
		}
		for bench in benches {
			catalog.insert_bench(bench, Path::new(""));
		}
		catalog
	}

	fn insert_item(&mut self, item: ItemRecord, path: &Path) {
		if self.items.contains_key(&item.id) {
			self.reject(LoadError::DuplicateId {
				id: item.id,
				path: path.to_path_buf(),
			});
			return;
		}
		self.items.insert(item.id.clone(), item);
	}

	fn insert_bench(&mut self, bench: BenchRecord, path: &Path) {
		if self.benches.contains_key(&bench.id) {
			self.reject(LoadError::DuplicateId {
				id: bench.id,
				path: path.to_path_buf(),
			});
			return;
		}
		self.benches.insert(bench.id.clone(), bench);
	}

	fn reject(&mut self, err: LoadError) {
		tracing::warn!(error = %err, "skipping record");
		self.errors.push(err);
	}

	pub fn get(&self, id: &str) -> Option<&ItemRecord> {
		self.items.get(id)
	}

	pub fn get_bench(&self, id: &str) -> Option<&BenchRecord> {
		self.benches.get(id)
	}

	/// Exact lookup, then the tier-I variant for a base id (`anvil` → `anvil_i`).
	pub fn resolve(&self, id: &str) -> Option<&ItemRecord> {
		if let Some(item) = self.get(id) {
			return Some(item);
		}
		if TIER_REGEX.is_match(id) {
			return None;
		}
		let tier_i = format!("{id}_i");
		let item = self.get(&tier_i)?;
		tracing::info!(base = id, resolved = %tier_i, "mapped base id to tier I variant");
		Some(item)
	}

	/// Tiers (1..=5) that exist for the base of `id`.
	pub fn available_tiers(&self, id: &str) -> Vec<u32> {
		let base = TIER_REGEX
			.captures(id)
			.and_then(|c| c.name("base"))
			.map_or(id, |m| m.as_str());
		TIERS
			.iter()
			.zip(1..)
			.filter(|(suffix, _)| self.items.contains_key(&format!("{base}_{suffix}")))
			.map(|(_, tier)| tier)
			.collect()
	}

	/// Items in identifier order.
	pub fn items(&self) -> impl Iterator<Item = &ItemRecord> {
		self.items.values()
	}

	/// Benches in identifier order.
	pub fn benches(&self) -> impl Iterator<Item = &BenchRecord> {
		self.benches.values()
	}

	pub fn len(&self) -> usize {
		self.items.len()
	}

	pub fn is_empty(&self) -> bool {
		self.items.is_empty()
	}

	/// Case-insensitive substring search over localized names.
	///
	/// Records without a name in `locale` are matched on the default locale.
	pub fn search_by_name(&self, query: &str, locale: &str) -> Vec<&ItemRecord> {
		let query = query.to_lowercase();
		self.items
			.values()
			.filter(|item| {
				item.name
					.get(locale)
					.is_some_and(|name| name.to_lowercase().contains(&query))
			})
			.collect()
	}

	/// Nearest known item id by edit distance, if within half the longer id.
	pub fn closest_identifier(&self, id: &str) -> Option<&str> {
		let (best, dist) = self
			.items
			.keys()
			.map(|k| (k.as_str(), levenshtein::levenshtein(id, k)))
			.min_by_key(|&(_, d)| d)?;

		let max_len = id.len().max(best.len());
		(dist <= max_len / 2).then_some(best)
	}

	/// Per-file problems encountered while loading.
	pub fn load_errors(&self) -> &[LoadError] {
		&self.errors
	}
}

/// `*.json` files under `dir`, in a stable (file name) order.
pub(crate) fn json_files(dir: &Path) -> Vec<PathBuf> {
	walkdir::WalkDir::new(dir)
		.sort_by_file_name()
		.into_iter()
		.filter_map(|entry| match entry {
			Ok(entry) => Some(entry),
			Err(err) => {
				tracing::warn!(error = %err, "skipping unreadable directory entry");
				None
			}
		})
		.filter(|e| e.file_type().is_file() && e.path().extension().is_some_and(|x| x.eq_ignore_ascii_case("json")))
		.map(|e| e.into_path())
		.collect()
}

pub(crate) fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T, LoadError> {
	let text = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
		path: path.to_path_buf(),
		source,
	})?;
	serde_json::from_str(&text).map_err(|source| LoadError::Parse {
		path: path.to_path_buf(),
		source,
	})
}

fn item_from_schema(raw: schema::items::Item, path: &Path) -> Result<ItemRecord, LoadError> {
	let id = raw
		.id
		.filter(|id| !id.is_empty())
		.ok_or_else(|| LoadError::MissingId { path: path.to_path_buf() })?;

	Ok(ItemRecord {
		id,
		name: raw.name,
		description: raw.description,
		kind: raw.kind,
		rarity: raw.rarity,
		value: raw.value.unwrap_or(0),
		weight: raw.weight_kg.unwrap_or(0.0),
		stack_size: raw.stack_size.unwrap_or(1),
		recipe: raw.recipe.filter(|r| !r.is_empty()),
		craft_bench: raw.craft_bench.and_then(schema::items::CraftBench::first),
		recycles_into: raw.recycles_into.filter(|r| !r.is_empty()),
		salvages_into: raw.salvages_into.filter(|r| !r.is_empty()),
	})
}

fn bench_from_schema(raw: schema::hideout::Bench, path: &Path) -> Result<BenchRecord, LoadError> {
	let id = raw
		.id
		.filter(|id| !id.is_empty())
		.or_else(|| path.file_stem().and_then(|s| s.to_str()).map(str::to_owned))
		.filter(|id| !id.is_empty())
		.ok_or_else(|| LoadError::MissingId { path: path.to_path_buf() })?;

	let mut levels = BTreeMap::<u32, Quantities>::new();
	for level in raw.levels {
		let Some(number) = level.level else {
			continue;
		};
		levels.insert(number, requirements(level.requirement_item_ids));
	}

	Ok(BenchRecord {
		id,
		name: raw.name,
		levels,
	})
}

/// Fold `{itemId, quantity}` entries; a missing quantity counts as 1.
///
/// Repeated ids add up, saturating at `u32::MAX`.
pub(crate) fn requirements(reqs: Vec<schema::hideout::Requirement>) -> Quantities {
	let mut out = Quantities::new();
	for req in reqs {
		let Some(item) = req.item_id.filter(|id| !id.is_empty()) else {
			continue;
		};
		let count = out.entry(item).or_default();
		*count = count.saturating_add(req.quantity.unwrap_or(1));
	}
	out
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::Localized;

	fn write(dir: &Path, rel: &str, text: &str) {
		let path = dir.join(rel);
		std::fs::create_dir_all(path.parent().unwrap()).unwrap();
		std::fs::write(path, text).unwrap();
	}

	#[test]
	fn malformed_file_is_skipped_and_reported() {
		let dir = tempfile::tempdir().unwrap();
		write(dir.path(), "Items/a.json", r#"{"id": "a", "name": {"en": "Alpha"}}"#);
		write(dir.path(), "Items/b.json", r#"{"id": "b", "name": {"en": "Beta"}, "recipe": {"a": 2}}"#);
		write(dir.path(), "Items/sub/c.json", r#"{"id": "c", "rarity": "Rare", "weightKg": 1.5}"#);
		write(dir.path(), "Items/broken.json", r#"{"id": "oops", "#);
		write(dir.path(), "Items/Images/readme.txt", "not a record");

		let catalog = CatalogStore::load(dir.path()).unwrap();
		assert_eq!(catalog.len(), 3);
		assert_eq!(catalog.load_errors().len(), 1);
		assert!(matches!(catalog.load_errors()[0], LoadError::Parse { .. }));
		assert!(catalog.load_errors()[0].path().ends_with("broken.json"));

		let c = catalog.get("c").unwrap();
		assert_eq!(c.rarity, crate::Rarity::Rare);
		assert_eq!(c.weight, 1.5);
		assert_eq!(c.stack_size, 1);
		assert_eq!(catalog.get("b").unwrap().recipe.as_ref().unwrap()["a"], 2);
	}

	#[test]
	fn duplicate_and_idless_records_are_rejected() {
		let dir = tempfile::tempdir().unwrap();
		write(dir.path(), "Items/1.json", r#"{"id": "dup", "name": {"en": "First"}}"#);
		write(dir.path(), "Items/2.json", r#"{"id": "dup", "name": {"en": "Second"}}"#);
		write(dir.path(), "Items/3.json", r#"{"name": {"en": "Nameless"}}"#);

		let catalog = CatalogStore::load(dir.path()).unwrap();
		assert_eq!(catalog.len(), 1);
		assert_eq!(catalog.get("dup").unwrap().display_name("en"), "First");
		assert!(matches!(&catalog.load_errors()[0], LoadError::DuplicateId { id, .. } if id == "dup"));
		assert!(matches!(catalog.load_errors()[1], LoadError::MissingId { .. }));
	}

	#[test]
	fn benches_load_from_lowercase_dir() {
		let dir = tempfile::tempdir().unwrap();
		write(dir.path(), "Items/a.json", r#"{"id": "a"}"#);
		write(
			dir.path(),
			"hideout/workbench.json",
			r#"{"name": {"en": "Workbench"}, "levels": [
				{"level": 1, "requirementItemIds": [{"itemId": "a", "quantity": 3}]},
				{"level": 2, "requirementItemIds": [{"itemId": "a"}, {"quantity": 9}]},
				{"requirementItemIds": [{"itemId": "a", "quantity": 100}]}
			]}"#,
		);

		let catalog = CatalogStore::load(dir.path()).unwrap();
		let bench = catalog.get_bench("workbench").unwrap();
		assert_eq!(bench.levels.len(), 2);
		assert_eq!(bench.levels[&1]["a"], 3);
		assert_eq!(bench.levels[&2]["a"], 1);
	}

	#[test]
	fn repeated_requirements_saturate_instead_of_overflowing() {
		let dir = tempfile::tempdir().unwrap();
		write(dir.path(), "Items/a.json", r#"{"id": "a"}"#);
		write(
			dir.path(),
			"Hideout/w.json",
			r#"{"levels": [{"level": 1, "requirementItemIds": [
				{"itemId": "a", "quantity": 4294967295},
				{"itemId": "a", "quantity": 2}
			]}]}"#,
		);

		let catalog = CatalogStore::load(dir.path()).unwrap();
		assert_eq!(catalog.get_bench("w").unwrap().levels[&1]["a"], u32::MAX);
		assert!(catalog.load_errors().is_empty());
	}

	#[test]
	fn bench_without_any_usable_id_is_rejected() {
		let raw: schema::hideout::Bench = serde_json::from_str(r#"{"levels": []}"#).unwrap();
		let err = bench_from_schema(raw, Path::new("")).unwrap_err();
		assert!(matches!(err, LoadError::MissingId { .. }));

		let raw: schema::hideout::Bench = serde_json::from_str(r#"{"id": "", "levels": []}"#).unwrap();
		assert_eq!(bench_from_schema(raw, Path::new("Hideout/stash.json")).unwrap().id, "stash");
	}

	#[test]
	fn missing_items_directory_is_fatal() {
		let dir = tempfile::tempdir().unwrap();
		assert!(CatalogStore::load(dir.path()).is_err());
	}

	#[test]
	fn craft_bench_accepts_string_or_list() {
		let dir = tempfile::tempdir().unwrap();
		write(dir.path(), "Items/a.json", r#"{"id": "a", "craftBench": "workbench"}"#);
		write(dir.path(), "Items/b.json", r#"{"id": "b", "craftBench": ["gunsmith", "workbench"]}"#);

		let catalog = CatalogStore::load(dir.path()).unwrap();
		assert_eq!(catalog.get("a").unwrap().craft_bench.as_deref(), Some("workbench"));
		assert_eq!(catalog.get("b").unwrap().craft_bench.as_deref(), Some("gunsmith"));
	}

	fn named(id: &str, names: &[(&str, &str)]) -> ItemRecord {
		let mut item = ItemRecord::new(id, "");
		item.name = Localized(names.iter().map(|(l, n)| (l.to_string(), n.to_string())).collect());
		item
	}

	#[test]
	fn search_is_case_insensitive_with_locale_fallback() {
		let catalog = CatalogStore::from_records(
			[
				named("heavy_grenade", &[("en", "Heavy Grenade"), ("ru", "Тяжёлая граната")]),
				named("smoke_grenade", &[("en", "Smoke Grenade")]),
				named("bandage", &[("en", "Bandage")]),
			],
			[],
		);

		let ids = |v: Vec<&ItemRecord>| v.into_iter().map(|i| i.id.clone()).collect::<Vec<_>>();
		assert_eq!(ids(catalog.search_by_name("GRENADE", "en")), ["heavy_grenade", "smoke_grenade"]);
		// heavy_grenade has a Russian name, so the English text no longer matches it.
		assert_eq!(ids(catalog.search_by_name("grenade", "ru")), ["smoke_grenade"]);
		assert_eq!(ids(catalog.search_by_name("граната", "ru")), ["heavy_grenade"]);
		assert!(catalog.search_by_name("rocket", "en").is_empty());
	}

	#[test]
	fn resolve_falls_back_to_tier_one() {
		let catalog = CatalogStore::from_records(
			[
				ItemRecord::new("anvil_i", "Anvil I"),
				ItemRecord::new("anvil_ii", "Anvil II"),
				ItemRecord::new("anvil_iv", "Anvil IV"),
			],
			[],
		);
		assert_eq!(catalog.resolve("anvil").unwrap().id, "anvil_i");
		assert_eq!(catalog.resolve("anvil_ii").unwrap().id, "anvil_ii");
		assert!(catalog.resolve("anvil_iii").is_none());
		assert!(catalog.get("anvil").is_none());
		assert_eq!(catalog.available_tiers("anvil"), [1, 2, 4]);
		assert_eq!(catalog.available_tiers("anvil_iv"), [1, 2, 4]);
		assert!(catalog.available_tiers("bandage").is_empty());
	}

	#[test]
	fn closest_identifier_rejects_far_guesses() {
		let catalog = CatalogStore::from_records(
			[ItemRecord::new("arc_alloy", "ARC Alloy"), ItemRecord::new("bandage", "Bandage")],
			[],
		);
		assert_eq!(catalog.closest_identifier("arc_aloy"), Some("arc_alloy"));
		assert_eq!(catalog.closest_identifier("completely_unrelated_thing"), None);
		// Short queries only get a hint when they are actually close.
		assert_eq!(catalog.closest_identifier("cap"), None);
		assert_eq!(catalog.closest_identifier("bandag"), Some("bandage"));
	}
}
