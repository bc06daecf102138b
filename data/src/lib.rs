use std::path::Path;

use anyhow::Result;

mod schema;

mod structs;
pub use structs::*;
mod error;
pub use error::LoadError;
pub mod catalog;
pub use catalog::CatalogStore;
pub mod index;
pub use index::{BenchUsage, DanglingReference, HideoutUsageIndex, RecipeUse, ReferenceContext, ReverseRecipeIndex};
pub mod projects;
pub use projects::Projects;
mod describe;
pub use describe::*;

/// Catalog plus everything derived from it.
///
/// Never mutated after construction; a reload builds a fresh `Database`.
#[derive(Debug)]
pub struct Database {
	pub catalog: CatalogStore,
	pub reverse: ReverseRecipeIndex,
	pub usage: HideoutUsageIndex,
	pub projects: Projects,
	dangling: Vec<DanglingReference>,
}

impl Database {
	/// Load the catalog, benches and projects under `dir` and build the indexes.
	///
	/// Fails only when the items directory itself is missing.
	pub fn load(dir: impl AsRef<Path>) -> Result<Self> {
		let dir = dir.as_ref();
		let catalog = CatalogStore::load(dir)?;
		let projects = Projects::load(dir.join(projects::PROJECTS_FILE)).unwrap_or_else(|err| {
			tracing::warn!(error = %err, "failed to load projects; project flags disabled");
			Projects::default()
		});
		Ok(Self::new(catalog, projects))
	}

	pub fn new(catalog: CatalogStore, projects: Projects) -> Self {
		let (reverse, usage) = index::build(&catalog);
		let dangling = index::dangling_references(&catalog);
		for d in &dangling {
			tracing::warn!(id = %d.identifier, context = %d.context, "dangling reference");
		}

		Self {
			catalog,
			reverse,
			usage,
			projects,
			dangling,
		}
	}

	/// Localized description of `id`, or `NotFound` carrying the id.
	pub fn describe(&self, id: &str, locale: &str) -> Lookup<DescribedItem> {
		match describe(id, &self.catalog, &self.reverse, &self.usage, locale) {
			Lookup::Found(mut item) => {
				item.required_for_project = Some(self.projects.is_required(&item.id));
				Lookup::Found(item)
			}
			not_found => not_found,
		}
	}

	/// References to identifiers the catalog does not contain.
	pub fn dangling(&self) -> &[DanglingReference] {
		&self.dangling
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn write(dir: &Path, rel: &str, text: &str) {
		let path = dir.join(rel);
		std::fs::create_dir_all(path.parent().unwrap()).unwrap();
		std::fs::write(path, text).unwrap();
	}

	#[test]
	fn loads_full_data_directory() {
		let dir = tempfile::tempdir().unwrap();
		write(dir.path(), "Items/metal_parts.json", r#"{"id": "metal_parts", "name": {"en": "Metal Parts"}}"#);
		write(
			dir.path(),
			"Items/barricade.json",
			r#"{"id": "barricade", "name": {"en": "Barricade"}, "recipe": {"metal_parts": 6, "nails": 2}}"#,
		);
		write(
			dir.path(),
			"Hideout/workbench.json",
			r#"{"id": "workbench", "levels": [{"level": 2, "requirementItemIds": [{"itemId": "metal_parts", "quantity": 20}]}]}"#,
		);
		write(
			dir.path(),
			"projects.json",
			r#"[{"id": "expedition", "phases": [{"phase": 1, "requirementItemIds": [{"itemId": "metal_parts", "quantity": 50}]}]}]"#,
		);

		let db = Database::load(dir.path()).unwrap();
		assert_eq!(db.catalog.len(), 2);
		assert_eq!(db.dangling().len(), 1);
		assert_eq!(db.dangling()[0].identifier, "nails");

		let parts = db.describe("metal_parts", "en").into_found().unwrap();
		assert_eq!(parts.required_for_project, Some(true));
		assert_eq!(parts.used_in[0].id, "barricade");
		assert_eq!(parts.bench_usage[0].bench.id, "workbench");
		assert_eq!(parts.bench_usage[0].bench.name, Lookup::Found("workbench".into()));

		assert_eq!(db.describe("barricade", "en").into_found().unwrap().required_for_project, Some(false));
		assert!(!db.describe("nails", "en").is_found());
	}

	#[test]
	fn broken_projects_file_is_not_fatal() {
		let dir = tempfile::tempdir().unwrap();
		write(dir.path(), "Items/a.json", r#"{"id": "a"}"#);
		write(dir.path(), "projects.json", "{ nope");
		let db = Database::load(dir.path()).unwrap();
		assert!(db.projects.all().is_empty());
	}
}
