//! Expedition projects and the items they consume.

use std::{collections::HashSet, path::Path};

use crate::{LoadError, Localized, Quantities, schema};

pub const PROJECTS_FILE: &str = "projects.json";

#[derive(Debug, Clone, PartialEq)]
pub struct Project {
	pub id: String,
	pub name: Localized,
	/// `(phase number, required items)` in file order.
	pub phases: Vec<(u32, Quantities)>,
}

#[derive(Debug, Clone, Default)]
pub struct Projects {
	projects: Vec<Project>,
	required: HashSet<String>,
}

impl Projects {
	/// Load `projects.json`. A missing file yields an empty set.
	pub fn load(path: impl AsRef<Path>) -> Result<Self, LoadError> {
		let path = path.as_ref();
		if !path.is_file() {
			return Ok(Self::default());
		}
		let raw = crate::catalog::read_json::<Vec<schema::projects::Project>>(path)?;

		let projects = raw
			.into_iter()
			.map(|p| Project {
				id: p.id,
				name: p.name,
				phases: p
					.phases
					.into_iter()
					.enumerate()
					.map(|(i, phase)| {
						(
							phase.phase.unwrap_or(i as u32 + 1),
							crate::catalog::requirements(phase.requirement_item_ids),
						)
					})
					.collect(),
			})
			.collect();
		Ok(Self::new(projects))
	}

	pub fn new(projects: Vec<Project>) -> Self {
		let required = projects
			.iter()
			.flat_map(|p| p.phases.iter())
			.flat_map(|(_, reqs)| reqs.keys().cloned())
			.collect();
		Self { projects, required }
	}

	/// Whether any phase of any project asks for `item`.
	pub fn is_required(&self, item: &str) -> bool {
		self.required.contains(item)
	}

	pub fn all(&self) -> &[Project] {
		&self.projects
	}
}
