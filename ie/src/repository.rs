//! Reference icon loading.
//!
//! Every image file under the template directory becomes one [`Template`],
//! keyed by its file stem. Individual bad files are recorded and skipped; only
//! a missing directory aborts the load.

use std::{
	collections::HashMap,
	path::{Path, PathBuf},
};

use anyhow::{Context, Result, ensure};
use thiserror::Error;

use crate::{OwnedImage, RecognitionConfig, Template};

const EXTENSIONS: &[&str] = &["png", "webp", "jpg", "jpeg", "bmp"];

#[derive(Debug, Error)]
pub enum TemplateError {
	#[error("failed to read {path}: {source}")]
	Io {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("failed to decode {path}: {message}")]
	Decode { path: PathBuf, message: String },

	#[error("duplicate template id '{id}' in {path} (keeping the first one)")]
	DuplicateId { id: String, path: PathBuf },
}

#[derive(Debug, Default)]
pub struct TemplateRepository {
	/// Sorted by id.
	templates: Vec<Template>,
	by_id: HashMap<String, usize>,
	errors: Vec<TemplateError>,
}

impl TemplateRepository {
	/// Load and normalize every reference image under `dir`.
	pub fn load(dir: impl AsRef<Path>, config: &RecognitionConfig) -> Result<Self> {
		let dir = dir.as_ref();
		ensure!(dir.is_dir(), "template directory not found: {}", dir.display());

		let mut repo = Self::default();
		let mut found = Vec::new();
		for entry in walkdir::WalkDir::new(dir).sort_by_file_name() {
			let entry = entry.with_context(|| format!("walk {}", dir.display()))?;
			let path = entry.path();
			let is_image = path
				.extension()
				.and_then(|e| e.to_str())
				.is_some_and(|e| EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()));
			if entry.file_type().is_file() && is_image {
				found.push(path.to_path_buf());
			}
		}

		for path in found {
			let Some(id) = path.file_stem().and_then(|s| s.to_str()).map(str::to_owned) else {
				continue;
			};
			if repo.by_id.contains_key(&id) {
				repo.reject(TemplateError::DuplicateId { id, path });
				continue;
			}
			match load_one(&path, &id, config) {
				Ok(template) => repo.insert(template),
				Err(err) => repo.reject(err),
			}
		}

		repo.sort();
		tracing::info!(
			dir = %dir.display(),
			templates = repo.templates.len(),
			skipped = repo.errors.len(),
			"loaded templates"
		);
		Ok(repo)
	}

	/// Build a repository from in-memory bitmaps.
	///
	/// Later duplicates of an id are recorded as errors and dropped.
	pub fn from_images<'a>(
		images: impl IntoIterator<Item = (&'a str, &'a OwnedImage)>,
		config: &RecognitionConfig,
	) -> Result<Self> {
		let mut repo = Self::default();
		for (id, image) in images {
			if repo.by_id.contains_key(id) {
				repo.reject(TemplateError::DuplicateId {
					id: id.to_owned(),
					path: PathBuf::new(),
				});
				continue;
			}
			repo.insert(Template::new(id, image, config)?);
		}
		repo.sort();
		Ok(repo)
	}

	fn insert(&mut self, template: Template) {
		self.by_id.insert(template.id().to_owned(), self.templates.len());
		self.templates.push(template);
	}

	fn reject(&mut self, err: TemplateError) {
		tracing::warn!(error = %err, "skipping template");
		self.errors.push(err);
	}

	fn sort(&mut self) {
		self.templates.sort_by(|a, b| a.id().cmp(b.id()));
		self.by_id = self
			.templates
			.iter()
			.enumerate()
			.map(|(i, t)| (t.id().to_owned(), i))
			.collect();
	}

	/// All templates in identifier order.
	pub fn all(&self) -> &[Template] {
		&self.templates
	}

	pub fn get(&self, id: &str) -> Option<&Template> {
		self.by_id.get(id).map(|&i| &self.templates[i])
	}

	pub fn len(&self) -> usize {
		self.templates.len()
	}

	pub fn is_empty(&self) -> bool {
		self.templates.is_empty()
	}

	/// Per-file problems encountered while loading.
	pub fn load_errors(&self) -> &[TemplateError] {
		&self.errors
	}
}

fn load_one(path: &Path, id: &str, config: &RecognitionConfig) -> Result<Template, TemplateError> {
	let bytes = std::fs::read(path).map_err(|source| TemplateError::Io {
		path: path.to_path_buf(),
		source,
	})?;
	let decode_err = |err: anyhow::Error| TemplateError::Decode {
		path: path.to_path_buf(),
		message: format!("{err:#}"),
	};
	let image = OwnedImage::decode(&bytes, config.background).map_err(decode_err)?;
	Template::new(id, &image, config).map_err(decode_err)
}
