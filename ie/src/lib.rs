mod image;
pub use image::*;
mod cancel;
pub use cancel::CancelToken;
mod config;
pub use config::*;
pub mod features;
mod template;
pub use template::*;
mod repository;
pub use repository::*;
mod similarity;
pub use similarity::*;

/// Icon recognizer: a template set plus the engine configured for it.
///
/// Immutable after construction; share it behind an `Arc` and build a new one
/// to pick up changed templates.
pub struct Ie {
	engine: SimilarityEngine,
	templates: TemplateRepository,
}

impl Ie {
	pub fn try_new(config: RecognitionConfig, template_dir: impl AsRef<std::path::Path>) -> anyhow::Result<Self> {
		let templates = TemplateRepository::load(template_dir, &config)?;
		Ok(Self::with_templates(config, templates))
	}

	pub fn with_templates(config: RecognitionConfig, templates: TemplateRepository) -> Self {
		Self {
			engine: SimilarityEngine::new(config),
			templates,
		}
	}

	pub fn templates(&self) -> &TemplateRepository {
		&self.templates
	}

	/// Rank all templates against a captured icon.
	pub fn identify(&self, probe: &OwnedImage, cancel: Option<&CancelToken>) -> anyhow::Result<MatchResult> {
		self.engine.match_image(probe, &self.templates, cancel)
	}
}
