use std::sync::{Arc, RwLock};

use anyhow::{Context, Result};

use crate::config::Config;

/// Everything a lookup needs, built together and never mutated.
pub struct Snapshot {
	pub db: data::Database,
	pub ie: ie::Ie,
}

impl Snapshot {
	pub fn load(config: &Config) -> Result<Self> {
		let db = data::Database::load(&config.data_dir)
			.with_context(|| format!("load item data from {:?}", config.data_dir))?;

		let template_dir = config.template_dir();
		let ie = ie::Ie::try_new(config.recognition.clone(), &template_dir)
			.with_context(|| format!("load icons from {:?}", template_dir))?;

		tracing::info!(
			items = db.catalog.len(),
			benches = db.catalog.benches().count(),
			templates = ie.templates().len(),
			skipped = db.catalog.load_errors().len() + ie.templates().load_errors().len(),
			"snapshot loaded"
		);
		Ok(Self { db, ie })
	}
}

/// The current snapshot, replaced whole on reload.
///
/// Readers clone the inner `Arc` and keep working against it while a reload
/// builds its successor, so a lookup never sees half-updated data.
pub struct State {
	config: Config,
	current: RwLock<Arc<Snapshot>>,
}

impl State {
	pub fn new(config: Config) -> Result<Self> {
		let snapshot = Snapshot::load(&config)?;
		Ok(Self {
			config,
			current: RwLock::new(Arc::new(snapshot)),
		})
	}

	pub fn config(&self) -> &Config {
		&self.config
	}

	pub fn snapshot(&self) -> Arc<Snapshot> {
		match self.current.read() {
			Ok(guard) => guard.clone(),
			Err(poisoned) => poisoned.into_inner().clone(),
		}
	}

	/// Rebuild from disk and swap in the result.
	///
	/// On failure the previous snapshot stays current.
	pub fn reload(&self) -> Result<()> {
		let next = Arc::new(Snapshot::load(&self.config)?);
		match self.current.write() {
			Ok(mut guard) => *guard = next,
			Err(poisoned) => *poisoned.into_inner() = next,
		}
		Ok(())
	}
}
