use std::path::PathBuf;

use thiserror::Error;

/// A single record file that could not be used. Collected, logged and skipped.
#[derive(Debug, Error)]
pub enum LoadError {
	#[error("failed to read {path}: {source}")]
	Io {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("failed to parse {path}: {source}")]
	Parse {
		path: PathBuf,
		#[source]
		source: serde_json::Error,
	},

	#[error("record in {path} has no 'id' field")]
	MissingId { path: PathBuf },

	#[error("duplicate id '{id}' in {path} (keeping the first record)")]
	DuplicateId { id: String, path: PathBuf },
}

impl LoadError {
	pub fn path(&self) -> &std::path::Path {
		match self {
			Self::Io { path, .. } | Self::Parse { path, .. } | Self::MissingId { path } | Self::DuplicateId { path, .. } => path,
		}
	}
}
