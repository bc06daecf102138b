//! Hot reload of item data and icons.

use std::{
	path::Path,
	sync::{
		Arc,
		mpsc::{self, Receiver, RecvTimeoutError},
	},
	time::Duration,
};

use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};

use crate::state::State;

/// Quiet period after the last change before reloading.
const SETTLE: Duration = Duration::from_millis(500);

#[derive(Debug, PartialEq, Eq)]
enum Wake {
	Changed,
	Closed,
}

/// Keeps the filesystem watcher alive; dropping it stops reloading.
pub struct Reloader {
	_watcher: RecommendedWatcher,
}

/// Watch the data and icon directories and swap in a fresh snapshot after changes.
pub fn spawn(state: Arc<State>) -> notify::Result<Reloader> {
	let (tx, rx) = mpsc::channel();
	let mut watcher = notify::recommended_watcher(tx)?;

	let data_dir = state.config().data_dir.clone();
	let template_dir = state.config().template_dir();
	watcher.watch(&data_dir, RecursiveMode::Recursive)?;
	if !template_dir.starts_with(&data_dir) && template_dir.is_dir() {
		watcher.watch(&template_dir, RecursiveMode::Recursive)?;
	}
	tracing::info!(data = %data_dir.display(), icons = %template_dir.display(), "watching for changes");

	std::thread::spawn(move || {
		while next_change(&rx, SETTLE) == Wake::Changed {
			match state.reload() {
				Ok(()) => tracing::info!("reloaded after change on disk"),
				Err(err) => tracing::warn!(error = %format!("{err:#}"), "reload failed; keeping previous data"),
			}
		}
		tracing::debug!("watcher closed");
	});

	Ok(Reloader { _watcher: watcher })
}

/// Block until a relevant change arrives, then until things settle.
fn next_change(rx: &Receiver<notify::Result<Event>>, settle: Duration) -> Wake {
	loop {
		match rx.recv() {
			Ok(Ok(event)) if relevant(&event) => break,
			Ok(Ok(_)) => continue,
			Ok(Err(err)) => tracing::warn!(error = %err, "watcher error"),
			Err(_) => return Wake::Closed,
		}
	}

	loop {
		match rx.recv_timeout(settle) {
			Ok(_) => continue,
			Err(RecvTimeoutError::Timeout | RecvTimeoutError::Disconnected) => return Wake::Changed,
		}
	}
}

fn relevant(event: &Event) -> bool {
	!event.kind.is_access() && event.paths.iter().any(|p| is_watched_file(p))
}

fn is_watched_file(path: &Path) -> bool {
	path.extension()
		.and_then(|e| e.to_str())
		.is_some_and(|e| matches!(e.to_ascii_lowercase().as_str(), "json" | "png" | "webp" | "jpg" | "jpeg" | "bmp"))
}
