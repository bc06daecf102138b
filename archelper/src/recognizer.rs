use std::sync::{
	Arc, Mutex,
	mpsc::{self, Receiver, Sender},
};

use anyhow::Result;
use data::{DescribedItem, Lookup};
use ie::{CancelToken, Candidate, OwnedImage};

use crate::state::{Snapshot, State};

/// How many runners-up are kept when nothing clears the threshold.
const REJECT_CANDIDATES: usize = 3;

#[derive(Debug, Clone)]
pub enum Recognition {
	/// Best candidate cleared the threshold.
	Accepted { candidate: Candidate, item: Lookup<DescribedItem> },
	/// Nothing cleared the threshold; the best few are kept for display.
	Rejected { best: Vec<Candidate> },
	/// Superseded before the scan finished.
	Cancelled { scanned: usize, total: usize },
}

/// Match `probe` against the snapshot's icons and describe the winner.
pub fn recognize(
	snapshot: &Snapshot,
	probe: &OwnedImage,
	threshold: f32,
	locale: &str,
	cancel: Option<&CancelToken>,
) -> Result<Recognition> {
	let result = snapshot.ie.identify(probe, cancel)?;
	if result.cancelled {
		tracing::debug!(scanned = result.scanned, total = result.total, "recognition cancelled");
		return Ok(Recognition::Cancelled {
			scanned: result.scanned,
			total: result.total,
		});
	}

	match result.accepted(threshold) {
		Some(candidate) => {
			tracing::info!(id = %candidate.id, score = candidate.score, "icon recognized");
			let item = snapshot.db.describe(&candidate.id, locale);
			if !item.is_found() {
				match snapshot.db.catalog.closest_identifier(&candidate.id) {
					Some(hint) => tracing::warn!(id = %candidate.id, closest = hint, "icon has no item data"),
					None => tracing::warn!(id = %candidate.id, "icon has no item data"),
				}
			}
			Ok(Recognition::Accepted {
				candidate: candidate.clone(),
				item,
			})
		}
		None => {
			tracing::info!(
				best = result.best().map(|c| c.score),
				threshold,
				"no icon above threshold"
			);
			Ok(Recognition::Rejected {
				best: result.top(REJECT_CANDIDATES).to_vec(),
			})
		}
	}
}

struct Job {
	image: OwnedImage,
	cancel: CancelToken,
	reply: Sender<Result<Recognition, String>>,
}

/// Background recognition worker.
///
/// Only the latest request matters: submitting cancels whatever is still in
/// flight, and that request replies with [`Recognition::Cancelled`].
#[derive(Clone)]
pub struct Recognizer {
	jobs: Sender<Job>,
	in_flight: Arc<Mutex<Option<CancelToken>>>,
}

impl Recognizer {
	pub fn new(state: Arc<State>) -> Self {
		let (jobs, rx) = mpsc::channel::<Job>();

		std::thread::spawn(move || {
			// Runs until every Recognizer handle is dropped.
			for job in rx {
				if job.cancel.is_cancelled() {
					let total = state.snapshot().ie.templates().len();
					let _ = job.reply.send(Ok(Recognition::Cancelled { scanned: 0, total }));
					continue;
				}

				// Pin one snapshot for the whole job so a reload cannot mix data.
				let snapshot = state.snapshot();
				let config = state.config();
				let outcome = recognize(
					&snapshot,
					&job.image,
					config.match_threshold,
					&config.language,
					Some(&job.cancel),
				)
				.map_err(|err| {
					tracing::warn!(error = %err, "recognition failed");
					format!("{err:#}")
				});
				let _ = job.reply.send(outcome);
			}
		});

		Self {
			jobs,
			in_flight: Arc::new(Mutex::new(None)),
		}
	}

	/// Queue `image` for recognition, cancelling the previous request.
	pub fn submit(&self, image: OwnedImage) -> Receiver<Result<Recognition, String>> {
		let (reply, rx) = mpsc::channel();
		let cancel = CancelToken::new();
		{
			let mut in_flight = match self.in_flight.lock() {
				Ok(guard) => guard,
				Err(poisoned) => poisoned.into_inner(),
			};
			if let Some(previous) = in_flight.replace(cancel.clone()) {
				previous.cancel();
			}
		}

		if self.jobs.send(Job { image, cancel, reply }).is_err() {
			tracing::error!("recognition worker is gone");
		}
		rx
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::state::tests::{fixture, icon};

	fn probe(seed: u32) -> OwnedImage {
		let img = icon(seed, 64);
		OwnedImage::from_rgba(64, 64, img.as_raw(), ie::Color::BLACK).unwrap()
	}

	#[test]
	fn recognizes_and_describes_known_icon() {
		let dir = tempfile::tempdir().unwrap();
		let mut config = fixture(dir.path());
		config.language = "de".into();
		let state = State::new(config).unwrap();

		let snap = state.snapshot();
		match recognize(&snap, &probe(1), 0.4, "de", None).unwrap() {
			Recognition::Accepted { candidate, item } => {
				assert_eq!(candidate.id, "metal_parts");
				assert!(candidate.score > 0.8);
				let item = item.into_found().unwrap();
				assert_eq!(item.name, "Metallteile");
				assert_eq!(item.used_in[0].id, "barricade");
			}
			other => panic!("expected a match, got {other:?}"),
		}
	}

	#[test]
	fn impossible_threshold_rejects_with_runners_up() {
		let dir = tempfile::tempdir().unwrap();
		let state = State::new(fixture(dir.path())).unwrap();
		match recognize(&state.snapshot(), &probe(1), 1.01, "en", None).unwrap() {
			Recognition::Rejected { best } => {
				assert_eq!(best.len(), 2);
				assert_eq!(best[0].id, "metal_parts");
			}
			other => panic!("expected rejection, got {other:?}"),
		}
	}

	#[test]
	fn icon_without_item_data_is_not_found() {
		let dir = tempfile::tempdir().unwrap();
		let config = fixture(dir.path());
		icon(3, 64).save(dir.path().join("Items/Images/metal_partz.png")).unwrap();
		let state = State::new(config).unwrap();

		match recognize(&state.snapshot(), &probe(3), 0.4, "en", None).unwrap() {
			Recognition::Accepted { candidate, item } => {
				assert_eq!(candidate.id, "metal_partz");
				assert_eq!(
					item,
					Lookup::NotFound {
						identifier: "metal_partz".into()
					}
				);
			}
			other => panic!("expected a match, got {other:?}"),
		}
	}

	#[test]
	fn cancelled_token_short_circuits() {
		let dir = tempfile::tempdir().unwrap();
		let state = State::new(fixture(dir.path())).unwrap();
		let cancel = CancelToken::new();
		cancel.cancel();
		match recognize(&state.snapshot(), &probe(1), 0.4, "en", Some(&cancel)).unwrap() {
			Recognition::Cancelled { scanned, total } => assert_eq!((scanned, total), (0, 2)),
			other => panic!("expected cancellation, got {other:?}"),
		}
	}

	#[test]
	fn worker_answers_latest_request() {
		let dir = tempfile::tempdir().unwrap();
		let state = Arc::new(State::new(fixture(dir.path())).unwrap());
		let recognizer = Recognizer::new(state);

		let first = recognizer.submit(probe(2));
		let second = recognizer.submit(probe(1));

		match first.recv().unwrap().unwrap() {
			Recognition::Accepted { candidate, .. } => assert_eq!(candidate.id, "barricade"),
			Recognition::Cancelled { .. } => {}
			other => panic!("unexpected outcome {other:?}"),
		}
		match second.recv().unwrap().unwrap() {
			Recognition::Accepted { candidate, .. } => assert_eq!(candidate.id, "metal_parts"),
			other => panic!("expected a match, got {other:?}"),
		}
	}
}
