//! Multi-method template scoring.
//!
//! A probe is normalized and decomposed exactly like the templates, then
//! compared against every template with an ordered list of weighted methods.
//! The engine never decides whether a match is good enough; it only ranks.

use anyhow::Result;
use image::GrayImage;

use crate::{CancelToken, OwnedImage, RecognitionConfig, Representations, TemplateRepository};

type ScoreFn = fn(&Representations, &Representations) -> Option<f32>;

/// One entry of the composite score.
#[derive(Clone, Copy)]
pub struct Method {
	pub name: &'static str,
	pub weight: f32,
	score: ScoreFn,
}

impl std::fmt::Debug for Method {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Method")
			.field("name", &self.name)
			.field("weight", &self.weight)
			.finish()
	}
}

#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
	pub id: String,
	/// Weighted composite in `[0, 1]`.
	pub score: f32,
	/// Per-method scores in method order; `None` if the method could not be computed.
	pub breakdown: Vec<(&'static str, Option<f32>)>,
}

/// Ranked scan output, best first.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MatchResult {
	pub ranked: Vec<Candidate>,
	/// Templates actually compared.
	pub scanned: usize,
	/// Templates in the repository at scan time.
	pub total: usize,
	/// The scan stopped early because its token was cancelled.
	pub cancelled: bool,
}

impl MatchResult {
	pub fn best(&self) -> Option<&Candidate> {
		self.ranked.first()
	}

	/// The best candidate if it reaches `threshold`.
	pub fn accepted(&self, threshold: f32) -> Option<&Candidate> {
		self.best().filter(|c| c.score >= threshold)
	}

	pub fn top(&self, n: usize) -> &[Candidate] {
		&self.ranked[..n.min(self.ranked.len())]
	}

	pub fn is_partial(&self) -> bool {
		self.cancelled || self.scanned < self.total
	}
}

#[derive(Debug, Clone)]
pub struct SimilarityEngine {
	config: RecognitionConfig,
	methods: Vec<Method>,
}

impl SimilarityEngine {
	pub fn new(config: RecognitionConfig) -> Self {
		let w = config.weights;
		if (w.total() - 1.0).abs() > 1e-3 {
			tracing::warn!(total = w.total(), "method weights do not sum to 1.0");
		}

		let methods = vec![
			Method {
				name: "correlation",
				weight: w.correlation,
				score: |p, t| zncc(&p.gray, &t.gray),
			},
			Method {
				name: "cross_correlation",
				weight: w.cross_correlation,
				score: |p, t| ncc(&p.gray, &t.gray),
			},
			Method {
				name: "equalized_correlation",
				weight: w.equalized_correlation,
				score: |p, t| zncc(&p.equalized, &t.equalized),
			},
			Method {
				name: "histogram",
				weight: w.histogram,
				score: |p, t| histogram_intersection(&p.histogram, &t.histogram),
			},
			Method {
				name: "features",
				weight: w.features,
				score: |p, t| crate::features::match_ratio(&p.descriptors, &t.descriptors),
			},
		];

		Self { config, methods }
	}

	pub fn config(&self) -> &RecognitionConfig {
		&self.config
	}

	pub fn methods(&self) -> &[Method] {
		&self.methods
	}

	/// Normalize a probe bitmap and derive its representations.
	pub fn prepare(&self, probe: &OwnedImage) -> Result<Representations> {
		let image = probe.resized_square(self.config.icon_size)?;
		Ok(Representations::derive(&image, &self.config))
	}

	/// Rank every template in `repo` against `probe`.
	///
	/// Fails only if the probe bitmap cannot be normalized.
	pub fn match_image(
		&self,
		probe: &OwnedImage,
		repo: &TemplateRepository,
		cancel: Option<&CancelToken>,
	) -> Result<MatchResult> {
		let probe = self.prepare(probe)?;
		Ok(self.rank(&probe, repo, cancel))
	}

	/// Rank every template against an already prepared probe.
	///
	/// The token is checked before each template; once it is cancelled the
	/// templates scanned so far are ranked and returned as a partial result.
	pub fn rank(&self, probe: &Representations, repo: &TemplateRepository, cancel: Option<&CancelToken>) -> MatchResult {
		self.scan(probe, repo, |_| cancel.is_some_and(CancelToken::is_cancelled))
	}

	fn scan(
		&self,
		probe: &Representations,
		repo: &TemplateRepository,
		mut should_stop: impl FnMut(usize) -> bool,
	) -> MatchResult {
		let mut result = MatchResult {
			total: repo.len(),
			..MatchResult::default()
		};

		for template in repo.all() {
			if should_stop(result.scanned) {
				result.cancelled = true;
				break;
			}
			result.ranked.push(self.score(probe, template.id(), template.representations()));
			result.scanned += 1;
		}

		result
			.ranked
			.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.id.cmp(&b.id)));

		if result.cancelled {
			tracing::debug!(scanned = result.scanned, total = result.total, "match cancelled");
		} else if let Some(best) = result.best() {
			tracing::debug!(
				best = %best.id,
				score = best.score,
				runners_up = ?result.ranked.iter().skip(1).take(2).map(|c| (&c.id, c.score)).collect::<Vec<_>>(),
				"match finished"
			);
		}
		result
	}

	fn score(&self, probe: &Representations, id: &str, template: &Representations) -> Candidate {
		let breakdown = self
			.methods
			.iter()
			.map(|m| (m.name, (m.score)(probe, template).map(|s| s.clamp(0.0, 1.0))))
			.collect::<Vec<_>>();
		let score = self
			.methods
			.iter()
			.zip(&breakdown)
			.map(|(m, (_, s))| m.weight * s.unwrap_or(0.0))
			.sum::<f32>()
			.clamp(0.0, 1.0);

		Candidate {
			id: id.to_owned(),
			score,
			breakdown,
		}
	}
}

/// Zero-mean normalized cross-correlation, negative correlation clamped to 0.
///
/// `None` if either image has no variance.
fn zncc(a: &GrayImage, b: &GrayImage) -> Option<f32> {
	if a.dimensions() != b.dimensions() {
		return None;
	}
	let n = a.as_raw().len() as f64;
	let mean = |img: &GrayImage| img.as_raw().iter().map(|&v| v as f64).sum::<f64>() / n;
	let (ma, mb) = (mean(a), mean(b));

	let (mut num, mut da, mut db) = (0.0f64, 0.0f64, 0.0f64);
	for (&x, &y) in a.as_raw().iter().zip(b.as_raw()) {
		let x = x as f64 - ma;
		let y = y as f64 - mb;
		num += x * y;
		da += x * x;
		db += y * y;
	}
	if da <= f64::EPSILON || db <= f64::EPSILON {
		return None;
	}
	Some((num / (da * db).sqrt()).max(0.0) as f32)
}

/// Plain normalized cross-correlation of raw intensities.
///
/// `None` if either image is entirely black.
fn ncc(a: &GrayImage, b: &GrayImage) -> Option<f32> {
	if a.dimensions() != b.dimensions() {
		return None;
	}
	let (mut num, mut da, mut db) = (0.0f64, 0.0f64, 0.0f64);
	for (&x, &y) in a.as_raw().iter().zip(b.as_raw()) {
		let (x, y) = (x as f64, y as f64);
		num += x * y;
		da += x * x;
		db += y * y;
	}
	if da == 0.0 || db == 0.0 {
		return None;
	}
	Some((num / (da * db).sqrt()) as f32)
}

/// Mean per-channel histogram intersection.
fn histogram_intersection(a: &[f32], b: &[f32]) -> Option<f32> {
	if a.is_empty() || a.len() != b.len() {
		return None;
	}
	let sum = a.iter().zip(b).map(|(x, y)| x.min(*y)).sum::<f32>();
	Some(sum / 3.0)
}
