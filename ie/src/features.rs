//! Keypoint descriptors.
//!
//! Corners come from `imageproc`'s FAST-9 detector. Each corner is oriented by
//! the intensity centroid of a circular patch and described by a 256-bit
//! binary intensity test pattern rotated to that orientation, which keeps the
//! descriptor stable under in-plane rotation. Matching is brute-force Hamming
//! distance with a nearest/second-nearest ratio test.

use std::sync::LazyLock;

use image::GrayImage;

const PATCH_RADIUS: i32 = 7;
const SAMPLE_RADIUS: i32 = 6;
const BORDER: u32 = PATCH_RADIUS as u32 + 1;
const BLUR_SIGMA: f32 = 1.2;
const WORDS: usize = 4;

/// Matches further apart than this are never accepted.
const MAX_DISTANCE: u32 = 64;
/// Best distance must be below `RATIO` times the second best.
const RATIO: f32 = 0.8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Descriptor {
	pub x: u32,
	pub y: u32,
	bits: [u64; WORDS],
}

impl Descriptor {
	pub fn distance(&self, other: &Self) -> u32 {
		self.bits
			.iter()
			.zip(other.bits.iter())
			.map(|(a, b)| (a ^ b).count_ones())
			.sum()
	}
}

/// Fixed sampling pattern: pairs of offsets within `SAMPLE_RADIUS`.
///
/// Generated from a fixed seed so templates built in one process match
/// probes built in another.
static PATTERN: LazyLock<Vec<[(f32, f32); 2]>> = LazyLock::new(|| {
	let mut state = 0x9E37_79B9_7F4A_7C15u64;
	let mut next = move || {
		state ^= state << 13;
		state ^= state >> 7;
		state ^= state << 17;
		state
	};
	let span = (SAMPLE_RADIUS * 2 + 1) as u64;
	let mut point = move || loop {
		let x = (next() % span) as i32 - SAMPLE_RADIUS;
		let y = (next() % span) as i32 - SAMPLE_RADIUS;
		if x * x + y * y <= SAMPLE_RADIUS * SAMPLE_RADIUS {
			return (x as f32, y as f32);
		}
	};

	let mut pairs = Vec::with_capacity(WORDS * 64);
	while pairs.len() < WORDS * 64 {
		let a = point();
		let b = point();
		if a != b {
			pairs.push([a, b]);
		}
	}
	pairs
});

/// Detect up to `budget` keypoints in `gray` and describe them.
///
/// Keypoints are ranked by corner score (position breaks ties) so the
/// selection is deterministic.
pub fn extract(gray: &GrayImage, budget: usize, fast_threshold: u8) -> Vec<Descriptor> {
	let (w, h) = gray.dimensions();
	if budget == 0 || w <= BORDER * 2 || h <= BORDER * 2 {
		return Vec::new();
	}

	let mut corners = imageproc::corners::corners_fast9(gray, fast_threshold)
		.into_iter()
		.filter(|c| c.x >= BORDER && c.y >= BORDER && c.x < w - BORDER && c.y < h - BORDER)
		.collect::<Vec<_>>();
	corners.sort_by(|a, b| {
		b.score
			.total_cmp(&a.score)
			.then(a.y.cmp(&b.y))
			.then(a.x.cmp(&b.x))
	});
	corners.truncate(budget);

	let blurred = imageproc::filter::gaussian_blur_f32(gray, BLUR_SIGMA);
	corners
		.iter()
		.map(|c| describe(&blurred, c.x, c.y))
		.collect()
}

fn orientation(img: &GrayImage, x: u32, y: u32) -> f32 {
	let mut m10 = 0.0f32;
	let mut m01 = 0.0f32;
	for dy in -PATCH_RADIUS..=PATCH_RADIUS {
		for dx in -PATCH_RADIUS..=PATCH_RADIUS {
			if dx * dx + dy * dy > PATCH_RADIUS * PATCH_RADIUS {
				continue;
			}
			let v = img.get_pixel((x as i32 + dx) as u32, (y as i32 + dy) as u32).0[0] as f32;
			m10 += dx as f32 * v;
			m01 += dy as f32 * v;
		}
	}
	m01.atan2(m10)
}

fn describe(img: &GrayImage, x: u32, y: u32) -> Descriptor {
	let (sin, cos) = orientation(img, x, y).sin_cos();
	let sample = |(px, py): (f32, f32)| {
		let rx = (cos * px - sin * py).round() as i32;
		let ry = (sin * px + cos * py).round() as i32;
		img.get_pixel((x as i32 + rx) as u32, (y as i32 + ry) as u32).0[0]
	};

	let mut bits = [0u64; WORDS];
	for (i, [a, b]) in PATTERN.iter().enumerate() {
		if sample(*a) < sample(*b) {
			bits[i / 64] |= 1 << (i % 64);
		}
	}
	Descriptor { x, y, bits }
}

/// Fraction of `probe` descriptors with a confident match in `template`.
///
/// Returns `None` when either side has no descriptors, i.e. the method cannot
/// be computed for this pair.
pub fn match_ratio(probe: &[Descriptor], template: &[Descriptor]) -> Option<f32> {
	if probe.is_empty() || template.is_empty() {
		return None;
	}

	let matched = probe
		.iter()
		.filter(|p| {
			let mut best = u32::MAX;
			let mut second = u32::MAX;
			for t in template {
				let d = p.distance(t);
				if d < best {
					second = best;
					best = d;
				} else if d < second {
					second = d;
				}
			}
			best <= MAX_DISTANCE && (best == 0 || (best as f32) < RATIO * second as f32)
		})
		.count();

	Some(matched as f32 / probe.len() as f32)
}
