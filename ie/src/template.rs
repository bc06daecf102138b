use anyhow::Result;
use image::GrayImage;

use crate::{OwnedImage, RecognitionConfig, features::Descriptor};

/// Everything derived from a normalized bitmap that the scoring methods read.
///
/// Built by the same function for templates and probes, so both sides are
/// always comparable.
#[derive(Debug, Clone)]
pub struct Representations {
	pub gray: GrayImage,
	pub equalized: GrayImage,
	/// `3 * bins` entries (r, g, b blocks), each block summing to 1.
	pub histogram: Vec<f32>,
	pub descriptors: Vec<Descriptor>,
}

impl Representations {
	/// Derive from an image already normalized to `config.icon_size`.
	pub fn derive(image: &OwnedImage, config: &RecognitionConfig) -> Self {
		let gray = image.to_gray_image();
		let equalized = imageproc::contrast::equalize_histogram(&gray);
		let histogram = color_histogram(image, config.histogram_bins);
		let descriptors = crate::features::extract(&gray, config.descriptor_budget, config.fast_threshold);

		Self {
			gray,
			equalized,
			histogram,
			descriptors,
		}
	}
}

fn color_histogram(image: &OwnedImage, bins: u32) -> Vec<f32> {
	let bins = bins.clamp(1, 256) as usize;
	let mut hist = vec![0f32; bins * 3];
	let bin = |v: u8| v as usize * bins / 256;

	for c in image.pixels() {
		hist[bin(c.r)] += 1.0;
		hist[bins + bin(c.g)] += 1.0;
		hist[bins * 2 + bin(c.b)] += 1.0;
	}

	let total = image.pixels().len() as f32;
	for v in &mut hist {
		*v /= total;
	}
	hist
}

/// A reference icon with its precomputed representations. Immutable once built.
#[derive(Debug, Clone)]
pub struct Template {
	id: String,
	image: OwnedImage,
	repr: Representations,
}

impl Template {
	/// Normalize `image` to the configured icon size and precompute its representations.
	pub fn new(id: impl Into<String>, image: &OwnedImage, config: &RecognitionConfig) -> Result<Self> {
		let image = image.resized_square(config.icon_size)?;
		let repr = Representations::derive(&image, config);
		Ok(Self {
			id: id.into(),
			image,
			repr,
		})
	}

	pub fn id(&self) -> &str {
		&self.id
	}

	/// The normalized bitmap the representations were derived from.
	pub fn image(&self) -> &OwnedImage {
		&self.image
	}

	pub fn representations(&self) -> &Representations {
		&self.repr
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::Color;

	#[test]
	fn histogram_channels_sum_to_one() {
		let data = (0..64u32).map(|i| Color::new(i as u8 * 4, 255, 0)).collect();
		let img = OwnedImage::from_pixels(8, 8, data).unwrap();
		let hist = color_histogram(&img, 16);
		assert_eq!(hist.len(), 48);
		for channel in hist.chunks(16) {
			assert!((channel.iter().sum::<f32>() - 1.0).abs() < 1e-5);
		}
		assert_eq!(hist[16 + 15], 1.0);
		assert_eq!(hist[32], 1.0);
	}

	#[test]
	fn template_is_normalized_to_icon_size() {
		let config = RecognitionConfig {
			icon_size: 32,
			..RecognitionConfig::default()
		};
		let img = OwnedImage::from_pixels(50, 20, vec![Color::WHITE; 1000]).unwrap();
		let tpl = Template::new("wire", &img, &config).unwrap();
		assert_eq!(tpl.id(), "wire");
		assert_eq!((tpl.image().width(), tpl.image().height()), (32, 32));
		assert_eq!(tpl.representations().gray.dimensions(), (32, 32));
		assert_eq!(tpl.representations().histogram.len(), 96);
	}
}
