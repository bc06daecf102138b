//! Image primitives and utilities.
//!
//! The project uses a lightweight owned RGB image type (`OwnedImage`) for both
//! reference icons and captured probes. Alpha is composited away on load so
//! every downstream representation works on plain RGB.
//!
//! For cropping a capture we borrow a view (`Image<'a>`) instead of copying
//! pixels, and only convert to an owned image once the region is final.

use anyhow::{Context, Result, ensure};

/// Owned RGB image (no alpha).
#[derive(Clone, Debug, PartialEq)]
pub struct OwnedImage {
    width: u32,
    height: u32,
    data: Vec<Color>,
}

impl OwnedImage {
    /// Build an `OwnedImage` from RGBA bytes, compositing alpha onto `background`.
    ///
    /// The buffer is expected to be tightly packed: `width * height * 4` bytes.
    pub fn from_rgba(width: u32, height: u32, bytes: &[u8], background: Color) -> Result<Self> {
        ensure!(width > 0 && height > 0, "image has zero size ({width}x{height})");
        ensure!(
            bytes.len() == (width as usize) * (height as usize) * 4,
            "rgba buffer length {} does not match {width}x{height}",
            bytes.len()
        );

        let data = bytes
            .chunks_exact(4)
            .map(|v| Color::new(v[0], v[1], v[2]).over(background, v[3]))
            .collect::<Vec<_>>();

        Ok(Self { width, height, data })
    }

    /// Build an `OwnedImage` from tightly packed RGB bytes.
    pub fn from_rgb(width: u32, height: u32, bytes: &[u8]) -> Result<Self> {
        ensure!(width > 0 && height > 0, "image has zero size ({width}x{height})");
        ensure!(
            bytes.len() == (width as usize) * (height as usize) * 3,
            "rgb buffer length {} does not match {width}x{height}",
            bytes.len()
        );

        let data = bytes
            .chunks_exact(3)
            .map(|v| Color::new(v[0], v[1], v[2]))
            .collect::<Vec<_>>();

        Ok(Self { width, height, data })
    }

    /// Build an `OwnedImage` from a list of pixels in row-major order.
    pub fn from_pixels(width: u32, height: u32, data: Vec<Color>) -> Result<Self> {
        ensure!(width > 0 && height > 0, "image has zero size ({width}x{height})");
        ensure!(
            data.len() == (width as usize) * (height as usize),
            "pixel count {} does not match {width}x{height}",
            data.len()
        );
        Ok(Self { width, height, data })
    }

    /// Decode any format supported by `image` (png, webp, jpeg, ...).
    pub fn decode(bytes: &[u8], background: Color) -> Result<Self> {
        let img = image::load_from_memory(bytes)
            .context("decode image")?
            .to_rgba8();
        let (width, height) = img.dimensions();
        Self::from_rgba(width, height, img.as_raw(), background)
    }

    #[inline(always)]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline(always)]
    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[Color] {
        &self.data
    }

    /// Resize to a `size`×`size` square, ignoring the aspect ratio.
    ///
    /// Uses `fast_image_resize` (SIMD-optimized). Images already at the target
    /// size are returned untouched so a stored template and an identical probe
    /// stay bit-for-bit equal.
    pub fn resized_square(&self, size: u32) -> Result<Self> {
        ensure!(size > 0, "target size must be non-zero");
        if self.width == size && self.height == size {
            return Ok(self.clone());
        }

        let bytes = self.as_image().rgb_bytes();
        let src = fast_image_resize::images::ImageRef::new(
            self.width,
            self.height,
            &bytes,
            fast_image_resize::PixelType::U8x3,
        )
        .context("fast_image_resize: ImageRef::new failed")?;

        let mut dst = fast_image_resize::images::Image::new(size, size, fast_image_resize::PixelType::U8x3);

        let mut resizer = fast_image_resize::Resizer::new();
        let options = fast_image_resize::ResizeOptions::new().resize_alg(
            fast_image_resize::ResizeAlg::Interpolation(fast_image_resize::FilterType::CatmullRom),
        );

        resizer
            .resize(&src, &mut dst, &options)
            .context("fast_image_resize: resize failed")?;

        Self::from_rgb(size, size, &dst.into_vec())
    }

    /// Create a borrowed view of this entire image.
    pub fn as_image<'a>(&'a self) -> Image<'a> {
        Image {
            x1: 0,
            y1: 0,
            x2: self.width,
            y2: self.height,
            true_width: self.width,
            data: &self.data,
        }
    }

    /// Convert to a grayscale `GrayImage` (luma).
    pub fn to_gray_image(&self) -> image::GrayImage {
        let luma = self.data.iter().map(Color::luma).collect::<Vec<_>>();
        // Length always matches since `data` holds exactly width*height pixels.
        image::GrayImage::from_raw(self.width, self.height, luma).unwrap_or_default()
    }
}

// ----------

/// Borrowed image view into an `OwnedImage`.
#[derive(Clone, Copy)]
pub struct Image<'a> {
    x1: u32,
    y1: u32,
    x2: u32,
    y2: u32,
    true_width: u32,
    data: &'a [Color],
}

impl<'a> Image<'a> {
    #[inline(always)]
    pub fn width(&self) -> u32 {
        self.x2 - self.x1
    }

    #[inline(always)]
    pub fn height(&self) -> u32 {
        self.y2 - self.y1
    }

    #[inline(always)]
    fn pixel(&self, x: u32, y: u32) -> &Color {
        &self.data[(x + y * self.true_width) as usize]
    }

    pub fn to_owned_image(self) -> OwnedImage {
        let mut data = Vec::with_capacity((self.width() * self.height()) as usize);
        for y in self.y1..self.y2 {
            for x in self.x1..self.x2 {
                data.push(*self.pixel(x, y));
            }
        }

        OwnedImage {
            width: self.width(),
            height: self.height(),
            data,
        }
    }

    /// Tightly packed RGB bytes of the visible region, row-major.
    pub fn rgb_bytes(&self) -> Vec<u8> {
        (self.y1..self.y2)
            .flat_map(|y| (self.x1..self.x2).map(move |x| (x, y)))
            .flat_map(|(x, y)| {
                let c = self.pixel(x, y);
                [c.r, c.g, c.b]
            })
            .collect()
    }

    /// Create an arbitrary subimage (relative coordinates).
    pub fn sub_image(&self, x: u32, y: u32, width: u32, height: u32) -> Self {
        let x = x.min(self.width());
        let y = y.min(self.height());
        let width = width.min(self.width() - x);
        let height = height.min(self.height() - y);

        Self {
            x1: self.x1 + x,
            y1: self.y1 + y,
            x2: self.x1 + x + width,
            y2: self.y1 + y + height,
            true_width: self.true_width,
            data: self.data,
        }
    }

    /// A `size`×`size` region centered on (`cx`, `cy`), shifted to stay inside the image.
    ///
    /// The result is smaller than `size` only when the image itself is.
    pub fn centered_square(&self, cx: u32, cy: u32, size: u32) -> Self {
        let w = size.min(self.width());
        let h = size.min(self.height());
        let x = cx.saturating_sub(w / 2).min(self.width() - w);
        let y = cy.saturating_sub(h / 2).min(self.height() - h);
        self.sub_image(x, y, w, h)
    }
}

// ----------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
#[repr(C)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const WHITE: Self = Self::new(255, 255, 255);
    pub const BLACK: Self = Self::new(0, 0, 0);

    #[inline]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Alpha-blend this color over `background`.
    pub fn over(self, background: Color, alpha: u8) -> Color {
        if alpha == 255 {
            return self;
        }
        let a = alpha as u32;
        let mix = |fg: u8, bg: u8| ((fg as u32 * a + bg as u32 * (255 - a) + 127) / 255) as u8;
        Color::new(
            mix(self.r, background.r),
            mix(self.g, background.g),
            mix(self.b, background.b),
        )
    }

    /// Compute luma (grayscale intensity).
    pub fn luma(&self) -> u8 {
        let r = self.r as u32;
        let g = self.g as u32;
        let b = self.b as u32;
        ((299 * r + 587 * g + 114 * b) / 1000) as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(width: u32, height: u32) -> OwnedImage {
        let data = (0..width * height)
            .map(|i| Color::new((i % 256) as u8, (i / 3 % 256) as u8, 40))
            .collect();
        OwnedImage::from_pixels(width, height, data).unwrap()
    }

    #[test]
    fn rejects_zero_size_and_bad_buffers() {
        assert!(OwnedImage::from_rgb(0, 4, &[]).is_err());
        assert!(OwnedImage::from_rgb(2, 2, &[0; 11]).is_err());
        assert!(OwnedImage::from_rgba(2, 2, &[0; 15], Color::BLACK).is_err());
    }

    #[test]
    fn transparent_pixels_take_the_background() {
        let bytes = [200, 100, 50, 0, 200, 100, 50, 255];
        let img = OwnedImage::from_rgba(2, 1, &bytes, Color::new(10, 20, 30)).unwrap();
        assert_eq!(img.pixels()[0], Color::new(10, 20, 30));
        assert_eq!(img.pixels()[1], Color::new(200, 100, 50));
    }

    #[test]
    fn resize_ignores_aspect_ratio() {
        let img = gradient(40, 20).resized_square(16).unwrap();
        assert_eq!((img.width(), img.height()), (16, 16));
    }

    #[test]
    fn resize_to_same_size_is_identity() {
        let img = gradient(16, 16);
        assert_eq!(img.resized_square(16).unwrap(), img);
    }

    #[test]
    fn centered_square_is_clamped_to_the_image() {
        let img = gradient(100, 50);
        let view = img.as_image().centered_square(95, 2, 40);
        assert_eq!((view.width(), view.height()), (40, 40));
        let owned = view.to_owned_image();
        assert_eq!(owned.pixels()[0], img.pixels()[60]);
    }
}
