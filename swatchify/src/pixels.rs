//! The raw pixel buffer consumed by the library and its conversion into [`Hsl`] samples

use crate::{Hsl, PaletteError};
use image::{RgbImage, RgbaImage};
use palette::{Srgb, Srgba};

/// The channels stored for each pixel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelLayout {
	/// Red, green, blue
	Rgb,
	/// Red, green, blue, alpha
	Rgba,
}

impl ChannelLayout {
	/// The number of bytes per pixel
	#[must_use]
	pub const fn channels(self) -> usize {
		match self {
			ChannelLayout::Rgb => 3,
			ChannelLayout::Rgba => 4,
		}
	}
}

/// A borrowed, row-major buffer of 8-bit sRGB pixels
#[derive(Debug, Clone, Copy)]
pub struct PixelBuffer<'a> {
	/// Width in pixels
	width: u32,
	/// Height in pixels
	height: u32,
	/// Interleaved channel data, exactly `width * height * layout.channels()` bytes
	data: &'a [u8],
	/// The channels of each pixel
	layout: ChannelLayout,
}

impl<'a> PixelBuffer<'a> {
	/// Wrap interleaved channel data.
	///
	/// # Errors
	/// Returns [`PaletteError::BufferSize`] if `data` does not hold exactly
	/// `width * height` pixels in the given layout.
	pub fn new(width: u32, height: u32, data: &'a [u8], layout: ChannelLayout) -> Result<Self, PaletteError> {
		let expected = usize::try_from(u64::from(width) * u64::from(height))
			.ok()
			.and_then(|pixels| pixels.checked_mul(layout.channels()))
			.unwrap_or(usize::MAX);

		if data.len() == expected {
			Ok(Self { width, height, data, layout })
		} else {
			Err(PaletteError::BufferSize { expected, actual: data.len() })
		}
	}

	/// Width in pixels
	#[must_use]
	pub const fn width(&self) -> u32 {
		self.width
	}

	/// Height in pixels
	#[must_use]
	pub const fn height(&self) -> u32 {
		self.height
	}

	/// The channel layout
	#[must_use]
	pub const fn layout(&self) -> ChannelLayout {
		self.layout
	}

	/// The number of pixels
	#[must_use]
	pub const fn len(&self) -> usize {
		self.data.len() / self.layout.channels()
	}

	/// Whether the buffer has no pixels
	#[must_use]
	pub const fn is_empty(&self) -> bool {
		self.data.is_empty()
	}
}

impl<'a> TryFrom<&'a RgbaImage> for PixelBuffer<'a> {
	type Error = PaletteError;

	fn try_from(image: &'a RgbaImage) -> Result<Self, Self::Error> {
		let (width, height) = image.dimensions();
		Self::new(width, height, image.as_raw(), ChannelLayout::Rgba)
	}
}

impl<'a> TryFrom<&'a RgbImage> for PixelBuffer<'a> {
	type Error = PaletteError;

	fn try_from(image: &'a RgbImage) -> Result<Self, Self::Error> {
		let (width, height) = image.dimensions();
		Self::new(width, height, image.as_raw(), ChannelLayout::Rgb)
	}
}

/// Convert every pixel to an [`Hsl`] sample in row-major order, ignoring alpha.
#[must_use]
pub fn convert_to_samples(pixels: &PixelBuffer) -> Vec<Hsl> {
	match pixels.layout {
		ChannelLayout::Rgb => palette::cast::from_component_slice::<Srgb<u8>>(pixels.data)
			.iter()
			.map(|&color| Hsl::from(color))
			.collect(),
		ChannelLayout::Rgba => palette::cast::from_component_slice::<Srgba<u8>>(pixels.data)
			.iter()
			.map(|&color| Hsl::from(color))
			.collect(),
	}
}

/// Convert every pixel to an [`Hsl`] sample in parallel, in row-major order, ignoring alpha.
#[cfg(feature = "threads")]
#[must_use]
pub fn convert_to_samples_par(pixels: &PixelBuffer) -> Vec<Hsl> {
	use rayon::prelude::*;

	match pixels.layout {
		ChannelLayout::Rgb => palette::cast::from_component_slice::<Srgb<u8>>(pixels.data)
			.par_iter()
			.map(|&color| Hsl::from(color))
			.collect(),
		ChannelLayout::Rgba => palette::cast::from_component_slice::<Srgba<u8>>(pixels.data)
			.par_iter()
			.map(|&color| Hsl::from(color))
			.collect(),
	}
}
