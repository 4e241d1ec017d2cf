//! Conversion from sRGB channels into normalized HSL samples

use palette::{Srgb, Srgba};

/// A color in the HSL color space with every component normalized to `0.0..=1.0`.
///
/// This is the sample type that k-means clusters over.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Hsl {
	/// Hue, in `0.0..1.0` for chromatic colors and `0.0` for grays
	pub h: f32,
	/// Saturation
	pub s: f32,
	/// Lightness
	pub l: f32,
}

impl Hsl {
	/// Create an [`Hsl`] from already normalized components
	#[must_use]
	pub const fn new(h: f32, s: f32, l: f32) -> Self {
		Self { h, s, l }
	}

	/// Convert red, green, and blue channels in the range `0.0..=255.0` to HSL.
	#[must_use]
	pub fn from_rgb(r: f32, g: f32, b: f32) -> Self {
		let (r, g, b) = (r / 255.0, g / 255.0, b / 255.0);
		let max = r.max(g).max(b);
		let min = r.min(g).min(b);
		let l = (max + min) / 2.0;

		// Achromatic, so hue is undefined and conventionally 0
		#[allow(clippy::float_cmp)]
		if max == min {
			return Self { h: 0.0, s: 0.0, l };
		}

		let d = max - min;
		let s = if l > 0.5 { d / (2.0 - max - min) } else { d / (max + min) };

		// Channels are compared exactly since max is one of them
		#[allow(clippy::float_cmp)]
		let h = if max == r {
			(g - b) / d + if g < b { 6.0 } else { 0.0 }
		} else if max == g {
			(b - r) / d + 2.0
		} else {
			(r - g) / d + 4.0
		};

		Self { h: h / 6.0, s, l }
	}
}

impl From<Srgb<u8>> for Hsl {
	fn from(color: Srgb<u8>) -> Self {
		Self::from_rgb(f32::from(color.red), f32::from(color.green), f32::from(color.blue))
	}
}

impl From<Srgba<u8>> for Hsl {
	/// Alpha is ignored
	fn from(color: Srgba<u8>) -> Self {
		Self::from(color.color)
	}
}
