//! Distance and mean computations over [`Hsl`] samples

use crate::{Hsl, PaletteError};

/// Color difference/distance between two HSL samples
pub trait ColorDifference {
	/// Color difference
	fn distance(x: Hsl, y: Hsl) -> f32;
}

/// Regular Euclidean distance, treating hue as a linear axis
pub struct EuclideanDistance;

impl ColorDifference for EuclideanDistance {
	fn distance(x: Hsl, y: Hsl) -> f32 {
		let dh = x.h - y.h;
		let ds = x.s - y.s;
		let dl = x.l - y.l;
		(dh * dh + ds * ds + dl * dl).sqrt()
	}
}

/// Euclidean distance where the hue difference wraps around, so that hues near `0.0` and `1.0` are close
pub struct CircularHueDistance;

impl ColorDifference for CircularHueDistance {
	fn distance(x: Hsl, y: Hsl) -> f32 {
		let dh = (x.h - y.h).abs();
		let dh = f32::min(dh, 1.0 - dh);
		let ds = x.s - y.s;
		let dl = x.l - y.l;
		(dh * dh + ds * ds + dl * dl).sqrt()
	}
}

/// Selects the [`ColorDifference`] used for clustering and medoid selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Metric {
	/// [`EuclideanDistance`]
	#[default]
	Euclidean,
	/// [`CircularHueDistance`]
	CircularHue,
}

/// Euclidean distance between two samples with hue treated linearly.
#[must_use]
pub fn distance(x: Hsl, y: Hsl) -> f32 {
	EuclideanDistance::distance(x, y)
}

/// Componentwise arithmetic mean of `colors`.
///
/// # Errors
/// Returns [`PaletteError::EmptyMembers`] if `colors` is empty.
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
pub fn centroid(colors: &[Hsl]) -> Result<Hsl, PaletteError> {
	if colors.is_empty() {
		return Err(PaletteError::EmptyMembers);
	}

	let (mut h, mut s, mut l) = (0.0, 0.0, 0.0);
	for color in colors {
		h += f64::from(color.h);
		s += f64::from(color.s);
		l += f64::from(color.l);
	}

	// Sums need greater precision, but the average can fall back down to a reduced precision
	let n = colors.len() as f64;
	Ok(Hsl::new((h / n) as f32, (s / n) as f32, (l / n) as f32))
}
