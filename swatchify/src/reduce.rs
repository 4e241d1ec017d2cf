//! Reduces each cluster to a single representative [`Swatch`]

use crate::{
	geometry::{self, ColorDifference, EuclideanDistance},
	Hsl, PaletteError,
};
use std::fmt::{self, Display};

/// A palette color in conventional display ranges.
///
/// Hue is in degrees (`0..=360`), saturation and lightness are percentages (`0..=100`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Swatch {
	/// Hue in degrees
	pub h: u16,
	/// Saturation percentage
	pub s: u8,
	/// Lightness percentage
	pub l: u8,
}

impl Swatch {
	/// Create a new [`Swatch`]
	#[must_use]
	pub const fn new(h: u16, s: u8, l: u8) -> Self {
		Self { h, s, l }
	}
}

impl From<Hsl> for Swatch {
	/// Scale each component, rounding to the nearest integer with halves rounded up
	// Clamped right before each cast
	#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
	fn from(color: Hsl) -> Self {
		Self {
			h: (color.h * 360.0).round().clamp(0.0, 360.0) as u16,
			s: (color.s * 100.0).round().clamp(0.0, 100.0) as u8,
			l: (color.l * 100.0).round().clamp(0.0, 100.0) as u8,
		}
	}
}

impl Display for Swatch {
	/// CSS notation, e.g. `hsl(210, 50%, 40%)`
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "hsl({}, {}%, {}%)", self.h, self.s, self.l)
	}
}

/// Returns the member closest to the mean of all members, using the given [`ColorDifference`].
///
/// Ties go to the member that comes first.
pub(crate) fn medoid_by<D: ColorDifference>(members: &[Hsl]) -> Result<Hsl, PaletteError> {
	let mean = geometry::centroid(members)?;

	let mut closest = members[0];
	let mut min_dist = D::distance(mean, closest);
	for &member in &members[1..] {
		let dist = D::distance(mean, member);
		if dist < min_dist {
			min_dist = dist;
			closest = member;
		}
	}

	Ok(closest)
}

/// Returns the member closest to the mean of all members.
///
/// Unlike the mean itself, the result is guaranteed to be a color that occurs in `members`.
/// Ties go to the member that comes first.
///
/// # Errors
/// Returns [`PaletteError::EmptyMembers`] if `members` is empty.
pub fn medoid(members: &[Hsl]) -> Result<Hsl, PaletteError> {
	medoid_by::<EuclideanDistance>(members)
}

/// Reduce the members of a cluster to one [`Swatch`] via [`medoid`].
///
/// # Errors
/// Returns [`PaletteError::EmptyMembers`] if `members` is empty.
pub fn reduce(members: &[Hsl]) -> Result<Swatch, PaletteError> {
	medoid(members).map(Swatch::from)
}
