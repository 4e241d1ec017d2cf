//! Presentation orderings for the final swatches

use crate::{Quantized, Swatch};
use std::cmp::Reverse;

/// Sort orders for the final swatches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
	/// Ascending hue
	Hue,
	/// Ascending saturation
	Saturation,
	/// Ascending lightness
	Lightness,
	/// Descending number of samples
	Count,
}

/// Stable sort by ascending lightness.
///
/// Swatches with equal lightness keep their relative order, so the result is deterministic.
#[must_use]
pub fn order_by_lightness(mut swatches: Vec<Swatch>) -> Vec<Swatch> {
	swatches.sort_by_key(|swatch| swatch.l);
	swatches
}

/// Stable sort of the swatches in a [`Quantized`] by the given key, dropping the counts.
#[must_use]
pub fn sort_swatches(quantized: Quantized, key: SortKey) -> Vec<Swatch> {
	let mut pairs = quantized
		.swatches
		.into_iter()
		.zip(quantized.counts)
		.collect::<Vec<_>>();

	match key {
		SortKey::Hue => pairs.sort_by_key(|&(swatch, _)| swatch.h),
		SortKey::Saturation => pairs.sort_by_key(|&(swatch, _)| swatch.s),
		SortKey::Lightness => pairs.sort_by_key(|&(swatch, _)| swatch.l),
		SortKey::Count => pairs.sort_by_key(|&(_, n)| Reverse(n)),
	}

	pairs.into_iter().map(|(swatch, _)| swatch).collect()
}
