//! Generate a small color palette for an image by performing k-means clustering in the HSL color space.
//!
//! # Examples
//!
//! ## Read an image file and get up to 6 swatches ordered by lightness.
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let image = image::open("some image")?.into_rgba8();
//! let pixels = swatchify::PixelBuffer::try_from(&image)?;
//! let swatches = swatchify::palette_from_pixels(&pixels, &swatchify::QuantizeOptions::new())?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Run k-means multiple times on the same samples.
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use swatchify::QuantizeOptions;
//!
//! let image = image::open("some image")?.into_rgb8();
//! let samples = swatchify::convert_to_samples(&swatchify::PixelBuffer::try_from(&image)?);
//!
//! let six = swatchify::quantize(&samples, &QuantizeOptions::new().k(6))?;
//! let ten = swatchify::quantize(&samples, &QuantizeOptions::new().k(10).seed(1))?;
//! # Ok(())
//! # }
//! ```
//!
//! # Algorithm
//!
//! Each pixel becomes an [`Hsl`] sample with components in `0.0..=1.0`.
//! Initial centroids are placed at random on a coarse grid (each component is a multiple of `0.1`).
//! Then every sample is assigned to its closest centroid,
//! each centroid moves to the mean of its members, and the samples are assigned again.
//! This repeats until every cluster has the same number of members as in the previous assignment.
//! Finally, each cluster is reduced to the member closest to its mean,
//! so every resulting [`Swatch`] is a color that actually occurs in the image.
//!
//! # Options
//!
//! Here are explanations of the fields of [`QuantizeOptions`].
//!
//! ## K
//!
//! This is the (maximum) number of swatches to find, and defaults to 6.
//!
//! Clusters that end up without any members are dropped,
//! so fewer than `k` swatches can be returned. An image with a single color always gives one swatch.
//!
//! ## Max Iterations
//!
//! This is the maximum number of assignment passes.
//!
//! The member count test usually stops k-means after a handful of passes,
//! but it is not guaranteed to ever be satisfied.
//! When the cap is reached, the palette is still returned
//! and [`Quantized::convergence`] is [`Convergence::IterationCap`].
//!
//! ## Seed
//!
//! This is the value used to seed the random number generator which is used to place the initial centroids.
//! The same seed and samples always give the same result.
//!
//! ## Metric
//!
//! [`Metric::Euclidean`] treats hue as a linear axis, so a hue of `0.02` and `0.98` are far apart
//! even though both are shades of red.
//! [`Metric::CircularHue`] wraps the hue difference around instead.
//! Centroids are arithmetic means under both metrics.

#![deny(unsafe_code)]
#![warn(clippy::pedantic, clippy::cargo)]
#![warn(clippy::use_debug, clippy::dbg_macro, clippy::todo, clippy::unimplemented)]
#![warn(clippy::unwrap_used, clippy::unwrap_in_result)]
#![warn(clippy::unneeded_field_pattern, clippy::rest_pat_in_fully_bound_structs)]
#![warn(clippy::unnecessary_self_imports)]
#![warn(clippy::str_to_string, clippy::string_to_string, clippy::string_slice)]
#![warn(missing_docs, clippy::missing_docs_in_private_items, rustdoc::all)]
#![warn(clippy::float_cmp_const, clippy::lossy_float_literal)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::unreadable_literal)]

mod error;
pub mod geometry;
mod hsl;
mod kmeans;
mod order;
mod pixels;
mod reduce;

pub use error::PaletteError;
pub use geometry::Metric;
pub use hsl::Hsl;
pub use kmeans::{quantize, Convergence, QuantizeOptions, Quantized, DEFAULT_K, DEFAULT_MAX_ITER};
pub use order::{order_by_lightness, sort_swatches, SortKey};
#[cfg(feature = "threads")]
pub use pixels::convert_to_samples_par;
pub use pixels::{convert_to_samples, ChannelLayout, PixelBuffer};
pub use reduce::{medoid, reduce, Swatch};

/// Convert, quantize, and order the pixels by lightness in one go.
///
/// See the crate documentation for information on each option.
///
/// # Errors
/// Returns an error if the buffer has no pixels or the options are invalid.
pub fn palette_from_pixels(pixels: &PixelBuffer, options: &QuantizeOptions) -> Result<Vec<Swatch>, PaletteError> {
	#[cfg(feature = "threads")]
	let samples = convert_to_samples_par(pixels);
	#[cfg(not(feature = "threads"))]
	let samples = convert_to_samples(pixels);

	let quantized = quantize(&samples, options)?;
	Ok(order_by_lightness(quantized.swatches))
}
