//! Specifies the CLI and handles arg parsing

use clap::{Parser, ValueEnum};
use std::{
	fmt::{Debug, Display},
	ops::RangeBounds,
	path::PathBuf,
	str::FromStr,
};
use swatchify::{Metric, QuantizeOptions, SortKey, DEFAULT_K, DEFAULT_MAX_ITER};

/// Supported output formats for the final colors
#[derive(Copy, Clone, ValueEnum)]
pub enum FormatOutput {
	/// CSS hsl() notation
	Hsl,
	/// sRGB hexcode
	Hex,
	/// sRGB (r,g,b) triple
	Rgb,
	/// Whitespace with true color background
	Swatch,
}

/// Sort orders for the final colors
#[derive(Copy, Clone, ValueEnum)]
pub enum SortOutput {
	/// Ascending hue
	H,
	/// Ascending saturation
	S,
	/// Ascending lightness
	L,
	/// Descending number of pixels
	N,
}

impl From<SortOutput> for SortKey {
	fn from(sort: SortOutput) -> Self {
		match sort {
			SortOutput::H => SortKey::Hue,
			SortOutput::S => SortKey::Saturation,
			SortOutput::L => SortKey::Lightness,
			SortOutput::N => SortKey::Count,
		}
	}
}

/// Ways to colorize the output text
#[derive(Copy, Clone, ValueEnum)]
pub enum ColorizeOutput {
	/// Foreground
	Fg,
	/// Background
	Bg,
}

/// Generate a small color palette for an image by performing k-means clustering in the HSL color space.
///
/// Each color in the palette is a pixel color that occurs in the image.
#[derive(Parser)]
#[command(version)]
pub struct Options {
	/// The path to the input image
	#[arg(short, long)]
	pub image: PathBuf,

	/// The format to print the colors in
	#[arg(short, long, default_value = "hsl")]
	pub output: FormatOutput,

	/// Color the foreground or background for each printed color
	#[arg(short, long)]
	pub colorize: Option<ColorizeOutput>,

	/// The order to print the colors in
	#[arg(short, long, default_value = "l")]
	pub sort: SortOutput,

	/// Reverse the printed order of the colors
	#[arg(short, long)]
	pub reverse: bool,

	/// Also write an HTML page with one tile per color to this path
	#[arg(long)]
	pub html: Option<PathBuf>,

	/// The (maximum) number of colors to find
	#[arg(short, default_value_t = DEFAULT_K, value_parser = parse_valid_k)]
	pub k: u8,

	/// The maximum number of k-means iterations
	///
	/// k-means normally stops once the number of pixels in each cluster no longer changes.
	/// If this limit is reached first, the palette is still printed and a warning is logged.
	#[arg(long, default_value_t = DEFAULT_MAX_ITER, value_parser = parse_valid_max_iter)]
	pub max_iter: u32,

	/// The seed value used for the random number generator
	#[arg(long, default_value_t = 0)]
	pub seed: u64,

	/// Treat hue as circular when comparing colors, so that hues near 0 and 360 are close
	#[arg(long)]
	pub circular_hue: bool,

	/// The maximum image size, in number of pixels, before a thumbnail is created
	///
	/// This option is intended for reducing the time needed for large images,
	/// but the interpolated thumbnail pixels may not occur in the original image.
	#[arg(short = 'p', long, default_value_t = u32::MAX)]
	pub max_pixels: u32,

	/// The number of threads to use
	///
	/// A value of 0 indicates to use the number of available cores.
	#[cfg(feature = "threads")]
	#[arg(short, long, default_value_t = 0)]
	pub threads: u8,

	/// Log additional information, such as the number of k-means iterations and the time of each step
	#[arg(short, long)]
	pub verbose: bool,
}

impl Options {
	/// The library options for these command line options
	pub fn quantize_options(&self) -> QuantizeOptions {
		let metric = if self.circular_hue {
			Metric::CircularHue
		} else {
			Metric::Euclidean
		};

		QuantizeOptions::new()
			.k(self.k)
			.max_iter(self.max_iter)
			.seed(self.seed)
			.metric(metric)
	}
}

/// Parse a value and ensure it is in the provided, valid range
fn parse_in_range<T>(s: &str, range: impl RangeBounds<T> + Debug) -> Result<T, String>
where
	T: FromStr + Display + PartialOrd,
	T::Err: Display,
{
	let value: T = s.parse().map_err(|e| format!("{e}"))?;
	if range.contains(&value) {
		Ok(value)
	} else {
		Err(format!("{value} is not in {range:?}"))
	}
}

/// Parse the number of clusters and ensure it is at least 1
fn parse_valid_k(s: &str) -> Result<u8, String> {
	parse_in_range(s, 1..)
}

/// Parse the maximum number of iterations and ensure it is at least 1
fn parse_valid_max_iter(s: &str) -> Result<u32, String> {
	parse_in_range(s, 1..)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
	use super::*;
	use clap::CommandFactory;

	#[test]
	fn verify_cli() {
		Options::command().debug_assert();
	}

	#[test]
	fn defaults() {
		let options = Options::try_parse_from(["swatchify", "--image", "in.png"]).unwrap();
		assert_eq!(options.quantize_options(), QuantizeOptions::new());
		assert!(options.html.is_none());
		assert!(matches!(options.sort, SortOutput::L));
	}

	#[test]
	fn quantize_options_from_args() {
		let options = Options::try_parse_from([
			"swatchify",
			"-i",
			"in.png",
			"-k",
			"9",
			"--max-iter",
			"12",
			"--seed",
			"77",
			"--circular-hue",
		])
		.unwrap();

		assert_eq!(
			options.quantize_options(),
			QuantizeOptions::new()
				.k(9)
				.max_iter(12)
				.seed(77)
				.metric(Metric::CircularHue)
		);
	}

	#[test]
	fn invalid_values_are_rejected() {
		assert!(Options::try_parse_from(["swatchify", "-i", "in.png", "-k", "0"]).is_err());
		assert!(Options::try_parse_from(["swatchify", "-i", "in.png", "-k", "256"]).is_err());
		assert!(Options::try_parse_from(["swatchify", "-i", "in.png", "--max-iter", "0"]).is_err());
		assert!(Options::try_parse_from(["swatchify", "-k", "3"]).is_err());
	}

	#[test]
	fn range_parsing() {
		assert_eq!(parse_in_range::<u8>("5", 1..), Ok(5));
		assert_eq!(parse_in_range::<u8>("0", 1..), Err("0 is not in 1..".to_owned()));
		assert!(parse_in_range::<u32>("-1", 1..).is_err());
	}
}
