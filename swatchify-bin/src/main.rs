//! Generate a small color palette from an image by performing k-means clustering in the HSL color space.

#![deny(unsafe_code, unsafe_op_in_unsafe_fn)]
#![warn(
    clippy::pedantic,
    clippy::cargo,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::todo,
    clippy::unimplemented,
    clippy::unwrap_used,
    clippy::unwrap_in_result,
    clippy::unneeded_field_pattern,
    clippy::rest_pat_in_fully_bound_structs,
    clippy::unnecessary_self_imports,
    clippy::str_to_string,
    clippy::string_to_string,
    clippy::string_slice,
    missing_docs,
    clippy::missing_docs_in_private_items,
    rustdoc::all,
    clippy::float_cmp_const,
    clippy::lossy_float_literal
)]
#![allow(
    clippy::doc_markdown,
    clippy::module_name_repetitions,
    clippy::missing_panics_doc,
    clippy::unreadable_literal
)]

mod cli;
mod html;

#[allow(clippy::wildcard_imports)]
use cli::*;

use std::{
    io,
    path::{Path, PathBuf},
    process::ExitCode,
    time::Instant,
};

use clap::Parser;
use colored::Colorize;
use image::{DynamicImage, GenericImageView};
use palette::{FromColor, Srgb};
use swatchify::{Convergence, PaletteError, PixelBuffer, Swatch};
use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// Record the running time of an expression and log the elapsed time
macro_rules! time {
    ($name: literal, $func_call: expr) => {{
        let start = Instant::now();
        let result = $func_call;
        tracing::debug!("{} took {}ms", $name, start.elapsed().as_millis());
        result
    }};
}

/// Error cases for generating and outputting a palette
#[derive(Debug, Error)]
enum AppError {
    /// Failed to read or decode the image file
    #[error("Failed to load the image file: {0}")]
    ImageLoad(#[from] image::ImageError),
    /// The image could not be turned into a palette
    #[error("Failed to generate a palette: {0}")]
    Palette(#[from] PaletteError),
    /// Failed to write the HTML page
    #[error("Failed to write {path}: {source}", path = .path.display())]
    WriteOutput {
        /// Destination of the page
        path: PathBuf,
        /// Underlying IO error
        source: io::Error,
    },
    /// Failed to build the thread pool
    #[cfg(feature = "threads")]
    #[error("Failed to build the thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

fn main() -> ExitCode {
    let options = Options::parse();
    init_logging(options.verbose);

    let result = run_generate_and_print_palette(&options);

    // Returning Result<_> uses Debug printing instead of Display
    if let Err(e) = result {
        eprintln!("{e}");
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

/// Log to stderr, using `RUST_LOG` if set and otherwise `debug` or `warn` depending on `verbose`
fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with_writer(io::stderr)
        .init();
}

/// Builds a thread pool and then runs `generate_and_print_palette`
#[cfg(feature = "threads")]
fn run_generate_and_print_palette(options: &Options) -> Result<(), AppError> {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(usize::from(options.threads))
        .build()?;

    pool.install(|| generate_and_print_palette(options))
}

/// Runs `generate_and_print_palette` on a single thread
#[cfg(not(feature = "threads"))]
fn run_generate_and_print_palette(options: &Options) -> Result<(), AppError> {
    generate_and_print_palette(options)
}

/// Load an image, generate its palette, and print the result using the given options
fn generate_and_print_palette(options: &Options) -> Result<(), AppError> {
    // Input
    let img = time!("Image loading", load_image(&options.image))?;
    let img = generate_thumbnail(img, options.max_pixels).into_rgba8();

    // Processing
    let mut swatches = {
        let start = Instant::now();
        let result = generate_palette(&PixelBuffer::try_from(&img)?, options)?;
        tracing::debug!(
            "Palette generation took {}ms in total",
            start.elapsed().as_millis()
        );
        result
    };

    if options.reverse {
        swatches.reverse();
    }

    // Output
    print_palette(&swatches, options);

    if let Some(path) = &options.html {
        html::write(path, &swatches).map_err(|source| AppError::WriteOutput {
            path: path.clone(),
            source,
        })?;
        tracing::debug!("Wrote {} swatches to {}", swatches.len(), path.display());
    }

    Ok(())
}

/// Load the image at the given path
fn load_image(path: &Path) -> Result<DynamicImage, AppError> {
    Ok(image::open(path)?)
}

/// Create a thumbnail with at most `max_pixels` pixels if the image has more than `max_pixels` pixels
fn generate_thumbnail(image: DynamicImage, max_pixels: u32) -> DynamicImage {
    // The number of pixels should be < u64::MAX, since image dimensions are (u32, u32)
    let (width, height) = image.dimensions();
    let pixels = u64::from(width) * u64::from(height);
    if pixels <= u64::from(max_pixels) {
        tracing::debug!("Skipping image thumbnail since pixels was below max pixels");
        image
    } else {
        // (u64 as f64) only gives innaccurate results for very large u64
        // I.e, only when pixels is in the order of quintillions
        #[allow(clippy::cast_precision_loss)]
        let scale = (f64::from(max_pixels) / pixels as f64).sqrt();

        // multiplying by a positive factor < 1
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let (thumb_width, thumb_height) = (
            (f64::from(width) * scale) as u32,
            (f64::from(height) * scale) as u32,
        );

        // Very elongated images can scale a side below one pixel,
        // in which case the other side takes the remaining budget
        let thumb_width = thumb_width.max(1);
        let thumb_height = thumb_height.max(1);
        let thumb_width = thumb_width.min(max_pixels / thumb_height).max(1);
        let thumb_height = thumb_height.min(max_pixels / thumb_width).max(1);

        tracing::debug!("Creating a thumbnail with dimensions {thumb_width}x{thumb_height}");

        time!(
            "Image thumbnail",
            image.thumbnail(thumb_width, thumb_height)
        )
    }
}

/// Generate the sorted palette for the given pixels and options
fn generate_palette(pixels: &PixelBuffer, options: &Options) -> Result<Vec<Swatch>, PaletteError> {
    #[cfg(feature = "threads")]
    let samples = time!("Preprocessing", swatchify::convert_to_samples_par(pixels));
    #[cfg(not(feature = "threads"))]
    let samples = time!("Preprocessing", swatchify::convert_to_samples(pixels));

    let quantized = time!(
        "k-means",
        swatchify::quantize(&samples, &options.quantize_options())
    )?;

    match quantized.convergence {
        Convergence::Converged => tracing::debug!(
            "k-means converged after {} iterations with {} colors",
            quantized.iterations,
            quantized.swatches.len()
        ),
        Convergence::IterationCap => tracing::warn!(
            "k-means did not converge within {} iterations, the palette is a best effort",
            quantized.iterations
        ),
    }

    Ok(swatchify::sort_swatches(quantized, options.sort.into()))
}

/// Convert a [`Swatch`] to an [`Srgb`] color with `u8` components
fn to_srgb(swatch: Swatch) -> Srgb<u8> {
    let hsl: palette::Hsl = palette::Hsl::new(
        f32::from(swatch.h),
        f32::from(swatch.s) / 100.0,
        f32::from(swatch.l) / 100.0,
    );
    Srgb::from_color(hsl).into_format::<u8>()
}

/// Print the given colors based off the provided options
fn print_palette(swatches: &[Swatch], options: &Options) {
    match options.output {
        FormatOutput::Hsl => color_format_print(swatches, options, " ", |swatch, _| {
            format!("hsl({},{}%,{}%)", swatch.h, swatch.s, swatch.l)
        }),

        FormatOutput::Hex => {
            color_format_print(swatches, options, " ", |_, color| format!("#{color:X}"))
        }

        FormatOutput::Rgb => color_format_print(swatches, options, " ", |_, color| {
            format!("({},{},{})", color.red, color.green, color.blue)
        }),

        FormatOutput::Swatch => print_colors(swatches, "", |_, color| {
            "   "
                .on_truecolor(color.red, color.green, color.blue)
                .to_string()
        }),
    }
}

/// Print a line of colors using the given format
fn print_colors(swatches: &[Swatch], delimiter: &str, format: impl Fn(Swatch, Srgb<u8>) -> String) {
    println!(
        "{}",
        swatches
            .iter()
            .map(|&swatch| format(swatch, to_srgb(swatch)))
            .collect::<Vec<_>>()
            .join(delimiter)
    );
}

/// Format, colorize, and then print the text for all colors
fn color_format_print(
    swatches: &[Swatch],
    options: &Options,
    delimiter: &str,
    format: impl Fn(Swatch, Srgb<u8>) -> String,
) {
    match options.colorize {
        Some(ColorizeOutput::Fg) => print_colors(swatches, delimiter, |swatch, color| {
            format(swatch, color)
                .truecolor(color.red, color.green, color.blue)
                .to_string()
        }),

        Some(ColorizeOutput::Bg) => print_colors(swatches, delimiter, |swatch, color| {
            format(swatch, color)
                .on_truecolor(color.red, color.green, color.blue)
                .to_string()
        }),

        None => print_colors(swatches, delimiter, format),
    }
}
