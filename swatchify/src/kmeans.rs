//! Provides the implementation for k-means in the HSL color space

use crate::{
	geometry::{self, CircularHueDistance, ColorDifference, EuclideanDistance, Metric},
	reduce::{self, Swatch},
	Hsl, PaletteError,
};
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoroshiro128PlusPlus;

/// The default number of clusters
pub const DEFAULT_K: u8 = 6;

/// The default cap on the number of assignment passes
pub const DEFAULT_MAX_ITER: u32 = 256;

/// Parameters for [`quantize`].
///
/// # Examples
/// ```
/// # use swatchify::{Metric, QuantizeOptions};
/// let options = QuantizeOptions::new()
///     .k(8)
///     .max_iter(64)
///     .seed(42)
///     .metric(Metric::CircularHue);
/// assert_eq!(options.get_k(), 8);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuantizeOptions {
	/// The (maximum) number of swatches to find
	k: u8,
	/// The maximum number of assignment passes
	max_iter: u32,
	/// The seed for the random initial centroids
	seed: u64,
	/// The color difference used for clustering
	metric: Metric,
}

impl Default for QuantizeOptions {
	fn default() -> Self {
		Self::new()
	}
}

impl QuantizeOptions {
	/// Creates a new [`QuantizeOptions`] with default values.
	#[must_use]
	pub const fn new() -> Self {
		Self {
			k: DEFAULT_K,
			max_iter: DEFAULT_MAX_ITER,
			seed: 0,
			metric: Metric::Euclidean,
		}
	}

	/// Sets the number of clusters, which is the maximum number of swatches returned.
	#[must_use]
	pub const fn k(mut self, k: u8) -> Self {
		self.k = k;
		self
	}

	/// Sets the maximum number of assignment passes.
	///
	/// If this cap is reached before the member counts stabilize,
	/// the result is still returned but marked with [`Convergence::IterationCap`].
	#[must_use]
	pub const fn max_iter(mut self, max_iter: u32) -> Self {
		self.max_iter = max_iter;
		self
	}

	/// Sets the seed value for the random number generator used to place the initial centroids.
	#[must_use]
	pub const fn seed(mut self, seed: u64) -> Self {
		self.seed = seed;
		self
	}

	/// Sets the color difference metric.
	#[must_use]
	pub const fn metric(mut self, metric: Metric) -> Self {
		self.metric = metric;
		self
	}

	/// Returns the number of clusters.
	#[must_use]
	pub const fn get_k(&self) -> u8 {
		self.k
	}

	/// Returns the maximum number of assignment passes.
	#[must_use]
	pub const fn get_max_iter(&self) -> u32 {
		self.max_iter
	}

	/// Returns the seed value.
	#[must_use]
	pub const fn get_seed(&self) -> u64 {
		self.seed
	}

	/// Returns the color difference metric.
	#[must_use]
	pub const fn get_metric(&self) -> Metric {
		self.metric
	}
}

/// How the k-means loop stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Convergence {
	/// Every cluster kept the same number of members across two consecutive assignments
	Converged,
	/// The maximum number of iterations was reached first; the palette is a best effort
	IterationCap,
}

/// Result from running k-means
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quantized {
	/// One swatch per non-empty cluster, in cluster order
	pub swatches: Vec<Swatch>,
	/// Number of samples in the cluster of each swatch
	pub counts: Vec<usize>,
	/// Number of elapsed assignment passes
	pub iterations: u32,
	/// Whether the member counts stabilized
	pub convergence: Convergence,
}

/// A cluster's membership after an assignment phase
enum Membership<'a> {
	/// No samples were assigned, so there is nothing to average
	Empty,
	/// At least one sample was assigned
	Populated(&'a [Hsl]),
}

impl<'a> Membership<'a> {
	/// Tag the given members
	fn of(members: &'a [Hsl]) -> Self {
		if members.is_empty() {
			Membership::Empty
		} else {
			Membership::Populated(members)
		}
	}
}

/// Data for each cluster
struct ClusterData {
	/// The centroid point
	centroid: Vec<Hsl>,
	/// The samples assigned to this cluster in the latest assignment phase
	members: Vec<Vec<Hsl>>,
}

impl ClusterData {
	/// Create a [`ClusterData`] with `k` randomly placed centroids and no members
	fn new(k: u8, rng: &mut impl Rng) -> Self {
		let k = usize::from(k);
		let mut centroid = Vec::with_capacity(k);
		for _ in 0..k {
			let h = coarse_unit(rng);
			let s = coarse_unit(rng);
			let l = coarse_unit(rng);
			centroid.push(Hsl::new(h, s, l));
		}

		Self { centroid, members: vec![Vec::new(); k] }
	}

	/// The number of members in each cluster
	fn counts(&self) -> impl Iterator<Item = usize> + '_ {
		self.members.iter().map(Vec::len)
	}
}

/// Holds all the state used by k-means
struct KmeansState {
	/// Data for each cluster
	clusters: ClusterData,
	/// Cluster assignment for each sample
	assignment: Vec<u8>,
	/// Member counts from the previous assignment phase
	previous_counts: Vec<usize>,
}

impl KmeansState {
	/// Initialize a new [`KmeansState`] with `k` clusters and `n` samples
	fn new(k: u8, n: usize, rng: &mut impl Rng) -> Self {
		Self {
			clusters: ClusterData::new(k, rng),
			assignment: vec![0; n],
			previous_counts: vec![0; usize::from(k)],
		}
	}

	/// Save the current member counts for the next convergence test
	fn snapshot_counts(&mut self) {
		for (previous, count) in self.previous_counts.iter_mut().zip(self.clusters.counts()) {
			*previous = count;
		}
	}

	/// Whether every cluster has the same number of members as in the snapshot
	fn counts_unchanged(&self) -> bool {
		self.clusters.counts().eq(self.previous_counts.iter().copied())
	}
}

/// A random value in `0.0..=1.0` rounded to the nearest tenth.
///
/// The endpoints are only half as likely as the inner values.
fn coarse_unit(rng: &mut impl Rng) -> f32 {
	(rng.gen::<f32>() * 10.0).round() / 10.0
}

/// Returns the index of the centroid closest to `color`, with ties going to the lowest index
// centroids.len() <= u8::MAX
#[allow(clippy::cast_possible_truncation)]
fn nearest<D: ColorDifference>(color: Hsl, centroids: &[Hsl]) -> u8 {
	let mut min_dist = f32::INFINITY;
	let mut min_center = 0;
	for (i, &centroid) in centroids.iter().enumerate() {
		let dist = D::distance(color, centroid);
		if dist < min_dist {
			min_dist = dist;
			min_center = i;
		}
	}

	min_center as u8
}

/// For each sample, find its closest centroid
#[cfg_attr(feature = "threads", allow(dead_code))]
fn assign_sequential<D: ColorDifference>(samples: &[Hsl], centroids: &[Hsl], assignment: &mut [u8]) {
	for (center, &color) in assignment.iter_mut().zip(samples) {
		*center = nearest::<D>(color, centroids);
	}
}

/// For each sample, find its closest centroid in parallel
#[cfg(feature = "threads")]
fn assign_parallel<D: ColorDifference>(samples: &[Hsl], centroids: &[Hsl], assignment: &mut [u8]) {
	use rayon::prelude::*;

	assignment
		.par_iter_mut()
		.with_min_len(samples.len() / rayon::current_num_threads())
		.zip(samples)
		.for_each(|(center, &color)| *center = nearest::<D>(color, centroids));
}

/// Assign every sample to a cluster, replacing all previous memberships
fn update_assignments<D: ColorDifference>(samples: &[Hsl], state: &mut KmeansState) {
	let KmeansState { clusters, assignment, .. } = state;

	#[cfg(feature = "threads")]
	assign_parallel::<D>(samples, &clusters.centroid, assignment.as_mut_slice());
	#[cfg(not(feature = "threads"))]
	assign_sequential::<D>(samples, &clusters.centroid, assignment.as_mut_slice());

	for members in &mut clusters.members {
		members.clear();
	}

	for (&color, &center) in samples.iter().zip(assignment.iter()) {
		clusters.members[usize::from(center)].push(color);
	}
}

/// Move each populated cluster's centroid to the mean of its members.
///
/// Empty clusters keep their centroid until they regain members.
fn update_centroids(clusters: &mut ClusterData) -> Result<(), PaletteError> {
	for (centroid, members) in clusters.centroid.iter_mut().zip(&clusters.members) {
		match Membership::of(members) {
			Membership::Empty => {},
			Membership::Populated(members) => *centroid = geometry::centroid(members)?,
		}
	}

	Ok(())
}

/// Assign, then reposition and reassign until the member counts stabilize or `max_iter` assignment passes have been made.
///
/// Returns the number of assignment passes and how the loop stopped.
fn converge<D: ColorDifference>(
	samples: &[Hsl],
	state: &mut KmeansState,
	max_iter: u32,
) -> Result<(u32, Convergence), PaletteError> {
	update_assignments::<D>(samples, state);
	let mut iterations = 1;

	let convergence = loop {
		if iterations >= max_iter {
			tracing::warn!(iterations, "k-means stopped at the iteration cap before converging");
			break Convergence::IterationCap;
		}

		state.snapshot_counts();
		update_centroids(&mut state.clusters)?;
		update_assignments::<D>(samples, state);
		iterations += 1;

		if state.counts_unchanged() {
			tracing::debug!(iterations, "k-means converged");
			break Convergence::Converged;
		}

		tracing::trace!(iterations, previous = ?state.previous_counts, "member counts changed");
	};

	Ok((iterations, convergence))
}

/// Run k-means from seeded random centroids and reduce each populated cluster to a [`Swatch`]
fn kmeans<D: ColorDifference>(samples: &[Hsl], k: u8, max_iter: u32, seed: u64) -> Result<Quantized, PaletteError> {
	let mut rng = Xoroshiro128PlusPlus::seed_from_u64(seed);
	let mut state = KmeansState::new(k, samples.len(), &mut rng);
	let (iterations, convergence) = converge::<D>(samples, &mut state, max_iter)?;

	let mut swatches = Vec::new();
	let mut counts = Vec::new();
	for members in &state.clusters.members {
		match Membership::of(members) {
			Membership::Empty => {},
			Membership::Populated(members) => {
				swatches.push(Swatch::from(reduce::medoid_by::<D>(members)?));
				counts.push(members.len());
			},
		}
	}

	Ok(Quantized { swatches, counts, iterations, convergence })
}

/// Cluster `samples` into at most `k` groups and reduce each group to one [`Swatch`].
///
/// Clusters that end up with no members are omitted,
/// so the result has between 1 and `k` swatches.
///
/// # Errors
/// Returns an error if `samples` is empty, `k` is 0, or `max_iter` is 0.
pub fn quantize(samples: &[Hsl], options: &QuantizeOptions) -> Result<Quantized, PaletteError> {
	let QuantizeOptions { k, max_iter, seed, metric } = *options;

	if samples.is_empty() {
		return Err(PaletteError::NoSamples);
	}
	if k == 0 {
		return Err(PaletteError::ZeroClusters);
	}
	if max_iter == 0 {
		return Err(PaletteError::ZeroIterations);
	}

	let _span = tracing::debug_span!("quantize", k, samples = samples.len()).entered();

	match metric {
		Metric::Euclidean => kmeans::<EuclideanDistance>(samples, k, max_iter, seed),
		Metric::CircularHue => kmeans::<CircularHueDistance>(samples, k, max_iter, seed),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use palette::Srgb;

	fn test_colors() -> Vec<Hsl> {
		let range = (0..u8::MAX).step_by(32);
		let mut colors = Vec::new();

		for r in range.clone() {
			for g in range.clone() {
				for b in range.clone() {
					colors.push(Hsl::from(Srgb::new(r, g, b)));
				}
			}
		}

		colors
	}

	fn run(samples: &[Hsl], k: u8, seed: u64) -> Quantized {
		quantize(samples, &QuantizeOptions::new().k(k).seed(seed)).expect("valid input")
	}

	#[test]
	fn empty_samples_is_an_error() {
		assert_eq!(quantize(&[], &QuantizeOptions::new()), Err(PaletteError::NoSamples));
	}

	#[test]
	fn zero_k_is_an_error() {
		let samples = test_colors();
		assert_eq!(quantize(&samples, &QuantizeOptions::new().k(0)), Err(PaletteError::ZeroClusters));
	}

	#[test]
	fn zero_max_iter_is_an_error() {
		let samples = test_colors();
		assert_eq!(
			quantize(&samples, &QuantizeOptions::new().max_iter(0)),
			Err(PaletteError::ZeroIterations)
		);
	}

	#[test]
	fn initial_centroids_are_coarse() {
		let mut rng = Xoroshiro128PlusPlus::seed_from_u64(7);
		let clusters = ClusterData::new(u8::MAX, &mut rng);

		assert_eq!(clusters.centroid.len(), usize::from(u8::MAX));
		for centroid in clusters.centroid {
			for x in [centroid.h, centroid.s, centroid.l] {
				assert!((0.0..=1.0).contains(&x), "{x}");
				assert!((x * 10.0 - (x * 10.0).round()).abs() < 1e-5, "{x}");
			}
		}
	}

	#[test]
	fn nearest_ties_go_to_lowest_index() {
		let centroids = [Hsl::new(0.0, 0.0, 0.0), Hsl::new(0.0, 0.0, 1.0), Hsl::new(0.0, 0.0, 1.0)];
		assert_eq!(nearest::<EuclideanDistance>(Hsl::new(0.0, 0.0, 0.5), &centroids), 0);
		assert_eq!(nearest::<EuclideanDistance>(Hsl::new(0.0, 0.0, 0.9), &centroids), 1);
	}

	#[test]
	fn nearest_with_circular_hue() {
		let centroids = [Hsl::new(0.0, 0.5, 0.5), Hsl::new(0.7, 0.5, 0.5)];
		let color = Hsl::new(0.95, 0.5, 0.5);
		assert_eq!(nearest::<EuclideanDistance>(color, &centroids), 1);
		assert_eq!(nearest::<CircularHueDistance>(color, &centroids), 0);
	}

	#[test]
	fn assignment_fills_members_in_sample_order() {
		let samples = test_colors();
		let mut rng = Xoroshiro128PlusPlus::seed_from_u64(0);
		let mut state = KmeansState::new(4, samples.len(), &mut rng);

		update_assignments::<EuclideanDistance>(&samples, &mut state);

		assert_eq!(state.clusters.counts().sum::<usize>(), samples.len());
		for (i, members) in state.clusters.members.iter().enumerate() {
			let expected = samples
				.iter()
				.zip(&state.assignment)
				.filter(|&(_, &center)| usize::from(center) == i)
				.map(|(&color, _)| color)
				.collect::<Vec<_>>();
			assert_eq!(members, &expected);
		}
	}

	#[cfg(feature = "threads")]
	#[test]
	fn parallel_assignment_matches_sequential() {
		let samples = test_colors();
		let mut rng = Xoroshiro128PlusPlus::seed_from_u64(3);
		let clusters = ClusterData::new(8, &mut rng);

		let mut sequential = vec![0; samples.len()];
		let mut parallel = vec![0; samples.len()];
		assign_sequential::<EuclideanDistance>(&samples, &clusters.centroid, &mut sequential);
		assign_parallel::<EuclideanDistance>(&samples, &clusters.centroid, &mut parallel);

		assert_eq!(sequential, parallel);
	}

	#[test]
	fn empty_clusters_keep_their_centroid() {
		let mut rng = Xoroshiro128PlusPlus::seed_from_u64(0);
		let mut clusters = ClusterData::new(2, &mut rng);
		let untouched = clusters.centroid[1];
		clusters.members[0] = vec![Hsl::new(0.2, 0.4, 0.6), Hsl::new(0.4, 0.6, 0.8)];

		update_centroids(&mut clusters).expect("empty clusters are skipped");

		assert_eq!(clusters.centroid[0], geometry::centroid(&clusters.members[0]).expect("non-empty"));
		assert_eq!(clusters.centroid[1], untouched);
	}

	#[test]
	fn swapped_members_with_equal_counts_are_unchanged() {
		let (a, b) = (Hsl::new(0.1, 0.2, 0.3), Hsl::new(0.7, 0.8, 0.9));
		let mut rng = Xoroshiro128PlusPlus::seed_from_u64(0);
		let mut state = KmeansState::new(2, 2, &mut rng);
		state.clusters.members = vec![vec![a], vec![b]];
		state.snapshot_counts();

		state.clusters.members = vec![vec![b], vec![a]];
		assert!(state.counts_unchanged());

		state.clusters.members = vec![vec![a, b], Vec::new()];
		assert!(!state.counts_unchanged());
	}

	#[test]
	fn stable_counts_converge_while_centroids_still_move() {
		let gray = |l| Hsl::new(0.0, 0.0, l);
		let samples = [gray(0.0), gray(0.1), gray(0.45), gray(0.9), gray(1.0)];
		let mut state = KmeansState {
			clusters: ClusterData {
				centroid: vec![gray(0.2), gray(0.6)],
				members: vec![Vec::new(); 2],
			},
			assignment: vec![0; samples.len()],
			previous_counts: vec![0; 2],
		};

		let (iterations, convergence) =
			converge::<EuclideanDistance>(&samples, &mut state, DEFAULT_MAX_ITER).expect("valid input");

		assert_eq!((iterations, convergence), (2, Convergence::Converged));
		assert_eq!(state.clusters.counts().collect::<Vec<_>>(), vec![2, 3]);
		// Both centroids moved to their member means before the second assignment
		assert_eq!(
			state.clusters.centroid,
			vec![
				geometry::centroid(&samples[..2]).expect("non-empty"),
				geometry::centroid(&samples[2..]).expect("non-empty"),
			]
		);
		assert_ne!(state.clusters.centroid, vec![gray(0.2), gray(0.6)]);
	}

	#[test]
	fn single_sample_gives_one_swatch() {
		let samples = [Hsl::from(Srgb::new(200, 30, 90))];
		let result = run(&samples, 6, 0);

		assert_eq!(result.swatches, vec![Swatch::from(samples[0])]);
		assert_eq!(result.counts, vec![1]);
	}

	#[test]
	fn uniform_samples_give_one_swatch() {
		let color = Hsl::from(Srgb::new(12, 120, 240));
		let samples = vec![color; 100];

		for k in 1..=10 {
			let result = run(&samples, k, u64::from(k));
			assert_eq!(result.swatches, vec![Swatch::from(color)], "k = {k}");
			assert_eq!(result.counts, vec![100], "k = {k}");
		}
	}

	#[test]
	fn swatch_count_is_between_one_and_k() {
		let samples = test_colors();
		for k in 1..=12 {
			for seed in 0..4 {
				let result = run(&samples, k, seed);
				assert!(!result.swatches.is_empty());
				assert!(result.swatches.len() <= usize::from(k));
				assert_eq!(result.swatches.len(), result.counts.len());
				assert_eq!(result.counts.iter().sum::<usize>(), samples.len());
				assert!(result.counts.iter().all(|&n| n > 0));
			}
		}
	}

	#[test]
	fn swatches_come_from_the_samples() {
		let samples = test_colors();
		let result = run(&samples, 6, 11);
		let inputs = samples.iter().copied().map(Swatch::from).collect::<Vec<_>>();

		for swatch in result.swatches {
			assert!(inputs.contains(&swatch), "{swatch:?}");
			assert!(swatch.h <= 360 && swatch.s <= 100 && swatch.l <= 100);
		}
	}

	#[test]
	fn same_seed_same_result() {
		let samples = test_colors();
		for metric in [Metric::Euclidean, Metric::CircularHue] {
			let options = QuantizeOptions::new().seed(1234).metric(metric);
			let first = quantize(&samples, &options).expect("valid input");
			let second = quantize(&samples, &options).expect("valid input");
			assert_eq!(first, second);
		}
	}

	#[test]
	fn converged_runs_take_at_least_two_passes() {
		let samples = test_colors();
		let result = run(&samples, 6, 0);

		if result.convergence == Convergence::Converged {
			assert!(result.iterations >= 2);
		}
		assert!(result.iterations <= DEFAULT_MAX_ITER);
	}

	#[test]
	fn iteration_cap_is_reported() {
		let samples = test_colors();

		let result = quantize(&samples, &QuantizeOptions::new().max_iter(1)).expect("valid input");
		assert_eq!(result.iterations, 1);
		assert_eq!(result.convergence, Convergence::IterationCap);
		assert!(!result.swatches.is_empty());
	}

	#[test]
	fn iteration_cap_does_not_hide_convergence() {
		let samples = test_colors();
		let converged = run(&samples, 4, 5);
		assert_eq!(converged.convergence, Convergence::Converged);

		// Capping exactly at the converged iteration still reports convergence
		let options = QuantizeOptions::new().k(4).seed(5).max_iter(converged.iterations);
		let capped = quantize(&samples, &options).expect("valid input");
		assert_eq!(capped, converged);
	}
}
