//! Sequential simulation of the Chinese restaurant process.
//!
//! ```bibtex
//! @incollection{Aldous1985,
//!    author = {David J. Aldous},
//!    title = {Exchangeability and related topics},
//!    booktitle = {École d'Été de Probabilités de Saint-Flour XIII — 1983},
//!    publisher = {Springer},
//!    pages = {1-198},
//!    year = {1985},
//! }
//! ```

use rand::Rng;
use rv::misc::pflip;
use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::utils::occupancy_bars;

/// Errors from constructing a restaurant process.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CrpError {
    /// The concentration parameter must be positive and finite.
    #[error("concentration parameter must be positive and finite, got {alpha}")]
    NonPositiveAlpha { alpha: f64 },
    /// A simulation must seat at least one customer.
    #[error("customer count must be at least one")]
    NoCustomers,
}

/// A Chinese restaurant process with concentration parameter `alpha`.
///
/// Tables are numbered from zero in creation order. Each call to [`step`]
/// seats one customer, drawing a table index from the current occupancy
/// counts and the new-table weight `alpha`.
///
/// [`step`]: RestaurantProcess::step
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct RestaurantProcess {
    alpha: f64,
    assignments: Vec<usize>,
    counts: Vec<usize>,
    history: Vec<Vec<usize>>,
}

impl RestaurantProcess {
    /// Create an empty process.
    ///
    /// # Errors
    /// Returns [`CrpError::NonPositiveAlpha`] unless `alpha` is positive and
    /// finite.
    pub fn new(alpha: f64) -> Result<Self, CrpError> {
        if !alpha.is_finite() || alpha <= 0.0 {
            return Err(CrpError::NonPositiveAlpha { alpha });
        }

        Ok(Self {
            alpha,
            assignments: Vec::new(),
            counts: Vec::new(),
            history: Vec::new(),
        })
    }

    /// Create a process and seat `n_customers` in one shot.
    ///
    /// # Errors
    /// Returns [`CrpError::NoCustomers`] if `n_customers` is zero, or
    /// [`CrpError::NonPositiveAlpha`] for an invalid `alpha`.
    pub fn simulate<R: Rng>(
        alpha: f64,
        n_customers: usize,
        rng: &mut R,
    ) -> Result<Self, CrpError> {
        if n_customers == 0 {
            return Err(CrpError::NoCustomers);
        }

        let mut process = Self::new(alpha)?;
        process.advance(n_customers, rng);
        Ok(process)
    }

    /// The concentration parameter.
    #[must_use]
    pub const fn alpha(&self) -> f64 {
        self.alpha
    }

    /// The number of customers seated so far.
    #[must_use]
    pub fn n_customers(&self) -> usize {
        self.assignments.len()
    }

    /// The number of occupied tables.
    #[must_use]
    pub fn n_tables(&self) -> usize {
        self.counts.len()
    }

    /// Occupancy count for each table, indexed by table number.
    #[must_use]
    pub fn counts(&self) -> &[usize] {
        &self.counts
    }

    /// Table assignment for each customer, in arrival order.
    #[must_use]
    pub fn assignments(&self) -> &[usize] {
        &self.assignments
    }

    /// Snapshots of the occupancy counts taken before each step.
    #[must_use]
    pub fn history(&self) -> &[Vec<usize>] {
        &self.history
    }

    /// Normalized seating weights for the next customer.
    ///
    /// One entry per occupied table followed by a final entry for the
    /// new-table slot; the entries sum to one.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn seating_weights(&self) -> Vec<f64> {
        let total = self.assignments.len() as f64 + self.alpha;
        self.counts
            .iter()
            .map(|&count| count as f64 / total)
            .chain(std::iter::once(self.alpha / total))
            .collect()
    }

    /// Probability that the next customer opens a new table,
    /// `alpha / (n + alpha)`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn new_table_probability(&self) -> f64 {
        self.alpha / (self.assignments.len() as f64 + self.alpha)
    }

    /// Seat one customer and return the chosen table.
    ///
    /// The first customer is always seated at table 0, since the only
    /// non-zero weight is the new-table slot.
    pub fn step<R: Rng>(&mut self, rng: &mut R) -> usize {
        self.history.push(self.counts.clone());

        // seating_weights is already normalized.
        let weights = self.seating_weights();
        let table = pflip(&weights, Some(1.0), rng);

        if table == self.counts.len() {
            self.counts.push(0);
        }
        self.counts[table] += 1;
        self.assignments.push(table);

        table
    }

    /// Seat `steps` customers.
    pub fn advance<R: Rng>(&mut self, steps: usize, rng: &mut R) {
        for _ in 0..steps {
            self.step(rng);
        }
    }

    /// Lazy unbounded iterator of seatings; each item is the table chosen
    /// for the next customer.
    pub fn seatings<'a, R: Rng>(&'a mut self, rng: &'a mut R) -> impl Iterator<Item = usize> + 'a {
        std::iter::repeat_with(move || self.step(rng))
    }

    /// Drop all seatings, keeping `alpha`.
    pub fn clear(&mut self) {
        self.assignments.clear();
        self.counts.clear();
        self.history.clear();
    }
}

impl std::fmt::Display for RestaurantProcess {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Chinese restaurant process")?;
        writeln!(
            f,
            "alpha = {}, customers = {}, tables = {}",
            self.alpha,
            self.n_customers(),
            self.n_tables()
        )?;
        write!(f, "{}", occupancy_bars(&self.counts, 40))
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::SmallRng;
    use rand::SeedableRng;
    use rv::misc::{ks_two_sample, KsAlternative, KsMode};

    use super::{CrpError, RestaurantProcess};
    use crate::utils::expected_tables;

    #[test]
    fn rejects_invalid_alpha() {
        for alpha in [0.0, -1.0, f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let result = RestaurantProcess::new(alpha);
            assert!(matches!(result, Err(CrpError::NonPositiveAlpha { .. })));
        }
    }

    #[test]
    fn rejects_zero_customers() {
        let mut rng = SmallRng::seed_from_u64(0x1234);
        let result = RestaurantProcess::simulate(1.0, 0, &mut rng);
        assert_eq!(result, Err(CrpError::NoCustomers));
    }

    #[test]
    fn first_customer_sits_at_first_table() {
        let mut rng = SmallRng::seed_from_u64(0x1234);

        for _ in 0..100 {
            let mut process = RestaurantProcess::new(5.0).unwrap();
            assert_eq!(process.step(&mut rng), 0);
        }
    }

    #[test]
    fn counts_sum_to_customers() {
        let mut rng = SmallRng::seed_from_u64(0x1234);
        let mut process = RestaurantProcess::new(2.5).unwrap();

        for n in 1..=200 {
            process.step(&mut rng);
            assert_eq!(process.counts().iter().sum::<usize>(), n);
            assert!(process.n_tables() >= 1);
            assert!(process.n_tables() <= n);
        }
    }

    #[test]
    fn assignments_match_counts() {
        let mut rng = SmallRng::seed_from_u64(0xFEED);
        let process = RestaurantProcess::simulate(3.0, 500, &mut rng).unwrap();

        let mut counts = vec![0_usize; process.n_tables()];
        for &table in process.assignments() {
            counts[table] += 1;
        }

        assert_eq!(counts, process.counts());
    }

    #[test]
    fn history_tracks_every_step() {
        let mut rng = SmallRng::seed_from_u64(0x1234);
        let process = RestaurantProcess::simulate(1.0, 50, &mut rng).unwrap();

        assert_eq!(process.history().len(), 50);
        assert!(process.history()[0].is_empty());

        for (n, snapshot) in process.history().iter().enumerate() {
            assert_eq!(snapshot.iter().sum::<usize>(), n);
        }
    }

    #[test]
    fn seating_weights_are_normalized() {
        let mut rng = SmallRng::seed_from_u64(0x1234);
        let process = RestaurantProcess::simulate(2.0, 100, &mut rng).unwrap();

        let weights = process.seating_weights();
        assert_eq!(weights.len(), process.n_tables() + 1);
        assert::close(weights.iter().sum::<f64>(), 1.0, 1E-12);
        assert::close(
            *weights.last().unwrap(),
            process.new_table_probability(),
            1E-12,
        );
    }

    #[test]
    fn clear_resets_seatings() {
        let mut rng = SmallRng::seed_from_u64(0x1234);
        let mut process = RestaurantProcess::simulate(1.5, 30, &mut rng).unwrap();

        process.clear();
        assert_eq!(process.n_customers(), 0);
        assert_eq!(process.n_tables(), 0);
        assert!(process.history().is_empty());
        assert::close(process.alpha(), 1.5, 1E-12);

        // Usable again after clearing.
        assert_eq!(process.step(&mut rng), 0);
    }

    #[test]
    fn seatings_iterator_is_lazy() {
        let mut rng = SmallRng::seed_from_u64(0x1234);
        let mut process = RestaurantProcess::new(1.0).unwrap();

        let seats: Vec<usize> = process.seatings(&mut rng).take(25).collect();
        assert_eq!(seats.len(), 25);
        assert_eq!(seats, process.assignments());
    }

    #[test]
    fn display_summarizes_state() {
        let mut rng = SmallRng::seed_from_u64(0x1234);
        let process = RestaurantProcess::simulate(2.5, 100, &mut rng).unwrap();

        let rendered = process.to_string();
        assert!(rendered.starts_with("Chinese restaurant process"));
        assert!(rendered.contains("alpha = 2.5, customers = 100"));
        assert_eq!(rendered.lines().count(), 2 + process.n_tables());
    }

    #[test]
    fn new_table_rate_matches_crp_weight() {
        let mut rng = SmallRng::seed_from_u64(0x1234);

        let alpha = 2.0;
        let n_chains: usize = 20_000;

        // Seat nine customers, then check how often the tenth opens a table.
        let openings = (0..n_chains)
            .filter(|_| {
                let mut process = RestaurantProcess::new(alpha).unwrap();
                process.advance(9, &mut rng);
                let before = process.n_tables();
                process.step(&mut rng);
                process.n_tables() == before + 1
            })
            .count();

        #[allow(clippy::cast_precision_loss)]
        let observed = openings as f64 / n_chains as f64;
        let expected = alpha / (9.0 + alpha);

        assert::close(observed, expected, 0.015);
    }

    #[test]
    fn mean_table_count_matches_expectation() {
        let mut rng = SmallRng::seed_from_u64(0x1234);

        let alpha = 1.0;
        let n_customers = 100;
        let n_runs = 3_000;

        let total: usize = (0..n_runs)
            .map(|_| {
                RestaurantProcess::simulate(alpha, n_customers, &mut rng)
                    .unwrap()
                    .n_tables()
            })
            .sum();

        #[allow(clippy::cast_precision_loss)]
        let mean = total as f64 / n_runs as f64;

        assert::close(mean, expected_tables(alpha, n_customers), 0.2);
    }

    #[test]
    fn exchangeable_table_sizes() {
        let mut rng = SmallRng::seed_from_u64(0x1234);

        let n_customers = 40;
        let n_runs = 1_500;

        // Under exchangeability the size of the table containing the first
        // customer and the table containing the last customer have the same
        // distribution.
        let mut first = Vec::with_capacity(n_runs);
        let mut last = Vec::with_capacity(n_runs);

        for _ in 0..n_runs {
            let process = RestaurantProcess::simulate(1.5, n_customers, &mut rng).unwrap();
            let assignments = process.assignments();

            #[allow(clippy::cast_precision_loss)]
            {
                first.push(process.counts()[assignments[0]] as f64);
                last.push(process.counts()[assignments[n_customers - 1]] as f64);
            }
        }

        let (_, p) = ks_two_sample(&first, &last, KsMode::Auto, KsAlternative::TwoSided)
            .expect("KS two sample should be valid");

        assert!(p > 0.001, "table size distributions diverge (p = {p})");
    }
}
