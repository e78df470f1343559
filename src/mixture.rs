//! Infinite mixture sampling driven by a restaurant process.

use rand::{Rng, RngCore};

use crate::process::{CrpError, RestaurantProcess};

/// A Chinese restaurant mixture: a [`RestaurantProcess`] plus a parameter
/// prior and an observation sampler.
///
/// The prior maps a table index to a drawn parameter `theta` and is invoked
/// once per table, at the moment the table is created. The sampler maps a
/// table's parameter to a drawn observation and is invoked once per customer.
/// Both are opaque to the mixture; the only requirement is that the sampler
/// accepts what the prior produces, which the type parameters enforce.
///
/// Closures receive the same RNG that drives the seating draws, so a fully
/// seeded run reproduces parameters and observations as well as assignments:
///
/// ```
/// use crpsim::RestaurantMixture;
/// use rand::rngs::SmallRng;
/// use rand::SeedableRng;
/// use rv::prelude::{Gaussian, NormalGamma};
/// use rv::traits::Sampleable;
///
/// let ng = NormalGamma::new_unchecked(0.0, 1.0, 1.0, 1.0);
/// let mut mixture = RestaurantMixture::new(
///     3.5,
///     move |_table, mut rng| -> Gaussian { ng.draw(&mut rng) },
///     |component: &Gaussian, mut rng| -> f64 { component.draw(&mut rng) },
/// )
/// .unwrap();
///
/// let mut rng = SmallRng::seed_from_u64(0x1234);
/// mixture.sample(400, &mut rng).unwrap();
/// assert_eq!(mixture.observations().len(), 400);
/// assert_eq!(mixture.params().len(), mixture.n_tables());
/// ```
pub struct RestaurantMixture<T, Y, P, S> {
    process: RestaurantProcess,
    prior: P,
    sampler: S,
    params: Vec<T>,
    observations: Vec<Y>,
}

impl<T, Y, P, S> RestaurantMixture<T, Y, P, S>
where
    P: FnMut(usize, &mut dyn RngCore) -> T,
    S: FnMut(&T, &mut dyn RngCore) -> Y,
{
    /// Create an empty mixture.
    ///
    /// # Errors
    /// Returns [`CrpError::NonPositiveAlpha`] unless `alpha` is positive and
    /// finite.
    pub fn new(alpha: f64, prior: P, sampler: S) -> Result<Self, CrpError> {
        Ok(Self {
            process: RestaurantProcess::new(alpha)?,
            prior,
            sampler,
            params: Vec::new(),
            observations: Vec::new(),
        })
    }

    /// Seat one customer, draw their observation, and return the chosen
    /// table.
    ///
    /// A parameter is drawn from the prior only when the seating opened a
    /// new table.
    pub fn step<R: Rng>(&mut self, rng: &mut R) -> usize {
        let table = self.process.step(rng);

        if table == self.params.len() {
            let theta = (self.prior)(table, &mut *rng);
            self.params.push(theta);
        }

        let y = (self.sampler)(&self.params[table], &mut *rng);
        self.observations.push(y);

        table
    }

    /// Seat `n_customers`, drawing one observation per customer.
    ///
    /// # Errors
    /// Returns [`CrpError::NoCustomers`] if `n_customers` is zero.
    pub fn sample<R: Rng>(&mut self, n_customers: usize, rng: &mut R) -> Result<(), CrpError> {
        if n_customers == 0 {
            return Err(CrpError::NoCustomers);
        }

        for _ in 0..n_customers {
            self.step(rng);
        }

        Ok(())
    }

    /// Drop all seatings, parameters, and observations, keeping `alpha`,
    /// the prior, and the sampler.
    pub fn reset(&mut self) {
        self.process.clear();
        self.params.clear();
        self.observations.clear();
    }
}

impl<T, Y, P, S> RestaurantMixture<T, Y, P, S> {
    /// The underlying restaurant process.
    #[must_use]
    pub fn process(&self) -> &RestaurantProcess {
        &self.process
    }

    /// The number of occupied tables.
    #[must_use]
    pub fn n_tables(&self) -> usize {
        self.process.n_tables()
    }

    /// Parameters drawn so far, indexed by table number.
    #[must_use]
    pub fn params(&self) -> &[T] {
        &self.params
    }

    /// Observations drawn so far, in customer arrival order.
    #[must_use]
    pub fn observations(&self) -> &[Y] {
        &self.observations
    }

    /// Consume the mixture and take the observations.
    #[must_use]
    pub fn into_observations(self) -> Vec<Y> {
        self.observations
    }
}

impl<T, Y, P, S> std::fmt::Display for RestaurantMixture<T, Y, P, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Chinese restaurant mixture")?;
        writeln!(f, "observations = {}", self.observations.len())?;
        write!(f, "{}", self.process)
    }
}
