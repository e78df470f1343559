//! Simulation of the Chinese restaurant process and the infinite mixture
//! models it induces.
//!
//! The Chinese restaurant process (CRP) seats customers one at a time: the
//! n-th customer joins an occupied table `k` with probability
//! `m_k / (n - 1 + alpha)` and opens a fresh table with probability
//! `alpha / (n - 1 + alpha)`, where `m_k` is the table's current occupancy
//! and `alpha` the concentration parameter. The induced random partition is
//! exchangeable and is the sequential view of the Dirichlet process, which
//! makes the CRP the standard motivating construction for infinite mixture
//! models in clustering applications.
//!
//! [`RestaurantProcess`] simulates the seating sequence itself, while
//! [`RestaurantMixture`] layers a caller-supplied parameter prior and
//! observation sampler on top of it: each new table draws a latent parameter
//! from the prior, and each customer draws an observation from the sampler
//! conditioned on the parameter of their table.
//!
//! All randomness is consumed from a [`rand::Rng`] injected by the caller,
//! so seeded runs are reproducible and independent runs diverge.

pub mod mixture;
pub mod process;
pub mod utils;

pub use mixture::RestaurantMixture;
pub use process::{CrpError, RestaurantProcess};
