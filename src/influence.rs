//! Influence distributions and the per-round edge sampler.
//!
//! An edge carries an [`Influence`]: either a known activation probability or a
//! Beta posterior over it. A [`Sampler`] turns that into the single number the
//! live-edge coin is flipped against. Neither type touches an RNG; the coin
//! flip itself belongs to the contractor that owns the round's generator.

/// Numeric floor for Beta parameters (keeps the posterior proper).
const MIN_BETA_PARAM: f64 = 0.01;

/// How an edge distribution is collapsed to one probability.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SampleMode {
    /// Posterior mean.
    #[default]
    Mean,
    /// Optimistic estimate: mean plus `z` standard deviations.
    Upper(f64),
}

/// Activation probability model attached to one directed edge.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Influence {
    /// A known probability, returned as-is by every mode.
    Fixed(f64),
    /// Beta(alpha, beta) belief over the probability.
    Beta { alpha: f64, beta: f64 },
}

impl Influence {
    /// Collapse the distribution to a probability in `[0, 1]`.
    pub fn sample(&self, mode: SampleMode) -> f64 {
        let p = match *self {
            Influence::Fixed(p) => p,
            Influence::Beta { .. } => match mode {
                SampleMode::Mean => self.mean(),
                SampleMode::Upper(z) => self.mean() + z * self.variance().sqrt(),
            },
        };
        p.clamp(0.0, 1.0)
    }

    pub fn mean(&self) -> f64 {
        match *self {
            Influence::Fixed(p) => p,
            Influence::Beta { alpha, beta } => {
                let a = alpha.max(MIN_BETA_PARAM);
                let b = beta.max(MIN_BETA_PARAM);
                a / (a + b)
            }
        }
    }

    /// Variance of the belief; zero for a fixed probability.
    ///
    /// For Beta(α, β): `αβ / ((α+β)²(α+β+1))`.
    pub fn variance(&self) -> f64 {
        match *self {
            Influence::Fixed(_) => 0.0,
            Influence::Beta { alpha, beta } => {
                let a = alpha.max(MIN_BETA_PARAM);
                let b = beta.max(MIN_BETA_PARAM);
                let sum = a + b;
                (a * b) / (sum * sum * (sum + 1.0))
            }
        }
    }

    /// Conjugate Beta-Bernoulli update after observing whether the edge fired.
    ///
    /// A fixed probability is not a belief and stays unchanged.
    pub fn observe(&mut self, activated: bool) {
        if let Influence::Beta { alpha, beta } = self {
            if activated {
                *alpha += 1.0;
            } else {
                *beta += 1.0;
            }
        }
    }
}

/// Produces the live probability of each edge for a round.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Sampler {
    pub mode: SampleMode,
}

impl Sampler {
    pub fn new(mode: SampleMode) -> Self {
        Self { mode }
    }

    pub fn draw(&self, influence: &Influence) -> f64 {
        influence.sample(self.mode)
    }
}
