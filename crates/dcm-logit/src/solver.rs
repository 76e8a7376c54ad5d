//! Probability math: max-shifted softmax, two-level nested composites,
//! logsums, and inverse-CDF sampling.

use dcm_core::{DrawStream, UnitId};

use crate::alternative::{Alternative, Nest};
use crate::error::{LogitError, LogitResult};

/// The sampled outcome of one simulated decision.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Choice {
    /// Zero-based alternative index, the externally visible choice code.
    pub index:       usize,
    /// Unconditional probability the sampled alternative carried.
    pub probability: f64,
    /// The alternative's accumulated systematic utility.
    pub utility:     f64,
}

/// Solved probabilities for one alternative set.
///
/// Unavailable alternatives hold probability zero and can never be sampled.
/// Only [`ChoiceCalculator::into_probabilities`] constructs this, which
/// guarantees at least one available alternative.
///
/// [`ChoiceCalculator::into_probabilities`]: crate::calculator::ChoiceCalculator::into_probabilities
#[derive(Debug, Clone)]
pub struct ChoiceProbabilities {
    probabilities: Vec<f64>,
    availability:  Vec<bool>,
    utilities:     Vec<f64>,
    logsum:        f64,
}

impl ChoiceProbabilities {
    #[inline]
    pub fn len(&self) -> usize {
        self.probabilities.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.probabilities.is_empty()
    }

    /// Unconditional probability of `index`; zero when unavailable or out
    /// of range.
    #[inline]
    pub fn probability(&self, index: usize) -> f64 {
        self.probabilities.get(index).copied().unwrap_or(0.0)
    }

    #[inline]
    pub fn is_available(&self, index: usize) -> bool {
        self.availability.get(index).copied().unwrap_or(false)
    }

    #[inline]
    pub fn probabilities(&self) -> &[f64] {
        &self.probabilities
    }

    #[inline]
    pub fn availability(&self) -> &[bool] {
        &self.availability
    }

    /// Log of the denominator, the composite utility of the whole set.
    /// A single-member set's logsum equals that member's utility exactly.
    #[inline]
    pub fn logsum(&self) -> f64 {
        self.logsum
    }

    /// Inverse-CDF lookup: walk the available alternatives in index order,
    /// accumulating probability mass, and return the first whose cumulative
    /// mass exceeds `r`.  If rounding leaves a shortfall at the top of the
    /// range, the last available alternative wins, so an unavailable index
    /// is never returned.
    pub fn sample(&self, r: f64) -> usize {
        let mut cumulative = 0.0;
        let mut last_available = 0;
        for (index, &probability) in self.probabilities.iter().enumerate() {
            if !self.availability[index] {
                continue;
            }
            last_available = index;
            cumulative += probability;
            if r < cumulative {
                return index;
            }
        }
        last_available
    }

    /// Sample a choice, consuming exactly one uniform draw from `stream`.
    pub fn draw(&self, stream: &mut DrawStream) -> Choice {
        let index = self.sample(stream.uniform());
        Choice {
            index,
            probability: self.probabilities[index],
            utility: self.utilities[index],
        }
    }
}

/// Solve the set into unconditional probabilities and a logsum.
///
/// Base utilities are shifted by the maximum available utility before
/// exponentiation.  The shift is exact for the whole tree: every nest
/// composite and the top-level logsum move by the same constant, the
/// probabilities are unchanged, and the shift is added back to the logsum.
/// It also bounds the denominator at one or more, since the best
/// alternative always contributes weight one.
pub(crate) fn solve(
    model: &str,
    unit: UnitId,
    alternatives: &[Alternative],
    nests: &[Option<Nest>],
) -> LogitResult<ChoiceProbabilities> {
    let availability: Vec<bool> = alternatives.iter().map(Alternative::is_available).collect();
    if !availability.iter().any(|&a| a) {
        return Err(LogitError::NoAvailableAlternative { model: model.to_owned(), unit });
    }

    let shift = alternatives
        .iter()
        .filter(|a| a.is_available())
        .map(Alternative::utility)
        .fold(f64::NEG_INFINITY, f64::max);

    // Weights: loose alternatives feed the root directly; nested members
    // feed their nest's sum of exp(U / mu).
    let mut member_weight = vec![0.0_f64; alternatives.len()];
    let mut nest_sum = vec![0.0_f64; nests.len()];
    let mut denominator = 0.0_f64;
    for alternative in alternatives.iter().filter(|a| a.is_available()) {
        let index = alternative.index;
        match alternative.nest {
            None => {
                member_weight[index] = (alternative.utility - shift).exp();
                denominator += member_weight[index];
            }
            Some(nest_index) => {
                let mu = resolved_dissimilarity(model, nests, nest_index)?;
                member_weight[index] = ((alternative.utility - shift) / mu).exp();
                nest_sum[nest_index] += member_weight[index];
            }
        }
    }

    // Each non-empty nest enters the root as sum^mu, which equals
    // exp(mu * ln(sum)), the exponentiated composite utility.
    let mut nest_weight = vec![0.0_f64; nests.len()];
    for (nest_index, &sum) in nest_sum.iter().enumerate() {
        if sum > 0.0 {
            let mu = resolved_dissimilarity(model, nests, nest_index)?;
            nest_weight[nest_index] = sum.powf(mu);
            denominator += nest_weight[nest_index];
        }
    }

    // Unconditional probability: loose alternatives divide the root
    // denominator; nested members multiply the nest's root share by their
    // conditional share within the nest.
    let mut probabilities = vec![0.0_f64; alternatives.len()];
    for alternative in alternatives.iter().filter(|a| a.is_available()) {
        let index = alternative.index;
        probabilities[index] = match alternative.nest {
            None => member_weight[index] / denominator,
            Some(nest_index) => {
                let sum = nest_sum[nest_index];
                if sum > 0.0 {
                    (nest_weight[nest_index] / denominator) * (member_weight[index] / sum)
                } else {
                    // Every member underflowed; the nest carries no mass.
                    0.0
                }
            }
        };
    }

    let utilities = alternatives.iter().map(Alternative::utility).collect();
    Ok(ChoiceProbabilities {
        probabilities,
        availability,
        utilities,
        logsum: denominator.ln() + shift,
    })
}

fn resolved_dissimilarity(model: &str, nests: &[Option<Nest>], index: usize) -> LogitResult<f64> {
    nests
        .get(index)
        .and_then(|n| n.as_ref())
        .and_then(Nest::dissimilarity)
        .ok_or_else(|| LogitError::Configuration {
            model: model.to_owned(),
            message: format!("nest {index} has no resolved dissimilarity"),
        })
}
