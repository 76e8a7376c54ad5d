//! Validation tallies: predicted vs observed shares per alternative.

use std::fmt;

use dcm_logit::Validation;

/// Aggregate scoreboard for one validation pass.
///
/// A unit is *valid* when the model made its observed choice available
/// alongside at least one competitor; only valid units feed the share
/// comparison.  Units whose observed choice was unavailable, or was the
/// only available alternative, are tallied separately rather than scored.
#[derive(Debug, Clone)]
pub struct ValidationStats {
    total_alternatives:   usize,
    units:                usize,
    skipped:              usize,
    /// Valid units whose simulated pick reproduced the observation.
    matched:              usize,
    /// Observed choices per alternative, valid units only.
    observed:             Vec<usize>,
    /// Simulated picks per alternative, valid units only.
    predicted:            Vec<usize>,
    /// Availability per alternative, valid units only.
    available:            Vec<usize>,
    /// Probability mass per alternative summed over valid units.
    probability_sum:      Vec<f64>,
    /// Units whose observed choice the model made unavailable.
    observed_unavailable: Vec<usize>,
    /// Units whose observed choice was the only available alternative.
    observed_sole:        Vec<usize>,
}

impl ValidationStats {
    pub fn new(total_alternatives: usize) -> Self {
        Self {
            total_alternatives,
            units: 0,
            skipped: 0,
            matched: 0,
            observed: vec![0; total_alternatives],
            predicted: vec![0; total_alternatives],
            available: vec![0; total_alternatives],
            probability_sum: vec![0.0; total_alternatives],
            observed_unavailable: vec![0; total_alternatives],
            observed_sole: vec![0; total_alternatives],
        }
    }

    /// Fold one validated unit into the tallies.
    pub fn record(&mut self, validation: &Validation) {
        self.units += 1;
        let observed = validation.observed;
        if observed >= self.total_alternatives {
            // Malformed survey index; the solver already scored it
            // unavailable, and there is no per-alternative bucket for it.
            return;
        }
        if !validation.observed_available {
            self.observed_unavailable[observed] += 1;
            return;
        }
        let competitor = validation
            .availability
            .iter()
            .enumerate()
            .any(|(index, &available)| available && index != observed);
        if !competitor {
            self.observed_sole[observed] += 1;
            return;
        }

        self.observed[observed] += 1;
        self.predicted[validation.predicted] += 1;
        if validation.matched() {
            self.matched += 1;
        }
        for (index, &available) in validation.availability.iter().enumerate() {
            if available {
                self.available[index] += 1;
            }
            self.probability_sum[index] += validation.probabilities[index];
        }
    }

    /// Count one unit skipped for missing ground truth.
    pub fn count_skip(&mut self) {
        self.skipped += 1;
    }

    #[inline]
    pub fn total_alternatives(&self) -> usize {
        self.total_alternatives
    }

    /// Validated units, valid or not.
    #[inline]
    pub fn units(&self) -> usize {
        self.units
    }

    #[inline]
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Units that entered the share comparison.
    pub fn valid(&self) -> usize {
        self.observed.iter().sum()
    }

    /// Units whose observed choice could not be scored.
    pub fn degenerate(&self) -> usize {
        self.observed_unavailable.iter().sum::<usize>()
            + self.observed_sole.iter().sum::<usize>()
    }

    #[inline]
    pub fn matched(&self) -> usize {
        self.matched
    }

    pub fn observed_counts(&self) -> &[usize] {
        &self.observed
    }

    pub fn predicted_counts(&self) -> &[usize] {
        &self.predicted
    }

    pub fn available_counts(&self) -> &[usize] {
        &self.available
    }

    pub fn probability_sums(&self) -> &[f64] {
        &self.probability_sum
    }

    pub fn observed_unavailable_counts(&self) -> &[usize] {
        &self.observed_unavailable
    }

    pub fn observed_sole_counts(&self) -> &[usize] {
        &self.observed_sole
    }
}

fn percent(count: usize, total: usize) -> f64 {
    if total == 0 { 0.0 } else { 100.0 * count as f64 / total as f64 }
}

impl fmt::Display for ValidationStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let valid = self.valid();
        writeln!(
            f,
            "validated {} units: {} valid, {} degenerate, {} skipped",
            self.units,
            valid,
            self.degenerate(),
            self.skipped
        )?;
        writeln!(f, "matched predictions: {} ({:.1}%)", self.matched, percent(self.matched, valid))?;
        writeln!(
            f,
            "{:>4}  {:>9}  {:>7}  {:>9}  {:>7}  {:>10}  {:>9}",
            "alt", "observed", "share", "predicted", "share", "sum-p", "available"
        )?;
        for alt in 0..self.total_alternatives {
            writeln!(
                f,
                "{:>4}  {:>9}  {:>6.1}%  {:>9}  {:>6.1}%  {:>10.2}  {:>9}",
                alt,
                self.observed[alt],
                percent(self.observed[alt], valid),
                self.predicted[alt],
                percent(self.predicted[alt], valid),
                self.probability_sum[alt],
                self.available[alt]
            )?;
        }
        Ok(())
    }
}
