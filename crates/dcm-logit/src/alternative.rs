//! Alternative and nest state accumulated over one decision.

/// One discrete option in a choice situation.
///
/// Created lazily the first time model code references its index; holds the
/// running utility in application mode and the raw covariate terms in
/// estimation mode.  An alternative that is never referenced stays
/// undefined and is treated as unavailable.
#[derive(Debug, Clone)]
pub struct Alternative {
    pub(crate) index:     usize,
    pub(crate) defined:   bool,
    pub(crate) available: bool,
    pub(crate) observed:  bool,
    pub(crate) utility:   f64,
    pub(crate) nest:      Option<usize>,
    /// Raw `(coefficient, value)` covariates in first-touch order, with
    /// repeated slots accumulated by summation.  Estimation mode only.
    pub(crate) terms:     Vec<(usize, f64)>,
}

impl Alternative {
    pub(crate) fn new(index: usize) -> Self {
        Self {
            index,
            defined: false,
            available: false,
            observed: false,
            utility: 0.0,
            nest: None,
            terms: Vec::new(),
        }
    }

    pub(crate) fn accumulate_term(&mut self, coefficient: usize, value: f64) {
        if let Some(term) = self.terms.iter_mut().find(|(slot, _)| *slot == coefficient) {
            term.1 += value;
        } else {
            self.terms.push((coefficient, value));
        }
    }

    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Defined and marked available.  Undefined alternatives never enter
    /// the choice set.
    #[inline]
    pub fn is_available(&self) -> bool {
        self.defined && self.available
    }

    #[inline]
    pub fn is_observed(&self) -> bool {
        self.defined && self.observed
    }

    #[inline]
    pub fn utility(&self) -> f64 {
        self.utility
    }

    #[inline]
    pub fn nest(&self) -> Option<usize> {
        self.nest
    }
}

/// One nest below the root of a two-level tree.
///
/// Defined by the first member that joins it.  In application mode the
/// dissimilarity is resolved from the model's coefficient vector at join
/// time; in estimation mode it stays unresolved (the external package
/// estimates it) and only membership is recorded.
#[derive(Debug, Clone)]
pub struct Nest {
    pub(crate) index:         usize,
    /// Coefficient slot the dissimilarity lives in.
    pub(crate) parameter:     usize,
    /// Resolved dissimilarity in (0, 1]; `None` in estimation mode.
    pub(crate) dissimilarity: Option<f64>,
}

impl Nest {
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    #[inline]
    pub fn parameter(&self) -> usize {
        self.parameter
    }

    #[inline]
    pub fn dissimilarity(&self) -> Option<f64> {
        self.dissimilarity
    }
}
