//! Model coefficient storage.
//!
//! A coefficient set is the read-only parameter vector for one model: slot
//! `i` holds the estimated coefficient referenced by utility terms with
//! coefficient index `i`.  Slots may be empty — regional coefficient files
//! define different subsets of a model's parameters, and terms pointing at
//! an empty slot are inert rather than an error.
//!
//! Sets are built in memory by the application (coefficient-file parsing is
//! an external concern), then shared read-only across all workers for the
//! duration of a solving pass.

use crate::error::{CoreError, CoreResult};

/// One estimated model parameter.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Coefficient {
    /// Label from the estimation output (e.g. `"ln(income)"`).
    pub label: String,
    /// Estimated value multiplied into utility terms.
    pub value: f64,
}

/// Dense slot-indexed coefficient vector for one model.
///
/// Wrap in an `Arc` and hand clones to every calculator factory that needs
/// it; nothing mutates a set once a pass is running.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CoefficientSet {
    slots: Vec<Option<Coefficient>>,
}

impl CoefficientSet {
    /// Create a set with empty slots `0..=max_parameter`.
    pub fn with_max_parameter(max_parameter: usize) -> Self {
        Self {
            slots: vec![None; max_parameter + 1],
        }
    }

    /// Build a set from `(index, label, value)` entries.
    pub fn from_entries<I, L>(max_parameter: usize, entries: I) -> CoreResult<Self>
    where
        I: IntoIterator<Item = (usize, L, f64)>,
        L: Into<String>,
    {
        let mut set = Self::with_max_parameter(max_parameter);
        for (index, label, value) in entries {
            set.insert(index, label, value)?;
        }
        Ok(set)
    }

    /// Define (or redefine) slot `index`.
    pub fn insert(&mut self, index: usize, label: impl Into<String>, value: f64) -> CoreResult<()> {
        if index >= self.slots.len() {
            return Err(CoreError::CoefficientOutOfRange {
                index,
                max: self.max_parameter(),
            });
        }
        self.slots[index] = Some(Coefficient {
            label: label.into(),
            value,
        });
        Ok(())
    }

    /// The estimated value in slot `index`; `None` for empty or out-of-range
    /// slots.
    #[inline]
    pub fn value(&self, index: usize) -> Option<f64> {
        self.slots.get(index).and_then(|c| c.as_ref()).map(|c| c.value)
    }

    /// The full coefficient in slot `index`, if defined.
    #[inline]
    pub fn get(&self, index: usize) -> Option<&Coefficient> {
        self.slots.get(index).and_then(|c| c.as_ref())
    }

    /// Highest addressable slot index.
    #[inline]
    pub fn max_parameter(&self) -> usize {
        self.slots.len().saturating_sub(1)
    }

    /// Number of defined slots.
    pub fn defined_count(&self) -> usize {
        self.slots.iter().filter(|c| c.is_some()).count()
    }
}
