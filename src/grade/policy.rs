#![warn(missing_docs)]
#![warn(clippy::missing_docs_in_private_items)]

//! Partial credit for components that are implemented but failing.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Points awarded when a test fails but the function looks implemented.
///
/// Assignments have historically disagreed on this; it is a per-assignment
/// product decision, so the default awards nothing.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum PartialCredit {
    /// No partial credit.
    #[default]
    #[serde(rename = "none")]
    Disabled,
    /// A flat number of points, regardless of component weight.
    Flat {
        /// Points awarded.
        points: f64,
    },
    /// A fraction of the component's points.
    Fraction {
        /// Fraction in `[0, 1]`.
        fraction: f64,
    },
}

impl PartialCredit {
    /// Checks the policy parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match *self {
            PartialCredit::Disabled => Ok(()),
            PartialCredit::Flat { points } if points.is_finite() && points >= 0.0 => Ok(()),
            PartialCredit::Flat { points } => Err(ConfigError::InvalidPolicy(format!(
                "flat partial credit must be finite and >= 0, got {points}"
            ))),
            PartialCredit::Fraction { fraction } if (0.0..=1.0).contains(&fraction) => Ok(()),
            PartialCredit::Fraction { fraction } => Err(ConfigError::InvalidPolicy(format!(
                "partial credit fraction must be within [0, 1], got {fraction}"
            ))),
        }
    }

    /// Points awarded for an implemented-but-failing component worth
    /// `component_points`, never more than the component is worth.
    pub fn award(&self, component_points: f64) -> f64 {
        let raw = match *self {
            PartialCredit::Disabled => 0.0,
            PartialCredit::Flat { points } => points,
            PartialCredit::Fraction { fraction } => fraction * component_points,
        };
        if raw.is_finite() {
            raw.clamp(0.0, component_points)
        } else {
            0.0
        }
    }
}
