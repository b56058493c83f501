// Copyright (c) 2026 bad-antics
// Licensed under the MIT License. See LICENSE file in the project root.
// https://github.com/bad-antics/glowbarn-rs

//! Bound-checked control parameters

use serde::{Deserialize, Serialize};

/// A named value with engineering bounds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlParameter {
    pub name: String,
    pub current_value: f64,
    pub min_value: f64,
    pub max_value: f64,
    pub unit: String,
    /// When false the lower bound itself is out of range
    pub min_inclusive: bool,
}

impl ControlParameter {
    pub fn new(name: &str, current_value: f64, min_value: f64, max_value: f64, unit: &str) -> Self {
        Self {
            name: name.to_string(),
            current_value,
            min_value,
            max_value,
            unit: unit.to_string(),
            min_inclusive: true,
        }
    }

    /// Same as [`ControlParameter::new`] but with an open lower bound
    pub fn positive(name: &str, current_value: f64, max_value: f64, unit: &str) -> Self {
        Self {
            min_inclusive: false,
            ..Self::new(name, current_value, 0.0, max_value, unit)
        }
    }

    pub fn is_in_bounds(&self) -> bool {
        self.accepts(self.current_value)
    }

    /// Whether `value` would be in bounds for this parameter
    pub fn accepts(&self, value: f64) -> bool {
        let above_min = if self.min_inclusive {
            value >= self.min_value
        } else {
            value > self.min_value
        };
        above_min && value <= self.max_value
    }

    /// Store a new value; returns whether it is in bounds
    pub fn set_value(&mut self, value: f64) -> bool {
        self.current_value = value;
        self.is_in_bounds()
    }
}
