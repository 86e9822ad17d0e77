//! Attribute declarations for filter configuration.
//!
//! A filter lists its attributes up front: name, type, default and the
//! numeric domain a value has to fall in. Values are checked against the
//! declaration both when they are set and before a run.

use crate::core::error::AttributeError;
use crate::core::types::{AttributeType, Value};
use serde::{Deserialize, Serialize};

/// Declaration of one configurable filter attribute.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttributeDefinition {
    /// Key in the attribute map
    pub name: String,
    /// Title-cased label for listings
    pub display_name: String,
    /// Accepted value type
    pub attr_type: AttributeType,
    /// Value a fresh instance starts with
    pub default_value: Value,
    /// One-line help text
    pub description: String,
    /// Domain checks applied after the type check
    pub constraints: Vec<Constraint>,
}

/// Numeric domain restriction on an attribute.
///
/// Non-numeric values pass every constraint; the type check catches them.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "params")]
pub enum Constraint {
    /// `min <= v <= max`
    Range {
        /// Inclusive lower bound
        min: f64,
        /// Inclusive upper bound
        max: f64,
    },
    /// `v <= max`
    MaxValue(f64),
    /// `v >= 0`
    NonNegative,
}

impl AttributeDefinition {
    /// Declare an attribute with no constraints.
    pub fn new(name: impl Into<String>, attr_type: AttributeType, default_value: Value) -> Self {
        let name = name.into();
        Self {
            display_name: title_case(&name),
            name,
            attr_type,
            default_value,
            description: String::new(),
            constraints: Vec::new(),
        }
    }

    /// Attach help text.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Restrict to the closed interval `[min, max]`.
    pub fn with_range(self, min: f64, max: f64) -> Self {
        self.with_constraint(Constraint::Range { min, max })
    }

    /// Add a constraint.
    pub fn with_constraint(mut self, constraint: Constraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    /// Check a value's type, then every constraint in declaration order.
    pub fn validate(&self, value: &Value) -> Result<(), AttributeError> {
        if !self.attr_type.matches(value) {
            return Err(AttributeError::TypeMismatch {
                attribute: self.name.clone(),
                expected: self.attr_type,
                got: value.get_type(),
            });
        }

        let Some(number) = value.as_float() else {
            return Ok(());
        };
        match self.constraints.iter().find(|c| !c.admits(number)) {
            Some(failed) => Err(AttributeError::OutOfDomain {
                attribute: self.name.clone(),
                error: format!("{} is invalid: {}", value, failed.description().to_lowercase()),
            }),
            None => Ok(()),
        }
    }
}

impl Constraint {
    /// Whether `number` satisfies the constraint. NaN never does.
    pub fn admits(&self, number: f64) -> bool {
        if number.is_nan() {
            return false;
        }
        match *self {
            Constraint::Range { min, max } => (min..=max).contains(&number),
            Constraint::MaxValue(max) => number <= max,
            Constraint::NonNegative => number >= 0.0,
        }
    }

    /// Rule text as printed by `gazeblur info`.
    pub fn description(&self) -> String {
        match self {
            Constraint::Range { min, max } => format!("Must be between {} and {}", min, max),
            Constraint::MaxValue(max) => format!("Must be at most {}", max),
            Constraint::NonNegative => "Must be non-negative".to_string(),
        }
    }
}

/// `block_size` -> `Block Size`
fn title_case(name: &str) -> String {
    name.split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            chars
                .next()
                .map(|first| first.to_uppercase().chain(chars).collect::<String>())
                .unwrap_or_default()
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_definition_builder() {
        let def = AttributeDefinition::new("block_size", AttributeType::Integer, Value::Integer(8))
            .with_description("Edge length of a block")
            .with_range(1.0, 512.0);

        assert_eq!(def.display_name, "Block Size");
        assert_eq!(def.constraints, vec![Constraint::Range { min: 1.0, max: 512.0 }]);
        assert!(def.validate(&Value::Integer(512)).is_ok());
        assert!(def.validate(&Value::Integer(0)).is_err());
    }

    #[test]
    fn test_range_bounds_are_inclusive() {
        let range = Constraint::Range { min: 0.0, max: 1.0 };

        assert!(range.admits(0.0));
        assert!(range.admits(1.0));
        assert!(!range.admits(-0.01));
        assert!(!range.admits(1.01));
        assert!(!range.admits(f64::NAN));
    }

    #[test]
    fn test_sigma_domain() {
        let sigma = AttributeDefinition::new("sigma", AttributeType::Float, Value::Float(3.0))
            .with_range(0.01, 100.0);

        assert!(sigma.validate(&Value::Integer(2)).is_ok());
        assert!(sigma.validate(&Value::Float(100.0)).is_ok());
        assert!(matches!(
            sigma.validate(&Value::Float(0.0)),
            Err(AttributeError::OutOfDomain { .. })
        ));
        assert!(sigma.validate(&Value::Float(1e-50)).is_err());
        assert!(matches!(
            sigma.validate(&Value::Float(100.5)),
            Err(AttributeError::OutOfDomain { .. })
        ));
        assert!(matches!(
            sigma.validate(&Value::Boolean(true)),
            Err(AttributeError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_non_negative_seed() {
        let seed = AttributeDefinition::new("seed", AttributeType::Integer, Value::Integer(0))
            .with_constraint(Constraint::NonNegative);
        assert!(seed.validate(&Value::Integer(0)).is_ok());
        assert!(seed.validate(&Value::Integer(-1)).is_err());
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("blur_radius"), "Blur Radius");
        assert_eq!(title_case("seed"), "Seed");
    }
}
