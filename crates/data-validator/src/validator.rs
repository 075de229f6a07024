//! Form Input Validator

use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// Validation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationConfig {
    /// Longest accepted item or location name, in characters
    pub max_name_len: usize,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self { max_name_len: 200 }
    }
}

/// One cart line as typed by the user
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeployRequest {
    pub item_id: i64,
    pub quantity: String,
}

impl DeployRequest {
    pub fn new(item_id: i64, quantity: impl Into<String>) -> Self {
        Self {
            item_id,
            quantity: quantity.into(),
        }
    }
}

/// Stock on hand for an item offered in the deploy cart
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StockLevel {
    pub item_id: i64,
    pub name: String,
    pub available: i64,
}

/// Validator for inventory forms
pub struct Validator {
    config: ValidationConfig,
}

impl Validator {
    /// Create a new validator with given config
    pub fn new(config: ValidationConfig) -> Self {
        Self { config }
    }

    /// Trim and check a display name
    pub fn validate_name(&self, raw: &str) -> Result<String, ValidationError> {
        let name = raw.trim();
        if name.is_empty() {
            return Err(ValidationError::EmptyName);
        }

        let len = name.chars().count();
        if len > self.config.max_name_len {
            return Err(ValidationError::NameTooLong {
                len,
                max: self.config.max_name_len,
            });
        }

        Ok(name.to_string())
    }

    /// Parse a non-negative integer. Blank input counts as zero.
    pub fn parse_count(&self, field: &'static str, raw: &str) -> Result<i64, ValidationError> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Ok(0);
        }

        let value: i64 = raw.parse().map_err(|_| ValidationError::NotANumber {
            field,
            value: raw.to_string(),
        })?;

        if value < 0 {
            return Err(ValidationError::NegativeCount { field, value });
        }
        Ok(value)
    }

    /// Parse an optional low-stock threshold. Blank input means "no threshold".
    pub fn parse_low_count(&self, raw: &str) -> Result<Option<i64>, ValidationError> {
        if raw.trim().is_empty() {
            return Ok(None);
        }
        self.parse_count("low count", raw).map(Some)
    }

    /// Map a chosen location name to its identifier.
    ///
    /// `choices` yields `(id, name)` pairs; the first exact name match wins.
    pub fn resolve_location<'a, I>(&self, name: &str, choices: I) -> Result<&'a str, ValidationError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        choices
            .into_iter()
            .find(|(_, candidate)| *candidate == name)
            .map(|(id, _)| id)
            .ok_or_else(|| ValidationError::UnknownLocation(name.to_string()))
    }

    /// Check a deploy cart against current stock.
    ///
    /// Blank, zero, negative and unparsable quantities are dropped. Returns
    /// `(item_id, quantity)` lines in request order.
    pub fn validate_deployment(
        &self,
        requests: &[DeployRequest],
        stock: &[StockLevel],
    ) -> Result<Vec<(i64, i64)>, ValidationError> {
        let stock: HashMap<i64, &StockLevel> = stock.iter().map(|s| (s.item_id, s)).collect();
        let mut requested: HashMap<i64, i64> = HashMap::new();
        let mut lines = Vec::new();

        for request in requests {
            let quantity = match request.quantity.trim().parse::<i64>() {
                Ok(quantity) if quantity > 0 => quantity,
                _ => {
                    debug!(item_id = request.item_id, "Ignoring cart line {:?}", request.quantity);
                    continue;
                }
            };

            let level = stock
                .get(&request.item_id)
                .ok_or(ValidationError::UnknownItem(request.item_id))?;

            let total = requested.entry(request.item_id).or_insert(0);
            match total.checked_add(quantity) {
                Some(sum) if sum <= level.available => *total = sum,
                sum => {
                    return Err(ValidationError::InsufficientStock {
                        name: level.name.clone(),
                        requested: sum.unwrap_or(i64::MAX),
                        available: level.available,
                    });
                }
            }

            lines.push((request.item_id, quantity));
        }

        if lines.is_empty() {
            return Err(ValidationError::NothingToDeploy);
        }
        Ok(lines)
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new(ValidationConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn stock() -> Vec<StockLevel> {
        vec![
            StockLevel {
                item_id: 1,
                name: "Wireless Mouse".to_string(),
                available: 3,
            },
            StockLevel {
                item_id: 2,
                name: "USB Keyboard".to_string(),
                available: 1,
            },
        ]
    }

    #[test]
    fn test_name_is_trimmed() {
        let validator = Validator::default();
        assert_eq!(validator.validate_name("  Webcam HD ").unwrap(), "Webcam HD");
    }

    #[test]
    fn test_empty_name() {
        let validator = Validator::default();
        assert_eq!(validator.validate_name(""), Err(ValidationError::EmptyName));
        assert_eq!(validator.validate_name("   "), Err(ValidationError::EmptyName));
    }

    #[test]
    fn test_name_too_long() {
        let validator = Validator::new(ValidationConfig { max_name_len: 4 });
        assert!(validator.validate_name("Hub").is_ok());
        assert_eq!(
            validator.validate_name("Router"),
            Err(ValidationError::NameTooLong { len: 6, max: 4 })
        );
    }

    #[test]
    fn test_count_parsing() {
        let validator = Validator::default();
        assert_eq!(validator.parse_count("count", "12").unwrap(), 12);
        assert_eq!(validator.parse_count("count", "").unwrap(), 0);
        assert!(matches!(
            validator.parse_count("count", "-1"),
            Err(ValidationError::NegativeCount { value: -1, .. })
        ));
        assert!(matches!(
            validator.parse_count("count", "ten"),
            Err(ValidationError::NotANumber { .. })
        ));
        assert!(validator.parse_count("count", "1.5").is_err());
    }

    #[test]
    fn test_low_count_parsing() {
        let validator = Validator::default();
        assert_eq!(validator.parse_low_count("").unwrap(), None);
        assert_eq!(validator.parse_low_count("5").unwrap(), Some(5));
        assert!(validator.parse_low_count("-5").is_err());
    }

    #[test]
    fn test_resolve_location() {
        let validator = Validator::default();
        let choices = [("helpdesk", "Help Desk"), ("server", "Server Room")];

        let id = validator
            .resolve_location("Server Room", choices.iter().copied())
            .unwrap();
        assert_eq!(id, "server");

        assert_eq!(
            validator.resolve_location("Roof", choices.iter().copied()),
            Err(ValidationError::UnknownLocation("Roof".to_string()))
        );
    }

    #[test]
    fn test_deployment_drops_blank_lines() {
        let validator = Validator::default();
        let requests = vec![
            DeployRequest::new(1, "2"),
            DeployRequest::new(2, "0"),
            DeployRequest::new(2, "abc"),
            DeployRequest::new(2, ""),
        ];
        assert_eq!(
            validator.validate_deployment(&requests, &stock()).unwrap(),
            vec![(1, 2)]
        );
    }

    #[test]
    fn test_deployment_insufficient_stock() {
        let validator = Validator::default();
        let err = validator
            .validate_deployment(&[DeployRequest::new(2, "4")], &stock())
            .unwrap_err();
        assert_eq!(
            err,
            ValidationError::InsufficientStock {
                name: "USB Keyboard".to_string(),
                requested: 4,
                available: 1,
            }
        );
    }

    #[test]
    fn test_deployment_counts_repeated_lines() {
        let validator = Validator::default();
        let requests = vec![DeployRequest::new(1, "2"), DeployRequest::new(1, "2")];
        assert!(matches!(
            validator.validate_deployment(&requests, &stock()),
            Err(ValidationError::InsufficientStock { requested: 4, .. })
        ));
    }

    #[test]
    fn test_deployment_total_overflow_is_insufficient() {
        let validator = Validator::default();
        let requests = vec![
            DeployRequest::new(1, "1"),
            DeployRequest::new(1, i64::MAX.to_string()),
        ];
        assert_eq!(
            validator.validate_deployment(&requests, &stock()),
            Err(ValidationError::InsufficientStock {
                name: "Wireless Mouse".to_string(),
                requested: i64::MAX,
                available: 3,
            })
        );
    }

    #[test]
    fn test_deployment_exact_stock_is_allowed() {
        let validator = Validator::default();
        let requests = vec![DeployRequest::new(1, "3"), DeployRequest::new(2, "1")];
        assert_eq!(
            validator.validate_deployment(&requests, &stock()).unwrap(),
            vec![(1, 3), (2, 1)]
        );
    }

    #[test]
    fn test_empty_deployment() {
        let validator = Validator::default();
        assert_eq!(
            validator.validate_deployment(&[DeployRequest::new(1, "0")], &stock()),
            Err(ValidationError::NothingToDeploy)
        );
        assert!(matches!(
            validator.validate_deployment(&[DeployRequest::new(9, "1")], &stock()),
            Err(ValidationError::UnknownItem(9))
        ));
    }

    proptest! {
        #[test]
        fn prop_non_negative_counts_parse(value in 0i64..i64::MAX) {
            let validator = Validator::default();
            prop_assert_eq!(validator.parse_count("count", &value.to_string()).unwrap(), value);
        }

        #[test]
        fn prop_negative_counts_rejected(value in i64::MIN..0i64) {
            let validator = Validator::default();
            let is_negative = matches!(
                validator.parse_count("count", &value.to_string()),
                Err(ValidationError::NegativeCount { .. })
            );
            prop_assert!(is_negative);
        }
    }
}
