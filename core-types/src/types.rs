// Copyright (c) James Kassemi, SC, US. All rights reserved.

use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Identifier assigned to a sale when it is recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SaleId(pub u64);

/// Identifier assigned to a sale adjustment when it is recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AdjustmentId(pub u64);

/// A recorded sale. Owned by the sales ledger once appended; the value is
/// mutated only by adjustments applied through the engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sale {
    pub id: SaleId,
    pub product_type: String,
    pub value: Decimal,
}

/// A recorded adjustment. Immutable after creation; applies to the sales
/// stored under its product type at the moment of recording.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleAdjustment {
    pub id: AdjustmentId,
    pub product_type: String,
    pub operation: AdjustmentOperation,
    pub magnitude: Decimal,
}

impl SaleAdjustment {
    /// Applies this adjustment to a single sale in place.
    pub fn apply_to(&self, sale: &mut Sale) {
        sale.value = self.operation.apply(sale.value, self.magnitude);
    }
}

/// Closed set of numeric transforms an adjustment can apply to a sale value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AdjustmentOperation {
    Add,
    Subtract,
    Multiply,
}

impl AdjustmentOperation {
    pub fn apply(self, value: Decimal, magnitude: Decimal) -> Decimal {
        match self {
            AdjustmentOperation::Add => value + magnitude,
            AdjustmentOperation::Subtract => value - magnitude,
            AdjustmentOperation::Multiply => value * magnitude,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AdjustmentOperation::Add => "ADD",
            AdjustmentOperation::Subtract => "SUBTRACT",
            AdjustmentOperation::Multiply => "MULTIPLY",
        }
    }
}

impl fmt::Display for AdjustmentOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operation names outside the closed set fail to parse; callers decide
/// whether that propagates or is logged and dropped.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown adjustment operation: {0}")]
pub struct UnknownOperation(pub String);

impl FromStr for AdjustmentOperation {
    type Err = UnknownOperation;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "ADD" => Ok(AdjustmentOperation::Add),
            "SUBTRACT" => Ok(AdjustmentOperation::Subtract),
            "MULTIPLY" => Ok(AdjustmentOperation::Multiply),
            other => Err(UnknownOperation(other.to_string())),
        }
    }
}

/// Inbound wire shape delivered by the transport layer. Values arrive as
/// decimal strings; parsing happens at the consumption boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleNotification {
    pub product_type: String,
    pub sale_value: String,
    #[serde(default = "default_occurrences")]
    pub occurrences: i32,
    #[serde(default)]
    pub adjustment_operation: Option<String>,
    #[serde(default)]
    pub adjustment_value: Option<String>,
}

fn default_occurrences() -> i32 {
    1
}

impl SaleNotification {
    pub fn sale(product_type: &str, sale_value: &str, occurrences: i32) -> Self {
        Self {
            product_type: product_type.to_string(),
            sale_value: sale_value.to_string(),
            occurrences,
            adjustment_operation: None,
            adjustment_value: None,
        }
    }

    pub fn with_adjustment(
        product_type: &str,
        sale_value: &str,
        occurrences: i32,
        operation: &str,
        magnitude: &str,
    ) -> Self {
        Self {
            product_type: product_type.to_string(),
            sale_value: sale_value.to_string(),
            occurrences,
            adjustment_operation: Some(operation.to_string()),
            adjustment_value: Some(magnitude.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(value: &str) -> Decimal {
        value.parse().unwrap()
    }

    #[test]
    fn operations_apply_independently() {
        assert_eq!(
            AdjustmentOperation::Add.apply(dec("0.20"), dec("0.10")),
            dec("0.30")
        );
        assert_eq!(
            AdjustmentOperation::Subtract.apply(dec("0.20"), dec("0.10")),
            dec("0.10")
        );
        assert_eq!(
            AdjustmentOperation::Multiply.apply(dec("0.20"), dec("0.10")),
            dec("0.020")
        );
    }

    #[test]
    fn operation_parses_wire_spellings() {
        assert_eq!(
            "ADD".parse::<AdjustmentOperation>().unwrap(),
            AdjustmentOperation::Add
        );
        assert_eq!(
            "SUBTRACT".parse::<AdjustmentOperation>().unwrap(),
            AdjustmentOperation::Subtract
        );
        assert_eq!(
            "MULTIPLY".parse::<AdjustmentOperation>().unwrap(),
            AdjustmentOperation::Multiply
        );
    }

    #[test]
    fn operation_rejects_names_outside_the_set() {
        let err = "DIVIDE".parse::<AdjustmentOperation>().unwrap_err();
        assert_eq!(err, UnknownOperation("DIVIDE".to_string()));
        // Parsing is exact; lowercase spellings are not accepted.
        assert!("add".parse::<AdjustmentOperation>().is_err());
    }

    #[test]
    fn notification_occurrences_default_to_one() {
        let json = r#"{"product_type":"Apple","sale_value":"0.20"}"#;
        let notification: SaleNotification = serde_json::from_str(json).unwrap();
        assert_eq!(notification.occurrences, 1);
        assert!(notification.adjustment_operation.is_none());
    }
}
