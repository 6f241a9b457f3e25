use std::collections::BTreeMap;
use std::fmt;

use rust_decimal::Decimal;

use core_types::types::{AdjustmentOperation, Sale, SaleAdjustment};

const RULE: &str = "=============================================";

/// Per-product sale count and value total. Line order follows the ledger's
/// key order, so two reports over the same state render identically.
#[derive(Debug, Clone, PartialEq)]
pub struct SalesReport {
    pub lines: Vec<SalesReportLine>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SalesReportLine {
    pub product_type: String,
    pub count: usize,
    pub total: Decimal,
}

impl SalesReport {
    pub fn from_snapshot(snapshot: &BTreeMap<String, Vec<Sale>>) -> Self {
        let lines = snapshot
            .iter()
            .map(|(product_type, sales)| SalesReportLine {
                product_type: product_type.clone(),
                count: sales.len(),
                total: sales.iter().map(|sale| sale.value).sum(),
            })
            .collect();
        Self { lines }
    }
}

impl fmt::Display for SalesReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{RULE}")?;
        writeln!(f, "Product Type : Sale Count : Total Sale Value")?;
        writeln!(f, "{RULE}")?;
        for line in &self.lines {
            writeln!(f, "{} : {} : {}", line.product_type, line.count, line.total)?;
        }
        Ok(())
    }
}

/// Per-product listing of every recorded adjustment, one line each.
#[derive(Debug, Clone, PartialEq)]
pub struct AdjustmentReport {
    pub lines: Vec<AdjustmentReportLine>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AdjustmentReportLine {
    pub product_type: String,
    pub operation: AdjustmentOperation,
    pub magnitude: Decimal,
}

impl AdjustmentReport {
    pub fn from_snapshot(snapshot: &BTreeMap<String, Vec<SaleAdjustment>>) -> Self {
        let lines = snapshot
            .iter()
            .flat_map(|(product_type, adjustments)| {
                adjustments.iter().map(|adjustment| AdjustmentReportLine {
                    product_type: product_type.clone(),
                    operation: adjustment.operation,
                    magnitude: adjustment.magnitude,
                })
            })
            .collect();
        Self { lines }
    }
}

impl fmt::Display for AdjustmentReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{RULE}")?;
        writeln!(f, "Product Type : Adjustment Operation : Magnitude")?;
        writeln!(f, "{RULE}")?;
        for line in &self.lines {
            writeln!(
                f,
                "{} : {} : {}",
                line.product_type, line.operation, line.magnitude
            )?;
        }
        Ok(())
    }
}
