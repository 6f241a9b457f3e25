use std::sync::atomic::{AtomicU64, Ordering};

use log::debug;
use rust_decimal::Decimal;

use core_types::types::{AdjustmentId, AdjustmentOperation, Sale, SaleAdjustment, SaleId};

use crate::{
    error::{EngineError, Result},
    ledger::CategoryLedger,
    report::{AdjustmentReport, SalesReport},
};

/// Monotonic id source standing in for a persistence store's sequence.
/// Injected at engine construction so tests can supply their own.
pub struct IdAllocator {
    next: AtomicU64,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self {
            next: AtomicU64::new(1),
        }
    }

    fn next(&self) -> u64 {
        self.next.fetch_add(1, Ordering::Relaxed)
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

/// Orchestrates the sales ledger and the adjustment log. Validates product
/// types before any mutation; everything below this layer assumes valid keys.
pub struct SalesEngine {
    sales: CategoryLedger<Sale>,
    adjustments: CategoryLedger<SaleAdjustment>,
    ids: IdAllocator,
}

impl SalesEngine {
    pub fn new() -> Self {
        Self::with_ids(IdAllocator::new())
    }

    pub fn with_ids(ids: IdAllocator) -> Self {
        Self {
            sales: CategoryLedger::new(),
            adjustments: CategoryLedger::new(),
            ids,
        }
    }

    /// Records a single sale. The value carries no sign or magnitude bound.
    pub fn record_sale(&self, product_type: &str, value: Decimal) -> Result<SaleId> {
        if product_type.trim().is_empty() {
            return Err(EngineError::InvalidProductType);
        }
        let id = SaleId(self.ids.next());
        self.sales.record_for(
            product_type,
            Sale {
                id,
                product_type: product_type.to_string(),
                value,
            },
        );
        Ok(id)
    }

    /// Records an adjustment: applies the operation to every sale currently
    /// stored under `product_type`, each record independently and in
    /// insertion order, then appends the adjustment to the log. Sales
    /// recorded afterwards are unaffected.
    pub fn record_adjustment(
        &self,
        product_type: &str,
        operation: AdjustmentOperation,
        magnitude: Decimal,
    ) -> Result<AdjustmentId> {
        if product_type.trim().is_empty() {
            return Err(EngineError::InvalidProductType);
        }
        let adjustment = SaleAdjustment {
            id: AdjustmentId(self.ids.next()),
            product_type: product_type.to_string(),
            operation,
            magnitude,
        };
        let adjusted = self
            .sales
            .apply_for(product_type, |sale| adjustment.apply_to(sale));
        debug!("applied {operation} {magnitude} to {adjusted} sales of {product_type}");
        let id = adjustment.id;
        self.adjustments.record_for(product_type, adjustment);
        Ok(id)
    }

    pub fn fetch_sales_for(&self, product_type: &str) -> Vec<Sale> {
        self.sales.fetch_for(product_type)
    }

    pub fn fetch_adjustments_for(&self, product_type: &str) -> Vec<SaleAdjustment> {
        self.adjustments.fetch_for(product_type)
    }

    pub fn clear_sales_for(&self, product_type: &str) {
        self.sales.clear_for(product_type);
    }

    pub fn clear_adjustments_for(&self, product_type: &str) {
        self.adjustments.clear_for(product_type);
    }

    pub fn fetch_all_sales(&self) -> std::collections::BTreeMap<String, Vec<Sale>> {
        self.sales.fetch_all()
    }

    pub fn fetch_all_adjustments(&self) -> std::collections::BTreeMap<String, Vec<SaleAdjustment>> {
        self.adjustments.fetch_all()
    }

    /// Per-product sale count and value total, in key order.
    pub fn sales_report(&self) -> SalesReport {
        SalesReport::from_snapshot(&self.sales.fetch_all())
    }

    /// Per-product listing of recorded adjustments, in key order.
    pub fn adjustment_report(&self) -> AdjustmentReport {
        AdjustmentReport::from_snapshot(&self.adjustments.fetch_all())
    }
}

impl Default for SalesEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(value: &str) -> Decimal {
        value.parse().unwrap()
    }

    #[test]
    fn record_sale_rejects_blank_product_types() {
        let engine = SalesEngine::new();
        assert!(matches!(
            engine.record_sale("", dec("0.20")),
            Err(EngineError::InvalidProductType)
        ));
        assert!(matches!(
            engine.record_sale("   ", dec("0.20")),
            Err(EngineError::InvalidProductType)
        ));
        assert!(engine.fetch_all_sales().is_empty());
    }

    #[test]
    fn record_adjustment_rejects_blank_product_types() {
        let engine = SalesEngine::new();
        assert!(matches!(
            engine.record_adjustment("", AdjustmentOperation::Add, dec("0.10")),
            Err(EngineError::InvalidProductType)
        ));
        assert!(engine.fetch_all_adjustments().is_empty());
    }

    #[test]
    fn adjustment_mutates_each_stored_sale_independently() {
        let engine = SalesEngine::new();
        engine.record_sale("Apple", dec("0.20")).unwrap();
        engine.record_sale("Apple", dec("0.50")).unwrap();
        engine.record_sale("Banana", dec("0.30")).unwrap();

        engine
            .record_adjustment("Apple", AdjustmentOperation::Add, dec("0.10"))
            .unwrap();

        let apples: Vec<Decimal> = engine
            .fetch_sales_for("Apple")
            .into_iter()
            .map(|sale| sale.value)
            .collect();
        assert_eq!(apples, vec![dec("0.30"), dec("0.60")]);
        // Other product types are untouched.
        assert_eq!(engine.fetch_sales_for("Banana")[0].value, dec("0.30"));
    }

    #[test]
    fn subtract_and_multiply_behave_analogously() {
        let engine = SalesEngine::new();
        engine.record_sale("Apple", dec("0.20")).unwrap();

        engine
            .record_adjustment("Apple", AdjustmentOperation::Subtract, dec("0.05"))
            .unwrap();
        assert_eq!(engine.fetch_sales_for("Apple")[0].value, dec("0.15"));

        engine
            .record_adjustment("Apple", AdjustmentOperation::Multiply, dec("2"))
            .unwrap();
        assert_eq!(engine.fetch_sales_for("Apple")[0].value, dec("0.30"));
    }

    #[test]
    fn adjustment_does_not_apply_to_later_sales() {
        let engine = SalesEngine::new();
        engine.record_sale("Apple", dec("0.20")).unwrap();
        engine
            .record_adjustment("Apple", AdjustmentOperation::Add, dec("0.10"))
            .unwrap();

        engine.record_sale("Apple", dec("0.20")).unwrap();

        let values: Vec<Decimal> = engine
            .fetch_sales_for("Apple")
            .into_iter()
            .map(|sale| sale.value)
            .collect();
        assert_eq!(values, vec![dec("0.30"), dec("0.20")]);
    }

    #[test]
    fn adjustments_are_logged_even_when_no_sales_match() {
        let engine = SalesEngine::new();
        engine
            .record_adjustment("Pear", AdjustmentOperation::Multiply, dec("3"))
            .unwrap();

        let logged = engine.fetch_adjustments_for("Pear");
        assert_eq!(logged.len(), 1);
        assert_eq!(logged[0].operation, AdjustmentOperation::Multiply);
        assert_eq!(logged[0].magnitude, dec("3"));
    }

    #[test]
    fn clearing_an_unknown_product_leaves_state_untouched() {
        let engine = SalesEngine::new();
        engine.record_sale("Apple", dec("0.20")).unwrap();

        engine.clear_sales_for("Pear");

        let all = engine.fetch_all_sales();
        assert_eq!(all.len(), 1);
        assert_eq!(all["Apple"].len(), 1);
    }

    #[test]
    fn clearing_adjustments_is_scoped_to_one_product() {
        let engine = SalesEngine::new();
        engine
            .record_adjustment("Apple", AdjustmentOperation::Add, dec("0.10"))
            .unwrap();
        engine
            .record_adjustment("Banana", AdjustmentOperation::Add, dec("0.10"))
            .unwrap();

        engine.clear_adjustments_for("Apple");

        assert!(engine.fetch_adjustments_for("Apple").is_empty());
        assert_eq!(engine.fetch_adjustments_for("Banana").len(), 1);
    }

    #[test]
    fn sale_ids_are_distinct_across_records() {
        let engine = SalesEngine::with_ids(IdAllocator::new());
        let first = engine.record_sale("Apple", dec("0.20")).unwrap();
        let second = engine.record_sale("Apple", dec("0.20")).unwrap();
        assert_ne!(first, second);
    }
}
