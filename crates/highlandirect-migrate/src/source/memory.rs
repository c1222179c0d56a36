//! In-memory legacy reader.
//!
//! Holds the legacy tables as vectors. Useful for embedding the migration
//! where rows are already loaded, and for exercising transformers without
//! an export file.

use async_trait::async_trait;

use super::types::*;
use super::SourceReader;
use crate::error::Result;

/// Vector-backed [`SourceReader`].
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    pub customers: Vec<CustomerRecord>,
    pub products: Vec<ProductRecord>,
    pub stores: Vec<StoreRecord>,
    pub orders: Vec<OrderRecord>,
    pub order_histories: Vec<OrderHistoryRecord>,
    pub report_memos: Vec<ReportMemoRecord>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_customers(mut self, customers: Vec<CustomerRecord>) -> Self {
        self.customers = customers;
        self
    }

    pub fn with_products(mut self, products: Vec<ProductRecord>) -> Self {
        self.products = products;
        self
    }

    pub fn with_stores(mut self, stores: Vec<StoreRecord>) -> Self {
        self.stores = stores;
        self
    }

    pub fn with_orders(mut self, orders: Vec<OrderRecord>) -> Self {
        self.orders = orders;
        self
    }

    pub fn with_order_histories(mut self, histories: Vec<OrderHistoryRecord>) -> Self {
        self.order_histories = histories;
        self
    }

    pub fn with_report_memos(mut self, memos: Vec<ReportMemoRecord>) -> Self {
        self.report_memos = memos;
        self
    }
}

#[async_trait]
impl SourceReader for MemorySource {
    async fn customers(&self) -> Result<Vec<CustomerRecord>> {
        Ok(self
            .customers
            .iter()
            .filter(|c| !c.is_deleted())
            .cloned()
            .collect())
    }

    async fn products(&self) -> Result<Vec<ProductRecord>> {
        Ok(self.products.clone())
    }

    async fn stores(&self) -> Result<Vec<StoreRecord>> {
        Ok(self.stores.clone())
    }

    async fn orders(&self) -> Result<Vec<OrderRecord>> {
        Ok(self.orders.clone())
    }

    async fn order_histories(&self) -> Result<Vec<OrderHistoryRecord>> {
        Ok(self.order_histories.clone())
    }

    async fn report_memos(&self) -> Result<Vec<ReportMemoRecord>> {
        Ok(self.report_memos.clone())
    }

    async fn count(&self, entity: SourceEntity) -> Result<i64> {
        let n = match entity {
            SourceEntity::Customer => self.customers.iter().filter(|c| !c.is_deleted()).count(),
            SourceEntity::Product => self.products.len(),
            SourceEntity::Store => self.stores.len(),
            SourceEntity::Order => self.orders.len(),
            SourceEntity::OrderHistory => self.order_histories.len(),
            SourceEntity::ReportMemo => self.report_memos.len(),
        };
        Ok(n as i64)
    }

    fn db_type(&self) -> &str {
        "memory"
    }

    async fn close(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    fn customer(cust_no: i64, deleted: Option<bool>) -> CustomerRecord {
        CustomerRecord {
            cust_no,
            deleted,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_soft_deleted_customers_are_filtered() {
        let source = MemorySource::new().with_customers(vec![
            customer(1, None),
            customer(2, Some(false)),
            customer(3, Some(true)),
        ]);

        let active = source.customers().await.unwrap();
        let ids: Vec<i64> = active.iter().map(|c| c.cust_no).collect();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(source.count(SourceEntity::Customer).await.unwrap(), 2);
    }
}
