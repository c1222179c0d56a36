//! Product master migration.

use tracing::info;

use super::{codes, flag_or_false};
use crate::error::Result;
use crate::source::{ProductRecord, SourceReader};
use crate::target::{NewProduct, TargetWriter};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProductOutcome {
    pub products: usize,
}

impl From<&ProductRecord> for NewProduct {
    fn from(p: &ProductRecord) -> Self {
        NewProduct {
            product_code: codes::product_code(p.product_id),
            product_name: p.name.clone(),
            unit_price: p.unit_price.unwrap_or(0.0),
            is_default: flag_or_false(p.is_default),
        }
    }
}

pub async fn migrate_products<S, T>(source: &S, target: &mut T) -> Result<ProductOutcome>
where
    S: SourceReader + ?Sized,
    T: TargetWriter + ?Sized,
{
    let products = source.products().await?;
    let mut outcome = ProductOutcome::default();
    for product in &products {
        target.insert_product(&NewProduct::from(product)).await?;
        outcome.products += 1;
    }
    info!("Products: {} migrated", outcome.products);
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use sqlx::Row;

    use super::*;
    use crate::source::MemorySource;
    use crate::transform::test_support::target;

    #[tokio::test]
    async fn test_widget_product() {
        let source = MemorySource::new().with_products(vec![ProductRecord {
            product_id: 3,
            name: Some("Widget".into()),
            unit_price: Some(12.5),
            is_default: None,
        }]);
        let mut target = target().await;

        let outcome = migrate_products(&source, &mut target).await.unwrap();
        assert_eq!(outcome.products, 1);

        let rows = target
            .fetch_rows("SELECT ProductCode, ProductName, UnitPrice, IsDefault FROM ProductMaster")
            .await;
        assert_eq!(rows[0].get::<String, _>(0), "PROD0003");
        assert_eq!(rows[0].get::<String, _>(1), "Widget");
        assert_eq!(rows[0].get::<f64, _>(2), 12.5);
        assert_eq!(rows[0].get::<i64, _>(3), 0);
    }

    #[test]
    fn test_null_price_and_default_flag() {
        let product = NewProduct::from(&ProductRecord {
            product_id: 12,
            name: None,
            unit_price: None,
            is_default: Some(true),
        });
        assert_eq!(product.product_code, "PROD0012");
        assert_eq!(product.unit_price, 0.0);
        assert!(product.is_default);
    }
}
