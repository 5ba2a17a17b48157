//! Stream processors applying product intents through the use cases.

use async_trait::async_trait;
use std::sync::Arc;
use stream_worker::{StreamError, StreamJob, StreamProcessor};
use tracing::info;

use crate::models::Product;
use crate::service::ProductUseCase;

impl StreamJob for Product {
    fn job_id(&self) -> String {
        if self.is_persisted() {
            self.id.to_string()
        } else {
            String::new()
        }
    }

    fn validate_job(&self) -> Result<(), StreamError> {
        self.ensure_valid().map_err(StreamError::from)
    }
}

/// Consumes `create-product`.
pub struct CreateProductProcessor {
    use_case: Arc<dyn ProductUseCase>,
}

impl CreateProductProcessor {
    pub fn new(use_case: Arc<dyn ProductUseCase>) -> Self {
        Self { use_case }
    }
}

#[async_trait]
impl StreamProcessor<Product> for CreateProductProcessor {
    async fn process(&self, job: &Product) -> Result<(), StreamError> {
        let created = self.use_case.create(job.clone()).await?;
        info!(product_id = %created.id, "Product created from stream");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "create_product"
    }
}

/// Consumes `update-product`.
pub struct UpdateProductProcessor {
    use_case: Arc<dyn ProductUseCase>,
}

impl UpdateProductProcessor {
    pub fn new(use_case: Arc<dyn ProductUseCase>) -> Self {
        Self { use_case }
    }
}

#[async_trait]
impl StreamProcessor<Product> for UpdateProductProcessor {
    async fn process(&self, job: &Product) -> Result<(), StreamError> {
        let updated = self.use_case.update(job.clone()).await?;
        info!(product_id = %updated.id, "Product updated from stream");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "update_product"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProductError;
    use crate::service::MockProductUseCase;
    use uuid::Uuid;

    fn product() -> Product {
        Product {
            name: "Lamp".to_string(),
            description: "Desk lamp".to_string(),
            price: 30.0,
            quantity: 2,
            rating: 5,
            ..Default::default()
        }
    }

    #[test]
    fn test_job_id_empty_until_persisted() {
        assert_eq!(product().job_id(), "");
        let id = Uuid::now_v7();
        assert_eq!(Product { id, ..product() }.job_id(), id.to_string());
    }

    #[test]
    fn test_validate_job_maps_to_validation() {
        let invalid = Product {
            quantity: 0,
            ..product()
        };
        assert!(matches!(invalid.validate_job(), Err(StreamError::Validation(_))));
        assert!(product().validate_job().is_ok());
    }

    #[tokio::test]
    async fn test_create_processor_calls_create() {
        let mut use_case = MockProductUseCase::new();
        use_case.expect_create().times(1).returning(|p| {
            Ok(Product {
                id: Uuid::now_v7(),
                ..p
            })
        });
        use_case.expect_update().never();

        let processor = CreateProductProcessor::new(Arc::new(use_case));
        processor.process(&product()).await.unwrap();
        assert_eq!(processor.name(), "create_product");
    }

    #[tokio::test]
    async fn test_update_processor_surfaces_failure() {
        let mut use_case = MockProductUseCase::new();
        use_case
            .expect_update()
            .returning(|_| Err(ProductError::Persistence("write conflict".into())));

        let processor = UpdateProductProcessor::new(Arc::new(use_case));
        let err = processor.process(&product()).await.unwrap_err();
        assert!(matches!(err, StreamError::Processing(m) if m.contains("write conflict")));
    }
}
