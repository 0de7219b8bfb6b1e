mod mongo;

use async_trait::async_trait;
use serde_json::Value;

use crate::models::{DeleteAck, InsertAck, ProductDocument, ProductId, UpdateAck};

pub use mongo::MongoProductStore;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database driver error: {0}")]
    Driver(#[from] mongodb::error::Error),

    /// Failures from stores that are not backed by the driver.
    #[error("{0}")]
    Other(String),
}

/// The products collection. Every handler performs exactly one call on it.
#[async_trait]
pub trait ProductStore: Send + Sync {
    async fn find_all(&self) -> StoreResult<Vec<Value>>;

    async fn find_by_id(&self, id: ProductId) -> StoreResult<Option<Value>>;

    async fn insert_one(&self, product: ProductDocument) -> StoreResult<InsertAck>;

    /// Sets the given fields on an existing document. Never inserts.
    async fn update_one(&self, id: ProductId, fields: ProductDocument) -> StoreResult<UpdateAck>;

    async fn delete_one(&self, id: ProductId) -> StoreResult<DeleteAck>;
}
