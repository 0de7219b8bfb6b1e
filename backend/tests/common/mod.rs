//! Shared fixtures for the black-box API tests.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use products_gateway::{
    build_router,
    db::{ProductStore, StoreError, StoreResult},
    models::{DeleteAck, InsertAck, ProductDocument, ProductId, UpdateAck},
    AppState,
};
use serde_json::Value;

/// In-memory stand-in for the products collection. Counts every store call.
#[derive(Default)]
pub struct MemoryStore {
    documents: Mutex<Vec<ProductDocument>>,
    calls: AtomicUsize,
}

impl MemoryStore {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn touch(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }

    fn position(documents: &[ProductDocument], id: ProductId) -> Option<usize> {
        let hex = id.to_string();
        documents
            .iter()
            .position(|d| d.get("_id").and_then(Value::as_str) == Some(hex.as_str()))
    }
}

#[async_trait]
impl ProductStore for MemoryStore {
    async fn find_all(&self) -> StoreResult<Vec<Value>> {
        self.touch();
        let documents = self.documents.lock().unwrap();
        Ok(documents.iter().cloned().map(Value::Object).collect())
    }

    async fn find_by_id(&self, id: ProductId) -> StoreResult<Option<Value>> {
        self.touch();
        let documents = self.documents.lock().unwrap();
        Ok(Self::position(&documents, id).map(|i| Value::Object(documents[i].clone())))
    }

    async fn insert_one(&self, product: ProductDocument) -> StoreResult<InsertAck> {
        self.touch();
        let id = ObjectId::new().to_hex();
        let mut stored = ProductDocument::new();
        stored.insert("_id".to_string(), Value::String(id.clone()));
        stored.extend(product.into_iter().filter(|(k, _)| k != "_id"));
        self.documents.lock().unwrap().push(stored);
        Ok(InsertAck {
            acknowledged: true,
            inserted_id: Value::String(id),
        })
    }

    async fn update_one(&self, id: ProductId, fields: ProductDocument) -> StoreResult<UpdateAck> {
        self.touch();
        let mut documents = self.documents.lock().unwrap();
        let Some(index) = Self::position(&documents, id) else {
            return Ok(UpdateAck {
                acknowledged: true,
                matched_count: 0,
                modified_count: 0,
                upserted_id: None,
                upserted_count: 0,
            });
        };

        let document = &mut documents[index];
        let mut modified = false;
        for (key, value) in fields {
            if document.get(&key) != Some(&value) {
                document.insert(key, value);
                modified = true;
            }
        }

        Ok(UpdateAck {
            acknowledged: true,
            matched_count: 1,
            modified_count: u64::from(modified),
            upserted_id: None,
            upserted_count: 0,
        })
    }

    async fn delete_one(&self, id: ProductId) -> StoreResult<DeleteAck> {
        self.touch();
        let mut documents = self.documents.lock().unwrap();
        let deleted_count = match Self::position(&documents, id) {
            Some(index) => {
                documents.remove(index);
                1
            }
            None => 0,
        };
        Ok(DeleteAck {
            acknowledged: true,
            deleted_count,
        })
    }
}

/// Store whose every call fails, as if the database connection was lost.
pub struct FailingStore;

fn lost() -> StoreError {
    StoreError::Other("connection lost".to_string())
}

#[async_trait]
impl ProductStore for FailingStore {
    async fn find_all(&self) -> StoreResult<Vec<Value>> {
        Err(lost())
    }

    async fn find_by_id(&self, _id: ProductId) -> StoreResult<Option<Value>> {
        Err(lost())
    }

    async fn insert_one(&self, _product: ProductDocument) -> StoreResult<InsertAck> {
        Err(lost())
    }

    async fn update_one(&self, _id: ProductId, _fields: ProductDocument) -> StoreResult<UpdateAck> {
        Err(lost())
    }

    async fn delete_one(&self, _id: ProductId) -> StoreResult<DeleteAck> {
        Err(lost())
    }
}

pub struct TestServer {
    pub base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    /// Serves the production router over `store` on an ephemeral port.
    pub async fn spawn(store: Arc<dyn ProductStore>) -> Self {
        let app = build_router(AppState { store });
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}
