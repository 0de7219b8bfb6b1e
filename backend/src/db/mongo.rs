use async_trait::async_trait;
use futures_util::TryStreamExt;
use mongodb::{
    bson::{doc, Bson, Document},
    options::{ClientOptions, ServerApi, ServerApiVersion},
    Client, Collection,
};
use serde_json::{Map, Value};
use tracing::info;

use super::{ProductStore, StoreResult};
use crate::config::Config;
use crate::models::{DeleteAck, InsertAck, ProductDocument, ProductId, UpdateAck};

#[derive(Debug, Clone)]
pub struct MongoProductStore {
    collection: Collection<Document>,
}

impl MongoProductStore {
    /// Connects once, verifies the deployment with a ping and binds the products collection.
    pub async fn connect(config: &Config) -> StoreResult<Self> {
        let uri = config.mongodb_uri();
        let mut options = ClientOptions::parse(uri.as_str()).await?;
        options.server_api = Some(
            ServerApi::builder()
                .version(ServerApiVersion::V1)
                .strict(true)
                .deprecation_errors(true)
                .build(),
        );

        let client = Client::with_options(options)?;
        client.database("admin").run_command(doc! { "ping": 1 }).await?;
        info!(
            database = %config.db_name,
            collection = %config.db_collection,
            "Pinged MongoDB deployment. Connection verified."
        );

        let collection = client
            .database(&config.db_name)
            .collection::<Document>(&config.db_collection);

        Ok(Self { collection })
    }
}

#[async_trait]
impl ProductStore for MongoProductStore {
    async fn find_all(&self) -> StoreResult<Vec<Value>> {
        let documents: Vec<Document> = self.collection.find(doc! {}).await?.try_collect().await?;
        Ok(documents
            .into_iter()
            .map(|d| Value::Object(document_to_json(d)))
            .collect())
    }

    async fn find_by_id(&self, id: ProductId) -> StoreResult<Option<Value>> {
        let found = self
            .collection
            .find_one(doc! { "_id": id.object_id() })
            .await?;
        Ok(found.map(|d| Value::Object(document_to_json(d))))
    }

    async fn insert_one(&self, product: ProductDocument) -> StoreResult<InsertAck> {
        let document = json_to_document(product);
        let result = self.collection.insert_one(document).await?;
        Ok(InsertAck {
            acknowledged: true,
            inserted_id: bson_to_json(result.inserted_id),
        })
    }

    async fn update_one(&self, id: ProductId, fields: ProductDocument) -> StoreResult<UpdateAck> {
        let set = json_to_document(fields);
        let result = self
            .collection
            .update_one(doc! { "_id": id.object_id() }, doc! { "$set": set })
            .upsert(false)
            .await?;
        Ok(UpdateAck {
            acknowledged: true,
            matched_count: result.matched_count,
            modified_count: result.modified_count,
            upserted_count: u64::from(result.upserted_id.is_some()),
            upserted_id: result.upserted_id.map(bson_to_json),
        })
    }

    async fn delete_one(&self, id: ProductId) -> StoreResult<DeleteAck> {
        let result = self
            .collection
            .delete_one(doc! { "_id": id.object_id() })
            .await?;
        Ok(DeleteAck {
            acknowledged: true,
            deleted_count: result.deleted_count,
        })
    }
}

// ── BSON → JSON ───────────────────────────────────────────────────────────────

/// Renders a stored document as plain JSON. ObjectIds become hex strings,
/// everything else uses relaxed extended JSON.
pub fn document_to_json(document: Document) -> ProductDocument {
    document
        .into_iter()
        .map(|(key, value)| (key, bson_to_json(value)))
        .collect()
}

fn bson_to_json(value: Bson) -> Value {
    match value {
        Bson::ObjectId(oid) => Value::String(oid.to_hex()),
        Bson::Document(nested) => Value::Object(document_to_json(nested)),
        Bson::Array(items) => Value::Array(items.into_iter().map(bson_to_json).collect()),
        other => other.into_relaxed_extjson(),
    }
}

// ── JSON → BSON ───────────────────────────────────────────────────────────────

/// Converts a request body for storage. Integers that fit an i64 become Int64,
/// larger ones fall back to Double; nothing in a JSON object is rejected.
pub fn json_to_document(object: Map<String, Value>) -> Document {
    object
        .into_iter()
        .map(|(key, value)| (key, json_to_bson(value)))
        .collect()
}

fn json_to_bson(value: Value) -> Bson {
    match value {
        Value::Null => Bson::Null,
        Value::Bool(b) => Bson::Boolean(b),
        Value::Number(n) => match n.as_i64() {
            Some(i) => Bson::Int64(i),
            None => n.as_f64().map_or(Bson::Null, Bson::Double),
        },
        Value::String(s) => Bson::String(s),
        Value::Array(items) => Bson::Array(items.into_iter().map(json_to_bson).collect()),
        Value::Object(nested) => Bson::Document(json_to_document(nested)),
    }
}
