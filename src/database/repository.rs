use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{self, doc, oid::ObjectId, Bson, Document};
use mongodb::{Collection, Database};
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

/// Errors produced by repository operations.
///
/// `InvalidId` and `NotFound` are caller-addressable conditions; the
/// remaining variants wrap driver or codec failures verbatim and are never
/// retried at this layer.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    #[error("not found")]
    NotFound,

    #[error("persistence error: {0}")]
    Persistence(#[source] mongodb::error::Error),

    #[error("query error: {0}")]
    Query(#[source] mongodb::error::Error),

    #[error("failed to decode document: {0}")]
    Decode(#[source] bson::de::Error),

    #[error("failed to encode entity: {0}")]
    Encode(#[source] bson::ser::Error),
}

/// Port for generic CRUD access to a single collection of entities.
///
/// Identifiers are hex-encoded ObjectIds as assigned by the database at
/// creation time. Update and delete address exactly one document or report
/// `NotFound`; they never silently no-op.
#[async_trait]
pub trait Repository<T>: Send + Sync
where
    T: Send + Sync + 'static,
{
    /// Insert a new entity and return its assigned identifier.
    async fn create(&self, entity: &T) -> Result<String, RepositoryError>;

    /// Fetch entities matching `filter` (empty document matches all),
    /// discarding the first `skip` matches and returning at most `take`.
    async fn get(
        &self,
        filter: Document,
        skip: Option<u64>,
        take: Option<i64>,
    ) -> Result<Vec<T>, RepositoryError>;

    /// Fetch the single entity with the given identifier.
    async fn get_by_id(&self, id: &str) -> Result<T, RepositoryError>;

    /// Overwrite the stored document's fields with `entity`'s fields.
    async fn update(&self, id: &str, entity: &T) -> Result<(), RepositoryError>;

    /// Remove the entity with the given identifier.
    async fn delete(&self, id: &str) -> Result<(), RepositoryError>;

    /// Count documents matching `filter`.
    async fn count(&self, filter: Document) -> Result<u64, RepositoryError>;
}

/// Generic MongoDB-backed repository.
///
/// One implementation serves any serde-serializable entity shape. Documents
/// are fetched as raw BSON and decoded into `T` explicitly, so a document
/// that does not match the target shape surfaces as `Decode` rather than
/// being skipped.
pub struct MongoRepository<T> {
    collection: Collection<Document>,
    _phantom: std::marker::PhantomData<T>,
}

impl<T> MongoRepository<T> {
    pub fn new(database: &Database, collection_name: impl AsRef<str>) -> Self {
        Self {
            collection: database.collection(collection_name.as_ref()),
            _phantom: std::marker::PhantomData,
        }
    }
}

#[async_trait]
impl<T> Repository<T> for MongoRepository<T>
where
    T: Serialize + DeserializeOwned + Send + Sync + 'static,
{
    async fn create(&self, entity: &T) -> Result<String, RepositoryError> {
        let document = bson::to_document(entity).map_err(RepositoryError::Encode)?;

        let result = self
            .collection
            .insert_one(document)
            .await
            .map_err(RepositoryError::Persistence)?;

        let id = match result.inserted_id {
            Bson::ObjectId(id) => id.to_hex(),
            other => other.to_string(),
        };
        Ok(id)
    }

    async fn get(
        &self,
        filter: Document,
        skip: Option<u64>,
        take: Option<i64>,
    ) -> Result<Vec<T>, RepositoryError> {
        let mut find = self.collection.find(filter);
        if let Some(skip) = skip {
            find = find.skip(skip);
        }
        if let Some(take) = take {
            find = find.limit(take);
        }

        let mut cursor = find.await.map_err(RepositoryError::Query)?;

        let mut entities = Vec::new();
        while let Some(document) = cursor.try_next().await.map_err(RepositoryError::Query)? {
            // A document that cannot be decoded aborts the whole query
            entities.push(bson::from_document(document).map_err(RepositoryError::Decode)?);
        }
        Ok(entities)
    }

    async fn get_by_id(&self, id: &str) -> Result<T, RepositoryError> {
        let id = object_id(id)?;

        let document = self
            .collection
            .find_one(doc! { "_id": id })
            .await
            .map_err(RepositoryError::Query)?
            .ok_or(RepositoryError::NotFound)?;

        bson::from_document(document).map_err(RepositoryError::Decode)
    }

    async fn update(&self, id: &str, entity: &T) -> Result<(), RepositoryError> {
        let id = object_id(id)?;
        let mut document = bson::to_document(entity).map_err(RepositoryError::Encode)?;
        // The identifier is assigned at creation and immutable
        document.remove("_id");

        let result = self
            .collection
            .update_one(doc! { "_id": id }, doc! { "$set": document })
            .await
            .map_err(RepositoryError::Persistence)?;

        // An update that matched a document but modified nothing (value
        // unchanged) is a success; only zero matches is not-found.
        if result.matched_count == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), RepositoryError> {
        let id = object_id(id)?;

        let result = self
            .collection
            .delete_one(doc! { "_id": id })
            .await
            .map_err(RepositoryError::Persistence)?;

        if result.deleted_count == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn count(&self, filter: Document) -> Result<u64, RepositoryError> {
        self.collection
            .count_documents(filter)
            .await
            .map_err(RepositoryError::Query)
    }
}

/// Convert a caller-supplied identifier into its native encoding.
/// Fails before any database call is attempted.
fn object_id(id: &str) -> Result<ObjectId, RepositoryError> {
    ObjectId::parse_str(id).map_err(|_| RepositoryError::InvalidId(id.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_well_formed_object_ids() {
        let id = object_id("507f191e810c19729de860ea").unwrap();
        assert_eq!(id.to_hex(), "507f191e810c19729de860ea");
    }

    #[test]
    fn rejects_malformed_object_ids() {
        for id in ["invalid-id", "", "507f191e810c19729de860", "zzzf191e810c19729de860ea"] {
            let err = object_id(id).unwrap_err();
            assert!(matches!(err, RepositoryError::InvalidId(_)), "{:?}", err);
        }
    }
}
