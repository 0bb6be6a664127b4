//! Repository module
//!
//! Generic CRUD facade over one collection of the file store. Filtering is a
//! linear scan with exact JSON equality; ids are `existing count + 1`,
//! assigned under the collection's writer lock.

pub mod schema;

pub use schema::{FieldKind, FieldRule, Schema};

use serde_json::{Map, Value};
use std::sync::Arc;

use crate::error::RepositoryError;
use crate::logger;
use crate::store::{Entity, FileStore};

/// Exact-match filter: every key must equal the entity's field
pub type Filter = Map<String, Value>;

pub struct Repository {
    name: String,
    schema: Schema,
    store: Arc<FileStore>,
}

impl Repository {
    pub fn new(name: &str, schema: Schema, store: Arc<FileStore>) -> Self {
        Self {
            name: name.to_string(),
            schema,
            store,
        }
    }

    /// Return every entity matching `filter`, or the whole collection.
    ///
    /// Read failures are logged and yield an empty result.
    pub async fn find(&self, filter: Option<&Filter>) -> Vec<Entity> {
        let items = match self.store.read_collection(&self.name).await {
            Ok(items) => items,
            Err(e) => {
                logger::log_error(&format!("[Repository:{}] find failed: {e}", self.name));
                return Vec::new();
            }
        };

        match filter {
            Some(filter) if !filter.is_empty() => items
                .into_iter()
                .filter(|item| matches_filter(item, filter))
                .collect(),
            _ => items,
        }
    }

    pub async fn find_one(&self, filter: &Filter) -> Option<Entity> {
        self.find(Some(filter)).await.into_iter().next()
    }

    pub async fn find_by_id(&self, id: u64) -> Option<Entity> {
        match self.store.read_collection(&self.name).await {
            Ok(items) => items
                .into_iter()
                .find(|item| item.get("id").and_then(Value::as_u64) == Some(id)),
            Err(e) => {
                logger::log_error(&format!(
                    "[Repository:{}] find_by_id failed: {e}",
                    self.name
                ));
                None
            }
        }
    }

    /// Validate, assign an id and persist a new entity.
    ///
    /// Nothing is written when validation or the uniqueness check fails.
    pub async fn create_one(&self, mut item: Entity) -> Result<Entity, RepositoryError> {
        self.schema.validate(&item)?;

        let _guard = self.store.lock_collection(&self.name).await;
        let mut existing = self.store.read_collection_strict(&self.name).await?;

        for field in self.schema.unique_fields() {
            let Some(value) = item.get(field).filter(|v| !v.is_null()) else {
                continue;
            };
            if existing.iter().any(|e| e.get(field) == Some(value)) {
                return Err(RepositoryError::Uniqueness {
                    field: field.to_string(),
                });
            }
        }

        let id = existing.len() as u64 + 1;
        item.insert("id".to_string(), Value::from(id));
        existing.push(item.clone());

        if let Err(e) = self.store.update_collection(&self.name, &existing).await {
            logger::log_error(&format!("[Repository:{}] create_one failed: {e}", self.name));
            return Err(e.into());
        }

        Ok(item)
    }
}

fn matches_filter(item: &Entity, filter: &Filter) -> bool {
    filter
        .iter()
        .all(|(field, expected)| item.get(field) == Some(expected))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{StoreError, ValidationReason};
    use serde_json::json;

    fn obj(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    fn user_schema() -> Schema {
        Schema::new()
            .field("username", FieldRule::new(FieldKind::String).required().unique())
            .field("password", FieldRule::new(FieldKind::String).required())
    }

    fn repo(dir: &tempfile::TempDir) -> Repository {
        let store = Arc::new(FileStore::new(dir.path()));
        Repository::new("users", user_schema(), store)
    }

    async fn seed(repo: &Repository) {
        for (name, role) in [("ann", "admin"), ("bob", "user"), ("cid", "user")] {
            repo.create_one(obj(json!({"username": name, "password": "pw", "role": role})))
                .await
                .unwrap();
        }
    }

    #[tokio::test]
    async fn test_find_without_filter_returns_all_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let repo = repo(&dir);
        seed(&repo).await;

        let all = repo.find(None).await;
        let names: Vec<_> = all.iter().map(|e| e["username"].clone()).collect();
        assert_eq!(names, vec![json!("ann"), json!("bob"), json!("cid")]);
        assert_eq!(repo.find(Some(&Filter::new())).await, all);
    }

    #[tokio::test]
    async fn test_find_filters_by_every_key() {
        let dir = tempfile::tempdir().unwrap();
        let repo = repo(&dir);
        seed(&repo).await;

        let users = repo.find(Some(&obj(json!({"role": "user"})))).await;
        assert_eq!(users.len(), 2);
        assert_eq!(users[0]["username"], json!("bob"));
        assert_eq!(users[1]["username"], json!("cid"));

        let one = repo
            .find(Some(&obj(json!({"role": "user", "username": "cid"}))))
            .await;
        assert_eq!(one.len(), 1);
        assert_eq!(one[0]["id"], json!(3));

        assert!(repo
            .find(Some(&obj(json!({"role": "user", "username": "ann"}))))
            .await
            .is_empty());
        // A filter on a field nobody has matches nothing
        assert!(repo.find(Some(&obj(json!({"team": null})))).await.is_empty());
    }

    #[tokio::test]
    async fn test_find_on_empty_collection() {
        let dir = tempfile::tempdir().unwrap();
        let repo = repo(&dir);
        assert!(repo.find(Some(&obj(json!({"role": "user"})))).await.is_empty());
        assert!(repo.find(None).await.is_empty());
    }

    #[tokio::test]
    async fn test_find_by_id_and_find_one() {
        let dir = tempfile::tempdir().unwrap();
        let repo = repo(&dir);
        seed(&repo).await;

        assert_eq!(repo.find_by_id(2).await.unwrap()["username"], json!("bob"));
        assert!(repo.find_by_id(42).await.is_none());
        assert_eq!(
            repo.find_one(&obj(json!({"role": "user"}))).await.unwrap()["id"],
            json!(2)
        );
        assert!(repo.find_one(&obj(json!({"role": "root"}))).await.is_none());
    }

    #[tokio::test]
    async fn test_create_rejects_missing_username() {
        let dir = tempfile::tempdir().unwrap();
        let repo = repo(&dir);

        let err = repo
            .create_one(obj(json!({"password": "pw"})))
            .await
            .unwrap_err();
        match err {
            RepositoryError::Validation(e) => {
                assert_eq!(e.field, "username");
                assert_eq!(e.reason, ValidationReason::Missing);
            }
            other => panic!("expected validation error, got {other:?}"),
        }
        assert!(!dir.path().join("users.json").exists());
    }

    #[tokio::test]
    async fn test_create_rejects_duplicate_unique_field() {
        let dir = tempfile::tempdir().unwrap();
        let repo = repo(&dir);

        let first = repo
            .create_one(obj(json!({"username": "ann", "password": "a"})))
            .await
            .unwrap();
        let err = repo
            .create_one(obj(json!({"username": "ann", "password": "b"})))
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Uniqueness { ref field } if field == "username"));

        assert_eq!(repo.find(None).await, vec![first]);
    }

    #[tokio::test]
    async fn test_create_refuses_to_overwrite_corrupt_collection() {
        let dir = tempfile::tempdir().unwrap();
        let repo = repo(&dir);
        let path = dir.path().join("users.json");
        let truncated = r#"[{"id":1,"username":"ann","password":"a"},{"id":2,"username":"bob","#;
        std::fs::write(&path, truncated).unwrap();

        let err = repo
            .create_one(obj(json!({"username": "ann", "password": "z"})))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            RepositoryError::Store(StoreError::Corrupt { .. })
        ));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), truncated);

        // Reads still degrade to empty
        assert!(repo.find(None).await.is_empty());
    }

    #[tokio::test]
    async fn test_sequential_creates_assign_increasing_ids() {
        let dir = tempfile::tempdir().unwrap();
        let repo = repo(&dir);

        for expected in 1..=3u64 {
            let created = repo
                .create_one(obj(json!({
                    "username": format!("user{expected}"),
                    "password": "pw",
                    "id": 99
                })))
                .await
                .unwrap();
            assert_eq!(created["id"], json!(expected));
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_creates_do_not_collide() {
        let dir = tempfile::tempdir().unwrap();
        let repo = Arc::new(repo(&dir));

        let mut tasks = tokio::task::JoinSet::new();
        for i in 0..16 {
            let repo = Arc::clone(&repo);
            tasks.spawn(async move {
                repo.create_one(obj(json!({"username": format!("u{i}"), "password": "pw"})))
                    .await
                    .unwrap()
            });
        }

        let mut ids = Vec::new();
        while let Some(created) = tasks.join_next().await {
            ids.push(created.unwrap()["id"].as_u64().unwrap());
        }
        ids.sort_unstable();
        assert_eq!(ids, (1..=16).collect::<Vec<_>>());
        assert_eq!(repo.find(None).await.len(), 16);
    }

    #[tokio::test]
    async fn test_each_repository_uses_its_own_collection() {
        let dir = tempfile::tempdir().unwrap();
        let store = Arc::new(FileStore::new(dir.path()));
        let users = Repository::new("users", user_schema(), Arc::clone(&store));
        let notes = Repository::new("notes", Schema::new(), store);

        users
            .create_one(obj(json!({"username": "ann", "password": "pw"})))
            .await
            .unwrap();
        notes.create_one(obj(json!({"text": "hi"}))).await.unwrap();

        assert_eq!(users.find(None).await.len(), 1);
        assert_eq!(notes.find(None).await[0]["id"], json!(1));
        assert!(dir.path().join("notes.json").exists());
    }
}
