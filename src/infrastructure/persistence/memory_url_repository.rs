//! In-memory implementation of the URL record store.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;

use crate::domain::entities::{NewUrlRecord, UrlRecord};
use crate::domain::repositories::{StorageError, UrlRepository};

#[derive(Debug, Default)]
struct Tables {
    by_alias: HashMap<String, UrlRecord>,
    /// original URL -> alias
    by_original_url: HashMap<String, String>,
    next_id: i64,
}

/// Process-local record store.
///
/// Both indexes live behind one lock so the alias and original URL
/// uniqueness checks and the insert happen atomically. Contents are lost on
/// restart.
#[derive(Debug, Default)]
pub struct InMemoryUrlRepository {
    tables: RwLock<Tables>,
}

impl InMemoryUrlRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UrlRepository for InMemoryUrlRepository {
    async fn insert(&self, new_record: NewUrlRecord) -> Result<UrlRecord, StorageError> {
        let mut tables = self.tables.write().await;

        if tables.by_alias.contains_key(&new_record.short_alias) {
            return Err(StorageError::alias_conflict());
        }
        if tables
            .by_original_url
            .contains_key(&new_record.original_url)
        {
            return Err(StorageError::original_url_conflict());
        }

        tables.next_id += 1;
        let record = UrlRecord::new(
            tables.next_id,
            new_record.original_url,
            new_record.short_alias,
            0,
            Utc::now(),
        );

        tables
            .by_original_url
            .insert(record.original_url.clone(), record.short_alias.clone());
        tables
            .by_alias
            .insert(record.short_alias.clone(), record.clone());

        Ok(record)
    }

    async fn find_by_alias(&self, alias: &str) -> Result<Option<UrlRecord>, StorageError> {
        Ok(self.tables.read().await.by_alias.get(alias).cloned())
    }

    async fn find_by_original_url(
        &self,
        original_url: &str,
    ) -> Result<Option<UrlRecord>, StorageError> {
        let tables = self.tables.read().await;
        Ok(tables
            .by_original_url
            .get(original_url)
            .and_then(|alias| tables.by_alias.get(alias))
            .cloned())
    }

    async fn find_all(&self) -> Result<Vec<UrlRecord>, StorageError> {
        let mut records: Vec<UrlRecord> =
            self.tables.read().await.by_alias.values().cloned().collect();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(records)
    }

    async fn delete_by_alias(&self, alias: &str) -> Result<bool, StorageError> {
        let mut tables = self.tables.write().await;

        match tables.by_alias.remove(alias) {
            Some(record) => {
                tables.by_original_url.remove(&record.original_url);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn health_check(&self) -> Result<(), StorageError> {
        Ok(())
    }
}
