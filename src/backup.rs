use crate::models::ImportResponse;
use crate::storage::{Store, StoreError};
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{error, info};

/// Recorded in every export. Restore does not branch on it yet.
pub const BACKUP_VERSION: &str = "1.0";

#[derive(Debug, Error)]
pub enum BackupError {
    #[error("could not read the backup file: {0}")]
    Parse(#[source] serde_json::Error),
    #[error("invalid backup file: `subscriptions` must be an array")]
    Format,
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupDocument {
    pub subscriptions: Vec<Value>,
    pub version: String,
    pub exported_at: String,
}

pub fn export_document(subscriptions: Vec<Value>, now: DateTime<Utc>) -> BackupDocument {
    BackupDocument {
        subscriptions,
        version: BACKUP_VERSION.to_string(),
        exported_at: now.to_rfc3339_opts(SecondsFormat::Millis, true),
    }
}

/// Exports the stored records as they are, so a restore gives back the full
/// document even when some records cannot be decoded.
pub async fn export(store: &Store, now: DateTime<Utc>) -> BackupDocument {
    export_document(store.raw_records().await, now)
}

pub fn backup_file_name(date: NaiveDate) -> String {
    format!("subtracker-backup-{}.json", date.format("%Y-%m-%d"))
}

/// Extracts the `subscriptions` array. Records are not checked individually.
pub fn parse_backup(text: &str) -> Result<Vec<Value>, BackupError> {
    let document: Value = serde_json::from_str(text).map_err(BackupError::Parse)?;
    match document.get("subscriptions") {
        Some(Value::Array(records)) => Ok(records.clone()),
        _ => Err(BackupError::Format),
    }
}

/// Replaces the stored list with the document's records. The store is left
/// untouched when the document is rejected.
pub async fn restore(store: &mut Store, text: &str) -> Result<ImportResponse, BackupError> {
    let records = match parse_backup(text) {
        Ok(records) => records,
        Err(err) => {
            error!("import rejected: {err}");
            return Err(err);
        }
    };
    store.replace_all(&records).await?;
    info!(count = records.len(), "restored subscriptions from backup");
    Ok(ImportResponse {
        imported: records.len(),
        reload_required: true,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Cycle, Subscription};
    use crate::storage::KvStore;
    use serde_json::json;

    fn sample() -> Vec<Subscription> {
        vec![
            Subscription {
                id: "a".to_string(),
                name: "Music".to_string(),
                price: 9.99,
                currency: "EUR".to_string(),
                cycle: Cycle::Monthly,
                date: NaiveDate::from_ymd_opt(2024, 6, 12).unwrap(),
                category: Some("Entertainment".to_string()),
            },
            Subscription {
                id: "b".to_string(),
                name: "Domain".to_string(),
                price: 15.0,
                currency: "USD".to_string(),
                cycle: Cycle::Yearly,
                date: NaiveDate::from_ymd_opt(2025, 1, 3).unwrap(),
                category: None,
            },
        ]
    }

    #[tokio::test]
    async fn export_then_restore_gives_back_the_list() {
        let mut source = Store::new(KvStore::in_memory());
        for sub in sample() {
            source.save(&sub).await.unwrap();
        }
        let document = export(&source, Utc::now()).await;
        let text = serde_json::to_string_pretty(&document).unwrap();

        let mut target = Store::new(KvStore::in_memory());
        let outcome = restore(&mut target, &text).await.unwrap();
        assert_eq!(outcome.imported, 2);
        assert!(outcome.reload_required);
        assert_eq!(target.get_all().await, sample());
    }

    #[tokio::test]
    async fn undecodable_records_survive_export_and_restore() {
        let mut source = Store::new(KvStore::in_memory());
        let legacy = json!({
            "id": "legacy", "name": "Old plan", "price": 4,
            "cycle": "monthly", "date": "01/02/2024"
        });
        source
            .replace_all(&[serde_json::to_value(&sample()[0]).unwrap(), legacy.clone()])
            .await
            .unwrap();
        assert_eq!(source.get_all().await.len(), 1);

        let document = export(&source, Utc::now()).await;
        assert_eq!(document.subscriptions.len(), 2);
        let text = serde_json::to_string(&document).unwrap();

        let mut target = Store::new(KvStore::in_memory());
        let outcome = restore(&mut target, &text).await.unwrap();
        assert_eq!(outcome.imported, 2);
        let raw = target.raw_records().await;
        assert_eq!(raw.len(), 2);
        assert_eq!(raw[1], legacy);
    }

    #[tokio::test]
    async fn non_array_subscriptions_is_rejected_without_writing() {
        let mut store = Store::new(KvStore::in_memory());
        store.save(&sample()[0]).await.unwrap();

        let result = restore(&mut store, r#"{"subscriptions": "not-an-array"}"#).await;
        assert!(matches!(result, Err(BackupError::Format)));
        assert_eq!(store.get_all().await, vec![sample()[0].clone()]);
    }

    #[tokio::test]
    async fn invalid_json_is_a_read_failure() {
        let mut store = Store::new(KvStore::in_memory());
        let result = restore(&mut store, "not json at all").await;
        assert!(matches!(result, Err(BackupError::Parse(_))));
    }

    #[test]
    fn document_carries_version_and_timestamp() {
        let now = DateTime::parse_from_rfc3339("2024-06-10T08:30:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let value = serde_json::to_value(export_document(Vec::new(), now)).unwrap();
        assert_eq!(value["version"], "1.0");
        assert_eq!(value["exportedAt"], "2024-06-10T08:30:00.000Z");
        assert!(value["subscriptions"].as_array().unwrap().is_empty());
    }

    #[test]
    fn file_name_is_zero_padded() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();
        assert_eq!(backup_file_name(date), "subtracker-backup-2024-06-03.json");
    }
}
