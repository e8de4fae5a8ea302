use crate::models::{Category, Subscription, Theme};
use chrono::Utc;
use serde_json::Value;
use std::{collections::HashMap, io, path::PathBuf};
use thiserror::Error;
use tokio::fs;
use tracing::{error, warn};
use uuid::Uuid;

pub const SUBSCRIPTIONS_KEY: &str = "subtracker_data";
pub const CATEGORIES_KEY: &str = "subtracker_categories";
pub const THEME_KEY: &str = "subtracker_theme";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to write {key}: {source}")]
    Write {
        key: &'static str,
        #[source]
        source: io::Error,
    },
    #[error("failed to encode {key}: {source}")]
    Encode {
        key: &'static str,
        #[source]
        source: serde_json::Error,
    },
    #[error("category '{0}' already exists")]
    DuplicateCategory(String),
    #[error("category name must not be empty")]
    BlankCategory,
}

#[derive(Debug)]
enum Backend {
    Dir(PathBuf),
    Memory(HashMap<String, String>),
}

/// String values under fixed keys. The directory backend keeps one file per key.
#[derive(Debug)]
pub struct KvStore {
    backend: Backend,
}

impl KvStore {
    pub async fn open(dir: impl Into<PathBuf>) -> io::Result<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir).await?;
        Ok(Self {
            backend: Backend::Dir(dir),
        })
    }

    pub fn in_memory() -> Self {
        Self {
            backend: Backend::Memory(HashMap::new()),
        }
    }

    pub async fn get(&self, key: &str) -> io::Result<Option<String>> {
        match &self.backend {
            Backend::Dir(dir) => match fs::read_to_string(dir.join(key)).await {
                Ok(text) => Ok(Some(text)),
                Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
                Err(err) => Err(err),
            },
            Backend::Memory(map) => Ok(map.get(key).cloned()),
        }
    }

    pub async fn set(&mut self, key: &str, value: String) -> io::Result<()> {
        match &mut self.backend {
            Backend::Dir(dir) => fs::write(dir.join(key), value).await,
            Backend::Memory(map) => {
                map.insert(key.to_string(), value);
                Ok(())
            }
        }
    }

    pub async fn remove(&mut self, key: &str) -> io::Result<()> {
        match &mut self.backend {
            Backend::Dir(dir) => match fs::remove_file(dir.join(key)).await {
                Err(err) if err.kind() != io::ErrorKind::NotFound => Err(err),
                _ => Ok(()),
            },
            Backend::Memory(map) => {
                map.remove(key);
                Ok(())
            }
        }
    }
}

pub fn default_categories() -> Vec<Category> {
    vec![
        Category::new("Entertainment", "#ff7675"),
        Category::new("Software", "#6c5ce7"),
        Category::new("Home", "#00cec9"),
        Category::new("Health", "#fdcb6e"),
        Category::new("Other", "#b2bec3"),
    ]
}

/// Time component in base 36 followed by a random tail. Not collision-proof.
pub fn generate_id() -> String {
    let millis = Utc::now().timestamp_millis().max(0) as u64;
    let random = Uuid::new_v4().simple().to_string();
    format!("{}{}", to_base36(millis), &random[..11])
}

fn to_base36(mut value: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if value == 0 {
        return "0".to_string();
    }
    let mut out = Vec::new();
    while value > 0 {
        out.push(DIGITS[(value % 36) as usize]);
        value /= 36;
    }
    out.reverse();
    String::from_utf8_lossy(&out).into_owned()
}

/// Whole-document persistence for subscriptions, categories and the theme.
///
/// Every mutation re-reads the stored document and overwrites it in full.
/// Read failures never reach the caller: they are logged and treated as empty.
#[derive(Debug)]
pub struct Store {
    kv: KvStore,
}

impl Store {
    pub fn new(kv: KvStore) -> Self {
        Self { kv }
    }

    pub async fn get_all(&self) -> Vec<Subscription> {
        self.read_records()
            .await
            .into_iter()
            .filter_map(|record| match serde_json::from_value::<Subscription>(record) {
                Ok(sub) => Some(sub),
                Err(err) => {
                    warn!("skipping malformed subscription record: {err}");
                    None
                }
            })
            .collect()
    }

    /// Upsert by id: replaces in place when the id exists, appends otherwise.
    pub async fn save(&mut self, sub: &Subscription) -> Result<(), StoreError> {
        let encoded = serde_json::to_value(sub).map_err(|source| StoreError::Encode {
            key: SUBSCRIPTIONS_KEY,
            source,
        })?;
        let mut records = self.read_records().await;
        match records.iter().position(|record| record_id(record) == Some(sub.id.as_str())) {
            Some(index) => records[index] = encoded,
            None => records.push(encoded),
        }
        self.write_records(&records).await
    }

    pub async fn delete(&mut self, id: &str) -> Result<(), StoreError> {
        let mut records = self.read_records().await;
        records.retain(|record| record_id(record) != Some(id));
        self.write_records(&records).await
    }

    /// The stored subscription document as raw records, undecodable ones included.
    pub(crate) async fn raw_records(&self) -> Vec<Value> {
        self.read_records().await
    }

    /// Overwrites the subscription document verbatim. Used by restore.
    pub async fn replace_all(&mut self, records: &[Value]) -> Result<(), StoreError> {
        self.write_records(records).await
    }

    pub async fn categories(&self) -> Vec<Category> {
        let text = match self.kv.get(CATEGORIES_KEY).await {
            Ok(Some(text)) => text,
            Ok(None) => return default_categories(),
            Err(err) => {
                error!("failed to read categories: {err}");
                return default_categories();
            }
        };
        match serde_json::from_str(&text) {
            Ok(categories) => categories,
            Err(err) => {
                error!("failed to parse categories: {err}");
                default_categories()
            }
        }
    }

    pub async fn add_category(&mut self, name: &str, color: &str) -> Result<Vec<Category>, StoreError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(StoreError::BlankCategory);
        }
        let mut categories = self.categories().await;
        let lowered = name.to_lowercase();
        if categories.iter().any(|category| category.name.to_lowercase() == lowered) {
            return Err(StoreError::DuplicateCategory(name.to_string()));
        }
        categories.push(Category::new(name, color.trim()));
        self.write_categories(&categories).await?;
        Ok(categories)
    }

    /// Subscriptions that reference the removed name are left as they are.
    pub async fn delete_category(&mut self, name: &str) -> Result<Vec<Category>, StoreError> {
        let mut categories = self.categories().await;
        categories.retain(|category| category.name != name);
        self.write_categories(&categories).await?;
        Ok(categories)
    }

    pub async fn theme(&self) -> Theme {
        match self.kv.get(THEME_KEY).await {
            Ok(Some(value)) if value.trim() == "light" => Theme::Light,
            Ok(_) => Theme::Dark,
            Err(err) => {
                error!("failed to read theme: {err}");
                Theme::Dark
            }
        }
    }

    pub async fn set_theme(&mut self, theme: Theme) -> Result<(), StoreError> {
        let result = match theme {
            Theme::Light => self.kv.set(THEME_KEY, "light".to_string()).await,
            Theme::Dark => self.kv.remove(THEME_KEY).await,
        };
        result.map_err(|source| StoreError::Write {
            key: THEME_KEY,
            source,
        })
    }

    async fn read_records(&self) -> Vec<Value> {
        let text = match self.kv.get(SUBSCRIPTIONS_KEY).await {
            Ok(Some(text)) if !text.trim().is_empty() => text,
            Ok(_) => return Vec::new(),
            Err(err) => {
                error!("failed to read subscriptions: {err}");
                return Vec::new();
            }
        };
        match serde_json::from_str::<Value>(&text) {
            Ok(Value::Array(records)) => records,
            Ok(_) => {
                error!("stored subscriptions are not a JSON array");
                Vec::new()
            }
            Err(err) => {
                error!("failed to parse subscriptions: {err}");
                Vec::new()
            }
        }
    }

    async fn write_records(&mut self, records: &[Value]) -> Result<(), StoreError> {
        let payload = serde_json::to_string(records).map_err(|source| StoreError::Encode {
            key: SUBSCRIPTIONS_KEY,
            source,
        })?;
        self.kv
            .set(SUBSCRIPTIONS_KEY, payload)
            .await
            .map_err(|source| StoreError::Write {
                key: SUBSCRIPTIONS_KEY,
                source,
            })
    }

    async fn write_categories(&mut self, categories: &[Category]) -> Result<(), StoreError> {
        let payload = serde_json::to_string(categories).map_err(|source| StoreError::Encode {
            key: CATEGORIES_KEY,
            source,
        })?;
        self.kv
            .set(CATEGORIES_KEY, payload)
            .await
            .map_err(|source| StoreError::Write {
                key: CATEGORIES_KEY,
                source,
            })
    }
}

fn record_id(record: &Value) -> Option<&str> {
    record.get("id").and_then(Value::as_str)
}
