use std::sync::Arc;

use crate::content::{ContentItem, ContentKind};
use crate::error::StoreError;
use crate::storage::KeyValueBackend;

/// 内容集合的类型化访问器
///
/// 整个集合以一个 JSON 数组保存在单个键下。每次修改都会整体重写该值，
/// 没有事务与并发控制：多个写者同时修改时后写者覆盖前者。
#[derive(Clone)]
pub struct ContentStore {
    backend: Arc<dyn KeyValueBackend>,
    key: String,
}

impl ContentStore {
    pub fn new(backend: Arc<dyn KeyValueBackend>, key: impl Into<String>) -> Self {
        Self {
            backend,
            key: key.into(),
        }
    }

    /// 读取全部内容；值不存在、读取失败或 JSON 无效时返回空集合
    pub async fn load_all(&self) -> Vec<ContentItem> {
        let raw = match self.backend.get(&self.key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                tracing::warn!("读取内容集合失败：{e}");
                return Vec::new();
            }
        };

        serde_json::from_str(&raw).unwrap_or_else(|e| {
            tracing::warn!("内容集合 JSON 无效，按空集合处理：{e}");
            Vec::new()
        })
    }

    pub async fn filter_by_type(&self, kind: ContentKind) -> Vec<ContentItem> {
        self.load_all()
            .await
            .into_iter()
            .filter(|item| item.kind() == kind)
            .collect()
    }

    pub async fn find_by_id(&self, id: &str) -> Option<ContentItem> {
        self.load_all().await.into_iter().find(|item| item.id == id)
    }

    /// 同 id 原位替换，否则插入到最前
    pub async fn upsert(&self, item: ContentItem) -> Result<(), StoreError> {
        let mut items = self.load_all().await;
        match items.iter().position(|existing| existing.id == item.id) {
            Some(index) => items[index] = item,
            None => items.insert(0, item),
        }
        self.persist(&items).await
    }

    pub async fn remove(&self, id: &str) -> Result<(), StoreError> {
        let mut items = self.load_all().await;
        items.retain(|item| item.id != id);
        self.persist(&items).await
    }

    async fn persist(&self, items: &[ContentItem]) -> Result<(), StoreError> {
        let raw = serde_json::to_string(items)?;
        self.backend.set(&self.key, &raw).await?;
        tracing::debug!(count = items.len(), "内容集合已写回");
        Ok(())
    }
}
