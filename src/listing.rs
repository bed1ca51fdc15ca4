//! 后台内容列表：按类型分成三张表，行内提供编辑与删除入口。

use crate::content::{ContentItem, ContentKind};
use crate::error::StoreError;
use crate::store::ContentStore;

/// 缩略图加载失败时显示的占位图
pub const LIST_PLACEHOLDER: &str = "https://placehold.co/80x50/cccccc/ffffff?text=No+Img";
pub const EMPTY_MESSAGE: &str = "No content in this category.";
/// 缩略图、标题、日期、操作
pub const COLUMNS: usize = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListRow {
    pub id: String,
    pub title: String,
    pub thumbnail_url: String,
    pub date: String,
}

impl ListRow {
    fn from_item(item: &ContentItem) -> Self {
        Self {
            id: item.id.clone(),
            title: item.title.clone(),
            thumbnail_url: item.thumbnail_url.clone(),
            date: display_date(item),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ListTable {
    pub kind: ContentKind,
    pub rows: Vec<ListRow>,
}

impl ListTable {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// 三张表，顺序固定为文章、新闻、视频
pub struct ContentListView {
    pub tables: Vec<ListTable>,
}

impl ContentListView {
    /// 一次读取整个集合后按类型拆分，三张表互不影响
    pub async fn load(store: &ContentStore) -> Self {
        let items = store.load_all().await;
        Self::from_items(&items)
    }

    pub fn from_items(items: &[ContentItem]) -> Self {
        let tables = ContentKind::ALL
            .into_iter()
            .map(|kind| ListTable {
                kind,
                rows: items
                    .iter()
                    .filter(|item| item.kind() == kind)
                    .map(ListRow::from_item)
                    .collect(),
            })
            .collect();
        Self { tables }
    }

    pub fn table(&self, kind: ContentKind) -> Option<&ListTable> {
        self.tables.iter().find(|t| t.kind == kind)
    }
}

/// 删除前的确认步骤，只有显式确认才会真正删除
#[derive(Debug, Default)]
pub struct DeleteConfirmation {
    pending: Option<String>,
}

impl DeleteConfirmation {
    pub fn request(&mut self, id: impl Into<String>) {
        self.pending = Some(id.into());
    }

    pub fn pending(&self) -> Option<&str> {
        self.pending.as_deref()
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    /// 删除待确认的内容并关闭确认步骤；没有待确认项时返回 `false`
    pub async fn confirm(&mut self, store: &ContentStore) -> Result<bool, StoreError> {
        let Some(id) = self.pending.take() else {
            return Ok(false);
        };
        store.remove(&id).await?;
        tracing::info!(%id, "内容已删除");
        Ok(true)
    }
}

/// 列表与卡片上展示的日期
pub fn display_date(item: &ContentItem) -> String {
    item.date.format("%-m/%-d/%Y").to_string()
}
