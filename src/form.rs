//! 后台内容表单：新建 / 编辑两种模式，按内容类型切换字段，提交时组装内容并写入存储。

use chrono::{DateTime, Utc};

use crate::content::excerpt::description_from_html;
use crate::content::video;
use crate::content::{ContentBody, ContentItem, ContentKind, VideoBody, WrittenBody};
use crate::editor::EditorSurface;
use crate::error::SubmitError;
use crate::media::image_field::ImageFieldController;
use crate::store::ContentStore;

pub const THUMBNAIL_FIELD: &str = "thumbnail";
pub const MAIN_IMAGE_FIELD: &str = "main-image";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormMode {
    Create,
    Edit(String),
}

/// 文章与新闻共用一组字段，视频使用另一组
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldSet {
    Written,
    Video,
}

impl FieldSet {
    pub fn for_kind(kind: ContentKind) -> Self {
        if kind.is_video() {
            FieldSet::Video
        } else {
            FieldSet::Written
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmitControl {
    pub label: &'static str,
    pub disabled: bool,
}

pub struct AdminFormController {
    mode: FormMode,
    kind: ContentKind,
    title: String,
    author: String,
    video_url: String,
    pub editor: EditorSurface,
    pub thumbnail: ImageFieldController,
    pub main_image: ImageFieldController,
    submit: SubmitControl,
    excerpt_length: usize,
}

impl AdminFormController {
    pub fn new(excerpt_length: usize) -> Self {
        Self {
            mode: FormMode::Create,
            kind: ContentKind::Article,
            title: String::new(),
            author: String::new(),
            video_url: String::new(),
            editor: EditorSurface::default(),
            thumbnail: ImageFieldController::new(THUMBNAIL_FIELD),
            main_image: ImageFieldController::new(MAIN_IMAGE_FIELD),
            submit: SubmitControl {
                label: idle_label(&FormMode::Create),
                disabled: false,
            },
            excerpt_length,
        }
    }

    pub fn mode(&self) -> &FormMode {
        &self.mode
    }

    pub fn kind(&self) -> ContentKind {
        self.kind
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn video_url(&self) -> &str {
        &self.video_url
    }

    pub fn submit_control(&self) -> SubmitControl {
        self.submit
    }

    pub fn field_set(&self) -> FieldSet {
        FieldSet::for_kind(self.kind)
    }

    pub fn heading(&self) -> &'static str {
        match self.mode {
            FormMode::Create => "Create New Post",
            FormMode::Edit(_) => "Edit Post",
        }
    }

    pub fn thumbnail_label(&self) -> &'static str {
        match self.field_set() {
            FieldSet::Video => "Thumbnail Image (Optional)",
            FieldSet::Written => "Thumbnail Image",
        }
    }

    pub fn set_kind(&mut self, kind: ContentKind) {
        self.kind = kind;
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
    }

    pub fn set_author(&mut self, author: impl Into<String>) {
        self.author = author.into();
    }

    pub fn set_video_url(&mut self, url: impl Into<String>) {
        self.video_url = url.into();
    }

    /// 隐藏字段 post-id：非空即编辑模式
    pub fn set_editing(&mut self, id: Option<String>) {
        self.mode = match id.filter(|id| !id.is_empty()) {
            Some(id) => FormMode::Edit(id),
            None => FormMode::Create,
        };
        self.submit.label = idle_label(&self.mode);
    }

    /// 用已保存的内容填充表单并进入编辑模式
    pub fn populate(&mut self, item: &ContentItem) {
        self.reset();
        self.mode = FormMode::Edit(item.id.clone());
        self.kind = item.kind();
        self.title = item.title.clone();

        match &item.body {
            ContentBody::Video(body) => {
                self.video_url = body.video_url.clone();
            }
            ContentBody::Article(body) | ContentBody::News(body) => {
                self.author = body.meta.clone();
                self.editor.set_html(body.content.clone());
            }
        }

        self.thumbnail.populate(&item.thumbnail_url);
        if let Some(main_image) = item.main_image_url() {
            self.main_image.populate(main_image);
        }
        self.submit = SubmitControl {
            label: idle_label(&self.mode),
            disabled: false,
        };
    }

    /// 清空所有字段与图片预览，回到新建模式
    pub fn reset(&mut self) {
        self.mode = FormMode::Create;
        self.kind = ContentKind::Article;
        self.title.clear();
        self.author.clear();
        self.video_url.clear();
        self.editor.clear();
        self.thumbnail.reset();
        self.main_image.reset();
        self.submit = SubmitControl {
            label: idle_label(&self.mode),
            disabled: false,
        };
    }

    /// 提交表单
    ///
    /// 成功时写入存储并重置为新建模式；失败时恢复提交按钮，表单内容保持不变，
    /// 存储不会被部分写入。
    pub async fn submit(
        &mut self,
        store: &ContentStore,
        now: DateTime<Utc>,
    ) -> Result<ContentItem, SubmitError> {
        self.submit = SubmitControl {
            label: busy_label(&self.mode),
            disabled: true,
        };

        let result = match self.assemble(store, now).await {
            Ok(item) => store
                .upsert(item.clone())
                .await
                .map(|()| item)
                .map_err(SubmitError::from),
            Err(e) => Err(e),
        };

        match result {
            Ok(item) => {
                tracing::info!(id = %item.id, kind = %item.kind(), "内容已保存");
                self.reset();
                Ok(item)
            }
            Err(e) => {
                tracing::warn!("发布失败：{e}");
                self.submit = SubmitControl {
                    label: idle_label(&self.mode),
                    disabled: false,
                };
                Err(e)
            }
        }
    }

    async fn assemble(
        &self,
        store: &ContentStore,
        now: DateTime<Utc>,
    ) -> Result<ContentItem, SubmitError> {
        if self.title.trim().is_empty() {
            return Err(SubmitError::MissingTitle);
        }

        let id = match &self.mode {
            FormMode::Edit(id) => id.clone(),
            FormMode::Create => ContentItem::mint_id(self.kind, now),
        };

        let (thumbnail_url, body) = match self.field_set() {
            FieldSet::Video => {
                if self.video_url.is_empty() {
                    return Err(SubmitError::MissingVideoUrl);
                }
                let thumbnail_url = match non_empty(self.thumbnail.resolve().await) {
                    Some(url) => url,
                    None => self.fallback_video_thumbnail(store, &id).await?,
                };
                let body = ContentBody::Video(VideoBody {
                    video_url: self.video_url.clone(),
                    description: format!("A video titled \"{}\".", self.title),
                });
                (thumbnail_url, body)
            }
            FieldSet::Written => {
                let mut thumbnail_url = non_empty(self.thumbnail.resolve().await);
                let mut main_image_url = non_empty(self.main_image.resolve().await);

                // 编辑时未提供新图片则沿用旧值
                if matches!(self.mode, FormMode::Edit(_))
                    && let Some(existing) = store.find_by_id(&id).await
                {
                    if thumbnail_url.is_none() {
                        thumbnail_url = non_empty(Some(existing.thumbnail_url.clone()));
                    }
                    if main_image_url.is_none() {
                        main_image_url = non_empty(existing.main_image_url().map(str::to_string));
                    }
                }

                let thumbnail_url = thumbnail_url.ok_or(SubmitError::MissingRequiredImage)?;
                let content = self.editor.html().to_string();
                let body = ContentBody::written(
                    self.kind,
                    WrittenBody {
                        main_image_url: main_image_url.unwrap_or_else(|| thumbnail_url.clone()),
                        meta: self.author.clone(),
                        description: description_from_html(&content, self.excerpt_length),
                        content,
                    },
                );
                (thumbnail_url, body)
            }
        };

        Ok(ContentItem {
            id,
            title: self.title.clone(),
            date: now,
            thumbnail_url,
            body,
        })
    }

    /// 旧内容的缩略图 → 由视频 id 生成 → 失败
    async fn fallback_video_thumbnail(
        &self,
        store: &ContentStore,
        id: &str,
    ) -> Result<String, SubmitError> {
        if let Some(existing) = store.find_by_id(id).await
            && !existing.thumbnail_url.is_empty()
        {
            return Ok(existing.thumbnail_url);
        }
        video::extract_video_id(&self.video_url)
            .map(video::thumbnail_url)
            .ok_or(SubmitError::UnresolvableVideoThumbnail)
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}

fn idle_label(mode: &FormMode) -> &'static str {
    match mode {
        FormMode::Create => "Publish Content",
        FormMode::Edit(_) => "Update Content",
    }
}

fn busy_label(mode: &FormMode) -> &'static str {
    match mode {
        FormMode::Create => "Publishing...",
        FormMode::Edit(_) => "Updating...",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::image_field::SourceMode;
    use crate::media::tests::png_upload;
    use crate::storage::MemoryBackend;
    use chrono::TimeZone;
    use std::sync::Arc;

    fn store() -> ContentStore {
        ContentStore::new(Arc::new(MemoryBackend::new()), "mediaContent")
    }

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    fn article_form() -> AdminFormController {
        let mut form = AdminFormController::new(120);
        form.set_kind(ContentKind::Article);
        form.set_title("Quarterly outlook");
        form.set_author("By Jane");
        form.editor.set_html("<p>Markets moved.</p>");
        form
    }

    #[tokio::test]
    async fn video_thumbnail_derived_from_url() {
        let store = store();
        let mut form = AdminFormController::new(120);
        form.set_kind(ContentKind::Video);
        form.set_title("Launch");
        form.set_video_url("https://www.youtube.com/watch?v=ABC123");

        let item = form.submit(&store, at(1_700_000_000)).await.unwrap();
        assert_eq!(item.id, "video-1700000000000");
        assert_eq!(item.thumbnail_url, "https://img.youtube.com/vi/ABC123/hqdefault.jpg");
        assert_eq!(item.description(), "A video titled \"Launch\".");
        assert_eq!(store.load_all().await, vec![item]);
        assert_eq!(form.mode(), &FormMode::Create);
    }

    #[tokio::test]
    async fn video_without_id_or_thumbnail_fails() {
        let store = store();
        let mut form = AdminFormController::new(120);
        form.set_kind(ContentKind::Video);
        form.set_title("Clip");
        form.set_video_url("https://youtu.be/ABC123");

        let err = form.submit(&store, at(1)).await.unwrap_err();
        assert!(matches!(err, SubmitError::UnresolvableVideoThumbnail));
        assert!(store.load_all().await.is_empty());

        form.set_video_url("");
        let err = form.submit(&store, at(1)).await.unwrap_err();
        assert!(matches!(err, SubmitError::MissingVideoUrl));
    }

    #[tokio::test]
    async fn editing_video_keeps_previous_thumbnail() {
        let store = store();
        let mut form = AdminFormController::new(120);
        form.set_kind(ContentKind::Video);
        form.set_title("Launch");
        form.set_video_url("https://www.youtube.com/watch?v=ABC123");
        form.thumbnail.on_url_input("https://cdn.example.com/custom.jpg");
        let created = form.submit(&store, at(10)).await.unwrap();

        form.populate(&created);
        form.thumbnail.on_url_input("");
        form.set_video_url("https://youtu.be/other");
        let updated = form.submit(&store, at(20)).await.unwrap();
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.thumbnail_url, "https://cdn.example.com/custom.jpg");
        assert_eq!(updated.date, at(20));
    }

    #[tokio::test]
    async fn written_without_thumbnail_fails_and_keeps_form() {
        let store = store();
        let mut form = article_form();

        let err = form.submit(&store, at(5)).await.unwrap_err();
        assert!(matches!(err, SubmitError::MissingRequiredImage));
        assert!(store.load_all().await.is_empty());
        assert_eq!(
            form.submit_control(),
            SubmitControl { label: "Publish Content", disabled: false }
        );
        assert_eq!(form.title(), "Quarterly outlook");
        assert_eq!(form.editor.html(), "<p>Markets moved.</p>");
    }

    #[tokio::test]
    async fn written_item_main_image_defaults_to_thumbnail() {
        let store = store();
        let mut form = article_form();
        form.thumbnail.on_url_input("https://example.com/t.png");

        let item = form.submit(&store, at(5)).await.unwrap();
        assert_eq!(item.main_image_url(), Some("https://example.com/t.png"));
        let written = item.written().unwrap();
        assert_eq!(written.meta, "By Jane");
        assert_eq!(written.content, "<p>Markets moved.</p>");
        assert_eq!(written.description, "Markets moved....");
        assert_eq!(form.title(), "");
        assert_eq!(form.thumbnail.preview(), None);
    }

    #[tokio::test]
    async fn uploaded_thumbnail_is_embedded() {
        let store = store();
        let mut form = article_form();
        form.set_kind(ContentKind::News);
        form.thumbnail.set_mode(SourceMode::Upload);
        form.thumbnail.on_file_selected(png_upload("t.png")).await;

        let item = form.submit(&store, at(5)).await.unwrap();
        assert_eq!(item.kind(), ContentKind::News);
        assert!(item.thumbnail_url.starts_with("data:image/png;base64,"));
        assert_eq!(item.main_image_url(), Some(item.thumbnail_url.as_str()));
    }

    #[tokio::test]
    async fn edit_preserves_images_and_position_but_refreshes_date() {
        let store = store();
        let mut form = article_form();
        form.thumbnail.set_mode(SourceMode::Upload);
        form.thumbnail.on_file_selected(png_upload("t.png")).await;
        form.main_image.on_url_input("https://example.com/main.png");
        let first = form.submit(&store, at(100)).await.unwrap();

        let mut other = article_form();
        other.thumbnail.on_url_input("https://example.com/other.png");
        other.submit(&store, at(200)).await.unwrap();

        form.populate(&first);
        assert_eq!(form.heading(), "Edit Post");
        assert_eq!(form.submit_control().label, "Update Content");
        assert_eq!(form.thumbnail.mode(), SourceMode::Upload);
        form.main_image.on_url_input("");
        form.set_title("Quarterly outlook (revised)");

        let updated = form.submit(&store, at(300)).await.unwrap();
        assert_eq!(updated.id, first.id);
        assert_eq!(updated.thumbnail_url, first.thumbnail_url);
        assert_eq!(updated.main_image_url(), Some("https://example.com/main.png"));
        assert_eq!(updated.date, at(300));

        let all = store.load_all().await;
        assert_eq!(all.len(), 2);
        assert_eq!(all[1].id, first.id);
        assert_eq!(all[1].title, "Quarterly outlook (revised)");
    }

    #[tokio::test]
    async fn blank_title_is_rejected() {
        let store = store();
        let mut form = article_form();
        form.set_title("   ");
        form.thumbnail.on_url_input("https://example.com/t.png");
        assert!(matches!(
            form.submit(&store, at(1)).await,
            Err(SubmitError::MissingTitle)
        ));
    }

    #[test]
    fn field_set_follows_kind() {
        let mut form = AdminFormController::new(120);
        assert_eq!(form.field_set(), FieldSet::Written);
        assert_eq!(form.thumbnail_label(), "Thumbnail Image");
        form.set_kind(ContentKind::Video);
        assert_eq!(form.field_set(), FieldSet::Video);
        assert_eq!(form.thumbnail_label(), "Thumbnail Image (Optional)");
        form.set_editing(Some("video-1".into()));
        assert_eq!(form.mode(), &FormMode::Edit("video-1".into()));
        form.set_editing(Some(String::new()));
        assert_eq!(form.mode(), &FormMode::Create);
    }
}
