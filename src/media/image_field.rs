//! 图片字段：用户可以填写图片地址，也可以上传文件并编码为内嵌数据。
//! 缩略图与正文主图各用一个实例。

use tokio::task::JoinHandle;

use crate::error::UploadError;
use crate::media::{self, Upload};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceMode {
    Url,
    Upload,
}

impl SourceMode {
    /// 表单单选框的取值，未知值按 url 处理
    pub fn from_form(value: &str) -> Self {
        match value {
            "upload" => SourceMode::Upload,
            _ => SourceMode::Url,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SourceMode::Url => "url",
            SourceMode::Upload => "upload",
        }
    }
}

#[derive(Debug)]
struct SelectedFile {
    generation: u64,
    upload: Upload,
    encoded: Option<String>,
}

/// 一次尚未完成的文件读取
pub struct PendingRead {
    generation: u64,
    handle: JoinHandle<Result<String, UploadError>>,
}

pub struct ReadOutcome {
    generation: u64,
    result: Result<String, UploadError>,
}

impl PendingRead {
    pub async fn wait(self) -> ReadOutcome {
        let result = match self.handle.await {
            Ok(result) => result,
            Err(e) => Err(UploadError::Read(e.to_string())),
        };
        ReadOutcome {
            generation: self.generation,
            result,
        }
    }
}

#[derive(Debug)]
pub struct ImageFieldController {
    name: String,
    mode: SourceMode,
    url_input: String,
    selected: Option<SelectedFile>,
    preview: Option<String>,
    generation: u64,
}

impl ImageFieldController {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            mode: SourceMode::Url,
            url_input: String::new(),
            selected: None,
            preview: None,
            generation: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mode(&self) -> SourceMode {
        self.mode
    }

    pub fn url_input(&self) -> &str {
        &self.url_input
    }

    pub fn preview(&self) -> Option<&str> {
        self.preview.as_deref()
    }

    pub fn has_selected_file(&self) -> bool {
        self.selected.is_some()
    }

    /// 只切换可见输入框，另一种输入的值保留
    pub fn set_mode(&mut self, mode: SourceMode) {
        self.mode = mode;
    }

    pub fn on_url_input(&mut self, value: &str) {
        self.url_input = value.to_owned();
        self.preview = if value.is_empty() {
            None
        } else {
            Some(value.to_owned())
        };
    }

    /// 记录选中的文件并开始异步编码，预览在 [`apply_read`] 之前保持不变
    ///
    /// [`apply_read`]: Self::apply_read
    pub fn select_file(&mut self, upload: Upload) -> PendingRead {
        self.generation += 1;
        let generation = self.generation;
        self.selected = Some(SelectedFile {
            generation,
            upload: upload.clone(),
            encoded: None,
        });
        PendingRead {
            generation,
            handle: tokio::spawn(media::read_as_data_url(upload)),
        }
    }

    /// 应用读取结果；被更新的选择取代的旧结果直接丢弃
    pub fn apply_read(&mut self, outcome: ReadOutcome) -> bool {
        if outcome.generation != self.generation {
            tracing::debug!(
                field = %self.name,
                stale = outcome.generation,
                current = self.generation,
                "丢弃过期的图片读取结果"
            );
            return false;
        }
        match outcome.result {
            Ok(encoded) => {
                if let Some(selected) = self.selected.as_mut() {
                    selected.encoded = Some(encoded.clone());
                }
                self.preview = Some(encoded);
                true
            }
            Err(e) => {
                tracing::warn!(field = %self.name, "读取图片失败：{e}");
                false
            }
        }
    }

    pub async fn on_file_selected(&mut self, upload: Upload) -> bool {
        let pending = self.select_file(upload);
        let outcome = pending.wait().await;
        self.apply_read(outcome)
    }

    /// 产出最终要保存的图片值
    ///
    /// url 模式原样返回输入框内容（可能为空）；upload 模式返回选中文件的
    /// 编码结果，没有选中文件时返回 `None`。空值表示“没有提供新图片”。
    pub async fn resolve(&self) -> Option<String> {
        match self.mode {
            SourceMode::Url => Some(self.url_input.clone()),
            SourceMode::Upload => {
                let selected = self.selected.as_ref()?;
                if let Some(encoded) = &selected.encoded
                    && selected.generation == self.generation
                {
                    return Some(encoded.clone());
                }
                match media::read_as_data_url(selected.upload.clone()).await {
                    Ok(encoded) => Some(encoded),
                    Err(e) => {
                        tracing::warn!(field = %self.name, "编码图片失败：{e}");
                        None
                    }
                }
            }
        }
    }

    /// 编辑已有内容时回填
    ///
    /// 内嵌数据值只能作为预览展示，没有对应的选中文件，此时 `resolve`
    /// 返回 `None`，调用方需要回退到旧值。
    pub fn populate(&mut self, existing: &str) {
        if existing.is_empty() {
            return;
        }
        if media::is_data_url(existing) {
            self.mode = SourceMode::Upload;
        } else {
            self.mode = SourceMode::Url;
            self.url_input = existing.to_owned();
        }
        self.preview = Some(existing.to_owned());
    }

    pub fn reset(&mut self) {
        self.mode = SourceMode::Url;
        self.url_input.clear();
        self.selected = None;
        self.preview = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::tests::png_upload;

    #[tokio::test]
    async fn url_mode_resolves_input_even_when_empty() {
        let mut field = ImageFieldController::new("thumbnail");
        assert_eq!(field.resolve().await.as_deref(), Some(""));

        field.on_url_input("https://example.com/a.png");
        assert_eq!(field.preview(), Some("https://example.com/a.png"));
        assert_eq!(
            field.resolve().await.as_deref(),
            Some("https://example.com/a.png")
        );

        field.on_url_input("");
        assert_eq!(field.preview(), None);
    }

    #[tokio::test]
    async fn upload_mode_without_file_resolves_none() {
        let mut field = ImageFieldController::new("thumbnail");
        field.on_url_input("https://example.com/a.png");
        field.set_mode(SourceMode::Upload);
        assert_eq!(field.resolve().await, None);

        // 切回 url 模式时输入框内容还在
        field.set_mode(SourceMode::Url);
        assert_eq!(field.url_input(), "https://example.com/a.png");
    }

    #[tokio::test]
    async fn selected_file_becomes_preview_and_value() {
        let mut field = ImageFieldController::new("main-image");
        field.set_mode(SourceMode::Upload);
        assert!(field.on_file_selected(png_upload("a.png")).await);

        let preview = field.preview().unwrap().to_string();
        assert!(preview.starts_with("data:image/png;base64,"));
        assert_eq!(field.resolve().await, Some(preview));
    }

    #[tokio::test]
    async fn preview_unchanged_until_read_completes() {
        let mut field = ImageFieldController::new("thumbnail");
        field.on_url_input("https://example.com/old.png");
        field.set_mode(SourceMode::Upload);

        let pending = field.select_file(png_upload("new.png"));
        assert_eq!(field.preview(), Some("https://example.com/old.png"));

        let outcome = pending.wait().await;
        assert!(field.apply_read(outcome));
        assert!(field.preview().unwrap().starts_with("data:image/png"));
    }

    #[tokio::test]
    async fn stale_read_is_discarded() {
        let mut field = ImageFieldController::new("thumbnail");
        field.set_mode(SourceMode::Upload);

        let first = field.select_file(png_upload("first.png"));
        let second = field.select_file(png_upload("second.png"));

        let second_outcome = second.wait().await;
        assert!(field.apply_read(second_outcome));
        let newest = field.preview().unwrap().to_string();

        let first_outcome = first.wait().await;
        assert!(!field.apply_read(first_outcome));
        assert_eq!(field.preview(), Some(newest.as_str()));
        assert_eq!(field.resolve().await, Some(newest));
    }

    #[tokio::test]
    async fn populate_with_data_value_selects_upload_without_file() {
        let mut field = ImageFieldController::new("thumbnail");
        field.populate("data:image/png;base64,AAAA");
        assert_eq!(field.mode(), SourceMode::Upload);
        assert_eq!(field.preview(), Some("data:image/png;base64,AAAA"));
        assert!(!field.has_selected_file());
        assert_eq!(field.resolve().await, None);
    }

    #[test]
    fn populate_with_url_fills_input() {
        let mut field = ImageFieldController::new("thumbnail");
        field.populate("https://example.com/t.png");
        assert_eq!(field.mode(), SourceMode::Url);
        assert_eq!(field.url_input(), "https://example.com/t.png");

        field.reset();
        assert_eq!(field.url_input(), "");
        assert_eq!(field.preview(), None);

        field.populate("");
        assert_eq!(field.preview(), None);
    }
}
