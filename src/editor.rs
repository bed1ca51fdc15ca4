//! 富文本编辑区：工具栏命令与可编辑 HTML。
//!
//! 浏览器端的 contenteditable 只负责交互，保存的始终是这里维护的 HTML。

pub mod resize;

use regex::Regex;
use std::ops::Range;
use std::sync::LazyLock;

use crate::content::excerpt;
use crate::error::EditorError;

static IMG_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<img([^>]*?)(/?>)").unwrap());
static STYLE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r#"\sstyle="([^"]*)""#).unwrap());

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorCommand {
    Bold,
    Italic,
    Underline,
    StrikeThrough,
    Heading(u8),
    Paragraph,
    OrderedList,
    UnorderedList,
    JustifyLeft,
    JustifyCenter,
    JustifyRight,
    CreateLink,
    InsertImage,
}

pub struct ToolbarButton {
    pub command: EditorCommand,
    pub title: &'static str,
    pub icon: &'static str,
}

impl EditorCommand {
    /// 按工具栏 `data-command` / `data-value` 解析
    pub fn parse(command: &str, value: Option<&str>) -> Option<Self> {
        let cmd = match command {
            "bold" => EditorCommand::Bold,
            "italic" => EditorCommand::Italic,
            "underline" => EditorCommand::Underline,
            "strikeThrough" => EditorCommand::StrikeThrough,
            "insertOrderedList" => EditorCommand::OrderedList,
            "insertUnorderedList" => EditorCommand::UnorderedList,
            "justifyLeft" => EditorCommand::JustifyLeft,
            "justifyCenter" => EditorCommand::JustifyCenter,
            "justifyRight" => EditorCommand::JustifyRight,
            "createLink" => EditorCommand::CreateLink,
            "insertImage" => EditorCommand::InsertImage,
            "formatBlock" => match value? {
                "p" => EditorCommand::Paragraph,
                "h1" => EditorCommand::Heading(1),
                "h2" => EditorCommand::Heading(2),
                "h3" => EditorCommand::Heading(3),
                _ => return None,
            },
            _ => return None,
        };
        Some(cmd)
    }

    pub fn data_command(self) -> &'static str {
        match self {
            EditorCommand::Bold => "bold",
            EditorCommand::Italic => "italic",
            EditorCommand::Underline => "underline",
            EditorCommand::StrikeThrough => "strikeThrough",
            EditorCommand::Heading(_) | EditorCommand::Paragraph => "formatBlock",
            EditorCommand::OrderedList => "insertOrderedList",
            EditorCommand::UnorderedList => "insertUnorderedList",
            EditorCommand::JustifyLeft => "justifyLeft",
            EditorCommand::JustifyCenter => "justifyCenter",
            EditorCommand::JustifyRight => "justifyRight",
            EditorCommand::CreateLink => "createLink",
            EditorCommand::InsertImage => "insertImage",
        }
    }

    pub fn data_value(self) -> Option<&'static str> {
        match self {
            EditorCommand::Heading(1) => Some("h1"),
            EditorCommand::Heading(2) => Some("h2"),
            EditorCommand::Heading(_) => Some("h3"),
            EditorCommand::Paragraph => Some("p"),
            _ => None,
        }
    }

    pub fn toolbar() -> Vec<ToolbarButton> {
        use EditorCommand::*;
        [
            (Bold, "Bold", "B"),
            (Italic, "Italic", "I"),
            (Underline, "Underline", "U"),
            (StrikeThrough, "Strikethrough", "S"),
            (Heading(1), "Heading 1", "H1"),
            (Heading(2), "Heading 2", "H2"),
            (Heading(3), "Heading 3", "H3"),
            (Paragraph, "Paragraph", "P"),
            (UnorderedList, "Bulleted list", "&bull;"),
            (OrderedList, "Numbered list", "1."),
            (JustifyLeft, "Align left", "&#8676;"),
            (JustifyCenter, "Align center", "&#8596;"),
            (JustifyRight, "Align right", "&#8677;"),
            (CreateLink, "Insert link", "&#128279;"),
            (InsertImage, "Insert image", "&#128247;"),
        ]
        .into_iter()
        .map(|(command, title, icon)| ToolbarButton { command, title, icon })
        .collect()
    }
}

/// 链接命令的地址输入：取消、留空或得到字符串 "null" 时放弃命令
pub fn prepare_link(prompt_result: Option<String>) -> Option<String> {
    prompt_result.filter(|url| !url.is_empty() && url != "null")
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditorSurface {
    html: String,
}

impl EditorSurface {
    pub fn new(html: impl Into<String>) -> Self {
        Self { html: html.into() }
    }

    pub fn html(&self) -> &str {
        &self.html
    }

    pub fn set_html(&mut self, html: impl Into<String>) {
        self.html = html.into();
    }

    pub fn clear(&mut self) {
        self.html.clear();
    }

    pub fn inner_text(&self) -> String {
        excerpt::inner_text(&self.html)
    }

    /// 对选区执行一条工具栏命令，返回内容是否发生变化
    ///
    /// `value` 是链接地址或图片数据；链接命令没有地址时不做任何事。
    pub fn exec(
        &mut self,
        command: EditorCommand,
        selection: Range<usize>,
        value: Option<&str>,
    ) -> Result<bool, EditorError> {
        self.check_selection(&selection)?;

        let (open, close) = match command {
            EditorCommand::InsertImage => {
                let Some(src) = value.filter(|v| !v.is_empty()) else {
                    return Ok(false);
                };
                self.insert_image(selection, src)?;
                return Ok(true);
            }
            EditorCommand::CreateLink => {
                let Some(href) = value.filter(|v| !v.is_empty()) else {
                    return Ok(false);
                };
                (format!(r#"<a href="{}">"#, attr_escape(href)), "</a>".to_string())
            }
            EditorCommand::Bold => ("<b>".into(), "</b>".into()),
            EditorCommand::Italic => ("<i>".into(), "</i>".into()),
            EditorCommand::Underline => ("<u>".into(), "</u>".into()),
            EditorCommand::StrikeThrough => ("<strike>".into(), "</strike>".into()),
            EditorCommand::Heading(level) => {
                let level = level.clamp(1, 6);
                (format!("<h{level}>"), format!("</h{level}>"))
            }
            EditorCommand::Paragraph => ("<p>".into(), "</p>".into()),
            EditorCommand::OrderedList => ("<ol><li>".into(), "</li></ol>".into()),
            EditorCommand::UnorderedList => ("<ul><li>".into(), "</li></ul>".into()),
            EditorCommand::JustifyLeft => align_wrapper("left"),
            EditorCommand::JustifyCenter => align_wrapper("center"),
            EditorCommand::JustifyRight => align_wrapper("right"),
        };

        // 行内格式需要非空选区
        if selection.is_empty() && command_is_inline(command) {
            return Ok(false);
        }

        self.html.insert_str(selection.end, &close);
        self.html.insert_str(selection.start, &open);
        Ok(true)
    }

    /// 在光标处插入图片，选区中原有的内容被替换
    pub fn insert_image(&mut self, selection: Range<usize>, src: &str) -> Result<(), EditorError> {
        self.check_selection(&selection)?;
        let tag = format!(r#"<img src="{}">"#, attr_escape(src));
        self.html.replace_range(selection, &tag);
        Ok(())
    }

    pub fn image_count(&self) -> usize {
        IMG_RE.find_iter(&self.html).count()
    }

    /// 把第 `index` 张图片的宽度写入其 style，高度随比例自动变化
    pub fn set_image_width(&mut self, index: usize, width: i32) -> Result<(), EditorError> {
        let caps = IMG_RE
            .captures_iter(&self.html)
            .nth(index)
            .ok_or(EditorError::NoSuchImage(index))?;
        let whole = caps.get(0).map(|m| m.range()).ok_or(EditorError::NoSuchImage(index))?;
        let attrs = caps.get(1).map_or("", |m| m.as_str());
        let close = caps.get(2).map_or(">", |m| m.as_str());

        let kept: Vec<String> = STYLE_RE
            .captures(attrs)
            .and_then(|c| c.get(1))
            .map(|m| {
                m.as_str()
                    .split(';')
                    .map(str::trim)
                    .filter(|decl| !decl.is_empty())
                    .filter(|decl| {
                        let prop = decl.split(':').next().unwrap_or("").trim();
                        prop != "width" && prop != "height"
                    })
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default();

        let mut style = kept.join("; ");
        if !style.is_empty() {
            style.push_str("; ");
        }
        style.push_str(&format!("width: {width}px; height: auto;"));

        let attrs_without_style = STYLE_RE.replace(attrs, "");
        let tag = format!(r#"<img{attrs_without_style} style="{style}"{close}"#);
        self.html.replace_range(whole, &tag);
        Ok(())
    }

    fn check_selection(&self, selection: &Range<usize>) -> Result<(), EditorError> {
        let invalid = EditorError::InvalidSelection {
            start: selection.start,
            end: selection.end,
        };
        if selection.start > selection.end
            || selection.end > self.html.len()
            || !self.html.is_char_boundary(selection.start)
            || !self.html.is_char_boundary(selection.end)
            || self.inside_tag(selection.start)
            || self.inside_tag(selection.end)
        {
            return Err(invalid);
        }
        Ok(())
    }

    fn inside_tag(&self, pos: usize) -> bool {
        let before = &self.html[..pos];
        match (before.rfind('<'), before.rfind('>')) {
            (Some(open), Some(close)) => open > close,
            (Some(_), None) => true,
            _ => false,
        }
    }
}

fn command_is_inline(command: EditorCommand) -> bool {
    matches!(
        command,
        EditorCommand::Bold
            | EditorCommand::Italic
            | EditorCommand::Underline
            | EditorCommand::StrikeThrough
            | EditorCommand::CreateLink
    )
}

fn align_wrapper(align: &str) -> (String, String) {
    (
        format!(r#"<div style="text-align: {align};">"#),
        "</div>".to_string(),
    )
}

fn attr_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
