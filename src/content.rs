pub mod excerpt;
pub mod video;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 内容类型判别值
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Article,
    News,
    Video,
}

impl ContentKind {
    pub const ALL: [ContentKind; 3] = [ContentKind::Article, ContentKind::News, ContentKind::Video];

    pub fn as_str(self) -> &'static str {
        match self {
            ContentKind::Article => "article",
            ContentKind::News => "news",
            ContentKind::Video => "video",
        }
    }

    /// 前台标签页与 `tab` 查询参数使用的名称
    pub fn tab(self) -> &'static str {
        match self {
            ContentKind::Article => "articles",
            ContentKind::News => "news",
            ContentKind::Video => "videos",
        }
    }

    pub fn from_tab(tab: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.tab() == tab)
    }

    pub fn label(self) -> &'static str {
        match self {
            ContentKind::Article => "Article",
            ContentKind::News => "News",
            ContentKind::Video => "Video",
        }
    }

    pub fn is_video(self) -> bool {
        self == ContentKind::Video
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "article" => Ok(ContentKind::Article),
            "news" => Ok(ContentKind::News),
            "video" => Ok(ContentKind::Video),
            other => Err(format!("未知的内容类型：{other}")),
        }
    }
}

/// 文章与新闻共用的字段
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct WrittenBody {
    pub main_image_url: String,
    #[serde(default)]
    pub meta: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VideoBody {
    pub video_url: String,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ContentBody {
    Article(WrittenBody),
    News(WrittenBody),
    Video(VideoBody),
}

/// 持久化集合中的一条内容
///
/// 序列化后是扁平的 camelCase 对象，`type` 字段决定其余字段的形状。
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ContentItem {
    pub id: String,
    pub title: String,
    pub date: DateTime<Utc>,
    pub thumbnail_url: String,
    #[serde(flatten)]
    pub body: ContentBody,
}

impl ContentItem {
    /// `{type}-{毫秒时间戳}`
    pub fn mint_id(kind: ContentKind, now: DateTime<Utc>) -> String {
        format!("{}-{}", kind.as_str(), now.timestamp_millis())
    }

    pub fn kind(&self) -> ContentKind {
        match self.body {
            ContentBody::Article(_) => ContentKind::Article,
            ContentBody::News(_) => ContentKind::News,
            ContentBody::Video(_) => ContentKind::Video,
        }
    }

    pub fn description(&self) -> &str {
        match &self.body {
            ContentBody::Article(w) | ContentBody::News(w) => &w.description,
            ContentBody::Video(v) => &v.description,
        }
    }

    pub fn written(&self) -> Option<&WrittenBody> {
        match &self.body {
            ContentBody::Article(w) | ContentBody::News(w) => Some(w),
            ContentBody::Video(_) => None,
        }
    }

    pub fn video_url(&self) -> Option<&str> {
        match &self.body {
            ContentBody::Video(v) => Some(&v.video_url),
            _ => None,
        }
    }

    pub fn main_image_url(&self) -> Option<&str> {
        self.written().map(|w| w.main_image_url.as_str())
    }
}

impl ContentBody {
    pub fn written(kind: ContentKind, body: WrittenBody) -> Self {
        match kind {
            ContentKind::News => ContentBody::News(body),
            _ => ContentBody::Article(body),
        }
    }
}
