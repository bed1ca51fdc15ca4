//! 前台浏览：标签页、分页卡片、详情弹窗导航以及首页的最新动态。

pub mod pagination;

use crate::content::{ContentItem, ContentKind, video};
use crate::listing::display_date;

use self::pagination::{PageLink, clamp_page, page_controls, paginate, total_pages};

pub const CARD_PLACEHOLDER: &str = "https://placehold.co/600x400/cccccc/ffffff?text=Error";
pub const MODAL_PLACEHOLDER: &str = "https://placehold.co/800x400/cccccc/ffffff?text=Image+Error";
pub const EMPTY_TAB_MESSAGE: &str = "No content posted yet.";
pub const EMPTY_FEED_MESSAGE: &str = "No updates have been posted yet.";
pub const INVALID_VIDEO_MESSAGE: &str = "Invalid video URL.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card {
    pub id: String,
    pub kind: ContentKind,
    pub title: String,
    pub description: String,
    pub thumbnail_url: String,
    pub date: String,
    /// 详情页链接；首页卡片跳到媒体页并自动打开
    pub link: String,
}

impl Card {
    pub fn from_item(item: &ContentItem) -> Self {
        Self {
            id: item.id.clone(),
            kind: item.kind(),
            title: item.title.clone(),
            description: item.description().to_string(),
            thumbnail_url: item.thumbnail_url.clone(),
            date: display_date(item),
            link: media_link(item.kind(), &item.id),
        }
    }

    pub fn call_to_action(&self) -> &'static str {
        match self.kind {
            ContentKind::Article => "Read More",
            ContentKind::News => "View",
            ContentKind::Video => "Watch Now",
        }
    }
}

/// 媒体页上打开某条内容的地址
pub fn media_link(kind: ContentKind, id: &str) -> String {
    format!("/media?tab={}&open_id={id}", kind.tab())
}

/// 媒体页请求参数解析后的结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowseRequest {
    pub tab: ContentKind,
    pub page: usize,
    pub open_id: Option<String>,
}

impl BrowseRequest {
    /// `tab` 缺失但 `open_id` 能找到内容时取该内容的类型；未知 tab 回退到第一个
    pub fn resolve(
        items: &[ContentItem],
        tab: Option<&str>,
        open_id: Option<&str>,
        page: Option<usize>,
    ) -> Self {
        let open_item = open_id
            .filter(|id| !id.is_empty())
            .and_then(|id| items.iter().find(|item| item.id == id));

        let tab = match tab.filter(|t| !t.is_empty()) {
            Some(tab) => ContentKind::from_tab(tab),
            None => open_item.map(ContentItem::kind),
        }
        .unwrap_or(ContentKind::ALL[0]);

        Self {
            tab,
            page: page.unwrap_or(1).max(1),
            open_id: open_item.map(|item| item.id.clone()),
        }
    }
}

/// 单个标签页的一页卡片
#[derive(Debug, Clone)]
pub struct TabPage {
    pub kind: ContentKind,
    pub cards: Vec<Card>,
    pub page: usize,
    pub total_pages: usize,
    pub controls: Vec<PageLink>,
}

impl TabPage {
    pub fn build(items: &[ContentItem], kind: ContentKind, page: usize, page_size: usize) -> Self {
        let filtered: Vec<&ContentItem> = items.iter().filter(|item| item.kind() == kind).collect();
        let total = total_pages(filtered.len(), page_size);
        let page = clamp_page(page, total);
        let cards = paginate(&filtered, page, page_size)
            .iter()
            .map(|item| Card::from_item(item))
            .collect();
        Self {
            kind,
            cards,
            page,
            total_pages: total,
            controls: page_controls(page, total),
        }
    }
}

/// 同类型内容的 id 列表上循环切换
#[derive(Debug, Clone)]
pub struct ModalNavigator {
    ids: Vec<String>,
}

impl ModalNavigator {
    pub fn for_kind(items: &[ContentItem], kind: ContentKind) -> Self {
        Self {
            ids: items
                .iter()
                .filter(|item| item.kind() == kind)
                .map(|item| item.id.clone())
                .collect(),
        }
    }

    /// 只有一条以上时才显示上一条 / 下一条
    pub fn enabled(&self) -> bool {
        self.ids.len() > 1
    }

    pub fn next(&self, current: &str) -> Option<&str> {
        let len = self.ids.len();
        if len == 0 {
            return None;
        }
        let index = self.position(current);
        Some(&self.ids[(index + 1) % len])
    }

    pub fn prev(&self, current: &str) -> Option<&str> {
        let len = self.ids.len();
        if len == 0 {
            return None;
        }
        let index = self.position(current);
        Some(&self.ids[(index + len - 1) % len])
    }

    /// 找不到当前 id 时按最后一条处理，下一条即第一条
    fn position(&self, current: &str) -> usize {
        self.ids
            .iter()
            .position(|id| id == current)
            .unwrap_or(self.ids.len() - 1)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModalBody {
    Written {
        title: String,
        /// 作者信息，为空时显示日期
        meta: String,
        main_image_url: String,
        content: String,
    },
    Video {
        embed_url: Option<String>,
    },
}

#[derive(Debug, Clone)]
pub struct ModalView {
    pub id: String,
    pub kind: ContentKind,
    pub body: ModalBody,
    pub prev_id: Option<String>,
    pub next_id: Option<String>,
}

impl ModalView {
    pub fn open(items: &[ContentItem], id: &str) -> Option<Self> {
        let item = items.iter().find(|item| item.id == id)?;
        let kind = item.kind();

        let body = match item.written() {
            Some(written) => ModalBody::Written {
                title: item.title.clone(),
                meta: if written.meta.is_empty() {
                    display_date(item)
                } else {
                    written.meta.clone()
                },
                main_image_url: written.main_image_url.clone(),
                content: written.content.clone(),
            },
            None => ModalBody::Video {
                embed_url: item
                    .video_url()
                    .and_then(video::extract_video_id)
                    .map(video::embed_url),
            },
        };

        let navigator = ModalNavigator::for_kind(items, kind);
        let (prev_id, next_id) = if navigator.enabled() {
            (
                navigator.prev(id).map(str::to_string),
                navigator.next(id).map(str::to_string),
            )
        } else {
            (None, None)
        };

        Some(Self {
            id: item.id.clone(),
            kind,
            body,
            prev_id,
            next_id,
        })
    }
}

/// 首页最新动态：最新的若干篇文章加若干条新闻
pub fn latest_updates(items: &[ContentItem], per_kind: usize) -> Vec<Card> {
    [ContentKind::Article, ContentKind::News]
        .into_iter()
        .flat_map(|kind| {
            items
                .iter()
                .filter(move |item| item.kind() == kind)
                .take(per_kind)
        })
        .map(Card::from_item)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{ContentBody, VideoBody, WrittenBody};
    use chrono::{TimeZone, Utc};

    fn item(id: &str, kind: ContentKind) -> ContentItem {
        let body = match kind {
            ContentKind::Video => ContentBody::Video(VideoBody {
                video_url: format!("https://www.youtube.com/watch?v={id}&t=3"),
                description: String::new(),
            }),
            other => ContentBody::written(
                other,
                WrittenBody {
                    main_image_url: "https://example.com/main.png".into(),
                    meta: String::new(),
                    content: "<p>body</p>".into(),
                    description: "body...".into(),
                },
            ),
        };
        ContentItem {
            id: id.into(),
            title: id.to_uppercase(),
            date: Utc.with_ymd_and_hms(2024, 12, 25, 0, 0, 0).unwrap(),
            thumbnail_url: String::new(),
            body,
        }
    }

    #[test]
    fn navigation_wraps_in_stored_order() {
        let items = vec![
            item("a", ContentKind::Article),
            item("n", ContentKind::News),
            item("b", ContentKind::Article),
            item("c", ContentKind::Article),
        ];
        let nav = ModalNavigator::for_kind(&items, ContentKind::Article);
        assert!(nav.enabled());
        assert_eq!(nav.next("c"), Some("a"));
        assert_eq!(nav.prev("a"), Some("c"));
        assert_eq!(nav.next("a"), Some("b"));

        let single = ModalNavigator::for_kind(&items, ContentKind::News);
        assert!(!single.enabled());
        let view = ModalView::open(&items, "n").unwrap();
        assert_eq!(view.prev_id, None);
        assert_eq!(view.next_id, None);
    }

    #[test]
    fn modal_bodies() {
        let items = vec![item("abc", ContentKind::Video), item("a", ContentKind::Article)];
        let video = ModalView::open(&items, "abc").unwrap();
        assert_eq!(
            video.body,
            ModalBody::Video {
                embed_url: Some("https://www.youtube.com/embed/abc?autoplay=1".into())
            }
        );

        let article = ModalView::open(&items, "a").unwrap();
        match article.body {
            ModalBody::Written { meta, .. } => assert_eq!(meta, "12/25/2024"),
            other => panic!("unexpected body {other:?}"),
        }
        assert!(ModalView::open(&items, "missing").is_none());
    }

    #[test]
    fn request_resolution() {
        let items = vec![item("v1", ContentKind::Video), item("n1", ContentKind::News)];

        let r = BrowseRequest::resolve(&items, None, Some("v1"), None);
        assert_eq!(r.tab, ContentKind::Video);
        assert_eq!(r.open_id.as_deref(), Some("v1"));

        let r = BrowseRequest::resolve(&items, Some("bogus"), None, Some(0));
        assert_eq!(r.tab, ContentKind::Article);
        assert_eq!(r.page, 1);

        let r = BrowseRequest::resolve(&items, Some("news"), Some("missing"), Some(2));
        assert_eq!(r.tab, ContentKind::News);
        assert_eq!(r.open_id, None);
        assert_eq!(r.page, 2);
    }

    #[test]
    fn tab_page_cards() {
        let items: Vec<_> = (0..50)
            .map(|i| item(&format!("a{i}"), ContentKind::Article))
            .chain([item("v", ContentKind::Video)])
            .collect();
        let page = TabPage::build(&items, ContentKind::Article, 3, 24);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.cards.len(), 2);
        assert_eq!(page.cards[0].id, "a48");
        assert_eq!(page.cards[0].call_to_action(), "Read More");

        let videos = TabPage::build(&items, ContentKind::Video, 1, 24);
        assert_eq!(videos.cards[0].call_to_action(), "Watch Now");
        assert!(videos.controls.is_empty());

        let past_end = TabPage::build(&items, ContentKind::Article, 7, 24);
        assert_eq!(past_end.page, 3);
        assert_eq!(past_end.cards.len(), 2);

        let huge = TabPage::build(&items, ContentKind::Article, usize::MAX, 24);
        assert_eq!(huge.page, 3);
        assert_eq!(huge.cards[0].id, "a48");
    }

    #[test]
    fn latest_feed_takes_two_of_each() {
        let items = vec![
            item("n1", ContentKind::News),
            item("a1", ContentKind::Article),
            item("v1", ContentKind::Video),
            item("a2", ContentKind::Article),
            item("a3", ContentKind::Article),
            item("n2", ContentKind::News),
            item("n3", ContentKind::News),
        ];
        let feed = latest_updates(&items, 2);
        let ids: Vec<_> = feed.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, ["a1", "a2", "n1", "n2"]);
        assert_eq!(feed[2].link, "/media?tab=news&open_id=n1");
        assert!(latest_updates(&[], 2).is_empty());
    }
}
