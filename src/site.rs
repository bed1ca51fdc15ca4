//! 前台页面：首页最新动态、媒体浏览与联系表单。

use axum::Router;
use axum::extract::{Form, Path, Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use serde::Deserialize;

use crate::admin::layout::html_escape;
use crate::browse::pagination::PageLink;
use crate::browse::{self, BrowseRequest, Card, ModalBody, ModalView, TabPage};
use crate::contact::{self, ContactMessage};
use crate::content::ContentKind;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct MediaQuery {
    pub tab: Option<String>,
    pub open_id: Option<String>,
    pub page: Option<usize>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(home))
        .route("/media", get(media_page))
        .route("/media/item/{id}", get(media_item))
        .route("/contact", get(contact_page).post(contact_submit))
}

// ── 路由处理 ──

pub async fn home(State(state): State<AppState>) -> Html<String> {
    let items = state.store.load_all().await;
    let cards = browse::latest_updates(&items, state.config.browse.latest_per_type);

    let grid = if cards.is_empty() {
        format!(r#"<p class="no-content-message">{}</p>"#, browse::EMPTY_FEED_MESSAGE)
    } else {
        cards.iter().map(|card| render_card(card, true)).collect()
    };

    let body = format!(
        r#"<section class="hero"><h1>{title}</h1></section>
        <section class="updates">
            <h2>Latest Updates</h2>
            <div class="updates-grid media-grid">{grid}</div>
            <a href="/media" class="btn">Browse all media</a>
        </section>"#,
        title = html_escape(&state.config.site.title),
    );
    Html(site_page(&state.config.site.title, "Home", &body, ""))
}

pub async fn media_page(State(state): State<AppState>, Query(query): Query<MediaQuery>) -> Html<String> {
    let items = state.store.load_all().await;
    let request = BrowseRequest::resolve(
        &items,
        query.tab.as_deref(),
        query.open_id.as_deref(),
        query.page,
    );
    let page = TabPage::build(&items, request.tab, request.page, state.config.browse.page_size);

    let tabs: String = ContentKind::ALL
        .into_iter()
        .map(|kind| {
            format!(
                r#"<a href="/media?tab={tab}" class="tab-link{active}" data-tab="{tab}">{label}</a>"#,
                tab = kind.tab(),
                label = tab_label(kind),
                active = if kind == request.tab { " active" } else { "" },
            )
        })
        .collect();

    let grid = if page.cards.is_empty() {
        format!(r#"<p class="no-content-message">{}</p>"#, browse::EMPTY_TAB_MESSAGE)
    } else {
        page.cards
            .iter()
            .map(|card| render_card(card, false))
            .collect()
    };

    let modal = request
        .open_id
        .as_deref()
        .and_then(|id| ModalView::open(&items, id))
        .map(|view| render_modal(&view, page.page))
        .unwrap_or_default();

    let body = format!(
        r#"<section class="media-section">
            <h1>Media</h1>
            <div class="tabs">{tabs}</div>
            <div id="{tab}" class="tab-content active">
                <div id="{tab}-grid" class="media-grid">{grid}</div>
                <div id="{tab}-pagination">{pagination}</div>
            </div>
        </section>
        <div id="modal-root">{modal}</div>"#,
        tab = request.tab.tab(),
        pagination = render_pagination(request.tab, &page.controls),
    );
    Html(site_page(&state.config.site.title, "Media", &body, MODAL_SCRIPT))
}

/// 详情弹窗片段，供页面内切换上一条 / 下一条
pub async fn media_item(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<MediaQuery>,
) -> Response {
    let items = state.store.load_all().await;
    match ModalView::open(&items, &id) {
        Some(view) => Html(render_modal(&view, query.page.unwrap_or(1))).into_response(),
        None => (StatusCode::NOT_FOUND, "Content not found.").into_response(),
    }
}

pub async fn contact_page(State(state): State<AppState>) -> Html<String> {
    Html(render_contact(&state, &ContactMessage::default(), ""))
}

pub async fn contact_submit(State(state): State<AppState>, Form(message): Form<ContactMessage>) -> Html<String> {
    match state.contact.submit(&message).await {
        Ok(outcome) => {
            let status = format!(r#"<div id="form-status" class="success">{}</div>"#, outcome.message());
            Html(render_contact(&state, &ContactMessage::default(), &status))
        }
        Err(e) => {
            tracing::error!("联系表单发送失败：{e}");
            let status = format!(r#"<div id="form-status" class="error">{}</div>"#, contact::FAILURE_MESSAGE);
            Html(render_contact(&state, &message, &status))
        }
    }
}

// ── 页面渲染 ──

fn tab_label(kind: ContentKind) -> &'static str {
    match kind {
        ContentKind::Article => "Articles",
        ContentKind::News => "News",
        ContentKind::Video => "Videos",
    }
}

fn render_card(card: &Card, show_category: bool) -> String {
    let category = if show_category {
        format!(r#"<span class="card-category">{}</span>"#, card.kind.label())
    } else {
        String::new()
    };
    let overlay = if card.kind.is_video() {
        r#"<div class="video-overlay">&#9654;</div>"#
    } else {
        ""
    };
    format!(
        r#"<a class="media-card clickable" href="{link}" data-id="{id}" data-type="{kind}">
            <div class="media-card-thumbnail">
                <img src="{thumbnail}" alt="{title}" onerror="this.onerror=null;this.src='{placeholder}';">
                {overlay}
            </div>
            <div class="media-card-content">
                {category}
                <h3>{title}</h3>
                <p>{description}</p>
                <div class="media-card-footer">
                    <span class="date">{date}</span>
                    <span class="read-more-btn">{cta} &rarr;</span>
                </div>
            </div>
        </a>"#,
        link = html_escape(&card.link),
        id = html_escape(&card.id),
        kind = card.kind.as_str(),
        thumbnail = html_escape(&card.thumbnail_url),
        title = html_escape(&card.title),
        placeholder = browse::CARD_PLACEHOLDER,
        description = html_escape(&card.description),
        date = card.date,
        cta = card.call_to_action(),
    )
}

fn render_pagination(kind: ContentKind, controls: &[PageLink]) -> String {
    if controls.is_empty() {
        return String::new();
    }
    let href = |page: usize| format!("/media?tab={}&amp;page={page}", kind.tab());
    let links: String = controls
        .iter()
        .map(|link| match link {
            PageLink::First { disabled } => format!(
                r#"<a href="{}" class="first-last{}">First</a>"#,
                href(1),
                if *disabled { " disabled" } else { "" }
            ),
            PageLink::Ellipsis => "<span class=\"ellipsis\">...</span>".to_string(),
            PageLink::Page { number, active } => format!(
                r#"<a href="{}" class="{}">{number}</a>"#,
                href(*number),
                if *active { "active" } else { "" }
            ),
            PageLink::Last { page, disabled } => format!(
                r#"<a href="{}" class="first-last{}">Last</a>"#,
                href(*page),
                if *disabled { " disabled" } else { "" }
            ),
        })
        .collect();
    format!(r#"<div class="pagination-nav">{links}</div>"#)
}

fn render_modal(view: &ModalView, page: usize) -> String {
    let tab = view.kind.tab();
    let close = format!("/media?tab={tab}&amp;page={page}");

    let body = match &view.body {
        ModalBody::Written {
            title,
            meta,
            main_image_url,
            content,
        } => format!(
            r#"<h1>{title}</h1>
            <p class="article-meta">{meta}</p>
            <img src="{image}" alt="{title}" onerror="this.onerror=null;this.src='{placeholder}';">
            {content}"#,
            title = html_escape(title),
            meta = html_escape(meta),
            image = html_escape(main_image_url),
            placeholder = browse::MODAL_PLACEHOLDER,
        ),
        ModalBody::Video { embed_url: Some(src) } => format!(
            r#"<iframe src="{}" frameborder="0" allow="autoplay; encrypted-media" allowfullscreen></iframe>"#,
            html_escape(src)
        ),
        ModalBody::Video { embed_url: None } => format!("<p>{}</p>", browse::INVALID_VIDEO_MESSAGE),
    };

    let nav_link = |id: &Option<String>, class: &str, label: &str| match id {
        Some(id) => format!(
            r#"<a href="/media?tab={tab}&amp;page={page}&amp;open_id={id}" class="modal-nav {class} visible" data-modal-id="{id}">{label}</a>"#,
            id = html_escape(id),
        ),
        None => String::new(),
    };

    format!(
        r#"<div id="{kind}-modal" class="modal-overlay active" data-tab="{tab}" data-page="{page}">
            <div class="modal-content">
                <a href="{close}" class="close-modal-btn" aria-label="Close">&times;</a>
                {prev}
                <div id="{kind}-modal-body" class="modal-body">{body}</div>
                {next}
            </div>
        </div>"#,
        kind = view.kind.as_str(),
        prev = nav_link(&view.prev_id, "prev", "&#8249;"),
        next = nav_link(&view.next_id, "next", "&#8250;"),
    )
}

fn render_contact(state: &AppState, message: &ContactMessage, status: &str) -> String {
    let body = format!(
        r#"<section class="contact-section">
            <h1>Contact Us</h1>
            <form id="contact-form" method="POST" action="/contact">
                <label for="name">Name</label>
                <input type="text" id="name" name="name" value="{name}" required>
                <label for="email">Email</label>
                <input type="email" id="email" name="email" value="{email}" required>
                <label for="subject">Subject</label>
                <input type="text" id="subject" name="subject" value="{subject}">
                <label for="message">Message</label>
                <textarea id="message" name="message" required>{text}</textarea>
                <button type="submit" class="btn">Send Message</button>
            </form>
            {status}
        </section>"#,
        name = html_escape(&message.name),
        email = html_escape(&message.email),
        subject = html_escape(&message.subject),
        text = html_escape(&message.message),
    );
    site_page(&state.config.site.title, "Contact", &body, CONTACT_SCRIPT)
}

fn site_page(site_title: &str, title: &str, body: &str, script: &str) -> String {
    let script_wrapped = if script.is_empty() {
        String::new()
    } else {
        format!("<script>{script}</script>")
    };
    format!(
        r#"<!DOCTYPE html><html><head><meta charset="utf-8"><meta name="viewport" content="width=device-width, initial-scale=1">
        <title>{title} - {site}</title>{style}</head>
        <body><header class="site-header"><a href="/" class="logo">{site}</a>
            <nav><a href="/">Home</a><a href="/media">Media</a><a href="/contact">Contact</a></nav></header>
        <main id="main-content">{body}</main>{script_wrapped}</body></html>"#,
        title = html_escape(title),
        site = html_escape(site_title),
        style = SITE_STYLE,
    )
}

const SITE_STYLE: &str = r#"<style>
    * { margin:0; padding:0; box-sizing:border-box; }
    body { font-family:system-ui,-apple-system,sans-serif; color:#222; background:#fff; }
    .site-header { display:flex; align-items:center; justify-content:space-between; padding:16px 32px; border-bottom:1px solid #eee; }
    .site-header nav a { margin-left:20px; color:#222; text-decoration:none; }
    .logo { font-weight:bold; font-size:20px; color:#1a1a2e; text-decoration:none; }
    main { max-width:1200px; margin:0 auto; padding:32px 16px; }
    h1 { margin-bottom:16px; }
    .btn { display:inline-block; padding:8px 18px; background:#1a1a2e; color:#fff; border:none; border-radius:4px; text-decoration:none; cursor:pointer; margin-top:16px; }
    .tabs { display:flex; gap:12px; margin-bottom:20px; }
    .tab-link { padding:6px 16px; border-radius:16px; color:#444; text-decoration:none; }
    .tab-link.active { background:#1a1a2e; color:#fff; }
    .media-grid { display:grid; grid-template-columns:repeat(auto-fill,minmax(260px,1fr)); gap:20px; }
    .media-card { display:block; border-radius:8px; overflow:hidden; box-shadow:0 2px 8px rgba(0,0,0,.08); color:inherit; text-decoration:none; }
    .media-card-thumbnail { position:relative; aspect-ratio:3/2; background:#eee; }
    .media-card-thumbnail img { width:100%; height:100%; object-fit:cover; }
    .video-overlay { position:absolute; inset:0; display:flex; align-items:center; justify-content:center; font-size:40px; color:#fff; background:rgba(0,0,0,.25); }
    .media-card-content { padding:14px; }
    .card-category { font-size:12px; text-transform:uppercase; color:#888; }
    .media-card-footer { display:flex; justify-content:space-between; margin-top:10px; font-size:13px; color:#666; }
    .pagination-nav { display:flex; gap:8px; justify-content:center; margin-top:24px; }
    .pagination-nav a { padding:4px 10px; border-radius:4px; color:#222; text-decoration:none; }
    .pagination-nav a.active { background:#1a1a2e; color:#fff; }
    .pagination-nav a.disabled { pointer-events:none; color:#bbb; }
    .modal-overlay { position:fixed; inset:0; background:rgba(0,0,0,.6); display:flex; align-items:center; justify-content:center; }
    .modal-content { position:relative; background:#fff; max-width:860px; width:92%; max-height:90vh; overflow:auto; padding:32px; border-radius:8px; }
    .modal-body img { max-width:100%; }
    .modal-body iframe { width:100%; aspect-ratio:16/9; }
    .close-modal-btn { position:absolute; top:10px; right:16px; font-size:28px; color:#444; text-decoration:none; }
    .modal-nav { position:fixed; top:50%; font-size:40px; color:#fff; text-decoration:none; }
    .modal-nav.prev { left:24px; }
    .modal-nav.next { right:24px; }
    .no-content-message { color:#777; }
    #contact-form { max-width:560px; }
    #contact-form input, #contact-form textarea { width:100%; padding:8px; margin-bottom:12px; border:1px solid #ccc; border-radius:4px; }
    #form-status.success { color:#1b5e20; margin-top:12px; }
    #form-status.error { color:#b71c1c; margin-top:12px; }
</style>"#;

/// 弹窗内上一条 / 下一条不整页刷新
const MODAL_SCRIPT: &str = r#"
document.addEventListener('click', async (e) => {
    const link = e.target.closest('[data-modal-id]');
    if (!link) return;
    const overlay = link.closest('.modal-overlay');
    e.preventDefault();
    const resp = await fetch('/media/item/' + encodeURIComponent(link.dataset.modalId) + '?page=' + overlay.dataset.page);
    if (!resp.ok) { window.location.href = link.href; return; }
    document.getElementById('modal-root').innerHTML = await resp.text();
    history.replaceState(null, '', link.href);
});
"#;

const CONTACT_SCRIPT: &str = r#"
document.getElementById('contact-form').addEventListener('submit', (e) => {
    const button = e.target.querySelector('button[type="submit"]');
    button.disabled = true;
    button.textContent = 'Sending...';
});
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browse::pagination::page_controls;

    #[test]
    fn pagination_links_keep_the_tab() {
        let html = render_pagination(ContentKind::News, &page_controls(1, 3));
        assert!(html.contains(r#"href="/media?tab=news&amp;page=3" class="first-last">Last"#));
        assert!(html.contains(r#"class="first-last disabled">First"#));
        assert!(render_pagination(ContentKind::News, &[]).is_empty());
    }

    #[test]
    fn invalid_video_is_reported_in_modal() {
        let view = ModalView {
            id: "video-1".into(),
            kind: ContentKind::Video,
            body: ModalBody::Video { embed_url: None },
            prev_id: None,
            next_id: Some("video-2".into()),
        };
        let html = render_modal(&view, 1);
        assert!(html.contains("Invalid video URL."));
        assert!(html.contains(r#"data-modal-id="video-2""#));
        assert!(!html.contains("modal-nav prev"));
    }
}
