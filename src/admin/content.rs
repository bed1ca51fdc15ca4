//! 后台内容管理页：编辑表单、三张内容列表与删除确认。

use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Json, Redirect, Response};
use regex::Regex;
use serde::Deserialize;
use std::sync::LazyLock;

use crate::admin::auth::AuthUser;
use crate::admin::layout::{admin_page, admin_page_with_script, html_escape, notice};
use crate::content::ContentKind;
use crate::editor::{EditorCommand, resize};
use crate::form::{AdminFormController, FieldSet, FormMode};
use crate::listing::{self, ContentListView, DeleteConfirmation, ListTable};
use crate::media::image_field::{ImageFieldController, SourceMode};
use crate::media::{self, Upload};
use crate::state::AppState;

static HANDLE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"<div class="image-resize-handle"[^>]*></div>"#).unwrap());

#[derive(Deserialize)]
pub struct DashboardQuery {
    pub saved: Option<String>,
    pub deleted: Option<String>,
}

/// 表单提交的原始字段
#[derive(Default)]
struct ContentSubmission {
    post_id: String,
    kind: String,
    title: String,
    author: String,
    content: String,
    video_url: String,
    thumbnail: ImageInput,
    main_image: ImageInput,
}

#[derive(Default)]
struct ImageInput {
    source: String,
    url: String,
    file: Option<Upload>,
}

impl ImageInput {
    async fn apply(self, field: &mut ImageFieldController) {
        field.set_mode(SourceMode::from_form(&self.source));
        field.on_url_input(&self.url);
        if let Some(upload) = self.file {
            field.on_file_selected(upload).await;
        }
    }
}

impl ContentSubmission {
    async fn apply(self, form: &mut AdminFormController) {
        form.set_editing(Some(self.post_id));
        form.set_kind(self.kind.parse().unwrap_or(ContentKind::Article));
        form.set_title(self.title);
        form.set_author(self.author);
        form.set_video_url(self.video_url.trim());
        form.editor.set_html(strip_resize_handle(&self.content));
        self.thumbnail.apply(&mut form.thumbnail).await;
        self.main_image.apply(&mut form.main_image).await;
    }
}

// ── 路由处理 ──

pub async fn dashboard(State(state): State<AppState>, Query(query): Query<DashboardQuery>) -> Html<String> {
    let form = AdminFormController::new(state.config.browse.excerpt_length);
    let message = if query.saved.is_some() {
        notice("success", "Content saved.")
    } else if query.deleted.is_some() {
        notice("success", "Content deleted.")
    } else {
        String::new()
    };
    Html(render_dashboard(&state, &form, &message).await)
}

pub async fn edit_content(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let Some(item) = state.store.find_by_id(&id).await else {
        tracing::warn!(%id, "要编辑的内容不存在");
        return Redirect::to("/admin").into_response();
    };

    let mut form = AdminFormController::new(state.config.browse.excerpt_length);
    form.populate(&item);
    Html(render_dashboard(&state, &form, "").await).into_response()
}

pub async fn submit_content(
    State(state): State<AppState>,
    axum::Extension(user): axum::Extension<AuthUser>,
    mut multipart: Multipart,
) -> Response {
    let mut form = AdminFormController::new(state.config.browse.excerpt_length);

    let submission = match read_submission(&mut multipart, &state).await {
        Ok(s) => s,
        Err(message) => {
            tracing::warn!(user = %user.username, "表单读取失败：{message}");
            let body = render_dashboard(&state, &form, &notice("error", &message)).await;
            return (StatusCode::BAD_REQUEST, Html(body)).into_response();
        }
    };
    submission.apply(&mut form).await;

    match form.submit(&state.store, chrono::Utc::now()).await {
        Ok(item) => {
            tracing::info!(user = %user.username, id = %item.id, "发布内容");
            Redirect::to("/admin?saved=1").into_response()
        }
        Err(e) => {
            let body = render_dashboard(&state, &form, &notice("error", &e.to_string())).await;
            (StatusCode::UNPROCESSABLE_ENTITY, Html(body)).into_response()
        }
    }
}

pub async fn confirm_delete_page(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let Some(item) = state.store.find_by_id(&id).await else {
        return Redirect::to("/admin").into_response();
    };

    let mut confirmation = DeleteConfirmation::default();
    confirmation.request(item.id.clone());

    let body = format!(
        r#"<div class="card confirm-box">
            <h1>Confirm Deletion</h1>
            <p>Are you sure you want to delete "{title}"? This action cannot be undone.</p>
            <form method="POST" action="/admin/content/{id}/delete">
                <button type="submit" class="btn btn-danger">Delete</button>
                <a href="/admin" class="btn btn-secondary">Cancel</a>
            </form>
        </div>"#,
        title = html_escape(&item.title),
        id = html_escape(confirmation.pending().unwrap_or_default()),
    );
    Html(admin_page(&state.config.site.title, "Confirm Deletion", "", &body)).into_response()
}

pub async fn delete_content(
    State(state): State<AppState>,
    axum::Extension(user): axum::Extension<AuthUser>,
    Path(id): Path<String>,
) -> Response {
    let mut confirmation = DeleteConfirmation::default();
    confirmation.request(id);
    match confirmation.confirm(&state.store).await {
        Ok(_) => {
            tracing::info!(user = %user.username, "确认删除内容");
            Redirect::to("/admin?deleted=1").into_response()
        }
        Err(e) => {
            tracing::error!("删除内容失败：{e}");
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to delete content.").into_response()
        }
    }
}

/// 编辑器插图接口：返回可直接插入的内嵌图片地址
pub async fn api_editor_image(State(state): State<AppState>, mut multipart: Multipart) -> Response {
    while let Ok(Some(field)) = multipart.next_field().await {
        if field.name() != Some("file") {
            continue;
        }

        let upload = match read_upload(field).await {
            Ok(Some(upload)) => upload,
            Ok(None) => break,
            Err(e) => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(serde_json::json!({ "error": format!("读取文件失败：{e}") })),
                )
                    .into_response();
            }
        };

        if let Err(e) = media::validate_upload(&upload, &state.config.media) {
            return (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({ "error": e.to_string() })),
            )
                .into_response();
        }

        return match media::read_as_data_url(upload).await {
            Ok(url) => Json(serde_json::json!({ "url": url })).into_response(),
            Err(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "error": e.to_string() })),
            )
                .into_response(),
        };
    }

    (
        StatusCode::BAD_REQUEST,
        Json(serde_json::json!({ "error": "未找到上传文件" })),
    )
        .into_response()
}

// ── 表单读取 ──

async fn read_submission(multipart: &mut Multipart, state: &AppState) -> Result<ContentSubmission, String> {
    let mut submission = ContentSubmission::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| format!("读取表单失败：{e}"))?
    {
        let name = field.name().unwrap_or("").to_string();

        if let Some(prefix) = name.strip_suffix("-file") {
            let upload = read_upload(field).await.map_err(|e| format!("读取文件失败：{e}"))?;
            let Some(upload) = upload else { continue };
            media::validate_upload(&upload, &state.config.media).map_err(|e| e.to_string())?;
            match prefix {
                "thumbnail" => submission.thumbnail.file = Some(upload),
                "main-image" => submission.main_image.file = Some(upload),
                _ => {}
            }
            continue;
        }

        let value = field.text().await.map_err(|e| format!("读取表单失败：{e}"))?;
        match name.as_str() {
            "post-id" => submission.post_id = value,
            "type" => submission.kind = value,
            "title" => submission.title = value,
            "author" => submission.author = value,
            "content" => submission.content = value,
            "video-url" => submission.video_url = value,
            "thumbnail-source" => submission.thumbnail.source = value,
            "thumbnail-url" => submission.thumbnail.url = value,
            "main-image-source" => submission.main_image.source = value,
            "main-image-url" => submission.main_image.url = value,
            _ => {}
        }
    }

    Ok(submission)
}

/// 空文件输入（未选择文件）返回 `None`
async fn read_upload(
    field: axum::extract::multipart::Field<'_>,
) -> Result<Option<Upload>, axum::extract::multipart::MultipartError> {
    let file_name = field.file_name().unwrap_or("upload").to_string();
    let content_type = field
        .content_type()
        .unwrap_or("application/octet-stream")
        .to_string();
    let data = field.bytes().await?;
    if data.is_empty() {
        return Ok(None);
    }
    Ok(Some(Upload::new(file_name, content_type, data.to_vec())))
}

/// 浏览器端的缩放手柄在提交前会被移除，这里再兜底一次
fn strip_resize_handle(html: &str) -> String {
    HANDLE_RE.replace_all(html, "").into_owned()
}

// ── 页面渲染 ──

async fn render_dashboard(state: &AppState, form: &AdminFormController, message: &str) -> String {
    let list = ContentListView::load(&state.store).await;
    let tables: String = list.tables.iter().map(render_table).collect();

    let body = format!(
        r#"{message}
        <div class="card editor-container">{form}</div>
        <div class="content-management-container">{tables}</div>"#,
        form = render_form(form),
    );
    admin_page_with_script(
        &state.config.site.title,
        "Content Manager",
        EDITOR_STYLE,
        &body,
        &editor_script(),
    )
}

/// 缩放阈值与手柄偏移取自 [`resize`]，浏览器端与服务端共用一组数值
fn editor_script() -> String {
    format!(
        "const MIN_WIDTH = {};\nconst HANDLE_OFFSET = {};\n{EDITOR_SCRIPT}",
        resize::MIN_WIDTH,
        resize::HANDLE_OFFSET,
    )
}

fn render_form(form: &AdminFormController) -> String {
    let post_id = match form.mode() {
        FormMode::Edit(id) => id.as_str(),
        FormMode::Create => "",
    };
    let is_video = form.field_set() == FieldSet::Video;

    let type_options: String = ContentKind::ALL
        .into_iter()
        .map(|kind| {
            format!(
                r#"<option value="{value}"{selected}>{label}</option>"#,
                value = kind.as_str(),
                label = kind.label(),
                selected = if kind == form.kind() { " selected" } else { "" },
            )
        })
        .collect();

    let toolbar: String = EditorCommand::toolbar()
        .into_iter()
        .map(|button| {
            let value = button
                .command
                .data_value()
                .map(|v| format!(r#" data-value="{v}""#))
                .unwrap_or_default();
            let id = if button.command == EditorCommand::InsertImage {
                r#" id="insert-image-btn""#
            } else {
                ""
            };
            format!(
                r#"<button type="button"{id} data-command="{command}"{value} title="{title}">{icon}</button>"#,
                command = button.command.data_command(),
                title = button.title,
                icon = button.icon,
            )
        })
        .collect();

    let control = form.submit_control();

    format!(
        r#"<h1 id="form-heading">{heading}</h1>
        <form id="post-form" method="POST" action="/admin/content" enctype="multipart/form-data">
            <input type="hidden" id="post-id" name="post-id" value="{post_id}">
            <label for="post-type">Content Type</label>
            <select id="post-type" name="type">{type_options}</select>
            <label for="post-title">Title</label>
            <input type="text" id="post-title" name="title" value="{title}" required>

            <div id="content-fields"{written_hidden}>
                <label for="post-author">Author / Meta</label>
                <input type="text" id="post-author" name="author" value="{author}">
                <label>Content</label>
                <div class="editor-toolbar">{toolbar}</div>
                <input type="file" id="image-upload-input" accept="image/*" class="hidden">
                <div id="post-content" class="editor" contenteditable="true">{content}</div>
                <input type="hidden" id="content-input" name="content">
                {main_image}
            </div>

            <div id="video-fields"{video_hidden}>
                <label for="post-video-url">YouTube Video URL</label>
                <input type="url" id="post-video-url" name="video-url" value="{video_url}" placeholder="https://www.youtube.com/watch?v=...">
            </div>

            {thumbnail}

            <button type="submit" id="publish-btn" class="btn btn-primary"
                data-mode="{mode}"{disabled}>{label}</button>
            <a href="/admin" class="btn btn-secondary">Clear</a>
        </form>"#,
        heading = form.heading(),
        post_id = html_escape(post_id),
        title = html_escape(form.title()),
        written_hidden = if is_video { r#" class="hidden""# } else { "" },
        video_hidden = if is_video { "" } else { r#" class="hidden""# },
        author = html_escape(form.author()),
        content = form.editor.html(),
        main_image = render_image_field(&form.main_image, "Main Image (Optional)"),
        video_url = html_escape(form.video_url()),
        thumbnail = render_image_field(&form.thumbnail, form.thumbnail_label()),
        mode = if post_id.is_empty() { "create" } else { "edit" },
        disabled = if control.disabled { " disabled" } else { "" },
        label = control.label,
    )
}

fn render_image_field(field: &ImageFieldController, label: &str) -> String {
    let name = field.name();
    let is_upload = field.mode() == SourceMode::Upload;
    let checked = |mode: SourceMode| if field.mode() == mode { " checked" } else { "" };
    let preview = field.preview().unwrap_or_default();

    format!(
        r#"<div class="image-field" data-field="{name}">
            <label id="{name}-label">{label}</label>
            <div class="source-toggle">
                <label><input type="radio" name="{name}-source" value="url"{url_checked}> URL</label>
                <label><input type="radio" name="{name}-source" value="upload"{upload_checked}> Upload</label>
            </div>
            <input type="url" id="post-{name}-url" name="{name}-url" value="{url}"{url_hidden}>
            <input type="file" id="post-{name}-upload" name="{name}-file" accept="image/*"{file_hidden}>
            <img id="{name}-preview" class="image-preview{preview_hidden}" src="{preview}" alt="Preview">
        </div>"#,
        url_checked = checked(SourceMode::Url),
        upload_checked = checked(SourceMode::Upload),
        url = html_escape(field.url_input()),
        url_hidden = if is_upload { r#" class="hidden""# } else { "" },
        file_hidden = if is_upload { "" } else { r#" class="hidden""# },
        preview_hidden = if preview.is_empty() { " hidden" } else { "" },
        preview = html_escape(preview),
    )
}

fn render_table(table: &ListTable) -> String {
    let rows = if table.is_empty() {
        format!(
            r#"<tr><td colspan="{columns}" style="text-align:center; padding: 20px;">{message}</td></tr>"#,
            columns = listing::COLUMNS,
            message = listing::EMPTY_MESSAGE,
        )
    } else {
        table
            .rows
            .iter()
            .map(|row| {
                format!(
                    r#"<tr>
                    <td><img src="{thumbnail}" alt="Thumbnail" class="list-thumbnail" onerror="this.onerror=null;this.src='{placeholder}';"></td>
                    <td class="title-cell">{title}</td>
                    <td>{date}</td>
                    <td class="actions-cell">
                        <a href="/admin/content/{id}/edit" class="btn btn-secondary" title="Edit">Edit</a>
                        <a href="/admin/content/{id}/delete" class="btn btn-danger" title="Delete">Delete</a>
                    </td>
                </tr>"#,
                    thumbnail = html_escape(&row.thumbnail_url),
                    placeholder = listing::LIST_PLACEHOLDER,
                    title = html_escape(&row.title),
                    date = row.date,
                    id = html_escape(&row.id),
                )
            })
            .collect()
    };

    format!(
        r#"<h2>{heading}</h2>
        <table id="{kind}-list-table">
            <thead><tr><th>Thumbnail</th><th>Title</th><th>Date</th><th>Actions</th></tr></thead>
            <tbody id="{kind}-list">{rows}</tbody>
        </table>"#,
        heading = match table.kind {
            ContentKind::Article => "Articles",
            ContentKind::News => "News",
            ContentKind::Video => "Videos",
        },
        kind = table.kind.as_str(),
    )
}

const EDITOR_STYLE: &str = r#"
    .editor-toolbar { display:flex; flex-wrap:wrap; gap:4px; padding:6px; border:1px solid #ccc; border-bottom:none; border-radius:4px 4px 0 0; background:#fafafa; }
    .editor-toolbar button { min-width:32px; padding:4px 8px; border:1px solid #ddd; background:#fff; border-radius:3px; cursor:pointer; }
    .editor { position:relative; min-height:240px; padding:12px; border:1px solid #ccc; border-radius:0 0 4px 4px; background:#fff; margin-bottom:12px; overflow:auto; }
    .editor img { max-width:100%; }
    .editor img.resizable-image-selected { outline:2px solid #4a6cf7; }
    .image-resize-handle { position:absolute; width:16px; height:16px; background:#4a6cf7; border:2px solid #fff; border-radius:2px; cursor:nwse-resize; }
    .image-field { margin-bottom:16px; }
    .source-toggle { display:flex; gap:16px; margin-bottom:6px; }
    .source-toggle label { font-weight:normal; }
    .image-preview { display:block; max-width:240px; max-height:160px; margin-top:6px; border-radius:4px; }
    .image-preview.hidden { display:none; }
"#;

/// 浏览器端交互；保存规则与服务端的编辑器、缩放与表单逻辑一致
const EDITOR_SCRIPT: &str = r#"
(function () {
    const form = document.getElementById('post-form');
    const editor = document.getElementById('post-content');
    const contentInput = document.getElementById('content-input');
    const typeSelect = document.getElementById('post-type');
    const publishBtn = document.getElementById('publish-btn');

    typeSelect.addEventListener('change', () => {
        const isVideo = typeSelect.value === 'video';
        document.getElementById('video-fields').classList.toggle('hidden', !isVideo);
        document.getElementById('content-fields').classList.toggle('hidden', isVideo);
        document.getElementById('thumbnail-label').textContent =
            isVideo ? 'Thumbnail Image (Optional)' : 'Thumbnail Image';
    });

    document.querySelectorAll('.image-field').forEach((group) => {
        const name = group.dataset.field;
        const urlInput = document.getElementById('post-' + name + '-url');
        const fileInput = document.getElementById('post-' + name + '-upload');
        const preview = document.getElementById(name + '-preview');
        group.querySelectorAll('input[type=radio]').forEach((radio) => {
            radio.addEventListener('change', () => {
                urlInput.classList.toggle('hidden', radio.value !== 'url');
                fileInput.classList.toggle('hidden', radio.value !== 'upload');
            });
        });
        urlInput.addEventListener('input', () => {
            preview.src = urlInput.value;
            preview.classList.toggle('hidden', !urlInput.value);
        });
        let generation = 0;
        fileInput.addEventListener('change', () => {
            const file = fileInput.files[0];
            if (!file) return;
            const current = ++generation;
            const reader = new FileReader();
            reader.onload = (e) => {
                if (current !== generation) return;
                preview.src = e.target.result;
                preview.classList.remove('hidden');
            };
            reader.readAsDataURL(file);
        });
    });

    document.querySelector('.editor-toolbar').addEventListener('click', (e) => {
        const target = e.target.closest('button');
        if (!target || target.id === 'insert-image-btn') return;
        const command = target.dataset.command;
        let value = target.dataset.value || null;
        if (command === 'createLink') {
            value = prompt('Enter the URL:');
            if (!value || value === 'null') return;
        }
        document.execCommand(command, false, value);
        editor.focus();
    });

    const imageInput = document.getElementById('image-upload-input');
    document.getElementById('insert-image-btn').addEventListener('click', () => imageInput.click());
    imageInput.addEventListener('change', async () => {
        const file = imageInput.files[0];
        if (!file) return;
        const body = new FormData();
        body.append('file', file);
        const resp = await fetch('/admin/api/editor/image', { method: 'POST', body });
        const data = await resp.json();
        imageInput.value = '';
        if (data.url) {
            editor.focus();
            document.execCommand('insertImage', false, data.url);
        } else {
            alert(data.error || 'Upload failed.');
        }
    });

    let selected = null;
    let handle = null;
    let startX = 0, startWidth = 0;

    const clearSelection = () => {
        if (selected) selected.classList.remove('resizable-image-selected');
        if (handle) handle.remove();
        selected = null;
        handle = null;
    };
    const placeHandle = (img) => {
        handle.style.top = (img.offsetTop + img.offsetHeight - HANDLE_OFFSET) + 'px';
        handle.style.left = (img.offsetLeft + img.offsetWidth - HANDLE_OFFSET) + 'px';
    };
    const onMove = (e) => {
        const width = startWidth + (e.clientX - startX);
        if (width > MIN_WIDTH) {
            selected.style.width = width + 'px';
            selected.style.height = 'auto';
            placeHandle(selected);
        }
    };
    const onUp = () => {
        document.removeEventListener('mousemove', onMove);
        document.removeEventListener('mouseup', onUp);
    };

    editor.addEventListener('click', (e) => {
        if (e.target.tagName === 'IMG') {
            e.stopPropagation();
            if (selected && selected !== e.target) clearSelection();
            selected = e.target;
            selected.classList.add('resizable-image-selected');
            if (!handle) {
                handle = document.createElement('div');
                handle.className = 'image-resize-handle';
                handle.contentEditable = 'false';
                editor.appendChild(handle);
                handle.addEventListener('mousedown', (down) => {
                    down.preventDefault();
                    startX = down.clientX;
                    startWidth = selected.offsetWidth;
                    document.addEventListener('mousemove', onMove);
                    document.addEventListener('mouseup', onUp);
                });
            }
            placeHandle(selected);
        } else if (!e.target.classList.contains('image-resize-handle')) {
            clearSelection();
        }
    });

    form.addEventListener('submit', () => {
        clearSelection();
        contentInput.value = editor.innerHTML;
        const editing = publishBtn.dataset.mode === 'edit';
        publishBtn.textContent = editing ? 'Updating...' : 'Publishing...';
        publishBtn.disabled = true;
    });
})();
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{ContentBody, ContentItem, VideoBody};
    use chrono::{TimeZone, Utc};

    #[test]
    fn empty_table_spans_all_columns() {
        let view = ContentListView::from_items(&[]);
        let html = render_table(&view.tables[1]);
        assert!(html.contains(r#"colspan="4""#));
        assert!(html.contains("No content in this category."));
        assert!(html.contains(r#"<tbody id="news-list">"#));
    }

    #[test]
    fn edit_form_shows_video_fields() {
        let item = ContentItem {
            id: "video-1".into(),
            title: "Launch <live>".into(),
            date: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            thumbnail_url: "https://img.youtube.com/vi/x/hqdefault.jpg".into(),
            body: ContentBody::Video(VideoBody {
                video_url: "https://www.youtube.com/watch?v=x".into(),
                description: String::new(),
            }),
        };
        let mut form = AdminFormController::new(120);
        form.populate(&item);
        let html = render_form(&form);

        assert!(html.contains("Edit Post"));
        assert!(html.contains(r#"value="video-1""#));
        assert!(html.contains("Launch &lt;live&gt;"));
        assert!(html.contains(r#"<div id="content-fields" class="hidden">"#));
        assert!(html.contains("Thumbnail Image (Optional)"));
        assert!(html.contains(">Update Content</button>"));
    }

    #[test]
    fn image_field_reflects_mode() {
        let mut field = ImageFieldController::new("thumbnail");
        field.populate("data:image/png;base64,AAAA");
        let html = render_image_field(&field, "Thumbnail Image");
        assert!(html.contains(r#"value="upload" checked"#));
        assert!(html.contains(r#"src="data:image/png;base64,AAAA""#));
    }

    #[test]
    fn editor_script_uses_resizer_constants() {
        let script = editor_script();
        assert!(script.starts_with(&format!(
            "const MIN_WIDTH = {};\nconst HANDLE_OFFSET = {};",
            resize::MIN_WIDTH,
            resize::HANDLE_OFFSET
        )));
        assert_eq!(script.matches("const MIN_WIDTH").count(), 1);
        assert!(script.contains("width > MIN_WIDTH"));
    }

    #[test]
    fn resize_handle_is_not_saved() {
        assert_eq!(
            strip_resize_handle(r#"<p>x</p><div class="image-resize-handle"></div>"#),
            "<p>x</p>"
        );
        assert_eq!(
            strip_resize_handle(
                r#"<img src="a.png"><div class="image-resize-handle" contenteditable="false" style="top: 1px;"></div>"#
            ),
            r#"<img src="a.png">"#
        );
    }
}
