pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

pub fn admin_nav(site_title: &str) -> String {
    format!(
        r#"<nav class="admin-nav">
        <a href="/admin" class="brand">{title}</a>
        <a href="/admin">Content</a>
        <a href="/" target="_blank">View Site</a>
        <div style="margin-left:auto;">
            <form method="POST" action="/admin/logout" style="margin:0;">
                <button type="submit" class="btn btn-outline">Logout</button>
            </form>
        </div>
    </nav>"#,
        title = html_escape(site_title),
    )
}

pub fn base_style() -> &'static str {
    r#"<style>
        * { margin:0; padding:0; box-sizing:border-box; }
        body { font-family:system-ui,-apple-system,sans-serif; background:#f5f5f5; color:#333; }
        .admin-nav { background:#1a1a2e; padding:12px 24px; display:flex; gap:24px; align-items:center; }
        .admin-nav a { color:#e0e0e0; text-decoration:none; font-weight:bold; }
        .admin-nav .brand { color:#fff; }
        .container { max-width:1100px; margin:24px auto; padding:0 16px; }
        h1 { margin-bottom:16px; }
        h2 { margin-top:24px; margin-bottom:12px; }
        table { width:100%; border-collapse:collapse; background:#fff; border-radius:4px; overflow:hidden; box-shadow:0 1px 3px rgba(0,0,0,0.1); }
        th,td { padding:10px 14px; text-align:left; border-bottom:1px solid #eee; vertical-align:middle; }
        th { background:#f8f8f8; font-weight:600; }
        a { color:#4a6cf7; text-decoration:none; }
        a:hover { text-decoration:underline; }
        .btn { display:inline-block; padding:6px 14px; border-radius:4px; border:none; cursor:pointer; font-size:14px; text-decoration:none; }
        .btn-primary { background:#4a6cf7; color:#fff; }
        .btn-danger { background:#e74c3c; color:#fff; }
        .btn-secondary { background:#6c757d; color:#fff; }
        .btn-outline { background:transparent; border:1px solid #e0e0e0; color:#e0e0e0; }
        .btn[disabled] { opacity:.6; cursor:not-allowed; }
        label { display:block; margin-bottom:4px; font-weight:500; }
        input[type=text], input[type=url], input[type=password], textarea, select {
            width:100%; padding:8px 10px; border:1px solid #ccc; border-radius:4px; font-size:14px; margin-bottom:12px;
        }
        .card { background:#fff; border-radius:6px; box-shadow:0 1px 3px rgba(0,0,0,0.1); padding:20px; margin-bottom:24px; }
        .notice { padding:10px 14px; border-radius:4px; margin-bottom:16px; }
        .notice-success { background:#a8e6cf; color:#1b5e20; }
        .notice-error { background:#ffcdd2; color:#b71c1c; }
        .actions-cell form { display:inline; }
        .list-thumbnail { width:80px; height:50px; object-fit:cover; border-radius:3px; }
        .hidden { display:none; }
    </style>"#
}

pub fn admin_page(site_title: &str, title: &str, extra_style: &str, body: &str) -> String {
    admin_page_with_script(site_title, title, extra_style, body, "")
}

pub fn admin_page_with_script(
    site_title: &str,
    title: &str,
    extra_style: &str,
    body: &str,
    script: &str,
) -> String {
    let extra_style_wrapped = if extra_style.is_empty() {
        String::new()
    } else {
        format!("<style>{extra_style}</style>")
    };
    let script_wrapped = if script.is_empty() {
        String::new()
    } else {
        format!("<script>{script}</script>")
    };
    format!(
        r#"<!DOCTYPE html><html><head><meta charset="utf-8"><title>{title}</title>{base_style}{extra_style_wrapped}</head>
        <body>{nav}<div class="container">{body}</div>{script_wrapped}</body></html>"#,
        title = html_escape(title),
        base_style = base_style(),
        nav = admin_nav(site_title),
    )
}

/// 登录页不带导航栏
pub fn login_page(site_title: &str, show_error: bool) -> String {
    let error = if show_error {
        r#"<div class="notice notice-error">Invalid username or password.</div>"#
    } else {
        ""
    };
    format!(
        r#"<!DOCTYPE html><html><head><meta charset="utf-8"><title>Admin Login - {title}</title>{base_style}
        <style>.login-box {{ max-width:360px; margin:96px auto; }}</style></head>
        <body><div class="login-box card">
            <h1>Admin Login</h1>
            {error}
            <form method="POST" action="/admin/login">
                <label for="username">Username</label>
                <input type="text" id="username" name="username" required autofocus>
                <label for="password">Password</label>
                <input type="password" id="password" name="password" required>
                <button type="submit" class="btn btn-primary">Login</button>
            </form>
        </div></body></html>"#,
        title = html_escape(site_title),
        base_style = base_style(),
    )
}

pub fn notice(kind: &str, message: &str) -> String {
    format!(
        r#"<div class="notice notice-{kind}">{}</div>"#,
        html_escape(message)
    )
}
