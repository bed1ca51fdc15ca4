/// 实体名的最大长度，超过后按普通文本处理
const MAX_ENTITY_LEN: usize = 10;

/// 编辑区内容渲染后的纯文本（近似 innerText）
///
/// 块级结束标签与 `<br>` 变成换行，行内连续空白压缩为一个空格。
pub fn inner_text(html: &str) -> String {
    let mut result = String::with_capacity(html.len());
    let mut in_tag = false;
    let mut tag = String::new();
    let mut in_entity = false;
    let mut entity = String::new();

    for ch in html.chars() {
        // 不是实体字符时，把已收集的 `&...` 原样放回
        if in_entity
            && (entity.len() >= MAX_ENTITY_LEN || !(ch == ';' || ch == '#' || ch.is_ascii_alphanumeric()))
        {
            in_entity = false;
            result.push_str(&entity);
        }

        match ch {
            '<' => {
                in_tag = true;
                tag.clear();
            }
            '>' if in_tag => {
                in_tag = false;
                if breaks_line(&tag) {
                    result.push('\n');
                }
            }
            _ if in_tag => tag.push(ch),
            '&' => {
                in_entity = true;
                entity.clear();
                entity.push(ch);
            }
            ';' if in_entity => {
                in_entity = false;
                entity.push(ch);
                // 将常见 HTML 实体转为文本
                match entity.as_str() {
                    "&amp;" => result.push('&'),
                    "&lt;" => result.push('<'),
                    "&gt;" => result.push('>'),
                    "&quot;" => result.push('"'),
                    "&#39;" | "&apos;" => result.push('\''),
                    "&nbsp;" => result.push(' '),
                    _ => result.push_str(&entity),
                }
            }
            _ if in_entity => entity.push(ch),
            _ => result.push(ch),
        }
    }
    if in_entity {
        result.push_str(&entity);
    }

    collapse_whitespace(&result)
}

/// 列表与卡片展示用的描述：纯文本前 `max_chars` 个字符加省略号
pub fn description_from_html(html: &str, max_chars: usize) -> String {
    let text = inner_text(html);
    let mut description: String = text.chars().take(max_chars).collect();
    description.push_str("...");
    description
}

fn breaks_line(tag: &str) -> bool {
    let name = tag
        .trim_start_matches('/')
        .split(|c: char| c.is_whitespace() || c == '/')
        .next()
        .unwrap_or("")
        .to_ascii_lowercase();
    if name == "br" {
        return true;
    }
    tag.starts_with('/')
        && matches!(
            name.as_str(),
            "p" | "div" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "li" | "blockquote" | "pre"
        )
}

fn collapse_whitespace(text: &str) -> String {
    let lines: Vec<String> = text
        .split('\n')
        .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
        .collect();
    let mut out = lines.join("\n");
    while out.contains("\n\n") {
        out = out.replace("\n\n", "\n");
    }
    out.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_tags_become_line_breaks() {
        let html = "<h2>Title</h2><p>First  line</p><p>Second&nbsp;line</p>";
        assert_eq!(inner_text(html), "Title\nFirst line\nSecond line");
    }

    #[test]
    fn entities_are_decoded() {
        assert_eq!(inner_text("<b>Fish &amp; Chips</b>"), "Fish & Chips");
        assert_eq!(inner_text("a &unknown; b"), "a &unknown; b");
    }

    #[test]
    fn bare_ampersand_stays_in_place() {
        assert_eq!(inner_text("<p>Tom & Jerry</p><p>Next</p>"), "Tom & Jerry\nNext");
        assert_eq!(inner_text("<p>R&D</p><p>Lab</p>"), "R&D\nLab");
        assert_eq!(inner_text("a &verylongentityname; b"), "a &verylongentityname; b");
        assert_eq!(
            description_from_html("<p>Salt & pepper</p>", 120),
            "Salt & pepper..."
        );
    }

    #[test]
    fn description_always_ends_with_ellipsis() {
        assert_eq!(description_from_html("<p>Short</p>", 120), "Short...");
        let long = format!("<p>{}</p>", "x".repeat(200));
        let description = description_from_html(&long, 120);
        assert_eq!(description.chars().count(), 123);
        assert!(description.ends_with("..."));
    }

    #[test]
    fn images_contribute_no_text() {
        let html = r#"<p>Before<img src="data:image/png;base64,AAAA" style="width: 240px;">After</p>"#;
        assert_eq!(inner_text(html), "BeforeAfter");
    }
}
