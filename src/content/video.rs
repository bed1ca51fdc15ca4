use regex::Regex;
use std::sync::LazyLock;

static VIDEO_ID_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[?&]v=([^&]+)").unwrap());

/// 从视频地址的 `v=` 查询参数中提取视频 id
pub fn extract_video_id(url: &str) -> Option<&str> {
    VIDEO_ID_RE
        .captures(url)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
}

pub fn thumbnail_url(video_id: &str) -> String {
    format!("https://img.youtube.com/vi/{video_id}/hqdefault.jpg")
}

pub fn embed_url(video_id: &str) -> String {
    format!("https://www.youtube.com/embed/{video_id}?autoplay=1")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_id_from_first_or_later_parameter() {
        assert_eq!(
            extract_video_id("https://www.youtube.com/watch?v=ABC123"),
            Some("ABC123")
        );
        assert_eq!(
            extract_video_id("https://www.youtube.com/watch?list=PL1&v=XYZ&t=10"),
            Some("XYZ")
        );
    }

    #[test]
    fn short_links_have_no_id() {
        assert_eq!(extract_video_id("https://youtu.be/ABC123"), None);
        assert_eq!(extract_video_id("https://example.com/?vv=1"), None);
    }

    #[test]
    fn thumbnail_template() {
        assert_eq!(
            thumbnail_url("ABC123"),
            "https://img.youtube.com/vi/ABC123/hqdefault.jpg"
        );
    }
}
