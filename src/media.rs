pub mod image_field;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use image::ImageFormat;

use crate::config::MediaConfig;
use crate::error::UploadError;

/// 用户选中的一个文件
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

impl Upload {
    pub fn new(file_name: impl Into<String>, content_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            data,
        }
    }

    /// 优先按文件头识别 MIME，识别不出时信任浏览器声明的类型
    pub fn mime_type(&self) -> String {
        image::guess_format(&self.data)
            .ok()
            .and_then(format_to_mime)
            .map(str::to_string)
            .unwrap_or_else(|| self.content_type.clone())
    }
}

pub fn parse_max_size(size_str: &str) -> usize {
    let s = size_str.trim().to_uppercase();

    let (num_part, multiplier) = if let Some(n) = s.strip_suffix("GB") {
        (n, 1024 * 1024 * 1024)
    } else if let Some(n) = s.strip_suffix("MB") {
        (n, 1024 * 1024)
    } else if let Some(n) = s.strip_suffix("KB") {
        (n, 1024)
    } else if let Some(n) = s.strip_suffix('B') {
        (n, 1)
    } else {
        (s.as_str(), 1)
    };

    num_part.trim().parse::<usize>().unwrap_or(0) * multiplier
}

pub fn validate_upload(upload: &Upload, config: &MediaConfig) -> Result<(), UploadError> {
    let max_size = parse_max_size(&config.max_file_size);
    if upload.data.len() > max_size {
        return Err(UploadError::TooLarge {
            size: format_size(upload.data.len()),
            limit: config.max_file_size.clone(),
        });
    }

    let mime_type = upload.mime_type();
    if !config.allowed_types.iter().any(|t| *t == mime_type) {
        return Err(UploadError::UnsupportedType(mime_type));
    }

    Ok(())
}

pub fn format_size(bytes: usize) -> String {
    if bytes >= 1024 * 1024 {
        format!("{:.1}MB", bytes as f64 / (1024.0 * 1024.0))
    } else if bytes >= 1024 {
        format!("{:.1}KB", bytes as f64 / 1024.0)
    } else {
        format!("{}B", bytes)
    }
}

/// 是否为内嵌的图片数据值（而非外部地址）
pub fn is_data_url(value: &str) -> bool {
    value.starts_with("data:image")
}

pub fn encode_data_url(upload: &Upload) -> String {
    format!("data:{};base64,{}", upload.mime_type(), STANDARD.encode(&upload.data))
}

/// 在阻塞线程池中把文件编码为可内嵌的 data URL
pub async fn read_as_data_url(upload: Upload) -> Result<String, UploadError> {
    tokio::task::spawn_blocking(move || encode_data_url(&upload))
        .await
        .map_err(|e| UploadError::Read(e.to_string()))
}

fn format_to_mime(format: ImageFormat) -> Option<&'static str> {
    match format {
        ImageFormat::Jpeg => Some("image/jpeg"),
        ImageFormat::Png => Some("image/png"),
        ImageFormat::Gif => Some("image/gif"),
        ImageFormat::WebP => Some("image/webp"),
        _ => None,
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// 最小的 PNG 文件头，足够让 guess_format 识别
    pub(crate) fn png_upload(name: &str) -> Upload {
        let mut data = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
        data.extend_from_slice(name.as_bytes());
        Upload::new(name, "application/octet-stream", data)
    }

    #[test]
    fn sniffs_png_even_with_generic_content_type() {
        let upload = png_upload("a.png");
        assert_eq!(upload.mime_type(), "image/png");
        assert!(encode_data_url(&upload).starts_with("data:image/png;base64,iVBORw0KGgo"));
    }

    #[test]
    fn rejects_oversized_and_unknown_files() {
        let config = MediaConfig {
            max_file_size: "8B".into(),
            ..MediaConfig::default()
        };
        let big = png_upload("too-long-name.png");
        assert!(matches!(
            validate_upload(&big, &config),
            Err(UploadError::TooLarge { .. })
        ));

        let text = Upload::new("notes.txt", "text/plain", b"hello".to_vec());
        assert!(matches!(
            validate_upload(&text, &MediaConfig::default()),
            Err(UploadError::UnsupportedType(t)) if t == "text/plain"
        ));
        assert!(validate_upload(&png_upload("ok.png"), &MediaConfig::default()).is_ok());
    }

    #[test]
    fn parses_size_units() {
        assert_eq!(parse_max_size("5MB"), 5 * 1024 * 1024);
        assert_eq!(parse_max_size(" 12kb "), 12 * 1024);
        assert_eq!(parse_max_size("100"), 100);
        assert_eq!(parse_max_size("lots"), 0);
    }

    #[test]
    fn data_url_detection() {
        assert!(is_data_url("data:image/png;base64,AAAA"));
        assert!(!is_data_url("https://example.com/a.png"));
        assert!(!is_data_url("data:text/plain;base64,AAAA"));
    }
}
