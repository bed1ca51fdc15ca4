use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("存储后端错误：{0}")]
    Backend(#[from] sqlx::Error),

    #[error("内容序列化失败：{0}")]
    Encode(#[from] serde_json::Error),
}

/// 提交表单时可能出现的错误，均需用户修正输入后重新提交
#[derive(Error, Debug)]
pub enum SubmitError {
    #[error("A title is required.")]
    MissingTitle,

    #[error("A thumbnail image is required.")]
    MissingRequiredImage,

    #[error("YouTube video URL is required.")]
    MissingVideoUrl,

    #[error("Invalid YouTube URL for thumbnail generation.")]
    UnresolvableVideoThumbnail,

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum EditorError {
    #[error("选区 {start}..{end} 不在内容范围内或未落在字符边界上")]
    InvalidSelection { start: usize, end: usize },

    #[error("编辑区中不存在第 {0} 张图片")]
    NoSuchImage(usize),
}

#[derive(Error, Debug)]
pub enum UploadError {
    #[error("文件大小 {size} 超出限制 {limit}")]
    TooLarge { size: String, limit: String },

    #[error("不支持的文件类型：{0}")]
    UnsupportedType(String),

    #[error("读取文件失败：{0}")]
    Read(String),
}

#[derive(Error, Debug)]
pub enum ContactError {
    #[error("请求发送失败：{0}")]
    Transport(#[from] reqwest::Error),

    #[error("{0}")]
    Rejected(String),
}
