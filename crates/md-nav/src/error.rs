use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("section not found: {0}")]
    SectionNotFound(String),

    #[error("heading not found: {0}")]
    HeadingNotFound(String),

    #[error("frontmatter parse error: {0}")]
    FrontmatterParse(String),

    #[error("no frontmatter in document")]
    NoFrontmatter,

    #[error("config parse error: {0}")]
    ConfigParse(String),

    #[error("invalid file pattern: {0}")]
    InvalidPattern(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("failed to write file: {0}")]
    WriteFailed(PathBuf),
}

pub type Result<T> = std::result::Result<T, Error>;
