use thiserror::Error;

#[derive(Debug, Error)]
pub enum CatalogErrors {
    #[error("request to {url} failed with status {status}")]
    RequestFailed { url: String, status: u16 },

    #[error("invalid title slug: {0:?}")]
    InvalidTitleSlug(String),

    #[error("chapter count missing for title {hid}")]
    MissingChapterTotal { hid: String },

    #[error("unsupported base url: {0}")]
    InvalidBaseUrl(String),
}
