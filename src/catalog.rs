use anyhow::Context as _;
use async_trait::async_trait;
use log::debug;
use reqwest::{
    Client, ClientBuilder, Url,
    header::{self, HeaderMap, HeaderValue},
};
use serde::de::DeserializeOwned;

use crate::{
    config::{Config, READER_URL},
    errors::CatalogErrors,
    models::{
        ChapterListPayload, ChapterRecord, ComicSummaryPayload, TitleDetail, TitlePayload,
        TitleSummary,
    },
};

const SEARCH_PAGE_SIZE: usize = 30;

/// Remote catalog of titles and their chapters.
#[async_trait]
pub trait CatalogService: Send + Sync {
    async fn fetch_title_detail(&self, slug: &str) -> anyhow::Result<TitleDetail>;

    /// Total number of chapters, probed with a single-item page.
    async fn fetch_chapter_count(&self, title_id: &str) -> anyhow::Result<usize>;

    async fn fetch_all_chapters(
        &self,
        title_id: &str,
        count: usize,
    ) -> anyhow::Result<Vec<ChapterRecord>>;

    async fn fetch_trending(&self) -> anyhow::Result<Vec<TitleSummary>>;

    /// First page of titles matching a free-text query.
    async fn search(&self, query: &str) -> anyhow::Result<Vec<TitleSummary>>;
}

#[derive(Debug, Clone)]
pub struct ComickClient {
    client: Client,
    base_url: Url,
}

impl ComickClient {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(header::REFERER, HeaderValue::from_static(READER_URL));

        let client = ClientBuilder::new()
            .default_headers(headers)
            .user_agent(config.user_agent.clone())
            .build()
            .context("build http client")?;

        Ok(ComickClient {
            client,
            base_url: config.base_url.clone(),
        })
    }

    /// Appends escaped path segments to the API root.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, CatalogErrors> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| CatalogErrors::InvalidBaseUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> anyhow::Result<T> {
        debug!("GET {url}");
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(CatalogErrors::RequestFailed {
                url: url.to_string(),
                status: status.as_u16(),
            }
            .into());
        }
        response
            .json::<T>()
            .await
            .with_context(|| format!("decode response from {url}"))
    }

    async fn fetch_chapter_page(
        &self,
        title_id: &str,
        limit: usize,
    ) -> anyhow::Result<ChapterListPayload> {
        let mut url = self.endpoint(&["comic", title_id, "chapters"])?;
        url.query_pairs_mut().append_pair("limit", &limit.to_string());
        self.get_json(url).await
    }

    async fn fetch_summaries(&self, url: Url) -> anyhow::Result<Vec<TitleSummary>> {
        let payloads: Vec<ComicSummaryPayload> = self.get_json(url).await?;
        Ok(payloads.into_iter().map(TitleSummary::from).collect())
    }
}

#[async_trait]
impl CatalogService for ComickClient {
    async fn fetch_title_detail(&self, slug: &str) -> anyhow::Result<TitleDetail> {
        let slug = slug.trim();
        if matches!(slug, "" | "." | "..") {
            return Err(CatalogErrors::InvalidTitleSlug(slug.to_string()).into());
        }
        // trailing empty segment keeps the slash the detail route expects
        let url = self.endpoint(&["comic", slug, ""])?;
        let payload: TitlePayload = self.get_json(url).await?;
        Ok(payload.into())
    }

    async fn fetch_chapter_count(&self, title_id: &str) -> anyhow::Result<usize> {
        self.fetch_chapter_page(title_id, 1)
            .await?
            .total
            .ok_or_else(|| {
                anyhow::Error::from(CatalogErrors::MissingChapterTotal {
                    hid: title_id.to_string(),
                })
            })
    }

    async fn fetch_all_chapters(
        &self,
        title_id: &str,
        count: usize,
    ) -> anyhow::Result<Vec<ChapterRecord>> {
        let page = self.fetch_chapter_page(title_id, count.max(1)).await?;
        Ok(page.chapters.into_iter().map(ChapterRecord::from).collect())
    }

    async fn fetch_trending(&self) -> anyhow::Result<Vec<TitleSummary>> {
        let url = self.endpoint(&["top"])?;
        self.fetch_summaries(url).await.context("trending titles")
    }

    async fn search(&self, query: &str) -> anyhow::Result<Vec<TitleSummary>> {
        let mut url = self.endpoint(&["v1.0", "search", ""])?;
        url.query_pairs_mut()
            .append_pair("page", "1")
            .append_pair("limit", &SEARCH_PAGE_SIZE.to_string())
            .append_pair("q", query.trim());
        self.fetch_summaries(url)
            .await
            .with_context(|| format!("search for {:?}", query.trim()))
    }
}
