use std::sync::{
    Arc,
    atomic::{AtomicBool, AtomicUsize, Ordering},
};

use async_trait::async_trait;
use comick_browser::{
    CatalogService,
    models::{ChapterRecord, TitleDetail, TitleSummary},
};
use tokio::sync::Notify;

pub fn detail(slug: &str) -> TitleDetail {
    TitleDetail {
        hid: format!("{slug}-hid"),
        slug: slug.to_string(),
        title: "Some Title".to_string(),
        alternative_titles: vec![],
        year: Some(2020),
        authors: None,
        artists: None,
        description: None,
        cover_key: None,
    }
}

pub fn record(id: &str, group: Option<&str>, title: Option<&str>, lang: &str) -> ChapterRecord {
    ChapterRecord {
        id: id.to_string(),
        title: title.map(str::to_string),
        group_name: group.map(str::to_string),
        volume: None,
        chapter_number: None,
        language: lang.to_string(),
    }
}

/// In-process catalog counting every call it receives.
pub struct StubCatalog {
    pub detail: TitleDetail,
    pub records: Vec<ChapterRecord>,
    pub fail_detail: AtomicBool,
    pub fail_chapters: AtomicBool,
    pub detail_gate: Option<Arc<Notify>>,
    pub count_gate: Option<Arc<Notify>>,
    pub chapters_gate: Option<Arc<Notify>>,
    pub detail_calls: AtomicUsize,
    pub count_calls: AtomicUsize,
    pub chapter_calls: AtomicUsize,
}

#[allow(dead_code)]
impl StubCatalog {
    pub fn new(slug: &str, records: Vec<ChapterRecord>) -> Self {
        StubCatalog {
            detail: detail(slug),
            records,
            fail_detail: AtomicBool::new(false),
            fail_chapters: AtomicBool::new(false),
            detail_gate: None,
            count_gate: None,
            chapters_gate: None,
            detail_calls: AtomicUsize::new(0),
            count_calls: AtomicUsize::new(0),
            chapter_calls: AtomicUsize::new(0),
        }
    }

    /// Title detail requests block until the returned handle is notified.
    pub fn gated(mut self) -> (Self, Arc<Notify>) {
        let gate = Arc::new(Notify::new());
        self.detail_gate = Some(Arc::clone(&gate));
        (self, gate)
    }

    /// Count and chapter-list requests each block on their own handle.
    pub fn gated_after_detail(mut self) -> (Self, Arc<Notify>, Arc<Notify>) {
        let count_gate = Arc::new(Notify::new());
        let chapters_gate = Arc::new(Notify::new());
        self.count_gate = Some(Arc::clone(&count_gate));
        self.chapters_gate = Some(Arc::clone(&chapters_gate));
        (self, count_gate, chapters_gate)
    }

    pub fn calls(&self) -> (usize, usize, usize) {
        (
            self.detail_calls.load(Ordering::SeqCst),
            self.count_calls.load(Ordering::SeqCst),
            self.chapter_calls.load(Ordering::SeqCst),
        )
    }
}

#[async_trait]
impl CatalogService for StubCatalog {
    async fn fetch_title_detail(&self, slug: &str) -> anyhow::Result<TitleDetail> {
        self.detail_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.detail_gate {
            gate.notified().await;
        }
        if self.fail_detail.load(Ordering::SeqCst) {
            anyhow::bail!("connection reset while fetching {slug}");
        }
        Ok(self.detail.clone())
    }

    async fn fetch_chapter_count(&self, title_id: &str) -> anyhow::Result<usize> {
        self.count_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.count_gate {
            gate.notified().await;
        }
        assert_eq!(title_id, self.detail.hid);
        Ok(self.records.len())
    }

    async fn fetch_all_chapters(
        &self,
        title_id: &str,
        count: usize,
    ) -> anyhow::Result<Vec<ChapterRecord>> {
        self.chapter_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.chapters_gate {
            gate.notified().await;
        }
        assert_eq!(title_id, self.detail.hid);
        assert_eq!(count, self.records.len());
        if self.fail_chapters.load(Ordering::SeqCst) {
            anyhow::bail!("timed out fetching chapters");
        }
        Ok(self.records.clone())
    }

    async fn fetch_trending(&self) -> anyhow::Result<Vec<TitleSummary>> {
        Ok(vec![])
    }

    async fn search(&self, _query: &str) -> anyhow::Result<Vec<TitleSummary>> {
        Ok(vec![])
    }
}
