use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use anyhow::Context as _;
use log::{debug, error, warn};
use tokio::sync::watch;

use crate::{
    catalog::CatalogService,
    config::ChapterLanguage,
    models::TitleDetail,
    read_state::{ReadState, ReadStateStore},
    selection::{self, Activation, ChapterSelected},
    tree::ChapterForest,
};

/// Everything the title screen shows once loading finished.
#[derive(Debug, Clone)]
pub struct TitleScreen {
    pub detail: TitleDetail,
    pub forest: ChapterForest,
    pub read_state: Option<ReadState>,
}

#[derive(Debug, Clone, Default)]
pub enum TitleLoadingState {
    #[default]
    Idle,
    LoadingDetail,
    LoadingChapters,
    Ready(Box<TitleScreen>),
    Failed(String),
}

impl TitleLoadingState {
    pub fn is_loading(&self) -> bool {
        matches!(
            self,
            TitleLoadingState::LoadingDetail | TitleLoadingState::LoadingChapters
        )
    }

    pub fn screen(&self) -> Option<&TitleScreen> {
        match self {
            TitleLoadingState::Ready(screen) => Some(screen.as_ref()),
            _ => None,
        }
    }
}

/// Loads one title: detail and chapter count, then every chapter, then the tree.
///
/// Observers follow progress through [`TitleLoadingPipeline::subscribe`]. Every
/// transition happens inside the watch sender, so a `load` racing another one
/// sees the first one's state and backs off. Results of a load that was
/// superseded by [`close`](TitleLoadingPipeline::close) or a forced reload are
/// dropped.
pub struct TitleLoadingPipeline {
    slug: String,
    catalog: Arc<dyn CatalogService>,
    read_states: Option<Arc<dyn ReadStateStore>>,
    language: ChapterLanguage,
    state: watch::Sender<TitleLoadingState>,
    generation: AtomicU64,
}

impl TitleLoadingPipeline {
    pub fn new(slug: impl Into<String>, catalog: Arc<dyn CatalogService>) -> Self {
        TitleLoadingPipeline {
            slug: slug.into(),
            catalog,
            read_states: None,
            language: ChapterLanguage::default(),
            state: watch::Sender::new(TitleLoadingState::Idle),
            generation: AtomicU64::new(0),
        }
    }

    pub fn with_language(mut self, language: ChapterLanguage) -> Self {
        self.language = language;
        self
    }

    pub fn with_read_states(mut self, store: Arc<dyn ReadStateStore>) -> Self {
        self.read_states = Some(store);
        self
    }

    pub fn subscribe(&self) -> watch::Receiver<TitleLoadingState> {
        self.state.subscribe()
    }

    pub fn state(&self) -> TitleLoadingState {
        self.state.borrow().clone()
    }

    /// Starts loading unless a load is in flight or the title is already ready.
    pub async fn load(&self) {
        let mut generation = None;
        self.state.send_if_modified(|state| match state {
            TitleLoadingState::Idle | TitleLoadingState::Failed(_) => {
                generation = Some(self.generation.load(Ordering::SeqCst));
                *state = TitleLoadingState::LoadingDetail;
                true
            }
            _ => false,
        });

        let Some(generation) = generation else {
            debug!("load of {} ignored, already loading or ready", self.slug);
            return;
        };

        match self.fetch(generation).await {
            Ok(Some(screen)) => {
                debug!(
                    "{} ready with {} chapters in {} groups",
                    self.slug,
                    screen.forest.chapter_count(),
                    screen.forest.roots().len()
                );
                self.transition(generation, TitleLoadingState::Ready(Box::new(screen)));
            }
            Ok(None) => {}
            Err(err) => {
                if self.is_current(generation) {
                    error!("failed to load {}: {err:#}", self.slug);
                } else {
                    debug!("closed load of {} failed: {err:#}", self.slug);
                }
                self.transition(generation, TitleLoadingState::Failed(format!("{err:#}")));
            }
        }
    }

    /// Drops the current forest and runs the whole sequence again.
    pub async fn force_reload(&self) {
        self.close();
        self.load().await;
    }

    /// Returns to `Idle`; anything still in flight is discarded when it lands.
    pub fn close(&self) {
        self.state.send_modify(|state| {
            self.generation.fetch_add(1, Ordering::SeqCst);
            *state = TitleLoadingState::Idle;
        });
    }

    pub fn toggle_expansion(&self, node_id: &str) -> bool {
        self.state.send_if_modified(|state| match state {
            TitleLoadingState::Ready(screen) => screen.forest.toggle_expansion(node_id),
            _ => false,
        })
    }

    pub fn activate(&self, node_id: &str) -> Option<ChapterSelected> {
        let mut activation = Activation::Ignored;
        self.state.send_if_modified(|state| {
            let TitleLoadingState::Ready(screen) = state else {
                warn!("activation on {node_id} before chapters loaded");
                return false;
            };
            let TitleScreen { detail, forest, .. } = screen.as_mut();
            activation = selection::route(forest, node_id, &detail.slug);
            matches!(activation, Activation::Toggled { .. })
        });
        activation.into_selection()
    }

    fn is_current(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    fn transition(&self, generation: u64, next: TitleLoadingState) -> bool {
        let applied = self.state.send_if_modified(|state| {
            if !self.is_current(generation) {
                return false;
            }
            *state = next;
            true
        });
        if !applied {
            warn!("discarding stale result for {}", self.slug);
        }
        applied
    }

    async fn fetch(&self, generation: u64) -> anyhow::Result<Option<TitleScreen>> {
        let detail = self
            .catalog
            .fetch_title_detail(&self.slug)
            .await
            .context("title detail")?;
        if !self.is_current(generation) {
            warn!("discarding stale detail for {}", self.slug);
            return Ok(None);
        }

        let count = self
            .catalog
            .fetch_chapter_count(&detail.hid)
            .await
            .context("chapter count")?;

        let forest = if count == 0 {
            debug!("{} has no chapters", self.slug);
            ChapterForest::default()
        } else {
            if !self.transition(generation, TitleLoadingState::LoadingChapters) {
                return Ok(None);
            }

            let records = self
                .catalog
                .fetch_all_chapters(&detail.hid, count)
                .await
                .context("chapters")?;
            let fetched = records.len();
            let records = self.language.retain(records);
            debug!(
                "{}: kept {} of {fetched} chapters for {:?}",
                self.slug,
                records.len(),
                self.language
            );

            tokio::task::spawn_blocking(move || ChapterForest::build(records))
                .await
                .context("join chapter tree builder")?
        };

        let read_state = self
            .read_states
            .as_ref()
            .and_then(|store| store.get(&detail.hid));

        Ok(Some(TitleScreen {
            detail,
            forest,
            read_state,
        }))
    }
}
