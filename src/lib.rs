#![forbid(unsafe_code)]

pub mod catalog;
pub mod config;
pub mod errors;
pub mod logging;
pub mod models;
pub mod pipeline;
pub mod read_state;
pub mod selection;
pub mod tree;

pub use crate::catalog::{CatalogService, ComickClient};
pub use crate::pipeline::{TitleLoadingPipeline, TitleLoadingState, TitleScreen};
pub use crate::selection::ChapterSelected;
pub use crate::tree::{ChapterForest, ChapterNode, ChapterRow, NodeKind};
