use log::{debug, warn};

use crate::{
    config::READER_URL,
    tree::{ChapterForest, NodeKind},
};

/// Handed to the reader when a chapter row is activated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterSelected {
    pub chapter_id: String,
    pub group_id: String,
    pub label: String,
    pub title_slug: String,
}

impl ChapterSelected {
    pub fn reader_url(&self) -> String {
        format!("{READER_URL}/comic/{}/{}", self.title_slug, self.chapter_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Activation {
    Toggled { expanded: bool },
    Selected(ChapterSelected),
    Ignored,
}

impl Activation {
    pub fn into_selection(self) -> Option<ChapterSelected> {
        match self {
            Activation::Selected(event) => Some(event),
            _ => None,
        }
    }
}

/// Resolves a single interaction on a node of `forest`.
///
/// A non-empty group toggles in place, a parented leaf produces a selection
/// event and nothing else, every other case leaves the forest untouched.
pub fn route(forest: &mut ChapterForest, node_id: &str, title_slug: &str) -> Activation {
    let Some(node) = forest.find_mut(node_id) else {
        warn!("activation on unknown node {node_id}");
        return Activation::Ignored;
    };

    if node.kind() == NodeKind::Group {
        if !node.toggle() {
            warn!("activation on empty group {node_id}");
            return Activation::Ignored;
        }
        debug!("group {} expanded={}", node.label(), node.is_expanded());
        return Activation::Toggled {
            expanded: node.is_expanded(),
        };
    }

    match node.parent_id() {
        Some(parent_id) => Activation::Selected(ChapterSelected {
            chapter_id: node.id().to_string(),
            group_id: parent_id.to_string(),
            label: node.label().to_string(),
            title_slug: title_slug.to_string(),
        }),
        None => {
            warn!("activation on detached chapter {node_id}");
            Activation::Ignored
        }
    }
}
