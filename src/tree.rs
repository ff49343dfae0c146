use std::{collections::HashMap, fmt::Display};

use uuid::Uuid;

use crate::models::ChapterRecord;

pub const UNGROUPED_LABEL: &str = "(no group)";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Group,
    Leaf,
}

/// A scan group or one of its chapters.
///
/// Groups own their leaves; a leaf only remembers the id of its group. The
/// parent id is assigned when the group is constructed and never changes.
#[derive(Debug, Clone)]
pub struct ChapterNode {
    id: String,
    label: String,
    kind: NodeKind,
    children: Vec<ChapterNode>,
    expanded: bool,
    parent_id: Option<String>,
}

impl ChapterNode {
    pub fn leaf(id: impl Into<String>, label: impl Into<String>) -> ChapterNode {
        ChapterNode {
            id: id.into(),
            label: label.into(),
            kind: NodeKind::Leaf,
            children: vec![],
            expanded: false,
            parent_id: None,
        }
    }

    /// Every child becomes a leaf owned by this group.
    pub fn group(
        id: impl Into<String>,
        label: impl Into<String>,
        leaves: Vec<ChapterNode>,
    ) -> ChapterNode {
        let id = id.into();
        let children = leaves
            .into_iter()
            .map(|leaf| ChapterNode {
                kind: NodeKind::Leaf,
                children: vec![],
                expanded: false,
                parent_id: Some(id.clone()),
                ..leaf
            })
            .collect();

        ChapterNode {
            id,
            label: label.into(),
            kind: NodeKind::Group,
            children,
            expanded: false,
            parent_id: None,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn kind(&self) -> NodeKind {
        self.kind
    }

    pub fn children(&self) -> &[ChapterNode] {
        &self.children
    }

    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    pub fn parent_id(&self) -> Option<&str> {
        self.parent_id.as_deref()
    }

    pub fn is_group(&self) -> bool {
        self.kind == NodeKind::Group
    }

    /// Flips `expanded` on a non-empty group. Returns whether anything changed.
    pub fn toggle(&mut self) -> bool {
        if !self.is_group() || self.children.is_empty() {
            return false;
        }
        self.expanded = !self.expanded;
        true
    }
}

/// One visible line of the chapter list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterRow {
    pub id: String,
    pub label: String,
    pub depth: usize,
    pub kind: NodeKind,
    pub expanded: bool,
}

impl Display for ChapterRow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let indent = "    ".repeat(self.depth);
        match (self.kind, self.expanded) {
            (NodeKind::Group, true) => write!(f, "{indent}▾ {}", self.label),
            (NodeKind::Group, false) => write!(f, "{indent}▸ {}", self.label),
            (NodeKind::Leaf, _) => write!(f, "{indent}{}", self.label),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ChapterForest {
    roots: Vec<ChapterNode>,
}

impl ChapterForest {
    pub fn from_roots(roots: Vec<ChapterNode>) -> ChapterForest {
        ChapterForest { roots }
    }

    /// Groups records by their primary scan group.
    ///
    /// Groups appear in the order their name is first seen and leaves keep the
    /// input order. Records without a group share a synthetic `(no group)` group.
    pub fn build(records: impl IntoIterator<Item = ChapterRecord>) -> ChapterForest {
        let mut index: HashMap<Option<String>, usize> = HashMap::new();
        let mut groups: Vec<(String, Vec<ChapterNode>)> = vec![];

        for record in records {
            let leaf = ChapterNode::leaf(record.id.clone(), record.display_label());
            let slot = *index.entry(record.group_name.clone()).or_insert_with(|| {
                let label = record
                    .group_name
                    .clone()
                    .unwrap_or_else(|| UNGROUPED_LABEL.to_string());
                groups.push((label, vec![]));
                groups.len() - 1
            });
            groups[slot].1.push(leaf);
        }

        let roots = groups
            .into_iter()
            .map(|(label, leaves)| ChapterNode::group(Uuid::new_v4().to_string(), label, leaves))
            .collect();

        ChapterForest { roots }
    }

    pub fn roots(&self) -> &[ChapterNode] {
        &self.roots
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    pub fn find(&self, id: &str) -> Option<&ChapterNode> {
        self.roots.iter().find_map(|root| {
            if root.id == id {
                Some(root)
            } else {
                root.children.iter().find(|child| child.id == id)
            }
        })
    }

    pub(crate) fn find_mut(&mut self, id: &str) -> Option<&mut ChapterNode> {
        for root in self.roots.iter_mut() {
            if root.id == id {
                return Some(root);
            }
            if let Some(child) = root.children.iter_mut().find(|child| child.id == id) {
                return Some(child);
            }
        }
        None
    }

    pub fn toggle_expansion(&mut self, id: &str) -> bool {
        self.find_mut(id).is_some_and(ChapterNode::toggle)
    }

    pub fn rows(&self) -> Vec<ChapterRow> {
        fn visit(node: &ChapterNode, depth: usize, rows: &mut Vec<ChapterRow>) {
            rows.push(ChapterRow {
                id: node.id.clone(),
                label: node.label.clone(),
                depth,
                kind: node.kind,
                expanded: node.expanded,
            });
            if node.expanded {
                for child in &node.children {
                    visit(child, depth + 1, rows);
                }
            }
        }

        let mut rows = vec![];
        for root in &self.roots {
            visit(root, 0, &mut rows);
        }
        rows
    }

    pub fn chapter_count(&self) -> usize {
        self.roots.iter().map(|root| root.children.len()).sum()
    }
}
