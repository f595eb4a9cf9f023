//! The recursive item tree that drives a template's content

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while building an [`Item`] from its flat engine shape
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ItemError {
    #[error("value of item '{label}' must be a finite number")]
    NonFiniteValue { label: String },

    #[error("item '{label}' cannot carry both a value and children")]
    ValueWithChildren { label: String },
}

/// One node of the data tree.
///
/// Leaves may carry a numeric `value`; branches carry `children`. The JSON form
/// is the flat shape the engine consumes (`{label, desc, value, icon, illus,
/// children}`), so validation happens once, when the tree is built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawItem", into = "RawItem")]
pub struct Item {
    pub label: String,
    pub desc: Option<String>,
    pub icon: Option<String>,
    pub illus: Option<String>,
    pub kind: ItemKind,
}

/// Leaf or branch
#[derive(Debug, Clone, PartialEq)]
pub enum ItemKind {
    Leaf { value: Option<f64> },
    Branch { children: Vec<Item> },
}

impl Item {
    /// A leaf with only a label
    pub fn leaf(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            desc: None,
            icon: None,
            illus: None,
            kind: ItemKind::Leaf { value: None },
        }
    }

    /// A branch with the given children
    pub fn branch(label: impl Into<String>, children: Vec<Item>) -> Self {
        Self {
            kind: ItemKind::Branch { children },
            ..Self::leaf(label)
        }
    }

    /// Set the description
    pub fn with_desc(mut self, desc: impl Into<String>) -> Self {
        self.desc = Some(desc.into());
        self
    }

    /// Set the icon reference (e.g. `mdi/rocket-launch`)
    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    /// Set the illustration name
    pub fn with_illus(mut self, illus: impl Into<String>) -> Self {
        self.illus = Some(illus.into());
        self
    }

    /// Set the numeric value, validating it.
    ///
    /// Fails on non-finite numbers and on branches.
    pub fn with_value(mut self, value: f64) -> Result<Self, ItemError> {
        if !value.is_finite() {
            return Err(ItemError::NonFiniteValue { label: self.label });
        }
        match &mut self.kind {
            ItemKind::Leaf { value: slot } => *slot = Some(value),
            ItemKind::Branch { .. } => {
                return Err(ItemError::ValueWithChildren { label: self.label })
            }
        }
        Ok(self)
    }

    pub fn value(&self) -> Option<f64> {
        match self.kind {
            ItemKind::Leaf { value } => value,
            ItemKind::Branch { .. } => None,
        }
    }

    /// Children of a branch; empty for leaves
    pub fn children(&self) -> &[Item] {
        match &self.kind {
            ItemKind::Leaf { .. } => &[],
            ItemKind::Branch { children } => children,
        }
    }

    pub fn is_branch(&self) -> bool {
        matches!(self.kind, ItemKind::Branch { .. })
    }

    /// Depth of the subtree rooted here (a leaf has depth 1)
    pub fn depth(&self) -> usize {
        1 + self.children().iter().map(Item::depth).max().unwrap_or(0)
    }

    /// Number of leaves in the subtree rooted here (a branch with no children counts as one)
    pub fn leaf_count(&self) -> usize {
        match self.children() {
            [] => 1,
            children => children.iter().map(Item::leaf_count).sum(),
        }
    }
}

/// Flat wire shape shared with the engine
#[derive(Serialize, Deserialize)]
struct RawItem {
    label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    desc: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    illus: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    children: Option<Vec<Item>>,
}

impl TryFrom<RawItem> for Item {
    type Error = ItemError;

    fn try_from(raw: RawItem) -> Result<Self, Self::Error> {
        let kind = match (raw.value, raw.children) {
            (Some(_), Some(_)) => return Err(ItemError::ValueWithChildren { label: raw.label }),
            (_, Some(children)) => ItemKind::Branch { children },
            (Some(value), None) if !value.is_finite() => {
                return Err(ItemError::NonFiniteValue { label: raw.label })
            }
            (value, None) => ItemKind::Leaf { value },
        };
        Ok(Item {
            label: raw.label,
            desc: raw.desc,
            icon: raw.icon,
            illus: raw.illus,
            kind,
        })
    }
}

impl From<Item> for RawItem {
    fn from(item: Item) -> Self {
        let (value, children) = match item.kind {
            ItemKind::Leaf { value } => (value, None),
            ItemKind::Branch { children } => (None, Some(children)),
        };
        RawItem {
            label: item.label,
            desc: item.desc,
            value,
            icon: item.icon,
            illus: item.illus,
            children,
        }
    }
}
