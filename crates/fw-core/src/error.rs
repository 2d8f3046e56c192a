use crate::id::{ElementId, PageId};
use std::fmt;

/// Why a mutation was rejected. A rejected mutation never writes anything.
#[derive(Debug, Clone, PartialEq)]
pub enum EditError {
    UnknownElement(ElementId),
    UnknownPage(PageId),
    Locked(ElementId),
    /// Reparenting `element` under `target` would make it its own ancestor.
    Cycle { element: ElementId, target: ElementId },
    NotContainer(ElementId),
    /// Page roots cannot be moved out of, deleted from, or grouped within their page.
    PageRoot(ElementId),
    EmptySelection,
    /// The operation needs every selected element to share one parent.
    MixedParents,
    InvalidType(String),
    LastPage,
    EmptyClipboard,
    Snapshot(String),
    InvalidDocument(Vec<String>),
}

impl fmt::Display for EditError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownElement(id) => write!(f, "unknown element `{id}`"),
            Self::UnknownPage(id) => write!(f, "unknown page `{id}`"),
            Self::Locked(id) => write!(f, "element `{id}` is locked"),
            Self::Cycle { element, target } => {
                write!(f, "cannot move `{element}` into its own descendant `{target}`")
            }
            Self::NotContainer(id) => write!(f, "element `{id}` cannot contain children"),
            Self::PageRoot(id) => write!(f, "`{id}` is a page root"),
            Self::EmptySelection => f.write_str("nothing is selected"),
            Self::MixedParents => f.write_str("selected elements do not share a parent"),
            Self::InvalidType(t) => write!(f, "invalid element type `{t}`"),
            Self::LastPage => f.write_str("cannot delete the last page"),
            Self::EmptyClipboard => f.write_str("clipboard is empty"),
            Self::Snapshot(msg) => write!(f, "history snapshot failed: {msg}"),
            Self::InvalidDocument(problems) => {
                write!(f, "invalid document: {}", problems.join("; "))
            }
        }
    }
}

impl std::error::Error for EditError {}
