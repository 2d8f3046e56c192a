//! Layer tree: the outline view of one page and its drag-to-reparent rules.
//!
//! Rows are a pre-order flattening of the page tree (collapsed containers
//! hide their descendants). A drag session tracks the dragged row and the
//! row/position it currently hovers; dropping validates first so an illegal
//! drop never touches the store.

use crate::store::SceneStore;
use fw_core::{Document, EditError, ElementId, ElementType, PageId};
use serde::Serialize;
use std::collections::HashSet;

/// Where a dragged row lands relative to the hovered row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DropPosition {
    Before,
    After,
    Inside,
}

/// One visible row of the layer tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LayerRow {
    pub id: ElementId,
    pub depth: usize,
    pub name: String,
    pub kind: ElementType,
    pub has_children: bool,
    pub expanded: bool,
    pub visible: bool,
    pub locked: bool,
    pub selected: bool,
}

/// Decide the drop position for pointer offset `y` inside a row of height
/// `height`. Containers split 25/50/25; leaves split in half.
pub fn drop_intent(doc: &Document, target: ElementId, y: f32, height: f32) -> DropPosition {
    let container = doc.element(target).is_some_and(|el| el.is_container());
    if container {
        if y < height * 0.25 {
            DropPosition::Before
        } else if y > height * 0.75 {
            DropPosition::After
        } else {
            DropPosition::Inside
        }
    } else if y < height * 0.5 {
        DropPosition::Before
    } else {
        DropPosition::After
    }
}

/// Validate a drop of `dragged` at `position` relative to `target` without
/// touching anything.
pub fn check_drop(
    doc: &Document,
    dragged: ElementId,
    target: ElementId,
    position: DropPosition,
) -> Result<(), EditError> {
    let el = doc
        .element(dragged)
        .ok_or(EditError::UnknownElement(dragged))?;
    let target_el = doc
        .element(target)
        .ok_or(EditError::UnknownElement(target))?;
    if dragged == target || doc.is_ancestor_of(dragged, target) {
        return Err(EditError::Cycle {
            element: dragged,
            target,
        });
    }
    if doc.is_page_root(dragged) {
        return Err(EditError::PageRoot(dragged));
    }
    if el.locked {
        return Err(EditError::Locked(dragged));
    }
    match position {
        DropPosition::Inside if !target_el.is_container() => {
            Err(EditError::NotContainer(target))
        }
        DropPosition::Before | DropPosition::After if doc.is_page_root(target) => {
            Err(EditError::PageRoot(target))
        }
        _ => Ok(()),
    }
}

/// Perform a validated drop. `Inside` appends to `target`; `Before`/`After`
/// move `dragged` into `target`'s parent right next to `target`.
pub fn apply_drop(
    store: &mut SceneStore,
    dragged: ElementId,
    target: ElementId,
    position: DropPosition,
) -> Result<(), EditError> {
    if let Err(err) = check_drop(store.document(), dragged, target, position) {
        log::warn!("layer drop rejected: {err}");
        return Err(err);
    }
    if position == DropPosition::Inside {
        return store.reparent_element(dragged, target);
    }
    let doc = store.document();
    let parent = doc
        .parent(target)
        .ok_or(EditError::PageRoot(target))?;
    // Index of `target` once `dragged` is out of the list.
    let slot = doc
        .children(parent)
        .iter()
        .filter(|c| **c != dragged)
        .position(|c| *c == target)
        .ok_or(EditError::UnknownElement(target))?;
    let index = match position {
        DropPosition::After => slot + 1,
        _ => slot,
    };
    store.move_to_index(dragged, parent, index)
}

/// An in-progress row drag.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayerDrag {
    pub dragged: ElementId,
    pub hover: Option<(ElementId, DropPosition)>,
}

#[derive(Debug, Default)]
pub struct LayerTree {
    collapsed: HashSet<ElementId>,
    drag: Option<LayerDrag>,
}

impl LayerTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_collapsed(&self, id: ElementId) -> bool {
        self.collapsed.contains(&id)
    }

    pub fn toggle_collapsed(&mut self, id: ElementId) {
        if !self.collapsed.remove(&id) {
            self.collapsed.insert(id);
        }
    }

    /// Expand every ancestor of `id` so its row is visible.
    pub fn expand_to(&mut self, doc: &Document, id: ElementId) {
        for ancestor in doc.ancestors(id) {
            self.collapsed.remove(&ancestor);
        }
    }

    /// Visible rows of `page` below its root, in pre-order.
    pub fn rows(&self, doc: &Document, page: PageId, selection: &[ElementId]) -> Vec<LayerRow> {
        let mut rows = Vec::new();
        if let Some(page) = doc.page(page) {
            for child in doc.children(page.root) {
                self.push_rows(doc, *child, 0, selection, &mut rows);
            }
        }
        rows
    }

    fn push_rows(
        &self,
        doc: &Document,
        id: ElementId,
        depth: usize,
        selection: &[ElementId],
        out: &mut Vec<LayerRow>,
    ) {
        let Some(el) = doc.element(id) else {
            return;
        };
        let expanded = !self.collapsed.contains(&id);
        out.push(LayerRow {
            id,
            depth,
            name: el.name.clone(),
            kind: el.kind,
            has_children: !el.children.is_empty(),
            expanded,
            visible: el.visible,
            locked: el.locked,
            selected: selection.contains(&id),
        });
        if expanded {
            for child in &el.children {
                self.push_rows(doc, *child, depth + 1, selection, out);
            }
        }
    }

    // ─── Drag session ────────────────────────────────────────────────────

    pub fn begin_drag(&mut self, id: ElementId) {
        self.drag = Some(LayerDrag {
            dragged: id,
            hover: None,
        });
    }

    /// Update the hovered row. Returns the resolved intent when the drop
    /// would be legal, otherwise clears the hover.
    pub fn hover(
        &mut self,
        doc: &Document,
        target: ElementId,
        y: f32,
        height: f32,
    ) -> Option<DropPosition> {
        let drag = self.drag.as_mut()?;
        let position = drop_intent(doc, target, y, height);
        drag.hover = check_drop(doc, drag.dragged, target, position)
            .ok()
            .map(|()| (target, position));
        drag.hover.map(|(_, p)| p)
    }

    pub fn drag(&self) -> Option<LayerDrag> {
        self.drag
    }

    pub fn cancel_drag(&mut self) {
        self.drag = None;
    }

    /// End the drag, applying the hovered drop if there is one. Returns
    /// `Ok(false)` when nothing was hovered.
    pub fn finish(&mut self, store: &mut SceneStore) -> Result<bool, EditError> {
        let Some(LayerDrag {
            dragged,
            hover: Some((target, position)),
        }) = self.drag.take()
        else {
            return Ok(false);
        };
        apply_drop(store, dragged, target, position)?;
        self.expand_to(store.document(), dragged);
        Ok(true)
    }
}
