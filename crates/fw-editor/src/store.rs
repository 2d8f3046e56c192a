//! Scene store: the single writer of the document.
//!
//! Owns pages, elements, selection, hover, clipboard and history. Every
//! operation validates first and writes second, so a rejected operation
//! leaves tree, selection and history untouched. History is never captured
//! implicitly: callers commit with [`SceneStore::save_to_history`] once a
//! user-visible edit is complete.

use crate::config::EditorConfig;
use crate::history::History;
use fw_core::{
    Bounds, Document, EditError, Element, ElementId, ElementType, PageId, Point, Size, StylePatch,
    Styles, validate_document,
};
use fw_render::{Outline, laid_out_size, selection_outline};

/// Store-level edits emitted by tools.
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    Move {
        id: ElementId,
        position: Point,
    },
    /// Position and size together (resize handles move the origin too).
    Reshape {
        id: ElementId,
        position: Point,
        size: Size,
    },
    /// Reparent while keeping the element where it is on the canvas.
    Reparent {
        id: ElementId,
        parent: ElementId,
    },
    Select {
        ids: Vec<ElementId>,
        additive: bool,
    },
    ToggleSelect(ElementId),
    Deselect,
}

fn deny(err: EditError) -> EditError {
    log::warn!("rejected: {err}");
    err
}

pub struct SceneStore {
    doc: Document,
    current_page: PageId,
    /// Ordered set; insertion order is preserved.
    selection: Vec<ElementId>,
    hovered: Option<ElementId>,
    history: History,
    /// Copied fragments, each root-first with its original ids.
    clipboard: Vec<Vec<Element>>,
    /// Document captured by `begin_gesture`, restored by `cancel_gesture`.
    gesture: Option<Document>,
    config: EditorConfig,
}

impl SceneStore {
    /// A store holding one empty page.
    pub fn new(config: EditorConfig) -> Result<Self, EditError> {
        let mut doc = Document::new();
        let page = doc.add_page("Page 1", Point::ZERO, ElementType::Page.default_size());
        let history = History::new(&doc, config.history_depth)?;
        Ok(Self {
            doc,
            current_page: page,
            selection: Vec::new(),
            hovered: None,
            history,
            clipboard: Vec::new(),
            gesture: None,
            config,
        })
    }

    /// A store over an existing document, which must validate cleanly.
    pub fn from_document(doc: Document, config: EditorConfig) -> Result<Self, EditError> {
        let mut store = Self::new(config)?;
        store.load(doc)?;
        Ok(store)
    }

    // ─── Queries ─────────────────────────────────────────────────────────

    /// Serializable view of pages and elements.
    pub fn document(&self) -> &Document {
        &self.doc
    }

    pub fn pages(&self) -> &[fw_core::Page] {
        &self.doc.pages
    }

    pub fn element(&self, id: ElementId) -> Option<&Element> {
        self.doc.element(id)
    }

    pub fn current_page(&self) -> PageId {
        self.current_page
    }

    pub fn current_root(&self) -> Option<ElementId> {
        self.doc.page(self.current_page).map(|p| p.root)
    }

    pub fn selection(&self) -> &[ElementId] {
        &self.selection
    }

    pub fn is_selected(&self, id: ElementId) -> bool {
        self.selection.contains(&id)
    }

    pub fn hovered(&self) -> Option<ElementId> {
        self.hovered
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn history_labels(&self) -> Vec<&str> {
        self.history.labels()
    }

    pub fn clipboard_len(&self) -> usize {
        self.clipboard.len()
    }

    pub fn in_gesture(&self) -> bool {
        self.gesture.is_some()
    }

    /// Canvas-space bounds of `id` when it has a stable absolute position.
    pub fn absolute_bounds(&self, id: ElementId) -> Option<Bounds> {
        match selection_outline(&self.doc, id)? {
            Outline::Absolute(b) => Some(b),
            Outline::Inline => None,
        }
    }

    /// Union of the absolute bounds of the selection.
    pub fn selection_bounds(&self) -> Option<Bounds> {
        Bounds::union_all(self.selection.iter().filter_map(|id| self.absolute_bounds(*id)))
    }

    // ─── Internal checks ─────────────────────────────────────────────────

    fn existing(&self, id: ElementId) -> Result<&Element, EditError> {
        self.doc
            .element(id)
            .ok_or_else(|| deny(EditError::UnknownElement(id)))
    }

    fn unlocked(&self, id: ElementId) -> Result<&Element, EditError> {
        let el = self.existing(id)?;
        if el.locked {
            return Err(deny(EditError::Locked(id)));
        }
        Ok(el)
    }

    fn not_root(&self, id: ElementId) -> Result<&Element, EditError> {
        let el = self.existing(id)?;
        if self.doc.is_page_root(id) {
            return Err(deny(EditError::PageRoot(id)));
        }
        Ok(el)
    }

    fn container(&self, id: ElementId) -> Result<&Element, EditError> {
        let el = self.existing(id)?;
        if !el.is_container() {
            return Err(deny(EditError::NotContainer(id)));
        }
        Ok(el)
    }

    /// All checks a structural move of `id` under `parent` must pass.
    fn check_reparent(&self, id: ElementId, parent: ElementId) -> Result<(), EditError> {
        self.not_root(id)?;
        self.unlocked(id)?;
        self.container(parent)?;
        if parent == id || self.doc.is_ancestor_of(id, parent) {
            return Err(deny(EditError::Cycle {
                element: id,
                target: parent,
            }));
        }
        Ok(())
    }

    fn parent_is_auto(&self, id: ElementId) -> bool {
        self.doc
            .parent(id)
            .and_then(|p| self.doc.element(p))
            .is_some_and(|p| p.layout.is_auto())
    }

    /// Drop selection and hover entries whose ids no longer exist.
    fn prune(&mut self) {
        let doc = &self.doc;
        self.selection.retain(|id| doc.contains(*id));
        if self.hovered.is_some_and(|h| !doc.contains(h)) {
            self.hovered = None;
        }
        if self.doc.page(self.current_page).is_none()
            && let Some(first) = self.doc.pages.first()
        {
            self.current_page = first.id;
        }
    }

    // ─── Element creation & geometry ─────────────────────────────────────

    /// Insert a default `kind` element as the last child of `parent` (or of
    /// the current page root). Absolutely placed children start centred.
    pub fn add_element(
        &mut self,
        kind: ElementType,
        parent: Option<ElementId>,
    ) -> Result<ElementId, EditError> {
        if kind == ElementType::Page {
            return Err(deny(EditError::InvalidType(kind.as_str().to_string())));
        }
        let parent_id = match parent {
            Some(p) => p,
            None => self
                .current_root()
                .ok_or_else(|| deny(EditError::UnknownPage(self.current_page)))?,
        };
        let parent_el = self.container(parent_id)?;
        let parent_size = parent_el.size;
        let flow = parent_el.layout.is_auto();

        let id = self.doc.fresh_element_id(kind);
        let mut el = Element::new(id, kind);
        if !flow {
            el.position = Point::new(
                ((parent_size.width - el.size.width) / 2.0).round(),
                ((parent_size.height - el.size.height) / 2.0).round(),
            );
        }
        self.doc.elements.insert(id, el);
        self.doc.attach(id, parent_id, None);
        log::debug!("added {} `{id}` under `{parent_id}`", kind.as_str());
        Ok(id)
    }

    pub fn move_element(&mut self, id: ElementId, position: Point) -> Result<(), EditError> {
        self.unlocked(id)?;
        if let Some(el) = self.doc.element_mut(id) {
            el.position = position;
        }
        log::trace!("move `{id}` -> {position:?}");
        Ok(())
    }

    /// Set the size; each axis is clamped to at least 1 canvas unit.
    pub fn resize_element(&mut self, id: ElementId, size: Size) -> Result<(), EditError> {
        self.unlocked(id)?;
        if let Some(el) = self.doc.element_mut(id) {
            el.size = Size::new(size.width.max(1.0), size.height.max(1.0));
        }
        log::trace!("resize `{id}` -> {size:?}");
        Ok(())
    }

    /// Move every selected, unlocked, absolutely placed element by `(dx, dy)`.
    /// Returns how many moved.
    pub fn nudge_selection(&mut self, dx: f32, dy: f32) -> Result<usize, EditError> {
        let movable: Vec<ElementId> = self
            .selection
            .iter()
            .copied()
            .filter(|id| {
                self.doc
                    .element(*id)
                    .is_some_and(|el| !el.locked && el.parent.is_some())
                    && !self.parent_is_auto(*id)
            })
            .collect();
        if movable.is_empty() {
            return Err(deny(EditError::EmptySelection));
        }
        for id in &movable {
            if let Some(el) = self.doc.element_mut(*id) {
                el.position = el.position + Point::new(dx, dy);
            }
        }
        Ok(movable.len())
    }

    // ─── Structure ───────────────────────────────────────────────────────

    /// Append `id` to `parent`'s children. Moving to the current parent is a
    /// no-op; self-parenting and parent-into-descendant are rejected.
    pub fn reparent_element(&mut self, id: ElementId, parent: ElementId) -> Result<(), EditError> {
        self.check_reparent(id, parent)?;
        if self.doc.parent(id) == Some(parent) {
            return Ok(());
        }
        self.doc.detach(id);
        self.doc.attach(id, parent, None);
        log::debug!("reparented `{id}` under `{parent}`");
        Ok(())
    }

    /// Reparent and recompute `position` so the element stays at the same
    /// canvas location. Falls back to a plain reparent when either side has
    /// no absolute position (auto-layout ancestry).
    pub fn reparent_preserving_position(
        &mut self,
        id: ElementId,
        parent: ElementId,
    ) -> Result<(), EditError> {
        self.check_reparent(id, parent)?;
        if self.doc.parent(id) == Some(parent) {
            return Ok(());
        }
        let before = self.absolute_bounds(id);
        let target = self.absolute_bounds(parent);
        self.doc.detach(id);
        self.doc.attach(id, parent, None);
        if let (Some(b), Some(p)) = (before, target)
            && let Some(el) = self.doc.element_mut(id)
        {
            el.position = b.origin() - p.origin();
        }
        log::debug!("reparented `{id}` under `{parent}` (position kept)");
        Ok(())
    }

    /// Place `id` at `index` among `parent`'s children, reparenting first if
    /// needed. `index` counts positions after `id` is removed; it is clamped.
    pub fn move_to_index(
        &mut self,
        id: ElementId,
        parent: ElementId,
        index: usize,
    ) -> Result<(), EditError> {
        self.check_reparent(id, parent)?;
        self.doc.detach(id);
        self.doc.attach(id, parent, Some(index));
        log::debug!("placed `{id}` at {index} in `{parent}`");
        Ok(())
    }

    /// Remove `id` and its subtree; prunes selection and hover.
    pub fn delete_element(&mut self, id: ElementId) -> Result<(), EditError> {
        self.not_root(id)?;
        self.unlocked(id)?;
        let removed = self.doc.remove_subtree(id);
        self.prune();
        log::debug!("deleted `{id}` ({} element(s))", removed.len());
        Ok(())
    }

    /// Delete every selected, unlocked, non-root element. Returns how many
    /// were removed.
    pub fn delete_selected(&mut self) -> Result<usize, EditError> {
        let targets: Vec<ElementId> = self
            .selection
            .iter()
            .copied()
            .filter(|id| {
                self.doc.element(*id).is_some_and(|el| !el.locked) && !self.doc.is_page_root(*id)
            })
            .collect();
        if targets.is_empty() {
            return Err(deny(EditError::EmptySelection));
        }
        let mut count = 0;
        for id in targets {
            // An earlier deletion may already have taken this one with its ancestor.
            if self.doc.contains(id) {
                self.doc.remove_subtree(id);
                count += 1;
            }
        }
        self.prune();
        Ok(count)
    }

    /// Deep-copy `id` with fresh ids as its next sibling.
    pub fn duplicate_element(&mut self, id: ElementId) -> Result<ElementId, EditError> {
        self.not_root(id)?;
        let (parent, index) = self
            .doc
            .parent(id)
            .zip(self.doc.index_in_parent(id))
            .ok_or_else(|| deny(EditError::UnknownElement(id)))?;
        let offset = if self.parent_is_auto(id) {
            0.0
        } else {
            self.config.duplicate_offset
        };
        let mut copy = self.doc.clone_subtree(id);
        if let Some(root) = copy.first_mut() {
            root.position = root.position + Point::new(offset, offset);
        }
        let new_id = self
            .doc
            .insert_subtree(copy, parent, Some(index + 1))
            .ok_or_else(|| deny(EditError::UnknownElement(id)))?;
        log::debug!("duplicated `{id}` as `{new_id}`");
        Ok(new_id)
    }

    /// Selected ids sharing one parent, in that parent's child order.
    fn sibling_selection(&self) -> Result<(ElementId, Vec<ElementId>), EditError> {
        if self.selection.is_empty() {
            return Err(deny(EditError::EmptySelection));
        }
        let mut parent = None;
        for id in &self.selection {
            self.not_root(*id)?;
            self.unlocked(*id)?;
            let p = self.doc.parent(*id);
            match parent {
                None => parent = p,
                Some(existing) if p != Some(existing) => {
                    return Err(deny(EditError::MixedParents));
                }
                Some(_) => {}
            }
        }
        let parent = parent.ok_or_else(|| deny(EditError::EmptySelection))?;
        let ordered = self
            .doc
            .children(parent)
            .iter()
            .copied()
            .filter(|c| self.selection.contains(c))
            .collect();
        Ok((parent, ordered))
    }

    /// Create a frame around the selection and move the selection into it,
    /// keeping every element's canvas position. The frame takes the slot of
    /// the first selected sibling and becomes the selection.
    fn enclose_selection(&mut self, name: &str, styles: Styles) -> Result<ElementId, EditError> {
        let (parent, members) = self.sibling_selection()?;
        let bbox = Bounds::union_all(members.iter().filter_map(|id| {
            self.doc
                .element(*id)
                .map(|el| Bounds::from_origin_size(el.position, laid_out_size(&self.doc, el)))
        }))
        .ok_or_else(|| deny(EditError::EmptySelection))?;
        let index = members
            .first()
            .and_then(|first| self.doc.index_in_parent(*first))
            .unwrap_or(0);

        let id = self.doc.fresh_element_id(ElementType::Frame);
        let mut frame = Element::new(id, ElementType::Frame);
        frame.name = name.to_string();
        frame.position = bbox.origin();
        frame.size = bbox.size();
        frame.styles = styles;
        self.doc.elements.insert(id, frame);
        self.doc.attach(id, parent, Some(index));

        for member in &members {
            self.doc.detach(*member);
            self.doc.attach(*member, id, None);
            if let Some(el) = self.doc.element_mut(*member) {
                el.position = el.position - bbox.origin();
            }
        }
        self.selection = vec![id];
        log::debug!("{name} `{id}` wraps {} element(s)", members.len());
        Ok(id)
    }

    pub fn group_elements(&mut self) -> Result<ElementId, EditError> {
        self.enclose_selection("Group", Styles::default())
    }

    pub fn wrap_in_frame(&mut self) -> Result<ElementId, EditError> {
        self.enclose_selection("Frame", Styles::from_iter([("fill", "#FFFFFF")]))
    }

    /// Dissolve every selected container, lifting its children into its
    /// parent at its slot with canvas positions preserved. The lifted
    /// children become the selection.
    pub fn ungroup_elements(&mut self) -> Result<Vec<ElementId>, EditError> {
        if self.selection.is_empty() {
            return Err(deny(EditError::EmptySelection));
        }
        let groups: Vec<ElementId> = self
            .selection
            .iter()
            .copied()
            .filter(|id| {
                !self.doc.is_page_root(*id)
                    && self
                        .doc
                        .element(*id)
                        .is_some_and(|el| el.is_container() && el.parent.is_some())
            })
            .collect();
        if groups.is_empty() {
            return Err(deny(EditError::NotContainer(self.selection[0])));
        }
        for group in &groups {
            self.unlocked(*group)?;
            for child in self.doc.children(*group) {
                self.unlocked(*child)?;
            }
        }

        let mut lifted = Vec::new();
        for group in groups {
            let Some((parent, index)) = self.doc.parent(group).zip(self.doc.index_in_parent(group))
            else {
                continue;
            };
            let origin = self.doc.element(group).map(|g| g.position).unwrap_or_default();
            let children = self.doc.children(group).to_vec();
            for (offset, child) in children.iter().enumerate() {
                self.doc.detach(*child);
                self.doc.attach(*child, parent, Some(index + 1 + offset));
                if let Some(el) = self.doc.element_mut(*child) {
                    el.position = el.position + origin;
                }
            }
            self.doc.remove_subtree(group);
            lifted.extend(children);
        }
        self.selection = lifted.clone();
        self.prune();
        log::debug!("ungrouped into {} element(s)", lifted.len());
        Ok(lifted)
    }

    // ─── Properties ──────────────────────────────────────────────────────

    fn with_element<T>(
        &mut self,
        id: ElementId,
        f: impl FnOnce(&mut Element) -> T,
    ) -> Result<T, EditError> {
        self.existing(id)?;
        self.doc
            .element_mut(id)
            .map(f)
            .ok_or(EditError::UnknownElement(id))
    }

    pub fn update_element_styles(
        &mut self,
        id: ElementId,
        patch: &StylePatch,
    ) -> Result<(), EditError> {
        self.with_element(id, |el| el.styles.merge(patch))
    }

    pub fn update_element_content(
        &mut self,
        id: ElementId,
        content: Option<String>,
    ) -> Result<(), EditError> {
        self.with_element(id, |el| el.content = content)
    }

    pub fn rename_element(&mut self, id: ElementId, name: &str) -> Result<(), EditError> {
        self.with_element(id, |el| el.name = name.to_string())
    }

    /// Returns the new locked state.
    pub fn toggle_lock(&mut self, id: ElementId) -> Result<bool, EditError> {
        self.with_element(id, |el| {
            el.locked = !el.locked;
            el.locked
        })
    }

    /// Returns the new visibility.
    pub fn toggle_visibility(&mut self, id: ElementId) -> Result<bool, EditError> {
        self.with_element(id, |el| {
            el.visible = !el.visible;
            el.visible
        })
    }

    pub fn set_variants(&mut self, id: ElementId, value: serde_json::Value) -> Result<(), EditError> {
        self.with_element(id, |el| el.variants = value)
    }

    pub fn set_interactions(
        &mut self,
        id: ElementId,
        value: serde_json::Value,
    ) -> Result<(), EditError> {
        self.with_element(id, |el| el.interactions = value)
    }

    pub fn set_animations(
        &mut self,
        id: ElementId,
        value: serde_json::Value,
    ) -> Result<(), EditError> {
        self.with_element(id, |el| el.animations = value)
    }

    // ─── Selection ───────────────────────────────────────────────────────

    /// `add == false` replaces the selection with `{id}`.
    pub fn select_element(&mut self, id: ElementId, add: bool) -> Result<(), EditError> {
        self.existing(id)?;
        if !add {
            self.selection.clear();
        }
        if !self.selection.contains(&id) {
            self.selection.push(id);
        }
        Ok(())
    }

    pub fn toggle_selection(&mut self, id: ElementId) -> Result<(), EditError> {
        self.existing(id)?;
        if let Some(pos) = self.selection.iter().position(|s| *s == id) {
            self.selection.remove(pos);
        } else {
            self.selection.push(id);
        }
        Ok(())
    }

    /// Replace (or extend) the selection; unknown ids are skipped.
    pub fn set_selection(&mut self, ids: &[ElementId], additive: bool) {
        if !additive {
            self.selection.clear();
        }
        for id in ids {
            if self.doc.contains(*id) && !self.selection.contains(id) {
                self.selection.push(*id);
            }
        }
    }

    pub fn deselect_all(&mut self) {
        self.selection.clear();
    }

    /// Select every top-level element of the current page.
    pub fn select_all(&mut self) {
        self.selection = self
            .current_root()
            .map(|root| self.doc.children(root).to_vec())
            .unwrap_or_default();
    }

    pub fn set_hovered(&mut self, id: Option<ElementId>) {
        self.hovered = id.filter(|h| self.doc.contains(*h));
    }

    // ─── Clipboard ───────────────────────────────────────────────────────

    /// Selected non-root ids whose ancestors are not also selected.
    fn top_level_selection(&self) -> Vec<ElementId> {
        self.selection
            .iter()
            .copied()
            .filter(|id| self.doc.contains(*id) && !self.doc.is_page_root(*id))
            .filter(|id| {
                !self
                    .selection
                    .iter()
                    .any(|other| self.doc.is_ancestor_of(*other, *id))
            })
            .collect()
    }

    /// Copy the selection into the clipboard. Returns the fragment count.
    pub fn copy(&mut self) -> Result<usize, EditError> {
        let roots = self.top_level_selection();
        if roots.is_empty() {
            return Err(deny(EditError::EmptySelection));
        }
        self.clipboard = roots
            .iter()
            .map(|root| {
                self.doc
                    .subtree(*root)
                    .iter()
                    .filter_map(|id| self.doc.element(*id).cloned())
                    .collect()
            })
            .collect();
        Ok(self.clipboard.len())
    }

    pub fn cut(&mut self) -> Result<usize, EditError> {
        for root in self.top_level_selection() {
            self.unlocked(root)?;
        }
        let count = self.copy()?;
        for root in self.top_level_selection() {
            self.doc.remove_subtree(root);
        }
        self.prune();
        Ok(count)
    }

    /// Paste clipboard fragments with fresh ids into the single selected
    /// container, or the current page root. Pasted roots become the selection.
    pub fn paste(&mut self) -> Result<Vec<ElementId>, EditError> {
        if self.clipboard.is_empty() {
            return Err(deny(EditError::EmptyClipboard));
        }
        let target = match self.selection.as_slice() {
            [only] if self.doc.element(*only).is_some_and(Element::is_container) => *only,
            _ => self
                .current_root()
                .ok_or_else(|| deny(EditError::UnknownPage(self.current_page)))?,
        };
        let flow = self.doc.element(target).is_some_and(|t| t.layout.is_auto());
        let offset = if flow { 0.0 } else { self.config.duplicate_offset };

        let mut pasted = Vec::with_capacity(self.clipboard.len());
        for fragment in &self.clipboard {
            let mut copy = self.doc.reissue_ids(fragment);
            if let Some(root) = copy.first_mut() {
                root.position = root.position + Point::new(offset, offset);
            }
            if let Some(id) = self.doc.insert_subtree(copy, target, None) {
                pasted.push(id);
            }
        }
        self.selection = pasted.clone();
        log::debug!("pasted {} fragment(s) into `{target}`", pasted.len());
        Ok(pasted)
    }

    // ─── Pages ───────────────────────────────────────────────────────────

    /// Add a page to the right of the last one and make it current.
    pub fn add_page(&mut self, name: &str) -> PageId {
        let origin = self
            .doc
            .pages
            .last()
            .map(|last| {
                let width = self.doc.element(last.root).map_or(0.0, |r| r.size.width);
                Point::new(last.origin.x + width + 100.0, last.origin.y)
            })
            .unwrap_or(Point::ZERO);
        let page = self
            .doc
            .add_page(name, origin, ElementType::Page.default_size());
        self.current_page = page;
        self.selection.clear();
        page
    }

    pub fn rename_page(&mut self, page: PageId, name: &str) -> Result<(), EditError> {
        let p = self
            .doc
            .page_mut(page)
            .ok_or_else(|| deny(EditError::UnknownPage(page)))?;
        p.name = name.to_string();
        Ok(())
    }

    pub fn set_current_page(&mut self, page: PageId) -> Result<(), EditError> {
        if self.doc.page(page).is_none() {
            return Err(deny(EditError::UnknownPage(page)));
        }
        if self.current_page != page {
            self.current_page = page;
            self.selection.clear();
        }
        Ok(())
    }

    /// Remove a page with its whole subtree. The last page cannot go.
    pub fn delete_page(&mut self, page: PageId) -> Result<(), EditError> {
        let index = self
            .doc
            .pages
            .iter()
            .position(|p| p.id == page)
            .ok_or_else(|| deny(EditError::UnknownPage(page)))?;
        if self.doc.pages.len() == 1 {
            return Err(deny(EditError::LastPage));
        }
        let removed = self.doc.pages.remove(index);
        self.doc.remove_subtree(removed.root);
        if self.current_page == page {
            let next = index.min(self.doc.pages.len() - 1);
            self.current_page = self.doc.pages[next].id;
        }
        self.prune();
        log::debug!("deleted page `{page}`");
        Ok(())
    }

    // ─── Tool mutations ──────────────────────────────────────────────────

    pub fn apply(&mut self, mutation: Mutation) -> Result<(), EditError> {
        match mutation {
            Mutation::Move { id, position } => self.move_element(id, position),
            Mutation::Reshape { id, position, size } => {
                self.unlocked(id)?;
                self.move_element(id, position)?;
                self.resize_element(id, size)
            }
            Mutation::Reparent { id, parent } => self.reparent_preserving_position(id, parent),
            Mutation::Select { ids, additive } => {
                self.set_selection(&ids, additive);
                Ok(())
            }
            Mutation::ToggleSelect(id) => self.toggle_selection(id),
            Mutation::Deselect => {
                self.deselect_all();
                Ok(())
            }
        }
    }

    // ─── Gestures & history ──────────────────────────────────────────────

    /// Start a continuous gesture; the pre-gesture document is retained.
    pub fn begin_gesture(&mut self) {
        if self.gesture.is_none() {
            self.gesture = Some(self.doc.clone());
        }
    }

    /// Finish the gesture with one history entry if anything changed.
    pub fn end_gesture(&mut self, label: &str) -> Result<bool, EditError> {
        if self.gesture.take().is_none() {
            return Ok(false);
        }
        self.save_to_history(label)
    }

    /// Abort the gesture, restoring the pre-gesture document.
    pub fn cancel_gesture(&mut self) {
        if let Some(before) = self.gesture.take() {
            self.doc = before;
            self.prune();
        }
    }

    /// Run a compound edit all-or-nothing: on `Err` the document, selection
    /// and current page are put back as they were.
    pub fn transaction<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, EditError>,
    ) -> Result<T, EditError> {
        let doc = self.doc.clone();
        let selection = self.selection.clone();
        let page = self.current_page;
        let out = f(self);
        if out.is_err() {
            self.doc = doc;
            self.selection = selection;
            self.current_page = page;
            self.prune();
        }
        out
    }

    /// Commit the current document as one undo step labelled `label`.
    /// Returns `false` when nothing changed since the last commit.
    pub fn save_to_history(&mut self, label: &str) -> Result<bool, EditError> {
        self.history.save(label, &self.doc)
    }

    /// Returns the undone label, or `None` when there is nothing to undo.
    pub fn undo(&mut self) -> Result<Option<String>, EditError> {
        self.cancel_gesture();
        let Some((label, doc)) = self.history.undo()? else {
            return Ok(None);
        };
        self.doc = doc;
        self.prune();
        log::debug!("undo \"{label}\"");
        Ok(Some(label))
    }

    pub fn redo(&mut self) -> Result<Option<String>, EditError> {
        self.cancel_gesture();
        let Some((label, doc)) = self.history.redo()? else {
            return Ok(None);
        };
        self.doc = doc;
        self.prune();
        log::debug!("redo \"{label}\"");
        Ok(Some(label))
    }

    /// Replace the document after validation; history restarts from it.
    pub fn load(&mut self, doc: Document) -> Result<(), EditError> {
        let problems: Vec<String> = validate_document(&doc)
            .into_iter()
            .filter(|d| d.is_blocking())
            .map(|d| format!("{}: {}", d.rule, d.message))
            .collect();
        if !problems.is_empty() {
            return Err(deny(EditError::InvalidDocument(problems)));
        }
        let first = doc
            .pages
            .first()
            .map(|p| p.id)
            .ok_or_else(|| deny(EditError::InvalidDocument(vec!["document has no pages".into()])))?;
        self.history.reset(&doc)?;
        self.doc = doc;
        self.current_page = first;
        self.selection.clear();
        self.hovered = None;
        self.gesture = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn store() -> SceneStore {
        SceneStore::new(EditorConfig::default()).unwrap()
    }

    fn frame_at(s: &mut SceneStore, x: f32, y: f32) -> ElementId {
        let id = s.add_element(ElementType::Frame, None).unwrap();
        s.move_element(id, Point::new(x, y)).unwrap();
        s.resize_element(id, Size::new(100.0, 100.0)).unwrap();
        id
    }

    #[test]
    fn add_centres_in_absolute_parent_and_rejects_leaf_parent() {
        let mut s = store();
        let root = s.current_root().unwrap();
        let frame = s.add_element(ElementType::Frame, None).unwrap();
        assert_eq!(s.document().children(root), &[frame]);
        // page 1440×1024, frame 200×200
        assert_eq!(s.element(frame).unwrap().position, Point::new(620.0, 412.0));

        let text = s.add_element(ElementType::Text, Some(frame)).unwrap();
        let before = s.document().clone();
        assert_eq!(
            s.add_element(ElementType::Box, Some(text)),
            Err(EditError::NotContainer(text))
        );
        assert_eq!(s.document(), &before);
    }

    #[test]
    fn locked_elements_refuse_geometry_changes() {
        let mut s = store();
        let f = frame_at(&mut s, 0.0, 0.0);
        s.toggle_lock(f).unwrap();
        assert_eq!(s.move_element(f, Point::new(5.0, 5.0)), Err(EditError::Locked(f)));
        assert_eq!(s.resize_element(f, Size::new(5.0, 5.0)), Err(EditError::Locked(f)));
        assert_eq!(s.element(f).unwrap().position, Point::ZERO);
    }

    #[test]
    fn locked_members_block_compound_edits() {
        let mut s = store();
        let a = frame_at(&mut s, 0.0, 0.0);
        let b = frame_at(&mut s, 200.0, 0.0);
        let inner = s.add_element(ElementType::Box, Some(b)).unwrap();
        s.toggle_lock(a).unwrap();
        s.toggle_lock(inner).unwrap();
        let before = s.document().clone();

        s.set_selection(&[a, b], false);
        assert_eq!(s.group_elements(), Err(EditError::Locked(a)));
        assert_eq!(s.wrap_in_frame(), Err(EditError::Locked(a)));
        assert_eq!(s.cut(), Err(EditError::Locked(a)));
        assert_eq!(s.clipboard_len(), 0);
        assert_eq!(s.delete_element(a), Err(EditError::Locked(a)));

        s.set_selection(&[b], false);
        assert_eq!(s.ungroup_elements(), Err(EditError::Locked(inner)));
        assert_eq!(s.document(), &before);
        assert_eq!(s.selection(), &[b]);

        // Bulk delete skips locked elements instead of failing.
        s.set_selection(&[a, b], false);
        assert_eq!(s.delete_selected(), Ok(1));
        assert!(s.element(a).is_some());
        assert!(s.element(b).is_none());
    }

    #[test]
    fn failed_transaction_restores_document_and_selection() {
        let mut s = store();
        let a = frame_at(&mut s, 0.0, 0.0);
        let root = s.current_root().unwrap();
        s.set_selection(&[a, root], false);
        let before = s.document().clone();

        let out = s.transaction(|s| {
            for id in s.selection().to_vec() {
                let copy = s.duplicate_element(id)?;
                s.select_element(copy, true)?;
            }
            Ok(())
        });
        assert_eq!(out, Err(EditError::PageRoot(root)));
        assert_eq!(s.document(), &before);
        assert_eq!(s.selection(), &[a, root]);
    }

    #[test]
    fn reparent_rejects_self_and_descendant() {
        let mut s = store();
        let a = frame_at(&mut s, 0.0, 0.0);
        let child = s.add_element(ElementType::Box, Some(a)).unwrap();
        let before = s.document().clone();

        assert!(matches!(s.reparent_element(a, a), Err(EditError::Cycle { .. })));
        assert!(matches!(s.reparent_element(a, child), Err(EditError::Cycle { .. })));
        assert_eq!(s.document(), &before);
    }

    #[test]
    fn reparent_preserving_position_recomputes_offset() {
        let mut s = store();
        let a = frame_at(&mut s, 100.0, 100.0);
        let b = frame_at(&mut s, 130.0, 150.0);
        s.reparent_preserving_position(b, a).unwrap();
        assert_eq!(s.element(b).unwrap().position, Point::new(30.0, 50.0));
        assert_eq!(
            s.absolute_bounds(b),
            Some(Bounds::new(130.0, 150.0, 100.0, 100.0))
        );
    }

    #[test]
    fn delete_prunes_selection_and_children() {
        let mut s = store();
        let a = frame_at(&mut s, 0.0, 0.0);
        let child = s.add_element(ElementType::Text, Some(a)).unwrap();
        s.select_element(a, false).unwrap();
        s.select_element(child, true).unwrap();
        s.delete_element(a).unwrap();
        assert!(s.selection().is_empty());
        assert!(s.element(child).is_none());
        let root = s.current_root().unwrap();
        assert!(s.document().children(root).is_empty());
        assert_eq!(s.delete_element(root), Err(EditError::PageRoot(root)));
    }

    #[test]
    fn group_preserves_canvas_positions() {
        let mut s = store();
        let root = s.current_root().unwrap();
        let lead = frame_at(&mut s, 500.0, 500.0);
        let a = frame_at(&mut s, 40.0, 60.0);
        let b = frame_at(&mut s, 200.0, 10.0);
        s.select_element(b, false).unwrap();
        s.select_element(a, true).unwrap();

        let group = s.group_elements().unwrap();
        let g = s.element(group).unwrap();
        assert_eq!(g.name, "Group");
        assert_eq!(g.position, Point::new(40.0, 10.0));
        assert_eq!(g.size, Size::new(260.0, 150.0));
        assert!(g.styles.is_empty());
        // group takes the slot of the first selected sibling; children keep order
        assert_eq!(s.document().children(root), &[lead, group]);
        assert_eq!(s.document().children(group), &[a, b]);
        assert_eq!(s.absolute_bounds(a), Some(Bounds::new(40.0, 60.0, 100.0, 100.0)));
        assert_eq!(s.selection(), &[group]);

        let lifted = s.ungroup_elements().unwrap();
        assert_eq!(lifted, vec![a, b]);
        assert_eq!(s.document().children(root), &[lead, a, b]);
        assert_eq!(s.element(a).unwrap().position, Point::new(40.0, 60.0));
        assert!(s.element(group).is_none());
    }

    #[test]
    fn group_needs_shared_parent() {
        let mut s = store();
        let a = frame_at(&mut s, 0.0, 0.0);
        let nested = s.add_element(ElementType::Box, Some(a)).unwrap();
        let b = frame_at(&mut s, 200.0, 0.0);
        s.select_element(nested, false).unwrap();
        s.select_element(b, true).unwrap();
        assert_eq!(s.group_elements(), Err(EditError::MixedParents));
        s.deselect_all();
        assert_eq!(s.wrap_in_frame(), Err(EditError::EmptySelection));
    }

    #[test]
    fn wrap_in_frame_fills_white() {
        let mut s = store();
        let a = frame_at(&mut s, 10.0, 10.0);
        s.select_element(a, false).unwrap();
        let wrapper = s.wrap_in_frame().unwrap();
        let w = s.element(wrapper).unwrap();
        assert_eq!(w.name, "Frame");
        assert_eq!(w.styles.get("fill"), Some("#FFFFFF"));
        assert_eq!(s.element(a).unwrap().position, Point::ZERO);
    }

    #[test]
    fn duplicate_inserts_next_sibling_with_offset() {
        let mut s = store();
        let root = s.current_root().unwrap();
        let a = frame_at(&mut s, 10.0, 20.0);
        let tail = frame_at(&mut s, 300.0, 0.0);
        s.add_element(ElementType::Text, Some(a)).unwrap();

        let copy = s.duplicate_element(a).unwrap();
        assert_eq!(s.document().children(root), &[a, copy, tail]);
        assert_eq!(s.element(copy).unwrap().position, Point::new(20.0, 30.0));
        assert_eq!(s.document().children(copy).len(), 1);
        assert_ne!(s.document().children(copy), s.document().children(a));
    }

    #[test]
    fn copy_paste_into_selected_container() {
        let mut s = store();
        let a = frame_at(&mut s, 0.0, 0.0);
        let b = frame_at(&mut s, 300.0, 0.0);
        s.select_element(a, false).unwrap();
        assert_eq!(s.copy(), Ok(1));

        s.select_element(b, false).unwrap();
        let pasted = s.paste().unwrap();
        assert_eq!(s.document().children(b), pasted.as_slice());
        assert_eq!(s.element(pasted[0]).unwrap().position, Point::new(10.0, 10.0));

        // Pasting twice yields distinct ids.
        let again = s.paste().unwrap();
        assert_ne!(again, pasted);
    }

    #[test]
    fn cut_removes_and_paste_restores_elsewhere() {
        let mut s = store();
        let a = frame_at(&mut s, 0.0, 0.0);
        s.select_element(a, false).unwrap();
        s.cut().unwrap();
        assert!(s.element(a).is_none());
        assert!(s.selection().is_empty());
        assert_eq!(s.paste().map(|ids| ids.len()), Ok(1));
    }

    #[test]
    fn pages_cannot_drop_to_zero() {
        let mut s = store();
        let first = s.current_page();
        let second = s.add_page("Second");
        assert_eq!(s.current_page(), second);
        assert_eq!(s.pages()[1].origin, Point::new(1540.0, 0.0));
        s.delete_page(second).unwrap();
        assert_eq!(s.current_page(), first);
        assert_eq!(s.delete_page(first), Err(EditError::LastPage));
    }

    #[test]
    fn gesture_commits_once_and_cancel_restores() {
        let mut s = store();
        let a = frame_at(&mut s, 0.0, 0.0);
        s.save_to_history("setup").unwrap();

        s.begin_gesture();
        for step in 1..=5 {
            s.apply(Mutation::Move {
                id: a,
                position: Point::new(step as f32 * 10.0, 0.0),
            })
            .unwrap();
        }
        assert!(s.end_gesture("Move").unwrap());
        assert_eq!(s.history_labels(), vec!["setup", "Move"]);

        s.begin_gesture();
        s.move_element(a, Point::new(999.0, 999.0)).unwrap();
        s.cancel_gesture();
        assert_eq!(s.element(a).unwrap().position, Point::new(50.0, 0.0));
        assert!(!s.end_gesture("Move").unwrap());
    }

    #[test]
    fn load_rejects_broken_documents() {
        let mut s = store();
        let mut doc = s.document().clone();
        let root = doc.pages[0].root;
        doc.element_mut(root)
            .unwrap()
            .children
            .push(ElementId::intern("store_missing"));
        assert!(matches!(s.load(doc), Err(EditError::InvalidDocument(_))));
    }
}
