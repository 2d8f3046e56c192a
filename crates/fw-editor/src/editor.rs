//! Editor facade.
//!
//! Owns the scene store, viewport, gesture controller, tools and layer tree,
//! and routes host input to them. Pointer drags are bracketed as one store
//! gesture so a whole drag lands as a single undo step; discrete edits go
//! through [`Editor::edit`], which commits exactly one history entry on
//! success.

use crate::config::EditorConfig;
use crate::gesture::{GestureController, GestureOutcome};
use crate::input::InputEvent;
use crate::layers::{DropPosition, LayerRow, LayerTree, apply_drop};
use crate::shortcuts::{ShortcutAction, ShortcutMap};
use crate::store::{Mutation, SceneStore};
use crate::tools::{HandTool, SelectTool, Tool, ToolContext, ToolKind};
use fw_core::{
    Bounds, Document, EditError, ElementId, ElementType, PageId, Point, Size, Viewport,
};
use fw_render::{RenderNode, build_document_list, build_render_list, hit_test};

pub struct Editor {
    store: SceneStore,
    viewport: Viewport,
    gestures: GestureController,
    layers: LayerTree,
    select: SelectTool,
    hand: HandTool,
    tool: ToolKind,
    /// Tool that received the pointer-down of the current drag.
    drag_owner: Option<ToolKind>,
    /// Space held: pointer drags pan regardless of the active tool.
    space_held: bool,
    config: EditorConfig,
}

impl Editor {
    pub fn new(config: EditorConfig) -> Result<Self, EditError> {
        let store = SceneStore::new(config.clone())?;
        Ok(Self::with_store(store, config))
    }

    pub fn with_document(doc: Document, config: EditorConfig) -> Result<Self, EditError> {
        let store = SceneStore::from_document(doc, config.clone())?;
        Ok(Self::with_store(store, config))
    }

    fn with_store(store: SceneStore, config: EditorConfig) -> Self {
        Self {
            store,
            viewport: Viewport::default(),
            gestures: GestureController::new(config.clone()),
            layers: LayerTree::new(),
            select: SelectTool::new(config.handle_radius, config.marquee_min),
            hand: HandTool::new(),
            tool: ToolKind::Select,
            drag_owner: None,
            space_held: false,
            config,
        }
    }

    // ─── Accessors ───────────────────────────────────────────────────────

    pub fn store(&self) -> &SceneStore {
        &self.store
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn tool(&self) -> ToolKind {
        self.tool
    }

    pub fn set_tool(&mut self, tool: ToolKind) {
        self.tool = tool;
    }

    pub fn is_panning(&self) -> bool {
        self.space_held || self.hand.is_dragging()
    }

    /// Screen-space marquee rectangle, while one is being dragged.
    pub fn marquee_rect(&self) -> Option<Bounds> {
        self.select.marquee_rect()
    }

    pub fn resize(&mut self, surface: Size) {
        self.viewport.surface = surface;
    }

    /// Paint-ordered render list of every page.
    pub fn render_list(&self) -> Vec<RenderNode> {
        build_document_list(self.store.document())
    }

    pub fn layer_rows(&self) -> Vec<LayerRow> {
        self.layers.rows(
            self.store.document(),
            self.store.current_page(),
            self.store.selection(),
        )
    }

    pub fn layers_mut(&mut self) -> &mut LayerTree {
        &mut self.layers
    }

    // ─── Edits ───────────────────────────────────────────────────────────

    /// Run one discrete edit and commit it as a single history entry. A
    /// failing edit is rolled back whole and records nothing. A pointer drag
    /// in progress is aborted first.
    pub fn edit<T>(
        &mut self,
        label: &str,
        f: impl FnOnce(&mut SceneStore) -> Result<T, EditError>,
    ) -> Result<T, EditError> {
        self.abort_drag();
        let out = self.store.transaction(f)?;
        self.store.save_to_history(label)?;
        Ok(out)
    }

    /// Cancel the pointer drag in flight, restoring the pre-drag document.
    fn abort_drag(&mut self) {
        let Some(owner) = self.drag_owner.take() else {
            return;
        };
        match owner {
            ToolKind::Select => self.select.cancel(),
            ToolKind::Hand => self.hand.cancel(),
        }
        self.store.cancel_gesture();
        log::debug!("aborted {owner:?} drag");
    }

    /// Insert a default element and select it.
    pub fn add_element(
        &mut self,
        kind: ElementType,
        parent: Option<ElementId>,
    ) -> Result<ElementId, EditError> {
        let label = format!("Insert {}", kind.as_str());
        self.edit(&label, |store| {
            let id = store.add_element(kind, parent)?;
            store.select_element(id, false)?;
            Ok(id)
        })
    }

    /// Layer-tree drop, committed as one edit.
    pub fn drop_layer(
        &mut self,
        dragged: ElementId,
        target: ElementId,
        position: DropPosition,
    ) -> Result<(), EditError> {
        self.edit("Reorder layers", |store| {
            apply_drop(store, dragged, target, position)
        })?;
        self.layers.expand_to(self.store.document(), dragged);
        Ok(())
    }

    pub fn begin_layer_drag(&mut self, id: ElementId) {
        self.layers.begin_drag(id);
    }

    /// Hover a row during a layer drag; `None` means the drop is illegal.
    pub fn hover_layer(&mut self, target: ElementId, y: f32, height: f32) -> Option<DropPosition> {
        self.layers.hover(self.store.document(), target, y, height)
    }

    /// Finish a layer-tree drag session, committing its drop.
    pub fn finish_layer_drag(&mut self) -> Result<bool, EditError> {
        let Self { layers, store, .. } = self;
        let dropped = layers.finish(store)?;
        if dropped {
            store.save_to_history("Reorder layers")?;
        }
        Ok(dropped)
    }

    pub fn undo(&mut self) -> Result<Option<String>, EditError> {
        self.abort_drag();
        self.store.undo()
    }

    pub fn redo(&mut self) -> Result<Option<String>, EditError> {
        self.abort_drag();
        self.store.redo()
    }

    pub fn load(&mut self, doc: Document) -> Result<(), EditError> {
        self.store.load(doc)?;
        self.abort_drag();
        self.layers = LayerTree::new();
        Ok(())
    }

    // ─── Selection & pages ───────────────────────────────────────────────

    /// Replace (or extend) the selection. Unknown ids are dropped.
    pub fn select(&mut self, ids: &[ElementId], additive: bool) {
        self.store.set_selection(ids, additive);
        if let [id] = ids {
            self.layers.expand_to(self.store.document(), *id);
        }
    }

    pub fn add_page(&mut self, name: &str) -> Result<PageId, EditError> {
        self.edit("Add page", |store| Ok(store.add_page(name)))
    }

    pub fn set_current_page(&mut self, page: PageId) -> Result<(), EditError> {
        self.store.set_current_page(page)
    }

    // ─── View ────────────────────────────────────────────────────────────

    fn zoom_by(&mut self, factor: f32) {
        self.gestures.cancel_inertia();
        let zoom = self.config.clamp_zoom(self.viewport.zoom * factor);
        self.viewport.zoom_around(self.viewport.center(), zoom);
    }

    pub fn zoom_in(&mut self) {
        self.zoom_by(self.config.zoom_step);
    }

    pub fn zoom_out(&mut self) {
        self.zoom_by(1.0 / self.config.zoom_step);
    }

    pub fn zoom_reset(&mut self) {
        self.gestures.cancel_inertia();
        self.viewport.reset();
    }

    /// Fit the current page's content into the surface.
    pub fn zoom_to_fit(&mut self) {
        self.gestures.cancel_inertia();
        let nodes = build_render_list(self.store.document(), self.store.current_page());
        if let Some(bounds) = Bounds::union_all(nodes.iter().map(|n| n.bounds)) {
            self.viewport.fit(
                &bounds,
                self.config.fit_padding,
                self.config.min_zoom,
                self.config.max_zoom,
            );
        }
    }

    /// Screen-space centroid of the selection's rendered bounds.
    fn selection_centroid(&self) -> Option<Point> {
        let selection = self.store.selection();
        if selection.is_empty() {
            return None;
        }
        let bounds = Bounds::union_all(
            self.render_list()
                .into_iter()
                .filter(|n| selection.contains(&n.id))
                .map(|n| n.bounds),
        )?;
        Some(self.viewport.canvas_to_screen(bounds.center()))
    }

    /// Advance inertial panning. Returns `true` when a redraw is needed.
    pub fn tick(&mut self, now_ms: f64) -> bool {
        self.gestures.tick(&mut self.viewport, now_ms)
    }

    pub fn is_animating(&self) -> bool {
        self.gestures.is_animating()
    }

    // ─── Input ───────────────────────────────────────────────────────────

    /// Route one host event. Returns `true` when a redraw is needed.
    pub fn handle(&mut self, event: &InputEvent) -> bool {
        match event {
            InputEvent::PointerDown { .. } => {
                self.gestures.cancel_inertia();
                let owner = if self.space_held {
                    ToolKind::Hand
                } else {
                    self.tool
                };
                self.drag_owner = Some(owner);
                self.store.begin_gesture();
                let mutations = self.run_tool(owner, event);
                self.apply(mutations);
                true
            }
            InputEvent::PointerMove { x, y, .. } => match self.drag_owner {
                Some(owner) => {
                    let mutations = self.run_tool(owner, event);
                    self.apply(mutations);
                    true
                }
                None => self.update_hover(Point::new(*x, *y)),
            },
            InputEvent::PointerUp { .. } => {
                let Some(owner) = self.drag_owner.take() else {
                    return false;
                };
                let label = match owner {
                    ToolKind::Select => self.select.gesture_label(),
                    ToolKind::Hand => self.hand.gesture_label(),
                };
                let mutations = self.run_tool(owner, event);
                self.apply(mutations);
                if let Err(err) = self.store.end_gesture(label.unwrap_or("Edit")) {
                    log::error!("could not record gesture: {err}");
                }
                true
            }
            InputEvent::Wheel(wheel) => {
                let target = self.selection_centroid();
                let outcome = self.gestures.on_wheel(&mut self.viewport, wheel, target);
                !matches!(outcome, GestureOutcome::Ignored)
            }
            InputEvent::KeyDown { key, modifiers } => {
                let Some(action) = ShortcutMap::resolve(
                    key,
                    modifiers.ctrl,
                    modifiers.shift,
                    modifiers.alt,
                    modifiers.meta,
                ) else {
                    return false;
                };
                self.perform(action)
            }
            InputEvent::KeyUp { key } => {
                if key == " " && self.space_held {
                    self.space_held = false;
                    return true;
                }
                false
            }
        }
    }

    fn run_tool(&mut self, owner: ToolKind, event: &InputEvent) -> Vec<Mutation> {
        let nodes = build_document_list(self.store.document());
        let mut ctx = ToolContext {
            store: &self.store,
            nodes: &nodes,
            viewport: &mut self.viewport,
        };
        match owner {
            ToolKind::Select => self.select.handle(event, &mut ctx),
            ToolKind::Hand => self.hand.handle(event, &mut ctx),
        }
    }

    /// Apply tool mutations; rejected ones are skipped.
    fn apply(&mut self, mutations: Vec<Mutation>) -> usize {
        mutations
            .into_iter()
            .filter(|m| self.store.apply(m.clone()).is_ok())
            .count()
    }

    fn update_hover(&mut self, screen: Point) -> bool {
        let canvas = self.viewport.screen_to_canvas(screen);
        let hit = hit_test(&self.render_list(), canvas);
        if hit == self.store.hovered() {
            return false;
        }
        self.store.set_hovered(hit);
        true
    }

    /// Dispatch a shortcut action. Returns `true` when something changed.
    pub fn perform(&mut self, action: ShortcutAction) -> bool {
        match self.try_perform(action) {
            Ok(changed) => changed,
            Err(err) => {
                log::debug!("{action:?} not applied: {err}");
                false
            }
        }
    }

    fn try_perform(&mut self, action: ShortcutAction) -> Result<bool, EditError> {
        match action {
            // Tool switching
            ShortcutAction::ToolSelect => self.set_tool(ToolKind::Select),
            ShortcutAction::ToolHand => self.set_tool(ToolKind::Hand),
            ShortcutAction::PanStart => self.space_held = true,

            // Edit
            ShortcutAction::Insert(kind) => {
                self.add_element(kind, None)?;
            }
            ShortcutAction::Delete => {
                self.edit("Delete", SceneStore::delete_selected)?;
            }
            ShortcutAction::Nudge { dx, dy, large } => {
                let step = if large {
                    self.config.nudge_large
                } else {
                    self.config.nudge_small
                };
                self.edit("Nudge", |s| {
                    s.nudge_selection(f32::from(dx) * step, f32::from(dy) * step)
                })?;
            }
            ShortcutAction::Duplicate => {
                self.edit("Duplicate", |s| {
                    let ids = s.selection().to_vec();
                    if ids.is_empty() {
                        return Err(EditError::EmptySelection);
                    }
                    let copies = ids
                        .into_iter()
                        .map(|id| s.duplicate_element(id))
                        .collect::<Result<Vec<_>, _>>()?;
                    s.set_selection(&copies, false);
                    Ok(())
                })?;
            }
            ShortcutAction::Copy => {
                self.store.copy()?;
                return Ok(false);
            }
            ShortcutAction::Cut => {
                self.edit("Cut", SceneStore::cut)?;
            }
            ShortcutAction::Paste => {
                self.edit("Paste", SceneStore::paste)?;
            }
            ShortcutAction::Undo => return Ok(self.undo()?.is_some()),
            ShortcutAction::Redo => return Ok(self.redo()?.is_some()),
            ShortcutAction::SelectAll => self.store.select_all(),
            ShortcutAction::Deselect => self.store.deselect_all(),

            // Structure
            ShortcutAction::Group => {
                self.edit("Group", SceneStore::group_elements)?;
            }
            ShortcutAction::Ungroup => {
                self.edit("Ungroup", SceneStore::ungroup_elements)?;
            }
            ShortcutAction::WrapInFrame => {
                self.edit("Wrap in frame", SceneStore::wrap_in_frame)?;
            }
            ShortcutAction::ToggleLock => {
                self.edit("Toggle lock", |s| {
                    for id in s.selection().to_vec() {
                        s.toggle_lock(id)?;
                    }
                    Ok(())
                })?;
            }
            ShortcutAction::ToggleVisibility => {
                self.edit("Toggle visibility", |s| {
                    for id in s.selection().to_vec() {
                        s.toggle_visibility(id)?;
                    }
                    Ok(())
                })?;
            }

            // View
            ShortcutAction::ZoomIn => self.zoom_in(),
            ShortcutAction::ZoomOut => self.zoom_out(),
            ShortcutAction::ZoomReset => self.zoom_reset(),
            ShortcutAction::ZoomToFit => self.zoom_to_fit(),
        }
        Ok(true)
    }
}
