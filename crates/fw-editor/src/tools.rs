//! Tool system for canvas interactions.
//!
//! Each tool translates pointer input into [`Mutation`]s that the editor
//! applies to the store. Tools never write to the document themselves.
//!
//! ## Modifier behaviors
//!
//! | Modifier | Select Tool | Hand Tool |
//! |----------|-------------|-----------|
//! | **Shift** | Toggle on click, axis-constrain drag, additive marquee | — |

use crate::input::{InputEvent, Modifiers};
use crate::store::{Mutation, SceneStore};
use fw_core::{Bounds, Document, ElementId, Point, Size, Viewport};
use fw_render::{RenderNode, container_at, hit_test, hit_test_marquee};

/// The active tool determines how pointer events are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolKind {
    Select,
    Hand,
}

/// What a tool may look at while handling an event.
pub struct ToolContext<'a> {
    pub store: &'a SceneStore,
    /// Render list of the whole document, in paint order.
    pub nodes: &'a [RenderNode],
    pub viewport: &'a mut Viewport,
}

/// Trait for tools that handle input and produce mutations.
pub trait Tool {
    fn kind(&self) -> ToolKind;

    /// Handle a pointer event, returning zero or more mutations.
    fn handle(&mut self, event: &InputEvent, ctx: &mut ToolContext<'_>) -> Vec<Mutation>;

    /// History label for the transform in progress, if any.
    fn gesture_label(&self) -> Option<&'static str> {
        None
    }

    /// Drop any drag in progress without emitting mutations.
    fn cancel(&mut self);
}

// ─── Hand Tool ───────────────────────────────────────────────────────────

/// Drag to pan. Also used for space + drag under any tool.
#[derive(Debug, Default)]
pub struct HandTool {
    last: Option<Point>,
}

impl HandTool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_dragging(&self) -> bool {
        self.last.is_some()
    }
}

impl Tool for HandTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Hand
    }

    fn handle(&mut self, event: &InputEvent, ctx: &mut ToolContext<'_>) -> Vec<Mutation> {
        match event {
            InputEvent::PointerDown { x, y, .. } => self.last = Some(Point::new(*x, *y)),
            InputEvent::PointerMove { x, y, .. } => {
                if let Some(last) = self.last {
                    let now = Point::new(*x, *y);
                    ctx.viewport.pan = ctx.viewport.pan + (now - last);
                    self.last = Some(now);
                }
            }
            InputEvent::PointerUp { .. } => self.last = None,
            _ => {}
        }
        vec![]
    }

    fn cancel(&mut self) {
        self.last = None;
    }
}

// ─── Resize handles ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handle {
    NorthWest,
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
}

impl Handle {
    pub const ALL: [Handle; 8] = [
        Self::NorthWest,
        Self::North,
        Self::NorthEast,
        Self::East,
        Self::SouthEast,
        Self::South,
        Self::SouthWest,
        Self::West,
    ];

    /// Canvas position of this handle on `b`.
    pub fn anchor(self, b: &Bounds) -> Point {
        let c = b.center();
        match self {
            Self::NorthWest => Point::new(b.left(), b.top()),
            Self::North => Point::new(c.x, b.top()),
            Self::NorthEast => Point::new(b.right(), b.top()),
            Self::East => Point::new(b.right(), c.y),
            Self::SouthEast => Point::new(b.right(), b.bottom()),
            Self::South => Point::new(c.x, b.bottom()),
            Self::SouthWest => Point::new(b.left(), b.bottom()),
            Self::West => Point::new(b.left(), c.y),
        }
    }

    fn moves_left(self) -> bool {
        matches!(self, Self::NorthWest | Self::West | Self::SouthWest)
    }

    fn moves_right(self) -> bool {
        matches!(self, Self::NorthEast | Self::East | Self::SouthEast)
    }

    fn moves_top(self) -> bool {
        matches!(self, Self::NorthWest | Self::North | Self::NorthEast)
    }

    fn moves_bottom(self) -> bool {
        matches!(self, Self::SouthWest | Self::South | Self::SouthEast)
    }

    /// New local position and size after dragging this handle by `d`.
    /// Each axis keeps at least 1 unit; the opposite edge stays put.
    pub fn apply(self, position: Point, size: Size, d: Point) -> (Point, Size) {
        let (mut x, mut w) = (position.x, size.width);
        let (mut y, mut h) = (position.y, size.height);
        if self.moves_right() {
            w = (size.width + d.x).max(1.0);
        }
        if self.moves_left() {
            w = (size.width - d.x).max(1.0);
            x = position.x + size.width - w;
        }
        if self.moves_bottom() {
            h = (size.height + d.y).max(1.0);
        }
        if self.moves_top() {
            h = (size.height - d.y).max(1.0);
            y = position.y + size.height - h;
        }
        (Point::new(x, y), Size::new(w, h))
    }
}

// ─── Select Tool ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
enum Drag {
    Idle,
    Moving {
        /// Canvas point where the drag started.
        origin: Point,
        /// Dragged elements with their starting local positions.
        starts: Vec<(ElementId, Point)>,
        moved: bool,
    },
    Resizing {
        id: ElementId,
        handle: Handle,
        origin: Point,
        position: Point,
        size: Size,
        moved: bool,
    },
    /// Screen-space rubber band.
    Marquee {
        start: Point,
        current: Point,
        additive: bool,
    },
}

pub struct SelectTool {
    drag: Drag,
    handle_radius: f32,
    marquee_min: f32,
}

impl SelectTool {
    pub fn new(handle_radius: f32, marquee_min: f32) -> Self {
        Self {
            drag: Drag::Idle,
            handle_radius,
            marquee_min,
        }
    }

    /// Screen-space marquee rectangle while one is being dragged.
    pub fn marquee_rect(&self) -> Option<Bounds> {
        match &self.drag {
            Drag::Marquee { start, current, .. } => Some(Bounds::from_corners(*start, *current)),
            _ => None,
        }
    }

    pub fn is_transforming(&self) -> bool {
        matches!(self.drag, Drag::Moving { .. } | Drag::Resizing { .. })
    }

    /// Resize handle under `screen` on the single selected element.
    fn pick_handle(&self, screen: Point, ctx: &ToolContext<'_>) -> Option<(ElementId, Handle)> {
        let [id] = ctx.store.selection() else {
            return None;
        };
        let el = ctx.store.element(*id)?;
        if el.locked || el.parent.is_none() {
            return None;
        }
        let bounds = ctx.store.absolute_bounds(*id)?;
        Handle::ALL
            .into_iter()
            .find(|h| {
                let at = ctx.viewport.canvas_to_screen(h.anchor(&bounds));
                at.distance(screen) <= self.handle_radius
            })
            .map(|h| (*id, h))
    }

    fn pointer_down(
        &mut self,
        screen: Point,
        modifiers: Modifiers,
        ctx: &ToolContext<'_>,
    ) -> Vec<Mutation> {
        let canvas = ctx.viewport.screen_to_canvas(screen);

        if let Some((id, handle)) = self.pick_handle(screen, ctx)
            && let Some(el) = ctx.store.element(id)
        {
            self.drag = Drag::Resizing {
                id,
                handle,
                origin: canvas,
                position: el.position,
                size: el.size,
                moved: false,
            };
            return vec![];
        }

        let Some(hit) = hit_test(ctx.nodes, canvas) else {
            self.drag = Drag::Marquee {
                start: screen,
                current: screen,
                additive: modifiers.shift,
            };
            return vec![];
        };

        let mut selection = ctx.store.selection().to_vec();
        let mutation = if modifiers.shift {
            if let Some(pos) = selection.iter().position(|s| *s == hit) {
                selection.remove(pos);
            } else {
                selection.push(hit);
            }
            Some(Mutation::ToggleSelect(hit))
        } else if !selection.contains(&hit) {
            selection = vec![hit];
            Some(Mutation::Select {
                ids: vec![hit],
                additive: false,
            })
        } else {
            // Pressing an already-selected element keeps the set for dragging.
            None
        };

        let doc = ctx.store.document();
        let starts = selection
            .iter()
            .filter(|id| is_movable(doc, **id))
            .filter_map(|id| doc.element(*id).map(|el| (*id, el.position)))
            .collect();
        self.drag = Drag::Moving {
            origin: canvas,
            starts,
            moved: false,
        };
        mutation.into_iter().collect()
    }

    fn pointer_move(
        &mut self,
        screen: Point,
        modifiers: Modifiers,
        ctx: &ToolContext<'_>,
    ) -> Vec<Mutation> {
        let canvas = ctx.viewport.screen_to_canvas(screen);
        match &mut self.drag {
            Drag::Idle => vec![],
            Drag::Marquee { current, .. } => {
                *current = screen;
                vec![]
            }
            Drag::Moving {
                origin,
                starts,
                moved,
            } => {
                let mut d = canvas - *origin;
                // Shift: constrain to dominant axis
                if modifiers.shift {
                    if d.x.abs() > d.y.abs() {
                        d.y = 0.0;
                    } else {
                        d.x = 0.0;
                    }
                }
                if d == Point::ZERO && !*moved {
                    return vec![];
                }
                *moved = true;
                starts
                    .iter()
                    .map(|(id, start)| Mutation::Move {
                        id: *id,
                        position: *start + d,
                    })
                    .collect()
            }
            Drag::Resizing {
                id,
                handle,
                origin,
                position,
                size,
                moved,
            } => {
                *moved = true;
                let (position, size) = handle.apply(*position, *size, canvas - *origin);
                vec![Mutation::Reshape {
                    id: *id,
                    position,
                    size,
                }]
            }
        }
    }

    fn pointer_up(&mut self, screen: Point, ctx: &ToolContext<'_>) -> Vec<Mutation> {
        let drag = std::mem::replace(&mut self.drag, Drag::Idle);
        match drag {
            Drag::Idle | Drag::Resizing { .. } => vec![],
            Drag::Moving { starts, moved, .. } => {
                if !moved {
                    return vec![];
                }
                let canvas = ctx.viewport.screen_to_canvas(screen);
                let dragged: Vec<ElementId> = starts.iter().map(|(id, _)| *id).collect();
                let doc = ctx.store.document();
                let Some(target) = container_at(doc, ctx.nodes, canvas, &dragged) else {
                    return vec![];
                };
                dragged
                    .into_iter()
                    .filter(|id| doc.parent(*id) != Some(target))
                    .map(|id| Mutation::Reparent { id, parent: target })
                    .collect()
            }
            Drag::Marquee {
                start, additive, ..
            } => {
                let rect = Bounds::from_corners(start, screen);
                if rect.width > self.marquee_min || rect.height > self.marquee_min {
                    let canvas_rect = ctx.viewport.screen_rect_to_canvas(start, screen);
                    let ids = hit_test_marquee(ctx.store.document(), &canvas_rect);
                    vec![Mutation::Select { ids, additive }]
                } else if additive {
                    vec![]
                } else {
                    vec![Mutation::Deselect]
                }
            }
        }
    }
}

/// Unlocked, not a page root, and placed absolutely by its parent.
fn is_movable(doc: &Document, id: ElementId) -> bool {
    let Some(el) = doc.element(id) else {
        return false;
    };
    let Some(parent) = el.parent.and_then(|p| doc.element(p)) else {
        return false;
    };
    !el.locked && !parent.layout.is_auto()
}

impl Tool for SelectTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Select
    }

    fn handle(&mut self, event: &InputEvent, ctx: &mut ToolContext<'_>) -> Vec<Mutation> {
        match event {
            InputEvent::PointerDown { x, y, modifiers } => {
                self.pointer_down(Point::new(*x, *y), *modifiers, ctx)
            }
            InputEvent::PointerMove { x, y, modifiers } => {
                self.pointer_move(Point::new(*x, *y), *modifiers, ctx)
            }
            InputEvent::PointerUp { x, y, .. } => self.pointer_up(Point::new(*x, *y), ctx),
            _ => vec![],
        }
    }

    fn gesture_label(&self) -> Option<&'static str> {
        match &self.drag {
            Drag::Moving { moved: true, .. } => Some("Move"),
            Drag::Resizing { moved: true, .. } => Some("Resize"),
            _ => None,
        }
    }

    fn cancel(&mut self) {
        self.drag = Drag::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EditorConfig;
    use fw_core::ElementType;
    use fw_render::build_document_list;
    use pretty_assertions::assert_eq;

    fn down(x: f32, y: f32, modifiers: Modifiers) -> InputEvent {
        InputEvent::PointerDown { x, y, modifiers }
    }

    fn mv(x: f32, y: f32, modifiers: Modifiers) -> InputEvent {
        InputEvent::PointerMove { x, y, modifiers }
    }

    fn up(x: f32, y: f32) -> InputEvent {
        InputEvent::PointerUp {
            x,
            y,
            modifiers: Modifiers::NONE,
        }
    }

    /// Store with one 100×100 frame at canvas (0,0), and a viewport whose
    /// surface centre maps to canvas (0,0) at zoom 1.
    fn fixture() -> (SceneStore, ElementId, Viewport) {
        let mut store = SceneStore::new(EditorConfig::default()).unwrap();
        let frame = store.add_element(ElementType::Frame, None).unwrap();
        store.move_element(frame, Point::ZERO).unwrap();
        store
            .resize_element(frame, Size::new(100.0, 100.0))
            .unwrap();
        (store, frame, Viewport::new(Size::new(800.0, 600.0)))
    }

    fn run(
        tool: &mut dyn Tool,
        store: &mut SceneStore,
        vp: &mut Viewport,
        event: InputEvent,
    ) -> Vec<Mutation> {
        let nodes = build_document_list(store.document());
        let mut ctx = ToolContext {
            store: &*store,
            nodes: &nodes,
            viewport: &mut *vp,
        };
        let out = tool.handle(&event, &mut ctx);
        for m in out.clone() {
            store.apply(m).unwrap();
        }
        out
    }

    #[test]
    fn click_selects_and_drag_moves() {
        let (mut store, frame, mut vp) = fixture();
        let mut tool = SelectTool::new(6.0, 5.0);
        // Screen (450,350) is canvas (50,50).
        run(&mut tool, &mut store, &mut vp, down(450.0, 350.0, Modifiers::NONE));
        assert_eq!(store.selection(), &[frame]);

        run(&mut tool, &mut store, &mut vp, mv(480.0, 360.0, Modifiers::NONE));
        assert_eq!(tool.gesture_label(), Some("Move"));
        assert_eq!(store.element(frame).unwrap().position, Point::new(30.0, 10.0));

        run(&mut tool, &mut store, &mut vp, up(480.0, 360.0));
        assert!(!tool.is_transforming());
    }

    #[test]
    fn shift_drag_constrains_to_dominant_axis() {
        let (mut store, frame, mut vp) = fixture();
        let mut tool = SelectTool::new(6.0, 5.0);
        run(&mut tool, &mut store, &mut vp, down(450.0, 350.0, Modifiers::NONE));
        run(&mut tool, &mut store, &mut vp, mv(490.0, 360.0, Modifiers::SHIFT));
        assert_eq!(store.element(frame).unwrap().position, Point::new(40.0, 0.0));
    }

    #[test]
    fn small_marquee_deselects() {
        let (mut store, frame, mut vp) = fixture();
        store.select_element(frame, false).unwrap();
        let mut tool = SelectTool::new(6.0, 5.0);
        run(&mut tool, &mut store, &mut vp, down(700.0, 500.0, Modifiers::NONE));
        assert!(tool.marquee_rect().is_some());
        let out = run(&mut tool, &mut store, &mut vp, up(702.0, 503.0));
        assert_eq!(out, vec![Mutation::Deselect]);
        assert!(store.selection().is_empty());
    }

    #[test]
    fn marquee_selects_intersecting_frames() {
        let (mut store, frame, mut vp) = fixture();
        let mut tool = SelectTool::new(6.0, 5.0);
        // Screen (390,290)-(460,360) is canvas (-10,-10)-(60,60).
        run(&mut tool, &mut store, &mut vp, down(390.0, 290.0, Modifiers::NONE));
        run(&mut tool, &mut store, &mut vp, mv(460.0, 360.0, Modifiers::NONE));
        run(&mut tool, &mut store, &mut vp, up(460.0, 360.0));
        assert_eq!(store.selection(), &[frame]);
    }

    #[test]
    fn corner_handle_resizes_from_opposite_edge() {
        let (mut store, frame, mut vp) = fixture();
        store.select_element(frame, false).unwrap();
        let mut tool = SelectTool::new(6.0, 5.0);
        // North-west handle sits at screen (400,300).
        run(&mut tool, &mut store, &mut vp, down(401.0, 299.0, Modifiers::NONE));
        run(&mut tool, &mut store, &mut vp, mv(421.0, 309.0, Modifiers::NONE));
        assert_eq!(tool.gesture_label(), Some("Resize"));
        let el = store.element(frame).unwrap();
        assert_eq!(el.position, Point::new(20.0, 10.0));
        assert_eq!(el.size, Size::new(80.0, 90.0));
    }

    #[test]
    fn drop_reparents_into_container_under_pointer() {
        let (mut store, frame, mut vp) = fixture();
        let root = store.current_root().unwrap();
        let boxed = store.add_element(ElementType::Box, Some(root)).unwrap();
        store.move_element(boxed, Point::new(300.0, 0.0)).unwrap();
        store.resize_element(boxed, Size::new(20.0, 20.0)).unwrap();

        let mut tool = SelectTool::new(6.0, 5.0);
        // Box centre (310,10) is screen (710,310); drag it onto the frame.
        run(&mut tool, &mut store, &mut vp, down(710.0, 310.0, Modifiers::NONE));
        run(&mut tool, &mut store, &mut vp, mv(450.0, 350.0, Modifiers::NONE));
        let out = run(&mut tool, &mut store, &mut vp, up(450.0, 350.0));
        assert_eq!(
            out,
            vec![Mutation::Reparent {
                id: boxed,
                parent: frame
            }]
        );
        assert_eq!(store.document().parent(boxed), Some(frame));
        assert_eq!(store.element(boxed).unwrap().position, Point::new(40.0, 40.0));
    }

    #[test]
    fn hand_tool_pans() {
        let (mut store, _, mut vp) = fixture();
        let mut tool = HandTool::new();
        run(&mut tool, &mut store, &mut vp, down(10.0, 10.0, Modifiers::NONE));
        run(&mut tool, &mut store, &mut vp, mv(30.0, 5.0, Modifiers::NONE));
        run(&mut tool, &mut store, &mut vp, up(30.0, 5.0));
        assert_eq!(vp.pan, Point::new(20.0, -5.0));
        assert!(!tool.is_dragging());
    }

    #[test]
    fn handle_apply_clamps_to_one_unit() {
        let (pos, size) =
            Handle::East.apply(Point::new(5.0, 5.0), Size::new(10.0, 10.0), Point::new(-50.0, 0.0));
        assert_eq!(pos, Point::new(5.0, 5.0));
        assert_eq!(size, Size::new(1.0, 10.0));
    }
}
