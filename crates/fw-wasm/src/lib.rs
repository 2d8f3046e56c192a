//! WASM bridge for Framewright: exposes the editing engine to JavaScript.
//!
//! Compiled via `wasm-pack build --target web`. Every query returns a JSON
//! string and every mutation returns either `bool` (redraw needed) or a JSON
//! outcome `{"ok":true}` / `{"ok":false,"error":"..."}` so the host can
//! surface rejections without exceptions crossing the boundary.

mod render2d;

use fw_core::{
    Document, EditError, ElementId, ElementType, PageId, Severity, Size, StylePatch,
    validate_document,
};
use fw_editor::{
    DeltaMode, DropPosition, Editor, EditorConfig, InputEvent, Modifiers, ShortcutAction,
    ShortcutMap, ToolKind, WheelInput,
};
use serde_json::json;
use wasm_bindgen::prelude::*;
use web_sys::CanvasRenderingContext2d;

/// The WASM-facing canvas controller.
///
/// Wraps one [`Editor`]. All interaction from the host page goes through
/// this struct.
#[wasm_bindgen]
pub struct FwCanvas {
    editor: Editor,
    /// Dark mode flag: `false` = light (default), `true` = dark.
    dark_mode: bool,
}

#[wasm_bindgen]
impl FwCanvas {
    /// Create a controller with default tuning for a surface of the given size.
    #[wasm_bindgen(constructor)]
    pub fn new(width: f64, height: f64) -> Result<FwCanvas, JsValue> {
        Self::build(EditorConfig::default(), width, height)
    }

    /// Create a controller with tuning overrides given as JSON. Missing keys
    /// keep their defaults.
    pub fn with_config(config_json: &str, width: f64, height: f64) -> Result<FwCanvas, JsValue> {
        let config: EditorConfig = serde_json::from_str(config_json)
            .map_err(|e| JsValue::from_str(&format!("invalid config: {e}")))?;
        Self::build(config, width, height)
    }

    /// Render the scene to a Canvas2D context.
    pub fn render(&self, ctx: &CanvasRenderingContext2d) {
        let theme = if self.dark_mode {
            render2d::CanvasTheme::dark()
        } else {
            render2d::CanvasTheme::light()
        };
        let store = self.editor.store();
        let nodes = self.editor.render_list();
        let frame = render2d::Frame {
            nodes: &nodes,
            viewport: self.editor.viewport(),
            selection: store.selection(),
            hovered: store.hovered(),
            marquee: self.editor.marquee_rect(),
        };
        render2d::render_scene(ctx, store.document(), &frame, &theme);
    }

    pub fn set_theme(&mut self, is_dark: bool) {
        self.dark_mode = is_dark;
    }

    pub fn resize(&mut self, width: f64, height: f64) {
        self.editor
            .resize(Size::new(width as f32, height as f32));
    }

    /// Advance inertial panning. Returns `true` while a redraw is needed;
    /// the host keeps its animation frame loop alive until this is `false`.
    pub fn tick(&mut self, time_ms: f64) -> bool {
        self.editor.tick(time_ms)
    }

    pub fn is_animating(&self) -> bool {
        self.editor.is_animating()
    }

    // ─── Pointer & wheel ─────────────────────────────────────────────────

    pub fn handle_pointer_down(
        &mut self,
        x: f32,
        y: f32,
        shift: bool,
        ctrl: bool,
        alt: bool,
        meta: bool,
    ) -> bool {
        let modifiers = modifiers(shift, ctrl, alt, meta);
        self.editor
            .handle(&InputEvent::PointerDown { x, y, modifiers })
    }

    pub fn handle_pointer_move(
        &mut self,
        x: f32,
        y: f32,
        shift: bool,
        ctrl: bool,
        alt: bool,
        meta: bool,
    ) -> bool {
        let modifiers = modifiers(shift, ctrl, alt, meta);
        self.editor
            .handle(&InputEvent::PointerMove { x, y, modifiers })
    }

    pub fn handle_pointer_up(
        &mut self,
        x: f32,
        y: f32,
        shift: bool,
        ctrl: bool,
        alt: bool,
        meta: bool,
    ) -> bool {
        let modifiers = modifiers(shift, ctrl, alt, meta);
        self.editor.handle(&InputEvent::PointerUp { x, y, modifiers })
    }

    /// Handle a `wheel` event. `delta_mode` is `WheelEvent.deltaMode`.
    /// Returns `true` when the viewport changed; the host should then call
    /// `preventDefault` on the event.
    #[allow(clippy::too_many_arguments)]
    pub fn handle_wheel(
        &mut self,
        dx: f32,
        dy: f32,
        delta_mode: u32,
        x: f32,
        y: f32,
        ctrl: bool,
        meta: bool,
        time_ms: f64,
    ) -> bool {
        let wheel = WheelInput {
            dx,
            dy,
            mode: DeltaMode::from_dom(delta_mode),
            modifiers: modifiers(false, ctrl, false, meta),
            pointer: fw_core::Point::new(x, y),
            time_ms,
        };
        self.editor.handle(&InputEvent::Wheel(wheel))
    }

    // ─── Keyboard Shortcut API ───────────────────────────────────────────

    /// Handle a keyboard event. Returns a JSON string:
    /// `{"changed":bool, "action":"<action_name>", "tool":"<tool_name>"}`
    pub fn handle_key(
        &mut self,
        key: &str,
        ctrl: bool,
        shift: bool,
        alt: bool,
        meta: bool,
    ) -> String {
        let tool = tool_kind_to_name(self.editor.tool());
        let Some(action) = ShortcutMap::resolve(key, ctrl, shift, alt, meta) else {
            return json!({ "changed": false, "action": "none", "tool": tool }).to_string();
        };
        let changed = self.editor.perform(action);
        json!({
            "changed": changed,
            "action": action_to_name(action),
            "tool": tool_kind_to_name(self.editor.tool()),
        })
        .to_string()
    }

    /// Handle a key release (ends space-held panning).
    pub fn handle_key_up(&mut self, key: &str) -> bool {
        self.editor.handle(&InputEvent::KeyUp {
            key: key.to_string(),
        })
    }

    pub fn set_tool(&mut self, name: &str) {
        match name {
            "select" => self.editor.set_tool(ToolKind::Select),
            "hand" => self.editor.set_tool(ToolKind::Hand),
            other => log::warn!("unknown tool `{other}`"),
        }
    }

    pub fn get_tool_name(&self) -> String {
        tool_kind_to_name(self.editor.tool()).to_string()
    }

    pub fn zoom_to_fit(&mut self) {
        self.editor.zoom_to_fit();
    }

    // ─── Queries ─────────────────────────────────────────────────────────

    pub fn get_document_json(&self) -> String {
        serde_json::to_string(self.editor.store().document()).unwrap_or_else(|_| "{}".to_string())
    }

    /// Pages in order: `[{"id","name","origin","root","current"}]`.
    pub fn get_pages_json(&self) -> String {
        let store = self.editor.store();
        let current = store.current_page();
        let pages: Vec<_> = store
            .pages()
            .iter()
            .map(|p| {
                json!({
                    "id": p.id,
                    "name": p.name,
                    "origin": p.origin,
                    "root": p.root,
                    "current": p.id == current,
                })
            })
            .collect();
        serde_json::Value::Array(pages).to_string()
    }

    /// Selected element IDs as a JSON array.
    pub fn get_selected_ids(&self) -> String {
        serde_json::to_string(self.editor.store().selection()).unwrap_or_else(|_| "[]".to_string())
    }

    pub fn get_current_page(&self) -> String {
        self.editor.store().current_page().to_string()
    }

    /// Hovered element ID, or an empty string.
    pub fn get_hovered_id(&self) -> String {
        self.editor
            .store()
            .hovered()
            .map(|id| id.to_string())
            .unwrap_or_default()
    }

    /// Visible layer rows of the current page.
    pub fn get_layers_json(&self) -> String {
        serde_json::to_string(&self.editor.layer_rows()).unwrap_or_else(|_| "[]".to_string())
    }

    pub fn get_viewport_json(&self) -> String {
        serde_json::to_string(self.editor.viewport()).unwrap_or_else(|_| "{}".to_string())
    }

    pub fn can_undo(&self) -> bool {
        self.editor.store().can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.editor.store().can_redo()
    }

    // ─── Selection & pages ───────────────────────────────────────────────

    /// Select by ID (e.g. from a layer row click). An empty string clears
    /// the selection. Returns `true` if the selection changed.
    pub fn select_by_id(&mut self, element_id: &str, additive: bool) -> bool {
        if element_id.is_empty() {
            self.editor.select(&[], false);
            return true;
        }
        let id = ElementId::intern(element_id);
        if self.editor.store().element(id).is_none() {
            return false;
        }
        self.editor.select(&[id], additive);
        true
    }

    pub fn add_page(&mut self, name: &str) -> String {
        outcome(self.editor.add_page(name))
    }

    pub fn set_current_page(&mut self, page_id: &str) -> String {
        outcome(self.editor.set_current_page(PageId::intern(page_id)))
    }

    pub fn rename_page(&mut self, page_id: &str, name: &str) -> String {
        let page = PageId::intern(page_id);
        outcome(
            self.editor
                .edit("Rename page", |s| s.rename_page(page, name)),
        )
    }

    pub fn delete_page(&mut self, page_id: &str) -> String {
        let page = PageId::intern(page_id);
        outcome(self.editor.edit("Delete page", |s| s.delete_page(page)))
    }

    // ─── Mutations ───────────────────────────────────────────────────────

    /// Insert an element of type `kind` under `parent_id` (empty = page
    /// root). Returns `{"ok":true,"id":"..."}` on success.
    pub fn add_element(&mut self, kind: &str, parent_id: &str) -> String {
        let Some(kind) = ElementType::parse(kind) else {
            return outcome::<()>(Err(EditError::InvalidType(kind.to_string())));
        };
        let parent = (!parent_id.is_empty()).then(|| ElementId::intern(parent_id));
        match self.editor.add_element(kind, parent) {
            Ok(id) => json!({ "ok": true, "id": id }).to_string(),
            Err(err) => outcome::<()>(Err(err)),
        }
    }

    /// Merge a style patch: `{"fill":"#FF0000","stroke":null}`. A `null`
    /// value removes the key.
    pub fn update_element_styles(&mut self, element_id: &str, patch_json: &str) -> String {
        let patch: StylePatch = match serde_json::from_str(patch_json) {
            Ok(p) => p,
            Err(e) => return parse_failure(&e),
        };
        let id = ElementId::intern(element_id);
        outcome(
            self.editor
                .edit("Edit styles", |s| s.update_element_styles(id, &patch)),
        )
    }

    /// Set text content. An empty string clears it.
    pub fn update_element_content(&mut self, element_id: &str, content: &str) -> String {
        let id = ElementId::intern(element_id);
        let content = (!content.is_empty()).then(|| content.to_string());
        outcome(
            self.editor
                .edit("Edit content", |s| s.update_element_content(id, content)),
        )
    }

    pub fn rename_element(&mut self, element_id: &str, name: &str) -> String {
        let id = ElementId::intern(element_id);
        outcome(self.editor.edit("Rename", |s| s.rename_element(id, name)))
    }

    pub fn toggle_lock(&mut self, element_id: &str) -> String {
        let id = ElementId::intern(element_id);
        outcome(self.editor.edit("Toggle lock", |s| s.toggle_lock(id)))
    }

    pub fn toggle_visibility(&mut self, element_id: &str) -> String {
        let id = ElementId::intern(element_id);
        outcome(
            self.editor
                .edit("Toggle visibility", |s| s.toggle_visibility(id)),
        )
    }

    pub fn set_variants(&mut self, element_id: &str, json: &str) -> String {
        let value = match serde_json::from_str(json) {
            Ok(v) => v,
            Err(e) => return parse_failure(&e),
        };
        let id = ElementId::intern(element_id);
        outcome(self.editor.edit("Edit variants", |s| s.set_variants(id, value)))
    }

    pub fn set_interactions(&mut self, element_id: &str, json: &str) -> String {
        let value = match serde_json::from_str(json) {
            Ok(v) => v,
            Err(e) => return parse_failure(&e),
        };
        let id = ElementId::intern(element_id);
        outcome(
            self.editor
                .edit("Edit interactions", |s| s.set_interactions(id, value)),
        )
    }

    pub fn set_animations(&mut self, element_id: &str, json: &str) -> String {
        let value = match serde_json::from_str(json) {
            Ok(v) => v,
            Err(e) => return parse_failure(&e),
        };
        let id = ElementId::intern(element_id);
        outcome(
            self.editor
                .edit("Edit animations", |s| s.set_animations(id, value)),
        )
    }

    pub fn copy(&mut self) -> bool {
        self.editor.perform(ShortcutAction::Copy);
        self.editor.store().clipboard_len() > 0
    }

    pub fn cut(&mut self) -> bool {
        self.editor.perform(ShortcutAction::Cut)
    }

    pub fn paste(&mut self) -> bool {
        self.editor.perform(ShortcutAction::Paste)
    }

    /// Undo the last committed edit. Returns its label, or an empty string.
    pub fn undo(&mut self) -> String {
        self.editor.undo().ok().flatten().unwrap_or_default()
    }

    /// Redo the last undone edit. Returns its label, or an empty string.
    pub fn redo(&mut self) -> String {
        self.editor.redo().ok().flatten().unwrap_or_default()
    }

    /// Replace the document. Rejected (leaving the current one untouched)
    /// when the JSON does not parse or the document fails validation.
    pub fn load_document_json(&mut self, json: &str) -> String {
        let doc: Document = match serde_json::from_str(json) {
            Ok(d) => d,
            Err(e) => return parse_failure(&e),
        };
        outcome(self.editor.load(doc))
    }

    // ─── Layer tree ──────────────────────────────────────────────────────

    /// Drop `dragged` relative to `target`; `position` is `before`,
    /// `after` or `inside`.
    pub fn drop_layer(&mut self, dragged_id: &str, target_id: &str, position: &str) -> String {
        let Some(position) = parse_drop_position(position) else {
            return json!({ "ok": false, "error": format!("unknown drop position `{position}`") })
                .to_string();
        };
        outcome(self.editor.drop_layer(
            ElementId::intern(dragged_id),
            ElementId::intern(target_id),
            position,
        ))
    }

    pub fn begin_layer_drag(&mut self, element_id: &str) {
        self.editor.begin_layer_drag(ElementId::intern(element_id));
    }

    /// Hover a row at offset `y` within a row of height `height`. Returns
    /// the drop position name, or an empty string when the drop is illegal.
    pub fn hover_layer(&mut self, target_id: &str, y: f32, height: f32) -> String {
        self.editor
            .hover_layer(ElementId::intern(target_id), y, height)
            .map(drop_position_name)
            .unwrap_or_default()
            .to_string()
    }

    pub fn finish_layer_drag(&mut self) -> String {
        match self.editor.finish_layer_drag() {
            Ok(dropped) => json!({ "ok": true, "dropped": dropped }).to_string(),
            Err(err) => outcome::<()>(Err(err)),
        }
    }

    pub fn cancel_layer_drag(&mut self) {
        self.editor.layers_mut().cancel_drag();
    }

    pub fn toggle_layer_collapsed(&mut self, element_id: &str) {
        self.editor
            .layers_mut()
            .toggle_collapsed(ElementId::intern(element_id));
    }
}

impl FwCanvas {
    fn build(config: EditorConfig, width: f64, height: f64) -> Result<FwCanvas, JsValue> {
        console_error_panic_hook_setup();
        console_logger_setup();
        let mut editor = Editor::new(config).map_err(|e| JsValue::from_str(&e.to_string()))?;
        editor.resize(Size::new(width as f32, height as f32));
        Ok(Self {
            editor,
            dark_mode: false,
        })
    }
}

// ─── Helpers ─────────────────────────────────────────────────────────────

fn modifiers(shift: bool, ctrl: bool, alt: bool, meta: bool) -> Modifiers {
    Modifiers {
        shift,
        ctrl,
        alt,
        meta,
    }
}

fn outcome<T>(result: Result<T, EditError>) -> String {
    match result {
        Ok(_) => json!({ "ok": true }).to_string(),
        Err(err) => json!({ "ok": false, "error": err.to_string() }).to_string(),
    }
}

fn parse_failure(err: &serde_json::Error) -> String {
    json!({ "ok": false, "error": format!("invalid JSON: {err}") }).to_string()
}

fn parse_drop_position(name: &str) -> Option<DropPosition> {
    match name {
        "before" => Some(DropPosition::Before),
        "after" => Some(DropPosition::After),
        "inside" => Some(DropPosition::Inside),
        _ => None,
    }
}

fn drop_position_name(position: DropPosition) -> &'static str {
    match position {
        DropPosition::Before => "before",
        DropPosition::After => "after",
        DropPosition::Inside => "inside",
    }
}

fn tool_kind_to_name(kind: ToolKind) -> &'static str {
    match kind {
        ToolKind::Select => "select",
        ToolKind::Hand => "hand",
    }
}

fn action_to_name(action: ShortcutAction) -> &'static str {
    match action {
        ShortcutAction::ToolSelect => "toolSelect",
        ShortcutAction::ToolHand => "toolHand",
        ShortcutAction::Insert(_) => "insert",
        ShortcutAction::Undo => "undo",
        ShortcutAction::Redo => "redo",
        ShortcutAction::Delete => "delete",
        ShortcutAction::SelectAll => "selectAll",
        ShortcutAction::Duplicate => "duplicate",
        ShortcutAction::Copy => "copy",
        ShortcutAction::Cut => "cut",
        ShortcutAction::Paste => "paste",
        ShortcutAction::Nudge { .. } => "nudge",
        ShortcutAction::Group => "group",
        ShortcutAction::Ungroup => "ungroup",
        ShortcutAction::WrapInFrame => "wrapInFrame",
        ShortcutAction::ToggleLock => "toggleLock",
        ShortcutAction::ToggleVisibility => "toggleVisibility",
        ShortcutAction::ZoomIn => "zoomIn",
        ShortcutAction::ZoomOut => "zoomOut",
        ShortcutAction::ZoomReset => "zoomReset",
        ShortcutAction::ZoomToFit => "zoomToFit",
        ShortcutAction::PanStart => "panStart",
        ShortcutAction::Deselect => "deselect",
    }
}

// ─── Console logging & panic hook ────────────────────────────────────────

#[cfg(target_arch = "wasm32")]
struct ConsoleLogger;

#[cfg(target_arch = "wasm32")]
impl log::Log for ConsoleLogger {
    fn enabled(&self, metadata: &log::Metadata<'_>) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &log::Record<'_>) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let msg = JsValue::from_str(&format!("[{}] {}", record.target(), record.args()));
        match record.level() {
            log::Level::Error => web_sys::console::error_1(&msg),
            log::Level::Warn => web_sys::console::warn_1(&msg),
            _ => web_sys::console::log_1(&msg),
        }
    }

    fn flush(&self) {}
}

fn console_logger_setup() {
    #[cfg(target_arch = "wasm32")]
    {
        static LOGGER: ConsoleLogger = ConsoleLogger;
        if log::set_logger(&LOGGER).is_ok() {
            log::set_max_level(log::LevelFilter::Info);
        }
    }
}

fn console_error_panic_hook_setup() {
    #[cfg(target_arch = "wasm32")]
    {
        use std::sync::Once;
        static SET_HOOK: Once = Once::new();
        SET_HOOK.call_once(|| {
            std::panic::set_hook(Box::new(|info| {
                let msg = format!("Framewright WASM panic: {info}");
                web_sys::console::error_1(&msg.into());
            }));
        });
    }
}

// ─── Standalone validation (no canvas needed) ────────────────────────────

/// Validate a document given as JSON. Returns
/// `{"ok":bool,"diagnostics":[{"element","rule","severity","message"}]}`;
/// `ok` is `false` when the JSON does not parse or any finding would block
/// loading.
#[wasm_bindgen]
pub fn validate_document_json(json: &str) -> String {
    let doc: Document = match serde_json::from_str(json) {
        Ok(d) => d,
        Err(e) => return parse_failure(&e),
    };
    let diags = validate_document(&doc);
    let ok = !diags.iter().any(|d| d.is_blocking());
    let diagnostics: Vec<_> = diags
        .iter()
        .map(|d| {
            json!({
                "element": d.element,
                "rule": d.rule,
                "severity": match d.severity {
                    Severity::Error => "error",
                    Severity::Warning => "warning",
                    Severity::Info => "info",
                },
                "message": d.message,
            })
        })
        .collect();
    json!({ "ok": ok, "diagnostics": diagnostics }).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn canvas() -> FwCanvas {
        FwCanvas::new(800.0, 600.0).unwrap()
    }

    fn parse(s: &str) -> serde_json::Value {
        serde_json::from_str(s).unwrap()
    }

    #[test]
    fn add_element_reports_new_id() {
        let mut c = canvas();
        let out = parse(&c.add_element("frame", ""));
        assert_eq!(out["ok"], true);
        let id = out["id"].as_str().unwrap().to_string();
        assert_eq!(parse(&c.get_selected_ids()), json!([id]));
        assert_eq!(c.undo(), "Insert frame");
        assert_eq!(parse(&c.get_selected_ids()), json!([]));
    }

    #[test]
    fn rejections_come_back_as_errors() {
        let mut c = canvas();
        let out = parse(&c.add_element("spaceship", ""));
        assert_eq!(out["ok"], false);
        assert_eq!(out["error"], "invalid element type `spaceship`");

        let out = parse(&c.update_element_styles("nope", "{not json"));
        assert_eq!(out["ok"], false);
        assert!(out["error"].as_str().unwrap().starts_with("invalid JSON"));

        let out = parse(&c.drop_layer("a", "b", "sideways"));
        assert_eq!(out["ok"], false);
    }

    #[test]
    fn style_patch_null_removes_key() {
        let mut c = canvas();
        let id = parse(&c.add_element("frame", ""))["id"]
            .as_str()
            .unwrap()
            .to_string();
        c.update_element_styles(&id, r##"{"fill":"#FF0000","stroke":"#000000"}"##);
        c.update_element_styles(&id, r#"{"stroke":null}"#);
        let doc = parse(&c.get_document_json());
        let styles = &doc["elements"][id.as_str()]["styles"];
        assert_eq!(styles["fill"], "#FF0000");
        assert!(styles.get("stroke").is_none());
    }

    #[test]
    fn key_handler_reports_action_and_tool() {
        let mut c = canvas();
        let out = parse(&c.handle_key("h", false, false, false, false));
        assert_eq!(out["action"], "toolHand");
        assert_eq!(out["tool"], "hand");
        let out = parse(&c.handle_key("F13", false, false, false, false));
        assert_eq!(out["action"], "none");
        assert_eq!(out["changed"], false);
    }

    #[test]
    fn document_round_trips_through_load() {
        let mut c = canvas();
        c.add_element("frame", "");
        let json = c.get_document_json();

        let mut other = canvas();
        assert_eq!(parse(&other.load_document_json(&json))["ok"], true);
        assert_eq!(parse(&other.get_document_json()), parse(&json));
        assert_eq!(parse(&validate_document_json(&json))["ok"], true);
    }

    #[test]
    fn broken_document_is_refused() {
        let mut c = canvas();
        let before = c.get_document_json();
        let mut doc = parse(&before);
        let root = doc["pages"][0]["root"].as_str().unwrap().to_string();
        doc["elements"][root.as_str()]["children"] = json!(["ghost"]);
        let broken = doc.to_string();

        let report = parse(&validate_document_json(&broken));
        assert_eq!(report["ok"], false);
        assert_eq!(report["diagnostics"][0]["severity"], "error");
        assert_eq!(parse(&c.load_document_json(&broken))["ok"], false);
        assert_eq!(c.get_document_json(), before);
    }

    #[test]
    fn pages_list_marks_current() {
        let mut c = canvas();
        c.add_page("Page 2");
        let pages = parse(&c.get_pages_json());
        assert_eq!(pages.as_array().unwrap().len(), 2);
        assert_eq!(pages[0]["current"], false);
        assert_eq!(pages[1]["current"], true);
        assert_eq!(pages[1]["name"], "Page 2");
    }
}
