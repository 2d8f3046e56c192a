//! Editing engine: scene store, history, tools, gestures and layer tree.

pub mod config;
pub mod editor;
pub mod gesture;
pub mod history;
pub mod input;
pub mod layers;
pub mod shortcuts;
pub mod store;
pub mod tools;

pub use config::EditorConfig;
pub use editor::Editor;
pub use gesture::{GestureController, GestureOutcome, WheelGesture};
pub use input::{DeltaMode, InputEvent, Modifiers, WheelInput};
pub use layers::{DropPosition, LayerRow, LayerTree};
pub use shortcuts::{ShortcutAction, ShortcutMap};
pub use store::{Mutation, SceneStore};
pub use tools::{Handle, ToolKind};
