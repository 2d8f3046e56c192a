pub mod error;
pub mod geometry;
pub mod id;
pub mod layout;
pub mod model;
pub mod validate;
pub mod viewport;

pub use error::EditError;
pub use geometry::{Bounds, Point, Size};
pub use id::{ElementId, PageId};
pub use layout::{
    AxisSizing, FlowItem, Placement, ResolvedLayout, arrange_flow, hug_size, resolve_element,
};
pub use model::*;
pub use validate::{Diagnostic, Severity, validate_document};
pub use viewport::Viewport;
