pub mod hit;
pub mod paint;
pub mod scene;

pub use hit::{Outline, container_at, hit_test, hit_test_marquee, marquee_select, selection_outline};
pub use paint::{paint_scene, view_transform};
pub use scene::{
    Anchor, RenderNode, build_document_list, build_render_list, laid_out_size, measure,
};
