#[allow(clippy::module_inception)]
pub mod r#box;
pub mod stbox;
pub mod tbox;

pub use r#box::BoundingBox;
pub use stbox::STBox;
pub use tbox::TBox;
