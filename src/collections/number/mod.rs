pub mod float_span;

pub use float_span::{FloatSpan, FloatSpanSet};
