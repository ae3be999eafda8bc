pub mod tstz_set;
pub mod tstz_span;
pub mod tstz_span_set;

pub use tstz_set::TsTzSet;
pub use tstz_span::TsTzSpan;
pub use tstz_span_set::TsTzSpanSet;
