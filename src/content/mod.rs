//! Content module - post models, normalization and derived fields

mod normalize;
mod post;
mod reading;

pub use normalize::{normalize, normalize_detail, POST_TYPE};
pub use post::{ContentBlock, PostDetail, PostSummary, TextSpan};
pub use reading::{count_words, estimate_reading_minutes, is_edited, WORDS_PER_MINUTE};
