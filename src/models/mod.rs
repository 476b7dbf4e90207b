pub mod content;

pub use content::{
    ContentItem,
    ContentKind,
    GeneratedPayload,
    ParseContentKindError,
    Rating,
    RatingError,
    ERROR_ITEM_ID,
};
