pub mod data;
pub mod filters;
pub mod slug;

pub use filters::{both_ranked, either_ranked, not_bye, GameFilter};
pub use slug::slugify;
