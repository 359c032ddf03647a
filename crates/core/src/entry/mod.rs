pub mod model;
pub mod slug;
pub mod validate;

pub use model::{ContentDocument, ContentEntry, Language, NewEntry, UnknownLanguage};
pub use slug::Slug;
pub use validate::ValidationError;
