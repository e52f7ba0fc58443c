pub mod compose;
pub mod html;

pub use compose::{ComposeDraft, build_forward, build_reply};
pub use html::html_to_text;
