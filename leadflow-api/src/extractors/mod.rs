//! Request extractors that reject with the API's `{"error": ...}` body.

mod json;
mod path_id;

pub use json::JsonBody;
pub use path_id::{PathId, PathIds};
