pub mod console;
pub mod json;
pub mod sarif;
pub mod summary;

pub use summary::Summary;

pub const TOOL_NAME: &str = "techval";
