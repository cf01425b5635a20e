//! Output formats
//!
//!     | Format    | Output                                          |
//!     |-----------|-------------------------------------------------|
//!     | `puppet`  | the canonical manifest text (the default)       |
//!     | `json`    | the tree snapshot, for tooling and debugging    |
//!     | `treeviz` | one line per node, for eyeballing the parse     |
//!
//!     All of them are reached through the [FormatRegistry].

pub mod alignment;
pub mod json;
pub mod puppet;
pub mod registry;
pub mod treeviz;

pub use json::JsonFormatter;
pub use puppet::PuppetFormatter;
pub use registry::{FormatError, FormatRegistry, Formatter};
pub use treeviz::{to_treeviz_str, TreevizFormatter};
