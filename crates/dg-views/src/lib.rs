//! The data table widget and its rendering contract
//!
//! [`DataTable`] is the entry point: configure it fluently, feed it
//! [`UserAction`]s, and draw it through any [`TableRenderer`].

pub mod actions;
pub mod export;
pub mod input;
pub mod options;
pub mod render;
pub mod table;

pub use actions::{ActionOutcome, ControlId, InFlight};
pub use export::rows_to_csv;
pub use input::{PageNav, UserAction};
pub use options::{parse_style, style_string, StyleDecl, TableOptions};
pub use render::{FrameRow, PageControls, RenderFrame, TableRenderer, TextRenderer};
pub use table::DataTable;
