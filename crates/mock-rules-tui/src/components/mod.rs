//! Reusable UI components

mod text_field;

pub use text_field::{FieldAction, TextField};

pub use tui_popup::Popup;
