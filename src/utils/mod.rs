pub mod filesystem;
pub mod first_error;
pub mod humanize;
pub mod reorder;
