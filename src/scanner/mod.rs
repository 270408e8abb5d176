//! Directory listing logic

mod listing;

pub use listing::list_directory;
