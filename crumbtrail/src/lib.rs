pub mod config;

// Include handlers module directly from handlers.rs
#[path = "handlers.rs"]
pub mod handlers;

pub use config::{Settings, load_settings};

// Re-export the seed intake helpers for convenience
pub use handlers::{load_seeds_from_file, load_seeds_from_source, parse_seed_line, parse_url_line};
