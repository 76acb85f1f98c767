// Include handlers module directly from handlers.rs
#[path = "handlers.rs"]
pub mod handlers;

pub use handlers::{
    build_orchestrator, build_request, initialize, load_urls_from_file, parse_url_line,
};
