pub mod commands;
pub mod handlers;

pub use commands::{CLAP_STYLING, command_argument_builder};
pub use handlers::{
    EXIT_ERROR, EXIT_FOUND, EXIT_NOT_FOUND, build_links_source, build_search_request, exit_code,
    handle_links, handle_search, init_tracing,
};
