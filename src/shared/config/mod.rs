pub mod environment;
pub mod initialization;

pub use environment::{get_database_filename, Environment, ServerConfig};
pub use initialization::{initialize_logging_system, load_environment_variables};
