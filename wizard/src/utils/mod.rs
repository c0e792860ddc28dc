pub mod config;
pub mod files;
pub mod logging;
pub mod path_resolver;
pub mod validation;
