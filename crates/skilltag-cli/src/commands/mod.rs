//! Command implementations.

pub mod config;
pub mod extract;
pub mod import;
pub mod papers;
pub mod skills;

pub use self::config::execute_config;
pub use self::extract::execute_extract;
pub use self::import::execute_import;
pub use self::papers::execute_papers;
pub use self::skills::execute_skills;
