pub mod config;
pub mod server;
pub mod util;

pub use config::Config;
pub use server::run_server;
