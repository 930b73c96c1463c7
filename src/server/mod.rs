pub mod batch;
pub mod context;
pub mod file_store;
pub mod handlers;
pub mod patch;
pub mod protocol;
pub mod task;
pub mod ws;

pub use context::{CommandError, ServerContext};
pub use file_store::{DirEntryInfo, FileStore};
pub use protocol::{Command, ItemResult, Response, ResponseBody, Status};
pub use ws::{process_message, run_server, serve};
