//! Single-file commands: get-file, create-file, and the directory listing.

use tracing::info;

use crate::server::context::{CommandError, ServerContext};
use crate::server::file_store::{matches_filter, normalize_extensions, wire_join};
use crate::server::handlers::CommandOutput;
use crate::server::protocol::{ListingEntry, ResponseBody};

/// Extensions whose content is decoded inline by list-files; everything
/// else is reported as binary with null content.
const TEXT_EXTENSIONS: &[&str] = &[
    ".py", ".json", ".txt", ".md", ".yml", ".yaml", ".ini", ".cfg",
];

pub async fn get_file(ctx: &ServerContext, path: &str) -> Result<CommandOutput, CommandError> {
    info!(path, "get-file");
    let bytes = ctx.store.read(path).await?;
    let content = String::from_utf8_lossy(&bytes).into_owned();
    Ok(CommandOutput::success(ResponseBody::File {
        path: path.to_string(),
        content,
    }))
}

pub async fn create_file(
    ctx: &ServerContext,
    path: &str,
    content: &str,
) -> Result<CommandOutput, CommandError> {
    info!(path, "create-file");
    ctx.store.write_create(path, content.as_bytes()).await?;
    Ok(CommandOutput::success(ResponseBody::Message {
        message: format!("File created: {}", path),
    }))
}

/// One level deep: every direct child is reported, but the extension filter
/// applies to files only. Subdirectories always appear, without content.
pub async fn list_files(
    ctx: &ServerContext,
    dir_path: &str,
    extensions: &[String],
) -> Result<CommandOutput, CommandError> {
    let filter = normalize_extensions(extensions);
    info!(dir = %if dir_path.is_empty() { "." } else { dir_path }, ?filter, "list-files");

    let entries = ctx.store.list_dir(dir_path).await?;
    let mut files = Vec::with_capacity(entries.len());

    for entry in entries {
        if !entry.is_dir && !matches_filter(&entry.name, &filter) {
            continue;
        }

        let path = wire_join(dir_path, &entry.name);
        let stat = ctx.store.stat(&path).await?;

        let listing = if entry.is_dir {
            ListingEntry {
                path,
                kind: "directory".to_string(),
                size: stat.size,
                last_modified: stat.modified,
                content: None,
                error: None,
            }
        } else {
            match ctx.store.read(&path).await {
                Ok(bytes) => {
                    let ext = crate::server::file_store::extension_of(&entry.name);
                    if TEXT_EXTENSIONS.contains(&ext.as_str()) {
                        ListingEntry {
                            path,
                            kind: "text".to_string(),
                            size: stat.size,
                            last_modified: stat.modified,
                            content: Some(Some(String::from_utf8_lossy(&bytes).into_owned())),
                            error: None,
                        }
                    } else {
                        ListingEntry {
                            path,
                            kind: "binary".to_string(),
                            size: stat.size,
                            last_modified: stat.modified,
                            content: Some(None),
                            error: None,
                        }
                    }
                }
                Err(e) => ListingEntry {
                    path,
                    kind: "error".to_string(),
                    size: stat.size,
                    last_modified: stat.modified,
                    content: Some(None),
                    error: Some(e.to_string()),
                },
            }
        };

        files.push(listing);
    }

    Ok(CommandOutput::success(ResponseBody::Listing { files }))
}
