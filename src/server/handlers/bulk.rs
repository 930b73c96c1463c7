//! Batch commands: every multi-file mutation goes through the batch
//! executor, so per-item failures never abort sibling items.
//!
//! Directory-scoped commands enumerate the source directory first; if that
//! enumeration (or the rename pattern) fails, the whole command fails with
//! a single top-level error instead of a batch result.

use regex::Regex;
use tracing::info;

use crate::server::batch::run_batch;
use crate::server::context::{CommandError, ServerContext};
use crate::server::file_store::{matches_filter, normalize_extensions, wire_join, FileStore};
use crate::server::handlers::CommandOutput;
use crate::server::patch;
use crate::server::protocol::{FileTarget, ItemResult, ItemTarget, PatchTarget, RenamePattern};

fn require_non_empty<T>(files: &[T], command: &str) -> Result<(), CommandError> {
    if files.is_empty() {
        Err(CommandError::Validation(format!(
            "files must be a non-empty array for {}.",
            command
        )))
    } else {
        Ok(())
    }
}

pub async fn create_files(
    ctx: &ServerContext,
    files: Vec<FileTarget>,
) -> Result<CommandOutput, CommandError> {
    require_non_empty(&files, "create-files")?;
    info!(count = files.len(), "create-files");

    let store = &ctx.store;
    let report = run_batch(files, |f| async move {
        let target = ItemTarget::path(&f.path);
        match store.write_create(&f.path, f.content.as_bytes()).await {
            Ok(()) => ItemResult::ok(target, format!("File created: {}", f.path)),
            Err(e) => ItemResult::err(target, e.to_string()),
        }
    })
    .await;

    Ok(CommandOutput::batch(report))
}

pub async fn update_files(
    ctx: &ServerContext,
    files: Vec<FileTarget>,
) -> Result<CommandOutput, CommandError> {
    require_non_empty(&files, "update-files")?;
    info!(count = files.len(), "update-files");

    let store = &ctx.store;
    let report = run_batch(files, |f| async move {
        let target = ItemTarget::path(&f.path);
        match store.write_upsert(&f.path, f.content.as_bytes()).await {
            Ok(()) => ItemResult::ok(target, format!("File updated: {}", f.path)),
            Err(e) => ItemResult::err(target, e.to_string()),
        }
    })
    .await;

    Ok(CommandOutput::batch(report))
}

/// Explicit `paths` take precedence over the directory-scoped mode; with
/// neither present the command is rejected before any I/O.
pub async fn delete_files(
    ctx: &ServerContext,
    dir_path: Option<String>,
    extensions: Vec<String>,
    paths: Vec<String>,
) -> Result<CommandOutput, CommandError> {
    let store = &ctx.store;

    let targets = if !paths.is_empty() {
        info!(count = paths.len(), "delete-files (explicit paths)");
        paths
    } else if let Some(dir) = dir_path.filter(|d| !d.is_empty()) {
        let filter = normalize_extensions(&extensions);
        info!(dir = %dir, ?filter, "delete-files (directory scope)");
        let entries = store.list_dir(&dir).await?;
        entries
            .into_iter()
            .filter(|e| !e.is_dir && matches_filter(&e.name, &filter))
            .map(|e| wire_join(&dir, &e.name))
            .collect()
    } else {
        return Err(CommandError::Validation(
            "dirPath or paths is required for delete-files.".to_string(),
        ));
    };

    let report = run_batch(targets, |path| async move {
        let target = ItemTarget::path(&path);
        match store.delete(&path).await {
            Ok(()) => ItemResult::ok(target, format!("File deleted: {}", path)),
            Err(e) => ItemResult::err(target, e.to_string()),
        }
    })
    .await;

    Ok(CommandOutput::batch(report))
}

pub async fn patch_files(
    ctx: &ServerContext,
    files: Vec<PatchTarget>,
) -> Result<CommandOutput, CommandError> {
    require_non_empty(&files, "patch-files")?;
    info!(count = files.len(), "patch-files");

    let store = &ctx.store;
    let report = run_batch(files, |f| async move {
        let target = ItemTarget::path(&f.path);
        match patch_one(store, &f).await {
            Ok(()) => ItemResult::ok(target, format!("File patched: {}", f.path)),
            Err(e) => ItemResult::err(target, e.to_string()),
        }
    })
    .await;

    Ok(CommandOutput::batch(report))
}

/// Read, transform, write, in that order, so a failed patch skips the
/// write entirely and leaves the on-disk file untouched.
async fn patch_one(store: &FileStore, f: &PatchTarget) -> Result<(), CommandError> {
    let current = store.read(&f.path).await?;
    let next = patch::apply(&f.patch, &current)?;
    store.write_upsert(&f.path, &next).await
}

/// copy-files and move-files: non-recursive, files only. A move is a copy
/// plus a delete of the source; if the delete fails after a successful
/// copy, the item is reported as failed even though the copy stuck, and
/// the file is then present in both directories.
pub async fn transfer_files(
    ctx: &ServerContext,
    source_dir: &str,
    dest_dir: &str,
    extensions: &[String],
    delete_source: bool,
) -> Result<CommandOutput, CommandError> {
    let filter = normalize_extensions(extensions);
    info!(
        source = %source_dir,
        dest = %dest_dir,
        ?filter,
        delete_source,
        "transfer-files"
    );

    let store = &ctx.store;
    store.ensure_dir(dest_dir).await?;
    let entries = store.list_dir(source_dir).await?;

    let names: Vec<String> = entries
        .into_iter()
        .filter(|e| !e.is_dir && matches_filter(&e.name, &filter))
        .map(|e| e.name)
        .collect();

    let verb = if delete_source { "moved" } else { "copied" };
    let report = run_batch(names, |name| {
        let src = wire_join(source_dir, &name);
        let dst = wire_join(dest_dir, &name);
        async move {
            let target = ItemTarget::transfer(&src, &dst);
            match transfer_one(store, &src, &dst, delete_source).await {
                Ok(()) => ItemResult::ok(target, format!("File {}: {} -> {}", verb, src, dst)),
                Err(e) => ItemResult::err(target, e.to_string()),
            }
        }
    })
    .await;

    Ok(CommandOutput::batch(report))
}

async fn transfer_one(
    store: &FileStore,
    src: &str,
    dst: &str,
    delete_source: bool,
) -> Result<(), CommandError> {
    let bytes = store.read(src).await?;
    store.write_upsert(dst, &bytes).await?;
    if delete_source {
        store.delete(src).await?;
    }
    Ok(())
}

/// rename-files: the pattern applies to the base name only, never the
/// directory component, replacing the first match. A file whose name the
/// pattern leaves unchanged collides with itself and is reported as failed.
pub async fn rename_files(
    ctx: &ServerContext,
    dir_path: &str,
    pattern: &RenamePattern,
    extensions: &[String],
) -> Result<CommandOutput, CommandError> {
    let re = Regex::new(&pattern.search).map_err(|e| {
        CommandError::Validation(format!("invalid renamePattern.search: {}", e))
    })?;
    let filter = normalize_extensions(extensions);
    info!(dir = %dir_path, search = %pattern.search, ?filter, "rename-files");

    let store = &ctx.store;
    let entries = store.list_dir(dir_path).await?;

    let names: Vec<String> = entries
        .into_iter()
        .filter(|e| !e.is_dir && matches_filter(&e.name, &filter))
        .map(|e| e.name)
        .collect();

    let replace = pattern.replace.as_str();
    let report = run_batch(names, |name| {
        let new_name = re.replace(&name, replace).into_owned();
        let old_path = wire_join(dir_path, &name);
        let new_path = wire_join(dir_path, &new_name);
        async move {
            let target = ItemTarget::rename(&old_path, &new_path);
            match store.rename(&old_path, &new_path).await {
                Ok(()) => ItemResult::ok(
                    target,
                    format!("File renamed: {} -> {}", old_path, new_path),
                ),
                Err(e) => ItemResult::err(target, e.to_string()),
            }
        }
    })
    .await;

    Ok(CommandOutput::batch(report))
}
