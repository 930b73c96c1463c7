//! Patch engine: pure content transformation, no disk I/O.
//!
//! The caller reads, applies, then writes, so a failed patch never touches
//! the on-disk file.

use regex::{NoExpand, Regex};

use crate::server::context::CommandError;
use crate::server::protocol::PatchDescriptor;

/// Apply a patch to file content, returning the new content.
///
/// Text patches replace every non-overlapping match of the search regex
/// with the literal replacement. JSON patches apply the RFC 6902 operations
/// in order; any failed precondition aborts the whole patch for this file.
pub fn apply(patch: &PatchDescriptor, current: &[u8]) -> Result<Vec<u8>, CommandError> {
    match patch {
        PatchDescriptor::Text { search, replace } => {
            let re = Regex::new(search)
                .map_err(|e| CommandError::Patch(format!("invalid search pattern: {}", e)))?;
            let text = String::from_utf8_lossy(current);
            let replaced = re.replace_all(&text, NoExpand(replace));
            Ok(replaced.into_owned().into_bytes())
        }
        PatchDescriptor::Json(ops) => {
            let mut doc: serde_json::Value = serde_json::from_slice(current)
                .map_err(|_| CommandError::Patch("invalid JSON".to_string()))?;
            json_patch::patch(&mut doc, ops).map_err(|e| CommandError::Patch(e.to_string()))?;
            let out = serde_json::to_string_pretty(&doc)
                .map_err(|e| CommandError::Patch(e.to_string()))?;
            Ok(out.into_bytes())
        }
    }
}
