//! Wire protocol types.
//!
//! One JSON text message per command. Requests carry a client-chosen
//! `requestId` (opaque, echoed back verbatim) and a kebab-case `command`
//! tag; responses flatten a command-specific payload into the envelope.

use serde::{Deserialize, Serialize};

/// The closed set of supported command names, in dispatch-table order.
pub const COMMANDS: &[&str] = &[
    "get-file",
    "list-files",
    "create-file",
    "create-files",
    "update-files",
    "delete-files",
    "patch-files",
    "copy-files",
    "move-files",
    "rename-files",
    "execute-command",
    "run-tests",
];

// ============================================================================
// Requests
// ============================================================================

/// A parsed command request, minus the `requestId` envelope field.
///
/// Required-field presence and types are enforced here by deserialization,
/// before any I/O is attempted.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "command", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum Command {
    GetFile {
        path: String,
    },
    ListFiles {
        #[serde(default)]
        dir_path: String,
        #[serde(default)]
        extensions: Vec<String>,
    },
    CreateFile {
        path: String,
        content: String,
    },
    CreateFiles {
        files: Vec<FileTarget>,
    },
    UpdateFiles {
        files: Vec<FileTarget>,
    },
    DeleteFiles {
        #[serde(default)]
        dir_path: Option<String>,
        #[serde(default)]
        extensions: Vec<String>,
        #[serde(default)]
        paths: Vec<String>,
    },
    PatchFiles {
        files: Vec<PatchTarget>,
    },
    CopyFiles {
        source_dir: String,
        dest_dir: String,
        #[serde(default)]
        extensions: Vec<String>,
    },
    MoveFiles {
        source_dir: String,
        dest_dir: String,
        #[serde(default)]
        extensions: Vec<String>,
    },
    RenameFiles {
        dir_path: String,
        rename_pattern: RenamePattern,
        #[serde(default)]
        extensions: Vec<String>,
    },
    ExecuteCommand {
        shell_command: String,
        #[serde(default)]
        output_file: Option<String>,
    },
    RunTests {
        #[serde(default)]
        output_file: Option<String>,
    },
}

/// A single file's location and payload inside a batch command.
#[derive(Debug, Clone, Deserialize)]
pub struct FileTarget {
    pub path: String,
    pub content: String,
}

/// A batch patch target: where, and which transformation.
#[derive(Debug, Clone, Deserialize)]
pub struct PatchTarget {
    pub path: String,
    pub patch: PatchDescriptor,
}

/// A content transformation applied without the client sending the full new
/// file content. Dispatched by pattern match in the patch engine.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum PatchDescriptor {
    /// Global regex substitution over the decoded text.
    Text { search: String, replace: String },
    /// RFC 6902 operations applied in order to the parsed JSON document.
    Json(json_patch::Patch),
}

/// Regex substitution applied to a file's base name only.
#[derive(Debug, Clone, Deserialize)]
pub struct RenamePattern {
    pub search: String,
    pub replace: String,
}

// ============================================================================
// Responses
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Error,
}

/// Response envelope: `requestId` echoes the request's, or is null when the
/// request could not even be identified.
#[derive(Debug, Serialize)]
pub struct Response {
    #[serde(rename = "requestId")]
    pub request_id: Option<String>,
    pub status: Status,
    #[serde(flatten)]
    pub body: ResponseBody,
}

/// Command-specific response payload, flattened into the envelope.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ResponseBody {
    Message { message: String },
    File { path: String, content: String },
    Listing { files: Vec<ListingEntry> },
    Batch { results: Vec<ItemResult> },
    Exec { stdout: String, stderr: String },
}

/// One entry of a list-files response.
///
/// `kind` is "directory", "text", "binary", or "error"; only text entries
/// carry decoded content, binary entries carry an explicit null, and
/// directories omit the field entirely.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListingEntry {
    pub path: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub size: u64,
    pub last_modified: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Per-file outcome inside a batch response. The target keys vary by
/// command family: `path`, `sourcePath`/`destPath`, or `oldPath`/`newPath`.
#[derive(Debug, Clone, Serialize)]
pub struct ItemResult {
    #[serde(flatten)]
    pub target: ItemTarget,
    pub status: Status,
    pub message: String,
}

impl ItemResult {
    pub fn ok(target: ItemTarget, message: impl Into<String>) -> Self {
        ItemResult {
            target,
            status: Status::Success,
            message: message.into(),
        }
    }

    pub fn err(target: ItemTarget, message: impl Into<String>) -> Self {
        ItemResult {
            target,
            status: Status::Error,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ItemTarget {
    Path {
        path: String,
    },
    Transfer {
        #[serde(rename = "sourcePath")]
        source_path: String,
        #[serde(rename = "destPath")]
        dest_path: String,
    },
    Rename {
        #[serde(rename = "oldPath")]
        old_path: String,
        #[serde(rename = "newPath")]
        new_path: String,
    },
}

impl ItemTarget {
    pub fn path(path: impl Into<String>) -> Self {
        ItemTarget::Path { path: path.into() }
    }

    pub fn transfer(source_path: impl Into<String>, dest_path: impl Into<String>) -> Self {
        ItemTarget::Transfer {
            source_path: source_path.into(),
            dest_path: dest_path.into(),
        }
    }

    pub fn rename(old_path: impl Into<String>, new_path: impl Into<String>) -> Self {
        ItemTarget::Rename {
            old_path: old_path.into(),
            new_path: new_path.into(),
        }
    }
}
