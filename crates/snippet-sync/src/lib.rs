//! Keep quoted source files in a Markdown document up to date.
//!
//! A snippet block is delimited by a pair of HTML comments:
//!
//! ```markdown
//! <!-- snippet-source crates/mcpmux-demos/src/basic_tool.rs -->
//! ...anything...
//! <!-- /snippet-source -->
//! ```
//!
//! The closing marker must sit at the same indentation as the opening one.
//! Everything between them is regenerated as a fenced code block holding
//! the file's current contents, indented like the markers, followed by a
//! link to the file.

use regex::Regex;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use thiserror::Error;
use tracing::{debug, warn};

static OPENING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^([ \t]*)<!-- snippet-source (\S+) -->\r?\n")
        .expect("Invalid regex: snippet opening marker")
});

const CLOSING: &str = "<!-- /snippet-source -->";

/// Where the quoted files live and how to link to them.
#[derive(Debug, Clone)]
pub struct Options {
    /// Directory snippet paths are resolved against.
    pub root: PathBuf,
    /// Prefix of the `_Full example_` links.
    pub base_url: String,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            base_url: "https://github.com/mcpmux/mcpmux/blob/main".to_string(),
        }
    }
}

/// Whether to rewrite the document or only report drift.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Write the document back when a snippet changed.
    Write,
    /// Leave the document alone; report whether it is stale.
    Check,
}

/// What [`sync`] found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// Every snippet already matched its file.
    UpToDate,
    /// At least one snippet was regenerated and the document rewritten.
    Updated,
    /// Check mode: regeneration would change the document.
    Outdated,
}

impl Status {
    /// True unless check mode found stale snippets.
    #[must_use]
    pub const fn is_success(self) -> bool {
        !matches!(self, Self::Outdated)
    }
}

/// A snippet that could not be regenerated and was left as it was.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Skipped {
    /// The path named by the opening marker.
    pub path: String,
    /// Why it was skipped.
    pub reason: String,
}

impl fmt::Display for Skipped {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.reason)
    }
}

/// A regenerated document.
#[derive(Debug, Clone)]
pub struct Regenerated {
    /// The new document text.
    pub content: String,
    /// Number of snippet blocks found.
    pub blocks: usize,
    /// Blocks left untouched because their source could not be read.
    pub skipped: Vec<Skipped>,
}

/// Errors that stop a sync run.
#[derive(Debug, Error)]
pub enum SyncError {
    /// The Markdown document does not exist.
    #[error("README file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// The Markdown document could not be read or written.
    #[error("failed to access {}: {source}", path.display())]
    Io {
        /// The document path.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },
}

/// Fence language for a quoted file.
#[must_use]
pub fn language_for(path: &str) -> &'static str {
    match Path::new(path).extension().and_then(|ext| ext.to_str()) {
        Some("rs") => "rust",
        Some("py") => "python",
        Some("toml") => "toml",
        _ => "",
    }
}

/// Render one snippet block, markers included.
#[must_use]
pub fn render_block(indent: &str, path: &str, code: &str, base_url: &str) -> String {
    let language = language_for(path);
    let url = format!("{}/{path}", base_url.trim_end_matches('/'));

    let mut block = format!("{indent}<!-- snippet-source {path} -->\n{indent}```{language}\n");
    for line in code.trim_end().lines() {
        let line = line.trim_end();
        if line.is_empty() {
            block.push('\n');
        } else {
            block.push_str(&format!("{indent}{line}\n"));
        }
    }
    block.push_str(&format!("{indent}```\n"));
    block.push_str(&format!("{indent}_Full example: [{path}]({url})_\n"));
    block.push_str(&format!("{indent}{CLOSING}"));
    block
}

/// Find the closing marker for a block whose body starts at `from`.
///
/// Returns the byte offset just past the marker.
fn find_closing(markdown: &str, from: usize, indent: &str) -> Option<usize> {
    let marker = format!("{indent}{CLOSING}");
    let mut offset = from;
    for line in markdown[from..].split_inclusive('\n') {
        if line.starts_with(&marker) {
            return Some(offset + marker.len());
        }
        offset += line.len();
    }
    None
}

/// Regenerate every snippet block in `markdown`.
///
/// Blocks whose source is missing or unreadable are kept verbatim and
/// listed in [`Regenerated::skipped`]. An opening marker without a closing
/// one is left alone.
#[must_use]
pub fn regenerate(markdown: &str, options: &Options) -> Regenerated {
    let mut content = String::with_capacity(markdown.len());
    let mut skipped = Vec::new();
    let mut blocks = 0;
    let mut cursor = 0;

    while let Some(opening) = OPENING.captures_at(markdown, cursor) {
        let (Some(whole), Some(indent), Some(path)) = (opening.get(0), opening.get(1), opening.get(2))
        else {
            break;
        };
        let Some(end) = find_closing(markdown, whole.end(), indent.as_str()) else {
            debug!(path = path.as_str(), "opening marker without a closing marker");
            break;
        };
        blocks += 1;
        content.push_str(&markdown[cursor..whole.start()]);

        let path = path.as_str();
        match fs::read_to_string(options.root.join(path)) {
            Ok(code) => content.push_str(&render_block(
                indent.as_str(),
                path,
                &code,
                &options.base_url,
            )),
            Err(err) => {
                let reason = if err.kind() == std::io::ErrorKind::NotFound {
                    "file not found".to_string()
                } else {
                    err.to_string()
                };
                warn!(path, %reason, "leaving snippet untouched");
                skipped.push(Skipped {
                    path: path.to_string(),
                    reason,
                });
                content.push_str(&markdown[whole.start()..end]);
            }
        }
        cursor = end;
    }
    content.push_str(&markdown[cursor..]);

    Regenerated {
        content,
        blocks,
        skipped,
    }
}

/// Regenerate the snippets of the document at `readme`.
///
/// In [`Mode::Write`] the file is rewritten only when something changed.
pub fn sync(readme: &Path, options: &Options, mode: Mode) -> Result<(Status, Regenerated), SyncError> {
    if !readme.exists() {
        return Err(SyncError::NotFound(readme.to_path_buf()));
    }
    let io_error = |source| SyncError::Io {
        path: readme.to_path_buf(),
        source,
    };

    let original = fs::read_to_string(readme).map_err(io_error)?;
    let regenerated = regenerate(&original, options);
    let status = if regenerated.content == original {
        Status::UpToDate
    } else if mode == Mode::Check {
        Status::Outdated
    } else {
        fs::write(readme, &regenerated.content).map_err(io_error)?;
        Status::Updated
    };
    Ok((status, regenerated))
}
