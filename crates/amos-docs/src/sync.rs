//! Documentation directory sync

use crate::error::{DocsError, DocsResult};
use crate::functions::{doc_file_name, extract_core_functions};
use crate::markdown::{render_new_doc, update_doc, DocUpdate};
use std::path::Path;
use tracing::{debug, info, warn};

/// Counts from one sync run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Functions found in the template
    pub total: usize,
    /// Pages created
    pub created: usize,
    /// Pages rewritten
    pub updated: usize,
    /// Pages left as they were, including pages without a code block
    pub unchanged: usize,
    /// Pages that could not be read or written
    pub failed: usize,
}

impl SyncReport {
    /// True when every function has a page
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.created + self.updated + self.unchanged == self.total
    }
}

/// Create or update a page in `docs_dir` for every `core_` function in
/// `base_text`
///
/// # Errors
/// Returns `DocsError::NoFunctions` for a template without core functions
/// and `DocsError::Io` if `docs_dir` cannot be created
pub fn sync_function_docs(base_text: &str, docs_dir: &Path) -> DocsResult<SyncReport> {
    let functions = extract_core_functions(base_text);
    if functions.is_empty() {
        return Err(DocsError::NoFunctions);
    }
    info!(count = functions.len(), "found core functions");

    std::fs::create_dir_all(docs_dir).map_err(|e| DocsError::io_error(docs_dir, e))?;

    let mut report = SyncReport {
        total: functions.len(),
        ..SyncReport::default()
    };

    for (func, code) in &functions {
        let path = docs_dir.join(doc_file_name(func));
        debug!(function = %func, page = %path.display(), "processing");

        if !path.exists() {
            match std::fs::write(&path, render_new_doc(func, code)) {
                Ok(()) => {
                    info!(page = %path.display(), "created");
                    report.created += 1;
                }
                Err(e) => {
                    warn!(page = %path.display(), error = %e, "failed to create page");
                    report.failed += 1;
                }
            }
            continue;
        }

        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                warn!(page = %path.display(), error = %e, "failed to read page");
                report.failed += 1;
                continue;
            }
        };

        match update_doc(&content, func, code) {
            DocUpdate::Updated(new_content) => match std::fs::write(&path, new_content) {
                Ok(()) => {
                    info!(page = %path.display(), "updated");
                    report.updated += 1;
                }
                Err(e) => {
                    warn!(page = %path.display(), error = %e, "failed to write page");
                    report.failed += 1;
                }
            },
            DocUpdate::Unchanged => report.unchanged += 1,
            DocUpdate::NoPattern => {
                warn!(page = %path.display(), "no recognised code block");
                report.unchanged += 1;
            }
        }
    }

    Ok(report)
}
