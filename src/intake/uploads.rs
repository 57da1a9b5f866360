// Document upload handling
// Files are validated first, written second, recorded last. A failure after
// the first write removes the files this call created. Files that already
// existed were recorded by an earlier upload and are left in place.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use super::errors::{IntakeError, IntakeResult};
use super::models::{TechnicalDocument, UploadedFile};
use super::service::IntakeService;
use super::store::NewDocument;
use crate::observability::{intake_metrics, OperationTimer};
use crate::workflows::{Step, Workflow};

/// Reduce a client supplied file name to its last path component
///
/// Both `/` and `\` count as separators so that names sent by Windows
/// browsers are handled too. Returns `None` when nothing usable is left.
pub fn base_file_name(name: &str) -> Option<&str> {
    let base = name
        .rsplit(|c| c == '/' || c == '\\')
        .next()
        .unwrap_or_default()
        .trim();

    match base {
        "" | "." | ".." => None,
        base => Some(base),
    }
}

/// Make a doc-type tag safe to use as a file name prefix
pub fn sanitize_doc_type(doc_type: &str) -> String {
    doc_type
        .trim()
        .chars()
        .map(|c| {
            if c == '/' || c == '\\' || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .collect()
}

struct PlannedFile {
    doc_type: String,
    file_name: String,
    relative_path: String,
    absolute_path: PathBuf,
    content: Vec<u8>,
    display_order: i64,
}

impl IntakeService {
    /// Store uploaded files and record one document row per file.
    ///
    /// `files` and `doc_types` are paired by position and must have the same
    /// length; a mismatch is rejected before anything touches the disk.
    pub async fn upload_documents(
        &self,
        workflow: Workflow,
        id: i64,
        files: Vec<UploadedFile>,
        doc_types: Vec<String>,
    ) -> IntakeResult<Vec<TechnicalDocument>> {
        self.require_step(workflow, Step::Documents)?;
        self.require_request(workflow, id).await?;

        if files.len() != doc_types.len() {
            return Err(IntakeError::Validation(format!(
                "Number of files and doc_types must match ({} files, {} doc_types)",
                files.len(),
                doc_types.len()
            )));
        }

        let timer = OperationTimer::new("upload_documents");
        let request_dir = self.layout.request_dir(workflow, id);
        let dir_path = self.layout.request_path(workflow, id);
        let planned = files
            .into_iter()
            .zip(doc_types)
            .enumerate()
            .map(|(index, (file, doc_type))| {
                plan_file(&request_dir, &dir_path, index, file, &doc_type)
            })
            .collect::<IntakeResult<Vec<_>>>()?;

        let mut targets = HashSet::with_capacity(planned.len());
        if let Some(duplicate) = planned
            .iter()
            .find(|file| !targets.insert(file.relative_path.as_str()))
        {
            return Err(IntakeError::Validation(format!(
                "more than one file would be stored as '{}'",
                duplicate.relative_path
            )));
        }

        self.fs
            .create_dir_all(&dir_path)
            .await
            .map_err(|e| IntakeError::storage(&dir_path, e))?;

        let mut written: Vec<PathBuf> = Vec::with_capacity(planned.len());
        for file in &planned {
            let existed = self.fs.exists(&file.absolute_path);
            if let Err(e) = self.fs.write(&file.absolute_path, &file.content).await {
                self.remove_written(&written).await;
                return Err(IntakeError::storage(&file.absolute_path, e));
            }
            if !existed {
                written.push(file.absolute_path.clone());
            }
        }

        let rows: Vec<NewDocument> = planned
            .iter()
            .map(|file| NewDocument {
                doc_type: file.doc_type.clone(),
                file_name: file.file_name.clone(),
                file_path: Some(file.relative_path.clone()),
                file_size: file.content.len() as i64,
                display_order: file.display_order,
            })
            .collect();

        let inserted = match self.store.insert_documents(id, &rows).await {
            Ok(inserted) => inserted,
            Err(e) => {
                self.remove_written(&written).await;
                return Err(e);
            }
        };

        intake_metrics().record_documents(inserted.len() as u64);
        info!(
            workflow = %workflow,
            request_id = id,
            count = inserted.len(),
            directory = %request_dir,
            "Documents uploaded"
        );
        timer.finish();
        Ok(inserted)
    }

    async fn remove_written(&self, written: &[PathBuf]) {
        for path in written {
            if let Err(e) = self.fs.remove_file(path).await {
                warn!(path = %path.display(), error = %e, "Failed to remove file after aborted upload");
            }
        }
    }
}

fn plan_file(
    request_dir: &str,
    dir_path: &Path,
    index: usize,
    file: UploadedFile,
    doc_type: &str,
) -> IntakeResult<PlannedFile> {
    let file_name = base_file_name(&file.file_name)
        .ok_or_else(|| IntakeError::Validation(format!("invalid file name '{}'", file.file_name)))?
        .to_string();

    let doc_type = sanitize_doc_type(doc_type);
    if doc_type.is_empty() {
        return Err(IntakeError::Validation(format!(
            "doc_type for '{file_name}' is empty"
        )));
    }

    let stored_name = format!("{doc_type}_{file_name}");
    Ok(PlannedFile {
        relative_path: format!("{request_dir}/{stored_name}"),
        absolute_path: dir_path.join(&stored_name),
        doc_type,
        file_name,
        content: file.content,
        display_order: index as i64,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_base_file_name_strips_directories() {
        assert_eq!(base_file_name("report.pdf"), Some("report.pdf"));
        assert_eq!(base_file_name("../../etc/passwd"), Some("passwd"));
        assert_eq!(base_file_name("C:\\Users\\me\\spec sheet.pdf"), Some("spec sheet.pdf"));
        assert_eq!(base_file_name("dir/"), None);
        assert_eq!(base_file_name(".."), None);
        assert_eq!(base_file_name("   "), None);
    }

    #[test]
    fn test_sanitize_doc_type() {
        assert_eq!(sanitize_doc_type("User Manual"), "User Manual");
        assert_eq!(sanitize_doc_type("../secret"), ".._secret");
        assert_eq!(sanitize_doc_type(" a\\b "), "a_b");
        assert_eq!(sanitize_doc_type("   "), "");
    }

    proptest! {
        #[test]
        fn base_name_never_contains_separators(name in ".{0,64}") {
            if let Some(base) = base_file_name(&name) {
                prop_assert!(!base.contains('/'));
                prop_assert!(!base.contains('\\'));
                prop_assert!(!base.is_empty());
                prop_assert!(base != "." && base != "..");
            }
        }

        #[test]
        fn sanitized_doc_type_never_contains_separators(doc_type in ".{0,32}") {
            let sanitized = sanitize_doc_type(&doc_type);
            prop_assert!(!sanitized.contains('/'));
            prop_assert!(!sanitized.contains('\\'));
        }
    }
}
