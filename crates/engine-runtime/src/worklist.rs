use crate::error::WorklistError;
use model::item::WorkItem;
use std::path::Path;
use tracing::debug;
use walkdir::WalkDir;

/// File types the optimization service accepts.
pub const ELIGIBLE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

/// Builds the ordered worklist: every eligible image under `root`,
/// optimized in place. Dot-directories are skipped entirely, which keeps
/// the run-state directory and previously quarantined files out of the
/// list.
pub fn discover(root: &Path) -> Result<Vec<WorkItem>, WorklistError> {
    let walker = WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            if entry.file_type().is_dir() && entry.depth() > 0 {
                !entry.file_name().to_string_lossy().starts_with('.')
            } else {
                true
            }
        });

    let mut items = Vec::new();
    for entry in walker {
        let entry = entry.map_err(|source| WorklistError::Scan {
            root: root.to_path_buf(),
            source,
        })?;
        if entry.file_type().is_file() && is_eligible(entry.path()) {
            items.push(WorkItem::in_place(entry.path()));
        }
    }

    debug!(root = %root.display(), items = items.len(), "worklist built");
    Ok(items)
}

fn is_eligible(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            ELIGIBLE_EXTENSIONS
                .iter()
                .any(|eligible| ext.eq_ignore_ascii_case(eligible))
        })
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn touch(path: &Path) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, b"bytes").unwrap();
    }

    #[test]
    fn finds_eligible_images_in_order_and_in_place() {
        let root = tempdir().unwrap();
        touch(&root.path().join("a.jpg"));
        touch(&root.path().join("b.PNG"));
        touch(&root.path().join("c.txt"));
        touch(&root.path().join("albums/d.jpeg"));

        let items = discover(root.path()).unwrap();
        let sources: Vec<_> = items.iter().map(|item| item.source.clone()).collect();

        assert_eq!(
            sources,
            vec![
                root.path().join("a.jpg"),
                root.path().join("b.PNG"),
                root.path().join("albums/d.jpeg"),
            ]
        );
        assert!(items.iter().all(|item| item.destination == item.source));
    }

    #[test]
    fn run_state_and_other_dot_directories_are_never_rescanned() {
        let root = tempdir().unwrap();
        touch(&root.path().join("kept.jpg"));
        touch(&root.path().join(".optipress/quarantined/old.jpg"));
        touch(&root.path().join(".cache/thumb.png"));

        let items = discover(root.path()).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].source, root.path().join("kept.jpg"));
    }

    #[test]
    fn an_empty_tree_yields_an_empty_worklist() {
        let root = tempdir().unwrap();
        assert!(discover(root.path()).unwrap().is_empty());
    }
}
