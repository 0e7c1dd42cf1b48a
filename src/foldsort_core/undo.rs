use std::fs;
use std::path::Path;

use walkdir::WalkDir;

use crate::foldsort_core::events::Reporter;
use crate::foldsort_core::mover::{MoveRecord, move_file};

/// Replay a run's move log in reverse, restoring every file that is still
/// where the run left it, then sweep out directories the run emptied.
///
/// Best-effort: a restore that fails is logged and skipped, and a
/// partially restored state is possible. The log is consumed, so a run can
/// only be undone once. An empty log performs no filesystem mutation and
/// still signals completion.
pub fn restore_moves(root: &Path, log: Vec<MoveRecord>, reporter: &Reporter) {
    for record in log.iter().rev() {
        if !record.moved_to.exists() {
            log::debug!(
                "Skipping restore of {}: no longer present",
                record.moved_to.display()
            );
            continue;
        }

        if let Some(parent) = record.original.parent() {
            if let Err(e) = fs::create_dir_all(parent) {
                log::error!(
                    "Error recreating {} for restore: {}",
                    parent.display(),
                    e
                );
                continue;
            }
        }

        if let Err(e) = move_file(&record.moved_to, &record.original) {
            log::error!(
                "Error restoring {} to {}: {}",
                record.moved_to.display(),
                record.original.display(),
                e
            );
        }
    }

    remove_empty_dirs(root);
    reporter.undo_finished();
}

/// Bottom-up sweep deleting directories left empty by the restore.
/// Directories that refuse to go (non-empty, in use) stay in place.
fn remove_empty_dirs(root: &Path) {
    for entry in WalkDir::new(root).min_depth(1).contents_first(true) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                log::warn!("Skipping unreadable path during cleanup: {e}");
                continue;
            }
        };
        if !entry.file_type().is_dir() {
            continue;
        }

        let is_empty = match fs::read_dir(entry.path()) {
            Ok(mut children) => children.next().is_none(),
            Err(e) => {
                log::warn!("Could not inspect {}: {}", entry.path().display(), e);
                continue;
            }
        };

        if is_empty {
            if let Err(e) = fs::remove_dir(entry.path()) {
                log::warn!(
                    "Could not remove empty directory {}: {}",
                    entry.path().display(),
                    e
                );
            }
        }
    }
}
