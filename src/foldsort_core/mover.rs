use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::foldsort_core::error::{FoldsortError, Result};
use crate::foldsort_core::events::Reporter;

/// Highest `-CF{n}` suffix probed before a destination is declared
/// exhausted.
const MAX_CONFLICT_SUFFIX: u32 = 99;

/// One completed move: where the file was, and where it ended up after
/// conflict resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveRecord {
    pub original: PathBuf,
    pub moved_to: PathBuf,
}

/// Moves files and keeps an append-only log of every move performed, so the
/// whole run can be replayed in reverse later. One mover per run; the log is
/// handed to the undo pass by value.
#[derive(Debug, Default)]
pub struct FileMover {
    log: Vec<MoveRecord>,
}

impl FileMover {
    pub fn new() -> Self {
        Self { log: Vec::new() }
    }

    pub fn log(&self) -> &[MoveRecord] {
        &self.log
    }

    pub fn into_log(self) -> Vec<MoveRecord> {
        self.log
    }

    /// Move `src` to `dst`, renaming with a `-CF{n}` suffix when `dst` is
    /// already taken. Returns the path the file actually landed at.
    ///
    /// The move is recorded only after it succeeds; a failed move leaves
    /// both the filesystem and the log untouched.
    pub fn move_with_conflicts(&mut self, src: &Path, dst: &Path) -> Result<PathBuf> {
        let final_dst = if dst.exists() {
            next_free_name(dst)
                .ok_or_else(|| FoldsortError::ConflictExhausted(dst.to_path_buf()))?
        } else {
            dst.to_path_buf()
        };

        move_file(src, &final_dst)?;

        self.log.push(MoveRecord {
            original: src.to_path_buf(),
            moved_to: final_dst.clone(),
        });

        Ok(final_dst)
    }

    /// Like [`move_with_conflicts`](Self::move_with_conflicts), but failures
    /// are reported instead of propagated so the caller's loop keeps going.
    /// Returns the final path, or `None` when the file was left in place.
    pub fn move_reporting_failures(
        &mut self,
        src: &Path,
        dst: &Path,
        reporter: &Reporter,
    ) -> Option<PathBuf> {
        match self.move_with_conflicts(src, dst) {
            Ok(path) => Some(path),
            Err(e @ FoldsortError::ConflictExhausted(_)) => {
                reporter.status(e.to_string());
                None
            }
            Err(e) => {
                log::error!(
                    "Error moving {} to {}: {}",
                    src.display(),
                    dst.display(),
                    e
                );
                None
            }
        }
    }
}

/// Probe `{stem}-CF{n}{ext}` beside `dst` for n in 1..=99 and return the
/// first unused name. The suffix goes before the final extension only, so
/// `archive.tar.gz` becomes `archive.tar-CF1.gz`.
fn next_free_name(dst: &Path) -> Option<PathBuf> {
    let stem = dst
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = dst
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();
    let parent = dst.parent().unwrap_or_else(|| Path::new(""));

    (1..=MAX_CONFLICT_SUFFIX)
        .map(|n| parent.join(format!("{stem}-CF{n}{ext}")))
        .find(|candidate| !candidate.exists())
}

/// Rename `src` to `dst`, degrading to copy + remove when the destination
/// sits on a different filesystem.
pub fn move_file(src: &Path, dst: &Path) -> Result<()> {
    match fs::rename(src, dst) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::CrossesDevices => {
            fs::copy(src, dst)?;
            fs::remove_file(src)?;
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_fs::TempDir;
    use assert_fs::prelude::*;

    #[test]
    fn test_move_without_conflict() {
        let temp = TempDir::new().unwrap();
        temp.child("a.txt").write_str("hello").unwrap();
        let src = temp.path().join("a.txt");
        let dst = temp.path().join("sub").join("a.txt");
        std::fs::create_dir(temp.path().join("sub")).unwrap();

        let mut mover = FileMover::new();
        let landed = mover.move_with_conflicts(&src, &dst).unwrap();

        assert_eq!(landed, dst);
        assert!(!src.exists());
        assert!(dst.exists());
        assert_eq!(
            mover.log(),
            &[MoveRecord {
                original: src,
                moved_to: dst
            }]
        );
    }

    #[test]
    fn test_move_with_conflict_appends_suffix() {
        let temp = TempDir::new().unwrap();
        temp.child("a.txt").write_str("new").unwrap();
        temp.child("sub/a.txt").write_str("old").unwrap();

        let src = temp.path().join("a.txt");
        let dst = temp.path().join("sub").join("a.txt");

        let mut mover = FileMover::new();
        let landed = mover.move_with_conflicts(&src, &dst).unwrap();

        assert_eq!(landed, temp.path().join("sub").join("a-CF1.txt"));
        assert!(landed.exists());
        // Original occupant untouched
        assert_eq!(std::fs::read_to_string(&dst).unwrap(), "old");
    }

    #[test]
    fn test_conflict_suffixes_increment() {
        let temp = TempDir::new().unwrap();
        temp.child("sub/a.txt").write_str("0").unwrap();
        temp.child("sub/a-CF1.txt").write_str("1").unwrap();
        temp.child("a.txt").write_str("2").unwrap();

        let src = temp.path().join("a.txt");
        let dst = temp.path().join("sub").join("a.txt");

        let mut mover = FileMover::new();
        let landed = mover.move_with_conflicts(&src, &dst).unwrap();
        assert_eq!(landed, temp.path().join("sub").join("a-CF2.txt"));
    }

    #[test]
    fn test_conflict_exhaustion_leaves_source_in_place() {
        let temp = TempDir::new().unwrap();
        temp.child("sub/a.txt").write_str("x").unwrap();
        for n in 1..=99 {
            temp.child(format!("sub/a-CF{n}.txt")).write_str("x").unwrap();
        }
        temp.child("a.txt").write_str("source").unwrap();

        let src = temp.path().join("a.txt");
        let dst = temp.path().join("sub").join("a.txt");

        let mut mover = FileMover::new();
        let err = mover.move_with_conflicts(&src, &dst).unwrap_err();

        assert!(matches!(err, FoldsortError::ConflictExhausted(_)));
        assert!(src.exists());
        assert!(mover.log().is_empty());
    }

    #[test]
    fn test_failed_move_is_not_recorded() {
        let temp = TempDir::new().unwrap();
        let src = temp.path().join("missing.txt");
        let dst = temp.path().join("sub").join("missing.txt");

        let mut mover = FileMover::new();
        assert!(mover.move_with_conflicts(&src, &dst).is_err());
        assert!(mover.log().is_empty());
    }

    #[test]
    fn test_suffix_goes_before_final_extension() {
        let temp = TempDir::new().unwrap();
        temp.child("sub/archive.tar.gz").write_str("old").unwrap();
        temp.child("archive.tar.gz").write_str("new").unwrap();

        let src = temp.path().join("archive.tar.gz");
        let dst = temp.path().join("sub").join("archive.tar.gz");

        let mut mover = FileMover::new();
        let landed = mover.move_with_conflicts(&src, &dst).unwrap();
        assert_eq!(landed, temp.path().join("sub").join("archive.tar-CF1.gz"));
    }
}
