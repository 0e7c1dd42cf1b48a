use std::collections::{BTreeSet, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use crate::foldsort_core::error::{FoldsortError, Result};
use crate::foldsort_core::events::Reporter;
use crate::foldsort_core::media;
use crate::foldsort_core::mover::{FileMover, MoveRecord};
use crate::foldsort_core::similarity::{build_similarity_groups, sanitize_folder_name};

/// Folder receiving files that match no similarity group.
pub const MISC_FOLDER_NAME: &str = "Miscellaneous";

/// Counters for one sorting run.
#[derive(Debug, Default)]
pub struct SortStats {
    pub total_files: usize,
    pub groups_created: usize,
    pub files_grouped: usize,
    pub files_misc: usize,
    pub images_split: usize,
    pub videos_split: usize,
}

impl std::fmt::Display for SortStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} groups created, {} files grouped, {} in {}",
            self.groups_created, self.files_grouped, self.files_misc, MISC_FOLDER_NAME
        )?;
        if self.images_split > 0 || self.videos_split > 0 {
            write!(
                f,
                ", {} images and {} videos split",
                self.images_split, self.videos_split
            )?;
        }
        Ok(())
    }
}

/// Drives one sorting run over a folder and owns the move log it produces.
///
/// Construct one engine per run; after [`run`](Self::run) completes, the
/// accumulated log can be taken with [`into_log`](Self::into_log) and handed
/// to the undo pass.
pub struct SortingEngine {
    root: PathBuf,
    split_media: bool,
    mover: FileMover,
    reporter: Reporter,
}

impl SortingEngine {
    pub fn new(root: &Path, split_media: bool, reporter: Reporter) -> Self {
        Self {
            root: root.to_path_buf(),
            split_media,
            mover: FileMover::new(),
            reporter,
        }
    }

    /// Run the full sort: greedily consume similarity groups into folders,
    /// sweep leftovers into a catch-all folder, then optionally split media
    /// files inside the created folders.
    ///
    /// Individual move failures never abort the run; the engine reports
    /// them and keeps going. Progress is emitted as a monotonic percentage
    /// of the files present at run start.
    pub fn run(&mut self) -> Result<SortStats> {
        if !self.root.exists() {
            return Err(FoldsortError::PathNotFound(self.root.clone()));
        }
        if !self.root.is_dir() {
            return Err(FoldsortError::NotADirectory(self.root.clone()));
        }

        let mut stats = SortStats::default();
        let total = list_files(&self.root)?.len();
        stats.total_files = total;

        if total == 0 {
            self.reporter.status("No files found in the directory");
            self.reporter.finished();
            return Ok(stats);
        }

        self.reporter.status("Phase 1: Grouping files by similarity...");

        let mut processed: HashSet<String> = HashSet::new();
        let mut processed_count = 0usize;

        loop {
            // Re-list the directory each round: earlier iterations have
            // changed what is on disk.
            let remaining: Vec<String> = list_files(&self.root)?
                .into_iter()
                .filter(|f| !processed.contains(f))
                .collect();
            if remaining.is_empty() {
                break;
            }

            let groups = build_similarity_groups(&remaining);

            let Some(group) = groups.into_iter().next() else {
                // Nothing groups any more: sweep the leftovers in one shot.
                let misc = self.root.join(MISC_FOLDER_NAME);
                fs::create_dir_all(&misc)?;
                for file in remaining {
                    let src = self.root.join(&file);
                    let dst = misc.join(&file);
                    if self
                        .mover
                        .move_reporting_failures(&src, &dst, &self.reporter)
                        .is_some()
                    {
                        stats.files_misc += 1;
                    }
                    processed.insert(file);
                    processed_count += 1;
                    self.reporter.progress(percentage(processed_count, total));
                }
                break;
            };

            let folder = self.root.join(sanitize_folder_name(&group.key));
            fs::create_dir_all(&folder)?;
            stats.groups_created += 1;

            for file in &group.members {
                if processed.contains(file) {
                    continue;
                }
                let src = self.root.join(file);
                // The source can vanish between listing and moving; treat
                // that as a no-op like any other per-file failure.
                if src.exists() {
                    let dst = folder.join(file);
                    if self
                        .mover
                        .move_reporting_failures(&src, &dst, &self.reporter)
                        .is_some()
                    {
                        stats.files_grouped += 1;
                    }
                }
                processed.insert(file.clone());
                processed_count += 1;
                self.reporter.progress(percentage(processed_count, total));
            }
        }

        if self.split_media {
            self.reporter.status("Phase 2: Sorting media files...");
            let (images, videos) =
                media::split_media_folders(&self.root, &mut self.mover, &self.reporter)?;
            stats.images_split = images;
            stats.videos_split = videos;
            if images > 0 || videos > 0 {
                self.reporter.status(format!(
                    "Sorted {images} images and {videos} videos within their group folders"
                ));
            }
        }

        self.reporter.progress(100);
        self.reporter.finished();
        Ok(stats)
    }

    /// Hand off the run's move log, consuming the engine.
    pub fn into_log(self) -> Vec<MoveRecord> {
        self.mover.into_log()
    }
}

/// A folder the sort would create, with the files it would receive.
#[derive(Debug)]
pub struct PlannedGroup {
    pub folder_name: String,
    pub members: Vec<String>,
}

/// Simulate the greedy consumption loop without touching the filesystem,
/// returning the folders in the order the real run would create them.
pub fn plan_groups(root: &Path) -> Result<Vec<PlannedGroup>> {
    if !root.exists() {
        return Err(FoldsortError::PathNotFound(root.to_path_buf()));
    }
    if !root.is_dir() {
        return Err(FoldsortError::NotADirectory(root.to_path_buf()));
    }

    let mut remaining: BTreeSet<String> = list_files(root)?.into_iter().collect();
    let mut planned = Vec::new();

    while !remaining.is_empty() {
        let files: Vec<String> = remaining.iter().cloned().collect();
        let groups = build_similarity_groups(&files);

        let Some(group) = groups.into_iter().next() else {
            planned.push(PlannedGroup {
                folder_name: MISC_FOLDER_NAME.to_string(),
                members: files,
            });
            break;
        };

        for member in &group.members {
            remaining.remove(member);
        }
        planned.push(PlannedGroup {
            folder_name: sanitize_folder_name(&group.key),
            members: group.members.into_iter().collect(),
        });
    }

    Ok(planned)
}

/// Direct child files of `dir`, sorted by name so pair enumeration and
/// group tie-breaking are deterministic.
fn list_files(dir: &Path) -> Result<Vec<String>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            files.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    files.sort();
    Ok(files)
}

fn percentage(done: usize, total: usize) -> u8 {
    ((done * 100) / total) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foldsort_core::events::SortEvent;
    use assert_fs::TempDir;
    use assert_fs::prelude::*;
    use crossbeam_channel::unbounded;

    fn run_sort(temp: &TempDir, split_media: bool) -> (SortStats, Vec<SortEvent>, SortingEngine) {
        let (tx, rx) = unbounded();
        let mut engine = SortingEngine::new(temp.path(), split_media, Reporter::new(tx));
        let stats = engine.run().unwrap();
        let events: Vec<SortEvent> = rx.try_iter().collect();
        (stats, events, engine)
    }

    #[test]
    fn test_groups_and_miscellaneous() {
        let temp = TempDir::new().unwrap();
        temp.child("report_v1.txt").write_str("a").unwrap();
        temp.child("report_v2.txt").write_str("b").unwrap();
        temp.child("invoice.pdf").write_str("c").unwrap();

        let (stats, _, _) = run_sort(&temp, false);

        assert_eq!(stats.total_files, 3);
        assert_eq!(stats.groups_created, 1);
        assert_eq!(stats.files_grouped, 2);
        assert_eq!(stats.files_misc, 1);
        assert!(temp.path().join("report_v/report_v1.txt").exists());
        assert!(temp.path().join("report_v/report_v2.txt").exists());
        assert!(temp.path().join("Miscellaneous/invoice.pdf").exists());
    }

    #[test]
    fn test_every_file_lands_in_exactly_one_move() {
        let temp = TempDir::new().unwrap();
        temp.child("trip_2024_a.jpg").write_str("1").unwrap();
        temp.child("trip_2024_b.jpg").write_str("2").unwrap();
        temp.child("notes_jan.txt").write_str("3").unwrap();
        temp.child("notes_feb.txt").write_str("4").unwrap();
        temp.child("zzzz.bin").write_str("5").unwrap();

        let (stats, _, engine) = run_sort(&temp, false);
        let log = engine.into_log();

        assert_eq!(stats.files_grouped + stats.files_misc, 5);
        assert_eq!(log.len(), 5);
        // No file moved twice during grouping
        let originals: HashSet<_> = log.iter().map(|r| r.original.clone()).collect();
        assert_eq!(originals.len(), 5);
        // Root has no direct files left
        assert!(list_files(temp.path()).unwrap().is_empty());
    }

    #[test]
    fn test_empty_folder_reports_and_finishes() {
        let temp = TempDir::new().unwrap();
        let (stats, events, _) = run_sort(&temp, false);

        assert_eq!(stats.total_files, 0);
        assert!(events.iter().any(
            |e| matches!(e, SortEvent::Status(s) if s == "No files found in the directory")
        ));
        assert!(events.iter().any(|e| matches!(e, SortEvent::Finished)));
        // No folders created
        assert!(!temp.path().join(MISC_FOLDER_NAME).exists());
    }

    #[test]
    fn test_progress_is_monotonic_and_ends_at_100() {
        let temp = TempDir::new().unwrap();
        for i in 0..4 {
            temp.child(format!("batch_file_{i}.dat")).write_str("x").unwrap();
        }

        let (_, events, _) = run_sort(&temp, false);

        let progress: Vec<u8> = events
            .iter()
            .filter_map(|e| match e {
                SortEvent::Progress(p) => Some(*p),
                _ => None,
            })
            .collect();
        assert!(!progress.is_empty());
        assert!(progress.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(*progress.last().unwrap(), 100);
    }

    #[test]
    fn test_media_split_phase_runs_inside_groups() {
        let temp = TempDir::new().unwrap();
        temp.child("beach_day_1.jpg").write_str("i").unwrap();
        temp.child("beach_day_2.mp4").write_str("v").unwrap();

        let (stats, events, _) = run_sort(&temp, true);

        assert_eq!(stats.images_split, 1);
        assert_eq!(stats.videos_split, 1);
        assert!(temp.path().join("beach_day_/Images/beach_day_1.jpg").exists());
        assert!(temp.path().join("beach_day_/Videos/beach_day_2.mp4").exists());
        assert!(events.iter().any(|e| matches!(
            e,
            SortEvent::Status(s) if s.starts_with("Sorted 1 images and 1 videos")
        )));
    }

    #[test]
    fn test_plan_groups_matches_layout_without_moving() {
        let temp = TempDir::new().unwrap();
        temp.child("report_v1.txt").write_str("a").unwrap();
        temp.child("report_v2.txt").write_str("b").unwrap();
        temp.child("invoice.pdf").write_str("c").unwrap();

        let planned = plan_groups(temp.path()).unwrap();

        assert_eq!(planned.len(), 2);
        assert_eq!(planned[0].folder_name, "report_v");
        assert_eq!(planned[1].folder_name, MISC_FOLDER_NAME);
        assert_eq!(planned[1].members, vec!["invoice.pdf".to_string()]);
        // Nothing moved
        assert!(temp.path().join("report_v1.txt").exists());
        assert!(!temp.path().join("report_v").exists());
    }

    #[test]
    fn test_missing_root_is_an_error() {
        let (tx, _rx) = unbounded();
        let mut engine =
            SortingEngine::new(Path::new("/definitely/not/here"), false, Reporter::new(tx));
        assert!(matches!(
            engine.run(),
            Err(FoldsortError::PathNotFound(_))
        ));
    }
}
