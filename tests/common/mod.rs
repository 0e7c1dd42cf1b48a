use assert_fs::TempDir;
use assert_fs::fixture::ChildPath;
use assert_fs::prelude::*;

/// Lay out a messy flat folder with two obvious similarity groups and one
/// loner file.
pub fn setup_messy_folder(temp_dir: &TempDir) -> ChildPath {
    let folder = temp_dir.child("downloads");
    folder.create_dir_all().unwrap();
    for name in MESSY_FILES {
        folder.child(name).write_str(name).unwrap();
    }
    folder
}

pub const MESSY_FILES: &[&str] = &[
    "report_v1.txt",
    "report_v2.txt",
    "holiday_snap_1.jpg",
    "holiday_snap_2.jpg",
    "holiday_snap_3.mp4",
    "invoice.pdf",
];
