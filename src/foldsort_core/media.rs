use std::fs;
use std::path::{Path, PathBuf};

use crate::foldsort_core::error::Result;
use crate::foldsort_core::events::Reporter;
use crate::foldsort_core::mover::FileMover;

/// Media categories split out inside each group folder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaType {
    Image,
    Video,
}

impl MediaType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaType::Image => "image",
            MediaType::Video => "video",
        }
    }

    pub fn folder_name(&self) -> &'static str {
        match self {
            MediaType::Image => "Images",
            MediaType::Video => "Videos",
        }
    }
}

impl std::fmt::Display for MediaType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Image file extensions (lowercase).
const IMAGE_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "gif", "webp", "bmp", "tiff", "tif", "heic", "heif",
    "svg", "eps", "ico", "psd", "xcf",
    // RAW formats
    "raw", "cr2", "nef", "arw", "dng",
];

/// Video file extensions (lowercase).
const VIDEO_EXTENSIONS: &[&str] = &[
    "mp4", "mkv", "avi", "mov", "wmv", "flv", "webm", "m4v", "mpg", "mpeg",
    "3gp", "rm", "rmvb", "vob", "ts", "mxf", "ogv",
];

/// Detect media type from a file path by extension alone.
pub fn detect_media_type(path: &Path) -> Option<MediaType> {
    let ext = path.extension().and_then(|e| e.to_str())?.to_lowercase();

    if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
        return Some(MediaType::Image);
    }
    if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
        return Some(MediaType::Video);
    }

    None
}

/// Within each immediate subfolder of `root`, move image and video files
/// into dedicated `Images/` and `Videos/` subfolders, logging the moves
/// through the shared mover so they are undoable with the rest of the run.
/// Returns `(images_moved, videos_moved)`.
///
/// Subfolders named `Images` or `Videos` at the root are skipped so a
/// re-run never descends into the classifier's own output.
pub fn split_media_folders(
    root: &Path,
    mover: &mut FileMover,
    reporter: &Reporter,
) -> Result<(usize, usize)> {
    let mut image_count = 0;
    let mut video_count = 0;

    for subdir in list_subdirs(root)? {
        let mut images: Vec<PathBuf> = Vec::new();
        let mut videos: Vec<PathBuf> = Vec::new();

        for entry in fs::read_dir(&subdir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            match detect_media_type(&entry.path()) {
                Some(MediaType::Image) => images.push(entry.path()),
                Some(MediaType::Video) => videos.push(entry.path()),
                None => {}
            }
        }

        images.sort();
        videos.sort();

        image_count += move_into_category(&subdir, MediaType::Image, &images, mover, reporter)?;
        video_count += move_into_category(&subdir, MediaType::Video, &videos, mover, reporter)?;
    }

    Ok((image_count, video_count))
}

fn move_into_category(
    subdir: &Path,
    media_type: MediaType,
    files: &[PathBuf],
    mover: &mut FileMover,
    reporter: &Reporter,
) -> Result<usize> {
    if files.is_empty() {
        return Ok(0);
    }

    let target = subdir.join(media_type.folder_name());
    fs::create_dir_all(&target)?;

    let mut moved = 0;
    for src in files {
        let Some(name) = src.file_name() else {
            continue;
        };
        let dst = target.join(name);
        if mover.move_reporting_failures(src, &dst, reporter).is_some() {
            moved += 1;
        }
    }

    Ok(moved)
}

/// Immediate subdirectories of `root`, excluding the classifier's own output
/// folder names, sorted for a deterministic processing order.
fn list_subdirs(root: &Path) -> Result<Vec<PathBuf>> {
    let mut subdirs = Vec::new();

    for entry in fs::read_dir(root)? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        let name = entry.file_name();
        if name == MediaType::Image.folder_name() || name == MediaType::Video.folder_name() {
            continue;
        }
        subdirs.push(entry.path());
    }

    subdirs.sort();
    Ok(subdirs)
}
