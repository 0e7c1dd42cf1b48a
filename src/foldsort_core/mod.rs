pub mod cli;
pub mod engine;
pub mod error;
pub mod events;
pub mod media;
pub mod mover;
pub mod similarity;
pub mod undo;

pub use cli::{Cli, Commands};
pub use engine::{MISC_FOLDER_NAME, PlannedGroup, SortStats, SortingEngine};
pub use error::FoldsortError;
pub use events::{Reporter, SortEvent};
pub use media::{MediaType, detect_media_type};
pub use mover::{FileMover, MoveRecord};
pub use similarity::{build_similarity_groups, find_common_sequence, sanitize_folder_name};
