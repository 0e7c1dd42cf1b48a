use clap::{Parser, Subcommand};
use simplelog::LevelFilter;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about = "Sorts a messy folder into subfolders of similarly named files")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable file logging to foldsort.log
    #[arg(long = "log", global = true)]
    pub log: bool,

    /// Log level for file logging (debug, info, warn, error)
    #[arg(long, default_value_t = LevelFilter::Debug, global = true)]
    pub log_level: LevelFilter,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sort a folder's direct files into subfolders by filename similarity.
    ///
    /// Files whose names share a meaningful substring are grouped into a
    /// folder named after it; files that match nothing end up in a
    /// Miscellaneous folder. The run can be reversed before the process
    /// exits via --undo-prompt.
    Sort {
        /// Folder whose direct files will be sorted
        #[arg(required = true)]
        folder: PathBuf,

        /// Also split images and videos into Images/ and Videos/ subfolders
        /// inside each created group folder
        #[arg(long)]
        split_media: bool,

        /// Show the planned folder layout without moving anything
        #[arg(long)]
        dry_run: bool,

        /// After sorting, offer to undo the run and restore the original
        /// layout
        #[arg(long)]
        undo_prompt: bool,
    },
}
