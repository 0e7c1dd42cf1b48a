use anyhow::Result;
use clap::Parser;
use crossbeam_channel::unbounded;
use foldsort::foldsort_core::engine::{SortStats, SortingEngine, plan_groups};
use foldsort::foldsort_core::events::{Reporter, SortEvent};
use foldsort::foldsort_core::{Cli, Commands, FoldsortError, undo};
use indicatif::{ProgressBar, ProgressStyle};
use simplelog::{CombinedLogger, Config, LevelFilter, SharedLogger, TermLogger, WriteLogger};
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;
use std::thread;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize loggers
    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        LevelFilter::Warn,
        Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )];

    if cli.log {
        loggers.push(WriteLogger::new(
            cli.log_level,
            Config::default(),
            File::create("foldsort.log")?,
        ));
    }

    CombinedLogger::init(loggers)?;

    match cli.command {
        Commands::Sort {
            folder,
            split_media,
            dry_run,
            undo_prompt,
        } => {
            if dry_run {
                print_plan(&folder)?;
                return Ok(());
            }

            let (stats, engine) = run_sort(&folder, split_media)?;

            println!("\nSort complete!");
            println!("  {} similarity groups created", stats.groups_created);
            println!("  {} files grouped", stats.files_grouped);
            if stats.files_misc > 0 {
                println!("  {} files moved to Miscellaneous", stats.files_misc);
            }
            if split_media {
                println!(
                    "  {} images and {} videos split",
                    stats.images_split, stats.videos_split
                );
            }

            if undo_prompt && offer_undo()? {
                run_undo(&folder, engine)?;
                println!("Undo complete, original layout restored");
            }
        }
    }

    Ok(())
}

/// Run the sorting engine on a worker thread, rendering its progress and
/// status events until it finishes. Returns the stats and the engine itself
/// so the caller can still undo the run.
fn run_sort(folder: &Path, split_media: bool) -> Result<(SortStats, SortingEngine)> {
    let (tx, rx) = unbounded();
    let worker_folder = folder.to_path_buf();

    let worker = thread::spawn(move || {
        let mut engine = SortingEngine::new(&worker_folder, split_media, Reporter::new(tx));
        let stats = engine.run()?;
        Ok::<_, FoldsortError>((stats, engine))
    });

    let bar_style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}% {msg}")
        .unwrap();
    let bar = ProgressBar::new(100).with_style(bar_style);
    bar.set_message("Sorting");

    // The loop ends on the Finished event, or on channel disconnect when
    // the worker bails out early with an error.
    for event in rx {
        match event {
            SortEvent::Progress(percent) => bar.set_position(u64::from(percent)),
            // A hidden bar (piped output) swallows println, so fall back to
            // plain stdout there.
            SortEvent::Status(message) => {
                if bar.is_hidden() {
                    println!("{message}");
                } else {
                    bar.println(message);
                }
            }
            SortEvent::Finished => break,
            SortEvent::UndoFinished => {}
        }
    }
    bar.finish_and_clear();

    let (stats, engine) = worker
        .join()
        .map_err(|_| anyhow::anyhow!("sorting worker panicked"))??;
    Ok((stats, engine))
}

/// Replay the run's move log in reverse on a worker thread.
fn run_undo(folder: &Path, engine: SortingEngine) -> Result<()> {
    let (tx, rx) = unbounded();
    let worker_folder = folder.to_path_buf();
    let log = engine.into_log();

    let worker = thread::spawn(move || {
        undo::restore_moves(&worker_folder, log, &Reporter::new(tx));
    });

    for event in rx {
        match event {
            SortEvent::Status(message) => println!("{message}"),
            SortEvent::UndoFinished => break,
            _ => {}
        }
    }

    worker
        .join()
        .map_err(|_| anyhow::anyhow!("undo worker panicked"))?;
    Ok(())
}

fn offer_undo() -> Result<bool> {
    print!("Undo this sort and restore the original layout? [y/N]: ");
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().eq_ignore_ascii_case("y"))
}

fn print_plan(folder: &Path) -> Result<()> {
    let planned = plan_groups(folder)?;

    if planned.is_empty() {
        println!("No files found in the directory");
        return Ok(());
    }

    println!("[DRY RUN] Would create:");
    for group in &planned {
        println!("  {}/", group.folder_name);
        for member in &group.members {
            println!("    {member}");
        }
    }

    Ok(())
}
