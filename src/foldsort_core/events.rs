use crossbeam_channel::Sender;

/// Notifications sent from the sorting worker to whoever is driving it.
#[derive(Debug, Clone)]
pub enum SortEvent {
    /// Overall progress, 0-100, non-decreasing within one run.
    Progress(u8),
    /// Human-readable phase or failure notice.
    Status(String),
    /// The sort run is complete.
    Finished,
    /// The undo pass is complete.
    UndoFinished,
}

/// One-way notification channel out of the worker. Sends never block, and a
/// disconnected receiver is silently ignored: reporting must not be able to
/// stall or fail the run.
#[derive(Clone)]
pub struct Reporter {
    tx: Sender<SortEvent>,
}

impl Reporter {
    pub fn new(tx: Sender<SortEvent>) -> Self {
        Self { tx }
    }

    pub fn progress(&self, percent: u8) {
        let _ = self.tx.send(SortEvent::Progress(percent));
    }

    pub fn status(&self, message: impl Into<String>) {
        let _ = self.tx.send(SortEvent::Status(message.into()));
    }

    pub fn finished(&self) {
        let _ = self.tx.send(SortEvent::Finished);
    }

    pub fn undo_finished(&self) {
        let _ = self.tx.send(SortEvent::UndoFinished);
    }
}
