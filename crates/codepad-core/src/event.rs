//! Structural-change notifications.
//!
//! ## Learning: Two Kinds of Listeners
//!
//! Observers registered with [`EventBus::observe`] are called inline, before
//! the mutating call returns. That is what editor tabs need: a rename must be
//! remapped before the next user event is handled.
//!
//! The `tokio::sync::broadcast` side is for components that can react later
//! (status bars, loggers, background tasks). Events are values, subscribers
//! receive clones, and a lagging receiver never blocks the sender.

use tokio::sync::broadcast;

/// Something that changed in the project.
///
/// Renames and deletes are reported once per affected *file*, so consumers
/// keyed by file path never have to expand folder operations themselves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectEvent {
    // File events
    /// A new file entry was stored
    FileCreated(String),
    /// An existing file's content was overwritten
    ContentChanged(String),
    /// A file moved from one path to another
    Renamed { from: String, to: String },
    /// A file was removed
    Deleted(String),

    // Folder events
    /// A folder node was materialized
    FolderCreated(String),
    /// A folder (and everything below it) moved
    FolderRenamed { from: String, to: String },
    /// A folder (and everything below it) was removed
    FolderDeleted(String),

    // Project events
    /// The project was cleared and renamed
    ProjectReset(String),
    /// A batch of mutations (usually an import) finished
    BatchFinished { files: usize },
}

/// Synchronous event listener.
pub trait Observer {
    fn notify(&mut self, event: &ProjectEvent);
}

impl<F> Observer for F
where
    F: FnMut(&ProjectEvent),
{
    fn notify(&mut self, event: &ProjectEvent) {
        self(event)
    }
}

/// Event bus for broadcasting project events.
pub struct EventBus {
    sender: broadcast::Sender<ProjectEvent>,
    observers: Vec<Box<dyn Observer>>,
}

impl EventBus {
    /// Creates a new event bus.
    pub fn new() -> Self {
        // Capacity of 256 events in the buffer
        let (sender, _) = broadcast::channel(256);
        Self {
            sender,
            observers: Vec::new(),
        }
    }

    /// Registers a synchronous observer.
    pub fn observe(&mut self, observer: Box<dyn Observer>) {
        self.observers.push(observer);
    }

    /// Delivers an event to every observer, then to broadcast subscribers.
    pub fn emit(&mut self, event: ProjectEvent) {
        for observer in &mut self.observers {
            observer.notify(&event);
        }
        // No receivers is not an error
        let _ = self.sender.send(event);
    }

    /// Subscribes to events.
    ///
    /// Returns a receiver that will get all future events.
    pub fn subscribe(&self) -> broadcast::Receiver<ProjectEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Helper for processing events asynchronously.
///
/// ## Example
///
/// ```ignore
/// let mut handler = EventHandler::new(workspace.subscribe());
///
/// tokio::spawn(async move {
///     while let Some(event) = handler.next().await {
///         if let ProjectEvent::BatchFinished { files } = event {
///             println!("imported {files} files");
///         }
///     }
/// });
/// ```
pub struct EventHandler {
    receiver: broadcast::Receiver<ProjectEvent>,
}

impl EventHandler {
    /// Creates a new event handler.
    pub fn new(receiver: broadcast::Receiver<ProjectEvent>) -> Self {
        Self { receiver }
    }

    /// Waits for the next event.
    pub async fn next(&mut self) -> Option<ProjectEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    tracing::warn!("Event handler lagged, missed {} events", n);
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}
