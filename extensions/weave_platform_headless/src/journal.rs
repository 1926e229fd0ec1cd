//! Record of native calls made on headless windows

use parking_lot::Mutex;
use std::sync::Arc;
use std::thread::{self, ThreadId};
use weave_platform::{WindowId, WindowOptions};

/// One native call
#[derive(Clone, Debug, PartialEq)]
pub enum NativeCall {
    /// A window was realized from these options
    Created {
        window: WindowId,
        options: WindowOptions,
    },
    /// A command or query ran against a live window
    Command { window: WindowId, call: String },
    /// A window was destroyed in this state
    Closed {
        window: WindowId,
        last_state: WindowOptions,
    },
}

impl NativeCall {
    pub fn window(&self) -> WindowId {
        match self {
            NativeCall::Created { window, .. }
            | NativeCall::Command { window, .. }
            | NativeCall::Closed { window, .. } => *window,
        }
    }
}

/// A call and the thread it ran on
#[derive(Clone, Debug)]
pub struct JournalEntry {
    pub thread: ThreadId,
    pub call: NativeCall,
}

/// Shared, append-only call log
#[derive(Clone, Default)]
pub struct Journal {
    entries: Arc<Mutex<Vec<JournalEntry>>>,
}

impl Journal {
    pub(crate) fn record(&self, call: NativeCall) {
        tracing::trace!(?call, "native call");
        self.entries.lock().push(JournalEntry {
            thread: thread::current().id(),
            call,
        });
    }

    /// Every entry so far
    pub fn entries(&self) -> Vec<JournalEntry> {
        self.entries.lock().clone()
    }

    /// Options each window was realized with, in creation order
    pub fn creations(&self) -> Vec<(WindowId, WindowOptions)> {
        self.entries
            .lock()
            .iter()
            .filter_map(|entry| match &entry.call {
                NativeCall::Created { window, options } => Some((*window, options.clone())),
                _ => None,
            })
            .collect()
    }

    /// Last state of every destroyed window, in closing order
    pub fn closures(&self) -> Vec<(WindowId, WindowOptions)> {
        self.entries
            .lock()
            .iter()
            .filter_map(|entry| match &entry.call {
                NativeCall::Closed { window, last_state } => Some((*window, last_state.clone())),
                _ => None,
            })
            .collect()
    }

    /// Commands run against one window, in order
    pub fn commands(&self, window: WindowId) -> Vec<String> {
        self.entries
            .lock()
            .iter()
            .filter_map(|entry| match &entry.call {
                NativeCall::Command { window: w, call } if *w == window => Some(call.clone()),
                _ => None,
            })
            .collect()
    }

    /// Threads that native calls ran on
    pub fn threads(&self) -> Vec<ThreadId> {
        let mut threads: Vec<ThreadId> = Vec::new();
        for entry in self.entries.lock().iter() {
            if !threads.contains(&entry.thread) {
                threads.push(entry.thread);
            }
        }
        threads
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

impl std::fmt::Debug for Journal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Journal")
            .field("entries", &self.entries.lock().len())
            .finish()
    }
}
