//! Grid notifications for the host page.
//!
//! The host subscribes once and drains the receiver whenever it redraws; the
//! engine never calls back into host code.

use crossbeam_channel::{Receiver, Sender};

use crate::record::RecordId;

/// A change the host page may want to react to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GridEvent {
    /// The selected ids changed. Carries the full new selection.
    SelectionChanged {
        /// Selected ids, in selection order.
        selected: Vec<RecordId>,
    },
    /// Current page or page size changed.
    PageChanged {
        /// 1-based current page.
        current: usize,
        /// Rows per page.
        page_size: usize,
    },
    /// The filtered/sorted view was recomputed.
    ViewChanged {
        /// Matching records before pagination.
        total: usize,
        /// Number of pages.
        page_count: usize,
    },
}

#[derive(Debug, Default)]
pub(crate) struct Subscribers {
    senders: Vec<Sender<GridEvent>>,
}

impl Subscribers {
    pub(crate) fn subscribe(&mut self) -> Receiver<GridEvent> {
        let (tx, rx) = crossbeam_channel::unbounded();
        self.senders.push(tx);
        rx
    }

    pub(crate) fn publish(&mut self, event: &GridEvent) {
        if self.senders.is_empty() {
            return;
        }
        let before = self.senders.len();
        self.senders.retain(|tx| tx.send(event.clone()).is_ok());
        if self.senders.len() < before {
            tracing::debug!(
                dropped = before - self.senders.len(),
                "grid subscriber disconnected"
            );
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.senders.len()
    }
}
