/// Subject / Subscription - typed event delivery over crossbeam channels.
///
/// A Subject owns one sender per subscriber. Each Subscription owns its
/// receiving end and drains events at its own pace. When the Subject is
/// dropped every Subscription observes the disconnect (after draining the
/// events already queued), which is how observers detect that the object
/// they watch no longer exists.

use std::sync::{Arc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};
use crossbeam_channel::{Receiver, Sender, TryRecvError};
use crate::error::{Error, Result};

/// Process-unique identity of a Subject, shared by its Subscriptions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubjectId(u64);

static NEXT_SUBJECT_ID: AtomicU64 = AtomicU64::new(1);

impl SubjectId {
    fn next() -> Self {
        SubjectId(NEXT_SUBJECT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

pub struct Subject<E: Clone> {
    id: SubjectId,
    /// Dropped with the subject; subscriptions hold a weak handle to it
    alive: Arc<()>,
    /// Human readable name, reported when the subject disappears
    name: String,
    subscribers: Vec<Sender<E>>,
}

impl<E: Clone> Subject<E> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: SubjectId::next(),
            alive: Arc::new(()),
            name: name.into(),
            subscribers: Vec::new(),
        }
    }

    pub fn id(&self) -> SubjectId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Register a new observer. Only events notified afterwards are delivered.
    pub fn subscribe(&mut self) -> Subscription<E> {
        let (sender, receiver) = crossbeam_channel::unbounded();
        self.subscribers.push(sender);
        Subscription {
            subject_id: self.id,
            subject_alive: Arc::downgrade(&self.alive),
            subject: self.name.clone(),
            receiver,
        }
    }

    /// Deliver `event` to every live subscriber.
    ///
    /// Subscribers whose Subscription was dropped are forgotten.
    pub fn notify(&mut self, event: E) {
        self.subscribers.retain(|sender| sender.send(event.clone()).is_ok());
    }

    /// Number of subscribers still registered
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }
}

/// Receiving end of a Subject
pub struct Subscription<E> {
    subject_id: SubjectId,
    subject_alive: Weak<()>,
    subject: String,
    receiver: Receiver<E>,
}

impl<E> Subscription<E> {
    /// Take the next pending event, if any.
    ///
    /// # Errors
    ///
    /// `SubjectDestroyed` once the subject is gone and every queued event
    /// has been taken.
    pub fn try_next(&self) -> Result<Option<E>> {
        match self.receiver.try_recv() {
            Ok(event) => Ok(Some(event)),
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => Err(Error::SubjectDestroyed(self.subject.clone())),
        }
    }

    /// Number of events waiting to be taken
    pub fn pending(&self) -> usize {
        self.receiver.len()
    }

    /// Whether the Subject still exists (queued events may remain either way)
    pub fn is_subject_alive(&self) -> bool {
        self.subject_alive.strong_count() > 0
    }

    /// Identity of the Subject this subscription listens to
    pub fn subject_id(&self) -> SubjectId {
        self.subject_id
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }
}

#[cfg(test)]
#[path = "subject_tests.rs"]
mod tests;
