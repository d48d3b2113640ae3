use std::{cell::RefCell, collections::VecDeque};

use parking_lot::{Mutex, ReentrantMutex};

use super::Observer;

pub(crate) enum Notification<Item, Err> {
  Next(Item),
  Error(Err),
  Complete,
}

struct EmitQueue<Item, Err> {
  pending: VecDeque<Notification<Item, Err>>,
  emitting: bool,
  done: bool,
}

/// Serializes notifications coming from several producers into one
/// downstream observer.
///
/// Producers `push` into a queue; the producer that finds nobody emitting
/// becomes the emitter and drains the queue, everybody else returns at once.
/// The downstream observer is never entered concurrently nor re-entrantly.
pub(crate) struct SerializedObserver<Item, Err, O> {
  queue: Mutex<EmitQueue<Item, Err>>,
  observer: ReentrantMutex<RefCell<Option<O>>>,
}

impl<Item, Err, O> SerializedObserver<Item, Err, O>
where
  O: Observer<Item, Err>,
{
  pub(crate) fn new(observer: O) -> Self {
    SerializedObserver {
      queue: Mutex::new(EmitQueue { pending: VecDeque::new(), emitting: false, done: false }),
      observer: ReentrantMutex::new(RefCell::new(Some(observer))),
    }
  }

  /// Queues `notification`. Returns `true` if the caller became the emitter
  /// and must `drain`.
  pub(crate) fn push(&self, notification: Notification<Item, Err>) -> bool {
    let mut queue = self.queue.lock();
    if queue.done {
      return false;
    }
    if !matches!(notification, Notification::Next(_)) {
      queue.done = true;
    }
    queue.pending.push_back(notification);
    if queue.emitting {
      false
    } else {
      queue.emitting = true;
      true
    }
  }

  pub(crate) fn drain(&self) {
    let guard = self.observer.lock();
    loop {
      let notification = {
        let mut queue = self.queue.lock();
        match queue.pending.pop_front() {
          Some(n) => n,
          None => {
            queue.emitting = false;
            return;
          }
        }
      };
      match notification {
        Notification::Next(value) => {
          if let Some(observer) = guard.borrow_mut().as_mut() {
            observer.next(value);
          }
        }
        Notification::Error(err) => {
          let observer = guard.borrow_mut().take();
          if let Some(observer) = observer {
            observer.error(err);
          }
        }
        Notification::Complete => {
          let observer = guard.borrow_mut().take();
          if let Some(observer) = observer {
            observer.complete();
          }
        }
      }
    }
  }

  /// `true` once a terminal notification was accepted or the observer was
  /// closed.
  pub(crate) fn is_closed(&self) -> bool { self.queue.lock().done }

  /// Rejects every further notification and drops the pending ones. Returns
  /// after any delivery in flight on another thread has finished.
  pub(crate) fn close(&self) {
    let dropped = {
      let mut queue = self.queue.lock();
      queue.done = true;
      std::mem::take(&mut queue.pending)
    };
    drop(dropped);
    let guard = self.observer.lock();
    let observer = match guard.try_borrow_mut() {
      Ok(mut slot) => slot.take(),
      Err(_) => None,
    };
    drop(observer);
  }
}
