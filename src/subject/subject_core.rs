use std::{
  cell::Cell,
  collections::VecDeque,
  sync::{Arc, Weak},
};

use parking_lot::{Mutex, ReentrantMutex};

use super::subscribers::{Slot, Snapshot, Subscribers};
use crate::{observer::BoxedObserver, subscription::Disposable, util::defer};

const REENTRANT_EMISSION: &str = "re-entrant Subject emissions are not supported \
                                  (next/error/complete). Insert an async boundary such as \
                                  `observe_on` if you need a feedback loop.";

/// What a subject keeps for subscribers that arrive late.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ReplayPolicy {
  /// Nothing; a late subscriber after a terminal event gets nothing at all.
  None,
  /// The last `n` values (all of them with `None`) and the terminal event.
  Buffer(Option<usize>),
  /// The latest value while live, only the terminal event afterwards.
  Latest,
}

#[derive(Clone)]
enum Terminal<Err> {
  Error(Err),
  Complete,
}

struct CoreState<Item, Err> {
  subscribers: Subscribers<Item, Err>,
  log: VecDeque<Item>,
  terminal: Option<Terminal<Err>>,
}

/// The state every subject kind shares.
///
/// Broadcasts snapshot the subscriber list and deliver outside the state
/// lock, so observers may subscribe or unsubscribe from their callbacks. The
/// emission gate serializes emissions from different threads and rejects an
/// emission from inside a callback on the emitting thread.
pub(crate) struct SubjectCore<Item, Err> {
  state: Mutex<CoreState<Item, Err>>,
  gate: ReentrantMutex<Cell<bool>>,
  policy: ReplayPolicy,
}

impl<Item, Err> SubjectCore<Item, Err> {
  pub(crate) fn new(policy: ReplayPolicy, seed: Option<Item>) -> Arc<Self> {
    Arc::new(SubjectCore {
      state: Mutex::new(CoreState {
        subscribers: Subscribers::default(),
        log: seed.into_iter().collect(),
        terminal: None,
      }),
      gate: ReentrantMutex::new(Cell::new(false)),
      policy,
    })
  }

  pub(crate) fn subscriber_count(&self) -> usize { self.state.lock().subscribers.len() }

  pub(crate) fn is_terminated(&self) -> bool { self.state.lock().terminal.is_some() }

  fn unsubscribe(&self, id: usize) {
    let slot = self.state.lock().subscribers.remove(id);
    if let Some(slot) = slot {
      slot.detach();
    }
  }
}

impl<Item: Clone + Send + 'static, Err: Clone + Send + 'static> SubjectCore<Item, Err> {
  /// The most recent value kept in the log.
  pub(crate) fn latest(&self) -> Option<Item> { self.state.lock().log.back().cloned() }

  pub(crate) fn next(&self, value: Item) {
    let gate = self.gate.lock();
    if gate.replace(true) {
      panic!("{}", REENTRANT_EMISSION);
    }
    let _reset = defer(|| gate.set(false));
    let slots = {
      let mut state = self.state.lock();
      if state.terminal.is_some() {
        return;
      }
      match self.policy {
        ReplayPolicy::None => {}
        ReplayPolicy::Buffer(size) => {
          state.log.push_back(value.clone());
          if let Some(size) = size {
            while state.log.len() > size {
              state.log.pop_front();
            }
          }
        }
        ReplayPolicy::Latest => {
          state.log.clear();
          state.log.push_back(value.clone());
        }
      }
      state.subscribers.snapshot()
    };
    broadcast(slots, value, |slot, v| slot.next(v));
  }

  pub(crate) fn error(&self, err: Err) { self.terminate(Terminal::Error(err)) }

  pub(crate) fn complete(&self) { self.terminate(Terminal::Complete) }

  fn terminate(&self, terminal: Terminal<Err>) {
    let gate = self.gate.lock();
    if gate.replace(true) {
      panic!("{}", REENTRANT_EMISSION);
    }
    let _reset = defer(|| gate.set(false));
    let slots = {
      let mut state = self.state.lock();
      if state.terminal.is_some() {
        return;
      }
      state.terminal = Some(terminal.clone());
      state.subscribers.drain()
    };
    match terminal {
      Terminal::Error(err) => broadcast(slots, err, |slot, e| slot.error(e)),
      Terminal::Complete => slots.iter().for_each(|slot| slot.complete()),
    }
  }

  /// Replays what the policy keeps, then attaches `observer` for live
  /// events. Holding the gate keeps a concurrent emission from overtaking
  /// the replay.
  pub(crate) fn subscribe(self: &Arc<Self>, observer: BoxedObserver<Item, Err>) -> Disposable {
    let gate = self.gate.lock();
    let slot = Slot::new(observer);
    let (replay, terminal, id) = {
      let mut state = self.state.lock();
      let replay: Vec<Item> = match (self.policy, &state.terminal) {
        (ReplayPolicy::None, _) | (ReplayPolicy::Latest, Some(_)) => vec![],
        _ => state.log.iter().cloned().collect(),
      };
      let terminal = match self.policy {
        ReplayPolicy::None => None,
        _ => state.terminal.clone(),
      };
      let id = if state.terminal.is_none() {
        Some(state.subscribers.add(slot.clone()))
      } else {
        None
      };
      (replay, terminal, id)
    };

    let prev = gate.replace(true);
    {
      let _reset = defer(|| gate.set(prev));
      for value in replay {
        slot.next(value);
      }
      match terminal {
        Some(Terminal::Error(err)) => slot.error(err),
        Some(Terminal::Complete) => slot.complete(),
        None => {}
      }
    }

    match id {
      Some(id) => {
        let core: Weak<Self> = Arc::downgrade(self);
        Disposable::from_fn(move || {
          if let Some(core) = core.upgrade() {
            core.unsubscribe(id);
          }
        })
      }
      None => Disposable::empty(),
    }
  }
}

fn broadcast<Item, Err, V: Clone>(
  slots: Snapshot<Item, Err>,
  value: V,
  deliver: impl Fn(&Slot<Item, Err>, V),
) {
  let mut iter = slots.iter().peekable();
  while let Some(slot) = iter.next() {
    if iter.peek().is_some() {
      deliver(slot, value.clone());
    } else {
      deliver(slot, value);
      break;
    }
  }
}
