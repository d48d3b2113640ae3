use once_cell::sync::Lazy;
use parking_lot::Mutex;
use smallvec::SmallVec;
use std::{
  fmt::{Debug, Formatter},
  sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
  },
};

type DisposedCallback = Box<dyn FnOnce() + Send>;

struct Inner {
  disposed: AtomicBool,
  callbacks: Mutex<SmallVec<[DisposedCallback; 2]>>,
}

/// A one-shot, thread-safe resource release handle.
///
/// A `Disposable` starts active and moves to disposed exactly once. Every
/// callback registered through [`Disposable::add_disposed_callback`] runs
/// exactly once: on the thread that disposes, in registration order and
/// outside of the internal lock. Clones share the same state.
///
/// ```
/// use rxcore::prelude::*;
/// use std::sync::{
///   atomic::{AtomicUsize, Ordering},
///   Arc,
/// };
///
/// let hits = Arc::new(AtomicUsize::new(0));
/// let c_hits = hits.clone();
/// let d = Disposable::from_fn(move || {
///   c_hits.fetch_add(1, Ordering::SeqCst);
/// });
/// d.dispose();
/// d.dispose();
/// assert_eq!(hits.load(Ordering::SeqCst), 1);
/// ```
#[derive(Clone)]
pub struct Disposable(Arc<Inner>);

static EMPTY: Lazy<Disposable> = Lazy::new(|| {
  let empty = Disposable::new();
  empty.dispose();
  empty
});

impl Disposable {
  pub fn new() -> Self {
    Disposable(Arc::new(Inner {
      disposed: AtomicBool::new(false),
      callbacks: Mutex::new(SmallVec::new()),
    }))
  }

  /// A disposable that runs `f` when disposed.
  pub fn from_fn(f: impl FnOnce() + Send + 'static) -> Self {
    let d = Self::new();
    d.add_disposed_callback(f);
    d
  }

  /// The shared, already disposed handle that stands for "nothing to
  /// release".
  #[inline]
  pub fn empty() -> Self { EMPTY.clone() }

  #[inline]
  pub fn is_disposed(&self) -> bool { self.0.disposed.load(Ordering::Acquire) }

  pub fn dispose(&self) {
    let callbacks = {
      let mut callbacks = self.0.callbacks.lock();
      if self.0.disposed.swap(true, Ordering::AcqRel) {
        return;
      }
      std::mem::take(&mut *callbacks)
    };
    for cb in callbacks {
      cb();
    }
  }

  /// Registers `f` to run on disposal, or runs it right away on the calling
  /// thread if this handle is already disposed.
  pub fn add_disposed_callback(&self, f: impl FnOnce() + Send + 'static) {
    {
      let mut callbacks = self.0.callbacks.lock();
      if !self.0.disposed.load(Ordering::Acquire) {
        callbacks.push(Box::new(f));
        return;
      }
    }
    f()
  }

  /// Disposes `other` together with `self`.
  pub fn add(&self, other: Disposable) {
    if self.ptr_eq(&other) || other.is_disposed() {
      return;
    }
    self.add_disposed_callback(move || other.dispose())
  }

  #[inline]
  pub fn ptr_eq(&self, other: &Disposable) -> bool { Arc::ptr_eq(&self.0, &other.0) }

  #[inline]
  pub(crate) fn id(&self) -> usize { Arc::as_ptr(&self.0) as usize }
}

impl Default for Disposable {
  fn default() -> Self { Self::new() }
}

impl Debug for Disposable {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Disposable")
      .field("disposed", &self.is_disposed())
      .field("callbacks", &self.0.callbacks.lock().len())
      .finish()
  }
}

#[cfg(test)]
mod test {
  use super::*;
  use std::sync::atomic::AtomicUsize;

  fn counter() -> (Arc<AtomicUsize>, impl FnOnce() + Send + 'static) {
    let hits = Arc::new(AtomicUsize::new(0));
    let c_hits = hits.clone();
    (hits, move || {
      c_hits.fetch_add(1, Ordering::SeqCst);
    })
  }

  #[test]
  fn dispose_is_idempotent() {
    let (hits, cb) = counter();
    let d = Disposable::from_fn(cb);
    assert!(!d.is_disposed());
    d.dispose();
    d.clone().dispose();
    assert!(d.is_disposed());
    assert_eq!(hits.load(Ordering::SeqCst), 1);
  }

  #[test]
  fn callbacks_run_in_registration_order() {
    let order = Arc::new(Mutex::new(vec![]));
    let d = Disposable::new();
    for i in 0..4 {
      let order = order.clone();
      d.add_disposed_callback(move || order.lock().push(i));
    }
    d.dispose();
    assert_eq!(*order.lock(), vec![0, 1, 2, 3]);
  }

  #[test]
  fn late_callback_runs_immediately() {
    let d = Disposable::new();
    d.dispose();
    let (hits, cb) = counter();
    d.add_disposed_callback(cb);
    assert_eq!(hits.load(Ordering::SeqCst), 1);
  }

  #[test]
  fn add_chains_disposal() {
    let parent = Disposable::new();
    let child = Disposable::new();
    parent.add(child.clone());
    assert!(!child.is_disposed());
    parent.dispose();
    assert!(child.is_disposed());

    let late = Disposable::new();
    parent.add(late.clone());
    assert!(late.is_disposed());
  }

  #[test]
  fn add_self_is_ignored() {
    let d = Disposable::new();
    d.add(d.clone());
    d.dispose();
    assert!(d.is_disposed());
  }

  #[test]
  fn empty_is_disposed_singleton() {
    let a = Disposable::empty();
    let b = Disposable::empty();
    assert!(a.is_disposed());
    assert!(a.ptr_eq(&b));
  }

  #[test]
  fn callback_may_dispose_reentrantly() {
    let d = Disposable::new();
    let inner = d.clone();
    let (hits, cb) = counter();
    d.add_disposed_callback(move || inner.dispose());
    d.add_disposed_callback(cb);
    d.dispose();
    assert_eq!(hits.load(Ordering::SeqCst), 1);
  }

  #[test]
  fn concurrent_dispose_runs_callbacks_once() {
    let (hits, cb) = counter();
    let d = Disposable::from_fn(cb);
    let handles: Vec<_> = (0..8)
      .map(|_| {
        let d = d.clone();
        std::thread::spawn(move || d.dispose())
      })
      .collect();
    for h in handles {
      h.join().unwrap();
    }
    assert_eq!(hits.load(Ordering::SeqCst), 1);
  }
}
