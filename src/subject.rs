//! Subjects are observers and observables at once.
//!
//! Every value pushed into a subject is forwarded synchronously to the
//! current subscribers, in subscription order. The three kinds differ in what
//! a late subscriber gets:
//!
//! - [`Subject`]: nothing from the past; nothing at all once terminated.
//! - [`ReplaySubject`]: the logged values (bounded or unbounded), then the
//!   terminal event if there was one.
//! - [`BehaviorSubject`]: the latest value while live, only the terminal
//!   event afterwards.
//!
//! All three are cheap handles; clones share one subject. Emitting into a
//! subject from inside one of its own callbacks on the same thread panics.

mod subject_core;
mod subscribers;
mod views;

use std::sync::Arc;

pub use views::*;

use self::subject_core::{ReplayPolicy, SubjectCore};
use crate::{
  observable::{Observable, ObservableExt},
  observer::{BoxedObserver, Observer},
  subscription::Disposable,
};

/// The capability shared by every subject kind, used by the multicast
/// operators and the narrowed views.
pub trait MulticastSubject: Clone {
  type Item;
  type Err;

  /// Subscribes a type-erased observer.
  fn subscribe_observer(&self, observer: BoxedObserver<Self::Item, Self::Err>) -> Disposable;

  fn emit_next(&self, value: Self::Item);
  fn emit_error(&self, err: Self::Err);
  fn emit_complete(&self);

  fn subscriber_count(&self) -> usize;

  /// `true` once an error or completion went through the subject.
  fn is_terminated(&self) -> bool;
}

/// A plain multicast subject.
///
/// ```
/// use rxcore::prelude::*;
/// use std::sync::{Arc, Mutex};
///
/// let seen = Arc::new(Mutex::new(vec![]));
/// let mut subject = Subject::<i32, ()>::new();
/// let c_seen = seen.clone();
/// subject.clone().subscribe(move |v| c_seen.lock().unwrap().push(v));
/// subject.next(1);
/// subject.next(2);
/// assert_eq!(*seen.lock().unwrap(), vec![1, 2]);
/// ```
pub struct Subject<Item, Err> {
  core: Arc<SubjectCore<Item, Err>>,
}

impl<Item, Err> Subject<Item, Err> {
  pub fn new() -> Self { Subject { core: SubjectCore::new(ReplayPolicy::None, None) } }
}

/// A subject that replays past events to late subscribers.
///
/// With `Some(n)` only the last `n` values are kept; with `None` every value
/// is. The terminal event is always kept.
pub struct ReplaySubject<Item, Err> {
  core: Arc<SubjectCore<Item, Err>>,
}

impl<Item, Err> ReplaySubject<Item, Err> {
  pub fn new(buffer_size: Option<usize>) -> Self {
    ReplaySubject { core: SubjectCore::new(ReplayPolicy::Buffer(buffer_size), None) }
  }
}

/// A subject that always holds a current value.
pub struct BehaviorSubject<Item, Err> {
  core: Arc<SubjectCore<Item, Err>>,
}

impl<Item, Err> BehaviorSubject<Item, Err> {
  pub fn new(initial: Item) -> Self {
    BehaviorSubject { core: SubjectCore::new(ReplayPolicy::Latest, Some(initial)) }
  }
}

impl<Item, Err> BehaviorSubject<Item, Err>
where
  Item: Clone + Send + 'static,
  Err: Clone + Send + 'static,
{
  /// The latest value pushed into the subject, or the initial one.
  pub fn value(&self) -> Option<Item> { self.core.latest() }
}

macro_rules! impl_subject {
  ($ty:ident) => {
    impl<Item, Err> Clone for $ty<Item, Err> {
      fn clone(&self) -> Self { $ty { core: self.core.clone() } }
    }

    impl<Item, Err> $ty<Item, Err> {
      /// Number of observers currently attached.
      #[inline]
      pub fn subscriber_count(&self) -> usize { self.core.subscriber_count() }

      /// The observable half, without the ability to emit.
      #[inline]
      pub fn as_observable(&self) -> SubjectObservable<Self> { SubjectObservable::new(self.clone()) }

      /// The observer half, without the ability to subscribe.
      #[inline]
      pub fn as_observer(&self) -> SubjectObserver<Self> { SubjectObserver::new(self.clone()) }

      /// A view that emits at most one value, then completes.
      #[inline]
      pub fn as_once(&self) -> OnceSubject<Self> { OnceSubject::new(self.clone()) }

      /// A view that never completes.
      #[inline]
      pub fn as_continuous(&self) -> ContinuousSubject<Self> {
        ContinuousSubject::new(self.clone())
      }
    }

    impl<Item, Err> MulticastSubject for $ty<Item, Err>
    where
      Item: Clone + Send + 'static,
      Err: Clone + Send + 'static,
    {
      type Item = Item;
      type Err = Err;

      #[inline]
      fn subscribe_observer(&self, observer: BoxedObserver<Item, Err>) -> Disposable {
        self.core.subscribe(observer)
      }

      #[inline]
      fn emit_next(&self, value: Item) { self.core.next(value) }

      #[inline]
      fn emit_error(&self, err: Err) { self.core.error(err) }

      #[inline]
      fn emit_complete(&self) { self.core.complete() }

      #[inline]
      fn subscriber_count(&self) -> usize { self.core.subscriber_count() }

      #[inline]
      fn is_terminated(&self) -> bool { self.core.is_terminated() }
    }

    impl<Item, Err> Observer<Item, Err> for $ty<Item, Err>
    where
      Item: Clone + Send + 'static,
      Err: Clone + Send + 'static,
    {
      #[inline]
      fn next(&mut self, value: Item) { self.core.next(value) }

      #[inline]
      fn error(self, err: Err) { self.core.error(err) }

      #[inline]
      fn complete(self) { self.core.complete() }

      #[inline]
      fn is_closed(&self) -> bool { self.core.is_terminated() }
    }

    impl<Item, Err, O> Observable<Item, Err, O> for $ty<Item, Err>
    where
      O: Observer<Item, Err> + Send + 'static,
      Item: Clone + Send + 'static,
      Err: Clone + Send + 'static,
    {
      fn actual_subscribe(self, observer: O) -> Disposable { self.core.subscribe(Box::new(observer)) }
    }

    impl<Item, Err> ObservableExt<Item, Err> for $ty<Item, Err> {}
  };
}

impl_subject!(Subject);
impl_subject!(ReplaySubject);
impl_subject!(BehaviorSubject);

impl<Item, Err> Default for Subject<Item, Err> {
  fn default() -> Self { Self::new() }
}

impl<Item, Err> Default for ReplaySubject<Item, Err> {
  fn default() -> Self { Self::new(None) }
}
