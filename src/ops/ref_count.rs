//! Makes a `ConnectableObservable` behave like an ordinary observable.
//!
//! The subscribers are counted: the first one connects the source, and when
//! the count drops back to zero the connection is disposed. Everything
//! before the `ref_count` has at most one live subscription, however many
//! subscribers come and go after it.

use std::sync::Arc;

use parking_lot::Mutex;

use crate::{
  observable::{ConnectableObservable, Observable, ObservableExt},
  observer::Observer,
  subject::{MulticastSubject, SubjectObserver},
  subscription::Disposable,
};

struct RefCountState {
  count: usize,
  connection: Option<Disposable>,
}

struct Inner<S, P> {
  connectable: ConnectableObservable<S, P>,
  state: Mutex<RefCountState>,
}

pub struct RefCount<S, P>(Arc<Inner<S, P>>);

impl<S, P> Clone for RefCount<S, P> {
  fn clone(&self) -> Self { RefCount(self.0.clone()) }
}

impl<S, P> RefCount<S, P> {
  pub(crate) fn new(connectable: ConnectableObservable<S, P>) -> Self {
    RefCount(Arc::new(Inner {
      connectable,
      state: Mutex::new(RefCountState { count: 0, connection: None }),
    }))
  }

  /// Subscribers currently counted.
  pub fn subscriber_count(&self) -> usize { self.0.state.lock().count }
}

impl<S, P> Inner<S, P>
where
  P: MulticastSubject,
  S: Clone + Observable<P::Item, P::Err, SubjectObserver<P>>,
{
  fn connect(&self) {
    let connection = self.connectable.connect();
    let mut state = self.state.lock();
    if state.count == 0 {
      // Every subscriber left while the source was being connected.
      drop(state);
      connection.dispose();
    } else {
      state.connection = Some(connection);
    }
  }

  fn release(&self) {
    let connection = {
      let mut state = self.state.lock();
      state.count -= 1;
      if state.count == 0 {
        state.connection.take()
      } else {
        None
      }
    };
    if let Some(connection) = connection {
      log::debug!("ref_count disconnected, no subscriber left");
      connection.dispose();
    }
  }
}

impl<S, P, O> Observable<P::Item, P::Err, O> for RefCount<S, P>
where
  P: MulticastSubject + Send + Sync + 'static,
  S: Clone + Observable<P::Item, P::Err, SubjectObserver<P>> + Send + Sync + 'static,
  O: Observer<P::Item, P::Err> + Send + 'static,
{
  fn actual_subscribe(self, observer: O) -> Disposable {
    let inner = self.0;
    let upstream = inner.connectable.subject.subscribe_observer(Box::new(observer));
    if upstream.is_disposed() {
      return upstream;
    }

    let first = {
      let mut state = inner.state.lock();
      state.count += 1;
      state.count == 1
    };

    let subscription = Disposable::new();
    subscription.add(upstream);
    let weak = Arc::downgrade(&inner);
    subscription.add_disposed_callback(move || {
      if let Some(inner) = weak.upgrade() {
        inner.release();
      }
    });

    if first {
      inner.connect();
    }
    subscription
  }
}

impl<S, P: MulticastSubject> ObservableExt<P::Item, P::Err> for RefCount<S, P> {}

#[cfg(test)]
mod test {
  use crate::prelude::*;
  use std::sync::{Arc, Mutex};

  #[test]
  fn connects_with_first_and_disconnects_with_last() {
    let mut source = Subject::<i32, ()>::new();
    let shared = source.clone().share();
    assert_eq!(source.subscriber_count(), 0);

    let seen = Arc::new(Mutex::new(vec![]));
    let c_seen = seen.clone();
    let a = shared.clone().subscribe(move |v| c_seen.lock().unwrap().push(("a", v)));
    assert_eq!(source.subscriber_count(), 1);
    let c_seen = seen.clone();
    let b = shared.clone().subscribe(move |v| c_seen.lock().unwrap().push(("b", v)));
    assert_eq!(source.subscriber_count(), 1);
    assert_eq!(shared.subscriber_count(), 2);

    source.next(1);
    a.dispose();
    assert_eq!(source.subscriber_count(), 1);
    source.next(2);
    b.dispose();
    assert_eq!(source.subscriber_count(), 0);
    assert_eq!(*seen.lock().unwrap(), vec![("a", 1), ("b", 1), ("b", 2)]);
  }

  #[test]
  fn reconnects_after_full_disconnect() {
    let connects = Arc::new(Mutex::new(0));
    let c_connects = connects.clone();
    let shared = observable::create(move |emitter: &mut dyn Emitter<i32, ()>| {
      *c_connects.lock().unwrap() += 1;
      emitter.next(1);
      Ok(())
    })
    .share();

    shared.clone().subscribe(|_| {}).dispose();
    shared.clone().subscribe(|_| {}).dispose();
    assert_eq!(*connects.lock().unwrap(), 2);
  }

  #[test]
  fn synchronous_source_completes_every_subscriber_once() {
    let shared = observable::from_iter(0..3).share();
    let completed = Arc::new(Mutex::new(0));
    let c_completed = completed.clone();
    shared.clone().subscribe_all(|_| {}, |_| {}, move || *c_completed.lock().unwrap() += 1);
    assert_eq!(*completed.lock().unwrap(), 1);
    assert_eq!(shared.subscriber_count(), 0);
  }
}
