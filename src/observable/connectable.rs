//! Multicasting one upstream subscription to many subscribers.
//!
//! A `ConnectableObservable` pairs a source with a subject. Subscribing to it
//! attaches to the subject only; the source is subscribed, once, when
//! [`connect`](ConnectableObservable::connect) is called.
//!
//! ```
//! use rxcore::prelude::*;
//! use std::sync::{Arc, Mutex};
//!
//! let connectable = observable::from_iter(1..4).publish();
//! let seen = Arc::new(Mutex::new(vec![]));
//!
//! for id in ["a", "b"] {
//!   let seen = seen.clone();
//!   connectable.fork().subscribe(move |v| seen.lock().unwrap().push((id, v)));
//! }
//! assert!(seen.lock().unwrap().is_empty());
//!
//! connectable.connect();
//! assert_eq!(seen.lock().unwrap().len(), 6);
//! ```

use std::sync::Arc;

use parking_lot::Mutex;

use crate::{
  observable::{Observable, ObservableExt},
  observer::Observer,
  ops::ref_count::RefCount,
  subject::{MulticastSubject, SubjectObservable, SubjectObserver},
  subscription::Disposable,
};

pub struct ConnectableObservable<S, P> {
  pub(crate) source: S,
  pub(crate) subject: P,
  connection: Arc<Mutex<Option<Disposable>>>,
}

impl<S: Clone, P: Clone> Clone for ConnectableObservable<S, P> {
  fn clone(&self) -> Self {
    ConnectableObservable {
      source: self.source.clone(),
      subject: self.subject.clone(),
      connection: self.connection.clone(),
    }
  }
}

impl<S, P> ConnectableObservable<S, P> {
  pub fn new(source: S, subject: P) -> Self {
    ConnectableObservable { source, subject, connection: Arc::new(Mutex::new(None)) }
  }

  /// An observable attached to the shared subject. All forks share the same
  /// connection.
  pub fn fork(&self) -> SubjectObservable<P>
  where
    P: Clone,
  {
    SubjectObservable::new(self.subject.clone())
  }

  /// Connects with the first subscriber and disconnects when the last one
  /// leaves.
  pub fn ref_count(self) -> RefCount<S, P> { RefCount::new(self) }
}

impl<S, P> ConnectableObservable<S, P>
where
  P: MulticastSubject,
{
  /// Subscribes the subject to the source and returns the connection.
  ///
  /// While a connection is live, calling `connect` again returns it instead
  /// of subscribing the source a second time. Disposing the connection
  /// unsubscribes the source; a later `connect` starts a new one.
  pub fn connect(&self) -> Disposable
  where
    S: Clone + Observable<P::Item, P::Err, SubjectObserver<P>>,
  {
    let connection = {
      let mut slot = self.connection.lock();
      if let Some(live) = slot.as_ref().filter(|c| !c.is_disposed()) {
        return live.clone();
      }
      let connection = Disposable::new();
      *slot = Some(connection.clone());
      connection
    };
    log::debug!("connectable observable connected");
    let upstream = self
      .source
      .clone()
      .actual_subscribe(SubjectObserver::new(self.subject.clone()));
    connection.add(upstream);
    connection
  }
}

impl<S, P, O> Observable<P::Item, P::Err, O> for ConnectableObservable<S, P>
where
  P: MulticastSubject,
  O: Observer<P::Item, P::Err> + Send + 'static,
{
  fn actual_subscribe(self, observer: O) -> Disposable {
    self.subject.subscribe_observer(Box::new(observer))
  }
}

impl<S, P: MulticastSubject> ObservableExt<P::Item, P::Err> for ConnectableObservable<S, P> {}

#[cfg(test)]
mod test {
  use crate::prelude::*;
  use std::sync::{Arc, Mutex};

  #[test]
  fn nothing_flows_before_connect() {
    let mut source = Subject::<i32, ()>::new();
    let connectable = source.clone().publish();
    let seen = Arc::new(Mutex::new(vec![]));
    let c_seen = seen.clone();
    connectable.fork().subscribe(move |v| c_seen.lock().unwrap().push(v));

    source.next(1);
    assert_eq!(source.subscriber_count(), 0);
    let connection = connectable.connect();
    source.next(2);
    assert_eq!(*seen.lock().unwrap(), vec![2]);

    connection.dispose();
    assert_eq!(source.subscriber_count(), 0);
    source.next(3);
    assert_eq!(*seen.lock().unwrap(), vec![2]);
  }

  #[test]
  fn connect_twice_shares_connection() {
    let source = Subject::<i32, ()>::new();
    let connectable = source.clone().publish();
    let first = connectable.connect();
    let second = connectable.connect();
    assert!(first.ptr_eq(&second));
    assert_eq!(source.subscriber_count(), 1);

    first.dispose();
    let third = connectable.connect();
    assert!(!third.ptr_eq(&first));
    assert_eq!(source.subscriber_count(), 1);
  }

  #[test]
  fn replay_serves_late_subscribers() {
    let mut source = Subject::<i32, ()>::new();
    let connectable = source.clone().replay(Some(1));
    connectable.connect();
    source.next(4);
    source.next(6);
    source.next(7);

    let seen = Arc::new(Mutex::new(vec![]));
    let c_seen = seen.clone();
    connectable.fork().subscribe(move |v| c_seen.lock().unwrap().push(v));
    source.next(8);
    assert_eq!(*seen.lock().unwrap(), vec![7, 8]);
  }

  #[test]
  fn replay_keeps_terminal() {
    let connectable = observable::from_iter(0..3).replay(None);
    connectable.connect();
    let completed = Arc::new(Mutex::new(false));
    let seen = Arc::new(Mutex::new(vec![]));
    let (c_seen, c_completed) = (seen.clone(), completed.clone());
    connectable.subscribe_all(
      move |v| c_seen.lock().unwrap().push(v),
      |_| {},
      move || *c_completed.lock().unwrap() = true,
    );
    assert_eq!(*seen.lock().unwrap(), vec![0, 1, 2]);
    assert!(*completed.lock().unwrap());
  }
}
