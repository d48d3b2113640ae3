use super::MulticastSubject;
use crate::{
  observable::{Observable, ObservableExt},
  observer::Observer,
  subscription::Disposable,
};

/// The subscribe-only half of a subject.
#[derive(Clone)]
pub struct SubjectObservable<S>(S);

impl<S> SubjectObservable<S> {
  #[inline]
  pub fn new(subject: S) -> Self { SubjectObservable(subject) }
}

impl<S, O> Observable<S::Item, S::Err, O> for SubjectObservable<S>
where
  S: MulticastSubject,
  O: Observer<S::Item, S::Err> + Send + 'static,
{
  fn actual_subscribe(self, observer: O) -> Disposable { self.0.subscribe_observer(Box::new(observer)) }
}

impl<S: MulticastSubject> ObservableExt<S::Item, S::Err> for SubjectObservable<S> {}

/// The emit-only half of a subject.
#[derive(Clone)]
pub struct SubjectObserver<S>(S);

impl<S> SubjectObserver<S> {
  #[inline]
  pub fn new(subject: S) -> Self { SubjectObserver(subject) }
}

impl<S: MulticastSubject> Observer<S::Item, S::Err> for SubjectObserver<S> {
  #[inline]
  fn next(&mut self, value: S::Item) { self.0.emit_next(value) }

  #[inline]
  fn error(self, err: S::Err) { self.0.emit_error(err) }

  #[inline]
  fn complete(self) { self.0.emit_complete() }

  #[inline]
  fn is_closed(&self) -> bool { self.0.is_terminated() }
}

/// A subject narrowed to a single emission.
///
/// `emit` pushes the value and completes; consuming `self` rules out a
/// second value.
///
/// ```
/// use rxcore::prelude::*;
/// use std::sync::{Arc, Mutex};
///
/// let subject = Subject::<&str, ()>::new();
/// let done = Arc::new(Mutex::new(None));
/// let c_done = done.clone();
/// subject.clone().subscribe_all(
///   move |v| *c_done.lock().unwrap() = Some(v),
///   |_| {},
///   || {},
/// );
/// subject.as_once().emit("loaded");
/// assert_eq!(*done.lock().unwrap(), Some("loaded"));
/// assert_eq!(subject.subscriber_count(), 0);
/// ```
#[derive(Clone)]
pub struct OnceSubject<S>(S);

impl<S> OnceSubject<S> {
  #[inline]
  pub fn new(subject: S) -> Self { OnceSubject(subject) }
}

impl<S: MulticastSubject> OnceSubject<S> {
  pub fn emit(self, value: S::Item) {
    self.0.emit_next(value);
    self.0.emit_complete();
  }

  #[inline]
  pub fn error(self, err: S::Err) { self.0.emit_error(err) }

  #[inline]
  pub fn as_observable(&self) -> SubjectObservable<S> { SubjectObservable(self.0.clone()) }
}

/// A subject narrowed to an endless stream: values and errors only.
#[derive(Clone)]
pub struct ContinuousSubject<S>(S);

impl<S> ContinuousSubject<S> {
  #[inline]
  pub fn new(subject: S) -> Self { ContinuousSubject(subject) }
}

impl<S: MulticastSubject> ContinuousSubject<S> {
  #[inline]
  pub fn next(&mut self, value: S::Item) { self.0.emit_next(value) }

  #[inline]
  pub fn error(self, err: S::Err) { self.0.emit_error(err) }

  #[inline]
  pub fn as_observable(&self) -> SubjectObservable<S> { SubjectObservable(self.0.clone()) }
}
