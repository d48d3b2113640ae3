use std::sync::Arc;

use parking_lot::Mutex;

use crate::{
  observer::{Notification, SerializedObserver},
  prelude::*,
  type_hint::TypeHint,
};

/// Maps every value to an inner observable and merges the inner streams.
///
/// Every inner observable is subscribed as soon as its value arrives.
/// Emissions from inner streams running on different threads are serialized
/// before they reach the downstream observer. The merged stream completes
/// once the outer stream and every inner stream have completed; the first
/// error from any of them wins and disposes everything still running.
pub struct FlatMapOp<S, F, Item> {
  source: S,
  func: F,
  _hint: TypeHint<Item>,
}

impl<S, F, Item> FlatMapOp<S, F, Item> {
  #[inline]
  pub fn new(source: S, func: F) -> Self { FlatMapOp { source, func, _hint: TypeHint::new() } }
}

impl<S: Clone, F: Clone, Item> Clone for FlatMapOp<S, F, Item> {
  fn clone(&self) -> Self { FlatMapOp::new(self.source.clone(), self.func.clone()) }
}

impl<Item, Err, B, O, S, S2, F> Observable<B, Err, O> for FlatMapOp<S, F, Item>
where
  S: Observable<Item, Err, FlatMapOuterObserver<B, Err, O, F>>,
  F: FnMut(Item) -> S2,
  S2: Observable<B, Err, FlatMapInnerObserver<B, Err, O>>,
  O: Observer<B, Err> + Send + 'static,
  B: Send + 'static,
  Err: Send + 'static,
{
  fn actual_subscribe(self, observer: O) -> Disposable {
    let state = Arc::new(FlatMapState {
      serialized: SerializedObserver::new(observer),
      counter: Mutex::new(Counter { active: 0, outer_done: false }),
      inner: DisposeBag::new(),
      outer: Disposable::new(),
    });
    let subscription = Disposable::new();
    let weak = Arc::downgrade(&state);
    subscription.add_disposed_callback(move || {
      if let Some(state) = weak.upgrade() {
        state.serialized.close();
        state.release();
      }
    });
    let outer = state.outer.clone();
    outer.add(
      self
        .source
        .actual_subscribe(FlatMapOuterObserver { state, func: self.func }),
    );
    subscription
  }
}

impl<Item, Err, B, S, S2, F> ObservableExt<B, Err> for FlatMapOp<S, F, Item>
where
  S: ObservableExt<Item, Err>,
  F: FnMut(Item) -> S2,
  S2: ObservableExt<B, Err>,
{
}

struct Counter {
  active: usize,
  outer_done: bool,
}

struct FlatMapState<B, Err, O> {
  serialized: SerializedObserver<B, Err, O>,
  counter: Mutex<Counter>,
  inner: DisposeBag,
  outer: Disposable,
}

impl<B, Err, O> FlatMapState<B, Err, O>
where
  O: Observer<B, Err>,
{
  fn emit(&self, notification: Notification<B, Err>) {
    if self.serialized.push(notification) {
      self.serialized.drain();
    }
  }

  fn fail(&self, err: Err) {
    self.emit(Notification::Error(err));
    self.release();
  }

  fn finish(&self) {
    self.emit(Notification::Complete);
    self.release();
  }

  /// Disposes the outer subscription and every inner subscription still
  /// running. Queued notifications are kept so a terminal event already
  /// accepted still reaches the observer.
  fn release(&self) {
    self.outer.dispose();
    self.inner.clear();
  }
}

pub struct FlatMapOuterObserver<B, Err, O, F> {
  state: Arc<FlatMapState<B, Err, O>>,
  func: F,
}

impl<Item, Err, B, O, S2, F> Observer<Item, Err> for FlatMapOuterObserver<B, Err, O, F>
where
  F: FnMut(Item) -> S2,
  S2: Observable<B, Err, FlatMapInnerObserver<B, Err, O>>,
  O: Observer<B, Err>,
{
  fn next(&mut self, value: Item) {
    if self.state.serialized.is_closed() {
      return;
    }
    let inner = (self.func)(value);
    self.state.counter.lock().active += 1;
    let handle = Disposable::new();
    self.state.inner.add(handle.clone());
    let observer = FlatMapInnerObserver { state: self.state.clone(), handle: handle.clone() };
    handle.add(inner.actual_subscribe(observer));
  }

  fn error(self, err: Err) { self.state.fail(err) }

  fn complete(self) {
    let finished = {
      let mut counter = self.state.counter.lock();
      counter.outer_done = true;
      counter.active == 0
    };
    if finished {
      self.state.finish();
    }
  }

  fn is_closed(&self) -> bool { self.state.serialized.is_closed() }
}

pub struct FlatMapInnerObserver<B, Err, O> {
  state: Arc<FlatMapState<B, Err, O>>,
  handle: Disposable,
}

impl<B, Err, O> Observer<B, Err> for FlatMapInnerObserver<B, Err, O>
where
  O: Observer<B, Err>,
{
  fn next(&mut self, value: B) { self.state.emit(Notification::Next(value)) }

  fn error(self, err: Err) {
    self.handle.dispose();
    self.state.fail(err)
  }

  fn complete(self) {
    self.handle.dispose();
    let finished = {
      let mut counter = self.state.counter.lock();
      counter.active -= 1;
      counter.active == 0 && counter.outer_done
    };
    if finished {
      self.state.finish();
    }
  }

  fn is_closed(&self) -> bool { self.handle.is_disposed() || self.state.serialized.is_closed() }
}
