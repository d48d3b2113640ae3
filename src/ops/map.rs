use crate::{prelude::*, type_hint::TypeHint};

pub struct MapOp<S, F, Item> {
  source: S,
  func: F,
  _hint: TypeHint<Item>,
}

impl<S, F, Item> MapOp<S, F, Item> {
  #[inline]
  pub fn new(source: S, func: F) -> Self { MapOp { source, func, _hint: TypeHint::new() } }
}

impl<S: Clone, F: Clone, Item> Clone for MapOp<S, F, Item> {
  fn clone(&self) -> Self { MapOp::new(self.source.clone(), self.func.clone()) }
}

impl<Item, Err, B, O, S, F> Observable<B, Err, O> for MapOp<S, F, Item>
where
  S: Observable<Item, Err, MapObserver<O, F>>,
  F: FnMut(Item) -> B,
  O: Observer<B, Err>,
{
  fn actual_subscribe(self, observer: O) -> Disposable {
    self.source.actual_subscribe(MapObserver { observer, func: self.func })
  }
}

impl<Item, Err, B, S, F> ObservableExt<B, Err> for MapOp<S, F, Item>
where
  S: ObservableExt<Item, Err>,
  F: FnMut(Item) -> B,
{
}

pub struct MapObserver<O, F> {
  observer: O,
  func: F,
}

impl<Item, Err, B, O, F> Observer<Item, Err> for MapObserver<O, F>
where
  O: Observer<B, Err>,
  F: FnMut(Item) -> B,
{
  #[inline]
  fn next(&mut self, value: Item) {
    let value = (self.func)(value);
    self.observer.next(value)
  }

  #[inline]
  fn error(self, err: Err) { self.observer.error(err) }

  #[inline]
  fn complete(self) { self.observer.complete() }

  #[inline]
  fn is_closed(&self) -> bool { self.observer.is_closed() }
}

/// The fallible map. The first `Err` returned by the closure disposes the
/// upstream, is delivered as the stream's error, and every upstream event
/// after it is ignored.
pub struct TryMapOp<S, F, Item> {
  source: S,
  func: F,
  _hint: TypeHint<Item>,
}

impl<S, F, Item> TryMapOp<S, F, Item> {
  #[inline]
  pub fn new(source: S, func: F) -> Self { TryMapOp { source, func, _hint: TypeHint::new() } }
}

impl<S: Clone, F: Clone, Item> Clone for TryMapOp<S, F, Item> {
  fn clone(&self) -> Self { TryMapOp::new(self.source.clone(), self.func.clone()) }
}

impl<Item, Err, B, O, S, F> Observable<B, Err, O> for TryMapOp<S, F, Item>
where
  S: Observable<Item, Err, TryMapObserver<O, F>>,
  F: FnMut(Item) -> Result<B, Err>,
  O: Observer<B, Err>,
{
  fn actual_subscribe(self, observer: O) -> Disposable {
    let upstream = Disposable::new();
    let observer = TryMapObserver { observer: Some(observer), func: self.func, upstream: upstream.clone() };
    upstream.add(self.source.actual_subscribe(observer));
    upstream
  }
}

impl<Item, Err, B, S, F> ObservableExt<B, Err> for TryMapOp<S, F, Item>
where
  S: ObservableExt<Item, Err>,
  F: FnMut(Item) -> Result<B, Err>,
{
}

pub struct TryMapObserver<O, F> {
  observer: Option<O>,
  func: F,
  upstream: Disposable,
}

impl<Item, Err, B, O, F> Observer<Item, Err> for TryMapObserver<O, F>
where
  O: Observer<B, Err>,
  F: FnMut(Item) -> Result<B, Err>,
{
  fn next(&mut self, value: Item) {
    if self.observer.is_none() {
      return;
    }
    match (self.func)(value) {
      Ok(value) => {
        if let Some(observer) = self.observer.as_mut() {
          observer.next(value);
        }
      }
      Err(err) => {
        if let Some(observer) = self.observer.take() {
          self.upstream.dispose();
          observer.error(err);
        }
      }
    }
  }

  fn error(self, err: Err) {
    if let Some(observer) = self.observer {
      observer.error(err);
    }
  }

  fn complete(self) {
    if let Some(observer) = self.observer {
      observer.complete();
    }
  }

  fn is_closed(&self) -> bool { self.observer.as_ref().map_or(true, O::is_closed) }
}
