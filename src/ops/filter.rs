use crate::prelude::*;

/// Emit only those items from an Observable that pass a predicate test
///
/// ```
/// use rxcore::prelude::*;
///
/// let mut coll = vec![];
/// observable::from_iter(0..10)
///   .filter(|v| *v % 2 == 0)
///   .subscribe(|v| coll.push(v));
///
/// // only even numbers received.
/// assert_eq!(coll, vec![0, 2, 4, 6, 8]);
/// ```
#[derive(Clone)]
pub struct FilterOp<S, F> {
  source: S,
  filter: F,
}

impl<S, F> FilterOp<S, F> {
  #[inline]
  pub fn new(source: S, filter: F) -> Self { FilterOp { source, filter } }
}

impl<Item, Err, O, S, F> Observable<Item, Err, O> for FilterOp<S, F>
where
  S: Observable<Item, Err, FilterObserver<O, F>>,
  F: FnMut(&Item) -> bool,
  O: Observer<Item, Err>,
{
  fn actual_subscribe(self, observer: O) -> Disposable {
    self.source.actual_subscribe(FilterObserver { observer, filter: self.filter })
  }
}

impl<Item, Err, S, F> ObservableExt<Item, Err> for FilterOp<S, F>
where
  S: ObservableExt<Item, Err>,
  F: FnMut(&Item) -> bool,
{
}

pub struct FilterObserver<O, F> {
  observer: O,
  filter: F,
}

impl<Item, Err, O, F> Observer<Item, Err> for FilterObserver<O, F>
where
  O: Observer<Item, Err>,
  F: FnMut(&Item) -> bool,
{
  fn next(&mut self, value: Item) {
    if (self.filter)(&value) {
      self.observer.next(value)
    }
  }

  #[inline]
  fn error(self, err: Err) { self.observer.error(err) }

  #[inline]
  fn complete(self) { self.observer.complete() }

  #[inline]
  fn is_closed(&self) -> bool { self.observer.is_closed() }
}

/// The fallible filter. An `Err` from the predicate terminates the stream the
/// way [`TryMapOp`](crate::ops::map::TryMapOp) does.
#[derive(Clone)]
pub struct TryFilterOp<S, F> {
  source: S,
  filter: F,
}

impl<S, F> TryFilterOp<S, F> {
  #[inline]
  pub fn new(source: S, filter: F) -> Self { TryFilterOp { source, filter } }
}

impl<Item, Err, O, S, F> Observable<Item, Err, O> for TryFilterOp<S, F>
where
  S: Observable<Item, Err, TryFilterObserver<O, F>>,
  F: FnMut(&Item) -> Result<bool, Err>,
  O: Observer<Item, Err>,
{
  fn actual_subscribe(self, observer: O) -> Disposable {
    let upstream = Disposable::new();
    let observer =
      TryFilterObserver { observer: Some(observer), filter: self.filter, upstream: upstream.clone() };
    upstream.add(self.source.actual_subscribe(observer));
    upstream
  }
}

impl<Item, Err, S, F> ObservableExt<Item, Err> for TryFilterOp<S, F>
where
  S: ObservableExt<Item, Err>,
  F: FnMut(&Item) -> Result<bool, Err>,
{
}

pub struct TryFilterObserver<O, F> {
  observer: Option<O>,
  filter: F,
  upstream: Disposable,
}

impl<Item, Err, O, F> Observer<Item, Err> for TryFilterObserver<O, F>
where
  O: Observer<Item, Err>,
  F: FnMut(&Item) -> Result<bool, Err>,
{
  fn next(&mut self, value: Item) {
    if self.observer.is_none() {
      return;
    }
    match (self.filter)(&value) {
      Ok(true) => {
        if let Some(observer) = self.observer.as_mut() {
          observer.next(value);
        }
      }
      Ok(false) => {}
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
