use crate::{prelude::*, type_hint::TypeHint};

pub struct MapErrOp<S, F, Err> {
  source: S,
  func: F,
  _hint: TypeHint<Err>,
}

impl<S, F, Err> MapErrOp<S, F, Err> {
  #[inline]
  pub fn new(source: S, func: F) -> Self { MapErrOp { source, func, _hint: TypeHint::new() } }
}

impl<S: Clone, F: Clone, Err> Clone for MapErrOp<S, F, Err> {
  fn clone(&self) -> Self { MapErrOp::new(self.source.clone(), self.func.clone()) }
}

pub struct MapErrObserver<O, F> {
  observer: O,
  func: F,
}

impl<O, F, Item, Err, OutErr> Observer<Item, Err> for MapErrObserver<O, F>
where
  O: Observer<Item, OutErr>,
  F: FnOnce(Err) -> OutErr,
{
  fn next(&mut self, value: Item) { self.observer.next(value); }

  fn error(self, err: Err) {
    let out_err = (self.func)(err);
    self.observer.error(out_err);
  }

  fn complete(self) { self.observer.complete(); }

  fn is_closed(&self) -> bool { self.observer.is_closed() }
}

impl<Item, Err, OutErr, O, S, F> Observable<Item, OutErr, O> for MapErrOp<S, F, Err>
where
  S: Observable<Item, Err, MapErrObserver<O, F>>,
  F: FnOnce(Err) -> OutErr,
{
  fn actual_subscribe(self, observer: O) -> Disposable {
    self.source.actual_subscribe(MapErrObserver { observer, func: self.func })
  }
}

impl<Item, Err, OutErr, S, F> ObservableExt<Item, OutErr> for MapErrOp<S, F, Err>
where
  S: ObservableExt<Item, Err>,
  F: FnOnce(Err) -> OutErr,
{
}
