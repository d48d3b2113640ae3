use crate::{
  prelude::*,
  rc::{MutArc, RcDerefMut},
};

/// Runs a closure exactly once when the stream completes, errors, or is
/// disposed, whichever comes first.
#[derive(Clone)]
pub struct FinalizeOp<S, F> {
  source: S,
  func: F,
}

impl<S, F> FinalizeOp<S, F> {
  #[inline]
  pub fn new(source: S, func: F) -> Self { Self { source, func } }
}

impl<Item, Err, O, S, F> Observable<Item, Err, O> for FinalizeOp<S, F>
where
  O: Observer<Item, Err>,
  S: Observable<Item, Err, FinalizerObserver<O, F>>,
  F: FnOnce() + Send + 'static,
{
  fn actual_subscribe(self, observer: O) -> Disposable {
    let func = MutArc::own(Some(self.func));
    let subscription = Disposable::new();
    subscription.add(
      self
        .source
        .actual_subscribe(FinalizerObserver { observer, func: func.clone() }),
    );
    subscription.add_disposed_callback(move || run_once(&func));
    subscription
  }
}

impl<Item, Err, S, F> ObservableExt<Item, Err> for FinalizeOp<S, F> where
  S: ObservableExt<Item, Err>
{
}

fn run_once<F: FnOnce()>(func: &MutArc<Option<F>>) {
  let func = func.rc_deref_mut().take();
  if let Some(func) = func {
    func()
  }
}

pub struct FinalizerObserver<O, F> {
  observer: O,
  func: MutArc<Option<F>>,
}

impl<Item, Err, O, F> Observer<Item, Err> for FinalizerObserver<O, F>
where
  O: Observer<Item, Err>,
  F: FnOnce(),
{
  #[inline]
  fn next(&mut self, value: Item) { self.observer.next(value); }

  fn error(self, err: Err) {
    self.observer.error(err);
    run_once(&self.func);
  }

  fn complete(self) {
    self.observer.complete();
    run_once(&self.func);
  }

  #[inline]
  fn is_closed(&self) -> bool { self.observer.is_closed() }
}
