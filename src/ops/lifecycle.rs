//! Terminate hooks: callbacks that fire exactly once on either terminal
//! event, before or after it is forwarded.

use crate::prelude::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TerminatePhase {
  Before,
  After,
}

#[derive(Clone)]
pub struct TerminateOp<S, F> {
  source: S,
  func: F,
  phase: TerminatePhase,
}

impl<S, F> TerminateOp<S, F> {
  #[inline]
  pub fn new(source: S, func: F, phase: TerminatePhase) -> Self { TerminateOp { source, func, phase } }
}

impl<Item, Err, O, S, F> Observable<Item, Err, O> for TerminateOp<S, F>
where
  S: Observable<Item, Err, TerminateObserver<O, F>>,
  F: FnOnce(),
  O: Observer<Item, Err>,
{
  fn actual_subscribe(self, observer: O) -> Disposable {
    let TerminateOp { source, func, phase } = self;
    source.actual_subscribe(TerminateObserver { observer, func, phase })
  }
}

impl<Item, Err, S, F> ObservableExt<Item, Err> for TerminateOp<S, F> where
  S: ObservableExt<Item, Err>
{
}

pub struct TerminateObserver<O, F> {
  observer: O,
  func: F,
  phase: TerminatePhase,
}

impl<O, F> TerminateObserver<O, F> {
  fn terminate(self, forward: impl FnOnce(O))
  where
    F: FnOnce(),
  {
    match self.phase {
      TerminatePhase::Before => {
        (self.func)();
        forward(self.observer);
      }
      TerminatePhase::After => {
        forward(self.observer);
        (self.func)();
      }
    }
  }
}

impl<Item, Err, O, F> Observer<Item, Err> for TerminateObserver<O, F>
where
  O: Observer<Item, Err>,
  F: FnOnce(),
{
  #[inline]
  fn next(&mut self, value: Item) { self.observer.next(value) }

  fn error(self, err: Err) { self.terminate(|observer| observer.error(err)) }

  fn complete(self) { self.terminate(|observer| observer.complete()) }

  #[inline]
  fn is_closed(&self) -> bool { self.observer.is_closed() }
}

#[cfg(test)]
mod test {
  use crate::prelude::*;
  use std::{cell::RefCell, rc::Rc};

  fn record(log: &Rc<RefCell<Vec<&'static str>>>, entry: &'static str) -> impl FnOnce() {
    let log = log.clone();
    move || log.borrow_mut().push(entry)
  }

  #[test]
  fn before_and_after_complete() {
    let log = Rc::new(RefCell::new(vec![]));
    let l_complete = log.clone();
    observable::of(1)
      .do_on_terminate(record(&log, "before"))
      .do_after_terminate(record(&log, "after"))
      .subscribe_all(|_| {}, |_| {}, move || l_complete.borrow_mut().push("complete"));
    assert_eq!(*log.borrow(), vec!["before", "complete", "after"]);
  }

  #[test]
  fn fires_once_on_error() {
    let log = Rc::new(RefCell::new(vec![]));
    let l_error = log.clone();
    observable::throw_err::<i32, _>("oops")
      .do_after_terminate(record(&log, "after"))
      .do_on_terminate(record(&log, "before"))
      .subscribe_err(|_| {}, move |_| l_error.borrow_mut().push("error"));
    assert_eq!(*log.borrow(), vec!["before", "error", "after"]);
  }

  #[test]
  fn not_fired_without_terminal() {
    let log = Rc::new(RefCell::new(vec![]));
    let subscription = observable::never::<i32>()
      .do_on_terminate(record(&log, "before"))
      .subscribe(|_| {});
    subscription.dispose();
    assert!(log.borrow().is_empty());
  }
}
