//! The Do family: side effects that run before an event is forwarded.

use crate::prelude::*;

#[derive(Clone)]
pub struct DoOp<S, N, E, C> {
  source: S,
  on_next: N,
  on_error: E,
  on_complete: C,
}

impl<S, N, E, C> DoOp<S, N, E, C> {
  #[inline]
  pub fn new(source: S, on_next: N, on_error: E, on_complete: C) -> Self {
    DoOp { source, on_next, on_error, on_complete }
  }
}

impl<Item, Err, O, S, N, E, C> Observable<Item, Err, O> for DoOp<S, N, E, C>
where
  S: Observable<Item, Err, DoObserver<O, N, E, C>>,
  N: FnMut(&Item),
  E: FnOnce(&Err),
  C: FnOnce(),
  O: Observer<Item, Err>,
{
  fn actual_subscribe(self, observer: O) -> Disposable {
    let DoOp { source, on_next, on_error, on_complete } = self;
    source.actual_subscribe(DoObserver { observer, on_next, on_error, on_complete })
  }
}

impl<Item, Err, S, N, E, C> ObservableExt<Item, Err> for DoOp<S, N, E, C> where
  S: ObservableExt<Item, Err>
{
}

pub struct DoObserver<O, N, E, C> {
  observer: O,
  on_next: N,
  on_error: E,
  on_complete: C,
}

impl<Item, Err, O, N, E, C> Observer<Item, Err> for DoObserver<O, N, E, C>
where
  O: Observer<Item, Err>,
  N: FnMut(&Item),
  E: FnOnce(&Err),
  C: FnOnce(),
{
  fn next(&mut self, value: Item) {
    (self.on_next)(&value);
    self.observer.next(value)
  }

  fn error(self, err: Err) {
    (self.on_error)(&err);
    self.observer.error(err)
  }

  fn complete(self) {
    (self.on_complete)();
    self.observer.complete()
  }

  #[inline]
  fn is_closed(&self) -> bool { self.observer.is_closed() }
}

#[cfg(test)]
mod test {
  use crate::prelude::*;
  use std::{cell::RefCell, rc::Rc};

  #[test]
  fn primitive_type() {
    let mut i = 0;
    let mut v = 0;
    observable::from_iter(100..101)
      .tap(|i| v = *i)
      .subscribe(|v| i += v);
    assert_eq!(i, 100);
    assert_eq!(v, 100);
  }

  #[test]
  fn side_effects_run_before_forwarding() {
    let log = Rc::new(RefCell::new(vec![]));
    let (l1, l2, l3, l4, l5) = (log.clone(), log.clone(), log.clone(), log.clone(), log.clone());
    observable::from_iter(0..2)
      .do_each(
        move |v| l1.borrow_mut().push(format!("do next {v}")),
        |_| {},
        move || l2.borrow_mut().push("do complete".to_string()),
      )
      .subscribe_all(
        move |v| l3.borrow_mut().push(format!("next {v}")),
        move |_| l4.borrow_mut().push("error".to_string()),
        move || l5.borrow_mut().push("complete".to_string()),
      );
    assert_eq!(
      *log.borrow(),
      vec!["do next 0", "next 0", "do next 1", "next 1", "do complete", "complete"]
    );
  }

  #[test]
  fn do_on_error_sees_error() {
    let mut seen = None;
    let mut delivered = None;
    observable::throw_err::<i32, _>("bad")
      .do_on_error(|e| seen = Some(*e))
      .subscribe_err(|_| {}, |e| delivered = Some(e));
    assert_eq!(seen, Some("bad"));
    assert_eq!(delivered, Some("bad"));
  }

  #[test]
  fn do_on_complete_only_on_complete() {
    let mut completes = 0;
    observable::of(1).do_on_complete(|| completes += 1).subscribe(|_| {});
    observable::throw_err::<i32, _>(())
      .do_on_complete(|| completes += 10)
      .subscribe(|_| {});
    assert_eq!(completes, 1);
  }
}
