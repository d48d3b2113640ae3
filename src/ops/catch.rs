use crate::prelude::*;

/// Recovers from an upstream error.
///
/// On error the upstream is disposed and `handler` decides: `Ok(fallback)`
/// subscribes `fallback` in place of the failed source, `Err(err)` propagates
/// `err` downstream.
///
/// ```
/// use rxcore::prelude::*;
///
/// let mut values = vec![];
/// observable::throw_err::<i32, _>("broken")
///   .catch(|_| Ok(observable::of_result(Ok(7))))
///   .subscribe(|v| values.push(v));
/// assert_eq!(values, vec![7]);
/// ```
#[derive(Clone)]
pub struct CatchOp<S, F> {
  source: S,
  handler: F,
}

impl<S, F> CatchOp<S, F> {
  #[inline]
  pub fn new(source: S, handler: F) -> Self { CatchOp { source, handler } }
}

impl<Item, Err, O, S, S2, F> Observable<Item, Err, O> for CatchOp<S, F>
where
  S: Observable<Item, Err, CatchObserver<O, F>>,
  F: FnOnce(Err) -> Result<S2, Err>,
  S2: Observable<Item, Err, O>,
  O: Observer<Item, Err>,
{
  fn actual_subscribe(self, observer: O) -> Disposable {
    let subscription = Disposable::new();
    let upstream = Disposable::new();
    subscription.add(upstream.clone());
    let observer = CatchObserver {
      observer,
      handler: self.handler,
      upstream: upstream.clone(),
      subscription: subscription.clone(),
    };
    upstream.add(self.source.actual_subscribe(observer));
    subscription
  }
}

impl<Item, Err, S, F> ObservableExt<Item, Err> for CatchOp<S, F> where S: ObservableExt<Item, Err> {}

pub struct CatchObserver<O, F> {
  observer: O,
  handler: F,
  upstream: Disposable,
  subscription: Disposable,
}

impl<Item, Err, O, S2, F> Observer<Item, Err> for CatchObserver<O, F>
where
  O: Observer<Item, Err>,
  F: FnOnce(Err) -> Result<S2, Err>,
  S2: Observable<Item, Err, O>,
{
  #[inline]
  fn next(&mut self, value: Item) { self.observer.next(value) }

  fn error(self, err: Err) {
    self.upstream.dispose();
    if self.subscription.is_disposed() {
      return;
    }
    match (self.handler)(err) {
      Ok(fallback) => {
        let fallback = fallback.actual_subscribe(self.observer);
        self.subscription.add(fallback);
      }
      Err(err) => self.observer.error(err),
    }
  }

  #[inline]
  fn complete(self) { self.observer.complete() }

  #[inline]
  fn is_closed(&self) -> bool { self.observer.is_closed() }
}

#[cfg(test)]
mod test {
  use crate::prelude::*;
  use std::sync::{Arc, Mutex};

  #[test]
  fn switches_to_fallback() {
    let mut values = vec![];
    let mut completed = false;
    observable::create(|emitter: &mut dyn Emitter<i32, &'static str>| {
      emitter.next(1);
      emitter.next(2);
      emitter.error("lost");
      Ok(())
    })
    .catch(|_| Ok(observable::from_iter(10..12).map_err(|e| -> &'static str { match e {} })))
    .subscribe_all(|v| values.push(v), |_| {}, || completed = true);

    assert_eq!(values, vec![1, 2, 10, 11]);
    assert!(completed);
  }

  #[test]
  fn handler_may_rethrow() {
    let mut error = None;
    observable::throw_err::<i32, _>(1)
      .catch(|e| Err::<ObservableOfResult<i32, i32>, _>(e + 1))
      .subscribe_err(|_| {}, |e| error = Some(e));
    assert_eq!(error, Some(2));
  }

  #[test]
  fn dispose_reaches_fallback() {
    let source = Subject::<i32, &'static str>::new();
    let fallback = Subject::<i32, &'static str>::new();
    let values = Arc::new(Mutex::new(vec![]));
    let c_values = values.clone();
    let c_fallback = fallback.clone();
    let subscription = source
      .clone()
      .catch(move |_| Ok(c_fallback))
      .subscribe(move |v| c_values.lock().unwrap().push(v));

    source.clone().error("switch");
    assert_eq!(fallback.subscriber_count(), 1);
    fallback.clone().next(5);
    subscription.dispose();
    assert_eq!(fallback.subscriber_count(), 0);
    fallback.clone().next(6);
    assert_eq!(*values.lock().unwrap(), vec![5]);
  }
}
