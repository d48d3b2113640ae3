use crate::{prelude::*, type_hint::TypeHint};

/// Creates an observable from a producer closure.
///
/// The closure runs on every subscription with a `&mut dyn Emitter` to push
/// values into. Returning `Err` from the closure is a production failure: it
/// is delivered through `error` while the emitter is still open. An `Err`
/// returned after the stream already terminated cannot be delivered; it is
/// logged and raised again as a panic carrying the error.
///
/// ```
/// use rxcore::prelude::*;
///
/// let mut sum = 0;
/// observable::create(|emitter: &mut dyn Emitter<i32, ()>| {
///   emitter.next(1);
///   emitter.next(2);
///   emitter.complete();
///   Ok(())
/// })
/// .subscribe(|v| sum += v);
/// assert_eq!(sum, 3);
/// ```
pub fn create<F, Item, Err>(f: F) -> Create<F, Item, Err>
where
  F: FnOnce(&mut dyn Emitter<Item, Err>) -> Result<(), Err>,
{
  Create { f, _hint: TypeHint::new() }
}

pub struct Create<F, Item, Err> {
  f: F,
  _hint: TypeHint<(Item, Err)>,
}

impl<F: Clone, Item, Err> Clone for Create<F, Item, Err> {
  fn clone(&self) -> Self { Create { f: self.f.clone(), _hint: TypeHint::new() } }
}

struct CreateEmitter<O> {
  observer: Option<O>,
  subscription: Disposable,
}

impl<O, Item, Err> Emitter<Item, Err> for CreateEmitter<O>
where
  O: Observer<Item, Err>,
{
  fn next(&mut self, value: Item) {
    if self.subscription.is_disposed() {
      return;
    }
    if let Some(observer) = &mut self.observer {
      observer.next(value);
    }
  }

  fn error(&mut self, err: Err) {
    if let Some(observer) = self.observer.take() {
      if !self.subscription.is_disposed() {
        observer.error(err);
      }
      self.subscription.dispose();
    }
  }

  fn complete(&mut self) {
    if let Some(observer) = self.observer.take() {
      if !self.subscription.is_disposed() {
        observer.complete();
      }
      self.subscription.dispose();
    }
  }

  fn is_closed(&self) -> bool {
    self.subscription.is_disposed() || self.observer.as_ref().map_or(true, O::is_closed)
  }

  fn add_teardown(&mut self, teardown: Disposable) { self.subscription.add(teardown); }
}

impl<F, Item, Err, O> Observable<Item, Err, O> for Create<F, Item, Err>
where
  O: Observer<Item, Err>,
  F: FnOnce(&mut dyn Emitter<Item, Err>) -> Result<(), Err>,
  Err: Send + 'static,
{
  fn actual_subscribe(self, observer: O) -> Disposable {
    let subscription = Disposable::new();
    let mut emitter = CreateEmitter { observer: Some(observer), subscription: subscription.clone() };
    if let Err(err) = (self.f)(&mut emitter) {
      match emitter.observer.take() {
        Some(observer) if !subscription.is_disposed() && !observer.is_closed() => {
          observer.error(err);
          subscription.dispose();
        }
        _ => {
          log::error!("create: the producer failed after its stream terminated, re-raising");
          std::panic::panic_any(err)
        }
      }
    }
    subscription
  }
}

impl<F, Item, Err> ObservableExt<Item, Err> for Create<F, Item, Err> where
  F: FnOnce(&mut dyn Emitter<Item, Err>) -> Result<(), Err>
{
}

#[cfg(test)]
mod test {
  use crate::prelude::*;
  use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
  };

  #[test]
  fn proxy_call() {
    let mut next = 0;
    let mut err = 0;
    let mut complete = 0;

    observable::create(|emitter: &mut dyn Emitter<i32, &'static str>| {
      emitter.next(1);
      emitter.next(2);
      emitter.next(3);
      emitter.complete();
      emitter.next(3);
      emitter.error("never dispatch error");
      Ok(())
    })
    .subscribe_all(|_| next += 1, |_| err += 1, || complete += 1);

    assert_eq!(next, 3);
    assert_eq!(complete, 1);
    assert_eq!(err, 0);
  }

  #[test]
  fn returned_error_is_delivered() {
    let mut values = vec![];
    let mut error = None;
    observable::create(|emitter: &mut dyn Emitter<i32, String>| {
      emitter.next(1);
      Err("broken".to_string())
    })
    .subscribe_err(|v| values.push(v), |e| error = Some(e));

    assert_eq!(values, vec![1]);
    assert_eq!(error.as_deref(), Some("broken"));
  }

  #[test]
  fn undeliverable_error_is_raised() {
    let res = std::panic::catch_unwind(|| {
      observable::create(|emitter: &mut dyn Emitter<i32, &'static str>| {
        emitter.complete();
        Err("too late")
      })
      .subscribe(|_| {});
    });
    let payload = res.expect_err("the error must be raised");
    assert_eq!(payload.downcast_ref::<&str>(), Some(&"too late"));
  }

  #[test]
  fn teardown_runs_on_unsubscribe() {
    let torn_down = Arc::new(AtomicBool::new(false));
    let c_torn_down = torn_down.clone();
    let subscription = observable::create(move |emitter: &mut dyn Emitter<i32, ()>| {
      emitter.next(1);
      emitter.add_teardown(Disposable::from_fn(move || c_torn_down.store(true, Ordering::SeqCst)));
      Ok(())
    })
    .subscribe(|_| {});

    assert!(!torn_down.load(Ordering::SeqCst));
    subscription.dispose();
    assert!(torn_down.load(Ordering::SeqCst));
  }

  #[test]
  fn teardown_runs_on_complete() {
    let torn_down = Arc::new(AtomicBool::new(false));
    let c_torn_down = torn_down.clone();
    observable::create(move |emitter: &mut dyn Emitter<i32, ()>| {
      emitter.add_teardown(Disposable::from_fn(move || c_torn_down.store(true, Ordering::SeqCst)));
      emitter.complete();
      Ok(())
    })
    .subscribe(|_| {});

    assert!(torn_down.load(Ordering::SeqCst));
  }
}
