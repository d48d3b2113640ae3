use std::convert::Infallible;

use crate::prelude::*;

/// Creates an observable producing a single value.
///
/// Completes immediately after emitting the value given. Never emits an error.
///
/// # Examples
///
/// ```
/// use rxcore::prelude::*;
///
/// observable::of(123).subscribe(|v| println!("{},", v));
/// ```
pub fn of<Item>(v: Item) -> ObservableOf<Item> { ObservableOf(v) }

#[derive(Clone)]
pub struct ObservableOf<Item>(Item);

impl<Item, O> Observable<Item, Infallible, O> for ObservableOf<Item>
where
  O: Observer<Item, Infallible>,
{
  fn actual_subscribe(self, mut observer: O) -> Disposable {
    observer.next(self.0);
    observer.complete();
    Disposable::empty()
  }
}

impl<Item> ObservableExt<Item, Infallible> for ObservableOf<Item> {}

/// Creates an observable that emits the value, or the error, held by a
/// `Result`.
///
/// An `Ok` emits its value then completes; an `Err` terminates the stream
/// with the error.
pub fn of_result<Item, Err>(r: Result<Item, Err>) -> ObservableOfResult<Item, Err> {
  ObservableOfResult(r)
}

#[derive(Clone)]
pub struct ObservableOfResult<Item, Err>(Result<Item, Err>);

impl<Item, Err, O> Observable<Item, Err, O> for ObservableOfResult<Item, Err>
where
  O: Observer<Item, Err>,
{
  fn actual_subscribe(self, mut observer: O) -> Disposable {
    match self.0 {
      Ok(v) => {
        observer.next(v);
        observer.complete();
      }
      Err(e) => observer.error(e),
    }
    Disposable::empty()
  }
}

impl<Item, Err> ObservableExt<Item, Err> for ObservableOfResult<Item, Err> {}

/// Creates an observable that emits the value of an `Option` if there is
/// one, then completes.
pub fn of_option<Item>(o: Option<Item>) -> ObservableOfOption<Item> { ObservableOfOption(o) }

#[derive(Clone)]
pub struct ObservableOfOption<Item>(Option<Item>);

impl<Item, O> Observable<Item, Infallible, O> for ObservableOfOption<Item>
where
  O: Observer<Item, Infallible>,
{
  fn actual_subscribe(self, mut observer: O) -> Disposable {
    if let Some(v) = self.0 {
      observer.next(v);
    }
    observer.complete();
    Disposable::empty()
  }
}

impl<Item> ObservableExt<Item, Infallible> for ObservableOfOption<Item> {}

/// Creates an observable that calls `f` on every subscription and emits
/// what it returns.
pub fn of_fn<F, Item>(f: F) -> ObservableOfFn<F>
where
  F: FnOnce() -> Item,
{
  ObservableOfFn(f)
}

#[derive(Clone)]
pub struct ObservableOfFn<F>(F);

impl<Item, O, F> Observable<Item, Infallible, O> for ObservableOfFn<F>
where
  O: Observer<Item, Infallible>,
  F: FnOnce() -> Item,
{
  fn actual_subscribe(self, mut observer: O) -> Disposable {
    observer.next((self.0)());
    observer.complete();
    Disposable::empty()
  }
}

impl<Item, F> ObservableExt<Item, Infallible> for ObservableOfFn<F> where F: FnOnce() -> Item {}

#[cfg(test)]
mod test {
  use crate::prelude::*;

  #[test]
  fn from_fn() {
    let mut value = 0;
    let mut completed = false;
    let callable = || 123;
    observable::of_fn(callable).subscribe_all(|v| value = v, |_| {}, || completed = true);

    assert_eq!(value, 123);
    assert!(completed);
  }

  #[test]
  fn of_ok_result() {
    let mut value = 0;
    let mut completed = false;
    let r: Result<i32, &str> = Ok(123);
    observable::of_result(r).subscribe_all(|v| value = v, |_| {}, || completed = true);

    assert_eq!(value, 123);
    assert!(completed);
  }

  #[test]
  fn of_err_result() {
    let mut value = 0;
    let mut error_reported = false;
    let r: Result<i32, &str> = Err("error");
    observable::of_result(r).subscribe_err(|v| value = v, |_| error_reported = true);

    assert_eq!(value, 0);
    assert!(error_reported);
  }

  #[test]
  fn of_option() {
    let mut value1 = 0;
    let mut completed1 = false;
    observable::of_option(Some(123)).subscribe_all(|v| value1 = v, |_| {}, || completed1 = true);

    assert_eq!(value1, 123);
    assert!(completed1);

    let mut value2 = 0;
    let mut completed2 = false;
    observable::of_option(None).subscribe_all(|v: i32| value2 = v, |_| {}, || completed2 = true);

    assert_eq!(value2, 0);
    assert!(completed2);
  }

  #[test]
  fn of() {
    let mut value = 0;
    let mut completed = false;
    observable::of(100).subscribe_all(|v| value = v, |_| {}, || completed = true);

    assert_eq!(value, 100);
    assert!(completed);
  }

  #[test]
  fn fork() {
    let o = observable::of(1);
    let mut sum = 0;
    o.clone().subscribe(|v| sum += v);
    o.subscribe(|v| sum += v);
    assert_eq!(sum, 2);
  }
}
