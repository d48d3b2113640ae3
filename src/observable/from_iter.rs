use crate::prelude::*;
use std::convert::Infallible;

/// Creates an observable that produces values from an iterator.
///
/// Completes when all elements have been emitted. Never emits an error.
/// Stops early, without completing, once the downstream is closed.
///
/// # Examples
///
/// A simple example for a range:
///
/// ```
/// use rxcore::prelude::*;
///
/// observable::from_iter(0..10).subscribe(|v| println!("{},", v));
/// ```
///
/// Or with a vector:
///
/// ```
/// use rxcore::prelude::*;
///
/// observable::from_iter(vec![0, 1, 2, 3]).subscribe(|v| println!("{},", v));
/// ```
pub fn from_iter<Iter>(iter: Iter) -> ObservableIter<Iter>
where
  Iter: IntoIterator,
{
  ObservableIter(iter)
}

#[derive(Clone)]
pub struct ObservableIter<Iter>(Iter);

impl<O, Iter> Observable<Iter::Item, Infallible, O> for ObservableIter<Iter>
where
  Iter: IntoIterator,
  O: Observer<Iter::Item, Infallible>,
{
  fn actual_subscribe(self, mut observer: O) -> Disposable {
    for v in self.0 {
      if observer.is_closed() {
        return Disposable::empty();
      }
      observer.next(v);
    }
    observer.complete();
    Disposable::empty()
  }
}

impl<Iter> ObservableExt<Iter::Item, Infallible> for ObservableIter<Iter> where Iter: IntoIterator {}

#[cfg(test)]
mod test {
  use crate::prelude::*;

  #[test]
  fn from_range() {
    let mut hit_count = 0;
    let mut completed = false;
    observable::from_iter(0..100)
      .do_on_complete(|| completed = true)
      .subscribe(|_| hit_count += 1);

    assert_eq!(hit_count, 100);
    assert!(completed);
  }

  #[test]
  fn from_vec() {
    let mut hit_count = 0;
    let mut completed = false;
    observable::from_iter(vec![0; 100])
      .do_on_complete(|| completed = true)
      .subscribe(|_| hit_count += 1);

    assert_eq!(hit_count, 100);
    assert!(completed);
  }

  struct TakeThree(Vec<i32>);

  impl Observer<i32, std::convert::Infallible> for TakeThree {
    fn next(&mut self, value: i32) { self.0.push(value) }
    fn error(self, _: std::convert::Infallible) {}
    fn complete(self) { panic!("a closed observer must not complete") }
    fn is_closed(&self) -> bool { self.0.len() >= 3 }
  }

  #[test]
  fn stops_once_downstream_closed() {
    let mut pulled = 0;
    observable::from_iter(0..10)
      .tap(|_| pulled += 1)
      .subscribe_with(TakeThree(vec![]));
    assert_eq!(pulled, 3);
  }
}
