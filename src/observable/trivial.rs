use std::convert::Infallible;

use crate::{prelude::*, type_hint::TypeHint};

/// Creates an observable that emits no items, just terminates with an error.
pub fn throw_err<Item, Err>(e: Err) -> ThrowErr<Item, Err> { ThrowErr(e, TypeHint::new()) }

pub struct ThrowErr<Item, Err>(Err, TypeHint<Item>);

impl<Item, Err: Clone> Clone for ThrowErr<Item, Err> {
  fn clone(&self) -> Self { ThrowErr(self.0.clone(), TypeHint::new()) }
}

impl<Item, Err, O> Observable<Item, Err, O> for ThrowErr<Item, Err>
where
  O: Observer<Item, Err>,
{
  fn actual_subscribe(self, observer: O) -> Disposable {
    observer.error(self.0);
    Disposable::empty()
  }
}

impl<Item, Err> ObservableExt<Item, Err> for ThrowErr<Item, Err> {}

/// Creates an observable that produces no values.
///
/// Completes immediately. Never emits an error.
///
/// ```
/// use rxcore::prelude::*;
///
/// observable::empty::<i32>().subscribe(|v| println!("{},", v));
///
/// // Result: no thing printed
/// ```
pub fn empty<Item>() -> Empty<Item> { Empty(TypeHint::new()) }

pub struct Empty<Item>(TypeHint<Item>);

impl<Item> Clone for Empty<Item> {
  fn clone(&self) -> Self { Empty(TypeHint::new()) }
}

impl<Item, O> Observable<Item, Infallible, O> for Empty<Item>
where
  O: Observer<Item, Infallible>,
{
  fn actual_subscribe(self, observer: O) -> Disposable {
    observer.complete();
    Disposable::empty()
  }
}

impl<Item> ObservableExt<Item, Infallible> for Empty<Item> {}

/// Creates an observable that never emits anything and never terminates.
///
/// The observer is dropped right away; the returned handle only reports
/// whether it has been disposed.
pub fn never<Item>() -> Never<Item> { Never(TypeHint::new()) }

pub struct Never<Item>(TypeHint<Item>);

impl<Item> Clone for Never<Item> {
  fn clone(&self) -> Self { Never(TypeHint::new()) }
}

impl<Item, O> Observable<Item, Infallible, O> for Never<Item>
where
  O: Observer<Item, Infallible>,
{
  fn actual_subscribe(self, _observer: O) -> Disposable { Disposable::new() }
}

impl<Item> ObservableExt<Item, Infallible> for Never<Item> {}
