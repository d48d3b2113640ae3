//! Observable traits and the creation functions.
//!
//! `Observable<Item, Err, O>` is the subscription entry point: a value that,
//! given an observer `O`, starts delivery and hands back the [`Disposable`]
//! of the chain. `ObservableExt<Item, Err>` is the operator surface; every
//! source and operator implements it.

mod connectable;
mod create;
mod from_iter;
mod interval;
mod of;
mod timer;
mod trivial;

pub use connectable::*;
pub use create::*;
pub use from_iter::*;
pub use interval::*;
pub use of::*;
pub use timer::*;
pub use trivial::*;

use crate::{
  observer::{ignore, ignore_ref, noop, Observer, ObserverAll},
  ops::{
    catch::CatchOp,
    filter::{FilterOp, TryFilterOp},
    finalize::FinalizeOp,
    flat_map::FlatMapOp,
    lifecycle::{TerminateOp, TerminatePhase},
    map::{MapOp, TryMapOp},
    map_err::MapErrOp,
    observe_on::ObserveOnOp,
    ref_count::RefCount,
    subscribe_on::SubscribeOnOp,
    tap::DoOp,
  },
  scheduler::Scheduler,
  subject::{ReplaySubject, Subject},
  subscriber::Subscriber,
  subscription::Disposable,
};

pub trait Observable<Item, Err, O> {
  /// Starts delivering to `observer` and returns the handle that tears the
  /// delivery down.
  fn actual_subscribe(self, observer: O) -> Disposable;
}

pub trait ObservableExt<Item, Err>: Sized {
  /// Subscribes with a `next` handler only; errors and completion are
  /// dropped.
  fn subscribe<N>(self, next: N) -> Disposable
  where
    N: FnMut(Item),
    Self: Observable<Item, Err, Subscriber<ObserverAll<N, fn(Err), fn()>>>,
  {
    self.subscribe_with(ObserverAll::new(next, ignore::<Err> as fn(Err), noop as fn()))
  }

  fn subscribe_err<N, E>(self, next: N, error: E) -> Disposable
  where
    N: FnMut(Item),
    E: FnOnce(Err),
    Self: Observable<Item, Err, Subscriber<ObserverAll<N, E, fn()>>>,
  {
    self.subscribe_with(ObserverAll::new(next, error, noop as fn()))
  }

  fn subscribe_all<N, E, C>(self, next: N, error: E, complete: C) -> Disposable
  where
    N: FnMut(Item),
    E: FnOnce(Err),
    C: FnOnce(),
    Self: Observable<Item, Err, Subscriber<ObserverAll<N, E, C>>>,
  {
    self.subscribe_with(ObserverAll::new(next, error, complete))
  }

  /// Subscribes `observer` and returns the [`Disposable`] of the whole
  /// chain. Disposing it stops delivery and releases every upstream
  /// resource.
  fn subscribe_with<O>(self, observer: O) -> Disposable
  where
    O: Observer<Item, Err>,
    Self: Observable<Item, Err, Subscriber<O>>,
  {
    let subscriber = Subscriber::new(observer);
    let subscription = subscriber.subscription();
    let upstream = self.actual_subscribe(subscriber);
    subscription.add(upstream);
    subscription
  }

  /// Creates a new stream which calls a closure on each element and uses
  /// its return as the value.
  #[inline]
  fn map<B, F>(self, f: F) -> MapOp<Self, F, Item>
  where
    F: FnMut(Item) -> B,
  {
    MapOp::new(self, f)
  }

  /// Like [`map`](ObservableExt::map) with a fallible closure. The first
  /// `Err` it returns disposes the upstream and terminates the stream with
  /// that error.
  #[inline]
  fn try_map<B, F>(self, f: F) -> TryMapOp<Self, F, Item>
  where
    F: FnMut(Item) -> Result<B, Err>,
  {
    TryMapOp::new(self, f)
  }

  /// Emit only those items that pass a predicate test.
  #[inline]
  fn filter<F>(self, predicate: F) -> FilterOp<Self, F>
  where
    F: FnMut(&Item) -> bool,
  {
    FilterOp::new(self, predicate)
  }

  /// Like [`filter`](ObservableExt::filter) with a fallible predicate.
  #[inline]
  fn try_filter<F>(self, predicate: F) -> TryFilterOp<Self, F>
  where
    F: FnMut(&Item) -> Result<bool, Err>,
  {
    TryFilterOp::new(self, predicate)
  }

  /// Converts the error of the stream.
  #[inline]
  fn map_err<E2, F>(self, f: F) -> MapErrOp<Self, F, Err>
  where
    F: FnOnce(Err) -> E2,
  {
    MapErrOp::new(self, f)
  }

  /// Runs `f` on every value before it is forwarded.
  #[inline]
  fn tap<F>(self, f: F) -> DoOp<Self, F, fn(&Err), fn()>
  where
    F: FnMut(&Item),
  {
    DoOp::new(self, f, ignore_ref::<Err> as fn(&Err), noop as fn())
  }

  /// Runs a side effect before each event is forwarded.
  #[inline]
  fn do_each<N, E, C>(self, next: N, error: E, complete: C) -> DoOp<Self, N, E, C>
  where
    N: FnMut(&Item),
    E: FnOnce(&Err),
    C: FnOnce(),
  {
    DoOp::new(self, next, error, complete)
  }

  #[inline]
  fn do_on_error<F>(self, f: F) -> DoOp<Self, fn(&Item), F, fn()>
  where
    F: FnOnce(&Err),
  {
    DoOp::new(self, ignore_ref::<Item> as fn(&Item), f, noop as fn())
  }

  #[inline]
  fn do_on_complete<F>(self, f: F) -> DoOp<Self, fn(&Item), fn(&Err), F>
  where
    F: FnOnce(),
  {
    DoOp::new(self, ignore_ref::<Item> as fn(&Item), ignore_ref::<Err> as fn(&Err), f)
  }

  /// Runs `f` once on error or completion, before the event is forwarded.
  #[inline]
  fn do_on_terminate<F>(self, f: F) -> TerminateOp<Self, F>
  where
    F: FnOnce(),
  {
    TerminateOp::new(self, f, TerminatePhase::Before)
  }

  /// Runs `f` once on error or completion, after the event was forwarded.
  #[inline]
  fn do_after_terminate<F>(self, f: F) -> TerminateOp<Self, F>
  where
    F: FnOnce(),
  {
    TerminateOp::new(self, f, TerminatePhase::After)
  }

  /// Recovers from an error: `handler` either returns the observable to
  /// continue with, or the error to propagate.
  #[inline]
  fn catch<S2, F>(self, handler: F) -> CatchOp<Self, F>
  where
    F: FnOnce(Err) -> Result<S2, Err>,
  {
    CatchOp::new(self, handler)
  }

  /// Calls a function when the observable completes, errors or is
  /// unsubscribed. The function runs exactly once.
  #[inline]
  fn finalize<F>(self, f: F) -> FinalizeOp<Self, F>
  where
    F: FnOnce() + Send + 'static,
  {
    FinalizeOp::new(self, f)
  }

  /// Subscribes to the upstream on `scheduler`.
  #[inline]
  fn subscribe_on<SD>(self, scheduler: SD) -> SubscribeOnOp<Self, SD>
  where
    SD: Scheduler,
  {
    SubscribeOnOp::new(self, scheduler)
  }

  /// Delivers every event on `scheduler`, in upstream order.
  #[inline]
  fn observe_on<SD>(self, scheduler: SD) -> ObserveOnOp<Self, SD>
  where
    SD: Scheduler,
  {
    ObserveOnOp::new(self, scheduler)
  }

  /// Maps each value to an observable and merges all of them.
  #[inline]
  fn flat_map<B, S2, F>(self, f: F) -> FlatMapOp<Self, F, Item>
  where
    F: FnMut(Item) -> S2,
    S2: ObservableExt<B, Err>,
  {
    FlatMapOp::new(self, f)
  }

  /// Shares one upstream subscription, started by
  /// [`connect`](ConnectableObservable::connect), between all subscribers.
  #[inline]
  fn publish(self) -> ConnectableObservable<Self, Subject<Item, Err>> {
    ConnectableObservable::new(self, Subject::new())
  }

  /// Like [`publish`](ObservableExt::publish), keeping the last
  /// `buffer_size` values (all of them with `None`) and the terminal event
  /// for late subscribers.
  #[inline]
  fn replay(self, buffer_size: Option<usize>) -> ConnectableObservable<Self, ReplaySubject<Item, Err>> {
    ConnectableObservable::new(self, ReplaySubject::new(buffer_size))
  }

  /// `publish().ref_count()`: connects with the first subscriber and
  /// disconnects when the last one leaves.
  #[inline]
  fn share(self) -> RefCount<Self, Subject<Item, Err>> { self.publish().ref_count() }
}
