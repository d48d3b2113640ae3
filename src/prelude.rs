//! Prelude module for convenient imports
//!
//! This module re-exports commonly used types and traits for easy access.

pub use crate::{
  error::SchedulerError,
  observable,
  observable::{
    ConnectableObservable, Create, Empty, IntervalObservable, Never, Observable, ObservableExt,
    ObservableIter, ObservableOf, ObservableOfFn, ObservableOfOption, ObservableOfResult,
    ThrowErr, TimerObservable,
  },
  observer::{ignore, ignore_ref, noop, BoxedObserver, DynObserver, Emitter, Observer, ObserverAll},
  ops::ref_count::RefCount,
  scheduler::*,
  subject::*,
  subscriber::Subscriber,
  subscription::*,
};
