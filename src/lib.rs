//! # rxcore: a thread-safe, push-based reactive streams engine
//!
//! Observables push values to observers until they complete or fail.
//! Operators wrap a source into a new observable, schedulers decide where
//! and when work runs, and every subscription is a [`Disposable`] that tears
//! the whole chain down.
//!
//! ```rust
//! use rxcore::prelude::*;
//!
//! let mut out = vec![];
//! observable::from_iter(0..10)
//!   .filter(|v| v % 2 == 0)
//!   .map(|v| v * 2)
//!   .subscribe(|v| out.push(v));
//! assert_eq!(out, vec![0, 4, 8, 12, 16]);
//! ```
//!
//! ## Key Concepts
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Observable`] | Starts delivery to an observer, returns its [`Disposable`] |
//! | [`ObservableExt`] | The operator surface and the `subscribe` family |
//! | [`Observer`] | Consumes `next`, `error`, and `complete` events |
//! | [`Scheduler`] | Runs tasks now, later, or on another thread |
//! | [`Subject`] | Observer and observable at once, multicasting to subscribers |
//! | [`DisposeBag`] | Disposes a group of subscriptions together |
//!
//! ## Feature Flags
//!
//! - **`futures-scheduler`** (default): [`ThreadPoolScheduler`] backed by the
//!   `futures` thread pool.
//!
//! [`Disposable`]: subscription::Disposable
//! [`DisposeBag`]: subscription::DisposeBag
//! [`Observable`]: observable::Observable
//! [`ObservableExt`]: observable::ObservableExt
//! [`Observer`]: observer::Observer
//! [`Scheduler`]: scheduler::Scheduler
//! [`Subject`]: subject::Subject
//! [`ThreadPoolScheduler`]: scheduler::ThreadPoolScheduler

pub mod error;
pub mod observable;
pub mod observer;
pub mod ops;
pub mod prelude;
pub mod rc;
pub mod scheduler;
pub mod subject;
pub mod subscriber;
pub mod subscription;
mod type_hint;
mod util;

pub use prelude::*;
