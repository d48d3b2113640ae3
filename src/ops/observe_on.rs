use std::sync::Arc;

use parking_lot::Mutex;

use crate::{
  observer::{Notification, SerializedObserver},
  prelude::*,
};

/// Re-emits every upstream event on a scheduler.
///
/// Events are queued in arrival order and drained by one task on the target
/// scheduler at a time, so the downstream observer sees them in upstream
/// order and never concurrently. Disposing returns only after a delivery in
/// flight on the scheduler thread has finished.
#[derive(Clone)]
pub struct ObserveOnOp<S, SD> {
  source: S,
  scheduler: SD,
}

impl<S, SD> ObserveOnOp<S, SD> {
  #[inline]
  pub fn new(source: S, scheduler: SD) -> Self { ObserveOnOp { source, scheduler } }
}

impl<Item, Err, O, S, SD> Observable<Item, Err, O> for ObserveOnOp<S, SD>
where
  S: Observable<Item, Err, ObserveOnObserver<Item, Err, O, SD>>,
  O: Observer<Item, Err> + Send + 'static,
  Item: Send + 'static,
  Err: Send + 'static,
  SD: Scheduler + 'static,
{
  fn actual_subscribe(self, observer: O) -> Disposable {
    let state = Arc::new(ObserveOnState {
      serialized: SerializedObserver::new(observer),
      scheduler: self.scheduler,
      drain_task: Mutex::new(None),
    });
    let subscription = Disposable::new();
    let weak = Arc::downgrade(&state);
    subscription.add_disposed_callback(move || {
      if let Some(state) = weak.upgrade() {
        state.close();
      }
    });
    subscription.add(self.source.actual_subscribe(ObserveOnObserver { state }));
    subscription
  }
}

impl<Item, Err, S, SD> ObservableExt<Item, Err> for ObserveOnOp<S, SD> where
  S: ObservableExt<Item, Err>
{
}

struct ObserveOnState<Item, Err, O, SD> {
  serialized: SerializedObserver<Item, Err, O>,
  scheduler: SD,
  drain_task: Mutex<Option<Disposable>>,
}

impl<Item, Err, O, SD> ObserveOnState<Item, Err, O, SD>
where
  O: Observer<Item, Err> + Send + 'static,
  Item: Send + 'static,
  Err: Send + 'static,
  SD: Scheduler + 'static,
{
  fn push(self: &Arc<Self>, notification: Notification<Item, Err>) {
    if !self.serialized.push(notification) {
      return;
    }
    let state = self.clone();
    match self.scheduler.schedule(Box::new(move || state.serialized.drain()), None) {
      Ok(task) => *self.drain_task.lock() = Some(task),
      Err(err) => {
        log::warn!("observe_on dropped pending events: {err}");
        self.close();
      }
    }
  }

  fn close(&self) {
    self.serialized.close();
    let task = self.drain_task.lock().take();
    if let Some(task) = task {
      task.dispose();
    }
  }
}

pub struct ObserveOnObserver<Item, Err, O, SD> {
  state: Arc<ObserveOnState<Item, Err, O, SD>>,
}

impl<Item, Err, O, SD> Observer<Item, Err> for ObserveOnObserver<Item, Err, O, SD>
where
  O: Observer<Item, Err> + Send + 'static,
  Item: Send + 'static,
  Err: Send + 'static,
  SD: Scheduler + 'static,
{
  fn next(&mut self, value: Item) { self.state.push(Notification::Next(value)) }

  fn error(self, err: Err) { self.state.push(Notification::Error(err)) }

  fn complete(self) { self.state.push(Notification::Complete) }

  fn is_closed(&self) -> bool { self.state.serialized.is_closed() }
}

#[cfg(test)]
mod test {
  use crate::prelude::*;
  use std::{
    sync::{
      atomic::{AtomicUsize, Ordering},
      mpsc, Arc, Mutex,
    },
    thread,
    time::Duration,
  };

  #[test]
  fn delivers_on_the_scheduler_thread() {
    let scheduler = SingleThreadScheduler::new().unwrap();
    let (tx, rx) = mpsc::channel();
    let c_tx = tx.clone();
    observable::from_iter(0..3)
      .observe_on(scheduler.handle())
      .subscribe_all(
        move |v| {
          let _ = tx.send(Some((v, thread::current().id())));
        },
        |_| {},
        move || {
          let _ = c_tx.send(None);
        },
      );

    let mut values = vec![];
    while let Some((v, id)) = rx.recv_timeout(Duration::from_secs(5)).unwrap() {
      assert_ne!(id, thread::current().id());
      values.push(v);
    }
    assert_eq!(values, vec![0, 1, 2]);
  }

  #[cfg(feature = "futures-scheduler")]
  #[test]
  fn keeps_order_on_a_pool() {
    let pool = ThreadPoolScheduler::builder().pool_size(4).build().unwrap();
    let (tx, rx) = mpsc::channel();
    let values = Arc::new(Mutex::new(vec![]));
    let c_values = values.clone();
    observable::from_iter(0..1000)
      .observe_on(pool)
      .subscribe_all(
        move |v| c_values.lock().unwrap().push(v),
        |_| {},
        move || {
          let _ = tx.send(());
        },
      );

    rx.recv_timeout(Duration::from_secs(10)).unwrap();
    assert_eq!(*values.lock().unwrap(), (0..1000).collect::<Vec<_>>());
  }

  #[test]
  fn dispose_waits_for_delivery_in_flight() {
    let scheduler = SingleThreadScheduler::new().unwrap();
    let (entered_tx, entered_rx) = mpsc::channel();
    let (release_tx, release_rx) = mpsc::channel::<()>();
    let finished = Arc::new(AtomicUsize::new(0));
    let c_finished = finished.clone();
    let release_rx = Mutex::new(release_rx);
    let mut subject = Subject::<i32, ()>::new();
    let subscription = subject
      .clone()
      .observe_on(scheduler.handle())
      .subscribe(move |_| {
        let _ = entered_tx.send(());
        let _ = release_rx.lock().unwrap().recv();
        c_finished.fetch_add(1, Ordering::SeqCst);
      });

    subject.next(1);
    subject.next(2);
    entered_rx.recv_timeout(Duration::from_secs(5)).unwrap();
    let disposer = thread::spawn(move || subscription.dispose());
    thread::sleep(Duration::from_millis(20));
    release_tx.send(()).unwrap();
    disposer.join().unwrap();

    assert_eq!(finished.load(Ordering::SeqCst), 1);
    drop(release_tx);
    thread::sleep(Duration::from_millis(20));
    assert_eq!(finished.load(Ordering::SeqCst), 1);
  }
}
