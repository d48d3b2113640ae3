use std::{
  convert::Infallible,
  time::{Duration, Instant},
};

use crate::prelude::*;

/// Returns an observable which will emit a single `item` once after a given
/// `dur` using a given `scheduler`, then complete.
pub fn timer<Item, SD>(item: Item, dur: Duration, scheduler: SD) -> TimerObservable<Item, SD> {
  TimerObservable { item, dur, scheduler }
}

/// Returns an observable which will emit a single `item` once at a given
/// timestamp `at` using a given `scheduler`. If `at` is in the past the item
/// is emitted without delay.
pub fn timer_at<Item, SD>(item: Item, at: Instant, scheduler: SD) -> TimerObservable<Item, SD> {
  let dur = at.saturating_duration_since(Instant::now());
  TimerObservable { item, dur, scheduler }
}

#[derive(Clone)]
pub struct TimerObservable<Item, SD> {
  item: Item,
  dur: Duration,
  scheduler: SD,
}

fn timer_task<Item, O>(mut observer: O, item: Item)
where
  O: Observer<Item, Infallible>,
{
  observer.next(item);
  observer.complete();
}

impl<Item, O, SD> Observable<Item, Infallible, O> for TimerObservable<Item, SD>
where
  O: Observer<Item, Infallible> + Send + 'static,
  Item: Send + 'static,
  SD: Scheduler,
{
  fn actual_subscribe(self, observer: O) -> Disposable {
    let Self { item, dur, scheduler } = self;
    match scheduler.schedule(Box::new(move || timer_task(observer, item)), Some(dur)) {
      Ok(task) => task,
      Err(err) => {
        log::warn!("timer could not be scheduled: {err}");
        Disposable::empty()
      }
    }
  }
}

impl<Item, SD> ObservableExt<Item, Infallible> for TimerObservable<Item, SD> {}

#[cfg(test)]
mod tests {
  use crate::prelude::*;
  use std::{
    sync::{mpsc, Arc, Mutex},
    time::{Duration, Instant},
  };

  #[test]
  fn timer_shall_emit_value() {
    let stamp = Instant::now();
    let got = Arc::new(Mutex::new(vec![]));
    let c_got = got.clone();
    let completed = Arc::new(Mutex::new(false));
    let c_completed = completed.clone();

    observable::timer(1234, Duration::from_millis(20), ImmediateScheduler).subscribe_all(
      move |v| c_got.lock().unwrap().push(v),
      |_| {},
      move || *c_completed.lock().unwrap() = true,
    );

    assert!(stamp.elapsed() >= Duration::from_millis(20));
    assert_eq!(*got.lock().unwrap(), vec![1234]);
    assert!(*completed.lock().unwrap());
  }

  #[test]
  fn timer_at_in_the_past_fires_at_once() {
    let (tx, rx) = mpsc::channel();
    let scheduler = SingleThreadScheduler::new().unwrap();
    observable::timer_at("now", Instant::now(), scheduler.handle()).subscribe(move |v| {
      let _ = tx.send(v);
    });
    assert_eq!(rx.recv_timeout(Duration::from_secs(5)), Ok("now"));
  }

  #[test]
  fn disposed_timer_never_fires() {
    let (tx, rx) = mpsc::channel::<i32>();
    let scheduler = SingleThreadScheduler::new().unwrap();
    let subscription =
      observable::timer(1, Duration::from_millis(50), scheduler.handle()).subscribe(move |v| {
        let _ = tx.send(v);
      });
    subscription.dispose();
    assert!(rx.recv_timeout(Duration::from_millis(150)).is_err());
  }
}
