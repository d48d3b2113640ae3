use std::{
  convert::Infallible,
  time::{Duration, Instant},
};

use crate::{
  prelude::*,
  rc::{MutArc, RcDerefMut},
};

/// Creates an observable which will fire at `dur` time into the future,
/// and will repeat every `dur` interval after.
///
/// Ticks are scheduled one at a time against absolute due points, so a slow
/// tick delays the next one without accumulating drift. Use a scheduler that
/// runs delayed work off the subscribing call: an [`ImmediateScheduler`] runs
/// each tick inside the previous one and overflows the stack. A
/// [`TrampolineScheduler`] queues the ticks instead, so `subscribe` only
/// returns once the observer is closed.
pub fn interval<SD>(dur: Duration, scheduler: SD) -> IntervalObservable<SD> {
  IntervalObservable { dur, delay: None, scheduler }
}

/// Creates an observable which will fire at the time specified by `at`,
/// and then will repeat every `dur` interval after
pub fn interval_at<SD>(at: Instant, dur: Duration, scheduler: SD) -> IntervalObservable<SD> {
  let delay = at.saturating_duration_since(Instant::now());
  IntervalObservable { scheduler, dur, delay: Some(delay) }
}

#[derive(Clone)]
pub struct IntervalObservable<SD> {
  scheduler: SD,
  dur: Duration,
  delay: Option<Duration>,
}

struct IntervalTick<SD, O> {
  scheduler: SD,
  observer: O,
  dur: Duration,
  due: Instant,
  seq: usize,
  subscription: Disposable,
  pending: MutArc<Option<Disposable>>,
}

impl<SD, O> Observable<usize, Infallible, O> for IntervalObservable<SD>
where
  O: Observer<usize, Infallible> + Send + 'static,
  SD: Scheduler + Clone + 'static,
{
  fn actual_subscribe(self, observer: O) -> Disposable {
    let Self { scheduler, dur, delay } = self;
    let subscription = Disposable::new();
    let pending = MutArc::own(None::<Disposable>);
    let c_pending = pending.downgrade();
    subscription.add_disposed_callback(move || {
      let Some(pending) = c_pending.upgrade() else { return };
      let task = pending.rc_deref_mut().take();
      if let Some(task) = task {
        task.dispose();
      }
    });
    let due = Instant::now() + delay.unwrap_or(dur);
    schedule_tick(IntervalTick {
      scheduler,
      observer,
      dur,
      due,
      seq: 0,
      subscription: subscription.clone(),
      pending,
    });
    subscription
  }
}

impl<SD> ObservableExt<usize, Infallible> for IntervalObservable<SD> {}

fn schedule_tick<SD, O>(tick: IntervalTick<SD, O>)
where
  O: Observer<usize, Infallible> + Send + 'static,
  SD: Scheduler + Clone + 'static,
{
  if tick.subscription.is_disposed() {
    return;
  }
  let delay = tick.due.saturating_duration_since(Instant::now());
  let scheduler = tick.scheduler.clone();
  let pending = tick.pending.clone();
  match scheduler.schedule(Box::new(move || interval_task(tick)), Some(delay)) {
    Ok(task) => *pending.rc_deref_mut() = Some(task),
    Err(err) => log::warn!("interval stopped ticking: {err}"),
  }
}

fn interval_task<SD, O>(mut tick: IntervalTick<SD, O>)
where
  O: Observer<usize, Infallible> + Send + 'static,
  SD: Scheduler + Clone + 'static,
{
  if tick.subscription.is_disposed() || tick.observer.is_closed() {
    return;
  }
  tick.observer.next(tick.seq);
  tick.seq += 1;
  tick.due += tick.dur;
  schedule_tick(tick);
}
