use crate::prelude::*;

/// Performs the upstream subscription on a scheduler.
///
/// The returned handle cancels the pending subscribe task and, once it ran,
/// the upstream subscription it established.
#[derive(Clone)]
pub struct SubscribeOnOp<S, SD> {
  source: S,
  scheduler: SD,
}

impl<S, SD> SubscribeOnOp<S, SD> {
  #[inline]
  pub fn new(source: S, scheduler: SD) -> Self { SubscribeOnOp { source, scheduler } }
}

impl<Item, Err, O, S, SD> Observable<Item, Err, O> for SubscribeOnOp<S, SD>
where
  O: Observer<Item, Err> + Send + 'static,
  S: Observable<Item, Err, O> + Send + 'static,
  SD: Scheduler,
{
  fn actual_subscribe(self, observer: O) -> Disposable {
    let subscription = Disposable::new();
    let c_subscription = subscription.clone();
    let source = self.source;
    let task = self.scheduler.schedule(
      Box::new(move || {
        if !c_subscription.is_disposed() {
          c_subscription.add(source.actual_subscribe(observer));
        }
      }),
      None,
    );
    match task {
      Ok(task) => subscription.add(task),
      Err(err) => log::warn!("subscribe_on dropped the subscription: {err}"),
    }
    subscription
  }
}

impl<Item, Err, S, SD> ObservableExt<Item, Err> for SubscribeOnOp<S, SD> where
  S: ObservableExt<Item, Err>
{
}
