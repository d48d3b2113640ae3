/// Runs a closure when dropped, including during unwinding.
pub(crate) struct Defer<F: FnOnce()>(Option<F>);

impl<F: FnOnce()> Drop for Defer<F> {
  fn drop(&mut self) {
    if let Some(cb) = self.0.take() {
      cb();
    }
  }
}

pub(crate) fn defer<F: FnOnce()>(cb: F) -> Defer<F> { Defer(Some(cb)) }
