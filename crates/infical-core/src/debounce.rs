/// Trailing-edge debouncer driven by
/// caller-supplied millisecond clocks.
///
/// Each [`push`](Self::push) supersedes
/// the pending value and restarts the
/// quiet period; [`poll`](Self::poll)
/// releases the latest value once `delay`
/// has passed without a new push.
#[derive(Debug, Clone)]
pub struct Debouncer<T> {
  delay_ms: u64,
  pending:  Option<(T, u64)>
}

pub const SCROLL_DEBOUNCE_MS: u64 = 150;

impl<T> Debouncer<T> {
  #[must_use]
  pub fn new(delay_ms: u64) -> Self {
    Self {
      delay_ms,
      pending: None
    }
  }

  pub fn push(
    &mut self,
    value: T,
    now_ms: u64
  ) {
    self.pending = Some((value, now_ms));
  }

  /// Instant at which the pending value
  /// becomes due.
  #[must_use]
  pub fn deadline(&self) -> Option<u64> {
    self.pending.as_ref().map(|(_, at)| {
      at.saturating_add(self.delay_ms)
    })
  }

  pub fn poll(
    &mut self,
    now_ms: u64
  ) -> Option<T> {
    match self.deadline() {
      | Some(due) if now_ms >= due => {
        self
          .pending
          .take()
          .map(|(value, _)| value)
      }
      | _ => None
    }
  }
}

impl<T> Default for Debouncer<T> {
  fn default() -> Self {
    Self::new(SCROLL_DEBOUNCE_MS)
  }
}

#[cfg(test)]
mod tests {
  use super::Debouncer;

  #[test]
  fn burst_coalesces_to_last_value() {
    let mut debouncer = Debouncer::new(150);
    for (i, at) in
      [0_u64, 40, 90, 130, 200].iter().enumerate()
    {
      debouncer.push(i as u32 * 10, *at);
      assert_eq!(debouncer.poll(*at), None);
    }
    assert_eq!(debouncer.poll(349), None);
    assert_eq!(debouncer.poll(350), Some(40));
    assert_eq!(debouncer.poll(900), None);
  }
}
