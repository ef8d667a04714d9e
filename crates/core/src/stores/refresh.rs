//! Generic list-refresh trigger

use tokio::sync::watch;

/// Monotonic counter list views watch as a re-fetch trigger
pub struct RefreshSignal {
    counter: watch::Sender<u64>,
}

impl Default for RefreshSignal {
    fn default() -> Self {
        Self::new()
    }
}

impl RefreshSignal {
    pub fn new() -> Self {
        let (counter, _) = watch::channel(0);
        Self { counter }
    }

    /// Increment and return the new value
    pub fn bump(&self) -> u64 {
        let mut value = 0;
        self.counter.send_modify(|counter| {
            *counter += 1;
            value = *counter;
        });
        value
    }

    pub fn value(&self) -> u64 {
        *self.counter.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.counter.subscribe()
    }
}
