//! Per-(subject, context) exclusive sections.
//!
//! Updates read the stored record set and then write against it with no
//! store-side transaction. Operations sharing one [`crate::Engine`] take the
//! key's lock for their whole read-then-write sequence. Nothing here protects
//! against writers in other processes.

use std::{
  collections::HashMap,
  sync::{Arc, Mutex, PoisonError},
};

use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

type Key = (String, String);

#[derive(Default)]
pub(crate) struct SubjectLocks {
  inner: Mutex<HashMap<Key, Arc<AsyncMutex<()>>>>,
}

impl SubjectLocks {
  /// Wait for exclusive use of `(subject, context)`. Released on drop.
  pub(crate) async fn acquire(
    &self,
    subject: &str,
    context: &str,
  ) -> OwnedMutexGuard<()> {
    let entry = {
      let mut map = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
      // Entries nobody holds or waits on.
      map.retain(|_, m| Arc::strong_count(m) > 1);
      map
        .entry((context.to_owned(), subject.to_owned()))
        .or_default()
        .clone()
    };
    entry.lock_owned().await
  }

  #[cfg(test)]
  fn len(&self) -> usize {
    self.inner.lock().unwrap_or_else(PoisonError::into_inner).len()
  }
}

// ─── Tests ────────────────────────────────────────────────────────────────────
