use crate::subscriber::Subscriber;

/// Subscribers container with ID-based management.
///
/// Entries keep registration order. IDs are never reused within one
/// container, so removing by ID always targets exactly the registration
/// that produced it, even when the same observer was registered twice.
pub(crate) struct Subscribers<Item, Err> {
  entries: Vec<(usize, Subscriber<Item, Err>)>,
  next_id: usize,
}

impl<Item, Err> Default for Subscribers<Item, Err> {
  fn default() -> Self { Self { entries: Vec::new(), next_id: 0 } }
}

impl<Item, Err> Subscribers<Item, Err> {
  /// Add a subscriber and return its unique ID.
  pub(crate) fn add(&mut self, subscriber: Subscriber<Item, Err>) -> usize {
    let id = self.next_id;
    self.next_id += 1;
    self.entries.push((id, subscriber));
    id
  }

  /// Remove a subscriber by ID.
  pub(crate) fn remove(&mut self, id: usize) -> Option<Subscriber<Item, Err>> {
    let pos = self.entries.iter().position(|(entry, _)| *entry == id)?;
    Some(self.entries.remove(pos).1)
  }

  #[inline]
  pub(crate) fn contains(&self, id: usize) -> bool {
    self.entries.iter().any(|(entry, _)| *entry == id)
  }

  #[inline]
  pub(crate) fn len(&self) -> usize { self.entries.len() }

  /// Copy of the current registrations, in order.
  pub(crate) fn snapshot(&self) -> Vec<(usize, Subscriber<Item, Err>)> { self.entries.clone() }

  /// Take every registration, leaving the container empty.
  pub(crate) fn drain(&mut self) -> Vec<(usize, Subscriber<Item, Err>)> {
    std::mem::take(&mut self.entries)
  }
}
