use core::borrow::Borrow;

/// A stored key-value pair together with the full hash computed when it was
/// inserted.
///
/// The key is never handed out mutably; only the value may change in place.
/// Relocation (displacement or rebuild) moves the whole bucket.
#[derive(Clone)]
pub(crate) struct Bucket<K, V> {
    hash: u64,
    key: K,
    pub(crate) value: V,
}

impl<K, V> Bucket<K, V> {
    #[inline]
    pub(crate) fn new(hash: u64, key: K, value: V) -> Self {
        Self { hash, key, value }
    }

    #[inline(always)]
    pub(crate) fn hash(&self) -> u64 {
        self.hash
    }

    #[inline(always)]
    pub(crate) fn key(&self) -> &K {
        &self.key
    }

    /// Borrow the key and value together, the value mutably.
    #[inline(always)]
    pub(crate) fn pair_mut(&mut self) -> (&K, &mut V) {
        (&self.key, &mut self.value)
    }

    #[inline]
    pub(crate) fn matches<Q>(&self, hash: u64, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq,
    {
        self.hash == hash && self.key.borrow() == key
    }

    #[inline]
    pub(crate) fn into_pair(self) -> (K, V) {
        (self.key, self.value)
    }
}

/// One cell of the neighborhood table.
///
/// An empty slot holds nothing, so there is no stale pair to read by mistake.
#[derive(Clone)]
pub(crate) struct Slot<K, V> {
    bucket: Option<Bucket<K, V>>,
}

impl<K, V> Default for Slot<K, V> {
    fn default() -> Self {
        Self { bucket: None }
    }
}

impl<K, V> Slot<K, V> {
    #[inline(always)]
    pub(crate) fn is_occupied(&self) -> bool {
        self.bucket.is_some()
    }

    /// Returns `false` for an empty slot.
    #[inline]
    pub(crate) fn matches<Q>(&self, hash: u64, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq,
    {
        self.bucket
            .as_ref()
            .is_some_and(|bucket| bucket.matches(hash, key))
    }

    /// Store a bucket in this slot, marking it occupied.
    ///
    /// Only used on free slots: writing over a live bucket would silently
    /// change the key held here.
    #[inline]
    pub(crate) fn set(&mut self, bucket: Bucket<K, V>) -> &mut Bucket<K, V> {
        debug_assert!(!self.is_occupied());
        self.bucket.insert(bucket)
    }

    /// Mark the slot empty, returning what it held.
    #[inline]
    pub(crate) fn clear(&mut self) -> Option<Bucket<K, V>> {
        self.bucket.take()
    }

    #[inline(always)]
    pub(crate) fn get(&self) -> Option<&Bucket<K, V>> {
        self.bucket.as_ref()
    }

    #[inline(always)]
    pub(crate) fn get_mut(&mut self) -> Option<&mut Bucket<K, V>> {
        self.bucket.as_mut()
    }

    #[inline]
    pub(crate) fn into_bucket(self) -> Option<Bucket<K, V>> {
        self.bucket
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::String;
    use alloc::string::ToString;

    use super::*;

    #[test]
    fn empty_slot_matches_nothing() {
        let slot: Slot<String, i32> = Slot::default();
        assert!(!slot.is_occupied());
        assert!(!slot.matches(0, "a"));
        assert!(slot.get().is_none());
    }

    #[test]
    fn set_then_clear() {
        let mut slot = Slot::default();
        slot.set(Bucket::new(7, "key".to_string(), 1));
        assert!(slot.is_occupied());
        assert!(slot.matches(7, "key"));
        assert!(!slot.matches(8, "key"));
        assert!(!slot.matches(7, "other"));

        if let Some(bucket) = slot.get_mut() {
            bucket.value += 41;
        }
        assert_eq!(slot.get().map(|b| b.value), Some(42));

        let bucket = slot.clear().map(Bucket::into_pair);
        assert_eq!(bucket, Some(("key".to_string(), 42)));
        assert!(!slot.is_occupied());
        assert!(slot.clear().is_none());
    }
}
