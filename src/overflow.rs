use alloc::vec::Vec;
use core::borrow::Borrow;

use crate::slot::Bucket;

/// Fallback storage for buckets the neighborhood table could not place.
///
/// Lookups are linear. With a sensibly sized table this holds a handful of
/// entries at most, so it is kept as a plain vector in insertion order.
#[derive(Clone)]
pub(crate) struct OverflowStore<K, V> {
    entries: Vec<Bucket<K, V>>,
}

impl<K, V> Default for OverflowStore<K, V> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<K, V> OverflowStore<K, V> {
    #[inline(always)]
    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline(always)]
    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Appends without checking for duplicates; the map guarantees the key is
    /// absent.
    pub(crate) fn push(&mut self, bucket: Bucket<K, V>) -> &mut Bucket<K, V> {
        let index = self.entries.len();
        self.entries.push(bucket);
        &mut self.entries[index]
    }

    #[cold]
    #[inline(never)]
    pub(crate) fn find<Q>(&self, hash: u64, key: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq,
    {
        self.entries
            .iter()
            .position(|bucket| bucket.matches(hash, key))
    }

    #[inline]
    pub(crate) fn get(&self, index: usize) -> Option<&Bucket<K, V>> {
        self.entries.get(index)
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, index: usize) -> Option<&mut Bucket<K, V>> {
        self.entries.get_mut(index)
    }

    pub(crate) fn remove<Q>(&mut self, hash: u64, key: &Q) -> Option<Bucket<K, V>>
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq,
    {
        let index = self.find(hash, key)?;
        self.remove_at(index)
    }

    /// Removes the entry at `index`, keeping the remaining entries in order.
    pub(crate) fn remove_at(&mut self, index: usize) -> Option<Bucket<K, V>> {
        (index < self.entries.len()).then(|| self.entries.remove(index))
    }

    #[inline]
    pub(crate) fn entries(&self) -> &[Bucket<K, V>] {
        &self.entries
    }

    #[inline]
    pub(crate) fn entries_mut(&mut self) -> &mut [Bucket<K, V>] {
        &mut self.entries
    }

    pub(crate) fn into_entries(self) -> Vec<Bucket<K, V>> {
        self.entries
    }
}
