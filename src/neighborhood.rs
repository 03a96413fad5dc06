use alloc::boxed::Box;
use alloc::vec::Vec;
use core::borrow::Borrow;

use crate::error::PlacementError;
use crate::slot::Bucket;
use crate::slot::Slot;

/// Number of consecutive physical slots, starting at a key's ideal index, in
/// which that key may live.
pub(crate) const WINDOW: usize = 32;

#[inline(always)]
fn ideal_index(hash: u64, capacity: usize) -> usize {
    (hash % capacity as u64) as usize
}

/// Search for a movable index in the bubble range.
///
/// Looks at the `WINDOW - 1` slots immediately preceding `free`, farthest
/// first, for an occupied slot whose own neighborhood still covers `free`.
/// Every slot in that range lies at or after its own ideal index, so moving it
/// forward to `free` keeps it placed.
#[inline]
fn find_next_movable_index<K, V>(
    slots: &[Slot<K, V>],
    free: usize,
    capacity: usize,
) -> Option<usize> {
    let bubble_base = free.saturating_sub(WINDOW - 1);
    (bubble_base..free).find(|&idx| {
        slots[idx]
            .get()
            .is_some_and(|bucket| free < ideal_index(bucket.hash(), capacity) + WINDOW)
    })
}

/// The fixed-size slot array at the heart of the map.
///
/// `capacity` is the number of addressable ideal positions. The physical array
/// is `capacity + WINDOW - 1` slots long so the neighborhood of the last ideal
/// position fits without wrapping. Every occupied slot `j` holding a bucket
/// with ideal index `i` satisfies `i <= j < i + WINDOW`.
///
/// The table never grows. When it cannot place a bucket the bucket is handed
/// back to the caller, which decides where it goes.
#[derive(Clone)]
pub(crate) struct NeighborhoodTable<K, V> {
    slots: Box<[Slot<K, V>]>,
    capacity: usize,
    count: usize,
}

impl<K, V> NeighborhoodTable<K, V> {
    /// Allocates an empty table with `capacity` addressable positions (at
    /// least one).
    pub(crate) fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let slots = (0..capacity + WINDOW - 1).map(|_| Slot::default()).collect();

        Self {
            slots,
            capacity,
            count: 0,
        }
    }

    #[inline(always)]
    pub(crate) fn capacity(&self) -> usize {
        self.capacity
    }

    #[inline(always)]
    pub(crate) fn physical_len(&self) -> usize {
        self.slots.len()
    }

    #[inline(always)]
    pub(crate) fn len(&self) -> usize {
        self.count
    }

    #[inline(always)]
    pub(crate) fn ideal(&self, hash: u64) -> usize {
        ideal_index(hash, self.capacity)
    }

    /// Occupied slots over physical slots.
    #[inline]
    pub(crate) fn load_factor(&self) -> f64 {
        self.count as f64 / self.slots.len() as f64
    }

    /// Scans the neighborhood of `hash` for `key`, returning its physical
    /// index.
    pub(crate) fn find<Q>(&self, hash: u64, key: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq,
    {
        if self.count == 0 {
            return None;
        }

        let ideal = self.ideal(hash);
        self.slots[ideal..ideal + WINDOW]
            .iter()
            .position(|slot| slot.matches(hash, key))
            .map(|offset| ideal + offset)
    }

    #[inline]
    pub(crate) fn get(&self, index: usize) -> Option<&Bucket<K, V>> {
        self.slots.get(index).and_then(Slot::get)
    }

    #[inline]
    pub(crate) fn get_mut(&mut self, index: usize) -> Option<&mut Bucket<K, V>> {
        self.slots.get_mut(index).and_then(Slot::get_mut)
    }

    /// Places `bucket` inside its neighborhood, displacing other buckets toward
    /// the free slot as needed, and returns the stored bucket.
    ///
    /// The caller guarantees the key is not already present. On failure the
    /// bucket is returned untouched; any swaps already performed kept every
    /// moved bucket inside its own neighborhood.
    pub(crate) fn insert(
        &mut self,
        bucket: Bucket<K, V>,
    ) -> Result<&mut Bucket<K, V>, (PlacementError, Bucket<K, V>)> {
        let ideal = self.ideal(bucket.hash());

        let Some(mut free) = self.slots[ideal..]
            .iter()
            .position(|slot| !slot.is_occupied())
            .map(|offset| ideal + offset)
        else {
            return Err((PlacementError::CapacityExhausted, bucket));
        };

        while free >= ideal + WINDOW {
            let Some(movable) = find_next_movable_index(&self.slots, free, self.capacity) else {
                return Err((PlacementError::OutOfReach, bucket));
            };

            debug_assert_ne!(movable, free);
            self.slots.swap(movable, free);
            free = movable;
        }

        self.count += 1;
        Ok(self.slots[free].set(bucket))
    }

    /// Erases `key`, leaving its slot empty. Nothing is shifted back.
    pub(crate) fn remove<Q>(&mut self, hash: u64, key: &Q) -> Option<Bucket<K, V>>
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq,
    {
        let index = self.find(hash, key)?;
        self.remove_at(index)
    }

    pub(crate) fn remove_at(&mut self, index: usize) -> Option<Bucket<K, V>> {
        let bucket = self.slots.get_mut(index)?.clear()?;
        self.count -= 1;
        Some(bucket)
    }

    #[inline]
    pub(crate) fn slots(&self) -> &[Slot<K, V>] {
        &self.slots
    }

    #[inline]
    pub(crate) fn slots_mut(&mut self) -> &mut [Slot<K, V>] {
        &mut self.slots
    }

    pub(crate) fn into_slots(self) -> Vec<Slot<K, V>> {
        self.slots.into_vec()
    }

    /// Occupied buckets with their physical index, in physical order.
    #[cfg(any(test, feature = "stats"))]
    pub(crate) fn occupied(&self) -> impl Iterator<Item = (usize, &Bucket<K, V>)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(idx, slot)| slot.get().map(|bucket| (idx, bucket)))
    }

    /// Panics if any bucket sits outside its neighborhood or the count is off.
    #[cfg(test)]
    pub(crate) fn check_placement(&self) {
        let mut live = 0;
        for (idx, bucket) in self.occupied() {
            let ideal = self.ideal(bucket.hash());
            assert!(
                ideal <= idx && idx < ideal + WINDOW,
                "bucket at {idx} has ideal index {ideal}"
            );
            live += 1;
        }
        assert_eq!(live, self.count);
    }
}

#[cfg(test)]
mod tests {
    use rand::Rng;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;

    fn bucket(hash: u64, key: u64) -> Bucket<u64, u64> {
        Bucket::new(hash, key, key * 10)
    }

    /// Inserts and reports the physical index the bucket ended up at.
    fn place(table: &mut NeighborhoodTable<u64, u64>, hash: u64, key: u64) -> Option<usize> {
        table.insert(bucket(hash, key)).ok()?;
        table.find(hash, &key)
    }

    #[test]
    fn physical_length_covers_last_window() {
        let table: NeighborhoodTable<u64, u64> = NeighborhoodTable::new(32);
        assert_eq!(table.capacity(), 32);
        assert_eq!(table.physical_len(), 32 + WINDOW - 1);
        assert_eq!(table.len(), 0);
        assert_eq!(table.load_factor(), 0.0);

        let zero: NeighborhoodTable<u64, u64> = NeighborhoodTable::new(0);
        assert_eq!(zero.capacity(), 1);
    }

    #[test]
    fn insert_and_find() {
        let mut table = NeighborhoodTable::new(64);
        for k in 0..20u64 {
            let stored = table.insert(bucket(k * 3, k)).ok().map(|b| *b.key());
            assert_eq!(stored, Some(k));
        }

        assert_eq!(table.len(), 20);
        for k in 0..20u64 {
            let idx = table.find(k * 3, &k).unwrap();
            assert_eq!(table.get(idx).map(|b| b.value), Some(k * 10));
        }
        assert!(table.find(5, &999).is_none());
        table.check_placement();
    }

    #[test]
    fn collisions_fill_neighborhood_in_order() {
        let mut table = NeighborhoodTable::new(64);
        for k in 0..WINDOW as u64 {
            assert_eq!(place(&mut table, 10, k), Some(10 + k as usize));
        }
        table.check_placement();
    }

    #[test]
    fn full_neighborhood_is_out_of_reach() {
        let mut table = NeighborhoodTable::new(32);
        for k in 0..WINDOW as u64 {
            assert!(table.insert(bucket(0, k)).is_ok());
        }

        match table.insert(bucket(0, 100)) {
            Err((err, rejected)) => {
                assert_eq!(err, PlacementError::OutOfReach);
                assert_eq!(*rejected.key(), 100);
            }
            Ok(bucket) => panic!("placed key {} inside a full neighborhood", bucket.key()),
        }
        assert_eq!(table.len(), WINDOW);
        table.check_placement();
    }

    #[test]
    fn failed_displacement_keeps_moved_buckets_placed() {
        let mut table = NeighborhoodTable::new(128);
        // 0..=31 hold ideal 0, 32..=62 hold ideal 32, 63 is the first free slot.
        for k in 0..WINDOW as u64 {
            assert!(table.insert(bucket(0, k)).is_ok());
        }
        for k in 0..(WINDOW - 1) as u64 {
            assert!(table.insert(bucket(32, 2000 + k)).is_ok());
        }
        assert_eq!(table.find(32, &2000), Some(32));

        // The bucket at 32 hops to 63, then nothing before 32 can move.
        match table.insert(bucket(0, 999)) {
            Err((err, rejected)) => {
                assert_eq!(err, PlacementError::OutOfReach);
                assert_eq!(*rejected.key(), 999);
            }
            Ok(bucket) => panic!("placed key {} outside its neighborhood", bucket.key()),
        }

        assert_eq!(table.find(32, &2000), Some(63));
        assert!(table.get(32).is_none());
        assert_eq!(table.len(), 2 * WINDOW - 1);
        table.check_placement();
        for k in 0..WINDOW as u64 {
            assert!(table.find(0, &k).is_some());
        }
        for k in 0..(WINDOW - 1) as u64 {
            assert!(table.find(32, &(2000 + k)).is_some());
        }
        assert!(table.find(0, &999).is_none());
    }

    #[test]
    fn no_free_slot_is_capacity_exhausted() {
        let mut table = NeighborhoodTable::new(1);
        assert_eq!(table.physical_len(), WINDOW);
        for k in 0..WINDOW as u64 {
            assert!(table.insert(bucket(k, k)).is_ok());
        }

        let err = table.insert(bucket(0, 99)).err().map(|(err, _)| err);
        assert_eq!(err, Some(PlacementError::CapacityExhausted));
    }

    #[test]
    fn displacement_moves_neighbor_forward() {
        let mut table = NeighborhoodTable::new(64);
        for k in 0..(WINDOW - 1) as u64 {
            assert!(table.insert(bucket(0, k)).is_ok());
        }
        // Lands at its own ideal index 31, directly after the run.
        assert_eq!(place(&mut table, 31, 500), Some(31));

        // Slot 32 is free but outside the window of ideal 0, so the bucket at
        // 31 must hop forward to make room.
        assert_eq!(place(&mut table, 0, 600), Some(31));
        assert_eq!(table.find(31, &500), Some(32));
        assert_eq!(table.find(0, &600), Some(31));
        table.check_placement();
    }

    #[test]
    fn chained_displacement() {
        let mut table = NeighborhoodTable::new(128);
        for k in 0..(WINDOW - 1) as u64 {
            assert!(table.insert(bucket(0, k)).is_ok());
        }
        // 31..=50 hold ideal 20, 51..=60 hold ideal 50.
        for k in 0..20u64 {
            assert!(table.insert(bucket(20, 1000 + k)).is_ok());
        }
        for k in 0..10u64 {
            assert!(table.insert(bucket(50, 2000 + k)).is_ok());
        }

        // Free slot 61 first takes the bucket from 51, then slot 51 takes the
        // bucket from 31, which finally opens a slot inside [0, 32).
        assert_eq!(place(&mut table, 0, 3000), Some(31));
        assert_eq!(table.find(20, &1000), Some(51));
        assert_eq!(table.find(50, &2000), Some(61));
        for k in 0..20u64 {
            assert!(table.find(20, &(1000 + k)).is_some());
        }
        for k in 0..10u64 {
            assert!(table.find(50, &(2000 + k)).is_some());
        }
        table.check_placement();
    }

    #[test]
    fn remove_marks_slot_free() {
        let mut table = NeighborhoodTable::new(32);
        for k in 0..4u64 {
            assert!(table.insert(bucket(5, k)).is_ok());
        }

        let removed = table.remove(5, &1).map(Bucket::into_pair);
        assert_eq!(removed, Some((1, 10)));
        assert_eq!(table.len(), 3);
        assert!(table.remove(5, &1).is_none());
        assert!(table.remove_at(6).is_none());

        // Slots are not compacted; the hole is reused by the next insert.
        assert_eq!(table.find(5, &2), Some(7));
        assert_eq!(place(&mut table, 5, 9), Some(6));
        table.check_placement();
    }

    #[test]
    fn randomized_placement_holds() {
        let mut rng = SmallRng::seed_from_u64(0x5eed);
        let mut table = NeighborhoodTable::new(256);
        let mut placed = Vec::new();
        for k in 0..2000u64 {
            let hash = rng.random::<u64>();
            if table.insert(bucket(hash, k)).is_ok() {
                placed.push((hash, k));
            }
            if k % 3 == 0 {
                if let Some((hash, key)) = placed.pop() {
                    assert!(table.remove(hash, &key).is_some());
                }
            }
        }

        table.check_placement();
        assert_eq!(table.len(), placed.len());
        for (hash, key) in placed {
            assert!(table.find(hash, &key).is_some());
        }
    }
}
