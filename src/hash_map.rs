use alloc::vec;
use core::borrow::Borrow;
use core::fmt::Debug;
use core::hash::BuildHasher;
use core::hash::Hash;
use core::iter::FusedIterator;
use core::marker::PhantomData;
use core::ops::Index;

use tracing::debug;
use tracing::trace;

use crate::DefaultHashBuilder;
use crate::error::Error;
use crate::neighborhood::NeighborhoodTable;
use crate::overflow::OverflowStore;
use crate::slot::Bucket;
use crate::slot::Slot;

/// Number of addressable positions a map starts with, and the smallest it
/// ever shrinks to.
pub const DEFAULT_CAPACITY: usize = 32;

/// Below this load factor the next insert halves the table.
pub const MIN_LOAD_FACTOR: f64 = 0.1;

/// Above this load factor the next insert doubles the table.
pub const MAX_LOAD_FACTOR: f64 = 0.5;

/// Where a live key is stored.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Location {
    Table(usize),
    Overflow(usize),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Rebuild {
    /// Grow or shrink according to the load factor, keeping every entry.
    Resize,
    /// Drop every entry and return to the starting capacity.
    Clear,
}

/// A hash map using hopscotch hashing with a 32-slot neighborhood.
///
/// Every key lives within 32 physical slots of its ideal index, so a lookup
/// inspects a bounded window. Keys that cannot be brought into their
/// neighborhood by displacement are kept in a small overflow list that is
/// searched after the table.
///
/// Inserting never overwrites: the first value stored for a key wins.
///
/// The table is rebuilt whenever an insert observes a load factor outside
/// `[MIN_LOAD_FACTOR, MAX_LOAD_FACTOR]`; removals alone never shrink it.
///
/// # Examples
///
/// ```rust
/// use hopscotch_map::HashMap;
///
/// let mut map = HashMap::new();
/// assert!(map.insert(1, "a"));
/// assert!(!map.insert(1, "b"));
/// assert_eq!(map.get(&1), Some(&"a"));
/// ```
#[derive(Clone)]
pub struct HashMap<K, V, S = DefaultHashBuilder> {
    table: NeighborhoodTable<K, V>,
    overflow: OverflowStore<K, V>,
    hash_builder: S,
    min_capacity: usize,
}

impl<K, V, S> Debug for HashMap<K, V, S>
where
    K: Debug,
    V: Debug,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

#[cfg(any(feature = "foldhash", feature = "std"))]
impl<K, V> HashMap<K, V, DefaultHashBuilder> {
    /// Creates an empty map with the default hasher and
    /// [`DEFAULT_CAPACITY`] addressable positions.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use hopscotch_map::HashMap;
    /// let map: HashMap<i32, String> = HashMap::new();
    /// assert!(map.is_empty());
    /// assert_eq!(map.capacity(), hopscotch_map::DEFAULT_CAPACITY);
    /// ```
    pub fn new() -> Self {
        Self::with_hasher(DefaultHashBuilder::default())
    }

    /// Creates an empty map starting with `capacity` addressable positions.
    ///
    /// The starting capacity is also the floor the table never shrinks
    /// below. Values under [`DEFAULT_CAPACITY`] are rounded up to it.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use hopscotch_map::HashMap;
    /// let map: HashMap<i32, String> = HashMap::with_capacity(100);
    /// assert_eq!(map.capacity(), 100);
    /// ```
    pub fn with_capacity(capacity: usize) -> Self {
        Self::with_capacity_and_hasher(capacity, DefaultHashBuilder::default())
    }
}

impl<K, V, S> HashMap<K, V, S> {
    /// Creates an empty map which will use `hash_builder` to hash keys.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use core::hash::BuildHasher;
    /// # use core::hash::Hasher;
    /// # use hopscotch_map::HashMap;
    /// #
    /// #[derive(Default)]
    /// struct Fnv;
    ///
    /// struct FnvHasher(u64);
    ///
    /// impl Hasher for FnvHasher {
    ///     fn finish(&self) -> u64 {
    ///         self.0
    ///     }
    ///
    ///     fn write(&mut self, bytes: &[u8]) {
    ///         for byte in bytes {
    ///             self.0 = (self.0 ^ *byte as u64).wrapping_mul(0x100000001b3);
    ///         }
    ///     }
    /// }
    ///
    /// impl BuildHasher for Fnv {
    ///     type Hasher = FnvHasher;
    ///
    ///     fn build_hasher(&self) -> FnvHasher {
    ///         FnvHasher(0xcbf29ce484222325)
    ///     }
    /// }
    ///
    /// let mut map = HashMap::with_hasher(Fnv);
    /// map.insert("one", 1);
    /// assert_eq!(map.get("one"), Some(&1));
    /// ```
    pub fn with_hasher(hash_builder: S) -> Self {
        Self::with_capacity_and_hasher(DEFAULT_CAPACITY, hash_builder)
    }

    /// Creates an empty map starting with `capacity` addressable positions
    /// which will use `hash_builder` to hash keys.
    ///
    /// See [`with_capacity`](HashMap::with_capacity) for how `capacity` is
    /// interpreted.
    pub fn with_capacity_and_hasher(capacity: usize, hash_builder: S) -> Self {
        let min_capacity = capacity.max(DEFAULT_CAPACITY);
        Self {
            table: NeighborhoodTable::new(min_capacity),
            overflow: OverflowStore::default(),
            hash_builder,
            min_capacity,
        }
    }

    /// Returns the number of entries in the map, counting both the table and
    /// the overflow store.
    pub fn len(&self) -> usize {
        self.table.len() + self.overflow.len()
    }

    /// Returns `true` if the map holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of addressable positions (ideal indices) in the current table.
    ///
    /// This is not the number of entries the map can hold before resizing:
    /// the table doubles once entries exceed half of its physical slots.
    pub fn capacity(&self) -> usize {
        self.table.capacity()
    }

    /// Entries held in the table over its physical slots. Overflow entries
    /// are not counted.
    ///
    /// This is the value the resize policy compares against
    /// [`MIN_LOAD_FACTOR`] and [`MAX_LOAD_FACTOR`].
    pub fn load_factor(&self) -> f64 {
        self.table.load_factor()
    }

    /// Number of entries that could not be placed in their neighborhood and
    /// live in the overflow store.
    pub fn overflow_len(&self) -> usize {
        self.overflow.len()
    }

    /// Returns a reference to the map's hasher builder.
    pub fn hasher(&self) -> &S {
        &self.hash_builder
    }

    /// Removes every entry and returns the table to its starting capacity.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use hopscotch_map::HashMap;
    /// let mut map: HashMap<u32, u32> = (0..1000).map(|i| (i, i)).collect();
    /// assert!(map.capacity() > hopscotch_map::DEFAULT_CAPACITY);
    ///
    /// map.clear();
    /// assert!(map.is_empty());
    /// assert_eq!(map.capacity(), hopscotch_map::DEFAULT_CAPACITY);
    /// ```
    pub fn clear(&mut self) {
        self.reconstruct(Rebuild::Clear);
    }

    /// Returns an iterator over the entries of the map.
    ///
    /// Entries stored in the table come first, in slot order, followed by the
    /// overflow entries in the order they were added. Every entry is visited
    /// exactly once.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use hopscotch_map::HashMap;
    /// let map: HashMap<&str, i32> = [("a", 1), ("b", 2)].into_iter().collect();
    ///
    /// let mut total = 0;
    /// for (key, value) in map.iter() {
    ///     assert!(key == &"a" || key == &"b");
    ///     total += value;
    /// }
    /// assert_eq!(total, 3);
    /// ```
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            slots: self.table.slots().iter(),
            overflow: self.overflow.entries().iter(),
            remaining: self.len(),
        }
    }

    /// Returns an iterator over the entries of the map with mutable
    /// references to the values.
    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        let remaining = self.len();
        IterMut {
            slots: self.table.slots_mut().iter_mut(),
            overflow: self.overflow.entries_mut().iter_mut(),
            remaining,
        }
    }

    /// Returns an iterator over the keys of the map.
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys { inner: self.iter() }
    }

    /// Returns an iterator over the values of the map.
    pub fn values(&self) -> Values<'_, K, V> {
        Values { inner: self.iter() }
    }

    /// Returns an iterator over mutable references to the values of the map.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use hopscotch_map::HashMap;
    /// let mut map: HashMap<&str, i32> = [("a", 1), ("b", 2)].into_iter().collect();
    /// for value in map.values_mut() {
    ///     *value *= 10;
    /// }
    /// assert_eq!(map["a"], 10);
    /// assert_eq!(map["b"], 20);
    /// ```
    pub fn values_mut(&mut self) -> ValuesMut<'_, K, V> {
        ValuesMut {
            inner: self.iter_mut(),
        }
    }

    /// Removes every entry, returning them as an iterator.
    ///
    /// The map is reset to its starting capacity immediately; entries the
    /// iterator has not yielded are dropped with it.
    pub fn drain(&mut self) -> Drain<'_, K, V> {
        let table = core::mem::replace(&mut self.table, NeighborhoodTable::new(self.min_capacity));
        let overflow = core::mem::take(&mut self.overflow);

        Drain {
            inner: IntoIter::new(table, overflow),
            _marker: PhantomData,
        }
    }

    #[cfg(any(test, feature = "stats"))]
    pub(crate) fn table(&self) -> &NeighborhoodTable<K, V> {
        &self.table
    }

    #[cfg(any(test, feature = "stats"))]
    pub(crate) fn overflow(&self) -> &OverflowStore<K, V> {
        &self.overflow
    }

    /// Places `bucket` without checking for an existing key, rebuilding the
    /// table first if the load factor is out of bounds.
    fn force_insert(&mut self, bucket: Bucket<K, V>) -> &mut Bucket<K, V> {
        let load_factor = self.load_factor();
        if !(MIN_LOAD_FACTOR..=MAX_LOAD_FACTOR).contains(&load_factor) {
            self.reconstruct(Rebuild::Resize);
        }

        let capacity = self.table.capacity();
        match self.table.insert(bucket) {
            Ok(bucket) => bucket,
            Err((reason, bucket)) => {
                trace!(
                    %reason,
                    hash = bucket.hash(),
                    capacity,
                    "routing entry to overflow"
                );
                self.overflow.push(bucket)
            }
        }
    }

    /// Replaces the table and overflow store with fresh ones.
    ///
    /// A resize re-places every live entry using its stored hash, so the user
    /// hasher is not consulted. A resize that would keep the current capacity
    /// is skipped.
    #[cold]
    fn reconstruct(&mut self, rebuild: Rebuild) {
        let old_capacity = self.table.capacity();
        let new_capacity = match rebuild {
            Rebuild::Clear => self.min_capacity,
            Rebuild::Resize if self.load_factor() < MIN_LOAD_FACTOR => old_capacity / 2,
            Rebuild::Resize => old_capacity.saturating_mul(2),
        }
        .max(self.min_capacity);

        if rebuild == Rebuild::Resize && new_capacity == old_capacity {
            return;
        }

        let old_table = core::mem::replace(&mut self.table, NeighborhoodTable::new(new_capacity));
        let old_overflow = core::mem::take(&mut self.overflow);

        if rebuild == Rebuild::Resize {
            let live = old_table
                .into_slots()
                .into_iter()
                .filter_map(Slot::into_bucket)
                .chain(old_overflow.into_entries());

            for bucket in live {
                if let Err((_, bucket)) = self.table.insert(bucket) {
                    self.overflow.push(bucket);
                }
            }
        }

        let clear = rebuild == Rebuild::Clear;
        debug!(
            old_capacity,
            new_capacity,
            len = self.len(),
            overflow = self.overflow.len(),
            clear,
            "rebuilt hopscotch table"
        );
    }

    fn bucket(&self, location: Location) -> Option<&Bucket<K, V>> {
        match location {
            Location::Table(index) => self.table.get(index),
            Location::Overflow(index) => self.overflow.get(index),
        }
    }

    fn bucket_mut(&mut self, location: Location) -> Option<&mut Bucket<K, V>> {
        match location {
            Location::Table(index) => self.table.get_mut(index),
            Location::Overflow(index) => self.overflow.get_mut(index),
        }
    }

    fn take(&mut self, location: Location) -> Option<Bucket<K, V>> {
        match location {
            Location::Table(index) => self.table.remove_at(index),
            Location::Overflow(index) => self.overflow.remove_at(index),
        }
    }
}

impl<K, V, S> HashMap<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    /// Table first, then overflow.
    fn locate<Q>(&self, hash: u64, key: &Q) -> Option<Location>
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq,
    {
        if let Some(index) = self.table.find(hash, key) {
            return Some(Location::Table(index));
        }

        if self.overflow.is_empty() {
            return None;
        }

        self.overflow.find(hash, key).map(Location::Overflow)
    }

    fn lookup<Q>(&self, key: &Q) -> Option<Location>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.locate(self.hash_builder.hash_one(key), key)
    }

    /// Inserts a key-value pair if the key is not already present.
    ///
    /// Returns `true` if the pair was inserted. If the key was present the
    /// map is left unchanged, keeping the existing value, and `value` is
    /// dropped.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use hopscotch_map::HashMap;
    /// let mut map = HashMap::new();
    /// assert!(map.insert(37, "a"));
    /// assert!(!map.insert(37, "b"));
    /// assert_eq!(map.get(&37), Some(&"a"));
    /// ```
    pub fn insert(&mut self, key: K, value: V) -> bool {
        let hash = self.hash_builder.hash_one(&key);
        if self.locate(hash, &key).is_some() {
            return false;
        }

        self.force_insert(Bucket::new(hash, key, value));
        true
    }

    /// Returns a reference to the value corresponding to the key.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use hopscotch_map::HashMap;
    /// let mut map = HashMap::new();
    /// map.insert(1, "a");
    /// assert_eq!(map.get(&1), Some(&"a"));
    /// assert_eq!(map.get(&2), None);
    /// ```
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.get_key_value(key).map(|(_, v)| v)
    }

    /// Returns the stored key and its value.
    pub fn get_key_value<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let location = self.lookup(key)?;
        self.bucket(location).map(|bucket| (bucket.key(), &bucket.value))
    }

    /// Returns a mutable reference to the value corresponding to the key.
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let location = self.lookup(key)?;
        self.bucket_mut(location).map(|bucket| &mut bucket.value)
    }

    /// Returns the value corresponding to the key, or
    /// [`Error::KeyNotFound`]. Never modifies the map.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use hopscotch_map::Error;
    /// # use hopscotch_map::HashMap;
    /// let mut map = HashMap::new();
    /// map.insert("present", 1);
    /// assert_eq!(map.try_get("present"), Ok(&1));
    /// assert_eq!(map.try_get("absent"), Err(Error::KeyNotFound));
    /// ```
    pub fn try_get<Q>(&self, key: &Q) -> Result<&V, Error>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.get(key).ok_or(Error::KeyNotFound)
    }

    /// Returns `true` if the map contains the key.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.lookup(key).is_some()
    }

    /// Removes a key from the map, returning its value if it was present.
    ///
    /// Removing never shrinks the table; that is decided on the next insert.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use hopscotch_map::HashMap;
    /// let mut map = HashMap::new();
    /// map.insert(1, "a");
    /// assert_eq!(map.remove(&1), Some("a"));
    /// assert_eq!(map.remove(&1), None);
    /// ```
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.remove_entry(key).map(|(_, v)| v)
    }

    /// Removes a key from the map, returning the stored key and value if the
    /// key was present.
    pub fn remove_entry<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let hash = self.hash_builder.hash_one(key);
        let bucket = match self.table.remove(hash, key) {
            Some(bucket) => bucket,
            None => self.overflow.remove(hash, key)?,
        };
        Some(bucket.into_pair())
    }

    /// Gets the given key's corresponding entry in the map for in-place
    /// manipulation.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use hopscotch_map::HashMap;
    /// let mut counts: HashMap<&str, u32> = HashMap::new();
    /// for word in ["a", "b", "a"] {
    ///     *counts.entry(word).or_insert(0) += 1;
    /// }
    /// assert_eq!(counts["a"], 2);
    /// assert_eq!(counts["b"], 1);
    /// ```
    pub fn entry(&mut self, key: K) -> Entry<'_, K, V, S> {
        let hash = self.hash_builder.hash_one(&key);
        match self.locate(hash, &key) {
            Some(location) => Entry::Occupied(OccupiedEntry {
                map: self,
                location,
            }),
            None => Entry::Vacant(VacantEntry {
                map: self,
                hash,
                key,
            }),
        }
    }

    /// Returns a mutable reference to the value for `key`, inserting
    /// `V::default()` first if the key is absent.
    ///
    /// # Examples
    ///
    /// ```rust
    /// # use hopscotch_map::HashMap;
    /// let mut map: HashMap<&str, Vec<i32>> = HashMap::new();
    /// map.get_or_insert_default("xs").push(1);
    /// map.get_or_insert_default("xs").push(2);
    /// assert_eq!(map["xs"], [1, 2]);
    /// ```
    pub fn get_or_insert_default(&mut self, key: K) -> &mut V
    where
        V: Default,
    {
        self.entry(key).or_default()
    }
}

impl<K, V, S> Default for HashMap<K, V, S>
where
    S: Default,
{
    fn default() -> Self {
        Self::with_hasher(S::default())
    }
}

impl<K, V, S> PartialEq for HashMap<K, V, S>
where
    K: Hash + Eq,
    V: PartialEq,
    S: BuildHasher,
{
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len()
            && self
                .iter()
                .all(|(key, value)| other.get(key).is_some_and(|v| v == value))
    }
}

impl<K, V, S> Eq for HashMap<K, V, S>
where
    K: Hash + Eq,
    V: Eq,
    S: BuildHasher,
{
}

impl<K, Q, V, S> Index<&Q> for HashMap<K, V, S>
where
    K: Hash + Eq + Borrow<Q>,
    Q: ?Sized + Hash + Eq,
    S: BuildHasher,
{
    type Output = V;

    /// # Panics
    ///
    /// Panics if the key is not present.
    fn index(&self, key: &Q) -> &V {
        match self.try_get(key) {
            Ok(value) => value,
            Err(err) => panic!("{err}"),
        }
    }
}

impl<K, V, S> FromIterator<(K, V)> for HashMap<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher + Default,
{
    /// Builds a map by inserting each pair in turn; for repeated keys the
    /// first pair wins.
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::with_hasher(S::default());
        map.extend(iter);
        map
    }
}

impl<K, V, S> Extend<(K, V)> for HashMap<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

/// A view into a single entry in the map, which may either be vacant or
/// occupied.
///
/// This enum is constructed from the [`entry`] method on [`HashMap`].
///
/// [`entry`]: HashMap::entry
pub enum Entry<'a, K, V, S> {
    /// A vacant entry.
    Vacant(VacantEntry<'a, K, V, S>),
    /// An occupied entry.
    Occupied(OccupiedEntry<'a, K, V, S>),
}

impl<'a, K, V, S> Entry<'a, K, V, S> {
    /// Inserts `default` if the entry is vacant and returns a mutable
    /// reference to the value.
    pub fn or_insert(self, default: V) -> &'a mut V {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default),
        }
    }

    /// Inserts a value computed from a closure if the entry is vacant and
    /// returns a mutable reference.
    pub fn or_insert_with<F>(self, default: F) -> &'a mut V
    where
        F: FnOnce() -> V,
    {
        match self {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => entry.insert(default()),
        }
    }

    /// Provides in-place mutable access to an occupied entry before any
    /// potential inserts.
    pub fn and_modify<F>(self, f: F) -> Self
    where
        F: FnOnce(&mut V),
    {
        match self {
            Entry::Occupied(mut entry) => {
                f(entry.get_mut());
                Entry::Occupied(entry)
            }
            Entry::Vacant(entry) => Entry::Vacant(entry),
        }
    }

    /// Returns a reference to this entry's key.
    pub fn key(&self) -> &K {
        match self {
            Entry::Occupied(entry) => entry.key(),
            Entry::Vacant(entry) => entry.key(),
        }
    }
}

impl<'a, K, V, S> Entry<'a, K, V, S>
where
    V: Default,
{
    /// Inserts the default value if the entry is vacant and returns a mutable
    /// reference.
    pub fn or_default(self) -> &'a mut V {
        self.or_insert_with(Default::default)
    }
}

/// A view into a vacant entry in the map.
pub struct VacantEntry<'a, K, V, S> {
    map: &'a mut HashMap<K, V, S>,
    hash: u64,
    key: K,
}

impl<'a, K, V, S> VacantEntry<'a, K, V, S> {
    /// Gets a reference to the key that would be used when inserting a value.
    pub fn key(&self) -> &K {
        &self.key
    }

    /// Take ownership of the key.
    pub fn into_key(self) -> K {
        self.key
    }

    /// Inserts the value into the map and returns a mutable reference to it.
    ///
    /// The insert may rebuild the table.
    pub fn insert(self, value: V) -> &'a mut V {
        let VacantEntry { map, hash, key } = self;
        &mut map.force_insert(Bucket::new(hash, key, value)).value
    }
}

/// A view into an occupied entry in the map.
pub struct OccupiedEntry<'a, K, V, S> {
    map: &'a mut HashMap<K, V, S>,
    location: Location,
}

impl<'a, K, V, S> OccupiedEntry<'a, K, V, S> {
    fn bucket(&self) -> &Bucket<K, V> {
        match self.map.bucket(self.location) {
            Some(bucket) => bucket,
            None => unreachable!("occupied entry at {:?} is empty", self.location),
        }
    }

    fn into_bucket_mut(self) -> &'a mut Bucket<K, V> {
        let OccupiedEntry { map, location } = self;
        match map.bucket_mut(location) {
            Some(bucket) => bucket,
            None => unreachable!("occupied entry at {location:?} is empty"),
        }
    }

    /// Gets a reference to the key in the entry.
    pub fn key(&self) -> &K {
        self.bucket().key()
    }

    /// Gets a reference to the value in the entry.
    pub fn get(&self) -> &V {
        &self.bucket().value
    }

    /// Gets a mutable reference to the value in the entry.
    pub fn get_mut(&mut self) -> &mut V {
        let location = self.location;
        match self.map.bucket_mut(location) {
            Some(bucket) => &mut bucket.value,
            None => unreachable!("occupied entry at {location:?} is empty"),
        }
    }

    /// Converts the entry into a mutable reference to the value.
    pub fn into_mut(self) -> &'a mut V {
        &mut self.into_bucket_mut().value
    }

    /// Replaces the value in the entry, returning the old value.
    pub fn insert(&mut self, value: V) -> V {
        core::mem::replace(self.get_mut(), value)
    }

    /// Removes the entry from the map and returns the value.
    pub fn remove(self) -> V {
        self.remove_entry().1
    }

    /// Removes the entry from the map and returns the key and value.
    pub fn remove_entry(self) -> (K, V) {
        match self.map.take(self.location) {
            Some(bucket) => bucket.into_pair(),
            None => unreachable!("occupied entry at {:?} is empty", self.location),
        }
    }
}

/// An iterator over the entries of a [`HashMap`].
pub struct Iter<'a, K, V> {
    slots: core::slice::Iter<'a, Slot<K, V>>,
    overflow: core::slice::Iter<'a, Bucket<K, V>>,
    remaining: usize,
}

impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            slots: self.slots.clone(),
            overflow: self.overflow.clone(),
            remaining: self.remaining,
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let bucket = match self.slots.by_ref().find_map(Slot::get) {
            Some(bucket) => bucket,
            None => self.overflow.next()?,
        };
        self.remaining -= 1;
        Some((bucket.key(), &bucket.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}
impl<K, V> FusedIterator for Iter<'_, K, V> {}

/// A mutable iterator over the entries of a [`HashMap`].
pub struct IterMut<'a, K, V> {
    slots: core::slice::IterMut<'a, Slot<K, V>>,
    overflow: core::slice::IterMut<'a, Bucket<K, V>>,
    remaining: usize,
}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);

    fn next(&mut self) -> Option<Self::Item> {
        let bucket = match self.slots.by_ref().find_map(Slot::get_mut) {
            Some(bucket) => bucket,
            None => self.overflow.next()?,
        };
        self.remaining -= 1;
        Some(bucket.pair_mut())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for IterMut<'_, K, V> {}
impl<K, V> FusedIterator for IterMut<'_, K, V> {}

/// An owning iterator over the entries of a [`HashMap`].
pub struct IntoIter<K, V> {
    slots: vec::IntoIter<Slot<K, V>>,
    overflow: vec::IntoIter<Bucket<K, V>>,
    remaining: usize,
}

impl<K, V> IntoIter<K, V> {
    fn new(table: NeighborhoodTable<K, V>, overflow: OverflowStore<K, V>) -> Self {
        let remaining = table.len() + overflow.len();
        Self {
            slots: table.into_slots().into_iter(),
            overflow: overflow.into_entries().into_iter(),
            remaining,
        }
    }
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        let bucket = match self.slots.by_ref().find_map(Slot::into_bucket) {
            Some(bucket) => bucket,
            None => self.overflow.next()?,
        };
        self.remaining -= 1;
        Some(bucket.into_pair())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for IntoIter<K, V> {}
impl<K, V> FusedIterator for IntoIter<K, V> {}

/// An iterator over the keys of a [`HashMap`].
pub struct Keys<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Keys<'a, K, V> {
    type Item = &'a K;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(k, _)| k)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Keys<'_, K, V> {}

/// An iterator over the values of a [`HashMap`].
pub struct Values<'a, K, V> {
    inner: Iter<'a, K, V>,
}

impl<'a, K, V> Iterator for Values<'a, K, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Values<'_, K, V> {}

/// A mutable iterator over the values of a [`HashMap`].
pub struct ValuesMut<'a, K, V> {
    inner: IterMut<'a, K, V>,
}

impl<'a, K, V> Iterator for ValuesMut<'a, K, V> {
    type Item = &'a mut V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, v)| v)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for ValuesMut<'_, K, V> {}

/// A draining iterator over the entries of a [`HashMap`].
pub struct Drain<'a, K, V> {
    inner: IntoIter<K, V>,
    _marker: PhantomData<&'a mut ()>,
}

impl<K, V> Iterator for Drain<'_, K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Drain<'_, K, V> {}

impl<K, V, S> IntoIterator for HashMap<K, V, S> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    fn into_iter(self) -> IntoIter<K, V> {
        IntoIter::new(self.table, self.overflow)
    }
}

impl<'a, K, V, S> IntoIterator for &'a HashMap<K, V, S> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Iter<'a, K, V> {
        self.iter()
    }
}

impl<'a, K, V, S> IntoIterator for &'a mut HashMap<K, V, S> {
    type Item = (&'a K, &'a mut V);
    type IntoIter = IterMut<'a, K, V>;

    fn into_iter(self) -> IterMut<'a, K, V> {
        self.iter_mut()
    }
}
