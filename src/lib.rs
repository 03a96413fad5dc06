#![warn(missing_docs)]
#![doc = include_str!("../README.md")]
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

/// A key-value map built on hopscotch hashing.
///
/// This module provides [`HashMap`], which owns a fixed-window neighborhood
/// table plus an overflow list, and exposes a standard map interface with
/// configurable hashers.
pub mod hash_map;

mod error;
mod neighborhood;
mod overflow;
mod slot;

/// Table statistics for tuning and debugging.
#[cfg(any(test, feature = "stats"))]
pub mod stats;

pub use error::Error;
pub use hash_map::DEFAULT_CAPACITY;
pub use hash_map::Entry;
pub use hash_map::HashMap;
pub use hash_map::MAX_LOAD_FACTOR;
pub use hash_map::MIN_LOAD_FACTOR;

cfg_if::cfg_if! {
    if #[cfg(feature = "foldhash")] {
        /// The hasher builder used when none is supplied.
        pub type DefaultHashBuilder = foldhash::fast::RandomState;
    } else if #[cfg(feature = "std")] {
        /// The hasher builder used when none is supplied.
        pub type DefaultHashBuilder = std::hash::RandomState;
    } else {
        /// Placeholder when neither `foldhash` nor `std` is enabled. It
        /// cannot be constructed, so maps must be built with an explicit
        /// hasher.
        #[derive(Clone, Copy, Debug)]
        pub enum DefaultHashBuilder {}
    }
}
