/// Errors returned by [`HashMap`](crate::HashMap) lookups that require the key
/// to be present.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The requested key is not in the map.
    #[error("key was not found")]
    KeyNotFound,
}

/// Why the neighborhood table refused a bucket.
///
/// Both cases are recovered by the map, which stores the bucket in the
/// overflow store instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub(crate) enum PlacementError {
    /// No free slot exists between the ideal index and the end of the table.
    #[error("no free slot at or after the ideal index")]
    CapacityExhausted,
    /// A free slot exists, but no displacement chain can bring it inside the
    /// key's neighborhood.
    #[error("free slot cannot be moved into the neighborhood")]
    OutOfReach,
}
