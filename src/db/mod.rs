//! Database layer (document store trait, Firestore and in-memory backends).

pub mod firestore;
pub mod memory;
pub mod store;

pub use firestore::FirestoreStore;
pub use memory::MemoryStore;
pub use store::Store;

/// Collection names as constants.
pub mod collections {
    /// Per-user leaderboard documents (keyed by user id)
    pub const LEADERBOARD: &str = "leaderboard";
    /// Daily step records, sub-collection of a leaderboard document
    /// (keyed by date key)
    pub const DAILY: &str = "daily";
    pub const GROUPS: &str = "groups";
    pub const USERS: &str = "users";
}

/// Firestore accepts at most 10 values in an `in` filter; the step ledger
/// partitions date-key lookups into chunks of this size.
pub const IN_QUERY_LIMIT: usize = 10;
