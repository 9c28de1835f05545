//! Rank selection for appended entries.

use cinelist_db::{Connection, queries};

use crate::error::StoreError;

/// Picks the rank an append will try.
///
/// The store retries with a fresh pick when another writer took the rank
/// between the read and the insert.
pub trait RankSource {
    fn next_rank(&self, conn: &Connection, list_id: i64) -> Result<i64, StoreError>;
}

/// One past the list's highest rank, 0 for an empty list.
#[derive(Debug, Default, Clone, Copy)]
pub struct AfterLast;

impl RankSource for AfterLast {
    fn next_rank(&self, conn: &Connection, list_id: i64) -> Result<i64, StoreError> {
        match queries::max_rank(conn, list_id)? {
            None => Ok(0),
            Some(max) => rank_after(max).ok_or_else(|| {
                StoreError::invalid(format!("list {list_id} has no rank after {max}"))
            }),
        }
    }
}

/// The rank following `rank`, if it is representable.
pub fn rank_after(rank: i64) -> Option<i64> {
    rank.checked_add(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn last_representable_rank_has_no_successor() {
        assert_eq!(rank_after(0), Some(1));
        assert_eq!(rank_after(i64::MAX - 1), Some(i64::MAX));
        assert_eq!(rank_after(i64::MAX), None);
    }
}
