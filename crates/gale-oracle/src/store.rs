//! Latest verified price commit per token pair.
//!
//! Only [`OracleHub`](crate::OracleHub) writes to the store, and only after a
//! submission has passed quorum verification. A later commit for the same
//! pair replaces the earlier one.

use std::collections::HashMap;

use serde::Serialize;

use gale_types::oracle::PriceCommit;
use gale_types::{AssetId, Height, TaskId, TokenPair};

use crate::{OracleError, Result};

/// A verified commit and the task it completed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredCommit {
    pub task_id: TaskId,
    pub commit: PriceCommit,
}

#[derive(Debug, Clone, Default)]
pub struct PriceCommitStore {
    commits: HashMap<TokenPair, StoredCommit>,
}

impl PriceCommitStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert(&mut self, task_id: TaskId, commit: PriceCommit) {
        self.commits
            .insert(commit.pair, StoredCommit { task_id, commit });
    }

    /// The last verified commit for `pair`, or `None` if there is no data.
    pub fn get(&self, pair: &TokenPair) -> Option<&StoredCommit> {
        self.commits.get(pair)
    }

    /// Like [`get`](Self::get), taking the two assets in either order.
    ///
    /// # Errors
    ///
    /// - [`OracleError::Pair`] if the assets do not form a valid pair
    pub fn get_by_assets(&self, a: AssetId, b: AssetId) -> Result<Option<&StoredCommit>> {
        Ok(self.get(&TokenPair::new(a, b)?))
    }

    /// The last verified commit for `pair`, provided it was observed no more
    /// than `max_age` height units before `current`. A `max_age` of 0
    /// disables the age check.
    ///
    /// # Errors
    ///
    /// - [`OracleError::NoData`] if nothing was ever committed for `pair`
    /// - [`OracleError::FutureCommit`] if the commit claims to be observed after `current`
    /// - [`OracleError::StaleCommit`] if the commit is too old
    pub fn get_fresh(&self, pair: &TokenPair, current: Height, max_age: u64) -> Result<&StoredCommit> {
        let stored = self.get(pair).ok_or(OracleError::NoData(*pair))?;
        let observed_at = stored.commit.observed_at;
        if observed_at > current {
            return Err(OracleError::FutureCommit {
                observed_at,
                current,
            });
        }
        if max_age > 0 && current - observed_at > max_age {
            return Err(OracleError::StaleCommit {
                observed_at,
                current,
                max_age,
            });
        }
        Ok(stored)
    }

    pub fn len(&self) -> usize {
        self.commits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commits.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pair() -> TokenPair {
        TokenPair::new([1u8; 32], [2u8; 32]).expect("pair")
    }

    fn commit(prices: Vec<u128>, observed_at: Height) -> PriceCommit {
        PriceCommit {
            pair: pair(),
            prices,
            observed_at,
        }
    }

    #[test]
    fn test_no_data_is_distinct_from_zero() {
        let store = PriceCommitStore::new();
        assert!(store.get(&pair()).is_none());
        assert_eq!(
            store.get_fresh(&pair(), 10, 0),
            Err(OracleError::NoData(pair()))
        );
    }

    #[test]
    fn test_lookup_in_either_order() {
        let mut store = PriceCommitStore::new();
        store.insert(1, commit(vec![5], 3));
        let ab = store.get_by_assets([1u8; 32], [2u8; 32]).expect("valid");
        let ba = store.get_by_assets([2u8; 32], [1u8; 32]).expect("valid");
        assert_eq!(ab, ba);
        assert_eq!(ab.map(|s| s.task_id), Some(1));
    }

    #[test]
    fn test_later_commit_overwrites() {
        let mut store = PriceCommitStore::new();
        store.insert(1, commit(vec![5], 3));
        store.insert(2, commit(vec![6, 7], 4));
        let stored = store.get(&pair()).expect("stored");
        assert_eq!(stored.task_id, 2);
        assert_eq!(stored.commit.prices, vec![6, 7]);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_get_fresh_age_limit() {
        let mut store = PriceCommitStore::new();
        store.insert(1, commit(vec![5], 100));
        assert!(store.get_fresh(&pair(), 150, 50).is_ok());
        assert_eq!(
            store.get_fresh(&pair(), 151, 50),
            Err(OracleError::StaleCommit {
                observed_at: 100,
                current: 151,
                max_age: 50
            })
        );
        assert!(store.get_fresh(&pair(), 10_000, 0).is_ok());
    }

    #[test]
    fn test_future_observation_never_served() {
        let mut store = PriceCommitStore::new();
        store.insert(1, commit(vec![5], u64::MAX));
        for (current, max_age) in [(1_000, 50), (1_000, 0), (u64::MAX - 1, 50)] {
            assert_eq!(
                store.get_fresh(&pair(), current, max_age),
                Err(OracleError::FutureCommit {
                    observed_at: u64::MAX,
                    current,
                })
            );
        }
        assert!(store.get_fresh(&pair(), u64::MAX, 50).is_ok());
    }

    #[test]
    fn test_invalid_query_pair() {
        let store = PriceCommitStore::new();
        assert!(store.get_by_assets([3u8; 32], [3u8; 32]).is_err());
    }
}
