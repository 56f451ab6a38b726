//! Keyed cache of assembled views with optimistic updates.
//!
//! Keys are built from the logical query rather than from request URLs, so
//! two callers asking for the same data share an entry. A speculative entry
//! holds a value written ahead of the database; it is either confirmed or
//! replaced by a fresh read once the write settles.
//!
//! Every invalidation advances an epoch. A read that started before the
//! invalidation stores its result with [`ViewCache::insert_if_current`],
//! which refuses values loaded against an older epoch.

use crate::error::CoreError;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::future::Future;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    Categories,
    Weeks {
        category_id: Uuid,
        year: Option<i32>,
    },
    WeekTodos {
        week_id: Uuid,
    },
    DayTags {
        category_id: Uuid,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    },
    DayNotes {
        category_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    },
    Reflection {
        week_id: Uuid,
    },
}

impl CacheKey {
    pub fn concerns_category(&self, id: Uuid) -> bool {
        match self {
            CacheKey::Weeks { category_id, .. }
            | CacheKey::DayTags { category_id, .. }
            | CacheKey::DayNotes { category_id, .. } => *category_id == id,
            CacheKey::Categories | CacheKey::WeekTodos { .. } | CacheKey::Reflection { .. } => false,
        }
    }

    pub fn concerns_week(&self, id: Uuid) -> bool {
        match self {
            CacheKey::WeekTodos { week_id } | CacheKey::Reflection { week_id } => *week_id == id,
            _ => false,
        }
    }

    /// Whether a date-ranged key covers `date`. Unbounded ends match.
    pub fn covers_date(&self, date: NaiveDate) -> bool {
        match self {
            CacheKey::DayTags { start, end, .. } => {
                start.map_or(true, |s| s <= date) && end.map_or(true, |e| date <= e)
            }
            CacheKey::DayNotes { start, end, .. } => *start <= date && date <= *end,
            _ => false,
        }
    }
}

#[derive(Debug, Clone)]
struct Entry<V> {
    value: V,
    speculative: bool,
}

#[derive(Debug)]
pub struct ViewCache<V> {
    entries: HashMap<CacheKey, Entry<V>>,
    epoch: u64,
}

impl<V> Default for ViewCache<V> {
    fn default() -> Self {
        Self {
            entries: HashMap::new(),
            epoch: 0,
        }
    }
}

impl<V: Clone> ViewCache<V> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &CacheKey) -> Option<&V> {
        self.entries.get(key).map(|entry| &entry.value)
    }

    /// Stores a value read from the database.
    pub fn insert(&mut self, key: CacheKey, value: V) {
        self.entries.insert(
            key,
            Entry {
                value,
                speculative: false,
            },
        );
    }

    /// Stores `value` only if nothing was invalidated since `epoch` was read.
    pub fn insert_if_current(&mut self, key: CacheKey, value: V, epoch: u64) -> bool {
        if self.epoch != epoch {
            return false;
        }
        self.insert(key, value);
        true
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn invalidate(&mut self, key: &CacheKey) {
        self.epoch = self.epoch.wrapping_add(1);
        self.entries.remove(key);
    }

    pub fn invalidate_where<P>(&mut self, mut predicate: P)
    where
        P: FnMut(&CacheKey) -> bool,
    {
        self.epoch = self.epoch.wrapping_add(1);
        self.entries.retain(|key, _| !predicate(key));
    }

    pub fn is_speculative(&self, key: &CacheKey) -> bool {
        self.entries.get(key).is_some_and(|entry| entry.speculative)
    }

    /// Applies `updater` to the cached value and marks it speculative.
    /// Returns false when nothing is cached under `key`.
    pub fn set_optimistic<F>(&mut self, key: &CacheKey, updater: F) -> bool
    where
        F: FnOnce(&mut V),
    {
        match self.entries.get_mut(key) {
            Some(entry) => {
                updater(&mut entry.value);
                entry.speculative = true;
                true
            }
            None => false,
        }
    }

    /// Marks a speculative value as matching the database.
    pub fn confirm(&mut self, key: &CacheKey) {
        if let Some(entry) = self.entries.get_mut(key) {
            entry.speculative = false;
        }
    }

    pub fn clear(&mut self) {
        self.epoch = self.epoch.wrapping_add(1);
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Runs `write` with the cached value already updated by `updater`.
    ///
    /// On success the entry is dropped so the next read sees the stored
    /// state. On failure the speculative value is replaced by `refetch`
    /// and the write error is returned. If the refetch fails as well the
    /// entry is dropped.
    pub async fn optimistic<T, F, W, R, RF>(
        &mut self,
        key: CacheKey,
        updater: F,
        write: W,
        refetch: R,
    ) -> Result<T, CoreError>
    where
        F: FnOnce(&mut V),
        W: Future<Output = Result<T, CoreError>>,
        R: FnOnce() -> RF,
        RF: Future<Output = Result<V, CoreError>>,
    {
        let had_entry = self.set_optimistic(&key, updater);

        match write.await {
            Ok(value) => {
                self.invalidate(&key);
                Ok(value)
            }
            Err(err) => {
                self.invalidate(&key);
                if had_entry {
                    match refetch().await {
                        Ok(fresh) => self.insert(key, fresh),
                        Err(refetch_err) => {
                            tracing::warn!(?key, error = %refetch_err, "refetch after failed write");
                        }
                    }
                }
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn todos_key() -> CacheKey {
        CacheKey::WeekTodos {
            week_id: Uuid::now_v7(),
        }
    }

    #[test]
    fn set_optimistic_marks_entry_speculative() {
        let key = todos_key();
        let mut cache = ViewCache::new();
        cache.insert(key.clone(), vec![false]);

        assert!(cache.set_optimistic(&key, |v| v[0] = true));
        assert_eq!(cache.get(&key), Some(&vec![true]));
        assert!(cache.is_speculative(&key));

        cache.confirm(&key);
        assert!(!cache.is_speculative(&key));
    }

    #[test]
    fn set_optimistic_without_entry_is_a_no_op() {
        let mut cache: ViewCache<Vec<bool>> = ViewCache::new();
        assert!(!cache.set_optimistic(&todos_key(), |v| v.push(true)));
        assert!(cache.is_empty());
    }

    #[test]
    fn invalidate_where_drops_matching_keys() {
        let category_id = Uuid::now_v7();
        let mut cache = ViewCache::new();
        cache.insert(CacheKey::Categories, 1);
        cache.insert(
            CacheKey::Weeks {
                category_id,
                year: Some(2025),
            },
            2,
        );
        cache.insert(
            CacheKey::Weeks {
                category_id: Uuid::now_v7(),
                year: None,
            },
            3,
        );

        cache.invalidate_where(|key| key.concerns_category(category_id));

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get(&CacheKey::Categories), Some(&1));
    }

    #[test]
    fn stale_read_is_not_stored_after_invalidation() {
        let key = todos_key();
        let mut cache = ViewCache::new();
        cache.insert(key.clone(), vec![false]);

        // A reader misses, a writer invalidates, then the reader returns.
        cache.invalidate(&key);
        let epoch = cache.epoch();
        cache.invalidate_where(|k| k.concerns_week(Uuid::nil()));

        assert!(!cache.insert_if_current(key.clone(), vec![false], epoch));
        assert!(cache.get(&key).is_none());

        let epoch = cache.epoch();
        assert!(cache.insert_if_current(key.clone(), vec![true], epoch));
        assert_eq!(cache.get(&key), Some(&vec![true]));
    }

    #[test]
    fn clear_advances_the_epoch() {
        let mut cache: ViewCache<u8> = ViewCache::new();
        let before = cache.epoch();
        cache.clear();
        assert!(!cache.insert_if_current(CacheKey::Categories, 1, before));
        assert!(cache.is_empty());
    }

    #[test]
    fn ranged_keys_cover_their_dates() {
        let d = |day| NaiveDate::from_ymd_opt(2025, 2, day).unwrap();
        let notes = CacheKey::DayNotes {
            category_id: Uuid::nil(),
            start: d(3),
            end: d(9),
        };
        let open_tags = CacheKey::DayTags {
            category_id: Uuid::nil(),
            start: None,
            end: None,
        };

        assert!(notes.covers_date(d(9)));
        assert!(!notes.covers_date(d(10)));
        assert!(open_tags.covers_date(d(28)));
    }

    #[tokio::test]
    async fn optimistic_success_drops_entry() {
        let key = todos_key();
        let mut cache = ViewCache::new();
        cache.insert(key.clone(), vec![false]);

        let result = cache
            .optimistic(
                key.clone(),
                |v| v[0] = true,
                async { Ok::<_, CoreError>(42) },
                || async { Ok(vec![false]) },
            )
            .await;

        assert_eq!(result.unwrap(), 42);
        assert!(cache.get(&key).is_none());
    }

    #[tokio::test]
    async fn optimistic_failure_restores_refetched_value() {
        let key = todos_key();
        let mut cache = ViewCache::new();
        cache.insert(key.clone(), vec![false]);

        let result: Result<(), CoreError> = cache
            .optimistic(
                key.clone(),
                |v| v[0] = true,
                async { Err(CoreError::NotFound("Todo gone".to_string())) },
                || async { Ok(vec![false, false]) },
            )
            .await;

        assert!(matches!(result, Err(CoreError::NotFound(_))));
        assert_eq!(cache.get(&key), Some(&vec![false, false]));
        assert!(!cache.is_speculative(&key));
    }

    #[tokio::test]
    async fn optimistic_failure_with_failed_refetch_leaves_no_entry() {
        let key = todos_key();
        let mut cache = ViewCache::new();
        cache.insert(key.clone(), vec![false]);

        let result: Result<(), CoreError> = cache
            .optimistic(
                key.clone(),
                |v| v[0] = true,
                async { Err(CoreError::InvalidInput("bad".to_string())) },
                || async { Err(CoreError::NotFound("Week not found".to_string())) },
            )
            .await;

        assert!(result.is_err());
        assert!(cache.get(&key).is_none());
    }
}
