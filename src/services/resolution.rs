//! The read pipeline shared by every service: remote store first, the demo
//! dataset when the store fails or is empty, tagged so handlers can attach
//! the demo-data notice.

use crate::config::DEMO_DATA_NOTICE;
use crate::record_store::StoreError;

#[derive(Debug, Clone, PartialEq)]
pub enum Resolved<T> {
    Found(T),
    NotFound,
    UsedFallback(T),
}

impl<T> Resolved<T> {
    pub fn used_fallback(&self) -> bool {
        matches!(self, Resolved::UsedFallback(_))
    }

    pub fn notice(&self) -> Option<String> {
        self.used_fallback().then(|| DEMO_DATA_NOTICE.to_string())
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Resolved<U> {
        match self {
            Resolved::Found(value) => Resolved::Found(f(value)),
            Resolved::NotFound => Resolved::NotFound,
            Resolved::UsedFallback(value) => Resolved::UsedFallback(f(value)),
        }
    }

    /// Narrows to one item while keeping the tier tag.
    pub fn and_then<U>(self, f: impl FnOnce(T) -> Option<U>) -> Resolved<U> {
        match self {
            Resolved::Found(value) => f(value).map_or(Resolved::NotFound, Resolved::Found),
            Resolved::NotFound => Resolved::NotFound,
            Resolved::UsedFallback(value) => {
                f(value).map_or(Resolved::NotFound, Resolved::UsedFallback)
            }
        }
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            Resolved::Found(value) | Resolved::UsedFallback(value) => Some(value),
            Resolved::NotFound => None,
        }
    }

    /// Value plus notice, or `None` when neither tier had it.
    pub fn into_parts(self) -> Option<(T, Option<String>)> {
        let notice = self.notice();
        self.into_option().map(|value| (value, notice))
    }
}

/// Primary datasets (students, groups, charts): a failed or empty remote
/// read is replaced by the demo data.
pub fn resolve_list<T>(
    what: &str,
    remote: Result<Vec<T>, StoreError>,
    fallback: impl FnOnce() -> Vec<T>,
) -> Resolved<Vec<T>> {
    match remote {
        Ok(items) if !items.is_empty() => Resolved::Found(items),
        Ok(_) => {
            tracing::warn!("No {} in the record store, serving demo data", what);
            Resolved::UsedFallback(fallback())
        }
        Err(e) => {
            tracing::warn!("Reading {} failed ({}), serving demo data", what, e);
            Resolved::UsedFallback(fallback())
        }
    }
}

/// Dependent records (profiles, history, progress): an empty sheet is a real
/// answer, only a failed read falls back.
pub fn resolve_rows<T>(
    what: &str,
    remote: Result<Vec<T>, StoreError>,
    fallback: impl FnOnce() -> Vec<T>,
) -> Resolved<Vec<T>> {
    match remote {
        Ok(items) => Resolved::Found(items),
        Err(e) => {
            tracing::warn!("Reading {} failed ({}), serving demo data", what, e);
            Resolved::UsedFallback(fallback())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unavailable() -> StoreError {
        StoreError::NotInitialized("no credentials".to_string())
    }

    #[test]
    fn empty_primary_data_falls_back() {
        let resolved = resolve_list("groups", Ok(Vec::<i32>::new()), || vec![1, 2]);
        assert_eq!(resolved, Resolved::UsedFallback(vec![1, 2]));
        assert!(resolved.notice().is_some());
    }

    #[test]
    fn failures_fall_back_and_successes_do_not() {
        assert_eq!(
            resolve_list("groups", Err(unavailable()), || vec![9]),
            Resolved::UsedFallback(vec![9])
        );
        let found = resolve_list("groups", Ok(vec![3]), || vec![9]);
        assert_eq!(found, Resolved::Found(vec![3]));
        assert_eq!(found.notice(), None);
    }

    #[test]
    fn empty_dependent_rows_are_kept() {
        assert_eq!(
            resolve_rows("profiles", Ok(Vec::<i32>::new()), || vec![1]),
            Resolved::Found(vec![])
        );
    }

    #[test]
    fn narrowing_keeps_the_tier() {
        let list = Resolved::UsedFallback(vec![1, 2, 3]);
        assert_eq!(
            list.clone().and_then(|v| v.into_iter().find(|x| *x == 2)),
            Resolved::UsedFallback(2)
        );
        assert_eq!(
            list.and_then(|v| v.into_iter().find(|x| *x == 7)),
            Resolved::NotFound
        );
    }
}
