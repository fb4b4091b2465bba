//! Per-page load state.
//!
//! Each page owns one [`LoadState`]. It moves `Idle -> Loading` when the
//! page asks for data and settles exactly once into `Failed`, `NoData` or
//! `Ready`. A settled state ignores further results.

use tracing::warn;

use crate::errors::QuakeviewError;

#[derive(Debug, Clone, PartialEq)]
pub enum LoadState<T> {
    Idle,
    Loading,
    /// The fetch failed; carries the text shown to the user.
    Failed(String),
    /// The fetch succeeded but returned no events.
    NoData,
    Ready(T),
}

impl<T> Default for LoadState<T> {
    fn default() -> Self {
        Self::Idle
    }
}

impl<T> LoadState<T> {
    /// Start loading. Only an idle page can start.
    #[must_use]
    pub fn begin(self) -> Self {
        match self {
            Self::Idle => Self::Loading,
            other => other,
        }
    }

    /// Settle a loading page with the outcome of its fetch.
    ///
    /// `is_empty` decides whether a successful payload counts as no data.
    /// Pages that are not loading are returned unchanged.
    #[must_use]
    pub fn resolve(self, outcome: Result<T, QuakeviewError>, is_empty: impl FnOnce(&T) -> bool) -> Self {
        match self {
            Self::Loading => match outcome {
                Ok(data) if is_empty(&data) => Self::NoData,
                Ok(data) => Self::Ready(data),
                Err(e) => {
                    warn!("fetch failed: {e}");
                    Self::Failed(e.user_message().to_string())
                }
            },
            other => other,
        }
    }

    /// Transform the ready payload, keeping every other state.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> LoadState<U> {
        match self {
            Self::Idle => LoadState::Idle,
            Self::Loading => LoadState::Loading,
            Self::Failed(reason) => LoadState::Failed(reason),
            Self::NoData => LoadState::NoData,
            Self::Ready(data) => LoadState::Ready(f(data)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::FETCH_FAILED_MESSAGE;

    fn loading() -> LoadState<Vec<u32>> {
        LoadState::default().begin()
    }

    #[test]
    fn test_begin_from_idle() {
        assert_eq!(loading(), LoadState::Loading);
    }

    #[test]
    fn test_ready() {
        let state = loading().resolve(Ok(vec![1, 2]), Vec::is_empty);
        assert_eq!(state, LoadState::Ready(vec![1, 2]));
    }

    #[test]
    fn test_empty_is_no_data_not_failure() {
        let state = loading().resolve(Ok(vec![]), Vec::is_empty);
        assert_eq!(state, LoadState::NoData);
    }

    #[test]
    fn test_error_is_generic_failure() {
        let err = QuakeviewError::Api {
            status: 500,
            message: "Internal Server Error".into(),
        };
        let state = loading().resolve(Err(err), Vec::is_empty);
        assert_eq!(state, LoadState::Failed(FETCH_FAILED_MESSAGE.to_string()));
    }

    #[test]
    fn test_settled_ignores_late_results() {
        let settled = loading().resolve(Ok(vec![7]), Vec::is_empty);
        let late = settled.clone().resolve(Ok(vec![]), Vec::is_empty);
        assert_eq!(late, settled);

        let idle: LoadState<Vec<u32>> = LoadState::Idle;
        assert_eq!(idle.resolve(Ok(vec![1]), Vec::is_empty), LoadState::Idle);
    }

    #[test]
    fn test_begin_does_not_reset_settled() {
        let settled = loading().resolve(Ok(vec![]), Vec::is_empty);
        assert_eq!(settled.begin(), LoadState::NoData);
    }

    #[test]
    fn test_map_ready() {
        let state = loading().resolve(Ok(vec![1, 2, 3]), Vec::is_empty);
        assert_eq!(state.map(|v| v.len()), LoadState::Ready(3));
    }
}
