//! Optimistic updates: show a change immediately, undo it if the store refuses.

use crate::{
    core::state::{Action, AppState},
    errors::Result,
};
use std::future::Future;
use tracing::warn;

/// Applies `action` to `state`, then awaits `commit`.
///
/// On failure the state is restored to exactly what it was before the action
/// and the error is returned. There is no retry.
pub async fn optimistic<T, F>(state: &mut AppState, action: Action, commit: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    let snapshot = state.clone();
    state.apply(action);

    match commit.await {
        Ok(value) => Ok(value),
        Err(e) => {
            warn!("Remote write failed, rolling back local change: {}", e);
            *state = snapshot;
            Err(e)
        }
    }
}
