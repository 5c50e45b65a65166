//! Accumulating list loader
//!
//! Backs a list view: collects loaded items, tracks whether a load is running
//! and whether the last one failed, and merges update results into the
//! items already shown.

use super::graphql::SimpleGqlPagesLoader;
use super::types::ApiExecutor;
use crate::error::Result;
use crate::model::Identified;
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};

#[derive(Debug)]
struct ListState<T> {
    items: Vec<T>,
    loading: bool,
    error: Option<String>,
    /// Bumped by every reset so stale loads are discarded
    generation: u64,
}

impl<T> Default for ListState<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            loading: false,
            error: None,
            generation: 0,
        }
    }
}

/// List of items loaded page by page from a GraphQL connection
pub struct PagedListLoader<T, E> {
    pages: RwLock<Arc<SimpleGqlPagesLoader<T, E>>>,
    state: RwLock<ListState<T>>,
}

impl<T, E> PagedListLoader<T, E>
where
    T: Identified + Clone + DeserializeOwned + Send + Sync,
    E: ApiExecutor,
{
    pub fn new(pages: SimpleGqlPagesLoader<T, E>) -> Self {
        Self {
            pages: RwLock::new(Arc::new(pages)),
            state: RwLock::new(ListState::default()),
        }
    }

    /// Not loading, and either more pages exist or the last load failed
    pub async fn can_load_more(&self) -> bool {
        let has_next = self.pages.read().await.has_next().await;
        let state = self.state.read().await;
        !state.loading && (has_next || state.error.is_some())
    }

    /// Load the next page, or the changes since the last load when `update`
    ///
    /// Returns how many items were added or replaced. A failure is also
    /// recorded and reported by `error()` until the next successful load.
    pub async fn load_more(&self, update: bool) -> Result<usize> {
        let pages = Arc::clone(&*self.pages.read().await);
        let generation = {
            let mut state = self.state.write().await;
            if state.loading {
                debug!("List load already running");
                return Ok(0);
            }
            state.loading = true;
            state.generation
        };

        let result = pages.load_next(update).await;

        let mut state = self.state.write().await;
        if state.generation != generation {
            debug!("List was reset during load, discarding result");
            return Ok(0);
        }
        state.loading = false;

        match result {
            Ok(Some(items)) => {
                state.error = None;
                let count = items.len();
                if update {
                    merge_update(&mut state.items, items);
                } else {
                    state.items.extend(items);
                }
                Ok(count)
            }
            Ok(None) => {
                state.error = None;
                Ok(0)
            }
            Err(e) => {
                warn!("List load failed: {e}");
                state.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Snapshot of the loaded items
    pub async fn items(&self) -> Vec<T> {
        self.state.read().await.items.clone()
    }

    /// Message of the last failed load
    pub async fn error(&self) -> Option<String> {
        self.state.read().await.error.clone()
    }

    pub async fn is_loading(&self) -> bool {
        self.state.read().await.loading
    }

    /// Drop loaded items and restart from the first page
    pub async fn reset(&self) {
        self.pages.read().await.reset().await;
        self.clear().await;
    }

    /// Load from another connection from now on, starting empty
    pub async fn replace_pages(&self, pages: SimpleGqlPagesLoader<T, E>) {
        *self.pages.write().await = Arc::new(pages);
        self.clear().await;
    }

    async fn clear(&self) {
        let mut state = self.state.write().await;
        let generation = state.generation + 1;
        *state = ListState {
            generation,
            ..ListState::default()
        };
    }
}

/// Replace items with the same id in place, prepend the new ones
fn merge_update<T: Identified>(items: &mut Vec<T>, updates: Vec<T>) {
    let positions: HashMap<String, usize> = items
        .iter()
        .enumerate()
        .map(|(i, item)| (item.item_id(), i))
        .collect();

    let mut fresh = Vec::new();
    for update in updates {
        match positions.get(&update.item_id()) {
            Some(&index) => items[index] = update,
            None => fresh.push(update),
        }
    }

    if !fresh.is_empty() {
        fresh.append(items);
        *items = fresh;
    }
}
