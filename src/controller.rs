use chrono::Utc;
use log::{ debug, error, info };
use serde::Serialize;
use std::sync::atomic::{ AtomicUsize, Ordering };
use thiserror::Error;
use tokio::sync::Mutex;

use crate::generator::Generators;
use crate::history::{ HistoryStore, StoreError };
use crate::models::{ ContentItem, ContentKind, GeneratedPayload, Rating, RatingError };

#[derive(Debug, Error)]
pub enum ControllerError {
    #[error(transparent)]
    InvalidRating(#[from] RatingError),
    #[error("could not persist history: {0}")]
    Persist(#[from] StoreError),
}

/// Read-only view handed to renderers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewSnapshot {
    pub active_kind: ContentKind,
    pub is_loading: bool,
    pub current_item: Option<ContentItem>,
    pub history_for_active_kind: Vec<ContentItem>,
}

#[derive(Debug, Default)]
struct Slot {
    current: Option<ContentItem>,
    /// Sequence number handed to the latest trigger for this kind.
    triggered: u64,
    /// Sequence number of the trigger whose result is in `current`.
    applied: u64,
}

impl Slot {
    fn begin(&mut self) -> u64 {
        self.triggered += 1;
        self.triggered
    }

    fn settle(&mut self, seq: u64, item: ContentItem) {
        if seq < self.applied {
            debug!("Discarding stale {} result #{} (showing #{})", item.kind, seq, self.applied);
            return;
        }
        self.applied = seq;
        self.current = Some(item);
    }
}

#[derive(Debug)]
struct ViewState {
    active_kind: ContentKind,
    joke: Slot,
    dish: Slot,
    history: Vec<ContentItem>,
    last_id: i64,
}

impl ViewState {
    fn slot_mut(&mut self, kind: ContentKind) -> &mut Slot {
        match kind {
            ContentKind::Joke => &mut self.joke,
            ContentKind::Dish => &mut self.dish,
        }
    }

    fn slot(&self, kind: ContentKind) -> &Slot {
        match kind {
            ContentKind::Joke => &self.joke,
            ContentKind::Dish => &self.dish,
        }
    }

    /// Millisecond timestamp id, bumped past the previous one on collision.
    fn next_id(&mut self, now: i64) -> String {
        let id = now.max(self.last_id + 1);
        self.last_id = id;
        id.to_string()
    }
}

struct LoadingGuard<'a>(&'a AtomicUsize);

impl<'a> LoadingGuard<'a> {
    fn acquire(in_flight: &'a AtomicUsize) -> Self {
        in_flight.fetch_add(1, Ordering::SeqCst);
        Self(in_flight)
    }
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Owns the view state and applies the three user intents to it.
pub struct ViewController {
    state: Mutex<ViewState>,
    in_flight: AtomicUsize,
    generators: Generators,
    store: HistoryStore,
}

impl ViewController {
    pub fn new(generators: Generators, store: HistoryStore) -> Self {
        let history = store.load();
        let last_id = history
            .iter()
            .filter_map(|item| item.id.parse::<i64>().ok())
            .max()
            .unwrap_or(0);
        info!("Loaded {} history items", history.len());

        Self {
            state: Mutex::new(ViewState {
                active_kind: ContentKind::Joke,
                joke: Slot::default(),
                dish: Slot::default(),
                history,
                last_id,
            }),
            in_flight: AtomicUsize::new(0),
            generators,
            store,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst) > 0
    }

    pub async fn select_tab(&self, kind: ContentKind) {
        self.state.lock().await.active_kind = kind;
    }

    /// Generates one item of `kind` and returns what this request produced:
    /// the new item, or the error placeholder. The item is only put on
    /// display if no newer request for `kind` has settled first. Returns
    /// `None` when no kind was given.
    pub async fn request_generation(&self, kind: Option<ContentKind>) -> Option<ContentItem> {
        let kind = kind?;
        let _loading = LoadingGuard::acquire(&self.in_flight);
        let seq = self.state.lock().await.slot_mut(kind).begin();
        let generator = self.generators.for_kind(kind);
        debug!("Generating {} #{}", generator.kind(), seq);

        let outcome = generator.generate().await;

        let mut state = self.state.lock().await;
        let now = Utc::now().timestamp_millis();
        let item = match outcome {
            Ok(payload) =>
                match self.record(&mut state, kind, payload, now).await {
                    Ok(item) => item,
                    Err(e) => {
                        error!("Failed to fetch {}: {}", kind, e);
                        ContentItem::error(kind, now)
                    }
                }
            Err(e) => {
                error!("Failed to fetch {}: {}", kind, e);
                ContentItem::error(kind, now)
            }
        };
        state.slot_mut(kind).settle(seq, item.clone());
        Some(item)
    }

    /// Prepends a new item and persists; history is untouched if the write fails.
    async fn record(
        &self,
        state: &mut ViewState,
        kind: ContentKind,
        payload: GeneratedPayload,
        now: i64
    ) -> Result<ContentItem, StoreError> {
        let previous_id = state.last_id;
        let id = state.next_id(now);
        let item = ContentItem::from_payload(id, kind, payload, now);

        state.history.insert(0, item.clone());
        if let Err(e) = self.store.save(&state.history).await {
            state.history.remove(0);
            state.last_id = previous_id;
            return Err(e);
        }
        Ok(item)
    }

    /// Sets the rating of the history entry with `id`, and of the displayed
    /// item if it is the same one. Unknown ids are ignored.
    pub async fn rate(&self, id: &str, value: f64) -> Result<(), ControllerError> {
        let rating = Rating::new(value)?;
        let mut state = self.state.lock().await;

        let Some(index) = state.history.iter().position(|item| item.id == id) else {
            debug!("Ignoring rating for unknown item {}", id);
            return Ok(());
        };
        let previous = state.history[index].rating.replace(rating);
        if let Err(e) = self.store.save(&state.history).await {
            state.history[index].rating = previous;
            return Err(e.into());
        }

        for kind in ContentKind::ALL {
            if let Some(current) = state.slot_mut(kind).current.as_mut() {
                if current.id == id {
                    current.rating = Some(rating);
                }
            }
        }
        Ok(())
    }

    pub async fn snapshot(&self) -> ViewSnapshot {
        let state = self.state.lock().await;
        let active_kind = state.active_kind;
        ViewSnapshot {
            active_kind,
            is_loading: self.is_loading(),
            current_item: state.slot(active_kind).current.clone(),
            history_for_active_kind: state.history
                .iter()
                .filter(|item| item.kind == active_kind)
                .cloned()
                .collect(),
        }
    }

    pub async fn history(&self) -> Vec<ContentItem> {
        self.state.lock().await.history.clone()
    }
}
