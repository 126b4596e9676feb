use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use tracing::{debug, warn};

use crate::api::{ClientError, ListPage, ListQuery, Resource, ResourceBackend};
use crate::models::Pagination;
use crate::store::{Operation, Rejected};

/// Cached view of one collection
#[derive(Debug, Clone, PartialEq)]
pub struct SliceState<T> {
    pub items: Vec<T>,
    pub selected: Option<T>,
    pub loading: bool,
    pub error: Option<String>,
    pub total: u64,
    pub pagination: Pagination,
    /// Query of the last list fetch that was applied
    pub last_query: Option<ListQuery>,
}

impl<T> Default for SliceState<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            selected: None,
            loading: false,
            error: None,
            total: 0,
            pagination: Pagination::default(),
            last_query: None,
        }
    }
}

impl<T: Resource> SliceState<T> {
    pub fn find(&self, id: &str) -> Option<&T> {
        self.items.iter().find(|item| item.id() == id)
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.items.iter().position(|item| item.id() == id)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action<T> {
    Pending(Operation),
    Rejected { op: Operation, message: String },
    ListLoaded { page: ListPage<T>, query: ListQuery },
    ItemLoaded(T),
    Created(T),
    Updated(T),
    Removed(String),
    /// Fulfilled with nothing to apply
    Settled(Operation),
}

/// Apply one action. Re-applying the same action leaves the state unchanged.
pub fn reduce<T: Resource>(state: &mut SliceState<T>, action: Action<T>) {
    match action {
        Action::Pending(_) => {
            state.loading = true;
            state.error = None;
        }
        Action::Rejected { message, .. } => {
            state.loading = false;
            state.error = Some(message);
        }
        Action::ListLoaded { page, query } => {
            state.loading = false;
            state.items = page.items;
            state.total = page.total;
            state.pagination = page.pagination;
            state.last_query = Some(query);
        }
        Action::ItemLoaded(item) => {
            state.loading = false;
            state.selected = Some(item);
        }
        Action::Created(item) => {
            state.loading = false;
            match state.position(item.id()) {
                Some(index) => state.items[index] = item,
                None => {
                    state.items.insert(0, item);
                    state.total += 1;
                }
            }
        }
        Action::Updated(item) => {
            state.loading = false;
            if state.selected.as_ref().is_some_and(|s| s.id() == item.id()) {
                state.selected = Some(item.clone());
            }
            if let Some(index) = state.position(item.id()) {
                state.items[index] = item;
            }
        }
        Action::Settled(_) => {
            state.loading = false;
        }
        Action::Removed(id) => {
            state.loading = false;
            if let Some(index) = state.position(&id) {
                state.items.remove(index);
                state.total = state.total.saturating_sub(1);
            }
            if state.selected.as_ref().is_some_and(|s| s.id() == id) {
                state.selected = None;
            }
        }
    }
}

pub type Listener<T> = Arc<dyn Fn(&Action<T>, &SliceState<T>) + Send + Sync>;

/// One collection's state plus the async operations that drive it.
///
/// List and detail fetches carry a generation number; a response that was
/// overtaken by a newer request of the same kind is dropped instead of
/// overwriting fresher data.
pub struct ResourceSlice<R: Resource> {
    backend: Arc<dyn ResourceBackend<R>>,
    state: RwLock<SliceState<R>>,
    list_generation: AtomicU64,
    item_generation: AtomicU64,
    listeners: RwLock<Vec<Listener<R>>>,
}

impl<R: Resource> ResourceSlice<R> {
    pub fn new(backend: Arc<dyn ResourceBackend<R>>) -> Self {
        Self {
            backend,
            state: RwLock::new(SliceState::default()),
            list_generation: AtomicU64::new(0),
            item_generation: AtomicU64::new(0),
            listeners: RwLock::new(Vec::new()),
        }
    }

    pub fn snapshot(&self) -> SliceState<R> {
        self.state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Borrow the state without cloning it
    pub fn read<U>(&self, f: impl FnOnce(&SliceState<R>) -> U) -> U {
        let state = self.state.read().unwrap_or_else(PoisonError::into_inner);
        f(&state)
    }

    /// Observe every action together with the state it produced
    pub fn subscribe(&self, listener: impl Fn(&Action<R>, &SliceState<R>) + Send + Sync + 'static) {
        self.listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Arc::new(listener));
    }

    /// Dismiss the error banner
    pub fn clear_error(&self) {
        self.state
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .error = None;
    }

    pub fn dispatch(&self, action: Action<R>) {
        let listeners = self
            .listeners
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        debug!(resource = R::PLURAL, action = action_kind(&action), "dispatch");

        if listeners.is_empty() {
            let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
            reduce(&mut state, action);
            return;
        }

        let snapshot = {
            let mut state = self.state.write().unwrap_or_else(PoisonError::into_inner);
            reduce(&mut state, action.clone());
            state.clone()
        };
        for listener in listeners {
            listener(&action, &snapshot);
        }
    }

    /// Record a failure and build the value the operation rejects with
    pub(crate) fn reject(&self, op: Operation, err: &ClientError) -> Rejected {
        let message = err.user_message(&op.fallback_message(R::SINGULAR, R::PLURAL));
        warn!(resource = R::PLURAL, %op, error = %err, "operation rejected");
        self.dispatch(Action::Rejected {
            op,
            message: message.clone(),
        });
        Rejected { op, message }
    }

    pub async fn fetch_list(&self, query: ListQuery) -> Result<ListPage<R>, Rejected> {
        let generation = self.list_generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.dispatch(Action::Pending(Operation::FetchList));

        let outcome = self.backend.list(&query).await;
        if self.list_generation.load(Ordering::SeqCst) != generation {
            debug!(resource = R::PLURAL, generation, "dropping superseded list response");
            return outcome.map_err(|e| Rejected {
                op: Operation::FetchList,
                message: e.user_message(&Operation::FetchList.fallback_message(R::SINGULAR, R::PLURAL)),
            });
        }

        match outcome {
            Ok(page) => {
                self.dispatch(Action::ListLoaded {
                    page: page.clone(),
                    query,
                });
                Ok(page)
            }
            Err(e) => Err(self.reject(Operation::FetchList, &e)),
        }
    }

    pub async fn fetch_by_id(&self, id: &str) -> Result<R, Rejected> {
        self.load_selected(self.backend.fetch(id)).await
    }

    /// Run a detail request and put its result in `selected`. Every detail
    /// load shares one generation counter, so only the newest one lands.
    pub(crate) async fn load_selected<F>(&self, request: F) -> Result<R, Rejected>
    where
        F: Future<Output = Result<R, ClientError>>,
    {
        let generation = self.item_generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.dispatch(Action::Pending(Operation::FetchOne));

        let outcome = request.await;
        if self.item_generation.load(Ordering::SeqCst) != generation {
            debug!(resource = R::PLURAL, generation, "dropping superseded detail response");
            return outcome.map_err(|e| Rejected {
                op: Operation::FetchOne,
                message: e.user_message(&Operation::FetchOne.fallback_message(R::SINGULAR, R::PLURAL)),
            });
        }

        match outcome {
            Ok(item) => {
                self.dispatch(Action::ItemLoaded(item.clone()));
                Ok(item)
            }
            Err(e) => Err(self.reject(Operation::FetchOne, &e)),
        }
    }

    pub async fn create(&self, draft: &R::Draft) -> Result<R, Rejected> {
        self.dispatch(Action::Pending(Operation::Create));
        match self.backend.create(draft).await {
            Ok(item) => {
                self.dispatch(Action::Created(item.clone()));
                Ok(item)
            }
            Err(e) => Err(self.reject(Operation::Create, &e)),
        }
    }

    pub async fn update(&self, id: &str, patch: &R::Patch) -> Result<R, Rejected> {
        self.dispatch(Action::Pending(Operation::Update));
        match self.backend.update(id, patch).await {
            Ok(item) => {
                self.dispatch(Action::Updated(item.clone()));
                Ok(item)
            }
            Err(e) => Err(self.reject(Operation::Update, &e)),
        }
    }

    pub async fn remove(&self, id: &str) -> Result<(), Rejected> {
        self.dispatch(Action::Pending(Operation::Remove));
        match self.backend.remove(id).await {
            Ok(()) => {
                self.dispatch(Action::Removed(id.to_string()));
                Ok(())
            }
            Err(e) => Err(self.reject(Operation::Remove, &e)),
        }
    }
}

fn action_kind<T>(action: &Action<T>) -> &'static str {
    match action {
        Action::Pending(_) => "pending",
        Action::Rejected { .. } => "rejected",
        Action::ListLoaded { .. } => "list_loaded",
        Action::ItemLoaded(_) => "item_loaded",
        Action::Created(_) => "created",
        Action::Updated(_) => "updated",
        Action::Removed(_) => "removed",
        Action::Settled(_) => "settled",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde::{Deserialize, Serialize};
    use std::collections::HashMap;
    use std::sync::Mutex;
    use tokio::sync::oneshot;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Note {
        id: String,
        body: String,
        pinned: bool,
    }

    #[derive(Debug, Clone, Serialize)]
    struct NoteDraft {
        body: String,
    }

    #[derive(Debug, Clone, Default, Serialize)]
    struct NotePatch {
        body: Option<String>,
        pinned: Option<bool>,
    }

    impl Resource for Note {
        const PATH: &'static str = "/notes";
        const SINGULAR: &'static str = "note";
        const PLURAL: &'static str = "notes";
        type Draft = NoteDraft;
        type Patch = NotePatch;

        fn id(&self) -> &str {
            &self.id
        }
    }

    fn note(id: &str, body: &str) -> Note {
        Note {
            id: id.into(),
            body: body.into(),
            pinned: false,
        }
    }

    /// In-memory server; `fail_with` makes the next call fail
    #[derive(Default)]
    struct MemoryBackend {
        rows: Mutex<Vec<Note>>,
        next_id: Mutex<u32>,
        fail_with: Mutex<Option<ClientError>>,
        calls: Mutex<u32>,
    }

    impl MemoryBackend {
        fn seeded(rows: Vec<Note>) -> Arc<Self> {
            let backend = Self::default();
            *backend.rows.lock().unwrap() = rows;
            Arc::new(backend)
        }

        fn fail_next(&self, err: ClientError) {
            *self.fail_with.lock().unwrap() = Some(err);
        }

        fn check(&self) -> Result<(), ClientError> {
            *self.calls.lock().unwrap() += 1;
            match self.fail_with.lock().unwrap().take() {
                Some(err) => Err(err),
                None => Ok(()),
            }
        }
    }

    #[async_trait]
    impl ResourceBackend<Note> for MemoryBackend {
        async fn list(&self, query: &ListQuery) -> Result<ListPage<Note>, ClientError> {
            self.check()?;
            let rows = self.rows.lock().unwrap().clone();
            let total = rows.len() as u64;
            Ok(ListPage {
                items: rows,
                total,
                pagination: Pagination {
                    page: query.page.unwrap_or(1),
                    limit: query.limit.unwrap_or(10),
                    pages: 1,
                },
            })
        }

        async fn fetch(&self, id: &str) -> Result<Note, ClientError> {
            self.check()?;
            self.rows
                .lock()
                .unwrap()
                .iter()
                .find(|n| n.id == id)
                .cloned()
                .ok_or(ClientError::Status {
                    status: 404,
                    message: Some("Note not found".into()),
                })
        }

        async fn create(&self, draft: &NoteDraft) -> Result<Note, ClientError> {
            self.check()?;
            let mut next = self.next_id.lock().unwrap();
            *next += 1;
            let created = note(&format!("n{}", *next + 100), &draft.body);
            self.rows.lock().unwrap().push(created.clone());
            Ok(created)
        }

        async fn update(&self, id: &str, patch: &NotePatch) -> Result<Note, ClientError> {
            self.check()?;
            let mut rows = self.rows.lock().unwrap();
            let row = rows.iter_mut().find(|n| n.id == id).ok_or(ClientError::Status {
                status: 404,
                message: None,
            })?;
            if let Some(body) = &patch.body {
                row.body = body.clone();
            }
            if let Some(pinned) = patch.pinned {
                row.pinned = pinned;
            }
            Ok(row.clone())
        }

        async fn remove(&self, id: &str) -> Result<(), ClientError> {
            self.check()?;
            self.rows.lock().unwrap().retain(|n| n.id != id);
            Ok(())
        }
    }

    fn recorded(slice: &ResourceSlice<Note>) -> Arc<Mutex<Vec<(&'static str, bool)>>> {
        let log = Arc::new(Mutex::new(Vec::new()));
        let sink = log.clone();
        slice.subscribe(move |action, state| {
            sink.lock().unwrap().push((action_kind(action), state.loading));
        });
        log
    }

    #[tokio::test]
    async fn fetch_list_walks_pending_then_fulfilled() {
        let backend = MemoryBackend::seeded(vec![note("a", "first"), note("b", "second")]);
        let slice = ResourceSlice::new(backend);
        let log = recorded(&slice);

        slice.fetch_list(ListQuery::page(1, 10)).await.unwrap();

        assert_eq!(
            *log.lock().unwrap(),
            vec![("pending", true), ("list_loaded", false)]
        );
        let state = slice.snapshot();
        assert_eq!(state.items.len(), 2);
        assert_eq!(state.total, 2);
        assert_eq!(state.last_query, Some(ListQuery::page(1, 10)));
    }

    #[tokio::test]
    async fn fetch_list_twice_is_idempotent() {
        let backend = MemoryBackend::seeded(vec![note("a", "first")]);
        let slice = ResourceSlice::new(backend);

        slice.fetch_list(ListQuery::page(1, 10)).await.unwrap();
        let first = slice.snapshot();
        slice.fetch_list(ListQuery::page(1, 10)).await.unwrap();
        assert_eq!(slice.snapshot(), first);
    }

    #[tokio::test]
    async fn failed_fetch_keeps_items_and_reports_message() {
        let backend = MemoryBackend::seeded(vec![note("a", "first")]);
        let slice = ResourceSlice::new(backend.clone());
        slice.fetch_list(ListQuery::default()).await.unwrap();

        backend.fail_next(ClientError::Status {
            status: 500,
            message: None,
        });
        let err = slice.fetch_list(ListQuery::page(2, 10)).await.unwrap_err();
        assert_eq!(err.message, "Failed to fetch notes");

        let state = slice.snapshot();
        assert_eq!(state.items, vec![note("a", "first")]);
        assert_eq!(state.error.as_deref(), Some("Failed to fetch notes"));
        assert!(!state.loading);

        backend.fail_next(ClientError::Status {
            status: 400,
            message: Some("Invalid page".into()),
        });
        slice.fetch_list(ListQuery::page(3, 10)).await.unwrap_err();
        assert_eq!(slice.snapshot().error.as_deref(), Some("Invalid page"));

        slice.clear_error();
        assert_eq!(slice.snapshot().error, None);
    }

    #[tokio::test]
    async fn crud_round_trip() {
        let backend = MemoryBackend::seeded(vec![note("a", "first")]);
        let slice = ResourceSlice::new(backend);
        slice.fetch_list(ListQuery::default()).await.unwrap();

        let created = slice
            .create(&NoteDraft {
                body: "fresh".into(),
            })
            .await
            .unwrap();
        let state = slice.snapshot();
        assert_eq!(state.items[0], created);
        assert_eq!(state.total, 2);

        let fetched = slice.fetch_by_id(&created.id).await.unwrap();
        assert_eq!(fetched, created);
        assert_eq!(slice.snapshot().selected, Some(created.clone()));

        let patch = NotePatch {
            pinned: Some(true),
            ..Default::default()
        };
        let updated = slice.update(&created.id, &patch).await.unwrap();
        assert!(updated.pinned);
        assert_eq!(updated.body, "fresh");
        let state = slice.snapshot();
        assert_eq!(state.items[0], updated);
        assert_eq!(state.selected, Some(updated.clone()));

        slice.remove(&created.id).await.unwrap();
        let state = slice.snapshot();
        assert_eq!(state.total, 1);
        assert_eq!(state.selected, None);

        slice.fetch_list(ListQuery::default()).await.unwrap();
        assert!(slice.snapshot().find(&created.id).is_none());
    }

    #[tokio::test]
    async fn rejected_mutation_leaves_data_untouched() {
        let backend = MemoryBackend::seeded(vec![note("a", "first")]);
        let slice = ResourceSlice::new(backend.clone());
        slice.fetch_list(ListQuery::default()).await.unwrap();
        let before = slice.snapshot();

        backend.fail_next(ClientError::Decode("eof".into()));
        let err = slice.remove("a").await.unwrap_err();
        assert_eq!(err.op, Operation::Remove);
        assert_eq!(err.message, "Failed to delete note");

        let after = slice.snapshot();
        assert_eq!(after.items, before.items);
        assert_eq!(after.total, before.total);
        assert_eq!(after.error.as_deref(), Some("Failed to delete note"));
    }

    #[test]
    fn reducer_is_idempotent_per_action() {
        let mut state = SliceState::<Note>::default();
        let created = Action::Created(note("x", "one"));
        reduce(&mut state, created.clone());
        reduce(&mut state, created);
        assert_eq!(state.items.len(), 1);
        assert_eq!(state.total, 1);

        let removed = Action::Removed("x".to_string());
        reduce(&mut state, removed.clone());
        reduce(&mut state, removed);
        assert!(state.items.is_empty());
        assert_eq!(state.total, 0);
    }

    #[test]
    fn update_of_unknown_id_is_a_no_op() {
        let mut state = SliceState::<Note>::default();
        reduce(&mut state, Action::Created(note("a", "one")));
        reduce(&mut state, Action::Pending(Operation::Update));
        reduce(&mut state, Action::Updated(note("zzz", "ghost")));
        assert_eq!(state.items, vec![note("a", "one")]);
        assert!(!state.loading);
    }

    /// Backend whose responses are released by the test: lists keyed by
    /// page, plus one pending detail fetch
    struct GatedBackend {
        gates: Mutex<HashMap<u32, oneshot::Receiver<Vec<Note>>>>,
        detail: Mutex<Option<oneshot::Receiver<Note>>>,
    }

    #[async_trait]
    impl ResourceBackend<Note> for GatedBackend {
        async fn list(&self, query: &ListQuery) -> Result<ListPage<Note>, ClientError> {
            let page = query.page.unwrap_or(1);
            let gate = self.gates.lock().unwrap().remove(&page).unwrap();
            let items = gate.await.unwrap();
            Ok(ListPage {
                total: items.len() as u64,
                items,
                pagination: Pagination {
                    page,
                    limit: 10,
                    pages: 2,
                },
            })
        }

        async fn fetch(&self, _id: &str) -> Result<Note, ClientError> {
            let gate = self.detail.lock().unwrap().take().unwrap();
            Ok(gate.await.unwrap())
        }

        async fn create(&self, _draft: &NoteDraft) -> Result<Note, ClientError> {
            unreachable!()
        }

        async fn update(&self, _id: &str, _patch: &NotePatch) -> Result<Note, ClientError> {
            unreachable!()
        }

        async fn remove(&self, _id: &str) -> Result<(), ClientError> {
            unreachable!()
        }
    }

    #[tokio::test]
    async fn superseded_list_response_is_dropped() {
        let (old_tx, old_rx) = oneshot::channel();
        let (new_tx, new_rx) = oneshot::channel();
        let backend = Arc::new(GatedBackend {
            gates: Mutex::new(HashMap::from([(1, old_rx), (2, new_rx)])),
            detail: Mutex::new(None),
        });
        let slice = ResourceSlice::new(backend);

        let release = async {
            new_tx.send(vec![note("new", "page two")]).unwrap();
            tokio::task::yield_now().await;
            old_tx.send(vec![note("old", "page one")]).unwrap();
        };
        let (older, newer, ()) = tokio::join!(
            slice.fetch_list(ListQuery::page(1, 10)),
            slice.fetch_list(ListQuery::page(2, 10)),
            release,
        );
        assert!(older.is_ok());
        assert!(newer.is_ok());

        let state = slice.snapshot();
        assert_eq!(state.items, vec![note("new", "page two")]);
        assert_eq!(state.pagination.page, 2);
        assert!(!state.loading);
    }

    #[tokio::test]
    async fn slower_detail_fetch_cannot_replace_newer_load() {
        let (tx, rx) = oneshot::channel();
        let backend = Arc::new(GatedBackend {
            gates: Mutex::new(HashMap::new()),
            detail: Mutex::new(Some(rx)),
        });
        let slice = ResourceSlice::new(backend);

        let release = async {
            tx.send(note("a", "stale")).unwrap();
        };
        let (older, newer, ()) = tokio::join!(
            slice.fetch_by_id("a"),
            slice.load_selected(async { Ok(note("a", "fresh")) }),
            release,
        );
        assert_eq!(older.unwrap().body, "stale");
        assert_eq!(newer.unwrap().body, "fresh");

        let state = slice.snapshot();
        assert_eq!(state.selected, Some(note("a", "fresh")));
        assert!(!state.loading);
    }

    #[tokio::test]
    async fn unreachable_server_uses_fallback_message() {
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };
        let client = crate::api::ApiClient::new(&format!("http://127.0.0.1:{port}")).unwrap();
        let slice = ResourceSlice::<Note>::new(Arc::new(client));

        let err = slice.fetch_list(ListQuery::page(1, 10)).await.unwrap_err();

        assert_eq!(err.message, "Failed to fetch notes");
        let state = slice.snapshot();
        assert_eq!(state.error.as_deref(), Some("Failed to fetch notes"));
        assert!(state.items.is_empty());
        assert!(!state.loading);
    }
}
