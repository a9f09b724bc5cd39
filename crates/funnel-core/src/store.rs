//! The funnel store: an ordered list of funnels persisted on every change.
//!
//! [`FunnelStore`] is a cheap, clonable handle (`Rc` inside). All clones
//! see the same state, which lets async tasks hold their own handle
//! while a file is being processed. State is never borrowed across an
//! await point, so overlapping [`FunnelStore::add_funnel_from_file`]
//! calls interleave freely; each appends when its processor finishes.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use uuid::Uuid;

use crate::file::FunnelFile;
use crate::processor::{FunnelProcessor, ProcessorError};
use crate::storage::{KeyValueStorage, Loaded, PersistOptions, StorageError};
use crate::storage::{encode_snapshot, load_snapshot};
use crate::types::Funnel;

type Listener = Rc<dyn Fn(&[Funnel])>;

/// Handle returned by [`FunnelStore::subscribe`], used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subscription(u64);

struct Shared<S, P> {
    funnels: RefCell<Vec<Funnel>>,
    listeners: RefCell<Vec<(Subscription, Listener)>>,
    next_subscription: Cell<u64>,
    persist_error: RefCell<Option<StorageError>>,
    storage: S,
    processor: P,
    options: PersistOptions,
}

/// Ordered funnel collection backed by a [`KeyValueStorage`] slot.
pub struct FunnelStore<S, P> {
    shared: Rc<Shared<S, P>>,
}

impl<S, P> Clone for FunnelStore<S, P> {
    fn clone(&self) -> Self {
        Self {
            shared: Rc::clone(&self.shared),
        }
    }
}

impl<S, P> PartialEq for FunnelStore<S, P> {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.shared, &other.shared)
    }
}

impl<S: KeyValueStorage, P: FunnelProcessor> FunnelStore<S, P> {
    /// Open a store, restoring any snapshot found under `options.name`.
    ///
    /// The slot is read once here. An unreadable snapshot, or one written
    /// with a different `options.version`, is logged and ignored; the
    /// store then starts empty and overwrites the slot on its first
    /// mutation.
    pub fn open(storage: S, processor: P, options: PersistOptions) -> Self {
        let funnels = hydrate(&storage, &options);
        Self {
            shared: Rc::new(Shared {
                funnels: RefCell::new(funnels),
                listeners: RefCell::new(Vec::new()),
                next_subscription: Cell::new(0),
                persist_error: RefCell::new(None),
                storage,
                processor,
                options,
            }),
        }
    }

    /// A copy of the current funnels, in insertion order.
    #[must_use]
    pub fn funnels(&self) -> Vec<Funnel> {
        self.shared.funnels.borrow().clone()
    }

    /// Look up a funnel by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<Funnel> {
        self.shared
            .funnels
            .borrow()
            .iter()
            .find(|f| f.id == id)
            .cloned()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.shared.funnels.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.shared.funnels.borrow().is_empty()
    }

    #[must_use]
    pub fn options(&self) -> &PersistOptions {
        &self.shared.options
    }

    #[must_use]
    pub fn storage(&self) -> &S {
        &self.shared.storage
    }

    /// The error from the most recent write, if it failed.
    ///
    /// Each write replaces the whole snapshot, so `None` means the slot
    /// holds the current state (or nothing has been written yet).
    #[must_use]
    pub fn last_persist_error(&self) -> Option<StorageError> {
        self.shared.persist_error.borrow().clone()
    }

    /// Append a fully formed funnel.
    ///
    /// The caller is responsible for the id; no uniqueness check is made.
    pub fn add_funnel(&self, funnel: Funnel) {
        self.commit(|funnels| {
            funnels.push(funnel);
            true
        });
    }

    /// Remove the funnel(s) with the given id.
    ///
    /// Returns `true` if anything was removed. An unknown id leaves the
    /// store untouched and is not an error.
    pub fn remove_funnel(&self, id: &str) -> bool {
        self.commit(|funnels| {
            let before = funnels.len();
            funnels.retain(|f| f.id != id);
            funnels.len() != before
        })
    }

    /// Parse `file` with the store's processor and append the result
    /// under a freshly minted id.
    ///
    /// Resolves with the new id.
    ///
    /// # Errors
    ///
    /// Returns the processor's error unchanged, after logging it. The
    /// store is not modified in that case.
    #[allow(clippy::future_not_send)] // single-threaded; the store is !Send
    pub async fn add_funnel_from_file(&self, file: &FunnelFile) -> Result<String, ProcessorError> {
        let parsed = self
            .shared
            .processor
            .read_funnel_from_file(file)
            .await
            .inspect_err(|e| {
                tracing::error!(file = %file.name, error = %e, "failed to read funnel from file");
            })?;

        let id = self.mint_id();
        tracing::info!(file = %file.name, %id, name = %parsed.data.name, "funnel added from file");
        self.add_funnel(Funnel::new(id.clone(), parsed.data));
        Ok(id)
    }

    /// Register a callback run with the full list after every change.
    pub fn subscribe(&self, listener: impl Fn(&[Funnel]) + 'static) -> Subscription {
        let subscription = Subscription(self.shared.next_subscription.get());
        self.shared.next_subscription.set(subscription.0 + 1);
        self.shared
            .listeners
            .borrow_mut()
            .push((subscription, Rc::new(listener)));
        subscription
    }

    /// Remove a callback. Unknown subscriptions are ignored.
    ///
    /// Takes effect immediately, even from inside a running listener.
    pub fn unsubscribe(&self, subscription: Subscription) {
        self.shared
            .listeners
            .borrow_mut()
            .retain(|(s, _)| *s != subscription);
    }

    /// Replace in-memory state with whatever the storage slot holds now.
    ///
    /// Listeners are notified; nothing is written back.
    pub fn rehydrate(&self) {
        let funnels = hydrate(&self.shared.storage, &self.shared.options);
        self.shared.funnels.replace(funnels);
        self.notify();
    }

    /// Delete the storage slot. In-memory state is kept and will be
    /// written again on the next change.
    ///
    /// # Errors
    ///
    /// Returns the backend's error if the slot cannot be removed.
    pub fn clear_storage(&self) -> Result<(), StorageError> {
        self.shared.storage.remove_item(&self.shared.options.name)
    }

    /// Apply `change`; if it reports a modification, persist and notify.
    fn commit(&self, change: impl FnOnce(&mut Vec<Funnel>) -> bool) -> bool {
        let snapshot = {
            let mut funnels = self.shared.funnels.borrow_mut();
            if !change(&mut *funnels) {
                return false;
            }
            funnels.clone()
        };
        self.persist(&snapshot);
        self.notify();
        true
    }

    /// Write the full state. Failures are logged; the in-memory change stands.
    fn persist(&self, funnels: &[Funnel]) {
        let options = &self.shared.options;
        let written = encode_snapshot(funnels, options.version)
            .and_then(|encoded| self.shared.storage.set_item(&options.name, &encoded));
        if let Err(e) = &written {
            tracing::warn!(key = %options.name, error = %e, "failed to persist funnels");
        }
        self.shared.persist_error.replace(written.err());
    }

    /// Run the listeners registered when the call starts.
    ///
    /// No borrow is held while a listener runs, so listeners may
    /// subscribe, unsubscribe, or mutate the store. Each call reads the
    /// current list; a listener that ran before a nested mutation has
    /// already seen the newer list from the nested call.
    fn notify(&self) {
        let running: Vec<_> = self.shared.listeners.borrow().clone();
        for (subscription, listener) in running {
            let still_subscribed = self
                .shared
                .listeners
                .borrow()
                .iter()
                .any(|(s, _)| *s == subscription);
            if still_subscribed {
                listener(&self.funnels());
            }
        }
    }

    /// A v4 UUID not used by any current funnel.
    fn mint_id(&self) -> String {
        let funnels = self.shared.funnels.borrow();
        loop {
            let id = Uuid::new_v4().to_string();
            if !funnels.iter().any(|f| f.id == id) {
                return id;
            }
        }
    }
}

fn hydrate<S: KeyValueStorage>(storage: &S, options: &PersistOptions) -> Vec<Funnel> {
    match load_snapshot(storage, options) {
        Ok(Loaded::Funnels(funnels)) => {
            tracing::debug!(key = %options.name, count = funnels.len(), "restored funnels");
            funnels
        }
        Ok(Loaded::Missing) => Vec::new(),
        Ok(Loaded::VersionMismatch { stored }) => {
            tracing::warn!(
                key = %options.name,
                stored,
                expected = options.version,
                "discarding funnels stored under another version"
            );
            Vec::new()
        }
        Err(e) => {
            tracing::warn!(key = %options.name, error = %e, "discarding unreadable stored funnels");
            Vec::new()
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::{HashMap, HashSet};
    use std::future::Future;

    use futures::channel::oneshot;
    use futures::executor::{LocalPool, block_on};
    use futures::task::LocalSpawnExt;

    use super::*;
    use crate::processor::{JsonFunnelProcessor, ParsedFunnel};
    use crate::storage::MemoryStorage;
    use crate::types::FunnelContent;

    type JsonStore = FunnelStore<MemoryStorage, JsonFunnelProcessor>;

    fn open(storage: &MemoryStorage) -> JsonStore {
        FunnelStore::open(
            storage.clone(),
            JsonFunnelProcessor,
            PersistOptions::default(),
        )
    }

    fn funnel(id: &str) -> Funnel {
        Funnel::new(
            id.into(),
            FunnelContent {
                name: format!("funnel {id}"),
                ..FunnelContent::default()
            },
        )
    }

    fn json_file(name: &str) -> FunnelFile {
        FunnelFile::new(
            format!("{name}.json"),
            format!(r#"{{ "name": "{name}", "pages": [ {{ "id": "p1" }} ] }}"#).into_bytes(),
        )
    }

    fn ids(store: &FunnelStore<impl KeyValueStorage, impl FunnelProcessor>) -> Vec<String> {
        store.funnels().into_iter().map(|f| f.id).collect()
    }

    /// Rejects every file with a fixed error.
    struct FailingProcessor;

    impl FunnelProcessor for FailingProcessor {
        fn read_funnel_from_file(
            &self,
            file: &FunnelFile,
        ) -> impl Future<Output = Result<ParsedFunnel, ProcessorError>> {
            std::future::ready(Err(ProcessorError::InvalidFileType {
                name: file.name.clone(),
            }))
        }
    }

    /// Memory storage whose writes can be made to fail.
    #[derive(Clone, Default)]
    struct FlakyStorage {
        inner: MemoryStorage,
        failing: Rc<Cell<bool>>,
    }

    impl KeyValueStorage for FlakyStorage {
        fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
            self.inner.get_item(key)
        }

        fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
            if self.failing.get() {
                return Err(StorageError::Backend("quota exceeded".into()));
            }
            self.inner.set_item(key, value)
        }

        fn remove_item(&self, key: &str) -> Result<(), StorageError> {
            self.inner.remove_item(key)
        }
    }

    /// Parses JSON, but only once the file's gate has been opened.
    #[derive(Default)]
    struct GatedProcessor {
        gates: RefCell<HashMap<String, oneshot::Receiver<()>>>,
    }

    impl GatedProcessor {
        fn gate(&self, name: &str) -> oneshot::Sender<()> {
            let (tx, rx) = oneshot::channel();
            self.gates.borrow_mut().insert(name.to_owned(), rx);
            tx
        }
    }

    impl FunnelProcessor for GatedProcessor {
        fn read_funnel_from_file(
            &self,
            file: &FunnelFile,
        ) -> impl Future<Output = Result<ParsedFunnel, ProcessorError>> {
            let gate = self.gates.borrow_mut().remove(&file.name);
            let file = file.clone();
            async move {
                if let Some(gate) = gate {
                    let _ = gate.await;
                }
                JsonFunnelProcessor::parse(&file)
            }
        }
    }

    #[test]
    fn starts_empty_without_snapshot() {
        let store = open(&MemoryStorage::new());
        assert!(store.is_empty());
        assert_eq!(store.options().name, "funnel-sandbox");
    }

    #[test]
    fn add_then_remove_restores_original() {
        let store = open(&MemoryStorage::new());
        store.add_funnel(funnel("a"));
        assert_eq!(ids(&store), ["a"]);
        assert!(store.remove_funnel("a"));
        assert!(store.is_empty());
    }

    #[test]
    fn add_preserves_insertion_order_and_allows_duplicates() {
        let store = open(&MemoryStorage::new());
        store.add_funnel(funnel("b"));
        store.add_funnel(funnel("a"));
        store.add_funnel(funnel("b"));
        assert_eq!(ids(&store), ["b", "a", "b"]);

        // Every record with the id goes.
        store.remove_funnel("b");
        assert_eq!(ids(&store), ["a"]);
    }

    #[test]
    fn remove_unknown_id_is_noop() {
        let storage = MemoryStorage::new();
        let store = open(&storage);
        store.add_funnel(funnel("a"));
        let before = storage.get_item("funnel-sandbox").unwrap();

        assert!(!store.remove_funnel("missing"));
        assert_eq!(ids(&store), ["a"]);
        assert_eq!(storage.get_item("funnel-sandbox").unwrap(), before);
    }

    #[test]
    fn every_mutation_is_persisted() {
        let storage = MemoryStorage::new();
        let store = open(&storage);
        store.add_funnel(funnel("a"));
        store.add_funnel(funnel("b"));
        assert_eq!(ids(&open(&storage)), ["a", "b"]);

        store.remove_funnel("a");
        assert_eq!(ids(&open(&storage)), ["b"]);
    }

    #[test]
    fn from_file_appends_with_fresh_unique_id() {
        let store = open(&MemoryStorage::new());
        store.add_funnel(funnel("existing"));
        let before: HashSet<String> = ids(&store).into_iter().collect();

        let id = block_on(store.add_funnel_from_file(&json_file("demo"))).unwrap();

        assert!(!before.contains(&id));
        assert_eq!(store.len(), 2);
        let added = store.get(&id).unwrap();
        assert_eq!(added.content.name, "demo");
        assert_eq!(store.funnels().last().unwrap().id, id);
        assert!(Uuid::parse_str(&id).is_ok());
    }

    #[test]
    fn from_file_failure_surfaces_error_and_keeps_state() {
        let storage = MemoryStorage::new();
        let store = FunnelStore::open(storage.clone(), FailingProcessor, PersistOptions::default());
        store.add_funnel(funnel("a"));

        let err = block_on(store.add_funnel_from_file(&json_file("demo"))).unwrap_err();

        assert_eq!(
            err,
            ProcessorError::InvalidFileType {
                name: "demo.json".into()
            }
        );
        assert_eq!(ids(&store), ["a"]);
    }

    #[test]
    fn from_file_parse_error_propagates_unchanged() {
        let store = open(&MemoryStorage::new());
        let file = FunnelFile::new("broken.json", b"{ nope".to_vec());
        let expected = JsonFunnelProcessor::parse(&file).unwrap_err();

        let err = block_on(store.add_funnel_from_file(&file)).unwrap_err();
        assert_eq!(err, expected);
        assert!(store.is_empty());
    }

    #[test]
    fn overlapping_imports_append_in_completion_order() {
        let processor = GatedProcessor::default();
        let open_first = processor.gate("first.json");
        let open_second = processor.gate("second.json");
        let store = FunnelStore::open(MemoryStorage::new(), processor, PersistOptions::default());

        let mut pool = LocalPool::new();
        let spawner = pool.spawner();
        let resolved = Rc::new(RefCell::new(Vec::new()));
        for name in ["first", "second"] {
            let store = store.clone();
            let resolved = Rc::clone(&resolved);
            spawner
                .spawn_local(async move {
                    let id = store.add_funnel_from_file(&json_file(name)).await.unwrap();
                    resolved.borrow_mut().push(id);
                })
                .unwrap();
        }

        pool.run_until_stalled();
        assert!(store.is_empty(), "both imports should be suspended");

        open_second.send(()).unwrap();
        pool.run_until_stalled();
        open_first.send(()).unwrap();
        pool.run_until_stalled();

        let names: Vec<String> = store
            .funnels()
            .into_iter()
            .map(|f| f.content.name)
            .collect();
        assert_eq!(names, ["second", "first"]);

        let resolved = resolved.borrow();
        assert_eq!(resolved.len(), 2);
        assert_ne!(resolved[0], resolved[1]);
        assert_eq!(*resolved, ids(&store));
    }

    #[test]
    fn subscribers_see_each_change_until_unsubscribed() {
        let store = open(&MemoryStorage::new());
        let seen = Rc::new(RefCell::new(Vec::new()));
        let subscription = {
            let seen = Rc::clone(&seen);
            store.subscribe(move |funnels| seen.borrow_mut().push(funnels.len()))
        };

        store.add_funnel(funnel("a"));
        store.add_funnel(funnel("b"));
        store.remove_funnel("zzz");
        store.remove_funnel("a");
        store.unsubscribe(subscription);
        store.add_funnel(funnel("c"));

        assert_eq!(*seen.borrow(), [1, 2, 1]);
    }

    #[test]
    fn listener_may_subscribe_during_notification() {
        let store = open(&MemoryStorage::new());
        let inner_calls = Rc::new(Cell::new(0));
        {
            let handle = store.clone();
            let inner_calls = Rc::clone(&inner_calls);
            store.subscribe(move |_| {
                let inner_calls = Rc::clone(&inner_calls);
                handle.subscribe(move |_| inner_calls.set(inner_calls.get() + 1));
            });
        }

        store.add_funnel(funnel("a"));
        assert_eq!(inner_calls.get(), 0);
        store.add_funnel(funnel("b"));
        assert_eq!(inner_calls.get(), 1);
    }

    #[test]
    fn listener_mutation_reaches_later_listeners() {
        let store = open(&MemoryStorage::new());
        {
            let handle = store.clone();
            store.subscribe(move |funnels| {
                if funnels.iter().map(|f| f.id.as_str()).eq(["a"]) {
                    handle.add_funnel(funnel("auto"));
                }
            });
        }
        let mirror = Rc::new(RefCell::new(Vec::new()));
        {
            let mirror = Rc::clone(&mirror);
            store.subscribe(move |funnels| {
                *mirror.borrow_mut() = funnels.iter().map(|f| f.id.clone()).collect();
            });
        }

        store.add_funnel(funnel("a"));

        assert_eq!(ids(&store), ["a", "auto"]);
        assert_eq!(*mirror.borrow(), ["a", "auto"]);
        assert_eq!(ids(&open(store.storage())), ["a", "auto"]);
    }

    #[test]
    fn listener_may_unsubscribe_itself() {
        let store = open(&MemoryStorage::new());
        let calls = Rc::new(Cell::new(0));
        let own = Rc::new(Cell::new(None));
        let subscription = {
            let handle = store.clone();
            let calls = Rc::clone(&calls);
            let own = Rc::clone(&own);
            store.subscribe(move |_| {
                calls.set(calls.get() + 1);
                if let Some(subscription) = own.get() {
                    handle.unsubscribe(subscription);
                }
            })
        };
        own.set(Some(subscription));

        store.add_funnel(funnel("a"));
        store.add_funnel(funnel("b"));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn listener_unsubscribed_mid_notification_is_skipped() {
        let store = open(&MemoryStorage::new());
        let later = Rc::new(Cell::new(None));
        let later_calls = Rc::new(Cell::new(0));
        {
            let handle = store.clone();
            let later = Rc::clone(&later);
            store.subscribe(move |_| {
                if let Some(subscription) = later.get() {
                    handle.unsubscribe(subscription);
                }
            });
        }
        let subscription = {
            let later_calls = Rc::clone(&later_calls);
            store.subscribe(move |_| later_calls.set(later_calls.get() + 1))
        };
        later.set(Some(subscription));

        store.add_funnel(funnel("a"));
        assert_eq!(later_calls.get(), 0);
    }

    #[test]
    fn failed_write_is_reported_until_a_write_succeeds() {
        let storage = FlakyStorage::default();
        let store = FunnelStore::open(
            storage.clone(),
            JsonFunnelProcessor,
            PersistOptions::default(),
        );
        assert_eq!(store.last_persist_error(), None);

        storage.failing.set(true);
        store.add_funnel(funnel("a"));
        assert_eq!(ids(&store), ["a"]);
        assert!(matches!(store.last_persist_error(), Some(StorageError::Backend(_))));
        assert_eq!(storage.inner.get_item("funnel-sandbox").unwrap(), None);

        storage.failing.set(false);
        store.add_funnel(funnel("b"));
        assert_eq!(store.last_persist_error(), None);
        assert_eq!(ids(&open(&storage.inner)), ["a", "b"]);
    }

    #[test]
    fn version_mismatch_starts_empty_and_overwrites() {
        let storage = MemoryStorage::new();
        open(&storage).add_funnel(funnel("old"));

        let options = PersistOptions {
            version: 1,
            ..PersistOptions::default()
        };
        let store = FunnelStore::open(storage.clone(), JsonFunnelProcessor, options.clone());
        assert!(store.is_empty());

        store.add_funnel(funnel("new"));
        let reopened = FunnelStore::open(storage, JsonFunnelProcessor, options);
        assert_eq!(ids(&reopened), ["new"]);
    }

    #[test]
    fn unreadable_snapshot_starts_empty() {
        let storage = MemoryStorage::new();
        storage.set_item("funnel-sandbox", "{").unwrap();
        assert!(open(&storage).is_empty());
    }

    #[test]
    fn rehydrate_picks_up_external_writes() {
        let storage = MemoryStorage::new();
        let store = open(&storage);
        let other = open(&storage);
        other.add_funnel(funnel("from-elsewhere"));

        assert!(store.is_empty());
        store.rehydrate();
        assert_eq!(ids(&store), ["from-elsewhere"]);
    }

    #[test]
    fn clear_storage_keeps_memory_until_next_write() {
        let storage = MemoryStorage::new();
        let store = open(&storage);
        store.add_funnel(funnel("a"));

        store.clear_storage().unwrap();
        assert_eq!(storage.get_item("funnel-sandbox").unwrap(), None);
        assert_eq!(ids(&store), ["a"]);

        store.add_funnel(funnel("b"));
        assert_eq!(ids(&open(&storage)), ["a", "b"]);
    }

    #[test]
    fn clones_share_state() {
        let store = open(&MemoryStorage::new());
        let handle = store.clone();
        handle.add_funnel(funnel("a"));
        assert_eq!(ids(&store), ["a"]);
        assert!(store == handle);
    }
}
