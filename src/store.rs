//! Moodboard persistence boundary.
//!
//! The store is an external collaborator. [`MoodboardStore`] is the whole
//! contract the pipeline relies on; it is the only place share-token
//! uniqueness is enforced.
//!
//! Two implementations ship:
//!
//! - [`MemoryStore`]: process-local, used by tests and embedding callers.
//! - [`JsonStore`]: a data directory holding `moodboards.json` and
//!   `products.json`. Every read-modify-write holds an exclusive lock on
//!   `.moodboards.lock`, so separate processes and store instances sharing a
//!   directory see each other's records. Writes go to a fresh temp file that
//!   is persisted over the target, so a crashed write never leaves a
//!   truncated file.
//!
//! Token allocation lives in [`insert_with_fresh_token`]: generate, attempt
//! insert, and on a uniqueness violation try again with a new token, up to a
//! fixed number of attempts.

use crate::token::{ShareToken, TokenSource};
use crate::types::{Moodboard, Product};
use fs2::FileExt;
use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use thiserror::Error;
use tracing::warn;
use uuid::Uuid;

/// Moodboard records file within the data directory.
const MOODBOARDS_FILENAME: &str = "moodboards.json";
/// Product catalog file within the data directory.
const PRODUCTS_FILENAME: &str = "products.json";
/// Lock file guarding writes within the data directory.
const LOCK_FILENAME: &str = ".moodboards.lock";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("share token {0} is already taken")]
    TokenTaken(ShareToken),
    #[error("moodboard id {0} already exists")]
    DuplicateId(Uuid),
    #[error("moodboard not found: {0}")]
    MoodboardNotFound(String),
    #[error("product not found: {0}")]
    ProductNotFound(String),
    #[error("could not allocate a unique share token after {attempts} attempts")]
    TokensExhausted { attempts: u32 },
    #[error("store lock poisoned")]
    Poisoned,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            StoreError::MoodboardNotFound(_) | StoreError::ProductNotFound(_)
        )
    }
}

/// Create/read operations the pipeline needs from persistence.
pub trait MoodboardStore: Sync {
    /// Persist a new record. Fails with [`StoreError::TokenTaken`] when the
    /// share token is already in use.
    fn create(&self, moodboard: Moodboard) -> Result<Moodboard, StoreError>;

    fn get_by_share_token(&self, token: &ShareToken) -> Result<Moodboard, StoreError>;

    fn get_by_id(&self, id: Uuid) -> Result<Moodboard, StoreError>;

    fn list_products(&self) -> Result<Vec<Product>, StoreError>;

    fn get_product(&self, id: &str) -> Result<Product, StoreError>;

    /// Products for `ids`, in the same order. Repeated ids repeat the product;
    /// the first unknown id fails the whole call.
    fn get_products(&self, ids: &[&str]) -> Result<Vec<Product>, StoreError> {
        ids.iter().map(|id| self.get_product(id)).collect()
    }
}

/// Persist `draft`, drawing a new share token after each collision.
///
/// The draft's own token is the first attempt, so at most `max_attempts`
/// tokens are tried in total. Only [`StoreError::TokenTaken`] is retried;
/// every other error is returned as-is.
pub fn insert_with_fresh_token(
    store: &dyn MoodboardStore,
    tokens: &dyn TokenSource,
    mut draft: Moodboard,
    max_attempts: u32,
) -> Result<Moodboard, StoreError> {
    for attempt in 1..=max_attempts {
        if attempt > 1 {
            draft.share_token = tokens.next_token();
        }
        match store.create(draft.clone()) {
            Ok(stored) => return Ok(stored),
            Err(StoreError::TokenTaken(token)) => {
                warn!(
                    target = "store::insert_with_fresh_token",
                    attempt,
                    max_attempts,
                    token = %token,
                    "share token collision; regenerating"
                );
            }
            Err(other) => return Err(other),
        }
    }
    Err(StoreError::TokensExhausted {
        attempts: max_attempts,
    })
}

// ============================================================================
// In-memory store
// ============================================================================

#[derive(Default)]
struct MemoryState {
    moodboards: Vec<Moodboard>,
    products: HashMap<String, Product>,
    product_order: Vec<String>,
}

/// Process-local store. The mutex is the uniqueness lock.
#[derive(Default)]
pub struct MemoryStore {
    state: Mutex<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_products(products: Vec<Product>) -> Self {
        let store = Self::new();
        {
            let mut state = store.state.lock().unwrap_or_else(|e| e.into_inner());
            for product in products {
                state.product_order.push(product.id.clone());
                state.products.insert(product.id.clone(), product);
            }
        }
        store
    }

    /// Number of persisted moodboards.
    pub fn len(&self) -> usize {
        self.state.lock().map(|s| s.moodboards.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl MoodboardStore for MemoryStore {
    fn create(&self, moodboard: Moodboard) -> Result<Moodboard, StoreError> {
        let mut state = self.state.lock().map_err(|_| StoreError::Poisoned)?;
        check_unique(&state.moodboards, &moodboard)?;
        state.moodboards.push(moodboard.clone());
        Ok(moodboard)
    }

    fn get_by_share_token(&self, token: &ShareToken) -> Result<Moodboard, StoreError> {
        let state = self.state.lock().map_err(|_| StoreError::Poisoned)?;
        find_by_token(&state.moodboards, token)
    }

    fn get_by_id(&self, id: Uuid) -> Result<Moodboard, StoreError> {
        let state = self.state.lock().map_err(|_| StoreError::Poisoned)?;
        find_by_id(&state.moodboards, id)
    }

    fn list_products(&self) -> Result<Vec<Product>, StoreError> {
        let state = self.state.lock().map_err(|_| StoreError::Poisoned)?;
        Ok(state
            .product_order
            .iter()
            .filter_map(|id| state.products.get(id).cloned())
            .collect())
    }

    fn get_product(&self, id: &str) -> Result<Product, StoreError> {
        let state = self.state.lock().map_err(|_| StoreError::Poisoned)?;
        state
            .products
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::ProductNotFound(id.to_string()))
    }
}

// ============================================================================
// JSON directory store
// ============================================================================

/// Store backed by JSON files in a data directory.
///
/// Missing files read as empty collections. Writers serialize on an
/// exclusive file lock, which holds across processes as well as threads.
pub struct JsonStore {
    dir: PathBuf,
}

/// Exclusive lock on the data directory, released on drop.
struct DirLock(File);

impl Drop for DirLock {
    fn drop(&mut self) {
        let _ = self.0.unlock();
    }
}

impl JsonStore {
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn lock(&self) -> Result<DirLock, StoreError> {
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(false)
            .open(self.dir.join(LOCK_FILENAME))?;
        file.lock_exclusive()?;
        Ok(DirLock(file))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn load_moodboards(&self) -> Result<Vec<Moodboard>, StoreError> {
        read_collection(&self.dir.join(MOODBOARDS_FILENAME))
    }

    fn load_products(&self) -> Result<Vec<Product>, StoreError> {
        read_collection(&self.dir.join(PRODUCTS_FILENAME))
    }

    /// Replace the product catalog. Used to seed a data directory.
    pub fn save_products(&self, products: &[Product]) -> Result<(), StoreError> {
        let _lock = self.lock()?;
        write_collection(&self.dir.join(PRODUCTS_FILENAME), products)
    }
}

impl MoodboardStore for JsonStore {
    fn create(&self, moodboard: Moodboard) -> Result<Moodboard, StoreError> {
        let _lock = self.lock()?;
        let mut moodboards = self.load_moodboards()?;
        check_unique(&moodboards, &moodboard)?;
        moodboards.push(moodboard.clone());
        write_collection(&self.dir.join(MOODBOARDS_FILENAME), &moodboards)?;
        Ok(moodboard)
    }

    fn get_by_share_token(&self, token: &ShareToken) -> Result<Moodboard, StoreError> {
        find_by_token(&self.load_moodboards()?, token)
    }

    fn get_by_id(&self, id: Uuid) -> Result<Moodboard, StoreError> {
        find_by_id(&self.load_moodboards()?, id)
    }

    fn list_products(&self) -> Result<Vec<Product>, StoreError> {
        self.load_products()
    }

    fn get_product(&self, id: &str) -> Result<Product, StoreError> {
        self.load_products()?
            .into_iter()
            .find(|p| p.id == id)
            .ok_or_else(|| StoreError::ProductNotFound(id.to_string()))
    }

    /// Reads `products.json` once for the whole batch.
    fn get_products(&self, ids: &[&str]) -> Result<Vec<Product>, StoreError> {
        let catalog: HashMap<String, Product> = self
            .load_products()?
            .into_iter()
            .map(|p| (p.id.clone(), p))
            .collect();
        ids.iter()
            .map(|id| {
                catalog
                    .get(*id)
                    .cloned()
                    .ok_or_else(|| StoreError::ProductNotFound(id.to_string()))
            })
            .collect()
    }
}

fn check_unique(existing: &[Moodboard], candidate: &Moodboard) -> Result<(), StoreError> {
    if existing
        .iter()
        .any(|m| m.share_token == candidate.share_token)
    {
        return Err(StoreError::TokenTaken(candidate.share_token.clone()));
    }
    if existing.iter().any(|m| m.id == candidate.id) {
        return Err(StoreError::DuplicateId(candidate.id));
    }
    Ok(())
}

fn find_by_token(moodboards: &[Moodboard], token: &ShareToken) -> Result<Moodboard, StoreError> {
    moodboards
        .iter()
        .find(|m| &m.share_token == token)
        .cloned()
        .ok_or_else(|| StoreError::MoodboardNotFound(format!("token {token}")))
}

fn find_by_id(moodboards: &[Moodboard], id: Uuid) -> Result<Moodboard, StoreError> {
    moodboards
        .iter()
        .find(|m| m.id == id)
        .cloned()
        .ok_or_else(|| StoreError::MoodboardNotFound(format!("id {id}")))
}

fn read_collection<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Vec<T>, StoreError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(serde_json::from_str(&content)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Vec::new()),
        Err(e) => Err(e.into()),
    }
}

fn write_collection<T: serde::Serialize>(path: &Path, items: &[T]) -> Result<(), StoreError> {
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut tmp = tempfile::Builder::new()
        .prefix(".moodboard-")
        .suffix(".tmp")
        .tempfile_in(dir)?;
    serde_json::to_writer_pretty(&mut tmp, items)?;
    tmp.flush()?;
    tmp.persist(path).map_err(|err| StoreError::Io(err.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{board, board_request, product};
    use crate::token::RandomTokens;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    /// Hands out a scripted sequence of tokens, then repeats the last one.
    struct ScriptedTokens {
        tokens: Vec<ShareToken>,
        next: AtomicUsize,
    }

    impl ScriptedTokens {
        fn new(tokens: Vec<ShareToken>) -> Self {
            Self {
                tokens,
                next: AtomicUsize::new(0),
            }
        }

        fn handed_out(&self) -> usize {
            self.next.load(Ordering::SeqCst)
        }
    }

    impl TokenSource for ScriptedTokens {
        fn next_token(&self) -> ShareToken {
            let i = self.next.fetch_add(1, Ordering::SeqCst);
            self.tokens[i.min(self.tokens.len() - 1)].clone()
        }
    }

    /// A draft carrying the first token from `tokens`, as the pipeline builds it.
    fn draft(tokens: &dyn TokenSource) -> Moodboard {
        let mut draft = board(board_request(&[]));
        draft.share_token = tokens.next_token();
        draft
    }

    // =========================================================================
    // MemoryStore
    // =========================================================================

    #[test]
    fn memory_create_and_read_back() {
        let store = MemoryStore::new();
        let stored = store.create(board(board_request(&[]))).unwrap();
        assert_eq!(store.get_by_id(stored.id).unwrap(), stored);
        assert_eq!(store.get_by_share_token(&stored.share_token).unwrap(), stored);
    }

    #[test]
    fn memory_rejects_duplicate_token() {
        let store = MemoryStore::new();
        let first = store.create(board(board_request(&[]))).unwrap();
        let mut second = board(board_request(&[]));
        second.share_token = first.share_token.clone();
        let err = store.create(second).unwrap_err();
        assert!(matches!(err, StoreError::TokenTaken(t) if t == first.share_token));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn memory_rejects_duplicate_id() {
        let store = MemoryStore::new();
        let first = store.create(board(board_request(&[]))).unwrap();
        let mut second = board(board_request(&[]));
        second.id = first.id;
        assert!(matches!(store.create(second), Err(StoreError::DuplicateId(_))));
    }

    #[test]
    fn memory_missing_records_are_not_found() {
        let store = MemoryStore::new();
        assert!(store.get_by_id(Uuid::new_v4()).unwrap_err().is_not_found());
        assert!(
            store
                .get_by_share_token(&ShareToken::generate())
                .unwrap_err()
                .is_not_found()
        );
        assert!(store.get_product("nope").unwrap_err().is_not_found());
    }

    #[test]
    fn memory_lists_products_in_seed_order() {
        let store = MemoryStore::with_products(vec![
            product("b", None, None),
            product("a", None, None),
        ]);
        let ids: Vec<String> = store.list_products().unwrap().into_iter().map(|p| p.id).collect();
        assert_eq!(ids, ["b", "a"]);
    }

    // =========================================================================
    // insert_with_fresh_token
    // =========================================================================

    #[test]
    fn fresh_token_succeeds_first_try() {
        let store = MemoryStore::new();
        let stored = insert_with_fresh_token(&store, &RandomTokens, draft(&RandomTokens), 5)
            .unwrap();
        assert_eq!(store.get_by_share_token(&stored.share_token).unwrap().id, stored.id);
    }

    #[test]
    fn fresh_token_retries_after_collision() {
        let store = MemoryStore::new();
        let taken = store.create(board(board_request(&[]))).unwrap().share_token;
        let fresh = ShareToken::generate();
        let tokens = ScriptedTokens::new(vec![taken.clone(), taken.clone(), fresh.clone()]);

        let stored = insert_with_fresh_token(&store, &tokens, draft(&tokens), 5).unwrap();
        assert_eq!(stored.share_token, fresh);
        assert_eq!(tokens.handed_out(), 3);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn fresh_token_gives_up_after_max_attempts() {
        let store = MemoryStore::new();
        let taken = store.create(board(board_request(&[]))).unwrap().share_token;
        let tokens = ScriptedTokens::new(vec![taken]);

        let err = insert_with_fresh_token(&store, &tokens, draft(&tokens), 4).unwrap_err();
        assert!(matches!(err, StoreError::TokensExhausted { attempts: 4 }));
        assert_eq!(tokens.handed_out(), 4);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn fresh_token_does_not_retry_other_errors() {
        let store = MemoryStore::new();
        let existing = store.create(board(board_request(&[]))).unwrap();
        let tokens = ScriptedTokens::new(vec![ShareToken::generate()]);
        let mut same_id = draft(&tokens);
        same_id.id = existing.id;

        let err = insert_with_fresh_token(&store, &tokens, same_id, 5).unwrap_err();
        assert!(matches!(err, StoreError::DuplicateId(_)));
        assert_eq!(tokens.handed_out(), 1);
    }

    // =========================================================================
    // JsonStore
    // =========================================================================

    #[test]
    fn json_store_empty_dir_reads_empty() {
        let tmp = TempDir::new().unwrap();
        let store = JsonStore::open(tmp.path()).unwrap();
        assert!(store.list_products().unwrap().is_empty());
        assert!(store.get_by_id(Uuid::new_v4()).unwrap_err().is_not_found());
    }

    #[test]
    fn json_store_persists_across_instances() {
        let tmp = TempDir::new().unwrap();
        let stored = {
            let store = JsonStore::open(tmp.path()).unwrap();
            store.create(board(board_request(&[]))).unwrap()
        };
        let reopened = JsonStore::open(tmp.path()).unwrap();
        assert_eq!(reopened.get_by_share_token(&stored.share_token).unwrap(), stored);
        assert!(tmp.path().join(MOODBOARDS_FILENAME).exists());
        let leftovers = std::fs::read_dir(tmp.path())
            .unwrap()
            .filter_map(Result::ok)
            .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
            .count();
        assert_eq!(leftovers, 0);
    }

    #[test]
    fn json_store_instances_on_one_dir_keep_every_record() {
        let tmp = TempDir::new().unwrap();
        let created: Vec<Moodboard> = std::thread::scope(|scope| {
            let workers: Vec<_> = (0..4)
                .map(|_| {
                    scope.spawn(|| {
                        let store = JsonStore::open(tmp.path()).unwrap();
                        (0..25)
                            .map(|_| {
                                insert_with_fresh_token(&store, &RandomTokens, draft(&RandomTokens), 5)
                                    .unwrap()
                            })
                            .collect::<Vec<_>>()
                    })
                })
                .collect();
            workers
                .into_iter()
                .flat_map(|w| w.join().unwrap())
                .collect()
        });

        let reopened = JsonStore::open(tmp.path()).unwrap();
        assert_eq!(reopened.load_moodboards().unwrap().len(), 100);
        for stored in &created {
            assert_eq!(reopened.get_by_share_token(&stored.share_token).unwrap().id, stored.id);
        }
    }

    #[test]
    fn json_store_enforces_token_uniqueness() {
        let tmp = TempDir::new().unwrap();
        let store = JsonStore::open(tmp.path()).unwrap();
        let first = store.create(board(board_request(&[]))).unwrap();
        let mut second = board(board_request(&[]));
        second.share_token = first.share_token;
        assert!(matches!(store.create(second), Err(StoreError::TokenTaken(_))));
    }

    #[test]
    fn json_store_reads_products() {
        let tmp = TempDir::new().unwrap();
        let store = JsonStore::open(tmp.path()).unwrap();
        store
            .save_products(&[product("p1", None, Some("1.5")), product("p2", None, None)])
            .unwrap();
        assert_eq!(store.list_products().unwrap().len(), 2);
        assert_eq!(store.get_product("p2").unwrap().id, "p2");
        assert!(matches!(
            store.get_product("p3"),
            Err(StoreError::ProductNotFound(_))
        ));
    }

    #[test]
    fn json_store_batch_products_keep_selection_order() {
        let tmp = TempDir::new().unwrap();
        let store = JsonStore::open(tmp.path()).unwrap();
        store
            .save_products(&[product("p1", None, None), product("p2", None, None)])
            .unwrap();
        let ids: Vec<String> = store
            .get_products(&["p2", "p1", "p2"])
            .unwrap()
            .into_iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(ids, ["p2", "p1", "p2"]);
        assert!(matches!(
            store.get_products(&["p1", "p9"]),
            Err(StoreError::ProductNotFound(id)) if id == "p9"
        ));
    }

    #[test]
    fn json_store_corrupt_file_is_error() {
        let tmp = TempDir::new().unwrap();
        std::fs::write(tmp.path().join(MOODBOARDS_FILENAME), "not json").unwrap();
        let store = JsonStore::open(tmp.path()).unwrap();
        assert!(matches!(
            store.get_by_id(Uuid::new_v4()),
            Err(StoreError::Json(_))
        ));
    }
}
