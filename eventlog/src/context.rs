//! Task-scoped context tags.
//!
//! Every emitted record carries a snapshot of the tags of the logical task
//! that emitted it (request ids, user ids, ...). A [`TaskContext`] is an
//! explicit handle to one such tag map; the free functions in this module
//! operate on whichever context is current.
//!
//! # Resolving the current context
//!
//! 1. The innermost synchronous [`TaskContext::scope`] on this thread.
//! 2. The tokio task-local context installed by
//!    [`TaskContext::scope_async`] (or [`spawn`]).
//! 3. Inside a tokio task running without a scope, a context owned by that
//!    task id.
//! 4. The calling thread's own root context.
//!
//! Nested calls in the same flow therefore see the same tags without any
//! parameter passing, while unrelated threads and unrelated concurrent
//! tasks each see their own map.
//!
//! An unscoped task's context is created on its first write and released
//! once the task empties it again ([`clear`], [`remove`] or a dropped
//! [`TagGuard`]). At most [`MAX_UNSCOPED_TASKS`] are retained; past that the
//! oldest is evicted. Tasks that outlive their tags should run under
//! [`TaskContext::scope_async`] instead.
//!
//! # Example
//!
//! ```
//! use eventlog::context::{self, TaskContext};
//!
//! let request = TaskContext::new();
//! request.scope(|| {
//!     context::put("requestId", "REQ-1");
//!     assert_eq!(context::get("requestId").as_deref(), Some("REQ-1"));
//! });
//! assert!(context::get("requestId").is_none());
//! ```

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

use dashmap::DashMap;
use parking_lot::RwLock;
use tokio::task::{self, JoinHandle};

/// Snapshot of context tags, sorted by key.
pub type ContextTags = BTreeMap<String, String>;

tokio::task_local! {
    static TASK_CONTEXT: TaskContext;
}

/// Upper bound on retained contexts of unscoped tokio tasks.
pub const MAX_UNSCOPED_TASKS: usize = 4096;

struct UnscopedTask {
    sequence: u64,
    context: TaskContext,
}

static UNSCOPED_TASKS: OnceLock<DashMap<task::Id, UnscopedTask>> = OnceLock::new();
static UNSCOPED_SEQUENCE: AtomicU64 = AtomicU64::new(0);

fn unscoped_tasks() -> &'static DashMap<task::Id, UnscopedTask> {
    UNSCOPED_TASKS.get_or_init(DashMap::new)
}

/// Context of the unscoped task `id`, created on first use.
fn unscoped_task_context(id: task::Id) -> TaskContext {
    let tasks = unscoped_tasks();
    if let Some(existing) = tasks.get(&id) {
        return existing.context.clone();
    }
    if tasks.len() >= MAX_UNSCOPED_TASKS {
        evict_oldest_unscoped(tasks);
    }
    tasks
        .entry(id)
        .or_insert_with(|| UnscopedTask {
            sequence: UNSCOPED_SEQUENCE.fetch_add(1, Ordering::Relaxed),
            context: TaskContext::new(),
        })
        .context
        .clone()
}

fn evict_oldest_unscoped(tasks: &DashMap<task::Id, UnscopedTask>) {
    let oldest = tasks
        .iter()
        .min_by_key(|entry| entry.sequence)
        .map(|entry| *entry.key());
    if let Some(id) = oldest {
        tasks.remove(&id);
    }
}

/// Drop the unscoped-task entry that owns `context` once it holds no tags.
fn release_if_unscoped(context: &TaskContext) {
    let Some(id) = task::try_id() else {
        return;
    };
    if let Some(tasks) = UNSCOPED_TASKS.get() {
        tasks.remove_if(&id, |_, entry| {
            entry.context.same_task(context) && entry.context.is_empty()
        });
    }
}

/// Where the current context comes from.
enum Resolved {
    Context(TaskContext),
    /// Unscoped tokio task; its context may not exist yet
    UnscopedTask(task::Id),
}

fn resolve() -> Resolved {
    if let Some(scoped) = SYNC_SCOPES.with(|scopes| scopes.borrow().last().cloned()) {
        return Resolved::Context(scoped);
    }
    if let Ok(installed) = TASK_CONTEXT.try_with(TaskContext::clone) {
        return Resolved::Context(installed);
    }
    if let Some(id) = task::try_id() {
        return Resolved::UnscopedTask(id);
    }
    Resolved::Context(THREAD_ROOT.with(TaskContext::clone))
}

/// The current context if one exists, without creating an unscoped-task
/// entry.
fn lookup() -> Option<TaskContext> {
    match resolve() {
        Resolved::Context(context) => Some(context),
        Resolved::UnscopedTask(id) => unscoped_tasks()
            .get(&id)
            .map(|entry| entry.context.clone()),
    }
}

thread_local! {
    static THREAD_ROOT: TaskContext = TaskContext::new();
    static SYNC_SCOPES: RefCell<Vec<TaskContext>> = const { RefCell::new(Vec::new()) };
}

/// Handle to the tag map of one logical task.
///
/// Clones share the same map. Use [`TaskContext::fork`] for an independent
/// copy.
#[derive(Clone, Default)]
pub struct TaskContext {
    tags: Arc<RwLock<ContextTags>>,
}

impl TaskContext {
    /// Create an empty context.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a context pre-populated with `tags`.
    pub fn with_tags<I, K, V>(tags: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let map = tags
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self {
            tags: Arc::new(RwLock::new(map)),
        }
    }

    /// The context of the calling task.
    pub fn current() -> Self {
        match resolve() {
            Resolved::Context(context) => context,
            Resolved::UnscopedTask(id) => unscoped_task_context(id),
        }
    }

    /// Run `f` with this context as the current one on this thread.
    pub fn scope<R>(&self, f: impl FnOnce() -> R) -> R {
        SYNC_SCOPES.with(|scopes| scopes.borrow_mut().push(self.clone()));
        let _pop = PopScope;
        f()
    }

    /// Run `future` with this context as the current one for the task.
    ///
    /// The context follows the future across `.await` points and worker
    /// threads.
    pub async fn scope_async<F: Future>(self, future: F) -> F::Output {
        TASK_CONTEXT.scope(self, future).await
    }

    /// Independent copy of the current tags.
    pub fn fork(&self) -> Self {
        Self {
            tags: Arc::new(RwLock::new(self.tags.read().clone())),
        }
    }

    /// Whether both handles share one tag map.
    pub fn same_task(&self, other: &TaskContext) -> bool {
        Arc::ptr_eq(&self.tags, &other.tags)
    }

    /// Set `key` to `value`.
    pub fn put(&self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.tags.write().insert(key.into(), value.into())
    }

    /// Value of `key`, if set.
    pub fn get(&self, key: &str) -> Option<String> {
        self.tags.read().get(key).cloned()
    }

    /// Remove `key`, returning its previous value.
    pub fn remove(&self, key: &str) -> Option<String> {
        self.tags.write().remove(key)
    }

    /// Remove every tag.
    pub fn clear(&self) {
        self.tags.write().clear();
    }

    /// Copy of all tags.
    pub fn snapshot(&self) -> ContextTags {
        self.tags.read().clone()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.read().is_empty()
    }

    pub fn len(&self) -> usize {
        self.tags.read().len()
    }
}

impl fmt::Debug for TaskContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskContext")
            .field("tags", &*self.tags.read())
            .finish()
    }
}

/// Pops the innermost synchronous scope, also when unwinding.
struct PopScope;

impl Drop for PopScope {
    fn drop(&mut self) {
        SYNC_SCOPES.with(|scopes| {
            scopes.borrow_mut().pop();
        });
    }
}

/// Set a tag on the current context.
pub fn put(key: impl Into<String>, value: impl Into<String>) {
    TaskContext::current().put(key, value);
}

/// Read a tag from the current context.
pub fn get(key: &str) -> Option<String> {
    lookup()?.get(key)
}

/// Remove a tag from the current context.
pub fn remove(key: &str) -> Option<String> {
    let context = lookup()?;
    let previous = context.remove(key);
    release_if_unscoped(&context);
    previous
}

/// Remove all tags from the current context only.
pub fn clear() {
    if let Some(context) = lookup() {
        context.clear();
        release_if_unscoped(&context);
    }
}

/// Snapshot of the current context's tags.
pub fn snapshot() -> ContextTags {
    lookup().map(|context| context.snapshot()).unwrap_or_default()
}

/// Set a tag that is removed again (or its previous value restored) when
/// the returned guard drops.
#[must_use = "the tag is removed as soon as the guard is dropped"]
pub fn put_scoped(key: impl Into<String>, value: impl Into<String>) -> TagGuard {
    let context = TaskContext::current();
    let key = key.into();
    let previous = context.put(key.clone(), value);
    TagGuard {
        context,
        key,
        previous,
    }
}

/// Guard returned by [`put_scoped`].
pub struct TagGuard {
    context: TaskContext,
    key: String,
    previous: Option<String>,
}

impl Drop for TagGuard {
    fn drop(&mut self) {
        match self.previous.take() {
            Some(previous) => {
                self.context.put(std::mem::take(&mut self.key), previous);
            }
            None => {
                self.context.remove(&self.key);
                release_if_unscoped(&self.context);
            }
        }
    }
}

/// Spawn a tokio task that starts with a copy of the caller's tags.
///
/// Tags set inside the spawned task stay in it.
pub fn spawn<F>(future: F) -> JoinHandle<F::Output>
where
    F: Future + Send + 'static,
    F::Output: Send + 'static,
{
    let context = lookup().map(|parent| parent.fork()).unwrap_or_default();
    tokio::spawn(context.scope_async(future))
}
