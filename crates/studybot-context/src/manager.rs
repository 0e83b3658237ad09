//! Context lifecycle management.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use tracing::debug;

use crate::context::{ContextUpdate, UserContext};

/// Default expiry window for idle contexts.
pub const DEFAULT_EXPIRY: Duration = Duration::from_secs(600);

/// A stored record plus its expiry bookkeeping.
///
/// The timestamp lives outside [`UserContext`] so it can never leak to
/// callers: `get` clones only the context.
#[derive(Debug)]
struct Entry {
    ctx: UserContext,
    last_updated: Instant,
}

/// Owns all per-user conversational state.
///
/// Expiry is evaluated lazily on read; there is no background sweep. The
/// manager itself is not thread-safe: the dialog engine owns it behind a
/// `tokio::sync::RwLock`, and concurrent turns for the same user resolve
/// last-writer-wins.
pub struct ContextManager {
    contexts: HashMap<String, Entry>,
    expiry: Duration,
}

impl ContextManager {
    /// Creates a manager with the default 600 s expiry window.
    pub fn new() -> Self {
        Self::with_expiry(DEFAULT_EXPIRY)
    }

    /// Creates a manager with a custom expiry window.
    pub fn with_expiry(expiry: Duration) -> Self {
        Self {
            contexts: HashMap::new(),
            expiry,
        }
    }

    /// Merge a partial update into a user's context, creating the record on
    /// first use and refreshing its expiry timestamp.
    pub fn set(&mut self, user_id: &str, update: ContextUpdate) {
        let entry = self
            .contexts
            .entry(user_id.to_string())
            .or_insert_with(|| Entry {
                ctx: UserContext::default(),
                last_updated: Instant::now(),
            });
        update.apply(&mut entry.ctx);
        entry.last_updated = Instant::now();
    }

    /// Get a copy of a user's context.
    ///
    /// An expired record is physically removed and `None` returned; a context
    /// is never handed out past its expiry. The returned clone cannot mutate
    /// internal state.
    pub fn get(&mut self, user_id: &str) -> Option<UserContext> {
        let expired = match self.contexts.get(user_id) {
            None => return None,
            Some(entry) => entry.last_updated.elapsed() > self.expiry,
        };

        if expired {
            debug!(user_id = %user_id, "Context expired, removing");
            self.contexts.remove(user_id);
            return None;
        }

        self.contexts.get(user_id).map(|e| e.ctx.clone())
    }

    /// Mutate an existing record in place, refreshing its timestamp.
    ///
    /// Silent no-op returning `false` when the user has no record: `update`
    /// never creates state, callers that need create-on-write use
    /// [`set`](Self::set).
    pub fn update<F>(&mut self, user_id: &str, f: F) -> bool
    where
        F: FnOnce(&mut UserContext),
    {
        match self.contexts.get_mut(user_id) {
            Some(entry) => {
                f(&mut entry.ctx);
                entry.last_updated = Instant::now();
                true
            }
            None => false,
        }
    }

    /// Remove a user's context unconditionally.
    pub fn clear(&mut self, user_id: &str) {
        self.contexts.remove(user_id);
    }

    /// Number of live records (expired ones may still be counted until read).
    pub fn len(&self) -> usize {
        self.contexts.len()
    }

    /// Whether any records exist.
    pub fn is_empty(&self) -> bool {
        self.contexts.is_empty()
    }
}

impl Default for ContextManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::Flow;
    use studybot_nlp::{EntityBag, Intent};

    #[test]
    fn test_set_then_get() {
        let mut manager = ContextManager::new();
        manager.set(
            "u1",
            ContextUpdate::classification(Intent::Greeting, 0.14, EntityBag::new()),
        );

        let ctx = manager.get("u1").unwrap();
        assert_eq!(ctx.last_intent, Some(Intent::Greeting));
        assert_eq!(ctx.last_confidence, 0.14);
    }

    #[test]
    fn test_set_merges_across_calls() {
        let mut manager = ContextManager::new();
        manager.set(
            "u1",
            ContextUpdate {
                last_intent: Some(Some(Intent::CourseInfo)),
                ..ContextUpdate::default()
            },
        );
        manager.set(
            "u1",
            ContextUpdate {
                current_course: Some(Some("IS621".to_string())),
                ..ContextUpdate::default()
            },
        );

        let ctx = manager.get("u1").unwrap();
        assert_eq!(ctx.last_intent, Some(Intent::CourseInfo));
        assert_eq!(ctx.current_course.as_deref(), Some("IS621"));
    }

    #[test]
    fn test_get_missing_user() {
        let mut manager = ContextManager::new();
        assert!(manager.get("nobody").is_none());
    }

    #[test]
    fn test_expired_context_removed() {
        let mut manager = ContextManager::with_expiry(Duration::from_millis(20));
        manager.set("u1", ContextUpdate::new());
        assert_eq!(manager.len(), 1);

        std::thread::sleep(Duration::from_millis(40));

        assert!(manager.get("u1").is_none());
        // Physically removed, not just hidden.
        assert_eq!(manager.len(), 0);
    }

    #[test]
    fn test_set_refreshes_expiry() {
        let mut manager = ContextManager::with_expiry(Duration::from_millis(60));
        manager.set("u1", ContextUpdate::new());

        std::thread::sleep(Duration::from_millis(40));
        manager.set("u1", ContextUpdate::new());
        std::thread::sleep(Duration::from_millis(40));

        // Only 40ms since last touch; still alive.
        assert!(manager.get("u1").is_some());
    }

    #[test]
    fn test_update_existing() {
        let mut manager = ContextManager::new();
        manager.set("u1", ContextUpdate::new());

        let applied = manager.update("u1", |ctx| ctx.enter_flow(Flow::CourseInfo, 1));
        assert!(applied);

        let ctx = manager.get("u1").unwrap();
        assert_eq!(ctx.active_flow, Some(Flow::CourseInfo));
        assert_eq!(ctx.active_step, Some(1));
    }

    #[test]
    fn test_update_missing_is_noop() {
        let mut manager = ContextManager::new();
        let applied = manager.update("nobody", |ctx| ctx.enter_flow(Flow::Grades, 1));
        assert!(!applied);
        assert!(manager.get("nobody").is_none());
    }

    #[test]
    fn test_clear() {
        let mut manager = ContextManager::new();
        manager.set("u1", ContextUpdate::new());
        manager.clear("u1");
        assert!(manager.get("u1").is_none());
    }

    #[test]
    fn test_get_returns_copy() {
        let mut manager = ContextManager::new();
        manager.set("u1", ContextUpdate::new());

        let mut ctx = manager.get("u1").unwrap();
        ctx.current_course = Some("IS625".to_string());

        // Mutating the copy did not touch the stored record.
        assert_eq!(manager.get("u1").unwrap().current_course, None);
    }
}
