//! The in-memory prompt collection and its change notifications.
//!
//! `Library` is the only writer of the [`LibraryState`]. Every successful
//! mutation applies the change, saves through the [`Store`], then invokes
//! each subscriber in subscription order with the full new state.

use std::collections::{BTreeSet, HashSet};

use tracing::{debug, info};

use crate::error::LibraryResult;
use crate::prompt::{LibraryState, Prompt, PromptRole, PromptUpdate};
use crate::storage::Store;

/// Callback invoked after every mutation.
pub type Subscriber = Box<dyn FnMut(&LibraryState)>;

/// Handle returned by [`Library::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Aggregate counts shown in the status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LibraryStats {
    pub total: usize,
    pub favorites: usize,
    pub total_uses: u64,
}

pub struct Library {
    store: Store,
    state: LibraryState,
    subscribers: Vec<(SubscriptionId, Subscriber)>,
    next_subscription: u64,
}

impl Library {
    /// Loads the library from `store`.
    pub fn open(store: Store) -> Self {
        let state = store.load();
        Self {
            store,
            state,
            subscribers: Vec::new(),
            next_subscription: 0,
        }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn state(&self) -> &LibraryState {
        &self.state
    }

    // Subscriptions

    pub fn subscribe(&mut self, callback: impl FnMut(&LibraryState) + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.subscribers.push((id, Box::new(callback)));
        id
    }

    /// Removes a subscriber. Returns false if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|(sid, _)| *sid != id);
        self.subscribers.len() < before
    }

    /// Saves, then notifies. Called once per successful mutation.
    fn commit(&mut self) {
        self.store.save(&self.state);
        for (_, callback) in self.subscribers.iter_mut() {
            callback(&self.state);
        }
    }

    // Queries

    pub fn all(&self) -> Vec<Prompt> {
        self.state.prompts.clone()
    }

    pub fn get(&self, id: &str) -> Option<&Prompt> {
        self.state.prompts.iter().find(|p| p.id == id)
    }

    pub fn by_role(&self, role: PromptRole) -> Vec<Prompt> {
        self.state
            .prompts
            .iter()
            .filter(|p| p.role == role)
            .cloned()
            .collect()
    }

    /// Case-insensitive substring match over name, content and category.
    /// An empty query returns everything.
    pub fn search(&self, query: &str) -> Vec<Prompt> {
        if query.is_empty() {
            return self.all();
        }
        let q = query.to_lowercase();
        self.state
            .prompts
            .iter()
            .filter(|p| {
                p.name.to_lowercase().contains(&q)
                    || p.content.to_lowercase().contains(&q)
                    || p.category.to_lowercase().contains(&q)
            })
            .cloned()
            .collect()
    }

    /// Ranks the whole library, see [`ranked`].
    pub fn ranked_all(&self) -> Vec<Prompt> {
        ranked(&self.state.prompts)
    }

    /// Sorted distinct categories, for filter chips.
    pub fn categories(&self) -> Vec<String> {
        self.state
            .prompts
            .iter()
            .filter(|p| !p.category.is_empty())
            .map(|p| p.category.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    pub fn stats(&self) -> LibraryStats {
        LibraryStats {
            total: self.state.prompts.len(),
            favorites: self.state.prompts.iter().filter(|p| p.is_favorite).count(),
            total_uses: self.state.prompts.iter().map(|p| p.usage_count).sum(),
        }
    }

    // Mutations

    pub fn create(
        &mut self,
        name: &str,
        content: &str,
        role: PromptRole,
        category: &str,
    ) -> LibraryResult<Prompt> {
        let prompt = Prompt::create(name, content, role, category)?;
        self.state.prompts.push(prompt.clone());
        info!(id = %prompt.id, role = %prompt.role, "prompt_created");
        self.commit();
        Ok(prompt)
    }

    /// Applies `update` to the prompt with `id`.
    ///
    /// Returns `Ok(None)` when no prompt has that id; nothing is saved or
    /// notified in that case. A blank name is a validation error.
    pub fn update(&mut self, id: &str, update: &PromptUpdate) -> LibraryResult<Option<Prompt>> {
        update.validate()?;
        Ok(self.apply(id, update))
    }

    fn apply(&mut self, id: &str, update: &PromptUpdate) -> Option<Prompt> {
        let Some(slot) = self.state.prompts.iter_mut().find(|p| p.id == id) else {
            debug!(id, "prompt_not_found");
            return None;
        };
        let updated = slot.with_updated_fields(update);
        *slot = updated.clone();
        debug!(id, "prompt_updated");
        self.commit();
        Some(updated)
    }

    /// Removes the prompt with `id`. Returns false if it was not present.
    pub fn delete(&mut self, id: &str) -> bool {
        let before = self.state.prompts.len();
        self.state.prompts.retain(|p| p.id != id);
        if self.state.prompts.len() == before {
            debug!(id, "prompt_not_found");
            return false;
        }
        info!(id, "prompt_deleted");
        self.commit();
        true
    }

    pub fn toggle_favorite(&mut self, id: &str) -> Option<Prompt> {
        let is_favorite = self.get(id)?.is_favorite;
        self.apply(id, &PromptUpdate::default().favorite(!is_favorite))
    }

    pub fn increment_usage(&mut self, id: &str) -> Option<Prompt> {
        let usage_count = self.get(id)?.usage_count;
        self.apply(
            id,
            &PromptUpdate::default().usage_count(usage_count.saturating_add(1)),
        )
    }

    /// Replaces the library with `new_state`, or with `merge` appends the
    /// prompts whose id is not already present. Returns how many prompts were
    /// added (the full count when replacing).
    ///
    /// Merging dedups by id only: a prompt with the same name or content but
    /// a different id is added.
    pub fn import_state(&mut self, new_state: LibraryState, merge: bool) -> usize {
        let added = if merge {
            let mut seen: HashSet<String> =
                self.state.prompts.iter().map(|p| p.id.clone()).collect();
            let mut added = 0;
            for prompt in new_state.prompts {
                if seen.insert(prompt.id.clone()) {
                    self.state.prompts.push(prompt);
                    added += 1;
                }
            }
            added
        } else {
            let count = new_state.prompts.len();
            self.state = new_state;
            count
        };

        info!(merge, added, total = self.state.prompts.len(), "library_imported");
        self.commit();
        added
    }
}

/// Stable sort by rank score, highest first. Ties keep their input order.
pub fn ranked(prompts: &[Prompt]) -> Vec<Prompt> {
    let mut sorted = prompts.to_vec();
    sorted.sort_by_key(|p| std::cmp::Reverse(p.rank_score()));
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LibraryError;
    use std::cell::RefCell;
    use std::rc::Rc;
    use tempfile::TempDir;

    fn open_temp() -> (TempDir, Library) {
        let dir = TempDir::new().unwrap();
        let library = Library::open(Store::new(dir.path().join("prompts.json")));
        (dir, library)
    }

    fn prompt(name: &str, usage: u64, fav: bool) -> Prompt {
        let mut p = Prompt::create(name, "", PromptRole::Body, "").unwrap();
        p.usage_count = usage;
        p.is_favorite = fav;
        p
    }

    /// Records the prompt count seen by each notification.
    fn record(library: &mut Library) -> Rc<RefCell<Vec<usize>>> {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        library.subscribe(move |state| sink.borrow_mut().push(state.prompts.len()));
        seen
    }

    #[test]
    fn test_ranked_favorite_dominates() {
        let a = prompt("A", 5, false);
        let b = prompt("B", 1, true);
        let c = prompt("C", 100, false);
        let names: Vec<String> = ranked(&[a, b, c]).into_iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["B", "C", "A"]);
    }

    #[test]
    fn test_ranked_is_stable() {
        let items = vec![prompt("x", 3, false), prompt("y", 3, false), prompt("z", 3, false)];
        let names: Vec<String> = ranked(&items).into_iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["x", "y", "z"]);
    }

    #[test]
    fn test_create_persists_and_notifies() {
        let (_dir, mut library) = open_temp();
        let seen = record(&mut library);

        let p = library
            .create("Hello", "Hi there", PromptRole::Prefix, "greetings")
            .unwrap();

        assert_eq!(*seen.borrow(), vec![1]);
        let reloaded = library.store().load();
        assert_eq!(reloaded.prompts, vec![p]);
    }

    #[test]
    fn test_create_blank_name_does_not_notify() {
        let (_dir, mut library) = open_temp();
        let seen = record(&mut library);

        let err = library.create("  ", "x", PromptRole::Body, "").unwrap_err();
        assert!(matches!(err, LibraryError::Validation(_)));
        assert!(seen.borrow().is_empty());
        assert!(library.all().is_empty());
    }

    #[test]
    fn test_subscribers_called_in_order() {
        let (_dir, mut library) = open_temp();
        let order = Rc::new(RefCell::new(Vec::new()));
        for tag in ["first", "second", "third"] {
            let order = Rc::clone(&order);
            library.subscribe(move |_| order.borrow_mut().push(tag));
        }

        library.create("a", "", PromptRole::Body, "").unwrap();
        assert_eq!(*order.borrow(), vec!["first", "second", "third"]);
    }

    #[test]
    fn test_one_notification_per_mutation() {
        let (_dir, mut library) = open_temp();
        let seen = record(&mut library);

        let p = library.create("a", "", PromptRole::Body, "").unwrap();
        library.increment_usage(&p.id);
        library.increment_usage(&p.id);
        library.toggle_favorite(&p.id);
        library.delete(&p.id);

        assert_eq!(seen.borrow().len(), 5);
    }

    #[test]
    fn test_unsubscribe_stops_notifications() {
        let (_dir, mut library) = open_temp();
        let count = Rc::new(RefCell::new(0));
        let sink = Rc::clone(&count);
        let id = library.subscribe(move |_| *sink.borrow_mut() += 1);

        library.create("a", "", PromptRole::Body, "").unwrap();
        assert!(library.unsubscribe(id));
        assert!(!library.unsubscribe(id));
        library.create("b", "", PromptRole::Body, "").unwrap();

        assert_eq!(*count.borrow(), 1);
    }

    #[test]
    fn test_subscriber_sees_committed_state() {
        let (_dir, mut library) = open_temp();
        let observed = Rc::new(RefCell::new(None));
        let sink = Rc::clone(&observed);
        library.subscribe(move |state| {
            *sink.borrow_mut() = state.prompts.first().map(|p| p.usage_count);
        });

        let p = library.create("a", "", PromptRole::Body, "").unwrap();
        library.increment_usage(&p.id);
        assert_eq!(*observed.borrow(), Some(1));
    }

    #[test]
    fn test_unknown_id_is_silent_no_op() {
        let (_dir, mut library) = open_temp();
        library.create("a", "", PromptRole::Body, "").unwrap();
        let seen = record(&mut library);

        assert_eq!(
            library
                .update("missing", &PromptUpdate::default().name("x"))
                .unwrap(),
            None
        );
        assert!(library.toggle_favorite("missing").is_none());
        assert!(library.increment_usage("missing").is_none());
        assert!(!library.delete("missing"));
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn test_update_blank_name_is_validation_error() {
        let (_dir, mut library) = open_temp();
        let p = library.create("a", "", PromptRole::Body, "").unwrap();
        let result = library.update(&p.id, &PromptUpdate::default().name("   "));
        assert!(matches!(result, Err(LibraryError::Validation(_))));
        assert_eq!(library.get(&p.id).unwrap().name, "a");
    }

    #[test]
    fn test_update_changes_fields() {
        let (_dir, mut library) = open_temp();
        let p = library.create("a", "old", PromptRole::Body, "").unwrap();
        let updated = library
            .update(
                &p.id,
                &PromptUpdate::default()
                    .content("new")
                    .role(PromptRole::Suffix)
                    .category("misc"),
            )
            .unwrap()
            .unwrap();

        assert_eq!(updated.content, "new");
        assert_eq!(updated.role, PromptRole::Suffix);
        assert_eq!(updated.category, "misc");
        assert_eq!(library.get(&p.id), Some(&updated));
        // The value returned by create is not affected.
        assert_eq!(p.content, "old");
    }

    #[test]
    fn test_toggle_favorite_twice_restores_flag() {
        let (_dir, mut library) = open_temp();
        let p = library.create("a", "", PromptRole::Body, "").unwrap();

        let once = library.toggle_favorite(&p.id).unwrap();
        let twice = library.toggle_favorite(&p.id).unwrap();

        assert!(once.is_favorite);
        assert_eq!(twice.is_favorite, p.is_favorite);
        assert!(twice.updated_at >= once.updated_at);
        assert!(once.updated_at >= p.updated_at);
    }

    #[test]
    fn test_increment_usage() {
        let (_dir, mut library) = open_temp();
        let p = library.create("a", "", PromptRole::Body, "").unwrap();
        library.increment_usage(&p.id);
        let after = library.increment_usage(&p.id).unwrap();
        assert_eq!(after.usage_count, 2);
        assert_eq!(library.stats().total_uses, 2);
    }

    #[test]
    fn test_delete_removes_and_persists() {
        let (_dir, mut library) = open_temp();
        let a = library.create("a", "", PromptRole::Body, "").unwrap();
        let b = library.create("b", "", PromptRole::Body, "").unwrap();

        assert!(library.delete(&a.id));
        assert!(!library.delete(&a.id));
        assert_eq!(library.all(), vec![b.clone()]);
        assert_eq!(library.store().load().prompts, vec![b]);
    }

    #[test]
    fn test_queries() {
        let (_dir, mut library) = open_temp();
        library.create("Tone", "Be Formal", PromptRole::Prefix, "Style").unwrap();
        library.create("Outro", "bye", PromptRole::Suffix, "closing").unwrap();
        library.create("Task", "summarize", PromptRole::Body, "").unwrap();

        assert_eq!(library.by_role(PromptRole::Prefix).len(), 1);
        assert_eq!(library.by_role(PromptRole::Suffix)[0].name, "Outro");
        assert_eq!(library.search("").len(), 3);
        assert_eq!(library.search("FORMAL")[0].name, "Tone");
        assert_eq!(library.search("style")[0].name, "Tone");
        assert_eq!(library.search("outro")[0].name, "Outro");
        assert!(library.search("nothing matches").is_empty());
        assert_eq!(library.categories(), vec!["Style", "closing", "general"]);
    }

    #[test]
    fn test_stats() {
        let (_dir, mut library) = open_temp();
        let a = library.create("a", "", PromptRole::Body, "").unwrap();
        library.create("b", "", PromptRole::Body, "").unwrap();
        library.toggle_favorite(&a.id);
        library.increment_usage(&a.id);

        assert_eq!(
            library.stats(),
            LibraryStats {
                total: 2,
                favorites: 1,
                total_uses: 1,
            }
        );
    }

    #[test]
    fn test_import_merge_dedups_by_id() {
        let (_dir, mut library) = open_temp();
        let existing = library.create("kept", "", PromptRole::Body, "").unwrap();
        let seen = record(&mut library);

        let mut clash = existing.clone();
        clash.name = "imported copy".to_string();
        let fresh = Prompt::create("fresh", "", PromptRole::Suffix, "").unwrap();
        let incoming = LibraryState {
            schema_version: 1,
            prompts: vec![clash, fresh.clone()],
        };

        let added = library.import_state(incoming, true);

        assert_eq!(added, 1);
        assert_eq!(library.all().len(), 2);
        assert_eq!(library.get(&existing.id).unwrap().name, "kept");
        assert_eq!(library.get(&fresh.id), Some(&fresh));
        assert_eq!(*seen.borrow(), vec![2]);
    }

    #[test]
    fn test_import_merge_keeps_same_name_different_id() {
        let (_dir, mut library) = open_temp();
        library.create("dup", "same", PromptRole::Body, "").unwrap();
        let twin = Prompt::create("dup", "same", PromptRole::Body, "").unwrap();

        library.import_state(
            LibraryState {
                schema_version: 1,
                prompts: vec![twin],
            },
            true,
        );
        assert_eq!(library.search("dup").len(), 2);
    }

    #[test]
    fn test_import_replace() {
        let (_dir, mut library) = open_temp();
        library.create("old", "", PromptRole::Body, "").unwrap();
        let replacement = Prompt::create("new", "", PromptRole::Prefix, "").unwrap();

        let added = library.import_state(
            LibraryState {
                schema_version: 1,
                prompts: vec![replacement.clone()],
            },
            false,
        );

        assert_eq!(added, 1);
        assert_eq!(library.all(), vec![replacement.clone()]);
        assert_eq!(library.store().load().prompts, vec![replacement]);
    }

    #[test]
    fn test_reopen_sees_saved_state() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("prompts.json");
        let mut library = Library::open(Store::new(&path));
        let p = library.create("persist me", "x", PromptRole::Suffix, "").unwrap();
        library.toggle_favorite(&p.id);
        let expected = library.state().clone();
        drop(library);

        let reopened = Library::open(Store::new(&path));
        assert_eq!(reopened.state(), &expected);
    }

    #[test]
    fn test_reopen_preserves_timestamps_exactly() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("prompts.json");
        let mut library = Library::open(Store::new(&path));
        for i in 0..300 {
            let p = library
                .create(&format!("prompt {}", i), "text", PromptRole::Body, "")
                .unwrap();
            if i % 3 == 0 {
                library.toggle_favorite(&p.id);
            }
        }
        let expected = library.state().clone();
        drop(library);

        let reloaded = Store::new(&path).load();
        let drifted: Vec<_> = expected
            .prompts
            .iter()
            .zip(&reloaded.prompts)
            .filter(|(a, b)| a.created_at != b.created_at || a.updated_at != b.updated_at)
            .collect();
        assert!(drifted.is_empty(), "timestamps changed on reload: {:?}", drifted.first());
        assert_eq!(reloaded, expected);
    }

    #[test]
    fn test_mutation_survives_save_failure() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, "x").unwrap();
        let mut library = Library::open(Store::new(blocker.join("prompts.json")));
        let seen = record(&mut library);

        let p = library.create("in memory", "", PromptRole::Body, "").unwrap();
        assert_eq!(library.get(&p.id), Some(&p));
        assert_eq!(*seen.borrow(), vec![1]);
    }
}
