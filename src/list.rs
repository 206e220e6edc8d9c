//! Immutable task-list snapshots.

use crate::reorder::{Move, relocate, renumber};
use crate::types::{Priority, Progress, Task};
use chrono::NaiveDate;
use std::sync::Arc;

/// An immutable, cheaply clonable snapshot of a task list in display order.
///
/// Every mutation returns a new snapshot; the receiver is never modified.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskList {
    tasks: Arc<[Task]>,
}

impl TaskList {
    pub fn new(tasks: Vec<Task>) -> Self {
        Self { tasks: tasks.into() }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Find a task by ID.
    pub fn get(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Display index of a task.
    pub fn position(&self, id: &str) -> Option<usize> {
        self.tasks.iter().position(|t| t.id == id)
    }

    /// Snapshot with `task` appended at the end.
    pub fn appended(&self, task: Task) -> Self {
        let mut tasks = self.tasks.to_vec();
        tasks.push(task);
        Self::new(tasks)
    }

    /// Snapshot with the task of the same ID replaced. Client-local hints the
    /// incoming record lacks are kept. Unknown IDs leave the list as it was.
    pub fn replaced(&self, task: Task) -> Self {
        let tasks = self
            .tasks
            .iter()
            .map(|t| {
                if t.id != task.id {
                    return t.clone();
                }
                Task {
                    due_date: task.due_date.or(t.due_date),
                    priority: task.priority.or(t.priority),
                    ..task.clone()
                }
            })
            .collect();
        Self::new(tasks)
    }

    /// Snapshot without the given task.
    pub fn without(&self, id: &str) -> Self {
        Self::new(self.tasks.iter().filter(|t| t.id != id).cloned().collect())
    }

    /// Snapshot with one task relocated and every `order` renumbered.
    pub fn relocated(&self, mv: Move) -> Self {
        let mut tasks = relocate(&self.tasks, mv);
        renumber(&mut tasks);
        Self::new(tasks)
    }

    /// Snapshot with client-local hints set on one task.
    pub fn annotated(&self, id: &str, due_date: Option<NaiveDate>, priority: Option<Priority>) -> Self {
        let tasks = self
            .tasks
            .iter()
            .map(|t| {
                let mut t = t.clone();
                if t.id == id {
                    t.due_date = due_date;
                    t.priority = priority;
                }
                t
            })
            .collect();
        Self::new(tasks)
    }

    /// Copy client-local hints from `previous` onto tasks still present here.
    pub fn with_hints_from(&self, previous: &TaskList) -> Self {
        let tasks = self
            .tasks
            .iter()
            .map(|t| {
                let mut t = t.clone();
                if let Some(old) = previous.get(&t.id) {
                    t.due_date = t.due_date.or(old.due_date);
                    t.priority = t.priority.or(old.priority);
                }
                t
            })
            .collect();
        Self::new(tasks)
    }

    pub fn progress(&self) -> Progress {
        Progress {
            completed: self.tasks.iter().filter(|t| t.completed).count(),
            total: self.tasks.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn task(id: &str, completed: bool) -> Task {
        Task {
            id: id.to_string(),
            owner_id: "user-1".to_string(),
            content: format!("Task {}", id),
            completed,
            order: None,
            due_date: None,
            priority: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_mutations_leave_original_untouched() {
        let list = TaskList::new(vec![task("a", false), task("b", false)]);
        let appended = list.appended(task("c", false));
        let removed = list.without("a");

        assert_eq!(list.len(), 2);
        assert_eq!(appended.len(), 3);
        assert_eq!(removed.len(), 1);
        assert_eq!(removed.tasks()[0].id, "b");
    }

    #[test]
    fn test_replaced() {
        let list = TaskList::new(vec![task("a", false), task("b", false)]);
        let updated = list.replaced(task("b", true));
        assert!(updated.get("b").unwrap().completed);
        assert!(!list.get("b").unwrap().completed);

        let unchanged = list.replaced(task("zzz", true));
        assert_eq!(unchanged, list);
    }

    #[test]
    fn test_replaced_keeps_hints() {
        let due = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        let list = TaskList::new(vec![task("a", false)]).annotated("a", Some(due), Some(Priority::Low));

        let updated = list.replaced(task("a", true));
        let a = updated.get("a").unwrap();
        assert!(a.completed);
        assert_eq!(a.due_date, Some(due));
        assert_eq!(a.priority, Some(Priority::Low));
    }

    #[test]
    fn test_relocated_renumbers() {
        let list = TaskList::new(vec![task("a", false), task("b", false), task("c", false)]);
        let moved = list.relocated(Move::plan(3, 2, Some(0)).unwrap());
        let ids: Vec<_> = moved.tasks().iter().map(|t| t.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
        assert_eq!(moved.position("c"), Some(0));
        assert!(moved.tasks().iter().enumerate().all(|(i, t)| t.order == Some(i as i64)));
        assert!(list.tasks().iter().all(|t| t.order.is_none()));
    }

    #[test]
    fn test_hints_carry_over_by_id() {
        let due = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        let old = TaskList::new(vec![task("a", false), task("b", false)]).annotated(
            "a",
            Some(due),
            Some(Priority::High),
        );
        let fresh = TaskList::new(vec![task("b", true), task("a", false)]).with_hints_from(&old);

        let a = fresh.get("a").unwrap();
        assert_eq!(a.due_date, Some(due));
        assert_eq!(a.priority, Some(Priority::High));
        assert_eq!(fresh.get("b").unwrap().priority, None);
    }

    #[test]
    fn test_progress() {
        let list = TaskList::new(vec![task("a", true), task("b", false), task("c", true)]);
        let progress = list.progress();
        assert_eq!(progress.completed, 2);
        assert_eq!(progress.pending(), 1);
        assert_eq!(TaskList::default().progress().percent(), 0.0);
    }
}
