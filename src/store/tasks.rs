use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;

use crate::error::{Result, SprigError};
use crate::model::{Completion, Task, TaskNode};
use crate::store::lock::StoreLock;
use crate::timespec;

/// The task forest, persisted as one JSON array of flat records.
///
/// Every operation is a single session: acquire the exclusive lock, load the
/// whole document, normalize it, validate, mutate in memory, renumber sibling
/// groups, write the whole document back. Validation failures reject the
/// operation before anything is mutated, so the store never holds a partial
/// write. Read operations take the same lock and skip the write.
pub struct TaskStore {
    path: PathBuf,
    lock_path: PathBuf,
}

impl TaskStore {
    /// Open the store at `path`, creating an empty document (and parent
    /// directories) if none exists yet.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        if !path.exists() {
            fs::write(&path, "[]")?;
        }

        let mut lock_path = path.clone().into_os_string();
        lock_path.push(".lock");
        Ok(Self {
            path,
            lock_path: PathBuf::from(lock_path),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Ordered forest view: the whole forest, or the child subtrees of
    /// `root` when given.
    pub fn list(&self, root: Option<&str>) -> Result<Vec<TaskNode>> {
        let _lock = StoreLock::acquire(&self.lock_path)?;
        let mut tasks = self.load()?;
        normalize(&mut tasks);
        if let Some(root_id) = root
            && !tasks.iter().any(|t| t.id == root_id)
        {
            return Err(SprigError::TaskNotFound(root_id.to_string()));
        }
        Ok(build_forest(&tasks, root))
    }

    /// Create a task under `parent_id` (or at top level). An omitted position
    /// appends after the current siblings; a given one is clamped to
    /// `[0, sibling_count]` and later siblings shift up to make room.
    pub fn create(
        &self,
        title: &str,
        parent_id: Option<&str>,
        position: Option<usize>,
    ) -> Result<Task> {
        let title = title.trim();
        if title.is_empty() {
            return Err(SprigError::EmptyTitle);
        }

        let _lock = StoreLock::acquire(&self.lock_path)?;
        let mut tasks = self.load()?;
        normalize(&mut tasks);
        ensure_parent(&tasks, parent_id)?;

        let siblings = tasks
            .iter()
            .filter(|t| t.parent_id.as_deref() == parent_id)
            .count();
        let slot = position.unwrap_or(siblings).min(siblings);
        for task in tasks.iter_mut() {
            if task.parent_id.as_deref() == parent_id && task.position >= slot {
                task.position += 1;
            }
        }

        let task = Task::new(title.to_string(), parent_id.map(str::to_string), slot);
        tasks.push(task.clone());
        reindex(&mut tasks);
        self.persist(&tasks)?;
        tracing::debug!(id = %task.id, "created task");
        Ok(task)
    }

    /// Delete a task and its whole descendant closure, then close the
    /// position gaps it leaves behind.
    pub fn delete(&self, id: &str) -> Result<()> {
        let _lock = StoreLock::acquire(&self.lock_path)?;
        let mut tasks = self.load()?;
        normalize(&mut tasks);
        if !tasks.iter().any(|t| t.id == id) {
            return Err(SprigError::TaskNotFound(id.to_string()));
        }

        let mut doomed = descendant_ids(&tasks, id);
        doomed.insert(id.to_string());
        tasks.retain(|t| !doomed.contains(&t.id));
        reindex(&mut tasks);
        self.persist(&tasks)?;
        tracing::debug!(id, removed = doomed.len(), "deleted subtree");
        Ok(())
    }

    /// Reorder the top-level group. `order` must name each current top-level
    /// task exactly once; anything else leaves the store untouched.
    pub fn reorder(&self, order: &[String]) -> Result<Vec<TaskNode>> {
        let _lock = StoreLock::acquire(&self.lock_path)?;
        let mut tasks = self.load()?;
        normalize(&mut tasks);

        let top_ids: HashSet<&str> = tasks
            .iter()
            .filter(|t| t.parent_id.is_none())
            .map(|t| t.id.as_str())
            .collect();
        let mut ranks: HashMap<&str, usize> = HashMap::with_capacity(order.len());
        for (rank, id) in order.iter().enumerate() {
            if ranks.insert(id.as_str(), rank).is_some() {
                return Err(SprigError::ReorderMismatch);
            }
        }
        if ranks.len() != top_ids.len() || !top_ids.iter().all(|id| ranks.contains_key(id)) {
            return Err(SprigError::ReorderMismatch);
        }

        for task in tasks.iter_mut() {
            if task.parent_id.is_none() {
                task.position = ranks[task.id.as_str()];
            }
        }
        reindex(&mut tasks);
        self.persist(&tasks)?;
        Ok(build_forest(&tasks, None))
    }

    /// Move a task to a new parent and sibling slot. Rejects self-parenting
    /// and any destination inside the task's own subtree.
    pub fn move_task(
        &self,
        id: &str,
        parent_id: Option<&str>,
        position: usize,
    ) -> Result<Vec<TaskNode>> {
        let _lock = StoreLock::acquire(&self.lock_path)?;
        let mut tasks = self.load()?;
        normalize(&mut tasks);

        let Some(moving) = tasks.iter().position(|t| t.id == id) else {
            return Err(SprigError::TaskNotFound(id.to_string()));
        };
        if let Some(pid) = parent_id {
            if pid == id {
                return Err(SprigError::SelfParent(id.to_string()));
            }
            if !tasks.iter().any(|t| t.id == pid) {
                return Err(SprigError::ParentNotFound(pid.to_string()));
            }
            if descendant_ids(&tasks, id).contains(pid) {
                return Err(SprigError::MoveCycle(id.to_string()));
            }
        }

        let old_parent = tasks[moving].parent_id.clone();
        let old_position = tasks[moving].position;
        for task in tasks.iter_mut() {
            if task.parent_id == old_parent && task.position > old_position {
                task.position -= 1;
            }
        }

        tasks[moving].parent_id = parent_id.map(str::to_string);
        let siblings = tasks
            .iter()
            .filter(|t| t.parent_id.as_deref() == parent_id && t.id != id)
            .count();
        let slot = position.min(siblings);
        for task in tasks.iter_mut() {
            if task.parent_id.as_deref() == parent_id && task.id != id && task.position >= slot {
                task.position += 1;
            }
        }
        tasks[moving].position = slot;

        reindex(&mut tasks);
        self.persist(&tasks)?;
        tracing::debug!(id, "moved task");
        Ok(build_forest(&tasks, None))
    }

    /// Complete a task. A recurring task is rescheduled in place: its due
    /// date advances by the interval, counted from the current due date (or
    /// today when none is set). A one-shot task is removed. Tasks with
    /// subtasks cannot be completed directly.
    pub fn complete(&self, id: &str, today: NaiveDate) -> Result<Completion> {
        let _lock = StoreLock::acquire(&self.lock_path)?;
        let mut tasks = self.load()?;
        normalize(&mut tasks);

        let Some(index) = tasks.iter().position(|t| t.id == id) else {
            return Err(SprigError::TaskNotFound(id.to_string()));
        };
        if tasks.iter().any(|t| t.parent_id.as_deref() == Some(id)) {
            return Err(SprigError::HasSubtasks(id.to_string()));
        }

        if let Some(every) = tasks[index].recurrence {
            let next = timespec::next_occurrence(tasks[index].due, every, today);
            tasks[index].due = Some(next);
            let task = tasks[index].clone();
            self.persist(&tasks)?;
            tracing::debug!(id, due = %next, "rescheduled recurring task");
            Ok(Completion::Rescheduled(task))
        } else {
            let task = tasks.remove(index);
            reindex(&mut tasks);
            self.persist(&tasks)?;
            tracing::debug!(id, "completed task");
            Ok(Completion::Done(task))
        }
    }

    /// Tasks due on or before `today`, ordered by due date then id.
    pub fn due_on_or_before(&self, today: NaiveDate) -> Result<Vec<Task>> {
        let _lock = StoreLock::acquire(&self.lock_path)?;
        let mut tasks = self.load()?;
        normalize(&mut tasks);

        let mut due: Vec<Task> = tasks
            .iter()
            .filter(|t| t.due.is_some_and(|d| d <= today))
            .cloned()
            .collect();
        due.sort_by(|a, b| (a.due, &a.id).cmp(&(b.due, &b.id)));
        Ok(due)
    }

    /// Assign or clear a task's due date; a recurrence carried by the
    /// resolved expression is assigned alongside, otherwise the existing
    /// interval is left alone.
    pub fn set_schedule(
        &self,
        id: &str,
        due: Option<NaiveDate>,
        every: Option<u32>,
    ) -> Result<Task> {
        let _lock = StoreLock::acquire(&self.lock_path)?;
        let mut tasks = self.load()?;
        normalize(&mut tasks);

        let Some(index) = tasks.iter().position(|t| t.id == id) else {
            return Err(SprigError::TaskNotFound(id.to_string()));
        };
        tasks[index].due = due;
        if every.is_some() {
            tasks[index].recurrence = every;
        }
        let task = tasks[index].clone();
        self.persist(&tasks)?;
        Ok(task)
    }

    /// Assign or clear a task's recurrence interval.
    pub fn set_recurrence(&self, id: &str, every: Option<u32>) -> Result<Task> {
        if every == Some(0) {
            return Err(SprigError::BadRecurrence("0".to_string()));
        }

        let _lock = StoreLock::acquire(&self.lock_path)?;
        let mut tasks = self.load()?;
        normalize(&mut tasks);

        let Some(index) = tasks.iter().position(|t| t.id == id) else {
            return Err(SprigError::TaskNotFound(id.to_string()));
        };
        tasks[index].recurrence = every;
        let task = tasks[index].clone();
        self.persist(&tasks)?;
        Ok(task)
    }

    /// Remove every task.
    pub fn clear(&self) -> Result<()> {
        let _lock = StoreLock::acquire(&self.lock_path)?;
        self.persist(&[])?;
        tracing::debug!("cleared store");
        Ok(())
    }

    /// Resolve a user-supplied id to a canonical one: exact match first,
    /// then unique lowercase-hex prefix.
    pub fn resolve_id(&self, input: &str) -> Result<String> {
        let _lock = StoreLock::acquire(&self.lock_path)?;
        let mut tasks = self.load()?;
        normalize(&mut tasks);

        let raw = input.trim();
        if raw.is_empty() {
            return Err(SprigError::TaskNotFound(input.to_string()));
        }
        if tasks.iter().any(|t| t.id == raw) {
            return Ok(raw.to_string());
        }

        let prefix = raw.to_ascii_lowercase();
        let mut matches: Vec<&str> = tasks
            .iter()
            .map(|t| t.id.as_str())
            .filter(|id| id.starts_with(&prefix))
            .collect();
        matches.sort_unstable();
        matches.dedup();
        match matches.len() {
            0 => Err(SprigError::TaskNotFound(raw.to_string())),
            1 => Ok(matches[0].to_string()),
            _ => Err(SprigError::TaskIdAmbiguous(
                raw.to_string(),
                matches.join(", "),
            )),
        }
    }

    fn load(&self) -> Result<Vec<Task>> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        // Tolerate a BOM and plain whitespace, like the hand-editable file
        // formats this store replaces.
        let trimmed = raw.trim_start_matches('\u{feff}').trim();
        if trimmed.is_empty() {
            return Ok(Vec::new());
        }
        let value: serde_json::Value = serde_json::from_str(trimmed)
            .map_err(|e| SprigError::CorruptStore(e.to_string()))?;
        if !value.is_array() {
            return Err(SprigError::CorruptStore(
                "expected a top-level array of tasks".to_string(),
            ));
        }
        serde_json::from_value(value).map_err(|e| SprigError::CorruptStore(e.to_string()))
    }

    fn persist(&self, tasks: &[Task]) -> Result<()> {
        let json = serde_json::to_string_pretty(tasks)?;
        fs::write(&self.path, json)?;
        Ok(())
    }
}

/// Self-healing pass run against every freshly loaded snapshot: dangling or
/// empty parent references become roots, then sibling groups renumber.
/// Makes every operation robust against hand-edited documents.
fn normalize(tasks: &mut Vec<Task>) {
    let ids: HashSet<String> = tasks.iter().map(|t| t.id.clone()).collect();
    for task in tasks.iter_mut() {
        if let Some(pid) = &task.parent_id
            && (pid.is_empty() || !ids.contains(pid))
        {
            task.parent_id = None;
        }
    }
    reindex(tasks);
}

/// Renumber every sibling group to the contiguous range `0..k-1`, keeping
/// the stored order (stable sort by current position).
fn reindex(tasks: &mut [Task]) {
    let mut groups: HashMap<Option<String>, Vec<usize>> = HashMap::new();
    for (i, task) in tasks.iter().enumerate() {
        groups.entry(task.parent_id.clone()).or_default().push(i);
    }
    for members in groups.values_mut() {
        members.sort_by_key(|&i| tasks[i].position);
        for (position, &i) in members.iter().enumerate() {
            tasks[i].position = position;
        }
    }
}

fn ensure_parent(tasks: &[Task], parent_id: Option<&str>) -> Result<()> {
    match parent_id {
        None => Ok(()),
        Some(pid) if tasks.iter().any(|t| t.id == pid) => Ok(()),
        Some(pid) => Err(SprigError::ParentNotFound(pid.to_string())),
    }
}

/// Full descendant closure of `root`, walked iteratively with a visited set
/// so malformed parent chains can never loop.
fn descendant_ids(tasks: &[Task], root: &str) -> HashSet<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut frontier = vec![root.to_string()];
    while let Some(current) = frontier.pop() {
        for task in tasks {
            if task.parent_id.as_deref() == Some(current.as_str())
                && seen.insert(task.id.clone())
            {
                frontier.push(task.id.clone());
            }
        }
    }
    seen
}

/// Materialize the derived tree view from the flat records: children grouped
/// by parent, each group ordered by position.
fn build_forest(tasks: &[Task], root: Option<&str>) -> Vec<TaskNode> {
    let mut by_parent: HashMap<Option<&str>, Vec<&Task>> = HashMap::new();
    for task in tasks {
        by_parent
            .entry(task.parent_id.as_deref())
            .or_default()
            .push(task);
    }
    for group in by_parent.values_mut() {
        group.sort_by_key(|t| t.position);
    }
    build_level(&by_parent, root)
}

fn build_level<'a>(
    by_parent: &HashMap<Option<&'a str>, Vec<&'a Task>>,
    parent: Option<&'a str>,
) -> Vec<TaskNode> {
    let Some(group) = by_parent.get(&parent) else {
        return Vec::new();
    };
    group
        .iter()
        .map(|task| TaskNode {
            id: task.id.clone(),
            title: task.title.clone(),
            parent_id: task.parent_id.clone(),
            position: task.position,
            created_at: task.created_at,
            due: task.due,
            recurrence: task.recurrence,
            children: build_level(by_parent, Some(task.id.as_str())),
        })
        .collect()
}
