//! Oracle task registry.
//!
//! Tasks are opened for canonically ordered pairs and receive strictly
//! increasing identifiers starting at 1. Identifiers are never reused.

use std::collections::{BTreeMap, HashMap};

use gale_types::events::TaskCreated;
use gale_types::oracle::{Task, TaskStatus};
use gale_types::{AssetId, Height, TaskId, TokenPair};

use crate::{OracleError, Result};

#[derive(Debug, Clone)]
pub struct OracleTaskRegistry {
    tasks: BTreeMap<TaskId, Task>,
    latest_by_pair: HashMap<TokenPair, TaskId>,
    next_id: TaskId,
}

impl OracleTaskRegistry {
    pub fn new() -> Self {
        Self {
            tasks: BTreeMap::new(),
            latest_by_pair: HashMap::new(),
            next_id: 1,
        }
    }

    /// Open a task for the pair `(a, b)`, given in either order.
    ///
    /// # Errors
    ///
    /// - [`OracleError::Pair`] if the assets are identical or zero
    /// - [`OracleError::TaskIdsExhausted`] if no identifier is left
    pub fn create_task(&mut self, a: AssetId, b: AssetId, height: Height) -> Result<TaskCreated> {
        let pair = TokenPair::new(a, b)?;
        let id = self.next_id;
        let next_id = id.checked_add(1).ok_or(OracleError::TaskIdsExhausted)?;

        self.tasks.insert(
            id,
            Task {
                id,
                pair,
                status: TaskStatus::Open,
                created_at_height: height,
            },
        );
        self.latest_by_pair.insert(pair, id);
        self.next_id = next_id;

        tracing::info!(task_id = id, %pair, height, "oracle task created");
        Ok(TaskCreated {
            task_id: id,
            pair,
            height,
        })
    }

    pub fn get_task(&self, id: TaskId) -> Option<&Task> {
        self.tasks.get(&id)
    }

    /// Open tasks in identifier order.
    pub fn open_tasks(&self) -> impl Iterator<Item = &Task> + '_ {
        self.tasks.values().filter(|t| t.is_open())
    }

    /// The most recently created task for `pair`, open or not.
    pub fn latest_task_for(&self, pair: &TokenPair) -> Option<&Task> {
        self.latest_by_pair
            .get(pair)
            .and_then(|id| self.tasks.get(id))
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Mark an open task completed.
    pub(crate) fn complete(&mut self, id: TaskId) -> Result<()> {
        let task = self
            .tasks
            .get_mut(&id)
            .ok_or(OracleError::TaskNotFound(id))?;
        if task.status == TaskStatus::Completed {
            return Err(OracleError::TaskAlreadyCompleted(id));
        }
        task.status = TaskStatus::Completed;
        Ok(())
    }
}

impl Default for OracleTaskRegistry {
    fn default() -> Self {
        Self::new()
    }
}
