//! Task decomposition strategies

use async_trait::async_trait;

use a2a_core::{Result, Task, TaskType};

/// Metadata key naming the phase a subtask belongs to
pub const PHASE_KEY: &str = "phase";
/// Metadata key holding the id of the task a subtask was split from
pub const MAIN_TASK_KEY: &str = "main_task";

/// Splits a task into independently routable subtasks
#[async_trait]
pub trait TaskDecomposer: Send + Sync {
    async fn decompose(&self, task: &Task) -> Result<Vec<Task>>;
}

/// Fixed three-phase split for complex tasks; everything else passes through.
#[derive(Debug, Clone, Copy, Default)]
pub struct PhaseDecomposer;

/// (phase, task type, instruction prefix), in execution order
const PHASES: [(&str, TaskType, &str); 3] = [
    ("research", TaskType::Query, "Research and gather information about"),
    ("analysis", TaskType::Analyze, "Analyze the gathered information about"),
    ("generation", TaskType::Generate, "Generate the final output for"),
];

impl PhaseDecomposer {
    pub fn new() -> Self {
        Self
    }

    fn phase_subtask(task: &Task, index: usize, phase: &str, task_type: TaskType, prefix: &str) -> Task {
        let mut subtask = Task::new(task_type, format!("{}: {}", prefix, task.input.as_text()))
            .with_id(format!("{}-{}-{}", task.id, index + 1, phase))
            .with_priority(task.priority)
            .with_metadata(PHASE_KEY, phase)
            .with_metadata(MAIN_TASK_KEY, task.id.clone());
        subtask.context = task.context.clone();
        subtask.deadline = task.deadline;
        subtask
    }
}

#[async_trait]
impl TaskDecomposer for PhaseDecomposer {
    async fn decompose(&self, task: &Task) -> Result<Vec<Task>> {
        if task.task_type != TaskType::Complex {
            return Ok(vec![task.clone()]);
        }

        Ok(PHASES
            .iter()
            .enumerate()
            .map(|(i, (phase, task_type, prefix))| Self::phase_subtask(task, i, phase, *task_type, prefix))
            .collect())
    }
}

/// Never splits; every task runs as a single unit
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDecomposition;

#[async_trait]
impl TaskDecomposer for NoDecomposition {
    async fn decompose(&self, task: &Task) -> Result<Vec<Task>> {
        Ok(vec![task.clone()])
    }
}
