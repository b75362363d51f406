//! Collaboration Coordinator
//!
//! Runs a task end to end: decompose, route each subtask, execute the
//! subtasks concurrently, aggregate their results. Every call gets a
//! [`CollaborationSession`] that stays in memory until the caller discards or
//! evicts it.
//!
//! ## Failure semantics
//!
//! The first failed subtask dooms the session; results of siblings that
//! succeeded are discarded. Without `fail_fast` every dispatched subtask still
//! runs to completion before the error is returned. With `fail_fast` the
//! remaining subtasks are aborted and their agents asked to cancel.
//!
//! Dropping a `coordinate` future before it settles aborts its subtasks and
//! leaves the session `Cancelled`.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use parking_lot::RwLock;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use a2a_core::{A2AAgent, CoordinatorConfig, DispatchMode, Error, Result, Task, TaskResult};

use crate::decompose::{PhaseDecomposer, TaskDecomposer};
use crate::registry::AgentRegistry;
use crate::router::{ScoredAgent, TaskRouter};
use crate::session::{CollaborationSession, SessionStatus};

/// A subtask paired with the agent that will execute it
struct Dispatch {
    subtask: Task,
    agent_id: String,
    agent: Arc<dyn A2AAgent>,
}

/// Holds one unit of router load for an agent until dropped
struct LoadGuard {
    router: Arc<TaskRouter>,
    agent_id: String,
}

impl LoadGuard {
    fn acquire(router: Arc<TaskRouter>, agent_id: &str) -> Self {
        router.increment_load(agent_id);
        Self {
            router,
            agent_id: agent_id.to_string(),
        }
    }
}

impl Drop for LoadGuard {
    fn drop(&mut self) {
        self.router.decrement_load(&self.agent_id);
    }
}

/// Cancels a session that is still active when its `coordinate` call is dropped
struct SessionGuard<'a> {
    sessions: &'a RwLock<HashMap<String, CollaborationSession>>,
    session_id: String,
}

impl Drop for SessionGuard<'_> {
    fn drop(&mut self) {
        let mut sessions = self.sessions.write();
        let Some(session) = sessions.get_mut(&self.session_id) else {
            return;
        };
        if !session.status.is_finished() {
            warn!("Collaboration session {} dropped before completion", self.session_id);
            session.cancel("coordination dropped before completion");
        }
    }
}

pub struct CollaborationCoordinator {
    registry: Arc<AgentRegistry>,
    router: Arc<TaskRouter>,
    decomposer: Arc<dyn TaskDecomposer>,
    config: CoordinatorConfig,
    sessions: RwLock<HashMap<String, CollaborationSession>>,
}

impl CollaborationCoordinator {
    pub fn new(registry: Arc<AgentRegistry>, router: Arc<TaskRouter>) -> Self {
        Self::with_config(registry, router, CoordinatorConfig::default())
    }

    pub fn with_config(
        registry: Arc<AgentRegistry>,
        router: Arc<TaskRouter>,
        config: CoordinatorConfig,
    ) -> Self {
        Self {
            registry,
            router,
            decomposer: Arc::new(PhaseDecomposer::new()),
            config,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// Replace the default three-phase decomposer
    pub fn with_decomposer(mut self, decomposer: Arc<dyn TaskDecomposer>) -> Self {
        self.decomposer = decomposer;
        self
    }

    pub fn config(&self) -> &CoordinatorConfig {
        &self.config
    }

    pub fn router(&self) -> &Arc<TaskRouter> {
        &self.router
    }

    pub fn registry(&self) -> &Arc<AgentRegistry> {
        &self.registry
    }

    /// Execute a task end to end and return the aggregated result
    pub async fn coordinate(&self, task: Task) -> Result<TaskResult> {
        self.coordinate_with_session(task).await.1
    }

    /// Like [`coordinate`](Self::coordinate), also returning the session id
    /// so the caller can inspect the session whatever the outcome.
    pub async fn coordinate_with_session(&self, task: Task) -> (String, Result<TaskResult>) {
        let session = CollaborationSession::new(task.clone());
        let session_id = session.id.clone();

        info!("Starting collaboration session {} for task {}", session_id, task.id);
        self.sessions.write().insert(session_id.clone(), session);
        let _guard = SessionGuard {
            sessions: &self.sessions,
            session_id: session_id.clone(),
        };

        let outcome = self.run_session(&session_id, &task).await;

        match &outcome {
            Ok(_) => info!("Collaboration session {} completed", session_id),
            Err(e) => {
                error!("Collaboration session {} failed: {}", session_id, e);
                let reason = e.to_string();
                self.update_session(&session_id, |s| s.fail(reason));
            }
        }

        (session_id, outcome)
    }

    async fn run_session(&self, session_id: &str, task: &Task) -> Result<TaskResult> {
        let subtasks = self.decompose_task(task).await?;
        if subtasks.is_empty() {
            return Err(Error::Decomposition(format!(
                "no subtasks produced for task {}",
                task.id
            )));
        }

        let mut plan = Vec::with_capacity(subtasks.len());
        for subtask in subtasks {
            let ScoredAgent { agent_id, agent, .. } = self.router.route_scored(&subtask).await?;
            debug!("Subtask {} assigned to agent {}", subtask.id, agent_id);

            self.update_session(session_id, |s| {
                s.participants.insert(agent_id.clone(), agent.clone());
                s.sub_tasks.insert(subtask.id.clone(), subtask.clone());
                s.assignments.insert(subtask.id.clone(), agent_id.clone());
                s.touch();
            });

            plan.push(Dispatch {
                subtask,
                agent_id,
                agent,
            });
        }

        let plan = self.apply_dispatch_mode(plan);
        let results = self.execute_parallel(plan).await?;

        let recorded = results.clone();
        self.update_session(session_id, |s| {
            s.results = recorded;
            s.touch();
        });

        let aggregated = aggregate_results(&results)?;
        self.update_session(session_id, |s| s.complete());

        Ok(aggregated)
    }

    /// Split a task with the configured decomposer
    pub async fn decompose_task(&self, task: &Task) -> Result<Vec<Task>> {
        self.decomposer.decompose(task).await
    }

    /// In `AnyParticipant` mode every subtask goes to one arbitrary
    /// participant instead of the agent routed for it.
    fn apply_dispatch_mode(&self, plan: Vec<Dispatch>) -> Vec<Dispatch> {
        if self.config.dispatch != DispatchMode::AnyParticipant {
            return plan;
        }

        let participants: HashMap<String, Arc<dyn A2AAgent>> = plan
            .iter()
            .map(|d| (d.agent_id.clone(), d.agent.clone()))
            .collect();
        let Some((agent_id, agent)) = participants.into_iter().next() else {
            return plan;
        };

        plan.into_iter()
            .map(|d| Dispatch {
                subtask: d.subtask,
                agent_id: agent_id.clone(),
                agent: agent.clone(),
            })
            .collect()
    }

    async fn execute_parallel(&self, plan: Vec<Dispatch>) -> Result<HashMap<String, TaskResult>> {
        let semaphore = (self.config.max_concurrency > 0)
            .then(|| Arc::new(Semaphore::new(self.config.max_concurrency)));
        let fail_fast = self.config.fail_fast;

        let mut join_set = JoinSet::new();
        let mut in_flight: HashMap<String, Arc<dyn A2AAgent>> = HashMap::new();

        for dispatch in plan {
            in_flight.insert(dispatch.subtask.id.clone(), dispatch.agent.clone());

            let router = self.router.clone();
            let registry = self.registry.clone();
            let semaphore = semaphore.clone();
            let track_metrics = self.config.track_metrics;

            join_set.spawn(async move {
                let subtask_id = dispatch.subtask.id.clone();
                let outcome = run_subtask(dispatch, router, registry, semaphore, track_metrics).await;
                (subtask_id, outcome)
            });
        }

        let mut results = HashMap::new();
        let mut first_error: Option<Error> = None;

        while let Some(joined) = join_set.join_next().await {
            let failure = match joined {
                Ok((subtask_id, Ok(result))) => {
                    in_flight.remove(&subtask_id);
                    results.insert(subtask_id, result);
                    None
                }
                Ok((subtask_id, Err(e))) => {
                    in_flight.remove(&subtask_id);
                    warn!("Subtask {} failed: {}", subtask_id, e);
                    Some(e)
                }
                Err(e) if e.is_cancelled() => None,
                Err(e) => Some(Error::Other(format!("Subtask panicked: {}", e))),
            };

            if let Some(e) = failure {
                if first_error.is_none() {
                    first_error = Some(e);
                    if fail_fast {
                        debug!("Aborting {} in-flight subtasks", in_flight.len());
                        join_set.abort_all();
                    }
                }
            }
        }

        match first_error {
            Some(e) => {
                if fail_fast {
                    for (subtask_id, agent) in in_flight {
                        if let Err(cancel_err) = agent.cancel_task(&subtask_id).await {
                            debug!("Could not cancel subtask {}: {}", subtask_id, cancel_err);
                        }
                    }
                }
                Err(e)
            }
            None => Ok(results),
        }
    }

    pub async fn get_session(&self, session_id: &str) -> Result<CollaborationSession> {
        self.sessions
            .read()
            .get(session_id)
            .cloned()
            .ok_or_else(|| Error::SessionNotFound(session_id.to_string()))
    }

    pub async fn list_sessions(&self) -> Vec<CollaborationSession> {
        self.sessions.read().values().cloned().collect()
    }

    /// Drop a session. Returns whether it existed.
    pub async fn discard_session(&self, session_id: &str) -> bool {
        let removed = self.sessions.write().remove(session_id).is_some();
        if removed {
            debug!("Discarded session {}", session_id);
        }
        removed
    }

    /// Drop finished sessions not updated within `age`. Returns how many.
    pub async fn evict_sessions_older_than(&self, age: Duration) -> usize {
        let Ok(age) = chrono::Duration::from_std(age) else {
            return 0;
        };
        let cutoff = Utc::now() - age;

        let mut sessions = self.sessions.write();
        let before = sessions.len();
        sessions.retain(|_, s| !s.status.is_finished() || s.updated_at > cutoff);
        let evicted = before - sessions.len();

        if evicted > 0 {
            info!("Evicted {} sessions", evicted);
        }
        evicted
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.read().len()
    }

    pub async fn session_status(&self, session_id: &str) -> Result<SessionStatus> {
        self.get_session(session_id).await.map(|s| s.status)
    }

    fn update_session<F>(&self, session_id: &str, f: F)
    where
        F: FnOnce(&mut CollaborationSession),
    {
        if let Some(session) = self.sessions.write().get_mut(session_id) {
            f(session);
        }
    }
}

async fn run_subtask(
    dispatch: Dispatch,
    router: Arc<TaskRouter>,
    registry: Arc<AgentRegistry>,
    semaphore: Option<Arc<Semaphore>>,
    track_metrics: bool,
) -> Result<TaskResult> {
    let _permit = match semaphore {
        Some(s) => Some(
            s.acquire_owned()
                .await
                .map_err(|e| Error::Other(format!("Dispatch semaphore closed: {}", e)))?,
        ),
        None => None,
    };

    let Dispatch {
        subtask,
        agent_id,
        agent,
    } = dispatch;

    let _load = track_metrics.then(|| LoadGuard::acquire(router.clone(), &agent_id));
    let started = Instant::now();

    debug!("Dispatching subtask {} to agent {}", subtask.id, agent_id);
    let result = match agent.send_task(&subtask).await {
        Ok(response) if response.is_completed() => {
            Ok(response.result.unwrap_or_else(|| TaskResult::text("")))
        }
        Ok(response) => Err(Error::SubtaskFailed {
            subtask_id: subtask.id.clone(),
            reason: response
                .error
                .map(|e| e.to_string())
                .unwrap_or_else(|| format!("finished with status {}", response.status)),
        }),
        Err(e) => Err(Error::SubtaskFailed {
            subtask_id: subtask.id.clone(),
            reason: e.to_string(),
        }),
    };

    if track_metrics {
        router.update_metrics(&agent_id, result.is_ok(), started.elapsed());
    }

    if result.is_ok() {
        if let Err(e) = registry.heartbeat(&agent_id).await {
            debug!("No heartbeat recorded for {}: {}", agent_id, e);
        }
    }

    result
}

/// Combine subtask results into one text result.
///
/// Sections appear in subtask-id order, each headed by its id. Confidence is
/// the mean of the subtask confidences.
pub fn aggregate_results(results: &HashMap<String, TaskResult>) -> Result<TaskResult> {
    if results.is_empty() {
        return Err(Error::NoResults);
    }

    let mut ids: Vec<&String> = results.keys().collect();
    ids.sort();

    let mut sections = Vec::with_capacity(ids.len());
    let mut files = Vec::new();
    let mut artifacts = Vec::new();
    for id in ids {
        let result = &results[id];
        let body = match (&result.content, &result.data) {
            (Some(content), _) => content.clone(),
            (None, Some(data)) => data.to_string(),
            (None, None) => String::new(),
        };
        sections.push(format!("[{}]\n{}", id, body));
        files.extend(result.files.iter().cloned());
        artifacts.extend(result.artifacts.iter().cloned());
    }

    let confidence = results.values().map(|r| r.confidence).sum::<f64>() / results.len() as f64;

    Ok(TaskResult {
        result_type: "text".to_string(),
        content: Some(sections.join("\n\n")),
        data: None,
        files,
        artifacts,
        confidence,
    })
}
