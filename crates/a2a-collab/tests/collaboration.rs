//! End-to-end collaboration over adapter-backed agents

mod common;

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use a2a_bridge::AdapterAgent;
use a2a_collab::{CollaborationCoordinator, SessionStatus, TaskDecomposer, TaskRouter};
use a2a_core::{
    A2AAgent, CoordinatorConfig, DispatchMode, Error, HubConfig, RoutingStrategy, Task,
    TaskStatus, TaskType,
};

use common::{Labeler, Refuser, hub, specialist};

#[tokio::test]
async fn complex_task_runs_each_phase_on_its_routed_agent() {
    let agents: HashMap<&str, Arc<AdapterAgent<Labeler>>> = [
        ("researcher", specialist("researcher", &["research"], &["search"])),
        ("analyst", specialist("analyst", &["analysis"], &["data_analyzer"])),
        ("writer", specialist("writer", &["writing"], &["grammar_checker"])),
    ]
    .into_iter()
    .collect();
    let (registry, router) = hub(agents.values().map(|a| a.clone() as Arc<dyn A2AAgent>).collect()).await;
    let coordinator = CollaborationCoordinator::new(registry, router);

    let task = Task::new(TaskType::Complex, "quarterly market report").with_id("report");
    let (session_id, outcome) = coordinator.coordinate_with_session(task).await;
    let content = outcome.unwrap().content.unwrap();

    for phase in ["report-1-research", "report-2-analysis", "report-3-generation"] {
        assert!(content.contains(&format!("[{}]", phase)), "missing {} in {}", phase, content);
    }

    let session = coordinator.get_session(&session_id).await.unwrap();
    assert_eq!(session.status, SessionStatus::Completed);
    assert_eq!(session.assignments.len(), 3);

    for (subtask_id, agent_id) in &session.assignments {
        let states = agents[agent_id.as_str()].task_states().await;
        assert_eq!(states[subtask_id].status, TaskStatus::Completed);
    }
}

#[tokio::test]
async fn any_participant_dispatch_sends_everything_to_one_agent() {
    let first = specialist("first", &[], &[]);
    let second = specialist("second", &[], &[]);
    let (registry, router) = hub(vec![first.clone(), second.clone()]).await;
    let coordinator = CollaborationCoordinator::with_config(
        registry,
        router,
        CoordinatorConfig {
            dispatch: DispatchMode::AnyParticipant,
            ..Default::default()
        },
    );

    coordinator
        .coordinate(Task::new(TaskType::Complex, "job"))
        .await
        .unwrap();

    let mut counts = vec![
        first.task_states().await.len(),
        second.task_states().await.len(),
    ];
    counts.sort();
    assert_eq!(counts, vec![0, 3]);
}

#[tokio::test]
async fn failed_agent_yields_no_partial_results() {
    let refuser = Arc::new(AdapterAgent::new(Refuser));
    let (registry, router) = hub(vec![refuser.clone()]).await;
    let coordinator = CollaborationCoordinator::new(registry, router);

    let task = Task::new(TaskType::Query, "please").with_id("q");
    let (session_id, outcome) = coordinator.coordinate_with_session(task).await;

    match outcome {
        Err(Error::SubtaskFailed { subtask_id, reason }) => {
            assert_eq!(subtask_id, "q");
            assert_eq!(reason, "EXECUTION_ERROR: refused");
        }
        other => panic!("expected SubtaskFailed, got {:?}", other),
    }

    let session = coordinator.get_session(&session_id).await.unwrap();
    assert_eq!(session.status, SessionStatus::Failed);
    assert!(session.results.is_empty());

    // The bridge itself reported a failed task, not a broken call
    assert_eq!(refuser.task_status("q").await.unwrap().status, TaskStatus::Failed);
}

/// Splits a task into one subtask per required tool
struct PerTool(Vec<&'static str>);

#[async_trait]
impl TaskDecomposer for PerTool {
    async fn decompose(&self, task: &Task) -> a2a_core::Result<Vec<Task>> {
        Ok(self
            .0
            .iter()
            .map(|tool| {
                Task::new(TaskType::Execute, format!("{} via {}", task.input.as_text(), tool))
                    .with_id(format!("{}-{}", task.id, tool))
                    .with_required_tools([*tool])
            })
            .collect())
    }
}

#[tokio::test]
async fn fail_fast_cancels_slow_siblings() {
    let refuser = Arc::new(AdapterAgent::builder(Refuser).tool("refuse").build());
    let slow = Arc::new(
        AdapterAgent::builder(Labeler::slow("slow", Duration::from_secs(5)))
            .tool("label")
            .build(),
    );
    let (registry, router) = hub(vec![refuser.clone(), slow.clone()]).await;
    router.set_strategy(RoutingStrategy::Capability);

    let coordinator = CollaborationCoordinator::with_config(
        registry,
        router,
        CoordinatorConfig {
            fail_fast: true,
            ..Default::default()
        },
    )
    .with_decomposer(Arc::new(PerTool(vec!["label", "refuse"])));

    let started = Instant::now();
    let result = coordinator
        .coordinate(Task::new(TaskType::Complex, "job").with_id("j"))
        .await;

    assert!(matches!(result, Err(Error::SubtaskFailed { ref subtask_id, .. }) if subtask_id == "j-refuse"));
    assert!(started.elapsed() < Duration::from_secs(3));
    assert_eq!(slow.task_status("j-label").await.unwrap().status, TaskStatus::Cancelled);
}

#[tokio::test]
async fn without_fail_fast_siblings_finish() {
    let refuser = Arc::new(AdapterAgent::builder(Refuser).tool("refuse").build());
    let slow = Arc::new(
        AdapterAgent::builder(Labeler::slow("slow", Duration::from_millis(50)))
            .tool("label")
            .build(),
    );
    let (registry, router) = hub(vec![refuser, slow.clone()]).await;
    router.set_strategy(RoutingStrategy::Capability);

    let coordinator = CollaborationCoordinator::new(registry, router)
        .with_decomposer(Arc::new(PerTool(vec!["refuse", "label"])));

    let result = coordinator
        .coordinate(Task::new(TaskType::Complex, "job").with_id("j"))
        .await;

    assert!(result.is_err());
    assert_eq!(slow.task_status("j-label").await.unwrap().status, TaskStatus::Completed);
}

#[tokio::test]
async fn tracked_metrics_and_heartbeats_follow_dispatch() {
    let agent = specialist("solo", &[], &[]);
    let (registry, router) = hub(vec![agent]).await;
    let coordinator = CollaborationCoordinator::with_config(
        registry.clone(),
        router.clone(),
        CoordinatorConfig {
            track_metrics: true,
            ..Default::default()
        },
    );

    coordinator
        .coordinate(Task::new(TaskType::Complex, "job"))
        .await
        .unwrap();

    let metrics = router.metrics("solo").unwrap();
    assert_eq!(metrics.total_tasks, 3);
    assert_eq!(metrics.success_rate, 1.0);
    assert_eq!(metrics.current_load, 0);

    assert!(registry.check_health("solo").await.unwrap().is_healthy());
}

#[tokio::test]
async fn hub_config_wires_router_and_coordinator() {
    let config = HubConfig::from_toml_str(
        r#"
[router]
strategy = "capability"

[coordinator]
fail_fast = true
max_concurrency = 2
"#,
    )
    .unwrap();

    let searcher = specialist("searcher", &["research"], &["search"]);
    let writer = specialist("writer", &["writing"], &["grammar_checker"]);
    let (registry, _) = hub(vec![searcher.clone(), writer.clone()]).await;
    let router = Arc::new(TaskRouter::with_config(registry.clone(), &config.router));
    let coordinator = CollaborationCoordinator::with_config(registry, router, config.coordinator.clone());

    assert!(coordinator.config().fail_fast);
    assert_eq!(coordinator.config().max_concurrency, 2);

    let task = Task::new(TaskType::Query, "find sources")
        .with_id("find")
        .with_required_tools(["search"]);
    let result = coordinator.coordinate(task).await.unwrap();

    assert_eq!(
        result.content.as_deref(),
        Some("[find]\nsearcher did: find sources")
    );
    assert!(writer.task_states().await.is_empty());
}

#[tokio::test]
async fn caller_timeout_cancels_session_and_agent_task() {
    let slow = Arc::new(AdapterAgent::new(Labeler::slow("slow", Duration::from_millis(300))));
    let (registry, router) = hub(vec![slow.clone()]).await;
    let coordinator = CollaborationCoordinator::new(registry, router);

    let task = Task::new(TaskType::Query, "take your time").with_id("t");
    let timed_out = tokio::time::timeout(Duration::from_millis(20), coordinator.coordinate(task)).await;
    assert!(timed_out.is_err());

    let sessions = coordinator.list_sessions().await;
    assert_eq!(sessions[0].status, SessionStatus::Cancelled);

    // The aborted subtask does not stay running on the agent
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(slow.task_status("t").await.unwrap().status, TaskStatus::Cancelled);
    assert_eq!(slow.clear_finished().await, 1);
}
