use super::fake::FakeAdapter;
use super::*;
use oj_core::{OwnerId, TaskId};

#[tokio::test]
async fn fake_adapter_round_trips_through_the_trait() {
    let adapter = FakeAdapter::new();
    let (tx, _rx) = mpsc::channel(8);
    let config = AgentConfig {
        agent_id: AgentId::new("a1"),
        owner: OwnerId::Task(TaskId::parse("PS_000001_T1").unwrap()),
        workspace_path: std::env::temp_dir(),
        prompt: "go".to_string(),
        command: "noop".to_string(),
        args: Vec::new(),
    };
    adapter.spawn(config, tx).await.unwrap();
    assert!(adapter.is_alive(&AgentId::new("a1")).await);
    adapter.kill(&AgentId::new("a1")).await.unwrap();
    assert!(!adapter.is_alive(&AgentId::new("a1")).await);
}
