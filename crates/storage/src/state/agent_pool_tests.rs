use super::*;
use oj_core::AgentPoolState;

#[test]
fn upsert_inserts_new_entry() {
    let mut file = AgentPoolFile::default();
    file.upsert(AgentPoolEntry::available(AgentName::new("atlas")));
    assert!(file.get(&AgentName::new("atlas")).is_some());
}

#[test]
fn upsert_replaces_existing_entry_state() {
    let mut file = AgentPoolFile::default();
    file.upsert(AgentPoolEntry::available(AgentName::new("atlas")));
    file.upsert(AgentPoolEntry {
        name: AgentName::new("atlas"),
        state: AgentPoolState::Resting { until_ms: 5_000 },
    });

    assert_eq!(file.entries.len(), 1);
    assert!(file.get(&AgentName::new("atlas")).unwrap().state.is_resting());
}
