use super::*;
use oj_core::WorkflowId;

#[test]
fn default_registry_has_all_four_types() {
    let registry = WorkflowRegistry::with_defaults();
    for t in [
        WorkflowType::TaskImplementation,
        WorkflowType::ErrorResolution,
        WorkflowType::ContextGathering,
        WorkflowType::PlanningRevision,
    ] {
        assert!(registry.metadata(t).is_some(), "{t} missing from registry");
    }
}

#[test]
fn requires_complete_dependencies_matches_the_core_default() {
    let registry = WorkflowRegistry::with_defaults();
    assert!(registry.metadata(WorkflowType::TaskImplementation).unwrap().requires_complete_dependencies);
    assert!(!registry.metadata(WorkflowType::ContextGathering).unwrap().requires_complete_dependencies);
    assert!(!registry.metadata(WorkflowType::PlanningRevision).unwrap().requires_complete_dependencies);
}

#[test]
fn create_builds_an_instance_for_a_registered_type() {
    let registry = WorkflowRegistry::with_defaults();
    let instance = registry.create(WorkflowType::TaskImplementation, WorkflowId::new(), None);
    assert!(instance.is_some());
}
