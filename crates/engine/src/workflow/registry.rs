// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The closed workflow type registry (§4.3.1): one entry per
//! [`WorkflowType`] variant, each pairing dispatch metadata with a factory
//! that builds the concrete instance.

use super::WorkflowInstance;
use oj_core::{TaskId, WorkflowId, WorkflowType};
use std::collections::HashMap;

/// Dispatch-governing metadata for one registered workflow type.
#[derive(Debug, Clone)]
pub struct WorkflowMetadata {
    pub workflow_type: WorkflowType,
    /// Default from [`WorkflowType::requires_complete_dependencies`];
    /// carried here too so the registry is the single place dispatch code
    /// reads from.
    pub requires_complete_dependencies: bool,
    pub phases: &'static [&'static str],
    /// Whether this type, by default, holds exclusive occupancy on its
    /// target task while running.
    pub exclusive_occupancy: bool,
}

pub type WorkflowFactory = fn(WorkflowId, Option<TaskId>) -> Box<dyn WorkflowInstance>;

pub struct WorkflowRegistry {
    entries: HashMap<WorkflowType, (WorkflowMetadata, WorkflowFactory)>,
}

impl Default for WorkflowRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl WorkflowRegistry {
    pub fn new() -> Self {
        Self { entries: HashMap::new() }
    }

    pub fn register(&mut self, metadata: WorkflowMetadata, factory: WorkflowFactory) {
        self.entries.insert(metadata.workflow_type, (metadata, factory));
    }

    /// The four built-in types (§4.3.1's table), wired to their concrete
    /// implementations in this module's sibling files.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(
            WorkflowMetadata {
                workflow_type: WorkflowType::TaskImplementation,
                requires_complete_dependencies: WorkflowType::TaskImplementation.requires_complete_dependencies(),
                phases: super::task_implementation::PHASES,
                exclusive_occupancy: true,
            },
            super::task_implementation::create,
        );
        registry.register(
            WorkflowMetadata {
                workflow_type: WorkflowType::ErrorResolution,
                requires_complete_dependencies: WorkflowType::ErrorResolution.requires_complete_dependencies(),
                phases: super::error_resolution::PHASES,
                exclusive_occupancy: true,
            },
            super::error_resolution::create,
        );
        registry.register(
            WorkflowMetadata {
                workflow_type: WorkflowType::ContextGathering,
                requires_complete_dependencies: WorkflowType::ContextGathering.requires_complete_dependencies(),
                phases: super::context_gathering::PHASES,
                exclusive_occupancy: false,
            },
            super::context_gathering::create,
        );
        registry.register(
            WorkflowMetadata {
                workflow_type: WorkflowType::PlanningRevision,
                requires_complete_dependencies: WorkflowType::PlanningRevision.requires_complete_dependencies(),
                phases: super::planning_revision::PHASES,
                exclusive_occupancy: false,
            },
            super::planning_revision::create,
        );
        registry
    }

    pub fn metadata(&self, workflow_type: WorkflowType) -> Option<&WorkflowMetadata> {
        self.entries.get(&workflow_type).map(|(m, _)| m)
    }

    pub fn create(&self, workflow_type: WorkflowType, id: WorkflowId, task_id: Option<TaskId>) -> Option<Box<dyn WorkflowInstance>> {
        self.entries.get(&workflow_type).map(|(_, factory)| factory(id, task_id))
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
