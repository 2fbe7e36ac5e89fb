//! # Wave Planner
//!
//! Builds the ordered wave list for one target. The phase order is data, not
//! code sequencing: waves follow [`Phase::ALL`] regardless of mode, and the
//! gating rule is applied on top of that fixed sequence.
//!
//! Gating:
//! - `DisasterRecovery`: every wave carries one shared manual gate scoped to
//!   the target, so one operator action unlocks the whole pipeline.
//! - The `data-identity` wave always carries its own dedicated manual gate,
//!   in both modes.
//! - Everything else is `AlwaysOpen`.

use std::collections::HashSet;

use crate::constants::ids;
use crate::error::{Result, RolloutError};
use crate::models::{DeploymentTarget, Phase, ResourceGroup, RolloutMode};
use crate::orchestration::types::{GateCondition, TargetPlan, Wave};

#[derive(Debug, Clone)]
pub struct WavePlanner {
    catalog: Vec<ResourceGroup>,
}

impl WavePlanner {
    /// Build a planner over a resource group catalog.
    ///
    /// Every phase needs at least one group and group ids must be unique.
    pub fn new(catalog: Vec<ResourceGroup>) -> Result<Self> {
        let mut seen = HashSet::new();
        for group in &catalog {
            if !seen.insert(group.id.as_str()) {
                return Err(RolloutError::configuration(format!(
                    "resource group '{}' is declared more than once",
                    group.id
                )));
            }
        }
        for phase in Phase::ALL {
            if !catalog.iter().any(|group| group.phase == phase) {
                return Err(RolloutError::configuration(format!(
                    "phase '{phase}' has no resource groups"
                )));
            }
        }
        Ok(Self { catalog })
    }

    pub fn catalog(&self) -> &[ResourceGroup] {
        &self.catalog
    }

    pub fn plan(&self, target: &DeploymentTarget, mode: RolloutMode) -> TargetPlan {
        let target_id = target.id();

        let waves = Phase::ALL
            .into_iter()
            .enumerate()
            .map(|(index, phase)| Wave {
                index,
                phase,
                groups: self
                    .catalog
                    .iter()
                    .filter(|group| group.phase == phase)
                    .cloned()
                    .collect(),
                gates: Self::gates_for(&target_id, phase, mode),
            })
            .collect();

        TargetPlan {
            target: target.clone(),
            mode,
            waves,
        }
    }

    fn gates_for(target_id: &str, phase: Phase, mode: RolloutMode) -> Vec<GateCondition> {
        let mut gates = Vec::new();

        if mode == RolloutMode::DisasterRecovery {
            gates.push(GateCondition::manual(
                ids::dr_gate_id(target_id),
                format!("disaster recovery rollout of {target_id} requires operator approval"),
            ));
        }

        if phase.requires_dedicated_approval() {
            gates.push(GateCondition::manual(
                ids::data_identity_gate_id(target_id),
                format!("identity and analytics changes for {target_id} are always human-gated"),
            ));
        }

        if gates.is_empty() {
            gates.push(GateCondition::AlwaysOpen);
        }

        gates
    }
}
