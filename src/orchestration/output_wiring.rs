//! # Output Wiring
//!
//! Resource groups exchange generated identifiers through declared, named
//! outputs and inputs. Before any apply, every input of a target's plan must
//! be produced by exactly one group in a strictly earlier wave; groups in the
//! same wave apply concurrently and cannot feed each other.

use std::collections::{BTreeMap, HashMap};

use crate::config::ConfigurationError;
use crate::error::Result;
use crate::models::ResourceGroup;
use crate::orchestration::types::TargetPlan;
use crate::registry::GroupOutputs;

/// Check the plan's output/input contract without side effects
pub fn validate_plan(plan: &TargetPlan) -> Result<()> {
    let target_id = plan.target_id();
    let mut producers: HashMap<&str, &str> = HashMap::new();

    for wave in &plan.waves {
        for group in &wave.groups {
            for input in &group.inputs {
                if !producers.contains_key(input.as_str()) {
                    return Err(ConfigurationError::UnresolvedInput {
                        target: target_id.clone(),
                        group: group.id.clone(),
                        input: input.clone(),
                    }
                    .into());
                }
            }
        }

        for group in &wave.groups {
            for output in &group.outputs {
                if let Some(existing) = producers.insert(output.as_str(), group.id.as_str()) {
                    return Err(ConfigurationError::invalid_value(
                        format!("resource_groups.{}.outputs", group.id),
                        output.clone(),
                        format!("output is already produced by '{existing}'"),
                    )
                    .into());
                }
            }
        }
    }

    Ok(())
}

/// Outputs collected so far for one target
#[derive(Debug, Clone, Default)]
pub struct OutputWiring {
    values: BTreeMap<String, String>,
}

impl OutputWiring {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inputs for `group`, resolved by name
    pub fn inputs_for(&self, target_id: &str, group: &ResourceGroup) -> Result<BTreeMap<String, String>> {
        group
            .inputs
            .iter()
            .map(|input| {
                self.values
                    .get(input)
                    .map(|value| (input.clone(), value.clone()))
                    .ok_or_else(|| {
                        ConfigurationError::UnresolvedInput {
                            target: target_id.to_string(),
                            group: group.id.clone(),
                            input: input.clone(),
                        }
                        .into()
                    })
            })
            .collect()
    }

    /// Declared outputs the provider failed to return
    pub fn missing_outputs(group: &ResourceGroup, outputs: &GroupOutputs) -> Vec<String> {
        group
            .outputs
            .iter()
            .filter(|name| !outputs.contains_key(*name))
            .cloned()
            .collect()
    }

    /// Store the declared outputs of an applied group; undeclared values are dropped
    pub fn record(&mut self, group: &ResourceGroup, outputs: &GroupOutputs) {
        for name in &group.outputs {
            if let Some(value) = outputs.get(name) {
                self.values.insert(name.clone(), value.clone());
            }
        }
    }

    pub fn values(&self) -> &BTreeMap<String, String> {
        &self.values
    }
}
