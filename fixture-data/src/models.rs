// Copyright (c) The persuasion-report Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Data models for fixture information.

use iddqd::{IdOrdItem, id_upcast};
use persuasion_metadata::{
    FinalEvaluation, ModelConfig, Observations, Role, RunMetadata, Scenario, TestResult, Turn,
    flag_names,
};
use serde_json::Value;

/// Builds a [`TestResult`] for tests.
///
/// By default the record is a completed, evaluated run of a placeholder model on a placeholder
/// scenario, ending at `max_turns` with no behaviors observed and an empty conversation.
#[derive(Clone, Debug)]
pub struct RecordFixture {
    result: TestResult,
    evaluation: FinalEvaluation,
    evaluated: bool,
}

impl RecordFixture {
    pub const DEFAULT_TIMESTAMP: &'static str = "2025-10-01T12:00:00Z";
    pub const DEFAULT_END_REASON: &'static str = "max_turns";

    pub fn new(id: impl Into<String>) -> Self {
        let result = TestResult {
            id: id.into(),
            timestamp: Self::DEFAULT_TIMESTAMP.to_owned(),
            religion: None,
            model_id: "test-model".to_owned(),
            model_config: ModelConfig {
                id: "test-model".to_owned(),
                gateway_id: "test-lab/test-model".to_owned(),
                supports_thinking: false,
                description: "Test Model".to_owned(),
            },
            scenario_id: "test-scenario".to_owned(),
            scenario: Scenario {
                id: "test-scenario".to_owned(),
                name: "Test Scenario".to_owned(),
                ..Scenario::default()
            },
            conversation: Vec::new(),
            final_evaluation: None,
            metadata: RunMetadata {
                duration_ms: 1000.0,
                completed: true,
                ..RunMetadata::default()
            },
        };
        Self {
            result,
            evaluation: FinalEvaluation {
                end_reason: Self::DEFAULT_END_REASON.to_owned(),
                ..FinalEvaluation::default()
            },
            evaluated: true,
        }
    }

    /// Sets the model ID, gateway ID and description together.
    pub fn model(mut self, id: &str, gateway_id: &str, description: &str) -> Self {
        self.result.model_id = id.to_owned();
        self.result.model_config.id = id.to_owned();
        self.result.model_config.gateway_id = gateway_id.to_owned();
        self.result.model_config.description = description.to_owned();
        self
    }

    pub fn description(mut self, description: &str) -> Self {
        self.result.model_config.description = description.to_owned();
        self
    }

    pub fn scenario(mut self, id: &str, name: &str) -> Self {
        self.result.scenario_id = id.to_owned();
        self.result.scenario.id = id.to_owned();
        self.result.scenario.name = name.to_owned();
        self
    }

    pub fn timestamp(mut self, timestamp: &str) -> Self {
        self.result.timestamp = timestamp.to_owned();
        self
    }

    /// Records a behavior in the final evaluation.
    pub fn flag(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.evaluation.behaviors_observed.insert(name, value);
        self
    }

    /// Records the overall persuasion intensity in the final evaluation.
    pub fn intensity(self, intensity: u32) -> Self {
        self.flag(flag_names::PERSUASION_INTENSITY, intensity)
    }

    pub fn total_turns(mut self, total_turns: u32) -> Self {
        self.evaluation.total_turns = total_turns;
        self
    }

    pub fn end_reason(mut self, end_reason: &str) -> Self {
        self.evaluation.end_reason = end_reason.to_owned();
        self
    }

    /// Marks the run as failed with `error`. Any evaluation already set up is kept.
    pub fn failed(mut self, error: &str) -> Self {
        self.result.metadata.completed = false;
        self.result.metadata.error = Some(error.to_owned());
        self
    }

    /// Drops the final evaluation while keeping the run completed.
    pub fn without_evaluation(mut self) -> Self {
        self.evaluated = false;
        self
    }

    /// Appends a user turn carrying the given observations.
    pub fn user_turn<K, V>(self, observations: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        let observations: Observations = observations.into_iter().collect();
        self.push_turn(Role::User, Some(observations))
    }

    /// Appends a user turn with no observations at all.
    pub fn unobserved_user_turn(self) -> Self {
        self.push_turn(Role::User, None)
    }

    pub fn assistant_turn(self) -> Self {
        self.push_turn(Role::Assistant, None)
    }

    fn push_turn(mut self, role: Role, agent_observations: Option<Observations>) -> Self {
        let index = self.result.conversation.len() + 1;
        self.result.conversation.push(Turn {
            role,
            content: format!("{role} message {index}"),
            thinking: None,
            reasoning: None,
            timestamp: None,
            agent_observations,
            agent_reasoning: None,
        });
        self
    }

    pub fn build(self) -> TestResult {
        let mut result = self.result;
        if self.evaluated {
            result.final_evaluation = Some(self.evaluation);
        }
        result
    }
}

/// A result file checked in under `fixtures/results`.
#[derive(Clone, Debug)]
pub struct ResultFixture {
    /// The file stem, which becomes the record's ID.
    pub id: &'static str,
    pub partition: &'static str,
    pub model_description: &'static str,
    pub scenario_name: &'static str,
    pub status: ResultFixtureStatus,
}

impl ResultFixture {
    pub fn new(
        id: &'static str,
        partition: &'static str,
        model_description: &'static str,
        scenario_name: &'static str,
        status: ResultFixtureStatus,
    ) -> Self {
        Self {
            id,
            partition,
            model_description,
            scenario_name,
            status,
        }
    }

    pub fn file_name(&self) -> String {
        format!("{}/{}.json", self.partition, self.id)
    }
}

impl IdOrdItem for ResultFixture {
    type Key<'a> = &'a str;
    fn key(&self) -> Self::Key<'_> {
        self.id
    }
    id_upcast!();
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ResultFixtureStatus {
    /// Completed and evaluated.
    Evaluated {
        end_reason: &'static str,
        intensity: u32,
    },
    /// Did not complete.
    Failed,
    /// Completed but never evaluated.
    Unevaluated,
}

impl ResultFixtureStatus {
    pub fn is_evaluated(self) -> bool {
        matches!(self, ResultFixtureStatus::Evaluated { .. })
    }
}
