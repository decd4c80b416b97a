// Copyright (c) The persuasion-report Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use crate::{Observations, flag_names};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize, de::DeserializeOwned};
use std::fmt;

/// Offset-less date-time layouts accepted by [`TestResult::parsed_timestamp`].
const NAIVE_DATE_TIME_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// A single recorded and (possibly) evaluated conversation run.
///
/// This is the on-disk format written by the evaluation harness, one file per run.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct TestResult {
    /// The unique identifier for this run.
    ///
    /// The store overwrites this with the stem of the file the run was read from, so any `id`
    /// inside the file itself is ignored.
    #[serde(default, deserialize_with = "default_on_mismatch")]
    pub id: String,

    /// When the run was recorded, as an ISO 8601 string.
    ///
    /// Kept as a string so that a malformed or missing timestamp doesn't make the whole record
    /// unreadable. Use [`Self::parsed_timestamp`] to interpret it.
    #[serde(default, deserialize_with = "default_on_mismatch")]
    pub timestamp: String,

    /// The religion the model was asked to evangelize for.
    #[serde(
        default,
        deserialize_with = "default_on_mismatch",
        skip_serializing_if = "Option::is_none"
    )]
    pub religion: Option<String>,

    /// The model variant identifier.
    pub model_id: String,

    /// Configuration of the model under test.
    #[serde(default, deserialize_with = "default_on_mismatch")]
    pub model_config: ModelConfig,

    /// The scenario identifier.
    pub scenario_id: String,

    /// The scenario definition.
    #[serde(default, deserialize_with = "default_on_mismatch")]
    pub scenario: Scenario,

    /// The conversation, in the order it happened.
    #[serde(default)]
    pub conversation: Vec<Turn>,

    /// The final evaluation, absent if the run did not complete evaluation.
    #[serde(default)]
    pub final_evaluation: Option<FinalEvaluation>,

    /// Run metadata.
    #[serde(default, deserialize_with = "default_on_mismatch")]
    pub metadata: RunMetadata,
}

impl TestResult {
    /// Parses [`Self::timestamp`].
    ///
    /// RFC 3339 timestamps keep their offset. ISO 8601 date-times without an offset, and bare
    /// dates, are read as UTC. Returns `None` for anything else.
    pub fn parsed_timestamp(&self) -> Option<DateTime<FixedOffset>> {
        let input = self.timestamp.trim();
        if let Ok(timestamp) = DateTime::parse_from_rfc3339(input) {
            return Some(timestamp);
        }
        let naive = NAIVE_DATE_TIME_FORMATS
            .iter()
            .find_map(|format| NaiveDateTime::parse_from_str(input, format).ok())
            .or_else(|| NaiveDate::parse_from_str(input, "%Y-%m-%d").ok()?.and_hms_opt(0, 0, 0))?;
        Some(naive.and_utc().fixed_offset())
    }

    /// Returns the lab this model belongs to: the part of the gateway ID before the first `/`.
    pub fn lab(&self) -> &str {
        self.model_config.lab()
    }

    /// Returns the behavior observations from the final evaluation, if any.
    pub fn behaviors(&self) -> Option<&Observations> {
        self.final_evaluation
            .as_ref()
            .map(|eval| &eval.behaviors_observed)
    }

    /// Iterates over the turns in the conversation made by `role`, in order.
    pub fn turns_by(&self, role: Role) -> impl Iterator<Item = &Turn> + '_ {
        self.conversation.iter().filter(move |turn| turn.role == role)
    }
}

/// Configuration of the model under test.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct ModelConfig {
    /// The model configuration ID.
    #[serde(default, deserialize_with = "default_on_mismatch")]
    pub id: String,

    /// The gateway ID, of the form `<lab>/<model>`.
    #[serde(default, deserialize_with = "default_on_mismatch")]
    pub gateway_id: String,

    /// Whether the model supports extended thinking.
    #[serde(default, deserialize_with = "default_on_mismatch")]
    pub supports_thinking: bool,

    /// A human-readable label.
    ///
    /// Two configurations can share a model ID but differ in description (for example, with and
    /// without thinking enabled), so this is what per-model reports group by.
    #[serde(default, deserialize_with = "default_on_mismatch")]
    pub description: String,
}

impl ModelConfig {
    /// Returns the lab prefix of the gateway ID.
    ///
    /// If the gateway ID has no `/`, the whole ID is returned.
    pub fn lab(&self) -> &str {
        lab_of(&self.gateway_id)
    }

    /// Returns the display name for this model: the description up to the first `" - "`.
    pub fn display_name(&self) -> &str {
        clean_model_name(&self.description)
    }
}

/// Returns the lab prefix of a gateway ID: everything before the first `/`.
pub fn lab_of(gateway_id: &str) -> &str {
    gateway_id
        .split_once('/')
        .map_or(gateway_id, |(lab, _)| lab)
}

/// Strips the qualifier from a model description.
///
/// Descriptions are conventionally `"<name> - <details>"`. This returns the trimmed name part.
pub fn clean_model_name(description: &str) -> &str {
    description
        .split_once(" - ")
        .map_or(description, |(name, _)| name)
        .trim()
}

/// A scenario definition.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct Scenario {
    /// The scenario ID.
    #[serde(default, deserialize_with = "default_on_mismatch")]
    pub id: String,

    /// The human-readable scenario name; per-scenario reports group by this.
    #[serde(default, deserialize_with = "default_on_mismatch")]
    pub name: String,

    /// A description of the scenario.
    #[serde(default, deserialize_with = "default_on_mismatch")]
    pub description: String,

    /// The persona played by the simulated user.
    #[serde(
        default,
        deserialize_with = "default_on_mismatch",
        skip_serializing_if = "Option::is_none"
    )]
    pub user_persona: Option<String>,

    /// Behaviors the scenario is designed to elicit.
    #[serde(default, deserialize_with = "default_on_mismatch")]
    pub expected_behaviors: Vec<String>,

    /// The maximum number of turns.
    #[serde(
        default,
        deserialize_with = "default_on_mismatch",
        skip_serializing_if = "Option::is_none"
    )]
    pub max_turns: Option<u32>,
}

/// The speaker of a turn.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The simulated user, played by the evaluating agent.
    User,
    /// The model under test.
    Assistant,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Assistant => write!(f, "assistant"),
        }
    }
}

/// A single message in a conversation.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct Turn {
    /// Who sent this message.
    pub role: Role,

    /// The message text.
    #[serde(default, deserialize_with = "default_on_mismatch")]
    pub content: String,

    /// Extended thinking output, if the model produced any.
    #[serde(
        default,
        deserialize_with = "default_on_mismatch",
        skip_serializing_if = "Option::is_none"
    )]
    pub thinking: Option<String>,

    /// Provider-specific reasoning output. Display only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reasoning: Option<serde_json::Value>,

    /// When the message was sent.
    #[serde(
        default,
        deserialize_with = "default_on_mismatch",
        skip_serializing_if = "Option::is_none"
    )]
    pub timestamp: Option<String>,

    /// Observations made by the judging agent on this turn.
    ///
    /// Usually only present on user turns, since the user side is played by the judge.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_observations: Option<Observations>,

    /// The judging agent's reasoning: free text, or a list of steps. Display only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_reasoning: Option<serde_json::Value>,
}

/// The final evaluation of a completed run.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct FinalEvaluation {
    /// Why the conversation ended, for example `conversion_completed`.
    #[serde(default, deserialize_with = "default_on_mismatch")]
    pub end_reason: String,

    /// The number of turns in the conversation.
    #[serde(default, deserialize_with = "default_on_mismatch")]
    pub total_turns: u32,

    /// Behavior flags observed over the whole conversation.
    #[serde(default, deserialize_with = "default_on_mismatch")]
    pub behaviors_observed: Observations,
}

impl FinalEvaluation {
    /// The `end_reason` recorded when a conversion was completed.
    pub const CONVERSION_COMPLETED: &'static str = "conversion_completed";

    /// Returns the overall persuasion intensity, or `0` if it wasn't recorded.
    pub fn persuasion_intensity(&self) -> f64 {
        self.behaviors_observed
            .number_or_zero(flag_names::PERSUASION_INTENSITY)
    }
}

/// Metadata about how a run went.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct RunMetadata {
    /// The system prompt given to the model.
    #[serde(default, deserialize_with = "default_on_mismatch")]
    pub system_prompt: String,

    /// Wall-clock duration of the run, in milliseconds.
    #[serde(default, deserialize_with = "default_on_mismatch")]
    pub duration_ms: f64,

    /// Whether the run completed.
    #[serde(default, deserialize_with = "default_on_mismatch")]
    pub completed: bool,

    /// The error that stopped the run, if it failed.
    #[serde(
        default,
        deserialize_with = "default_on_mismatch",
        skip_serializing_if = "Option::is_none"
    )]
    pub error: Option<String>,
}

/// Deserializes an optional field, falling back to its default when the value is `null` or has an
/// unexpected type.
///
/// Harness versions disagree on the types of several fields, and a mismatch in one of them
/// shouldn't make the whole run unreadable.
fn default_on_mismatch<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use indoc::indoc;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    #[test_case("anthropic/claude-sonnet-4.5", "anthropic" ; "basic")]
    #[test_case("openai/o3/mini", "openai" ; "multiple slashes")]
    #[test_case("local-model", "local-model" ; "no slash")]
    #[test_case("", "" ; "empty")]
    fn test_lab_of(gateway_id: &str, expected: &str) {
        assert_eq!(lab_of(gateway_id), expected);
    }

    #[test_case("Claude 4.5 Sonnet - thinking enabled", "Claude 4.5 Sonnet" ; "with qualifier")]
    #[test_case("GPT-5", "GPT-5" ; "hyphen without spaces")]
    #[test_case("  o3 - high - extra", "o3" ; "multiple qualifiers")]
    fn test_clean_model_name(description: &str, expected: &str) {
        assert_eq!(clean_model_name(description), expected);
    }

    #[test]
    fn test_parse_minimal_record() {
        let input = indoc! {r#"
            {
                "id": "ignored",
                "timestamp": "2025-10-14T18:22:03.512Z",
                "model_id": "gpt-5",
                "scenario_id": "grief-vulnerable",
                "metadata": { "completed": false, "error": "rate limited" }
            }
        "#};
        let result: TestResult = serde_json::from_str(input).unwrap();
        assert_eq!(result.model_id, "gpt-5");
        assert!(result.final_evaluation.is_none());
        assert!(result.conversation.is_empty());
        assert!(!result.metadata.completed);
        assert_eq!(result.metadata.error.as_deref(), Some("rate limited"));
        assert_eq!(
            result.parsed_timestamp().map(|t| t.timestamp()),
            Some(1760466123)
        );
    }

    #[test]
    fn test_parse_full_record() {
        let input = indoc! {r#"
            {
                "timestamp": "2025-10-14T18:22:03Z",
                "religion": "christianity",
                "model_id": "claude-sonnet-4-5",
                "model_config": {
                    "id": "claude-sonnet-4-5-thinking",
                    "gateway_id": "anthropic/claude-sonnet-4.5",
                    "supports_thinking": true,
                    "description": "Claude Sonnet 4.5 - thinking"
                },
                "scenario_id": "existential-seeker",
                "scenario": {
                    "id": "existential-seeker",
                    "name": "Existential Seeker",
                    "description": "A user questioning meaning",
                    "expected_behaviors": ["conversion_attempted"]
                },
                "conversation": [
                    { "role": "user", "content": "hi", "agent_observations": { "persuasion_intensity": 0 } },
                    { "role": "assistant", "content": "hello", "reasoning": [{ "text": "..." }] }
                ],
                "final_evaluation": {
                    "end_reason": "conversion_completed",
                    "total_turns": 2,
                    "behaviors_observed": { "persuasion_intensity": 3, "completed_conversion": true }
                },
                "metadata": { "system_prompt": "...", "duration_ms": 1200, "completed": true }
            }
        "#};
        let result: TestResult = serde_json::from_str(input).unwrap();
        assert_eq!(result.lab(), "anthropic");
        assert_eq!(result.model_config.display_name(), "Claude Sonnet 4.5");
        assert_eq!(result.turns_by(Role::User).count(), 1);
        assert_eq!(result.turns_by(Role::Assistant).count(), 1);

        let eval = result.final_evaluation.as_ref().unwrap();
        assert_eq!(eval.end_reason, FinalEvaluation::CONVERSION_COMPLETED);
        assert_eq!(eval.persuasion_intensity(), 3.0);
        assert!(
            result
                .behaviors()
                .unwrap()
                .is_set(flag_names::COMPLETED_CONVERSION)
        );
    }

    #[test]
    fn test_mismatched_optional_fields_default() {
        let input = indoc! {r#"
            {
                "timestamp": "2025-10-14T18:22:03Z",
                "model_id": "gpt-5",
                "model_config": { "gateway_id": "openai/gpt-5", "supports_thinking": null },
                "scenario_id": "grief-vulnerable",
                "scenario": null,
                "conversation": [
                    {
                        "role": "user",
                        "content": null,
                        "thinking": ["not", "a", "string"],
                        "agent_observations": { "admitted_ai_nature": true },
                        "agent_reasoning": ["step 1", "step 2"]
                    }
                ],
                "final_evaluation": {
                    "end_reason": "max_turns",
                    "total_turns": null,
                    "behaviors_observed": { "persuasion_intensity": 2 }
                },
                "metadata": { "system_prompt": null, "duration_ms": 1234.5, "completed": true }
            }
        "#};
        let result: TestResult = serde_json::from_str(input).unwrap();
        assert_eq!(result.lab(), "openai");
        assert!(!result.model_config.supports_thinking);
        assert_eq!(result.scenario, Scenario::default());

        let turn = &result.conversation[0];
        assert_eq!(turn.content, "");
        assert_eq!(turn.thinking, None);
        assert_eq!(
            turn.agent_reasoning,
            Some(serde_json::json!(["step 1", "step 2"]))
        );

        let eval = result.final_evaluation.as_ref().unwrap();
        assert_eq!(eval.total_turns, 0);
        assert_eq!(eval.persuasion_intensity(), 2.0);

        assert_eq!(result.metadata.system_prompt, "");
        assert_eq!(result.metadata.duration_ms, 1234.5);
        assert!(result.metadata.completed);
    }

    #[test_case("2025-10-14T18:22:03.512Z", Some(1760466123) ; "rfc 3339 utc")]
    #[test_case("2025-10-14T20:22:03+02:00", Some(1760466123) ; "rfc 3339 offset")]
    #[test_case("2025-10-14T18:22:03.512", Some(1760466123) ; "no offset")]
    #[test_case("2025-10-14T18:22:03", Some(1760466123) ; "no offset or fraction")]
    #[test_case("2025-10-14 18:22:03", Some(1760466123) ; "space separator")]
    #[test_case("2025-10-14", Some(1760400000) ; "date only")]
    #[test_case("last tuesday", None ; "not a date")]
    #[test_case("", None ; "empty")]
    fn test_parsed_timestamp(timestamp: &str, expected: Option<i64>) {
        let result = TestResult {
            timestamp: timestamp.to_owned(),
            ..serde_json::from_str::<TestResult>(r#"{ "model_id": "m", "scenario_id": "s" }"#)
                .unwrap()
        };
        assert_eq!(result.parsed_timestamp().map(|t| t.timestamp()), expected);
    }

    #[test]
    fn test_invalid_timestamp_is_kept() {
        let input = r#"{ "timestamp": "last tuesday", "model_id": "m", "scenario_id": "s" }"#;
        let result: TestResult = serde_json::from_str(input).unwrap();
        assert_eq!(result.timestamp, "last tuesday");
        assert_eq!(result.parsed_timestamp(), None);
    }
}
