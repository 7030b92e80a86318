//! Step functions.
//!
//! A step reads the state and returns a [`StepOutput`] describing what it wants
//! written. It never mutates the state itself; the engine applies the output
//! in one go, so a step that fails leaves nothing behind.

use once_cell::sync::Lazy;
use regex::Regex;

use super::errors::EngineError;
use super::extraction::{
    decode, normalize_actions, normalize_list, DomainClassification, ExtractedActions,
    ExtractedGoals, ExtractedSegments, Extraction,
};
use super::product_domain::ProductDomain;
use super::prompts;
use super::state::ConversationState;
use super::step::Step;
use crate::ports::ExtractionOracle;

/// Whole-word negatives that mean "no distinct user types".
static NO_SEGMENTS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(no|none|same|everyone)\b").expect("literal pattern"));

/// A single field write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldUpdate {
    Classification {
        domain: ProductDomain,
        product_description: String,
    },
    KeyActions(Vec<String>),
    UserSegments(Vec<String>),
    BusinessGoals(Vec<String>),
    ReadyForLabeling,
}

/// Everything one step wants applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepOutput {
    pub updates: Vec<FieldUpdate>,
    pub reply: Option<String>,
}

impl StepOutput {
    pub fn reply(text: impl Into<String>) -> Self {
        Self {
            updates: Vec::new(),
            reply: Some(text.into()),
        }
    }

    pub fn update(update: FieldUpdate) -> Self {
        Self {
            updates: vec![update],
            reply: None,
        }
    }

    pub fn and(mut self, update: FieldUpdate) -> Self {
        self.updates.push(update);
        self
    }

    /// Writes the output into `state`. Returns true if a reply was appended.
    pub fn apply_to(self, state: &mut ConversationState) -> bool {
        for update in self.updates {
            match update {
                FieldUpdate::Classification {
                    domain,
                    product_description,
                } => {
                    state.domain = Some(domain);
                    state.product_description = Some(product_description);
                }
                FieldUpdate::KeyActions(actions) => state.key_actions = actions,
                FieldUpdate::UserSegments(segments) => state.user_segments = segments,
                FieldUpdate::BusinessGoals(goals) => state.business_goals = goals,
                FieldUpdate::ReadyForLabeling => state.ready_for_labeling = true,
            }
        }

        match self.reply {
            Some(text) => {
                state.push_assistant_message(text);
                true
            }
            None => false,
        }
    }
}

/// True when the operator said their users are all alike.
pub fn signals_no_segments(text: &str) -> bool {
    NO_SEGMENTS.is_match(text)
}

/// Runs the step function for `step` against `state`.
///
/// The terminal marker has no step function; executing it yields an empty
/// output.
pub async fn execute(
    step: Step,
    state: &ConversationState,
    oracle: &dyn ExtractionOracle,
) -> Result<StepOutput, EngineError> {
    match step {
        Step::Greeting => Ok(StepOutput::reply(prompts::GREETING)),
        Step::ClassifyDomain => classify_domain(state, oracle).await,
        Step::AskActions => Ok(StepOutput::reply(prompts::ask_actions(state.domain))),
        Step::ExtractActions => extract_actions(state, oracle).await,
        Step::AskSegments => Ok(StepOutput::reply(prompts::ASK_SEGMENTS)),
        Step::ExtractSegments => extract_segments(state, oracle).await,
        Step::AskGoals => Ok(StepOutput::reply(prompts::ASK_GOALS)),
        Step::ExtractGoals => extract_goals(state, oracle).await,
        Step::Complete => Ok(StepOutput::reply(prompts::closing(&state.key_actions))),
        Step::End => Ok(StepOutput::default()),
    }
}

async fn classify_domain(
    state: &ConversationState,
    oracle: &dyn ExtractionOracle,
) -> Result<StepOutput, EngineError> {
    let description = user_input(state, Step::ClassifyDomain)?;
    let result: DomainClassification = ask(
        oracle,
        Step::ClassifyDomain,
        &prompts::classify_domain(description),
    )
    .await?;

    Ok(StepOutput::update(FieldUpdate::Classification {
        domain: result.domain,
        product_description: description.to_string(),
    }))
}

async fn extract_actions(
    state: &ConversationState,
    oracle: &dyn ExtractionOracle,
) -> Result<StepOutput, EngineError> {
    let response = user_input(state, Step::ExtractActions)?;
    let result: ExtractedActions =
        ask(oracle, Step::ExtractActions, &prompts::extract_actions(response)).await?;

    Ok(StepOutput::update(FieldUpdate::KeyActions(normalize_actions(
        result.actions,
    ))))
}

async fn extract_segments(
    state: &ConversationState,
    oracle: &dyn ExtractionOracle,
) -> Result<StepOutput, EngineError> {
    let response = user_input(state, Step::ExtractSegments)?;
    if signals_no_segments(response) {
        return Ok(StepOutput::update(FieldUpdate::UserSegments(Vec::new())));
    }

    let result: ExtractedSegments =
        ask(oracle, Step::ExtractSegments, &prompts::extract_segments(response)).await?;

    Ok(StepOutput::update(FieldUpdate::UserSegments(normalize_list(
        result.segments,
    ))))
}

async fn extract_goals(
    state: &ConversationState,
    oracle: &dyn ExtractionOracle,
) -> Result<StepOutput, EngineError> {
    let response = user_input(state, Step::ExtractGoals)?;
    let result: ExtractedGoals =
        ask(oracle, Step::ExtractGoals, &prompts::extract_goals(response)).await?;

    Ok(StepOutput::update(FieldUpdate::BusinessGoals(normalize_list(result.goals)))
        .and(FieldUpdate::ReadyForLabeling))
}

fn user_input(state: &ConversationState, step: Step) -> Result<&str, EngineError> {
    state
        .last_user_message()
        .ok_or(EngineError::MissingUserMessage { step })
}

async fn ask<T: Extraction>(
    oracle: &dyn ExtractionOracle,
    step: Step,
    prompt: &str,
) -> Result<T, EngineError> {
    let value = oracle
        .extract_structured(T::SCHEMA, prompt)
        .await
        .map_err(|e| EngineError::from_oracle(step, e))?;

    decode(value).map_err(|e| EngineError::from_oracle(step, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::setup::ExtractionSchema;
    use crate::ports::OracleError;
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::sync::Mutex;

    /// Oracle returning one canned value, counting calls.
    struct CannedOracle {
        answer: Result<Value, OracleError>,
        calls: Mutex<Vec<ExtractionSchema>>,
    }

    impl CannedOracle {
        fn answering(value: Value) -> Self {
            Self {
                answer: Ok(value),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn failing(err: OracleError) -> Self {
            Self {
                answer: Err(err),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl ExtractionOracle for CannedOracle {
        async fn complete(&self, _system: &str, _user: &str) -> Result<String, OracleError> {
            Ok(String::new())
        }

        async fn extract_structured(
            &self,
            schema: ExtractionSchema,
            _prompt: &str,
        ) -> Result<Value, OracleError> {
            self.calls.lock().unwrap().push(schema);
            self.answer.clone()
        }
    }

    fn state_with_reply(step: Step, reply: &str) -> ConversationState {
        let mut state = ConversationState::new();
        state.current_step = step;
        state.record_user_message(reply);
        state
    }

    #[test]
    fn negative_words_match_whole_words_only() {
        assert!(signals_no_segments("no"));
        assert!(signals_no_segments("None, everyone's the same"));
        assert!(signals_no_segments("NO."));
        assert!(signals_no_segments("they're all the same"));
        assert!(!signals_no_segments("buyers and sellers"));
        assert!(!signals_no_segments("nobody pays, some are anonymous"));
        assert!(!signals_no_segments("notable customers"));
    }

    #[tokio::test]
    async fn ask_steps_never_call_oracle() {
        let oracle = CannedOracle::answering(json!({}));
        let state = ConversationState::new();

        for step in [Step::Greeting, Step::AskActions, Step::AskSegments, Step::AskGoals, Step::Complete] {
            let output = execute(step, &state, &oracle).await.unwrap();
            assert!(output.reply.is_some(), "{} produced no reply", step);
            assert!(output.updates.is_empty());
        }
        assert_eq!(oracle.call_count(), 0);
    }

    #[tokio::test]
    async fn classify_domain_records_description_and_domain() {
        let oracle = CannedOracle::answering(json!({"domain": "ecommerce", "reasoning": "shop"}));
        let state = state_with_reply(Step::ClassifyDomain, "An online store selling sneakers");

        let output = execute(Step::ClassifyDomain, &state, &oracle).await.unwrap();

        assert_eq!(
            output.updates,
            vec![FieldUpdate::Classification {
                domain: ProductDomain::Ecommerce,
                product_description: "An online store selling sneakers".into(),
            }]
        );
        assert!(output.reply.is_none());
    }

    #[tokio::test]
    async fn extract_actions_normalizes_result() {
        let oracle = CannedOracle::answering(json!({"actions": ["Added To Cart", "purchased", "purchased"]}));
        let state = state_with_reply(Step::ExtractActions, "add to cart and purchases");

        let output = execute(Step::ExtractActions, &state, &oracle).await.unwrap();

        assert_eq!(
            output.updates,
            vec![FieldUpdate::KeyActions(vec!["added_to_cart".into(), "purchased".into()])]
        );
    }

    #[tokio::test]
    async fn extract_segments_short_circuits_on_no() {
        for reply in ["no", "None, everyone's the same"] {
            let oracle = CannedOracle::answering(json!({"segments": ["x"]}));
            let state = state_with_reply(Step::ExtractSegments, reply);

            let output = execute(Step::ExtractSegments, &state, &oracle).await.unwrap();

            assert_eq!(output.updates, vec![FieldUpdate::UserSegments(vec![])]);
            assert_eq!(oracle.call_count(), 0);
        }
    }

    #[tokio::test]
    async fn extract_segments_calls_oracle_once() {
        let oracle = CannedOracle::answering(json!({"segments": ["buyers", "sellers"]}));
        let state = state_with_reply(Step::ExtractSegments, "buyers and sellers");

        let output = execute(Step::ExtractSegments, &state, &oracle).await.unwrap();

        assert_eq!(
            output.updates,
            vec![FieldUpdate::UserSegments(vec!["buyers".into(), "sellers".into()])]
        );
        assert_eq!(oracle.call_count(), 1);
    }

    #[tokio::test]
    async fn extract_goals_marks_ready() {
        let oracle = CannedOracle::answering(json!({"goals": ["conversion rate"]}));
        let state = state_with_reply(Step::ExtractGoals, "conversion rate");

        let output = execute(Step::ExtractGoals, &state, &oracle).await.unwrap();

        assert!(output.updates.contains(&FieldUpdate::ReadyForLabeling));
    }

    #[tokio::test]
    async fn oracle_error_propagates_with_step() {
        let oracle = CannedOracle::failing(OracleError::Timeout { timeout_ms: 10 });
        let state = state_with_reply(Step::ExtractActions, "purchases");

        let err = execute(Step::ExtractActions, &state, &oracle).await.unwrap_err();

        assert!(matches!(
            err,
            EngineError::OracleFailure {
                step: Step::ExtractActions,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn malformed_answer_is_schema_failure() {
        let oracle = CannedOracle::answering(json!({"actions": "purchased"}));
        let state = state_with_reply(Step::ExtractActions, "purchases");

        let err = execute(Step::ExtractActions, &state, &oracle).await.unwrap_err();

        assert!(matches!(err, EngineError::SchemaConformance { .. }));
    }

    #[tokio::test]
    async fn extract_without_user_message_fails() {
        let oracle = CannedOracle::answering(json!({"goals": []}));
        let state = ConversationState::new();

        let err = execute(Step::ExtractGoals, &state, &oracle).await.unwrap_err();

        assert_eq!(err, EngineError::MissingUserMessage { step: Step::ExtractGoals });
        assert_eq!(oracle.call_count(), 0);
    }

    #[test]
    fn apply_writes_fields_and_reply() {
        let mut state = ConversationState::new();
        let appended = StepOutput::update(FieldUpdate::BusinessGoals(vec!["revenue".into()]))
            .and(FieldUpdate::ReadyForLabeling)
            .apply_to(&mut state);

        assert!(!appended);
        assert_eq!(state.business_goals, vec!["revenue"]);
        assert!(state.ready_for_labeling);

        assert!(StepOutput::reply("hello").apply_to(&mut state));
        assert_eq!(state.last_assistant_message(), Some("hello"));
    }
}
