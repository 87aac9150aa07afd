//! Property-based tests for the dispatch state machine
//!
//! Drives whole sessions through the pure transition function with a
//! minimal in-test effect interpreter and checks the turn invariants.

use super::*;
use crate::classify::FailureKind;
use crate::config::InputPolicy;
use crate::context::{ContextLedger, ContextMode, ContextState};
use crate::transcript::{Role, TranscriptStore};
use proptest::prelude::*;
use serde_json::{json, Value};

// ============================================================================
// Test Helpers
// ============================================================================

/// How the service answers one turn
#[derive(Debug, Clone)]
enum Outcome {
    Reply { reply: String, context: Value },
    Fail { kind: FailureKind, detail: Option<String> },
}

impl Outcome {
    fn into_event(self) -> Event {
        match self {
            Outcome::Reply { reply, context } => Event::ReplyReceived {
                reply,
                context: ContextState::Echoed(context),
            },
            Outcome::Fail { kind, detail } => Event::failed(kind, detail),
        }
    }
}

/// Applies effects the way the runtime does, minus the network
struct Harness {
    state: DispatchState,
    context: SessionContext,
    transcript: TranscriptStore,
    ledger: ContextLedger,
    draft: String,
    sent: Vec<String>,
}

impl Harness {
    fn new(policy: InputPolicy) -> Self {
        Self {
            state: DispatchState::Idle,
            context: SessionContext::new(ContextMode::Echoed, policy),
            transcript: TranscriptStore::new(),
            ledger: ContextLedger::new(ContextMode::Echoed),
            draft: String::new(),
            sent: Vec::new(),
        }
    }

    fn apply(&mut self, event: Event) -> Result<Vec<Effect>, TransitionError> {
        let result = transition(&self.state, &self.context, event)?;
        self.state = result.new_state;
        for effect in &result.effects {
            match effect.clone() {
                Effect::AppendTurn { turn } => self.transcript.append(turn),
                Effect::SendRequest { text } => self.sent.push(text),
                Effect::UpdateContext { context } => self.ledger.update(context),
                Effect::SetDraft { text } => self.draft = text,
                Effect::ClearDraft => self.draft.clear(),
                Effect::StartNewSession => {
                    self.transcript.clear();
                    self.ledger.reset();
                }
            }
        }
        Ok(result.effects)
    }
}

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_kind() -> impl Strategy<Value = FailureKind> {
    prop_oneof![
        Just(FailureKind::Network),
        Just(FailureKind::Service),
        Just(FailureKind::Malformed),
    ]
}

fn arb_context() -> impl Strategy<Value = Value> {
    prop_oneof![
        proptest::collection::vec("[a-z0-9]{1,8}", 0..4).prop_map(|v| json!(v)),
        ("[a-z]{1,6}", any::<i64>()).prop_map(|(k, n)| {
            let mut map = serde_json::Map::new();
            map.insert(k, json!(n));
            Value::Object(map)
        }),
    ]
}

fn arb_outcome() -> impl Strategy<Value = Outcome> {
    prop_oneof![
        ("[a-zA-Z0-9 ,.]{1,40}", arb_context())
            .prop_map(|(reply, context)| Outcome::Reply { reply, context }),
        (arb_kind(), proptest::option::of("[a-zA-Z ]{0,30}"))
            .prop_map(|(kind, detail)| Outcome::Fail { kind, detail }),
    ]
}

fn arb_message() -> impl Strategy<Value = String> {
    "[a-zA-Z?][a-zA-Z0-9 ?]{0,40}"
}

fn arb_policy() -> impl Strategy<Value = InputPolicy> {
    prop_oneof![Just(InputPolicy::Clear), Just(InputPolicy::RestoreOnFailure)]
}

fn arb_idle_state() -> impl Strategy<Value = DispatchState> {
    prop_oneof![
        Just(DispatchState::Idle),
        Just(DispatchState::Answered),
        arb_kind().prop_map(|kind| DispatchState::Failed { kind }),
    ]
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    // N settled turns leave exactly 2N alternating entries in submit order
    #[test]
    fn prop_transcript_alternates_in_submit_order(
        turns in proptest::collection::vec((arb_message(), arb_outcome()), 0..12),
        policy in arb_policy(),
    ) {
        let mut harness = Harness::new(policy);
        for (message, outcome) in &turns {
            harness.apply(Event::submit(message.clone())).unwrap();
            harness.apply(outcome.clone().into_event()).unwrap();
        }

        let all = harness.transcript.all();
        prop_assert_eq!(all.len(), turns.len() * 2);
        for (i, (message, _)) in turns.iter().enumerate() {
            prop_assert_eq!(all[2 * i].role, Role::User);
            prop_assert_eq!(&all[2 * i].text, message.trim());
            prop_assert_eq!(all[2 * i + 1].role, Role::Bot);
        }
        prop_assert_eq!(harness.sent.len(), turns.len());
    }

    // A failed turn leaves the ledger exactly as it was; a success replaces it
    #[test]
    fn prop_context_survives_failure_and_follows_success(
        turns in proptest::collection::vec((arb_message(), arb_outcome()), 1..12),
    ) {
        let mut harness = Harness::new(InputPolicy::Clear);
        for (message, outcome) in turns {
            let before = harness.ledger.snapshot();
            harness.apply(Event::submit(message)).unwrap();
            prop_assert_eq!(&harness.ledger.snapshot(), &before);

            harness.apply(outcome.clone().into_event()).unwrap();
            match outcome {
                Outcome::Reply { context, .. } => {
                    prop_assert_eq!(harness.ledger.snapshot(), ContextState::Echoed(context));
                }
                Outcome::Fail { .. } => {
                    prop_assert_eq!(harness.ledger.snapshot(), before);
                }
            }
        }
    }

    // While a request is out, another submit changes nothing
    #[test]
    fn prop_single_flight(
        first in arb_message(),
        extra in proptest::collection::vec(arb_message(), 1..5),
    ) {
        let mut harness = Harness::new(InputPolicy::Clear);
        harness.apply(Event::submit(first)).unwrap();
        let state = harness.state.clone();

        for message in extra {
            let result = harness.apply(Event::submit(message));
            prop_assert_eq!(result.unwrap_err(), TransitionError::Busy);
        }

        prop_assert_eq!(&harness.state, &state);
        prop_assert_eq!(harness.transcript.len(), 1);
        prop_assert_eq!(harness.sent.len(), 1);
    }

    // Every settlement touches the draft exactly once; submission never does
    #[test]
    fn prop_draft_changes_once_per_settlement(
        message in arb_message(),
        outcome in arb_outcome(),
        policy in arb_policy(),
    ) {
        let mut harness = Harness::new(policy);
        harness.apply(Event::EditDraft { text: message.clone() }).unwrap();

        let effects = harness.apply(Event::submit(message.clone())).unwrap();
        prop_assert_eq!(effects.iter().filter(|e| e.is_draft_change()).count(), 0);
        prop_assert_eq!(&harness.draft, &message);

        let failed = matches!(outcome, Outcome::Fail { .. });
        let effects = harness.apply(outcome.into_event()).unwrap();
        prop_assert_eq!(effects.iter().filter(|e| e.is_draft_change()).count(), 1);

        if failed && policy == InputPolicy::RestoreOnFailure {
            prop_assert_eq!(harness.draft, message);
        } else {
            prop_assert!(harness.draft.is_empty());
        }
    }

    // Any idle state accepts a non-blank submission
    #[test]
    fn prop_idle_states_accept_submit(state in arb_idle_state(), message in arb_message()) {
        let result = transition(&state, &SessionContext::default(), Event::submit(message));
        prop_assert!(matches!(result, Ok(TransitionResult { new_state: DispatchState::Sending { .. }, .. })), "expected transition to Sending");
    }

    // Results arriving with nothing in flight are refused
    #[test]
    fn prop_results_need_pending_request(state in arb_idle_state(), outcome in arb_outcome()) {
        let result = transition(&state, &SessionContext::default(), outcome.into_event());
        prop_assert_eq!(result.unwrap_err(), TransitionError::NothingPending);
    }
}

#[test]
fn new_session_clears_history_and_context() {
    let mut harness = Harness::new(InputPolicy::Clear);
    harness.apply(Event::submit("hello")).unwrap();
    harness
        .apply(Event::ReplyReceived {
            reply: "hi".to_string(),
            context: ContextState::Echoed(json!(["hello"])),
        })
        .unwrap();
    assert_eq!(harness.transcript.len(), 2);

    harness.apply(Event::NewSession).unwrap();
    assert!(harness.transcript.is_empty());
    assert_eq!(harness.ledger.snapshot(), ContextState::Echoed(json!([])));
    assert_eq!(harness.state, DispatchState::Idle);
}
