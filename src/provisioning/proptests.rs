//! Property-based tests for the provisioning state machine
//!
//! Commit is reachable only after a passed test, and a verify cycle never
//! asks for more than one persist.

use super::*;
use crate::error::ClientError;
use proptest::prelude::*;

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn valid_draft() -> ConnectionDraft {
    ConnectionDraft {
        name: "prod".to_string(),
        host: "db.example.com".to_string(),
        username: "app".to_string(),
        secret: "s3cret".to_string(),
        database_name: "app".to_string(),
        ..ConnectionDraft::default()
    }
}

fn arb_draft() -> impl Strategy<Value = ConnectionDraft> {
    prop_oneof![
        4 => Just(valid_draft()),
        1 => Just(ConnectionDraft::default()),
    ]
}

fn arb_error() -> impl Strategy<Value = ClientError> {
    prop_oneof![
        "[a-z ]{1,20}".prop_map(ClientError::Transport),
        "[a-z ]{1,20}".prop_map(ClientError::Validation),
    ]
}

fn arb_event() -> impl Strategy<Value = Event> {
    prop_oneof![
        arb_draft().prop_map(|draft| Event::Verify { draft }),
        Just(Event::Edit),
        Just(Event::Commit),
        (1i64..50).prop_map(|connection_id| Event::ConnectionCreated { connection_id }),
        arb_error().prop_map(|error| Event::CreateFailed { error }),
        "[a-z ]{0,20}".prop_map(|message| Event::TestPassed { message }),
        "[a-z ]{0,20}".prop_map(|message| Event::TestRejected { message }),
        arb_error().prop_map(|error| Event::TestErrored { error }),
        Just(Event::Interrupted),
    ]
}

fn arb_context() -> impl Strategy<Value = ProvisionContext> {
    any::<bool>().prop_map(|scan_on_commit| ProvisionContext { scan_on_commit })
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn commit_requires_a_passed_test(
        events in proptest::collection::vec(arb_event(), 0..40),
        context in arb_context(),
    ) {
        let mut state = ProvisionState::Draft;
        let mut passed_since_verify = false;

        for event in events {
            let is_commit = matches!(event, Event::Commit);
            let is_pass = matches!(event, Event::TestPassed { .. });
            let is_verify = matches!(event, Event::Verify { .. } | Event::Edit);
            let before = state.clone();

            if let Ok(result) = transition(&state, &context, event) {
                if is_commit {
                    prop_assert!(passed_since_verify, "commit accepted from {:?}", before);
                    prop_assert!(matches!(before, ProvisionState::Verified { .. }), "expected Verified before commit, got {:?}", before);
                    prop_assert!(matches!(result.new_state, ProvisionState::Committed { .. }), "expected Committed after commit, got {:?}", result.new_state);
                }
                if is_pass {
                    passed_since_verify = true;
                }
                if is_verify {
                    passed_since_verify = false;
                }
                state = result.new_state;
            }
        }
    }

    #[test]
    fn at_most_one_create_per_verify_cycle(
        events in proptest::collection::vec(arb_event(), 0..40),
        context in arb_context(),
    ) {
        let mut state = ProvisionState::Draft;
        let mut creates_in_cycle = 0;

        for event in events {
            let entering_verify = matches!(event, Event::Verify { .. });
            if let Ok(result) = transition(&state, &context, event) {
                if entering_verify {
                    creates_in_cycle = 0;
                }
                creates_in_cycle += result
                    .effects
                    .iter()
                    .filter(|e| matches!(e, Effect::CreateConnection { .. }))
                    .count();
                prop_assert!(creates_in_cycle <= 1);
                state = result.new_state;
            }
        }
    }

    #[test]
    fn already_in_progress_only_while_verifying(
        events in proptest::collection::vec(arb_event(), 0..40),
        context in arb_context(),
    ) {
        let mut state = ProvisionState::Draft;
        for event in events {
            match transition(&state, &context, event) {
                Ok(result) => state = result.new_state,
                Err(TransitionError::AlreadyInProgress) => {
                    prop_assert!(state.is_verifying());
                }
                Err(_) => {}
            }
        }
    }

    #[test]
    fn assigned_id_survives_test_failure(id in 1i64..1000, reason in "[a-z ]{1,20}") {
        let verifying = ProvisionState::Verifying { connection_id: Some(id) };
        let result = transition(
            &verifying,
            &ProvisionContext::default(),
            Event::TestRejected { message: reason },
        ).unwrap();

        prop_assert_eq!(result.new_state.connection_id(), Some(id));
        prop_assert_eq!(result.effects, vec![Effect::orphan(id)]);
        prop_assert_eq!(result.new_state.verification_state(), VerificationState::Failed);
    }
}
