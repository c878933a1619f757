use matchday_terminal::api_error::ApiError;
use matchday_terminal::state::{
    AppState, Delta, PredictionResult, ProviderCommand, RequestState, TeamRef, apply_delta,
};

fn team(id: &str, name: &str) -> TeamRef {
    TeamRef {
        id: id.to_string(),
        name: name.to_string(),
        crest: None,
    }
}

fn state_with_directory() -> AppState {
    let mut state = AppState::new();
    state.teams = vec![team("A", "Arsenal"), team("B", "Brentford")];
    state
}

fn in_flight_token(state: &AppState) -> u64 {
    match state.request {
        RequestState::InFlight { token } => token,
        ref other => panic!("expected in-flight request, got {other:?}"),
    }
}

fn sample_result() -> PredictionResult {
    PredictionResult {
        home_win: 0.6,
        draw: 0.25,
        away_win: 0.15,
    }
}

#[test]
fn submit_is_a_noop_without_a_submittable_selection() {
    let mut state = state_with_directory();
    assert!(state.begin_submit().is_none());
    assert_eq!(state.request, RequestState::Idle);

    state.selection.set_home("A");
    assert!(state.begin_submit().is_none());
    assert_eq!(state.request, RequestState::Idle);

    state.selection.set_away("A");
    assert!(state.begin_submit().is_none());
    assert_eq!(state.request, RequestState::Idle);
}

#[test]
fn submit_rejects_ids_missing_from_the_directory() {
    let mut state = state_with_directory();
    state.selection.set_home("A");
    state.selection.set_away("gone");
    assert!(state.begin_submit().is_none());
    assert_eq!(state.request, RequestState::Idle);
}

#[test]
fn submit_issues_the_serialized_selection_under_a_fresh_token() {
    let mut state = state_with_directory();
    state.selection.set_home("A");
    state.selection.set_away("B");

    let cmd = state.begin_submit().expect("submittable selection");
    let token = in_flight_token(&state);
    assert_eq!(
        cmd,
        ProviderCommand::Predict {
            home: "A".to_string(),
            away: "B".to_string(),
            token,
        }
    );
    assert!(state.request.is_loading());
}

#[test]
fn matching_settle_succeeds_and_clears_loading() {
    let mut state = state_with_directory();
    state.selection.set_home("A");
    state.selection.set_away("B");
    state.begin_submit().expect("submittable selection");
    let token = in_flight_token(&state);

    apply_delta(
        &mut state,
        Delta::PredictionSettled {
            token,
            outcome: Ok(sample_result()),
        },
    );

    assert_eq!(state.request, RequestState::Succeeded(sample_result()));
    assert!(!state.request.is_loading());
}

#[test]
fn failed_settle_clears_loading_and_reenables_submit() {
    let mut state = state_with_directory();
    state.selection.set_home("A");
    state.selection.set_away("B");
    state.begin_submit().expect("submittable selection");
    let token = in_flight_token(&state);

    apply_delta(
        &mut state,
        Delta::PredictionSettled {
            token,
            outcome: Err(ApiError::Status {
                status: 500,
                body: "internal error".to_string(),
            }),
        },
    );

    assert!(matches!(state.request, RequestState::Failed(_)));
    assert!(!state.request.is_loading());
    // A manual resubmission must be possible straight away.
    assert!(state.begin_submit().is_some());
}

#[test]
fn latest_submission_wins_regardless_of_arrival_order() {
    let mut state = state_with_directory();
    state.selection.set_home("A");
    state.selection.set_away("B");

    state.begin_submit().expect("first submit");
    let first = in_flight_token(&state);
    state.begin_submit().expect("second submit");
    let second = in_flight_token(&state);
    assert!(second > first);

    // Stale response while still in flight: ignored.
    apply_delta(
        &mut state,
        Delta::PredictionSettled {
            token: first,
            outcome: Ok(PredictionResult {
                home_win: 0.1,
                draw: 0.1,
                away_win: 0.8,
            }),
        },
    );
    assert_eq!(state.request, RequestState::InFlight { token: second });

    // The latest submission settles.
    apply_delta(
        &mut state,
        Delta::PredictionSettled {
            token: second,
            outcome: Ok(sample_result()),
        },
    );
    assert_eq!(state.request, RequestState::Succeeded(sample_result()));

    // A second stale arrival after the terminal transition is also ignored.
    apply_delta(
        &mut state,
        Delta::PredictionSettled {
            token: first,
            outcome: Err(ApiError::Timeout),
        },
    );
    assert_eq!(state.request, RequestState::Succeeded(sample_result()));
}

#[test]
fn settle_without_a_request_in_flight_is_ignored() {
    let mut state = state_with_directory();
    apply_delta(
        &mut state,
        Delta::PredictionSettled {
            token: 42,
            outcome: Ok(sample_result()),
        },
    );
    assert_eq!(state.request, RequestState::Idle);
}

#[test]
fn timeout_settle_is_a_terminal_failure() {
    let mut state = state_with_directory();
    state.selection.set_home("A");
    state.selection.set_away("B");
    state.begin_submit().expect("submittable selection");
    let token = in_flight_token(&state);

    apply_delta(
        &mut state,
        Delta::PredictionSettled {
            token,
            outcome: Err(ApiError::Timeout),
        },
    );
    assert_eq!(state.request, RequestState::Failed(ApiError::Timeout));
}
