//! Service-level behaviour: state invariants, failures, sessions,
//! threshold configuration and seed persistence.

use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use waterwatch_core::dialog::render;
use waterwatch_core::testing::{fixture_date, fixture_today, TestHarness};
use waterwatch_core::{
    Band, ConversationId, ConversationState, OverallBand, QueryService, SeedData, ServiceConfig,
    Step, ThresholdBand,
};

const MESSAGES: [&str; 9] = [
    "northern",
    "chiang",
    "mae rim",
    "hang dong 2025-09-01",
    "2025-08-01",
    "nothing here",
    "help",
    "reset",
    "",
];

/// Every message sequence of `len` drawn from `MESSAGES`.
fn sequences(len: u32) -> impl Iterator<Item = Vec<&'static str>> {
    let base = MESSAGES.len();
    (0..base.pow(len)).map(move |mut n| {
        (0..len)
            .map(|_| {
                let message = MESSAGES[n % base];
                n /= base;
                message
            })
            .collect()
    })
}

// =============================================================================
// STATE INVARIANTS
// =============================================================================

#[test]
fn test_state_invariant_holds_for_all_sequences() {
    let service = TestHarness::new().service();

    for (i, sequence) in sequences(4).enumerate() {
        let id = ConversationId::new(format!("seq-{i}"));
        for message in &sequence {
            let reply = service.handle_message_on(&id, message, fixture_today());
            let state = &reply.state;
            assert!(state.is_consistent(), "{sequence:?} reached {state:?}");
            match state.step() {
                Step::Idle => assert!(state.region().is_none()),
                Step::RegionChosen => assert!(state.region().is_some() && state.province().is_none()),
                Step::ProvinceChosen => assert!(state.province().is_some() && state.district().is_none()),
                Step::DistrictChosen => assert!(state.district().is_some()),
            }
        }
    }
}

#[test]
fn test_reset_is_idempotent_from_any_state() {
    let service = TestHarness::new().service();

    for (i, sequence) in sequences(3).enumerate() {
        let id = ConversationId::new(format!("reset-{i}"));
        for message in &sequence {
            service.handle_message_on(&id, message, fixture_today());
        }

        let first = service.handle_message_on(&id, "reset", fixture_today());
        let second = service.handle_message_on(&id, "reset", fixture_today());

        assert_eq!(first.state, ConversationState::new());
        assert_eq!(second.state, ConversationState::new());
        assert_eq!(first.response, second.response);
    }
}

#[test]
fn test_same_input_resolves_the_same_way() {
    let harness = TestHarness::new();
    let first = harness.console().send("north").state;
    let second = harness.console().send("north").state;
    assert_eq!(first, second);
}

// =============================================================================
// BACKING STORE FAILURES
// =============================================================================

#[test]
fn test_metric_store_failure_leaves_state_unchanged() {
    let service = TestHarness::new().service_with_failing_metrics();
    let id = ConversationId::from("failing-metrics");
    service.handle_message_on(&id, "northern", fixture_today());
    let before = service
        .handle_message_on(&id, "chiang mai", fixture_today())
        .state;

    let reply = service.handle_message_on(&id, "mae rim 2025-09-01", fixture_today());

    assert!(reply.unavailable);
    assert_eq!(reply.response, render::UNAVAILABLE);
    assert_eq!(reply.state, before);
    assert_eq!(service.state(&id), Some(before));
}

#[test]
fn test_catalog_failure_leaves_state_unchanged() {
    let service = TestHarness::new().service_with_failing_catalog();
    let id = ConversationId::from("failing-catalog");

    let reply = service.handle_message_on(&id, "northern", fixture_today());

    assert!(reply.unavailable);
    assert_eq!(reply.state.step(), Step::Idle);
    assert!(!reply.response.contains("connection refused"));
}

#[test]
fn test_reset_and_help_work_without_stores() {
    let service = TestHarness::new().service_with_failing_catalog();
    let id = ConversationId::from("offline");

    assert!(!service.handle_message_on(&id, "help", fixture_today()).unavailable);
    assert_eq!(
        service.handle_message_on(&id, "reset", fixture_today()).response,
        render::RESET_GUIDANCE
    );
}

// =============================================================================
// SESSIONS
// =============================================================================

#[test]
fn test_conversations_are_isolated() {
    let service = TestHarness::new().service();
    let alice = ConversationId::from("alice");
    let bob = ConversationId::from("bob");

    service.handle_message_on(&alice, "northern", fixture_today());
    service.handle_message_on(&bob, "southern", fixture_today());
    service.handle_message_on(&alice, "chiang mai", fixture_today());

    assert_eq!(service.state(&alice).unwrap().province(), Some("Chiang Mai"));
    assert_eq!(service.state(&bob).unwrap().region(), Some("Southern"));
    assert_eq!(service.state(&bob).unwrap().step(), Step::RegionChosen);
    assert_eq!(service.active_conversations(), 2);
}

#[test]
fn test_idle_conversation_starts_over() {
    let harness =
        TestHarness::new().with_config(ServiceConfig::new().with_idle_timeout(Duration::ZERO));
    let service = harness.service();
    let id = ConversationId::from("forgetful");

    let first = service.handle_message_on(&id, "northern", fixture_today());
    assert_eq!(first.state.step(), Step::RegionChosen);

    // The region choice has expired, so "chiang mai" is read as a region.
    let second = service.handle_message_on(&id, "chiang mai", fixture_today());
    assert_eq!(second.state.step(), Step::Idle);
    assert!(second.response.starts_with("No region matches"));
}

#[test]
fn test_concurrent_conversations() {
    let service = TestHarness::new().service();

    std::thread::scope(|scope| {
        for i in 0..8 {
            let service = Arc::clone(&service);
            scope.spawn(move || {
                let id = ConversationId::new(format!("worker-{i}"));
                for message in ["northern", "chiang mai", "mae rim 2025-09-01"] {
                    service.handle_message_on(&id, message, fixture_today());
                }
            });
        }
    });

    for i in 0..8 {
        let state = service
            .state(&ConversationId::new(format!("worker-{i}")))
            .unwrap();
        assert_eq!(state.district(), Some("Mae Rim"));
    }
}

#[test]
fn test_shared_conversation_stays_consistent() {
    let service = TestHarness::new().service();
    let id = ConversationId::new("shared");

    std::thread::scope(|scope| {
        for i in 0..16 {
            let service = Arc::clone(&service);
            let id = id.clone();
            scope.spawn(move || {
                for n in 0..MESSAGES.len() * 4 {
                    let message = MESSAGES[(i + n) % MESSAGES.len()];
                    let reply = service.handle_message_on(&id, message, fixture_today());
                    assert!(
                        reply.state.is_consistent(),
                        "inconsistent state after {message:?}: {:?}",
                        reply.state
                    );
                }
            });
        }
    });

    let state = service.state(&id).expect("conversation tracked");
    assert!(state.is_consistent());
    assert_eq!(service.active_conversations(), 1);
}

#[test]
fn test_custom_keywords() {
    let harness =
        TestHarness::new().with_config(ServiceConfig::new().with_reset_keyword("back to start"));
    let mut console = harness.console();
    console.send("northern");

    let reply = console.send("take me back to start");
    assert_eq!(reply.state, ConversationState::new());
}

// =============================================================================
// DISTRICT STATUS AND THRESHOLD CONFIGURATION
// =============================================================================

#[test]
fn test_district_status() {
    let service = TestHarness::new().service();

    let report = service
        .district_status("Songkhla", "Hat Yai", fixture_date())
        .unwrap()
        .expect("Hat Yai has readings");

    let bands: Vec<_> = report.results.iter().map(|r| r.band).collect();
    assert_eq!(bands, [Band::Good, Band::Warning, Band::Good, Band::Warning]);
    assert_eq!(report.overall.band, OverallBand::Warning);
    assert_eq!(report.overall.display_text, "some items need attention");

    assert!(service
        .district_status("Songkhla", "Hat Yai", fixture_today())
        .unwrap()
        .is_none());
    assert!(service
        .district_status("Chiang Mai", "Hat Yai", fixture_date())
        .unwrap()
        .is_none());
}

#[test]
fn test_threshold_changes_apply_to_next_query() {
    let service = TestHarness::new().service();
    let before = service
        .district_status("Chiang Mai", "Hang Dong", fixture_date())
        .unwrap()
        .unwrap();
    assert_eq!(before.overall.band, OverallBand::Critical);

    service
        .upsert_threshold(ThresholdBand::new("pressure").disabled())
        .unwrap();

    let after = service
        .district_status("Chiang Mai", "Hang Dong", fixture_date())
        .unwrap()
        .unwrap();
    assert_eq!(after.results[2].band, Band::Unknown);
    assert_eq!(after.overall.band, OverallBand::Warning);

    assert!(service.delete_threshold("pressure").unwrap());
    assert!(!service.delete_threshold("pressure").unwrap());
}

// =============================================================================
// SEED PERSISTENCE
// =============================================================================

#[tokio::test]
async fn test_service_from_saved_seed() {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join("seed.json");

    TestHarness::new()
        .seed()
        .save_json(&path)
        .await
        .expect("Save should succeed");

    let seed = SeedData::load_json(&path).await.expect("Load should succeed");
    assert_eq!(seed.metadata.districts, 7);

    let service = QueryService::from_seed(seed, ServiceConfig::new()).unwrap();
    let id = ConversationId::from("seeded");
    service.handle_message_on(&id, "northern", fixture_today());
    service.handle_message_on(&id, "chiang mai", fixture_today());
    let reply = service.handle_message_on(&id, "hang dong 2025-09-01", fixture_today());

    assert!(reply
        .response
        .contains("Overall status: items require urgent action"));
}
