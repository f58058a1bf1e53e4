use super::*;
use crate::platform::error::PlatformError;
use crate::testing::factory;
use crate::testing::mock::GuildFixture;

/// Tests that the implicit default role is never cloned.
///
/// Source carries one real role and the default role; exactly one role is
/// created and the mapping (observable through the reorder pass) has exactly
/// one entry.
///
/// Expected: Ok with one role created.
#[tokio::test]
async fn skips_the_default_role() {
    let state = MockState::new();

    let mut source = GuildFixture::new(SOURCE, "Source");
    source.roles = vec![factory::role(1, "mod", 2), factory::everyone_role(2)];
    state.add_guild(source);
    state.add_guild(GuildFixture::new(TARGET, "Target"));

    let (cloner, _sink, _images) = cloner_with(&state).await;
    let snapshot = cloner
        .clone_server(SOURCE, TARGET, &CloneOptions::default())
        .await
        .unwrap();

    assert_eq!(snapshot.roles_created, 1);

    let created = state.created_roles.lock();
    assert_eq!(created.len(), 1);
    assert_eq!(created[0].1.name, "mod");

    // The reorder pass walks the mapping, so it shows which roles got an
    // entry: exactly the one created role, at its source position.
    assert_eq!(*state.role_positions.lock(), vec![(created[0].0, 2)]);
}

/// Tests that roles are created lowest hierarchy position first.
#[tokio::test]
async fn creates_roles_in_position_order() {
    let state = MockState::new();

    let mut source = GuildFixture::new(SOURCE, "Source");
    source.roles = vec![
        factory::role(1, "admin", 3),
        factory::role(2, "member", 1),
        factory::role(3, "mod", 2),
    ];
    state.add_guild(source);
    state.add_guild(GuildFixture::new(TARGET, "Target"));

    let (cloner, _sink, _images) = cloner_with(&state).await;
    cloner
        .clone_server(SOURCE, TARGET, &CloneOptions::default())
        .await
        .unwrap();

    let names: Vec<String> = state
        .created_roles
        .lock()
        .iter()
        .map(|(_, role)| role.name.clone())
        .collect();
    assert_eq!(names, vec!["member", "mod", "admin"]);
}

/// Tests that a per-role failure is counted, reported, and skipped without
/// ending the phase, and that the failed role gets no mapping entry.
#[tokio::test]
async fn failed_role_is_counted_and_skipped() {
    let state = MockState::new();

    let mut source = GuildFixture::new(SOURCE, "Source");
    source.roles = vec![factory::role(1, "mod", 1), factory::role(2, "admin", 2)];
    state.add_guild(source);
    state.add_guild(GuildFixture::new(TARGET, "Target"));
    state.fail_next("create_role:mod", PlatformError::Forbidden);

    let (cloner, sink, _images) = cloner_with(&state).await;
    let snapshot = cloner
        .clone_server(SOURCE, TARGET, &CloneOptions::default())
        .await
        .unwrap();

    assert_eq!(snapshot.roles_created, 1);
    assert_eq!(snapshot.failed, 1);
    assert!(sink.contains("⚠️ Failed role mod"));

    let created = state.created_roles.lock();
    assert_eq!(created.len(), 1);
    assert_eq!(created[0].1.name, "admin");

    // Only the successfully created role is repositioned.
    assert_eq!(*state.role_positions.lock(), vec![(created[0].0, 2)]);
}

/// Tests that position-set failures in the reorder pass are swallowed and
/// never fail the run.
#[tokio::test]
async fn reorder_failures_are_swallowed() {
    let state = MockState::new();

    let mut source = GuildFixture::new(SOURCE, "Source");
    source.roles = vec![factory::role(1, "mod", 1)];
    state.add_guild(source);
    state.add_guild(GuildFixture::new(TARGET, "Target"));
    state.fail_next(
        "set_role_position",
        PlatformError::Api("position rejected".to_string()),
    );

    let (cloner, _sink, _images) = cloner_with(&state).await;
    let snapshot = cloner
        .clone_server(SOURCE, TARGET, &CloneOptions::default())
        .await
        .unwrap();

    assert_eq!(snapshot.roles_created, 1);
    assert_eq!(snapshot.failed, 0);
    assert!(state.role_positions.lock().is_empty());
}
