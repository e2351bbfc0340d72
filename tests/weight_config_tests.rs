// Weight configuration invariants and the row-editing state machine.

use compensa_app::db::DbPool;
use compensa_app::error::AppError;
use compensa_app::models::indicator::{
    IndicatorCategory, IndicatorCreateInput, IndicatorUpdateInput,
};
use compensa_app::services::weight_config_service::{EditSession, WeightConfigService};
use tempfile::tempdir;

fn setup() -> (WeightConfigService, tempfile::TempDir) {
    let dir = tempdir().expect("temp dir");
    let pool = DbPool::new(dir.path().join("test.sqlite")).expect("db pool");
    (WeightConfigService::new(pool), dir)
}

fn draft(name: &str, weight: i32, max_value: f64) -> IndicatorCreateInput {
    IndicatorCreateInput {
        name: name.to_string(),
        description: None,
        weight,
        max_value,
        category: IndicatorCategory::Activities,
    }
}

#[test]
fn fresh_store_is_seeded_balanced() {
    let (service, _dir) = setup();

    let summary = service.weight_summary().expect("summary");
    assert_eq!(summary.total_weight, 100);
    assert!(summary.balanced);

    let indicators = service.list_indicators().expect("catalog");
    assert_eq!(indicators.len(), 5);
}

#[test]
fn adding_an_indicator_unbalances_the_total() {
    let (service, _dir) = setup();

    service
        .add_indicator(draft("Mentoring", 5, 4.0))
        .expect("add indicator");

    let summary = service.weight_summary().expect("summary");
    assert_eq!(summary.total_weight, 105);
    assert!(!summary.balanced);
}

#[test]
fn malformed_drafts_never_reach_the_catalog() {
    let (service, _dir) = setup();
    let before = service.list_indicators().expect("catalog").len();

    let empty_name = service.add_indicator(draft("   ", 10, 5.0));
    assert!(matches!(empty_name, Err(AppError::Validation { .. })));

    let zero_weight = service.add_indicator(draft("Mentoring", 0, 5.0));
    assert!(matches!(zero_weight, Err(AppError::Validation { .. })));

    let zero_max = service.add_indicator(draft("Mentoring", 10, 0.0));
    assert!(matches!(zero_max, Err(AppError::Validation { .. })));

    assert_eq!(service.list_indicators().expect("catalog").len(), before);
}

#[test]
fn update_merges_only_present_fields() {
    let (service, _dir) = setup();
    let target = service.list_indicators().expect("catalog")[0].clone();

    let updated = service
        .update_indicator(
            &target.id,
            IndicatorUpdateInput {
                weight: Some(40),
                ..Default::default()
            },
        )
        .expect("update")
        .expect("indicator found");

    assert_eq!(updated.weight, 40);
    assert_eq!(updated.name, target.name);
    assert_eq!(updated.max_value, target.max_value);
    assert_eq!(updated.category, target.category);
}

#[test]
fn update_for_unknown_id_is_a_no_op() {
    let (service, _dir) = setup();
    let before = service.list_indicators().expect("catalog");

    let result = service
        .update_indicator(
            "does-not-exist",
            IndicatorUpdateInput {
                weight: Some(40),
                ..Default::default()
            },
        )
        .expect("update");

    assert!(result.is_none());
    assert_eq!(service.list_indicators().expect("catalog"), before);
}

#[test]
fn malformed_patch_is_rejected_before_touching_the_store() {
    let (service, _dir) = setup();
    let target = service.list_indicators().expect("catalog")[0].clone();

    let result = service.update_indicator(
        &target.id,
        IndicatorUpdateInput {
            weight: Some(-5),
            ..Default::default()
        },
    );
    assert!(matches!(result, Err(AppError::Validation { .. })));

    let unchanged = service
        .update_indicator(&target.id, IndicatorUpdateInput::default())
        .expect("read back")
        .expect("indicator found");
    assert_eq!(unchanged.weight, target.weight);
}

#[test]
fn removing_an_unknown_indicator_changes_nothing() {
    let (service, _dir) = setup();
    let before = service.list_indicators().expect("catalog");

    let removed = service.remove_indicator("does-not-exist").expect("remove");

    assert!(!removed);
    assert_eq!(service.list_indicators().expect("catalog"), before);
}

#[test]
fn removing_an_indicator_shrinks_the_total() {
    let (service, _dir) = setup();
    let target = service.list_indicators().expect("catalog")[0].clone();

    let removed = service.remove_indicator(&target.id).expect("remove");
    assert!(removed);

    let summary = service.weight_summary().expect("summary");
    assert_eq!(summary.total_weight, 100 - target.weight);
    assert!(!summary.balanced);
}

#[test]
fn edit_session_saves_the_draft_through_the_service() {
    let (service, _dir) = setup();
    let target = service.list_indicators().expect("catalog")[0].clone();

    let mut session = EditSession::new();
    session.begin(&target).expect("begin edit");
    {
        let draft = session.draft_mut().expect("active draft");
        draft.weight = Some(35);
        draft.name = Some("Curso avanzado".to_string());
    }

    let updated = session
        .save(&service)
        .expect("save")
        .expect("indicator found");
    assert_eq!(updated.weight, 35);
    assert_eq!(updated.name, "Curso avanzado");
    assert_eq!(session.editing_id(), None);

    let persisted = service.list_indicators().expect("catalog")[0].clone();
    assert_eq!(persisted.weight, 35);
}

#[test]
fn rejected_save_keeps_the_session_editing() {
    let (service, _dir) = setup();
    let target = service.list_indicators().expect("catalog")[0].clone();

    let mut session = EditSession::new();
    session.begin(&target).expect("begin edit");
    session.draft_mut().expect("active draft").weight = Some(0);

    let result = session.save(&service);
    assert!(matches!(result, Err(AppError::Validation { .. })));

    // Still editing the same row; the caller can fix the draft and retry.
    assert_eq!(session.editing_id(), Some(target.id.as_str()));
    session.draft_mut().expect("active draft").weight = Some(30);
    session
        .save(&service)
        .expect("save after fixing the draft")
        .expect("indicator found");
}
