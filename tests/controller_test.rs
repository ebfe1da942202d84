//! Tests for EditorController: relink selection protocol, feature flags and
//! invariant preservation over long edit sequences

use std::sync::Arc;

use rstest::rstest;

use rstree::application::{
    ApplicationError, EditorController, EditorFeatures, Feature, IgnoreReason, RelinkState,
    SelectionOutcome,
};
use rstree::config::Settings;
use rstree::domain::{ChildrenIndex, DomainError, LayoutEngine, NodeCategory, NodeId, Violation};
use rstree::util::testing::{build_tree, init_test_setup};

// 1 -> 2 -> 3, 1 -> 4
fn editor() -> EditorController {
    init_test_setup();
    let mut editor = EditorController::from_settings(&Settings::default());
    build_tree(&mut editor, &[(1, "a"), (2, "b"), (1, "c")]).unwrap();
    editor
}

fn editor_with(features: EditorFeatures) -> EditorController {
    init_test_setup();
    let settings = Settings {
        features: rstree::config::FeatureSettings {
            relink: features.relink,
            categories: features.categories,
        },
        ..Settings::default()
    };
    EditorController::from_settings(&settings)
}

// ============================================================
// Relink selection protocol
// ============================================================

#[test]
fn given_idle_when_entering_relink_mode_then_awaiting_source() {
    let mut editor = editor();
    assert_eq!(editor.relink_state(), RelinkState::Idle);

    editor.enter_relink_mode().unwrap();

    assert_eq!(editor.relink_state(), RelinkState::AwaitingSource);
}

#[test]
fn given_idle_when_selecting_then_ignored() {
    let mut editor = editor();

    let outcome = editor.select_for_relink(NodeId(3));

    assert_eq!(outcome, SelectionOutcome::Ignored(IgnoreReason::NotInRelinkMode));
    assert_eq!(editor.relink_state(), RelinkState::Idle);
}

#[rstest]
#[case::root(1, IgnoreReason::RootSelected)]
#[case::unknown(42, IgnoreReason::UnknownNode(NodeId(42)))]
fn given_awaiting_source_when_selecting_invalid_source_then_state_unchanged(
    #[case] node: u64,
    #[case] reason: IgnoreReason,
) {
    let mut editor = editor();
    editor.enter_relink_mode().unwrap();

    let outcome = editor.select_for_relink(NodeId(node));

    assert_eq!(outcome, SelectionOutcome::Ignored(reason));
    assert_eq!(editor.relink_state(), RelinkState::AwaitingSource);
}

#[test]
fn given_source_selected_when_selecting_valid_target_then_relinked_and_idle() {
    // Arrange
    let mut editor = editor();
    editor.enter_relink_mode().unwrap();
    assert_eq!(
        editor.select_for_relink(NodeId(3)),
        SelectionOutcome::SourceSelected(NodeId(3))
    );
    assert_eq!(editor.relink_state(), RelinkState::AwaitingTarget(NodeId(3)));

    // Act
    let outcome = editor.select_for_relink(NodeId(4));

    // Assert
    let SelectionOutcome::Relinked(snapshot) = outcome else {
        panic!("expected relink, got {:?}", outcome);
    };
    assert_eq!(snapshot.node(NodeId(3)).unwrap().parent, Some(NodeId(4)));
    assert!(Arc::ptr_eq(&snapshot, &editor.snapshot()));
    assert_eq!(editor.relink_state(), RelinkState::Idle);
}

#[rstest]
#[case::current_parent(2, Violation::AlreadyChildOf { node: NodeId(3), parent: NodeId(2) }.into())]
#[case::itself(3, Violation::WouldCreateCycle { node: NodeId(3), new_parent: NodeId(3) }.into())]
#[case::unknown(42, DomainError::InvalidReference(NodeId(42)))]
fn given_source_selected_when_selecting_invalid_target_then_no_op(
    #[case] target: u64,
    #[case] expected: DomainError,
) {
    // Arrange
    let mut editor = editor();
    editor.enter_relink_mode().unwrap();
    editor.select_for_relink(NodeId(3));
    let before = editor.snapshot();

    // Act
    let outcome = editor.select_for_relink(NodeId(target));

    // Assert
    assert_eq!(outcome, SelectionOutcome::Ignored(IgnoreReason::Rejected(expected)));
    assert_eq!(editor.relink_state(), RelinkState::AwaitingTarget(NodeId(3)));
    assert!(Arc::ptr_eq(&before, &editor.snapshot()));
}

#[test]
fn given_source_selected_when_selecting_its_descendant_then_no_op() {
    let mut editor = editor();
    editor.enter_relink_mode().unwrap();
    editor.select_for_relink(NodeId(2));

    let outcome = editor.select_for_relink(NodeId(3));

    assert!(matches!(
        outcome,
        SelectionOutcome::Ignored(IgnoreReason::Rejected(DomainError::InvariantViolation(
            Violation::WouldCreateCycle { .. }
        )))
    ));
    assert_eq!(editor.relink_state(), RelinkState::AwaitingTarget(NodeId(2)));
}

#[rstest]
#[case::awaiting_source(false)]
#[case::awaiting_target(true)]
fn given_relink_mode_when_cancelling_then_idle_and_tree_unchanged(#[case] with_source: bool) {
    let mut editor = editor();
    editor.enter_relink_mode().unwrap();
    if with_source {
        editor.select_for_relink(NodeId(3));
    }
    let before = editor.snapshot();

    editor.cancel_relink_selection();

    assert_eq!(editor.relink_state(), RelinkState::Idle);
    assert!(Arc::ptr_eq(&before, &editor.snapshot()));
}

#[test]
fn given_any_state_when_exiting_relink_mode_then_idle() {
    let mut editor = editor();
    editor.exit_relink_mode();
    assert_eq!(editor.relink_state(), RelinkState::Idle);

    editor.enter_relink_mode().unwrap();
    editor.select_for_relink(NodeId(4));
    editor.toggle_relink_mode().unwrap();
    assert_eq!(editor.relink_state(), RelinkState::Idle);

    editor.toggle_relink_mode().unwrap();
    assert_eq!(editor.relink_state(), RelinkState::AwaitingSource);
}

#[test]
fn given_awaiting_target_when_reentering_relink_mode_then_selection_kept() {
    let mut editor = editor();
    editor.enter_relink_mode().unwrap();
    editor.select_for_relink(NodeId(4));

    editor.enter_relink_mode().unwrap();

    assert_eq!(editor.relink_state(), RelinkState::AwaitingTarget(NodeId(4)));
}

#[test]
fn given_pending_source_when_source_deleted_then_back_to_awaiting_source() {
    let mut editor = editor();
    editor.enter_relink_mode().unwrap();
    editor.select_for_relink(NodeId(3));

    editor.delete_subtree(NodeId(2)).unwrap();

    assert_eq!(editor.relink_state(), RelinkState::AwaitingSource);
}

// ============================================================
// Feature flags
// ============================================================

#[test]
fn given_relink_disabled_when_relinking_then_feature_disabled() {
    let mut editor = editor_with(EditorFeatures {
        relink: false,
        categories: true,
    });
    editor.add_child(NodeId(1)).unwrap();
    editor.add_child(NodeId(1)).unwrap();

    assert!(matches!(
        editor.relink(NodeId(3), NodeId(2)),
        Err(ApplicationError::FeatureDisabled(Feature::Relink))
    ));
    assert!(matches!(
        editor.enter_relink_mode(),
        Err(ApplicationError::FeatureDisabled(Feature::Relink))
    ));
    assert_eq!(editor.relink_state(), RelinkState::Idle);
}

#[test]
fn given_categories_disabled_when_retyping_then_feature_disabled_but_rename_works() {
    let mut editor = editor_with(EditorFeatures {
        relink: true,
        categories: false,
    });
    editor.add_child(NodeId(1)).unwrap();

    assert!(matches!(
        editor.retype(NodeId(2), NodeCategory::Part),
        Err(ApplicationError::FeatureDisabled(Feature::Categories))
    ));
    let snapshot = editor.rename(NodeId(2), "Shaft").unwrap();
    assert_eq!(snapshot.node(NodeId(2)).unwrap().label, "Shaft");
}

#[test]
fn given_new_controller_when_created_then_single_system_root() {
    let editor = editor_with(EditorFeatures::default());
    let snapshot = editor.snapshot();

    assert_eq!(snapshot.len(), 1);
    let root = snapshot.root().unwrap();
    assert_eq!(root.id, NodeId::ROOT);
    assert_eq!(root.label, "System");
    assert_eq!(root.category, NodeCategory::System);
    assert!(snapshot.connectors().is_empty());
}

// ============================================================
// Invariant preservation
// ============================================================

/// Tiny deterministic generator so runs are reproducible.
struct Lcg(u64);

impl Lcg {
    fn next(&mut self) -> u64 {
        self.0 = self.0.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        self.0 >> 33
    }

    fn pick(&mut self, ids: &[NodeId]) -> NodeId {
        ids[(self.next() as usize) % ids.len()]
    }
}

#[rstest]
#[case(1)]
#[case(7)]
#[case(2024)]
fn given_random_edit_sequence_when_applied_then_invariants_hold_after_every_step(
    #[case] seed: u64,
) {
    init_test_setup();
    let mut editor = EditorController::from_settings(&Settings {
        highlight_anchor: Some(3),
        ..Settings::default()
    });
    let engine = LayoutEngine::new(Settings::default().layout_params());
    let mut rng = Lcg(seed);
    let mut max_id_seen = 1;

    for step in 0..400 {
        let before = editor.snapshot();
        let ids: Vec<NodeId> = before.nodes().iter().map(|n| n.id).collect();
        let a = rng.pick(&ids);
        let b = rng.pick(&ids);

        let result = match rng.next() % 10 {
            0..=4 => editor.add_child(a),
            5 => editor.delete_subtree(a),
            6..=7 => editor.relink(a, b),
            8 => editor.set_measured_width(a, 40.0 + (rng.next() % 200) as f64),
            _ => editor.rename(a, &format!("step {}", step)),
        };

        let after = editor.snapshot();
        match result {
            Ok(returned) => assert!(Arc::ptr_eq(&returned, &after)),
            Err(_) => assert!(Arc::ptr_eq(&before, &after), "rejected command changed the tree"),
        }
        after
            .validate()
            .unwrap_or_else(|e| panic!("step {}: {}", step, e));

        // ids never reused: anything new is above every id ever seen
        for node in after.nodes() {
            if !before.contains(node.id) {
                assert!(node.id.0 > max_id_seen, "id {} reused", node.id);
                max_id_seen = node.id.0;
            }
        }

        // layout is already a fixed point
        assert_eq!(engine.layout(after.nodes()), after.nodes());

        // highlight matches ancestry
        let index = ChildrenIndex::build(after.nodes());
        for connector in after.connectors() {
            let expected = connector.target == NodeId(3)
                || index.is_ancestor_of(NodeId(3), connector.target);
            assert_eq!(connector.highlighted, expected);
        }
    }
}
