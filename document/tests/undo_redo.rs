//! End-to-end undo/redo behavior over a live layer tree.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use stratum_core::history::{EditTimeline, PropertyKey};
use stratum_core::node::NodeId;
use stratum_core::track::RecordFilter;
use stratum_core::tree::{DocumentTree, PARENT_PROPERTY};
use stratum_core::value::PropertyValue;
use stratum_document::{Layer, LayerTree};

fn tree_with_layer(name: &str) -> (LayerTree, NodeId) {
    let _ = env_logger::builder().is_test(true).try_init();
    let mut tree = LayerTree::new();
    let id = tree
        .insert(Layer::new(name), None)
        .expect("root insert cannot fail");
    (tree, id)
}

#[test]
fn move_layer_scenario() {
    let (mut tree, layer_1) = tree_with_layer("layer-1");
    let mut timeline = EditTimeline::new(tree.registry());

    timeline.begin_record(&mut tree, &[layer_1], RecordFilter::Continuous);
    tree.set_property(layer_1, "position", [10.0f32, 5.0].into())
        .unwrap();
    let record = timeline.end_record(&mut tree).expect("position changed");

    let key = PropertyKey::new(layer_1, "position");
    assert_eq!(
        record.old_value(&key),
        Some(&PropertyValue::Vec2([0.0, 0.0]))
    );
    assert_eq!(
        record.new_value(&key),
        Some(&PropertyValue::Vec2([10.0, 5.0]))
    );

    timeline.commit(record);
    assert_eq!(timeline.position(), 1);

    timeline.undo(&mut tree);
    assert_eq!(tree.layer(layer_1).unwrap().position, [0.0, 0.0]);
    assert_eq!(timeline.position(), 0);

    timeline.redo(&mut tree);
    assert_eq!(tree.layer(layer_1).unwrap().position, [10.0, 5.0]);
    assert_eq!(timeline.position(), 1);
}

#[test]
fn round_trip_restores_every_tracked_property() {
    let (mut tree, id) = tree_with_layer("a");
    let mut timeline = EditTimeline::new(tree.registry());

    timeline.begin_record(&mut tree, &[id], RecordFilter::Continuous);
    tree.set_property(id, "position", [3.0f32, 4.0].into())
        .unwrap();
    tree.set_property(id, "opacity", 0.25f32.into()).unwrap();
    tree.set_property(id, "fill", [1.0f32, 0.0, 0.0, 1.0].into())
        .unwrap();
    let record = timeline.end_record(&mut tree).unwrap();
    timeline.commit(record);

    timeline.undo(&mut tree);
    let layer = tree.layer(id).unwrap();
    assert_eq!(layer.position, [0.0, 0.0]);
    assert_eq!(layer.opacity, 1.0);
    assert_eq!(layer.fill, [0.0, 0.0, 0.0, 1.0]);

    timeline.redo(&mut tree);
    let layer = tree.layer(id).unwrap();
    assert_eq!(layer.position, [3.0, 4.0]);
    assert_eq!(layer.opacity, 0.25);
    assert_eq!(layer.fill, [1.0, 0.0, 0.0, 1.0]);
}

#[test]
fn new_edit_discards_redo_history() {
    let (mut tree, id) = tree_with_layer("a");
    let mut timeline = EditTimeline::new(tree.registry());

    timeline.begin_record(&mut tree, &[id], RecordFilter::Continuous);
    tree.set_property(id, "rotation", 45.0f32.into()).unwrap();
    let a = timeline.end_record(&mut tree).unwrap();
    timeline.commit(a);

    timeline.undo(&mut tree);

    timeline.begin_record(&mut tree, &[id], RecordFilter::Continuous);
    tree.set_property(id, "rotation", 90.0f32.into()).unwrap();
    let b = timeline.end_record(&mut tree).unwrap();
    timeline.commit(b);

    // A is unreachable.
    assert!(!timeline.redo(&mut tree));
    assert_eq!(tree.layer(id).unwrap().rotation, 90.0);
}

#[test]
fn drag_gesture_merges_into_one_undo_step() {
    let (mut tree, id) = tree_with_layer("a");
    let mut timeline = EditTimeline::new(tree.registry());
    let window = Duration::from_millis(500);

    // Three mouse-move samples of one drag, each its own recording window.
    for x in [4.0f32, 8.0, 12.0] {
        timeline.begin_record(&mut tree, &[id], RecordFilter::Continuous);
        tree.set_property(id, "position", [x, 0.0].into()).unwrap();
        let sample = timeline.end_record(&mut tree).unwrap();
        timeline.merge(sample, window);
    }

    assert_eq!(timeline.undo_count(), 1);
    let key = PropertyKey::new(id, "position");
    let top = timeline.current_record().unwrap();
    assert_eq!(top.old_value(&key), Some(&PropertyValue::Vec2([0.0, 0.0])));
    assert_eq!(top.new_value(&key), Some(&PropertyValue::Vec2([12.0, 0.0])));

    timeline.undo(&mut tree);
    assert_eq!(tree.layer(id).unwrap().position, [0.0, 0.0]);
    timeline.redo(&mut tree);
    assert_eq!(tree.layer(id).unwrap().position, [12.0, 0.0]);
}

#[test]
fn old_value_keeps_first_write_within_window() {
    let (mut tree, id) = tree_with_layer("a");
    tree.set_property(id, "opacity", 0.8f32.into()).unwrap();
    let mut timeline = EditTimeline::new(tree.registry());

    timeline.begin_record(&mut tree, &[id], RecordFilter::Continuous);
    tree.set_property(id, "opacity", 0.6f32.into()).unwrap();
    tree.set_property(id, "opacity", 0.4f32.into()).unwrap();
    tree.set_property(id, "opacity", 0.2f32.into()).unwrap();
    let record = timeline.end_record(&mut tree).unwrap();

    let key = PropertyKey::new(id, "opacity");
    assert_eq!(record.old_value(&key), Some(&PropertyValue::Float(0.8)));
    assert_eq!(record.new_value(&key), Some(&PropertyValue::Float(0.2)));
}

#[test]
fn empty_window_pushes_nothing() {
    let (mut tree, id) = tree_with_layer("a");
    let mut timeline = EditTimeline::new(tree.registry());

    timeline.begin_record(&mut tree, &[id], RecordFilter::Continuous);
    assert!(timeline.end_record(&mut tree).is_none());
    assert_eq!(timeline.undo_count(), 0);
    assert_eq!(timeline.position(), 0);
}

#[test]
fn reparenting_applies_and_reverts_as_structural_move() {
    let mut tree = LayerTree::new();
    let group_1 = tree.insert(Layer::new("group-1"), None).unwrap();
    let group_2 = tree.insert(Layer::new("group-2"), None).unwrap();
    let child = tree.insert(Layer::new("child"), Some(group_1)).unwrap();
    let mut timeline = EditTimeline::new(tree.registry());

    timeline.begin_record(&mut tree, &[child], RecordFilter::All);
    tree.reparent(child, Some(group_2)).unwrap();
    let record = timeline.end_record(&mut tree).unwrap();

    let key = PropertyKey::new(child, PARENT_PROPERTY);
    assert_eq!(
        record.new_value(&key),
        Some(&PropertyValue::Node(Some(group_2)))
    );

    timeline.commit(record);
    assert_eq!(tree.parent(child), Some(group_2));
    assert_eq!(tree.children(group_2), &[child]);

    timeline.undo(&mut tree);
    assert_eq!(tree.parent(child), Some(group_1));
    assert_eq!(tree.children(group_1), &[child]);
    assert!(tree.children(group_2).is_empty());

    timeline.redo(&mut tree);
    assert_eq!(tree.parent(child), Some(group_2));
}

#[test]
fn rename_is_ignored_without_discrete_tracking() {
    let (mut tree, id) = tree_with_layer("old name");
    let mut timeline = EditTimeline::new(tree.registry());

    timeline.begin_record(&mut tree, &[id], RecordFilter::Continuous);
    tree.set_property(id, "name", "new name".into()).unwrap();
    assert!(timeline.end_record(&mut tree).is_none());

    // The rename happened; it just left no history entry.
    assert_eq!(tree.layer(id).unwrap().name, "new name");
}

#[test]
fn rename_is_undoable_with_discrete_tracking() {
    let (mut tree, id) = tree_with_layer("old name");
    let mut timeline = EditTimeline::new(tree.registry());

    timeline.begin_record(&mut tree, &[id], RecordFilter::All);
    tree.set_property(id, "name", "new name".into()).unwrap();
    let record = timeline.end_record(&mut tree).unwrap();
    assert_eq!(record.description(), "Changed Name of 1 layer");
    timeline.commit(record);

    timeline.undo(&mut tree);
    assert_eq!(tree.layer(id).unwrap().name, "old name");
    timeline.redo(&mut tree);
    assert_eq!(tree.layer(id).unwrap().name, "new name");
}

#[test]
fn multi_layer_record_describes_all_changes() {
    let mut tree = LayerTree::new();
    let a = tree.insert(Layer::new("a"), None).unwrap();
    let b = tree.insert(Layer::new("b"), None).unwrap();
    let c = tree.insert(Layer::new("c"), None).unwrap();
    let mut timeline = EditTimeline::new(tree.registry());

    timeline.begin_record(&mut tree, &[a, b, c], RecordFilter::Continuous);
    for id in [a, b, c] {
        tree.set_property(id, "position", [1.0f32, 1.0].into())
            .unwrap();
        tree.set_property(id, "scale", [2.0f32, 2.0].into()).unwrap();
    }
    let record = timeline.end_record(&mut tree).unwrap();

    assert_eq!(record.description(), "Changed Position, Scale of 3 layers");
    assert_eq!(record.targets().len(), 3);
    timeline.commit(record);

    timeline.undo(&mut tree);
    for id in [a, b, c] {
        assert_eq!(tree.layer(id).unwrap().position, [0.0, 0.0]);
        assert_eq!(tree.layer(id).unwrap().scale, [1.0, 1.0]);
    }
}

#[test]
fn mutations_on_unwatched_layers_stay_out_of_the_record() {
    let mut tree = LayerTree::new();
    let watched = tree.insert(Layer::new("watched"), None).unwrap();
    let bystander = tree.insert(Layer::new("bystander"), None).unwrap();
    let mut timeline = EditTimeline::new(tree.registry());

    timeline.begin_record(&mut tree, &[watched], RecordFilter::Continuous);
    tree.set_property(watched, "opacity", 0.5f32.into()).unwrap();
    tree.set_property(bystander, "opacity", 0.1f32.into())
        .unwrap();
    let record = timeline.end_record(&mut tree).unwrap();
    timeline.commit(record);

    timeline.undo(&mut tree);
    assert_eq!(tree.layer(watched).unwrap().opacity, 1.0);
    // The bystander's mutation was never recorded, so undo leaves it alone.
    assert_eq!(tree.layer(bystander).unwrap().opacity, 0.1);
}

#[test]
fn renderers_observe_every_position_transition() {
    let (mut tree, id) = tree_with_layer("a");
    let mut timeline = EditTimeline::new(tree.registry());

    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    timeline.observe_position(move |old, new| sink.lock().unwrap().push((old, new)));

    for x in [1.0f32, 2.0] {
        timeline.begin_record(&mut tree, &[id], RecordFilter::Continuous);
        tree.set_property(id, "position", [x, 0.0].into()).unwrap();
        let record = timeline.end_record(&mut tree).unwrap();
        timeline.commit(record);
    }
    timeline.set_position(&mut tree, 0);
    timeline.set_position(&mut tree, 2);

    let transitions = seen.lock().unwrap().clone();
    assert_eq!(
        transitions,
        vec![(0, 1), (1, 2), (2, 1), (1, 0), (0, 1), (1, 2)]
    );
}
