//! Scene Runtime Properties
//!
//! End-to-end checks through the public `Director` API: orientation records,
//! timeline stepping, cue points, scene stacking and viewport anchoring.

use glam::Vec2;
use scenery_core::node::Container;
use scenery_core::timeline::{self, Timeline};
use scenery_core::{AssetLoader, Director, LoadOptions, Orientation, SceneError, SceneGraph};
use scenery_data::model::{AnimTrackData, InstanceData, SceneData};
use serde_json::json;
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::Arc;

/// Serves a fixed set of files; everything else is missing.
struct MockLoader {
    files: HashMap<String, Vec<u8>>,
}

impl MockLoader {
    fn scene(base: &str, placements: serde_json::Value) -> Arc<Self> {
        let mut files = HashMap::new();
        files.insert(format!("{}/placements.json", base), placements.to_string().into_bytes());
        Arc::new(Self { files })
    }
}

impl AssetLoader for MockLoader {
    fn load_bytes(&self, path: &str) -> anyhow::Result<Vec<u8>> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("no such file: {}", path))
    }
}

fn scene_data(value: serde_json::Value) -> SceneData {
    serde_json::from_value(value).expect("valid scene data")
}

fn individual_images() -> LoadOptions {
    LoadOptions {
        atlas: Some(false),
        ..LoadOptions::default()
    }
}

fn director() -> Director {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    Director::new(Arc::new(scenery_core::MemoryAssetLoader::new()), 1920.0, 1080.0)
}

/// Written values survive a trip through the other orientation.
#[test]
fn orientation_round_trip() {
    let mut graph = SceneGraph::new();
    let root = graph.add_node(Box::new(Container::new()));
    let id = graph.add_node(Box::new(Container::new()));
    graph.add_child(root, id);
    let data: InstanceData = serde_json::from_value(json!({
        "name": "boxTpl",
        "instanceName": "box",
        "portrait": { "x": 1, "y": 2, "scaleX": 0.5 },
        "landscape": { "x": 100, "y": 200, "rotation": 0.25 }
    }))
    .unwrap();
    graph.set_instance_data(id, &data, Orientation::Landscape);
    assert_eq!(graph.name(id), Some("box"));
    assert_eq!(graph.x(id), 100.0);

    graph.set_position(id, 300.0, 400.0);
    graph.set_scale_x(id, 2.0);
    graph.set_rotation(id, 1.5);

    graph.resize(id, Orientation::Portrait);
    assert_eq!((graph.x(id), graph.y(id)), (1.0, 2.0));
    assert_eq!(graph.scale_x(id), 0.5);
    assert_eq!(graph.rotation(id), 0.0);

    graph.resize(id, Orientation::Landscape);
    assert_eq!((graph.x(id), graph.y(id)), (300.0, 400.0));
    assert_eq!(graph.scale_x(id), 2.0);
    assert_eq!(graph.rotation(id), 1.5);
}

/// The frame count is the longest track, whatever order tracks arrive in.
#[test]
fn timeline_frame_count_is_longest_track() {
    let track = |len: usize| vec![Some(AnimTrackData::default()); len];
    for order in [[3, 7, 5], [7, 5, 3], [5, 3, 7]] {
        let mut tl = Timeline::new();
        tl.set_frames(
            order
                .iter()
                .enumerate()
                .map(|(i, &len)| (format!("child{}", i), track(len))),
        );
        assert_eq!(tl.total_frames(), 7);
    }

    let mut director = director();
    director.load_scene_data("game", "game", scene_data(json!({
        "resolution": { "x": 800, "y": 600 },
        "animTracks": {
            "a_anim": [{}, {}, {}],
            "b_anim": [{}, {}, {}, {}, {}, {}, {}],
            "c_anim": [{}, {}, {}, {}, {}]
        },
        "templates": {
            "anim": { "type": "asset", "name": "anim", "children": [
                { "type": "asset", "name": "dot", "instanceName": "a" },
                { "type": "asset", "name": "dot", "instanceName": "b" },
                { "type": "asset", "name": "dot", "instanceName": "c" }
            ]},
            "dot": { "type": "asset", "name": "dot", "children": [] }
        }
    })));
    let anim = director.spawn("anim").unwrap();
    assert_eq!(director.graph().element::<Timeline>(anim).unwrap().total_frames(), 7);
}

/// A keyframe without `x` leaves the previous `x` in place.
#[test]
fn sparse_keyframes_persist() {
    let mut director = director();
    director.load_scene_data("game", "game", scene_data(json!({
        "resolution": { "x": 800, "y": 600 },
        "animTracks": { "ball_anim": [{ "x": 10 }, { "alpha": 0.5 }] },
        "templates": {
            "anim": { "type": "asset", "name": "anim", "children": [
                { "type": "asset", "name": "ballTpl", "instanceName": "ball" }
            ]},
            "ballTpl": { "type": "asset", "name": "ballTpl", "children": [] }
        }
    })));
    let anim = director.spawn("anim").unwrap();
    let ball = director.graph().child_by_name(anim, "ball").unwrap();

    director.play(anim);
    director.step();
    director.step();
    assert_eq!(director.graph().element::<Timeline>(anim).unwrap().current_frame, 2);
    assert_eq!(director.graph().x(ball), 10.0);
    assert_eq!(director.graph().alpha(ball), 0.5);
}

fn four_frame_scene() -> SceneData {
    scene_data(json!({
        "resolution": { "x": 800, "y": 600 },
        "cuePoints": { "anim": { "2": "midway" } },
        "animTracks": { "ball_anim": [{ "x": 0 }, { "x": 1 }, { "x": 2 }, { "x": 3 }] },
        "templates": {
            "anim": { "type": "asset", "name": "anim", "children": [
                { "type": "asset", "name": "ballTpl", "instanceName": "ball" }
            ]},
            "ballTpl": { "type": "asset", "name": "ballTpl", "children": [] }
        }
    }))
}

/// The end listener fires on every wrap of a looping timeline.
#[test]
fn loop_wrap_fires_end_listener_every_time() {
    let mut director = director();
    director.load_scene_data("game", "game", four_frame_scene());
    let anim = director.spawn("anim").unwrap();
    let ends = Rc::new(Cell::new(0));
    let counter = ends.clone();
    director
        .graph_mut()
        .element_mut::<Timeline>(anim)
        .unwrap()
        .add_state_end_listener(move |end, _| {
            assert!(end.looped);
            counter.set(counter.get() + 1);
        });
    assert_eq!(director.graph().element::<Timeline>(anim).unwrap().total_frames(), 4);

    director.play(anim);
    // One pass visits frames 0 through 4.
    for _ in 0..5 {
        director.step();
    }
    assert_eq!(ends.get(), 1);
    for _ in 0..10 {
        director.step();
    }
    assert_eq!(ends.get(), 3);
    assert!(director.is_playing(anim));
}

/// A non-looping timeline stops after its last frame and reports it once.
#[test]
fn non_looping_timeline_stops() {
    let mut director = director();
    director.load_scene_data("game", "game", four_frame_scene());
    let anim = director.spawn("anim").unwrap();
    let ends = Rc::new(RefCell::new(Vec::new()));
    let sink = ends.clone();
    {
        let tl = director.graph_mut().element_mut::<Timeline>(anim).unwrap();
        tl.looping = false;
        tl.add_state_end_listener(move |end, _| sink.borrow_mut().push(end.looped));
    }
    director.play(anim);
    for _ in 0..8 {
        director.step();
    }
    assert_eq!(*ends.borrow(), vec![false]);
    assert!(!director.is_playing(anim));
}

/// Cues fire once per pass, before the cursor moves past their frame.
#[test]
fn cue_point_fires_at_its_frame() {
    let mut director = director();
    director.load_scene_data("game", "game", four_frame_scene());
    let anim = director.spawn("anim").unwrap();
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = seen.clone();
    let listener = director.add_cue_listener("midway", move |event, rt| {
        let graph = &rt.graph;
        let tl = graph.element::<Timeline>(event.timeline).unwrap();
        let ball = graph.child_by_name(event.timeline, "ball").unwrap();
        sink.borrow_mut().push((event.frame, tl.current_frame, graph.x(ball)));
    });

    director.play(anim);
    for _ in 0..10 {
        director.step();
    }
    assert_eq!(*seen.borrow(), vec![(2, 2, 2.0), (2, 2, 2.0)]);

    assert!(director.remove_cue_listener("midway", listener));
    for _ in 0..5 {
        director.step();
    }
    assert_eq!(seen.borrow().len(), 2);
}

/// A cue listener can stop the timeline that reached the cue.
#[test]
fn cue_listener_stops_its_timeline() {
    let mut director = director();
    director.load_scene_data("game", "game", four_frame_scene());
    let anim = director.spawn("anim").unwrap();
    director.add_cue_listener("midway", |event, rt| timeline::stop(rt, event.timeline));

    director.play(anim);
    for _ in 0..10 {
        director.step();
    }
    assert!(!director.is_playing(anim));
    let ball = director.graph().child_by_name(anim, "ball").unwrap();
    assert_eq!(director.graph().x(ball), 2.0);
    assert_eq!(director.graph().element::<Timeline>(anim).unwrap().current_frame, 3);
}

/// A stopped timeline receives no further steps.
#[test]
fn stop_takes_effect_immediately() {
    let mut director = director();
    director.load_scene_data("game", "game", four_frame_scene());
    let anim = director.spawn("anim").unwrap();
    director.goto_and_play(anim, 3);
    director.stop(anim);
    director.step();
    assert_eq!(director.graph().element::<Timeline>(anim).unwrap().current_frame, 3);
    director.goto_and_stop(anim, 1);
    let ball = director.graph().child_by_name(anim, "ball").unwrap();
    assert_eq!(director.graph().x(ball), 1.0);
    assert!(!timeline::is_playing(&director.runtime, anim));
}

/// Overlay templates shadow the base scene; others fall through.
#[test]
fn template_shadowing_across_scenes() {
    let mut director = director();
    director.load_scene_data("base", "base", scene_data(json!({
        "resolution": { "x": 800, "y": 600 },
        "templates": { "hud": { "type": "asset", "name": "hud", "children": [
            { "type": "textField", "name": "score", "text": "0", "alpha": 1 }
        ]}}
    })));
    director.load_scene_data("overlay", "overlay", scene_data(json!({
        "resolution": { "x": 800, "y": 600 },
        "templates": { "dialog": { "type": "asset", "name": "dialog", "children": [
            { "type": "textField", "name": "message", "text": "Hello", "alpha": 1 }
        ]}}
    })));

    let dialog = director.spawn("dialog").unwrap();
    assert!(director.graph().child_by_name(dialog, "message").is_some());
    let hud = director.spawn("hud").unwrap();
    assert!(director.graph().child_by_name(hud, "score").is_some());
}

/// A child named after a template receives that template's children.
#[test]
fn nested_templates_expand_into_the_child() {
    let mut director = director();
    director.load_scene_data("game", "game", scene_data(json!({
        "resolution": { "x": 800, "y": 600 },
        "templates": {
            "panel": { "type": "asset", "name": "panel", "children": [
                { "type": "img", "name": "card", "width": 50, "height": 80 }
            ]},
            "card": { "type": "asset", "name": "card", "children": [
                { "type": "textField", "name": "title", "text": "Ace", "alpha": 1 }
            ]}
        }
    })));
    let panel = director.spawn("panel").unwrap();
    let graph = director.graph();
    let card = graph.child_by_name(panel, "card").unwrap();
    let title = graph.child_by_name(card, "title").unwrap();
    assert_eq!(graph.parent(title), Some(card));
    assert!(graph.child_by_name(panel, "title").is_none());
}

/// Unknown names resolve to nothing and leave no trace.
#[test]
fn missing_template_is_none() {
    let mut director = director();
    director.load_scene_data("game", "game", four_frame_scene());
    let before = director.graph().len();
    assert_eq!(director.spawn("doesNotExist"), None);
    assert_eq!(director.graph().len(), before);
    assert!(director.runtime.scheduler.is_empty());
    assert!(director.scenes.peek().unwrap().resize_map().is_empty());
}

fn anchored_scene() -> serde_json::Value {
    let centre = json!({
        "x": 5, "y": 7, "isAnchored": true, "anchorType": "center",
        "anchorPercentage": { "x": 0.5, "y": 0.5 }
    });
    json!({
        "resolution": { "x": 1920, "y": 1080 },
        "atlas": false,
        "stage": { "type": "asset", "name": "stage", "children": [
            { "type": "asset", "name": "hudTpl", "instanceName": "hud",
              "portrait": { "x": 40, "y": 90 }, "landscape": { "x": 120, "y": 30 } }
        ]},
        "templates": {
            "hudTpl": { "type": "asset", "name": "hudTpl", "children": [
                { "type": "asset", "name": "badgeTpl", "instanceName": "badge",
                  "portrait": centre, "landscape": centre }
            ]},
            "badgeTpl": { "type": "asset", "name": "badgeTpl", "children": [] }
        }
    })
}

fn assert_near(actual: Vec2, expected: Vec2) {
    assert!(
        actual.distance(expected) < 1e-2,
        "expected {:?}, got {:?}",
        expected,
        actual
    );
}

/// Anchored nodes sit on their viewport fraction after every resize.
#[test]
fn resize_keeps_anchor_on_viewport_centre() {
    let mut director = Director::new(MockLoader::scene("lobby", anchored_scene()), 1920.0, 1080.0);
    director.load_scene("lobby", "lobby", &individual_images()).unwrap();
    let stage = director.load_stage().unwrap();
    let hud = director.graph().child_by_name(stage, "hud").unwrap();
    let badge = director.graph().child_by_name(hud, "badge").unwrap();

    for (w, h) in [(1920.0, 1080.0), (1280.0, 720.0), (750.0, 1334.0), (1000.0, 1000.0), (1920.0, 1080.0)] {
        director.resize(w, h);
        let global = director.graph().to_global(badge, Vec2::ZERO);
        assert_near(global, Vec2::new(w / 2.0, h / 2.0));
    }
    assert_eq!(director.scenes.peek().unwrap().orientation(), Orientation::Landscape);
    assert_eq!(director.graph().x(hud), 120.0);
}

/// A missing scene file is an explicit error, not an empty scene.
#[test]
fn missing_scene_file_is_an_error() {
    let mut director = Director::new(MockLoader::scene("lobby", anchored_scene()), 800.0, 600.0);
    let err = director.load_scene("other", "other", &LoadOptions::default()).unwrap_err();
    assert!(matches!(err, SceneError::AssetNotFound(_)));
    assert!(director.scenes.is_empty());
}
