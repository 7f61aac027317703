//! Widgets, Pool and Attachments
//!
//! Resolved widgets driven by pointer input, pooled instances and background
//! particle loads, all through a `Director`.

use glam::Vec2;
use scenery_core::node::ParticleEmitter;
use scenery_core::systems::display_list::Paint;
use scenery_core::widgets::{self, button, toggle, PointerEvent, PressOutcome};
use scenery_core::{Director, ElementKind, MemoryAssetLoader, SceneError};
use scenery_data::model::SceneData;
use serde_json::json;
use std::cell::Cell;
use std::rc::Rc;
use std::sync::Arc;
use std::time::{Duration, Instant};

fn game() -> SceneData {
    serde_json::from_value(json!({
        "resolution": { "x": 800, "y": 600 },
        "templates": {
            "playBtn": { "type": "btn", "name": "playBtn", "children": [
                { "type": "asset", "name": "bgTpl", "instanceName": "upState" },
                { "type": "asset", "name": "bgTpl", "instanceName": "downState" },
                { "type": "textField", "name": "labelContainer", "text": "Play", "alpha": 1 }
            ]},
            "bgTpl": { "type": "asset", "name": "bgTpl", "children": [
                { "type": "img", "name": "bg_IMG", "width": 120, "height": 40 }
            ]},
            "soundToggle": { "type": "toggle", "name": "soundToggle", "children": [
                { "type": "asset", "name": "bgTpl", "instanceName": "offState" },
                { "type": "asset", "name": "bgTpl", "instanceName": "onState" }
            ]},
            "coin": { "type": "asset", "name": "coin", "children": [] },
            "fx": { "type": "asset", "name": "fx", "children": [
                { "type": "particle", "name": "sparks", "jsonPath": "fx/sparks.json",
                  "pngPaths": ["fx/spark.png"] }
            ]}
        }
    }))
    .expect("valid scene data")
}

fn director() -> Director {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
    let loader = MemoryAssetLoader::new().with(
        "game/fx/sparks.json",
        br#"{ "lifetime": { "min": 0.2, "max": 0.4 },
              "behaviors": [{ "type": "textureSingle", "config": {} }] }"#
            .to_vec(),
    );
    let mut director = Director::new(Arc::new(loader), 800.0, 600.0);
    director.load_scene_data("game", "game", game());
    director
}

#[test]
fn button_clicks_and_rejects_drags() {
    let mut director = director();
    let btn = director.spawn("playBtn").unwrap();
    let graph = &mut director.runtime.graph;
    assert_eq!(graph.kind(btn), Some(ElementKind::Button));
    assert_eq!(
        graph.element::<widgets::Button>(btn).unwrap().label_mode(),
        widgets::LabelMode::Single
    );

    let clicks = Rc::new(Cell::new(0));
    let counter = clicks.clone();
    graph
        .element_mut::<widgets::Button>(btn)
        .unwrap()
        .set_callback(move || counter.set(counter.get() + 1));

    let up = graph.child_by_name(btn, "upState").unwrap();
    let down = graph.child_by_name(btn, "downState").unwrap();
    let label = graph.child_by_name(btn, "labelContainer").unwrap();
    assert!(graph.visible(up));
    assert!(!graph.visible(down));

    let t0 = Instant::now();
    let press = PointerEvent::Down { position: Vec2::new(10.0, 10.0), at: t0 };
    button::handle_pointer(graph, btn, press);
    assert!(graph.visible(down));
    assert_eq!(graph.alpha(label), 0.5);
    let release = PointerEvent::Up {
        position: Vec2::new(14.0, 12.0),
        at: t0 + Duration::from_millis(120),
    };
    assert_eq!(button::handle_pointer(graph, btn, release), Some(PressOutcome::Click));
    assert_eq!(clicks.get(), 1);
    assert!(graph.visible(up));

    // Dragged farther than the click tolerance.
    button::handle_pointer(graph, btn, press);
    let dragged = PointerEvent::Up {
        position: Vec2::new(60.0, 10.0),
        at: t0 + Duration::from_millis(120),
    };
    assert_eq!(button::handle_pointer(graph, btn, dragged), None);

    button::disable(graph, btn);
    button::handle_pointer(graph, btn, press);
    assert_eq!(button::handle_pointer(graph, btn, release), None);
    assert_eq!(clicks.get(), 1);

    button::set_label(graph, btn, "Again");
    assert_eq!(graph.text(label), Some("Again"));
}

#[test]
fn button_long_press_fires_once() {
    let mut director = director();
    let btn = director.spawn("playBtn").unwrap();
    let graph = &mut director.runtime.graph;
    let long = Rc::new(Cell::new(0));
    let counter = long.clone();
    graph
        .element_mut::<widgets::Button>(btn)
        .unwrap()
        .set_long_press_callback(move || counter.set(counter.get() + 1));

    let t0 = Instant::now();
    button::handle_pointer(graph, btn, PointerEvent::Down { position: Vec2::ZERO, at: t0 });
    assert!(!button::poll_long_press(graph, btn, t0 + Duration::from_millis(200)));
    assert!(button::poll_long_press(graph, btn, t0 + Duration::from_millis(600)));
    let release = PointerEvent::Up { position: Vec2::ZERO, at: t0 + Duration::from_millis(700) };
    assert_eq!(button::handle_pointer(graph, btn, release), None);
    assert_eq!(long.get(), 1);
}

#[test]
fn toggle_flips_on_click() {
    let mut director = director();
    let id = director.spawn("soundToggle").unwrap();
    assert!(!toggle::is_on(&director.runtime, id));

    let t0 = Instant::now();
    toggle::handle_pointer(&mut director.runtime, id, PointerEvent::Down { position: Vec2::ZERO, at: t0 });
    let up = PointerEvent::Up { position: Vec2::ZERO, at: t0 + Duration::from_millis(50) };
    assert_eq!(toggle::handle_pointer(&mut director.runtime, id, up), Some(PressOutcome::Click));
    assert!(toggle::is_on(&director.runtime, id));

    let on = director.runtime.graph.child_by_name(id, "onState").unwrap();
    let off = director.runtime.graph.child_by_name(id, "offState").unwrap();
    assert!(director.graph().visible(on));
    assert!(!director.graph().visible(off));
}

#[test]
fn pool_hands_out_and_takes_back() {
    let mut director = director();
    assert_eq!(director.init_pool(3, "coin", "coins"), 3);
    let a = director.pool_get("coins").unwrap();
    let b = director.pool_get("coins").unwrap();
    assert_ne!(a, b);
    assert_eq!(director.graph().name(a), Some("coin"));

    director.pool_put_back(b, "coins").unwrap();
    assert_eq!(director.pool_get("coins").unwrap(), b);
    director.pool_get("coins").unwrap();
    assert!(matches!(
        director.pool_get("coins"),
        Err(SceneError::PoolExhausted { index: 3, .. })
    ));
    assert!(matches!(director.pool_get("gems"), Err(SceneError::UnknownPool(_))));
}

#[test]
fn particles_attach_after_background_load() {
    let mut director = director();
    let fx = director.spawn("fx").unwrap();
    assert!(director.graph().children(fx).is_empty());

    let attached = director.wait_attachments(Duration::from_secs(5));
    assert_eq!(attached, 1);
    let sparks = director.graph().child_by_name(fx, "sparks").unwrap();
    assert!(director.graph().element::<ParticleEmitter>(sparks).unwrap().emitting);

    let list = director.display_list(fx).unwrap();
    assert_eq!(list.len(), 1);
    match &list[0].paint {
        Paint::Particles { texture, emitting, .. } => {
            assert!(emitting);
            assert_eq!(texture.as_ref().map(|t| t.key.as_str()), Some("spark"));
        }
        other => panic!("expected particles, got {:?}", other),
    }
}

#[test]
fn destroyed_parent_drops_pending_attachment() {
    let mut director = director();
    let fx = director.spawn("fx").unwrap();
    director.runtime.graph.destroy_node(fx);
    assert_eq!(director.wait_attachments(Duration::from_secs(5)), 0);
    assert!(director.graph().is_empty());
}
