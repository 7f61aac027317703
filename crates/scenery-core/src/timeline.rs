//! # Timeline Module
//!
//! Frame-stepped keyframe playback over the named children of a container.
//!
//! A timeline is a regular node whose element is a [`Timeline`]. Transport
//! (`play`, `stop`, `update`, ...) is exposed as free functions over the
//! [`Runtime`] because stepping touches the graph, the scheduler and the cue
//! dispatcher at once.
//!
//! Keyframes are sparse: a frame only overwrites the fields it carries, and a
//! track shorter than the timeline simply stops contributing.

use crate::cue::{self, CueEvent};
use crate::element::{Element, ElementKind};
use crate::runtime::Runtime;
use crate::scene::SceneGraph;
use crate::types::NodeId;
use scenery_data::model::AnimTrackData;
use std::any::Any;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Per-child keyframe tracks, keyed by the child's instance name.
pub type FrameTracks = BTreeMap<String, Vec<Option<AnimTrackData>>>;

/// Delivered to the end listener each time the cursor runs past the last frame.
#[derive(Debug, Clone, PartialEq)]
pub struct TimelineEnd {
    pub timeline: NodeId,
    /// True when the cursor wrapped to 0, false when playback stopped.
    pub looped: bool,
}

type EndCallback = Box<dyn FnMut(&TimelineEnd, &mut Runtime)>;

pub struct Timeline {
    frames: FrameTracks,
    total_frames: usize,
    pub current_frame: usize,
    pub looping: bool,
    cue_points: HashMap<usize, String>,
    on_end: Option<EndCallback>,
    /// Bumped whenever the end listener is replaced or removed.
    end_generation: u64,
}

impl fmt::Debug for Timeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Timeline")
            .field("tracks", &self.frames.keys().collect::<Vec<_>>())
            .field("total_frames", &self.total_frames)
            .field("current_frame", &self.current_frame)
            .field("looping", &self.looping)
            .field("cue_points", &self.cue_points)
            .field("has_end_listener", &self.on_end.is_some())
            .finish()
    }
}

impl Default for Timeline {
    fn default() -> Self {
        Self::new()
    }
}

impl Timeline {
    pub fn new() -> Self {
        Self {
            frames: FrameTracks::new(),
            total_frames: 0,
            current_frame: 0,
            looping: true,
            cue_points: HashMap::new(),
            on_end: None,
            end_generation: 0,
        }
    }

    /// Installs the tracks. The frame count is the longest track.
    pub fn set_frames(&mut self, frames: impl IntoIterator<Item = (String, Vec<Option<AnimTrackData>>)>) {
        self.frames = frames.into_iter().collect();
        self.total_frames = self.frames.values().map(|t| t.len()).max().unwrap_or(0);
    }

    pub fn frames(&self) -> &FrameTracks {
        &self.frames
    }

    pub fn total_frames(&self) -> usize {
        self.total_frames
    }

    pub fn set_cue_points(&mut self, cue_points: HashMap<usize, String>) {
        self.cue_points = cue_points;
    }

    pub fn cue_points(&self) -> &HashMap<usize, String> {
        &self.cue_points
    }

    /// Replaces the end listener. It fires on every loop wrap as well as
    /// when a non-looping timeline stops, and may drive the timeline it
    /// belongs to through the runtime it receives.
    pub fn add_state_end_listener(&mut self, callback: impl FnMut(&TimelineEnd, &mut Runtime) + 'static) {
        self.on_end = Some(Box::new(callback));
        self.end_generation += 1;
    }

    pub fn remove_state_end_listener(&mut self) {
        self.on_end = None;
        self.end_generation += 1;
    }

    pub fn has_end_listener(&self) -> bool {
        self.on_end.is_some()
    }
}

impl Element for Timeline {
    fn as_any(&self) -> &dyn Any {
        self
    }
    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
    fn kind(&self) -> ElementKind {
        ElementKind::Timeline
    }
}

fn child_timelines(graph: &SceneGraph, id: NodeId) -> Vec<NodeId> {
    graph
        .children(id)
        .iter()
        .copied()
        .filter(|&c| graph.kind(c) == Some(ElementKind::Timeline))
        .collect()
}

/// Registers the timeline and every direct child timeline, recursively.
pub fn play(rt: &mut Runtime, id: NodeId) {
    if rt.graph.kind(id) != Some(ElementKind::Timeline) {
        return;
    }
    rt.scheduler.add(id);
    for child in child_timelines(&rt.graph, id) {
        play(rt, child);
    }
}

/// Deregisters the timeline and its child timelines. No tick reaches them
/// after this returns.
pub fn stop(rt: &mut Runtime, id: NodeId) {
    if rt.graph.kind(id) != Some(ElementKind::Timeline) {
        return;
    }
    rt.scheduler.remove(id);
    for child in child_timelines(&rt.graph, id) {
        stop(rt, child);
    }
}

pub fn goto_and_play(rt: &mut Runtime, id: NodeId, frame: usize) {
    let Some(timeline) = rt.graph.element_mut::<Timeline>(id) else {
        return;
    };
    timeline.current_frame = frame;
    rt.scheduler.remove(id);
    play(rt, id);
}

/// Moves the cursor and applies that frame to the tracked children without
/// touching transport state.
pub fn goto_and_stop(graph: &mut SceneGraph, id: NodeId, frame: usize) {
    let Some(timeline) = graph.element_mut::<Timeline>(id) else {
        return;
    };
    timeline.current_frame = frame;

    let Some(timeline) = graph.element::<Timeline>(id) else {
        return;
    };
    let updates: Vec<(NodeId, AnimTrackData)> = timeline
        .frames
        .iter()
        .filter_map(|(name, track)| {
            let key = track.get(frame)?.as_ref()?;
            let child = graph.child_by_name(id, name)?;
            Some((child, key.clone()))
        })
        .collect();

    for (child, key) in updates {
        graph.apply_keyframe(child, &key);
    }
}

pub fn is_playing(rt: &Runtime, id: NodeId) -> bool {
    rt.scheduler.contains(id)
}

/// One scheduler step: apply the current frame, dispatch its cue point, then
/// advance. Past the last frame the cursor wraps (looping) or playback stops,
/// and the end listener fires either way.
///
/// Cue and end listeners run with the runtime borrowed mutably, so a listener
/// may `stop` or `goto_and_*` this timeline. The cursor still advances past
/// the cue frame afterwards.
pub fn update(rt: &mut Runtime, id: NodeId) {
    let Some(frame) = rt.graph.element::<Timeline>(id).map(|t| t.current_frame) else {
        rt.scheduler.remove(id);
        return;
    };
    goto_and_stop(&mut rt.graph, id, frame);

    let cue = rt
        .graph
        .element::<Timeline>(id)
        .and_then(|t| t.cue_points.get(&frame).cloned());
    if let Some(name) = cue {
        let event = CueEvent {
            name: name.clone(),
            timeline: id,
            frame,
        };
        cue::trigger(rt, &event);
    }

    let Some(timeline) = rt.graph.element_mut::<Timeline>(id) else {
        return;
    };
    timeline.current_frame += 1;
    if timeline.current_frame <= timeline.total_frames {
        return;
    }

    let looped = timeline.looping;
    if looped {
        timeline.current_frame = 0;
    }
    let mut callback = timeline.on_end.take();
    let generation = timeline.end_generation;
    if !looped {
        rt.scheduler.remove(id);
    }

    if let Some(cb) = callback.as_mut() {
        cb(&TimelineEnd { timeline: id, looped }, rt);
    }
    if let Some(cb) = callback {
        if let Some(timeline) = rt.graph.element_mut::<Timeline>(id) {
            // A listener that replaced or removed itself keeps that change.
            if timeline.end_generation == generation {
                timeline.on_end = Some(cb);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Container;
    use std::cell::Cell;
    use std::rc::Rc;

    fn key(x: Option<f32>, alpha: Option<f32>) -> Option<AnimTrackData> {
        Some(AnimTrackData {
            x,
            alpha,
            ..Default::default()
        })
    }

    fn timeline_with(rt: &mut Runtime, tracks: Vec<(&str, Vec<Option<AnimTrackData>>)>) -> NodeId {
        let id = rt.graph.add_named(Box::new(Timeline::new()), "tl");
        for (name, _) in &tracks {
            let child = rt.graph.add_named(Box::new(Container::new()), name);
            rt.graph.add_child(id, child);
        }
        let frames = tracks.into_iter().map(|(n, t)| (n.to_string(), t));
        rt.graph.element_mut::<Timeline>(id).unwrap().set_frames(frames);
        id
    }

    #[test]
    fn test_total_frames_is_longest_track() {
        let mut tl = Timeline::new();
        tl.set_frames(vec![
            ("a".to_string(), vec![None; 3]),
            ("b".to_string(), vec![None; 7]),
            ("c".to_string(), vec![None; 5]),
        ]);
        assert_eq!(tl.total_frames(), 7);
    }

    #[test]
    fn test_sparse_keyframes_persist() {
        let mut rt = Runtime::new(24.0);
        let tl = timeline_with(&mut rt, vec![("ball", vec![key(Some(10.0), None), key(None, Some(0.5))])]);
        let ball = rt.graph.child_by_name(tl, "ball").unwrap();

        play(&mut rt, tl);
        rt.step();
        rt.step();
        assert_eq!(rt.graph.x(ball), 10.0);
        assert_eq!(rt.graph.alpha(ball), 0.5);
    }

    #[test]
    fn test_short_track_keeps_last_values() {
        let mut rt = Runtime::new(24.0);
        let tl = timeline_with(
            &mut rt,
            vec![
                ("short", vec![key(Some(1.0), None)]),
                ("long", vec![key(Some(0.0), None), None, key(Some(3.0), None)]),
            ],
        );
        let short = rt.graph.child_by_name(tl, "short").unwrap();
        goto_and_stop(&mut rt.graph, tl, 0);
        goto_and_stop(&mut rt.graph, tl, 2);
        assert_eq!(rt.graph.x(short), 1.0);
        assert_eq!(rt.graph.element::<Timeline>(tl).unwrap().current_frame, 2);
    }

    #[test]
    fn test_non_looping_stops_and_fires_end_once() {
        let mut rt = Runtime::new(24.0);
        let tl = timeline_with(&mut rt, vec![("a", vec![None; 2])]);
        let ends = Rc::new(Cell::new(0));
        {
            let t = rt.graph.element_mut::<Timeline>(tl).unwrap();
            t.looping = false;
            let ends = ends.clone();
            t.add_state_end_listener(move |e, _| {
                assert!(!e.looped);
                ends.set(ends.get() + 1);
            });
        }
        play(&mut rt, tl);
        for _ in 0..10 {
            rt.step();
        }
        assert_eq!(ends.get(), 1);
        assert!(!is_playing(&rt, tl));
        assert!(rt.graph.element::<Timeline>(tl).unwrap().has_end_listener());
    }

    #[test]
    fn test_cue_listener_stops_its_timeline() {
        let mut rt = Runtime::new(24.0);
        let tl = timeline_with(&mut rt, vec![("a", vec![key(Some(0.0), None); 5])]);
        rt.graph
            .element_mut::<Timeline>(tl)
            .unwrap()
            .set_cue_points(HashMap::from([(2, "halt".to_string())]));
        rt.cues.add_listener("halt", |event, rt| stop(rt, event.timeline));

        play(&mut rt, tl);
        for _ in 0..6 {
            rt.step();
        }
        assert!(!is_playing(&rt, tl));
        assert_eq!(rt.graph.element::<Timeline>(tl).unwrap().current_frame, 3);
    }

    #[test]
    fn test_end_listener_jumps_back_and_can_remove_itself() {
        let mut rt = Runtime::new(24.0);
        let tl = timeline_with(&mut rt, vec![("a", vec![key(Some(1.0), None), key(Some(2.0), None)])]);
        let ends = Rc::new(Cell::new(0));
        {
            let t = rt.graph.element_mut::<Timeline>(tl).unwrap();
            t.looping = false;
            let ends = ends.clone();
            t.add_state_end_listener(move |end, rt| {
                ends.set(ends.get() + 1);
                if let Some(t) = rt.graph.element_mut::<Timeline>(end.timeline) {
                    t.remove_state_end_listener();
                }
                goto_and_play(rt, end.timeline, 1);
            });
        }
        play(&mut rt, tl);
        for _ in 0..3 {
            rt.step();
        }
        assert_eq!(ends.get(), 1);
        assert!(is_playing(&rt, tl));
        assert!(!rt.graph.element::<Timeline>(tl).unwrap().has_end_listener());

        for _ in 0..5 {
            rt.step();
        }
        assert_eq!(ends.get(), 1);
        assert!(!is_playing(&rt, tl));
    }

    #[test]
    fn test_play_and_stop_recurse_into_child_timelines() {
        let mut rt = Runtime::new(24.0);
        let outer = rt.graph.add_named(Box::new(Timeline::new()), "outer");
        let inner = rt.graph.add_named(Box::new(Timeline::new()), "inner");
        let plain = rt.graph.add_named(Box::new(Container::new()), "plain");
        rt.graph.add_child(outer, inner);
        rt.graph.add_child(outer, plain);

        play(&mut rt, outer);
        assert_eq!(rt.scheduler.registered(), &[outer, inner]);
        stop(&mut rt, outer);
        assert!(rt.scheduler.is_empty());
    }

    #[test]
    fn test_goto_and_play_moves_cursor() {
        let mut rt = Runtime::new(24.0);
        let tl = timeline_with(&mut rt, vec![("a", vec![key(Some(1.0), None), key(Some(2.0), None)])]);
        let a = rt.graph.child_by_name(tl, "a").unwrap();
        goto_and_play(&mut rt, tl, 1);
        assert!(is_playing(&rt, tl));
        rt.step();
        assert_eq!(rt.graph.x(a), 2.0);
        assert_eq!(rt.graph.element::<Timeline>(tl).unwrap().current_frame, 2);
    }
}
