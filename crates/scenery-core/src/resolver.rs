//! # Template Resolver
//!
//! Turns a template name into a live subtree.
//!
//! ## Resolution rules
//! - A template whose instances have keyframe tracks becomes a [`Timeline`];
//!   otherwise its `type` tag picks the element through [`registry`].
//! - Children are built in declared order. A non-instance child whose name is
//!   also a template gets that template's children expanded into it.
//! - Widgets are initialised once their subtree exists.
//! - Particles and skeletons are loaded in the background and attached later.

use crate::element::Element;
use crate::node::{texture_key, BitmapText, NineSlice, Sprite, TextField};
use crate::registry;
use crate::runtime::Runtime;
use crate::scene::SceneGraph;
use crate::scene_manager::ResizeMap;
use crate::systems::assets::AssetManager;
use crate::systems::attachments::{self, AttachmentLoader};
use crate::timeline::{self, FrameTracks, Timeline};
use crate::types::{NodeId, Orientation};
use crate::widgets;
use scenery_data::model::{AssetData, SceneData, TemplateData, TextData};
use tracing::{debug, error, instrument, warn};

/// Templates nested deeper than this are treated as a reference cycle.
pub const MAX_TEMPLATE_DEPTH: usize = 64;

/// Keyframe tracks of the instances declared in `template_name`.
pub fn children_frames(data: &SceneData, template_name: &str) -> FrameTracks {
    let mut frames = FrameTracks::new();
    let Some(template) = data.templates.get(template_name) else {
        return frames;
    };
    for child in &template.children {
        let Some(instance) = child.instance() else {
            continue;
        };
        if let Some(track) = data.track(&instance.instance_name, template_name) {
            frames.insert(instance.instance_name.clone(), track.clone());
        }
    }
    frames
}

/// One resolution pass over a scene's templates.
///
/// Borrowed from the owning `SceneManager` for the duration of a spawn.
pub struct TemplateResolver<'a> {
    pub data: &'a SceneData,
    pub assets: &'a AssetManager,
    pub orientation: Orientation,
    pub resize_map: &'a mut ResizeMap,
    pub attachments: &'a mut AttachmentLoader,
}

impl<'a> TemplateResolver<'a> {
    /// Builds a detached instance of `name`. `None` when no such template.
    #[instrument(level = "debug", skip(self, rt))]
    pub fn spawn(&mut self, rt: &mut Runtime, name: &str) -> Option<NodeId> {
        self.resolve(rt, name, 0)
    }

    fn resolve(&mut self, rt: &mut Runtime, name: &str, depth: usize) -> Option<NodeId> {
        if depth > MAX_TEMPLATE_DEPTH {
            error!("Template '{}' nests deeper than {} levels, stopping", name, MAX_TEMPLATE_DEPTH);
            return None;
        }
        let data = self.data;
        let template = data.templates.get(name)?;
        let frames = children_frames(data, name);

        if !frames.is_empty() {
            debug!("Template '{}' has {} tracks, building a timeline", name, frames.len());
            let id = rt.graph.add_named(Box::new(Timeline::new()), name);
            self.create_asset(rt, id, template, depth);
            if let Some(tl) = rt.graph.element_mut::<Timeline>(id) {
                tl.set_frames(frames);
                if let Some(cues) = data.cue_points.get(name) {
                    tl.set_cue_points(cues.clone());
                }
            }
            timeline::goto_and_stop(&mut rt.graph, id, 0);
            Some(id)
        } else {
            let id = rt.graph.add_named(registry::resolve(&template.kind), name);
            self.create_asset(rt, id, template, depth);
            widgets::init(rt, id);
            Some(id)
        }
    }

    /// Builds `template`'s children under `parent`.
    fn create_asset(&mut self, rt: &mut Runtime, parent: NodeId, template: &'a TemplateData, depth: usize) {
        for child in &template.children {
            let mut created = None;
            match child {
                AssetData::Text(text) | AssetData::BitmapText(text) => {
                    created = Some(self.create_text(&mut rt.graph, parent, text));
                }
                AssetData::Image(sprite) => {
                    let key = texture_key(&sprite.name, "_IMG");
                    match self.assets.texture(key) {
                        Some(texture) => {
                            let id = rt.graph.add_named(
                                Box::new(Sprite::new(texture, sprite.width, sprite.height)),
                                &sprite.name,
                            );
                            rt.graph.set_position(id, sprite.x, sprite.y);
                            rt.graph.add_child(parent, id);
                            created = Some(id);
                        }
                        None => warn!("Texture '{}' not found for '{}', skipping", key, sprite.name),
                    }
                }
                AssetData::NineSlice(slice) => {
                    let key = texture_key(&slice.sprite.name, "_9S");
                    match self.assets.texture(key) {
                        Some(texture) => {
                            let panel = NineSlice::new(texture, slice, self.orientation);
                            let id = rt.graph.add_named(Box::new(panel), &slice.sprite.name);
                            rt.graph.set_position(id, slice.sprite.x, slice.sprite.y);
                            rt.graph.add_child(parent, id);
                            self.resize_map.insert(id);
                            created = Some(id);
                        }
                        None => warn!("Texture '{}' not found for '{}', skipping", key, slice.sprite.name),
                    }
                }
                AssetData::Asset(instance)
                | AssetData::Button(instance)
                | AssetData::State(instance)
                | AssetData::Toggle(instance)
                | AssetData::Slider(instance)
                | AssetData::ScrollBar(instance)
                | AssetData::FullScreen(instance) => {
                    if let Some(id) = self.resolve(rt, &instance.name, depth + 1) {
                        rt.graph.add_child(parent, id);
                        rt.graph.set_instance_data(id, instance, self.orientation);
                        self.resize_map.insert(id);
                    } else {
                        debug!("Instance '{}' names no template", instance.instance_name);
                    }
                    // Already expanded by `resolve`.
                    continue;
                }
                AssetData::Particle(particle) => match &particle.emitter_config {
                    Some(config) => {
                        match attachments::build_emitter(self.assets, particle, config.clone()) {
                            Ok(emitter) => {
                                let id = rt.graph.add_named(Box::new(emitter), &particle.name);
                                rt.graph.add_child(parent, id);
                            }
                            Err(e) => error!("Abandoning particle '{}': {}", particle.name, e),
                        }
                    }
                    None => self.attachments.request_particles(self.assets, parent, particle),
                },
                AssetData::Spine(spine) => {
                    self.attachments.request_skeleton(self.assets, parent, spine);
                }
                AssetData::Input(input) => {
                    debug!("Skipping input field '{}'", input.name);
                }
                AssetData::Unknown => {}
            }

            let nested = child
                .name()
                .and_then(|n| self.data.templates.get(n).map(|t| (n, t)));
            if let Some((name, nested)) = nested {
                if nested.children.is_empty() {
                    continue;
                }
                if depth + 1 > MAX_TEMPLATE_DEPTH {
                    error!("Template '{}' nests deeper than {} levels, stopping", name, MAX_TEMPLATE_DEPTH);
                    continue;
                }
                self.create_asset(rt, created.unwrap_or(parent), nested, depth + 1);
            }
        }
    }

    /// Bitmap text when the primary font is a registered bitmap font,
    /// vector text otherwise.
    fn create_text(&self, graph: &mut SceneGraph, parent: NodeId, data: &TextData) -> NodeId {
        let font = data.font_name.as_ref().and_then(|f| f.primary());
        let element: Box<dyn Element> = match font {
            Some(font) if self.assets.has_bitmap_font(font) => Box::new(BitmapText::from_data(data, font)),
            _ => Box::new(TextField::from_data(data)),
        };
        let id = graph.add_named(element, &data.name);
        graph.set_position(id, data.x, data.y);
        graph.set_rotation(id, data.rotation);
        graph.set_alpha(id, data.alpha);
        graph.add_child(parent, id);
        id
    }
}
