use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Root of a scene file (`placements.json`).
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct SceneData {
    #[serde(default = "default_fps")]
    pub fps: f32,
    pub resolution: Resolution,
    /// Template name -> (frame index -> cue point name).
    #[serde(default)]
    pub cue_points: HashMap<String, HashMap<usize, String>>,
    /// Keyed by `instanceName + "_" + templateName`.
    #[serde(default)]
    pub anim_tracks: Option<HashMap<String, Vec<Option<AnimTrackData>>>>,
    #[serde(default)]
    pub stage: Option<TemplateData>,
    #[serde(default)]
    pub templates: HashMap<String, TemplateData>,
    #[serde(default)]
    pub fonts: Vec<String>,
    /// Atlas-based (`ta.json` + `ta.png`) or individual-image asset loading.
    #[serde(default = "default_true")]
    pub atlas: bool,
}

/// Frame rate used when a scene file omits `fps`.
pub const DEFAULT_FPS: f32 = 24.0;

fn default_fps() -> f32 {
    DEFAULT_FPS
}

fn default_true() -> bool {
    true
}

fn default_one() -> f32 {
    1.0
}

impl SceneData {
    /// Looks up the keyframe track of `instance_name` inside `template_name`.
    pub fn track(&self, instance_name: &str, template_name: &str) -> Option<&Vec<Option<AnimTrackData>>> {
        let key = format!("{}_{}", instance_name, template_name);
        self.anim_tracks.as_ref().and_then(|tracks| tracks.get(&key))
    }
}

/// Design resolution. Stored in landscape terms, swapped at runtime in portrait.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq)]
pub struct Resolution {
    pub x: f32,
    pub y: f32,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnchorType {
    #[default]
    #[serde(rename = "none")]
    None,
    #[serde(rename = "topLeft")]
    TopLeft,
    #[serde(rename = "topRight")]
    TopRight,
    #[serde(rename = "btmLeft")]
    BottomLeft,
    #[serde(rename = "btmRight")]
    BottomRight,
    #[serde(rename = "left")]
    Left,
    #[serde(rename = "right")]
    Right,
    #[serde(rename = "top")]
    Top,
    #[serde(rename = "btm")]
    Bottom,
    #[serde(rename = "center")]
    Center,
    #[serde(other)]
    Unknown,
}

/// Fraction of the viewport, `0.0..=1.0` on each axis.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Default)]
pub struct AnchorPercentage {
    #[serde(default)]
    pub x: f32,
    #[serde(default)]
    pub y: f32,
}

/// Transform snapshot for one orientation.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct OrientationData {
    #[serde(default)]
    pub x: f32,
    #[serde(default)]
    pub y: f32,
    #[serde(default)]
    pub rotation: f32,
    #[serde(default = "default_one")]
    pub scale_x: f32,
    #[serde(default = "default_one")]
    pub scale_y: f32,
    #[serde(default)]
    pub pivot_x: f32,
    #[serde(default)]
    pub pivot_y: f32,
    #[serde(default = "default_one")]
    pub alpha: f32,
    #[serde(default)]
    pub width: f32,
    #[serde(default)]
    pub height: f32,
    #[serde(default = "default_true")]
    pub visible: bool,
    #[serde(default)]
    pub is_anchored: bool,
    #[serde(default)]
    pub anchor_type: Option<AnchorType>,
    #[serde(default)]
    pub anchor_percentage: Option<AnchorPercentage>,
}

impl Default for OrientationData {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            rotation: 0.0,
            scale_x: 1.0,
            scale_y: 1.0,
            pivot_x: 0.0,
            pivot_y: 0.0,
            alpha: 1.0,
            width: 0.0,
            height: 0.0,
            visible: true,
            is_anchored: false,
            anchor_type: None,
            anchor_percentage: None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InstanceAttributes {
    #[serde(default)]
    pub fit_to_screen: Option<bool>,
}

/// A template placed inside a specific parent.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct InstanceData {
    /// Template this instance resolves to.
    pub name: String,
    #[serde(default)]
    pub instance_name: String,
    #[serde(default)]
    pub template: bool,
    #[serde(default)]
    pub guide: bool,
    #[serde(default)]
    pub portrait: OrientationData,
    #[serde(default)]
    pub landscape: OrientationData,
    #[serde(default)]
    pub attrs: Option<InstanceAttributes>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct SpriteData {
    pub name: String,
    #[serde(default)]
    pub width: f32,
    #[serde(default)]
    pub height: f32,
    #[serde(default)]
    pub file_path: Option<String>,
    #[serde(default)]
    pub x: f32,
    #[serde(default)]
    pub y: f32,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct NineSliceData {
    #[serde(flatten)]
    pub sprite: SpriteData,
    #[serde(default)]
    pub top: f32,
    #[serde(default)]
    pub bottom: f32,
    #[serde(default)]
    pub left: f32,
    #[serde(default)]
    pub right: f32,
    #[serde(default)]
    pub orig_width: f32,
    #[serde(default)]
    pub orig_height: f32,
    #[serde(default)]
    pub portrait: OrientationData,
    #[serde(default)]
    pub landscape: OrientationData,
}

/// Font size as authored: a pixel number or a CSS string such as `"32px"`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum FontSize {
    Px(f32),
    Css(String),
}

impl FontSize {
    /// Pixel value, parsing a leading number out of CSS strings.
    pub fn px(&self) -> Option<f32> {
        match self {
            FontSize::Px(v) => Some(*v),
            FontSize::Css(s) => s.trim().trim_end_matches("px").trim().parse().ok(),
        }
    }
}

impl Default for FontSize {
    fn default() -> Self {
        FontSize::Px(26.0)
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum FontName {
    Single(String),
    Stack(Vec<String>),
}

impl FontName {
    /// The primary family, used for bitmap-font matching.
    pub fn primary(&self) -> Option<&str> {
        match self {
            FontName::Single(s) => Some(s.as_str()),
            FontName::Stack(list) => list.first().map(|s| s.as_str()),
        }
    }
}

/// Text fill: packed RGB number, CSS string, or a gradient stop list.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum TextFill {
    Packed(u32),
    Css(String),
    Stops(Vec<TextFill>),
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum Padding {
    Uniform(f32),
    Sides(Vec<f32>),
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum StrokeColor {
    Packed(u32),
    Css(String),
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct TextData {
    pub name: String,
    #[serde(default)]
    pub x: f32,
    #[serde(default)]
    pub y: f32,
    #[serde(default)]
    pub rotation: f32,
    #[serde(default)]
    pub width: f32,
    #[serde(default)]
    pub height: f32,
    #[serde(default = "default_one")]
    pub alpha: f32,
    #[serde(default)]
    pub size: FontSize,
    #[serde(default)]
    pub color: Option<TextFill>,
    #[serde(default)]
    pub align: Option<String>,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub font_name: Option<FontName>,
    #[serde(default)]
    pub z: f32,
    #[serde(default)]
    pub stroke: Option<StrokeColor>,
    #[serde(default)]
    pub stroke_thickness: Option<f32>,
    #[serde(default)]
    pub word_wrap: Option<bool>,
    #[serde(default)]
    pub word_wrap_width: Option<f32>,
    #[serde(default)]
    pub break_words: Option<bool>,
    #[serde(default)]
    pub leading: Option<f32>,
    #[serde(default)]
    pub letter_spacing: Option<f32>,
    #[serde(default)]
    pub padding: Option<Padding>,
    #[serde(default)]
    pub text_anchor_x: f32,
    #[serde(default)]
    pub text_anchor_y: f32,
    #[serde(default)]
    pub font_weight: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct TextInputData {
    pub name: String,
    #[serde(default)]
    pub x: f32,
    #[serde(default)]
    pub y: f32,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub props: Option<serde_json::Value>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct ParticleData {
    pub name: String,
    #[serde(default)]
    pub json_path: Option<String>,
    #[serde(default)]
    pub png_paths: Vec<String>,
    #[serde(default)]
    pub emitter_config: Option<serde_json::Value>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct SpineData {
    pub name: String,
    pub spine_json: String,
    pub spine_atlas: String,
    #[serde(default)]
    pub png_files: Vec<String>,
    #[serde(default)]
    pub animations: Vec<String>,
    #[serde(default)]
    pub skin: Option<String>,
}

/// One child description inside a template, discriminated by its `type` tag.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(tag = "type")]
pub enum AssetData {
    #[serde(rename = "asset")]
    Asset(InstanceData),
    #[serde(rename = "btn")]
    Button(InstanceData),
    #[serde(rename = "state")]
    State(InstanceData),
    #[serde(rename = "toggle")]
    Toggle(InstanceData),
    #[serde(rename = "slider")]
    Slider(InstanceData),
    #[serde(rename = "scrollBar")]
    ScrollBar(InstanceData),
    #[serde(rename = "fullScreen")]
    FullScreen(InstanceData),
    #[serde(rename = "img")]
    Image(SpriteData),
    #[serde(rename = "9slice")]
    NineSlice(NineSliceData),
    #[serde(rename = "textField")]
    Text(TextData),
    #[serde(rename = "bmpTextField")]
    BitmapText(TextData),
    #[serde(rename = "inputField")]
    Input(TextInputData),
    #[serde(rename = "particle")]
    Particle(ParticleData),
    #[serde(rename = "spine")]
    Spine(SpineData),
    #[serde(other)]
    Unknown,
}

impl AssetData {
    /// The wire `type` tag of this child.
    pub fn type_tag(&self) -> &'static str {
        match self {
            AssetData::Asset(_) => "asset",
            AssetData::Button(_) => "btn",
            AssetData::State(_) => "state",
            AssetData::Toggle(_) => "toggle",
            AssetData::Slider(_) => "slider",
            AssetData::ScrollBar(_) => "scrollBar",
            AssetData::FullScreen(_) => "fullScreen",
            AssetData::Image(_) => "img",
            AssetData::NineSlice(_) => "9slice",
            AssetData::Text(_) => "textField",
            AssetData::BitmapText(_) => "bmpTextField",
            AssetData::Input(_) => "inputField",
            AssetData::Particle(_) => "particle",
            AssetData::Spine(_) => "spine",
            AssetData::Unknown => "unknown",
        }
    }

    /// Declared `name`. For instances this is the template they resolve to.
    pub fn name(&self) -> Option<&str> {
        match self {
            AssetData::Asset(d)
            | AssetData::Button(d)
            | AssetData::State(d)
            | AssetData::Toggle(d)
            | AssetData::Slider(d)
            | AssetData::ScrollBar(d)
            | AssetData::FullScreen(d) => Some(&d.name),
            AssetData::Image(d) => Some(&d.name),
            AssetData::NineSlice(d) => Some(&d.sprite.name),
            AssetData::Text(d) | AssetData::BitmapText(d) => Some(&d.name),
            AssetData::Input(d) => Some(&d.name),
            AssetData::Particle(d) => Some(&d.name),
            AssetData::Spine(d) => Some(&d.name),
            AssetData::Unknown => None,
        }
    }

    /// Instance placement, for the instantiable container types.
    pub fn instance(&self) -> Option<&InstanceData> {
        match self {
            AssetData::Asset(d)
            | AssetData::Button(d)
            | AssetData::State(d)
            | AssetData::Toggle(d)
            | AssetData::Slider(d)
            | AssetData::ScrollBar(d)
            | AssetData::FullScreen(d) => Some(d),
            _ => None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct TemplateData {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub children: Vec<AssetData>,
}

/// One keyframe. Absent fields leave the target untouched.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnimTrackData {
    #[serde(default, rename = "chilName")]
    pub child_name: Option<String>,
    #[serde(default)]
    pub parent_template: Option<String>,
    #[serde(default)]
    pub x: Option<f32>,
    #[serde(default)]
    pub y: Option<f32>,
    #[serde(default)]
    pub alpha: Option<f32>,
    #[serde(default)]
    pub key_frame: Option<bool>,
    #[serde(default)]
    pub current_frame: Option<u32>,
    #[serde(default)]
    pub end_frame: Option<u32>,
    #[serde(default)]
    pub pivot_x: Option<f32>,
    #[serde(default)]
    pub pivot_y: Option<f32>,
    #[serde(default)]
    pub rotation: Option<f32>,
    #[serde(default)]
    pub scale_x: Option<f32>,
    #[serde(default)]
    pub scale_y: Option<f32>,
    #[serde(default)]
    pub easing: Option<String>,
}
