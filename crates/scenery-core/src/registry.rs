//! Maps template `type` tags to the element a spawned root becomes.

use crate::element::Element;
use crate::node::Container;
use crate::widgets::{Button, Scroll, Slider, StateView, Toggle};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetType {
    Asset,
    Button,
    State,
    Toggle,
    Slider,
    ScrollBar,
    FullScreen,
}

impl AssetType {
    pub const ALL: [AssetType; 7] = [
        AssetType::Asset,
        AssetType::Button,
        AssetType::State,
        AssetType::Toggle,
        AssetType::Slider,
        AssetType::ScrollBar,
        AssetType::FullScreen,
    ];

    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.tag() == tag)
    }

    pub fn tag(self) -> &'static str {
        match self {
            AssetType::Asset => "asset",
            AssetType::Button => "btn",
            AssetType::State => "state",
            AssetType::Toggle => "toggle",
            AssetType::Slider => "slider",
            AssetType::ScrollBar => "scrollBar",
            AssetType::FullScreen => "fullScreen",
        }
    }

    /// A fresh, unbound element of this type.
    pub fn instantiate(self) -> Box<dyn Element> {
        match self {
            AssetType::Asset | AssetType::FullScreen => Box::new(Container::new()),
            AssetType::Button => Box::new(Button::new()),
            AssetType::State => Box::new(StateView::new()),
            AssetType::Toggle => Box::new(Toggle::new()),
            AssetType::Slider => Box::new(Slider::new()),
            AssetType::ScrollBar => Box::new(Scroll::new()),
        }
    }
}

/// The element for a template tag. Unknown tags become plain containers.
pub fn resolve(tag: &str) -> Box<dyn Element> {
    match AssetType::from_tag(tag) {
        Some(kind) => kind.instantiate(),
        None => Box::new(Container::new()),
    }
}
