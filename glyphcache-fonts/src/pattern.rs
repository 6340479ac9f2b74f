//! Rendering requests.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::attributes::{Slant, Weight};
use crate::server_font::ServerFont;
use crate::sfnt::Tag;

/// Opaque identifier of a registered face.
pub type FontId = u32;

/// Back-reference from a selection to whoever asked for it.
///
/// The entry only receives the constructed instance; nothing in this crate
/// reads it back.
#[derive(Default)]
pub struct FontEntry {
    server_font: RefCell<Weak<ServerFont>>,
}

impl FontEntry {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub(crate) fn set_server_font(&self, font: &Rc<ServerFont>) {
        *self.server_font.borrow_mut() = Rc::downgrade(font);
    }

    /// The instance created for this entry, while it is alive.
    pub fn server_font(&self) -> Option<Rc<ServerFont>> {
        self.server_font.borrow().upgrade()
    }
}

impl fmt::Debug for FontEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FontEntry")
            .field("has_font", &self.server_font().is_some())
            .finish()
    }
}

/// A request for a sized, styled rendering instance of one face.
#[derive(Debug, Clone, Default)]
pub struct FontSelectPattern {
    pub font_id: FontId,
    /// Pixel height
    pub height: u32,
    /// Pixel width, 0 to derive it from the height
    pub width: u32,
    pub weight: Weight,
    pub slant: Slant,
    /// Tenths of a degree, counter-clockwise
    pub orientation: i32,
    pub vertical: bool,
    pub non_antialiased: bool,
    /// GSUB script to restrict vertical substitutions to
    pub script: Option<Tag>,
    /// GSUB language system to restrict vertical substitutions to
    pub language: Option<Tag>,
    pub font_entry: Option<Rc<FontEntry>>,
}

/// Value fields of a [`FontSelectPattern`], used as a cache key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FontSelectKey {
    font_id: FontId,
    height: u32,
    width: u32,
    weight: Weight,
    slant: Slant,
    orientation: i32,
    vertical: bool,
    non_antialiased: bool,
    script: Option<Tag>,
    language: Option<Tag>,
}

impl FontSelectPattern {
    pub fn new(font_id: FontId, height: u32) -> Self {
        Self {
            font_id,
            height,
            ..Self::default()
        }
    }

    pub fn with_width(mut self, width: u32) -> Self {
        self.width = width;
        self
    }

    pub fn with_weight(mut self, weight: Weight) -> Self {
        self.weight = weight;
        self
    }

    pub fn with_slant(mut self, slant: Slant) -> Self {
        self.slant = slant;
        self
    }

    pub fn with_orientation(mut self, orientation: i32) -> Self {
        self.orientation = orientation;
        self
    }

    pub fn with_vertical(mut self, vertical: bool) -> Self {
        self.vertical = vertical;
        self
    }

    pub fn with_non_antialiased(mut self, non_antialiased: bool) -> Self {
        self.non_antialiased = non_antialiased;
        self
    }

    pub fn cache_key(&self) -> FontSelectKey {
        FontSelectKey {
            font_id: self.font_id,
            height: self.height,
            width: self.width,
            weight: self.weight,
            slant: self.slant,
            orientation: self.orientation,
            vertical: self.vertical,
            non_antialiased: self.non_antialiased,
            script: self.script,
            language: self.language,
        }
    }
}
