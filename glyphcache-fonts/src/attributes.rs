//! Device font attributes reported by scanners and announced to collections.

/// Font weight on the usual 1–1000 scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Weight(pub u16);

impl Weight {
    pub const THIN: Weight = Weight(100);
    pub const LIGHT: Weight = Weight(300);
    pub const NORMAL: Weight = Weight(400);
    pub const MEDIUM: Weight = Weight(500);
    pub const SEMIBOLD: Weight = Weight(600);
    pub const BOLD: Weight = Weight(700);
    pub const BLACK: Weight = Weight(900);
}

impl Default for Weight {
    fn default() -> Self {
        Self::NORMAL
    }
}

/// Slant of a face or a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Slant {
    #[default]
    Upright,
    Oblique,
    Italic,
}

impl Slant {
    pub fn is_slanted(self) -> bool {
        self != Slant::Upright
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Pitch {
    #[default]
    DontKnow,
    Fixed,
    Variable,
}

/// Coarse design classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FamilyType {
    #[default]
    DontKnow,
    Decorative,
    Modern,
    Roman,
    Script,
    Swiss,
    System,
}

/// Attributes of one face as known to the font registry.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DevFontAttributes {
    pub family_name: String,
    pub style_name: String,
    pub weight: Weight,
    pub slant: Slant,
    pub pitch: Pitch,
    pub family_type: FamilyType,
    /// Symbol-encoded font (private-use code points)
    pub symbol: bool,
    /// Selection preference; higher is better
    pub quality: i32,
}

impl DevFontAttributes {
    pub fn new(family_name: impl Into<String>) -> Self {
        Self {
            family_name: family_name.into(),
            ..Self::default()
        }
    }
}

/// Families that are symbol fonts regardless of what their tables claim.
pub fn is_star_symbol(family_name: &str) -> bool {
    family_name.eq_ignore_ascii_case("starsymbol") || family_name.eq_ignore_ascii_case("opensymbol")
}
