//! Implementations of the CLI subcommands.
//!
//! The formatting helpers return strings so the output can be tested
//! without a terminal.

use std::fmt::Write as _;
use std::path::Path;
use std::rc::Rc;

use anyhow::{Context, Result};
use glyphcache_config::GlyphCacheConfig;
use glyphcache_fonts::sfnt::tag_to_string;
use glyphcache_fonts::{
    BitDepth, FontError, FontInfo, FontManager, FontSelectPattern, GlyphOutline, MmapFileMapper,
    PointFlag, RawBitmap, ServerFont, Slant, Weight,
};

use crate::cli::FaceArgs;

/// Coverage ramp for 8-bit rasters, lightest first.
const GRAY_RAMP: &[u8] = b" .:-=+*#%@";

/// Glyph request options of the `render` command.
#[derive(Debug, Clone, Default)]
pub struct RenderRequest {
    pub character: char,
    pub orientation: i32,
    pub mono: bool,
    pub vertical: bool,
    pub bold: bool,
    pub italic: bool,
}

/// Load the config from `path`, or from the default location.
pub fn load_config(path: Option<&Path>) -> Result<GlyphCacheConfig> {
    match path {
        Some(path) => {
            let mut config = GlyphCacheConfig::load_from(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?;
            config.apply_env_overrides();
            Ok(config)
        }
        None => GlyphCacheConfig::load().context("Failed to load default config"),
    }
}

fn empty_manager(config: &GlyphCacheConfig) -> FontManager {
    FontManager::new(Rc::new(MmapFileMapper), config)
}

/// Register the file behind `face` and return the face it names.
fn open_face(manager: &mut FontManager, face: &FaceArgs) -> Result<Rc<FontInfo>> {
    let ids = manager
        .add_font_path(&face.font)
        .with_context(|| format!("Failed to open {}", face.font.display()))?;
    ids.iter()
        .filter_map(|&id| manager.font_info(id))
        .find(|info| info.face_index() == face.index)
        .cloned()
        .ok_or_else(|| {
            FontError::InvalidFont {
                path: face.font.clone(),
                index: face.index,
            }
            .into()
        })
}

fn create_instance(
    manager: &FontManager,
    pattern: &FontSelectPattern,
    face: &FaceArgs,
) -> Result<Rc<ServerFont>> {
    let font = manager
        .create_font(pattern)
        .ok_or(FontError::UnknownFont(pattern.font_id))?;
    if !font.is_valid() {
        anyhow::bail!(
            "Face {} of {} cannot be set up at {}px",
            face.index,
            face.font.display(),
            face.size
        );
    }
    Ok(font)
}

/// `scan`: list every face found under `dir`.
pub fn scan(config: &GlyphCacheConfig, dir: &Path) -> Result<()> {
    let mut manager = empty_manager(config);
    let count = manager
        .add_fonts_from_dir(dir)
        .with_context(|| format!("Failed to scan {}", dir.display()))?;
    let mut faces: Vec<Rc<FontInfo>> = Vec::new();
    manager.announce_fonts(&mut faces);
    faces.sort_by_key(|info| info.font_id());
    for info in &faces {
        println!("{}", describe_face(info));
    }
    println!("{} faces in {} files", count, manager.file_count());
    Ok(())
}

/// One line per registered face.
pub fn describe_face(info: &FontInfo) -> String {
    let attributes = info.attributes();
    let mut line = format!(
        "{:>4}  {} {}  weight {}",
        info.font_id(),
        attributes.family_name,
        attributes.style_name,
        attributes.weight.0
    );
    if attributes.slant.is_slanted() {
        line.push_str("  slanted");
    }
    if attributes.symbol {
        line.push_str("  symbol");
    }
    let _ = write!(line, "  {}#{}", info.file().path().display(), info.face_index());
    line
}

/// `metrics`: line metrics and OpenType coverage of one face.
pub fn metrics(config: &GlyphCacheConfig, face: &FaceArgs) -> Result<()> {
    let mut manager = empty_manager(config);
    let info = open_face(&mut manager, face)?;
    let pattern = FontSelectPattern::new(info.font_id(), face.size);
    let font = create_instance(&manager, &pattern, face)?;

    let metric = font.fetch_font_metric();
    println!("family:      {}", metric.attributes.family_name);
    println!("style:       {}", metric.attributes.style_name);
    println!("ascent:      {}", metric.ascent);
    println!("descent:     {}", metric.descent);
    println!("int leading: {}", metric.int_leading);
    println!("ext leading: {}", metric.ext_leading);
    println!("width:       {}", metric.width);
    println!("kashida:     {}", metric.min_kashida);
    println!("kernable:    {}", metric.kernable);
    println!("pitch:       {:?}", metric.attributes.pitch);
    println!("family type: {:?}", metric.attributes.family_type);
    println!("glyphs:      {}", info.glyph_count());

    let caps = font.font_capabilities();
    if let Some(scripts) = &caps.gsub_script_tags {
        let names: Vec<String> = scripts.iter().map(|&t| tag_to_string(t)).collect();
        println!("gsub:        {}", names.join(" "));
    }
    if let Some(range) = caps.unicode_range {
        println!(
            "unicode:     {:08x} {:08x} {:08x} {:08x}",
            range[0], range[1], range[2], range[3]
        );
    }
    if let Some(range) = caps.code_page_range {
        println!("code pages:  {:08x} {:08x}", range[0], range[1]);
    }
    Ok(())
}

/// `render`: draw one character as ASCII art.
pub fn render(config: &GlyphCacheConfig, face: &FaceArgs, request: &RenderRequest) -> Result<()> {
    let mut manager = empty_manager(config);
    let info = open_face(&mut manager, face)?;
    let mut pattern = FontSelectPattern::new(info.font_id(), face.size)
        .with_orientation(request.orientation)
        .with_vertical(request.vertical)
        .with_non_antialiased(request.mono);
    if request.bold {
        pattern = pattern.with_weight(Weight::BOLD);
    }
    if request.italic {
        pattern = pattern.with_slant(Slant::Italic);
    }
    let font = create_instance(&manager, &pattern, face)?;

    let glyph = font.glyph_index(request.character as u32);
    if glyph.index == 0 {
        log::warn!("U+{:04X} is not mapped; rendering .notdef", request.character as u32);
    }
    let data = font.init_glyph_data(glyph);
    let bitmap = if request.mono {
        font.glyph_bitmap1(glyph)
    } else {
        font.glyph_bitmap8(glyph)
    }
    .with_context(|| format!("Glyph {} could not be rendered", glyph.index))?;

    println!(
        "glyph {} flags {:?} advance {} delta ({}, {})",
        glyph.index, glyph.flags, data.char_width, data.delta.0, data.delta.1
    );
    println!(
        "{}x{} at ({}, {})",
        bitmap.width, bitmap.height, bitmap.x_offset, bitmap.y_offset
    );
    print!("{}", bitmap_to_ascii(&bitmap));
    Ok(())
}

/// Draw a raster with one character per pixel, framed by `|`.
pub fn bitmap_to_ascii(bitmap: &RawBitmap) -> String {
    let mut out = String::new();
    for y in 0..bitmap.height {
        out.push('|');
        for x in 0..bitmap.width {
            let value = bitmap.pixel(x, y);
            let ch = match bitmap.depth {
                BitDepth::Mono => {
                    if value != 0 {
                        '#'
                    } else {
                        ' '
                    }
                }
                BitDepth::Gray => {
                    let step = usize::from(value) * (GRAY_RAMP.len() - 1) / 255;
                    char::from(GRAY_RAMP[step])
                }
            };
            out.push(ch);
        }
        out.push_str("|\n");
    }
    out
}

/// `outline`: print the contours of one character.
pub fn outline(config: &GlyphCacheConfig, face: &FaceArgs, character: char) -> Result<()> {
    let mut manager = empty_manager(config);
    let info = open_face(&mut manager, face)?;
    let pattern = FontSelectPattern::new(info.font_id(), face.size);
    let font = create_instance(&manager, &pattern, face)?;

    let glyph = font.glyph_index(character as u32);
    let outline = font
        .glyph_outline(glyph)
        .with_context(|| format!("Glyph {} has no outline", glyph.index))?;
    print!("{}", outline_to_text(&outline));
    Ok(())
}

/// One line per contour point; off-curve points are marked.
pub fn outline_to_text(outline: &GlyphOutline) -> String {
    let mut out = String::new();
    for (i, contour) in outline.contours.iter().enumerate() {
        let _ = writeln!(out, "contour {} ({} points)", i, contour.len());
        for point in contour {
            let marker = match point.flag {
                PointFlag::Normal => "on",
                PointFlag::Control => "off",
            };
            let _ = writeln!(out, "  {:>9.3} {:>9.3}  {}", point.x, point.y, marker);
        }
    }
    out
}
