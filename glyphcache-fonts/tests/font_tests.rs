//! End-to-end tests of the font subsystem over real files.
//!
//! These cover:
//! - Registration, announcement and instance creation through the manager
//! - Glyph lookup and metrics of a plain horizontal instance
//! - Rotated rendering and vertical substitution
//! - Coverage of symbol fonts without a cmap
//! - File mapping lifetime across instances

mod common;

use std::rc::Rc;

use common::TestContext;
use common::font_builder::{A_ADVANCE, GLYPH_A, TestFont, bar, vert_gsub};
use glyphcache_fonts::server_font::LoadFlags;
use glyphcache_fonts::{
    BitDepth, DevFontAttributes, FontInfo, FontSelectPattern, GlyphFlags, GlyphId,
};

mod horizontal {
    use super::*;

    #[test]
    fn test_char_to_glyph_and_advance() {
        let mut ctx = TestContext::new();
        ctx.register(&TestFont::new(), "plain.ttf", 1);
        let font = ctx.manager.create_font(&FontSelectPattern::new(1, 12)).unwrap();
        assert!(font.is_valid());

        let glyph = font.glyph_index('A' as u32);
        assert_eq!(glyph, GlyphId::new(GLYPH_A as u32));

        let data = font.init_glyph_data(glyph);
        let expected = (A_ADVANCE as f64 * 12.0 / 1000.0).round() as i32;
        assert_eq!(data.char_width, expected);
        assert_eq!(data.delta, (expected, 0));
    }

    #[test]
    fn test_metrics_of_plain_face() {
        let mut ctx = TestContext::new();
        ctx.register(&TestFont::new(), "plain.ttf", 1);
        let font = ctx.manager.create_font(&FontSelectPattern::new(1, 20)).unwrap();
        let metric = font.fetch_font_metric();
        assert_eq!(metric.ascent, 16);
        assert_eq!(metric.descent, 4);
        assert!(metric.scalable);
        assert_eq!(metric.width, 20);
    }

    #[test]
    fn test_stretch_one_takes_no_matrix_path() {
        let mut ctx = TestContext::new();
        ctx.register(&TestFont::new(), "plain.ttf", 1);
        for orientation in [0, 1800] {
            let pattern = FontSelectPattern::new(1, 20).with_orientation(orientation);
            let font = ctx.manager.create_font(&pattern).unwrap();
            assert_eq!(font.stretch(), 1.0);

            let mut glyph = font.load_glyph(GLYPH_A as u32, LoadFlags::empty()).unwrap();
            let transform =
                font.apply_glyph_transform(GlyphFlags::empty(), &mut glyph, true);
            assert!(!transform.matrix_applied);
            assert_eq!(transform.angle, orientation);
        }
    }
}

mod rotation {
    use super::*;

    #[test]
    fn test_quarter_turn_swaps_raster() {
        let mut ctx = TestContext::new();
        ctx.register(&TestFont::new(), "plain.ttf", 1);
        let upright = ctx.manager.create_font(&FontSelectPattern::new(1, 20)).unwrap();
        let turned = ctx
            .manager
            .create_font(&FontSelectPattern::new(1, 20).with_orientation(900))
            .unwrap();
        let a = GlyphId::new(GLYPH_A as u32);

        for (up, rot) in [
            (upright.glyph_bitmap1(a).unwrap(), turned.glyph_bitmap1(a).unwrap()),
            (upright.glyph_bitmap8(a).unwrap(), turned.glyph_bitmap8(a).unwrap()),
        ] {
            assert_eq!((rot.width, rot.height), (up.height, up.width));
            // Counter-clockwise: the top row of the upright raster becomes
            // the left column read from the bottom.
            for x in 0..up.width {
                assert_eq!(rot.pixel(0, up.width - 1 - x), up.pixel(x, 0));
            }
        }
    }

    #[test]
    fn test_quarter_turn_places_raster_like_glyph_data() {
        let mut ctx = TestContext::new();
        ctx.register(&TestFont::new(), "plain.ttf", 1);
        let turned = ctx
            .manager
            .create_font(&FontSelectPattern::new(1, 20).with_orientation(900))
            .unwrap();
        let a = GlyphId::new(GLYPH_A as u32);

        let data = turned.init_glyph_data(a);
        assert_eq!(data.offset, (-14, -12));
        assert_eq!(data.size, (15, 10));
        for bitmap in [turned.glyph_bitmap1(a).unwrap(), turned.glyph_bitmap8(a).unwrap()] {
            assert_eq!((bitmap.x_offset, bitmap.y_offset), data.offset);
        }
    }

    #[test]
    fn test_mono_raster_is_one_bit() {
        let mut ctx = TestContext::new();
        ctx.register(&TestFont::new(), "plain.ttf", 1);
        let font = ctx.manager.create_font(&FontSelectPattern::new(1, 16)).unwrap();
        let bitmap = font.glyph_bitmap1(font.glyph_index('A' as u32)).unwrap();
        assert_eq!(bitmap.depth, BitDepth::Mono);
        assert_eq!(bitmap.scanline_size, bitmap.width.div_ceil(8) as usize);
    }
}

mod vertical {
    use super::*;

    #[test]
    fn test_gsub_vertical_substitution() {
        let mut ctx = TestContext::new();
        let font = TestFont::new()
            .glyph(None, bar())
            .table(b"GSUB", vert_gsub(&[(GLYPH_A, 2)]));
        ctx.register(&font, "vert.ttf", 1);

        let pattern = FontSelectPattern::new(1, 20).with_vertical(true);
        let font = ctx.manager.create_font(&pattern).unwrap();
        let glyph = font.glyph_index('A' as u32);
        assert_eq!(glyph.index, 2);
        assert!(glyph.flags.contains(GlyphFlags::GSUB | GlyphFlags::ROTATE_LEFT));

        let outline = font.glyph_outline(glyph).unwrap();
        assert_eq!(outline.contours.len(), 1);
    }

    #[test]
    fn test_horizontal_request_ignores_gsub() {
        let mut ctx = TestContext::new();
        let font = TestFont::new()
            .glyph(None, bar())
            .table(b"GSUB", vert_gsub(&[(GLYPH_A, 2)]));
        ctx.register(&font, "vert.ttf", 1);
        let font = ctx.manager.create_font(&FontSelectPattern::new(1, 20)).unwrap();
        assert_eq!(font.glyph_index('A' as u32), GlyphId::new(GLYPH_A as u32));
    }
}

mod registry {
    use super::*;

    #[test]
    fn test_symbol_font_without_cmap_gets_private_use_range() {
        let mut ctx = TestContext::new();
        let mut attributes = DevFontAttributes::new("Dingbats");
        attributes.symbol = true;
        ctx.register_with(&TestFont::new().without_cmap(), "sym.ttf", 3, attributes);

        let info = ctx.manager.font_info(3).unwrap();
        let coverage = info.char_map();
        assert_eq!(coverage.ranges().len(), 1);
        let range = coverage.ranges()[0];
        assert_eq!((range.start, range.end), (0xF020, 0xF100));
    }

    #[test]
    fn test_repeated_registration_announces_once() {
        let mut ctx = TestContext::new();
        let path = ctx.register(&TestFont::new(), "plain.ttf", 5);
        assert!(
            !ctx.manager
                .add_font_file(&path, 0, 5, DevFontAttributes::new("Again"))
        );

        let mut announced: Vec<Rc<FontInfo>> = Vec::new();
        ctx.manager.announce_fonts(&mut announced);
        assert_eq!(announced.len(), 1);
        assert_eq!(announced[0].attributes().family_name, "Glyph Test");
    }

    #[test]
    fn test_mapping_lives_as_long_as_instances() {
        let mut ctx = TestContext::new();
        ctx.register(&TestFont::new(), "plain.ttf", 1);
        let first = ctx.manager.create_font(&FontSelectPattern::new(1, 12)).unwrap();
        let second = ctx.manager.create_font(&FontSelectPattern::new(1, 24)).unwrap();
        let info = Rc::clone(ctx.manager.font_info(1).unwrap());
        assert_eq!(info.face_ref_count(), 2);
        assert!(info.file().is_mapped());

        drop(first);
        assert!(info.file().is_mapped());
        drop(second);
        assert_eq!(info.face_ref_count(), 0);
        assert!(!info.file().is_mapped());
    }
}
