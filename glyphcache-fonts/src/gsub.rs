//! Minimal GSUB reader for single substitutions.
//!
//! Walks ScriptList → LangSys → FeatureList → LookupList → single
//! substitution subtables and flattens them into a glyph → glyph map. Other
//! lookup types are skipped; full OpenType shaping belongs to the shaping
//! engine, not to this table.

use std::collections::HashMap;

use crate::sfnt::{Reader, Tag, tag};

/// Flat glyph substitution map built from GSUB.
pub type GlyphSubstitution = HashMap<u16, u16>;

/// Feature tag for vertical alternates.
pub const FEATURE_VERT: Tag = tag(b"vert");

const NO_REQUIRED_FEATURE: u16 = 0xFFFF;
const LOOKUP_SINGLE: u16 = 1;

/// What to extract from a GSUB table.
#[derive(Debug, Clone, Copy)]
pub struct GsubRequest<'a> {
    /// Feature tags to collect
    pub features: &'a [Tag],
    /// Script to match, or every script
    pub script: Option<Tag>,
    /// Language system to match, or the first one of each script
    pub language: Option<Tag>,
    /// Glyphs in the face; coverage beyond it is ignored
    pub glyph_count: u16,
}

impl<'a> GsubRequest<'a> {
    pub fn new(features: &'a [Tag]) -> Self {
        Self {
            features,
            script: None,
            language: None,
            glyph_count: u16::MAX,
        }
    }
}

/// Feature indices selected by the script list.
#[derive(Debug, Default)]
struct FeatureSelection {
    required: Vec<u16>,
    requested: Vec<u16>,
}

impl FeatureSelection {
    fn is_empty(&self) -> bool {
        self.required.is_empty() && self.requested.is_empty()
    }

    fn add_lang_sys(&mut self, lang_sys: Reader<'_>) -> Option<()> {
        let required = lang_sys.u16_at(2)?;
        if required != NO_REQUIRED_FEATURE {
            self.required.push(required);
        }
        let count = lang_sys.u16_at(4)? as usize;
        for i in 0..count {
            self.requested.push(lang_sys.u16_at(6 + 2 * i)?);
        }
        Some(())
    }
}

fn matches(filter: Option<Tag>, value: Tag) -> bool {
    filter.is_none_or(|wanted| wanted == value)
}

fn select_features(gsub: Reader<'_>, request: &GsubRequest<'_>) -> FeatureSelection {
    let mut selection = FeatureSelection::default();
    let Some(script_list) = gsub.u16_at(4).and_then(|ofs| gsub.sub(ofs as usize)) else {
        return selection;
    };
    let script_count = script_list.u16_at(0).unwrap_or(0) as usize;

    for i in 0..script_count {
        let record = 2 + 6 * i;
        let (Some(script_tag), Some(script_ofs)) =
            (script_list.u32_at(record), script_list.u16_at(record + 4))
        else {
            break;
        };
        if !matches(request.script, script_tag) {
            continue;
        }
        let Some(script) = script_list.sub(script_ofs as usize) else {
            continue;
        };
        let default_ofs = script.u16_at(0).unwrap_or(0);
        let lang_count = script.u16_at(2).unwrap_or(0) as usize;

        let lang_ofs = (0..lang_count)
            .filter_map(|j| {
                let rec = 4 + 6 * j;
                Some((script.u32_at(rec)?, script.u16_at(rec + 4)?))
            })
            .find(|&(lang_tag, _)| matches(request.language, lang_tag))
            .map_or(0, |(_, ofs)| ofs);

        if default_ofs != 0 && default_ofs != lang_ofs {
            if let Some(lang_sys) = script.sub(default_ofs as usize) {
                selection.add_lang_sys(lang_sys);
            }
        }
        if lang_ofs != 0 {
            if let Some(lang_sys) = script.sub(lang_ofs as usize) {
                selection.add_lang_sys(lang_sys);
            }
        }
    }
    selection
}

fn select_lookups(
    gsub: Reader<'_>,
    request: &GsubRequest<'_>,
    selection: &FeatureSelection,
) -> Vec<u16> {
    let mut lookups = Vec::new();
    let Some(feature_list) = gsub.u16_at(6).and_then(|ofs| gsub.sub(ofs as usize)) else {
        return lookups;
    };
    let feature_count = feature_list.u16_at(0).unwrap_or(0);

    for index in 0..feature_count {
        let record = 2 + 6 * index as usize;
        let (Some(feature_tag), Some(feature_ofs)) =
            (feature_list.u32_at(record), feature_list.u16_at(record + 4))
        else {
            break;
        };
        let wanted = selection.required.contains(&index)
            || (selection.requested.contains(&index) && request.features.contains(&feature_tag));
        if !wanted {
            continue;
        }
        let Some(feature) = feature_list.sub(feature_ofs as usize) else {
            continue;
        };
        // Feature table: featureParams, lookupIndexCount, lookupListIndices
        let lookup_count = feature.u16_at(2).unwrap_or(0) as usize;
        lookups.extend((0..lookup_count).filter_map(|i| feature.u16_at(4 + 2 * i)));
        if lookup_count == 0 {
            // Several CJK system fonts reference their vertical lookup this way.
            lookups.push(0);
        }
    }
    lookups
}

/// Glyphs listed by a coverage table, paired with their coverage index.
///
/// Only glyphs below `glyph_count` are kept, and at most `glyph_count`
/// entries are returned.
fn coverage_glyphs(coverage: Reader<'_>, glyph_count: u16) -> Vec<(u16, u16)> {
    let limit = usize::from(glyph_count);
    let mut glyphs = Vec::new();
    match coverage.u16_at(0) {
        Some(1) => {
            let count = coverage.u16_at(2).unwrap_or(0);
            for i in 0..count {
                if glyphs.len() >= limit {
                    break;
                }
                match coverage.u16_at(4 + 2 * i as usize) {
                    Some(glyph) if glyph < glyph_count => glyphs.push((glyph, i)),
                    Some(_) => {}
                    None => break,
                }
            }
        }
        Some(2) => {
            let count = coverage.u16_at(2).unwrap_or(0) as usize;
            for i in 0..count {
                let rec = 4 + 6 * i;
                let (Some(first), Some(last), Some(start_index)) = (
                    coverage.u16_at(rec),
                    coverage.u16_at(rec + 2),
                    coverage.u16_at(rec + 4),
                ) else {
                    break;
                };
                if last < first || last >= glyph_count {
                    continue;
                }
                let room = limit.saturating_sub(glyphs.len());
                glyphs.extend(
                    (first..=last)
                        .take(room)
                        .map(|glyph| (glyph, start_index.wrapping_add(glyph - first))),
                );
                if glyphs.len() >= limit {
                    break;
                }
            }
        }
        _ => {}
    }
    glyphs
}

fn apply_single_subtable(subtable: Reader<'_>, glyph_count: u16, out: &mut GlyphSubstitution) {
    let Some(coverage) = subtable
        .u16_at(2)
        .and_then(|ofs| subtable.sub(ofs as usize))
    else {
        return;
    };
    let covered = coverage_glyphs(coverage, glyph_count);
    match subtable.u16_at(0) {
        Some(1) => {
            let Some(delta) = subtable.u16_at(4) else {
                return;
            };
            for (glyph, _) in covered {
                out.insert(glyph, glyph.wrapping_add(delta));
            }
        }
        Some(2) => {
            let count = subtable.u16_at(4).unwrap_or(0);
            for (glyph, cov_index) in covered {
                if cov_index >= count {
                    continue;
                }
                if let Some(substitute) = subtable.u16_at(6 + 2 * cov_index as usize) {
                    out.insert(glyph, substitute);
                }
            }
        }
        _ => {}
    }
}

/// Build the single-substitution map selected by `request`.
///
/// Malformed or truncated structures contribute nothing; the result may be
/// partial but is never an error.
pub fn parse_single_substitutions(table: &[u8], request: &GsubRequest<'_>) -> GlyphSubstitution {
    let gsub = Reader::new(table);
    let mut out = GlyphSubstitution::new();

    let selection = select_features(gsub, request);
    if selection.is_empty() {
        return out;
    }
    let lookup_indices = select_lookups(gsub, request, &selection);

    let Some(lookup_list) = gsub.u16_at(8).and_then(|ofs| gsub.sub(ofs as usize)) else {
        return out;
    };
    let lookup_count = lookup_list.u16_at(0).unwrap_or(0);
    let selected = (0..lookup_count)
        .filter(|index| lookup_indices.contains(index))
        .filter_map(|index| lookup_list.u16_at(2 + 2 * index as usize));

    for lookup_ofs in selected {
        let Some(lookup) = lookup_list.sub(lookup_ofs as usize) else {
            continue;
        };
        if lookup.u16_at(0) != Some(LOOKUP_SINGLE) {
            continue;
        }
        let subtable_count = lookup.u16_at(4).unwrap_or(0) as usize;
        for i in 0..subtable_count {
            let Some(subtable) = lookup
                .u16_at(6 + 2 * i)
                .and_then(|ofs| lookup.sub(ofs as usize))
            else {
                break;
            };
            apply_single_subtable(subtable, request.glyph_count, &mut out);
        }
    }
    log::debug!("GSUB yielded {} single substitutions", out.len());
    out
}

/// Script tags listed in a GSUB ScriptList, in table order.
pub fn script_tags(table: &[u8]) -> Vec<Tag> {
    let gsub = Reader::new(table);
    let Some(script_list) = gsub.u16_at(4).and_then(|ofs| gsub.sub(ofs as usize)) else {
        return Vec::new();
    };
    let count = script_list.u16_at(0).unwrap_or(0) as usize;
    (0..count)
        .map_while(|i| script_list.u32_at(2 + 6 * i))
        .collect()
}
