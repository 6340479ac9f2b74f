//! Face discovery through `fontdb`.

use std::path::{Path, PathBuf};

use fontdb::{Database, FaceInfo, Source};
use rustybuzz::ttf_parser::{PlatformId, cmap};
use swash::{FontRef, StringId};

use super::FontManager;
use crate::attributes::{DevFontAttributes, Pitch, Slant, Weight};
use crate::error::{FontError, Result};
use crate::font_info::TAG_CMAP;
use crate::pattern::FontId;
use crate::sfnt::find_table;

/// What a scan learns from the face bytes themselves.
struct FaceExtras {
    style_name: Option<String>,
    symbol: bool,
}

fn has_symbol_cmap(data: &[u8], index: u32) -> bool {
    let Some(range) = find_table(data, index, TAG_CMAP) else {
        return false;
    };
    let Some(table) = data.get(range).and_then(cmap::Table::parse) else {
        return false;
    };
    table
        .subtables
        .into_iter()
        .any(|s| s.platform_id == PlatformId::Windows && s.encoding_id == 0)
}

fn read_face_extras(data: &[u8], index: u32) -> FaceExtras {
    let style_name = FontRef::from_index(data, index as usize).and_then(|font| {
        font.localized_strings()
            .find_by_id(StringId::SubFamily, None)
            .map(|name| name.chars().collect::<String>())
    });
    FaceExtras {
        style_name,
        symbol: has_symbol_cmap(data, index),
    }
}

fn face_path(face: &FaceInfo) -> Option<&Path> {
    match &face.source {
        Source::File(path) | Source::SharedFile(path, _) => Some(path),
        Source::Binary(_) => None,
    }
}

fn face_attributes(face: &FaceInfo, extras: FaceExtras) -> DevFontAttributes {
    let family_name = face
        .families
        .first()
        .map(|(name, _)| name.clone())
        .unwrap_or_else(|| face.post_script_name.clone());
    DevFontAttributes {
        family_name,
        style_name: extras.style_name.unwrap_or_default(),
        weight: Weight(face.weight.0),
        slant: match face.style {
            fontdb::Style::Normal => Slant::Upright,
            fontdb::Style::Italic => Slant::Italic,
            fontdb::Style::Oblique => Slant::Oblique,
        },
        pitch: if face.monospaced {
            Pitch::Fixed
        } else {
            Pitch::Variable
        },
        symbol: extras.symbol,
        ..DevFontAttributes::default()
    }
}

impl FontManager {
    /// Register every face found under `dir`, recursively.
    ///
    /// Returns the number of newly registered faces.
    pub fn add_fonts_from_dir(&mut self, dir: &Path) -> Result<usize> {
        if !dir.is_dir() {
            return Err(FontError::DirectoryNotFound(dir.to_path_buf()));
        }
        let mut db = Database::new();
        db.load_fonts_dir(dir);
        let added = self.add_database(&db).len();
        log::info!(
            "Scanned {:?}: {} faces, {} new",
            dir,
            db.len(),
            added
        );
        Ok(added)
    }

    /// Register the platform's installed fonts.
    pub fn add_system_fonts(&mut self) -> usize {
        let mut db = Database::new();
        db.load_system_fonts();
        log::info!("Loaded {} system fonts", db.len());
        self.add_database(&db).len()
    }

    /// Register every face of one font file.
    ///
    /// Returns the ids of the newly registered faces in face order.
    pub fn add_font_path(&mut self, path: &Path) -> Result<Vec<FontId>> {
        let mut db = Database::new();
        db.load_font_file(path).map_err(|source| FontError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        if db.len() == 0 {
            return Err(FontError::InvalidFont {
                path: path.to_path_buf(),
                index: 0,
            });
        }
        Ok(self.add_database(&db))
    }

    fn add_database(&mut self, db: &Database) -> Vec<FontId> {
        let mut added = Vec::new();
        for face in db.faces() {
            let Some(path) = face_path(face) else {
                continue;
            };
            let key: (PathBuf, u32) = (path.components().collect(), face.index);
            if self.scanned_faces.contains(&key) {
                continue;
            }
            let Some(extras) = db.with_face_data(face.id, |data, index| read_face_extras(data, index))
            else {
                log::warn!("Could not read {:?} face {}", path, face.index);
                continue;
            };
            let attributes = face_attributes(face, extras);
            let font_id = self.max_font_id + 1;
            if self.add_font_file(path, face.index, font_id, attributes) {
                self.scanned_faces.insert(key);
                added.push(font_id);
            }
        }
        added
    }
}
