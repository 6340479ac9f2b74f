//! Shared read-only mappings of font files.
//!
//! One [`FontFile`] exists per distinct path. Every face registered from that
//! path (e.g. all members of a collection) shares it, and the bytes are mapped
//! only while at least one user holds a `map()` reference.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::fmt;
use std::fs::File;
use std::io;
use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use memmap2::Mmap;

/// Bytes of a mapped font file. Dropping the value releases the mapping.
pub struct MappedBytes(Box<dyn AsRef<[u8]>>);

impl MappedBytes {
    pub fn new(bytes: impl AsRef<[u8]> + 'static) -> Self {
        Self(Box::new(bytes))
    }
}

impl Deref for MappedBytes {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        (*self.0).as_ref()
    }
}

impl fmt::Debug for MappedBytes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MappedBytes").field("len", &self.len()).finish()
    }
}

/// The OS primitive that turns a path into readable bytes.
pub trait FileMapper {
    fn map(&self, path: &Path) -> io::Result<MappedBytes>;
}

/// Maps files read-only with `mmap`.
#[derive(Debug, Default, Clone, Copy)]
pub struct MmapFileMapper;

impl FileMapper for MmapFileMapper {
    fn map(&self, path: &Path) -> io::Result<MappedBytes> {
        let file = File::open(path)?;
        // SAFETY: the mapping is read-only and font files are not expected to
        // be modified while in use; a concurrent truncation is the same hazard
        // every mmap-based font loader accepts.
        let mmap = unsafe { Mmap::map(&file)? };
        Ok(MappedBytes::new(mmap))
    }
}

/// One on-disk font file with a reference-counted mapping.
pub struct FontFile {
    path: PathBuf,
    lang_boost: i32,
    mapper: Rc<dyn FileMapper>,
    refs: Cell<u32>,
    mapping: RefCell<Option<Rc<MappedBytes>>>,
}

impl fmt::Debug for FontFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FontFile")
            .field("path", &self.path)
            .field("lang_boost", &self.lang_boost)
            .field("refs", &self.refs.get())
            .field("mapped", &self.is_mapped())
            .finish()
    }
}

impl FontFile {
    fn new(path: PathBuf, lang_boost: i32, mapper: Rc<dyn FileMapper>) -> Self {
        Self {
            path,
            lang_boost,
            mapper,
            refs: Cell::new(0),
            mapping: RefCell::new(None),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Quality bonus derived from the file name's locale suffix.
    pub fn lang_boost(&self) -> i32 {
        self.lang_boost
    }

    pub fn ref_count(&self) -> u32 {
        self.refs.get()
    }

    pub fn is_mapped(&self) -> bool {
        self.mapping.borrow().is_some()
    }

    /// Acquire a mapping reference.
    ///
    /// The count is incremented even when mapping fails, so every call must
    /// be paired with [`unmap`](Self::unmap) regardless of the result.
    pub fn map(&self) -> bool {
        let refs = self.refs.get() + 1;
        self.refs.set(refs);
        if refs == 1 {
            match self.mapper.map(&self.path) {
                Ok(bytes) => {
                    log::debug!("Mapped {:?} ({} bytes)", self.path, bytes.len());
                    *self.mapping.borrow_mut() = Some(Rc::new(bytes));
                }
                Err(e) => {
                    log::warn!("Failed to map font file {:?}: {}", self.path, e);
                    return false;
                }
            }
        }
        self.is_mapped()
    }

    /// Release a mapping reference, unmapping when the last one goes away.
    pub fn unmap(&self) {
        let refs = self.refs.get();
        if refs == 0 {
            log::warn!("Unbalanced unmap of {:?}", self.path);
            return;
        }
        self.refs.set(refs - 1);
        if refs == 1 && self.mapping.borrow_mut().take().is_some() {
            log::debug!("Unmapped {:?}", self.path);
        }
    }

    /// The mapped bytes, if currently mapped.
    pub fn buffer(&self) -> Option<Rc<MappedBytes>> {
        self.mapping.borrow().clone()
    }

    /// Size of the mapped file, or 0 when unmapped.
    pub fn file_size(&self) -> usize {
        self.mapping.borrow().as_ref().map_or(0, |bytes| bytes.len())
    }
}

/// Language boost token for a UI language tag.
///
/// Font files named `<name>_<token>.<ext>` are preferred when the token
/// matches the user's language.
pub fn lang_boost_token(ui_language: &str) -> Option<&'static str> {
    let lang = ui_language.to_ascii_lowercase().replace('_', "-");
    let primary = lang.split('-').next().unwrap_or_default();
    match primary {
        "ja" => Some("jan"),
        "ko" => Some("kor"),
        "zh" => {
            let traditional = lang
                .split('-')
                .skip(1)
                .any(|sub| matches!(sub, "tw" | "hk" | "mo" | "hant"));
            Some(if traditional { "zht" } else { "zhs" })
        }
        _ => None,
    }
}

/// Quality bonus for a font file path.
///
/// The text after the last `_` of the whole path is the locale suffix.
/// Paths without one get a small bonus; paths whose suffix matches `token`
/// get a larger one.
pub fn lang_boost(path: &Path, token: Option<&str>) -> i32 {
    let name = path.to_string_lossy();
    let Some(pos) = name.rfind('_') else {
        return 0x1000;
    };
    let suffix = &name[pos + 1..];
    if suffix.starts_with('.') {
        return 0x1000;
    }
    let matches = token.is_some_and(|token| {
        suffix
            .get(..token.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(token))
    });
    if matches { 0x2000 } else { 0 }
}

/// Deduplicating registry of font files, keyed by normalized path.
pub struct FontFileRegistry {
    mapper: Rc<dyn FileMapper>,
    boost_token: Option<&'static str>,
    files: HashMap<PathBuf, Rc<FontFile>>,
}

impl FontFileRegistry {
    pub fn new(mapper: Rc<dyn FileMapper>, ui_language: Option<&str>) -> Self {
        Self {
            mapper,
            boost_token: ui_language.and_then(lang_boost_token),
            files: HashMap::new(),
        }
    }

    /// The shared file for `path`, created on first request.
    pub fn find_or_create(&mut self, path: &Path) -> Rc<FontFile> {
        let key: PathBuf = path.components().collect();
        let mapper = &self.mapper;
        let token = self.boost_token;
        self.files
            .entry(key)
            .or_insert_with_key(|key| {
                let boost = lang_boost(key, token);
                Rc::new(FontFile::new(key.clone(), boost, Rc::clone(mapper)))
            })
            .clone()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn clear(&mut self) {
        self.files.clear();
    }
}
