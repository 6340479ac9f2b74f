//! In-memory fakes shared by the unit tests.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use crate::file_mapping::{FileMapper, MappedBytes};

#[path = "../tests/common/font_builder.rs"]
#[allow(dead_code)]
pub mod font_builder;

#[derive(Default)]
struct State {
    files: RefCell<HashMap<PathBuf, Rc<Vec<u8>>>>,
    maps: Cell<u32>,
    unmaps: Rc<Cell<u32>>,
}

/// A file mapper backed by a map of paths to bytes that counts OS calls.
#[derive(Clone, Default)]
pub struct CountingMapper {
    state: Rc<State>,
}

struct TrackedBytes {
    data: Rc<Vec<u8>>,
    unmaps: Rc<Cell<u32>>,
}

impl AsRef<[u8]> for TrackedBytes {
    fn as_ref(&self) -> &[u8] {
        &self.data
    }
}

impl Drop for TrackedBytes {
    fn drop(&mut self) {
        self.unmaps.set(self.unmaps.get() + 1);
    }
}

impl CountingMapper {
    pub fn with_file(path: &str, bytes: Vec<u8>) -> Self {
        let mapper = Self::default();
        mapper.add_file(path, bytes);
        mapper
    }

    pub fn add_file(&self, path: &str, bytes: Vec<u8>) {
        self.state
            .files
            .borrow_mut()
            .insert(PathBuf::from(path), Rc::new(bytes));
    }

    pub fn map_calls(&self) -> u32 {
        self.state.maps.get()
    }

    pub fn unmap_calls(&self) -> u32 {
        self.state.unmaps.get()
    }
}

impl FileMapper for CountingMapper {
    fn map(&self, path: &Path) -> io::Result<MappedBytes> {
        self.state.maps.set(self.state.maps.get() + 1);
        let data = self
            .state
            .files
            .borrow()
            .get(path)
            .cloned()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no such fake file"))?;
        Ok(MappedBytes::new(TrackedBytes {
            data,
            unmaps: Rc::clone(&self.state.unmaps),
        }))
    }
}
