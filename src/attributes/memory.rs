use super::{AttributeChannel, AttributeError, SetMode};
use nix::errno::Errno;
use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::path::Path;

/* Attribute store for tests. Reads of an attribute first drain its script
 * (one entry per read), then fall back to the stored value. */
#[derive(Default)]
pub struct MemoryAttributes {
    values: RefCell<HashMap<String, Vec<u8>>>,
    scripts: RefCell<HashMap<String, VecDeque<Result<Vec<u8>, Errno>>>>,
    writes: RefCell<Vec<(String, Vec<u8>)>>,
    reads: RefCell<usize>,
}

impl MemoryAttributes {
    pub fn with(self, name: &str, value: &[u8]) -> Self {
        self.values
            .borrow_mut()
            .insert(name.to_string(), value.to_vec());
        self
    }

    pub fn script(
        self,
        name: &str,
        reads: impl IntoIterator<Item = Result<&'static [u8], Errno>>,
    ) -> Self {
        self.scripts.borrow_mut().insert(
            name.to_string(),
            reads.into_iter().map(|r| r.map(<[u8]>::to_vec)).collect(),
        );
        self
    }

    pub fn value(&self, name: &str) -> Option<Vec<u8>> {
        self.values.borrow().get(name).cloned()
    }

    pub fn writes(&self) -> Vec<(String, Vec<u8>)> {
        self.writes.borrow().clone()
    }

    pub fn reads(&self) -> usize {
        *self.reads.borrow()
    }
}

impl AttributeChannel for MemoryAttributes {
    fn get(&self, path: &Path, name: &str) -> Result<Vec<u8>, AttributeError> {
        *self.reads.borrow_mut() += 1;
        if let Some(next) = self
            .scripts
            .borrow_mut()
            .get_mut(name)
            .and_then(VecDeque::pop_front)
        {
            return next.map_err(|errno| AttributeError::new(path, name, errno));
        }
        self.value(name)
            .ok_or_else(|| AttributeError::new(path, name, Errno::ENODATA))
    }

    fn set(
        &self,
        path: &Path,
        name: &str,
        value: &[u8],
        mode: SetMode,
    ) -> Result<(), AttributeError> {
        let mut values = self.values.borrow_mut();
        if mode == SetMode::ReplaceOnly && !values.contains_key(name) {
            return Err(AttributeError::new(path, name, Errno::ENODATA));
        }
        values.insert(name.to_string(), value.to_vec());
        self.writes
            .borrow_mut()
            .push((name.to_string(), value.to_vec()));
        Ok(())
    }
}
