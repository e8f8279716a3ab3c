use crate::storage::KeyValueStore;
use anyhow::{Result, bail};
use std::collections::HashMap;

#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    pub values: HashMap<String, String>,
    pub fail_writes: bool,
    pub writes: usize,
}

impl MemoryStore {
    pub fn failing() -> Self {
        Self {
            fail_writes: true,
            ..Self::default()
        }
    }

    pub fn with(mut self, key: &str, value: &str) -> Self {
        self.values.insert(key.to_string(), value.to_string());
        self
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        if self.fail_writes {
            bail!("storage quota exceeded");
        }

        self.writes += 1;
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
