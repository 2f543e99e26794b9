//! Read-only material lookup used to validate meshes before they are published.

use hashbrown::HashMap;
use std::error::Error;
use std::fs;
use std::path::Path;

use isoterra_world::MaterialKey;
use serde::Deserialize;
use thiserror::Error;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Material {
    pub key: MaterialKey,
    pub name: String,
    pub render_tag: Option<String>,
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum MaterialError {
    #[error("no material registered for key {0:#010x}")]
    Unregistered(i32),
    #[error("material names {existing:?} and {new:?} hash to the same key")]
    KeyCollision { existing: String, new: String },
}

#[derive(Default, Clone, Debug)]
pub struct MaterialRegistry {
    by_key: HashMap<MaterialKey, Material>,
}

impl MaterialRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `name`; re-registering the same name is a no-op.
    pub fn register(
        &mut self,
        name: &str,
        render_tag: Option<String>,
    ) -> Result<MaterialKey, MaterialError> {
        let key = MaterialKey::from_name(name);
        if let Some(existing) = self.by_key.get(&key) {
            if existing.name != name {
                return Err(MaterialError::KeyCollision {
                    existing: existing.name.clone(),
                    new: name.to_string(),
                });
            }
            return Ok(key);
        }
        self.by_key.insert(
            key,
            Material {
                key,
                name: name.to_string(),
                render_tag,
            },
        );
        Ok(key)
    }

    pub fn from_names<'a, I: IntoIterator<Item = &'a str>>(names: I) -> Result<Self, MaterialError> {
        let mut reg = Self::new();
        for n in names {
            reg.register(n, None)?;
        }
        Ok(reg)
    }

    pub fn resolve(&self, material: i32) -> Result<&Material, MaterialError> {
        self.by_key
            .get(&MaterialKey(material))
            .ok_or(MaterialError::Unregistered(material))
    }

    #[inline]
    pub fn contains(&self, key: MaterialKey) -> bool {
        self.by_key.contains_key(&key)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }

    pub fn from_toml_str(toml_str: &str) -> Result<Self, Box<dyn Error>> {
        let cfg: MaterialsConfig = toml::from_str(toml_str)?;
        let mut entries: Vec<(String, MaterialEntry)> = cfg.materials.into_iter().collect();
        // HashMap iteration order is nondeterministic; sort so collision errors are reproducible.
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        let mut reg = Self::new();
        for (name, entry) in entries {
            let render_tag = match entry {
                MaterialEntry::Tag(t) => Some(t),
                MaterialEntry::Detail { render_tag } => render_tag,
            };
            reg.register(&name, render_tag)?;
        }
        log::debug!("material registry built with {} entries", reg.len());
        Ok(reg)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, Box<dyn Error>> {
        let s = fs::read_to_string(path)?;
        Self::from_toml_str(&s)
    }
}

// --- Config ---

#[derive(Deserialize)]
struct MaterialsConfig {
    materials: std::collections::HashMap<String, MaterialEntry>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum MaterialEntry {
    // Simple: grass = "terrain"
    Tag(String),
    // Detailed: grass = { render_tag = "terrain" }
    Detail {
        #[serde(default)]
        render_tag: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_registered_and_missing() {
        let reg = MaterialRegistry::from_names(["grass", "stone"]).unwrap();
        let grass = MaterialKey::from_name("grass");
        assert_eq!(reg.resolve(grass.0).unwrap().name, "grass");
        assert_eq!(reg.resolve(12345), Err(MaterialError::Unregistered(12345)));
        assert_eq!(reg.len(), 2);
    }

    #[test]
    fn register_twice_is_idempotent() {
        let mut reg = MaterialRegistry::new();
        let a = reg.register("dirt", None).unwrap();
        let b = reg.register("dirt", Some("x".into())).unwrap();
        assert_eq!(a, b);
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn parses_both_entry_forms() {
        let reg = MaterialRegistry::from_toml_str(
            r#"
            [materials]
            grass = "terrain"
            stone = { render_tag = "rock" }
            sand = {}
            "#,
        )
        .unwrap();
        let stone = reg.resolve(MaterialKey::from_name("stone").0).unwrap();
        assert_eq!(stone.render_tag.as_deref(), Some("rock"));
        let grass = reg.resolve(MaterialKey::from_name("grass").0).unwrap();
        assert_eq!(grass.render_tag.as_deref(), Some("terrain"));
        assert!(reg.contains(MaterialKey::from_name("sand")));
    }
}
