//! Component type registry
//!
//! Maps static Rust types to [`TypeTag`]s. Tags are derived from the
//! registered name, so the same name always yields the same tag across
//! runs and across worlds.

use super::error::{EcsError, EcsResult};
use serde::{Deserialize, Serialize};
use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;

/// Stable runtime identifier of a component kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TypeTag(u64);

impl TypeTag {
    const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

    /// Tag for a type name (64-bit FNV-1a)
    pub const fn from_name(name: &str) -> Self {
        let bytes = name.as_bytes();
        let mut hash = Self::FNV_OFFSET;
        let mut i = 0;
        while i < bytes.len() {
            hash ^= bytes[i] as u64;
            hash = hash.wrapping_mul(Self::FNV_PRIME);
            i += 1;
        }
        Self(hash)
    }

    /// Raw tag value
    pub const fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:016x}", self.0)
    }
}

#[derive(Debug, Clone)]
struct Registration {
    type_id: TypeId,
    name: &'static str,
}

/// Per-world mapping from Rust types to component tags
#[derive(Debug, Default)]
pub struct TypeRegistry {
    tags: HashMap<TypeId, TypeTag>,
    registrations: HashMap<TypeTag, Registration>,
}

impl TypeRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `T` under `name`
    ///
    /// Registering the same type under the same name again returns the
    /// existing tag. Binding a second name to `T`, or a name whose tag is
    /// already held by another type, is a [`EcsError::DuplicateRegistration`].
    pub fn register<T: 'static>(&mut self, name: &'static str) -> EcsResult<TypeTag> {
        let type_id = TypeId::of::<T>();
        let tag = TypeTag::from_name(name);

        if let Some(&existing) = self.tags.get(&type_id) {
            if existing == tag {
                return Ok(existing);
            }
            log::warn!("Type already registered as {existing}, refusing new name '{name}'");
            return Err(EcsError::DuplicateRegistration {
                tag: existing,
                name: name.to_string(),
            });
        }

        if let Some(other) = self.registrations.get(&tag) {
            log::warn!("Tag {tag} for '{name}' is already held by '{}'", other.name);
            return Err(EcsError::DuplicateRegistration {
                tag,
                name: name.to_string(),
            });
        }

        self.tags.insert(type_id, tag);
        self.registrations.insert(tag, Registration { type_id, name });
        log::debug!("Registered component type '{name}' as {tag}");
        Ok(tag)
    }

    /// Bind `T` as an additional payload type for an already registered tag
    ///
    /// Lets typed attach calls use a creation payload (e.g. a builder)
    /// instead of the component record itself. The tag keeps its name.
    pub fn register_alias<T: 'static>(&mut self, tag: TypeTag) -> EcsResult<()> {
        let Some(registration) = self.registrations.get(&tag) else {
            log::warn!("Cannot alias {} to unregistered tag {tag}", std::any::type_name::<T>());
            return Err(EcsError::invalid(format!("tag {tag} is not registered")));
        };
        let name = registration.name;

        match self.tags.get(&TypeId::of::<T>()) {
            Some(&existing) if existing == tag => Ok(()),
            Some(&existing) => {
                log::warn!("Type already registered as {existing}, refusing alias for '{name}'");
                Err(EcsError::DuplicateRegistration {
                    tag: existing,
                    name: name.to_string(),
                })
            }
            None => {
                self.tags.insert(TypeId::of::<T>(), tag);
                log::debug!("Aliased {} to '{name}'", std::any::type_name::<T>());
                Ok(())
            }
        }
    }

    /// Tag of a registered type
    pub fn tag_of<T: 'static>(&self) -> Option<TypeTag> {
        self.tags.get(&TypeId::of::<T>()).copied()
    }

    /// Name a tag was registered under
    pub fn name_of(&self, tag: TypeTag) -> Option<&'static str> {
        self.registrations.get(&tag).map(|registration| registration.name)
    }

    /// Check whether a tag belongs to `T`
    pub fn is<T: 'static>(&self, tag: TypeTag) -> bool {
        self.registrations
            .get(&tag)
            .is_some_and(|registration| registration.type_id == TypeId::of::<T>())
    }

    /// Number of registered component types (aliases not counted)
    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    /// True if nothing has been registered
    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }
}
