//! Bone topology - the fixed, ordered list of bone slots both sides index into
//!
//! The wire carries no bone names. A payload field belongs to bone `i` only
//! because sender and receiver bound the same skin in the same order.

use std::sync::Arc;

use crate::{SyncError, SyncResult};

/// Bone list of a rendered skinned mesh, in skin order
#[derive(Debug, Clone, Default)]
pub struct SkinDescriptor {
    /// Root transform of the skin, if the asset names one
    pub root_bone: Option<String>,
    /// Skin bone array
    pub bones: Vec<String>,
}

impl SkinDescriptor {
    pub fn new(root_bone: Option<&str>, bones: &[&str]) -> Self {
        Self {
            root_bone: root_bone.map(str::to_string),
            bones: bones.iter().map(|b| b.to_string()).collect(),
        }
    }
}

/// Ordered bone slots, immutable once bound
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoneTopology {
    bones: Arc<[String]>,
}

impl BoneTopology {
    /// Bind the topology of a skinned mesh.
    ///
    /// The skin's bone array is taken in order with the root transform
    /// removed. Both participants must bind the same asset.
    pub fn bind(skin: &SkinDescriptor) -> SyncResult<Self> {
        let bones: Vec<String> = match &skin.root_bone {
            Some(root) => {
                if !skin.bones.iter().any(|b| b == root) {
                    return Err(SyncError::RootNotFound(root.clone()));
                }
                skin.bones.iter().filter(|b| *b != root).cloned().collect()
            }
            None => skin.bones.clone(),
        };

        if bones.is_empty() {
            return Err(SyncError::EmptyTopology);
        }

        Ok(Self {
            bones: bones.into(),
        })
    }

    /// Topology from an explicit bone list (no root filtering)
    pub fn from_names<I, S>(names: I) -> SyncResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let bones: Vec<String> = names.into_iter().map(Into::into).collect();
        if bones.is_empty() {
            return Err(SyncError::EmptyTopology);
        }
        Ok(Self {
            bones: bones.into(),
        })
    }

    /// Anonymous topology of `count` bones, named `bone_<i>`
    pub fn with_count(count: usize) -> SyncResult<Self> {
        Self::from_names((0..count).map(|i| format!("bone_{}", i)))
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.bones.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bones.is_empty()
    }

    /// Number of numeric fields a valid payload carries for this topology
    #[inline]
    pub fn field_count(&self) -> usize {
        self.bones.len() * 3
    }

    pub fn name(&self, index: usize) -> Option<&str> {
        self.bones.get(index).map(String::as_str)
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.bones.iter().position(|b| b == name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &str)> {
        self.bones.iter().enumerate().map(|(i, b)| (i, b.as_str()))
    }

    /// Check that `index` addresses a slot
    pub fn check_index(&self, index: usize) -> SyncResult<()> {
        if index < self.bones.len() {
            Ok(())
        } else {
            Err(SyncError::BoneOutOfRange {
                index,
                len: self.bones.len(),
            })
        }
    }
}
