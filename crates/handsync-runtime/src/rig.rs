//! Skeleton rig - the local bone transforms a pose is applied to

use handsync_core::{BoneTopology, EulerAngles, Quat, SyncError, SyncResult};

/// Mutable bone slots plus the hand's visibility
pub trait SkeletonRig {
    fn bone_count(&self) -> usize;

    /// Set a bone's local rotation from a quaternion
    fn set_local_rotation(&mut self, bone: usize, rotation: Quat) -> SyncResult<()>;

    /// Set a bone's local rotation from Euler angles
    fn set_local_euler(&mut self, bone: usize, euler: EulerAngles) -> SyncResult<()>;

    /// A bone's local rotation as Euler angles
    fn local_euler(&self, bone: usize) -> SyncResult<EulerAngles>;

    fn set_visible(&mut self, visible: bool);

    fn is_visible(&self) -> bool;

    /// Put the rig's root back at the origin, unrotated, unit scale
    fn reset_root(&mut self) {}
}

/// One bone's local rotation, kept in both forms
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BoneTransform {
    pub rotation: Quat,
    pub euler: EulerAngles,
}

/// Transform of the rig's root object
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RootTransform {
    pub position: [f32; 3],
    pub rotation: Quat,
    pub scale: [f32; 3],
}

impl Default for RootTransform {
    fn default() -> Self {
        Self {
            position: [0.0; 3],
            rotation: Quat::identity(),
            scale: [1.0; 3],
        }
    }
}

/// In-memory rig
#[derive(Debug, Clone)]
pub struct BoneRig {
    topology: BoneTopology,
    bones: Vec<BoneTransform>,
    root: RootTransform,
    visible: bool,
}

impl BoneRig {
    /// Rig with every bone at identity, hidden
    pub fn new(topology: &BoneTopology) -> Self {
        Self {
            topology: topology.clone(),
            bones: vec![BoneTransform::default(); topology.len()],
            root: RootTransform::default(),
            visible: false,
        }
    }

    pub fn topology(&self) -> &BoneTopology {
        &self.topology
    }

    pub fn bone(&self, bone: usize) -> Option<&BoneTransform> {
        self.bones.get(bone)
    }

    pub fn bone_by_name(&self, name: &str) -> Option<&BoneTransform> {
        self.topology.index_of(name).and_then(|i| self.bones.get(i))
    }

    /// Euler angles of every bone, topology order
    pub fn pose(&self) -> Vec<EulerAngles> {
        self.bones.iter().map(|b| b.euler).collect()
    }

    pub fn root(&self) -> &RootTransform {
        &self.root
    }

    pub fn root_mut(&mut self) -> &mut RootTransform {
        &mut self.root
    }

    fn slot(&mut self, bone: usize) -> SyncResult<&mut BoneTransform> {
        let len = self.bones.len();
        self.bones
            .get_mut(bone)
            .ok_or(SyncError::BoneOutOfRange { index: bone, len })
    }
}

impl SkeletonRig for BoneRig {
    fn bone_count(&self) -> usize {
        self.bones.len()
    }

    fn set_local_rotation(&mut self, bone: usize, rotation: Quat) -> SyncResult<()> {
        let slot = self.slot(bone)?;
        slot.rotation = rotation.normalize();
        slot.euler = slot.rotation.to_euler();
        Ok(())
    }

    fn set_local_euler(&mut self, bone: usize, euler: EulerAngles) -> SyncResult<()> {
        let slot = self.slot(bone)?;
        slot.euler = euler;
        slot.rotation = Quat::from_euler(euler);
        Ok(())
    }

    fn local_euler(&self, bone: usize) -> SyncResult<EulerAngles> {
        self.bones
            .get(bone)
            .map(|b| b.euler)
            .ok_or(SyncError::BoneOutOfRange {
                index: bone,
                len: self.bones.len(),
            })
    }

    fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    fn is_visible(&self) -> bool {
        self.visible
    }

    fn reset_root(&mut self) {
        self.root = RootTransform::default();
    }
}
