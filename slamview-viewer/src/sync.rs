//! Camera synchronization within scene groups
//!
//! Every viewer belongs to the group of its comparison row. A user-driven camera
//! change on one member is copied to the other members of that group. Copies are
//! applied through [`OrbitControls::set_pose`](crate::controls::OrbitControls::set_pose),
//! which reports a programmatic change and so never feeds back into another sync.

use crate::controls::ChangeOrigin;
use crate::framework::COLUMNS;
use crate::grid::Viewer;

/// Viewers sharing one comparison row, as indices into the grid's viewer list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SceneGroup {
    members: Vec<usize>,
}

impl SceneGroup {
    pub fn members(&self) -> &[usize] {
        &self.members
    }
}

#[derive(Debug, Clone, Default)]
pub struct CameraSync {
    groups: Vec<SceneGroup>,
}

impl CameraSync {
    pub fn new() -> Self {
        Self::default()
    }

    /// Group index for a container slot
    pub fn group_for_slot(slot: usize) -> usize {
        slot / COLUMNS
    }

    /// Add viewer `viewer` to the group of its slot
    pub fn register(&mut self, viewer: usize, slot: usize) {
        let group = Self::group_for_slot(slot);
        if self.groups.len() <= group {
            self.groups.resize_with(group + 1, SceneGroup::default);
        }
        self.groups[group].members.push(viewer);
    }

    pub fn groups(&self) -> &[SceneGroup] {
        &self.groups
    }

    pub fn group(&self, index: usize) -> Option<&SceneGroup> {
        self.groups.get(index)
    }

    /// React to a controls change on `source`.
    ///
    /// Only user-originated changes are propagated. Returns the viewers that were
    /// moved, never including `source`.
    pub fn on_change(&self, source: usize, origin: ChangeOrigin, viewers: &mut [Viewer]) -> Vec<usize> {
        match origin {
            ChangeOrigin::User => self.propagate(source, viewers),
            ChangeOrigin::Programmatic => Vec::new(),
        }
    }

    /// Copy the camera pose of `source` to the rest of its group
    pub fn propagate(&self, source: usize, viewers: &mut [Viewer]) -> Vec<usize> {
        let Some(viewer) = viewers.get(source) else {
            return Vec::new();
        };
        let pose = viewer.pose();
        let Some(group) = self.groups.get(viewer.scene_index) else {
            return Vec::new();
        };

        let mut synced = Vec::with_capacity(group.members.len().saturating_sub(1));
        for &member in &group.members {
            if member == source {
                continue;
            }
            if let Some(sibling) = viewers.get_mut(member) {
                sibling.apply_pose(&pose);
                synced.push(member);
            }
        }
        synced
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_by_row() {
        let mut sync = CameraSync::new();
        // Slot 5 missing: viewer indices shift after it
        let slots = [0, 1, 2, 3, 4, 6, 7, 8, 9, 10, 11];
        for (viewer, slot) in slots.into_iter().enumerate() {
            sync.register(viewer, slot);
        }

        assert_eq!(sync.groups().len(), 3);
        assert_eq!(sync.group(0).unwrap().members(), &[0, 1, 2, 3]);
        assert_eq!(sync.group(1).unwrap().members(), &[4, 5, 6]);
        assert_eq!(sync.group(2).unwrap().members(), &[7, 8, 9, 10]);
    }
}
