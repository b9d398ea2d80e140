//! Assertion helpers for `TestRailway` integration tests.

use bevy::prelude::*;

use super::TestRailway;

impl TestRailway {
    // -----------------------------------------------------------------------
    // Assertions
    // -----------------------------------------------------------------------

    /// Assert the vehicle is attached to `block` at `t` (within `tolerance`).
    pub fn assert_attached_at(&self, entity: Entity, block: IVec3, t: f32, tolerance: f32) {
        let Some(attachment) = self.attachment(entity) else {
            panic!("Expected {entity:?} attached to {block}, but it is free");
        };
        assert_eq!(
            attachment.block, block,
            "Expected {entity:?} on block {block}, found {} (t={})",
            attachment.block, attachment.t
        );
        assert!(
            (attachment.t - t).abs() <= tolerance,
            "Expected {entity:?} at t={t} on {block}, got t={}",
            attachment.t
        );
    }

    pub fn assert_detached(&self, entity: Entity) {
        let attachment = self.attachment(entity);
        assert!(
            attachment.is_none(),
            "Expected {entity:?} to be free, found {attachment:?}"
        );
    }

    pub fn assert_position_near(&self, entity: Entity, expected: Vec3, tolerance: f32) {
        let actual = self.transform(entity).translation;
        assert!(
            (actual - expected).length() <= tolerance,
            "Expected {entity:?} near {expected}, got {actual}"
        );
    }

    /// Assert the vehicle's forward axis points along `direction`.
    pub fn assert_facing(&self, entity: Entity, direction: Vec3, tolerance: f32) {
        let forward = self.transform(entity).rotation * crate::config::VEHICLE_FORWARD;
        let direction = direction.normalize();
        assert!(
            (forward - direction).length() <= tolerance,
            "Expected {entity:?} facing {direction}, got {forward}"
        );
    }

    pub fn assert_block_count(&self, expected: usize) {
        let actual = self.grid().len();
        assert_eq!(actual, expected, "Expected {expected} blocks, found {actual}");
    }
}
