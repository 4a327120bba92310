//! Staff box geometry.
//!
//! A node with staff children renders them in an absolutely positioned box
//! to its right. The node's subtree reserves extra space below it so the
//! next sibling subtree does not run into that box.

use serde::{Deserialize, Serialize};

/// Height reserved per staff entry.
pub const UNIT_HEIGHT: u32 = 90;
/// Fixed extra space once any staff entry exists.
pub const PADDING: u32 = 40;
/// Lateral distance of the staff connector from the node box.
pub const STAFF_OFFSET: u32 = 140;

/// Lateral placement of the staff box relative to its principal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StaffBoxOffset {
    pub horizontal: u32,
}

/// Geometry constants, overridable via `[geometry]` in settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Geometry {
    pub unit_height: u32,
    pub padding: u32,
    pub staff_offset: u32,
}

impl Default for Geometry {
    fn default() -> Self {
        Self {
            unit_height: UNIT_HEIGHT,
            padding: PADDING,
            staff_offset: STAFF_OFFSET,
        }
    }
}

impl Geometry {
    /// Vertical reservation for `staff_count` staff entries; zero without staff.
    pub fn staff_reservation(&self, staff_count: usize) -> u32 {
        if staff_count == 0 {
            return 0;
        }
        let count = u32::try_from(staff_count).unwrap_or(u32::MAX);
        count
            .saturating_mul(self.unit_height)
            .saturating_add(self.padding)
    }

    /// Independent of the staff count.
    pub fn staff_box_offset(&self) -> StaffBoxOffset {
        StaffBoxOffset {
            horizontal: self.staff_offset,
        }
    }
}

pub fn staff_reservation(staff_count: usize) -> u32 {
    Geometry::default().staff_reservation(staff_count)
}

pub fn staff_box_offset() -> StaffBoxOffset {
    Geometry::default().staff_box_offset()
}
