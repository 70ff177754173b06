//! Room model.
//!
//! Rooms form a static catalog. A room holds at most one booking per
//! overlapping half of a slot.

use serde::{Deserialize, Serialize};

/// A teaching room.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Room {
    /// Unique room identifier.
    pub id: String,
    /// Seats. Must be positive; checked by [`crate::validation::validate_input`].
    pub capacity: i32,
}

impl Room {
    /// Creates a room.
    pub fn new(id: impl Into<String>, capacity: i32) -> Self {
        Self {
            id: id.into(),
            capacity,
        }
    }

    /// Whether the room seats `students`.
    #[inline]
    pub fn fits(&self, students: u32) -> bool {
        i64::from(self.capacity) >= i64::from(students)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_room_fits() {
        let r = Room::new("101", 95);
        assert!(r.fits(0));
        assert!(r.fits(95));
        assert!(!r.fits(96));
    }
}
