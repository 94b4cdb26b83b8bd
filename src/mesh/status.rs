//! Per-element status bits.

/// Status flags attached to every vertex, edge and face.
///
/// A deleted element stays in its arena (so in-flight handles keep pointing at
/// the same slot) until [`garbage_collect`](super::HalfEdgeMesh::garbage_collect)
/// compacts storage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Status(u8);

impl Status {
    const DELETED: u8 = 1;

    /// A status with no bits set.
    #[inline]
    pub const fn live() -> Self {
        Self(0)
    }

    /// Whether the element has been tombstoned.
    #[inline]
    pub fn is_deleted(self) -> bool {
        self.0 & Self::DELETED != 0
    }

    /// Set or clear the deleted bit.
    #[inline]
    pub fn set_deleted(&mut self, deleted: bool) {
        if deleted {
            self.0 |= Self::DELETED;
        } else {
            self.0 &= !Self::DELETED;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deleted_bit() {
        let mut s = Status::live();
        assert!(!s.is_deleted());
        s.set_deleted(true);
        assert!(s.is_deleted());
        s.set_deleted(false);
        assert_eq!(s, Status::default());
    }
}
