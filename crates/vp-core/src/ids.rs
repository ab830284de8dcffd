use core::fmt;
use core::num::NonZeroU32;

/// Handle for a table session, group marker or text label.
///
/// Stored as index + 1 so that `Option<Id>` stays four bytes.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Id(NonZeroU32);

impl Id {
    pub fn from_index(index: u32) -> Self {
        Self(NonZeroU32::MIN.saturating_add(index))
    }

    pub fn index(self) -> u32 {
        self.0.get() - 1
    }
}

impl fmt::Debug for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.index())
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.index())
    }
}

/// Hands out ids in creation order. Deleted ids are never handed out again.
#[derive(Debug, Default, Clone)]
pub struct IdAllocator {
    next: u32,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allocate(&mut self) -> Id {
        let id = Id::from_index(self.next);
        self.next += 1;
        id
    }
}

pub type TableHandle = Id;
pub type MarkerId = Id;
pub type LabelId = Id;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_survives_conversion() {
        for i in [0_u32, 1, 7, 65_535] {
            assert_eq!(Id::from_index(i).index(), i);
        }
    }

    #[test]
    fn allocator_counts_up_and_never_reuses() {
        let mut ids = IdAllocator::new();
        let a = ids.allocate();
        let b = ids.allocate();
        assert_ne!(a, b);
        assert_eq!((a.index(), b.index()), (0, 1));
        assert_eq!(format!("{a:?} {b}"), "#0 1");
    }
}
