//! Object status flags.
//!
//! A fixed-width bit field describing an object's state in its owning
//! collection. Status is a plain value type: every operation returns a new
//! value and none of them can fail.
//!
//! Two selection bits exist because persistent selection survives deselection
//! sweeps, but for state comparison the distinction is noise: the filtered
//! predicates collapse both onto one canonical bit before comparing, while
//! direct inspection still sees them as distinct flags.

use bitflags::bitflags;

bitflags! {
    /// Status flags of a kernel object.
    #[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct ObjectStatus: u8 {
        const SELECTED            = 1 << 0;
        const SELECTED_PERSISTENT = 1 << 1;
        const HIGHLIGHTED         = 1 << 2;
        const HIDDEN              = 1 << 3;
        const LOCKED              = 1 << 4;
        const DAMAGED             = 1 << 5;
    }
}

impl ObjectStatus {
    /// The union of `self` and `other`.
    #[inline]
    #[must_use]
    pub fn with_states(self, other: ObjectStatus) -> ObjectStatus {
        self | other
    }

    /// True for either selection bit.
    #[inline]
    pub fn is_selected(self) -> bool {
        self.intersects(ObjectStatus::SELECTED | ObjectStatus::SELECTED_PERSISTENT)
    }

    #[inline]
    pub fn is_highlighted(self) -> bool {
        self.contains(ObjectStatus::HIGHLIGHTED)
    }

    #[inline]
    pub fn is_hidden(self) -> bool {
        self.contains(ObjectStatus::HIDDEN)
    }

    #[inline]
    pub fn is_locked(self) -> bool {
        self.contains(ObjectStatus::LOCKED)
    }

    #[inline]
    pub fn is_damaged(self) -> bool {
        self.contains(ObjectStatus::DAMAGED)
    }

    /// True if any bit selected by `filter` matches between `self` and
    /// `comparand`. False when the normalized filter is empty.
    pub fn has_some_equal_states(self, filter: ObjectStatus, comparand: ObjectStatus) -> bool {
        let filter = filter.normalized();
        !Self::equal_states(self, comparand, filter).is_empty()
    }

    /// True only if every bit selected by `filter` matches. False when the
    /// normalized filter is empty.
    pub fn has_all_equal_states(self, filter: ObjectStatus, comparand: ObjectStatus) -> bool {
        let filter = filter.normalized();
        !filter.is_empty() && Self::equal_states(self, comparand, filter) == filter
    }

    /// True only if no bit selected by `filter` matches. False when the
    /// normalized filter is empty.
    pub fn has_no_equal_states(self, filter: ObjectStatus, comparand: ObjectStatus) -> bool {
        let filter = filter.normalized();
        !filter.is_empty() && Self::equal_states(self, comparand, filter).is_empty()
    }

    // The filtered bits on which a and b agree, after normalization.
    fn equal_states(a: ObjectStatus, b: ObjectStatus, normalized_filter: ObjectStatus) -> ObjectStatus {
        !(a.normalized() ^ b.normalized()) & normalized_filter
    }

    // Collapse the two selection bits onto the canonical one.
    fn normalized(self) -> ObjectStatus {
        if self.contains(ObjectStatus::SELECTED_PERSISTENT) {
            (self - ObjectStatus::SELECTED_PERSISTENT) | ObjectStatus::SELECTED
        } else {
            self
        }
    }
}
