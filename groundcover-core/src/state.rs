use std::fmt;

use bitfield::{bitfield_bitrange, bitfield_fields, Bit};

/// The named flags that make up the state of a single point
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum PointFlag {
    Selected,
    Deleted,
    /// Cleared for points that a simplification removed
    Visible,
    Snow,
    Vegetation,
    Road,
}

impl PointFlag {
    /// All flags, in storage order
    pub const ALL: [PointFlag; 6] = [
        PointFlag::Selected,
        PointFlag::Deleted,
        PointFlag::Visible,
        PointFlag::Snow,
        PointFlag::Vegetation,
        PointFlag::Road,
    ];

    /// The ground-cover category flags
    pub const CATEGORIES: [PointFlag; 3] = [PointFlag::Snow, PointFlag::Vegetation, PointFlag::Road];

    fn index(self) -> usize {
        match self {
            PointFlag::Selected => 0,
            PointFlag::Deleted => 1,
            PointFlag::Visible => 2,
            PointFlag::Snow => 3,
            PointFlag::Vegetation => 4,
            PointFlag::Road => 5,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            PointFlag::Selected => "selected",
            PointFlag::Deleted => "deleted",
            PointFlag::Visible => "visible",
            PointFlag::Snow => "snow",
            PointFlag::Vegetation => "vegetation",
            PointFlag::Road => "road",
        }
    }
}

impl fmt::Display for PointFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Packed state flags of a single point. Every flag has its own accessor pair, and [`PointState::is`] /
/// [`PointState::set`] give access through a [`PointFlag`]. A default state is visible and has no other flag set.
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct PointState(u8);
bitfield_bitrange! {struct PointState(u8)}

impl PointState {
    bitfield_fields! {
        u8;
        pub selected, set_selected: 0;
        pub deleted, set_deleted: 1;
        pub visible, set_visible: 2;
        pub snow, set_snow: 3;
        pub vegetation, set_vegetation: 4;
        pub road, set_road: 5;
    }

    /// A state with no flag set at all, not even `Visible`
    pub const fn empty() -> Self {
        Self(0)
    }

    pub fn is(&self, flag: PointFlag) -> bool {
        self.bit(flag.index())
    }

    pub fn set(&mut self, flag: PointFlag, value: bool) {
        self.set_bit(flag.index(), value);
    }

    pub fn insert(&mut self, flag: PointFlag) {
        self.set(flag, true);
    }

    pub fn remove(&mut self, flag: PointFlag) {
        self.set(flag, false);
    }

    /// Returns `true` if at least one ground-cover category flag is set
    pub fn is_classified(&self) -> bool {
        PointFlag::CATEGORIES.iter().any(|flag| self.is(*flag))
    }

    /// Iterates over all flags that are set
    pub fn flags(&self) -> impl Iterator<Item = PointFlag> + '_ {
        PointFlag::ALL.iter().copied().filter(move |flag| self.is(*flag))
    }
}

impl Default for PointState {
    fn default() -> Self {
        let mut state = Self::empty();
        state.set_visible(true);
        state
    }
}

impl fmt::Debug for PointState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.flags()).finish()
    }
}
