//! Fixed membership tables over cell kinds.

use bitflags::bitflags;

use super::CellKind;

bitflags! {
    /// A set of cell kinds, one bit per [`CellKind`] z-level.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
    #[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
    pub struct KindSet: u16 {
        const PERIMETER_WALL = 1 << 0;
        const EXIT = 1 << 1;
        const EMPTY = 1 << 2;
        const DOOR = 1 << 3;
        const WALL = 1 << 4;
        const DANGER = 1 << 5;
        const BONUS = 1 << 6;
        const ROBOT = 1 << 7;
        const GRENADE = 1 << 8;
        const ANIMATION_MARKER = 1 << 9;
    }
}

impl KindSet {
    #[inline]
    pub const fn of(kind: CellKind) -> Self {
        Self::from_bits_truncate(1 << kind.z())
    }

    #[inline]
    pub fn has(self, kind: CellKind) -> bool {
        self.contains(Self::of(kind))
    }

    /// Kinds in z-order.
    pub fn kinds(self) -> impl Iterator<Item = CellKind> {
        CellKind::ALL.into_iter().filter(move |kind| self.has(*kind))
    }
}

impl From<CellKind> for KindSet {
    fn from(kind: CellKind) -> Self {
        KindSet::of(kind)
    }
}

impl From<Family> for KindSet {
    fn from(family: Family) -> Self {
        family.members()
    }
}

/// Named families shared by the validator and the decision engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumIter)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[strum(serialize_all = "snake_case")]
pub enum Family {
    /// A robot may step on it: {Empty, Door, Exit, Bonus, Danger}.
    PassableForMove,
    /// Passable without side effects: {Empty, Door, Exit, Bonus}.
    Free,
    /// May lie on a target path: {Empty, Door, Exit, Bonus, Wall}.
    PathTargetable,
    /// Never a target: {PerimeterWall}.
    NeverTargeted,
    /// Cannot be deleted: {Empty, PerimeterWall, Exit, Robot}.
    Undeletable,
    /// Legal grenade landing: {Robot, Empty, Door, Wall, Danger, Bonus}.
    GrenadeLanding,
    /// A mine may be planted on it: {Empty, Door}.
    MinePlantable,
    /// At most one of these per coordinate: {PerimeterWall, Wall, Empty, Door, Exit}.
    Linked,
}

impl Family {
    pub const fn members(self) -> KindSet {
        match self {
            Family::PassableForMove => KindSet::EMPTY
                .union(KindSet::DOOR)
                .union(KindSet::EXIT)
                .union(KindSet::BONUS)
                .union(KindSet::DANGER),
            Family::Free => KindSet::EMPTY
                .union(KindSet::DOOR)
                .union(KindSet::EXIT)
                .union(KindSet::BONUS),
            Family::PathTargetable => KindSet::EMPTY
                .union(KindSet::DOOR)
                .union(KindSet::EXIT)
                .union(KindSet::BONUS)
                .union(KindSet::WALL),
            Family::NeverTargeted => KindSet::PERIMETER_WALL,
            Family::Undeletable => KindSet::EMPTY
                .union(KindSet::PERIMETER_WALL)
                .union(KindSet::EXIT)
                .union(KindSet::ROBOT),
            Family::GrenadeLanding => KindSet::ROBOT
                .union(KindSet::EMPTY)
                .union(KindSet::DOOR)
                .union(KindSet::WALL)
                .union(KindSet::DANGER)
                .union(KindSet::BONUS),
            Family::MinePlantable => KindSet::EMPTY.union(KindSet::DOOR),
            Family::Linked => KindSet::PERIMETER_WALL
                .union(KindSet::WALL)
                .union(KindSet::EMPTY)
                .union(KindSet::DOOR)
                .union(KindSet::EXIT),
        }
    }

    #[inline]
    pub fn contains(self, kind: CellKind) -> bool {
        self.members().has(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_family_tables() {
        assert!(Family::PassableForMove.contains(CellKind::Danger));
        assert!(!Family::Free.contains(CellKind::Danger));
        assert!(Family::PathTargetable.contains(CellKind::Wall));
        assert!(!Family::PathTargetable.contains(CellKind::PerimeterWall));
        assert!(Family::Undeletable.contains(CellKind::Robot));
        assert!(Family::GrenadeLanding.contains(CellKind::Robot));
        assert!(!Family::GrenadeLanding.contains(CellKind::Exit));
        assert!(Family::MinePlantable.contains(CellKind::Door));
        assert!(!Family::MinePlantable.contains(CellKind::Bonus));
    }

    #[test]
    fn test_kind_set_iterates_in_z_order() {
        let kinds: Vec<_> = Family::Linked.members().kinds().collect();
        assert_eq!(
            kinds,
            vec![
                CellKind::PerimeterWall,
                CellKind::Exit,
                CellKind::Empty,
                CellKind::Door,
                CellKind::Wall
            ]
        );
    }
}
