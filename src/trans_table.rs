use std::cmp::{max, min};

use quick_cache::unsync::Cache;
use static_assertions::assert_eq_size;

use crate::{Entries, Position, Seat, Turn};

#[derive(Clone, Copy, PartialEq, Eq)]
pub struct AB {
    /// guaranteed to make >= `a`
    pub a: u8,
    /// impossible to make > `b`
    pub b: u8,
}
impl AB {
    pub(crate) fn intersect(self, other: AB) -> AB {
        debug_assert!(self.a <= self.b);
        debug_assert!(other.a <= other.b);
        let result = AB {
            a: max(self.a, other.a),
            b: min(self.b, other.b),
        };
        debug_assert!(
            result.a <= result.b,
            "{self:?} intersect {other:?} = {result:?}"
        );
        result
    }

    pub(crate) fn intersects(self, other: AB) -> bool {
        max(self.a, other.a) <= min(self.b, other.b)
    }

    #[must_use]
    pub fn contains(&self, x: u8) -> bool {
        x >= self.a && x <= self.b
    }

    #[must_use]
    pub fn is_exact(&self) -> bool {
        self.a == self.b
    }

    pub(crate) fn shift(self, tricks: u8) -> AB {
        AB {
            a: self.a + tricks,
            b: self.b + tricks,
        }
    }
}

impl std::fmt::Debug for AB {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.a, self.b)
    }
}

/// Bounds on the tricks north-south still take from a position at a trick
/// boundary, independent of tricks already won.
pub trait TransTable {
    fn get(&self, position: &Position) -> Option<AB>;
    fn update(&mut self, position: &Position, ab: AB);
}

pub struct Empty {}
impl TransTable for Empty {
    fn get(&self, _position: &Position) -> Option<AB> {
        None
    }

    fn update(&mut self, _position: &Position, _ab: AB) {}
}

/// Everything the rest of the play depends on. Tricks already won and the
/// order of earlier plays are left out.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
struct Key {
    hands: [u16; 4],
    entries: Entries,
    turn: Turn,
    /// the seat that may take the lead back without spending an entry
    free_leader: Option<Seat>,
}

assert_eq_size!([u8; 14], Key);

impl From<&Position> for Key {
    fn from(position: &Position) -> Self {
        debug_assert!(position.at_trick_boundary());
        let free_leader = match position.turn() {
            Turn::ChooseLeader => position.last_trick_leader().filter(|s| s.is_declarer()),
            Turn::Seat(_) => None,
        };
        Key {
            hands: position.hands().map(|h| h.bits()),
            entries: position.entries(),
            turn: position.turn(),
            free_leader,
        }
    }
}

impl std::fmt::Debug for Key {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:?}{:?} {:04x} {:04x} {:04x} {:04x} [{:?}]",
            self.turn,
            self.free_leader,
            self.hands[0],
            self.hands[1],
            self.hands[2],
            self.hands[3],
            self.entries
        )
    }
}

/// Single-threaded table owned by one search. Bounded: once full, cold entries
/// are evicted and simply searched again.
pub struct UnsyncTable {
    cache: Cache<Key, AB>,
}

impl UnsyncTable {
    #[must_use]
    pub fn new(size: usize) -> Self {
        Self {
            cache: Cache::new(size.max(1)),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}

impl TransTable for UnsyncTable {
    fn get(&self, position: &Position) -> Option<AB> {
        self.cache.get(&Key::from(position)).copied()
    }

    fn update(&mut self, position: &Position, ab: AB) {
        debug_assert!(ab.a <= ab.b);
        let key = Key::from(position);
        let ab = match self.cache.get(&key) {
            Some(prev) => {
                debug_assert!(
                    prev.intersects(ab),
                    "inconsistent entries for {key:?}: {prev:?} vs {ab:?}"
                );
                prev.intersect(ab)
            }
            None => ab,
        };
        self.cache.insert(key, ab);
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        Entries, Layout, Move, Play, Position, Rank, Seat,
        trans_table::{AB, TransTable, UnsyncTable},
    };

    #[test]
    fn intersect() {
        let ab = AB { a: 1, b: 4 }.intersect(AB { a: 2, b: 5 });
        assert_eq!(AB { a: 2, b: 4 }, ab);
        assert!(ab.contains(3));
        assert!(!ab.contains(5));
        assert!(!ab.is_exact());
        assert!(!AB { a: 0, b: 1 }.intersects(AB { a: 2, b: 2 }));
        assert_eq!(AB { a: 3, b: 5 }, AB { a: 1, b: 3 }.shift(2));
    }

    #[test]
    fn update_narrows() {
        let layout = Layout::try_from_pbn("AQ K 32 -").unwrap();
        let position = Position::new(&layout, Entries::UNLIMITED, Seat::N);
        let mut table = UnsyncTable::new(16);
        assert!(table.is_empty());
        assert_eq!(None, table.get(&position));

        table.update(&position, AB { a: 1, b: 2 });
        table.update(&position, AB { a: 0, b: 1 });
        assert_eq!(Some(AB { a: 1, b: 1 }), table.get(&position));
        assert_eq!(1, table.len());
    }

    #[test]
    fn transpositions_share_entries() {
        // the same cards left, reached by different plays
        let layout = Layout::try_from_pbn("A3 K2 Q5 J4").unwrap();
        let start = Position::new(&layout, Entries::UNLIMITED, Seat::N);
        let play = |p: &Position, c: char| {
            p.apply(Move::Play(Play::Card(Rank::try_from(c).unwrap())))
        };

        let one = ["A", "K", "Q", "J"]
            .iter()
            .fold(start.clone(), |p, c| play(&p, c.chars().next().unwrap()));
        let mut table = UnsyncTable::new(16);
        table.update(&one, AB { a: 0, b: 1 });

        let other = Layout::try_from_pbn("3 2 5 4").unwrap();
        let other = Position::new(&other, Entries::UNLIMITED, Seat::N);
        assert_eq!(Some(AB { a: 0, b: 1 }), table.get(&other));
        assert_ne!(one.tricks_won(), other.tricks_won());
    }
}
