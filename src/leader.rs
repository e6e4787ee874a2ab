use std::{fmt::Debug, str::FromStr};

use static_assertions::assert_eq_size;

use crate::{Hand, InvalidHandError, Seat};

/// Outside-suit entries left to one declaring seat.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryCount {
    Limited(u8),
    Unlimited,
}

assert_eq_size!([u8; 2], EntryCount);

impl EntryCount {
    #[must_use]
    pub fn is_available(self) -> bool {
        match self {
            EntryCount::Limited(n) => n > 0,
            EntryCount::Unlimited => true,
        }
    }

    /// One entry fewer, or `None` when nothing is left to spend.
    #[must_use]
    pub(crate) fn consume(self) -> Option<EntryCount> {
        match self {
            EntryCount::Limited(0) => None,
            EntryCount::Limited(n) => Some(EntryCount::Limited(n - 1)),
            EntryCount::Unlimited => Some(EntryCount::Unlimited),
        }
    }
}

impl TryFrom<i64> for EntryCount {
    type Error = InvalidHandError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        if value < 0 {
            return Err(InvalidHandError::NegativeEntries(value));
        }
        // more entries than any suit has cards is as good as unlimited
        let count = u8::try_from(value)
            .map_or(EntryCount::Unlimited, EntryCount::Limited);
        Ok(count)
    }
}

impl FromStr for EntryCount {
    type Err = InvalidHandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        match s.to_lowercase().as_str() {
            "inf" | "unlimited" | "\u{221e}" => Ok(EntryCount::Unlimited),
            lower => lower
                .parse::<i64>()
                .map_err(|_| InvalidHandError::BadEntries(s.to_owned()))
                .and_then(EntryCount::try_from),
        }
    }
}

impl Debug for EntryCount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntryCount::Limited(n) => write!(f, "{n}"),
            EntryCount::Unlimited => f.write_str("\u{221e}"),
        }
    }
}

/// Entries of the declaring seats.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Entries {
    pub north: EntryCount,
    pub south: EntryCount,
}

impl Entries {
    pub const UNLIMITED: Entries = Entries {
        north: EntryCount::Unlimited,
        south: EntryCount::Unlimited,
    };

    pub const NONE: Entries = Entries {
        north: EntryCount::Limited(0),
        south: EntryCount::Limited(0),
    };

    pub fn try_new(north: i64, south: i64) -> Result<Self, InvalidHandError> {
        Ok(Self {
            north: EntryCount::try_from(north)?,
            south: EntryCount::try_from(south)?,
        })
    }

    /// Defenders never hold entries.
    #[must_use]
    pub fn get(self, seat: Seat) -> EntryCount {
        match seat {
            Seat::N => self.north,
            Seat::S => self.south,
            Seat::E | Seat::W => EntryCount::Limited(0),
        }
    }

    #[must_use]
    pub(crate) fn consume(self, seat: Seat) -> Option<Entries> {
        match seat {
            Seat::N => self.north.consume().map(|north| Entries { north, ..self }),
            Seat::S => self.south.consume().map(|south| Entries { south, ..self }),
            Seat::E | Seat::W => None,
        }
    }
}

impl Default for Entries {
    fn default() -> Self {
        Self::UNLIMITED
    }
}

impl FromStr for Entries {
    type Err = InvalidHandError;

    /// `north,south`, or a single count for both seats.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once(',') {
            Some((north, south)) => Ok(Entries {
                north: north.parse()?,
                south: south.parse()?,
            }),
            None => {
                let both = s.parse()?;
                Ok(Entries {
                    north: both,
                    south: both,
                })
            }
        }
    }
}

impl Debug for Entries {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?},{:?}", self.north, self.south)
    }
}

/// Who acts next.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub enum Turn {
    /// A seat plays to the current trick (or leads to a fresh one).
    Seat(Seat),
    /// The defense won the last trick; the declaring side decides which of its
    /// seats gets back on lead.
    ChooseLeader,
}

impl Turn {
    pub(crate) fn after_trick(winner: Seat) -> Turn {
        if winner.is_declarer() {
            Turn::Seat(winner)
        } else {
            Turn::ChooseLeader
        }
    }

    pub(crate) fn is_declarer(self) -> bool {
        match self {
            Turn::Seat(seat) => seat.is_declarer(),
            Turn::ChooseLeader => true,
        }
    }
}

impl Debug for Turn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Turn::Seat(seat) => seat.fmt(f),
            Turn::ChooseLeader => f.write_str("*"),
        }
    }
}

/// Declaring seats that can take the lead after the defense won a trick,
/// each with the entries left once it has done so.
///
/// `led_lost_trick` is the seat that led the trick just lost. If that seat
/// belongs to the declaring side it keeps the lead for free; the other seat
/// has to spend one of its entries. A seat without cards in the suit is never
/// a candidate. An empty result leaves the declaring side stranded.
#[must_use]
pub fn leader_candidates(
    hands: &[Hand; 4],
    entries: Entries,
    led_lost_trick: Option<Seat>,
) -> Vec<(Seat, Entries)> {
    let mut candidates = Vec::with_capacity(2);
    let order = match led_lost_trick {
        Some(Seat::S) => [Seat::S, Seat::N],
        _ => [Seat::N, Seat::S],
    };
    for seat in order {
        if hands[seat.index()].is_empty() {
            continue;
        }
        if led_lost_trick == Some(seat) {
            candidates.push((seat, entries));
        } else if let Some(rest) = entries.consume(seat) {
            candidates.push((seat, rest));
        }
    }
    candidates
}

#[cfg(test)]
mod tests {
    use crate::{Entries, EntryCount, Hand, InvalidHandError, Seat, Turn, leader_candidates};

    fn hands(n: &str, e: &str, s: &str, w: &str) -> [Hand; 4] {
        [
            n.parse().unwrap(),
            e.parse().unwrap(),
            s.parse().unwrap(),
            w.parse().unwrap(),
        ]
    }

    #[test]
    fn entry_count_consume() {
        assert_eq!(None, EntryCount::Limited(0).consume());
        assert_eq!(
            Some(EntryCount::Limited(1)),
            EntryCount::Limited(2).consume()
        );
        assert_eq!(Some(EntryCount::Unlimited), EntryCount::Unlimited.consume());
        assert!(!EntryCount::Limited(0).is_available());
        assert!(EntryCount::Unlimited.is_available());
    }

    #[test]
    fn negative_entries_rejected() {
        assert_eq!(
            Err(InvalidHandError::NegativeEntries(-1)),
            Entries::try_new(0, -1)
        );
        assert_eq!(
            Err(InvalidHandError::NegativeEntries(-3)),
            "-3".parse::<EntryCount>()
        );
        assert!(matches!(
            "x".parse::<EntryCount>(),
            Err(InvalidHandError::BadEntries(_))
        ));
        assert_eq!(Ok(EntryCount::Unlimited), EntryCount::try_from(1000_i64));
    }

    #[test]
    fn parse_entries() {
        let entries: Entries = "1,inf".parse().unwrap();
        assert_eq!(EntryCount::Limited(1), entries.north);
        assert_eq!(EntryCount::Unlimited, entries.south);
        assert_eq!("1,\u{221e}", format!("{entries:?}"));

        let entries: Entries = "2".parse().unwrap();
        assert_eq!(Entries::try_new(2, 2).unwrap(), entries);
    }

    #[test]
    fn turn_after_trick() {
        assert_eq!(Turn::Seat(Seat::S), Turn::after_trick(Seat::S));
        assert_eq!(Turn::ChooseLeader, Turn::after_trick(Seat::E));
        assert!(Turn::ChooseLeader.is_declarer());
        assert!(!Turn::Seat(Seat::W).is_declarer());
    }

    #[test]
    fn previous_leader_is_free() {
        let hands = hands("Q", "-", "J", "-");
        let candidates = leader_candidates(&hands, Entries::NONE, Some(Seat::S));
        assert_eq!(vec![(Seat::S, Entries::NONE)], candidates);
    }

    #[test]
    fn switching_costs_an_entry() {
        let hands = hands("Q", "-", "J", "-");
        let entries = Entries::try_new(1, 0).unwrap();
        let candidates = leader_candidates(&hands, entries, Some(Seat::S));
        assert_eq!(
            vec![(Seat::S, entries), (Seat::N, Entries::NONE)],
            candidates
        );
    }

    #[test]
    fn defense_led_trick_costs_both() {
        let hands = hands("Q", "-", "J", "-");
        let entries = Entries::try_new(3, 0).unwrap();
        let candidates = leader_candidates(&hands, entries, Some(Seat::W));
        assert_eq!(vec![(Seat::N, Entries::try_new(2, 0).unwrap())], candidates);
    }

    #[test]
    fn empty_hands_never_lead() {
        let hands = hands("-", "K", "J", "-");
        let stranded = leader_candidates(&hands, Entries::NONE, Some(Seat::N));
        assert!(stranded.is_empty());
        let candidates = leader_candidates(&hands, Entries::UNLIMITED, Some(Seat::N));
        assert_eq!(vec![(Seat::S, Entries::UNLIMITED)], candidates);
    }
}
