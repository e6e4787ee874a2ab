use std::{
    fmt::{Debug, Write},
    str::FromStr,
    sync::LazyLock,
};

use rand::{Rng, seq::SliceRandom};
use regex::Regex;
use static_assertions::assert_eq_size;

use crate::{
    BySeat, InvalidHandError, Seat,
    bits::{extract_highest_bit_set, reset_highest_bit_set, top_of_runs},
};

const SYMBOLS: &[u8; 13] = b"23456789TJQKA";

/// Cards in a suit, two to ace.
pub const SUIT_SIZE: usize = 13;

/// Strength of a card inside the analyzed suit.
///
/// Card ranks 2 to ace map to 2..=14; the spare ordinals 1 and 15 are accepted
/// so that plain ordinal layouts such as `[4] [3] [2] [1]` can be expressed.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Rank(u8);

assert_eq_size!([u8; 1], Rank);

impl Rank {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 15;

    pub const TWO: Rank = Rank(2);
    pub const TEN: Rank = Rank(10);
    pub const JACK: Rank = Rank(11);
    pub const QUEEN: Rank = Rank(12);
    pub const KING: Rank = Rank(13);
    pub const ACE: Rank = Rank(14);

    pub fn new(value: u8) -> Result<Rank, InvalidHandError> {
        if (Self::MIN..=Self::MAX).contains(&value) {
            Ok(Rank(value))
        } else {
            Err(InvalidHandError::RankOutOfRange(value))
        }
    }

    #[must_use]
    pub fn value(self) -> u8 {
        self.0
    }

    #[must_use]
    pub fn symbol(self) -> char {
        match self.0 {
            2..=14 => char::from(SYMBOLS[usize::from(self.0 - 2)]),
            1 => '1',
            _ => '+',
        }
    }

    fn bit(self) -> u16 {
        1 << self.0
    }

    #[allow(clippy::cast_possible_truncation)]
    fn from_bit(bit: u16) -> Rank {
        debug_assert_eq!(1, bit.count_ones());
        Rank(bit.trailing_zeros() as u8)
    }
}

impl Debug for Rank {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_char(self.symbol())
    }
}

impl TryFrom<char> for Rank {
    type Error = InvalidHandError;

    #[allow(clippy::cast_possible_truncation)]
    fn try_from(ch: char) -> Result<Self, Self::Error> {
        let upper = ch.to_ascii_uppercase();
        SYMBOLS
            .iter()
            .position(|s| char::from(*s) == upper)
            .map(|i| Rank(i as u8 + 2))
            .ok_or(InvalidHandError::BadSymbol(ch))
    }
}

/// A card played to a trick. A seat out of the suit still takes its turn and
/// contributes `Void`, which ranks below every card.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Play {
    Void,
    Card(Rank),
}

assert_eq_size!([u8; 2], Play);

impl Play {
    #[must_use]
    pub fn rank(self) -> Option<Rank> {
        match self {
            Play::Void => None,
            Play::Card(rank) => Some(rank),
        }
    }

    #[must_use]
    pub fn symbol(self) -> char {
        match self {
            Play::Void => '-',
            Play::Card(rank) => rank.symbol(),
        }
    }
}

impl Debug for Play {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_char(self.symbol())
    }
}

/// The ranks of the suit held by one seat.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Hand {
    bits: u16,
}

assert_eq_size!(u16, Hand);

impl Hand {
    pub const EMPTY: Hand = Hand { bits: 0 };

    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn len(self) -> u8 {
        self.bits.count_ones() as u8
    }

    #[must_use]
    pub fn is_empty(self) -> bool {
        self.bits == 0
    }

    #[must_use]
    pub fn contains(self, rank: Rank) -> bool {
        self.bits & rank.bit() != 0
    }

    #[must_use]
    pub fn with(self, rank: Rank) -> Hand {
        Hand {
            bits: self.bits | rank.bit(),
        }
    }

    #[must_use]
    pub fn without(self, rank: Rank) -> Hand {
        debug_assert!(self.contains(rank), "{rank:?} not in {self:?}");
        Hand {
            bits: self.bits & !rank.bit(),
        }
    }

    /// Highest card of every run of touching ranks. Any lower card of a run
    /// does exactly what its top card does.
    #[must_use]
    pub fn plays(self) -> Hand {
        Hand {
            bits: top_of_runs(self.bits),
        }
    }

    #[must_use]
    pub fn top(self) -> Option<Rank> {
        if self.is_empty() {
            return None;
        }
        Some(Rank::from_bit(extract_highest_bit_set(self.bits)))
    }

    pub(crate) fn intersection(self, other: Hand) -> Hand {
        Hand {
            bits: self.bits & other.bits,
        }
    }

    pub(crate) fn union(self, other: Hand) -> Hand {
        Hand {
            bits: self.bits | other.bits,
        }
    }

    pub(crate) fn bits(self) -> u16 {
        self.bits
    }

    /// Ranks from highest to lowest.
    #[must_use]
    pub fn iter(self) -> HandIter {
        HandIter { bits: self.bits }
    }
}

pub struct HandIter {
    bits: u16,
}

impl Iterator for HandIter {
    type Item = Rank;

    fn next(&mut self) -> Option<Rank> {
        if self.bits == 0 {
            return None;
        }
        let rank = Rank::from_bit(extract_highest_bit_set(self.bits));
        self.bits = reset_highest_bit_set(self.bits);
        Some(rank)
    }
}

impl TryFrom<&[Rank]> for Hand {
    type Error = InvalidHandError;

    fn try_from(ranks: &[Rank]) -> Result<Self, Self::Error> {
        ranks.iter().try_fold(Hand::EMPTY, |hand, rank| {
            if hand.contains(*rank) {
                Err(InvalidHandError::Duplicate(*rank))
            } else {
                Ok(hand.with(*rank))
            }
        })
    }
}

impl FromStr for Hand {
    type Err = InvalidHandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let ranks = s
            .chars()
            .filter(|c| *c != '-')
            .map(Rank::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Hand::try_from(&ranks[..])
    }
}

impl Debug for Hand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            return f.write_char('-');
        }
        for rank in self.iter() {
            f.write_char(rank.symbol())?;
        }
        Ok(())
    }
}

static LAYOUT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(?:([NESWnesw]):)?(\S+)\s+(\S+)\s+(\S+)\s+(\S+)\s*$").expect("invalid regexp")
});

/// The suit as dealt to the four seats; no rank is held twice.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Layout {
    hands: [Hand; 4],
}

impl Layout {
    pub fn new(
        north: &[Rank],
        east: &[Rank],
        south: &[Rank],
        west: &[Rank],
    ) -> Result<Self, InvalidHandError> {
        Self::try_from_hands([
            Hand::try_from(north)?,
            Hand::try_from(east)?,
            Hand::try_from(south)?,
            Hand::try_from(west)?,
        ])
    }

    /// Hands indexed by seat, north first.
    pub fn try_from_hands(hands: [Hand; 4]) -> Result<Self, InvalidHandError> {
        let mut seen = Hand::EMPTY;
        for (i, hand) in hands.iter().enumerate() {
            if let Some(rank) = hand.intersection(seen).top() {
                let first = Seat::ALL
                    .into_iter()
                    .find(|s| hands[s.index()].contains(rank))
                    .unwrap_or(Seat::N);
                return Err(InvalidHandError::Overlap {
                    rank,
                    first,
                    second: Seat::ALL[i],
                });
            }
            seen = seen.union(*hand);
        }
        Ok(Self { hands })
    }

    /// Parses `[N:]north east south west`, hands listed clockwise from the
    /// designated seat, `-` for a void.
    pub fn try_from_pbn(s: &str) -> Result<Self, InvalidHandError> {
        let Some(cap) = LAYOUT_RE.captures(s) else {
            return Err(InvalidHandError::BadLayout(s.to_owned()));
        };

        let first = match cap.get(1) {
            Some(m) => m
                .as_str()
                .parse::<Seat>()
                .map_err(InvalidHandError::BadLayout)?,
            None => Seat::N,
        };

        let mut hands = [Hand::EMPTY; 4];
        let mut seat = first;
        for group in 2..=5 {
            let text = cap.get(group).map_or("", |m| m.as_str());
            hands[seat.index()] = text.parse()?;
            seat = seat.next();
        }
        Self::try_from_hands(hands)
    }

    /// Deals `cards` distinct card ranks at random over the four seats.
    ///
    /// # Panics
    ///
    /// In debug builds, when `cards` is more than a suit holds.
    pub fn random<R: Rng>(rng: &mut R, cards: usize) -> Self {
        debug_assert!(cards <= SUIT_SIZE, "a suit has {SUIT_SIZE} cards, not {cards}");
        let mut ranks: Vec<_> = (2..=14).map(Rank).collect();
        ranks.shuffle(rng);
        let mut hands = [Hand::EMPTY; 4];
        for rank in ranks.into_iter().take(cards) {
            let seat = rng.gen_range(0..4);
            hands[seat] = hands[seat].with(rank);
        }
        Self { hands }
    }

    #[must_use]
    pub fn get(&self, seat: Seat) -> Hand {
        self.hands[seat.index()]
    }

    pub(crate) fn hands(&self) -> [Hand; 4] {
        self.hands
    }

    #[must_use]
    pub fn size(&self) -> u8 {
        self.hands.iter().map(|h| h.len()).sum()
    }

    #[must_use]
    pub fn format_as_pbn(&self) -> String {
        format!(
            "N:{:?} {:?} {:?} {:?}",
            self.hands[0], self.hands[1], self.hands[2], self.hands[3]
        )
    }

    #[must_use]
    pub fn format_as_table(&self) -> String {
        let [n, e, s, w] = self.hands.map(|h| format!("{h:?}"));
        format!("{:7}{n}\n{w:14}{e}\n{:7}{s}", "", "")
    }
}

impl Debug for Layout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{ {} }}", self.format_as_pbn())
    }
}

impl TryFrom<BySeat<&str>> for Layout {
    type Error = InvalidHandError;

    fn try_from(value: BySeat<&str>) -> Result<Self, Self::Error> {
        Self::try_from_hands([
            value.n.parse()?,
            value.e.parse()?,
            value.s.parse()?,
            value.w.parse()?,
        ])
    }
}

#[cfg(test)]
mod tests {
    use rand::{SeedableRng, rngs::StdRng};

    use crate::{BySeat, Hand, InvalidHandError, Layout, Play, Rank, SUIT_SIZE, Seat};

    fn ranks(values: &[u8]) -> Vec<Rank> {
        values.iter().map(|v| Rank::new(*v).unwrap()).collect()
    }

    #[test]
    fn rank_symbols() {
        assert_eq!(Rank::ACE, Rank::try_from('A').unwrap());
        assert_eq!(Rank::TEN, Rank::try_from('t').unwrap());
        assert_eq!(Rank::TWO, Rank::try_from('2').unwrap());
        assert_eq!(Err(InvalidHandError::BadSymbol('X')), Rank::try_from('X'));
        assert_eq!("Q", format!("{:?}", Rank::QUEEN));
        assert_eq!(Err(InvalidHandError::RankOutOfRange(0)), Rank::new(0));
        assert_eq!(Err(InvalidHandError::RankOutOfRange(16)), Rank::new(16));
    }

    #[test]
    fn void_is_lowest() {
        assert!(Play::Void < Play::Card(Rank::new(1).unwrap()));
        assert!(Play::Card(Rank::TWO) < Play::Card(Rank::ACE));
    }

    #[test]
    fn hand_iter_descending() {
        let hand: Hand = "2KA9".parse().unwrap();
        assert_eq!("AK92", format!("{hand:?}"));
        assert_eq!(4, hand.len());
        assert_eq!(Some(Rank::ACE), hand.top());
        assert_eq!("-", format!("{:?}", Hand::EMPTY));
        assert_eq!(Hand::EMPTY, "-".parse::<Hand>().unwrap());
    }

    #[test]
    fn hand_plays() {
        let hand = Hand::try_from(&ranks(&[5, 4, 3])[..]).unwrap();
        let plays: Vec<_> = hand.plays().iter().collect();
        assert_eq!(vec![Rank::new(5).unwrap()], plays);

        let hand: Hand = "AQJ32".parse().unwrap();
        assert_eq!("AQ3", format!("{:?}", hand.plays()));
    }

    #[test]
    fn duplicate_rank() {
        assert_eq!(
            Err(InvalidHandError::Duplicate(Rank::new(4).unwrap())),
            Hand::try_from(&ranks(&[4, 2, 4])[..])
        );
        assert_eq!(
            Err(InvalidHandError::Duplicate(Rank::KING)),
            "KQK".parse::<Hand>()
        );
    }

    #[test]
    fn overlapping_hands() {
        let err = Layout::new(&ranks(&[14, 3]), &ranks(&[13]), &ranks(&[3]), &[]).unwrap_err();
        assert_eq!(
            InvalidHandError::Overlap {
                rank: Rank::new(3).unwrap(),
                first: Seat::N,
                second: Seat::S
            },
            err
        );
    }

    #[test]
    fn try_from_pbn() {
        let layout = Layout::try_from_pbn("AQ2 K76 J43 T98").unwrap();
        assert_eq!("{ N:AQ2 K76 J43 T98 }", format!("{layout:?}"));

        let layout = Layout::try_from_pbn("S:AQ2 K76 - T98").unwrap();
        assert_eq!("{ N:- T98 AQ2 K76 }", format!("{layout:?}"));
        assert_eq!(9, layout.size());

        assert!(matches!(
            Layout::try_from_pbn("AQ2 K76"),
            Err(InvalidHandError::BadLayout(_))
        ));
        assert!(matches!(
            Layout::try_from_pbn("AQ2 K76 Q3 -"),
            Err(InvalidHandError::Overlap { .. })
        ));
    }

    #[test]
    fn try_from_by_seat() {
        let layout = Layout::try_from(BySeat::<&str> {
            n: "AQ",
            e: "K",
            s: "-",
            w: "",
        })
        .unwrap();
        assert_eq!("AQ", format!("{:?}", layout.get(Seat::N)));
        assert!(layout.get(Seat::W).is_empty());
    }

    #[test]
    fn random_layout() {
        let mut rng = StdRng::seed_from_u64(7);
        for cards in 0..=SUIT_SIZE {
            let layout = Layout::random(&mut rng, cards);
            assert_eq!(cards, usize::from(layout.size()));
            assert!(Layout::try_from_hands(layout.hands()).is_ok());
        }
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "a suit has 13 cards")]
    fn random_layout_larger_than_a_suit() {
        let mut rng = StdRng::seed_from_u64(7);
        let _ = Layout::random(&mut rng, SUIT_SIZE + 1);
    }

    #[test]
    fn table() {
        let layout = Layout::try_from_pbn("AQ2 K76 J43 T98").unwrap();
        assert_eq!(
            "       AQ2\nT98           K76\n       J43",
            layout.format_as_table()
        );
    }
}
