//! Suitplay is a single-suit card combination double dummy solver.
mod cards;
use rayon::prelude::*;
use std::str::FromStr;

pub use cards::*;
mod error;
pub use error::InvalidHandError;
mod play;
pub use play::*;
mod leader;
pub use leader::*;
pub mod analyze;
mod bits;
pub mod counter;
pub mod minmax;
pub mod observers;
pub mod search;
pub mod trans_table;

pub use search::{Solution, solve, solve_with};

#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Seat {
    N = 0,
    E = 1,
    S = 2,
    W = 3,
}
impl Seat {
    pub const ALL: [Seat; 4] = [Seat::N, Seat::E, Seat::S, Seat::W];

    /// Clockwise successor: north, east, south, west, north.
    #[must_use]
    pub fn next(self) -> Seat {
        Self::ALL[(self.index() + 1) & 3]
    }

    pub(crate) fn index(self) -> usize {
        (self as u8) as usize
    }

    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            Self::N => "N",
            Self::E => "E",
            Self::S => "S",
            Self::W => "W",
        }
    }

    #[must_use]
    pub fn is_declarer(self) -> bool {
        matches!(Pair::from(self), Pair::NS)
    }

    #[must_use]
    pub fn partner(self) -> Seat {
        self.next().next()
    }
}

impl std::fmt::Debug for Seat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.symbol())
    }
}

impl TryFrom<char> for Seat {
    type Error = String;

    fn try_from(value: char) -> Result<Self, Self::Error> {
        match value.to_ascii_uppercase() {
            'N' => Ok(Self::N),
            'E' => Ok(Self::E),
            'S' => Ok(Self::S),
            'W' => Ok(Self::W),
            _ => Err(format!("bad seat: {value}")),
        }
    }
}

impl FromStr for Seat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some(first) = s.chars().next() else {
            return Err("bad seat: empty".to_string());
        };
        Self::try_from(first).map_err(|_| format!("bad seat: {s}"))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BySeat<T> {
    pub n: T,
    pub e: T,
    pub s: T,
    pub w: T,
}

impl<T> BySeat<T> {
    pub fn get(&self, seat: Seat) -> &T {
        match seat {
            Seat::N => &self.n,
            Seat::E => &self.e,
            Seat::S => &self.s,
            Seat::W => &self.w,
        }
    }
}

impl<T: Send> BySeat<T> {
    pub(crate) fn par_new<F>(f: F) -> Self
    where
        F: Fn(Seat) -> T + Sync + Send,
    {
        let mut seats: Vec<_> = Seat::ALL.par_iter().map(|s| f(*s)).collect();
        let w = seats.pop();
        let s = seats.pop();
        let e = seats.pop();
        let n = seats.pop();
        match (n, e, s, w) {
            (Some(n), Some(e), Some(s), Some(w)) => Self { n, e, s, w },
            _ => unreachable!("one result per seat"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum Pair {
    // NS
    NS = 0,
    // EW
    EW = 1,
}

impl Pair {
    /// Tricks added to the declaring side's count when this pair wins a trick.
    #[must_use]
    pub(crate) fn target_inc(self) -> u8 {
        match self {
            Pair::NS => 1,
            Pair::EW => 0,
        }
    }
}

impl From<Seat> for Pair {
    fn from(p: Seat) -> Self {
        match p {
            Seat::N | Seat::S => Self::NS,
            Seat::E | Seat::W => Self::EW,
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::{BySeat, Pair, Seat};

    #[test]
    fn rotation() {
        assert_eq!(Seat::E, Seat::N.next());
        assert_eq!(Seat::S, Seat::E.next());
        assert_eq!(Seat::W, Seat::S.next());
        assert_eq!(Seat::N, Seat::W.next());
        assert_eq!(Seat::S, Seat::N.partner());
    }

    #[test]
    fn pairs() {
        assert_eq!(Pair::NS, Pair::from(Seat::S));
        assert_eq!(Pair::EW, Pair::from(Seat::W));
        assert!(Seat::N.is_declarer());
        assert!(!Seat::E.is_declarer());
    }

    #[test]
    fn parse_seat() {
        assert_eq!(Ok(Seat::W), "west".parse::<Seat>());
        assert_eq!(Ok(Seat::S), "S".parse::<Seat>());
        assert!("x".parse::<Seat>().is_err());
        assert!("".parse::<Seat>().is_err());
    }

    #[test]
    fn by_seat_par_new() {
        let by_seat = BySeat::par_new(|s| s.symbol().to_string());
        assert_eq!("N", by_seat.n);
        assert_eq!("E", by_seat.e);
        assert_eq!("S", by_seat.s);
        assert_eq!("W", by_seat.w);
        assert_eq!("S", by_seat.get(Seat::S));
    }
}
