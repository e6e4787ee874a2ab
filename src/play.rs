use std::fmt::Debug;

use crate::{Entries, Hand, Layout, Pair, Play, Seat, Turn, leader_candidates};

/// Winner of one trick: the seat with the highest play. A void never beats a
/// card, and there is always at least one card in a trick.
#[must_use]
pub fn resolve_trick(plays: &[(Seat, Play)]) -> Seat {
    debug_assert_eq!(4, plays.len());
    debug_assert!(plays.iter().any(|(_, p)| *p != Play::Void));
    plays
        .iter()
        .max_by_key(|(_, play)| *play)
        .map_or(Seat::N, |(seat, _)| *seat)
}

/// Completed tricks in `history` taken by north or south.
#[must_use]
pub fn tricks_won(history: &[(Seat, Play)]) -> u8 {
    history
        .chunks_exact(4)
        .map(|trick| Pair::from(resolve_trick(trick)).target_inc())
        .sum()
}

/// A decision available in a position.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub enum Move {
    /// The seat to act plays this card (or its void).
    Play(Play),
    /// The declaring side puts this seat back on lead.
    Lead(Seat),
}

impl Debug for Move {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Move::Play(play) => play.fmt(f),
            Move::Lead(seat) => write!(f, "{seat:?}*"),
        }
    }
}

/// Immutable snapshot of the play. Every move yields a new position.
#[derive(Clone, PartialEq, Eq)]
pub struct Position {
    hands: [Hand; 4],
    entries: Entries,
    history: Vec<(Seat, Play)>,
    turn: Turn,
    /// tricks taken by north-south, kept in step with `history`
    won: u8,
}

impl Position {
    /// Start of play: `leader` is on lead to the first trick.
    #[must_use]
    pub fn new(layout: &Layout, entries: Entries, leader: Seat) -> Self {
        Self {
            hands: layout.hands(),
            entries,
            history: Vec::with_capacity(usize::from(layout.size()) * 2),
            turn: Turn::Seat(leader),
            won: 0,
        }
    }

    #[must_use]
    pub fn hand(&self, seat: Seat) -> Hand {
        self.hands[seat.index()]
    }

    pub(crate) fn hands(&self) -> &[Hand; 4] {
        &self.hands
    }

    #[must_use]
    pub fn entries(&self) -> Entries {
        self.entries
    }

    #[must_use]
    pub fn history(&self) -> &[(Seat, Play)] {
        &self.history
    }

    #[must_use]
    pub fn turn(&self) -> Turn {
        self.turn
    }

    /// No card of the current trick has been played yet.
    #[must_use]
    pub fn at_trick_boundary(&self) -> bool {
        self.history.len() % 4 == 0
    }

    /// The seat to act opens a fresh trick.
    #[must_use]
    pub fn is_leading(&self) -> bool {
        matches!(self.turn, Turn::Seat(_)) && self.at_trick_boundary()
    }

    #[must_use]
    pub fn tricks_won(&self) -> u8 {
        debug_assert_eq!(tricks_won(&self.history), self.won);
        self.won
    }

    #[must_use]
    pub fn is_game_over(&self) -> bool {
        self.at_trick_boundary() && self.hand(Seat::N).is_empty() && self.hand(Seat::S).is_empty()
    }

    /// Cards left in the longer declaring hand: no more tricks than that can
    /// still go to north-south.
    #[must_use]
    pub fn max_declarer_tricks(&self) -> u8 {
        self.hand(Seat::N).len().max(self.hand(Seat::S).len())
    }

    /// Seat that led the most recent completed trick.
    #[must_use]
    pub fn last_trick_leader(&self) -> Option<Seat> {
        if self.history.len() < 4 {
            return None;
        }
        let start = (self.history.len() - 1) / 4 * 4;
        self.history.get(start).map(|(seat, _)| *seat)
    }

    /// Distinct moves of the side to act, none once play is over.
    #[must_use]
    pub fn legal_moves(&self) -> Vec<Move> {
        if self.is_game_over() {
            return vec![];
        }
        match self.turn {
            Turn::Seat(seat) => {
                let hand = self.hand(seat);
                if hand.is_empty() {
                    return vec![Move::Play(Play::Void)];
                }
                hand.plays()
                    .iter()
                    .map(|r| Move::Play(Play::Card(r)))
                    .collect()
            }
            Turn::ChooseLeader => self.leader_moves(),
        }
    }

    /// Every card of the seat to act, ignoring equivalent ranks.
    pub(crate) fn unpruned_moves(&self) -> Vec<Move> {
        if self.is_game_over() {
            return vec![];
        }
        match self.turn {
            Turn::Seat(seat) => {
                let hand = self.hand(seat);
                if hand.is_empty() {
                    return vec![Move::Play(Play::Void)];
                }
                hand.iter().map(|r| Move::Play(Play::Card(r))).collect()
            }
            Turn::ChooseLeader => self.leader_moves(),
        }
    }

    fn leader_moves(&self) -> Vec<Move> {
        leader_candidates(&self.hands, self.entries, self.last_trick_leader())
            .into_iter()
            .map(|(seat, _)| Move::Lead(seat))
            .collect()
    }

    /// The position after `m`.
    ///
    /// # Panics
    ///
    /// When `m` is not one of the moves `legal_moves` or `unpruned_moves` offer.
    #[must_use]
    pub fn apply(&self, m: Move) -> Position {
        match (self.turn, m) {
            (Turn::Seat(seat), Move::Play(play)) => self.apply_play(seat, play),
            (Turn::ChooseLeader, Move::Lead(seat)) => self.apply_lead(seat),
            (turn, m) => panic!("{m:?} cannot be played by {turn:?} in {self:?}"),
        }
    }

    fn apply_play(&self, seat: Seat, play: Play) -> Position {
        let mut hands = self.hands;
        match play {
            Play::Card(rank) => {
                assert!(
                    hands[seat.index()].contains(rank),
                    "{seat:?} does not hold {rank:?}"
                );
                hands[seat.index()] = hands[seat.index()].without(rank);
            }
            Play::Void => assert!(hands[seat.index()].is_empty(), "{seat:?} is not void"),
        }

        let mut history = self.history.clone();
        history.push((seat, play));

        let mut won = self.won;
        let turn = if history.len() % 4 == 0 {
            let winner = resolve_trick(&history[history.len() - 4..]);
            won += Pair::from(winner).target_inc();
            Turn::after_trick(winner)
        } else {
            Turn::Seat(seat.next())
        };

        Position {
            hands,
            entries: self.entries,
            history,
            turn,
            won,
        }
    }

    fn apply_lead(&self, seat: Seat) -> Position {
        let entries = leader_candidates(&self.hands, self.entries, self.last_trick_leader())
            .into_iter()
            .find_map(|(s, rest)| (s == seat).then_some(rest));
        let Some(entries) = entries else {
            panic!("{seat:?} cannot take the lead in {self:?}");
        };
        Position {
            hands: self.hands,
            entries,
            history: self.history.clone(),
            turn: Turn::Seat(seat),
            won: self.won,
        }
    }
}

impl Debug for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:?} {{ {:?} {:?} {:?} {:?} }} [{:?}] {}",
            self.turn,
            self.hands[0],
            self.hands[1],
            self.hands[2],
            self.hands[3],
            self.entries,
            self.won
        )
    }
}
