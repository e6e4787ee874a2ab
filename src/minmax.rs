use clap::ValueEnum;

use crate::{Move, Position};

pub(crate) trait Lattice<T> {
    fn bottom() -> T;
    fn join(t1: T, t2: T) -> T;
}

pub(crate) struct Max {}
impl Lattice<u8> for Max {
    fn bottom() -> u8 {
        u8::MIN
    }

    fn join(t1: u8, t2: u8) -> u8 {
        t1.max(t2)
    }
}

pub(crate) struct Min {}
impl Lattice<u8> for Min {
    fn bottom() -> u8 {
        u8::MAX
    }

    fn join(t1: u8, t2: u8) -> u8 {
        t1.min(t2)
    }
}

/// Which cards of a hand are tried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Pruning {
    /// every card held
    None,
    /// one card per run of touching ranks
    Equivalence,
}

impl Pruning {
    pub(crate) fn moves(self, position: &Position) -> Vec<Move> {
        match self {
            Pruning::None => position.unpruned_moves(),
            Pruning::Equivalence => position.legal_moves(),
        }
    }
}

struct Search {
    pruning: Pruning,
}

impl Search {
    fn visit(&self, position: &Position) -> u8 {
        if position.turn().is_declarer() {
            self.visit_impl::<Max>(position)
        } else {
            self.visit_impl::<Min>(position)
        }
    }

    fn visit_impl<L: Lattice<u8>>(&self, position: &Position) -> u8 {
        if position.is_game_over() {
            return position.tricks_won();
        }

        let moves = self.pruning.moves(position);
        if moves.is_empty() {
            return position.tricks_won();
        }

        let mut result = L::bottom();
        for m in moves {
            result = L::join(result, self.visit(&position.apply(m)));
        }
        result
    }
}

/// Plain minimax over the whole game tree. Slow, but simple enough to check
/// the alpha-beta search against.
#[must_use]
pub fn minmax(position: &Position, pruning: Pruning) -> u8 {
    Search { pruning }.visit(position)
}
