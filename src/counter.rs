use crate::{Position, minmax::Pruning};

/// Size of the game tree below `position`, `depth` moves deep.
#[must_use]
pub fn count_nodes(position: &Position, depth: u8, pruning: Pruning) -> u64 {
    fn count_nodes_impl(result: &mut u64, position: &Position, depth: u8, pruning: Pruning) {
        if depth == 0 || position.is_game_over() {
            return;
        }

        let depth = depth - 1;
        for m in pruning.moves(position) {
            *result += 1;
            count_nodes_impl(result, &position.apply(m), depth, pruning);
        }
    }

    let mut result = 0u64;
    count_nodes_impl(&mut result, position, depth, pruning);
    result
}

#[cfg(test)]
mod tests {
    use crate::{Entries, Layout, Position, Seat, counter::count_nodes, minmax::Pruning};

    #[test]
    fn runs_of_touching_ranks() {
        let layout = Layout::try_from_pbn("AKQ 432 JT9 876").unwrap();
        let position = Position::new(&layout, Entries::UNLIMITED, Seat::N);

        // north initially has 3 moves
        assert_eq!(3, count_nodes(&position, 1, Pruning::None));
        assert_eq!(1, count_nodes(&position, 1, Pruning::Equivalence));

        assert_eq!(3 + 9, count_nodes(&position, 2, Pruning::None));
        assert_eq!(4, count_nodes(&position, 4, Pruning::Equivalence));
        assert_eq!(3 + 9 + 27 + 81, count_nodes(&position, 4, Pruning::None));
    }

    #[test]
    fn pruning_never_grows_the_tree() {
        let layout = Layout::try_from_pbn("AQ9 K84 J73 T652").unwrap();
        let position = Position::new(&layout, Entries::try_new(1, 1).unwrap(), Seat::S);
        for depth in 1..8 {
            assert!(
                count_nodes(&position, depth, Pruning::Equivalence)
                    <= count_nodes(&position, depth, Pruning::None)
            );
        }
    }

    #[test]
    fn game_over_has_no_nodes() {
        let layout = Layout::try_from_pbn("- AK - Q").unwrap();
        let position = Position::new(&layout, Entries::UNLIMITED, Seat::E);
        assert_eq!(0, count_nodes(&position, 5, Pruning::None));
    }
}
