use rayon::prelude::*;

use crate::{
    BySeat, Entries, Layout, Move, Play, Seat,
    search::{Config, InitialPosition},
    trans_table::AB,
};

/// Tricks north-south take after each distinct opening card of `leader`.
/// Every lead is searched on its own worker with a private table.
#[must_use]
pub fn analyze_leads(
    layout: &Layout,
    leader: Seat,
    entries: Entries,
    config: &Config,
) -> Vec<(Play, AB)> {
    let init = InitialPosition {
        layout: layout.clone(),
        entries,
        leader,
    };
    let root = init.position();
    if root.is_game_over() {
        return vec![];
    }

    root.legal_moves()
        .par_iter()
        .filter_map(|m| match m {
            Move::Play(play) => Some(*play),
            Move::Lead(_) => None,
        })
        .map(|play| {
            let child = root.apply(Move::Play(play));
            let bounds = init.search_from(child, config).run_unbounded();
            (play, bounds)
        })
        .collect()
}

/// Same value as a single `solve_with`, with the opening moves split across
/// rayon workers.
#[must_use]
pub fn par_solve(layout: &Layout, leader: Seat, entries: Entries, config: &Config) -> AB {
    let leads = analyze_leads(layout, leader, entries, config);
    let reduce = |f: fn(u8, u8) -> u8| {
        leads
            .iter()
            .map(|(_, ab)| *ab)
            .reduce(|x, y| AB {
                a: f(x.a, y.a),
                b: f(x.b, y.b),
            })
            .unwrap_or(AB { a: 0, b: 0 })
    };
    if leader.is_declarer() {
        reduce(u8::max)
    } else {
        reduce(u8::min)
    }
}

/// Tricks north-south take with each seat on lead to the first trick.
#[must_use]
pub fn analyze_leaders(layout: &Layout, entries: Entries, config: &Config) -> BySeat<AB> {
    BySeat::par_new(|leader| {
        InitialPosition {
            layout: layout.clone(),
            entries,
            leader,
        }
        .search(config)
        .run_unbounded()
    })
}
