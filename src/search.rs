use std::cmp::max;

use clap::ValueEnum;
use log::debug;

use crate::{
    Entries, InvalidHandError, Layout, Move, Play, Position, Rank, Seat, Turn,
    observers::{Empty, Logger, Observer, UnsyncStats},
    trans_table::{AB, TransTable, UnsyncTable},
};

pub trait Search {
    /// Proven bounds on the declaring side's tricks from the root. Exact unless
    /// the node budget ran out first.
    fn run_unbounded(&mut self) -> AB;

    /// Fail-soft alpha-beta value of `position`: a result `<= alpha` is an
    /// upper bound, `>= beta` a lower bound, anything between is exact.
    fn search(&mut self, position: &Position, alpha: u8, beta: u8) -> u8;

    /// Exact value of `position` together with every move that keeps it.
    /// `None` once the node budget is spent.
    fn outcome(&mut self, position: &Position) -> Option<SearchOutcome>;

    /// Optimal play from the root, with the equally good moves of every ply.
    /// `None` when the node budget ran out before the line was complete.
    fn optimal_line(&mut self) -> Option<Line>;

    /// Nodes visited so far.
    fn nodes(&self) -> u64;
}

trait ABLattice {
    fn bottom() -> u8;
    fn join(best: u8, value: u8) -> u8;
    /// Tightens the window with the best value found so far.
    fn narrow(alpha: &mut u8, beta: &mut u8, best: u8);
}

/// north, south and the choice of leader
struct Max {}
impl ABLattice for Max {
    fn bottom() -> u8 {
        u8::MIN
    }

    fn join(best: u8, value: u8) -> u8 {
        best.max(value)
    }

    fn narrow(alpha: &mut u8, _beta: &mut u8, best: u8) {
        *alpha = max(*alpha, best);
    }
}

/// east and west
struct Min {}
impl ABLattice for Min {
    fn bottom() -> u8 {
        u8::MAX
    }

    fn join(best: u8, value: u8) -> u8 {
        best.min(value)
    }

    fn narrow(_alpha: &mut u8, beta: &mut u8, best: u8) {
        *beta = (*beta).min(best);
    }
}

#[derive(Debug, Clone)]
pub struct InitialPosition {
    pub layout: Layout,
    pub entries: Entries,
    pub leader: Seat,
}

impl InitialPosition {
    #[must_use]
    pub fn position(&self) -> Position {
        Position::new(&self.layout, self.entries, self.leader)
    }

    fn search_impl(
        &self,
        root: Position,
        table: impl TransTable + 'static,
        observer: impl Observer + 'static,
        node_budget: Option<u64>,
    ) -> Box<dyn Search> {
        Box::new(SearchImpl::new(self, root, table, observer, node_budget))
    }

    /// A fresh search of the opening position. Its table lives and dies with
    /// the returned search.
    #[must_use]
    pub fn search(&self, config: &Config) -> Box<dyn Search> {
        self.search_from(self.position(), config)
    }

    /// A fresh search rooted at a position reached from this one.
    #[must_use]
    pub fn search_from(&self, root: Position, config: &Config) -> Box<dyn Search> {
        let table = UnsyncTable::new(config.table_capacity);
        let budget = config.node_budget;
        match config.tracing {
            None => self.search_impl(root, table, Empty::default(), budget),
            Some(TracingType::Stats) => {
                self.search_impl(root, table, UnsyncStats::default(), budget)
            }
            Some(TracingType::Log) => self.search_impl(root, table, Logger::default(), budget),
        }
    }
}

/// Alpha-beta search with a transposition table
struct SearchImpl<TT, O>
where
    TT: TransTable,
    O: Observer,
{
    init: InitialPosition,
    root: Position,
    table: TT,
    observer: O,
    nodes: u64,
    node_budget: Option<u64>,
    aborted: bool,
}

/// Value of a position and the moves that achieve it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOutcome {
    pub tricks: u8,
    pub best: Vec<Move>,
}

impl<TT: TransTable, O: Observer> SearchImpl<TT, O> {
    fn new(
        init: &InitialPosition,
        root: Position,
        table: TT,
        observer: O,
        node_budget: Option<u64>,
    ) -> Self {
        Self {
            init: init.clone(),
            root,
            table,
            observer,
            nodes: 0,
            node_budget,
            aborted: false,
        }
    }

    fn out_of_budget(&mut self) -> bool {
        if self.aborted {
            return true;
        }
        if self.node_budget.is_some_and(|budget| self.nodes >= budget) {
            self.aborted = true;
            self.observer.budget_exhausted();
        }
        self.aborted
    }

    fn visit(&mut self, position: &Position, alpha: u8, beta: u8) -> u8 {
        if position.is_game_over() {
            return position.tricks_won();
        }
        if self.out_of_budget() {
            return alpha;
        }
        self.nodes += 1;

        self.observer.node_enter(position, alpha, beta);
        let value = if position.turn().is_declarer() {
            self.visit_impl::<Max>(position, alpha, beta)
        } else {
            self.visit_impl::<Min>(position, alpha, beta)
        };
        self.observer.node_exit(position, value);
        value
    }

    fn visit_impl<L: ABLattice>(&mut self, position: &Position, mut alpha: u8, mut beta: u8) -> u8 {
        let won = position.tricks_won();
        let max_tricks = won + position.max_declarer_tricks();
        let boundary = position.at_trick_boundary();

        // start of a trick
        if boundary {
            // north-south can't take more tricks than their longer hand has cards
            if max_tricks <= alpha {
                self.observer.bound_cutoff();
                return alpha;
            }

            if let Some(ab) = self.table.get(position) {
                let ab = ab.shift(won);
                self.observer.tt_hit(position, ab);
                if ab.is_exact() || ab.a >= beta {
                    self.observer.tt_lower_cutoff();
                    return ab.a;
                }
                if ab.b <= alpha {
                    self.observer.tt_upper_cutoff();
                    return ab.b;
                }
            }
        }

        let moves = position.legal_moves();
        if moves.is_empty() {
            // north-south cannot get back on lead
            return won;
        }

        let (alpha0, beta0) = (alpha, beta);
        let mut best = L::bottom();
        for m in moves {
            self.observer.child_enter(m);
            let value = self.visit(&position.apply(m), alpha, beta);
            self.observer.child_exit(m);
            if self.aborted {
                return alpha0;
            }

            best = L::join(best, value);
            L::narrow(&mut alpha, &mut beta, best);
            if alpha >= beta {
                self.observer.search_cutoff();
                break;
            }
        }

        if boundary {
            debug_assert!(
                best >= won && best <= max_tricks,
                "{best} out of {position:?}"
            );
            let ab = if best <= alpha0 {
                AB { a: won, b: best }
            } else if best >= beta0 {
                AB {
                    a: best,
                    b: max_tricks,
                }
            } else {
                AB { a: best, b: best }
            };
            self.observer.update_table(position, ab);
            self.table.update(
                position,
                AB {
                    a: ab.a - won,
                    b: ab.b - won,
                },
            );
        }
        best
    }

    fn exact(&mut self, position: &Position) -> u8 {
        self.visit(position, u8::MIN, u8::MAX)
    }

    fn outcome_impl(&mut self, position: &Position) -> Option<SearchOutcome> {
        let won = position.tricks_won();
        if position.is_game_over() {
            return Some(SearchOutcome {
                tricks: won,
                best: vec![],
            });
        }

        let declarer = position.turn().is_declarer();
        let mut scored = vec![];
        for m in position.legal_moves() {
            let value = self.exact(&position.apply(m));
            if self.aborted {
                return None;
            }
            scored.push((m, value));
        }

        let values = scored.iter().map(|(_, v)| *v);
        let tricks = if declarer { values.max() } else { values.min() };
        let Some(tricks) = tricks else {
            // stranded
            return Some(SearchOutcome {
                tricks: won,
                best: vec![],
            });
        };
        let best = scored
            .into_iter()
            .filter_map(|(m, v)| (v == tricks).then_some(m))
            .collect();
        Some(SearchOutcome { tricks, best })
    }

    fn optimal_line_impl(&mut self) -> Option<Line> {
        let mut position = self.root.clone();
        let mut steps = vec![];

        let target = self.exact(&position);
        if self.aborted {
            return None;
        }
        while !position.is_game_over() {
            let outcome = self.outcome_impl(&position)?;
            let Some(chosen) = outcome.best.first().copied() else {
                break;
            };
            debug_assert_eq!(target, outcome.tricks, "line drifted at {position:?}");
            steps.push(LineStep {
                turn: position.turn(),
                chosen,
                best: outcome.best,
            });
            position = position.apply(chosen);
        }

        Some(Line { steps })
    }
}

impl<TT: TransTable, O: Observer> Search for SearchImpl<TT, O> {
    fn run_unbounded(&mut self) -> AB {
        self.observer.search_started();

        let root = self.root.clone();
        let mut lower = root.tricks_won();
        // a trick in progress may still go either way
        let pending = u8::from(!root.at_trick_boundary());
        let mut upper = lower + root.max_declarer_tricks() + pending;
        let mut guess = upper;

        while lower < upper {
            let target = max(guess, lower + 1);
            self.observer.guess_iter(target);
            let value = self.visit(&root, target - 1, target);
            if self.aborted {
                break;
            }
            let reached = value >= target;
            self.observer.guess_iter_done(target, reached);
            if reached {
                // we were able to achieve `target` tricks, this is our new lower bound then
                lower = value.min(upper);
                guess = lower;
            } else {
                // we were not able to achieve `target` tricks
                upper = value.max(lower);
                guess = upper;
            }
        }
        self.observer.search_finished(&self.init);

        AB { a: lower, b: upper }
    }

    fn search(&mut self, position: &Position, alpha: u8, beta: u8) -> u8 {
        self.visit(position, alpha, beta)
    }

    fn outcome(&mut self, position: &Position) -> Option<SearchOutcome> {
        self.outcome_impl(position)
    }

    fn optimal_line(&mut self) -> Option<Line> {
        self.optimal_line_impl()
    }

    fn nodes(&self) -> u64 {
        self.nodes
    }
}

/// One ply of an optimal line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineStep {
    pub turn: Turn,
    pub chosen: Move,
    /// every move as good as `chosen`, `chosen` first
    pub best: Vec<Move>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Line {
    pub steps: Vec<LineStep>,
}

impl Line {
    /// The cards of the line, leader choices left out.
    #[must_use]
    pub fn plays(&self) -> Vec<(Seat, Play)> {
        self.steps
            .iter()
            .filter_map(|step| match (step.turn, step.chosen) {
                (Turn::Seat(seat), Move::Play(play)) => Some((seat, play)),
                _ => None,
            })
            .collect()
    }
}

pub const DEFAULT_TABLE_CAPACITY: usize = 100_000;

pub struct Config {
    pub tracing: Option<TracingType>,
    /// transposition table entries kept before eviction
    pub table_capacity: usize,
    /// stop after this many nodes and report bounds instead of a value
    pub node_budget: Option<u64>,
    /// also work out an optimal line
    pub line: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tracing: None,
            table_capacity: DEFAULT_TABLE_CAPACITY,
            node_budget: None,
            line: false,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
pub enum TracingType {
    Stats,
    Log,
}

/// Result of one solve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Solution {
    pub bounds: AB,
    /// only when asked for and the node budget covered it
    pub line: Option<Line>,
    pub nodes: u64,
}

impl Solution {
    /// The double dummy trick count, if the search completed.
    #[must_use]
    pub fn tricks(&self) -> Option<u8> {
        self.bounds.is_exact().then_some(self.bounds.a)
    }

    #[must_use]
    pub fn is_exact(&self) -> bool {
        self.bounds.is_exact()
    }
}

/// Tricks north-south take in the suit against best defense.
pub fn solve(
    north: &[Rank],
    east: &[Rank],
    south: &[Rank],
    west: &[Rank],
    leader: Seat,
    entries: Entries,
) -> Result<u8, InvalidHandError> {
    let layout = Layout::new(north, east, south, west)?;
    let solution = solve_with(&layout, leader, entries, &Config::default());
    Ok(solution.bounds.a)
}

#[must_use]
pub fn solve_with(layout: &Layout, leader: Seat, entries: Entries, config: &Config) -> Solution {
    debug!(
        "solving {} lead {leader:?} entries [{entries:?}]",
        layout.format_as_pbn()
    );
    let init = InitialPosition {
        layout: layout.clone(),
        entries,
        leader,
    };
    let mut search = init.search(config);
    let bounds = search.run_unbounded();
    let line = if config.line && bounds.is_exact() {
        search.optimal_line()
    } else {
        None
    };
    let nodes = search.nodes();
    debug!("solved {bounds:?} in {nodes} nodes");
    Solution {
        bounds,
        line,
        nodes,
    }
}
