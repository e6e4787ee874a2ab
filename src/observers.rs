use std::time::{Duration, Instant};

use log::{info, trace};
use ratatui::{buffer::Buffer, layout::Rect, prelude::Widget, widgets::Sparkline};

use crate::{Move, Position, search::InitialPosition, trans_table::AB};

pub(crate) trait Observer {
    fn node_enter(&mut self, position: &Position, alpha: u8, beta: u8);
    fn node_exit(&mut self, position: &Position, value: u8);

    fn child_enter(&mut self, m: Move);
    fn child_exit(&mut self, m: Move);

    fn update_table(&mut self, position: &Position, ab: AB);

    fn guess_iter(&mut self, target: u8);
    fn guess_iter_done(&mut self, target: u8, reached: bool);
    fn bound_cutoff(&mut self);
    fn search_cutoff(&mut self);
    fn budget_exhausted(&mut self);
    fn search_finished(&mut self, init: &InitialPosition);
    fn search_started(&mut self);
    fn tt_hit(&mut self, position: &Position, ab: AB);
    fn tt_lower_cutoff(&mut self);
    fn tt_upper_cutoff(&mut self);
}

#[derive(Debug, Default)]
pub struct Empty {}

impl Observer for Empty {
    fn node_enter(&mut self, _position: &Position, _alpha: u8, _beta: u8) {}
    fn node_exit(&mut self, _position: &Position, _value: u8) {}

    fn child_enter(&mut self, _m: Move) {}
    fn child_exit(&mut self, _m: Move) {}

    fn update_table(&mut self, _position: &Position, _ab: AB) {}

    fn guess_iter(&mut self, _target: u8) {}
    fn guess_iter_done(&mut self, _target: u8, _reached: bool) {}

    fn bound_cutoff(&mut self) {}

    fn search_cutoff(&mut self) {}

    fn budget_exhausted(&mut self) {}

    fn search_finished(&mut self, _init: &InitialPosition) {}

    fn search_started(&mut self) {}

    fn tt_hit(&mut self, _position: &Position, _ab: AB) {}

    fn tt_lower_cutoff(&mut self) {}

    fn tt_upper_cutoff(&mut self) {}
}

#[derive(Debug, Default)]
pub struct UnsyncStats {
    start: Option<Instant>,
    elapsed: Option<Duration>,
    bound_cutoff: u64,
    budget_exhausted: bool,
    guess_iter: u64,
    /// nodes by trick number
    nodes: [u64; 16],
    search_cutoff: u64,
    search: u64,
    tt_insert: u64,
    tt_hit: u64,
    tt_lower_cutoff: u64,
    tt_upper_cutoff: u64,
}

impl UnsyncStats {
    pub(crate) fn total_nodes(&self) -> u64 {
        self.nodes.iter().sum()
    }

    /// Nodes per trick as a one-line sparkline, tricks never reached left out.
    fn node_sparkline(&self) -> String {
        let used = self.nodes.iter().rposition(|n| *n > 0).map_or(0, |i| i + 1);
        let nodes = &self.nodes[..used];
        let mut buffer = Buffer::empty(Rect::new(0, 0, u16::try_from(used).unwrap_or(0), 1));
        let sparkline = Sparkline::default().data(nodes);
        sparkline.render(buffer.area, &mut buffer);
        buffer.content().iter().map(|cell| cell.symbol()).collect()
    }

    fn print(&self, init: &InitialPosition) {
        let total_nodes = self.total_nodes().max(1);
        let duration = self
            .elapsed
            .map_or(0, |e| u64::try_from(e.as_millis()).unwrap_or(u64::MAX))
            .max(1);
        info!("Search Statistics:");
        info!(
            "    layout:   {} {:?} lead [{:?}]",
            init.layout.format_as_pbn(),
            init.leader,
            init.entries
        );
        info!("    duration: {duration:12} ms");
        info!("    searches: {:12}", self.search);
        info!("    guesses:  {:12}", self.guess_iter);
        info!(
            "    nodes:    {:12} {}/ms |{}|",
            total_nodes,
            total_nodes / duration,
            self.node_sparkline()
        );
        info!(
            "    cuts:     {:12} {}%",
            self.search_cutoff,
            self.search_cutoff * 100 / total_nodes
        );
        info!(
            "    tt ins:   {:12} {}%",
            self.tt_insert,
            self.tt_insert * 100 / total_nodes
        );
        info!(
            "    tt hits:  {:12} {}%",
            self.tt_hit,
            self.tt_hit * 100 / total_nodes
        );
        info!(
            "    tt lower: {:12} {}%",
            self.tt_lower_cutoff,
            self.tt_lower_cutoff * 100 / total_nodes
        );
        info!(
            "    tt upper: {:12} {}%",
            self.tt_upper_cutoff,
            self.tt_upper_cutoff * 100 / total_nodes
        );
        info!(
            "    bound:    {:12} {}%",
            self.bound_cutoff,
            self.bound_cutoff * 100 / total_nodes
        );
        if self.budget_exhausted {
            info!("    node budget exhausted, result is a bound");
        }
    }
}

impl Observer for UnsyncStats {
    fn node_enter(&mut self, position: &Position, _alpha: u8, _beta: u8) {
        let trick = (position.history().len() / 4).min(self.nodes.len() - 1);
        self.nodes[trick] += 1;
    }

    fn node_exit(&mut self, _position: &Position, _value: u8) {}

    fn child_enter(&mut self, _m: Move) {}
    fn child_exit(&mut self, _m: Move) {}

    fn update_table(&mut self, _position: &Position, _ab: AB) {
        self.tt_insert += 1;
    }

    fn guess_iter(&mut self, _target: u8) {
        self.guess_iter += 1;
    }
    fn guess_iter_done(&mut self, _target: u8, _reached: bool) {}

    fn bound_cutoff(&mut self) {
        self.bound_cutoff += 1;
    }

    fn search_cutoff(&mut self) {
        self.search_cutoff += 1;
    }

    fn budget_exhausted(&mut self) {
        self.budget_exhausted = true;
    }

    fn search_finished(&mut self, init: &InitialPosition) {
        self.elapsed = self.start.map(|s| s.elapsed());
        self.print(init);
    }

    fn search_started(&mut self) {
        self.search += 1;
        self.start = Some(Instant::now());
    }

    fn tt_hit(&mut self, _position: &Position, _ab: AB) {
        self.tt_hit += 1;
    }

    fn tt_lower_cutoff(&mut self) {
        self.tt_lower_cutoff += 1;
    }

    fn tt_upper_cutoff(&mut self) {
        self.tt_upper_cutoff += 1;
    }
}

/// Traces every node of the search tree at `trace` level.
#[derive(Default)]
pub struct Logger {
    depth: usize,
}

impl Logger {
    fn indent(&self) -> String {
        "  ".repeat(self.depth)
    }
}

impl Observer for Logger {
    fn guess_iter(&mut self, target: u8) {
        trace!("? {target}");
    }

    fn guess_iter_done(&mut self, target: u8, reached: bool) {
        trace!("= {target} {reached}");
    }

    fn bound_cutoff(&mut self) {}

    fn node_enter(&mut self, position: &Position, alpha: u8, beta: u8) {
        let mark = if position.at_trick_boundary() { '*' } else { '>' };
        trace!("{}{mark} ({alpha}, {beta}) {position:?}", self.indent());
        self.depth += 1;
    }

    fn node_exit(&mut self, position: &Position, value: u8) {
        self.depth = self.depth.saturating_sub(1);
        trace!("{}< {:?} {value}", self.indent(), position.turn());
    }

    fn child_enter(&mut self, m: Move) {
        trace!("{}{m:?}", self.indent());
    }

    fn child_exit(&mut self, _m: Move) {}

    fn search_cutoff(&mut self) {}

    fn budget_exhausted(&mut self) {
        trace!("node budget exhausted");
    }

    fn search_finished(&mut self, _init: &InitialPosition) {}

    fn search_started(&mut self) {}

    fn tt_hit(&mut self, position: &Position, ab: AB) {
        trace!("{}T {position:?} {ab:?}", self.indent());
    }

    fn tt_lower_cutoff(&mut self) {}

    fn tt_upper_cutoff(&mut self) {}

    fn update_table(&mut self, position: &Position, ab: AB) {
        trace!("{}! {position:?} {ab:?}", self.indent());
    }
}
