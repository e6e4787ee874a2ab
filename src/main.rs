use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use log::info;
use rand::{SeedableRng, rngs::StdRng};
use suitplay::{
    BySeat, Entries, Layout, Move, Position, Seat, Turn,
    analyze::{analyze_leaders, analyze_leads, par_solve},
    minmax::{Pruning, minmax},
    search::{Config, Line, TracingType, solve_with},
    trans_table::AB,
};

#[derive(Parser, Debug)]
#[command(about = "Double dummy solver for a single suit")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Tricks north-south take in the suit
    Solve {
        #[command(flatten)]
        position: PositionArgs,
        #[command(flatten)]
        search: SearchArgs,
        /// show an optimal line of play
        #[arg(long)]
        line: bool,
        /// split the opening moves over all cores
        #[arg(long)]
        parallel: bool,
    },
    /// Tricks after each opening card of the leader
    Leads {
        #[command(flatten)]
        position: PositionArgs,
        #[command(flatten)]
        search: SearchArgs,
    },
    /// Tricks with each seat on lead
    Leaders {
        #[arg(value_parser = parse_layout)]
        layout: Layout,
        #[arg(short, long, default_value = "inf")]
        entries: Entries,
        #[command(flatten)]
        search: SearchArgs,
    },
    /// Compare the search with plain minimax on random layouts
    Verify(VerifyArgs),
}

#[derive(Args, Debug)]
struct PositionArgs {
    /// hands clockwise from north, or from the seat before a colon: "S:K54 - AQ2 J"
    #[arg(value_parser = parse_layout)]
    layout: Layout,
    #[arg(short, long, default_value = "N")]
    leader: Seat,
    /// entries to north and south: "1,0", "2" or "inf"
    #[arg(short, long, default_value = "inf")]
    entries: Entries,
}

#[derive(Args, Debug)]
struct SearchArgs {
    #[arg(long)]
    trace: Option<TracingType>,
    /// give up after this many nodes
    #[arg(long)]
    budget: Option<u64>,
    #[arg(long, default_value_t = suitplay::search::DEFAULT_TABLE_CAPACITY)]
    capacity: usize,
}

impl SearchArgs {
    fn config(&self, line: bool) -> Config {
        Config {
            tracing: self.trace,
            table_capacity: self.capacity,
            node_budget: self.budget,
            line,
        }
    }
}

#[derive(Args, Debug)]
struct VerifyArgs {
    /// cards dealt, at most a full suit
    #[arg(
        short,
        long,
        default_value_t = 8,
        value_parser = clap::value_parser!(u8).range(0..=13)
    )]
    cards: u8,
    #[arg(short, long, default_value_t = 1000usize)]
    iter: usize,
    #[arg(short, long, default_value_t = 0u64)]
    seed: u64,
    /// skip equivalent ranks in the minimax too
    #[arg(short, long, value_enum, default_value_t = Pruning::None)]
    pruning: Pruning,
}

fn parse_layout(s: &str) -> Result<Layout, String> {
    Layout::try_from_pbn(s).map_err(|e| e.to_string())
}

pub fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Solve {
            position,
            search,
            line,
            parallel,
        } => {
            print_header(&position);
            let config = search.config(line);
            if parallel {
                let bounds =
                    par_solve(&position.layout, position.leader, position.entries, &config);
                print_bounds("tricks", bounds);
            } else {
                let solution =
                    solve_with(&position.layout, position.leader, position.entries, &config);
                print_bounds("tricks", solution.bounds);
                info!("{} nodes", solution.nodes);
                if let Some(line) = &solution.line {
                    print_line(line);
                }
            }
            ExitCode::SUCCESS
        }
        Command::Leads { position, search } => {
            print_header(&position);
            let config = search.config(false);
            let leads =
                analyze_leads(&position.layout, position.leader, position.entries, &config);
            for (play, bounds) in leads {
                print_bounds(&format!("{:?} {play:?}", position.leader), bounds);
            }
            ExitCode::SUCCESS
        }
        Command::Leaders {
            layout,
            entries,
            search,
        } => {
            println!("{}", layout.format_as_table());
            println!();
            let analysis = analyze_leaders(&layout, entries, &search.config(false));
            print_by_seat(&analysis);
            ExitCode::SUCCESS
        }
        Command::Verify(args) => verify(&args),
    }
}

fn print_header(position: &PositionArgs) {
    println!("{}", position.layout.format_as_table());
    println!();
    println!("lead {:?}, entries {:?}", position.leader, position.entries);
}

fn print_bounds(label: &str, bounds: AB) {
    if bounds.is_exact() {
        println!("{label:8} {:2}", bounds.a);
    } else {
        let AB { a, b } = bounds;
        println!("{label:8} {a:2}..{b} (node budget exhausted)");
    }
}

fn print_by_seat(analysis: &BySeat<AB>) {
    println!("   N   E   S   W");
    let cell = |ab: &AB| {
        if ab.is_exact() {
            format!("{:2}", ab.a)
        } else {
            format!("{}-{}", ab.a, ab.b)
        }
    };
    println!(
        "{:>3} {:>3} {:>3} {:>3}",
        cell(&analysis.n),
        cell(&analysis.e),
        cell(&analysis.s),
        cell(&analysis.w)
    );
}

fn print_line(line: &Line) {
    println!();
    let mut trick = 0;
    for step in &line.steps {
        let others: Vec<_> = step
            .best
            .iter()
            .filter(|m| **m != step.chosen)
            .map(|m| format!("{m:?}"))
            .collect();
        let others = if others.is_empty() {
            String::new()
        } else {
            format!("  (or {})", others.join(" "))
        };
        match (step.turn, step.chosen) {
            (Turn::ChooseLeader, Move::Lead(seat)) => {
                println!("   {seat:?} takes the lead{others}");
            }
            (turn, m) => {
                if trick % 4 == 0 {
                    println!("{:2}", trick / 4 + 1);
                }
                trick += 1;
                println!("   {turn:?} {m:?}{others}");
            }
        }
    }
}

fn verify(args: &VerifyArgs) -> ExitCode {
    let mut rng = StdRng::seed_from_u64(args.seed);
    let config = Config::default();
    let mut found = false;
    for _ in 0..args.iter {
        let layout = Layout::random(&mut rng, usize::from(args.cards));
        let entries = Entries::try_new(1, 1).unwrap_or_default();
        for leader in Seat::ALL {
            let expected = minmax(&Position::new(&layout, entries, leader), args.pruning);
            let solution = solve_with(&layout, leader, entries, &config);
            if solution.tricks() != Some(expected) {
                found = true;
                println!(
                    "counterexample: {layout:?} lead {leader:?} = {expected}, search {:?}",
                    solution.bounds
                );
            }
        }
    }

    if found {
        println!("the search disagrees with minmax");
        ExitCode::FAILURE
    } else {
        println!("no counter-examples found in {} iterations", args.iter);
        ExitCode::SUCCESS
    }
}
