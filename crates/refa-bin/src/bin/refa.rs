use std::collections::HashMap;
use std::error::Error;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};
use petgraph::dot::Dot;
use petgraph::Graph;

use refa::{Automaton, Dfa, DfaTable, Nfa, StateId};

#[derive(Parser)]
#[command(name = "refa", about = "Compile regular expressions to finite automata")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct PatternSource {
    /// Pattern given directly on the command line
    #[arg(long, conflicts_with = "file")]
    regex: Option<String>,

    /// File whose first whitespace-delimited token is the pattern
    #[arg(long)]
    file: Option<PathBuf>,
}

impl PatternSource {
    fn read(&self) -> Result<String, Box<dyn Error>> {
        match (&self.regex, &self.file) {
            (Some(pattern), _) => Ok(pattern.clone()),
            (None, Some(path)) => {
                let contents = fs::read_to_string(path)?;
                contents
                    .split_whitespace()
                    .next()
                    .map(str::to_owned)
                    .ok_or_else(|| format!("{} does not contain a pattern", path.display()).into())
            }
            (None, None) => Err("either --regex or --file is required".into()),
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Show the normalized pattern and both automata
    Print {
        #[command(flatten)]
        pattern: PatternSource,

        /// Emit Graphviz dot instead of the plain listing
        #[arg(long)]
        dot: bool,
    },
    /// Compile the pattern and test words against it
    Match {
        #[command(flatten)]
        pattern: PatternSource,

        /// Words to run through the automaton
        words: Vec<String>,
    },
    /// Compile the pattern to a transition table and write it to a file
    Compile {
        #[command(flatten)]
        pattern: PatternSource,

        output: PathBuf,
    },
}

// start states are prefixed with '>', accepting states are doubly circled
fn automaton_graph<A: Automaton>(automaton: &A) -> Graph<String, String> {
    let mut graph = Graph::new();
    let accepting: Vec<StateId> = automaton.accepting_states();

    let mut nodes = HashMap::new();
    for &state in automaton.state_set() {
        let mut label = state.to_string();
        if accepting.contains(&state) {
            label = format!("(({label}))");
        }
        if state == automaton.start_state() {
            label = format!(">{label}");
        }
        nodes.insert(state, graph.add_node(label));
    }

    for (from, label, to) in automaton.edges() {
        let weight = match label {
            Some(symbol) => symbol.to_string(),
            None => "ε".to_string(),
        };
        graph.add_edge(nodes[&from], nodes[&to], weight);
    }

    graph
}

fn run(command: Command) -> Result<(), Box<dyn Error>> {
    match command {
        Command::Print { pattern, dot } => {
            let pattern = pattern.read()?;
            let nfa = Nfa::from_regex(&pattern)?;
            nfa.validate()?;
            let dfa = Dfa::from_nfa(&nfa);
            dfa.validate()?;

            println!("pattern    = {pattern}");
            println!("normalized = {}", refa::normalize(&pattern));
            if dot {
                println!("{}", Dot::new(&automaton_graph(&nfa)));
                println!("{}", Dot::new(&automaton_graph(&dfa)));
            } else {
                println!("\nNFA\n{nfa}\n\nDFA\n{dfa}");
            }
        }
        Command::Match { pattern, words } => {
            let pattern = pattern.read()?;
            let dfa = refa::compile(&pattern)?;
            for word in words {
                let verdict = if dfa.simulate(&word) {
                    "accepted"
                } else {
                    "rejected"
                };
                println!("{word}: {verdict}");
            }
        }
        Command::Compile { pattern, output } => {
            let pattern = pattern.read()?;
            let table = DfaTable::from_pattern(&pattern)?;
            let bytes = table.to_bytes()?;
            fs::write(&output, &bytes)?;
            println!("Wrote {}, {} bytes", output.display(), bytes.len());
        }
    }

    Ok(())
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("error: {error}");
            ExitCode::FAILURE
        }
    }
}
