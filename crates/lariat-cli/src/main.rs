use anyhow::Context as _;
use clap::Parser;
use lariat::{engine::ParseEngine, grammar::Grammar, lr1::Automaton, parse_table::ParseTable};
use std::{fs, path::PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// The path of the grammar definition file.
    grammar: PathBuf,

    /// Token sequence to parse, separated by whitespace.
    #[arg(short, long)]
    input: Option<String>,

    /// Print the canonical collection of item sets.
    #[arg(long)]
    states: bool,

    /// Print the ACTION/GOTO tables.
    #[arg(long)]
    table: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    tracing::debug!("parsed CLI args = {:?}", args);

    process(&args)
        .with_context(|| anyhow::anyhow!("errored during processing {}", args.grammar.display()))
}

fn process(args: &Args) -> anyhow::Result<()> {
    let source = fs::read_to_string(&args.grammar)
        .context("failed to read the grammar definition file")?;
    let grammar = Grammar::parse(&source)?;
    println!("{}", grammar);

    let automaton = Automaton::generate(&grammar);
    let parse_table = ParseTable::generate(&grammar, &automaton);

    for conflict in parse_table.conflicts() {
        println!("[warning] {}", conflict);
    }
    if !parse_table.is_consistent() {
        println!("[warning] the grammar is not CLR(1); each conflicted cell kept its first action");
    }

    if args.states {
        println!("\nstates:\n{}", automaton.display(&grammar));
    }
    if args.table {
        println!("\ntables:\n{}", parse_table);
    }

    if let Some(input) = &args.input {
        let result = ParseEngine::new(&parse_table).run(input);

        println!("\ntrace:");
        for step in &result.steps {
            println!(
                "{:>4}  {:<44}  {:>28}  {}",
                step.step,
                step.stack.join(" "),
                step.input.join(" "),
                step.action,
            );
        }

        if result.accepted {
            if let Some(tree) = &result.tree {
                println!("\naccepted; parse tree:\n{}", tree);
            }
        } else if let Some(error) = &result.error {
            println!("\nrejected: {}", error);
        }
    }

    Ok(())
}
