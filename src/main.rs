use std::{fs, io::Read, path::PathBuf, process::ExitCode};

use clap::{Parser, ValueEnum};
use log::info;

use ll1_analyzer::{grammar::END_MARK, Grammar};

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Output {
    /// Productions
    Prod,
    /// Nullable, first and follow sets
    Ff,
    /// LL(1) parsing table
    Ll1,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Plain,
    Latex,
    Json,
}

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// What to print
    #[arg(value_enum)]
    outputs: Vec<Output>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Plain)]
    format: OutputFormat,

    /// Strings to recognize from the axiom (`$` is appended when missing)
    #[arg(short, long, value_name = "INPUT")]
    analyze: Vec<String>,

    /// File containing the grammar (default: stdin)
    #[arg(short = 'g', long)]
    grammar: Option<PathBuf>,
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let input = match &cli.grammar {
        Some(path) => fs::read_to_string(path)?,
        None => {
            let mut s = String::new();
            std::io::stdin().read_to_string(&mut s)?;
            s
        }
    };

    let g = Grammar::parse(&input)?;
    info!(
        "read grammar with {} productions, axiom {}",
        g.productions().len(),
        g.axiom()
    );

    for output in &cli.outputs {
        let text = match output {
            Output::Prod => {
                let t = g.to_production_output_vec();
                match cli.format {
                    OutputFormat::Plain => t.to_plaintext(),
                    OutputFormat::Latex => t.to_latex(),
                    OutputFormat::Json => serde_json::to_string(&t)?,
                }
            }
            Output::Ff => {
                let t = g.to_non_terminal_output_vec();
                match cli.format {
                    OutputFormat::Plain => t.to_plaintext(),
                    OutputFormat::Latex => t.to_latex(),
                    OutputFormat::Json => t.to_json()?,
                }
            }
            Output::Ll1 => match g.get_ll1_table() {
                Some(table) => {
                    let t = table.to_parsing_table_output();
                    match cli.format {
                        OutputFormat::Plain => t.to_plaintext(),
                        OutputFormat::Latex => t.to_latex(),
                        OutputFormat::Json => serde_json::to_string(&t)?,
                    }
                }
                None => "The grammar is not LL(1).".to_string(),
            },
        };
        println!("{}", text);
    }

    if !cli.analyze.is_empty() {
        let table = g.get_ll1_table().ok_or("the grammar is not LL(1)")?;
        for s in &cli.analyze {
            let s = if s.ends_with(END_MARK) {
                s.clone()
            } else {
                format!("{}{}", s, END_MARK)
            };
            match table.analyze(&s, g.axiom()) {
                Ok(tree) => println!("{}: accepted, {}", s, tree),
                Err(e) => println!("{}: rejected, {}", s, e),
            }
        }
    }

    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();

    let cli = Cli::parse();
    if cli.outputs.is_empty() && cli.analyze.is_empty() {
        eprintln!("nothing to do, see --help");
        return ExitCode::FAILURE;
    }

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
