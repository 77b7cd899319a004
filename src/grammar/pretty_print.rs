use std::collections::BTreeSet;

use crowbook_text_processing::escape;
use serde::Serialize;

use super::{Grammar, LL1Table, EPSILON};

fn right_to_string(right: &[char]) -> String {
    if right.is_empty() {
        EPSILON.to_string()
    } else {
        right.iter().collect()
    }
}

fn symbol_to_latex(s: char, terminals: &BTreeSet<char>) -> String {
    if s == EPSILON {
        "\\epsilon".to_string()
    } else if terminals.contains(&s) {
        format!("\\text{{{}}}", escape::tex(s.to_string()))
    } else {
        escape::tex(s.to_string()).to_string()
    }
}

fn right_to_latex(right: &[char], terminals: &BTreeSet<char>) -> String {
    if right.is_empty() {
        return "\\epsilon".to_string();
    }
    right
        .iter()
        .map(|&s| symbol_to_latex(s, terminals))
        .collect::<Vec<_>>()
        .join(" \\ ")
}

#[derive(Debug, Clone, Serialize)]
pub struct ProductionOutput<'a> {
    pub left: char,
    pub rights: Vec<&'a [char]>,
}

impl ProductionOutput<'_> {
    pub fn to_plaintext(&self, multiline: bool) -> String {
        self.rights
            .iter()
            .map(|right| right_to_string(right))
            .enumerate()
            .map(|(i, right)| {
                if i == 0 {
                    format!("{} -> {}", self.left, right)
                } else if multiline {
                    format!("   | {}", right)
                } else {
                    format!(" | {}", right)
                }
            })
            .collect::<Vec<_>>()
            .join(if multiline { "\n" } else { "" })
    }

    pub fn to_latex(&self, and_sign: bool, terminals: &BTreeSet<char>) -> String {
        if self.rights.is_empty() {
            return String::new();
        }

        let left = if and_sign {
            format!("{} & \\rightarrow &", escape::tex(self.left.to_string()))
        } else {
            format!("{} \\rightarrow ", escape::tex(self.left.to_string()))
        };
        let right = self
            .rights
            .iter()
            .map(|right| right_to_latex(right, terminals))
            .collect::<Vec<_>>()
            .join(" \\mid ");

        left + &right
    }
}

#[derive(Serialize)]
pub struct ProductionOutputVec<'a> {
    productions: Vec<ProductionOutput<'a>>,
    #[serde(skip)]
    terminals: &'a BTreeSet<char>,
}

impl ProductionOutputVec<'_> {
    pub fn to_plaintext(&self) -> String {
        self.productions
            .iter()
            .map(|s| s.to_plaintext(true))
            .collect::<Vec<String>>()
            .join("\n")
    }

    pub fn to_latex(&self) -> String {
        std::iter::once("\\[\\begin{array}{cll}".to_string())
            .chain(
                self.productions
                    .iter()
                    .map(|s| s.to_latex(true, self.terminals)),
            )
            .chain(std::iter::once("\\end{array}\\]".to_string()))
            .collect::<Vec<String>>()
            .join("\\\\\n")
    }
}

impl Grammar {
    /// Productions grouped by left side, non terminals in order of definition.
    pub fn to_production_output_vec(&self) -> ProductionOutputVec<'_> {
        let mut productions = Vec::new();
        for non_terminal in self.non_terminal_iter() {
            let rights: Vec<&[char]> = self
                .productions()
                .iter()
                .filter(|p| p.left == non_terminal.name)
                .map(|p| p.right.as_slice())
                .collect();
            if !rights.is_empty() {
                productions.push(ProductionOutput {
                    left: non_terminal.name,
                    rights,
                });
            }
        }
        ProductionOutputVec {
            productions,
            terminals: self.terminals(),
        }
    }
}

#[derive(Serialize)]
struct NonTerminalOutput {
    name: char,
    nullable: bool,
    first: Vec<char>,
    follow: Vec<char>,
}

impl NonTerminalOutput {
    fn to_plaintext(&self) -> String {
        fn f(a: &[char]) -> String {
            a.iter()
                .map(|s| s.to_string())
                .collect::<Vec<_>>()
                .join(", ")
        }

        format!(
            "{} | {} | {} | {}",
            self.name,
            self.nullable,
            f(&self.first),
            f(&self.follow)
        )
    }

    fn to_latex(&self) -> String {
        fn f(a: &[char]) -> String {
            a.iter()
                .map(|&s| {
                    if s == EPSILON {
                        r"$\epsilon$".to_string()
                    } else {
                        escape::tex(s.to_string()).to_string()
                    }
                })
                .collect::<Vec<_>>()
                .join(r"\ ")
        }

        format!(
            "{} & {} & {} & {}",
            escape::tex(self.name.to_string()),
            self.nullable,
            f(&self.first),
            f(&self.follow)
        )
    }
}

#[derive(Serialize)]
pub struct NonTerminalOutputVec {
    data: Vec<NonTerminalOutput>,
}

impl NonTerminalOutputVec {
    pub fn to_plaintext(&self) -> String {
        self.data
            .iter()
            .map(|s| s.to_plaintext())
            .collect::<Vec<String>>()
            .join("\n")
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn to_latex(&self) -> String {
        let content = self
            .data
            .iter()
            .map(|e| e.to_latex())
            .collect::<Vec<_>>()
            .join("\\\\\n ");

        "\\begin{tabular}{c|c|c|c}\n".to_string()
            + "Symbol & Nullable & First & Follow\\\\\\hline\n"
            + &content
            + "\\\\\n\\end{tabular}"
    }
}

impl Grammar {
    pub fn to_non_terminal_output_vec(&self) -> NonTerminalOutputVec {
        let data = self
            .non_terminal_iter()
            .map(|non_terminal| {
                let mut first: Vec<char> = non_terminal.first.iter().copied().collect();
                if non_terminal.nullable {
                    first.push(EPSILON);
                }
                NonTerminalOutput {
                    name: non_terminal.name,
                    nullable: non_terminal.nullable,
                    first,
                    follow: non_terminal.follow.iter().copied().collect(),
                }
            })
            .collect();
        NonTerminalOutputVec { data }
    }
}

#[derive(Serialize)]
pub struct LL1ParsingTable<'a> {
    terminals: Vec<char>,
    rows: Vec<(char, Vec<Option<&'a [char]>>)>,
    #[serde(skip)]
    terminal_set: &'a BTreeSet<char>,
}

impl LL1ParsingTable<'_> {
    pub fn to_plaintext(&self) -> String {
        let mut header: Vec<String> = vec![String::new()];
        header.extend(self.terminals.iter().map(|t| t.to_string()));
        let mut output: Vec<Vec<String>> = vec![header];
        for (left, row) in &self.rows {
            let mut line: Vec<String> = vec![left.to_string()];
            line.extend(row.iter().map(|right| match right {
                Some(right) => format!("{} -> {}", left, right_to_string(right)),
                None => String::new(),
            }));
            output.push(line);
        }

        let width: Vec<usize> = (0..output[0].len())
            .map(|j| {
                output
                    .iter()
                    .map(|line| line[j].chars().count())
                    .max()
                    .unwrap_or(0)
            })
            .collect();
        output
            .iter()
            .map(|line| {
                line.iter()
                    .enumerate()
                    .map(|(i, s)| format!("{:>width$}", s, width = width[i]))
                    .collect::<Vec<_>>()
                    .join(" | ")
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn to_latex(&self) -> String {
        let mut header: Vec<String> = vec![format!(
            "\\[\\begin{{array}}{{c{}}}\n",
            "|l".repeat(self.terminals.len()),
        )];
        header.extend(
            self.terminals
                .iter()
                .map(|&t| format!("\\text{{{}}}", escape::tex(t.to_string()))),
        );
        let header = header.join(" & ");

        let mut output: Vec<String> = Vec::new();
        for (left, row) in &self.rows {
            let mut line: Vec<String> = vec![escape::tex(left.to_string()).to_string()];
            line.extend(row.iter().map(|right| match right {
                Some(right) => format!(
                    "{} \\rightarrow {}",
                    escape::tex(left.to_string()),
                    right_to_latex(right, self.terminal_set)
                ),
                None => String::new(),
            }));
            output.push(line.join(" & "));
        }

        let output = output.join("\\\\\n");

        header + "\\\\\\hline\n" + &output + "\n\\end{array}\\]"
    }
}

impl LL1Table {
    pub fn to_parsing_table_output(&self) -> LL1ParsingTable<'_> {
        let terminals: Vec<char> = self.terminals.iter().copied().collect();
        let rows: Vec<(char, Vec<Option<&[char]>>)> = self
            .non_terminals
            .iter()
            .map(|&nt| {
                let row: Vec<Option<&[char]>> = terminals.iter().map(|&t| self.get(nt, t)).collect();
                (nt, row)
            })
            .collect();
        LL1ParsingTable {
            terminals,
            rows,
            terminal_set: &self.terminals,
        }
    }
}
