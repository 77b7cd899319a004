use std::collections::BTreeSet;

use super::{
    error::{Error, Result},
    Grammar, Production,
};

impl Grammar {
    /// Reads a grammar written one production per line, e.g.
    ///
    /// ```text
    /// E -> TX
    /// X -> +E
    /// X ->
    /// ```
    ///
    /// Left sides are the non terminals, every other symbol is a terminal and
    /// the first left side is the axiom. An empty right side is epsilon.
    pub fn parse(grammar: &str) -> Result<Self> {
        let mut productions: Vec<Production> = Vec::new();

        for (i, line) in grammar.lines().enumerate() {
            if line.chars().all(|c| c.is_whitespace()) {
                continue;
            }
            let parts: Vec<&str> = line.split("->").collect();
            if parts.len() > 2 {
                return Err(Error::Notation {
                    line: i + 1,
                    message: "too many \"->\"".to_string(),
                });
            } else if parts.len() < 2 {
                return Err(Error::Notation {
                    line: i + 1,
                    message: "missing \"->\"".to_string(),
                });
            }

            let left_str = parts[0].trim();
            let mut left_chars = left_str.chars();
            let left = match (left_chars.next(), left_chars.next()) {
                (Some(c), None) => c,
                (None, _) => {
                    return Err(Error::Notation {
                        line: i + 1,
                        message: "empty left side".to_string(),
                    })
                }
                _ => {
                    return Err(Error::Notation {
                        line: i + 1,
                        message: format!("left side `{}` is not a single symbol", left_str),
                    })
                }
            };

            productions.push(Production {
                left,
                right: parts[1].chars().filter(|c| !c.is_whitespace()).collect(),
            });
        }

        let axiom = match productions.first() {
            Some(p) => p.left,
            None => return Err(Error::InvalidGrammar("no productions".to_string())),
        };

        let non_terminals: BTreeSet<char> = productions.iter().map(|p| p.left).collect();
        let terminals: BTreeSet<char> = productions
            .iter()
            .flat_map(|p| p.right.iter().copied())
            .filter(|s| !non_terminals.contains(s))
            .collect();

        Grammar::new(terminals, non_terminals, productions, axiom)
    }
}
