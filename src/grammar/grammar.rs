use std::{
    collections::{BTreeSet, HashMap},
    fmt,
};

use serde::Serialize;

use super::{
    error::{Error, Result},
    END_MARK, EPSILON,
};

/// A rewrite rule `left -> right`. An empty `right` is an epsilon production.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Production {
    pub left: char,
    pub right: Vec<char>,
}

impl Production {
    pub fn new(left: char, right: &str) -> Self {
        Self {
            left,
            right: right.chars().collect(),
        }
    }

    pub fn is_epsilon(&self) -> bool {
        self.right.is_empty()
    }
}

impl fmt::Display for Production {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_epsilon() {
            write!(f, "{} -> {}", self.left, EPSILON)
        } else {
            write!(f, "{} -> {}", self.left, self.right.iter().collect::<String>())
        }
    }
}

#[derive(Debug, Clone)]
pub struct NonTerminal {
    pub name: char,
    pub first: BTreeSet<char>,
    pub follow: BTreeSet<char>,
    pub nullable: bool,
    pub productions: Vec<Vec<usize>>,
}

impl NonTerminal {
    pub fn new(name: char) -> Self {
        Self {
            name,
            first: BTreeSet::new(),
            follow: BTreeSet::new(),
            nullable: false,
            productions: Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub enum Symbol {
    NonTerminal(NonTerminal),
    Terminal(char),
}

impl Symbol {
    pub fn non_terminal(&self) -> Option<&NonTerminal> {
        match self {
            Symbol::NonTerminal(e) => Some(e),
            Symbol::Terminal(_) => None,
        }
    }

    pub fn mut_non_terminal(&mut self) -> Option<&mut NonTerminal> {
        match self {
            Symbol::NonTerminal(e) => Some(e),
            Symbol::Terminal(_) => None,
        }
    }

    pub fn name(&self) -> char {
        match self {
            Symbol::NonTerminal(e) => e.name,
            Symbol::Terminal(c) => *c,
        }
    }
}

/// A validated context-free grammar over single-character symbols.
///
/// Nullable, FIRST and FOLLOW information is computed once when the grammar
/// is built; the grammar cannot be changed afterwards.
#[derive(Debug, Clone)]
pub struct Grammar {
    terminals: BTreeSet<char>,
    non_terminals: BTreeSet<char>,
    productions: Vec<Production>,
    axiom: char,
    pub(super) symbols: Vec<Symbol>,
    pub(super) symbol_table: HashMap<char, usize>,
}

/// Rejects alphabets that overlap or use one of the reserved markers.
pub(super) fn check_alphabets(
    terminals: &BTreeSet<char>,
    non_terminals: &BTreeSet<char>,
    reserved: &[char],
) -> Result<()> {
    if let Some(c) = terminals.intersection(non_terminals).next() {
        return Err(Error::InvalidGrammar(format!(
            "`{}` is both a terminal and a non terminal; the alphabets must be disjoint",
            c
        )));
    }
    if let Some(c) = terminals
        .iter()
        .chain(non_terminals.iter())
        .find(|c| reserved.contains(c))
    {
        return Err(Error::InvalidGrammar(format!(
            "`{}` is a reserved symbol",
            c
        )));
    }
    Ok(())
}

impl Grammar {
    pub fn new(
        terminals: impl IntoIterator<Item = char>,
        non_terminals: impl IntoIterator<Item = char>,
        productions: Vec<Production>,
        axiom: char,
    ) -> Result<Self> {
        let terminals: BTreeSet<char> = terminals.into_iter().collect();
        let non_terminals: BTreeSet<char> = non_terminals.into_iter().collect();

        check_alphabets(&terminals, &non_terminals, &[END_MARK, EPSILON])?;

        if !non_terminals.contains(&axiom) {
            return Err(Error::InvalidGrammar(format!(
                "axiom `{}` is not included in the set of non terminals",
                axiom
            )));
        }

        for p in &productions {
            if !non_terminals.contains(&p.left) {
                return Err(Error::InvalidGrammar(format!(
                    "{}: left symbol `{}` is not included in the set of non terminals",
                    p, p.left
                )));
            }
            if let Some(s) = p
                .right
                .iter()
                .find(|s| !terminals.contains(s) && !non_terminals.contains(s))
            {
                return Err(Error::InvalidGrammar(format!(
                    "{}: invalid symbol `{}`",
                    p, s
                )));
            }
        }

        let mut g = Self {
            terminals,
            non_terminals,
            productions,
            axiom,
            symbols: Vec::new(),
            symbol_table: HashMap::new(),
        };

        // Non terminals in order of first definition, then the ones without productions.
        let defined: Vec<char> = g.productions.iter().map(|p| p.left).collect();
        let ordered: Vec<char> = std::iter::once(g.axiom)
            .chain(defined)
            .chain(g.non_terminals.iter().copied())
            .collect();
        for name in ordered {
            if !g.symbol_table.contains_key(&name) {
                g.add_non_terminal(name);
            }
        }
        let terminals: Vec<char> = g.terminals.iter().copied().collect();
        for name in terminals {
            g.add_terminal(name);
        }

        for i in 0..g.productions.len() {
            let left = g.symbol_table[&g.productions[i].left];
            let right: Vec<usize> = g.productions[i]
                .right
                .iter()
                .map(|s| g.symbol_table[s])
                .collect();
            g.add_production(left, right);
        }

        g.calculate_nullable_first_follow();

        Ok(g)
    }

    pub fn terminals(&self) -> &BTreeSet<char> {
        &self.terminals
    }

    pub fn non_terminals(&self) -> &BTreeSet<char> {
        &self.non_terminals
    }

    pub fn productions(&self) -> &[Production] {
        &self.productions
    }

    pub fn axiom(&self) -> char {
        self.axiom
    }

    pub fn terminal_iter(&self) -> impl Iterator<Item = char> + '_ {
        self.symbols.iter().filter_map(|s| {
            if let Symbol::Terminal(name) = s {
                Some(*name)
            } else {
                None
            }
        })
    }

    pub fn non_terminal_iter(&self) -> impl Iterator<Item = &NonTerminal> {
        self.symbols.iter().filter_map(|s| s.non_terminal())
    }

    pub fn get_symbol_index(&self, name: char) -> Option<usize> {
        self.symbol_table.get(&name).cloned()
    }

    pub fn get_symbol_name(&self, index: usize) -> char {
        self.symbols[index].name()
    }

    pub fn non_terminal(&self, name: char) -> Option<&NonTerminal> {
        self.get_symbol_index(name)
            .and_then(|idx| self.symbols[idx].non_terminal())
    }

    fn add_non_terminal(&mut self, name: char) -> usize {
        let idx = self.symbols.len();
        self.symbols
            .push(Symbol::NonTerminal(NonTerminal::new(name)));
        self.symbol_table.insert(name, idx);
        idx
    }

    fn add_terminal(&mut self, name: char) -> usize {
        let idx = self.symbols.len();
        self.symbols.push(Symbol::Terminal(name));
        self.symbol_table.insert(name, idx);
        idx
    }

    fn add_production(&mut self, left: usize, right: Vec<usize>) {
        if let Some(nt) = self.symbols[left].mut_non_terminal() {
            nt.productions.push(right);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expression_productions() -> Vec<Production> {
        vec![
            Production::new('E', "TX"),
            Production::new('X', "+E"),
            Production::new('X', ""),
            Production::new('T', "iY"),
            Production::new('T', "(E)"),
            Production::new('Y', "*T"),
            Production::new('Y', ""),
        ]
    }

    #[test]
    fn valid_grammar() {
        let g = Grammar::new(
            "()i+*".chars(),
            "ETXY".chars(),
            expression_productions(),
            'E',
        )
        .unwrap();

        assert_eq!(g.axiom(), 'E');
        assert_eq!(g.productions().len(), 7);
        assert_eq!(g.non_terminal_iter().count(), 4);
        assert_eq!(g.terminal_iter().collect::<String>(), "()*+i");
        assert_eq!(g.non_terminal('X').unwrap().productions.len(), 2);
        assert!(g.non_terminal('i').is_none());
        assert_eq!(g.get_symbol_name(g.get_symbol_index('T').unwrap()), 'T');
    }

    #[test]
    fn overlapping_alphabets() {
        let r = Grammar::new(
            "()i+*E".chars(),
            "ETXY".chars(),
            expression_productions(),
            'E',
        );
        assert!(matches!(r, Err(Error::InvalidGrammar(_))));
    }

    #[test]
    fn axiom_must_be_a_non_terminal() {
        let r = Grammar::new(
            "()i+*".chars(),
            "ETXY".chars(),
            expression_productions(),
            'i',
        );
        assert!(matches!(r, Err(Error::InvalidGrammar(_))));
    }

    #[test]
    fn undeclared_symbols() {
        let mut productions = expression_productions();
        productions.push(Production::new('Z', "i"));
        let r = Grammar::new("()i+*".chars(), "ETXY".chars(), productions, 'E');
        assert!(matches!(r, Err(Error::InvalidGrammar(_))));

        let mut productions = expression_productions();
        productions.push(Production::new('X', "-E"));
        let r = Grammar::new("()i+*".chars(), "ETXY".chars(), productions, 'E');
        assert!(matches!(r, Err(Error::InvalidGrammar(_))));
    }

    #[test]
    fn reserved_symbols() {
        let r = Grammar::new("a$".chars(), "S".chars(), vec![Production::new('S', "a")], 'S');
        assert!(matches!(r, Err(Error::InvalidGrammar(_))));

        let r = Grammar::new("a".chars(), "Sε".chars(), vec![Production::new('S', "a")], 'S');
        assert!(matches!(r, Err(Error::InvalidGrammar(_))));
    }

    #[test]
    fn production_display() {
        assert_eq!(Production::new('E', "TX").to_string(), "E -> TX");
        assert_eq!(Production::new('X', "").to_string(), "X -> ε");
        assert_eq!(Production::new('X', ""), Production::new('X', ""));
        assert!(Production::new('X', "").is_epsilon());
    }
}
