use std::collections::BTreeSet;

use super::{
    error::{Error, Result},
    grammar::Symbol,
    Grammar, END_MARK, EPSILON,
};

impl Grammar {
    pub(super) fn calculate_nullable_first_follow(&mut self) {
        self.calculate_nullable();
        self.calculate_first();
        self.calculate_follow();
    }

    /// FIRST set of `sentence`, with [`EPSILON`] in it when the whole sentence
    /// can derive the empty string.
    pub fn compute_first(&self, sentence: &str) -> Result<BTreeSet<char>> {
        let symbols: Vec<char> = sentence.chars().collect();
        self.first_of(&symbols)
    }

    /// FOLLOW set of a non terminal. The end marker `$` follows the axiom.
    pub fn compute_follow(&self, symbol: char) -> Result<BTreeSet<char>> {
        self.non_terminal(symbol)
            .map(|nt| nt.follow.clone())
            .ok_or(Error::InvalidSymbol(symbol))
    }

    pub fn is_nullable(&self, symbol: char) -> Result<bool> {
        match self.get_symbol_index(symbol).map(|idx| &self.symbols[idx]) {
            Some(Symbol::NonTerminal(nt)) => Ok(nt.nullable),
            Some(Symbol::Terminal(_)) => Ok(false),
            None => Err(Error::InvalidSymbol(symbol)),
        }
    }

    pub(super) fn first_of(&self, symbols: &[char]) -> Result<BTreeSet<char>> {
        let production = symbols
            .iter()
            .map(|&s| self.get_symbol_index(s).ok_or(Error::InvalidSymbol(s)))
            .collect::<Result<Vec<usize>>>()?;
        Ok(self.calculate_first_for_production(&production))
    }

    fn calculate_nullable(&mut self) {
        let mut changed = true;
        while changed {
            changed = false;
            for i in 0..self.symbols.len() {
                let nullable: bool = match &self.symbols[i] {
                    Symbol::Terminal(_) => continue,
                    Symbol::NonTerminal(nt) => {
                        if nt.nullable {
                            continue;
                        }
                        nt.productions.iter().any(|production| {
                            production.iter().all(|s| match &self.symbols[*s] {
                                Symbol::Terminal(_) => false,
                                Symbol::NonTerminal(e) => e.nullable,
                            })
                        })
                    }
                };

                if nullable {
                    if let Some(nt) = self.symbols[i].mut_non_terminal() {
                        nt.nullable = true;
                        changed = true;
                    }
                }
            }
        }
    }

    /// Scans `production` left to right, falling through nullable non
    /// terminals. Relies on `nullable` and `first` being final.
    pub(super) fn calculate_first_for_production(&self, production: &[usize]) -> BTreeSet<char> {
        let mut first: BTreeSet<char> = BTreeSet::new();
        for symbol in production.iter().map(|i| &self.symbols[*i]) {
            match symbol {
                Symbol::Terminal(t) => {
                    first.insert(*t);
                    return first;
                }
                Symbol::NonTerminal(nt) => {
                    first.extend(nt.first.iter().cloned());
                    if !nt.nullable {
                        return first;
                    }
                }
            }
        }
        first.insert(EPSILON);
        first
    }

    // Least fixed point, so `A -> A` and left recursive rules settle instead of
    // recursing forever.
    fn calculate_first(&mut self) {
        let mut changed = true;
        while changed {
            changed = false;
            for i in 0..self.symbols.len() {
                let first: BTreeSet<char> = match &self.symbols[i] {
                    Symbol::Terminal(_) => continue,
                    Symbol::NonTerminal(nt) => {
                        nt.productions
                            .iter()
                            .fold(BTreeSet::new(), |mut first, production| {
                                first.extend(
                                    self.calculate_first_for_production(production)
                                        .into_iter()
                                        .filter(|&s| s != EPSILON),
                                );
                                first
                            })
                    }
                };

                if let Some(nt) = self.symbols[i].mut_non_terminal() {
                    if nt.first.len() != first.len() {
                        changed = true;
                        nt.first = first;
                    }
                }
            }
        }
    }

    fn calculate_follow(&mut self) {
        if let Some(nt) = self
            .get_symbol_index(self.axiom())
            .and_then(|idx| self.symbols[idx].mut_non_terminal())
        {
            nt.follow.insert(END_MARK);
        }

        let mut changed = true;
        while changed {
            changed = false;
            for left in 0..self.symbols.len() {
                let productions = match self.symbols[left].non_terminal() {
                    Some(nt) => nt.productions.clone(),
                    None => continue,
                };

                for production in &productions {
                    for (i, &idx) in production.iter().enumerate() {
                        if self.symbols[idx].non_terminal().is_none() {
                            continue;
                        }

                        let mut follow = self.calculate_first_for_production(&production[i + 1..]);
                        if follow.remove(&EPSILON) {
                            if let Some(nt) = self.symbols[left].non_terminal() {
                                follow.extend(nt.follow.iter().cloned());
                            }
                        }

                        if let Some(nt) = self.symbols[idx].mut_non_terminal() {
                            let before = nt.follow.len();
                            nt.follow.extend(follow);
                            changed |= nt.follow.len() != before;
                        }
                    }
                }
            }
        }
    }
}


#[cfg(test)]
mod follow_tests {
    use std::collections::BTreeSet;

    use crate::grammar::{Error, Grammar, Production};

    fn set(symbols: &str) -> BTreeSet<char> {
        symbols.chars().collect()
    }

    #[test]
    fn expression_grammar() {
        let g = Grammar::parse(
            "E -> TX
             X -> +E
             X ->
             T -> iY
             T -> (E)
             Y -> *T
             Y ->",
        )
        .unwrap();

        assert_eq!(g.compute_follow('E').unwrap(), set(")$"));
        assert_eq!(g.compute_follow('X').unwrap(), set(")$"));
        assert_eq!(g.compute_follow('T').unwrap(), set("+)$"));
        assert_eq!(g.compute_follow('Y').unwrap(), set("+)$"));
    }

    #[test]
    fn nullable_suffixes() {
        let g = Grammar::parse(
            "T->FGH
             F->Gb
             F->
             G->Nd
             G->
             H->aA
             H->
             N->0N
             N->1N
             N->
             A->a
             A->",
        )
        .unwrap();

        assert_eq!(g.compute_follow('T').unwrap(), set("$"));
        assert_eq!(g.compute_follow('F').unwrap(), set("01ad$"));
        assert_eq!(g.compute_follow('G').unwrap(), set("ab$"));
        assert_eq!(g.compute_follow('N').unwrap(), set("d"));
        assert_eq!(g.compute_follow('H').unwrap(), set("$"));
        assert_eq!(g.compute_follow('A').unwrap(), set("$"));
    }

    #[test]
    fn seeded_from_declared_axiom() {
        // The axiom's production is not the first one.
        let g = Grammar::new(
            "ab".chars(),
            "SA".chars(),
            vec![
                Production::new('A', "a"),
                Production::new('S', "Ab"),
            ],
            'S',
        )
        .unwrap();

        assert_eq!(g.compute_follow('S').unwrap(), set("$"));
        assert_eq!(g.compute_follow('A').unwrap(), set("b"));
    }

    #[test]
    fn not_a_non_terminal() {
        let g = Grammar::parse("S -> a").unwrap();
        assert_eq!(g.compute_follow('a'), Err(Error::InvalidSymbol('a')));
        assert_eq!(g.compute_follow('Q'), Err(Error::InvalidSymbol('Q')));
    }
}
