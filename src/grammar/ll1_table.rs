use std::collections::{btree_map::Entry, BTreeMap, BTreeSet};

use log::debug;
use serde::Serialize;

use super::{
    error::{Error, Result},
    grammar::{check_alphabets, Production},
    Grammar, END_MARK, EPSILON,
};

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct TableCell {
    pub non_terminal: char,
    pub terminal: char,
    pub right: Vec<char>,
}

impl TableCell {
    pub fn new(non_terminal: char, terminal: char, right: &str) -> Self {
        Self {
            non_terminal,
            terminal,
            right: right.chars().collect(),
        }
    }
}

/// Prediction table of an LL(1) grammar: at most one right hand side per
/// `(non terminal, terminal)` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LL1Table {
    pub(super) terminals: BTreeSet<char>,
    pub(super) non_terminals: BTreeSet<char>,
    pub(super) cells: BTreeMap<(char, char), Vec<char>>,
}

impl LL1Table {
    pub fn new(
        non_terminals: impl IntoIterator<Item = char>,
        terminals: impl IntoIterator<Item = char>,
        cells: impl IntoIterator<Item = TableCell>,
    ) -> Result<Self> {
        let non_terminals: BTreeSet<char> = non_terminals.into_iter().collect();
        let terminals: BTreeSet<char> = terminals.into_iter().collect();
        check_alphabets(&terminals, &non_terminals, &[EPSILON])?;

        let mut table = Self {
            terminals,
            non_terminals,
            cells: BTreeMap::new(),
        };
        for cell in cells {
            table.check_cell(&cell)?;
            table
                .cells
                .insert((cell.non_terminal, cell.terminal), cell.right);
        }
        Ok(table)
    }

    fn check_cell(&self, cell: &TableCell) -> Result<()> {
        if !self.non_terminals.contains(&cell.non_terminal) {
            return Err(Error::InvalidGrammar(format!(
                "cell ({}, {}): `{}` is not included in the set of non terminals",
                cell.non_terminal, cell.terminal, cell.non_terminal
            )));
        }
        if !self.terminals.contains(&cell.terminal) {
            return Err(Error::InvalidGrammar(format!(
                "cell ({}, {}): `{}` is not included in the set of terminals",
                cell.non_terminal, cell.terminal, cell.terminal
            )));
        }
        if let Some(s) = cell
            .right
            .iter()
            .find(|s| !self.terminals.contains(s) && !self.non_terminals.contains(s))
        {
            return Err(Error::InvalidGrammar(format!(
                "cell ({}, {}): invalid symbol `{}`",
                cell.non_terminal, cell.terminal, s
            )));
        }
        Ok(())
    }

    /// Fills an empty cell. Filled cells are never overwritten.
    pub fn add_cell(&mut self, cell: TableCell) -> Result<()> {
        self.check_cell(&cell)?;
        match self.cells.entry((cell.non_terminal, cell.terminal)) {
            Entry::Occupied(_) => Err(Error::RepeatedCell {
                non_terminal: cell.non_terminal,
                terminal: cell.terminal,
            }),
            Entry::Vacant(e) => {
                e.insert(cell.right);
                Ok(())
            }
        }
    }

    pub fn terminals(&self) -> &BTreeSet<char> {
        &self.terminals
    }

    pub fn non_terminals(&self) -> &BTreeSet<char> {
        &self.non_terminals
    }

    pub fn cells(&self) -> &BTreeMap<(char, char), Vec<char>> {
        &self.cells
    }

    pub fn get(&self, non_terminal: char, terminal: char) -> Option<&[char]> {
        self.cells
            .get(&(non_terminal, terminal))
            .map(|right| right.as_slice())
    }

    pub fn cell_iter(&self) -> impl Iterator<Item = TableCell> + '_ {
        self.cells.iter().map(|(&(non_terminal, terminal), right)| TableCell {
            non_terminal,
            terminal,
            right: right.clone(),
        })
    }
}

/// Returns `false` on a conflict: the key already predicts another right hand side.
fn place(
    cells: &mut BTreeMap<(char, char), Vec<char>>,
    production: &Production,
    terminal: char,
) -> bool {
    match cells.entry((production.left, terminal)) {
        Entry::Occupied(e) => {
            if e.get() != &production.right {
                debug!(
                    "LL(1) conflict at ({}, {}): {} -> {} vs {}",
                    production.left,
                    terminal,
                    production.left,
                    e.get().iter().collect::<String>(),
                    production
                );
                return false;
            }
            true
        }
        Entry::Vacant(e) => {
            e.insert(production.right.clone());
            true
        }
    }
}

impl Grammar {
    /// Builds the LL(1) table, or `None` when two productions compete for a cell.
    pub fn get_ll1_table(&self) -> Option<LL1Table> {
        let mut cells: BTreeMap<(char, char), Vec<char>> = BTreeMap::new();

        for production in self.productions() {
            let first = self.first_of(&production.right).ok()?;
            let follow = if first.contains(&EPSILON) {
                self.compute_follow(production.left).ok()?
            } else {
                BTreeSet::new()
            };

            for terminal in first
                .iter()
                .copied()
                .filter(|&t| t != EPSILON)
                .chain(follow)
            {
                if !place(&mut cells, production, terminal) {
                    return None;
                }
            }
        }

        let terminals = self
            .terminals()
            .iter()
            .copied()
            .chain(std::iter::once(END_MARK));
        let cells = cells
            .into_iter()
            .map(|((non_terminal, terminal), right)| TableCell {
                non_terminal,
                terminal,
                right,
            });
        match LL1Table::new(self.non_terminals().iter().copied(), terminals, cells) {
            Ok(table) => Some(table),
            Err(e) => {
                debug!("built table failed validation: {}", e);
                None
            }
        }
    }

    pub fn is_ll1(&self) -> bool {
        self.get_ll1_table().is_some()
    }
}
