use std::fmt;

use log::{debug, trace};
use serde::Serialize;

use super::{
    error::{Error, Result},
    LL1Table, END_MARK, EPSILON,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParseTree {
    pub root: char,
    pub children: Vec<ParseTree>,
}

impl ParseTree {
    pub fn new(root: char) -> Self {
        Self {
            root,
            children: Vec::new(),
        }
    }

    pub fn with_children(root: char, children: Vec<ParseTree>) -> Self {
        Self { root, children }
    }

    pub fn add_children(&mut self, children: Vec<ParseTree>) {
        self.children = children;
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Leaves left to right, epsilon leaves skipped.
    pub fn leaves(&self) -> String {
        if self.is_leaf() {
            if self.root == EPSILON {
                String::new()
            } else {
                self.root.to_string()
            }
        } else {
            self.children.iter().map(|c| c.leaves()).collect()
        }
    }
}

impl fmt::Display for ParseTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.root)?;
        if !self.is_leaf() {
            write!(f, "(")?;
            for (i, child) in self.children.iter().enumerate() {
                if i != 0 {
                    write!(f, " ")?;
                }
                write!(f, "{}", child)?;
            }
            write!(f, ")")?;
        }
        Ok(())
    }
}

struct Node {
    label: char,
    children: Vec<usize>,
}

fn push_node(nodes: &mut Vec<Node>, label: char) -> usize {
    nodes.push(Node {
        label,
        children: Vec::new(),
    });
    nodes.len() - 1
}

fn build_tree(nodes: &[Node], idx: usize) -> ParseTree {
    ParseTree {
        root: nodes[idx].label,
        children: nodes[idx]
            .children
            .iter()
            .map(|&c| build_tree(nodes, c))
            .collect(),
    }
}

impl LL1Table {
    /// Recognizes `input`, which has to end with the end marker `$`, starting
    /// from `start`.
    ///
    /// Non terminals on top of the stack are expanded with the cell predicted
    /// by the current input symbol; terminals pushed by an expansion must match
    /// it. The start symbol itself always goes through the table.
    pub fn analyze(&self, input: &str, start: char) -> Result<ParseTree> {
        let input: Vec<char> = input.chars().collect();
        let mut cursor: usize = 0;

        let mut nodes: Vec<Node> = Vec::new();
        let root = push_node(&mut nodes, start);
        // top of the stack is the last element
        let mut stack: Vec<usize> = vec![root];

        while let (Some(&top), Some(&current)) = (stack.last(), input.get(cursor)) {
            let symbol = nodes[top].label;
            trace!("stack top `{}`, input `{}` at {}", symbol, current, cursor);

            if top != root && self.terminals.contains(&symbol) {
                if symbol != current {
                    debug!("rejected: expected `{}`, found `{}`", symbol, current);
                    return Err(Error::Syntax(format!(
                        "expected `{}` but found `{}` at position {}",
                        symbol, current, cursor
                    )));
                }
                stack.pop();
                cursor += 1;
                continue;
            }

            let right = self.cells.get(&(symbol, current)).ok_or_else(|| {
                debug!("rejected: no prediction for ({}, {})", symbol, current);
                Error::Syntax(format!(
                    "no prediction for ({}, {}) at position {}",
                    symbol, current, cursor
                ))
            })?;

            stack.pop();
            if right.is_empty() {
                let leaf = push_node(&mut nodes, EPSILON);
                nodes[top].children.push(leaf);
            } else {
                let children: Vec<usize> = right
                    .iter()
                    .map(|&s| push_node(&mut nodes, s))
                    .collect();
                stack.extend(children.iter().rev());
                nodes[top].children = children;
            }
        }

        if input[cursor..] != [END_MARK] {
            let rest: String = input[cursor..].iter().collect();
            debug!("rejected: input left over `{}`", rest);
            return Err(Error::Syntax(format!(
                "input not consumed down to the end marker, `{}` left",
                rest
            )));
        }

        Ok(build_tree(&nodes, root))
    }
}

#[cfg(test)]
mod tests {
    use crate::grammar::{Error, Grammar, LL1Table, ParseTree, TableCell, EPSILON};

    fn expression_table() -> LL1Table {
        LL1Table::new(
            "ETXY".chars(),
            "()i+*$".chars(),
            vec![
                TableCell::new('E', '(', "TX"),
                TableCell::new('E', 'i', "TX"),
                TableCell::new('T', '(', "(E)"),
                TableCell::new('T', 'i', "iY"),
                TableCell::new('X', '+', "+E"),
                TableCell::new('X', ')', ""),
                TableCell::new('X', '$', ""),
                TableCell::new('Y', '*', "*T"),
                TableCell::new('Y', '+', ""),
                TableCell::new('Y', ')', ""),
                TableCell::new('Y', '$', ""),
            ],
        )
        .unwrap()
    }

    fn check_analyze(table: &LL1Table, input: &str, start: char, accepted: bool) {
        let r = table.analyze(input, start);
        if accepted {
            assert!(r.is_ok(), "{} should be accepted: {:?}", input, r);
        } else {
            assert!(
                matches!(r, Err(Error::Syntax(_))),
                "{} should be rejected: {:?}",
                input,
                r
            );
        }
    }

    #[test]
    fn from_table() {
        let table = expression_table();

        check_analyze(&table, "i*i$", 'E', true);
        check_analyze(&table, "i*i+i$", 'E', true);
        check_analyze(&table, "i*i+i+(i*i)$", 'E', true);
        check_analyze(&table, "a", 'E', false);
        check_analyze(&table, "(i$", 'E', false);
        check_analyze(&table, "i*i$i", 'E', false);
        check_analyze(&table, "i*i", 'E', false);
        check_analyze(&table, "+i*i", 'E', false);
        check_analyze(&table, "", 'E', false);
        check_analyze(&table, "$", 'E', false);
    }

    #[test]
    fn from_grammar() {
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
        let table = g.get_ll1_table().unwrap();

        check_analyze(&table, "i*i$", 'E', true);
        check_analyze(&table, "i*i+i$", 'E', true);
        check_analyze(&table, "i*i+i+(i*i)$", 'E', true);
        check_analyze(&table, "((i))$", 'E', true);
        check_analyze(&table, "a", 'E', false);
        check_analyze(&table, "(i$", 'E', false);
        check_analyze(&table, "i*i$i", 'E', false);
        check_analyze(&table, "i*i", 'E', false);
        check_analyze(&table, "+i*i", 'E', false);

        // T alone derives i*i but not i+i
        check_analyze(&table, "i*i$", 'T', true);
        check_analyze(&table, "i+i$", 'T', false);
    }

    #[test]
    fn unknown_start_symbol() {
        let g = Grammar::parse(
            "A->BCD
             B-><
             B->
             C->0C
             C->1C
             D->0>
             D->1>",
        )
        .unwrap();
        let table = g.get_ll1_table().unwrap();

        check_analyze(&table, "0", 'E', false);
        check_analyze(&table, "<0101;;;;1>", 'E', false);
    }

    #[test]
    fn terminal_start_symbol() {
        let table = expression_table();

        check_analyze(&table, "i$", 'i', false);
        assert_eq!(
            table.analyze("i$", 'i'),
            Err(Error::Syntax(
                "no prediction for (i, i) at position 0".to_string()
            ))
        );
    }

    #[test]
    fn consecutive_terminals() {
        let g = Grammar::parse("S -> (ab)S\nS ->").unwrap();
        let table = g.get_ll1_table().unwrap();

        check_analyze(&table, "(ab)(ab)$", 'S', true);
        check_analyze(&table, "$", 'S', true);
        check_analyze(&table, "(ab(ab)$", 'S', false);
    }

    #[test]
    fn syntax_error_messages() {
        let table = expression_table();
        assert_eq!(
            table.analyze("+i*i", 'E'),
            Err(Error::Syntax(
                "no prediction for (E, +) at position 0".to_string()
            ))
        );
        assert_eq!(
            table.analyze("i*i", 'E'),
            Err(Error::Syntax(
                "input not consumed down to the end marker, `` left".to_string()
            ))
        );
    }

    #[test]
    fn parse_tree() {
        let table = expression_table();

        let epsilon = || ParseTree::new(EPSILON);
        let t = ParseTree::with_children;
        let i = || ParseTree::new('i');

        let expected = t(
            'E',
            vec![
                t(
                    'T',
                    vec![
                        i(),
                        t(
                            'Y',
                            vec![
                                ParseTree::new('*'),
                                t('T', vec![i(), t('Y', vec![epsilon()])]),
                            ],
                        ),
                    ],
                ),
                t('X', vec![epsilon()]),
            ],
        );

        let tree = table.analyze("i*i$", 'E').unwrap();
        assert_eq!(tree, expected);
        assert_eq!(tree.leaves(), "i*i");
        assert_eq!(tree.to_string(), "E(T(i Y(* T(i Y(ε)))) X(ε))");

        let mut x = ParseTree::new('X');
        x.add_children(vec![epsilon()]);
        assert_eq!(tree.children[1], x);
        assert!(tree.children[0].children[0].is_leaf());
    }

    #[test]
    fn deterministic() {
        let table = expression_table();
        for input in ["i*i+i$", "(i$", "i+$"] {
            assert_eq!(table.analyze(input, 'E'), table.analyze(input, 'E'));
        }
    }
}
