extern crate wasm_bindgen;

use serde_json::json;
use wasm_bindgen::prelude::*;

pub mod grammar;
pub use grammar::{Error, Grammar, LL1Table, ParseTree, Production, TableCell};

fn error_to_json(e: impl std::fmt::Display) -> String {
    json!({ "error": e.to_string() }).to_string()
}

#[wasm_bindgen]
pub fn first_follow_to_json(grammar: &str) -> String {
    match crate::Grammar::parse(grammar) {
        Ok(g) => match g.to_non_terminal_output_vec().to_json() {
            Ok(s) => s,
            Err(e) => error_to_json(e),
        },
        Err(e) => error_to_json(e),
    }
}

#[wasm_bindgen]
pub fn ll1_table_to_json(grammar: &str) -> String {
    let g = match crate::Grammar::parse(grammar) {
        Ok(g) => g,
        Err(e) => return error_to_json(e),
    };
    match g.get_ll1_table() {
        Some(table) => match serde_json::to_string(&table.to_parsing_table_output()) {
            Ok(s) => s,
            Err(e) => error_to_json(e),
        },
        None => error_to_json("the grammar is not LL(1)"),
    }
}

/// Recognizes `input` from the axiom of `grammar`. `input` must end with `$`.
#[wasm_bindgen]
pub fn analyze_to_json(grammar: &str, input: &str) -> String {
    let g = match crate::Grammar::parse(grammar) {
        Ok(g) => g,
        Err(e) => return error_to_json(e),
    };
    let table = match g.get_ll1_table() {
        Some(table) => table,
        None => return error_to_json("the grammar is not LL(1)"),
    };
    match table.analyze(input, g.axiom()) {
        Ok(tree) => json!({ "accepted": true, "tree": tree }).to_string(),
        Err(e) => json!({ "accepted": false, "reason": e.to_string() }).to_string(),
    }
}


#[cfg(test)]
mod json_tests {
    const EXPRESSION: &str = "E -> TX
X -> +E
X ->
T -> iY
T -> (E)
Y -> *T
Y ->";

    #[test]
    fn first_follow() {
        assert_eq!(
            crate::first_follow_to_json("S -> a"),
            r#"{"data":[{"name":"S","nullable":false,"first":["a"],"follow":["$"]}]}"#
        );
        assert_eq!(
            crate::first_follow_to_json("S a"),
            r#"{"error":"Line 1: missing \"->\""}"#
        );
    }

    #[test]
    fn ll1_table() {
        assert_eq!(
            crate::ll1_table_to_json("S -> ab\nS -> ac"),
            r#"{"error":"the grammar is not LL(1)"}"#
        );
        assert!(crate::ll1_table_to_json(EXPRESSION).starts_with(r#"{"terminals":["$","(",")","*","+","i"]"#));
    }

    #[test]
    fn analyze() {
        let accepted: serde_json::Value =
            serde_json::from_str(&crate::analyze_to_json(EXPRESSION, "i*i$")).unwrap();
        assert_eq!(accepted["accepted"], true);
        assert_eq!(accepted["tree"]["root"], "E");

        let rejected: serde_json::Value =
            serde_json::from_str(&crate::analyze_to_json(EXPRESSION, "(i$")).unwrap();
        assert_eq!(rejected["accepted"], false);
    }
}
