//! Controller ordering rules checked against a scripted collaborator.
//!
//! Programs are whitespace separated words: `name=value` binds, `fail`
//! aborts execution, `clear` drops all bindings, `save` is a no-op command.
//! Any input containing `!!` is a syntax error.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use thiserror::Error;
use zappac_session::{
    Environment, Frontend, HistoryItem, NodeClass, Session, SessionState, SyntaxNode,
};

#[derive(Debug, Clone, PartialEq)]
struct Word(String);

impl SyntaxNode for Word {
    fn class(&self) -> NodeClass {
        match self.0.as_str() {
            "clear" => NodeClass::Clear,
            "save" => NodeClass::Save,
            _ => NodeClass::Expression,
        }
    }
}

#[derive(Debug, Error)]
#[error("{0}")]
struct Scripted(String);

struct Words;

impl Frontend for Words {
    type Node = Word;
    type Error = Scripted;

    fn parse(&self, input: &str) -> Result<Vec<Word>, Scripted> {
        if input.contains("!!") {
            return Err(Scripted("syntax error near '!!'".into()));
        }
        if input.trim().is_empty() {
            return Err(Scripted("empty input".into()));
        }
        Ok(input.split_whitespace().map(|w| Word(w.to_string())).collect())
    }
}

#[derive(Default)]
struct Bindings {
    vars: BTreeMap<String, i64>,
    executions: usize,
}

impl Environment for Bindings {
    type Node = Word;
    type Value = i64;
    type Error = Scripted;

    fn execute(&mut self, nodes: &[Word], persist: bool) -> Result<String, Scripted> {
        self.executions += 1;
        let mut scratch = self.vars.clone();
        let mut result = String::new();
        for Word(word) in nodes {
            match word.as_str() {
                "fail" => return Err(Scripted("execution failed".into())),
                "clear" => {
                    scratch.clear();
                    result = "cleared".into();
                }
                "save" => result = "saved".into(),
                other => match other.split_once('=') {
                    Some((name, value)) => {
                        let value: i64 = value
                            .parse()
                            .map_err(|_| Scripted(format!("bad value '{}'", value)))?;
                        scratch.insert(name.to_string(), value);
                        result = value.to_string();
                    }
                    None => result = other.to_string(),
                },
            }
        }
        if persist {
            self.vars = scratch;
        }
        Ok(result)
    }

    fn variables(&self) -> &BTreeMap<String, i64> {
        &self.vars
    }

    fn snapshot(&self) -> String {
        self.vars
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join(",")
    }
}

fn session() -> Session<Words, Bindings> {
    Session::new(Words, Bindings::default())
}

fn history(state: &SessionState) -> Vec<(&str, &str)> {
    state
        .history
        .iter()
        .map(|h| (h.input.as_str(), h.result.as_str()))
        .collect()
}

#[test]
fn persisted_success_prepends_history_and_snapshots_variables() {
    let mut s = session();
    let out = s.exec("a=2", true);
    assert!(out.ok);
    assert_eq!(out.state.last_result, "2");
    assert_eq!(out.state.last_error, None);
    assert_eq!(history(out.state), vec![("a=2", "2")]);
    assert_eq!(out.state.variables.get("a").map(String::as_str), Some("2"));

    let out = s.exec("b=3", true);
    assert_eq!(history(out.state), vec![("b=3", "3"), ("a=2", "2")]);
    assert_eq!(out.state.variables.len(), 2);
}

#[test]
fn syntax_error_only_touches_last_error() {
    let mut s = session();
    s.exec("a=2", true);
    let before = s.state().clone();

    let out = s.exec("a=!!", true);
    assert!(!out.ok);
    assert_eq!(out.state.last_error.as_deref(), Some("syntax error near '!!'"));
    assert_eq!(out.state.last_result, before.last_result);
    assert_eq!(out.state.history, before.history);
    assert_eq!(out.state.variables, before.variables);
}

#[test]
fn execution_error_only_touches_last_error() {
    let mut s = session();
    s.exec("a=2", true);
    let before = s.state().clone();

    let out = s.exec("b=5 fail", true);
    assert!(!out.ok);
    assert_eq!(out.state.last_error.as_deref(), Some("execution failed"));
    assert_eq!(out.state.last_result, "2");
    assert_eq!(out.state.history, before.history);
    assert_eq!(out.state.variables, before.variables);
    assert!(!s.environment().variables().contains_key("b"));
}

#[test]
fn success_after_failure_clears_error() {
    let mut s = session();
    s.exec("fail", true);
    assert!(!s.state().is_ok());
    let out = s.exec("7", true);
    assert!(out.ok);
    assert_eq!(out.state.last_error, None);
    assert_eq!(out.state.last_result, "7");
}

#[test]
fn preview_updates_result_but_commits_nothing() {
    let mut s = session();
    s.exec("a=1", true);

    let out = s.exec("a=9", false);
    assert!(out.ok);
    assert_eq!(out.state.last_result, "9");
    assert_eq!(history(out.state), vec![("a=1", "1")]);
    assert_eq!(out.state.variables.get("a").map(String::as_str), Some("1"));
    assert_eq!(s.environment().variables().get("a"), Some(&1));

    let out = s.exec("fail", false);
    assert!(!out.ok);
    assert_eq!(out.state.last_error.as_deref(), Some("execution failed"));
}

#[test]
fn leading_clear_empties_history_and_is_not_recorded() {
    let mut s = session();
    s.exec("a=1", true);
    s.exec("b=2", true);
    s.exec("c=3", true);
    assert_eq!(s.state().history_len(), 3);

    let out = s.exec("clear", true);
    assert!(out.ok);
    assert!(out.state.history.is_empty());
    assert_eq!(out.state.last_result, "cleared");
    assert!(out.state.variables.is_empty());
}

#[test]
fn leading_clear_followed_by_statements_still_resets_history() {
    let mut s = session();
    s.exec("a=1", true);
    let out = s.exec("clear z=4", true);
    assert!(out.state.history.is_empty());
    assert_eq!(out.state.variables.len(), 1);
    assert_eq!(out.state.variables.get("z").map(String::as_str), Some("4"));
}

#[test]
fn non_leading_clear_is_recorded_normally() {
    let mut s = session();
    s.exec("a=1", true);
    let out = s.exec("z=4 clear", true);
    assert_eq!(history(out.state), vec![("z=4 clear", "cleared"), ("a=1", "1")]);
    assert!(out.state.variables.is_empty());
}

#[test]
fn clear_preview_keeps_history() {
    let mut s = session();
    s.exec("a=1", true);
    let out = s.exec("clear", false);
    assert!(out.ok);
    assert_eq!(out.state.history_len(), 1);
    assert_eq!(out.state.variables.len(), 1);
}

#[test]
fn failed_clear_keeps_history() {
    let mut s = session();
    s.exec("a=1", true);
    let out = s.exec("clear fail", true);
    assert!(!out.ok);
    assert_eq!(out.state.history_len(), 1);
}

#[test]
fn variables_are_rebuilt_not_merged() {
    let mut s = session();
    s.exec("a=1 b=2", true);
    assert_eq!(s.state().variables.len(), 2);
    s.exec("clear", true);
    s.exec("c=3", true);
    let names: Vec<&str> = s.state().variables.keys().map(String::as_str).collect();
    assert_eq!(names, vec!["c"]);
}

#[test]
fn parse_reports_errors_without_side_effects() {
    let mut s = session();
    s.exec("a=1", true);
    s.exec("fail", true);
    let before = s.state().clone();

    let ok = s.parse("a=2 b");
    assert!(ok.is_ok());
    assert_eq!(ok.nodes, vec![Word("a=2".into()), Word("b".into())]);

    let bad = s.parse("!!");
    assert!(!bad.is_ok());
    assert!(bad.nodes.is_empty());
    assert_eq!(bad.error.as_deref(), Some("syntax error near '!!'"));

    assert_eq!(s.parse("a=2 b"), ok);
    assert_eq!(s.state(), &before);
    assert_eq!(s.environment().executions, 2);
}

#[test]
fn save_hook_fires_only_for_persisted_save() {
    let seen: Rc<RefCell<Vec<String>>> = Rc::default();
    let sink = Rc::clone(&seen);

    let mut s = session();
    s.on_save(move |snapshot| sink.borrow_mut().push(snapshot.to_string()));

    s.exec("a=1", true);
    s.exec("save", false);
    s.exec("save fail", true);
    assert!(seen.borrow().is_empty());

    s.exec("b=2 save", true);
    assert_eq!(seen.borrow().as_slice(), ["a=1,b=2".to_string()]);
    assert_eq!(
        s.state().history.first(),
        Some(&HistoryItem::new("b=2 save", "saved"))
    );
}

#[test]
fn exec_outcome_serializes_for_presentation_layer() {
    let mut s = session();
    let out = s.exec("a=5", true);
    let json = serde_json::to_value(&out).expect("outcome serializes");
    assert_eq!(json["ok"], true);
    assert_eq!(json["state"]["last_result"], "5");
    assert_eq!(json["state"]["variables"]["a"], "5");
}
