//! The environment binding: variables, output format and save slots.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, warn};
use zappac_session::Environment;

use crate::ast::Stmt;
use crate::error::{ExecError, SeedError};
use crate::eval::{eval, Variables};
use crate::node::Node;
use crate::parser::parse_statement;
use crate::value::{OutputFormat, Value};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
struct Bindings {
    variables: Variables,
    output: OutputFormat,
    saved: BTreeMap<String, Variables>,
}

/// Runs zappac programs against a set of bindings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ZappacState {
    bindings: Bindings,
}

impl ZappacState {
    /// Build a binding from a serialized seed; an empty seed starts fresh.
    ///
    /// A seed that cannot be read is logged and ignored.
    pub fn new(seed: &str) -> Self {
        match Self::restore(seed) {
            Ok(state) => state,
            Err(err) => {
                warn!(error = %err, "discarding unreadable state seed");
                Self::default()
            }
        }
    }

    pub fn restore(seed: &str) -> Result<Self, SeedError> {
        if seed.trim().is_empty() {
            return Ok(Self::default());
        }
        let bindings: Bindings = serde_json::from_str(seed)?;
        Ok(Self { bindings })
    }

    pub fn output(&self) -> OutputFormat {
        self.bindings.output
    }

    pub fn saved_slots(&self) -> impl Iterator<Item = &str> {
        self.bindings.saved.keys().map(String::as_str)
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        self.bindings.variables.get(name).copied()
    }

    /// Execute `nodes`. Changes are kept only when `persist` is set.
    pub fn run(&mut self, nodes: &[Node], persist: bool) -> Result<String, ExecError> {
        let stmt = parse_statement(nodes)?;
        let mut scratch = self.bindings.clone();
        let result = apply(&mut scratch, &stmt)?;
        debug!(?stmt, persist, %result, "executed");
        if persist {
            self.bindings = scratch;
        }
        Ok(result)
    }
}

fn apply(bindings: &mut Bindings, stmt: &Stmt) -> Result<String, ExecError> {
    match stmt {
        Stmt::Expr(expr) => {
            let value = eval(expr, &bindings.variables)?;
            Ok(bindings.output.render(&value))
        }
        Stmt::Assign(name, expr) => {
            let value = eval(expr, &bindings.variables)?;
            bindings.variables.insert(name.clone(), value);
            Ok(bindings.output.render(&value))
        }
        Stmt::Clear => {
            bindings.variables.clear();
            Ok("cleared".to_string())
        }
        Stmt::Save(slot) => {
            bindings.saved.insert(slot.clone(), bindings.variables.clone());
            Ok(format!("saved {}", slot))
        }
        Stmt::Load(slot) => {
            let vars = bindings
                .saved
                .get(slot)
                .cloned()
                .ok_or_else(|| ExecError::UnknownSlot(slot.clone()))?;
            bindings.variables = vars;
            Ok(format!("loaded {}", slot))
        }
        Stmt::Output(format) => {
            bindings.output = *format;
            Ok(format.to_string())
        }
    }
}

impl Environment for ZappacState {
    type Node = Node;
    type Value = Value;
    type Error = ExecError;

    fn execute(&mut self, nodes: &[Node], persist: bool) -> Result<String, ExecError> {
        self.run(nodes, persist)
    }

    fn variables(&self) -> &BTreeMap<String, Value> {
        &self.bindings.variables
    }

    fn snapshot(&self) -> String {
        match serde_json::to_string(&self.bindings) {
            Ok(json) => json,
            Err(err) => {
                warn!(error = %err, "failed to serialize state");
                String::new()
            }
        }
    }
}
