//! Interactive REPL for zappac.

use std::borrow::Cow;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::{CmdKind, Highlighter};
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};
use tracing::debug;
use zappac_lang::{Node, NodeKind, ZappacSession};
use zappac_session::Environment;

use crate::colors::Palette;
use crate::config::ReplSection;

/// REPL commands for tab completion.
const COMMANDS: &[&str] = &[
    ":help", ":quit", ":history", ":vars", ":state", ":parse", ":preview",
];

/// Language functions for tab completion.
const FUNCTIONS: &[&str] = &["abs", "output", "save", "load", "clear"];

/// Arguments accepted by `output(...)`.
const FORMATS: &[&str] = &["dec", "hex", "oct", "bin"];

/// Environment variable used to override REPL history location.
pub const HISTORY_PATH_ENV: &str = "ZAPPAC_HISTORY_PATH";

type SharedSession = Rc<RefCell<ZappacSession>>;

pub struct ReplOptions {
    pub prompt: String,
    pub palette: Palette,
    pub preview: bool,
    pub group_digits: bool,
    pub history_path: Option<PathBuf>,
}

impl ReplOptions {
    pub fn from_config(repl: &ReplSection, palette: Palette) -> Self {
        Self {
            prompt: repl.prompt.clone(),
            palette,
            preview: repl.preview,
            group_digits: repl.group_digits,
            history_path: get_history_path(repl.history_path.as_deref()),
        }
    }

    /// A result as the REPL prints it.
    fn result_text(&self, result: &str) -> String {
        if self.group_digits {
            group_thousands(result)
        } else {
            result.to_string()
        }
    }
}

struct ZappacHelper {
    session: SharedSession,
    palette: Palette,
    preview: bool,
}

impl Completer for ZappacHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let names: Vec<String> = match self.session.try_borrow() {
            Ok(session) => session.environment().variables().keys().cloned().collect(),
            Err(_) => Vec::new(),
        };
        let (start, words) = completions(line, pos, &names);
        let candidates = words
            .into_iter()
            .map(|word| Pair {
                display: word.clone(),
                replacement: word,
            })
            .collect();
        Ok((start, candidates))
    }
}

impl Hinter for ZappacHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        if !self.preview || pos < line.len() {
            return None;
        }
        let mut session = self.session.try_borrow_mut().ok()?;
        preview_hint(&mut session, line)
    }
}

impl Highlighter for ZappacHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if !self.palette.enabled() || line.trim_start().starts_with(':') {
            return Cow::Borrowed(line);
        }
        match self.session.try_borrow() {
            Ok(session) => {
                let outcome = session.parse(line);
                Cow::Owned(highlight_line(line, &outcome.nodes, &self.palette))
            }
            Err(_) => Cow::Borrowed(line),
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _kind: CmdKind) -> bool {
        self.palette.enabled()
    }

    fn highlight_hint<'h>(&self, hint: &'h str) -> Cow<'h, str> {
        if self.palette.enabled() {
            Cow::Owned(self.palette.gray(hint))
        } else {
            Cow::Borrowed(hint)
        }
    }
}

impl Validator for ZappacHelper {}

impl Helper for ZappacHelper {}

/// Candidates for the word ending at `pos`, with the byte offset it starts at.
fn completions(line: &str, pos: usize, variables: &[String]) -> (usize, Vec<String>) {
    let head = &line[..pos];
    let start = head
        .rfind(|c: char| !(c.is_ascii_alphanumeric() || c == '_' || c == ':'))
        .map(|i| i + 1)
        .unwrap_or(0);
    let word = &head[start..];
    if word.is_empty() {
        return (start, Vec::new());
    }

    let words = if word.starts_with(':') {
        if head.trim_start() == word {
            matching(COMMANDS.iter().copied(), word)
        } else {
            Vec::new()
        }
    } else if head[..start].trim_end().ends_with("output(") {
        matching(FORMATS.iter().copied(), word)
    } else {
        let pool = FUNCTIONS
            .iter()
            .copied()
            .chain(variables.iter().map(String::as_str));
        matching(pool, word)
    };
    (start, words)
}

fn matching<'a>(pool: impl Iterator<Item = &'a str>, word: &str) -> Vec<String> {
    pool.filter(|candidate| candidate.starts_with(word))
        .map(str::to_string)
        .collect()
}

/// Run `line` as a preview and describe the result, if it has one.
pub fn preview_hint(session: &mut ZappacSession, line: &str) -> Option<String> {
    let text = line.trim();
    if text.is_empty() || text.starts_with(':') {
        return None;
    }
    let outcome = session.exec(text, false);
    outcome
        .ok
        .then(|| format!("  = {}", outcome.state.last_result))
}

#[derive(Debug, PartialEq, Eq)]
enum ReplCommand<'a> {
    Quit,
    Help,
    History,
    Vars,
    State,
    Parse(&'a str),
    Preview(&'a str),
}

#[derive(Debug, PartialEq, Eq)]
enum ParsedCommand<'a> {
    NotACommand,
    UnknownCommand,
    InvalidUsage(&'static str),
    Command(ReplCommand<'a>),
}

fn parse_repl_command(line: &str) -> ParsedCommand<'_> {
    let trimmed = line.trim();
    if !trimmed.starts_with(':') {
        return ParsedCommand::NotACommand;
    }

    let mut parts = trimmed.splitn(2, char::is_whitespace);
    let cmd = parts.next().unwrap_or("");
    let arg = parts
        .next()
        .map(str::trim)
        .filter(|value| !value.is_empty());

    match cmd {
        ":quit" | ":q" => ParsedCommand::Command(ReplCommand::Quit),
        ":help" | ":h" => ParsedCommand::Command(ReplCommand::Help),
        ":history" => ParsedCommand::Command(ReplCommand::History),
        ":vars" | ":v" => ParsedCommand::Command(ReplCommand::Vars),
        ":state" => ParsedCommand::Command(ReplCommand::State),
        ":parse" | ":p" => match arg {
            Some(text) => ParsedCommand::Command(ReplCommand::Parse(text)),
            None => ParsedCommand::InvalidUsage("Usage: :parse <expr>"),
        },
        ":preview" => match arg {
            Some(text) => ParsedCommand::Command(ReplCommand::Preview(text)),
            None => ParsedCommand::InvalidUsage("Usage: :preview <expr>"),
        },
        _ => ParsedCommand::UnknownCommand,
    }
}

pub fn run_repl(session: ZappacSession, options: ReplOptions) -> rustyline::Result<()> {
    let palette = options.palette;
    println!(
        "{}",
        palette.bold(&palette.cyan(&format!("zappac {}", env!("CARGO_PKG_VERSION"))))
    );
    if let Some(restored) = restored_banner(&session) {
        println!("{}", palette.gray(&restored));
    }
    println!(
        "{}\n",
        palette.gray("Type :help for available commands, :quit to exit.")
    );

    let session: SharedSession = Rc::new(RefCell::new(session));
    let config = rustyline::Config::builder().auto_add_history(true).build();
    let mut rl: Editor<ZappacHelper, DefaultHistory> = Editor::with_config(config)?;
    rl.set_helper(Some(ZappacHelper {
        session: Rc::clone(&session),
        palette,
        preview: options.preview,
    }));

    if let Some(ref path) = options.history_path {
        if path.exists() {
            if let Err(err) = rl.load_history(path) {
                eprintln!(
                    "{} failed to load history from {}: {}",
                    palette.yellow("warning:"),
                    path.display(),
                    err
                );
            }
        }
    }

    let prompt = format!("{} ", palette.green(&options.prompt));
    loop {
        match rl.readline(&prompt) {
            Ok(line) => {
                if line.trim().is_empty() {
                    continue;
                }
                match handle_command(&line, &session, &options) {
                    Some(true) => continue,
                    Some(false) => break,
                    None => eval_line(&session, line.trim(), &options),
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("{}", palette.gray("(Ctrl-D to exit)"));
            }
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                eprintln!("{} {}", palette.red("error:"), err);
                break;
            }
        }
    }

    if let Some(ref path) = options.history_path {
        if let Some(parent) = path.parent() {
            if let Err(err) = fs::create_dir_all(parent) {
                eprintln!(
                    "{} failed to create history directory {}: {}",
                    palette.yellow("warning:"),
                    parent.display(),
                    err
                );
            }
        }
        if let Err(err) = rl.save_history(path) {
            eprintln!(
                "{} failed to save history to {}: {}",
                palette.yellow("warning:"),
                path.display(),
                err
            );
        }
    }
    Ok(())
}

fn eval_line(session: &SharedSession, line: &str, options: &ReplOptions) {
    let palette = &options.palette;
    let mut session = session.borrow_mut();
    let outcome = session.exec(line, true);
    if outcome.ok {
        println!("{}", palette.bold(&options.result_text(&outcome.state.last_result)));
    } else if let Some(err) = &outcome.state.last_error {
        eprintln!("{} {}", palette.red("error:"), err);
    }
}

/// Handle REPL commands.
///
/// Returns Some(true) to continue, Some(false) to quit, None if not a command.
fn handle_command(line: &str, session: &SharedSession, options: &ReplOptions) -> Option<bool> {
    let palette = &options.palette;
    match parse_repl_command(line) {
        ParsedCommand::NotACommand => None,
        ParsedCommand::UnknownCommand => {
            eprintln!(
                "{} unknown command. Type :help for usage.",
                palette.red("error:")
            );
            Some(true)
        }
        ParsedCommand::InvalidUsage(usage) => {
            eprintln!("{} {}", palette.red("error:"), usage);
            Some(true)
        }
        ParsedCommand::Command(ReplCommand::Quit) => Some(false),
        ParsedCommand::Command(ReplCommand::Help) => {
            print_help(palette);
            Some(true)
        }
        ParsedCommand::Command(ReplCommand::History) => {
            let session = session.borrow();
            let history = &session.state().history;
            if history.is_empty() {
                println!("{}", palette.gray("History is empty."));
            }
            for (i, item) in history.iter().enumerate() {
                println!(
                    "{:>4} {} {} {}",
                    palette.gray(&(i + 1).to_string()),
                    item.input,
                    palette.gray("="),
                    options.result_text(&item.result)
                );
            }
            Some(true)
        }
        ParsedCommand::Command(ReplCommand::Vars) => {
            print!("{}", render_variables(&session.borrow().state().variables, palette));
            Some(true)
        }
        ParsedCommand::Command(ReplCommand::State) => {
            match serde_json::to_string_pretty(session.borrow().state()) {
                Ok(json) => println!("{}", json),
                Err(err) => eprintln!("{} {}", palette.red("error:"), err),
            }
            Some(true)
        }
        ParsedCommand::Command(ReplCommand::Parse(text)) => {
            let outcome = session.borrow().parse(text);
            match outcome.error {
                None => print!("{}", render_nodes(&outcome.nodes, palette)),
                Some(err) => eprintln!("{} {}", palette.red("syntax error:"), err),
            }
            Some(true)
        }
        ParsedCommand::Command(ReplCommand::Preview(text)) => {
            let mut session = session.borrow_mut();
            let outcome = session.exec(text, false);
            debug!(ok = outcome.ok, "preview");
            if outcome.ok {
                println!(
                    "{} {}",
                    outcome.state.last_result,
                    palette.gray("(preview)")
                );
            } else if let Some(err) = &outcome.state.last_error {
                eprintln!("{} {}", palette.red("error:"), err);
            }
            Some(true)
        }
    }
}

fn paint_kind(kind: NodeKind, text: &str, palette: &Palette) -> String {
    if kind.is_value() {
        palette.green(text)
    } else if kind.is_operator() {
        palette.yellow(text)
    } else if kind.is_function() {
        palette.cyan(text)
    } else {
        palette.gray(text)
    }
}

/// One line per node: offset, kind and source text.
fn render_nodes(nodes: &[Node], palette: &Palette) -> String {
    let mut out = String::new();
    for node in nodes {
        let kind = paint_kind(node.kind, &format!("{:<10}", node.kind.as_ref()), palette);
        out.push_str(&format!("{:>4}  {} {}\n", node.pos, kind, node.text));
    }
    out
}

/// Color `line` by the nodes it parsed to. Each node owns the text up to the
/// next node; whatever follows the last one (all of the line when it did not
/// parse) is left as typed.
fn highlight_line(line: &str, nodes: &[Node], palette: &Palette) -> String {
    let mut out = String::with_capacity(line.len());
    let mut done = 0;
    for (i, node) in nodes.iter().enumerate() {
        if node.kind == NodeKind::Eof {
            break;
        }
        let end = nodes.get(i + 1).map_or(node.end(), |next| next.pos);
        let (Some(gap), Some(span)) = (line.get(done..node.pos), line.get(node.pos..end)) else {
            break;
        };
        out.push_str(gap);
        out.push_str(&paint_kind(node.kind, span, palette));
        done = end;
    }
    out.push_str(&line[done..]);
    out
}

/// Insert thousands separators into a decimal result, the way `1234567.5`
/// becomes `1,234,567.5`. Radix forms (`0xff`, `0755`, `b101`) and anything
/// that is not a plain decimal come back unchanged.
fn group_thousands(text: &str) -> String {
    let (sign, body) = match text.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", text),
    };
    let (int, frac) = match body.split_once('.') {
        Some((int, frac)) => (int, Some(frac)),
        None => (body, None),
    };
    let decimal = !int.is_empty()
        && int.bytes().all(|b| b.is_ascii_digit())
        && frac.map_or(true, |f| f.bytes().all(|b| b.is_ascii_digit()));
    if !decimal || int.len() <= 3 || int.starts_with('0') {
        return text.to_string();
    }

    let mut out = String::with_capacity(text.len() + int.len() / 3);
    out.push_str(sign);
    for (i, digit) in int.chars().enumerate() {
        if i > 0 && (int.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(digit);
    }
    if let Some(frac) = frac {
        out.push('.');
        out.push_str(frac);
    }
    out
}

/// Names a seeded session already knows about. Variables restored from
/// `[state] last_state` are usable right away but only show up in `:vars`
/// after the first evaluated line.
fn restored_banner(session: &ZappacSession) -> Option<String> {
    let names: Vec<&str> = session
        .environment()
        .variables()
        .keys()
        .map(String::as_str)
        .collect();
    if names.is_empty() || !session.state().variables.is_empty() {
        return None;
    }
    let noun = if names.len() == 1 { "variable" } else { "variables" };
    Some(format!(
        "Restored {} {} from last_state: {}",
        names.len(),
        noun,
        names.join(", ")
    ))
}

fn render_variables(variables: &BTreeMap<String, String>, palette: &Palette) -> String {
    if variables.is_empty() {
        return format!("{}\n", palette.gray("No variables defined."));
    }
    let width = variables.keys().map(String::len).max().unwrap_or(0);
    variables
        .iter()
        .map(|(name, value)| {
            let name = palette.cyan(&format!("{:<width$}", name));
            format!("  {} = {}\n", name, value)
        })
        .collect()
}

/// Resolve the path to the history file.
///
/// Rules:
/// - Override set to an absolute path: use as-is.
/// - Override set to `~/...` or a relative path: resolve under HOME.
/// - Otherwise: `${HOME}/.zappac/repl_history`.
fn resolve_history_path(home: Option<&Path>, override_path: Option<&str>) -> Option<PathBuf> {
    let home_path = || home.map(Path::to_path_buf);

    if let Some(raw) = override_path
        .map(str::trim)
        .filter(|value| !value.is_empty())
    {
        if raw == "~" {
            return home_path();
        }
        if let Some(rest) = raw.strip_prefix("~/") {
            return home_path().map(|home| home.join(rest));
        }

        let configured = PathBuf::from(raw);
        if configured.is_relative() {
            return home_path().map(|home| home.join(configured));
        }
        return Some(configured);
    }

    home_path().map(|home| home.join(".zappac").join("repl_history"))
}

/// `ZAPPAC_HISTORY_PATH` wins over the configured `history_path`.
fn get_history_path(configured: Option<&str>) -> Option<PathBuf> {
    let home = dirs::home_dir();
    let override_path = std::env::var(HISTORY_PATH_ENV)
        .ok()
        .or_else(|| configured.map(str::to_string));
    resolve_history_path(home.as_deref(), override_path.as_deref())
}

fn print_help(palette: &Palette) {
    println!("{}", palette.bold("Commands:"));
    let rows = [
        (":help, :h", "Show this help"),
        (":quit, :q", "Exit the REPL"),
        (":history", "Show evaluated lines, newest first"),
        (":vars, :v", "Show variables"),
        (":state", "Dump the session state as JSON"),
        (":parse <expr>, :p <expr>", "Show the nodes an input parses to"),
        (":preview <expr>", "Evaluate without keeping the result"),
    ];
    for (cmd, what) in rows {
        println!("  {}  {}", palette.cyan(cmd), palette.gray(what));
    }
    println!();
    println!("{}", palette.bold("Language:"));
    println!(
        "  {}",
        palette.gray("x = 0xff & b1010, y = x << 2, 7 // 2, 2 ** 10, ~x, abs(-3)")
    );
    println!(
        "  {}",
        palette.gray("output(hex|dec|oct|bin), save(name), load(name), clear")
    );
}
