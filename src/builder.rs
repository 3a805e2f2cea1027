//! DescriptionIndex → clap Command tree builder
//!
//! Structure: `<name> <category> <operation> [--<param> VALUE ...] [--body TEXT]`.
//! Only operations in a declared category get a command.

use std::collections::{HashMap, HashSet};
use std::fmt::Write as _;

use clap::{Arg, ArgAction, ArgMatches, Command};
use tracing::warn;

use crate::index::{DescriptionIndex, Operation};
use crate::session::Session;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";

/// Arg id and long flag of the request body option.
pub const BODY_ARG: &str = "body";

/// Parameter names that would collide with built-in flags.
const RESERVED_ARGS: [&str; 2] = [BODY_ARG, "help"];

/// Configuration for the operator-facing command tree.
#[derive(Debug, Clone)]
#[non_exhaustive]
pub struct CliConfig {
    /// Root command name
    pub name: String,
    /// Root command about/description
    pub about: String,
    /// Base URL used when none is supplied
    pub default_base_url: String,
}

impl CliConfig {
    pub fn new(
        name: impl Into<String>,
        about: impl Into<String>,
        default_base_url: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            about: about.into(),
            default_base_url: default_base_url.into(),
        }
    }

    /// The operator-supplied base URL, or the configured default.
    pub fn base_url(&self, supplied: Option<&str>) -> String {
        supplied
            .filter(|url| !url.trim().is_empty())
            .unwrap_or(&self.default_base_url)
            .to_string()
    }
}

impl Default for CliConfig {
    fn default() -> Self {
        Self::new(
            env!("CARGO_PKG_NAME"),
            "Invoke operations of an OpenAPI description",
            DEFAULT_BASE_URL,
        )
    }
}

/// A command name pair resolved for one categorised operation.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationCommand<'a> {
    pub category: &'a str,
    pub category_cmd: String,
    pub operation_cmd: String,
    pub operation: &'a Operation,
}

/// Command names for every categorised operation, in index order.
///
/// Operations whose name collides inside a category get a `-<method>` suffix;
/// a collision that survives the suffix is dropped.
pub fn operation_commands(index: &DescriptionIndex) -> Vec<OperationCommand<'_>> {
    let mut commands = Vec::new();
    let mut seen_categories: HashSet<String> = HashSet::new();

    for (category, ops) in index.grouped() {
        let category_cmd = normalize_group(category);
        if category_cmd.is_empty() || !seen_categories.insert(category_cmd.clone()) {
            warn!(category, "category name collides after normalization, skipping");
            continue;
        }

        let mut name_count: HashMap<String, usize> = HashMap::new();
        for op in &ops {
            *name_count.entry(base_command_name(op)).or_default() += 1;
        }

        let mut used: HashSet<String> = HashSet::new();
        for op in ops {
            let base = base_command_name(op);
            let operation_cmd = if name_count.get(&base).copied().unwrap_or(0) > 1 {
                format!("{}-{}", base, op.method.as_str().to_lowercase())
            } else {
                base
            };
            if !used.insert(operation_cmd.clone()) {
                warn!(path = %op.path, method = %op.method, "duplicate command name, skipping");
                continue;
            }
            commands.push(OperationCommand {
                category,
                category_cmd: category_cmd.clone(),
                operation_cmd,
                operation: op,
            });
        }
    }

    commands
}

/// Build a clap `Command` tree from a description index.
pub fn build_commands(config: &CliConfig, index: &DescriptionIndex) -> Command {
    let mut root = Command::new(config.name.clone())
        .about(config.about.clone())
        .subcommand_required(true)
        .arg_required_else_help(true);

    let commands = operation_commands(index);
    let mut groups: Vec<(&str, &str, Vec<&OperationCommand<'_>>)> = Vec::new();
    for cmd in &commands {
        match groups.iter_mut().find(|(name, _, _)| *name == cmd.category_cmd) {
            Some((_, _, ops)) => ops.push(cmd),
            None => groups.push((cmd.category_cmd.as_str(), cmd.category, vec![cmd])),
        }
    }

    for (category_cmd, category, ops) in groups {
        let mut group_cmd = Command::new(category_cmd.to_owned())
            .about(format!("Operations tagged {category}"))
            .subcommand_required(true)
            .arg_required_else_help(true);
        for cmd in ops {
            group_cmd =
                group_cmd.subcommand(build_operation_command(cmd.operation, &cmd.operation_cmd));
        }
        root = root.subcommand(group_cmd);
    }

    root
}

/// Find the operation selected by a resolved category + operation command.
pub fn find_operation<'a>(
    index: &'a DescriptionIndex,
    category_cmd: &str,
    operation_cmd: &str,
) -> Option<&'a Operation> {
    operation_commands(index)
        .into_iter()
        .find(|c| c.category_cmd == category_cmd && c.operation_cmd == operation_cmd)
        .map(|c| c.operation)
}

/// Select `op` in the session and bind every value the operator passed.
pub fn apply_matches(session: &mut Session, op: &Operation, matches: &ArgMatches) {
    session.select_operation(op.clone());
    for name in bindable_names(op) {
        if let Some(value) = matches.try_get_one::<String>(name).ok().flatten() {
            session.set_param(name, value.as_str());
        }
    }
    if op.accepts_body() {
        if let Some(body) = matches.try_get_one::<String>(BODY_ARG).ok().flatten() {
            session.set_body(body.as_str());
        }
    }
}

/// Human-readable listing of categories and their operation commands.
pub fn describe_index(index: &DescriptionIndex) -> String {
    let mut out = String::new();
    if index.categories().is_empty() {
        out.push_str("no categories declared\n");
        return out;
    }

    let commands = operation_commands(index);
    for category in index.categories() {
        let _ = writeln!(out, "{category}");
        let mut any = false;
        for cmd in commands.iter().filter(|c| c.category == category.as_str()) {
            any = true;
            let op = cmd.operation;
            let _ = writeln!(
                out,
                "  {:<24} {:<7} {:<32} {}",
                cmd.operation_cmd, op.method, op.path, op.summary
            );
        }
        if !any {
            out.push_str("  (no operations)\n");
        }
    }

    let hidden = index
        .operations()
        .iter()
        .filter(|op| {
            op.category
                .as_deref()
                .map_or(true, |c| !index.categories().iter().any(|d| d == c))
        })
        .count();
    if hidden > 0 {
        let _ = writeln!(out, "({hidden} operation(s) without a declared category not listed)");
    }
    out
}

fn base_command_name(op: &Operation) -> String {
    let from_id = op
        .operation_id
        .as_deref()
        .map(normalize_operation_id)
        .unwrap_or_default();
    // Guard: an id that normalizes to nothing would give an unreachable command
    if !from_id.is_empty() {
        return from_id;
    }

    let path = normalize_group(&op.path);
    let method = op.method.as_str().to_lowercase();
    if path.is_empty() {
        method
    } else {
        format!("{method}-{path}")
    }
}

/// Parameter names that become `--<name>` options, first declaration wins.
fn bindable_names(op: &Operation) -> Vec<&str> {
    let mut names: Vec<&str> = Vec::new();
    for param in &op.parameters {
        let name = param.name.as_str();
        if name.is_empty()
            || name.starts_with('-')
            || name.contains(char::is_whitespace)
            || RESERVED_ARGS.contains(&name)
            || names.contains(&name)
        {
            continue;
        }
        names.push(name);
    }
    names
}

fn build_operation_command(op: &Operation, cmd_name: &str) -> Command {
    let about = if op.summary.is_empty() {
        format!("{} {}", op.method, op.path)
    } else {
        op.summary.clone()
    };
    let mut cmd = Command::new(cmd_name.to_owned()).about(about);
    if !op.description.is_empty() {
        cmd = cmd.long_about(op.description.clone());
    }

    let names = bindable_names(op);
    for param in op.parameters.iter().filter(|p| !names.contains(&p.name.as_str())) {
        warn!(param = %param.name, path = %op.path, "parameter cannot be bound from the command line");
    }

    for name in names {
        let Some(param) = op.parameters.iter().find(|p| p.name == name) else {
            continue;
        };
        let required = if param.required { ", required" } else { "" };
        let help = if param.description.is_empty() {
            format!("({}{})", param.location, required)
        } else {
            format!("{} ({}{})", param.description, param.location, required)
        };
        cmd = cmd.arg(
            Arg::new(param.name.clone())
                .long(param.name.clone())
                .value_name("VALUE")
                .help(help)
                .action(ArgAction::Set),
        );
    }

    if op.accepts_body() {
        cmd = cmd.arg(
            Arg::new(BODY_ARG)
                .long(BODY_ARG)
                .short('d')
                .value_name("TEXT")
                .help("Request body, sent verbatim")
                .action(ArgAction::Set),
        );
    }

    cmd
}

pub fn normalize_group(name: &str) -> String {
    let mut result = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_alphanumeric() {
            result.push(c.to_ascii_lowercase());
        } else if !result.is_empty() && !result.ends_with('-') {
            result.push('-');
        }
    }
    while result.ends_with('-') {
        result.pop();
    }
    result
}

pub fn normalize_operation_id(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut result = String::with_capacity(s.len() + 4);
    for i in 0..chars.len() {
        let c = chars[i];
        if c.is_uppercase() {
            if i > 0 {
                let prev = chars[i - 1];
                let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
                if prev.is_lowercase() || (prev.is_uppercase() && next_is_lower) {
                    result.push('-');
                }
            }
            result.push(c.to_ascii_lowercase());
        } else if c == '_' || c == ' ' {
            if !result.is_empty() && !result.ends_with('-') {
                result.push('-');
            }
        } else {
            result.push(c);
        }
    }
    result
}
