//! Line-oriented editing script
//!
//! One command per line, blank lines and `#` comments ignored:
//!
//! ```text
//! add 1 Power supply
//! relink 3 1
//! relink-mode on
//! select 4
//! select 2
//! ```

use std::str::FromStr;

use crate::domain::{NodeCategory, NodeId};

#[derive(Debug, Clone, PartialEq)]
pub enum ScriptCommand {
    Add { parent: NodeId, label: Option<String> },
    Delete(NodeId),
    Relink { node: NodeId, new_parent: NodeId },
    Rename { node: NodeId, label: String },
    Retype { node: NodeId, category: NodeCategory },
    Measure { node: NodeId, width: f64 },
    RelinkMode(ModeSwitch),
    Select(NodeId),
    Cancel,
    Show,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeSwitch {
    On,
    Off,
    Toggle,
}

/// Parses one script line; `Ok(None)` for blanks and comments.
pub fn parse_line(line: &str) -> Result<Option<ScriptCommand>, String> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }
    let mut words = line.split_whitespace();
    let Some(keyword) = words.next() else {
        return Ok(None);
    };
    let args: Vec<&str> = words.collect();

    let command = match keyword.to_ascii_lowercase().as_str() {
        "add" => {
            let (parent, rest) = split_first(&args, "add <parent> [label]")?;
            ScriptCommand::Add {
                parent: parse_arg(parent)?,
                label: (!rest.is_empty()).then(|| rest.join(" ")),
            }
        }
        "delete" => ScriptCommand::Delete(parse_arg(exactly_one(&args, "delete <id>")?)?),
        "relink" => match args.as_slice() {
            [node, new_parent] => ScriptCommand::Relink {
                node: parse_arg(node)?,
                new_parent: parse_arg(new_parent)?,
            },
            _ => return Err(usage("relink <id> <parent>")),
        },
        "rename" => {
            let (node, rest) = split_first(&args, "rename <id> <label>")?;
            if rest.is_empty() {
                return Err(usage("rename <id> <label>"));
            }
            ScriptCommand::Rename {
                node: parse_arg(node)?,
                label: rest.join(" "),
            }
        }
        "retype" => match args.as_slice() {
            [node, category] => ScriptCommand::Retype {
                node: parse_arg(node)?,
                category: parse_arg(category)?,
            },
            _ => return Err(usage("retype <id> <category>")),
        },
        "measure" => match args.as_slice() {
            [node, width] => ScriptCommand::Measure {
                node: parse_arg(node)?,
                width: parse_arg(width)?,
            },
            _ => return Err(usage("measure <id> <width>")),
        },
        "relink-mode" => {
            let switch = match exactly_one(&args, "relink-mode on|off|toggle")? {
                "on" => ModeSwitch::On,
                "off" => ModeSwitch::Off,
                "toggle" => ModeSwitch::Toggle,
                _ => return Err(usage("relink-mode on|off|toggle")),
            };
            ScriptCommand::RelinkMode(switch)
        }
        "select" => ScriptCommand::Select(parse_arg(exactly_one(&args, "select <id>")?)?),
        "cancel" if args.is_empty() => ScriptCommand::Cancel,
        "show" if args.is_empty() => ScriptCommand::Show,
        other => return Err(format!("unknown command: {}", other)),
    };
    Ok(Some(command))
}

fn usage(form: &str) -> String {
    format!("usage: {}", form)
}

fn split_first<'a>(args: &'a [&'a str], form: &str) -> Result<(&'a str, &'a [&'a str]), String> {
    args.split_first()
        .map(|(first, rest)| (*first, rest))
        .ok_or_else(|| usage(form))
}

fn exactly_one<'a>(args: &[&'a str], form: &str) -> Result<&'a str, String> {
    match args {
        [only] => Ok(*only),
        _ => Err(usage(form)),
    }
}

fn parse_arg<T>(raw: &str) -> Result<T, String>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse::<T>()
        .map_err(|e| format!("invalid argument '{}': {}", raw, e))
}
