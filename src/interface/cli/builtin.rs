//! 바이너리 기본 제공 명령 모음.
//! 엔진 기능(주입, 열거형, 스택, 취소, 기본값)을 직접 써볼 수 있는 최소 명령 집합이다.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result, anyhow, bail};
use serde_json::{Map, Value, json};

use crate::application::cancellation::CancelSignal;
use crate::application::conversion::ConversionRegistry;
use crate::application::dispatcher::ShellControl;
use crate::application::history::HistoryBuffer;
use crate::domain::command::{CommandDescriptor, CommandTable, ParamType, ParameterSpec};
use crate::domain::value::{ArgValue, BoundArgs, Output};

/// `sleep` 인자 타입 태그.
pub const DURATION_TAG: &str = "duration";
const DEFAULT_HISTORY_COUNT: i64 = 20;

/// `users` 명령이 조회하는 예시 사용자 목록.
#[derive(Debug, Clone)]
pub struct UserDirectory {
    users: Vec<UserRecord>,
}

#[derive(Debug, Clone)]
pub struct UserRecord {
    pub name: String,
    pub role: String,
}

impl Default for UserDirectory {
    fn default() -> Self {
        let users = [("alice", "admin"), ("bob", "developer"), ("carol", "viewer")]
            .into_iter()
            .map(|(name, role)| UserRecord {
                name: name.to_string(),
                role: role.to_string(),
            })
            .collect();
        Self { users }
    }
}

impl UserDirectory {
    pub fn names(&self) -> Vec<String> {
        self.users.iter().map(|u| u.name.clone()).collect()
    }

    pub fn find(&self, name: &str) -> Option<&UserRecord> {
        self.users.iter().find(|u| u.name.eq_ignore_ascii_case(name))
    }

    fn records<'a>(users: impl Iterator<Item = &'a UserRecord>) -> Vec<Map<String, Value>> {
        users
            .filter_map(|u| match json!({"name": u.name, "role": u.role}) {
                Value::Object(map) => Some(map),
                _ => None,
            })
            .collect()
    }
}

/// 기본 제공 명령 서술자 목록.
pub fn builtin_commands() -> Vec<CommandDescriptor> {
    vec![
        help_command(),
        exit_command(),
        echo_command(),
        connect_command(),
        sleep_command(),
        users_command(),
        history_command(),
    ]
}

/// 기본 제공 커스텀 타입 변환기.
pub fn builtin_conversions() -> ConversionRegistry {
    let mut registry = ConversionRegistry::new();
    registry.register(DURATION_TAG, |raw| {
        parse_duration(raw).map(|d| ArgValue::Custom(Arc::new(d)))
    });
    registry
}

/// `1.5`, `1.5s`, `250ms` 형식을 지원한다. 단위가 없으면 초.
pub fn parse_duration(raw: &str) -> Result<Duration> {
    let text = raw.trim().to_ascii_lowercase();
    let (number, divisor) = if let Some(ms) = text.strip_suffix("ms") {
        (ms, 1000.0)
    } else if let Some(secs) = text.strip_suffix('s') {
        (secs, 1.0)
    } else {
        (text.as_str(), 1.0)
    };

    let value: f64 = number
        .trim()
        .parse()
        .with_context(|| format!("invalid duration: {raw}"))?;
    if !value.is_finite() || value < 0.0 {
        bail!("invalid duration: {raw}");
    }
    Ok(Duration::from_secs_f64(value / divisor))
}

fn help_command() -> CommandDescriptor {
    CommandDescriptor::new("help", |args: BoundArgs| async move {
        let table = args
            .injected::<CommandTable>()
            .ok_or_else(|| anyhow!("command table is not available"))?;

        let Some(name) = args.str("command") else {
            return Ok(Output::Lines(table.help_listing()));
        };
        let command = table
            .get(name)
            .ok_or_else(|| anyhow!("no help for unknown command: {name}"))?;
        Ok(Output::Lines(vec![
            format!("{} - {}", command.name, command.help),
            format!("syntax: {}", command.syntax()),
        ]))
    })
    .help("list commands or show one command's syntax")
    .param(
        ParameterSpec::string("command")
            .with_default(ArgValue::Absent)
            .with_suggestions(|registry, _| {
                registry
                    .get::<CommandTable>()
                    .map(|table| table.names())
                    .unwrap_or_default()
            }),
    )
    .param(ParameterSpec::injected::<CommandTable>("table"))
}

fn exit_command() -> CommandDescriptor {
    CommandDescriptor::new("exit", |args: BoundArgs| async move {
        let shell = args
            .injected::<ShellControl>()
            .ok_or_else(|| anyhow!("shell control is not available"))?;
        let code = args.int("code").unwrap_or(0);
        let code = i32::try_from(code).map_err(|_| anyhow!("exit code out of range: {code}"))?;
        shell.request_exit(code);
        Ok(Output::Nothing)
    })
    .help("leave the shell after this command")
    .param(ParameterSpec::integer("code").with_default(ArgValue::Int(0)))
    .param(ParameterSpec::injected::<ShellControl>("shell"))
}

fn echo_command() -> CommandDescriptor {
    CommandDescriptor::new("echo", |args: BoundArgs| async move {
        let text = args.str("text").unwrap_or_default();
        let painted = match args.str("color") {
            Some("Red") => format!("\x1b[31m{text}\x1b[0m"),
            Some("Green") => format!("\x1b[32m{text}\x1b[0m"),
            Some("Blue") => format!("\x1b[34m{text}\x1b[0m"),
            _ => text.to_string(),
        };
        Ok(Output::Text(painted))
    })
    .help("print text, optionally colored")
    .param(ParameterSpec::string("text"))
    .param(
        ParameterSpec::new(
            "color",
            ParamType::enumeration("Color", ["White", "Red", "Green", "Blue"]),
        )
        .with_default(ArgValue::Enum("White".into())),
    )
}

fn connect_command() -> CommandDescriptor {
    CommandDescriptor::new("connect", |args: BoundArgs| async move {
        let host = args.str("host").unwrap_or_default();
        let port = args.int("port").unwrap_or(22);
        if !(1..=65535).contains(&port) {
            bail!("port out of range: {port}");
        }
        let scheme = if args.bool("secure").unwrap_or(false) {
            "tls"
        } else {
            "tcp"
        };
        Ok(Output::Text(format!("connected to {scheme}://{host}:{port}")))
    })
    .help("pretend to open a connection")
    .param(ParameterSpec::string("host"))
    .param(ParameterSpec::integer("port").with_default(ArgValue::Int(22)))
    .param(ParameterSpec::boolean("secure").with_default(false))
}

fn sleep_command() -> CommandDescriptor {
    CommandDescriptor::new("sleep", |args: BoundArgs| async move {
        let duration = args
            .custom::<Duration>("duration")
            .ok_or_else(|| anyhow!("duration is missing"))?;
        let signal = args
            .injected::<CancelSignal>()
            .ok_or_else(|| anyhow!("cancel signal is not available"))?;

        tokio::select! {
            _ = tokio::time::sleep(*duration) => {
                Ok(Output::Text(format!("slept {:.3}s", duration.as_secs_f64())))
            }
            _ = signal.canceled() => Err(anyhow!("sleep interrupted")),
        }
    })
    .help("wait for a while (ctrl-c cancels)")
    .param(ParameterSpec::new("duration", ParamType::custom(DURATION_TAG)))
    .param(ParameterSpec::injected::<CancelSignal>("signal"))
}

fn users_command() -> CommandDescriptor {
    CommandDescriptor::new("users", |args: BoundArgs| async move {
        let directory = args
            .injected::<UserDirectory>()
            .ok_or_else(|| anyhow!("user directory is not available"))?;

        match args.str("action") {
            Some("show") => {
                let name = args
                    .str("name")
                    .ok_or_else(|| anyhow!("users show needs a name"))?;
                let user = directory
                    .find(name)
                    .ok_or_else(|| anyhow!("user not found: {name}"))?;
                Ok(Output::Records(UserDirectory::records(std::iter::once(user))))
            }
            _ => Ok(Output::Records(UserDirectory::records(directory.users.iter()))),
        }
    })
    .help("list users or show one (try `users \\` then `list`)")
    .param(ParameterSpec::new(
        "action",
        ParamType::enumeration("Action", ["list", "show"]),
    ))
    .param(
        ParameterSpec::string("name")
            .with_default(ArgValue::Absent)
            .with_suggestions(|registry, _| {
                registry
                    .get::<UserDirectory>()
                    .map(|directory| directory.names())
                    .unwrap_or_default()
            }),
    )
    .param(ParameterSpec::injected::<UserDirectory>("directory"))
}

fn history_command() -> CommandDescriptor {
    CommandDescriptor::new("history", |args: BoundArgs| async move {
        let history = args
            .injected::<Mutex<HistoryBuffer>>()
            .ok_or_else(|| anyhow!("history is not available in this mode"))?;
        let count = usize::try_from(args.int("count").unwrap_or(DEFAULT_HISTORY_COUNT)).unwrap_or(0);

        let history = history
            .lock()
            .map_err(|_| anyhow!("history is unavailable"))?;
        let entries = history.recent(count);
        let first = history.len() - entries.len() + 1;
        Ok(Output::Lines(
            entries
                .iter()
                .enumerate()
                .map(|(idx, entry)| format!("{:>5}  {entry}", first + idx))
                .collect(),
        ))
    })
    .help("show recent input lines")
    .param(ParameterSpec::integer("count").with_default(ArgValue::Int(DEFAULT_HISTORY_COUNT)))
    .param(ParameterSpec::injected::<Mutex<HistoryBuffer>>("history"))
}
