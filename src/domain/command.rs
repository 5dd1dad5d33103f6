//! 명령 서술자(CommandDescriptor)와 명령 테이블.
//!
//! 테이블은 시작 시 한 번 구성되고 이후에는 읽기 전용이다.

use std::any::{Any, TypeId};
use std::collections::BTreeMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;

use anyhow::Result;
use futures::FutureExt;
use futures::future::BoxFuture;

use crate::domain::error::TableError;
use crate::domain::injectables::InjectableRegistry;
use crate::domain::value::{ArgValue, BoundArgs, Output};

/// 전체 목록에서 명령 이름을 맞추는 열 폭.
pub const HELP_NAME_WIDTH: usize = 20;

/// 명령/파라미터 이름 비교 규칙(유니코드 소문자 변환 후 비교).
pub fn same_name(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

/// 비동기 명령 핸들러.
pub type Handler = Arc<dyn Fn(BoundArgs) -> BoxFuture<'static, Result<Output>> + Send + Sync>;

/// 파라미터별 값 추천 제공자. 비어 있지 않은 목록을 반환하면 기본 추천보다 우선한다.
pub type SuggestionProvider = Arc<dyn Fn(&InjectableRegistry, &str) -> Vec<String> + Send + Sync>;

/// 파라미터 선언 타입 태그.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParamType {
    String,
    Integer,
    Float,
    Boolean,
    Enum { name: String, variants: Vec<String> },
    /// 변환 레지스트리에 등록된 호스트 정의 타입
    Custom(String),
    /// 주입 레지스트리에서 자동으로 채워지는 타입
    Injected {
        type_id: TypeId,
        type_name: &'static str,
    },
}

impl ParamType {
    pub fn enumeration<I, S>(name: &str, variants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Enum {
            name: name.to_string(),
            variants: variants.into_iter().map(Into::into).collect(),
        }
    }

    pub fn injected<T: Any + Send + Sync>() -> Self {
        Self::Injected {
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
        }
    }

    pub fn custom(tag: &str) -> Self {
        Self::Custom(tag.to_string())
    }

    /// 문법 요약에 표시되는 타입 이름.
    pub fn display_name(&self) -> &str {
        match self {
            Self::String => "string",
            Self::Integer => "int",
            Self::Float => "float",
            Self::Boolean => "bool",
            Self::Enum { name, .. } => name,
            Self::Custom(tag) => tag,
            Self::Injected { type_name, .. } => type_name,
        }
    }

    pub fn is_boolean(&self) -> bool {
        matches!(self, Self::Boolean)
    }

    pub fn is_injected(&self) -> bool {
        matches!(self, Self::Injected { .. })
    }
}

/// 명령 파라미터 하나의 선언.
#[derive(Clone)]
pub struct ParameterSpec {
    pub name: String,
    pub param_type: ParamType,
    pub default: Option<ArgValue>,
    pub suggestions: Option<SuggestionProvider>,
}

impl ParameterSpec {
    pub fn new(name: &str, param_type: ParamType) -> Self {
        Self {
            name: name.to_string(),
            param_type,
            default: None,
            suggestions: None,
        }
    }

    pub fn string(name: &str) -> Self {
        Self::new(name, ParamType::String)
    }

    pub fn integer(name: &str) -> Self {
        Self::new(name, ParamType::Integer)
    }

    pub fn boolean(name: &str) -> Self {
        Self::new(name, ParamType::Boolean)
    }

    pub fn injected<T: Any + Send + Sync>(name: &str) -> Self {
        Self::new(name, ParamType::injected::<T>())
    }

    pub fn with_default(mut self, value: impl Into<ArgValue>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn with_suggestions<F>(mut self, provider: F) -> Self
    where
        F: Fn(&InjectableRegistry, &str) -> Vec<String> + Send + Sync + 'static,
    {
        self.suggestions = Some(Arc::new(provider));
        self
    }

    pub fn is_injectable(&self) -> bool {
        self.param_type.is_injected()
    }

    /// 기본값도 없고 주입 대상도 아니면 사용자가 반드시 지정해야 한다.
    pub fn is_required(&self) -> bool {
        self.default.is_none() && !self.is_injectable()
    }

    /// `(type name)` 또는 `(type [name] = default)` 형태.
    pub fn syntax(&self) -> String {
        let type_name = self.param_type.display_name();
        match &self.default {
            Some(default) => format!("({type_name} [{}] = {default})", self.name),
            None => format!("({type_name} {})", self.name),
        }
    }
}

impl fmt::Debug for ParameterSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParameterSpec")
            .field("name", &self.name)
            .field("param_type", &self.param_type)
            .field("default", &self.default)
            .field("suggestions", &self.suggestions.is_some())
            .finish()
    }
}

/// 이름 있는 명령 하나의 메타데이터와 핸들러.
#[derive(Clone)]
pub struct CommandDescriptor {
    pub name: String,
    pub params: Vec<ParameterSpec>,
    pub help: String,
    pub handler: Handler,
    pub is_default: bool,
}

impl CommandDescriptor {
    pub fn new<F, Fut>(name: &str, handler: F) -> Self
    where
        F: Fn(BoundArgs) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Output>> + Send + 'static,
    {
        Self {
            name: name.to_string(),
            params: Vec::new(),
            help: String::new(),
            handler: Arc::new(move |args| handler(args).boxed()),
            is_default: false,
        }
    }

    pub fn help(mut self, help: &str) -> Self {
        self.help = help.to_string();
        self
    }

    pub fn param(mut self, param: ParameterSpec) -> Self {
        self.params.push(param);
        self
    }

    /// 이름이 일치하는 명령이 없을 때 호출되는 대체 명령으로 지정한다.
    pub fn default_command(mut self) -> Self {
        self.is_default = true;
        self
    }

    /// 파라미터 이름(대소문자 무시)으로 위치를 찾는다.
    pub fn param_index(&self, name: &str) -> Option<usize> {
        self.params
            .iter()
            .position(|p| same_name(&p.name, name))
    }

    /// 사용자에게 보이는 파라미터(주입 대상 제외).
    pub fn visible_params(&self) -> impl Iterator<Item = &ParameterSpec> {
        self.params.iter().filter(|p| !p.is_injectable())
    }

    /// `<name> <param-syntax...>` 문법 요약.
    pub fn syntax(&self) -> String {
        let mut out = self.name.clone();
        for param in self.visible_params() {
            out.push(' ');
            out.push_str(&param.syntax());
        }
        out
    }
}

impl fmt::Debug for CommandDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandDescriptor")
            .field("name", &self.name)
            .field("params", &self.params)
            .field("help", &self.help)
            .field("is_default", &self.is_default)
            .finish()
    }
}

/// 대소문자 무시 이름 → 명령 서술자 매핑.
#[derive(Debug, Default)]
pub struct CommandTable {
    commands: BTreeMap<String, CommandDescriptor>,
    default_command: Option<String>,
}

impl CommandTable {
    pub fn builder() -> CommandTableBuilder {
        CommandTableBuilder::default()
    }

    pub fn get(&self, name: &str) -> Option<&CommandDescriptor> {
        self.commands.get(&name.to_lowercase())
    }

    pub fn default_command(&self) -> Option<&CommandDescriptor> {
        self.default_command
            .as_ref()
            .and_then(|key| self.commands.get(key))
    }

    pub fn iter(&self) -> impl Iterator<Item = &CommandDescriptor> {
        self.commands.values()
    }

    /// 등록된 명령 이름(선언된 표기 그대로).
    pub fn names(&self) -> Vec<String> {
        self.commands.values().map(|c| c.name.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// 이름을 고정 폭으로 맞춘 전체 도움말 목록.
    pub fn help_listing(&self) -> Vec<String> {
        let mut lines = Vec::new();
        for command in self.commands.values() {
            // 폭을 넘는 이름도 도움말과 최소 한 칸은 띄운다.
            lines.push(format!(
                "{:<width$} {}",
                command.name,
                command.help,
                width = HELP_NAME_WIDTH - 1
            ));
            lines.push(format!("{:<width$}{}", "", command.syntax(), width = HELP_NAME_WIDTH));
        }
        lines
    }
}

/// 명령 테이블 빌더. 중복 이름은 `build` 시점에 실패한다.
#[derive(Default)]
pub struct CommandTableBuilder {
    pending: Vec<CommandDescriptor>,
}

impl CommandTableBuilder {
    pub fn command(mut self, descriptor: CommandDescriptor) -> Self {
        self.pending.push(descriptor);
        self
    }

    pub fn commands<I>(mut self, descriptors: I) -> Self
    where
        I: IntoIterator<Item = CommandDescriptor>,
    {
        self.pending.extend(descriptors);
        self
    }

    pub fn build(self) -> Result<CommandTable, TableError> {
        let mut table = CommandTable::default();

        for descriptor in self.pending {
            let key = descriptor.name.to_lowercase();
            if table.commands.contains_key(&key) {
                return Err(TableError::DuplicateCommand(descriptor.name));
            }

            for (idx, param) in descriptor.params.iter().enumerate() {
                let duplicated = descriptor.params[..idx]
                    .iter()
                    .any(|p| same_name(&p.name, &param.name));
                if duplicated {
                    return Err(TableError::DuplicateParameter {
                        command: descriptor.name.clone(),
                        parameter: param.name.clone(),
                    });
                }
            }

            if descriptor.is_default {
                if let Some(first) = table.default_command() {
                    return Err(TableError::MultipleDefaultCommands {
                        first: first.name.clone(),
                        second: descriptor.name,
                    });
                }
                table.default_command = Some(key.clone());
            }

            table.commands.insert(key, descriptor);
        }

        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop(name: &str) -> CommandDescriptor {
        CommandDescriptor::new(name, |_| async { Ok(Output::Nothing) })
    }

    fn echo() -> CommandDescriptor {
        noop("echo")
            .help("prints text")
            .param(ParameterSpec::string("text"))
            .param(
                ParameterSpec::new("color", ParamType::enumeration("Color", ["White", "Red"]))
                    .with_default(ArgValue::Enum("White".into())),
            )
            .param(ParameterSpec::injected::<InjectableRegistry>("registry"))
    }

    #[test]
    fn lookup_ignores_case() {
        let table = CommandTable::builder().command(echo()).build().unwrap();
        assert_eq!(table.get("ECHO").map(|c| c.name.as_str()), Some("echo"));
        assert!(table.get("ech").is_none());
    }

    #[test]
    fn duplicate_names_fail_case_insensitively() {
        let err = CommandTable::builder()
            .command(noop("List"))
            .command(noop("list"))
            .build()
            .unwrap_err();
        assert_eq!(err, TableError::DuplicateCommand("list".into()));
    }

    #[test]
    fn only_one_default_command() {
        let err = CommandTable::builder()
            .command(noop("a").default_command())
            .command(noop("b").default_command())
            .build()
            .unwrap_err();
        assert!(matches!(err, TableError::MultipleDefaultCommands { .. }));
    }

    #[test]
    fn duplicate_parameter_names_fail() {
        let err = CommandTable::builder()
            .command(
                noop("x")
                    .param(ParameterSpec::string("a"))
                    .param(ParameterSpec::integer("A")),
            )
            .build()
            .unwrap_err();
        assert!(matches!(err, TableError::DuplicateParameter { .. }));
    }

    #[test]
    fn syntax_hides_injected_and_marks_optional() {
        assert_eq!(echo().syntax(), "echo (string text) (Color [color] = White)");
    }

    #[test]
    fn help_listing_pads_names() {
        let table = CommandTable::builder().command(echo()).build().unwrap();
        let listing = table.help_listing();
        assert_eq!(listing[0], format!("{:<20}prints text", "echo"));
        assert!(listing[1].trim_start().starts_with("echo (string text)"));
    }

    #[test]
    fn help_listing_separates_long_names() {
        let long = "synchronize-everything-now";
        let table = CommandTable::builder()
            .command(noop(long).help("sync all"))
            .build()
            .unwrap();
        assert_eq!(table.help_listing()[0], format!("{long} sync all"));
    }

    #[test]
    fn parameter_names_fold_like_command_names() {
        let command = noop("größe")
            .param(ParameterSpec::string("Ärger"))
            .param(ParameterSpec::integer("Ölstand"));
        assert_eq!(command.param_index("ärger"), Some(0));
        assert_eq!(command.param_index("ÖLSTAND"), Some(1));

        let err = CommandTable::builder()
            .command(
                noop("x")
                    .param(ParameterSpec::string("Ärger"))
                    .param(ParameterSpec::string("ärger")),
            )
            .build()
            .unwrap_err();
        assert!(matches!(err, TableError::DuplicateParameter { .. }));

        let table = CommandTable::builder().command(noop("Größe")).build().unwrap();
        assert!(table.get("GRÖSSE").is_none());
        assert!(table.get("GRÖßE").is_some());
    }
}
