//! 바인딩된 인자 값과 핸들러 반환 값.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::domain::command::same_name;

/// 파라미터 하나에 바인딩된 값.
#[derive(Clone)]
pub enum ArgValue {
    /// 기본값도 주입값도 없는 빈 슬롯
    Absent,
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    /// enum 파라미터의 선언된(정규화된) 이름
    Enum(String),
    /// 호스트 정의 변환기가 만든 값
    Custom(Arc<dyn Any + Send + Sync>),
    /// 주입 레지스트리에서 채워진 인스턴스
    Injected(Arc<dyn Any + Send + Sync>),
}

impl ArgValue {
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }
}

impl PartialEq for ArgValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Absent, Self::Absent) => true,
            (Self::Str(a), Self::Str(b)) => a == b,
            (Self::Int(a), Self::Int(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a == b,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Enum(a), Self::Enum(b)) => a == b,
            (Self::Custom(a), Self::Custom(b)) | (Self::Injected(a), Self::Injected(b)) => {
                Arc::ptr_eq(a, b)
            }
            _ => false,
        }
    }
}

impl fmt::Debug for ArgValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Absent => write!(f, "Absent"),
            Self::Str(s) => write!(f, "Str({s:?})"),
            Self::Int(n) => write!(f, "Int({n})"),
            Self::Float(n) => write!(f, "Float({n})"),
            Self::Bool(b) => write!(f, "Bool({b})"),
            Self::Enum(name) => write!(f, "Enum({name})"),
            Self::Custom(_) => write!(f, "Custom(..)"),
            Self::Injected(_) => write!(f, "Injected(..)"),
        }
    }
}

impl fmt::Display for ArgValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Absent => write!(f, "null"),
            Self::Str(s) => write!(f, "{s}"),
            Self::Int(n) => write!(f, "{n}"),
            Self::Float(n) => write!(f, "{n}"),
            Self::Bool(b) => write!(f, "{b}"),
            Self::Enum(name) => write!(f, "{name}"),
            Self::Custom(_) | Self::Injected(_) => write!(f, "<object>"),
        }
    }
}

impl From<&str> for ArgValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for ArgValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

impl From<i64> for ArgValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<bool> for ArgValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

/// 핸들러에 전달되는 완성된 인자 목록(파라미터 순서 그대로).
#[derive(Debug, Clone, PartialEq)]
pub struct BoundArgs {
    names: Vec<String>,
    values: Vec<ArgValue>,
}

impl BoundArgs {
    pub fn new(names: Vec<String>, values: Vec<ArgValue>) -> Self {
        Self { names, values }
    }

    pub fn values(&self) -> &[ArgValue] {
        &self.values
    }

    /// 파라미터 이름(대소문자 무시)으로 값을 찾는다.
    pub fn get(&self, name: &str) -> Option<&ArgValue> {
        let idx = self
            .names
            .iter()
            .position(|n| same_name(n, name))?;
        self.values.get(idx)
    }

    /// 문자열 또는 enum 이름 값을 반환한다.
    pub fn str(&self, name: &str) -> Option<&str> {
        match self.get(name)? {
            ArgValue::Str(s) | ArgValue::Enum(s) => Some(s),
            _ => None,
        }
    }

    pub fn int(&self, name: &str) -> Option<i64> {
        match self.get(name)? {
            ArgValue::Int(n) => Some(*n),
            _ => None,
        }
    }

    pub fn float(&self, name: &str) -> Option<f64> {
        match self.get(name)? {
            ArgValue::Float(n) => Some(*n),
            ArgValue::Int(n) => Some(*n as f64),
            _ => None,
        }
    }

    pub fn bool(&self, name: &str) -> Option<bool> {
        match self.get(name)? {
            ArgValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// 호스트 변환기가 만든 값을 원래 타입으로 꺼낸다.
    pub fn custom<T: Any + Send + Sync>(&self, name: &str) -> Option<Arc<T>> {
        match self.get(name)? {
            ArgValue::Custom(value) => value.clone().downcast::<T>().ok(),
            _ => None,
        }
    }

    /// 주입된 인스턴스 중 타입이 일치하는 첫 번째 값을 반환한다.
    pub fn injected<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        self.values.iter().find_map(|value| match value {
            ArgValue::Injected(instance) => instance.clone().downcast::<T>().ok(),
            _ => None,
        })
    }
}

/// 핸들러 반환 값. 결과 렌더러가 형태에 맞게 출력한다.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Output {
    #[default]
    Nothing,
    Text(String),
    Lines(Vec<String>),
    Records(Vec<Map<String, Value>>),
    Value(Value),
}

impl From<()> for Output {
    fn from(_: ()) -> Self {
        Self::Nothing
    }
}

impl From<String> for Output {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for Output {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<Vec<String>> for Output {
    fn from(value: Vec<String>) -> Self {
        Self::Lines(value)
    }
}

impl From<Value> for Output {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}
