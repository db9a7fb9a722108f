//! Declared parameter types and bound argument values.
//!
//! A test method declares each parameter by name and [`ParamType`]. The binder turns the caller's
//! string map into [`ArgValue`]s; fixture bodies read them back through [`Args`] with the typed
//! [`Param`] conversion.

use std::fmt;

/// Declared type of a test parameter.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum ParamType {
    String,
    Int32,
    Decimal,
    Boolean,
    Enum { type_name: String, members: Vec<String> },
    /// Any other declared type. The binder rejects it and binds an absent value.
    Unsupported { type_name: String },
}

impl ParamType {
    /// Parameter type of a `#[derive(ParamEnum)]` enum.
    pub fn of_enum<E: ParamEnum>() -> Self {
        ParamType::Enum {
            type_name: E::TYPE_NAME.to_string(),
            members: E::MEMBERS.iter().map(|m| m.to_string()).collect(),
        }
    }

    pub fn unsupported(type_name: impl Into<String>) -> Self {
        ParamType::Unsupported {
            type_name: type_name.into(),
        }
    }

    /// Tag reported by flat listings.
    pub fn type_tag(&self) -> &str {
        match self {
            ParamType::String => "string",
            ParamType::Int32 => "int32",
            ParamType::Decimal => "decimal",
            ParamType::Boolean => "boolean",
            ParamType::Enum { .. } => "enum",
            ParamType::Unsupported { type_name } => type_name,
        }
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamType::Enum { type_name, .. } | ParamType::Unsupported { type_name } => f.write_str(type_name),
            other => f.write_str(other.type_tag()),
        }
    }
}

/// One bound argument.
#[derive(Debug, Clone, PartialEq)]
pub enum ArgValue {
    /// Placeholder for a parameter that was not supplied or could not be bound.
    Null,
    String(String),
    Int32(i32),
    Decimal(f64),
    Boolean(bool),
    Enum { type_name: String, member: String },
}

impl ArgValue {
    pub fn is_null(&self) -> bool {
        matches!(self, ArgValue::Null)
    }
}

/// Rust types usable as test parameters.
pub trait Param: Sized {
    fn param_type() -> ParamType;
    fn from_arg(arg: &ArgValue) -> Option<Self>;
}

impl Param for String {
    fn param_type() -> ParamType {
        ParamType::String
    }

    fn from_arg(arg: &ArgValue) -> Option<Self> {
        match arg {
            ArgValue::String(s) => Some(s.clone()),
            _ => None,
        }
    }
}

impl Param for i32 {
    fn param_type() -> ParamType {
        ParamType::Int32
    }

    fn from_arg(arg: &ArgValue) -> Option<Self> {
        match arg {
            ArgValue::Int32(v) => Some(*v),
            _ => None,
        }
    }
}

impl Param for f64 {
    fn param_type() -> ParamType {
        ParamType::Decimal
    }

    fn from_arg(arg: &ArgValue) -> Option<Self> {
        match arg {
            ArgValue::Decimal(v) => Some(*v),
            _ => None,
        }
    }
}

impl Param for bool {
    fn param_type() -> ParamType {
        ParamType::Boolean
    }

    fn from_arg(arg: &ArgValue) -> Option<Self> {
        match arg {
            ArgValue::Boolean(v) => Some(*v),
            _ => None,
        }
    }
}

/// Fieldless enums usable as parameters. Derive it with `#[derive(ParamEnum)]`.
pub trait ParamEnum: Sized {
    const TYPE_NAME: &'static str;
    const MEMBERS: &'static [&'static str];

    fn from_member(name: &str) -> Option<Self>;
    fn member(&self) -> &'static str;
}

/// Positional argument list with parameter names attached.
///
/// The list always has exactly one entry per declared parameter, in declaration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Args {
    entries: Vec<(String, ArgValue)>,
}

impl Args {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, name: impl Into<String>, value: ArgValue) {
        self.entries.push((name.into(), value));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn values(&self) -> impl Iterator<Item = &ArgValue> {
        self.entries.iter().map(|(_, value)| value)
    }

    pub fn raw(&self, name: &str) -> Option<&ArgValue> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, value)| value)
    }

    /// Typed value of the named argument; `None` when absent, null or of another type.
    pub fn get<T: Param>(&self, name: &str) -> Option<T> {
        self.raw(name).and_then(T::from_arg)
    }

    pub fn at<T: Param>(&self, index: usize) -> Option<T> {
        self.entries.get(index).and_then(|(_, value)| T::from_arg(value))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::ParamEnum;

    #[derive(Debug, PartialEq, ParamEnum)]
    enum Shade {
        Light,
        Dark,
    }

    #[test]
    fn derived_enum_reports_members() {
        assert_eq!(
            Shade::param_type(),
            ParamType::Enum {
                type_name: "Shade".into(),
                members: vec!["Light".into(), "Dark".into()],
            }
        );
        assert_eq!(Shade::Dark.member(), "Dark");
        assert_eq!(Shade::from_member("Light"), Some(Shade::Light));
        assert_eq!(Shade::from_member("light"), None);
    }

    #[test]
    fn args_read_by_name_and_index() {
        let mut args = Args::new();
        args.push("x", ArgValue::Int32(4));
        args.push("shade", ArgValue::Enum { type_name: "Shade".into(), member: "Dark".into() });
        args.push("missing", ArgValue::Null);

        assert_eq!(args.len(), 3);
        assert_eq!(args.get::<i32>("x"), Some(4));
        assert_eq!(args.at::<Shade>(1), Some(Shade::Dark));
        assert_eq!(args.get::<String>("x"), None);
        assert!(args.raw("missing").unwrap().is_null());
        assert_eq!(args.get::<bool>("nope"), None);
    }

    #[test]
    fn type_tags() {
        assert_eq!(ParamType::Int32.type_tag(), "int32");
        assert_eq!(ParamType::unsupported("DateTime").type_tag(), "DateTime");
        assert_eq!(ParamType::of_enum::<Shade>().type_tag(), "enum");
    }
}
