//! Parameter binding: the caller's string map → one typed argument per declared parameter.
//!
//! Binding never changes the argument count. A missing name, an enum value that is not a member,
//! or an unsupported declared type each log a message and bind [`ArgValue::Null`]. Only a value
//! that cannot be parsed as the declared scalar type is an error.

use thiserror::Error;

use crate::StringMap;
use crate::logging::{LogLevel, RunLog};
use crate::module::ParamDecl;
use crate::module::params::{ArgValue, Args, ParamType};

/// Pre-processes every supplied raw value before conversion.
pub trait ExpressionEvaluator: Send + Sync {
    fn evaluate(&self, raw: &str) -> String;
}

/// Returns values unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassThrough;

impl ExpressionEvaluator for PassThrough {
    fn evaluate(&self, raw: &str) -> String {
        raw.to_string()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindError {
    #[error("cannot convert value {value:?} of parameter `{name}` to {target}")]
    Coercion {
        name: String,
        value: String,
        target: &'static str,
    },
}

/// Bind `params` against `supplied`. The result has exactly `params.len()` entries.
pub fn bind(
    params: &[ParamDecl],
    supplied: &StringMap,
    evaluator: &dyn ExpressionEvaluator,
    log: &dyn RunLog,
) -> Result<Args, BindError> {
    let mut args = Args::with_capacity(params.len());
    for param in params {
        let value = match supplied.get(&param.name) {
            Some(raw) => convert(param, &evaluator.evaluate(raw), log)?,
            None => {
                log.write(
                    LogLevel::Warning,
                    &format!("Param ({}) is not specified in the config", param.name),
                );
                ArgValue::Null
            }
        };
        args.push(param.name.clone(), value);
    }
    Ok(args)
}

fn convert(param: &ParamDecl, value: &str, log: &dyn RunLog) -> Result<ArgValue, BindError> {
    let coercion = |target: &'static str| BindError::Coercion {
        name: param.name.clone(),
        value: value.to_string(),
        target,
    };

    match &param.ty {
        ParamType::String => Ok(ArgValue::String(value.to_string())),
        ParamType::Int32 => value
            .trim()
            .parse::<i32>()
            .map(ArgValue::Int32)
            .map_err(|_| coercion("int32")),
        ParamType::Decimal => parse_decimal(value).map(ArgValue::Decimal).ok_or_else(|| coercion("decimal")),
        ParamType::Boolean => parse_bool(value).map(ArgValue::Boolean).ok_or_else(|| coercion("boolean")),
        ParamType::Enum { type_name, members } => {
            if members.iter().any(|m| m == value) {
                Ok(ArgValue::Enum {
                    type_name: type_name.clone(),
                    member: value.to_string(),
                })
            } else {
                log.write(
                    LogLevel::Error,
                    &format!("Enum {type_name} does not contain the value {value}"),
                );
                Ok(ArgValue::Null)
            }
        }
        ParamType::Unsupported { type_name } => {
            log.write(LogLevel::Error, &format!("Type {type_name} is not supported in driver"));
            Ok(ArgValue::Null)
        }
    }
}

/// Plain decimal notation: optional sign, digits, at most one point. No exponent, no inf/nan.
fn parse_decimal(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    let digits = trimmed.strip_prefix(['+', '-']).unwrap_or(trimmed);
    let well_formed = !digits.is_empty()
        && digits.chars().any(|c| c.is_ascii_digit())
        && digits.chars().all(|c| c.is_ascii_digit() || c == '.')
        && digits.matches('.').count() <= 1;
    if !well_formed {
        return None;
    }
    trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn parse_bool(value: &str) -> Option<bool> {
    let trimmed = value.trim();
    if trimmed.eq_ignore_ascii_case("true") {
        Some(true)
    } else if trimmed.eq_ignore_ascii_case("false") {
        Some(false)
    } else {
        None
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::logging::memory::MemoryLog;

    fn decl(name: &str, ty: ParamType) -> ParamDecl {
        ParamDecl { name: name.into(), ty }
    }

    fn map(pairs: &[(&str, &str)]) -> StringMap {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn scalars_are_trimmed_and_parsed() {
        let log = MemoryLog::default();
        let params = [
            decl("n", ParamType::Int32),
            decl("d", ParamType::Decimal),
            decl("b", ParamType::Boolean),
            decl("s", ParamType::String),
        ];
        let args = bind(
            &params,
            &map(&[("n", " 42 "), ("d", "-3.25"), ("b", "TRUE"), ("s", " raw ")]),
            &PassThrough,
            &log,
        )
        .unwrap();
        assert_eq!(args.get::<i32>("n"), Some(42));
        assert_eq!(args.get::<f64>("d"), Some(-3.25));
        assert_eq!(args.get::<bool>("b"), Some(true));
        assert_eq!(args.get::<String>("s").as_deref(), Some(" raw "));
    }

    #[test]
    fn missing_and_rejected_values_keep_arity() {
        let log = MemoryLog::default();
        let params = [
            decl("absent", ParamType::Int32),
            decl(
                "color",
                ParamType::Enum {
                    type_name: "Color".into(),
                    members: vec!["Red".into(), "Blue".into()],
                },
            ),
            decl("when", ParamType::unsupported("DateTime")),
        ];
        let args = bind(&params, &map(&[("color", "red"), ("when", "today")]), &PassThrough, &log).unwrap();
        assert_eq!(args.len(), 3);
        assert!(args.values().all(ArgValue::is_null));

        let lines = log.lines();
        assert!(lines.iter().any(|(l, m)| *l == LogLevel::Warning && m.contains("absent")));
        assert!(lines.iter().any(|(l, m)| *l == LogLevel::Error && m.contains("Enum Color")));
        assert!(lines.iter().any(|(l, m)| *l == LogLevel::Error && m.contains("DateTime")));
    }

    #[test]
    fn enum_match_is_exact() {
        let log = MemoryLog::default();
        let params = [decl(
            "color",
            ParamType::Enum {
                type_name: "Color".into(),
                members: vec!["Red".into()],
            },
        )];
        let args = bind(&params, &map(&[("color", "Red")]), &PassThrough, &log).unwrap();
        assert_eq!(
            args.raw("color"),
            Some(&ArgValue::Enum {
                type_name: "Color".into(),
                member: "Red".into()
            })
        );
    }

    #[test]
    fn invalid_scalars_raise() {
        let log = MemoryLog::default();
        for (ty, value) in [
            (ParamType::Int32, "four"),
            (ParamType::Int32, "99999999999"),
            (ParamType::Decimal, "NaN"),
            (ParamType::Decimal, "1e5"),
            (ParamType::Boolean, "yes"),
        ] {
            let err = bind(&[decl("p", ty.clone())], &map(&[("p", value)]), &PassThrough, &log).unwrap_err();
            assert!(matches!(err, BindError::Coercion { .. }), "{ty:?} {value}");
        }
    }

    #[test]
    fn evaluator_runs_before_conversion() {
        struct Doubler;
        impl ExpressionEvaluator for Doubler {
            fn evaluate(&self, raw: &str) -> String {
                format!("{raw}{raw}")
            }
        }
        let log = MemoryLog::default();
        let args = bind(&[decl("n", ParamType::Int32)], &map(&[("n", "2")]), &Doubler, &log).unwrap();
        assert_eq!(args.get::<i32>("n"), Some(22));
    }
}
