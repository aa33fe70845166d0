use log::debug;
use promptline_core::error::Error::ParameterFormat;
use promptline_core::error::Result;
use promptline_core::strformat::{Args, Value};

/// Interprets a command-line value as an integer, a float, or text.
///
/// ```rust
/// use promptline_cli::arguments::parse_value;
/// use promptline_core::strformat::Value;
///
/// assert_eq!(parse_value("42"), Value::Int(42));
/// assert_eq!(parse_value("2.5"), Value::Float(2.5));
/// assert_eq!(parse_value("forty"), Value::from("forty"));
/// ```
pub fn parse_value(text: &str) -> Value {
    if let Ok(integer) = text.parse::<i64>() {
        return Value::Int(integer);
    }
    // `f64` also accepts words like "inf" and "NaN", which are meant as text here
    if text.chars().any(|c| c.is_ascii_digit()) {
        if let Ok(float) = text.parse::<f64>() {
            return Value::Float(float);
        }
    }
    Value::from(text)
}

/// Builds template arguments from positional values and `key=value` parameters.
///
/// # Errors
///
/// Returns [`ParameterFormat`] if a parameter has no `=` or an empty key.
pub fn build_args(positional: &[String], named: &[String]) -> Result<Args> {
    let mut args: Args = positional.iter().map(|value| parse_value(value)).collect();

    for param_str in named {
        let (key, value) = split_parameter(param_str)?;
        debug!("Parameter `{}` = `{}`", key, value);
        args.insert(key, parse_value(value));
    }

    Ok(args)
}

fn split_parameter(param_str: &str) -> Result<(&str, &str)> {
    match param_str.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key, value)),
        _ => Err(ParameterFormat(param_str.to_string())),
    }
}
