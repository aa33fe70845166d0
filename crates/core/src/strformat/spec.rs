//! The standard format spec applied to values without a custom formatter.
//!
//! `[[fill]align][sign][#][0][width][,][.precision][type]`

use super::error::RenderError;
use super::value::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Right,
    Center,
    /// Padding goes between the sign/prefix and the digits.
    AfterSign,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sign {
    Always,
    NegativeOnly,
    Space,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StandardSpec {
    pub fill: Option<char>,
    pub align: Option<Align>,
    pub sign: Option<Sign>,
    pub alternate: bool,
    pub zero: bool,
    pub width: Option<usize>,
    pub grouping: bool,
    pub precision: Option<usize>,
    pub kind: Option<char>,
}

impl Align {
    fn from_char(c: char) -> Option<Self> {
        match c {
            '<' => Some(Align::Left),
            '>' => Some(Align::Right),
            '^' => Some(Align::Center),
            '=' => Some(Align::AfterSign),
            _ => None,
        }
    }
}

impl Sign {
    fn from_char(c: char) -> Option<Self> {
        match c {
            '+' => Some(Sign::Always),
            '-' => Some(Sign::NegativeOnly),
            ' ' => Some(Sign::Space),
            _ => None,
        }
    }
}

impl StandardSpec {
    pub fn parse(spec: &str) -> Result<Self, RenderError> {
        let chars: Vec<char> = spec.chars().collect();
        let mut parsed = Self::default();
        let mut i = 0;

        if let Some(align) = chars.get(1).copied().and_then(Align::from_char) {
            parsed.fill = Some(chars[0]);
            parsed.align = Some(align);
            i = 2;
        } else if let Some(align) = chars.first().copied().and_then(Align::from_char) {
            parsed.align = Some(align);
            i = 1;
        }

        if let Some(sign) = chars.get(i).copied().and_then(Sign::from_char) {
            parsed.sign = Some(sign);
            i += 1;
        }
        if chars.get(i) == Some(&'#') {
            parsed.alternate = true;
            i += 1;
        }
        if chars.get(i) == Some(&'0') {
            parsed.zero = true;
            i += 1;
        }

        let (width, next) = read_number(&chars, i, spec)?;
        parsed.width = width;
        i = next;

        if chars.get(i) == Some(&',') {
            parsed.grouping = true;
            i += 1;
        }

        if chars.get(i) == Some(&'.') {
            let (precision, next) = read_number(&chars, i + 1, spec)?;
            if precision.is_none() {
                return Err(RenderError::invalid_spec(
                    spec,
                    "format specifier missing precision",
                ));
            }
            parsed.precision = precision;
            i = next;
        }

        match &chars[i..] {
            [] => {}
            [kind] => parsed.kind = Some(*kind),
            _ => return Err(RenderError::invalid_spec(spec, "invalid format specifier")),
        }

        Ok(parsed)
    }

    /// Formats text: only the `s` type is accepted, and precision truncates.
    pub fn apply_text(&self, text: &str, raw: &str) -> Result<String, RenderError> {
        match self.kind {
            None | Some('s') => {}
            Some(kind) => {
                return Err(RenderError::invalid_spec(
                    raw,
                    format!("unknown format code '{kind}' for text"),
                ))
            }
        }
        if self.sign.is_some() {
            return Err(RenderError::invalid_spec(
                raw,
                "sign not allowed in string format specifier",
            ));
        }
        if self.alternate {
            return Err(RenderError::invalid_spec(
                raw,
                "alternate form (#) not allowed in string format specifier",
            ));
        }
        if self.grouping {
            return Err(RenderError::invalid_spec(raw, "cannot specify ',' with 's'"));
        }
        if self.align == Some(Align::AfterSign) {
            return Err(RenderError::invalid_spec(
                raw,
                "'=' alignment not allowed in string format specifier",
            ));
        }

        let body: String = match self.precision {
            Some(precision) => text.chars().take(precision).collect(),
            None => text.to_string(),
        };
        Ok(self.pad("", &body, Align::Left))
    }

    pub fn apply_int(&self, value: i64, raw: &str) -> Result<String, RenderError> {
        if matches!(self.kind, Some('e' | 'E' | 'f' | 'F' | 'g' | 'G' | '%')) {
            return self.apply_float(value as f64, raw);
        }
        if self.precision.is_some() {
            return Err(RenderError::invalid_spec(
                raw,
                "precision not allowed in integer format specifier",
            ));
        }

        let magnitude = value.unsigned_abs();
        let (digits, base_prefix) = match self.kind {
            None | Some('d' | 'n') => (magnitude.to_string(), ""),
            Some('b') => (format!("{magnitude:b}"), "0b"),
            Some('o') => (format!("{magnitude:o}"), "0o"),
            Some('x') => (format!("{magnitude:x}"), "0x"),
            Some('X') => (format!("{magnitude:X}"), "0X"),
            Some('c') => return self.apply_char(value, raw),
            Some(kind) => {
                return Err(RenderError::invalid_spec(
                    raw,
                    format!("unknown format code '{kind}' for integer"),
                ))
            }
        };

        if self.grouping && !base_prefix.is_empty() {
            return Err(RenderError::invalid_spec(raw, "cannot use ',' with a non-decimal type"));
        }

        let digits = if self.grouping {
            group_thousands(&digits)
        } else {
            digits
        };
        let prefix = format!(
            "{}{}",
            self.sign_prefix(value < 0),
            if self.alternate { base_prefix } else { "" }
        );
        Ok(self.pad(&prefix, &digits, Align::Right))
    }

    fn apply_char(&self, value: i64, raw: &str) -> Result<String, RenderError> {
        if self.sign.is_some() || self.alternate || self.grouping {
            return Err(RenderError::invalid_spec(
                raw,
                "sign, alternate form and grouping are not allowed with 'c'",
            ));
        }
        let c = u32::try_from(value)
            .ok()
            .and_then(char::from_u32)
            .ok_or_else(|| RenderError::invalid_spec(raw, format!("{value} is not a character")))?;
        Ok(self.pad("", &c.to_string(), Align::Right))
    }

    pub fn apply_float(&self, value: f64, raw: &str) -> Result<String, RenderError> {
        let magnitude = value.abs();
        let mut body = if magnitude.is_nan() {
            "nan".to_string()
        } else if magnitude.is_infinite() {
            "inf".to_string()
        } else {
            match self.kind {
                Some('f' | 'F') => {
                    let precision = self.precision.unwrap_or(6);
                    format!("{magnitude:.precision$}")
                }
                Some('e' | 'E') => scientific(magnitude, self.precision.unwrap_or(6)),
                Some('%') => {
                    let precision = self.precision.unwrap_or(6);
                    format!("{:.precision$}", magnitude * 100.0)
                }
                Some('g' | 'G') => general(magnitude, self.precision.unwrap_or(6), self.alternate, 0),
                None => match self.precision {
                    None => shortest_repr(magnitude),
                    Some(precision) => {
                        let text = general(magnitude, precision, self.alternate, 1);
                        if text.contains(['.', 'e']) {
                            text
                        } else {
                            text + ".0"
                        }
                    }
                },
                Some(kind) => {
                    return Err(RenderError::invalid_spec(
                        raw,
                        format!("unknown format code '{kind}' for float"),
                    ))
                }
            }
        };

        if self.kind == Some('%') {
            body.push('%');
        }
        if matches!(self.kind, Some('F' | 'E' | 'G')) {
            body = body.to_uppercase();
        }
        if self.grouping {
            let split = body
                .find(|c: char| !c.is_ascii_digit())
                .unwrap_or(body.len());
            body = group_thousands(&body[..split]) + &body[split..];
        }

        let negative = value.is_sign_negative() && !value.is_nan();
        Ok(self.pad(&self.sign_prefix(negative), &body, Align::Right))
    }

    fn sign_prefix(&self, negative: bool) -> &'static str {
        match (negative, self.sign) {
            (true, _) => "-",
            (false, Some(Sign::Always)) => "+",
            (false, Some(Sign::Space)) => " ",
            (false, _) => "",
        }
    }

    fn pad(&self, prefix: &str, body: &str, default_align: Align) -> String {
        let fill = self
            .fill
            .or_else(|| self.zero.then_some('0'))
            .unwrap_or(' ');
        let align = self.align.unwrap_or(if self.zero && default_align == Align::Right {
            Align::AfterSign
        } else {
            default_align
        });

        let length = prefix.chars().count() + body.chars().count();
        let padding = self.width.unwrap_or(0).saturating_sub(length);
        let fills = |count: usize| fill.to_string().repeat(count);

        match align {
            Align::Left => format!("{prefix}{body}{}", fills(padding)),
            Align::Right => format!("{}{prefix}{body}", fills(padding)),
            Align::Center => {
                let left = padding / 2;
                format!("{}{prefix}{body}{}", fills(left), fills(padding - left))
            }
            Align::AfterSign => format!("{prefix}{}{body}", fills(padding)),
        }
    }
}

fn read_number(chars: &[char], start: usize, spec: &str) -> Result<(Option<usize>, usize), RenderError> {
    let end = chars[start.min(chars.len())..]
        .iter()
        .position(|c| !c.is_ascii_digit())
        .map_or(chars.len(), |offset| start + offset);
    if end <= start {
        return Ok((None, start));
    }

    let digits: String = chars[start..end].iter().collect();
    let number = digits
        .parse()
        .map_err(|_| RenderError::invalid_spec(spec, "too many decimal digits in format string"))?;
    Ok((Some(number), end))
}

fn group_thousands(digits: &str) -> String {
    let count = digits.len();
    let mut grouped = String::with_capacity(count + count / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (count - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    grouped
}

/// Scientific notation with a signed exponent of at least two digits.
fn scientific(magnitude: f64, precision: usize) -> String {
    signed_exponent(format!("{magnitude:.precision$e}"))
}

/// Rewrites Rust's `1e16` exponent style as `1e+16`, leaving fixed notation alone.
fn signed_exponent(formatted: String) -> String {
    match formatted.split_once('e') {
        Some((mantissa, exponent)) => {
            let exponent: i32 = exponent.parse().unwrap_or_default();
            let sign = if exponent < 0 { '-' } else { '+' };
            format!("{mantissa}e{sign}{:02}", exponent.abs())
        }
        None => formatted,
    }
}

/// Shortest text that reads back as the same float.
///
/// Very large and very small magnitudes use scientific notation with a signed exponent.
pub(crate) fn shortest_repr(value: f64) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    signed_exponent(format!("{value:?}"))
}

/// Fixed or scientific notation, whichever suits the exponent, with trailing zeros removed.
///
/// `threshold_offset` moves the switch to scientific notation: 0 for `g`, 1 when no type is
/// given, which goes scientific once the exponent reaches `precision - 1`.
fn general(magnitude: f64, precision: usize, alternate: bool, threshold_offset: usize) -> String {
    let precision = precision.max(1);
    let exponent = if magnitude == 0.0 {
        0
    } else {
        let digits = precision - 1;
        format!("{magnitude:.digits$e}")
            .split_once('e')
            .and_then(|(_, exponent)| exponent.parse::<i64>().ok())
            .unwrap_or_default()
    };
    let limit = i64::try_from(precision).unwrap_or(i64::MAX);
    let threshold = limit - i64::try_from(threshold_offset).unwrap_or_default();

    let formatted = if (-4..threshold).contains(&exponent) {
        let decimals = usize::try_from(limit - 1 - exponent).unwrap_or_default();
        format!("{magnitude:.decimals$}")
    } else {
        scientific(magnitude, precision - 1)
    };

    if alternate {
        return formatted;
    }
    match formatted.split_once('e') {
        Some((mantissa, exponent)) => format!("{}e{exponent}", trim_fraction(mantissa)),
        None => trim_fraction(&formatted).to_string(),
    }
}

fn trim_fraction(number: &str) -> &str {
    if number.contains('.') {
        number.trim_end_matches('0').trim_end_matches('.')
    } else {
        number
    }
}

/// Formats text with the standard spec.
///
/// Custom [`Formattable`](super::Formattable) implementations can defer to this for the
/// alignment, width and truncation rules.
pub fn format_text(text: &str, spec: &str) -> Result<String, RenderError> {
    if spec.is_empty() {
        return Ok(text.to_string());
    }
    StandardSpec::parse(spec)?.apply_text(text, spec)
}

/// Formats any value with the standard spec, ignoring custom formatters.
pub fn format_value(value: &Value, spec: &str) -> Result<String, RenderError> {
    if spec.is_empty() {
        return Ok(value.to_string());
    }

    let parsed = StandardSpec::parse(spec)?;
    match value {
        Value::Int(number) => parsed.apply_int(*number, spec),
        Value::Float(number) => parsed.apply_float(*number, spec),
        Value::Str(text) => parsed.apply_text(text, spec),
        other => parsed.apply_text(&other.to_string(), spec),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int(value: i64, spec: &str) -> String {
        format_value(&Value::Int(value), spec).unwrap()
    }

    fn float(value: f64, spec: &str) -> String {
        format_value(&Value::Float(value), spec).unwrap()
    }

    #[test]
    fn test_parse_full_spec() {
        let spec = StandardSpec::parse("*^+#012,.3f").unwrap();
        assert_eq!(
            spec,
            StandardSpec {
                fill: Some('*'),
                align: Some(Align::Center),
                sign: Some(Sign::Always),
                alternate: true,
                zero: true,
                width: Some(12),
                grouping: true,
                precision: Some(3),
                kind: Some('f'),
            }
        );
    }

    #[test]
    fn test_parse_rejects_trailing_garbage() {
        assert!(matches!(
            StandardSpec::parse("5sx"),
            Err(RenderError::InvalidFormatSpec { .. })
        ));
        assert!(StandardSpec::parse(".s").is_err());
    }

    #[test]
    fn test_text_alignment_and_fill() {
        assert_eq!(format_text("result", "x<7s").unwrap(), "resultx");
        assert_eq!(format_text("result", "^9s").unwrap(), " result  ");
        assert_eq!(format_text("result", ">8").unwrap(), "  result");
        assert_eq!(format_text("result", "8").unwrap(), "result  ");
        assert_eq!(format_text("result", "3").unwrap(), "result");
    }

    #[test]
    fn test_text_precision_truncates_characters() {
        assert_eq!(format_text("result", ".3s").unwrap(), "res");
        assert_eq!(format_text("héllo", ".2").unwrap(), "hé");
        assert_eq!(format_text("héllo", "6").unwrap(), "héllo ");
    }

    #[test]
    fn test_text_rejects_numeric_options() {
        assert!(format_text("abc", "d").is_err());
        assert!(format_text("abc", "+").is_err());
        assert!(format_text("abc", "=5").is_err());
        assert!(format_text("abc", ",").is_err());
    }

    #[test]
    fn test_integers() {
        assert_eq!(int(42, "5"), "   42");
        assert_eq!(int(42, "<5"), "42   ");
        assert_eq!(int(-42, "05"), "-0042");
        assert_eq!(int(42, "+d"), "+42");
        assert_eq!(int(42, " d"), " 42");
        assert_eq!(int(1234567, ","), "1,234,567");
        assert_eq!(int(255, "x"), "ff");
        assert_eq!(int(255, "#X"), "0XFF");
        assert_eq!(int(5, "#010b"), "0b00000101");
        assert_eq!(int(8, "o"), "10");
        assert_eq!(int(65, "c"), "A");
        assert_eq!(int(3, ".2f"), "3.00");
    }

    #[test]
    fn test_integer_spec_errors() {
        assert!(format_value(&Value::Int(1), ".2").is_err());
        assert!(format_value(&Value::Int(1), "s").is_err());
        assert!(format_value(&Value::Int(255), ",x").is_err());
        assert!(format_value(&Value::Int(-1), "c").is_err());
    }

    #[test]
    fn test_floats() {
        assert_eq!(float(1.23456, ".2f"), "1.23");
        assert_eq!(float(3.0, "f"), "3.000000");
        assert_eq!(float(-3.5, "8.1f"), "    -3.5");
        assert_eq!(float(1500.0, "e"), "1.500000e+03");
        assert_eq!(float(0.00015, ".1E"), "1.5E-04");
        assert_eq!(float(0.25, ".0%"), "25%");
        assert_eq!(float(1234567.891, ",.2f"), "1,234,567.89");
        assert_eq!(float(2.5, ""), "2.5");
    }

    #[test]
    fn test_general_float_format() {
        assert_eq!(float(0.0001234, "g"), "0.0001234");
        assert_eq!(float(1234567.0, "g"), "1.23457e+06");
        assert_eq!(float(100.0, "g"), "100");
        assert_eq!(float(1.0, ".3"), "1.0");
        assert_eq!(float(1.23456, ".3"), "1.23");
        assert_eq!(float(f64::INFINITY, "F"), "INF");
    }

    #[test]
    fn test_precision_without_type_switches_to_exponent_early() {
        assert_eq!(float(100.0, ".3"), "1e+02");
        assert_eq!(float(10.0, ".3"), "10.0");
        assert_eq!(float(10.0, ".2"), "1e+01");
        assert_eq!(float(0.5, ".1"), "0.5");
        assert_eq!(float(123456.0, ".8"), "123456.0");
        // `g` keeps fixed notation up to the full precision
        assert_eq!(float(100.0, ".3g"), "100");
    }

    #[test]
    fn test_shortest_repr_signs_exponents() {
        assert_eq!(shortest_repr(1e16), "1e+16");
        assert_eq!(shortest_repr(1.5e-7), "1.5e-07");
        assert_eq!(shortest_repr(0.1), "0.1");
        assert_eq!(shortest_repr(f64::NAN), "nan");
        assert_eq!(shortest_repr(f64::NEG_INFINITY), "-inf");
        assert_eq!(float(1e16, ""), "1e+16");
    }

    #[test]
    fn test_other_values_format_as_text() {
        assert_eq!(format_value(&Value::Bool(true), "6").unwrap(), "true  ");
        let list = Value::from(vec![1, 2]);
        assert_eq!(format_value(&list, ">8").unwrap(), "  [1, 2]");
    }
}
