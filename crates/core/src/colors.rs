//! Terminal color effects usable from format strings.
//!
//! The palette is passed to templates as an [`Effects`] value. Attribute access extends its
//! effect chain and the field's spec is the text to decorate:
//!
//! ```
//! use promptline_core::colors::Effects;
//! use promptline_core::strformat::{fmt, Args};
//!
//! let args = Args::new().arg(Effects::plain());
//! assert_eq!(fmt("{0.red:alert}", &args)?, "\x1b[31malert\x1b[0m");
//! # Ok::<(), promptline_core::error::Error>(())
//! ```

use std::fmt::{Display, Formatter};
use std::sync::Arc;

use crossterm::style::{Color, Colored};
use indexmap::IndexMap;
use log::debug;
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::strformat::{Formattable, Object, RenderError, Value};

pub const RESET: &str = "\x1b[0m";

/// One named terminal effect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Code emitted before the decorated text.
    Pre(String),
    /// Code emitted after the decorated text.
    Post(String),
    /// Substitution applied to the text itself.
    Replace { from: String, to: String },
}

impl Effect {
    fn pre(code: &str) -> Self {
        Effect::Pre(code.to_string())
    }

    fn apply(&self, text: String) -> String {
        match self {
            Effect::Pre(code) => format!("{code}{text}"),
            Effect::Post(code) => format!("{text}{code}"),
            Effect::Replace { from, to } => text.replace(from.as_str(), to),
        }
    }

    fn code(&self) -> &str {
        match self {
            Effect::Pre(code) | Effect::Post(code) => code,
            Effect::Replace { .. } => "",
        }
    }
}

/// Looks up one of the built-in effects by any of its names.
pub fn builtin_effect(name: &str) -> Option<Effect> {
    let code = match name {
        "clear" | "reset" => return Some(Effect::Post(RESET.to_string())),
        "zb" => {
            return Some(Effect::Replace {
                from: "\0".to_string(),
                to: "]".to_string(),
            })
        }
        "bold" => "\x1b[1m",
        "erase_line" | "el" => "\x1b[K",
        "erase_char" | "ec" => "\x1b[P",
        "dark" => "\x1b[2m",
        "underscore" | "underline" | "under" | "ul" => "\x1b[4m",
        "blink" => "\x1b[5m",
        "reverse" => "\x1b[7m",
        "concealed" => "\x1b[8m",
        "black" => "\x1b[30m",
        "red" => "\x1b[31m",
        "green" => "\x1b[32m",
        "yellow" => "\x1b[33m",
        "blue" => "\x1b[34m",
        "magenta" => "\x1b[35m",
        "cyan" => "\x1b[36m",
        "white" => "\x1b[37m",
        "on_black" => "\x1b[40m",
        "on_red" => "\x1b[41m",
        "on_green" => "\x1b[42m",
        "on_yellow" => "\x1b[43m",
        "on_blue" => "\x1b[44m",
        "on_magenta" => "\x1b[45m",
        "on_cyan" => "\x1b[46m",
        "on_white" => "\x1b[47m",
        _ => return None,
    };
    Some(Effect::pre(code))
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct ColorDefinition {
    pub rgb: Option<(u8, u8, u8)>,
    pub ansi: Option<u8>,
    pub name: Option<String>,
}

/// A foreground or background color in a scheme entry, resolved to a terminal color.
pub trait AsTermColor {
    /// `None` when the definition leaves the color unset.
    fn as_crossterm_color(&self) -> Result<Option<Color>>;
}

impl AsTermColor for ColorDefinition {
    fn as_crossterm_color(&self) -> Result<Option<Color>> {
        match (self.rgb, self.ansi, self.name.as_deref()) {
            (None, None, None) => Ok(None),
            (Some((r, g, b)), None, None) => Ok(Some(Color::Rgb { r, g, b })),
            (None, Some(ansi), None) => Ok(Some(Color::AnsiValue(ansi))),
            (None, None, Some(name)) => named_color(name)
                .map(Some)
                .ok_or_else(|| Error::UnknownColorName(name.to_string())),
            _ => Err(Error::MultipleColorTypes),
        }
    }
}

/// Looks up one of the 16 terminal colors by name.
///
/// Case, `_` and `-` are ignored, so `DarkRed`, `dark_red` and `dark-red` agree; `gray` is
/// accepted for `grey`.
fn named_color(name: &str) -> Option<Color> {
    let key: String = name
        .chars()
        .filter(|c| !matches!(c, '_' | '-' | ' '))
        .map(|c| c.to_ascii_lowercase())
        .collect();
    let key = key.replace("gray", "grey");

    let color = match key.as_str() {
        "black" => Color::Black,
        "darkgrey" => Color::DarkGrey,
        "red" => Color::Red,
        "darkred" => Color::DarkRed,
        "green" => Color::Green,
        "darkgreen" => Color::DarkGreen,
        "yellow" => Color::Yellow,
        "darkyellow" => Color::DarkYellow,
        "blue" => Color::Blue,
        "darkblue" => Color::DarkBlue,
        "magenta" => Color::Magenta,
        "darkmagenta" => Color::DarkMagenta,
        "cyan" => Color::Cyan,
        "darkcyan" => Color::DarkCyan,
        "white" => Color::White,
        "grey" => Color::Grey,
        _ => return None,
    };
    Some(color)
}

/// A color scheme entry as written in YAML.
#[derive(Deserialize, Debug, Clone)]
#[serde(untagged)]
pub enum SchemeEntry {
    /// Space separated effect names, e.g. `"yellow on_black"`.
    Names(String),
    List(Vec<String>),
    Styled {
        foreground: Option<ColorDefinition>,
        background: Option<ColorDefinition>,
        #[serde(default)]
        effects: Vec<String>,
    },
}

/// Named aliases for effect chains, consulted before the built-in effect names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColorScheme {
    aliases: IndexMap<String, Vec<Effect>>,
}

impl ColorScheme {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves every entry up front, so a bad scheme fails at load time.
    pub fn from_entries(entries: IndexMap<String, SchemeEntry>) -> Result<Self> {
        let mut scheme = Self::new();
        for (alias, entry) in entries {
            let effects = resolve_entry(&alias, entry)?;
            debug!("Color alias `{}` resolves to {} effect(s)", alias, effects.len());
            scheme.aliases.insert(alias, effects);
        }
        Ok(scheme)
    }

    /// Adds an alias made of built-in effect names.
    pub fn alias(&mut self, alias: &str, names: &[&str]) -> Result<()> {
        let effects = names
            .iter()
            .map(|name| builtin_effect(name).ok_or_else(|| Error::unknown_effect(alias, name)))
            .collect::<Result<Vec<_>>>()?;
        self.aliases.insert(alias.to_string(), effects);
        Ok(())
    }

    /// The effects behind `name`, alias first, then built-in.
    pub fn lookup(&self, name: &str) -> Option<Vec<Effect>> {
        self.aliases
            .get(name)
            .cloned()
            .or_else(|| builtin_effect(name).map(|effect| vec![effect]))
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }
}

fn resolve_entry(alias: &str, entry: SchemeEntry) -> Result<Vec<Effect>> {
    let (names, mut colors) = match entry {
        SchemeEntry::Names(names) => (
            names.split_whitespace().map(str::to_string).collect(),
            Vec::new(),
        ),
        SchemeEntry::List(names) => (names, Vec::new()),
        SchemeEntry::Styled {
            foreground,
            background,
            effects,
        } => {
            let mut colors = Vec::new();
            if let Some(color) = foreground.as_ref().map(AsTermColor::as_crossterm_color) {
                if let Some(color) = color? {
                    colors.push(Effect::Pre(sgr(Colored::ForegroundColor(color))));
                }
            }
            if let Some(color) = background.as_ref().map(AsTermColor::as_crossterm_color) {
                if let Some(color) = color? {
                    colors.push(Effect::Pre(sgr(Colored::BackgroundColor(color))));
                }
            }
            (effects, colors)
        }
    };

    for name in names {
        let effect = builtin_effect(&name).ok_or_else(|| Error::unknown_effect(alias, &name))?;
        colors.push(effect);
    }
    Ok(colors)
}

fn sgr(colored: Colored) -> String {
    format!("\x1b[{colored}m")
}

/// The palette value handed to templates.
///
/// A disabled palette absorbs any attribute and leaves the decorated text unchanged.
#[derive(Debug, Clone)]
pub struct Effects {
    scheme: Arc<ColorScheme>,
    chain: Vec<Effect>,
    enabled: bool,
}

impl Effects {
    pub fn new(scheme: Arc<ColorScheme>, enabled: bool) -> Self {
        Self {
            scheme,
            chain: Vec::new(),
            enabled,
        }
    }

    /// Built-in effects only, enabled.
    pub fn plain() -> Self {
        Self::new(Arc::new(ColorScheme::new()), true)
    }

    /// A palette that never emits escape codes.
    pub fn disabled() -> Self {
        Self::new(Arc::new(ColorScheme::new()), false)
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Extends the chain with the effects behind `name`.
    pub fn then(&self, name: &str) -> Option<Effects> {
        if !self.enabled {
            return Some(self.clone());
        }
        let effects = self.scheme.lookup(name)?;
        let mut chain = self.chain.clone();
        chain.extend(effects);
        Some(Effects {
            scheme: Arc::clone(&self.scheme),
            chain,
            enabled: true,
        })
    }

    /// Decorates `text` with the chain, closing with a reset.
    pub fn apply(&self, text: &str) -> String {
        if !self.enabled || self.chain.is_empty() {
            return text.to_string();
        }

        let decorated = self
            .chain
            .iter()
            .rev()
            .fold(text.to_string(), |text, effect| effect.apply(text));

        match self.chain.as_slice() {
            [Effect::Pre(_)] | [_, _, ..] => decorated + RESET,
            _ => decorated,
        }
    }
}

impl Display for Effects {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        if self.enabled {
            for effect in &self.chain {
                formatter.write_str(effect.code())?;
            }
        }
        Ok(())
    }
}

impl Formattable for Effects {
    fn format(&self, spec: &str) -> std::result::Result<String, RenderError> {
        Ok(self.apply(spec))
    }
}

impl Object for Effects {
    fn type_name(&self) -> &str {
        "Effects"
    }

    fn attribute(&self, name: &str) -> Option<Value> {
        self.then(name).map(Value::object)
    }

    fn as_formattable(&self) -> Option<&dyn Formattable> {
        Some(self)
    }
}

impl From<Effects> for Value {
    fn from(effects: Effects) -> Self {
        Value::object(effects)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strformat::{fmt, Args};

    fn say(text: &str, palette: Effects) -> String {
        fmt(text, &Args::new().arg(palette)).unwrap()
    }

    #[test]
    fn test_single_effect() {
        assert_eq!(say("{0.red:alert}", Effects::plain()), "\x1b[31malert\x1b[0m");
    }

    #[test]
    fn test_effect_chain_in_order() {
        assert_eq!(
            say("{0.black.on_red.underline:again}", Effects::plain()),
            "\x1b[30m\x1b[41m\x1b[4magain\x1b[0m"
        );
    }

    #[test]
    fn test_post_effect_follows_text() {
        assert_eq!(say("{0.clear:done}", Effects::plain()), "done\x1b[0m");
        assert_eq!(
            say("{0.bold.clear:x}", Effects::plain()),
            "\x1b[1mx\x1b[0m\x1b[0m"
        );
    }

    #[test]
    fn test_replacer() {
        let args = Args::new().arg(Effects::plain()).arg("a\0b");
        assert_eq!(fmt("{0.zb:{1}}", &args).unwrap(), "a]b");
    }

    #[test]
    fn test_unknown_effect_is_attribute_error() {
        let result = fmt("{0.purple:x}", &Args::new().arg(Effects::plain()));
        assert!(matches!(
            result,
            Err(Error::Render(RenderError::AttributeNotFound { .. }))
        ));
    }

    #[test]
    fn test_disabled_palette_absorbs_everything() {
        assert_eq!(say("{0.red.purple.bold:plain}", Effects::disabled()), "plain");
        assert_eq!(say("[{0.red}]", Effects::disabled()), "[]");
    }

    #[test]
    fn test_display_lists_codes() {
        assert_eq!(say("{0.bold.red!s}", Effects::plain()), "\x1b[1m\x1b[31m");
    }

    #[test]
    fn test_scheme_aliases_take_priority() {
        let mut scheme = ColorScheme::new();
        scheme.alias("warning", &["yellow", "on_black"]).unwrap();
        scheme.alias("red", &["blue"]).unwrap();
        let palette = Effects::new(Arc::new(scheme), true);

        assert_eq!(
            say("{0.warning:careful}", palette.clone()),
            "\x1b[33m\x1b[40mcareful\x1b[0m"
        );
        assert_eq!(say("{0.red:x}", palette), "\x1b[34mx\x1b[0m");
    }

    #[test]
    fn test_alias_with_unknown_effect() {
        let mut scheme = ColorScheme::new();
        assert!(matches!(
            scheme.alias("oops", &["sparkly"]),
            Err(Error::UnknownEffect { .. })
        ));
    }

    #[test]
    fn test_scheme_from_yaml_entries() {
        let yaml = r#"
warning: yellow on_black
error: [bold, red]
note:
  foreground:
    ansi: 208
  background:
    rgb: [0, 0, 80]
  effects: [underline]
"#;
        let entries: IndexMap<String, SchemeEntry> = serde_yaml::from_str(yaml).unwrap();
        let scheme = ColorScheme::from_entries(entries).unwrap();

        assert_eq!(
            scheme.lookup("error").unwrap(),
            vec![Effect::pre("\x1b[1m"), Effect::pre("\x1b[31m")]
        );
        assert_eq!(
            scheme.lookup("note").unwrap(),
            vec![
                Effect::pre("\x1b[38;5;208m"),
                Effect::pre("\x1b[48;2;0;0;80m"),
                Effect::pre("\x1b[4m"),
            ]
        );
        assert_eq!(scheme.lookup("warning").unwrap().len(), 2);
    }

    #[test]
    fn test_color_definition_conversion() {
        let named = ColorDefinition {
            name: Some("DarkRed".to_string()),
            ..Default::default()
        };
        assert_eq!(named.as_crossterm_color().unwrap(), Some(Color::DarkRed));

        let spelled = ColorDefinition {
            name: Some("dark_gray".to_string()),
            ..Default::default()
        };
        assert_eq!(spelled.as_crossterm_color().unwrap(), Some(Color::DarkGrey));

        let unknown = ColorDefinition {
            name: Some("chartreuse".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            unknown.as_crossterm_color(),
            Err(Error::UnknownColorName(_))
        ));

        let both = ColorDefinition {
            rgb: Some((1, 2, 3)),
            ansi: Some(4),
            name: None,
        };
        assert!(matches!(
            both.as_crossterm_color(),
            Err(Error::MultipleColorTypes)
        ));
        assert_eq!(ColorDefinition::default().as_crossterm_color().unwrap(), None);
    }
}
