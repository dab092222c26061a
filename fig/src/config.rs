//! Defaults resolved from environment variables
//!
//! Everything `fig` reads from the environment is listed in [`Setting`]. The values are
//! resolved once into a [`Config`], which is then passed on explicitly, so nothing downstream
//! depends on process-wide state.

use std::env;
use std::num::{NonZeroU32, ParseIntError};
use std::str::FromStr;

use itertools::Itertools as _;
use log::debug;
use palette::Srgb;
use thiserror::Error;

macro_rules! settings {
    ($($name:ident => $var:literal, $default:literal, $description:literal;)*) => {

        /// Environment variables read by `fig`
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        #[non_exhaustive]
        pub enum Setting {
            $(
                #[doc = concat!("`", $var, "`: ", $description)]
                $name,
            )*
        }

        impl Setting {
            /// An array containing all the variants
            pub const ALL: [Self; const{0 $(+ {_ = $var; 1} )*}] = [$(Self::$name),*];

            /// The name of the environment variable
            #[must_use]
            pub const fn env_var(self) -> &'static str {
                match self {
                    $(Self::$name => $var,)*
                }
            }

            /// The value used when the variable is unset or empty
            #[must_use]
            pub const fn default_value(self) -> &'static str {
                match self {
                    $(Self::$name => $default,)*
                }
            }

            /// One-line description, as shown in the help text
            #[must_use]
            pub const fn description(self) -> &'static str {
                match self {
                    $(Self::$name => $description,)*
                }
            }

            /// Match an environment variable name to a setting
            #[must_use]
            pub fn from_env_var(var: &str) -> Option<Self> {
                match var {
                    $($var => Some(Self::$name),)*
                    _ => None,
                }
            }
        }
    };
}

settings! {
    Font => "FIGLET_FONT", "larry3d", "Default font";
    Text => "FIGLET_TEXT", "Hello, World!", "Default text";
    CanvasWidth => "CANVAS_WIDTH", "728", "Canvas width in pixels";
    CanvasHeight => "CANVAS_HEIGHT", "90", "Canvas height in pixels";
    FontColor => "FONT_COLOR", "black", "Font color, a CSS color name or #rrggbb";
    FontDir => "FIGLET_FONTDIR", "system figlet directories", "Font search path";
}

impl Setting {
    /// Reads the variable through `lookup`, treating an empty value as unset.
    pub(crate) fn read(self, lookup: impl Fn(&str) -> Option<String>) -> Option<String> {
        lookup(self.env_var()).filter(|value| !value.is_empty())
    }

    fn read_or_default(self, lookup: impl Fn(&str) -> Option<String>) -> String {
        self.read(lookup)
            .unwrap_or_else(|| self.default_value().to_owned())
    }

    fn parse<T: FromStr>(
        self,
        lookup: impl Fn(&str) -> Option<String>,
        error: impl FnOnce(String, T::Err) -> ConfigError,
    ) -> Result<T, ConfigError> {
        let value = self.read_or_default(lookup);
        value.parse().map_err(|e| error(value, e))
    }
}

/// A table of the [settings](Setting) with their defaults, one per line, for help output.
#[must_use]
pub fn environment_help() -> String {
    let width = Setting::ALL
        .iter()
        .map(|setting| setting.env_var().len())
        .max()
        .unwrap_or_default();
    Setting::ALL
        .iter()
        .map(|setting| {
            format!(
                "  {:width$}  {} (default: {})",
                setting.env_var(),
                setting.description(),
                setting.default_value(),
            )
        })
        .join("\n")
}

/// Defaults for everything that can be omitted on the command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Font used when none is given
    pub font: String,
    /// Text rendered when none is given
    pub text: String,
    /// Image settings for `generate`
    pub canvas: Canvas,
}

impl Config {
    /// Resolves the configuration from the process environment.
    ///
    /// # Errors
    /// See [`Config::from_lookup`].
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| env::var(var).ok())
    }

    /// Resolves the configuration, reading variables through `lookup`.
    ///
    /// Unset and empty variables take their [default](Setting::default_value). A value that is
    /// set but cannot be parsed is an error; it is never replaced by the default.
    ///
    /// # Errors
    /// Returns [`ConfigError`] for a canvas dimension that is not a positive integer, or for an
    /// unknown color.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let font = Setting::Font.read_or_default(&lookup);
        let text = Setting::Text.read_or_default(&lookup);
        let width = Setting::CanvasWidth.parse(&lookup, |value, source| ConfigError::Integer {
            var: Setting::CanvasWidth.env_var(),
            value,
            source,
        })?;
        let height = Setting::CanvasHeight.parse(&lookup, |value, source| ConfigError::Integer {
            var: Setting::CanvasHeight.env_var(),
            value,
            source,
        })?;
        let color = Setting::FontColor.parse(&lookup, |value, UnknownColor| ConfigError::Color {
            var: Setting::FontColor.env_var(),
            value,
        })?;
        let config = Self {
            font,
            text,
            canvas: Canvas {
                width,
                height,
                color,
            },
        };
        debug!("resolved configuration: {config:?}");
        Ok(config)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            font: Setting::Font.default_value().to_owned(),
            text: Setting::Text.default_value().to_owned(),
            canvas: Canvas::default(),
        }
    }
}

/// Size and ink color of the image written by `generate`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Canvas {
    /// Width in pixels
    pub width: NonZeroU32,
    /// Height in pixels
    pub height: NonZeroU32,
    /// Color of the rendered text; the background is always transparent
    pub color: FontColor,
}

impl Canvas {
    /// The standard 728×90 "leaderboard" banner with black text.
    pub const LEADERBOARD: Self = Self {
        width: NonZeroU32::new(728).unwrap(),
        height: NonZeroU32::new(90).unwrap(),
        color: FontColor::BLACK,
    };
}

impl Default for Canvas {
    fn default() -> Self {
        Self::LEADERBOARD
    }
}

/// An opaque sRGB color
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FontColor([u8; 3]);

impl FontColor {
    /// Black, the default
    pub const BLACK: Self = Self([0, 0, 0]);

    /// Creates a color from its red, green and blue components.
    #[must_use]
    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self([red, green, blue])
    }

    /// The color with full opacity, as RGBA components.
    #[must_use]
    pub const fn to_rgba(self) -> [u8; 4] {
        let [red, green, blue] = self.0;
        [red, green, blue, u8::MAX]
    }
}

impl FromStr for FontColor {
    type Err = UnknownColor;

    /// Parses a CSS color name (case-insensitive) or a `#rgb`/`#rrggbb` hex code.
    fn from_str(color: &str) -> Result<Self, Self::Err> {
        let rgb: Srgb<u8> = match color.strip_prefix('#') {
            Some(hex) => hex.parse().map_err(|_| UnknownColor)?,
            None => palette::named::from_str(&color.to_ascii_lowercase()).ok_or(UnknownColor)?,
        };
        let (red, green, blue) = rgb.into_components();
        Ok(Self::new(red, green, blue))
    }
}

/// A string that is neither a known color name nor a hex code
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("unknown color")]
pub struct UnknownColor;

/// An environment variable that is set to an unusable value
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A canvas dimension that is not a positive integer
    #[error("{var}={value:?} is not a positive integer")]
    Integer {
        /// The environment variable
        var: &'static str,
        /// Its value
        value: String,
        /// Why it could not be parsed
        #[source]
        source: ParseIntError,
    },
    /// A color that is neither a CSS color name nor a hex code
    #[error("{var}={value:?} is not a color name or #rgb/#rrggbb hex code")]
    Color {
        /// The environment variable
        var: &'static str,
        /// Its value
        value: String,
    },
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::num::NonZeroU32;

    use super::{environment_help, Canvas, Config, ConfigError, FontColor, Setting};

    fn config(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|&(var, value)| (var.to_owned(), value.to_owned()))
            .collect();
        Config::from_lookup(|var| vars.get(var).cloned())
    }

    #[test]
    fn defaults_when_unset() {
        let config = config(&[]).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.font, "larry3d");
        assert_eq!(config.text, "Hello, World!");
        assert_eq!(config.canvas.width.get(), 728);
        assert_eq!(config.canvas.height.get(), 90);
        assert_eq!(config.canvas.color, FontColor::BLACK);
    }

    #[test]
    fn overrides() {
        let config = config(&[
            ("FIGLET_FONT", "slant"),
            ("FIGLET_TEXT", "Hi"),
            ("CANVAS_WIDTH", "300"),
            ("CANVAS_HEIGHT", "120"),
            ("FONT_COLOR", "Red"),
        ])
        .unwrap();
        assert_eq!(config.font, "slant");
        assert_eq!(config.text, "Hi");
        assert_eq!(
            config.canvas,
            Canvas {
                width: NonZeroU32::new(300).unwrap(),
                height: NonZeroU32::new(120).unwrap(),
                color: FontColor::new(255, 0, 0),
            }
        );
    }

    #[test]
    fn empty_is_unset() {
        let config = config(&[("FIGLET_FONT", ""), ("CANVAS_WIDTH", "")]).unwrap();
        assert_eq!(config.font, "larry3d");
        assert_eq!(config.canvas.width.get(), 728);
    }

    #[test]
    fn bad_integer_is_an_error() {
        let error = config(&[("CANVAS_WIDTH", "abc")]).unwrap_err();
        assert!(
            matches!(&error, ConfigError::Integer { var: "CANVAS_WIDTH", value, .. } if value == "abc"),
            "{error:?}"
        );
        assert!(error.to_string().contains("CANVAS_WIDTH"));
    }

    #[test]
    fn zero_is_an_error() {
        let error = config(&[("CANVAS_HEIGHT", "0")]).unwrap_err();
        assert!(matches!(error, ConfigError::Integer { var: "CANVAS_HEIGHT", .. }));
        assert!(config(&[("CANVAS_HEIGHT", "-5")]).is_err());
    }

    #[test]
    fn colors() {
        assert_eq!("black".parse(), Ok(FontColor::BLACK));
        assert_eq!("WHITE".parse(), Ok(FontColor::new(255, 255, 255)));
        assert_eq!("#0a0B0c".parse(), Ok(FontColor::new(10, 11, 12)));
        assert_eq!("#f00".parse(), Ok(FontColor::new(255, 0, 0)));
        assert!("bad".parse::<FontColor>().is_err());
        assert!("#12345".parse::<FontColor>().is_err());
        assert!("123456".parse::<FontColor>().is_err());
    }

    #[test]
    fn bad_color_is_an_error() {
        let error = config(&[("FONT_COLOR", "blurple")]).unwrap_err();
        assert!(matches!(error, ConfigError::Color { var: "FONT_COLOR", .. }));
    }

    #[test]
    fn settings_table() {
        assert_eq!(Setting::ALL.len(), 6);
        for setting in Setting::ALL {
            assert_eq!(Setting::from_env_var(setting.env_var()), Some(setting));
            assert!(!setting.description().is_empty());
        }
        assert_eq!(Setting::from_env_var("HOME"), None);
    }

    #[test]
    fn help_lists_every_variable() {
        let help = environment_help();
        assert_eq!(help.lines().count(), Setting::ALL.len());
        assert!(help.contains("FIGLET_FONT "));
        assert!(help.contains("(default: 728)"));
    }
}
