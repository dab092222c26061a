//! Command shapes and their resolution against the configured defaults
//!
//! A [`Shape`] is what was typed: every parameter is optional. Resolving it against a
//! [`Config`] produces a [`Request`] in which font and text are always present and non-empty,
//! and which carries an output path exactly when an image is to be generated.
//!
//! Besides the explicit subcommands, three implicit forms are accepted, recognized by the
//! number of arguments and a trailing `.png` (see [`Shape::implicit`]):
//!
//! ```text
//! fig out.png                 # default font and text
//! fig 'Some text' out.png     # default font
//! fig slant 'Some text' out.png
//! ```
//!
//! The grammar cannot tell a subcommand name from text that happens to be spelled the same:
//! `fig list out.png` is not the implicit form for the text "list". Use
//! `fig generate <font> list out.png` instead.

use std::path::PathBuf;

use log::debug;
use thiserror::Error;

use crate::config::{Canvas, Config, ConfigError};
use crate::str_ext::StrExt as _;

/// Output file used by `generate` when none is given
pub const DEFAULT_OUTPUT: &str = "figlet_output.png";

/// A command as given on the command line, before defaults are filled in
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shape {
    /// Print usage
    Help,
    /// Print the available fonts
    List,
    /// Print ASCII art to the terminal
    Preview {
        /// Font name
        font: Option<String>,
        /// Text to render
        text: Option<String>,
    },
    /// Render ASCII art to a PNG file
    Generate {
        /// Font name
        font: Option<String>,
        /// Text to render
        text: Option<String>,
        /// Image file to write
        output: Option<PathBuf>,
    },
}

impl Shape {
    /// `preview [font] [text]`
    #[must_use]
    pub fn preview(font: Option<String>, text: Option<String>) -> Self {
        Self::Preview { font, text }
    }

    /// `generate [font] [text] [file]`, filled positionally.
    ///
    /// A lone argument ending in `.png` is the output file rather than a font, like the
    /// one-argument implicit form.
    #[must_use]
    pub fn generate(font: Option<String>, text: Option<String>, output: Option<PathBuf>) -> Self {
        match (font, text, output) {
            (Some(font), None, None) if font.is_png_path() => Self::Generate {
                font: None,
                text: None,
                output: Some(font.into()),
            },
            (font, text, output) => Self::Generate { font, text, output },
        }
    }

    /// Classifies arguments that do not start with a subcommand.
    ///
    /// | arguments                  | meaning                        |
    /// |----------------------------|--------------------------------|
    /// | `<file.png>`               | default font and text          |
    /// | `<text> <file.png>`        | default font                   |
    /// | `<font> <text> <file.png>` | everything explicit            |
    ///
    /// # Errors
    /// Any other shape is [`ParseError::Unrecognized`].
    pub fn implicit<S: AsRef<str>>(args: &[S]) -> Result<Self, ParseError> {
        let args: Vec<&str> = args.iter().map(AsRef::as_ref).collect();
        let shape = match args[..] {
            [output] if output.is_png_path() => Self::Generate {
                font: None,
                text: None,
                output: Some(output.into()),
            },
            [text, output] if output.is_png_path() => Self::Generate {
                font: None,
                text: Some(text.to_owned()),
                output: Some(output.into()),
            },
            [font, text, output] if output.is_png_path() => Self::Generate {
                font: Some(font.to_owned()),
                text: Some(text.to_owned()),
                output: Some(output.into()),
            },
            _ => {
                return Err(ParseError::Unrecognized(
                    args.into_iter().map(str::to_owned).collect(),
                ))
            }
        };
        Ok(shape)
    }

    /// Fills in the missing parameters.
    ///
    /// `config` is only called for commands that render something, so `help` and `list` work
    /// regardless of the environment. Empty font or text arguments count as missing.
    ///
    /// # Errors
    /// Whatever `config` returns.
    pub fn resolve(
        self,
        config: impl FnOnce() -> Result<Config, ConfigError>,
    ) -> Result<Request, ConfigError> {
        let request = match self {
            Self::Help => Request::Help,
            Self::List => Request::List,
            Self::Preview { font, text } => {
                let config = config()?;
                Request::Preview(Figure::resolve(font, text, &config))
            }
            Self::Generate { font, text, output } => {
                let config = config()?;
                Request::Generate {
                    figure: Figure::resolve(font, text, &config),
                    output: output
                        .filter(|output| !output.as_os_str().is_empty())
                        .unwrap_or_else(|| DEFAULT_OUTPUT.into()),
                    canvas: config.canvas,
                }
            }
        };
        debug!("resolved request: {request:?}");
        Ok(request)
    }
}

/// A fully resolved command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// Print usage
    Help,
    /// Print the available fonts
    List,
    /// Print the art to the terminal
    Preview(Figure),
    /// Render the art to a PNG file
    Generate {
        /// What to render
        figure: Figure,
        /// Where to write the image
        output: PathBuf,
        /// Image size and color
        canvas: Canvas,
    },
}

/// A font name and the text to render with it; both are non-empty
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Figure {
    /// The font name, as listed by `fig list`
    pub font: String,
    /// The text to render
    pub text: String,
}

impl Figure {
    fn resolve(font: Option<String>, text: Option<String>, config: &Config) -> Self {
        let pick = |given: Option<String>, default: &str| {
            given
                .filter(|given| !given.is_empty())
                .unwrap_or_else(|| default.to_owned())
        };
        Self {
            font: pick(font, &config.font),
            text: pick(text, &config.text),
        }
    }
}

/// Arguments that do not match any command form
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// Arguments without a subcommand that are not one of the implicit `generate` forms
    #[error(
        "unrecognized arguments {0:?}, expected `<file.png>`, `<text> <file.png>` or \
         `<font> <text> <file.png>`"
    )]
    Unrecognized(Vec<String>),
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::{Figure, ParseError, Request, Shape, DEFAULT_OUTPUT};
    use crate::config::{Canvas, Config, ConfigError};

    fn config() -> Result<Config, ConfigError> {
        Ok(Config {
            font: "standard".to_owned(),
            text: "Default".to_owned(),
            canvas: Canvas::default(),
        })
    }

    fn figure(font: &str, text: &str) -> Figure {
        Figure {
            font: font.to_owned(),
            text: text.to_owned(),
        }
    }

    fn generate(font: &str, text: &str, output: &str) -> Request {
        Request::Generate {
            figure: figure(font, text),
            output: PathBuf::from(output),
            canvas: Canvas::default(),
        }
    }

    fn some(s: &str) -> Option<String> {
        Some(s.to_owned())
    }

    #[test]
    fn implicit_one_argument() {
        let shape = Shape::implicit(&["out.png"]).unwrap();
        assert_eq!(
            shape.resolve(config).unwrap(),
            generate("standard", "Default", "out.png")
        );
    }

    #[test]
    fn implicit_two_arguments() {
        let shape = Shape::implicit(&["Hello there", "out.png"]).unwrap();
        assert_eq!(
            shape.resolve(config).unwrap(),
            generate("standard", "Hello there", "out.png")
        );
    }

    #[test]
    fn implicit_three_arguments() {
        let shape = Shape::implicit(&["slant", "Hi", "dir/out.png"]).unwrap();
        assert_eq!(
            shape.resolve(config).unwrap(),
            generate("slant", "Hi", "dir/out.png")
        );
    }

    #[test]
    fn implicit_other_shapes() {
        let cases: &[&[&str]] = &[
            &[],
            &["slant"],
            &["slant", "Hi"],
            &["out.png", "Hi"],
            &["slant", "Hi", "out.jpg"],
            &["slant", "Hi", "out.PNG"],
            &["a", "b", "c", "out.png"],
        ];
        for &args in cases {
            assert_eq!(
                Shape::implicit(args),
                Err(ParseError::Unrecognized(
                    args.iter().map(|&arg| arg.to_owned()).collect()
                )),
                "{args:?}"
            );
        }
    }

    #[test]
    fn preview_defaults() {
        assert_eq!(
            Shape::preview(None, None).resolve(config).unwrap(),
            Request::Preview(figure("standard", "Default"))
        );
        assert_eq!(
            Shape::preview(some("slant"), None).resolve(config).unwrap(),
            Request::Preview(figure("slant", "Default"))
        );
        assert_eq!(
            Shape::preview(some("slant"), some("Hi")).resolve(config).unwrap(),
            Request::Preview(figure("slant", "Hi"))
        );
    }

    #[test]
    fn generate_defaults() {
        assert_eq!(
            Shape::generate(None, None, None).resolve(config).unwrap(),
            generate("standard", "Default", DEFAULT_OUTPUT)
        );
        assert_eq!(
            Shape::generate(some("slant"), None, None)
                .resolve(config)
                .unwrap(),
            generate("slant", "Default", DEFAULT_OUTPUT)
        );
        assert_eq!(
            Shape::generate(some("slant"), some("Hi"), None)
                .resolve(config)
                .unwrap(),
            generate("slant", "Hi", DEFAULT_OUTPUT)
        );
        assert_eq!(
            Shape::generate(some("slant"), some("Hi"), Some("x.png".into()))
                .resolve(config)
                .unwrap(),
            generate("slant", "Hi", "x.png")
        );
    }

    #[test]
    fn generate_lone_png_is_output() {
        assert_eq!(
            Shape::generate(some("x.png"), None, None),
            Shape::Generate {
                font: None,
                text: None,
                output: Some("x.png".into())
            }
        );
    }

    #[test]
    fn empty_arguments_take_defaults() {
        assert_eq!(
            Shape::generate(some(""), some(""), Some(PathBuf::new()))
                .resolve(config)
                .unwrap(),
            generate("standard", "Default", DEFAULT_OUTPUT)
        );
    }

    #[test]
    fn help_and_list_skip_config() {
        let broken = || -> Result<Config, ConfigError> { panic!("config should not be loaded") };
        assert_eq!(Shape::Help.resolve(broken).unwrap(), Request::Help);
        assert_eq!(Shape::List.resolve(broken).unwrap(), Request::List);
    }

    #[test]
    fn config_errors_propagate() {
        let broken = || {
            Config::from_lookup(|var| (var == "CANVAS_WIDTH").then(|| "abc".to_owned()))
        };
        assert!(matches!(
            Shape::generate(None, None, None).resolve(broken),
            Err(ConfigError::Integer { .. })
        ));
    }
}
