//! A crate for turning text into FIGlet ASCII art, printed to a terminal or drawn onto a
//! transparent PNG image.
//!
//! # Overview
//!
//! - [`command`]: the accepted command shapes, and their resolution against the defaults
//! - [`config`]: defaults read from environment variables ([`Setting`](crate::config::Setting))
//! - [`catalog`]: discovery of bundled and installed `.flf` fonts
//! - [`font`]: FIGfont decoding
//! - [`render`]: ASCII art rendering and rasterization, driven by
//!   [`Dispatcher`](crate::render::Dispatcher)
//! - [`output`]: writing the image file
//!
//! # Example
//!
//! ```no_run
//! # use fig::catalog::FontDirs;
//! # use fig::command::{Request, Shape};
//! # use fig::config::Config;
//! # use fig::render::{Dispatcher, Figlet, UnifontRasterizer};
//! let shape = Shape::implicit(&["slant", "Hello", "hello.png"])?;
//! let Request::Generate { figure, output, canvas } = shape.resolve(Config::from_env)? else {
//!     unreachable!();
//! };
//! let fonts = FontDirs::from_env();
//! let figlet = Figlet::new();
//! let rasterizer = UnifontRasterizer::new();
//! let png = Dispatcher::new(&fonts, &figlet, &rasterizer).generate(&figure, &canvas)?;
//! fig::output::write_image(&output, &png)?;
//! # Ok::<(), fig::Error>(())
//! ```

use std::io;

pub mod catalog;
pub mod command;
pub mod config;
pub mod font;
pub mod output;
pub mod render;
mod str_ext;

/// Any failure while running a command
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An environment variable has an unusable value.
    #[error(transparent)]
    Config(#[from] config::ConfigError),
    /// The arguments do not form a command.
    #[error(transparent)]
    Parse(#[from] command::ParseError),
    /// The requested font is neither bundled nor installed.
    #[error(r#"font "{0}" not found, run `fig list` to see the available fonts"#)]
    FontNotFound(String),
    /// The font directories could not be searched.
    #[error(transparent)]
    Catalog(#[from] catalog::CatalogError),
    /// The art could not be rendered or rasterized.
    #[error(transparent)]
    Render(#[from] render::RenderError),
    /// The image could not be written.
    #[error(transparent)]
    Write(#[from] output::WriteError),
    /// Standard output could not be written.
    #[error("failed to write to standard output")]
    Stdout(#[from] io::Error),
}
