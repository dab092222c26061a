//! Rendering text to ASCII art, and ASCII art to images
//!
//! The two collaborators are behind narrow traits: [`ArtRenderer`] turns a font and text into
//! ASCII art, [`Rasterizer`] turns ASCII art into PNG bytes. [`Dispatcher`] looks the font up in
//! a [`FontCatalog`] and drives both. [`Renderer`] is the FIGfont layout engine underneath
//! [`Figlet`].
//!
//! ```no_run
//! # use fig::catalog::FontDirs;
//! # use fig::command::Figure;
//! # use fig::render::{Dispatcher, Figlet, UnifontRasterizer};
//! let fonts = FontDirs::system();
//! let figlet = Figlet::new();
//! let rasterizer = UnifontRasterizer::new();
//! let dispatcher = Dispatcher::new(&fonts, &figlet, &rasterizer);
//! let figure = Figure {
//!     font: "standard".to_owned(),
//!     text: "Hi".to_owned(),
//! };
//! dispatcher.preview(&figure, &mut std::io::stdout())?;
//! # Ok::<(), fig::Error>(())
//! ```
mod figlet;
mod layout;
mod raster;

use std::io::{self, Write};
use std::path::PathBuf;

use log::debug;

use crate::catalog::{FontCatalog, FontSource};
use crate::command::Figure;
use crate::config::Canvas;
use crate::font::FontError;
use crate::Error;

pub use figlet::{Figlet, Renderer};
pub use layout::{HorizontalLayout, HorizontalSmushing, Layout, LayoutDecodeError, LayoutMode};
pub use raster::{CropMode, UnifontRasterizer};

/// Produces ASCII art
pub trait ArtRenderer {
    /// Renders `text` with the font found at `font`.
    ///
    /// # Errors
    /// Returns `Err` if the font cannot be loaded or cannot render the text.
    fn render_text(&self, font: &FontSource, text: &str) -> Result<String, RenderError>;
}

/// Produces images of ASCII art
pub trait Rasterizer {
    /// Draws `art` in `canvas.color` on a transparent `canvas.width × canvas.height` canvas and
    /// encodes it as PNG.
    ///
    /// # Errors
    /// Returns `Err` if the image cannot be encoded.
    fn rasterize(&self, art: &str, canvas: &Canvas) -> Result<Vec<u8>, RenderError>;
}

/// Runs the rendering commands against a set of collaborators
#[derive(Debug, Clone, Copy)]
pub struct Dispatcher<'a, C, A, R> {
    catalog: &'a C,
    art: &'a A,
    rasterizer: &'a R,
}

impl<'a, C, A, R> Dispatcher<'a, C, A, R>
where
    C: FontCatalog,
    A: ArtRenderer,
    R: Rasterizer,
{
    /// Creates a dispatcher.
    pub const fn new(catalog: &'a C, art: &'a A, rasterizer: &'a R) -> Self {
        Self {
            catalog,
            art,
            rasterizer,
        }
    }

    /// Renders the ASCII art for `figure`, after looking up its font.
    ///
    /// # Errors
    /// [`Error::FontNotFound`] for an unknown font, otherwise whatever the catalog or the art
    /// renderer report.
    pub fn art(&self, figure: &Figure) -> Result<String, Error> {
        let Some(source) = self.catalog.locate(&figure.font)? else {
            return Err(Error::FontNotFound(figure.font.clone()));
        };
        let art = self.art.render_text(&source, &figure.text)?;
        debug!(
            "rendered {:?} in {} ({source}): {} lines",
            figure.text,
            figure.font,
            art.lines().count()
        );
        Ok(art)
    }

    /// Writes the ASCII art for `figure` to `out`, followed by a newline.
    ///
    /// # Errors
    /// See [`Dispatcher::art`]; also fails if `out` cannot be written to.
    pub fn preview(&self, figure: &Figure, out: &mut impl Write) -> Result<(), Error> {
        let art = self.art(figure)?;
        writeln!(out, "{art}")?;
        out.flush()?;
        Ok(())
    }

    /// Renders `figure` to PNG bytes.
    ///
    /// The art passed to the rasterizer is exactly what [`Dispatcher::preview`] prints.
    ///
    /// # Errors
    /// See [`Dispatcher::art`]; also fails if the rasterizer does.
    pub fn generate(&self, figure: &Figure, canvas: &Canvas) -> Result<Vec<u8>, Error> {
        let art = self.art(figure)?;
        Ok(self.rasterizer.rasterize(&art, canvas)?)
    }

    /// Writes the available fonts to `out`, one per line, sorted.
    ///
    /// # Errors
    /// Fails if the fonts cannot be listed or `out` cannot be written to.
    pub fn list(&self, out: &mut impl Write) -> Result<(), Error> {
        for font in self.catalog.list_fonts()? {
            writeln!(out, "{font}")?;
        }
        out.flush()?;
        Ok(())
    }
}

/// A failure in one of the rendering collaborators
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    /// The font file could not be read.
    #[error("failed to read font file {}", .path.display())]
    ReadFont {
        /// The font file
        path: PathBuf,
        /// The underlying error
        #[source]
        source: io::Error,
    },
    /// The font file is not a valid FIGfont.
    #[error("failed to decode font {font}")]
    DecodeFont {
        /// The font name or path
        font: String,
        /// What the decoder reported
        #[source]
        source: FontError,
    },
    /// The font has no character for any part of the text.
    #[error(r#"font "{font}" cannot render {text:?}"#)]
    Unrenderable {
        /// The font name
        font: String,
        /// The text
        text: String,
    },
    /// The image could not be encoded.
    #[error("failed to encode image: {0}")]
    Encode(#[from] image::ImageError),
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::path::PathBuf;

    use super::{ArtRenderer, Dispatcher, Rasterizer, RenderError};
    use crate::catalog::{CatalogError, FontCatalog, FontSource};
    use crate::command::Figure;
    use crate::config::{Canvas, FontColor};
    use crate::Error;

    /// Fonts living at `/fonts/<name>.flf`, counting the lookups.
    struct Fonts(&'static [&'static str], Cell<usize>);

    impl Fonts {
        fn new(names: &'static [&'static str]) -> Self {
            Self(names, Cell::new(0))
        }
    }

    impl FontCatalog for Fonts {
        fn list_fonts(&self) -> Result<Vec<String>, CatalogError> {
            Ok(self.0.iter().map(|&font| font.to_owned()).collect())
        }

        fn locate(&self, name: &str) -> Result<Option<FontSource>, CatalogError> {
            self.1.set(self.1.get() + 1);
            Ok(self
                .0
                .iter()
                .any(|&font| font == name)
                .then(|| FontSource::File(PathBuf::from(format!("/fonts/{name}.flf")))))
        }
    }

    /// Renders text as `font:text`, uppercased on a second line.
    struct Upper;

    impl ArtRenderer for Upper {
        fn render_text(&self, font: &FontSource, text: &str) -> Result<String, RenderError> {
            if text == "fail" {
                return Err(RenderError::Unrenderable {
                    font: font.to_string(),
                    text: text.to_owned(),
                });
            }
            Ok(format!("{font}:{text}\n{}", text.to_uppercase()))
        }
    }

    /// Records what it was asked to draw.
    #[derive(Default)]
    struct Recorder(RefCell<Vec<(String, Canvas)>>);

    impl Rasterizer for Recorder {
        fn rasterize(&self, art: &str, canvas: &Canvas) -> Result<Vec<u8>, RenderError> {
            self.0.borrow_mut().push((art.to_owned(), *canvas));
            Ok(art.as_bytes().to_vec())
        }
    }

    fn figure(font: &str, text: &str) -> Figure {
        Figure {
            font: font.to_owned(),
            text: text.to_owned(),
        }
    }

    #[test]
    fn preview_prints_art() {
        let recorder = Recorder::default();
        let fonts = Fonts::new(&["slant"]);
        let dispatcher = Dispatcher::new(&fonts, &Upper, &recorder);
        let mut out = Vec::new();
        dispatcher.preview(&figure("slant", "hi"), &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "/fonts/slant.flf:hi\nHI\n");
        assert!(recorder.0.borrow().is_empty());
    }

    #[test]
    fn font_is_located_once_per_figure() {
        let recorder = Recorder::default();
        let fonts = Fonts::new(&["slant"]);
        let dispatcher = Dispatcher::new(&fonts, &Upper, &recorder);
        dispatcher.art(&figure("slant", "hi")).unwrap();
        assert_eq!(fonts.1.get(), 1);
        dispatcher
            .generate(&figure("slant", "hi"), &Canvas::default())
            .unwrap();
        assert_eq!(fonts.1.get(), 2);
    }

    #[test]
    fn generate_rasterizes_preview_art() {
        let recorder = Recorder::default();
        let fonts = Fonts::new(&["slant"]);
        let dispatcher = Dispatcher::new(&fonts, &Upper, &recorder);
        let canvas = Canvas {
            color: FontColor::new(1, 2, 3),
            ..Canvas::default()
        };

        let mut preview = Vec::new();
        dispatcher.preview(&figure("slant", "hi"), &mut preview).unwrap();
        let png = dispatcher.generate(&figure("slant", "hi"), &canvas).unwrap();

        let drawn = recorder.0.borrow();
        assert_eq!(drawn.len(), 1);
        let (art, used_canvas) = &drawn[0];
        assert_eq!(format!("{art}\n").as_bytes(), preview);
        assert_eq!(png, art.as_bytes());
        assert_eq!(*used_canvas, canvas);
    }

    #[test]
    fn unknown_font_is_rejected_before_rendering() {
        let recorder = Recorder::default();
        let fonts = Fonts::new(&["slant"]);
        let dispatcher = Dispatcher::new(&fonts, &Upper, &recorder);
        let error = dispatcher
            .generate(&figure("larry3d", "hi"), &Canvas::default())
            .unwrap_err();
        assert!(matches!(&error, Error::FontNotFound(font) if font == "larry3d"));
        assert!(error.to_string().contains("fig list"));
        assert!(recorder.0.borrow().is_empty());

        let mut out = Vec::new();
        assert!(dispatcher.preview(&figure("larry3d", "hi"), &mut out).is_err());
        assert!(out.is_empty());
    }

    #[test]
    fn render_errors_surface() {
        let recorder = Recorder::default();
        let fonts = Fonts::new(&["slant"]);
        let dispatcher = Dispatcher::new(&fonts, &Upper, &recorder);
        let error = dispatcher
            .generate(&figure("slant", "fail"), &Canvas::default())
            .unwrap_err();
        assert!(matches!(
            error,
            Error::Render(RenderError::Unrenderable { .. })
        ));
    }

    #[test]
    fn list_prints_one_font_per_line() {
        let recorder = Recorder::default();
        let fonts = Fonts::new(&["banner", "slant"]);
        let dispatcher = Dispatcher::new(&fonts, &Upper, &recorder);
        let mut out = Vec::new();
        dispatcher.list(&mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "banner\nslant\n");
    }
}
