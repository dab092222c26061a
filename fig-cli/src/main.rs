//! `fig`: render text as FIGlet ASCII art in the terminal or as a transparent PNG image.

use std::io::{self, Write as _};
use std::path::PathBuf;

use anyhow::Result;
use clap::error::ErrorKind;
use clap::{CommandFactory, Parser, Subcommand};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use fig::catalog::FontDirs;
use fig::command::{ParseError, Request, Shape};
use fig::config::{self, Config};
use fig::output::write_image;
use fig::render::{Dispatcher, Figlet, UnifontRasterizer};
use log::debug;

fn main() -> Result<()> {
    let cli = Cli::parse();
    env_logger::Builder::new()
        .filter_level(cli.verbose.log_level_filter())
        .init();

    let shape = match cli.shape() {
        Ok(shape) => shape,
        Err(error) => Cli::command().error(ErrorKind::InvalidSubcommand, error).exit(),
    };
    let request = shape.resolve(Config::from_env)?;
    debug!("{request:?}");

    let fonts = FontDirs::from_env();
    debug!("font directories: {:?}", fonts.dirs());
    let figlet = Figlet::new();
    let rasterizer = UnifontRasterizer::new();
    let dispatcher = Dispatcher::new(&fonts, &figlet, &rasterizer);
    let mut stdout = io::stdout().lock();
    match request {
        Request::Help => Cli::command().print_help()?,
        Request::List => dispatcher.list(&mut stdout)?,
        Request::Preview(figure) => dispatcher.preview(&figure, &mut stdout)?,
        Request::Generate {
            figure,
            output,
            canvas,
        } => {
            let png = dispatcher.generate(&figure, &canvas)?;
            write_image(&output, &png)?;
            writeln!(stdout, "Generated PNG image: {}", output.display())?;
        }
    }
    Ok(())
}

/// Render text as FIGlet ASCII art, in the terminal or as a transparent PNG image
#[derive(Parser)]
#[command(version, after_help = after_help())]
struct Cli {
    #[command(flatten)]
    verbose: Verbosity<WarnLevel>,
    #[command(subcommand)]
    command: Option<CliCommand>,
}

impl Cli {
    fn shape(self) -> Result<Shape, ParseError> {
        let Some(command) = self.command else {
            return Ok(Shape::Help);
        };
        let shape = match command {
            CliCommand::Preview { font, text } => Shape::preview(font, text),
            CliCommand::Generate { font, text, file } => Shape::generate(font, text, file),
            CliCommand::List => Shape::List,
            CliCommand::Implicit(args) => Shape::implicit(&args)?,
        };
        Ok(shape)
    }
}

#[derive(Subcommand)]
enum CliCommand {
    /// Print the ASCII art to the terminal
    Preview {
        /// Font name, see `fig list` [default: $FIGLET_FONT]
        font: Option<String>,
        /// Text to render [default: $FIGLET_TEXT]
        #[arg(allow_hyphen_values = true)]
        text: Option<String>,
    },
    /// Render the ASCII art to a PNG file
    Generate {
        /// Font name, see `fig list` [default: $FIGLET_FONT]
        font: Option<String>,
        /// Text to render [default: $FIGLET_TEXT]
        #[arg(allow_hyphen_values = true)]
        text: Option<String>,
        /// Image file to write [default: figlet_output.png]
        file: Option<PathBuf>,
    },
    /// List the available fonts
    List,
    #[command(external_subcommand)]
    Implicit(Vec<String>),
}

fn after_help() -> String {
    format!(
        "\
Examples:
  fig preview slant 'Hello'        print ASCII art
  fig generate slant 'Hello' a.png write a PNG image
  fig banner.png                   default font and text
  fig 'Hello' banner.png           default font
  fig slant 'Hello' banner.png     everything explicit

A first argument equal to a command name is always read as that command; use
`fig generate <font> <text> <file>` to render text such as \"list\".

Environment:
{}",
        config::environment_help()
    )
}
