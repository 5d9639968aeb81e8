#[macro_use]
extern crate log;

use std::env::current_dir;
use std::error::Error;
use std::fmt::Display;
use std::fs::{create_dir_all, File};
use std::io::Write;
use std::path::PathBuf;
use std::process::exit;
use std::str::FromStr;

use clap::{crate_authors, crate_description, crate_version, App, Arg, ArgMatches, SubCommand};

use codemosaic::color::Color;
use codemosaic::config::{Config, Overrides, CONFIG_FILE};
use codemosaic::units::Cm;
use codemosaic::Error as MError;

macro_rules! unwrap {
    ($e: expr, $error: expr) => {
        match $e {
            Some(e) => e,
            None => return Err(Box::new($error)),
        }
    };
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run() {
        error!("{}", e);
        exit(1);
    }
}

/// Parses the value of an argument, if present.
fn parse_arg<T>(matches: &ArgMatches, name: &str) -> Result<Option<T>, Box<dyn Error>>
where
    T: FromStr,
    T::Err: Display,
{
    match matches.value_of(name) {
        Some(value) => match value.parse::<T>() {
            Ok(value) => Ok(Some(value)),
            Err(e) => Err(format!("invalid value for --{}: {}", name, e).into()),
        },
        None => Ok(None),
    }
}

/// Reads the command line overrides.
fn overrides(matches: &ArgMatches) -> Result<Overrides, Box<dyn Error>> {
    Ok(Overrides {
        source: matches.value_of("src").map(PathBuf::from),
        output: matches.value_of("out").map(PathBuf::from),
        mask: matches.value_of("mask").map(PathBuf::from),
        mask_dpi: parse_arg(matches, "maskdpi")?,
        mask_scale: parse_arg(matches, "maskscale")?,
        alpha_threshold: parse_arg(matches, "alphathreshold")?,
        width: parse_arg(matches, "width")?.map(Cm),
        height: parse_arg(matches, "height")?.map(Cm),
        font_name: matches.value_of("fontname").map(String::from),
        font_size: parse_arg(matches, "fontsize")?.map(Cm),
        font_spacing: parse_arg(matches, "fontspacing")?,
        foreground: parse_arg::<Color>(matches, "fgcolor")?,
        background: parse_arg::<Color>(matches, "bgcolor")?,
        monochrome: matches.is_present("monochrome"),
        debug: matches.is_present("debug"),
    })
}

/// Creates an argument taking a value.
fn value_arg<'a>(name: &'a str, help: &'a str) -> Arg<'a, 'a> {
    Arg::with_name(name).long(name).takes_value(true).help(help)
}

#[allow(unknown_lints, dangerous_implicit_autorefs)]
fn run() -> Result<(), Box<dyn Error>> {
    let matches = App::new("codemosaic")
        .version(crate_version!())
        .author(crate_authors!("\n"))
        .about(crate_description!())
        .subcommand(
            SubCommand::with_name("init")
                .about("Creates a default codemosaic.toml")
                .arg(Arg::with_name("DIR").required(false)),
        )
        .subcommand(
            SubCommand::with_name("build")
                .about("Builds the mosaic of a source tree")
                .arg(value_arg(
                    "config",
                    "The configuration file, searched upward by default",
                ))
                .arg(value_arg("src", "The file or directory to read"))
                .arg(value_arg("out", "The output file, .svg, .pdf or .png"))
                .arg(value_arg("mask", "The mask image"))
                .arg(value_arg("maskdpi", "The resolution of the mask"))
                .arg(value_arg("maskscale", "The scale of the mask"))
                .arg(value_arg(
                    "alphathreshold",
                    "The opacity a mask pixel needs to tint a glyph, between 0 and 1",
                ))
                .arg(value_arg("width", "The width of the canvas in cm"))
                .arg(value_arg("height", "The height of the canvas in cm"))
                .arg(value_arg("fontname", "The font family of vector outputs"))
                .arg(value_arg("fontsize", "The font size in cm"))
                .arg(value_arg(
                    "fontspacing",
                    "The spacing between glyphs, as a fraction of their size",
                ))
                .arg(value_arg("fgcolor", "The color of the glyphs"))
                .arg(value_arg("bgcolor", "The color of the background"))
                .arg(
                    Arg::with_name("monochrome")
                        .long("monochrome")
                        .help("Draws the glyphs tinted by the mask in black"),
                )
                .arg(
                    Arg::with_name("debug")
                        .long("debug")
                        .help("Draws the glyphs missing the mask in red"),
                ),
        )
        .get_matches();

    if let Some(init) = matches.subcommand_matches("init") {
        let mut dir = unwrap!(current_dir().ok(), MError::CannotReadCurrentDir);

        if let Some(target) = init.value_of("DIR") {
            dir.push(target);
            create_dir_all(&dir)?;
        }

        let title = dir
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("mosaic")
            .to_owned();

        let config = Config::with_title(&title);
        let path = dir.join(CONFIG_FILE);

        if path.exists() {
            warn!("{} already exists, leaving it untouched", path.display());
            return Ok(());
        }

        let mut file = File::create(&path)?;
        file.write_all(config.to_toml()?.as_bytes())?;
        info!("wrote {}", path.display());
    } else if let Some(build) = matches.subcommand_matches("build") {
        let flags = overrides(build)?;

        let mut config = match build.value_of("config") {
            Some(path) => Config::open(path)?,
            None => {
                let dir = unwrap!(current_dir().ok(), MError::CannotReadCurrentDir);
                match Config::search(&dir) {
                    Some(path) => {
                        debug!("reading {}", path.display());
                        Config::open(&path)?
                    }
                    None => {
                        info!("no {} found, using the defaults", CONFIG_FILE);
                        let title = dir.file_name().and_then(|name| name.to_str());
                        Config::with_title(title.unwrap_or("mosaic"))
                    }
                }
            }
        };

        config.apply(&flags);

        let summary = config.build()?;

        if !summary.warnings.is_empty() {
            eprint!("{}", summary.warnings);
        }
        eprintln!("{}", summary);
    } else {
        eprintln!("{}", matches.usage());
    }

    Ok(())
}
