//! Sequential event readers
use std::fmt::{self, Display};
use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::Path;
use std::str::FromStr;

use log::{debug, info};

use crate::error::{Error, Result};
use crate::event::Event;

/// Input event format
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum Format {
    /// One JSON event per line
    #[default]
    JsonLines,
    /// HepMC2 ASCII
    HepMC2,
    /// Les Houches Event File
    Lhef,
}

impl Format {
    /// Guess the format from the file extension, defaulting to JSON lines
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match ext.as_deref() {
            Some("hepmc" | "hepmc2") => Self::HepMC2,
            Some("lhe" | "lhef") => Self::Lhef,
            _ => Self::JsonLines,
        }
    }
}

impl Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Format::JsonLines => write!(f, "jsonl"),
            Format::HepMC2 => write!(f, "hepmc2"),
            Format::Lhef => write!(f, "lhef"),
        }
    }
}

impl FromStr for Format {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "jsonl" | "json" => Ok(Self::JsonLines),
            "hepmc2" | "hepmc" => Ok(Self::HepMC2),
            "lhef" | "lhe" => Ok(Self::Lhef),
            _ => Err(Error::Config(format!("unknown input format `{s}`"))),
        }
    }
}

/// Reader yielding one event at a time
pub struct EventReader<R: BufRead> {
    inner: Inner<R>,
    nread: usize,
}

enum Inner<R: BufRead> {
    JsonLines { lines: Lines<R>, line: usize },
    #[cfg(feature = "hepmc2")]
    HepMC2(hepmc2::Reader<R>),
    #[cfg(feature = "lhef")]
    Lhef(Box<lhef::Reader<R>>),
}

impl EventReader<BufReader<File>> {
    /// Open an event file
    ///
    /// If no format is given it is inferred from the file extension.
    pub fn open(path: &Path, format: Option<Format>) -> Result<Self> {
        let format = format.unwrap_or_else(|| Format::from_path(path));
        info!("Reading {format} events from {}", path.display());
        let file = BufReader::new(File::open(path)?);
        Self::new(file, format)
    }
}

impl<R: BufRead> EventReader<R> {
    pub fn new(input: R, format: Format) -> Result<Self> {
        let inner = match format {
            Format::JsonLines => Inner::JsonLines {
                lines: input.lines(),
                line: 0,
            },
            #[cfg(feature = "hepmc2")]
            Format::HepMC2 => Inner::HepMC2(hepmc2::Reader::from(input)),
            #[cfg(feature = "lhef")]
            Format::Lhef => {
                let reader = lhef::Reader::new(input).map_err(|err| {
                    Error::Parse {
                        format,
                        msg: err.to_string(),
                    }
                })?;
                Inner::Lhef(Box::new(reader))
            }
            #[allow(unreachable_patterns)]
            _ => return Err(Error::Unsupported(format)),
        };
        Ok(Self { inner, nread: 0 })
    }

    /// Number of events read so far
    pub fn nread(&self) -> usize {
        self.nread
    }

    fn next_event(&mut self) -> Option<Result<Event>> {
        match &mut self.inner {
            Inner::JsonLines { lines, line } => loop {
                *line += 1;
                let text = match lines.next()? {
                    Ok(text) => text,
                    Err(err) => return Some(Err(err.into())),
                };
                if text.trim().is_empty() {
                    continue;
                }
                let ev = serde_json::from_str(&text).map_err(|source| {
                    Error::JsonLine {
                        line: *line,
                        source,
                    }
                });
                return Some(ev);
            },
            #[cfg(feature = "hepmc2")]
            Inner::HepMC2(reader) => {
                let ev = reader.next()?;
                Some(ev.map(Event::from).map_err(|err| Error::Parse {
                    format: Format::HepMC2,
                    msg: err.to_string(),
                }))
            }
            #[cfg(feature = "lhef")]
            Inner::Lhef(reader) => match reader.hepeup() {
                Ok(Some(ev)) => {
                    let mut ev = Event::from(ev);
                    // LHEF events carry no number
                    ev.number = self.nread as i32;
                    Some(Ok(ev))
                }
                Ok(None) => None,
                Err(err) => Some(Err(Error::Parse {
                    format: Format::Lhef,
                    msg: err.to_string(),
                })),
            },
        }
    }
}

impl<R: BufRead> Iterator for EventReader<R> {
    type Item = Result<Event>;

    fn next(&mut self) -> Option<Self::Item> {
        let ev = self.next_event()?;
        if let Ok(ev) = &ev {
            debug!("Read event {} (run {})", ev.number, ev.run);
            self.nread += 1;
        }
        Some(ev)
    }
}
