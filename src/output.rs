//! Histogram output files
use std::fmt::{self, Display};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::str::FromStr;

use log::info;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::histogram::{Hist1D, Hist2D};

/// A histogram of any dimension
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind")]
pub enum Histogram {
    H1(Hist1D),
    H2(Hist2D),
}

impl Histogram {
    pub fn name(&self) -> &str {
        match self {
            Histogram::H1(h) => &h.name,
            Histogram::H2(h) => &h.name,
        }
    }
}

impl From<Hist1D> for Histogram {
    fn from(h: Hist1D) -> Self {
        Self::H1(h)
    }
}

impl From<Hist2D> for Histogram {
    fn from(h: Hist2D) -> Self {
        Self::H2(h)
    }
}

/// Named histograms in insertion order
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct HistogramSet {
    pub histograms: Vec<Histogram>,
}

impl HistogramSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, h: impl Into<Histogram>) {
        self.histograms.push(h.into())
    }

    pub fn extend(&mut self, other: HistogramSet) {
        self.histograms.extend(other.histograms)
    }

    pub fn get(&self, name: &str) -> Option<&Histogram> {
        self.histograms.iter().find(|h| h.name() == name)
    }

    pub fn get_1d(&self, name: &str) -> Option<&Hist1D> {
        match self.get(name) {
            Some(Histogram::H1(h)) => Some(h),
            _ => None,
        }
    }

    pub fn get_2d(&self, name: &str) -> Option<&Hist2D> {
        match self.get(name) {
            Some(Histogram::H2(h)) => Some(h),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.histograms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.histograms.is_empty()
    }

    /// Write all histograms, replacing any existing file
    pub fn write_to_file(&self, path: &Path, format: OutputFormat) -> Result<()> {
        let mut out = BufWriter::new(File::create(path)?);
        self.write(&mut out, format)?;
        out.flush()?;
        info!(
            "Wrote {} histograms to {} ({format})",
            self.len(),
            path.display()
        );
        Ok(())
    }

    pub fn write<W: Write>(&self, mut out: W, format: OutputFormat) -> Result<()> {
        match format {
            OutputFormat::Json => {
                serde_json::to_writer_pretty(&mut out, self)?;
                writeln!(out)?;
            }
            OutputFormat::Yoda => {
                for h in &self.histograms {
                    match h {
                        Histogram::H1(h) => write_yoda_1d(&mut out, h)?,
                        Histogram::H2(h) => write_yoda_2d(&mut out, h)?,
                    }
                    writeln!(out)?;
                }
            }
        }
        Ok(())
    }
}

/// Histogram file format
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Hash)]
pub enum OutputFormat {
    #[default]
    Json,
    Yoda,
}

impl OutputFormat {
    /// Guess the format from the file extension, defaulting to JSON
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("yoda") => Self::Yoda,
            _ => Self::Json,
        }
    }
}

impl Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Yoda => write!(f, "yoda"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "yoda" => Ok(Self::Yoda),
            _ => Err(Error::Config(format!("unknown output format `{s}`"))),
        }
    }
}

// effective number of entries in a bin
fn num_entries(sumw: f64, sumw2: f64) -> f64 {
    if sumw2 > 0. {
        sumw * sumw / sumw2
    } else {
        0.
    }
}

// per-bin first and second moments are approximated with bin centres
fn write_yoda_1d<W: Write>(out: &mut W, h: &Hist1D) -> Result<()> {
    let path = format!("/{}", h.name);
    let axis = &h.axis;
    let (tsumw, tsumwx, tsumwx2) = h.in_range_sums();
    // flow fills have no recorded position and add no moments
    let (sumw, sumw2) = h.total();
    writeln!(out, "BEGIN YODA_HISTO1D_V2 {path}")?;
    writeln!(out, "Path: {path}")?;
    writeln!(out, "Title: {}", h.title)?;
    writeln!(out, "XLabel: {}", h.x_label)?;
    writeln!(out, "YLabel: {}", h.y_label)?;
    writeln!(out, "Type: Histo1D")?;
    writeln!(out, "---")?;
    writeln!(out, "# Mean: {:e}", h.mean())?;
    writeln!(out, "# Area: {:e}", tsumw)?;
    writeln!(out, "# ID\tID\tsumw\tsumw2\tsumwx\tsumwx2\tnumEntries")?;
    writeln!(
        out,
        "Total\tTotal\t{:e}\t{:e}\t{:e}\t{:e}\t{}",
        sumw,
        sumw2,
        tsumwx,
        tsumwx2,
        h.entries()
    )?;
    let flows = [("Underflow", 0), ("Overflow", axis.nbins + 1)];
    for (label, bin) in flows {
        let sumw = h.content(bin);
        let sumw2 = h.sumw2(bin);
        writeln!(
            out,
            "{label}\t{label}\t{:e}\t{:e}\t{:e}\t{:e}\t{:e}",
            sumw,
            sumw2,
            0.,
            0.,
            num_entries(sumw, sumw2)
        )?;
    }
    writeln!(out, "# xlow\txhigh\tsumw\tsumw2\tsumwx\tsumwx2\tnumEntries")?;
    for bin in 1..=axis.nbins {
        let sumw = h.content(bin);
        let sumw2 = h.sumw2(bin);
        let x = axis.center(bin);
        writeln!(
            out,
            "{:e}\t{:e}\t{:e}\t{:e}\t{:e}\t{:e}\t{:e}",
            axis.low_edge(bin),
            axis.high_edge(bin),
            sumw,
            sumw2,
            sumw * x,
            sumw * x * x,
            num_entries(sumw, sumw2)
        )?;
    }
    writeln!(out, "END YODA_HISTO1D_V2")?;
    Ok(())
}

fn write_yoda_2d<W: Write>(out: &mut W, h: &Hist2D) -> Result<()> {
    let path = format!("/{}", h.name);
    let (xa, ya) = (&h.x_axis, &h.y_axis);
    writeln!(out, "BEGIN YODA_HISTO2D_V2 {path}")?;
    writeln!(out, "Path: {path}")?;
    writeln!(out, "Title: {}", h.title)?;
    writeln!(out, "XLabel: {}", h.x_label)?;
    writeln!(out, "YLabel: {}", h.y_label)?;
    writeln!(out, "Type: Histo2D")?;
    writeln!(out, "---")?;
    writeln!(out, "# Volume: {:e}", h.integral())?;
    writeln!(out, "# ID\tID\tsumw\tsumw2\tsumwx\tsumwx2\tsumwy\tsumwy2\tsumwxy\tnumEntries")?;
    let total = h.total();
    let [sumwx, sumwx2, sumwy, sumwy2, sumwxy] = h.in_range_moments();
    writeln!(
        out,
        "Total\tTotal\t{total:e}\t{total:e}\t{sumwx:e}\t{sumwx2:e}\t{sumwy:e}\t{sumwy2:e}\t{sumwxy:e}\t{}",
        h.entries()
    )?;
    writeln!(
        out,
        "# xlow\txhigh\tylow\tyhigh\tsumw\tsumw2\tsumwx\tsumwx2\tsumwy\tsumwy2\tsumwxy\tnumEntries"
    )?;
    for ix in 1..=xa.nbins {
        for iy in 1..=ya.nbins {
            let sumw = h.content(ix, iy);
            // unit weights
            let (x, y) = (xa.center(ix), ya.center(iy));
            writeln!(
                out,
                "{:e}\t{:e}\t{:e}\t{:e}\t{sumw:e}\t{sumw:e}\t{:e}\t{:e}\t{:e}\t{:e}\t{:e}\t{sumw:e}",
                xa.low_edge(ix),
                xa.high_edge(ix),
                ya.low_edge(iy),
                ya.high_edge(iy),
                sumw * x,
                sumw * x * x,
                sumw * y,
                sumw * y * y,
                sumw * x * y,
            )?;
        }
    }
    writeln!(out, "END YODA_HISTO2D_V2")?;
    Ok(())
}
