//! Fixed-width histograms
//!
//! Bin numbering follows ROOT: bin 0 is the underflow bin, bins
//! `1..=nbins` cover the axis range and bin `nbins + 1` is the overflow
//! bin.
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Uniform binning of an interval `[min, max)`
#[derive(Copy, Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct Axis {
    /// Number of bins, excluding underflow and overflow
    pub nbins: usize,
    /// Lower edge of the first bin
    pub min: f64,
    /// Upper edge of the last bin
    pub max: f64,
}

impl Axis {
    pub fn new(nbins: usize, min: f64, max: f64) -> Result<Self> {
        let axis = Self { nbins, min, max };
        axis.validate()?;
        Ok(axis)
    }

    pub fn validate(&self) -> Result<()> {
        if self.nbins == 0 {
            return Err(Error::Binning("need at least one bin".to_owned()));
        }
        if !self.min.is_finite() || !self.max.is_finite() {
            return Err(Error::Binning(format!(
                "axis limits [{}, {}) are not finite",
                self.min, self.max
            )));
        }
        if self.min >= self.max {
            return Err(Error::Binning(format!(
                "lower axis limit {} is not below upper limit {}",
                self.min, self.max
            )));
        }
        Ok(())
    }

    pub fn width(&self) -> f64 {
        (self.max - self.min) / self.nbins as f64
    }

    /// Index of the bin containing `x`
    ///
    /// NaN is assigned to the overflow bin.
    pub fn find_bin(&self, x: f64) -> usize {
        if x < self.min {
            0
        } else if !(x < self.max) {
            self.nbins + 1
        } else {
            let pos = (x - self.min) / (self.max - self.min);
            let bin = 1 + (pos * self.nbins as f64) as usize;
            bin.min(self.nbins)
        }
    }

    /// Lower edge of a bin
    ///
    /// The underflow bin starts at -∞ and the overflow bin at the upper
    /// axis limit.
    pub fn low_edge(&self, bin: usize) -> f64 {
        match bin {
            0 => f64::NEG_INFINITY,
            b if b > self.nbins => self.max,
            b => self.min + (b - 1) as f64 * self.width(),
        }
    }

    /// Upper edge of a bin
    pub fn high_edge(&self, bin: usize) -> f64 {
        match bin {
            0 => self.min,
            b if b == self.nbins => self.max,
            b if b > self.nbins => f64::INFINITY,
            b => self.low_edge(b + 1),
        }
    }

    /// Centre of an in-range bin, infinite for the flow bins
    pub fn center(&self, bin: usize) -> f64 {
        self.low_edge(bin) + 0.5 * self.width()
    }
}

/// Split a ROOT-style title "title; x label; y label"
fn split_title(title: &str) -> (String, String, String) {
    let mut parts = title.split(';').map(|s| s.trim().to_owned());
    (
        parts.next().unwrap_or_default(),
        parts.next().unwrap_or_default(),
        parts.next().unwrap_or_default(),
    )
}

/// One-dimensional histogram
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Hist1D {
    pub name: String,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub axis: Axis,
    sumw: Vec<f64>,
    sumw2: Vec<f64>,
    entries: u64,
    // in-range statistics
    tsumw: f64,
    tsumwx: f64,
    tsumwx2: f64,
}

impl Hist1D {
    /// New empty histogram
    ///
    /// `title` may contain axis labels separated by semicolons.
    pub fn new(name: &str, title: &str, axis: Axis) -> Self {
        let (title, x_label, y_label) = split_title(title);
        let nbins = axis.nbins + 2;
        Self {
            name: name.to_owned(),
            title,
            x_label,
            y_label,
            axis,
            sumw: vec![0.; nbins],
            sumw2: vec![0.; nbins],
            entries: 0,
            tsumw: 0.,
            tsumwx: 0.,
            tsumwx2: 0.,
        }
    }

    pub fn fill(&mut self, x: f64) -> usize {
        self.fill_weighted(x, 1.)
    }

    /// Fill `x` with weight `w`, returning the bin index
    pub fn fill_weighted(&mut self, x: f64, w: f64) -> usize {
        let bin = self.axis.find_bin(x);
        self.sumw[bin] += w;
        self.sumw2[bin] += w * w;
        self.entries += 1;
        if bin > 0 && bin <= self.axis.nbins {
            self.tsumw += w;
            self.tsumwx += w * x;
            self.tsumwx2 += w * x * x;
        }
        bin
    }

    /// Sum of weights in a bin, including the flow bins
    pub fn content(&self, bin: usize) -> f64 {
        self.sumw[bin]
    }

    pub fn sumw2(&self, bin: usize) -> f64 {
        self.sumw2[bin]
    }

    pub fn underflow(&self) -> f64 {
        self.sumw[0]
    }

    pub fn overflow(&self) -> f64 {
        self.sumw[self.axis.nbins + 1]
    }

    /// Number of fills, including those landing in the flow bins
    pub fn entries(&self) -> u64 {
        self.entries
    }

    /// Sum of weights inside the axis range
    pub fn integral(&self) -> f64 {
        self.sumw[1..=self.axis.nbins].iter().sum()
    }

    /// Sums of weights and squared weights over all bins, including flows
    pub fn total(&self) -> (f64, f64) {
        (self.sumw.iter().sum(), self.sumw2.iter().sum())
    }

    /// Mean of the in-range fills
    pub fn mean(&self) -> f64 {
        self.tsumwx / self.tsumw
    }

    /// Standard deviation of the in-range fills
    pub fn std_dev(&self) -> f64 {
        let mean = self.mean();
        (self.tsumwx2 / self.tsumw - mean * mean).max(0.).sqrt()
    }

    pub(crate) fn in_range_sums(&self) -> (f64, f64, f64) {
        (self.tsumw, self.tsumwx, self.tsumwx2)
    }

    /// Bin-by-bin ratio `numerator / denominator`
    ///
    /// Bins where the denominator is not positive stay empty. Uncertainties
    /// are binomial.
    pub fn ratio(
        name: &str,
        title: &str,
        numerator: &Hist1D,
        denominator: &Hist1D,
    ) -> Result<Self> {
        if numerator.axis != denominator.axis {
            return Err(Error::Binning(format!(
                "cannot divide `{}` by `{}` with different binning",
                numerator.name, denominator.name
            )));
        }
        let mut res = Self::new(name, title, numerator.axis);
        for (bin, (&num, &den)) in
            numerator.sumw.iter().zip(&denominator.sumw).enumerate()
        {
            if den <= 0. {
                continue;
            }
            let eff = num / den;
            res.sumw[bin] = eff;
            res.sumw2[bin] = (eff * (1. - eff) / den).abs();
        }
        res.entries = numerator.entries;
        for bin in 1..=res.axis.nbins {
            let x = res.axis.center(bin);
            let w = res.sumw[bin];
            res.tsumw += w;
            res.tsumwx += w * x;
            res.tsumwx2 += w * x * x;
        }
        Ok(res)
    }
}

/// Two-dimensional histogram
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Hist2D {
    pub name: String,
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    pub x_axis: Axis,
    pub y_axis: Axis,
    /// Row-major in y: the global bin of `(ix, iy)` is `ix + (nx + 2) * iy`
    sumw: Vec<f64>,
    entries: u64,
    // in-range statistics
    tsumwx: f64,
    tsumwx2: f64,
    tsumwy: f64,
    tsumwy2: f64,
    tsumwxy: f64,
}

impl Hist2D {
    pub fn new(name: &str, title: &str, x_axis: Axis, y_axis: Axis) -> Self {
        let (title, x_label, y_label) = split_title(title);
        let nbins = (x_axis.nbins + 2) * (y_axis.nbins + 2);
        Self {
            name: name.to_owned(),
            title,
            x_label,
            y_label,
            x_axis,
            y_axis,
            sumw: vec![0.; nbins],
            entries: 0,
            tsumwx: 0.,
            tsumwx2: 0.,
            tsumwy: 0.,
            tsumwy2: 0.,
            tsumwxy: 0.,
        }
    }

    fn global_bin(&self, ix: usize, iy: usize) -> usize {
        ix + (self.x_axis.nbins + 2) * iy
    }

    /// Fill the point `(x, y)` with unit weight, returning the bin indices
    pub fn fill(&mut self, x: f64, y: f64) -> (usize, usize) {
        let ix = self.x_axis.find_bin(x);
        let iy = self.y_axis.find_bin(y);
        let bin = self.global_bin(ix, iy);
        self.sumw[bin] += 1.;
        self.entries += 1;
        if (1..=self.x_axis.nbins).contains(&ix) && (1..=self.y_axis.nbins).contains(&iy) {
            self.tsumwx += x;
            self.tsumwx2 += x * x;
            self.tsumwy += y;
            self.tsumwy2 += y * y;
            self.tsumwxy += x * y;
        }
        (ix, iy)
    }

    pub fn content(&self, ix: usize, iy: usize) -> f64 {
        self.sumw[self.global_bin(ix, iy)]
    }

    pub fn entries(&self) -> u64 {
        self.entries
    }

    /// Sum of weights with both coordinates inside the axis ranges
    pub fn integral(&self) -> f64 {
        let mut sum = 0.;
        for iy in 1..=self.y_axis.nbins {
            for ix in 1..=self.x_axis.nbins {
                sum += self.content(ix, iy);
            }
        }
        sum
    }

    /// Sum of weights over all bins, including flows
    ///
    /// All fills have unit weight, so this is also the sum of squared
    /// weights.
    pub fn total(&self) -> f64 {
        self.sumw.iter().sum()
    }

    /// In-range sums of `x`, `x²`, `y`, `y²` and `xy`
    pub(crate) fn in_range_moments(&self) -> [f64; 5] {
        [self.tsumwx, self.tsumwx2, self.tsumwy, self.tsumwy2, self.tsumwxy]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn binning() {
        let axis = Axis::new(100, -5., 5.).unwrap();
        assert_relative_eq!(axis.width(), 0.1, epsilon = 1e-12);
        assert_eq!(axis.find_bin(-5.), 1);
        assert_eq!(axis.find_bin(-4.95), 1);
        assert_eq!(axis.find_bin(0.), 51);
        assert_eq!(axis.find_bin(4.999), 100);
        assert_eq!(axis.find_bin(-5.0001), 0);
        assert_eq!(axis.find_bin(5.), 101);
        assert_eq!(axis.find_bin(f64::INFINITY), 101);
        assert_eq!(axis.find_bin(f64::NEG_INFINITY), 0);
        assert_eq!(axis.find_bin(f64::NAN), 101);
        assert_relative_eq!(axis.low_edge(51), 0., epsilon = 1e-12);
        assert_eq!(axis.high_edge(100), 5.);
        assert_eq!(axis.low_edge(0), f64::NEG_INFINITY);
        assert_eq!(axis.high_edge(0), -5.);
        assert_eq!(axis.low_edge(101), 5.);
        assert_eq!(axis.high_edge(101), f64::INFINITY);
        assert_eq!(axis.center(101), f64::INFINITY);
    }

    #[test]
    fn invalid_axis() {
        assert!(Axis::new(0, 0., 1.).is_err());
        assert!(Axis::new(10, 1., 1.).is_err());
        assert!(Axis::new(10, 2., 1.).is_err());
        assert!(Axis::new(10, f64::NAN, 1.).is_err());
    }

    #[test]
    fn fill_1d() {
        let axis = Axis::new(10, 0., 10.).unwrap();
        let mut h = Hist1D::new("h", "Some title; x; Count", axis);
        assert_eq!(h.title, "Some title");
        assert_eq!(h.x_label, "x");
        assert_eq!(h.y_label, "Count");

        assert_eq!(h.fill(2.5), 3);
        assert_eq!(h.fill(3.5), 4);
        assert_eq!(h.fill(-1.), 0);
        assert_eq!(h.fill(f64::NAN), 11);
        assert_eq!(h.entries(), 4);
        assert_eq!(h.underflow(), 1.);
        assert_eq!(h.overflow(), 1.);
        assert_eq!(h.integral(), 2.);
        assert_relative_eq!(h.mean(), 3.);
        assert_relative_eq!(h.std_dev(), 0.5);

        h.fill_weighted(2.2, 2.);
        assert_eq!(h.content(3), 3.);
        assert_eq!(h.sumw2(3), 5.);
    }

    #[test]
    fn ratio() {
        let axis = Axis::new(2, 0., 2.).unwrap();
        let mut den = Hist1D::new("den", "", axis);
        let mut num = Hist1D::new("num", "", axis);
        for x in [0.5, 0.5, 0.5, 0.5] {
            den.fill(x);
        }
        for x in [0.5, 0.5, 0.5] {
            num.fill(x);
        }
        num.fill(1.5);
        let eff = Hist1D::ratio("eff", "Efficiency; x; eff", &num, &den).unwrap();
        assert_relative_eq!(eff.content(1), 0.75);
        assert_eq!(eff.content(2), 0.);
        assert_relative_eq!(eff.sumw2(1), 0.75 * 0.25 / 4.);

        let other = Hist1D::new("other", "", Axis::new(3, 0., 2.).unwrap());
        assert!(Hist1D::ratio("bad", "", &num, &other).is_err());
    }

    #[test]
    fn fill_2d() {
        let mut h = Hist2D::new(
            "res",
            "",
            Axis::new(500, 0., 50.).unwrap(),
            Axis::new(900, -4., 5.).unwrap(),
        );
        assert_eq!(h.fill(0., 1.005), (1, 501));
        assert_eq!(h.fill(10.05, 0.975), (101, 498));
        assert_eq!(h.fill(0., f64::NAN), (1, 901));
        assert_eq!(h.fill(-1., 6.), (0, 901));
        assert_eq!(h.entries(), 4);
        assert_eq!(h.content(1, 501), 1.);
        assert_eq!(h.content(1, 901), 1.);
        assert_eq!(h.integral(), 2.);
        assert_eq!(h.total(), 4.);
        let [sx, sx2, sy, ..] = h.in_range_moments();
        assert_relative_eq!(sx, 10.05);
        assert_relative_eq!(sx2, 10.05 * 10.05);
        assert_relative_eq!(sy, 1.005 + 0.975);
    }
}
