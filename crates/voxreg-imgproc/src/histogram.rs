use thiserror::Error;
use voxreg_image::{Volume, VoxelType};

/// Number of bins used when building a histogram from a volume.
pub const VOLUME_HISTOGRAM_BINS: usize = 512;

/// Errors raised when building or using a histogram.
#[derive(Error, Debug, PartialEq)]
pub enum HistogramError {
    /// The histogram needs at least one bin.
    #[error("Invalid number of bins: {0}")]
    InvalidHistogramBins(usize),

    /// The upper bound of the range is below the lower bound.
    #[error("Invalid histogram range [{0}, {1}]")]
    InvalidRange(f64, f64),

    /// The volume has no voxels to take the range from.
    #[error("Cannot build a histogram from an empty volume")]
    EmptyVolume,
}

/// A one-dimensional intensity histogram.
///
/// Bins are stored as `f64` so that [`Histogram1D::equalize`] can turn them into an
/// intensity lookup table in place.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram1D {
    min: f64,
    max: f64,
    width: f64,
    nsamp: f64,
    bins: Vec<f64>,
    equalized_range: Option<(f64, f64)>,
}

impl Histogram1D {
    /// Create an empty histogram over `[0, nbins]` with unit-width bins.
    pub fn new(nbins: usize) -> Result<Self, HistogramError> {
        Self::with_range(0.0, nbins as f64, nbins)
    }

    /// Create an empty histogram over `[min, max]` with `nbins` bins.
    ///
    /// # Errors
    ///
    /// * [`HistogramError::InvalidHistogramBins`] if `nbins` is zero.
    /// * [`HistogramError::InvalidRange`] if `max < min` or a bound is not finite.
    pub fn with_range(min: f64, max: f64, nbins: usize) -> Result<Self, HistogramError> {
        if nbins == 0 {
            return Err(HistogramError::InvalidHistogramBins(nbins));
        }

        if !min.is_finite() || !max.is_finite() || max < min {
            return Err(HistogramError::InvalidRange(min, max));
        }

        Ok(Self {
            min,
            max,
            width: (max - min) / nbins as f64,
            nsamp: 0.0,
            bins: vec![0.0; nbins],
            equalized_range: None,
        })
    }

    /// Build the histogram of a volume.
    ///
    /// The range spans the volume's minimum and maximum, the histogram has
    /// [`VOLUME_HISTOGRAM_BINS`] bins, and only voxels strictly above `padding` are counted.
    /// Every time frame is visited.
    ///
    /// # Example
    ///
    /// ```
    /// use voxreg_image::{ImageAttributes, Volume};
    /// use voxreg_imgproc::histogram::Histogram1D;
    ///
    /// let volume = Volume::<i16>::from_fn(ImageAttributes::new([4, 4, 1]), |x, _, _, _| x as i16);
    /// let hist = Histogram1D::from_volume(&volume, 0.0).unwrap();
    ///
    /// assert_eq!(hist.num_bins(), 512);
    /// assert_eq!(hist.num_samples(), 12.0);
    /// ```
    pub fn from_volume<T: VoxelType>(
        volume: &Volume<T>,
        padding: f64,
    ) -> Result<Self, HistogramError> {
        let (min, max) = volume
            .min_max_as_f64()
            .ok_or(HistogramError::EmptyVolume)?;

        let mut hist = Self::with_range(min, max, VOLUME_HISTOGRAM_BINS)?;
        volume
            .as_slice()
            .iter()
            .map(|v| v.to_f64())
            .filter(|&v| v > padding)
            .for_each(|v| hist.add_sample(v));

        log::debug!(
            "histogram over [{min}, {max}] with {} samples above {padding}",
            hist.nsamp
        );

        Ok(hist)
    }

    /// Lower bound of the range.
    pub fn min(&self) -> f64 {
        self.min
    }

    /// Upper bound of the range.
    pub fn max(&self) -> f64 {
        self.max
    }

    /// Width of a bin.
    pub fn width(&self) -> f64 {
        self.width
    }

    /// Number of bins.
    pub fn num_bins(&self) -> usize {
        self.bins.len()
    }

    /// Number of samples added.
    pub fn num_samples(&self) -> f64 {
        self.nsamp
    }

    /// The bins.
    pub fn bins(&self) -> &[f64] {
        &self.bins
    }

    /// The range recorded by the last [`Histogram1D::equalize`], if any.
    pub fn equalized_range(&self) -> Option<(f64, f64)> {
        self.equalized_range
    }

    /// Reset every bin to zero.
    pub fn reset(&mut self) {
        self.bins.iter_mut().for_each(|b| *b = 0.0);
        self.nsamp = 0.0;
        self.equalized_range = None;
    }

    /// Add a sample. Values outside `[min, max]` (and `NaN`) are ignored.
    pub fn add_sample(&mut self, v: f64) {
        if !(self.min..=self.max).contains(&v) {
            return;
        }
        let index = self.val_to_bin(v);
        self.bins[index] += 1.0;
        self.nsamp += 1.0;
    }

    /// Index of the bin holding `v`, clamped to the valid bins.
    pub fn val_to_bin(&self, v: f64) -> usize {
        let range = self.max - self.min;
        if range <= 0.0 {
            return 0;
        }

        let nbins = self.bins.len();
        let index = (nbins as f64 * (v - self.min - self.width / 2.0) / range).round();
        if index.is_nan() || index < 0.0 {
            0
        } else {
            (index as usize).min(nbins - 1)
        }
    }

    /// Centre value of bin `i`.
    pub fn bin_to_val(&self, i: usize) -> f64 {
        self.min + i as f64 * self.width + self.width / 2.0
    }

    /// Probability of bin `i`, zero for an empty histogram or an invalid bin.
    pub fn bin_to_pdf(&self, i: usize) -> f64 {
        match self.bins.get(i) {
            Some(&b) if self.nsamp > 0.0 => b / self.nsamp,
            _ => 0.0,
        }
    }

    /// Cumulative probability up to and including bin `i`.
    pub fn bin_to_cdf(&self, i: usize) -> f64 {
        if self.nsamp <= 0.0 {
            return 0.0;
        }
        let end = (i + 1).min(self.bins.len());
        self.bins[..end].iter().sum::<f64>() / self.nsamp
    }

    /// Centre value of the first bin whose cumulative probability reaches `p`.
    pub fn cdf_to_val(&self, p: f64) -> f64 {
        let mut cum = 0.0;
        for (i, b) in self.bins.iter().enumerate() {
            cum += b;
            if self.nsamp > 0.0 && cum / self.nsamp >= p {
                return self.bin_to_val(i);
            }
        }
        self.bin_to_val(self.bins.len() - 1)
    }

    /// Mean of the samples, measured at the bin centres.
    pub fn mean(&self) -> f64 {
        if self.nsamp <= 0.0 {
            return 0.0;
        }
        self.bins
            .iter()
            .enumerate()
            .map(|(i, b)| b * self.bin_to_val(i))
            .sum::<f64>()
            / self.nsamp
    }

    /// Variance of the samples, measured at the bin centres.
    pub fn variance(&self) -> f64 {
        if self.nsamp <= 0.0 {
            return 0.0;
        }
        let mean = self.mean();
        self.bins
            .iter()
            .enumerate()
            .map(|(i, b)| b * (self.bin_to_val(i) - mean).powi(2))
            .sum::<f64>()
            / self.nsamp
    }

    /// Standard deviation of the samples.
    pub fn standard_deviation(&self) -> f64 {
        self.variance().sqrt()
    }

    /// Shannon entropy of the bin probabilities, in nats.
    pub fn entropy(&self) -> f64 {
        (0..self.bins.len())
            .map(|i| self.bin_to_pdf(i))
            .filter(|&p| p > 0.0)
            .map(|p| -p * p.ln())
            .sum()
    }

    /// Turn the bins into a lookup table equalizing the intensities onto `[min, max]`.
    ///
    /// Bin `i` becomes `(cdf(i - 1) + pdf(i) / 2) * (max - min) + min`. After this call the
    /// bins no longer hold counts, see [`Histogram1D::back_project`].
    pub fn equalize(&mut self, min: f64, max: f64) {
        let pdf = (0..self.bins.len())
            .map(|i| self.bin_to_pdf(i))
            .collect::<Vec<_>>();

        let mut cum = 0.0;
        for (bin, p) in self.bins.iter_mut().zip(pdf) {
            *bin = (cum + p / 2.0) * (max - min) + min;
            cum += p;
        }

        self.equalized_range = Some((min, max));
    }

    /// Replace each voxel `v` of `volume` with the bin value at `val_to_bin(v)`.
    pub fn back_project<T: VoxelType>(&self, volume: &mut Volume<T>) {
        volume
            .as_slice_mut()
            .iter_mut()
            .for_each(|v| *v = T::from_f64(self.bins[self.val_to_bin(v.to_f64())]));
    }
}
