//! Test-print parameters.

/// Parameters for generating test pads.
///
/// # Example
///
/// ```
/// use bed_testprint::TestPrintParams;
///
/// let params = TestPrintParams::default()
///     .with_pad_height(0.2)
///     .with_padding(8.0);
/// assert!((params.pad_height - 0.2).abs() < 1e-12);
/// assert!(params.binary_stl);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TestPrintParams {
    /// Pad thickness in mm (one or two first layers).
    pub pad_height: f64,
    /// Gap subtracted from the point spacing to get the pad edge, in mm.
    pub padding: f64,
    /// Smallest pad edge length in mm; smaller sizes are clamped up.
    pub min_pad_size: f64,
    /// Write binary STL instead of ASCII.
    pub binary_stl: bool,
}

impl Default for TestPrintParams {
    fn default() -> Self {
        Self {
            pad_height: 0.4,
            padding: 10.0,
            min_pad_size: 5.0,
            binary_stl: true,
        }
    }
}

impl TestPrintParams {
    /// Set the pad height.
    #[must_use]
    pub const fn with_pad_height(mut self, height: f64) -> Self {
        self.pad_height = height;
        self
    }

    /// Set the padding between neighbouring pads.
    #[must_use]
    pub const fn with_padding(mut self, padding: f64) -> Self {
        self.padding = padding;
        self
    }

    /// Set the minimum pad size.
    #[must_use]
    pub const fn with_min_pad_size(mut self, size: f64) -> Self {
        self.min_pad_size = size;
        self
    }

    /// Choose binary or ASCII STL.
    #[must_use]
    pub const fn with_binary_stl(mut self, binary: bool) -> Self {
        self.binary_stl = binary;
        self
    }
}
