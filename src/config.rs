//! Reconstruction settings.
//!
//! Every threshold and calibration constant the pipeline consumes lives in
//! one immutable [`Settings`] value passed through all stages. Settings are
//! validated once, before the pipeline runs; no stage mutates them.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Immutable configuration for a reconstruction run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Minimum word count for a region to become a table candidate.
    /// Consumed by the block classifier.
    pub min_words_in_table: usize,

    /// Maximum region-width / page-width ratio for a table candidate.
    /// Consumed by the block classifier.
    pub max_table_width_ratio: f32,

    /// Minimum number of row bands in a valid bordered grid, and minimum
    /// consecutive aligned rows for the borderless strategy's size check.
    /// Consumed by the table detector.
    pub min_rows: usize,

    /// Minimum length of a clustered grid line, in page units.
    /// Consumed by the table detector (bordered strategy).
    pub edge_min_length: f32,

    /// Horizontal tolerance for column alignment clustering, in page units.
    /// Consumed by the table detector (borderless strategy).
    pub alignment_tolerance: f32,

    /// Composite confidence a borderless region must exceed to be accepted
    /// as a table. Consumed by the table detector.
    pub table_confidence_threshold: f32,

    /// Horizontal width of one space glyph, in page units. Code line deltas
    /// are divided by this to produce indent levels. Consumed by the code
    /// block reconstructor.
    pub indent_calibration_units_per_space: f32,

    /// Vertical band tolerance for line grouping, as a fraction of the
    /// smaller atom's font size. Consumed by the line grouper.
    pub line_band_factor: f32,

    /// Horizontal gap below this fraction of the average character width
    /// merges adjacent spans back into one run (extractor fragment repair).
    /// Consumed by the line grouper.
    pub gap_repair_factor: f32,

    /// Vertical gap above this multiple of the average line spacing breaks
    /// a block. Consumed by the block classifier.
    pub block_gap_factor: f32,

    /// Left-margin delta above this breaks paragraph continuation, in page
    /// units. Consumed by the block classifier.
    pub continuation_margin: f32,

    /// How many of the largest distinct font sizes on a page qualify as
    /// heading sizes. Consumed by the block classifier.
    pub heading_rank_limit: usize,

    /// Quantization unit for list nesting depth, in page units of
    /// left-margin delta. Consumed by the block classifier.
    pub list_indent_unit: f32,

    /// Maximum character count for a code run to be treated as inline code.
    /// Consumed by the inline merger.
    pub inline_code_max_chars: usize,

    /// Whether to process pages in parallel. Output ordering is identical
    /// either way.
    pub parallel: bool,
}

impl Settings {
    /// Create settings with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the minimum word count for table candidates.
    pub fn with_min_words_in_table(mut self, words: usize) -> Self {
        self.min_words_in_table = words;
        self
    }

    /// Set the maximum table-width ratio.
    pub fn with_max_table_width_ratio(mut self, ratio: f32) -> Self {
        self.max_table_width_ratio = ratio;
        self
    }

    /// Set the minimum row count for tables.
    pub fn with_min_rows(mut self, rows: usize) -> Self {
        self.min_rows = rows;
        self
    }

    /// Set the minimum grid line length.
    pub fn with_edge_min_length(mut self, length: f32) -> Self {
        self.edge_min_length = length;
        self
    }

    /// Set the column alignment tolerance.
    pub fn with_alignment_tolerance(mut self, tolerance: f32) -> Self {
        self.alignment_tolerance = tolerance;
        self
    }

    /// Set the borderless table confidence threshold.
    pub fn with_table_confidence_threshold(mut self, threshold: f32) -> Self {
        self.table_confidence_threshold = threshold;
        self
    }

    /// Set the indent calibration constant.
    pub fn with_indent_calibration(mut self, units_per_space: f32) -> Self {
        self.indent_calibration_units_per_space = units_per_space;
        self
    }

    /// Set the list indent quantization unit.
    pub fn with_list_indent_unit(mut self, unit: f32) -> Self {
        self.list_indent_unit = unit;
        self
    }

    /// Disable parallel page processing.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    /// Validate all values, rejecting misconfiguration before the pipeline
    /// ever sees it.
    pub fn validate(&self) -> Result<()> {
        if self.indent_calibration_units_per_space <= 0.0 {
            return Err(Error::InvalidConfig(
                "indent_calibration_units_per_space must be positive".into(),
            ));
        }
        if self.alignment_tolerance <= 0.0 {
            return Err(Error::InvalidConfig(
                "alignment_tolerance must be positive".into(),
            ));
        }
        if !(self.max_table_width_ratio > 0.0 && self.max_table_width_ratio <= 1.0) {
            return Err(Error::InvalidConfig(
                "max_table_width_ratio must be in (0, 1]".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.table_confidence_threshold) {
            return Err(Error::InvalidConfig(
                "table_confidence_threshold must be in [0, 1]".into(),
            ));
        }
        if self.min_rows == 0 {
            return Err(Error::InvalidConfig("min_rows must be at least 1".into()));
        }
        if self.edge_min_length <= 0.0 {
            return Err(Error::InvalidConfig(
                "edge_min_length must be positive".into(),
            ));
        }
        if self.list_indent_unit <= 0.0 {
            return Err(Error::InvalidConfig(
                "list_indent_unit must be positive".into(),
            ));
        }
        if self.line_band_factor <= 0.0 {
            return Err(Error::InvalidConfig(
                "line_band_factor must be positive".into(),
            ));
        }
        if self.heading_rank_limit == 0 || self.heading_rank_limit > 6 {
            return Err(Error::InvalidConfig(
                "heading_rank_limit must be in 1..=6".into(),
            ));
        }
        Ok(())
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            min_words_in_table: 6,
            max_table_width_ratio: 0.9,
            min_rows: 2,
            edge_min_length: 20.0,
            alignment_tolerance: 10.0,
            table_confidence_threshold: 0.6,
            indent_calibration_units_per_space: 6.0,
            line_band_factor: 0.5,
            gap_repair_factor: 0.2,
            block_gap_factor: 1.5,
            continuation_margin: 20.0,
            heading_rank_limit: 3,
            list_indent_unit: 18.0,
            inline_code_max_chars: 40,
            parallel: true,
        }
    }
}
