//! Layout constraints and the size solver for container children.
//!
//! Single source of truth for how a container splits its main axis - render
//! code never computes child extents itself.

use std::fmt;
use thiserror::Error;

/// Sizing rule for one child along the container's main axis
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Dimension {
    pub fixed: Option<u16>,
    pub ratio: Option<f64>,
    pub min: Option<u16>,
    pub max: Option<u16>,
}

impl Dimension {
    /// Absorbs whatever space the other siblings leave over
    pub fn unspecified() -> Self {
        Self::default()
    }

    pub fn fixed(cells: u16) -> Self {
        Self {
            fixed: Some(cells),
            ..Self::default()
        }
    }

    /// Share of the total extent, e.g. `0.5` for half
    pub fn ratio(ratio: f64) -> Self {
        Self {
            ratio: Some(ratio),
            ..Self::default()
        }
    }

    pub fn with_min(mut self, cells: u16) -> Self {
        self.min = Some(cells);
        self
    }

    pub fn with_max(mut self, cells: u16) -> Self {
        self.max = Some(cells);
        self
    }

    pub fn is_unspecified(&self) -> bool {
        self.fixed.is_none() && self.ratio.is_none() && self.min.is_none() && self.max.is_none()
    }

    /// Pure fixed, or a ratio bounded by a clamp
    pub fn is_constrained(&self) -> bool {
        match (self.fixed, self.ratio) {
            (Some(_), None) => self.min.is_none() && self.max.is_none(),
            (None, Some(_)) => self.min.is_some() || self.max.is_some(),
            _ => false,
        }
    }

    /// Unspecified, ratio-based, or pure fixed
    pub fn is_valid(&self) -> bool {
        match (self.fixed, self.ratio) {
            (None, None) => self.is_unspecified(),
            (Some(_), None) => self.min.is_none() && self.max.is_none(),
            (None, Some(ratio)) => ratio.is_finite() && ratio >= 0.0,
            (Some(_), Some(_)) => false,
        }
    }

    /// Extent for this dimension, or `None` when it takes the remainder
    fn resolve(&self, total: u16) -> Option<u16> {
        if let Some(cells) = self.fixed {
            return Some(cells);
        }
        let ratio = self.ratio?;
        let mut cells = (f64::from(total) * ratio).round().clamp(0.0, f64::from(u16::MAX)) as u16;
        if let Some(min) = self.min {
            cells = cells.max(min);
        }
        if let Some(max) = self.max {
            cells = cells.min(max);
        }
        Some(cells)
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_unspecified() {
            return f.write_str("Unspecified");
        }
        let mut parts = Vec::new();
        if let Some(cells) = self.fixed {
            parts.push(format!("Fixed({cells})"));
        }
        if let Some(ratio) = self.ratio {
            parts.push(format!("Ratio({ratio})"));
        }
        if let Some(min) = self.min {
            parts.push(format!("Min({min})"));
        }
        if let Some(max) = self.max {
            parts.push(format!("Max({max})"));
        }
        f.write_str(&parts.join(" "))
    }
}

/// Direction a container arranges its children in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    #[default]
    Horizontal,
    Vertical,
    /// Children overlap; one is visible at a time (tabs)
    Stacked,
}

impl Orientation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Orientation::Horizontal => "horizontal",
            Orientation::Vertical => "vertical",
            Orientation::Stacked => "stacked",
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum LayoutError {
    #[error("dimension {index} ({dimension}) mixes incompatible constraints")]
    InvalidDimension { index: usize, dimension: Dimension },

    #[error("{children} children but {dimensions} dimensions")]
    CountMismatch { children: usize, dimensions: usize },

    #[error("{constrained} constrained dimensions need exactly one unspecified sibling, found {unspecified}")]
    MissingRemainder { constrained: usize, unspecified: usize },

    #[error("at most one dimension may be unspecified, found {unspecified}")]
    AmbiguousRemainder { unspecified: usize },
}

/// Orientation plus one dimension per child
#[derive(Debug, Clone, Default)]
pub struct Layout {
    pub orientation: Orientation,
    pub dimensions: Vec<Dimension>,
}

impl Layout {
    pub fn new(orientation: Orientation) -> Self {
        Self {
            orientation,
            dimensions: Vec::new(),
        }
    }

    /// Check the layout against its child count. Stacked layouts always pass.
    pub fn validate(&self, children: usize) -> Result<(), LayoutError> {
        if self.orientation == Orientation::Stacked {
            return Ok(());
        }
        if children != self.dimensions.len() {
            return Err(LayoutError::CountMismatch {
                children,
                dimensions: self.dimensions.len(),
            });
        }
        validate_dimensions(&self.dimensions)
    }

    /// `Fixed(3), Unspecified, Fixed(2)`
    pub fn describe(&self) -> String {
        self.dimensions
            .iter()
            .map(|d| d.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Sibling-level validity rule
pub fn validate_dimensions(dims: &[Dimension]) -> Result<(), LayoutError> {
    if let Some((index, dimension)) = dims.iter().enumerate().find(|(_, d)| !d.is_valid()) {
        return Err(LayoutError::InvalidDimension {
            index,
            dimension: *dimension,
        });
    }

    let constrained = dims.iter().filter(|d| d.is_constrained()).count();
    let unspecified = dims.iter().filter(|d| d.is_unspecified()).count();

    match (constrained, unspecified) {
        (0, 0 | 1) => Ok(()),
        (0, _) => Err(LayoutError::AmbiguousRemainder { unspecified }),
        (_, 1) => Ok(()),
        _ => Err(LayoutError::MissingRemainder {
            constrained,
            unspecified,
        }),
    }
}

/// Split `total` cells between `dims`
///
/// Fixed extents are taken verbatim, ratios are rounded then clamped, and the
/// single unspecified entry receives what is left (never below zero). When no
/// entry is unspecified the result may not sum to `total`.
pub fn calculate_dimensions(dims: &[Dimension], total: u16) -> Vec<u16> {
    let mut sizes: Vec<Option<u16>> = dims.iter().map(|d| d.resolve(total)).collect();
    let allocated = sizes
        .iter()
        .flatten()
        .fold(0u16, |acc, cells| acc.saturating_add(*cells));
    let remainder = total.saturating_sub(allocated);

    for size in sizes.iter_mut().filter(|s| s.is_none()) {
        *size = Some(remainder);
    }
    sizes.into_iter().map(|s| s.unwrap_or_default()).collect()
}
