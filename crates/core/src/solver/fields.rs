//! Dense 2D field storage for the combustion grid.
//!
//! Fields are flat `Vec<f64>` buffers in row-major order. Row increases to
//! the south and column increases to the east.

/// Dense 2D field of `f64` values
///
/// Stores values as a flat `Vec<f64>` in row-major order.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldData {
    /// Field values in row-major order (row * width + col)
    pub data: Vec<f64>,
    /// Grid width in cells (columns)
    pub width: usize,
    /// Grid height in cells (rows)
    pub height: usize,
}

impl FieldData {
    /// Create a new field with given dimensions, initialized to zero
    #[must_use]
    pub fn new(width: usize, height: usize) -> Self {
        Self::with_value(width, height, 0.0)
    }

    /// Create a new field with given dimensions, initialized to a value
    #[must_use]
    pub fn with_value(width: usize, height: usize, value: f64) -> Self {
        Self {
            data: vec![value; width * height],
            width,
            height,
        }
    }

    /// Create a field by evaluating `f(row, col)` for every cell
    pub fn from_fn(width: usize, height: usize, mut f: impl FnMut(usize, usize) -> f64) -> Self {
        let mut data = Vec::with_capacity(width * height);
        for row in 0..height {
            for col in 0..width {
                data.push(f(row, col));
            }
        }
        Self {
            data,
            width,
            height,
        }
    }

    /// Get reference to field data
    #[must_use]
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Get mutable reference to field data
    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.data
    }

    /// Flat index of a cell
    #[inline]
    #[must_use]
    pub fn index(&self, row: usize, col: usize) -> usize {
        row * self.width + col
    }

    /// Check whether signed coordinates fall inside the grid
    #[inline]
    #[must_use]
    pub fn contains(&self, row: i64, col: i64) -> bool {
        row >= 0 && col >= 0 && (row as usize) < self.height && (col as usize) < self.width
    }

    /// Get value at grid position
    ///
    /// # Panics
    ///
    /// Panics if coordinates are out of bounds
    #[must_use]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        assert!(
            row < self.height && col < self.width,
            "Coordinates out of bounds"
        );
        self.data[row * self.width + col]
    }

    /// Set value at grid position
    ///
    /// # Panics
    ///
    /// Panics if coordinates are out of bounds
    pub fn set(&mut self, row: usize, col: usize, value: f64) {
        assert!(
            row < self.height && col < self.width,
            "Coordinates out of bounds"
        );
        self.data[row * self.width + col] = value;
    }

    /// Fill entire field with a value
    pub fn fill(&mut self, value: f64) {
        self.data.fill(value);
    }

    /// Clamp every value into `[min, max]`.
    ///
    /// NaN cells collapse to `min` so a degenerate input can never leave
    /// the field outside its range.
    pub fn clip(&mut self, min: f64, max: f64) {
        for v in &mut self.data {
            *v = if v.is_nan() { min } else { v.clamp(min, max) };
        }
    }

    /// Multiply every value by `factor`
    pub fn scale(&mut self, factor: f64) {
        for v in &mut self.data {
            *v *= factor;
        }
    }

    /// Minimum and maximum value, `None` for an empty field
    #[must_use]
    pub fn min_max(&self) -> Option<(f64, f64)> {
        let first = *self.data.first()?;
        Some(
            self.data
                .iter()
                .fold((first, first), |(lo, hi), &v| (lo.min(v), hi.max(v))),
        )
    }

    /// Sum of all values
    #[must_use]
    pub fn sum(&self) -> f64 {
        self.data.iter().sum()
    }
}

/// Co-indexed intensity and fuel fields for one run.
///
/// Both fields stay inside `[0, 1]` after every mutation made through the
/// spread engine.
#[derive(Debug, Clone, PartialEq)]
pub struct CombustionField {
    pub(crate) intensity: FieldData,
    pub(crate) fuel: FieldData,
}

impl CombustionField {
    /// Create an unburnt field over the given fuel map
    #[must_use]
    pub fn new(fuel: FieldData) -> Self {
        let intensity = FieldData::new(fuel.width, fuel.height);
        Self { intensity, fuel }
    }

    /// Set a centered `(2 * half_width + 1)`-cell square to full intensity.
    ///
    /// The square is truncated at the grid edge for tiny grids.
    pub fn ignite_center(&mut self, half_width: usize) {
        let size = self.size();
        if size == 0 {
            return;
        }
        let mid = size / 2;
        let lo = mid.saturating_sub(half_width);
        let hi = (mid + half_width).min(size - 1);
        for row in lo..=hi {
            for col in lo..=hi {
                self.intensity.set(row, col, 1.0);
            }
        }
    }

    /// Grid edge length in cells
    #[must_use]
    pub fn size(&self) -> usize {
        self.intensity.height
    }

    /// Intensity field
    #[must_use]
    pub fn intensity(&self) -> &FieldData {
        &self.intensity
    }

    /// Fuel field
    #[must_use]
    pub fn fuel(&self) -> &FieldData {
        &self.fuel
    }

    /// Intensity at a cell
    #[must_use]
    pub fn intensity_at(&self, row: usize, col: usize) -> f64 {
        self.intensity.get(row, col)
    }

    /// Remaining fuel at a cell
    #[must_use]
    pub fn fuel_at(&self, row: usize, col: usize) -> f64 {
        self.fuel.get(row, col)
    }

    /// Coordinates of every cell whose intensity exceeds `threshold`, in
    /// row-major order
    #[must_use]
    pub fn active_cells(&self, threshold: f64) -> Vec<(usize, usize)> {
        let width = self.intensity.width;
        self.intensity
            .data
            .iter()
            .enumerate()
            .filter(|(_, &v)| v > threshold)
            .map(|(idx, _)| (idx / width, idx % width))
            .collect()
    }

    /// Number of cells whose intensity exceeds `threshold`
    #[must_use]
    pub fn burned_area(&self, threshold: f64) -> usize {
        self.intensity
            .data
            .iter()
            .filter(|&&v| v > threshold)
            .count()
    }

    /// Intensity-weighted `(row, col)` centroid of cells above `threshold`.
    ///
    /// Returns `None` when no cell exceeds the threshold.
    #[must_use]
    pub fn burn_centroid(&self, threshold: f64) -> Option<(f64, f64)> {
        let width = self.intensity.width;
        let (mut weight, mut row_sum, mut col_sum) = (0.0, 0.0, 0.0);
        for (idx, &v) in self.intensity.data.iter().enumerate() {
            if v > threshold {
                weight += v;
                row_sum += v * (idx / width) as f64;
                col_sum += v * (idx % width) as f64;
            }
        }
        (weight > 0.0).then(|| (row_sum / weight, col_sum / weight))
    }
}
