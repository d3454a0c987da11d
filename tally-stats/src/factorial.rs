//! Factorial design decomposition for two-way ANOVA
//!
//! Dataset labels encode both factors as `LevelA-LevelB`. The design must be
//! complete (every combination present exactly once) and balanced (every
//! cell holds the same number of observations).

use tally_core::{Dataset, TallyError};
use std::collections::HashMap;

/// Split a label on its first `-` into trimmed factor levels
pub fn split_label(label: &str) -> Result<(&str, &str), TallyError> {
    let (a, b) = label
        .split_once('-')
        .ok_or_else(|| TallyError::malformed_label(label))?;
    let (a, b) = (a.trim(), b.trim());
    if a.is_empty() || b.is_empty() {
        return Err(TallyError::malformed_label(label));
    }
    Ok((a, b))
}

/// A validated, complete and balanced two-factor design
#[derive(Debug, Clone)]
pub struct FactorialDesign<'a> {
    pub(crate) levels_a: Vec<String>,
    pub(crate) levels_b: Vec<String>,
    /// `cells[a][b]`, indexed like the level vectors
    pub(crate) cells: Vec<Vec<&'a Dataset>>,
    pub(crate) n_per_cell: usize,
}

impl<'a> FactorialDesign<'a> {
    /// Decompose datasets into a design, validating every precondition
    pub fn from_datasets(datasets: &'a [Dataset]) -> Result<Self, TallyError> {
        let mut parsed = Vec::with_capacity(datasets.len());
        for d in datasets {
            parsed.push(split_label(&d.label)?);
        }

        // Levels in order of first appearance
        let mut levels_a: Vec<String> = Vec::new();
        let mut levels_b: Vec<String> = Vec::new();
        for (a, b) in &parsed {
            if !levels_a.iter().any(|l| l == a) {
                levels_a.push(a.to_string());
            }
            if !levels_b.iter().any(|l| l == b) {
                levels_b.push(b.to_string());
            }
        }

        if levels_a.len() < 2 {
            return Err(TallyError::insufficient_levels("A", levels_a.len()));
        }
        if levels_b.len() < 2 {
            return Err(TallyError::insufficient_levels("B", levels_b.len()));
        }

        let mut assigned: HashMap<(&str, &str), &'a Dataset> = HashMap::new();
        for ((a, b), d) in parsed.iter().zip(datasets) {
            if assigned.insert((*a, *b), d).is_some() {
                return Err(TallyError::duplicate_combination(a, b).for_dataset(d.label.as_str()));
            }
        }

        let mut cells = Vec::with_capacity(levels_a.len());
        for a in &levels_a {
            let mut row = Vec::with_capacity(levels_b.len());
            for b in &levels_b {
                match assigned.get(&(a.as_str(), b.as_str())) {
                    Some(d) => row.push(*d),
                    None => return Err(TallyError::missing_combination(a, b)),
                }
            }
            cells.push(row);
        }

        let n_per_cell = datasets[0].len();
        if let Some(d) = datasets.iter().find(|d| d.len() != n_per_cell) {
            return Err(TallyError::unbalanced_design(&d.label, n_per_cell, d.len()));
        }

        Ok(Self {
            levels_a,
            levels_b,
            cells,
            n_per_cell,
        })
    }

    pub fn levels_a(&self) -> &[String] {
        &self.levels_a
    }

    pub fn levels_b(&self) -> &[String] {
        &self.levels_b
    }

    pub fn n_per_cell(&self) -> usize {
        self.n_per_cell
    }

    /// Total number of observations
    pub fn total_n(&self) -> usize {
        self.n_per_cell * self.levels_a.len() * self.levels_b.len()
    }

    /// Dataset at level indices `(a, b)`
    pub fn cell(&self, a: usize, b: usize) -> Option<&'a Dataset> {
        self.cells.get(a).and_then(|row| row.get(b)).copied()
    }

    /// Dataset for a pair of level names
    pub fn cell_by_name(&self, a: &str, b: &str) -> Option<&'a Dataset> {
        let ai = self.levels_a.iter().position(|l| l == a)?;
        let bi = self.levels_b.iter().position(|l| l == b)?;
        self.cell(ai, bi)
    }

    /// Every observation sharing factor-A level `a`
    pub fn row_values(&self, a: usize) -> Vec<f64> {
        self.cells[a]
            .iter()
            .flat_map(|d| d.values().iter().copied())
            .collect()
    }

    /// Every observation sharing factor-B level `b`
    pub fn column_values(&self, b: usize) -> Vec<f64> {
        self.cells
            .iter()
            .flat_map(|row| row[b].values().iter().copied())
            .collect()
    }

    /// Iterate over all cells
    pub fn cells(&self) -> impl Iterator<Item = &'a Dataset> + '_ {
        self.cells.iter().flat_map(|row| row.iter().copied())
    }
}
