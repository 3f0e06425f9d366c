//! Gain/loss classification of bars.
//!
//! Each bar gets exactly one [`BarClass`], decided once from a single
//! comparison of close against open. Equal prices are [`BarClass::Flat`] and
//! belong to neither the gain nor the loss set.

use std::cmp::Ordering;

use serde::Serialize;

use crate::models::{bar::Bar, bar_series::BarSeries};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BarClass {
    /// `close > open`
    Gain,
    /// `close < open`
    Loss,
    /// `close == open`
    Flat,
}

impl BarClass {
    pub fn of(bar: &Bar) -> Self {
        match bar.close().partial_cmp(&bar.open()) {
            Some(Ordering::Greater) => BarClass::Gain,
            Some(Ordering::Less) => BarClass::Loss,
            // Bar prices are finite, so `None` cannot occur; treat it as flat.
            Some(Ordering::Equal) | None => BarClass::Flat,
        }
    }
}

/// One [`BarClass`] per bar, aligned with the series it came from.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct Classification {
    classes: Vec<BarClass>,
}

/// Ascending index sets for each class.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Partition {
    pub gain: Vec<usize>,
    pub loss: Vec<usize>,
    pub flat: Vec<usize>,
}

impl Classification {
    pub fn classes(&self) -> &[BarClass] {
        &self.classes
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<BarClass> {
        self.classes.get(index).copied()
    }

    /// Splits bar indices by class, each set in ascending order.
    pub fn partition(&self) -> Partition {
        let mut out = Partition::default();
        for (i, class) in self.classes.iter().enumerate() {
            match class {
                BarClass::Gain => out.gain.push(i),
                BarClass::Loss => out.loss.push(i),
                BarClass::Flat => out.flat.push(i),
            }
        }
        out
    }

    pub fn gain_indices(&self) -> Vec<usize> {
        self.indices_of(BarClass::Gain)
    }

    pub fn loss_indices(&self) -> Vec<usize> {
        self.indices_of(BarClass::Loss)
    }

    pub fn flat_indices(&self) -> Vec<usize> {
        self.indices_of(BarClass::Flat)
    }

    fn indices_of(&self, wanted: BarClass) -> Vec<usize> {
        self.classes
            .iter()
            .enumerate()
            .filter_map(|(i, c)| (*c == wanted).then_some(i))
            .collect()
    }
}

/// Classifies every bar of `series` in one linear pass.
pub fn classify(series: &BarSeries) -> Classification {
    Classification {
        classes: series.bars().iter().map(BarClass::of).collect(),
    }
}
