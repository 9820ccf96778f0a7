use glam::IVec2;
use rand::Rng;

use crate::error::{ResourceError, Result};
use crate::geometry::IntRect;
use crate::resources::Relocatable;

/// Interchangeable variations of one texture, picked at random by weight.
///
/// A grass tile with three looks might carry weights `[6, 3, 1]`: the first
/// variation shows up 60% of the time.
#[derive(Clone, Debug, PartialEq)]
pub struct WeightedTexture {
    variations: Vec<IntRect>,
    weights: Vec<u32>,
    total_weight: u32,
}

impl WeightedTexture {
    /// Fails if the lists differ in length, are empty, or any weight is not
    /// strictly positive.
    pub fn new(variations: Vec<IntRect>, weights: Vec<i64>) -> Result<Self> {
        if variations.len() != weights.len() {
            return Err(ResourceError::InvalidWeights(format!(
                "{} variations but {} weights",
                variations.len(),
                weights.len()
            )));
        }
        if variations.is_empty() {
            return Err(ResourceError::InvalidWeights(
                "at least one variation is required".to_string(),
            ));
        }
        let weights = weights
            .into_iter()
            .map(|w| match u32::try_from(w) {
                Ok(w) if w > 0 => Ok(w),
                _ => Err(ResourceError::InvalidWeights(format!(
                    "weights must be positive and fit in u32, got {w}"
                ))),
            })
            .collect::<Result<Vec<u32>>>()?;
        let total_weight = weights
            .iter()
            .try_fold(0u32, |acc, &w| acc.checked_add(w))
            .ok_or_else(|| ResourceError::InvalidWeights("total weight overflows u32".to_string()))?;

        Ok(Self { variations, weights, total_weight })
    }

    /// Weighted random pick: variation `i` comes up with probability
    /// `weights[i] / total_weight`.
    pub fn get_random_rect<R: Rng + ?Sized>(&self, rng: &mut R) -> IntRect {
        let roll = rng.gen_range(0..self.total_weight);
        let mut cumulative = 0;
        for (rect, &weight) in self.variations.iter().zip(&self.weights) {
            cumulative += weight;
            if roll < cumulative {
                return *rect;
            }
        }
        // roll < total_weight, so the loop always returns.
        self.variations[self.variations.len() - 1]
    }

    /// Variation by index. Out-of-range indices are clamped, not rejected.
    pub fn get_rect(&self, index: i64) -> IntRect {
        let last = self.variations.len() - 1;
        let clamped = if index < 0 {
            log::warn!("weighted_texture: index {index} < 0; clamping to 0");
            0
        } else if index as u64 > last as u64 {
            log::warn!("weighted_texture: index {index} out of range; clamping to {last}");
            last
        } else {
            index as usize
        };
        self.variations[clamped]
    }

    #[inline]
    pub fn variations(&self) -> &[IntRect] {
        &self.variations
    }

    #[inline]
    pub fn weights(&self) -> &[u32] {
        &self.weights
    }

    #[inline]
    pub fn total_weight(&self) -> u32 {
        self.total_weight
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.variations.len()
    }

    /// Always false; construction rejects empty lists.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.variations.is_empty()
    }
}

impl Relocatable for WeightedTexture {
    fn origin(&self) -> IVec2 {
        self.variations[0].position()
    }

    fn move_to(&mut self, position: IVec2) {
        let offset = position - self.origin();
        for rect in &mut self.variations {
            *rect = rect.translated(offset);
        }
    }
}
