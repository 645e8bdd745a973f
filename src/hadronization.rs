//! Composite hadronization: routing each interaction to one of two
//! hadronization models depending on the invariant mass W of its hadronic
//! system
//!
//! Empirical models are typically trusted at low W and string fragmentation
//! models at high W. The composite contains no hadronization code of its
//! own, only the transition scheme between the two.

use crate::{
    error::HadronizationError,
    momentum::{self, Momentum},
    numeric::Float,
    random::UniformSource,
};

/// Final-state hadron
#[derive(Clone, Debug, PartialEq)]
pub struct Hadron {
    /// PDG particle code
    pub pdg: i32,

    /// 4-momentum (GeV)
    pub momentum: Momentum,
}

/// What a hadronization model needs to know about an interaction
#[derive(Clone, Debug, PartialEq)]
pub struct Interaction {
    /// Total 4-momentum of the hadronic system
    pub hadronic_system: Momentum,
}
//
impl Interaction {
    pub fn new(hadronic_system: Momentum) -> Self {
        Self { hadronic_system }
    }

    /// Invariant mass of the hadronic system (GeV)
    pub fn w(&self) -> Float {
        momentum::invariant_mass(&self.hadronic_system)
    }
}

/// Hadronization model
pub trait Hadronizer {
    /// Produce the final-state hadrons of an interaction, or None if the
    /// model failed to do so
    fn hadronize(
        &self,
        interaction: &Interaction,
        rng: &mut dyn UniformSource,
    ) -> Option<Vec<Hadron>>;

    /// Weight of the last hadronization
    fn weight(&self) -> Float {
        1.
    }
}

/// Scheme used to hand interactions over from the low-W to the high-W model
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TransitionMethod {
    /// Pure low-W model below w_min, pure high-W model above w_max, and a
    /// probability of using the high-W model which rises linearly from 0 to
    /// 1 across the window
    LinearWindow { w_min: Float, w_max: Float },
}
//
impl TransitionMethod {
    /// Set up a linear transition window (GeV)
    pub fn linear_window(w_min: Float, w_max: Float) -> Result<Self, HadronizationError> {
        if !(w_min.is_finite() && w_max.is_finite() && w_min < w_max) {
            return Err(HadronizationError::InvalidWindow { w_min, w_max });
        }
        Ok(Self::LinearWindow { w_min, w_max })
    }

    /// Probability of handing an interaction of hadronic invariant mass w to
    /// the high-W model
    pub fn high_w_probability(&self, w: Float) -> Float {
        match *self {
            Self::LinearWindow { w_min, w_max } => {
                if w <= w_min {
                    0.
                } else if w >= w_max {
                    1.
                } else {
                    (w - w_min) / (w_max - w_min)
                }
            }
        }
    }
}

/// Model picked for some interaction
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Selection {
    /// Model trusted at low W
    LowW,
    /// Model trusted at high W
    HighW,
}

/// Composite of a low-W and a high-W hadronization model
pub struct CompositeHadronizer<Low: Hadronizer, High: Hadronizer> {
    low_w: Low,
    high_w: High,
    method: TransitionMethod,
}
//
impl<Low: Hadronizer, High: Hadronizer> CompositeHadronizer<Low, High> {
    pub fn new(low_w: Low, high_w: High, method: TransitionMethod) -> Self {
        Self {
            low_w,
            high_w,
            method,
        }
    }

    /// Pick the model used for an interaction
    ///
    /// A random number is only drawn inside of the transition window.
    ///
    pub fn select(&self, interaction: &Interaction, rng: &mut dyn UniformSource) -> Selection {
        let w = interaction.w();
        let p_high = self.method.high_w_probability(w);
        let selection = if p_high <= 0. {
            Selection::LowW
        } else if p_high >= 1. {
            Selection::HighW
        } else if rng.random() < p_high {
            Selection::HighW
        } else {
            Selection::LowW
        };
        log::debug!("W = {w} GeV, P(high-W model) = {p_high}, using {selection:?}");
        selection
    }
}
//
impl<Low: Hadronizer, High: Hadronizer> Hadronizer for CompositeHadronizer<Low, High> {
    fn hadronize(
        &self,
        interaction: &Interaction,
        rng: &mut dyn UniformSource,
    ) -> Option<Vec<Hadron>> {
        let hadrons = match self.select(interaction, rng) {
            Selection::LowW => self.low_w.hadronize(interaction, rng),
            Selection::HighW => self.high_w.hadronize(interaction, rng),
        };
        if hadrons.is_none() {
            log::warn!("Hadronization failed for W = {} GeV", interaction.w());
        }
        hadrons
    }
}
