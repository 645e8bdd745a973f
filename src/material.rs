//! Material catalog: what detector volumes are made of

use crate::{nuclide::NuclideId, numeric::Float};

use serde::Deserialize;

/// Chemical element, as found in material mixtures
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Element {
    /// Mass number (or average atomic mass, truncated when identifying)
    pub a: Float,

    /// Atomic number
    pub z: Float,
}
//
impl Element {
    pub fn new(a: Float, z: Float) -> Self {
        Self { a, z }
    }

    /// Target nuclide associated with this element
    pub fn nuclide(&self) -> NuclideId {
        NuclideId::from_az(self.a, self.z)
    }
}

/// What a material is made of
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum Composition {
    /// Single-element material, described by its effective (A, Z)
    Pure(Element),

    /// Mixture of several elements sharing the material's density
    Mixture(Vec<Element>),
}

/// Detector material
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Material {
    /// Name of the material, for reporting
    pub name: String,

    /// Density (g/cm³)
    pub density: Float,

    /// Elemental composition
    pub composition: Composition,
}
//
impl Material {
    /// Build a single-element material
    pub fn pure(name: impl Into<String>, density: Float, a: Float, z: Float) -> Self {
        Self {
            name: name.into(),
            density,
            composition: Composition::Pure(Element::new(a, z)),
        }
    }

    /// Build a mixture of elements
    pub fn mixture(name: impl Into<String>, density: Float, elements: Vec<Element>) -> Self {
        Self {
            name: name.into(),
            density,
            composition: Composition::Mixture(elements),
        }
    }

    /// Truth that this material is a mixture
    pub fn is_mixture(&self) -> bool {
        matches!(self.composition, Composition::Mixture(_))
    }

    /// Target nuclides found in this material
    ///
    /// Mixtures yield one identifier per element, so duplicates are possible
    /// if several elements truncate to the same (A, Z).
    ///
    pub fn nuclides(&self) -> impl Iterator<Item = NuclideId> + '_ {
        let elements = match &self.composition {
            Composition::Pure(element) => std::slice::from_ref(element),
            Composition::Mixture(elements) => &elements[..],
        };
        elements.iter().map(Element::nuclide)
    }

    /// Truth that this material contains a given target nuclide
    pub fn contains(&self, nuclide: NuclideId) -> bool {
        self.nuclides().any(|id| id == nuclide)
    }

    /// Weight given to path lengths traversed in this material
    pub fn weight(&self, weight_with_density: bool) -> Float {
        if weight_with_density {
            self.density
        } else {
            1.
        }
    }
}

/// Tracking medium: the link between a volume and its material
#[derive(Clone, Debug, PartialEq)]
pub struct Medium {
    /// Name of the medium, for reporting
    pub name: String,

    /// Material filling the medium, which may be missing in broken geometries
    pub material: Option<Material>,
}
//
impl Medium {
    pub fn new(name: impl Into<String>, material: Option<Material>) -> Self {
        Self {
            name: name.into(),
            material,
        }
    }
}

impl From<Material> for Medium {
    /// Wrap a material in a medium of the same name
    fn from(material: Material) -> Self {
        Self {
            name: material.name.clone(),
            material: Some(material),
        }
    }
}
