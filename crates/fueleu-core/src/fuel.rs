//! Reference fuels
//!
//! A [`FuelSpec`] carries everything needed to turn a mass of fuel into energy
//! and well-to-wake emissions. Specs are validated when they are built, so a
//! calculation never sees a fuel with a non-positive calorific value or a
//! negative emission factor.
//!
//! The [`FuelRegistry`] is an immutable, name-keyed table of specs. The default
//! registry holds the reference fuels of the FuelEU annex; custom registries can
//! be read from TOML:
//!
//! ```toml
//! [[fuel]]
//! name = "Heavy Fuel Oil (HFO)"
//! lcv = 0.0405
//! wtt = 13.5
//! ttw_co2 = 3.114
//! ttw_ch4 = 0.00005
//! ttw_n2o = 0.00018
//! ```

use crate::errors::{FuelEUError, FuelEUResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Names of the fuels in the default registry
pub mod names {
    pub const HFO: &str = "Heavy Fuel Oil (HFO)";
    pub const LFO: &str = "Low Fuel Oil (LFO)";
    pub const MGO: &str = "Marine Gas Oil (MGO)";
    pub const LNG: &str = "Liquefied Natural Gas (LNG)";
    pub const LPG: &str = "Liquefied Petroleum Gas (LPG)";
    pub const FOSSIL_METHANOL: &str = "Methanol (Fossil)";
    pub const BIODIESEL_RAPESEED: &str = "Biodiesel (Rapeseed Oil)";
    pub const BIODIESEL_CORN: &str = "Biodiesel (Corn Oil)";
    pub const BIODIESEL_WHEAT_STRAW: &str = "Biodiesel (Wheat Straw)";
    pub const BIOETHANOL_SUGAR_BEET: &str = "Bioethanol (Sugar Beet)";
    pub const BIOETHANOL_MAIZE: &str = "Bioethanol (Maize)";
    pub const BIOETHANOL_WHEAT: &str = "Bioethanol (Wheat)";
    pub const BIODIESEL_UCO: &str = "Biodiesel (UCO)";
    pub const BIODIESEL_ANIMAL_FATS: &str = "Biodiesel (Animal Fats)";
    pub const BIODIESEL_SUNFLOWER: &str = "Biodiesel (Sunflower Oil)";
    pub const BIODIESEL_SOYBEAN: &str = "Biodiesel (Soybean Oil)";
    pub const BIODIESEL_PALM: &str = "Biodiesel (Palm Oil)";
    pub const HVO: &str = "Hydrotreated Vegetable Oil (HVO)";
    pub const FOSSIL_HYDROGEN: &str = "Fossil Hydrogen";
    pub const FOSSIL_AMMONIA: &str = "Fossil Ammonia";
    pub const E_METHANOL: &str = "E-Methanol";
    pub const E_LNG: &str = "E-LNG";
    pub const GREEN_HYDROGEN: &str = "Green Hydrogen";
    pub const GREEN_AMMONIA: &str = "Green Ammonia";
    pub const BIO_LNG: &str = "Bio-LNG";
    pub const BIO_METHANOL: &str = "Bio-Methanol";
}

/// Unvalidated fuel record as it appears in configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuelRecord {
    pub name: String,
    /// unit: MJ/g
    pub lcv: f64,
    /// unit: gCO2eq/MJ
    pub wtt: f64,
    /// unit: gCO2/g fuel
    pub ttw_co2: f64,
    /// unit: gCH4/g fuel
    #[serde(default)]
    pub ttw_ch4: f64,
    /// unit: gN2O/g fuel
    #[serde(default)]
    pub ttw_n2o: f64,
    #[serde(default)]
    pub is_rfnbo: bool,
}

/// Emission and energy properties of a fuel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "FuelRecord", into = "FuelRecord")]
pub struct FuelSpec {
    name: String,
    lcv: f64,
    wtt: f64,
    ttw_co2: f64,
    ttw_ch4: f64,
    ttw_n2o: f64,
    is_rfnbo: bool,
}

impl FuelSpec {
    /// Build a validated fuel spec
    pub fn new(
        name: impl Into<String>,
        lcv: f64,
        wtt: f64,
        ttw_co2: f64,
        ttw_ch4: f64,
        ttw_n2o: f64,
        is_rfnbo: bool,
    ) -> FuelEUResult<Self> {
        Self::try_from(FuelRecord {
            name: name.into(),
            lcv,
            wtt,
            ttw_co2,
            ttw_ch4,
            ttw_n2o,
            is_rfnbo,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Lower calorific value (MJ/g), always strictly positive
    pub fn lcv(&self) -> f64 {
        self.lcv
    }

    /// Well-to-tank factor (gCO2eq/MJ)
    pub fn wtt(&self) -> f64 {
        self.wtt
    }

    pub fn ttw_co2(&self) -> f64 {
        self.ttw_co2
    }

    pub fn ttw_ch4(&self) -> f64 {
        self.ttw_ch4
    }

    pub fn ttw_n2o(&self) -> f64 {
        self.ttw_n2o
    }

    pub fn is_rfnbo(&self) -> bool {
        self.is_rfnbo
    }
}

impl TryFrom<FuelRecord> for FuelSpec {
    type Error = FuelEUError;

    fn try_from(record: FuelRecord) -> FuelEUResult<Self> {
        let fields = [
            ("lcv", record.lcv),
            ("wtt", record.wtt),
            ("ttw_co2", record.ttw_co2),
            ("ttw_ch4", record.ttw_ch4),
            ("ttw_n2o", record.ttw_n2o),
        ];
        for (field, value) in fields {
            if !value.is_finite() {
                return Err(FuelEUError::NonFiniteValue {
                    fuel: record.name,
                    field,
                    value,
                });
            }
        }
        if record.lcv <= 0.0 {
            return Err(FuelEUError::NonPositiveLcv {
                fuel: record.name,
                lcv: record.lcv,
            });
        }
        for &(field, value) in &fields[1..] {
            if value < 0.0 {
                return Err(FuelEUError::NegativeEmissionFactor {
                    fuel: record.name,
                    field,
                    value,
                });
            }
        }

        Ok(Self {
            name: record.name,
            lcv: record.lcv,
            wtt: record.wtt,
            ttw_co2: record.ttw_co2,
            ttw_ch4: record.ttw_ch4,
            ttw_n2o: record.ttw_n2o,
            is_rfnbo: record.is_rfnbo,
        })
    }
}

impl From<FuelSpec> for FuelRecord {
    fn from(spec: FuelSpec) -> Self {
        Self {
            name: spec.name,
            lcv: spec.lcv,
            wtt: spec.wtt,
            ttw_co2: spec.ttw_co2,
            ttw_ch4: spec.ttw_ch4,
            ttw_n2o: spec.ttw_n2o,
            is_rfnbo: spec.is_rfnbo,
        }
    }
}

// (name, lcv, wtt, ttw_co2, ttw_ch4, ttw_n2o, is_rfnbo)
type ReferenceRow = (&'static str, f64, f64, f64, f64, f64, bool);

const REFERENCE_FUELS: [ReferenceRow; 26] = [
    (names::HFO, 0.0405, 13.5, 3.114, 0.00005, 0.00018, false),
    (names::LFO, 0.0410, 13.2, 3.151, 0.00005, 0.00018, false),
    (names::MGO, 0.0427, 14.4, 3.206, 0.00005, 0.00018, false),
    (names::LNG, 0.0491, 18.5, 2.750, 0.001276, 0.00011, false),
    (names::LPG, 0.0460, 7.8, 3.015, 0.007, 0.0, false),
    (names::FOSSIL_METHANOL, 0.0199, 31.3, 1.375, 0.003, 0.0, false),
    (names::BIODIESEL_RAPESEED, 0.0430, 1.5, 2.834, 0.0, 0.0, false),
    (names::BIODIESEL_CORN, 0.0430, 31.6, 2.834, 0.0, 0.0, false),
    (names::BIODIESEL_WHEAT_STRAW, 0.0430, 15.7, 0.0, 0.0, 0.0, false),
    (names::BIOETHANOL_SUGAR_BEET, 0.0270, 35.0, 0.0, 0.0, 0.0, false),
    (names::BIOETHANOL_MAIZE, 0.0270, 38.2, 0.0, 0.0, 0.0, false),
    (names::BIOETHANOL_WHEAT, 0.0270, 41.0, 0.0, 0.0, 0.0, false),
    (names::BIODIESEL_UCO, 0.0430, 14.9, 0.0, 0.0, 0.0, false),
    (names::BIODIESEL_ANIMAL_FATS, 0.0430, 20.8, 0.0, 0.0, 0.0, false),
    (names::BIODIESEL_SUNFLOWER, 0.0430, 44.7, 2.834, 0.0, 0.0, false),
    (names::BIODIESEL_SOYBEAN, 0.0430, 47.0, 2.834, 0.0, 0.0, false),
    (names::BIODIESEL_PALM, 0.0430, 75.7, 2.834, 0.0, 0.0, false),
    (names::HVO, 0.0440, 50.1, 3.115, 0.00005, 0.00018, false),
    (names::FOSSIL_HYDROGEN, 0.1200, 132.7, 0.0, 0.0, 0.0, false),
    (names::FOSSIL_AMMONIA, 0.0186, 118.6, 0.0, 0.0, 0.0, false),
    (names::E_METHANOL, 0.0199, 1.0, 0.0, 0.0, 0.0, true),
    (names::E_LNG, 0.0491, 1.0, 0.0, 0.0, 0.0, true),
    (names::GREEN_HYDROGEN, 0.1200, 0.0, 0.0, 0.0, 0.0, true),
    (names::GREEN_AMMONIA, 0.0186, 0.0, 0.0, 0.0, 0.0, true),
    (names::BIO_LNG, 0.0491, 14.1, 2.75, 0.14, 0.00011, false),
    (names::BIO_METHANOL, 0.0199, 13.5, 0.0, 0.003, 0.0, false),
];

#[derive(Debug, Deserialize)]
struct RegistryDocument {
    #[serde(default)]
    fuel: Vec<FuelRecord>,
}

/// Immutable, name-keyed table of fuel specs.
///
/// Insertion order is preserved so reports list fuels the way they were defined.
#[derive(Debug, Clone, PartialEq)]
pub struct FuelRegistry {
    fuels: Vec<FuelSpec>,
    index: HashMap<String, usize>,
}

impl Default for FuelRegistry {
    fn default() -> Self {
        Self::reference()
    }
}

impl FuelRegistry {
    /// Build a registry, rejecting duplicate names
    pub fn new(fuels: Vec<FuelSpec>) -> FuelEUResult<Self> {
        let mut index = HashMap::with_capacity(fuels.len());
        for (position, fuel) in fuels.iter().enumerate() {
            if index.insert(fuel.name().to_string(), position).is_some() {
                return Err(FuelEUError::DuplicateFuel(fuel.name().to_string()));
            }
        }
        Ok(Self { fuels, index })
    }

    /// Registry built from validated records
    pub fn from_records(records: Vec<FuelRecord>) -> FuelEUResult<Self> {
        let fuels = records
            .into_iter()
            .map(FuelSpec::try_from)
            .collect::<FuelEUResult<Vec<_>>>()?;
        Self::new(fuels)
    }

    /// Parse a registry from a TOML document containing a `[[fuel]]` array
    pub fn from_toml_str(document: &str) -> FuelEUResult<Self> {
        let document: RegistryDocument = toml::from_str(document)?;
        Self::from_records(document.fuel)
    }

    /// The reference fuels of the FuelEU annex
    pub fn reference() -> Self {
        let fuels = REFERENCE_FUELS
            .iter()
            .map(
                |&(name, lcv, wtt, ttw_co2, ttw_ch4, ttw_n2o, is_rfnbo)| FuelSpec {
                    name: name.to_string(),
                    lcv,
                    wtt,
                    ttw_co2,
                    ttw_ch4,
                    ttw_n2o,
                    is_rfnbo,
                },
            )
            .collect::<Vec<_>>();
        let index = fuels
            .iter()
            .enumerate()
            .map(|(position, fuel)| (fuel.name.clone(), position))
            .collect();
        Self { fuels, index }
    }

    pub fn get(&self, name: &str) -> Option<&FuelSpec> {
        self.index.get(name).map(|&position| &self.fuels[position])
    }

    /// Look up a fuel, failing with [`FuelEUError::UnknownFuel`]
    pub fn require(&self, name: &str) -> FuelEUResult<&FuelSpec> {
        self.get(name)
            .ok_or_else(|| FuelEUError::UnknownFuel(name.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &FuelSpec> {
        self.fuels.iter()
    }

    pub fn len(&self) -> usize {
        self.fuels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fuels.is_empty()
    }
}
