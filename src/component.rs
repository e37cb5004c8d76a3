//! Component classes and the catalog of types which can be installed.
use crate::id::ComponentTypeID;
use crate::units::{Dimensionless, Energy, Money};
use serde::Serialize;
use strum::{Display, EnumIter};

/// The classes of component making up a hybrid system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Display, EnumIter, Serialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ComponentClass {
    /// Solar panels
    Panel,
    /// Storage batteries
    Battery,
    /// Inverters
    Inverter,
}

/// A type of component available for installation.
///
/// What `capacity` means depends on the class: daily generation for a panel, storage for a battery
/// and throughput for an inverter. All are expressed in kWh.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentType {
    /// Unique ID within the component's class
    pub id: ComponentTypeID,
    /// Purchase cost of a single unit
    pub unit_cost: Money,
    /// Capacity of a single unit
    pub capacity: Energy,
    /// Number of years after which a unit must be replaced
    pub lifespan: u32,
}

/// The distribution of a panel's daily output, as fractions of its nameplate capacity
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OutputDistribution {
    /// Mean output as a fraction of capacity
    pub mean_fraction: Dimensionless,
    /// Standard deviation of output as a fraction of capacity
    pub std_dev_fraction: Dimensionless,
}

/// A type of solar panel
#[derive(Debug, Clone, PartialEq)]
pub struct PanelType {
    /// Cost, capacity and lifespan
    pub component: ComponentType,
    /// Output uncertainty
    pub output: OutputDistribution,
}

/// The types available for each class of component.
///
/// Within a class, types are identified by their position in the catalog (the "type index").
#[derive(Debug, Clone, PartialEq)]
pub struct Catalog {
    /// Available panel types
    pub panels: Vec<PanelType>,
    /// Available battery types
    pub batteries: Vec<ComponentType>,
    /// Available inverter types
    pub inverters: Vec<ComponentType>,
}

impl Catalog {
    /// Iterate over the types available for the given class
    pub fn iter_types(
        &self,
        class: ComponentClass,
    ) -> Box<dyn Iterator<Item = &ComponentType> + '_> {
        match class {
            ComponentClass::Panel => Box::new(self.panels.iter().map(|panel| &panel.component)),
            ComponentClass::Battery => Box::new(self.batteries.iter()),
            ComponentClass::Inverter => Box::new(self.inverters.iter()),
        }
    }

    /// Get the type at `index` for the given class, if present
    pub fn get_type(&self, class: ComponentClass, index: usize) -> Option<&ComponentType> {
        match class {
            ComponentClass::Panel => self.panels.get(index).map(|panel| &panel.component),
            ComponentClass::Battery => self.batteries.get(index),
            ComponentClass::Inverter => self.inverters.get(index),
        }
    }

    /// The number of types available for the given class
    pub fn num_types(&self, class: ComponentClass) -> usize {
        match class {
            ComponentClass::Panel => self.panels.len(),
            ComponentClass::Battery => self.batteries.len(),
            ComponentClass::Inverter => self.inverters.len(),
        }
    }
}
