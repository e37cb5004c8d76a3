//! Code for handling IDs
use anyhow::{Result, ensure};
use std::collections::HashSet;

macro_rules! define_id_type {
    ($name:ident) => {
        #[derive(
            Clone, std::hash::Hash, PartialEq, Eq, serde::Deserialize, Debug, serde::Serialize,
        )]
        /// An ID type (e.g. `ComponentTypeID`)
        pub struct $name(pub std::rc::Rc<str>);

        impl std::borrow::Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                $name(std::rc::Rc::from(s))
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                $name(std::rc::Rc::from(s))
            }
        }
    };
}

define_id_type!(ComponentTypeID);

/// Check that every ID in the sequence is unique and non-blank
pub fn check_ids_unique<'a, I>(ids: I) -> Result<()>
where
    I: IntoIterator<Item = &'a ComponentTypeID>,
{
    let mut seen = HashSet::new();
    for id in ids {
        ensure!(!id.0.trim().is_empty(), "IDs cannot be blank");
        ensure!(seen.insert(id), "Duplicate ID found: {id}");
    }

    Ok(())
}
