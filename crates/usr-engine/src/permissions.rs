//! Per-section write permissions
//!
//! Read from the `assign_*` flags of an assignment; a missing or `null`
//! flag means "not granted".

use crate::error::EngineError;
use serde::{Deserialize, Deserializer, Serialize};
use usr_model::Layer;

/// Which layers the session may mutate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SectionPermissions {
    #[serde(rename = "assign_lexical", default, deserialize_with = "flag")]
    pub lexical: bool,
    #[serde(rename = "assign_dependency", default, deserialize_with = "flag")]
    pub dependency: bool,
    #[serde(rename = "assign_discourse", default, deserialize_with = "flag")]
    pub discourse: bool,
    #[serde(rename = "assign_construction", default, deserialize_with = "flag")]
    pub construction: bool,
}

fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(false))
}

impl SectionPermissions {
    /// Every section granted
    #[must_use]
    pub const fn all() -> Self {
        Self {
            lexical: true,
            dependency: true,
            discourse: true,
            construction: true,
        }
    }

    /// Nothing granted
    #[must_use]
    pub const fn none() -> Self {
        Self {
            lexical: false,
            dependency: false,
            discourse: false,
            construction: false,
        }
    }

    /// With one section set
    #[must_use]
    pub fn with(mut self, layer: Layer, granted: bool) -> Self {
        match layer {
            Layer::Lexical => self.lexical = granted,
            Layer::Dependency => self.dependency = granted,
            Layer::Discourse => self.discourse = granted,
            Layer::Construction => self.construction = granted,
        }
        self
    }

    /// Only the given sections
    #[must_use]
    pub fn only(layers: &[Layer]) -> Self {
        layers
            .iter()
            .fold(Self::none(), |p, layer| p.with(*layer, true))
    }

    /// Is the layer writable?
    #[inline]
    #[must_use]
    pub fn allows(&self, layer: Layer) -> bool {
        match layer {
            Layer::Lexical => self.lexical,
            Layer::Dependency => self.dependency,
            Layer::Discourse => self.discourse,
            Layer::Construction => self.construction,
        }
    }

    /// Fail unless the layer is writable
    ///
    /// # Errors
    /// [`EngineError::PermissionDenied`]
    pub fn require(&self, layer: Layer) -> Result<(), EngineError> {
        if self.allows(layer) {
            Ok(())
        } else {
            Err(EngineError::PermissionDenied(layer))
        }
    }

    /// Writable layers in presentation order
    pub fn enabled(&self) -> impl Iterator<Item = Layer> + '_ {
        Layer::ALL.into_iter().filter(|l| self.allows(*l))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_and_null_flags_are_denied() {
        let p: SectionPermissions =
            serde_json::from_str(r#"{"assign_lexical": true, "assign_discourse": null}"#).unwrap();
        assert!(p.allows(Layer::Lexical));
        assert!(!p.allows(Layer::Discourse));
        assert!(!p.allows(Layer::Construction));
        assert!(matches!(
            p.require(Layer::Dependency),
            Err(EngineError::PermissionDenied(Layer::Dependency))
        ));
    }

    #[test]
    fn only_grants_listed_layers() {
        let p = SectionPermissions::only(&[Layer::Dependency, Layer::Construction]);
        assert_eq!(
            p.enabled().collect::<Vec<_>>(),
            vec![Layer::Dependency, Layer::Construction]
        );
    }
}
