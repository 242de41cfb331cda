use elk_traits::{ElkError, ElkResult};
use ron::extensions::Extensions;
use ron::Options;
use serde::{Deserialize, Serialize};

/// Switches controlling what the exporter writes.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct ExportOptions {
    /// Skip `x`/`y` of shapes sitting at the origin.
    pub omit_zero_pos: bool,
    /// Skip `width`/`height` of shapes without a size.
    pub omit_zero_dim: bool,
    /// Write no geometry at all: no coordinates, sizes, sections or junction points.
    pub omit_layout: bool,
    /// Write the shortest option key that still resolves to the option.
    pub short_layout_option_keys: bool,
    /// Drop options the metadata service does not know.
    pub omit_unknown_layout_options: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        ExportOptions {
            omit_zero_pos: true,
            omit_zero_dim: true,
            omit_layout: false,
            short_layout_option_keys: true,
            omit_unknown_layout_options: true,
        }
    }
}

impl ExportOptions {
    fn ron_options() -> Options {
        Options::default()
            .with_default_extension(Extensions::IMPLICIT_SOME)
            .with_default_extension(Extensions::UNWRAP_NEWTYPES)
            .with_default_extension(Extensions::UNWRAP_VARIANT_NEWTYPES)
    }

    /// Reads options from RON, e.g. `(omit_layout: true)`. Missing fields
    /// keep their default.
    pub fn from_ron(ron: &str) -> ElkResult<Self> {
        Self::ron_options()
            .from_str(ron)
            .map_err(|e| ElkError::new_with_cause("Failed to parse export options", e))
    }

    pub fn to_ron(&self) -> ElkResult<String> {
        let pretty = ron::ser::PrettyConfig::default();
        Self::ron_options()
            .to_string_pretty(self, pretty)
            .map_err(|e| ElkError::new_with_cause("Failed to serialize export options", e))
    }

    pub fn set_options(
        &mut self,
        omit_zero_pos: bool,
        omit_zero_dim: bool,
        omit_layout: bool,
        short_layout_option_keys: bool,
        omit_unknown_layout_options: bool,
    ) {
        self.omit_zero_pos = omit_zero_pos;
        self.omit_zero_dim = omit_zero_dim;
        self.omit_layout = omit_layout;
        self.short_layout_option_keys = short_layout_option_keys;
        self.omit_unknown_layout_options = omit_unknown_layout_options;
    }

    pub fn omit_zero_pos(mut self, omit: bool) -> Self {
        self.omit_zero_pos = omit;
        self
    }

    pub fn omit_zero_dim(mut self, omit: bool) -> Self {
        self.omit_zero_dim = omit;
        self
    }

    pub fn omit_layout(mut self, omit: bool) -> Self {
        self.omit_layout = omit;
        self
    }

    pub fn short_layout_option_keys(mut self, short: bool) -> Self {
        self.short_layout_option_keys = short;
        self
    }

    pub fn omit_unknown_layout_options(mut self, omit: bool) -> Self {
        self.omit_unknown_layout_options = omit;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = ExportOptions::default();
        assert!(options.omit_zero_pos);
        assert!(options.omit_zero_dim);
        assert!(!options.omit_layout);
        assert!(options.short_layout_option_keys);
        assert!(options.omit_unknown_layout_options);
    }

    #[test]
    fn test_from_ron_partial() {
        let options = ExportOptions::from_ron("(omit_layout: true, short_layout_option_keys: false)")
            .unwrap();
        assert_eq!(
            options,
            ExportOptions::default()
                .omit_layout(true)
                .short_layout_option_keys(false)
        );
        assert_eq!(ExportOptions::from_ron("()").unwrap(), ExportOptions::default());
    }

    #[test]
    fn test_from_ron_rejects_garbage() {
        let err = ExportOptions::from_ron("(omit_layout: maybe)").unwrap_err();
        assert_eq!(err.message(), "Failed to parse export options");
        assert!(err.cause().is_some());
    }

    #[test]
    fn test_ron_round_trip() {
        let mut options = ExportOptions::default();
        options.set_options(false, false, true, false, false);
        let text = options.to_ron().unwrap();
        assert_eq!(ExportOptions::from_ron(&text).unwrap(), options);
    }
}
