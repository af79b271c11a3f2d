//! Screen model: raw screen dimensions or a named product preset.
//!
//! Only a [`ProductPreset`] can describe an outer (folded) panel. Whether a
//! device is configured with two panels is decided by
//! [`ScreenPreset::dual_screen`], a pure function of the preset and the
//! device-type classification.

use serde::{Deserialize, Serialize};

/// Device-type tag of two-panel foldable 2-in-1 devices.
pub const FOLDABLE_2IN1: &str = "2in1_foldable";

/// Physical and logical attributes of one screen.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScreenDimensions {
    /// Diagonal size in inches.
    pub diagonal: f64,
    /// Pixel density in dpi.
    pub density: u32,
    /// Height in pixels.
    pub height: u32,
    /// Width in pixels.
    pub width: u32,
}

impl ScreenDimensions {
    /// Size of this screen without its density.
    pub fn size(&self) -> ScreenSize {
        ScreenSize {
            diagonal: self.diagonal,
            height: self.height,
            width: self.width,
        }
    }
}

/// Outer panel of a foldable product. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OuterScreen {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diagonal: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
}

impl OuterScreen {
    /// The outer screen size when all three fields are defined.
    pub fn complete(&self) -> Option<ScreenSize> {
        Some(ScreenSize {
            diagonal: self.diagonal?,
            height: self.height?,
            width: self.width?,
        })
    }

    /// Whether at least one field is defined.
    pub fn has_any(&self) -> bool {
        self.diagonal.is_some() || self.height.is_some() || self.width.is_some()
    }
}

/// Diagonal and resolution of one panel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenSize {
    pub diagonal: f64,
    pub height: u32,
    pub width: u32,
}

/// A catalog-defined product screen configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductPreset {
    /// Preset name, unique within the table.
    pub name: String,
    /// Device-type classification, e.g. `phone` or `2in1_foldable`.
    pub device_type: String,
    /// Primary (unfolded) screen.
    pub screen: ScreenDimensions,
    /// Outer (folded) screen, if the product has one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outer: Option<OuterScreen>,
    /// Device model identifier reported to the guest.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dev_model: Option<String>,
    /// Marketing name of the product.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

/// Screen configuration of a device.
#[derive(Debug, Clone, PartialEq)]
pub enum ScreenPreset {
    /// Arbitrary user-defined screen.
    Raw(ScreenDimensions),
    /// Named product preset.
    Product(ProductPreset),
}

/// Panel sizes of a device configured in dual-screen mode.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DualScreen {
    /// Outer panel, used for the `single` fields.
    pub folded: ScreenSize,
    /// Primary panel, used for the `double` fields.
    pub unfolded: ScreenSize,
}

impl ScreenPreset {
    /// Primary screen attributes.
    pub fn screen(&self) -> &ScreenDimensions {
        match self {
            Self::Raw(screen) => screen,
            Self::Product(preset) => &preset.screen,
        }
    }

    /// The product preset, if this is one.
    pub fn product(&self) -> Option<&ProductPreset> {
        match self {
            Self::Raw(_) => None,
            Self::Product(preset) => Some(preset),
        }
    }

    /// Outer screen of a product preset.
    pub fn outer(&self) -> Option<&OuterScreen> {
        self.product().and_then(|preset| preset.outer.as_ref())
    }

    /// Select dual-screen mode.
    ///
    /// Dual mode requires a `2in1_foldable` device type, a product preset, and
    /// an outer screen with diagonal, height and width all defined.
    pub fn dual_screen(&self, device_type: &str) -> Option<DualScreen> {
        if device_type != FOLDABLE_2IN1 {
            return None;
        }

        match self {
            Self::Raw(_) => None,
            Self::Product(preset) => {
                let folded = preset.outer.as_ref()?.complete()?;
                Some(DualScreen {
                    folded,
                    unfolded: preset.screen.size(),
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn foldable(outer: OuterScreen) -> ScreenPreset {
        ScreenPreset::Product(ProductPreset {
            name: "Foldable PC".into(),
            device_type: FOLDABLE_2IN1.into(),
            screen: ScreenDimensions {
                diagonal: 18.0,
                density: 288,
                height: 2472,
                width: 3296,
            },
            outer: Some(outer),
            dev_model: None,
            display_name: None,
        })
    }

    fn full_outer() -> OuterScreen {
        OuterScreen {
            diagonal: Some(13.0),
            height: Some(1648),
            width: Some(2472),
        }
    }

    #[test]
    fn test_dual_screen_selected() {
        let dual = foldable(full_outer()).dual_screen(FOLDABLE_2IN1).unwrap();
        assert_eq!(dual.folded.height, 1648);
        assert_eq!(dual.folded.width, 2472);
        assert_eq!(dual.unfolded.diagonal, 18.0);
        assert_eq!(dual.unfolded.width, 3296);
    }

    #[test]
    fn test_dual_screen_requires_foldable_type() {
        assert!(foldable(full_outer()).dual_screen("2in1").is_none());
        assert!(foldable(full_outer()).dual_screen("phone").is_none());
    }

    #[test]
    fn test_dual_screen_requires_every_outer_field() {
        let mut missing_width = full_outer();
        missing_width.width = None;
        assert!(foldable(missing_width).dual_screen(FOLDABLE_2IN1).is_none());

        let mut missing_height = full_outer();
        missing_height.height = None;
        assert!(foldable(missing_height).dual_screen(FOLDABLE_2IN1).is_none());

        let mut missing_diagonal = full_outer();
        missing_diagonal.diagonal = None;
        assert!(foldable(missing_diagonal).dual_screen(FOLDABLE_2IN1).is_none());
    }

    #[test]
    fn test_raw_screen_is_never_dual() {
        let raw = ScreenPreset::Raw(ScreenDimensions {
            diagonal: 18.0,
            density: 288,
            height: 2472,
            width: 3296,
        });
        assert!(raw.dual_screen(FOLDABLE_2IN1).is_none());
        assert!(raw.product().is_none());
        assert!(raw.outer().is_none());
    }

    #[test]
    fn test_outer_has_any() {
        assert!(!OuterScreen::default().has_any());
        assert!(OuterScreen {
            height: Some(1),
            ..Default::default()
        }
        .has_any());
    }
}
