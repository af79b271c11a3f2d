//! Built-in product preset table.
//!
//! The table is a compile-time constant; owned [`ProductPreset`] values are
//! built from it once on first use.

use std::sync::OnceLock;

use super::error::{DeviceError, DeviceResult};
use super::screen::{OuterScreen, ProductPreset, ScreenDimensions, ScreenPreset, FOLDABLE_2IN1};

struct PresetEntry {
    name: &'static str,
    device_type: &'static str,
    screen: ScreenDimensions,
    outer: Option<OuterScreen>,
    dev_model: Option<&'static str>,
    display_name: Option<&'static str>,
}

const fn screen(diagonal: f64, density: u32, height: u32, width: u32) -> ScreenDimensions {
    ScreenDimensions {
        diagonal,
        density,
        height,
        width,
    }
}

const fn outer(diagonal: f64, height: u32, width: u32) -> Option<OuterScreen> {
    Some(OuterScreen {
        diagonal: Some(diagonal),
        height: Some(height),
        width: Some(width),
    })
}

const PRESET_TABLE: &[PresetEntry] = &[
    PresetEntry {
        name: "Phone Standard",
        device_type: "phone",
        screen: screen(6.31, 480, 2688, 1216),
        outer: None,
        dev_model: Some("EMU-PHONE-01"),
        display_name: Some("Standard Phone"),
    },
    PresetEntry {
        name: "Phone Compact",
        device_type: "phone",
        screen: screen(5.8, 440, 2340, 1080),
        outer: None,
        dev_model: Some("EMU-PHONE-02"),
        display_name: None,
    },
    PresetEntry {
        name: "Foldable Phone",
        device_type: "foldable",
        screen: screen(7.85, 500, 2224, 2496),
        outer: outer(6.4, 2504, 1080),
        dev_model: Some("EMU-FOLD-01"),
        display_name: Some("Foldable Phone"),
    },
    PresetEntry {
        name: "Tablet",
        device_type: "tablet",
        screen: screen(12.2, 320, 1840, 2800),
        outer: None,
        dev_model: Some("EMU-TABLET-01"),
        display_name: Some("Tablet"),
    },
    PresetEntry {
        name: "PC 2in1",
        device_type: "2in1",
        screen: screen(14.2, 240, 1920, 2880),
        outer: None,
        dev_model: Some("EMU-PC-01"),
        display_name: None,
    },
    PresetEntry {
        name: "Foldable PC",
        device_type: FOLDABLE_2IN1,
        screen: screen(18.0, 288, 2472, 3296),
        outer: outer(13.0, 1648, 2472),
        dev_model: Some("EMU-PC-FOLD-01"),
        display_name: Some("Foldable PC"),
    },
    PresetEntry {
        name: "Wearable",
        device_type: "wearable",
        screen: screen(1.43, 320, 466, 466),
        outer: None,
        dev_model: None,
        display_name: None,
    },
];

static PRESETS: OnceLock<Vec<ProductPreset>> = OnceLock::new();

impl PresetEntry {
    fn to_preset(&self) -> ProductPreset {
        ProductPreset {
            name: self.name.to_string(),
            device_type: self.device_type.to_string(),
            screen: self.screen,
            outer: self.outer.clone(),
            dev_model: self.dev_model.map(str::to_string),
            display_name: self.display_name.map(str::to_string),
        }
    }
}

/// All built-in product presets, in table order.
pub fn presets() -> &'static [ProductPreset] {
    PRESETS.get_or_init(|| PRESET_TABLE.iter().map(PresetEntry::to_preset).collect())
}

/// Find a preset by name (case-insensitive).
pub fn find_preset(name: &str) -> Option<&'static ProductPreset> {
    presets()
        .iter()
        .find(|preset| preset.name.eq_ignore_ascii_case(name))
}

/// Presets of the given device type.
pub fn presets_for_device_type(device_type: &str) -> Vec<&'static ProductPreset> {
    presets()
        .iter()
        .filter(|preset| preset.device_type == device_type)
        .collect()
}

/// Resolve a preset name into a [`ScreenPreset`].
pub fn screen_preset(name: &str) -> DeviceResult<ScreenPreset> {
    find_preset(name)
        .cloned()
        .map(ScreenPreset::Product)
        .ok_or_else(|| DeviceError::UnknownPreset(name.to_string()))
}
