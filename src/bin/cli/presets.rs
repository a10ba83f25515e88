use wled::{Applied, ApplyOptions, Controller, Error};

use structopt::clap::arg_enum;

arg_enum! {
    #[derive(Debug, Clone)]
    pub enum Preset {
        Classic,
        Candy,
        Winter,
        Warm,
        Party,
        Fire,
        Ocean,
        Night,
    }
}

struct PresetValue {
    palette: &'static str,
    brightness: i64,
    transition: u32,
}

/// Apply `preset` on top of `base` (segment and effect are kept).
pub async fn apply(
    wled: &mut Controller,
    preset: Preset,
    base: ApplyOptions,
) -> Result<Applied, Error> {
    use Preset::*;
    let value = match preset {
        Classic => bulbs("C9"),
        Candy => bulbs("Candy Cane"),
        Winter => PresetValue {
            palette: "Icefire",
            brightness: 160,
            transition: 1500,
        },
        Warm => bulbs("Yelmag"),
        Party => PresetValue {
            palette: "Party",
            brightness: 255,
            transition: 300,
        },
        Fire => PresetValue {
            palette: "Lava",
            brightness: 200,
            transition: 700,
        },
        Ocean => PresetValue {
            palette: "Ocean",
            brightness: 180,
            transition: 1000,
        },
        Night => PresetValue {
            palette: "C9",
            brightness: 40,
            transition: 3000,
        },
    };
    send(wled, value, base).await
}

async fn send(
    wled: &mut Controller,
    preset: PresetValue,
    base: ApplyOptions,
) -> Result<Applied, Error> {
    let opts = ApplyOptions {
        palette: preset.palette.to_string(),
        brightness: preset.brightness,
        transition_ms: preset.transition,
        ..base
    };
    wled.apply_effect(&opts).await
}

fn bulbs(palette: &'static str) -> PresetValue {
    PresetValue {
        palette,
        brightness: 200,
        transition: 700,
    }
}
