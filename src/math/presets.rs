pub struct Preset {
    pub name: &'static str,
    pub description: &'static str,
    pub expression: &'static str,
}

pub const PRESETS: &[Preset] = &[
    Preset {
        name: "cone",
        description: "Square-root cone, steepest at the origin",
        expression: "sqrt(abs(x) + abs(z))",
    },
    Preset {
        name: "waves",
        description: "Crossed sine waves",
        expression: "5 * (sin(x / 10) + sin(z / 10))",
    },
    Preset {
        name: "ripple",
        description: "Radial wave pattern",
        expression: "20 * sin(hypot(x, z) / 8) / (1 + hypot(x, z) / 40)",
    },
    Preset {
        name: "saddle",
        description: "x² - z²",
        expression: "(x^2 - z^2) / 100",
    },
    Preset {
        name: "peaks",
        description: "Gaussian bumps",
        expression: "30 * exp(-((x - 20)^2 + z^2) / 400) - 20 * exp(-(x^2 + (z - 30)^2) / 300)",
    },
    Preset {
        name: "bowl",
        description: "Paraboloid",
        expression: "(x^2 + z^2) / 200",
    },
];

pub const DEFAULT_PRESET: &str = "cone";

pub fn find(name: &str) -> Option<&'static Preset> {
    PRESETS
        .iter()
        .find(|preset| preset.name.eq_ignore_ascii_case(name))
}
