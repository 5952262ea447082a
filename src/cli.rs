use clap::Parser;
use glam::Vec3;
use surface3d::GridConfig;
use surface3d::math::grid::{ANGULAR_SEGMENTS, EXPONENT_BASE, MAX_RADIUS, RING_COUNT};
use surface3d::math::presets::{self, DEFAULT_PRESET};

#[derive(Parser, Debug)]
#[command(name = "surface3d")]
#[command(about = "Explore y = f(x, z) on a camera-following polar mesh", long_about = None)]
pub struct Args {
    /// Expression in x and z, e.g. "sin(x) * cos(z)"
    #[arg(value_name = "EXPR", conflicts_with = "preset")]
    pub expression: Option<String>,

    /// Start from a named preset instead of an expression
    #[arg(short, long)]
    pub preset: Option<String>,

    /// Print the available presets and exit
    #[arg(long)]
    pub list_presets: bool,

    /// Number of concentric rings
    #[arg(long, default_value_t = RING_COUNT)]
    pub rings: usize,

    /// Number of angular segments per ring
    #[arg(long, default_value_t = ANGULAR_SEGMENTS)]
    pub segments: usize,

    /// Radius of the outermost ring
    #[arg(long, default_value_t = MAX_RADIUS)]
    pub max_radius: f64,

    /// Ring spacing exponent numerator
    #[arg(long, default_value_t = EXPONENT_BASE)]
    pub exponent_base: f64,

    /// Initial camera position
    #[arg(long, num_args = 3, value_names = ["X", "Y", "Z"], allow_negative_numbers = true,
          default_values_t = [0.0, 30.0, 0.0])]
    pub camera: Vec<f32>,

    /// Wait for vertical sync when presenting
    #[arg(long)]
    pub vsync: bool,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, default_value = "info")]
    pub log: String,
}

impl Args {
    pub fn grid_config(&self) -> GridConfig {
        GridConfig {
            max_radius: self.max_radius,
            exponent_base: self.exponent_base,
            ring_count: self.rings,
            angular_segments: self.segments,
            ..GridConfig::default()
        }
    }

    /// The expression text to start with. Fails on an unknown preset name.
    pub fn expression_text(&self) -> anyhow::Result<String> {
        if let Some(name) = &self.preset {
            let preset = presets::find(name)
                .ok_or_else(|| anyhow::anyhow!("unknown preset '{name}' (try --list-presets)"))?;
            return Ok(preset.expression.to_string());
        }
        if let Some(expr) = &self.expression {
            return Ok(expr.clone());
        }
        let preset = presets::find(DEFAULT_PRESET)
            .ok_or_else(|| anyhow::anyhow!("default preset '{DEFAULT_PRESET}' missing"))?;
        Ok(preset.expression.to_string())
    }

    pub fn camera_position(&self) -> Vec3 {
        match self.camera.as_slice() {
            [x, y, z] => Vec3::new(*x, *y, *z),
            _ => Vec3::new(0.0, 30.0, 0.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_grid_constants() {
        let args = Args::try_parse_from(["surface3d"]).unwrap();
        let config = args.grid_config();
        assert_eq!(config, GridConfig::default());
        assert_eq!(args.camera_position(), Vec3::new(0.0, 30.0, 0.0));
        assert_eq!(args.expression_text().unwrap(), "sqrt(abs(x) + abs(z))");
        assert!(!args.vsync);
    }

    #[test]
    fn positional_expression() {
        let args = Args::try_parse_from(["surface3d", "x * z"]).unwrap();
        assert_eq!(args.expression_text().unwrap(), "x * z");
    }

    #[test]
    fn preset_lookup() {
        let args = Args::try_parse_from(["surface3d", "--preset", "Saddle"]).unwrap();
        let text = args.expression_text().unwrap();
        assert_eq!(text, presets::find("saddle").unwrap().expression);

        let args = Args::try_parse_from(["surface3d", "-p", "nope"]).unwrap();
        assert!(args.expression_text().is_err());
    }

    #[test]
    fn preset_and_expression_conflict() {
        assert!(Args::try_parse_from(["surface3d", "x", "--preset", "cone"]).is_err());
    }

    #[test]
    fn oversized_grid_flags_fail_validation() {
        let args =
            Args::try_parse_from(["surface3d", "--rings", "5000", "--segments", "1000"]).unwrap();
        assert!(args.grid_config().validate().is_err());
    }

    #[test]
    fn grid_and_camera_flags() {
        let args = Args::try_parse_from([
            "surface3d",
            "--rings",
            "2",
            "--segments",
            "4",
            "--camera",
            "-5",
            "10",
            "2.5",
        ])
        .unwrap();
        let config = args.grid_config();
        assert_eq!(config.ring_count, 2);
        assert_eq!(config.angular_segments, 4);
        assert_eq!(config.triangle_count(), 12);
        assert_eq!(args.camera_position(), Vec3::new(-5.0, 10.0, 2.5));
    }
}
