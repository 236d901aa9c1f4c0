use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use tlas::AccelStrategy;

use crate::render::RenderOptions;
use crate::whitted::ShadingOptions;

/// Renders one of the built-in scenes with a recursive Whitted-style ray tracer.
#[derive(Parser, Debug)]
#[command(name = "rt-whitted", version, about, long_about = None)]
pub struct CliOptions {
    /// Name of the built-in scene to render (see --list-scenes)
    #[arg(short, long, default_value = "primitives")]
    pub scene: String,

    /// Acceleration structure for ray queries: linear, cbr or bvh
    #[arg(short, long, default_value = "bvh", value_parser = parse_strategy)]
    pub accel: AccelStrategy,

    /// Image width in pixels
    #[arg(long, default_value_t = 500)]
    pub width: u32,

    /// Image height in pixels
    #[arg(long, default_value_t = 500)]
    pub height: u32,

    /// Worker threads; 0 renders on the main thread, omitted uses one per core
    #[arg(short, long)]
    pub threads: Option<usize>,

    /// Supersampling grid size per pixel side (1 = one ray per pixel)
    #[arg(short, long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..=16))]
    pub grid: u32,

    /// Randomly perturbs the supersamples within their cells
    #[arg(long)]
    pub jitter: bool,

    /// Maximum recursion depth of the shading engine
    #[arg(long, default_value_t = ShadingOptions::default().max_level)]
    pub max_level: u32,

    /// Attenuation below which reflected, refracted and shadow contributions are dropped
    #[arg(long, default_value_t = ShadingOptions::default().min_k)]
    pub min_k: f32,

    /// Paints grid lines every N pixels over the rendered image
    #[arg(long)]
    pub grid_lines: Option<u32>,

    /// Output png file
    #[arg(short, long, default_value = "output.png")]
    pub output: PathBuf,

    #[arg(long, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Prints the names of the built-in scenes and exits
    #[arg(long)]
    pub list_scenes: bool,

    /// Hides the progress bar
    #[arg(short, long)]
    pub quiet: bool,
}

fn parse_strategy(s: &str) -> Result<AccelStrategy, String> {
    s.parse().map_err(|e: tlas::ParseStrategyError| e.to_string())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Off => log::LevelFilter::Off,
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

impl CliOptions {
    pub fn shading_options(&self) -> ShadingOptions {
        ShadingOptions {
            max_level: self.max_level,
            min_k: self.min_k,
        }
    }

    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            threads: self.threads,
            grid: self.grid,
            jitter: self.jitter,
            quiet: self.quiet,
        }
    }

    pub fn resolution(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn defaults() {
        let options = CliOptions::parse_from(["rt-whitted"]);
        assert_eq!(options.scene, "primitives");
        assert_eq!(options.accel, AccelStrategy::Bvh);
        assert_eq!(options.resolution(), (500, 500));
        assert_eq!(options.shading_options(), ShadingOptions::default());
        assert_eq!(options.render_options(), RenderOptions::default());
        assert_eq!(options.log_level, LogLevel::Info);
    }

    #[test]
    fn flags() {
        let options = CliOptions::parse_from([
            "rt-whitted",
            "--scene",
            "shadow",
            "--accel",
            "cbr",
            "--threads",
            "0",
            "--grid",
            "4",
            "--jitter",
            "--max-level",
            "3",
            "--log-level",
            "debug",
        ]);
        assert_eq!(options.scene, "shadow");
        assert_eq!(options.accel, AccelStrategy::Coarse);
        assert_eq!(options.render_options().threads, Some(0));
        assert_eq!(options.render_options().grid, 4);
        assert!(options.render_options().jitter);
        assert_eq!(options.shading_options().max_level, 3);
        assert_eq!(log::LevelFilter::from(options.log_level), log::LevelFilter::Debug);
    }

    #[test]
    fn rejects_bad_values() {
        assert!(CliOptions::try_parse_from(["rt-whitted", "--accel", "kdtree"]).is_err());
        assert!(CliOptions::try_parse_from(["rt-whitted", "--grid", "0"]).is_err());
    }
}
