mod cli_options;
mod image;
mod render;
mod whitted;

use anyhow::Context;
use clap::Parser;

use cli_options::CliOptions;
use whitted::WhittedTracer;

fn main() -> anyhow::Result<()> {
    let options = CliOptions::parse();
    env_logger::Builder::new()
        .filter_level(options.log_level.into())
        .parse_default_env()
        .init();

    if options.list_scenes {
        for name in scene::preset::NAMES.iter() {
            println!("{}", name);
        }
        return Ok(());
    }

    let (scene, camera) = scene::preset::build(&options.scene, options.accel, options.resolution())
        .with_context(|| format!("building scene '{}'", options.scene))?;
    if !scene.root.geometric_sound() {
        log::warn!("Acceleration structure of '{}' has misplaced boxes", scene.name);
    }

    let tracer = WhittedTracer::new(&scene, options.shading_options());
    log::info!(
        "Rendering '{}' at {}x{}, {:?}",
        scene.name,
        options.width,
        options.height,
        tracer.options()
    );
    let mut image = render::render(&tracer, &camera, &options.render_options())?;
    if let Some(interval) = options.grid_lines.filter(|&i| i > 0) {
        image.draw_grid(interval, radiometry::color::Color::rgb(255, 255, 0));
    }

    image
        .write_png(&options.output)
        .with_context(|| format!("writing {}", options.output.display()))?;
    log::info!("Saved image to {}", options.output.display());
    Ok(())
}
