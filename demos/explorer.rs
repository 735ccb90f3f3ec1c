// ============================================================================
// Explorer Demo
// Renders a short Mandelbrot zoom interactively on the terminal, then
// exports the final view as a PNG
// ============================================================================

use fractal_explorer::prelude::*;
use std::sync::Arc;
use std::time::Duration;

struct StageLogger;

impl FrameSink for StageLogger {
    fn on_stage_complete(&self, stage: usize) {
        println!("  stage {stage} complete");
    }

    fn on_pass_complete(&self, frame: FrameSnapshot) {
        println!("  pass complete ({}x{})", frame.width, frame.height);
    }
}

fn main() {
    #[cfg(feature = "logging")]
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    let config = RenderConfig::new(320, 240)
        .with_kind(FractalKind::MandelbrotPower2)
        .with_iteration_limit(150)
        .with_export_resolution(640, 480)
        .with_output_dir("renders");
    let engine = match RenderEngine::new(config, Arc::new(MonochromeMapper), Arc::new(StageLogger))
    {
        Ok(engine) => engine,
        Err(err) => {
            eprintln!("failed to start render engine: {err}");
            std::process::exit(1);
        }
    };

    println!(
        "rendering with {} workers at {} decimal digits",
        engine.worker_count(),
        engine.precision_digits()
    );

    engine.wait_until_idle(Duration::from_secs(120));
    print_ascii_preview(&engine);

    // zoom toward the seahorse valley and refine again
    println!("zooming...");
    engine.pan_view(-300.0, 80.0);
    for _ in 0..8 {
        engine.zoom_view(500.0);
    }
    engine.wait_until_idle(Duration::from_secs(120));
    print_ascii_preview(&engine);
    println!(
        "scale {} at {} decimal digits",
        engine.scale(),
        engine.precision_digits()
    );

    println!("exporting...");
    engine.render_image();
    while engine.mode() != RenderMode::Preview {
        std::thread::sleep(Duration::from_millis(50));
    }
    match engine.take_export_error() {
        None => println!("export complete (see the renders/ directory)"),
        Some(err) => eprintln!("export failed: {err}"),
    }
}

/// Downsample the iteration buffer into an 80x30 character shade map.
fn print_ascii_preview(engine: &RenderEngine) {
    const SHADES: &[u8] = b" .:-=+*#%@";
    let (width, height) = engine.surface_size();
    let iterations = engine.iteration_snapshot();
    let limit = engine.iteration_limit().max(1);

    let cols = 80u32;
    let rows = 30u32;
    for row in 0..rows {
        let mut line = String::with_capacity(cols as usize);
        for col in 0..cols {
            let x = col * width / cols;
            let y = row * height / rows;
            let count = iterations[(x + width * y) as usize];
            let shade = (count.min(limit) as usize * (SHADES.len() - 1)) / limit as usize;
            line.push(SHADES[shade] as char);
        }
        println!("{line}");
    }
}
