use std::sync::OnceLock;

use clap::Parser;
use nannou::prelude::*;

use spectrum_city::Session;
use spectrum_city::analysis::{AnalyserSampler, ByteAnalyser};
use spectrum_city::audio::SampleSource;
use spectrum_city::cli::Args;
use spectrum_city::visual::CityView;

/// Parsed once in `main`; nannou's model callback is a plain `fn` and cannot
/// capture.
static ARGS: OnceLock<Args> = OnceLock::new();

struct Model {
    session: Session<AnalyserSampler<Box<dyn SampleSource>>>,
    view: CityView,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // reject bad configuration before a window opens
    let args = Args::parse();
    if let Err(e) = args
        .scene_config()
        .validate()
        .and_then(|_| args.analyser_config().validate())
    {
        log::error!("invalid configuration: {e}");
        std::process::exit(2);
    }
    ARGS.get_or_init(|| args);

    nannou::app(model).update(update).run();
}

fn model(app: &App) -> Model {
    match try_model(app) {
        Ok(model) => model,
        Err(e) => {
            log::error!("startup failed: {e:#}");
            std::process::exit(1);
        }
    }
}

fn try_model(app: &App) -> anyhow::Result<Model> {
    let args = ARGS
        .get()
        .ok_or_else(|| anyhow::anyhow!("arguments were not parsed"))?;

    app.new_window()
        .size(args.width, args.height)
        .title("spectrum city")
        .view(view)
        .mouse_pressed(mouse_pressed)
        .build()
        .map_err(|e| anyhow::anyhow!("failed to open window: {e:?}"))?;

    let analyser = ByteAnalyser::new(args.analyser_config())?;
    let sampler = AnalyserSampler::new(args.open_source()?, analyser);
    let session = Session::new(sampler, &args.scene_config())?;
    let view = CityView::new(args.height as f32, session.scene());

    Ok(Model { session, view })
}

fn update(_app: &App, model: &mut Model, _update: Update) {
    model.session.tick();
}

fn mouse_pressed(_app: &App, model: &mut Model, _button: MouseButton) {
    model.session.sampler_mut().source_mut().toggle_playback();
}

fn view(app: &App, model: &Model, frame: Frame) {
    model.view.draw(
        app,
        frame,
        model.session.scene(),
        &model.session.last_frame(),
    );
}
