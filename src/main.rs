//! Application entry point: Vehicle Studio.
//!
//! # Startup sequence
//!
//! 1. Initialise logging.
//! 2. Load [`AppConfig`] from disk (returns default on first run).
//! 3. Create [`tokio`] runtime (multi-thread, 2 workers).
//! 4. Build the service clients ([`ApiImageGenerator`], [`ApiCompleter`]).
//! 5. Decide speech capability once (Whisper model + microphone).
//! 6. Build the shared session and the workflows around it.
//! 7. Run [`eframe::run_native`]: blocks the main thread until the window
//!    is closed.

use std::sync::Arc;

use anyhow::Context;
use eframe::egui;
use vehicle_studio::{
    app::{paste::PasteChordListener, StudioApp, StudioServices},
    config::{AppConfig, AppPaths},
    generation::{ApiImageGenerator, ImageGenerator},
    llm::{ApiCompleter, ChatCompleter},
    notify::{NoticeBoard, Notifier},
    output::{DownloadSink, FileDownloader, OutputActions},
    session::new_shared_session,
    speech::{detect_capability, VoiceCapture},
    workflow::{Dictation, GenerationWorkflow, RepassWorkflow},
};

// ---------------------------------------------------------------------------
// Native options builder
// ---------------------------------------------------------------------------

fn native_options(config: &AppConfig) -> eframe::NativeOptions {
    let (width, height) = config.ui.window_size;
    let mut vp = egui::ViewportBuilder::default()
        .with_title("Vehicle Studio")
        .with_inner_size([width, height])
        .with_min_inner_size([640.0, 480.0])
        .with_drag_and_drop(true);

    if config.ui.always_on_top {
        vp = vp.with_always_on_top();
    }

    eframe::NativeOptions {
        viewport: vp,
        ..Default::default()
    }
}

// ---------------------------------------------------------------------------
// main
// ---------------------------------------------------------------------------

fn main() -> anyhow::Result<()> {
    // 1. Logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Vehicle Studio starting up");

    // 2. Configuration
    let paths = AppPaths::new();
    if AppConfig::is_first_run() {
        log::info!("no settings at {}; using defaults", paths.settings_file.display());
    }
    let config = AppConfig::load().unwrap_or_else(|e| {
        log::warn!("Failed to load config ({e}); using defaults");
        AppConfig::default()
    });

    // 3. Tokio runtime (2 worker threads: network calls and Whisper)
    let rt = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .context("failed to create tokio runtime")?;

    // 4. Service clients
    let generator = ApiImageGenerator::from_config(&config.generation);
    let http = generator.client().clone();
    let generator: Arc<dyn ImageGenerator> = Arc::new(generator);
    let completer: Arc<dyn ChatCompleter> = Arc::new(ApiCompleter::from_config(&config.llm));

    // 5. Speech capability (loads the Whisper model when present)
    let capability = detect_capability(&config, &paths);
    if capability.is_supported() {
        log::info!("Dictation available (model {})", config.speech.model);
    } else {
        log::warn!("Dictation unavailable: {capability:?}");
    }

    // 6. Session + workflows
    let session = new_shared_session();
    let notices = Arc::new(NoticeBoard::new());
    let notifier: Arc<dyn Notifier> = notices.clone();

    let mut generation = GenerationWorkflow::new(
        Arc::clone(&session),
        generator,
        Arc::clone(&notifier),
        &config.generation,
    );
    if config.generation.inline_remote_images {
        generation = generation.with_remote_inlining(http.clone());
    }

    let repass = Arc::new(RepassWorkflow::new(Arc::clone(&session), completer));
    let dictation = Dictation::new(
        Arc::clone(&session),
        VoiceCapture::new(capability),
        repass,
        Arc::clone(&notifier),
    );

    let download_dir = config.output.resolve_download_dir(&paths);
    log::info!("Saving results to {}", download_dir.display());
    let sink: Arc<dyn DownloadSink> = Arc::new(FileDownloader::new(download_dir, http.clone()));
    let output = OutputActions::new(Arc::clone(&session), sink, notifier);

    // 7. Build the egui app and run it (blocks until the window is closed)
    let services = StudioServices {
        session,
        notices,
        runtime: rt.handle().clone(),
        http,
        generation: Arc::new(generation),
        dictation: Arc::new(dictation),
        output: Arc::new(output),
    };
    let options = native_options(&config);

    eframe::run_native(
        "Vehicle Studio",
        options,
        Box::new(move |cc| {
            let mut app = StudioApp::new(services);
            match PasteChordListener::start(cc.egui_ctx.clone()) {
                Ok(listener) => app = app.with_paste_listener(listener),
                Err(e) => log::warn!("Paste shortcut limited to text clipboards: {e}"),
            }
            Ok(Box::new(app))
        }),
    )
    .map_err(|e| anyhow::anyhow!("window closed with error: {e}"))?;

    log::info!("Vehicle Studio closing");
    Ok(())
}
