//! Vehicle Studio control panel: egui/eframe application.
//!
//! # Architecture
//!
//! [`StudioApp`] is the top-level [`eframe::App`].  It owns no business
//! state: every frame it reads [`StudioState`](crate::session::StudioState)
//! through the [`SharedSession`], draws it, and turns user gestures into
//! workflow calls spawned on the tokio runtime.  Spawned tasks request a
//! repaint when they finish.
//!
//! | Area | Gesture | Handler |
//! |------|---------|---------|
//! | Source | "Escolher arquivo" (`rfd`) | [`acquire::on_file_chosen`] |
//! | Source | URL field keystroke | [`acquire::on_url_input`] |
//! | Window | file drop | [`acquire::on_drop`] |
//! | Window | Ctrl+V outside text fields ([`paste`]), "Colar" | [`acquire::on_paste`] |
//! | Prompt | mic | [`Dictation::dictate_prompt`] |
//! | Prompt | "Gerar" | [`GenerationWorkflow::submit`] |
//! | Result | download / save / gallery | [`OutputActions`] |
//! | Repass | mic | [`Dictation::dictate_repass`] |

pub mod clipboard;
pub mod paste;
pub mod preview;

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use eframe::egui;
use tokio::runtime::Handle;

use crate::media::{DropPayload, FileItem};
use crate::notify::{Notice, NoticeBoard, Severity};
use crate::output::OutputActions;
use crate::session::{acquire, lock_session, SharedSession};
use crate::workflow::{Dictation, GenerationWorkflow};

use paste::{PasteChordListener, PasteGate, PasteSignals};
use preview::PreviewCache;

/// How long a notice stays on screen.
const NOTICE_TTL: Duration = Duration::from_secs(5);

/// Extensions offered by the file picker.
const PICKER_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "webp", "gif", "bmp"];

// ---------------------------------------------------------------------------
// StudioServices
// ---------------------------------------------------------------------------

/// Everything the window drives, built once in `main`.
pub struct StudioServices {
    pub session: SharedSession,
    pub notices: Arc<NoticeBoard>,
    pub runtime: Handle,
    /// Used for remote previews.
    pub http: reqwest::Client,
    pub generation: Arc<GenerationWorkflow>,
    pub dictation: Arc<Dictation>,
    pub output: Arc<OutputActions>,
}

// ---------------------------------------------------------------------------
// StudioApp
// ---------------------------------------------------------------------------

pub struct StudioApp {
    services: StudioServices,

    // ── Previews ─────────────────────────────────────────────────────────
    source_preview: PreviewCache,
    result_preview: PreviewCache,

    // ── Transient UI state ───────────────────────────────────────────────
    /// Files were hovering over the window last frame.
    hovering: bool,
    /// Notices on screen with the time they arrived.
    toasts: Vec<(Notice, Instant)>,

    // ── Paste shortcut ───────────────────────────────────────────────────
    paste_gate: PasteGate,
    paste_listener: Option<PasteChordListener>,
}

impl StudioApp {
    pub fn new(services: StudioServices) -> Self {
        Self {
            services,
            source_preview: PreviewCache::new("source-preview"),
            result_preview: PreviewCache::new("result-preview"),
            hovering: false,
            toasts: Vec::new(),
            paste_gate: PasteGate::new(),
            paste_listener: None,
        }
    }

    /// Also paste on Cmd/Ctrl+V when the clipboard holds only an image.
    pub fn with_paste_listener(mut self, listener: PasteChordListener) -> Self {
        self.paste_listener = Some(listener);
        self
    }

    /// Run `task` on the runtime and repaint once it is done.
    fn spawn<F>(&self, ctx: &egui::Context, task: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let ctx = ctx.clone();
        self.services.runtime.spawn(async move {
            task.await;
            ctx.request_repaint();
        });
    }

    // ── Window-level input ───────────────────────────────────────────────

    /// Hover transitions and dropped files.
    fn handle_drag_and_drop(&mut self, ctx: &egui::Context) {
        let (hovering, dropped) = ctx.input(|i| {
            (
                !i.raw.hovered_files.is_empty(),
                i.raw.dropped_files.clone(),
            )
        });

        if !dropped.is_empty() {
            self.hovering = false;
            let session = Arc::clone(&self.services.session);
            let payload = drop_payload(&dropped);
            self.spawn(ctx, async move {
                let outcome = acquire::on_drop(session, payload).await;
                log::debug!("input: drop handled: {outcome:?}");
            });
            return;
        }

        if hovering != self.hovering {
            let mut st = lock_session(&self.services.session);
            if hovering {
                st.drag.on_drag_enter();
            } else {
                st.drag.on_drag_leave();
            }
            self.hovering = hovering;
        } else if hovering {
            lock_session(&self.services.session).drag.on_drag_over();
        }
    }

    /// A paste gesture while no text field has focus.
    fn handle_global_paste(&mut self, ctx: &egui::Context) {
        // Drain every frame so a chord typed into a text field is not
        // replayed later.
        let global_chord = self
            .paste_listener
            .as_mut()
            .is_some_and(PasteChordListener::take_chord);

        let (text_paste_event, key_chord, window_focused) = ctx.input(|i| {
            (
                i.events.iter().any(|e| matches!(e, egui::Event::Paste(_))),
                i.modifiers.command && i.key_pressed(egui::Key::V),
                i.viewport().focused.unwrap_or(false),
            )
        });
        let signals = PasteSignals {
            text_paste_event,
            key_chord,
            global_chord,
            window_focused,
            widget_focused: ctx.memory(|m| m.focused().is_some()),
        };

        if self.paste_gate.should_paste(signals, Instant::now()) {
            self.paste(ctx);
        }
    }

    fn paste(&self, ctx: &egui::Context) {
        let session = Arc::clone(&self.services.session);
        let payload = clipboard::read_clipboard();
        self.spawn(ctx, async move {
            let outcome = acquire::on_paste(session, payload).await;
            log::debug!("input: paste handled: {outcome:?}");
        });
    }

    fn pick_file(&self, ctx: &egui::Context) {
        // Modal; the frame loop pauses until the dialog closes.
        let file = rfd::FileDialog::new()
            .set_title("Escolher imagem do veículo")
            .add_filter("Imagens", PICKER_EXTENSIONS)
            .pick_file()
            .map(FileItem::from_path);

        let session = Arc::clone(&self.services.session);
        self.spawn(ctx, async move {
            let outcome = acquire::on_file_chosen(session, file).await;
            log::debug!("input: file picker handled: {outcome:?}");
        });
    }

    // ── Notices ──────────────────────────────────────────────────────────

    fn collect_notices(&mut self) {
        let now = Instant::now();
        self.toasts
            .extend(self.services.notices.drain().into_iter().map(|n| (n, now)));
        self.toasts.retain(|(_, at)| at.elapsed() < NOTICE_TTL);
    }

    fn draw_notices(&mut self, ctx: &egui::Context) {
        if self.toasts.is_empty() {
            return;
        }
        egui::TopBottomPanel::bottom("notices").show(ctx, |ui| {
            let mut dismissed = None;
            for (index, (notice, _)) in self.toasts.iter().enumerate() {
                ui.horizontal(|ui| {
                    ui.label(
                        egui::RichText::new(notice.message.as_str())
                            .color(severity_color(notice.severity)),
                    );
                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui.small_button("x").clicked() {
                            dismissed = Some(index);
                        }
                    });
                });
            }
            if let Some(index) = dismissed {
                self.toasts.remove(index);
            }
        });
    }

    // ── Panels ───────────────────────────────────────────────────────────

    /// File picker, URL field, paste button and the source preview.
    fn draw_source(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        let (file_selection, mut url_text, preview, revision, dragging) = {
            let st = lock_session(&self.services.session);
            (
                st.inputs.file_selection().map(str::to_string),
                st.inputs.url_text().to_string(),
                st.inputs.preview().map(|p| p.as_str().to_string()),
                st.inputs.preview_revision(),
                st.drag.is_dragging_over(),
            )
        };

        let stroke = if dragging {
            egui::Stroke::new(2.0, egui::Color32::from_rgb(68, 136, 255))
        } else {
            egui::Stroke::new(1.0, egui::Color32::from_gray(90))
        };

        egui::Frame::group(ui.style()).stroke(stroke).show(ui, |ui| {
            ui.set_width(ui.available_width());
            ui.heading("Imagem do veículo");

            ui.horizontal(|ui| {
                if ui.button("Escolher arquivo").clicked() {
                    self.pick_file(ctx);
                }
                ui.label(file_selection.as_deref().unwrap_or("Nenhum arquivo escolhido"));
            });

            ui.horizontal(|ui| {
                ui.label("URL:");
                let response = ui.add(
                    egui::TextEdit::singleline(&mut url_text)
                        .hint_text("https://...")
                        .desired_width(ui.available_width() - 70.0),
                );
                if response.changed() {
                    acquire::on_url_input(&self.services.session, &url_text);
                }
                if ui.button("Colar").clicked() {
                    self.paste(ctx);
                }
            });

            if dragging {
                ui.label(
                    egui::RichText::new("Solte a imagem aqui")
                        .color(egui::Color32::from_rgb(68, 136, 255)),
                );
            }

            self.source_preview.sync(
                ctx,
                &self.services.runtime,
                &self.services.http,
                &revision.to_string(),
                preview.as_deref(),
            );
            draw_preview(ui, &self.source_preview, 220.0);
        });
    }

    /// Prompt field, prompt mic, plate toggle and the generate trigger.
    fn draw_prompt(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        let (mut prompt, plate, recording, in_flight, loading) = {
            let st = lock_session(&self.services.session);
            (
                st.prompt.clone(),
                st.plate_obfuscation,
                st.prompt_recording,
                st.generation.in_flight,
                st.generation.loading,
            )
        };

        ui.heading("Instruções de edição");
        ui.horizontal(|ui| {
            let response = ui.add(
                egui::TextEdit::multiline(&mut prompt)
                    .hint_text("Ex.: trocar o fundo por um showroom")
                    .desired_rows(3)
                    .desired_width(ui.available_width() - 50.0),
            );
            if response.changed() {
                lock_session(&self.services.session).prompt = prompt.clone();
            }

            let mic = egui::Button::new(if recording { "● Ouvindo" } else { "Mic" })
                .fill(mic_fill(recording));
            if ui.add_enabled(!recording, mic).clicked() {
                let dictation = Arc::clone(&self.services.dictation);
                self.spawn(ctx, async move {
                    dictation.dictate_prompt().await;
                });
            }
        });

        ui.horizontal(|ui| {
            let plate_label = if plate {
                "Ocultar placa: ativado"
            } else {
                "Ocultar placa: desativado"
            };
            if ui.selectable_label(plate, plate_label).clicked() {
                self.services.generation.toggle_plate_obfuscation();
            }

            if ui.add_enabled(!in_flight, egui::Button::new("Gerar")).clicked() {
                let generation = Arc::clone(&self.services.generation);
                self.spawn(ctx, async move {
                    let outcome = generation.submit().await;
                    log::debug!("generate: {outcome:?}");
                });
            }
            if loading {
                ui.spinner();
                ui.label("Gerando...");
            }
        });
    }

    /// Generated image, its URL with download, and the save buttons.
    fn draw_result(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        let displayed = lock_session(&self.services.session)
            .current_result()
            .map(str::to_string);

        ui.heading("Resultado");
        self.result_preview.sync(
            ctx,
            &self.services.runtime,
            &self.services.http,
            displayed.as_deref().unwrap_or_default(),
            displayed.as_deref(),
        );
        draw_preview(ui, &self.result_preview, 320.0);

        ui.horizontal(|ui| {
            let mut shown = match displayed.as_deref() {
                // data: URLs run to megabytes
                Some(url) if url.len() > 120 => format!("{}...", url.chars().take(117).collect::<String>()),
                Some(url) => url.to_string(),
                None => String::new(),
            };
            ui.add(
                egui::TextEdit::singleline(&mut shown)
                    .interactive(false)
                    .desired_width(ui.available_width() - 90.0),
            );
            if ui.button("Baixar").clicked() {
                let output = Arc::clone(&self.services.output);
                self.spawn(ctx, async move {
                    output.download_output().await;
                });
            }
        });

        ui.horizontal(|ui| {
            if ui.button("Salvar imagem").clicked() {
                let output = Arc::clone(&self.services.output);
                self.spawn(ctx, async move {
                    output.save_individual().await;
                });
            }
            if ui.button("Salvar na galeria").clicked() {
                self.services.output.save_gallery();
            }
        });
    }

    /// Repass mic and the structured listing.
    fn draw_repass(&mut self, ui: &mut egui::Ui, ctx: &egui::Context) {
        let (visible, mut text, busy, recording) = {
            let st = lock_session(&self.services.session);
            (
                st.repass.visible,
                st.repass.text.clone(),
                st.repass.busy,
                st.repass_recording,
            )
        };

        ui.heading("Repasse");
        ui.horizontal(|ui| {
            let mic = egui::Button::new(if recording {
                "● Ouvindo"
            } else {
                "Ditar detalhes"
            })
            .fill(mic_fill(recording));
            if ui.add_enabled(!recording && !busy, mic).clicked() {
                let dictation = Arc::clone(&self.services.dictation);
                self.spawn(ctx, async move {
                    dictation.dictate_repass().await;
                });
            }
            if busy {
                ui.spinner();
            }
            if visible && !busy && ui.button("Copiar").clicked() {
                ctx.copy_text(text.clone());
            }
        });

        if visible {
            ui.add(
                egui::TextEdit::multiline(&mut text)
                    .interactive(false)
                    .desired_rows(8)
                    .desired_width(f32::INFINITY),
            );
        }
    }
}

// ---------------------------------------------------------------------------
// eframe::App impl
// ---------------------------------------------------------------------------

impl eframe::App for StudioApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // --- Window-level input --------------------------------------------
        self.handle_drag_and_drop(ctx);
        self.handle_global_paste(ctx);
        self.collect_notices();

        // --- Keep animating while work is outstanding -----------------------
        let busy = lock_session(&self.services.session).is_busy();
        if busy || self.source_preview.is_loading() || self.result_preview.is_loading() {
            ctx.request_repaint_after(Duration::from_millis(100));
        } else if !self.toasts.is_empty() {
            ctx.request_repaint_after(Duration::from_millis(500));
        }

        self.draw_notices(ctx);

        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical().show(ui, |ui| {
                self.draw_source(ui, ctx);
                ui.add_space(8.0);
                self.draw_prompt(ui, ctx);
                ui.separator();
                self.draw_result(ui, ctx);
                ui.separator();
                self.draw_repass(ui, ctx);
            });
        });
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// egui dropped files → [`DropPayload`].  Native drops carry a path; web-style
/// drops carry bytes.  Entries with neither are skipped.
pub fn drop_payload(files: &[egui::DroppedFile]) -> DropPayload {
    let items = files
        .iter()
        .filter_map(|f| {
            if let Some(path) = &f.path {
                let mut item = FileItem::from_path(path.clone());
                if !f.mime.is_empty() {
                    item.mime = Some(f.mime.clone());
                }
                Some(item)
            } else {
                f.bytes.as_ref().map(|bytes| {
                    let mime = (!f.mime.is_empty()).then(|| f.mime.clone());
                    FileItem::from_bytes(f.name.clone(), mime, bytes.to_vec())
                })
            }
        })
        .collect();
    DropPayload::new(items)
}

fn draw_preview(ui: &mut egui::Ui, cache: &PreviewCache, max_height: f32) {
    if let Some(texture) = cache.texture() {
        let size = texture.size_vec2();
        let scale = (max_height / size.y).min(ui.available_width() / size.x).min(1.0);
        ui.image((texture.id(), size * scale));
    } else if cache.is_loading() {
        ui.spinner();
    } else if cache.error().is_some() {
        ui.label(
            egui::RichText::new("Não foi possível exibir a imagem")
                .color(severity_color(Severity::Warning)),
        );
    }
}

fn severity_color(severity: Severity) -> egui::Color32 {
    match severity {
        Severity::Info => egui::Color32::from_rgb(80, 200, 120),
        Severity::Warning => egui::Color32::from_rgb(255, 180, 60),
        Severity::Error => egui::Color32::from_rgb(255, 100, 80),
    }
}

fn mic_fill(recording: bool) -> egui::Color32 {
    if recording {
        egui::Color32::from_rgb(160, 40, 40)
    } else {
        egui::Color32::TRANSPARENT
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
