//! Image previews as egui textures.
//!
//! A [`PreviewCache`] holds one texture and the key it was built for.  Data
//! URLs are decoded on the blocking pool and remote URLs fetched on the tokio
//! runtime; either way the image is picked up on a later frame.

use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};

use anyhow::{Context as _, Result};
use eframe::egui;
use tokio::runtime::Handle;

use crate::media::{self, data_url};

type Delivered = (String, Result<egui::ColorImage, String>);

pub struct PreviewCache {
    name: &'static str,
    key: Option<String>,
    texture: Option<egui::TextureHandle>,
    error: Option<String>,
    /// Finished jobs, stale ones included; filtered by key on pickup.
    delivered: Arc<Mutex<Vec<Delivered>>>,
}

impl PreviewCache {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            key: None,
            texture: None,
            error: None,
            delivered: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Make the cache show `reference` (identified by `key`), or nothing.
    pub fn sync(
        &mut self,
        ctx: &egui::Context,
        runtime: &Handle,
        client: &reqwest::Client,
        key: &str,
        reference: Option<&str>,
    ) {
        let Some(reference) = reference else {
            self.key = None;
            self.texture = None;
            self.error = None;
            return;
        };

        if self.key.as_deref() != Some(key) {
            self.key = Some(key.to_string());
            self.texture = None;
            self.error = None;

            let reference = reference.to_string();
            if data_url::is_data_url(&reference) {
                self.deliver(ctx, runtime, key, async move {
                    tokio::task::spawn_blocking(move || {
                        decode_data_url(&reference).map_err(|e| format!("{e:#}"))
                    })
                    .await
                    .unwrap_or_else(|e| Err(e.to_string()))
                });
            } else {
                let client = client.clone();
                self.deliver(ctx, runtime, key, async move {
                    match media::fetch_bytes(&client, &reference).await {
                        Ok((bytes, _)) => decode_color_image(&bytes).map_err(|e| format!("{e:#}")),
                        Err(e) => Err(e.to_string()),
                    }
                });
            }
        }

        let arrived = std::mem::take(
            &mut *self.delivered.lock().unwrap_or_else(PoisonError::into_inner),
        );
        for (for_key, result) in arrived {
            if self.key.as_deref() == Some(for_key.as_str()) {
                self.apply(ctx, result);
            }
        }
    }

    pub fn texture(&self) -> Option<&egui::TextureHandle> {
        self.texture.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// A reference is set but neither a texture nor an error has arrived.
    pub fn is_loading(&self) -> bool {
        self.key.is_some() && self.texture.is_none() && self.error.is_none()
    }

    fn apply(&mut self, ctx: &egui::Context, result: Result<egui::ColorImage, String>) {
        match result {
            Ok(image) => {
                self.texture = Some(ctx.load_texture(self.name, image, egui::TextureOptions::LINEAR));
            }
            Err(e) => {
                log::warn!("preview: {}: {e}", self.name);
                self.error = Some(e);
            }
        }
    }

    /// Run `job` on the runtime and leave its image for the next frame.
    fn deliver<F>(&self, ctx: &egui::Context, runtime: &Handle, key: &str, job: F)
    where
        F: Future<Output = Result<egui::ColorImage, String>> + Send + 'static,
    {
        let ctx = ctx.clone();
        let key = key.to_string();
        let delivered = Arc::clone(&self.delivered);

        runtime.spawn(async move {
            let result = job.await;
            delivered
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push((key, result));
            ctx.request_repaint();
        });
    }
}

/// `data:` URL → egui image.
pub fn decode_data_url(url: &str) -> Result<egui::ColorImage> {
    let decoded = data_url::decode(url)?;
    decode_color_image(&decoded.bytes)
}

/// Encoded image bytes → egui image.
pub fn decode_color_image(bytes: &[u8]) -> Result<egui::ColorImage> {
    let rgba = image::load_from_memory(bytes)
        .context("unsupported or corrupt image")?
        .to_rgba8();
    let size = [rgba.width() as usize, rgba.height() as usize];
    Ok(egui::ColorImage::from_rgba_unmultiplied(size, rgba.as_raw()))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
