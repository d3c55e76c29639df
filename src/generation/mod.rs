//! Remote image-generation service.

pub mod client;

pub use client::{
    ApiImageGenerator, GenerationError, GenerationRequest, GenerationResponse, ImageGenerator,
    ImageInput, ModelOptions,
};
