//! The image value and the renderer seam.
//!
//! The engine never touches pixels itself; renderers are opaque handles
//! registered by the embedding application. Capability lives as data on the
//! handle (`arity`), and dispatch happens through the single `render` call,
//! whatever the handle is: a user renderer or a compiled composite.

use crate::error::RenderError;
use crate::plan::TransformPlan;
use std::fmt;

/// An owned RGBA8 pixel buffer. The value flowing through plan slots.
#[derive(Clone, PartialEq, Eq)]
pub struct Image {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Image {
    /// A transparent-black image of the given dimensions.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width as usize * height as usize * 4],
        }
    }

    /// An image with every pixel set to the given RGBA value.
    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let mut pixels = Vec::with_capacity(width as usize * height as usize * 4);
        for _ in 0..(width as usize * height as usize) {
            pixels.extend_from_slice(&rgba);
        }
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Wraps an existing buffer; the length must match the dimensions.
    pub fn from_pixels(width: u32, height: u32, pixels: Vec<u8>) -> Result<Self, RenderError> {
        let expected = width as usize * height as usize * 4;
        if pixels.len() != expected {
            return Err(RenderError::PixelCount {
                expected,
                found: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut [u8] {
        &mut self.pixels
    }
}

impl fmt::Debug for Image {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Image({}x{}, {} bytes)",
            self.width,
            self.height,
            self.pixels.len()
        )
    }
}

/// The contract every image producer fulfils.
pub trait Renderer: Send + Sync {
    /// How many source images `render` expects, or `None` for variadic
    /// renderers. Checked against the node's input ports at compile time.
    fn arity(&self) -> Option<usize> {
        None
    }

    /// Produces an image from the given sources.
    fn render(&self, sources: &[&Image]) -> Result<Image, RenderError>;
}

/// A renderer backed by a compiled transform plan. This is what a collapsed
/// node lowers to: rendering it executes the inner plan against the images
/// arriving on its exposed inputs.
pub struct CompositeRenderer {
    plan: TransformPlan,
}

impl CompositeRenderer {
    pub fn new(plan: TransformPlan) -> Self {
        Self { plan }
    }

    pub fn plan(&self) -> &TransformPlan {
        &self.plan
    }
}

impl Renderer for CompositeRenderer {
    fn arity(&self) -> Option<usize> {
        Some(self.plan.source_count())
    }

    fn render(&self, sources: &[&Image]) -> Result<Image, RenderError> {
        self.plan.execute_refs(sources)
    }
}
