use std::sync::Arc;

use vulkano::command_buffer::{AutoCommandBufferBuilder, PrimaryAutoCommandBuffer};
use vulkano::device::Device;
use vulkano::format::Format;
use vulkano::image::{view::ImageView, ImageDimensions, ImmutableImage, MipmapsCount};
use vulkano::memory::allocator::StandardMemoryAllocator;
use vulkano::sampler::{Filter, Sampler, SamplerAddressMode, SamplerCreateInfo};

/// Texture slots referenced by the scene tables.
pub const CHECKER: usize = 0;
pub const POSTER: usize = 1;
pub const PAINT: usize = 2;
pub const BRICKS: usize = 3;

const TEXTURE_FILES: [&str; 4] = [
    "resources/textures/checker.jpg",
    "resources/textures/poster.jpg",
    "resources/textures/paint.jpg",
    "resources/textures/bricks.jpg",
];

/// All textures the scenes can bind, uploaded once at startup. A slot
/// whose file cannot be decoded keeps a single-pixel placeholder, so the
/// draw sequence runs unchanged with a flat-grey surface.
pub struct TextureLibrary {
    views: Vec<Arc<ImageView<ImmutableImage>>>,
    sampler: Arc<Sampler>,
}

impl TextureLibrary {
    pub fn load(
        device: Arc<Device>,
        allocator: &StandardMemoryAllocator,
        uploads: &mut AutoCommandBufferBuilder<PrimaryAutoCommandBuffer>,
    ) -> TextureLibrary {
        let sampler = Sampler::new(
            device,
            SamplerCreateInfo {
                mag_filter: Filter::Linear,
                min_filter: Filter::Linear,
                address_mode: [SamplerAddressMode::Repeat; 3],
                ..Default::default()
            },
        )
        .expect("Failed to create the texture sampler");

        let views = TEXTURE_FILES
            .iter()
            .map(|path| load_slot(path, allocator, uploads))
            .collect();

        TextureLibrary { views, sampler }
    }

    pub fn view(&self, slot: usize) -> Arc<ImageView<ImmutableImage>> {
        self.views[slot].clone()
    }

    pub fn sampler(&self) -> Arc<Sampler> {
        self.sampler.clone()
    }
}

fn load_slot(
    path: &str,
    allocator: &StandardMemoryAllocator,
    uploads: &mut AutoCommandBufferBuilder<PrimaryAutoCommandBuffer>,
) -> Arc<ImageView<ImmutableImage>> {
    let (pixels, width, height) = match image::open(path) {
        Ok(decoded) => {
            let rgba = decoded.to_rgba8();
            let (width, height) = rgba.dimensions();
            (rgba.into_raw(), width, height)
        }
        Err(error) => {
            log::error!("failed to load texture {path}: {error}");
            (vec![128u8, 128, 128, 255], 1, 1)
        }
    };

    let image = ImmutableImage::from_iter(
        allocator,
        pixels,
        ImageDimensions::Dim2d {
            width,
            height,
            array_layers: 1,
        },
        MipmapsCount::One,
        Format::R8G8B8A8_SRGB,
        uploads,
    )
    .expect("Failed to upload texture data");

    ImageView::new_default(image).expect("Failed to create a texture view")
}
