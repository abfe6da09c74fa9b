/// A sampled 2D texture plus its view and a nearest-neighbour sampler.
/// Pixel art stays crisp when the playfield is stretched.
pub struct Texture {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
    pub size: (u32, u32),
}

impl Texture {
    /// Decodes an encoded image (PNG) and uploads it.
    pub fn from_bytes(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        bytes: &[u8],
        label: &str,
    ) -> Result<Self, String> {
        let img = image::load_from_memory(bytes)
            .map_err(|e| format!("Failed to decode texture '{label}': {e}"))?
            .to_rgba8();
        let (width, height) = img.dimensions();
        Ok(Self::from_rgba8(
            device,
            queue,
            img.as_raw(),
            width,
            height,
            label,
        ))
    }

    /// Uploads tightly packed RGBA8 pixels.
    pub fn from_rgba8(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        rgba: &[u8],
        width: u32,
        height: u32,
        label: &str,
    ) -> Self {
        let size = wgpu::Extent3d {
            width: width.max(1),
            height: height.max(1),
            depth_or_array_layers: 1,
        };
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            rgba,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * size.width),
                rows_per_image: Some(size.height),
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some(label),
            address_mode_u: wgpu::AddressMode::ClampToEdge,
            address_mode_v: wgpu::AddressMode::ClampToEdge,
            address_mode_w: wgpu::AddressMode::ClampToEdge,
            mag_filter: wgpu::FilterMode::Nearest,
            min_filter: wgpu::FilterMode::Nearest,
            mipmap_filter: wgpu::FilterMode::Nearest,
            ..Default::default()
        });

        Self {
            texture,
            view,
            sampler,
            size: (size.width, size.height),
        }
    }

    /// Two-by-two magenta/black checker for textures that failed to load.
    pub fn placeholder(device: &wgpu::Device, queue: &wgpu::Queue, label: &str) -> Self {
        const MAGENTA: [u8; 4] = [255, 0, 255, 255];
        const BLACK: [u8; 4] = [0, 0, 0, 255];
        let pixels = [MAGENTA, BLACK, BLACK, MAGENTA].concat();
        Self::from_rgba8(device, queue, &pixels, 2, 2, label)
    }

    pub fn byte_size(&self) -> usize {
        self.size.0 as usize * self.size.1 as usize * 4
    }
}
