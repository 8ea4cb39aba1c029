//! Offscreen render targets.

/// Color format of every offscreen target (HDR, filterable, blendable)
pub const HDR_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba16Float;

pub const DEPTH_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Depth32Float;

/// Pixel size of a drawable area
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    /// `None` for zero-sized areas (minimized windows)
    pub fn new(width: u32, height: u32) -> Option<Self> {
        (width > 0 && height > 0).then_some(Self { width, height })
    }

    /// Half of this viewport, rounded, never below 1x1
    pub fn halved(self) -> Self {
        Self {
            width: ((self.width + 1) / 2).max(1),
            height: ((self.height + 1) / 2).max(1),
        }
    }

    pub fn inv_size(self) -> [f32; 2] {
        [1.0 / self.width as f32, 1.0 / self.height as f32]
    }

    fn extent(self) -> wgpu::Extent3d {
        wgpu::Extent3d {
            width: self.width,
            height: self.height,
            depth_or_array_layers: 1,
        }
    }
}

/// A texture that can be drawn into and sampled afterwards
pub struct RenderTarget {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub size: Viewport,
}

impl RenderTarget {
    pub fn new(device: &wgpu::Device, label: &str, size: Viewport) -> Self {
        Self::with_format(device, label, size, HDR_FORMAT)
    }

    pub fn depth(device: &wgpu::Device, size: Viewport) -> Self {
        Self::with_format(device, "depth_target", size, DEPTH_FORMAT)
    }

    fn with_format(
        device: &wgpu::Device,
        label: &str,
        size: Viewport,
        format: wgpu::TextureFormat,
    ) -> Self {
        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: size.extent(),
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format,
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT | wgpu::TextureUsages::TEXTURE_BINDING,
            view_formats: &[],
        });
        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        Self {
            texture,
            view,
            size,
        }
    }
}
