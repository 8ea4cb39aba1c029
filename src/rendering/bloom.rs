//! Mip-chain bloom.
//!
//! High pass on luminosity, five progressively halved separable gaussian
//! blurs, a weighted composite of all mips, then an additive blend of the
//! result back onto the source target.

use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

use super::post::{FullscreenPass, PassDesc, ADDITIVE};
use super::targets::{RenderTarget, Viewport, HDR_FORMAT};
use crate::params::BloomParameters;

pub const MIP_COUNT: usize = 5;

/// Gaussian kernel radius per mip (sigma equals the radius)
pub const KERNEL_RADII: [u32; MIP_COUNT] = [3, 5, 7, 9, 11];

/// Base weight per mip before the radius lerp
pub const BLOOM_FACTORS: [f32; MIP_COUNT] = [1.0, 0.8, 0.6, 0.4, 0.2];

pub const LUMINOSITY_THRESHOLD: f32 = 0.3;
pub const SMOOTH_WIDTH: f32 = 0.01;

/// Coefficient slots in the blur uniform block
const MAX_COEFFICIENTS: usize = 12;

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct HighPassUniforms {
    pub threshold: f32,
    pub smooth_width: f32,
    pub _padding: [f32; 2],
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct BlurUniforms {
    pub direction: [f32; 2],
    pub inv_size: [f32; 2],
    pub kernel_radius: u32,
    pub _padding: [u32; 3],
    pub coefficients: [[f32; 4]; 3],
}

impl BlurUniforms {
    pub fn new(direction: [f32; 2], size: Viewport, kernel_radius: u32) -> Self {
        let mut coefficients = [[0.0; 4]; 3];
        for (i, c) in gaussian_coefficients(kernel_radius)
            .into_iter()
            .take(MAX_COEFFICIENTS)
            .enumerate()
        {
            coefficients[i / 4][i % 4] = c;
        }

        Self {
            direction,
            inv_size: size.inv_size(),
            kernel_radius: kernel_radius.min(MAX_COEFFICIENTS as u32),
            _padding: [0; 3],
            coefficients,
        }
    }
}

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct CompositeUniforms {
    pub weights: [[f32; 4]; 2],
}

impl CompositeUniforms {
    pub fn new(params: &BloomParameters) -> Self {
        let w = mip_weights(params.strength, params.radius);
        Self {
            weights: [[w[0], w[1], w[2], w[3]], [w[4], 0.0, 0.0, 0.0]],
        }
    }
}

/// Normal distribution samples `0..kernel_radius`, sigma = `kernel_radius`
pub fn gaussian_coefficients(kernel_radius: u32) -> Vec<f32> {
    let sigma = kernel_radius as f32;
    (0..kernel_radius)
        .map(|i| {
            let x = i as f32;
            0.39894 * (-0.5 * x * x / (sigma * sigma)).exp() / sigma
        })
        .collect()
}

/// `mix(factor, 1.2 - factor, radius)`
pub fn lerp_bloom_factor(factor: f32, radius: f32) -> f32 {
    factor + (1.2 - factor - factor) * radius
}

/// Final composite weight of every mip
pub fn mip_weights(strength: f32, radius: f32) -> [f32; MIP_COUNT] {
    BLOOM_FACTORS.map(|factor| strength * lerp_bloom_factor(factor, radius))
}

/// Sizes of the blur mips: half, quarter, ... of `size`
pub fn mip_sizes(size: Viewport) -> [Viewport; MIP_COUNT] {
    let mut next = size;
    [(); MIP_COUNT].map(|_| {
        next = next.halved();
        next
    })
}

/// One blur level: horizontal then vertical gaussian at half the previous size
struct Mip {
    horizontal: RenderTarget,
    vertical: RenderTarget,
    /// Samples the previous level (or the high pass) into `horizontal`
    bind_x: wgpu::BindGroup,
    /// Samples `horizontal` into `vertical`
    bind_y: wgpu::BindGroup,
}

impl Mip {
    fn new(
        device: &wgpu::Device,
        blur: &FullscreenPass,
        input: &wgpu::TextureView,
        size: Viewport,
        kernel_radius: u32,
    ) -> Self {
        let uniforms = |label, direction| {
            device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(label),
                contents: bytemuck::bytes_of(&BlurUniforms::new(direction, size, kernel_radius)),
                usage: wgpu::BufferUsages::UNIFORM,
            })
        };

        let horizontal = RenderTarget::new(device, "bloom_mip_h", size);
        let vertical = RenderTarget::new(device, "bloom_mip_v", size);
        let bind_x = blur.bind(device, &[input], Some(&uniforms("bloom_blur_x", [1.0, 0.0])));
        let bind_y = blur.bind(
            device,
            &[&horizontal.view],
            Some(&uniforms("bloom_blur_y", [0.0, 1.0])),
        );

        Self {
            horizontal,
            vertical,
            bind_x,
            bind_y,
        }
    }
}

/// Size-dependent targets and the bind groups that read them
struct BloomTargets {
    bright: RenderTarget,
    mips: Vec<Mip>,
    high_pass_bind: wgpu::BindGroup,
    composite_bind: wgpu::BindGroup,
    /// Adds the composite (in the first horizontal target) onto the source
    additive_bind: Option<wgpu::BindGroup>,
}

/// Size-independent pipelines and uniforms
struct BloomPipelines {
    high_pass: FullscreenPass,
    blur: FullscreenPass,
    composite: FullscreenPass,
    additive: FullscreenPass,
    high_pass_uniforms: wgpu::Buffer,
    composite_uniforms: wgpu::Buffer,
}

impl BloomPipelines {
    fn new(device: &wgpu::Device) -> Self {
        let pass = |label, fragment, textures, uniform, blend| {
            FullscreenPass::new(
                device,
                &PassDesc {
                    label,
                    fragment,
                    textures,
                    uniform,
                    format: HDR_FORMAT,
                    blend,
                },
            )
        };

        let high_pass_uniforms = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("bloom_high_pass_uniforms"),
            contents: bytemuck::bytes_of(&HighPassUniforms {
                threshold: LUMINOSITY_THRESHOLD,
                smooth_width: SMOOTH_WIDTH,
                _padding: [0.0; 2],
            }),
            usage: wgpu::BufferUsages::UNIFORM,
        });

        let composite_uniforms = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("bloom_composite_uniforms"),
            contents: bytemuck::bytes_of(&CompositeUniforms::new(&BloomParameters::default())),
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        });

        Self {
            high_pass: pass(
                "bloom_high_pass",
                include_str!("shaders/high_pass.wgsl"),
                1,
                true,
                None,
            ),
            blur: pass("bloom_blur", include_str!("shaders/blur.wgsl"), 1, true, None),
            composite: pass(
                "bloom_composite",
                include_str!("shaders/bloom_composite.wgsl"),
                MIP_COUNT as u32,
                true,
                None,
            ),
            additive: pass(
                "bloom_additive",
                include_str!("shaders/copy.wgsl"),
                1,
                false,
                Some(ADDITIVE),
            ),
            high_pass_uniforms,
            composite_uniforms,
        }
    }

    /// Targets sized to `source`, with bind groups reading it
    fn targets(&self, device: &wgpu::Device, source: &RenderTarget) -> BloomTargets {
        let bright = RenderTarget::new(device, "bloom_bright", source.size);

        let mut mips: Vec<Mip> = Vec::with_capacity(MIP_COUNT);
        for (mip_size, radius) in mip_sizes(source.size).into_iter().zip(KERNEL_RADII) {
            let input = mips.last().map_or(&bright.view, |m| &m.vertical.view);
            let mip = Mip::new(device, &self.blur, input, mip_size, radius);
            mips.push(mip);
        }

        let blurred: Vec<&wgpu::TextureView> = mips.iter().map(|m| &m.vertical.view).collect();
        let composite_bind = self
            .composite
            .bind(device, &blurred, Some(&self.composite_uniforms));
        let additive_bind = mips
            .first()
            .map(|first| self.additive.bind(device, &[&first.horizontal.view], None));
        let high_pass_bind =
            self.high_pass
                .bind(device, &[&source.view], Some(&self.high_pass_uniforms));

        BloomTargets {
            bright,
            mips,
            high_pass_bind,
            composite_bind,
            additive_bind,
        }
    }
}

pub struct BloomPass {
    pipelines: BloomPipelines,
    targets: BloomTargets,
}

impl BloomPass {
    /// Bloom chain reading `source`, sized to match it
    pub fn new(device: &wgpu::Device, source: &RenderTarget) -> Self {
        let pipelines = BloomPipelines::new(device);
        let targets = pipelines.targets(device, source);
        Self { pipelines, targets }
    }

    /// Recreate every intermediate target and bind group for `source`
    pub fn resize(&mut self, device: &wgpu::Device, source: &RenderTarget) {
        self.targets = self.pipelines.targets(device, source);
    }

    /// Sizes of the high pass target, then each mip's horizontal and
    /// vertical target
    pub fn target_sizes(&self) -> Vec<Viewport> {
        std::iter::once(self.targets.bright.size)
            .chain(
                self.targets
                    .mips
                    .iter()
                    .flat_map(|m| [m.horizontal.size, m.vertical.size]),
            )
            .collect()
    }

    /// Bloom `target` in place: its contents plus their blurred highlights.
    ///
    /// `target` must be the source this pass was created or resized with.
    pub fn apply(
        &self,
        queue: &wgpu::Queue,
        encoder: &mut wgpu::CommandEncoder,
        params: &BloomParameters,
        target: &RenderTarget,
    ) {
        let pipes = &self.pipelines;
        let targets = &self.targets;
        queue.write_buffer(
            &pipes.composite_uniforms,
            0,
            bytemuck::bytes_of(&CompositeUniforms::new(params)),
        );

        pipes
            .high_pass
            .draw(encoder, &targets.bright.view, &targets.high_pass_bind, true);

        for mip in &targets.mips {
            pipes.blur.draw(encoder, &mip.horizontal.view, &mip.bind_x, true);
            pipes.blur.draw(encoder, &mip.vertical.view, &mip.bind_y, true);
        }

        // The first horizontal target is free again and holds the composite
        let (Some(first), Some(additive_bind)) = (targets.mips.first(), &targets.additive_bind)
        else {
            return;
        };
        pipes
            .composite
            .draw(encoder, &first.horizontal.view, &targets.composite_bind, true);
        pipes.additive.draw(encoder, &target.view, additive_bind, false);
    }
}
