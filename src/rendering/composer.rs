//! The two composers of a frame.
//!
//! The bloom composer renders the isolated glowing cubes and blooms them.
//! The final composer renders the untouched scene, adds the bloom texture on
//! top and tone maps the result onto the surface.

use bytemuck::{Pod, Zeroable};

use super::bloom::BloomPass;
use super::cubes::CubePass;
use super::post::{FullscreenPass, PassDesc};
use super::targets::{RenderTarget, Viewport, HDR_FORMAT};
use crate::grid::Grid;
use crate::params::BloomParameters;

#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
pub struct OutputUniforms {
    pub exposure: f32,
    pub encode_srgb: u32,
    pub _padding: [u32; 2],
}

/// Everything a composer needs to draw the grid
pub struct SceneContext<'a> {
    pub device: &'a wgpu::Device,
    pub queue: &'a wgpu::Queue,
    pub cubes: &'a mut CubePass,
    pub depth: &'a RenderTarget,
    pub grid: &'a Grid,
    pub params: &'a BloomParameters,
}

pub struct BloomComposer {
    isolate: RenderTarget,
    bloom: BloomPass,
}

impl BloomComposer {
    pub fn new(device: &wgpu::Device, size: Viewport) -> Self {
        let isolate = RenderTarget::new(device, "bloom_isolate", size);
        let bloom = BloomPass::new(device, &isolate);
        Self { isolate, bloom }
    }

    pub fn resize(&mut self, device: &wgpu::Device, size: Viewport) {
        self.isolate = RenderTarget::new(device, "bloom_isolate", size);
        self.bloom.resize(device, &self.isolate);
    }

    /// Isolated render plus its bloom
    pub fn output(&self) -> &RenderTarget {
        &self.isolate
    }

    pub fn render(&self, ctx: SceneContext, encoder: &mut wgpu::CommandEncoder) {
        ctx.cubes.draw(
            ctx.device,
            ctx.queue,
            encoder,
            ctx.grid,
            &self.isolate,
            ctx.depth,
        );
        self.bloom.apply(ctx.queue, encoder, ctx.params, &self.isolate);
    }
}

pub struct FinalComposer {
    scene: RenderTarget,
    mixed: RenderTarget,
    mix: FullscreenPass,
    output: FullscreenPass,
    output_uniforms: wgpu::Buffer,
    mix_bind: wgpu::BindGroup,
    output_bind: wgpu::BindGroup,
    encode_srgb: bool,
}

impl FinalComposer {
    /// `surface_format` is the presentation format; non-sRGB surfaces get
    /// the sRGB transfer applied in the output pass. `bloom` is the bloom
    /// composer's output, mixed over the scene.
    pub fn new(
        device: &wgpu::Device,
        size: Viewport,
        surface_format: wgpu::TextureFormat,
        bloom: &RenderTarget,
    ) -> Self {
        let mix = FullscreenPass::new(
            device,
            &PassDesc {
                label: "final_mix",
                fragment: include_str!("shaders/mix.wgsl"),
                textures: 2,
                uniform: false,
                format: HDR_FORMAT,
                blend: None,
            },
        );

        let output = FullscreenPass::new(
            device,
            &PassDesc {
                label: "final_output",
                fragment: include_str!("shaders/output.wgsl"),
                textures: 1,
                uniform: true,
                format: surface_format,
                blend: None,
            },
        );

        let output_uniforms = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("final_output_uniforms"),
            size: std::mem::size_of::<OutputUniforms>() as u64,
            usage: wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let scene = RenderTarget::new(device, "final_scene", size);
        let mixed = RenderTarget::new(device, "final_mixed", size);
        let mix_bind = mix.bind(device, &[&scene.view, &bloom.view], None);
        let output_bind = output.bind(device, &[&mixed.view], Some(&output_uniforms));

        Self {
            scene,
            mixed,
            mix,
            output,
            output_uniforms,
            mix_bind,
            output_bind,
            encode_srgb: !surface_format.is_srgb(),
        }
    }

    /// Recreate the scene and mix targets; `bloom` must already be resized
    pub fn resize(&mut self, device: &wgpu::Device, size: Viewport, bloom: &RenderTarget) {
        self.scene = RenderTarget::new(device, "final_scene", size);
        self.mixed = RenderTarget::new(device, "final_mixed", size);
        self.mix_bind = self
            .mix
            .bind(device, &[&self.scene.view, &bloom.view], None);
        self.output_bind =
            self.output
                .bind(device, &[&self.mixed.view], Some(&self.output_uniforms));
    }

    /// Scene + bloom, tone mapped into `surface`
    pub fn render(
        &self,
        ctx: SceneContext,
        encoder: &mut wgpu::CommandEncoder,
        surface: &wgpu::TextureView,
    ) {
        ctx.queue.write_buffer(
            &self.output_uniforms,
            0,
            bytemuck::bytes_of(&OutputUniforms {
                exposure: ctx.params.tone_mapping_exposure(),
                encode_srgb: u32::from(self.encode_srgb),
                _padding: [0; 2],
            }),
        );

        ctx.cubes.draw(
            ctx.device,
            ctx.queue,
            encoder,
            ctx.grid,
            &self.scene,
            ctx.depth,
        );

        self.mix.draw(encoder, &self.mixed.view, &self.mix_bind, true);
        self.output.draw(encoder, surface, &self.output_bind, true);
    }
}

/// Every target that follows the window size: the shared depth buffer and
/// both composers
pub struct FrameTargets {
    pub depth: RenderTarget,
    pub bloom_composer: BloomComposer,
    pub final_composer: FinalComposer,
}

impl FrameTargets {
    pub fn new(device: &wgpu::Device, size: Viewport, surface_format: wgpu::TextureFormat) -> Self {
        let bloom_composer = BloomComposer::new(device, size);
        let final_composer =
            FinalComposer::new(device, size, surface_format, bloom_composer.output());

        Self {
            depth: RenderTarget::depth(device, size),
            bloom_composer,
            final_composer,
        }
    }

    pub fn resize(&mut self, device: &wgpu::Device, size: Viewport) {
        self.depth = RenderTarget::depth(device, size);
        self.bloom_composer.resize(device, size);
        self.final_composer
            .resize(device, size, self.bloom_composer.output());
    }
}
