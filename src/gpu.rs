//! GPU-accelerated batch driver.
//!
//! Dispatches uniform batches of n to a `wgpu` compute shader running the
//! same solver semantics as the CPU, then mandatorily re-verifies every
//! device-reported "no solution" on the CPU before it is believed: the
//! device is never trusted on its own for a counterexample claim.

use anyhow::{bail, Context, Result};
use bytemuck::{Pod, Zeroable};

use crate::solver::find_solution;

const THREADS_PER_GROUP: u32 = 256;

/// Mirrors the original host/device result record: one outcome per n.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct GpuSearchResult {
    pub n: u64,
    pub a: u64,
    pub p: u64,
    pub found: u32,
    pub _pad: u32,
}

#[derive(Debug, Clone, Default)]
pub struct GpuStats {
    pub total_n_processed: u64,
    pub total_counterexamples_verified: u64,
    pub total_gpu_false_negatives: u64,
    pub total_gpu_time: std::time::Duration,
    pub total_batches: u64,
}

/// The WGSL compute shader implementing the per-n solver on the device.
/// 64-bit values are carried as `vec2<u32>` (lo, hi); the widening multiply
/// mirrors the host's `u128`-based Montgomery arithmetic bit-for-bit so that
/// any divergence is a genuine correctness bug, not a representation
/// difference.
const SHADER_SOURCE: &str = include_str!("gpu_solver.wgsl");

/// Driver lifecycle. The device/pipeline live only in `Ready`; a submission
/// in flight is represented by a distinct state so a caller cannot issue a
/// second dispatch before the first completes, and cannot touch device
/// resources after `Shutdown`.
enum State {
    Uninitialized,
    Ready {
        device: wgpu::Device,
        queue: wgpu::Queue,
        pipeline: wgpu::ComputePipeline,
        bind_group_layout: wgpu::BindGroupLayout,
        witness_buf: wgpu::Buffer,
    },
    Shutdown,
}

pub struct GpuDriver {
    state: State,
    max_batch_size: usize,
    stats: GpuStats,
}

impl GpuDriver {
    pub fn new() -> Self {
        GpuDriver { state: State::Uninitialized, max_batch_size: 65_536, stats: GpuStats::default() }
    }

    pub fn is_available() -> bool {
        pollster::block_on(Self::try_request_adapter()).is_some()
    }

    async fn try_request_adapter() -> Option<wgpu::Adapter> {
        let instance = wgpu::Instance::default();
        instance
            .request_adapter(&wgpu::RequestAdapterOptions::default())
            .await
    }

    /// Initialize the device, compile the compute pipeline, and transition
    /// `Uninitialized -> Ready`.
    pub fn init(&mut self) -> Result<()> {
        if !matches!(self.state, State::Uninitialized) {
            bail!("GPU driver already initialized");
        }

        let (device, queue) = pollster::block_on(Self::request_device())
            .context("failed to acquire a GPU device")?;

        let shader = device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some("eightn3-solver"),
            source: wgpu::ShaderSource::Wgsl(SHADER_SOURCE.into()),
        });

        let bind_group_layout = device.create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("eightn3-bind-group-layout"),
            entries: &[
                wgpu::BindGroupLayoutEntry {
                    binding: 0,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: true },
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 1,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: false },
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
                wgpu::BindGroupLayoutEntry {
                    binding: 2,
                    visibility: wgpu::ShaderStages::COMPUTE,
                    ty: wgpu::BindingType::Buffer {
                        ty: wgpu::BufferBindingType::Storage { read_only: true },
                        has_dynamic_offset: false,
                        min_binding_size: None,
                    },
                    count: None,
                },
            ],
        });

        let witness_table_u32: Vec<u32> =
            crate::witness_table::WITNESS_TABLE.iter().map(|&w| w as u32).collect();
        let witness_buf = create_buffer_init(
            &device,
            bytemuck::cast_slice(&witness_table_u32),
            wgpu::BufferUsages::STORAGE,
        );

        let pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("eightn3-pipeline-layout"),
            bind_group_layouts: &[&bind_group_layout],
            push_constant_ranges: &[],
        });

        let pipeline = device.create_compute_pipeline(&wgpu::ComputePipelineDescriptor {
            label: Some("eightn3-solver-pipeline"),
            layout: Some(&pipeline_layout),
            module: &shader,
            entry_point: "solve_batch",
            compilation_options: Default::default(),
            cache: None,
        });

        self.state = State::Ready { device, queue, pipeline, bind_group_layout, witness_buf };
        Ok(())
    }

    async fn request_device() -> Option<(wgpu::Device, wgpu::Queue)> {
        let instance = wgpu::Instance::default();
        let adapter = instance.request_adapter(&wgpu::RequestAdapterOptions::default()).await?;
        adapter
            .request_device(&wgpu::DeviceDescriptor::default(), None)
            .await
            .ok()
    }

    pub fn recommended_batch_size(&self) -> usize {
        self.max_batch_size
    }

    pub fn stats(&self) -> &GpuStats {
        &self.stats
    }

    /// Dispatch one batch of n values, returning one result per input.
    ///
    /// This only performs the device round trip; CPU cross-verification of
    /// "no solution" results is the caller's responsibility via
    /// [`verify_and_correct`], matching the mandatory re-check described in
    /// the module docs.
    pub fn search_batch(&mut self, n_values: &[u64]) -> Result<Vec<GpuSearchResult>> {
        let (device, queue, pipeline, bind_group_layout, witness_buf) = match &self.state {
            State::Ready { device, queue, pipeline, bind_group_layout, witness_buf } => {
                (device, queue, pipeline, bind_group_layout, witness_buf)
            }
            State::Uninitialized => bail!("GPU driver not initialized"),
            State::Shutdown => bail!("GPU driver already shut down"),
        };

        let start = std::time::Instant::now();

        let input_buf = create_buffer_init(
            device,
            bytemuck::cast_slice(n_values),
            wgpu::BufferUsages::STORAGE,
        );

        let result_size = (n_values.len() * std::mem::size_of::<GpuSearchResult>()) as u64;
        let output_buf = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("eightn3-output"),
            size: result_size,
            usage: wgpu::BufferUsages::STORAGE | wgpu::BufferUsages::COPY_SRC,
            mapped_at_creation: false,
        });
        let readback_buf = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("eightn3-readback"),
            size: result_size,
            usage: wgpu::BufferUsages::MAP_READ | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let bind_group = device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("eightn3-bind-group"),
            layout: bind_group_layout,
            entries: &[
                wgpu::BindGroupEntry { binding: 0, resource: input_buf.as_entire_binding() },
                wgpu::BindGroupEntry { binding: 1, resource: output_buf.as_entire_binding() },
                wgpu::BindGroupEntry { binding: 2, resource: witness_buf.as_entire_binding() },
            ],
        });

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("eightn3-encoder"),
        });
        {
            let mut pass = encoder.begin_compute_pass(&wgpu::ComputePassDescriptor {
                label: Some("eightn3-pass"),
                timestamp_writes: None,
            });
            pass.set_pipeline(pipeline);
            pass.set_bind_group(0, &bind_group, &[]);
            let groups = (n_values.len() as u32).div_ceil(THREADS_PER_GROUP).max(1);
            pass.dispatch_workgroups(groups, 1, 1);
        }
        encoder.copy_buffer_to_buffer(&output_buf, 0, &readback_buf, 0, result_size);
        queue.submit(Some(encoder.finish()));

        let slice = readback_buf.slice(..);
        let (tx, rx) = std::sync::mpsc::channel();
        slice.map_async(wgpu::MapMode::Read, move |res| {
            let _ = tx.send(res);
        });
        device.poll(wgpu::Maintain::Wait);
        rx.recv().context("GPU readback channel closed")?.context("failed to map readback buffer")?;

        let data = slice.get_mapped_range();
        let results: Vec<GpuSearchResult> = bytemuck::cast_slice(&data).to_vec();
        drop(data);
        readback_buf.unmap();

        self.stats.total_n_processed += n_values.len() as u64;
        self.stats.total_batches += 1;
        self.stats.total_gpu_time += start.elapsed();

        Ok(results)
    }

    /// Re-verify every device result reporting "no solution" against the
    /// CPU solver. A genuine counterexample is returned as such; a false
    /// negative is corrected in place and counted.
    pub fn verify_and_correct(&mut self, results: &mut [GpuSearchResult]) -> Vec<u64> {
        let mut genuine_counterexamples = Vec::new();
        for result in results.iter_mut() {
            if result.found != 0 {
                continue;
            }
            match find_solution(result.n, None) {
                Some(sol) => {
                    tracing::warn!(n = result.n, a = sol.a, p = sol.p, "GPU false negative corrected by CPU");
                    self.stats.total_gpu_false_negatives += 1;
                    result.a = sol.a;
                    result.p = sol.p;
                    result.found = 1;
                }
                None => {
                    self.stats.total_counterexamples_verified += 1;
                    genuine_counterexamples.push(result.n);
                }
            }
        }
        genuine_counterexamples
    }

    pub fn shutdown(&mut self) {
        self.state = State::Shutdown;
    }
}

impl Default for GpuDriver {
    fn default() -> Self {
        Self::new()
    }
}

fn create_buffer_init(device: &wgpu::Device, contents: &[u8], usage: wgpu::BufferUsages) -> wgpu::Buffer {
    use wgpu::util::DeviceExt;
    device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("eightn3-input"),
        contents,
        usage,
    })
}
