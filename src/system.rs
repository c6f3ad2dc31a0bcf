//! Host metrics for the status snapshot
//!
//! CPU and memory come from `sysinfo`; GPU figures come from `nvidia-smi`.
//! A host without an NVIDIA GPU (or without the tool) reports
//! `gpu.available = false` instead of failing.

use crate::core_types::{CpuMetrics, GpuMetrics, MemoryMetrics, SystemMetrics};
use crate::logging::log_debug;
use std::sync::Mutex;
use std::time::Duration;
use sysinfo::System;
use tokio::process::Command;

const BYTES_PER_GB: f64 = 1024.0 * 1024.0 * 1024.0;
const MB_PER_GB: f64 = 1024.0;
const GPU_QUERY_TIMEOUT: Duration = Duration::from_secs(2);
const GPU_QUERY_FIELDS: &str =
    "name,utilization.gpu,memory.used,memory.total,temperature.gpu,power.draw";

/// Samples host metrics on demand
pub struct SystemMonitor {
    system: Mutex<System>,
}

impl Default for SystemMonitor {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemMonitor {
    pub fn new() -> Self {
        let mut system = System::new();
        // CPU usage is a delta; prime it so the first sample is meaningful.
        system.refresh_cpu_usage();
        system.refresh_memory();
        Self {
            system: Mutex::new(system),
        }
    }

    /// Full metrics including the first GPU
    pub async fn metrics(&self) -> SystemMetrics {
        let mut metrics = self.host_metrics();
        metrics.gpu = self.gpu().await;
        metrics
    }

    /// CPU, memory, uptime, hostname
    pub fn host_metrics(&self) -> SystemMetrics {
        let (cpu, memory) = match self.system.lock() {
            Ok(mut system) => {
                system.refresh_cpu_usage();
                system.refresh_memory();
                (cpu_metrics(&system), memory_metrics(&system))
            }
            Err(_) => (CpuMetrics::default(), MemoryMetrics::default()),
        };

        SystemMetrics {
            cpu,
            memory,
            gpu: GpuMetrics::unavailable(),
            uptime_seconds: System::uptime(),
            hostname: System::host_name(),
        }
    }

    /// First GPU `nvidia-smi` reports, or `available: false`
    pub async fn gpu(&self) -> GpuMetrics {
        query_gpus().await.into_iter().next().unwrap_or_default()
    }
}

fn cpu_metrics(system: &System) -> CpuMetrics {
    let cpus = system.cpus();
    CpuMetrics {
        name: cpus
            .first()
            .map(|c| c.brand().trim().to_string())
            .filter(|b| !b.is_empty()),
        cores: cpus.len(),
        utilization: round1(system.global_cpu_info().cpu_usage() as f64) as f32,
    }
}

fn memory_metrics(system: &System) -> MemoryMetrics {
    let total = system.total_memory() as f64;
    let used = system.used_memory() as f64;
    MemoryMetrics {
        total_gb: round1(total / BYTES_PER_GB),
        used_gb: round1(used / BYTES_PER_GB),
        percent_used: if total > 0.0 {
            round1(used / total * 100.0)
        } else {
            0.0
        },
    }
}

async fn query_gpus() -> Vec<GpuMetrics> {
    let output = Command::new("nvidia-smi")
        .arg(format!("--query-gpu={GPU_QUERY_FIELDS}"))
        .arg("--format=csv,noheader,nounits")
        .kill_on_drop(true)
        .output();

    match tokio::time::timeout(GPU_QUERY_TIMEOUT, output).await {
        Ok(Ok(output)) if output.status.success() => {
            parse_nvidia_smi(&String::from_utf8_lossy(&output.stdout))
        }
        Ok(Ok(output)) => {
            log_debug!(status = %output.status, "nvidia-smi exited unsuccessfully");
            Vec::new()
        }
        Ok(Err(e)) => {
            log_debug!(error = %e, "nvidia-smi not available");
            Vec::new()
        }
        Err(_) => {
            log_debug!("nvidia-smi timed out");
            Vec::new()
        }
    }
}

/// Parse `nvidia-smi --format=csv,noheader,nounits` output, one GPU per line
pub fn parse_nvidia_smi(output: &str) -> Vec<GpuMetrics> {
    output
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| {
            let fields: Vec<&str> = line.split(',').map(str::trim).collect();
            if fields.len() < 4 {
                return None;
            }
            let number = |idx: usize| fields.get(idx).and_then(|v| v.parse::<f64>().ok());

            let used_mb = number(2);
            let total_mb = number(3);
            let memory_percent = match (used_mb, total_mb) {
                (Some(used), Some(total)) if total > 0.0 => Some(round1(used / total * 100.0)),
                _ => None,
            };

            Some(GpuMetrics {
                available: true,
                name: Some(fields[0].to_string()),
                utilization: number(1),
                memory_used_gb: used_mb.map(|mb| round1(mb / MB_PER_GB)),
                memory_total_gb: total_mb.map(|mb| round1(mb / MB_PER_GB)),
                memory_percent,
                temperature: number(4),
                power_draw: number(5),
            })
        })
        .collect()
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
