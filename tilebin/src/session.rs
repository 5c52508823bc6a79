// Copyright 2024 the Tilebin Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use wgpu::{Device, Queue};

use crate::wait::{Submission, WaitPolicy};
use crate::{Error, Result};

/// Options for creating a [`Session`].
#[derive(Clone, Copy, Debug)]
pub struct SessionOptions {
    /// Backends to consider when selecting an adapter.
    ///
    /// Defaults to the `WGPU_BACKEND` environment variable, or all primary
    /// backends.
    pub backends: wgpu::Backends,
    /// Policy for waiting on queue submissions.
    pub submission_wait: WaitPolicy,
    /// Policy for waiting on buffer mapping.
    pub mapping_wait: WaitPolicy,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            backends: wgpu::util::backend_bits_from_env().unwrap_or_default(),
            submission_wait: WaitPolicy::SUBMISSION,
            mapping_wait: WaitPolicy::MAPPING,
        }
    }
}

/// Category of an asynchronous device error.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FaultKind {
    Validation,
    OutOfMemory,
    DeviceLost,
    Internal,
}

/// An error the device reported outside of any call that could return it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeviceFault {
    pub kind: FaultKind,
    pub message: String,
}

impl fmt::Display for DeviceFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            FaultKind::Validation => "Validation",
            FaultKind::OutOfMemory => "Out of memory",
            FaultKind::DeviceLost => "Device lost",
            FaultKind::Internal => "Internal",
        };
        write!(f, "Device error ({kind}): {}", self.message)
    }
}

impl std::error::Error for DeviceFault {}

impl From<&wgpu::Error> for DeviceFault {
    fn from(error: &wgpu::Error) -> Self {
        #[allow(unreachable_patterns)]
        let kind = match error {
            wgpu::Error::Validation { .. } => FaultKind::Validation,
            wgpu::Error::OutOfMemory { .. } => FaultKind::OutOfMemory,
            _ => FaultKind::Internal,
        };
        Self {
            kind,
            message: error.to_string(),
        }
    }
}

impl DeviceFault {
    /// The fault for a lost device, or `None` when the loss is part of an
    /// ordinary teardown.
    fn from_device_lost(reason: wgpu::DeviceLostReason, message: &str) -> Option<Self> {
        match reason {
            wgpu::DeviceLostReason::Destroyed
            | wgpu::DeviceLostReason::Dropped
            | wgpu::DeviceLostReason::ReplacedCallback => None,
            _ => Some(Self {
                kind: FaultKind::DeviceLost,
                message: format!("{reason:?}: {message}"),
            }),
        }
    }
}

/// Faults recorded by device callbacks, shared with those callbacks.
#[derive(Clone, Default)]
struct FaultLog(Arc<Mutex<Vec<DeviceFault>>>);

impl FaultLog {
    fn record(&self, fault: DeviceFault) {
        log::error!("{fault}");
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(fault);
    }

    fn take(&self) -> Vec<DeviceFault> {
        std::mem::take(&mut *self.0.lock().unwrap_or_else(PoisonError::into_inner))
    }
}

/// The device, its queue, and the faults the device has reported.
///
/// All binning operations borrow a session; there is no global state.
pub struct Session {
    pub device: Device,
    pub queue: Queue,
    adapter_info: Option<wgpu::AdapterInfo>,
    options: SessionOptions,
    faults: FaultLog,
}

impl Session {
    /// Selects an adapter with compute support and creates a device on it.
    ///
    /// Fails with [`Error::NoCompatibleDevice`] when there is none.
    pub async fn new(options: SessionOptions) -> Result<Self> {
        let instance = wgpu::Instance::new(wgpu::InstanceDescriptor {
            backends: options.backends,
            ..Default::default()
        });
        let adapter = wgpu::util::initialize_adapter_from_env_or_default(&instance, None)
            .await
            .ok_or(Error::NoCompatibleDevice)?;
        let info = adapter.get_info();
        if !adapter
            .get_downlevel_capabilities()
            .flags
            .contains(wgpu::DownlevelFlags::COMPUTE_SHADERS)
        {
            log::warn!("Adapter {} has no compute shader support", info.name);
            return Err(Error::NoCompatibleDevice);
        }
        log::info!("Using adapter {} ({:?})", info.name, info.backend);
        let (device, queue) = adapter
            .request_device(
                &wgpu::DeviceDescriptor {
                    label: Some("tilebin"),
                    required_features: wgpu::Features::empty(),
                    required_limits: wgpu::Limits::default(),
                    memory_hints: wgpu::MemoryHints::default(),
                },
                None,
            )
            .await?;
        let mut session = Self::from_device(device, queue, options);
        session.adapter_info = Some(info);
        Ok(session)
    }

    /// Wraps a device created elsewhere.
    ///
    /// This replaces the device's uncaptured error handler and device lost
    /// callback so that faults are recorded in this session.
    pub fn from_device(device: Device, queue: Queue, options: SessionOptions) -> Self {
        let faults = FaultLog::default();
        let sink = faults.clone();
        device.on_uncaptured_error(Box::new(move |error: wgpu::Error| {
            sink.record(DeviceFault::from(&error));
        }));
        let sink = faults.clone();
        device.set_device_lost_callback(move |reason, message| {
            match DeviceFault::from_device_lost(reason, &message) {
                Some(fault) => sink.record(fault),
                None => log::debug!("Device released ({reason:?})"),
            }
        });
        Self {
            device,
            queue,
            adapter_info: None,
            options,
            faults,
        }
    }

    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    /// Information on the adapter, when the session selected it.
    pub fn adapter_info(&self) -> Option<&wgpu::AdapterInfo> {
        self.adapter_info.as_ref()
    }

    /// Submits a command buffer and returns a handle to wait on it.
    pub fn submit(&self, command_buffer: wgpu::CommandBuffer) -> Submission {
        self.queue.submit(Some(command_buffer));
        Submission::new(&self.queue)
    }

    /// Returns the first fault recorded since the last check, if any.
    ///
    /// Recorded faults are cleared.
    pub fn check_faults(&self) -> Result<()> {
        match self.take_faults().into_iter().next() {
            Some(fault) => Err(Error::DeviceFault(fault)),
            None => Ok(()),
        }
    }

    /// Drains every recorded fault.
    pub fn take_faults(&self) -> Vec<DeviceFault> {
        self.faults.take()
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("adapter_info", &self.adapter_info)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fault_display() {
        let fault = DeviceFault {
            kind: FaultKind::OutOfMemory,
            message: "bin table".into(),
        };
        assert_eq!(fault.to_string(), "Device error (Out of memory): bin table");
    }

    #[test]
    fn default_policies() {
        let options = SessionOptions::default();
        assert_eq!(options.submission_wait, WaitPolicy::SUBMISSION);
        assert_eq!(options.mapping_wait, WaitPolicy::MAPPING);
    }

    #[test]
    fn teardown_is_not_a_fault() {
        for reason in [
            wgpu::DeviceLostReason::Destroyed,
            wgpu::DeviceLostReason::Dropped,
            wgpu::DeviceLostReason::ReplacedCallback,
        ] {
            assert_eq!(DeviceFault::from_device_lost(reason, "gone"), None);
        }
        let fault = DeviceFault::from_device_lost(wgpu::DeviceLostReason::Unknown, "reset")
            .expect("unexpected loss is a fault");
        assert_eq!(fault.kind, FaultKind::DeviceLost);
        assert_eq!(fault.message, "Unknown: reset");
        assert!(DeviceFault::from_device_lost(wgpu::DeviceLostReason::DeviceInvalid, "").is_some());
    }

    #[test]
    fn faults_are_drained() {
        let faults = FaultLog::default();
        let callback_side = faults.clone();
        callback_side.record(DeviceFault {
            kind: FaultKind::Validation,
            message: "first".into(),
        });
        callback_side.record(DeviceFault {
            kind: FaultKind::DeviceLost,
            message: "second".into(),
        });
        let taken = faults.take();
        assert_eq!(taken.len(), 2);
        assert_eq!(taken[0].kind, FaultKind::Validation);
        assert!(faults.take().is_empty());
    }
}
