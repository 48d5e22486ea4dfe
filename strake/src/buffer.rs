// Copyright 2025 the Strake Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Growable typed GPU buffers.

use std::marker::PhantomData;

use bytemuck::Pod;
use wgpu::{BindingResource, BufferUsages, CommandBuffer, CommandEncoder, COPY_BUFFER_ALIGNMENT};

/// Round a byte size up to the copy alignment wgpu requires of buffer sizes.
pub(crate) fn pad_size(size: u64) -> u64 {
    let align_mask = COPY_BUFFER_ALIGNMENT - 1;
    ((size + align_mask) & !align_mask).max(COPY_BUFFER_ALIGNMENT)
}

/// A typed GPU buffer that grows like a `Vec` when extended.
///
/// Growing allocates a fresh buffer and records a copy of the live contents
/// into it, so any bind group built against the old buffer must be rebuilt
/// once the command buffer returned by [`extend`](Self::extend) has been
/// submitted.
pub struct GpuBuffer<T> {
    inner: wgpu::Buffer,
    length: usize,
    capacity: u64,
    usage: BufferUsages,
    _marker: PhantomData<T>,
}

impl<T: Pod> GpuBuffer<T> {
    /// Create a buffer of `length` elements, populated by `fill`.
    ///
    /// The buffer is mapped at creation, so the initial contents are written
    /// without a staging copy.
    pub fn new<F>(device: &wgpu::Device, usage: BufferUsages, length: usize, fill: F) -> Self
    where
        F: FnOnce(&mut [T]),
    {
        assert!(
            usage.contains(BufferUsages::COPY_SRC),
            "buffer must have COPY_SRC usage to grow"
        );
        assert!(
            usage.contains(BufferUsages::COPY_DST),
            "buffer must have COPY_DST usage to extend"
        );

        let capacity = pad_size((length * std::mem::size_of::<T>()) as u64);
        let inner = device.create_buffer(&wgpu::BufferDescriptor {
            label: None,
            size: capacity,
            usage,
            mapped_at_creation: true,
        });
        {
            // The mapped range spans the padded capacity; only the typed
            // prefix is handed to the caller.
            let mut mapped = inner.slice(..).get_mapped_range_mut();
            let bytes = &mut mapped.as_mut()[..length * std::mem::size_of::<T>()];
            fill(bytemuck::cast_slice_mut(bytes));
        }
        inner.unmap();

        Self {
            inner,
            length,
            capacity,
            usage,
            _marker: PhantomData,
        }
    }

    /// Number of live elements.
    pub fn len(&self) -> usize {
        self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// The underlying wgpu buffer. Its size is the padded capacity, which can
    /// exceed `len * size_of::<T>()`.
    pub fn buffer(&self) -> &wgpu::Buffer {
        &self.inner
    }

    pub fn as_entire_binding(&self) -> BindingResource<'_> {
        self.inner.as_entire_binding()
    }

    fn size(&self) -> u64 {
        (self.length * std::mem::size_of::<T>()) as u64
    }

    fn grow(&mut self, device: &wgpu::Device, required_size: u64) -> CommandEncoder {
        let new_capacity = pad_size(required_size.max(2 * self.capacity));
        log::trace!(
            "growing gpu buffer from {} to {new_capacity} bytes",
            self.capacity
        );

        let new_inner = device.create_buffer(&wgpu::BufferDescriptor {
            label: None,
            size: new_capacity,
            usage: self.usage,
            mapped_at_creation: false,
        });

        let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
            label: Some("grow gpu buffer"),
        });
        encoder.copy_buffer_to_buffer(&self.inner, 0, &new_inner, 0, self.size());

        self.inner = new_inner;
        self.capacity = new_capacity;
        encoder
    }

    /// Append `length` elements produced by `fill`.
    ///
    /// The returned command buffer carries the staging copy (and the
    /// relocation copy if the buffer had to grow) and must be submitted
    /// before the next use of the buffer.
    pub fn extend<F>(&mut self, device: &wgpu::Device, length: usize, fill: F) -> CommandBuffer
    where
        F: FnOnce(&mut [T]),
    {
        let extra_size = (length * std::mem::size_of::<T>()) as u64;
        let required_size = self.size() + extra_size;
        let mut encoder = if required_size > self.capacity {
            self.grow(device, required_size)
        } else {
            device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("extend gpu buffer"),
            })
        };

        let staging = device.create_buffer(&wgpu::BufferDescriptor {
            label: None,
            size: pad_size(extra_size),
            usage: BufferUsages::COPY_SRC,
            mapped_at_creation: true,
        });
        {
            let mut mapped = staging.slice(..).get_mapped_range_mut();
            let bytes = &mut mapped.as_mut()[..length * std::mem::size_of::<T>()];
            fill(bytemuck::cast_slice_mut(bytes));
        }
        staging.unmap();

        encoder.copy_buffer_to_buffer(&staging, 0, &self.inner, self.size(), extra_size);
        self.length += length;
        encoder.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::pad_size;

    #[test]
    fn pad_size_rounds_up_to_copy_alignment() {
        assert_eq!(pad_size(0), 4);
        assert_eq!(pad_size(1), 4);
        assert_eq!(pad_size(4), 4);
        assert_eq!(pad_size(5), 8);
        assert_eq!(pad_size(1023), 1024);
    }
}
