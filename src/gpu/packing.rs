//! Aligned packing of vector and scalar data into a GPU buffer.
//!
//! Vectors are written back to back in input order, each one occupying
//! `padded_len(len) * 4` bytes. Three-component vectors take a full 16-byte
//! lane, matching WGSL's `vec3<f32>` alignment. The trailing scalar block is
//! written unpadded right after the last vector.
//!
//! Padding gaps are never written. Whatever the destination held there
//! (zero from allocation, or a previous identical pack) is left in place, so
//! repeated packs of the same data are byte-identical.

use std::fmt;

/// Size of one packed `f32` slot in bytes.
const SLOT_BYTES: u64 = 4;

/// Number of `f32` slots a vector of `len` components occupies.
///
/// `vec3` rounds up to four slots; every other length packs tightly.
#[must_use]
pub const fn padded_len(len: usize) -> usize {
    if len == 3 {
        4
    } else {
        len
    }
}

/// Errors raised while packing into a destination buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PackError {
    /// The packed layout does not fit in the destination buffer.
    LayoutOverflow {
        /// Bytes the layout needs, padding included.
        required: u64,
        /// Capacity of the destination in bytes.
        capacity: u64,
    },
}

impl fmt::Display for PackError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LayoutOverflow { required, capacity } => write!(
                f,
                "packed layout needs {required} bytes but destination holds \
                 {capacity}"
            ),
        }
    }
}

impl std::error::Error for PackError {}

/// What a packed block holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    /// Vector at the given input index.
    Vector(usize),
    /// The trailing scalar block.
    Scalars,
}

/// One contiguous byte range of a packed layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PackedBlock {
    /// Source of the block's data.
    pub kind: BlockKind,
    /// Byte offset of the first written byte.
    pub offset: u64,
    /// Bytes actually written (raw float data).
    pub written: u64,
    /// Bytes reserved, padding included.
    pub span: u64,
}

impl PackedBlock {
    /// End of the reserved range (`offset + span`).
    #[must_use]
    pub fn end(&self) -> u64 {
        self.offset + self.span
    }
}

/// Byte layout for a sequence of vectors followed by a scalar block.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PackedLayout {
    blocks: Vec<PackedBlock>,
    total_bytes: u64,
}

impl PackedLayout {
    /// Plan the layout for vectors of the given component counts followed by
    /// `scalar_len` scalars.
    pub fn plan(
        vector_lens: impl IntoIterator<Item = usize>,
        scalar_len: usize,
    ) -> Self {
        let mut blocks = Vec::new();
        let mut offset = 0u64;

        for (index, len) in vector_lens.into_iter().enumerate() {
            let span = padded_len(len) as u64 * SLOT_BYTES;
            blocks.push(PackedBlock {
                kind: BlockKind::Vector(index),
                offset,
                written: len as u64 * SLOT_BYTES,
                span,
            });
            offset += span;
        }

        let scalar_bytes = scalar_len as u64 * SLOT_BYTES;
        blocks.push(PackedBlock {
            kind: BlockKind::Scalars,
            offset,
            written: scalar_bytes,
            span: scalar_bytes,
        });

        Self {
            blocks,
            total_bytes: offset + scalar_bytes,
        }
    }

    /// Layout for concrete vector values and a scalar block.
    pub fn for_data<V: AsRef<[f32]>>(vectors: &[V], scalars: &[f32]) -> Self {
        Self::plan(vectors.iter().map(|v| v.as_ref().len()), scalars.len())
    }

    /// Blocks in write order. The scalar block is always last.
    #[must_use]
    pub fn blocks(&self) -> &[PackedBlock] {
        &self.blocks
    }

    /// Byte offsets of every block, in write order.
    pub fn offsets(&self) -> impl Iterator<Item = u64> + '_ {
        self.blocks.iter().map(|b| b.offset)
    }

    /// Total logical span in bytes, padding included.
    #[must_use]
    pub fn total_bytes(&self) -> u64 {
        self.total_bytes
    }

    /// Check every block against `capacity` without writing anything.
    ///
    /// # Errors
    ///
    /// Returns [`PackError::LayoutOverflow`] for the first block whose
    /// reserved range ends past `capacity`.
    pub fn validate(&self, capacity: u64) -> Result<(), PackError> {
        match self.blocks.iter().find(|b| b.end() > capacity) {
            Some(_) => Err(PackError::LayoutOverflow {
                required: self.total_bytes,
                capacity,
            }),
            None => Ok(()),
        }
    }
}

/// Destination of a pack: a fixed-capacity, byte-addressable buffer.
pub trait PackTarget {
    /// Capacity in bytes.
    fn capacity(&self) -> u64;

    /// Queue a write of `bytes` at `offset`.
    fn write(&mut self, offset: u64, bytes: &[u8]);
}

/// A wgpu buffer written through its device queue.
///
/// Writes are staged on the queue and land in call order before any
/// command buffer submitted afterwards.
pub struct QueueTarget<'a> {
    queue: &'a wgpu::Queue,
    buffer: &'a wgpu::Buffer,
}

impl<'a> QueueTarget<'a> {
    /// Target `buffer` through `queue`. The buffer needs `COPY_DST` usage.
    #[must_use]
    pub fn new(queue: &'a wgpu::Queue, buffer: &'a wgpu::Buffer) -> Self {
        Self { queue, buffer }
    }
}

impl PackTarget for QueueTarget<'_> {
    fn capacity(&self) -> u64 {
        self.buffer.size()
    }

    fn write(&mut self, offset: u64, bytes: &[u8]) {
        self.queue.write_buffer(self.buffer, offset, bytes);
    }
}

/// Pack `vectors` followed by `scalars` into `target`.
///
/// The whole layout is validated against the target's capacity before the
/// first write, so an overflowing call leaves the target untouched. Empty
/// blocks issue no write.
///
/// # Errors
///
/// Returns [`PackError::LayoutOverflow`] if the layout does not fit.
pub fn pack<V, T>(
    vectors: &[V],
    scalars: &[f32],
    target: &mut T,
) -> Result<PackedLayout, PackError>
where
    V: AsRef<[f32]>,
    T: PackTarget + ?Sized,
{
    let layout = PackedLayout::for_data(vectors, scalars);
    let capacity = target.capacity();
    if let Err(e) = layout.validate(capacity) {
        log::warn!("refusing to pack: {e}");
        return Err(e);
    }

    for block in layout.blocks() {
        let data = match block.kind {
            BlockKind::Vector(index) => vectors[index].as_ref(),
            BlockKind::Scalars => scalars,
        };
        if data.is_empty() {
            continue;
        }
        target.write(block.offset, bytemuck::cast_slice(data));
    }

    log::trace!(
        "packed {} vectors + {} scalars into {}/{} bytes",
        vectors.len(),
        scalars.len(),
        layout.total_bytes(),
        capacity
    );
    Ok(layout)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// In-memory target that records every write and applies it to a byte
    /// image. Untouched bytes keep the fill value.
    struct RecordingTarget {
        bytes: Vec<u8>,
        writes: Vec<(u64, Vec<u8>)>,
    }

    impl RecordingTarget {
        fn new(capacity: usize) -> Self {
            Self::filled(capacity, 0)
        }

        fn filled(capacity: usize, fill: u8) -> Self {
            Self {
                bytes: vec![fill; capacity],
                writes: Vec::new(),
            }
        }
    }

    impl PackTarget for RecordingTarget {
        fn capacity(&self) -> u64 {
            self.bytes.len() as u64
        }

        fn write(&mut self, offset: u64, bytes: &[u8]) {
            let start = offset as usize;
            self.bytes[start..start + bytes.len()].copy_from_slice(bytes);
            self.writes.push((offset, bytes.to_vec()));
        }
    }

    fn floats(bytes: &[u8]) -> Vec<f32> {
        bytemuck::pod_collect_to_vec(bytes)
    }

    #[test]
    fn padded_len_rounds_vec3_only() {
        assert_eq!(padded_len(2), 2);
        assert_eq!(padded_len(3), 4);
        assert_eq!(padded_len(4), 4);
        assert_eq!(padded_len(6), 6);
    }

    #[test]
    fn vec3_then_scalar_leaves_padding_gap() {
        let mut target = RecordingTarget::filled(20, 0xAB);
        let layout = pack(&[[1.0f32, 2.0, 3.0]], &[9.0], &mut target).unwrap();

        assert_eq!(layout.total_bytes(), 20);
        assert_eq!(target.writes.len(), 2);
        assert_eq!(target.writes[0].0, 0);
        assert_eq!(floats(&target.writes[0].1), vec![1.0, 2.0, 3.0]);
        assert_eq!(target.writes[1].0, 16);
        assert_eq!(floats(&target.writes[1].1), vec![9.0]);
        assert_eq!(&target.bytes[12..16], &[0xAB; 4]);
    }

    #[test]
    fn overflow_is_rejected_before_any_write() {
        let mut target = RecordingTarget::new(16);
        let err = pack(&[[1.0f32, 2.0, 3.0]], &[9.0], &mut target).unwrap_err();

        assert_eq!(
            err,
            PackError::LayoutOverflow {
                required: 20,
                capacity: 16
            }
        );
        assert!(target.writes.is_empty());
        assert!(target.bytes.iter().all(|&b| b == 0));
    }

    #[test]
    fn trailing_vec3_padding_counts_against_capacity() {
        let mut target = RecordingTarget::new(12);
        let result = pack(&[[1.0f32, 2.0, 3.0]], &[], &mut target);
        assert!(matches!(result, Err(PackError::LayoutOverflow { .. })));
        assert!(target.writes.is_empty());
    }

    #[test]
    fn total_bytes_matches_padded_sum() {
        let lens = [2usize, 3, 4, 3, 3, 2, 4];
        for scalar_len in [0usize, 1, 5] {
            let layout = PackedLayout::plan(lens, scalar_len);
            let slots: usize =
                lens.iter().map(|&l| if l == 3 { 4 } else { l }).sum();
            assert_eq!(
                layout.total_bytes(),
                4 * slots as u64 + 4 * scalar_len as u64
            );
        }
    }

    #[test]
    fn blocks_are_contiguous_and_in_order() {
        let layout = PackedLayout::plan([3usize, 2, 4, 3], 3);
        let offsets: Vec<u64> = layout.offsets().collect();
        assert_eq!(offsets, vec![0, 16, 24, 40, 56]);

        for pair in layout.blocks().windows(2) {
            assert_eq!(pair[0].end(), pair[1].offset);
        }
        assert_eq!(layout.blocks().last().unwrap().kind, BlockKind::Scalars);
    }

    #[test]
    fn mixed_lengths_produce_expected_image() {
        let vectors: Vec<Vec<f32>> =
            vec![vec![1.0, 2.0], vec![3.0, 4.0, 5.0], vec![6.0, 7.0, 8.0, 9.0]];
        let mut target = RecordingTarget::new(48);
        let layout = pack(&vectors, &[10.0, 11.0], &mut target).unwrap();

        assert_eq!(layout.total_bytes(), 48);
        let image = floats(&target.bytes);
        assert_eq!(
            image,
            vec![
                1.0, 2.0, 3.0, 4.0, 5.0, 0.0, 6.0, 7.0, 8.0, 9.0, 10.0, 11.0
            ]
        );
    }

    #[test]
    fn packing_twice_is_byte_identical() {
        let vectors = [[0.5f32, 1.5, 2.5], [3.5, 4.5, 5.5]];
        let scalars = [7.0f32, 8.0, 9.0];

        let mut first = RecordingTarget::new(64);
        let mut second = RecordingTarget::new(64);
        let a = pack(&vectors, &scalars, &mut first).unwrap();
        let b = pack(&vectors, &scalars, &mut second).unwrap();
        let again = pack(&vectors, &scalars, &mut first).unwrap();

        assert_eq!(a, b);
        assert_eq!(a, again);
        assert_eq!(first.bytes, second.bytes);
        assert_eq!(first.writes[..3], second.writes[..]);
        assert_eq!(first.writes[3..], second.writes[..]);
    }

    #[test]
    fn empty_inputs_write_nothing() {
        let mut target = RecordingTarget::new(0);
        let layout = pack::<[f32; 2], _>(&[], &[], &mut target).unwrap();
        assert_eq!(layout.total_bytes(), 0);
        assert!(target.writes.is_empty());
    }

    #[test]
    fn scalars_only_start_at_zero() {
        let mut target = RecordingTarget::new(8);
        let _ = pack::<[f32; 4], _>(&[], &[1.0, 2.0], &mut target).unwrap();
        assert_eq!(target.writes.len(), 1);
        assert_eq!(target.writes[0].0, 0);
        assert_eq!(floats(&target.bytes), vec![1.0, 2.0]);
    }

    fn filled_gpu_buffer(
        device: &wgpu::Device,
        size: usize,
        fill: u8,
    ) -> wgpu::Buffer {
        use wgpu::util::DeviceExt;

        device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("pack test buffer"),
            contents: &vec![fill; size],
            usage: wgpu::BufferUsages::STORAGE
                | wgpu::BufferUsages::COPY_DST
                | wgpu::BufferUsages::COPY_SRC,
        })
    }

    #[test]
    fn queue_target_writes_wire_format() {
        let Some(ctx) = crate::gpu::context::test_context() else {
            return;
        };
        let buffer = filled_gpu_buffer(&ctx.device, 20, 0xAB);
        let mut target = QueueTarget::new(&ctx.queue, &buffer);
        assert_eq!(target.capacity(), 20);

        let _ = pack(&[[1.0f32, 2.0, 3.0]], &[9.0], &mut target).unwrap();
        let bytes = crate::gpu::context::read_back(&ctx, &buffer);

        assert_eq!(floats(&bytes[..12]), vec![1.0, 2.0, 3.0]);
        assert_eq!(&bytes[12..16], &[0xAB; 4]);
        assert_eq!(floats(&bytes[16..20]), vec![9.0]);
    }

    #[test]
    fn queue_target_rejects_overflow_untouched() {
        let Some(ctx) = crate::gpu::context::test_context() else {
            return;
        };
        let buffer = filled_gpu_buffer(&ctx.device, 16, 0xAB);
        let mut target = QueueTarget::new(&ctx.queue, &buffer);

        let err = pack(&[[1.0f32, 2.0, 3.0]], &[9.0], &mut target).unwrap_err();
        assert_eq!(
            err,
            PackError::LayoutOverflow {
                required: 20,
                capacity: 16
            }
        );
        let bytes = crate::gpu::context::read_back(&ctx, &buffer);
        assert!(bytes.iter().all(|&b| b == 0xAB));
    }
}
