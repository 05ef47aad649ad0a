use crate::errors::TensorError;
use ndarray::ArrayViewD;

/// Maximum number of dimensions an engine output can declare.
pub const MAX_DIMS: usize = 8;

/// Element type of an engine output tensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    Float,
    Half,
    Int8,
    Int32,
}

/// Borrowed, typed backing storage of an engine output.
///
/// `Half` values are kept as their raw bit patterns.
#[derive(Debug, Clone, Copy)]
pub enum TensorBuffer<'a> {
    Float(&'a [f32]),
    Half(&'a [u16]),
    Int8(&'a [i8]),
    Int32(&'a [i32]),
}

impl TensorBuffer<'_> {
    pub fn data_type(&self) -> DataType {
        match self {
            TensorBuffer::Float(_) => DataType::Float,
            TensorBuffer::Half(_) => DataType::Half,
            TensorBuffer::Int8(_) => DataType::Int8,
            TensorBuffer::Int32(_) => DataType::Int32,
        }
    }

    fn len(&self) -> usize {
        match self {
            TensorBuffer::Float(data) => data.len(),
            TensorBuffer::Half(data) => data.len(),
            TensorBuffer::Int8(data) => data.len(),
            TensorBuffer::Int32(data) => data.len(),
        }
    }
}

/// Declared dimensions of a tensor, row-major, outermost first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dims {
    d: [u32; MAX_DIMS],
    num_dims: usize,
}

impl Dims {
    pub fn rank(&self) -> usize {
        self.num_dims
    }

    pub fn as_slice(&self) -> &[u32] {
        &self.d[..self.num_dims]
    }

    /// Size of dimension `axis`, or `None` past the declared rank.
    pub fn get(&self, axis: usize) -> Option<usize> {
        self.as_slice().get(axis).map(|&size| size as usize)
    }

    fn element_count(&self) -> Option<usize> {
        self.as_slice()
            .iter()
            .try_fold(1usize, |acc, &size| acc.checked_mul(size as usize))
    }
}

/// A named engine output borrowed for the duration of one decode call.
#[derive(Debug, Clone, Copy)]
pub struct TensorDescriptor<'a> {
    name: &'a str,
    dims: Dims,
    buffer: TensorBuffer<'a>,
}

impl<'a> TensorDescriptor<'a> {
    /// Describe an engine output.
    ///
    /// The buffer must hold at least as many elements as the dimensions
    /// declare; any trailing elements are never read.
    pub fn new(name: &'a str, dims: &[u32], buffer: TensorBuffer<'a>) -> Result<Self, TensorError> {
        if dims.len() > MAX_DIMS {
            return Err(TensorError::TooManyDimensions {
                name: name.to_string(),
                rank: dims.len(),
                max: MAX_DIMS,
            });
        }

        let mut d = [0u32; MAX_DIMS];
        d[..dims.len()].copy_from_slice(dims);
        let dims = Dims {
            d,
            num_dims: dims.len(),
        };

        let required = dims
            .element_count()
            .ok_or_else(|| TensorError::DimensionOverflow {
                name: name.to_string(),
            })?;
        if buffer.len() < required {
            return Err(TensorError::BufferTooSmall {
                name: name.to_string(),
                required,
                actual: buffer.len(),
            });
        }

        Ok(Self { name, dims, buffer })
    }

    /// Wrap a float output produced by an ndarray-based runtime without copying.
    pub fn from_array_view(name: &'a str, view: ArrayViewD<'a, f32>) -> Result<Self, TensorError> {
        let dims = view
            .shape()
            .iter()
            .map(|&size| u32::try_from(size))
            .collect::<Result<Vec<_>, _>>()
            .map_err(|_| TensorError::DimensionOverflow {
                name: name.to_string(),
            })?;

        let data = view.to_slice().ok_or_else(|| TensorError::NonContiguous {
            name: name.to_string(),
        })?;

        Self::new(name, &dims, TensorBuffer::Float(data))
    }

    pub fn name(&self) -> &'a str {
        self.name
    }

    pub fn data_type(&self) -> DataType {
        self.buffer.data_type()
    }

    pub fn dims(&self) -> &Dims {
        &self.dims
    }

    /// Float view over exactly the declared elements, `None` for other element types.
    pub fn float_view(&self) -> Option<TensorView<'a>> {
        match self.buffer {
            TensorBuffer::Float(data) => {
                // Checked against the buffer length at construction.
                let len = self.dims.element_count().unwrap_or(0);
                Some(TensorView::new(&data[..len]))
            }
            _ => None,
        }
    }
}

/// Read-only, bounds-checked view over a flat row-major float buffer.
#[derive(Debug, Clone, Copy)]
pub struct TensorView<'a> {
    data: &'a [f32],
}

impl<'a> TensorView<'a> {
    pub fn new(data: &'a [f32]) -> Self {
        Self { data }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// The `index`-th block of `stride` consecutive elements.
    ///
    /// # Panics
    ///
    /// Panics if the block extends past the end of the buffer.
    #[inline]
    pub fn row(&self, index: usize, stride: usize) -> &'a [f32] {
        let start = index.checked_mul(stride);
        let end = start.and_then(|start| start.checked_add(stride));
        match (start, end) {
            (Some(start), Some(end)) if end <= self.data.len() => &self.data[start..end],
            _ => panic!(
                "row {} of stride {} is out of bounds for a tensor of {} elements",
                index,
                stride,
                self.data.len()
            ),
        }
    }

    /// [`row`](Self::row) with a stride known at compile time.
    ///
    /// # Panics
    ///
    /// Panics if the block extends past the end of the buffer.
    #[inline]
    pub fn fixed_row<const N: usize>(&self, index: usize) -> &'a [f32; N] {
        let Some(row) = self.row(index, N).first_chunk::<N>() else {
            unreachable!("row() returns exactly {N} elements");
        };
        row
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array, Axis, IxDyn};

    #[test]
    fn test_row_returns_exact_block() {
        let data: Vec<f32> = (0..12).map(|v| v as f32).collect();
        let view = TensorView::new(&data);

        assert_eq!(view.row(0, 4), &[0.0, 1.0, 2.0, 3.0]);
        assert_eq!(view.row(2, 4), &[8.0, 9.0, 10.0, 11.0]);
        assert_eq!(view.row(5, 2), &[10.0, 11.0]);
    }

    #[test]
    fn test_fixed_row_matches_row() {
        let data: Vec<f32> = (0..12).map(|v| v as f32).collect();
        let view = TensorView::new(&data);

        let row: &[f32; 4] = view.fixed_row(1);
        assert_eq!(row, &[4.0, 5.0, 6.0, 7.0]);
        assert_eq!(&row[..], view.row(1, 4));
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn test_fixed_row_past_end_panics() {
        let data = [0.0f32; 6];
        TensorView::new(&data).fixed_row::<4>(1);
    }

    #[test]
    fn test_zero_stride_rows_are_empty() {
        let data = [1.0f32, 2.0];
        let view = TensorView::new(&data);
        assert!(view.row(7, 0).is_empty());
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn test_row_past_end_panics() {
        let data = [0.0f32; 8];
        TensorView::new(&data).row(2, 4);
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn test_row_offset_overflow_panics() {
        let data = [0.0f32; 8];
        TensorView::new(&data).row(usize::MAX, 2);
    }

    #[test]
    fn test_descriptor_reports_type_and_dims() {
        let data = vec![0.0f32; 300 * 4];
        let tensor = TensorDescriptor::new("dets", &[300, 4], TensorBuffer::Float(&data)).unwrap();

        assert_eq!(tensor.name(), "dets");
        assert_eq!(tensor.data_type(), DataType::Float);
        assert_eq!(tensor.dims().rank(), 2);
        assert_eq!(tensor.dims().as_slice(), &[300, 4]);
        assert_eq!(tensor.dims().get(1), Some(4));
        assert_eq!(tensor.dims().get(2), None);
        assert_eq!(tensor.float_view().unwrap().len(), 1200);
    }

    #[test]
    fn test_float_view_ignores_trailing_elements() {
        let data = vec![1.0f32; 10];
        let tensor = TensorDescriptor::new("labels", &[2, 3], TensorBuffer::Float(&data)).unwrap();
        assert_eq!(tensor.float_view().unwrap().len(), 6);
    }

    #[test]
    fn test_non_float_tensors_have_no_float_view() {
        let data = vec![0i32; 4];
        let tensor = TensorDescriptor::new("labels", &[4], TensorBuffer::Int32(&data)).unwrap();
        assert_eq!(tensor.data_type(), DataType::Int32);
        assert!(tensor.float_view().is_none());
    }

    #[test]
    fn test_short_buffer_is_rejected() {
        let data = vec![0.0f32; 4];
        let err = TensorDescriptor::new("dets", &[300, 4], TensorBuffer::Float(&data)).unwrap_err();
        assert_eq!(
            err,
            TensorError::BufferTooSmall {
                name: "dets".to_string(),
                required: 1200,
                actual: 4,
            }
        );
    }

    #[test]
    fn test_rank_above_maximum_is_rejected() {
        let data = vec![0.0f32; 1];
        let err = TensorDescriptor::new("dets", &[1; 9], TensorBuffer::Float(&data)).unwrap_err();
        assert!(matches!(
            err,
            TensorError::TooManyDimensions { rank: 9, max: 8, .. }
        ));
    }

    #[test]
    fn test_overflowing_dims_are_rejected() {
        let data: [f32; 0] = [];
        let err = TensorDescriptor::new(
            "dets",
            &[u32::MAX, u32::MAX, u32::MAX],
            TensorBuffer::Float(&data),
        )
        .unwrap_err();
        assert!(matches!(err, TensorError::DimensionOverflow { .. }));
    }

    #[test]
    fn test_from_array_view_borrows_contiguous_data() {
        let array = Array::from_shape_vec(IxDyn(&[1, 3, 4]), (0..12).map(|v| v as f32).collect())
            .unwrap();
        let batch = array.index_axis(Axis(0), 0);
        let tensor = TensorDescriptor::from_array_view("dets", batch).unwrap();

        assert_eq!(tensor.dims().as_slice(), &[3, 4]);
        assert_eq!(tensor.float_view().unwrap().row(1, 4), &[4.0, 5.0, 6.0, 7.0]);
    }

    #[test]
    fn test_from_array_view_rejects_transposed_view() {
        let array = Array::from_shape_vec(IxDyn(&[2, 3]), vec![0.0f32; 6]).unwrap();
        let transposed = array.t();
        let err = TensorDescriptor::from_array_view("dets", transposed).unwrap_err();
        assert_eq!(
            err,
            TensorError::NonContiguous {
                name: "dets".to_string()
            }
        );
    }
}
