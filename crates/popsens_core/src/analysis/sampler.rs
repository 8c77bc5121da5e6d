//! Quasi-random Saltelli sampling over a [`ParameterSpace`].
//!
//! A Sobol sequence of dimension `2D` supplies the `A` (first D columns) and
//! `B` (last D columns) matrices. Every base point expands into `2D + 2` rows:
//!
//! ```text
//! A, AB_1, .., AB_D, BA_1, .., BA_D, B
//! ```
//!
//! where `AB_j` is `A` with column `j` taken from `B` and `BA_j` is the
//! reverse. The estimator relies on exactly this layout.

use crate::error::ConfigError;

use super::config::ParameterSpace;

const BITS: u32 = 32;

/// Primitive polynomials and initial direction numbers (Joe & Kuo, new-joe-kuo-6.21201)
/// for dimensions 2 through 25. Dimension 1 is the van der Corput sequence.
const DIRECTIONS: [(u32, u32, &[u32]); 24] = [
    (1, 0, &[1]),
    (2, 1, &[1, 3]),
    (3, 1, &[1, 3, 1]),
    (3, 2, &[1, 1, 1]),
    (4, 1, &[1, 1, 3, 3]),
    (4, 4, &[1, 3, 5, 13]),
    (5, 2, &[1, 1, 5, 5, 17]),
    (5, 4, &[1, 1, 5, 5, 5]),
    (5, 7, &[1, 1, 7, 11, 19]),
    (5, 11, &[1, 1, 5, 1, 1]),
    (5, 13, &[1, 1, 1, 3, 11]),
    (5, 14, &[1, 3, 5, 5, 31]),
    (6, 1, &[1, 3, 3, 9, 7, 49]),
    (6, 13, &[1, 1, 1, 15, 21, 21]),
    (6, 16, &[1, 3, 1, 13, 27, 49]),
    (6, 19, &[1, 1, 1, 15, 7, 5]),
    (6, 22, &[1, 3, 1, 15, 13, 25]),
    (6, 25, &[1, 1, 5, 5, 19, 61]),
    (7, 1, &[1, 3, 7, 11, 23, 15, 103]),
    (7, 4, &[1, 3, 7, 13, 13, 15, 69]),
    (7, 7, &[1, 1, 3, 13, 7, 35, 63]),
    (7, 8, &[1, 3, 5, 9, 1, 25, 53]),
    (7, 14, &[1, 3, 1, 13, 9, 35, 107]),
    (7, 19, &[1, 3, 1, 5, 27, 61, 31]),
];

/// Highest Sobol dimension the direction table supports
pub const MAX_SOBOL_DIMENSIONS: usize = DIRECTIONS.len() + 1;

/// Largest parameter count a Saltelli design can be built for
pub const MAX_PARAMETERS: usize = MAX_SOBOL_DIMENSIONS / 2;

/// Gray-code Sobol sequence generator over `[0, 1)^dims`
#[derive(Debug, Clone)]
pub struct SobolSequence {
    directions: Vec<[u32; BITS as usize]>,
    state: Vec<u32>,
    index: u64,
}

impl SobolSequence {
    pub fn new(dims: usize) -> Result<Self, ConfigError> {
        if dims > MAX_SOBOL_DIMENSIONS {
            return Err(ConfigError::TooManyParameters {
                parameters: dims.div_ceil(2),
                max: MAX_PARAMETERS,
            });
        }

        let mut directions = Vec::with_capacity(dims);
        for dim in 0..dims {
            let mut v = [0u32; BITS as usize];
            if dim == 0 {
                for (k, slot) in v.iter_mut().enumerate() {
                    *slot = 1 << (BITS - 1 - k as u32);
                }
            } else {
                let (s, a, m) = DIRECTIONS[dim - 1];
                let s = s as usize;
                for k in 0..BITS as usize {
                    v[k] = if k < s {
                        m[k] << (BITS - 1 - k as u32)
                    } else {
                        let mut value = v[k - s] ^ (v[k - s] >> s);
                        for l in 1..s {
                            if (a >> (s - 1 - l)) & 1 == 1 {
                                value ^= v[k - l];
                            }
                        }
                        value
                    };
                }
            }
            directions.push(v);
        }

        Ok(Self {
            directions,
            state: vec![0; dims],
            index: 0,
        })
    }

    #[must_use]
    pub fn dims(&self) -> usize {
        self.directions.len()
    }

    /// Write the next point into `out` (length `dims`)
    pub fn next_into(&mut self, out: &mut [f64]) {
        if self.index > 0 {
            // position of the lowest zero bit of the previous index
            let bit = (!(self.index - 1)).trailing_zeros() as usize;
            for (x, v) in self.state.iter_mut().zip(&self.directions) {
                *x ^= v[bit];
            }
        }
        self.index += 1;

        let scale = f64::from(BITS).exp2();
        for (o, &x) in out.iter_mut().zip(&self.state) {
            *o = f64::from(x) / scale;
        }
    }

    /// Advance past `count` points
    pub fn skip(&mut self, count: usize) {
        let mut scratch = vec![0.0; self.dims()];
        for _ in 0..count {
            self.next_into(&mut scratch);
        }
    }
}

/// Row-major `rows × dims` matrix of parameter values
#[derive(Debug, Clone, PartialEq)]
pub struct SampleMatrix {
    base_samples: usize,
    dims: usize,
    values: Vec<f64>,
}

impl SampleMatrix {
    /// Number of base points N
    #[must_use]
    pub fn base_samples(&self) -> usize {
        self.base_samples
    }

    /// Row width D
    #[must_use]
    pub fn dims(&self) -> usize {
        self.dims
    }

    /// Rows per base point, `2D + 2`
    #[must_use]
    pub fn group_size(&self) -> usize {
        2 * self.dims + 2
    }

    #[must_use]
    pub fn rows(&self) -> usize {
        self.base_samples * self.group_size()
    }

    #[must_use]
    pub fn row(&self, index: usize) -> &[f64] {
        &self.values[index * self.dims..(index + 1) * self.dims]
    }

    pub fn iter_rows(&self) -> std::slice::ChunksExact<'_, f64> {
        self.values.chunks_exact(self.dims.max(1))
    }

    #[must_use]
    pub fn values(&self) -> &[f64] {
        &self.values
    }
}

/// Saltelli design with `n` base points over `space`, discarding the first
/// `skip` points of the Sobol sequence
pub fn saltelli_sample(
    space: &ParameterSpace,
    n: usize,
    skip: usize,
) -> Result<SampleMatrix, ConfigError> {
    if n == 0 || !n.is_power_of_two() {
        return Err(ConfigError::InvalidSampleCount(n));
    }
    let d = space.dim();
    if d > MAX_PARAMETERS {
        return Err(ConfigError::TooManyParameters {
            parameters: d,
            max: MAX_PARAMETERS,
        });
    }

    let group = 2 * d + 2;
    let len = n
        .checked_mul(group)
        .and_then(|rows| rows.checked_mul(d))
        .ok_or(ConfigError::InvalidSampleCount(n))?;
    let mut values = Vec::new();
    values
        .try_reserve_exact(len)
        .map_err(|_| ConfigError::InvalidSampleCount(n))?;

    let mut sequence = SobolSequence::new(2 * d)?;
    sequence.skip(skip);
    let mut point = vec![0.0; 2 * d];

    for _ in 0..n {
        sequence.next_into(&mut point);
        let (a, b) = point.split_at(d);

        values.extend_from_slice(a);
        for j in 0..d {
            values.extend((0..d).map(|k| if k == j { b[k] } else { a[k] }));
        }
        for j in 0..d {
            values.extend((0..d).map(|k| if k == j { a[k] } else { b[k] }));
        }
        values.extend_from_slice(b);
    }

    for row in values.chunks_exact_mut(d.max(1)) {
        for (value, parameter) in row.iter_mut().zip(space.parameters()) {
            *value = parameter.bounds.scale(*value);
        }
    }

    tracing::debug!(base_samples = n, parameters = d, rows = n * group, "saltelli design");

    Ok(SampleMatrix {
        base_samples: n,
        dims: d,
        values,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ParameterId;

    fn points(dims: usize, count: usize) -> Vec<Vec<f64>> {
        let mut sequence = SobolSequence::new(dims).unwrap();
        (0..count)
            .map(|_| {
                let mut p = vec![0.0; dims];
                sequence.next_into(&mut p);
                p
            })
            .collect()
    }

    #[test]
    fn test_first_dimensions() {
        let pts = points(2, 8);
        let first: Vec<f64> = pts.iter().map(|p| p[0]).collect();
        let second: Vec<f64> = pts.iter().map(|p| p[1]).collect();
        assert_eq!(first, [0.0, 0.5, 0.75, 0.25, 0.375, 0.875, 0.625, 0.125]);
        assert_eq!(second, [0.0, 0.5, 0.25, 0.75, 0.375, 0.875, 0.125, 0.625]);
    }

    #[test]
    fn test_points_stratify_unit_interval() {
        // the first 2^k points put exactly one point in each 1/2^k slot, per dimension
        let pts = points(MAX_SOBOL_DIMENSIONS, 64);
        for dim in 0..MAX_SOBOL_DIMENSIONS {
            let mut slots = [false; 64];
            for p in &pts {
                assert!((0.0..1.0).contains(&p[dim]));
                slots[(p[dim] * 64.0) as usize] = true;
            }
            assert!(slots.iter().all(|&hit| hit), "dimension {dim}");
        }
    }

    #[test]
    fn test_too_many_dimensions() {
        assert!(matches!(
            SobolSequence::new(MAX_SOBOL_DIMENSIONS + 1),
            Err(ConfigError::TooManyParameters { .. })
        ));
    }

    fn unit_space(d: usize) -> ParameterSpace {
        let ids: Vec<ParameterId> = ParameterId::standard().into_iter().take(d).collect();
        ParameterSpace::new(&ids, &vec![(0.0, 1.0); d]).unwrap()
    }

    #[test]
    fn test_rejects_non_power_of_two() {
        let space = unit_space(2);
        assert_eq!(
            saltelli_sample(&space, 6, 0),
            Err(ConfigError::InvalidSampleCount(6))
        );
        assert_eq!(
            saltelli_sample(&space, 0, 0),
            Err(ConfigError::InvalidSampleCount(0))
        );
    }

    #[test]
    fn test_oversized_design_is_sample_count_error() {
        let n = 1usize << (usize::BITS - 2);
        assert_eq!(
            saltelli_sample(&unit_space(12), n, 0),
            Err(ConfigError::InvalidSampleCount(n))
        );
    }

    #[test]
    fn test_row_layout() {
        let d = 3;
        let matrix = saltelli_sample(&unit_space(d), 4, 4).unwrap();
        assert_eq!(matrix.rows(), 4 * (2 * d + 2));

        for base in 0..4 {
            let first = base * matrix.group_size();
            let a = matrix.row(first);
            let b = matrix.row(first + 2 * d + 1);
            for j in 0..d {
                let ab = matrix.row(first + 1 + j);
                let ba = matrix.row(first + 1 + d + j);
                for k in 0..d {
                    let (from_ab, from_ba) = if k == j { (b[k], a[k]) } else { (a[k], b[k]) };
                    assert_eq!(ab[k], from_ab);
                    assert_eq!(ba[k], from_ba);
                }
            }
        }
    }

    #[test]
    fn test_values_scaled_into_bounds() {
        let ids = [ParameterId::Fertility, ParameterId::FemaleShare];
        let space = ParameterSpace::new(&ids, &[(1.2, 2.4), (0.47, 0.5)]).unwrap();
        let matrix = saltelli_sample(&space, 16, 16).unwrap();
        let within = |v: f64, low: f64, high: f64| v >= low - 1e-12 && v <= high + 1e-12;
        for row in matrix.iter_rows() {
            assert!(within(row[0], 1.2, 2.4));
            assert!(within(row[1], 0.47, 0.5));
        }
    }
}
