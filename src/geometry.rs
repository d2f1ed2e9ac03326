use std::ops;

/// How close to zero a determinant can get before the matrix is treated as singular.
const SINGULARITY_EPSILON: f32 = 1e-7;

/// Fixed-size column of f32's. All the rendering math is single-precision.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vector<const N: usize>(pub [f32; N]);

pub type Vec2f = Vector<2>;
pub type Vec3f = Vector<3>;
pub type Vec4f = Vector<4>;

/// Shorthand constructor for Vector<2>.
pub fn vec2(x: f32, y: f32) -> Vec2f {
    return Vector([x, y]);
}

/// Shorthand constructor for Vector<3>.
pub fn vec3(x: f32, y: f32, z: f32) -> Vec3f {
    return Vector([x, y, z]);
}

/// Shorthand constructor for Vector<4>.
pub fn vec4(x: f32, y: f32, z: f32, w: f32) -> Vec4f {
    return Vector([x, y, z, w]);
}

impl<const N: usize> Vector<N> {
    pub fn zeros() -> Self {
        return Vector([0.0; N]);
    }

    /// Dot product of 2 vectors of the same size.
    pub fn dot(self, rhs: Self) -> f32 {
        let mut sum = 0.0;
        for i in 0..N {
            sum += self.0[i] * rhs.0[i];
        }
        return sum;
    }

    /// Euclidean norm.
    pub fn norm(self) -> f32 {
        return self.dot(self).sqrt();
    }
}

impl Vector<2> {
    pub fn x(&self) -> f32 {
        return self.0[0];
    }

    pub fn y(&self) -> f32 {
        return self.0[1];
    }
}

impl Vector<3> {
    pub fn x(&self) -> f32 {
        return self.0[0];
    }

    pub fn y(&self) -> f32 {
        return self.0[1];
    }

    pub fn z(&self) -> f32 {
        return self.0[2];
    }

    /// Cross product of 2 Vector<3>'s.
    pub fn cross(self, rhs: Self) -> Self {
        return vec3(
            self.y() * rhs.z() - self.z() * rhs.y(),
            self.z() * rhs.x() - self.x() * rhs.z(),
            self.x() * rhs.y() - self.y() * rhs.x(),
        );
    }

    /// Vector scaled to unit length.
    pub fn normalized(self) -> Self {
        return self / self.norm();
    }
}

impl Vector<4> {
    pub fn x(&self) -> f32 {
        return self.0[0];
    }

    pub fn y(&self) -> f32 {
        return self.0[1];
    }

    pub fn z(&self) -> f32 {
        return self.0[2];
    }

    pub fn w(&self) -> f32 {
        return self.0[3];
    }
}

impl<const N: usize> ops::Index<usize> for Vector<N> {
    type Output = f32;

    fn index(&self, index: usize) -> &f32 {
        return &self.0[index];
    }
}

impl<const N: usize> ops::IndexMut<usize> for Vector<N> {
    fn index_mut(&mut self, index: usize) -> &mut f32 {
        return &mut self.0[index];
    }
}

impl<const N: usize> ops::Add for Vector<N> {
    type Output = Self;

    fn add(mut self, rhs: Self) -> Self {
        for i in 0..N {
            self.0[i] += rhs.0[i];
        }
        return self;
    }
}

impl<const N: usize> ops::Sub for Vector<N> {
    type Output = Self;

    fn sub(mut self, rhs: Self) -> Self {
        for i in 0..N {
            self.0[i] -= rhs.0[i];
        }
        return self;
    }
}

impl<const N: usize> ops::Mul<f32> for Vector<N> {
    type Output = Self;

    fn mul(mut self, rhs: f32) -> Self {
        for i in 0..N {
            self.0[i] *= rhs;
        }
        return self;
    }
}

impl<const N: usize> ops::Div<f32> for Vector<N> {
    type Output = Self;

    fn div(mut self, rhs: f32) -> Self {
        for i in 0..N {
            self.0[i] /= rhs;
        }
        return self;
    }
}

impl<const N: usize> ops::Neg for Vector<N> {
    type Output = Self;

    fn neg(mut self) -> Self {
        for i in 0..N {
            self.0[i] = -self.0[i];
        }
        return self;
    }
}

/// R rows of Vector<C>. Dimensions are fixed by the type, so every binary
/// operation with mismatched shapes is rejected at compile time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Matrix<const R: usize, const C: usize> {
    rows: [Vector<C>; R],
}

pub type Mat3 = Matrix<3, 3>;
pub type Mat4 = Matrix<4, 4>;

impl<const R: usize, const C: usize> Matrix<R, C> {
    /// Builds a matrix from an array of rows.
    pub fn new(rows: [[f32; C]; R]) -> Self {
        return Matrix {
            rows: rows.map(Vector),
        };
    }

    pub fn zeros() -> Self {
        return Matrix {
            rows: [Vector::zeros(); R],
        };
    }

    /// Extracts a column as a vector.
    pub fn col(&self, index: usize) -> Vector<R> {
        return Vector(std::array::from_fn(|i| self.rows[i][index]));
    }

    pub fn transpose(&self) -> Matrix<C, R> {
        let mut result = Matrix::<C, R>::zeros();
        for i in 0..C {
            result.rows[i] = self.col(i);
        }
        return result;
    }
}

impl<const N: usize> Matrix<N, N> {
    pub fn identity() -> Self {
        let mut result = Self::zeros();
        for i in 0..N {
            result[i][i] = 1.0;
        }
        return result;
    }
}

impl<const R: usize, const C: usize> ops::Index<usize> for Matrix<R, C> {
    type Output = Vector<C>;

    fn index(&self, index: usize) -> &Vector<C> {
        return &self.rows[index];
    }
}

impl<const R: usize, const C: usize> ops::IndexMut<usize> for Matrix<R, C> {
    fn index_mut(&mut self, index: usize) -> &mut Vector<C> {
        return &mut self.rows[index];
    }
}

impl<const R: usize, const C: usize, const K: usize> ops::Mul<Matrix<C, K>> for Matrix<R, C> {
    type Output = Matrix<R, K>;

    fn mul(self, rhs: Matrix<C, K>) -> Matrix<R, K> {
        let mut result = Matrix::<R, K>::zeros();
        for i in 0..R {
            for j in 0..K {
                result[i][j] = self.rows[i].dot(rhs.col(j));
            }
        }
        return result;
    }
}

impl<const R: usize, const C: usize> ops::Mul<Vector<C>> for Matrix<R, C> {
    type Output = Vector<R>;

    fn mul(self, rhs: Vector<C>) -> Vector<R> {
        return Vector(std::array::from_fn(|i| self.rows[i].dot(rhs)));
    }
}

impl<const R: usize, const C: usize> ops::Mul<f32> for Matrix<R, C> {
    type Output = Self;

    fn mul(mut self, rhs: f32) -> Self {
        for i in 0..R {
            self.rows[i] = self.rows[i] * rhs;
        }
        return self;
    }
}

impl<const R: usize, const C: usize> ops::Div<f32> for Matrix<R, C> {
    type Output = Self;

    fn div(mut self, rhs: f32) -> Self {
        for i in 0..R {
            self.rows[i] = self.rows[i] / rhs;
        }
        return self;
    }
}

impl Matrix<1, 1> {
    /// Base case of the cofactor expansion.
    pub fn det(&self) -> f32 {
        return self[0][0];
    }
}

/// Determinant, minor, cofactor and inverse for a square size. The recursion
/// of the cofactor expansion is unrolled over the concrete sizes 2..=4, each
/// delegating to the next smaller one down to the 1x1 base case.
macro_rules! impl_square_ops {
    ($n:literal, $m:literal) => {
        impl Matrix<$n, $n> {
            /// Matrix with row `row` and column `col` dropped.
            pub fn minor(&self, row: usize, col: usize) -> Matrix<$m, $m> {
                let mut result = Matrix::<$m, $m>::zeros();
                for i in 0..$m {
                    for j in 0..$m {
                        let src_i = if i < row { i } else { i + 1 };
                        let src_j = if j < col { j } else { j + 1 };
                        result[i][j] = self[src_i][src_j];
                    }
                }
                return result;
            }

            pub fn cofactor(&self, row: usize, col: usize) -> f32 {
                let sign = if (row + col) % 2 == 0 { 1.0 } else { -1.0 };
                return self.minor(row, col).det() * sign;
            }

            /// Determinant via cofactor expansion along the first row.
            pub fn det(&self) -> f32 {
                let mut det = 0.0;
                for j in 0..$n {
                    det += self[0][j] * self.cofactor(0, j);
                }
                return det;
            }

            /// Matrix of cofactors.
            pub fn adjugate(&self) -> Self {
                let mut result = Self::zeros();
                for i in 0..$n {
                    for j in 0..$n {
                        result[i][j] = self.cofactor(i, j);
                    }
                }
                return result;
            }

            /// Transpose of the inverse, or None for a singular matrix.
            /// The first row of the adjugate dotted with the first row of the
            /// matrix is exactly the first-row cofactor expansion, so it
            /// doubles as the determinant here.
            pub fn try_inverse_transpose(&self) -> Option<Self> {
                let adjugate = self.adjugate();
                let det = adjugate[0].dot(self[0]);
                if det.abs() < SINGULARITY_EPSILON {
                    return None;
                }
                return Some(adjugate / det);
            }

            /// True inverse, or None for a singular matrix.
            pub fn try_inverse(&self) -> Option<Self> {
                return self.try_inverse_transpose().map(|m| m.transpose());
            }
        }
    };
}

impl_square_ops!(2, 1);
impl_square_ops!(3, 2);
impl_square_ops!(4, 3);

/// Transformation of a point to homogenous coordinates.
pub fn to_hom_point(v: Vec3f) -> Vec4f {
    return vec4(v.x(), v.y(), v.z(), 1.0);
}

/// Transformation of a vector to homogenous coordinates.
pub fn to_hom_vector(v: Vec3f) -> Vec4f {
    return vec4(v.x(), v.y(), v.z(), 0.0);
}

/// Transformation of a point from homogenous coordinates (perspective divide).
pub fn from_hom_point(v: Vec4f) -> Vec3f {
    return vec3(v.x() / v.w(), v.y() / v.w(), v.z() / v.w());
}

/// Transformation of a vector from homogenous coordinates.
pub fn from_hom_vector(v: Vec4f) -> Vec3f {
    return vec3(v.x(), v.y(), v.z());
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn assert_mat4_eq(a: Mat4, b: Mat4) {
        for i in 0..4 {
            for j in 0..4 {
                assert_relative_eq!(a[i][j], b[i][j], epsilon = 1e-4);
            }
        }
    }

    #[test]
    fn dot_and_cross() {
        let a = vec3(1.0, 0.0, 0.0);
        let b = vec3(0.0, 1.0, 0.0);
        assert_relative_eq!(a.dot(b), 0.0);
        let c = a.cross(b);
        assert_relative_eq!(c.x(), 0.0);
        assert_relative_eq!(c.y(), 0.0);
        assert_relative_eq!(c.z(), 1.0);
        // Anticommutativity.
        let d = b.cross(a);
        assert_relative_eq!(d.z(), -1.0);
    }

    #[test]
    fn normalized_has_unit_norm() {
        let v = vec3(3.0, 4.0, 12.0).normalized();
        assert_relative_eq!(v.norm(), 1.0, epsilon = 1e-6);
    }

    #[test]
    fn vector_arithmetic() {
        let v = vec3(1.0, 2.0, 3.0) + vec3(4.0, 5.0, 6.0) - vec3(1.0, 1.0, 1.0);
        assert_eq!(v, vec3(4.0, 6.0, 8.0));
        assert_eq!(v * 2.0, vec3(8.0, 12.0, 16.0));
        assert_eq!(v / 2.0, vec3(2.0, 3.0, 4.0));
        assert_eq!(-v, vec3(-4.0, -6.0, -8.0));
    }

    #[test]
    fn minor_drops_row_and_column() {
        let m = Mat3::new([[1.0, 2.0, 3.0], [4.0, 5.0, 6.0], [7.0, 8.0, 9.0]]);
        let minor = m.minor(0, 1);
        assert_eq!(minor[0][0], 4.0);
        assert_eq!(minor[0][1], 6.0);
        assert_eq!(minor[1][0], 7.0);
        assert_eq!(minor[1][1], 9.0);
    }

    #[test]
    fn determinant_by_cofactor_expansion() {
        let m = Mat3::new([[1.0, 2.0, 3.0], [4.0, 5.0, 6.0], [7.0, 8.0, 10.0]]);
        assert_relative_eq!(m.det(), -3.0, epsilon = 1e-5);
        assert_relative_eq!(Mat4::identity().det(), 1.0);
        // Singular: third row is the sum of the first two.
        let s = Mat3::new([[1.0, 2.0, 3.0], [4.0, 5.0, 6.0], [5.0, 7.0, 9.0]]);
        assert_relative_eq!(s.det(), 0.0, epsilon = 1e-4);
    }

    #[test]
    fn inverse_roundtrip_3x3() {
        let m = Mat3::new([[2.0, 0.0, 1.0], [1.0, 3.0, 2.0], [0.0, 1.0, 4.0]]);
        let inverse = m.try_inverse().unwrap();
        let product = m * inverse;
        for i in 0..3 {
            for j in 0..3 {
                let expected = if i == j { 1.0 } else { 0.0 };
                assert_relative_eq!(product[i][j], expected, epsilon = 1e-5);
            }
        }
    }

    #[test]
    fn inverse_roundtrip_4x4() {
        let m = Mat4::new([
            [1.0, 2.0, 0.0, 1.0],
            [0.0, 1.0, 3.0, 0.0],
            [2.0, 0.0, 1.0, 4.0],
            [0.0, 5.0, 0.0, 1.0],
        ]);
        let inverse = m.try_inverse().unwrap();
        assert_mat4_eq(m * inverse, Mat4::identity());
        assert_mat4_eq(inverse * m, Mat4::identity());
    }

    #[test]
    fn inverse_transpose_is_transposed_inverse() {
        let m = Mat4::new([
            [0.0, -1.0, 0.0, 2.0],
            [1.0, 0.0, 0.0, -1.0],
            [0.0, 0.0, 1.0, 3.0],
            [0.0, 0.0, 0.0, 1.0],
        ]);
        let a = m.try_inverse_transpose().unwrap();
        let b = m.try_inverse().unwrap().transpose();
        assert_mat4_eq(a, b);
    }

    #[test]
    fn singular_matrix_has_no_inverse() {
        let m = Mat3::new([[1.0, 2.0, 3.0], [2.0, 4.0, 6.0], [0.0, 1.0, 0.0]]);
        assert!(m.try_inverse().is_none());
        assert!(m.try_inverse_transpose().is_none());
    }

    #[test]
    fn matrix_vector_product() {
        let m = Mat3::new([[1.0, 0.0, 0.0], [0.0, 2.0, 0.0], [0.0, 0.0, 3.0]]);
        let v = m * vec3(1.0, 1.0, 1.0);
        assert_eq!(v, vec3(1.0, 2.0, 3.0));
    }

    #[test]
    fn transpose_swaps_rows_and_columns() {
        let m = Matrix::<2, 3>::new([[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]]);
        let t = m.transpose();
        assert_eq!(t[0][1], 4.0);
        assert_eq!(t[2][0], 3.0);
    }

    #[test]
    fn homogenous_point_roundtrip() {
        let p = vec3(1.0, -2.0, 0.5);
        let hom = to_hom_point(p);
        assert_eq!(hom.w(), 1.0);
        assert_eq!(from_hom_point(hom), p);
        // The divide actually divides.
        assert_eq!(from_hom_point(vec4(2.0, 4.0, 6.0, 2.0)), vec3(1.0, 2.0, 3.0));
        assert_eq!(to_hom_vector(p).w(), 0.0);
    }
}
