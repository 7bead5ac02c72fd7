//! Row-major 3×3 rotation and 6×6 state-transformation matrices.
//!
//! A state transform maps `(r, v)` between two frames whose relative
//! orientation changes with time:
//!
//! ```text
//! | R     0 |
//! | dR/dt R |
//! ```
//!
//! so that `v' = R v + (dR/dt) r`. Applying only `R` to a velocity drops the
//! transport term of the rotating frame.

use crate::vector::Vector3;

pub type Matrix3 = [[f64; 3]; 3];
pub type Matrix6 = [[f64; 6]; 6];

pub const IDENTITY3: Matrix3 = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];

/// Build a matrix whose columns are `c0`, `c1`, `c2`.
pub fn from_columns(c0: &Vector3, c1: &Vector3, c2: &Vector3) -> Matrix3 {
    [
        [c0[0], c1[0], c2[0]],
        [c0[1], c1[1], c2[1]],
        [c0[2], c1[2], c2[2]],
    ]
}

pub fn transpose(m: &Matrix3) -> Matrix3 {
    let mut out = [[0.0; 3]; 3];
    for (i, row) in m.iter().enumerate() {
        for (j, value) in row.iter().enumerate() {
            out[j][i] = *value;
        }
    }
    out
}

/// Matrix-vector product `m · v`.
pub fn mul_vec(m: &Matrix3, v: &Vector3) -> Vector3 {
    [
        m[0][0] * v[0] + m[0][1] * v[1] + m[0][2] * v[2],
        m[1][0] * v[0] + m[1][1] * v[1] + m[1][2] * v[2],
        m[2][0] * v[0] + m[2][1] * v[1] + m[2][2] * v[2],
    ]
}

/// Matrix product `a · b`.
pub fn mul(a: &Matrix3, b: &Matrix3) -> Matrix3 {
    let mut out = [[0.0; 3]; 3];
    for i in 0..3 {
        for j in 0..3 {
            out[i][j] = a[i][0] * b[0][j] + a[i][1] * b[1][j] + a[i][2] * b[2][j];
        }
    }
    out
}

/// Rotation of a vector by `angle` radians about +X (active form).
pub fn rot_x(angle: f64) -> Matrix3 {
    let (s, c) = angle.sin_cos();
    [[1.0, 0.0, 0.0], [0.0, c, -s], [0.0, s, c]]
}

/// Rotation of a vector by `angle` radians about +Z (active form).
pub fn rot_z(angle: f64) -> Matrix3 {
    let (s, c) = angle.sin_cos();
    [[c, -s, 0.0], [s, c, 0.0], [0.0, 0.0, 1.0]]
}

/// Time derivative of [`rot_z`] for an angle advancing at `rate` rad/s.
pub fn rot_z_rate(angle: f64, rate: f64) -> Matrix3 {
    let (s, c) = angle.sin_cos();
    [[-s * rate, -c * rate, 0.0], [c * rate, -s * rate, 0.0], [0.0, 0.0, 0.0]]
}

/// Assemble a state transform from its rotation and rotation-rate blocks.
pub fn state_transform(rotation: &Matrix3, rate: &Matrix3) -> Matrix6 {
    let mut out = [[0.0; 6]; 6];
    for i in 0..3 {
        for j in 0..3 {
            out[i][j] = rotation[i][j];
            out[i + 3][j + 3] = rotation[i][j];
            out[i + 3][j] = rate[i][j];
        }
    }
    out
}

/// Upper-left rotation block of a state transform.
pub fn rotation_block(m: &Matrix6) -> Matrix3 {
    let mut out = [[0.0; 3]; 3];
    for i in 0..3 {
        for j in 0..3 {
            out[i][j] = m[i][j];
        }
    }
    out
}

/// Lower-left rotation-rate block of a state transform.
pub fn rate_block(m: &Matrix6) -> Matrix3 {
    let mut out = [[0.0; 3]; 3];
    for i in 0..3 {
        for j in 0..3 {
            out[i][j] = m[i + 3][j];
        }
    }
    out
}

/// Apply a state transform to a position/velocity pair.
pub fn apply_state(m: &Matrix6, position: &Vector3, velocity: &Vector3) -> (Vector3, Vector3) {
    let state = [
        position[0],
        position[1],
        position[2],
        velocity[0],
        velocity[1],
        velocity[2],
    ];
    let mut out = [0.0; 6];
    for (i, row) in m.iter().enumerate() {
        out[i] = row.iter().zip(state.iter()).map(|(a, b)| a * b).sum();
    }
    ([out[0], out[1], out[2]], [out[3], out[4], out[5]])
}

/// Product of two state transforms, `a · b`.
pub fn mul6(a: &Matrix6, b: &Matrix6) -> Matrix6 {
    let mut out = [[0.0; 6]; 6];
    for i in 0..6 {
        for j in 0..6 {
            out[i][j] = (0..6).map(|k| a[i][k] * b[k][j]).sum();
        }
    }
    out
}

/// Inverse of a state transform built from an orthonormal rotation.
pub fn invert_state_transform(m: &Matrix6) -> Matrix6 {
    let rotation_t = transpose(&rotation_block(m));
    let rate_t = transpose(&rate_block(m));
    state_transform(&rotation_t, &rate_t)
}
