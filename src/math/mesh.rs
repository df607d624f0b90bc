use crate::error::MeshError;
use crate::math::richmond::{self, U_MAX, U_MIN, V_MAX, V_MIN};

pub const MAX_INDEXABLE_VERTICES: usize = u16::MAX as usize + 1;

/// Grid resolution over `[-2, 2] x [-2, 2]`. Both counts are at least 1 and
/// the resulting vertex and index arrays are addressable.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SurfaceParameters {
    u_steps: u32,
    v_steps: u32,
}

impl SurfaceParameters {
    pub fn new(u_steps: i64, v_steps: i64) -> Result<Self, MeshError> {
        Self::checked(
            validate_steps("u_steps", u_steps)?,
            validate_steps("v_steps", v_steps)?,
        )
    }

    /// Fractions are truncated toward zero; non-finite values are rejected.
    pub fn from_f64(u_steps: f64, v_steps: f64) -> Result<Self, MeshError> {
        Self::checked(
            validate_steps_f64("u_steps", u_steps)?,
            validate_steps_f64("v_steps", v_steps)?,
        )
    }

    fn checked(u_steps: u32, v_steps: u32) -> Result<Self, MeshError> {
        if grid_counts(u_steps, v_steps).is_none() {
            return Err(MeshError::InvalidTessellationParameter {
                axis: "u_steps * v_steps",
                value: u_steps as f64 * v_steps as f64,
            });
        }
        Ok(Self { u_steps, v_steps })
    }

    pub fn u_steps(&self) -> u32 {
        self.u_steps
    }

    pub fn v_steps(&self) -> u32 {
        self.v_steps
    }

    pub fn u_step(&self) -> f64 {
        (U_MAX - U_MIN) / self.u_steps as f64
    }

    pub fn v_step(&self) -> f64 {
        (V_MAX - V_MIN) / self.v_steps as f64
    }

    pub fn vertex_count(&self) -> usize {
        (self.u_steps as usize + 1) * (self.v_steps as usize + 1)
    }

    pub fn index_count(&self) -> usize {
        6 * self.u_steps as usize * self.v_steps as usize
    }
}

// Vertex and index counts, provided both flat arrays fit in an allocation.
fn grid_counts(u_steps: u32, v_steps: u32) -> Option<(usize, usize)> {
    let u = u_steps as usize;
    let v = v_steps as usize;

    let vertices = (u + 1).checked_mul(v + 1)?;
    let indices = u.checked_mul(v)?.checked_mul(6)?;

    let vertex_bytes = vertices.checked_mul(3 * size_of::<f32>())?;
    let index_bytes = indices.checked_mul(size_of::<u16>())?;
    if vertex_bytes > isize::MAX as usize || index_bytes > isize::MAX as usize {
        return None;
    }
    Some((vertices, indices))
}

fn validate_steps(axis: &'static str, value: i64) -> Result<u32, MeshError> {
    if value <= 0 || value > u32::MAX as i64 {
        return Err(MeshError::InvalidTessellationParameter {
            axis,
            value: value as f64,
        });
    }
    Ok(value as u32)
}

fn validate_steps_f64(axis: &'static str, value: f64) -> Result<u32, MeshError> {
    if !value.is_finite() {
        return Err(MeshError::InvalidTessellationParameter { axis, value });
    }
    let truncated = value.trunc();
    if truncated <= 0.0 || truncated > u32::MAX as f64 {
        return Err(MeshError::InvalidTessellationParameter { axis, value });
    }
    Ok(truncated as u32)
}

// Row-major: grid row `i` (v), column `j` (u) lives at `i * (u_steps + 1) + j`.
#[derive(Clone, Debug, PartialEq)]
pub struct TriangleMesh {
    pub vertices: Vec<f32>,
    pub normals: Vec<f32>,
    pub indices: Vec<u16>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SurfaceMesh {
    pub mesh: TriangleMesh,
    pub params: SurfaceParameters,
}

impl SurfaceMesh {
    pub fn vertex_count(&self) -> usize {
        self.mesh.vertices.len() / 3
    }

    pub fn index_count(&self) -> usize {
        self.mesh.indices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.mesh.indices.len() / 3
    }
}

pub fn generate(u_steps: f64, v_steps: f64) -> Result<SurfaceMesh, MeshError> {
    Ok(generate_surface(SurfaceParameters::from_f64(u_steps, v_steps)?))
}

pub fn generate_surface(params: SurfaceParameters) -> SurfaceMesh {
    let u_steps = params.u_steps() as usize;
    let v_steps = params.v_steps() as usize;
    let du = params.u_step();
    let dv = params.v_step();
    let vertex_count = params.vertex_count();

    if vertex_count > MAX_INDEXABLE_VERTICES {
        log::warn!(
            "{}x{} grid has {} vertices; 16-bit indices will wrap",
            u_steps,
            v_steps,
            vertex_count
        );
    }

    let mut vertices = Vec::with_capacity(vertex_count * 3);
    let mut normals = Vec::with_capacity(vertex_count * 3);

    for i in 0..=v_steps {
        for j in 0..=u_steps {
            let u = U_MIN + j as f64 * du;
            let v = V_MIN + i as f64 * dv;

            let s = richmond::sample(u, v, du, dv);

            vertices.push(s.position.x as f32);
            vertices.push(s.position.y as f32);
            vertices.push(s.position.z as f32);

            normals.push(s.normal.x as f32);
            normals.push(s.normal.y as f32);
            normals.push(s.normal.z as f32);
        }
    }

    let row = u_steps + 1;
    let mut indices = Vec::with_capacity(params.index_count());
    for i in 0..v_steps {
        for j in 0..u_steps {
            let idx1 = i * row + j;
            let idx2 = idx1 + 1;
            let idx3 = idx1 + row;
            let idx4 = idx3 + 1;

            indices.push(idx1 as u16);
            indices.push(idx2 as u16);
            indices.push(idx3 as u16);

            indices.push(idx2 as u16);
            indices.push(idx4 as u16);
            indices.push(idx3 as u16);
        }
    }

    log::debug!(
        "generated {}x{} surface: {} vertices, {} indices",
        u_steps,
        v_steps,
        vertex_count,
        indices.len()
    );

    SurfaceMesh {
        mesh: TriangleMesh {
            vertices,
            normals,
            indices,
        },
        params,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn counts_match_grid() {
        for (u, v) in [(1_usize, 1_usize), (1, 7), (3, 2), (50, 50), (13, 4)] {
            let s = generate(u as f64, v as f64).unwrap();
            assert_eq!(s.vertex_count(), (u + 1) * (v + 1));
            assert_eq!(s.mesh.normals.len(), s.mesh.vertices.len());
            assert_eq!(s.index_count(), 6 * u * v);
        }
    }

    #[test]
    fn indices_stay_in_range() {
        for (u, v) in [(1.0, 1.0), (2.0, 9.0), (50.0, 50.0), (200.0, 200.0)] {
            let s = generate(u, v).unwrap();
            let count = s.vertex_count();
            assert!(s.mesh.indices.iter().all(|&i| (i as usize) < count));
        }
    }

    #[test]
    fn normals_are_unit_or_zero() {
        let s = generate(50.0, 50.0).unwrap();
        for n in s.mesh.normals.chunks_exact(3) {
            let len = (n[0] * n[0] + n[1] * n[1] + n[2] * n[2]).sqrt();
            assert!(len == 0.0 || (len - 1.0).abs() < 1e-5, "normal length {len}");
        }
    }

    #[test]
    fn two_by_two_grid() {
        let s = generate(2.0, 2.0).unwrap();
        assert_eq!(s.vertex_count(), 9);
        assert_eq!(s.index_count(), 24);

        let v0 = &s.mesh.vertices[0..3];
        assert_relative_eq!(v0[0], (61.0_f64 / 12.0) as f32);
        assert_relative_eq!(v0[1], (67.0_f64 / 12.0) as f32);
        assert_relative_eq!(v0[2], -4.0);

        // Centre vertex sits exactly on the parametric origin.
        let center = &s.mesh.vertices[12..15];
        assert!(center.iter().all(|c| c.is_finite()));
        assert_eq!(center, &[0.0, 0.0, 0.0]);

        assert_eq!(&s.mesh.indices[0..6], &[0, 1, 3, 1, 4, 3]);
        assert_eq!(&s.mesh.indices[18..24], &[4, 5, 7, 5, 8, 7]);
    }

    #[test]
    fn row_major_layout() {
        let s = generate(4.0, 2.0).unwrap();
        // Row 1, column 3: u = -2 + 3, v = -2 + 2.
        let idx = 5 + 3;
        let p = richmond::position(1.0, 0.0);
        assert_relative_eq!(s.mesh.vertices[idx * 3], p.x as f32);
        assert_relative_eq!(s.mesh.vertices[idx * 3 + 1], p.y as f32);
        assert_relative_eq!(s.mesh.vertices[idx * 3 + 2], p.z as f32);
    }

    #[test]
    fn generation_is_deterministic() {
        assert_eq!(generate(50.0, 50.0).unwrap(), generate(50.0, 50.0).unwrap());
    }

    #[test]
    fn rejects_non_positive_steps() {
        assert_eq!(
            generate(0.0, 10.0).unwrap_err(),
            MeshError::InvalidTessellationParameter {
                axis: "u_steps",
                value: 0.0
            }
        );
        assert!(matches!(
            generate(4.0, -3.0),
            Err(MeshError::InvalidTessellationParameter { axis: "v_steps", .. })
        ));
    }

    #[test]
    fn rejects_non_finite_steps() {
        assert!(generate(f64::NAN, 4.0).is_err());
        assert!(matches!(
            generate(4.0, f64::INFINITY),
            Err(MeshError::InvalidTessellationParameter { axis: "v_steps", .. })
        ));
        assert!(generate(0.5, 4.0).is_err());
    }

    #[test]
    fn fractional_steps_truncate() {
        let s = generate(3.9, 7.0).unwrap();
        assert_eq!((s.params.u_steps(), s.params.v_steps()), (3, 7));
        assert_eq!(s.params, SurfaceParameters::new(3, 7).unwrap());
    }

    #[test]
    fn oversized_grid_is_rejected_not_overflowed() {
        let max = u32::MAX as i64;
        assert!(matches!(
            SurfaceParameters::new(max, max),
            Err(MeshError::InvalidTessellationParameter { axis: "u_steps * v_steps", .. })
        ));
        assert!(generate(u32::MAX as f64, u32::MAX as f64).is_err());
    }

    #[test]
    fn grid_counts_match_accessors() {
        let p = SurfaceParameters::new(200, 200).unwrap();
        assert_eq!(grid_counts(200, 200), Some((p.vertex_count(), p.index_count())));
        assert_eq!(grid_counts(u32::MAX, u32::MAX), None);
    }
}
