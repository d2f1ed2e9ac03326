use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use image::{Rgb, RgbImage};
use log::warn;
use obj::raw::object::Polygon;
use obj::raw::{parse_obj, RawObj};

use crate::error::RenderError;
use crate::framebuffer::WHITE;
use crate::geometry::{vec2, vec3, Vec2f, Vec3f};

/// Triangle mesh plus the texture maps the shaders sample. Faces are expected
/// to be triangles; lookups are by (face index, vertex index in face).
pub struct Model {
    raw: RawObj,
    diffuse_map: Option<RgbImage>,
    normal_map: Option<RgbImage>,
    specular_map: Option<RgbImage>,
}

impl Model {
    /// Loads `{asset_path}.obj` together with the conventionally named
    /// texture maps next to it. A missing mesh is fatal; missing maps fall
    /// back to flat defaults with a warning.
    pub fn load(asset_path: &str) -> Result<Model, RenderError> {
        let obj_path = format!("{}.obj", asset_path);
        let file = File::open(&obj_path).map_err(|source| RenderError::AssetIo {
            path: obj_path.clone(),
            source,
        })?;
        let raw = parse_obj(BufReader::new(file))?;
        let diffuse_map = Self::load_texture(&format!("{}_diffuse.tga", asset_path))?;
        let normal_map = Self::load_texture(&format!("{}_nm.tga", asset_path))?;
        let specular_map = Self::load_texture(&format!("{}_spec.tga", asset_path))?;
        return Ok(Model::from_raw(raw, diffuse_map, normal_map, specular_map));
    }

    /// Builds a model from an already parsed mesh. Used directly by tests.
    pub fn from_raw(
        raw: RawObj,
        diffuse_map: Option<RgbImage>,
        normal_map: Option<RgbImage>,
        specular_map: Option<RgbImage>,
    ) -> Model {
        return Model {
            raw,
            diffuse_map,
            normal_map,
            specular_map,
        };
    }

    fn load_texture(path: &str) -> Result<Option<RgbImage>, RenderError> {
        if !Path::new(path).exists() {
            warn!("texture `{}` not found, using a flat fallback", path);
            return Ok(None);
        }
        return Ok(Some(image::open(path)?.to_rgb8()));
    }

    pub fn nverts(&self) -> usize {
        return self.raw.positions.len();
    }

    pub fn nfaces(&self) -> usize {
        return self.raw.polygons.len();
    }

    /// (position, uv, normal) indices for the nth vertex of a face. Index
    /// kinds the obj file does not carry come back as None.
    fn indices(&self, face: usize, nth: usize) -> (usize, Option<usize>, Option<usize>) {
        return match &self.raw.polygons[face] {
            Polygon::P(v) => (v[nth], None, None),
            Polygon::PT(v) => (v[nth].0, Some(v[nth].1), None),
            Polygon::PN(v) => (v[nth].0, None, Some(v[nth].1)),
            Polygon::PTN(v) => (v[nth].0, Some(v[nth].1), Some(v[nth].2)),
        };
    }

    /// Object-space position of the nth vertex of a face.
    pub fn vertex(&self, face: usize, nth: usize) -> Vec3f {
        let (position, _, _) = self.indices(face, nth);
        let (x, y, z, _) = self.raw.positions[position];
        return vec3(x, y, z);
    }

    /// Texture coordinate of the nth vertex of a face. V is flipped so the
    /// result indexes straight into top-left-origin texture images.
    pub fn uv(&self, face: usize, nth: usize) -> Vec2f {
        let (_, tex, _) = self.indices(face, nth);
        return match tex.and_then(|i| self.raw.tex_coords.get(i)) {
            Some(&(u, v, _)) => vec2(u, 1.0 - v),
            None => vec2(0.0, 0.0),
        };
    }

    /// Normal of the nth vertex of a face; the face normal when the mesh
    /// carries no normals.
    pub fn normal(&self, face: usize, nth: usize) -> Vec3f {
        let (_, _, normal) = self.indices(face, nth);
        if let Some(&(x, y, z)) = normal.and_then(|i| self.raw.normals.get(i)) {
            return vec3(x, y, z).normalized();
        }
        let a = self.vertex(face, 0);
        let b = self.vertex(face, 1);
        let c = self.vertex(face, 2);
        return (b - a).cross(c - a).normalized();
    }

    /// Diffuse texture sample; white without a map.
    pub fn diffuse(&self, uv: Vec2f) -> Rgb<u8> {
        return match &self.diffuse_map {
            Some(map) => sample(map, uv),
            None => WHITE,
        };
    }

    /// Tangent-free normal map sample, rgb8 mapped back to [-1, 1]; straight
    /// up the z axis without a map.
    pub fn normal_at_uv(&self, uv: Vec2f) -> Vec3f {
        let map = match &self.normal_map {
            Some(map) => map,
            None => return vec3(0.0, 0.0, 1.0),
        };
        let Rgb([r, g, b]) = sample(map, uv);
        return vec3(
            r as f32 / 255.0 * 2.0 - 1.0,
            g as f32 / 255.0 * 2.0 - 1.0,
            b as f32 / 255.0 * 2.0 - 1.0,
        )
        .normalized();
    }

    /// Specular exponent from the red channel of the specular map; a flat
    /// exponent of 1 without a map.
    pub fn specular(&self, uv: Vec2f) -> f32 {
        return match &self.specular_map {
            Some(map) => sample(map, uv).0[0] as f32,
            None => 1.0,
        };
    }
}

/// Nearest-texel lookup, clamped to the map extents.
fn sample(map: &RgbImage, uv: Vec2f) -> Rgb<u8> {
    let x = ((uv.x() * map.width() as f32) as u32).min(map.width() - 1);
    let y = ((uv.y() * map.height() as f32) as u32).min(map.height() - 1);
    return *map.get_pixel(x, y);
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use approx::assert_relative_eq;

    // Unit quad in the XY plane, two counter-clockwise triangles.
    pub const QUAD_OBJ: &str = "\
v -1.0 -1.0 0.0
v 1.0 -1.0 0.0
v 1.0 1.0 0.0
v -1.0 1.0 0.0
vt 0.0 0.0 0.0
vt 1.0 0.0 0.0
vt 1.0 1.0 0.0
vt 0.0 1.0 0.0
vn 0.0 0.0 1.0
f 1/1/1 2/2/1 3/3/1
f 1/1/1 3/3/1 4/4/1
";

    pub fn quad_model() -> Model {
        let raw = parse_obj(QUAD_OBJ.as_bytes()).unwrap();
        return Model::from_raw(raw, None, None, None);
    }

    #[test]
    fn counts_and_vertex_lookup() {
        let model = quad_model();
        assert_eq!(model.nverts(), 4);
        assert_eq!(model.nfaces(), 2);
        assert_eq!(model.vertex(0, 0), vec3(-1.0, -1.0, 0.0));
        assert_eq!(model.vertex(1, 2), vec3(-1.0, 1.0, 0.0));
    }

    #[test]
    fn uv_lookup_flips_v() {
        let model = quad_model();
        let uv = model.uv(0, 2); // vt 1.0 1.0
        assert_relative_eq!(uv.x(), 1.0);
        assert_relative_eq!(uv.y(), 0.0);
    }

    #[test]
    fn normal_lookup() {
        let model = quad_model();
        let n = model.normal(0, 0);
        assert_relative_eq!(n.z(), 1.0, epsilon = 1e-6);
    }

    #[test]
    fn face_normal_fallback_without_vn() {
        let obj = "\
v 0.0 0.0 0.0
v 1.0 0.0 0.0
v 0.0 1.0 0.0
f 1 2 3
";
        let raw = parse_obj(obj.as_bytes()).unwrap();
        let model = Model::from_raw(raw, None, None, None);
        let n = model.normal(0, 1);
        assert_relative_eq!(n.z(), 1.0, epsilon = 1e-6);
    }

    #[test]
    fn texture_fallbacks() {
        let model = quad_model();
        assert_eq!(model.diffuse(vec2(0.3, 0.7)), WHITE);
        assert_eq!(model.normal_at_uv(vec2(0.3, 0.7)), vec3(0.0, 0.0, 1.0));
        assert_relative_eq!(model.specular(vec2(0.3, 0.7)), 1.0);
    }

    #[test]
    fn sampling_clamps_to_map_extents() {
        let mut map = RgbImage::new(2, 2);
        map.put_pixel(1, 1, Rgb([9, 9, 9]));
        let model = Model::from_raw(
            parse_obj(QUAD_OBJ.as_bytes()).unwrap(),
            Some(map),
            None,
            None,
        );
        // uv = (1, 1) lands exactly on the width/height edge and must clamp.
        assert_eq!(model.diffuse(vec2(1.0, 1.0)), Rgb([9, 9, 9]));
    }
}
