//! Per-frame shared shader state and shadow-pass setup
//!
//! `setup` runs once per frame before any shader stage. It snapshots the
//! camera matrices and, for each light type independently, either selects
//! the shadow-casting light and builds its light-space matrices and cleared
//! shadow maps, or marks that type inactive so the lit pass skips it.

use log::debug;

use super::LIGHT_RANGE;
use crate::math::fixed::{self, FP_ONE};
use crate::math::{FixedMat4, FixedVec3};
use crate::model::{Camera, Frustum, Light, LightType, Texture};

const DIRECTIONAL_MAP_SIZE: usize = 128;
const SPOT_MAP_SIZE: usize = 64;
const POINT_MAP_SIZE: usize = 64;

/// Fixed light-space near/far planes; light frusta are constants per light
/// type, not derived from the scene
const LIGHT_NEAR: i32 = FP_ONE / 10;
const LIGHT_FAR: i32 = FP_ONE * 100;

#[derive(Debug, Clone)]
pub struct ShaderBuffer {
    // camera snapshot
    pub view_matrix: FixedMat4,
    pub projection_matrix: FixedMat4,
    pub camera_frustum: Frustum,
    pub camera_location: FixedVec3,
    // directional shadow state
    pub directional_index: Option<usize>,
    pub directional_matrix: FixedMat4,
    pub directional_frustum: Frustum,
    pub directional_shadow_map: Texture,
    // spot shadow state
    pub spot_index: Option<usize>,
    pub spot_matrix: FixedMat4,
    pub spot_frustum: Frustum,
    pub spot_shadow_map: Texture,
    // point shadow state, one entry per cube face
    pub point_index: Option<usize>,
    pub point_matrices: [FixedMat4; 6],
    pub point_frustum: Frustum,
    pub point_shadow_maps: [Texture; 6],
}

impl ShaderBuffer {
    pub fn new() -> Self {
        let mut directional_frustum = Frustum::new(LIGHT_NEAR, LIGHT_FAR);
        directional_frustum.port_to(DIRECTIONAL_MAP_SIZE, DIRECTIONAL_MAP_SIZE);
        let mut spot_frustum = Frustum::new(LIGHT_NEAR, LIGHT_FAR);
        spot_frustum.port_to(SPOT_MAP_SIZE, SPOT_MAP_SIZE);
        let mut point_frustum = Frustum::new(LIGHT_NEAR, LIGHT_FAR);
        point_frustum.port_to(POINT_MAP_SIZE, POINT_MAP_SIZE);
        Self {
            view_matrix: FixedMat4::IDENTITY,
            projection_matrix: FixedMat4::IDENTITY,
            camera_frustum: Frustum::default(),
            camera_location: FixedVec3::ZERO,
            directional_index: None,
            directional_matrix: FixedMat4::IDENTITY,
            directional_frustum,
            directional_shadow_map: Texture::new(DIRECTIONAL_MAP_SIZE, DIRECTIONAL_MAP_SIZE),
            spot_index: None,
            spot_matrix: FixedMat4::IDENTITY,
            spot_frustum,
            spot_shadow_map: Texture::new(SPOT_MAP_SIZE, SPOT_MAP_SIZE),
            point_index: None,
            point_matrices: [FixedMat4::IDENTITY; 6],
            point_frustum,
            point_shadow_maps: std::array::from_fn(|_| {
                Texture::new(POINT_MAP_SIZE, POINT_MAP_SIZE)
            }),
        }
    }

    /// Refresh the per-frame state. Light transforms are borrowed mutably
    /// because building the point-light cube faces rotates the selected
    /// light's transform through 90-degree steps (and restores it).
    pub fn setup(&mut self, camera: &Camera, lights: &mut [Light], width: usize, height: usize) {
        for light in lights.iter_mut() {
            light.refresh_direction();
        }
        self.camera_location = camera.transform.location();
        self.view_matrix = camera.view_matrix();
        self.camera_frustum = camera.frustum;
        self.camera_frustum.port_to(width, height);
        self.projection_matrix = match camera.projection {
            crate::model::ProjectionType::Orthographic => {
                FixedMat4::orthographic(&self.camera_frustum)
            }
            crate::model::ProjectionType::Perspective => {
                FixedMat4::perspective(&self.camera_frustum)
            }
        };

        self.directional_setup(lights);
        self.spot_setup(lights);
        self.point_setup(lights);
    }

    fn directional_setup(&mut self, lights: &[Light]) {
        self.directional_index = select_light(lights, LightType::Directional, self.camera_location);
        debug!("directional shadow caster: {:?}", self.directional_index);
        let Some(index) = self.directional_index else {
            return;
        };
        self.directional_shadow_map.fill(i32::MAX);
        let projection = FixedMat4::orthographic(&self.directional_frustum);
        let view = lights[index].transform.view_matrix();
        self.directional_matrix = FixedMat4::multiply(&projection, &view);
    }

    fn spot_setup(&mut self, lights: &[Light]) {
        self.spot_index = select_light(lights, LightType::Spot, self.camera_location);
        debug!("spot shadow caster: {:?}", self.spot_index);
        let Some(index) = self.spot_index else {
            return;
        };
        self.spot_shadow_map.fill(i32::MAX);
        let projection = FixedMat4::perspective(&self.spot_frustum);
        let view = lights[index].transform.view_matrix();
        self.spot_matrix = FixedMat4::multiply(&projection, &view);
    }

    /// Six perspective views covering all directions, built by rotating the
    /// light's transform in 90-degree steps and restoring its orientation
    fn point_setup(&mut self, lights: &mut [Light]) {
        self.point_index = select_light(lights, LightType::Point, self.camera_location);
        debug!("point shadow caster: {:?}", self.point_index);
        let Some(index) = self.point_index else {
            return;
        };
        for map in &mut self.point_shadow_maps {
            map.fill(i32::MAX);
        }
        let projection = FixedMat4::perspective(&self.point_frustum);
        let quarter = fixed::from_int(90);
        let transform = &mut lights[index].transform;

        self.point_matrices[0] = FixedMat4::multiply(&projection, &transform.view_matrix());
        transform.rotate(FixedVec3::new(0, 0, quarter));
        self.point_matrices[1] = FixedMat4::multiply(&projection, &transform.view_matrix());
        transform.rotate(FixedVec3::new(0, 0, quarter));
        self.point_matrices[2] = FixedMat4::multiply(&projection, &transform.view_matrix());
        transform.rotate(FixedVec3::new(0, 0, quarter));
        self.point_matrices[3] = FixedMat4::multiply(&projection, &transform.view_matrix());
        transform.rotate(FixedVec3::new(0, 0, -3 * quarter));
        transform.rotate(FixedVec3::new(quarter, 0, 0));
        self.point_matrices[4] = FixedMat4::multiply(&projection, &transform.view_matrix());
        transform.rotate(FixedVec3::new(-2 * quarter, 0, 0));
        self.point_matrices[5] = FixedMat4::multiply(&projection, &transform.view_matrix());
        transform.rotate(FixedVec3::new(quarter, 0, 0));
    }
}

impl Default for ShaderBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// Pick the shadow-casting light of one type: a light flagged as main wins
/// outright, otherwise the nearest shadow-enabled light within range; ties
/// break to the first found. `None` marks the type inactive for the frame.
fn select_light(
    lights: &[Light],
    light_type: LightType,
    camera_location: FixedVec3,
) -> Option<usize> {
    let mut selected = None;
    let mut nearest = i32::MAX;
    for (index, light) in lights.iter().enumerate() {
        if light.light_type() != light_type || !light.has_shadow {
            continue;
        }
        if light.is_main {
            return Some(index);
        }
        let distance = camera_location.distance(light.transform.location());
        if distance < nearest && distance < LIGHT_RANGE {
            nearest = distance;
            selected = Some(index);
        }
    }
    selected
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ProjectionType;

    fn light_at(name: &str, light_type: LightType, z: f32) -> Light {
        let mut light = Light::new(name);
        light.set_light_type(light_type);
        light
            .transform
            .set_location(FixedVec3::from_floats(0.0, 0.0, z));
        light
    }

    #[test]
    fn test_no_light_leaves_type_inactive() {
        let mut buffer = ShaderBuffer::new();
        let camera = Camera::new(ProjectionType::Perspective);
        let mut lights = vec![light_at("spot", LightType::Spot, 5.0)];
        buffer.setup(&camera, &mut lights, 320, 240);
        assert!(buffer.directional_index.is_none());
        assert!(buffer.point_index.is_none());
        assert!(buffer.spot_index.is_some());
    }

    #[test]
    fn test_nearest_light_wins() {
        let mut buffer = ShaderBuffer::new();
        let camera = Camera::new(ProjectionType::Perspective);
        let mut lights = vec![
            light_at("far", LightType::Directional, 50.0),
            light_at("near", LightType::Directional, 5.0),
        ];
        buffer.setup(&camera, &mut lights, 320, 240);
        assert_eq!(buffer.directional_index, Some(1));
    }

    #[test]
    fn test_main_flag_overrides_distance() {
        let mut buffer = ShaderBuffer::new();
        let camera = Camera::new(ProjectionType::Perspective);
        let mut lights = vec![
            light_at("far", LightType::Directional, 50.0),
            light_at("near", LightType::Directional, 5.0),
        ];
        lights[0].is_main = true;
        buffer.setup(&camera, &mut lights, 320, 240);
        assert_eq!(buffer.directional_index, Some(0));
    }

    #[test]
    fn test_shadow_disabled_light_is_skipped() {
        let mut buffer = ShaderBuffer::new();
        let camera = Camera::new(ProjectionType::Perspective);
        let mut lights = vec![light_at("d", LightType::Directional, 5.0)];
        lights[0].has_shadow = false;
        buffer.setup(&camera, &mut lights, 320, 240);
        assert!(buffer.directional_index.is_none());
    }

    #[test]
    fn test_point_setup_restores_rotation() {
        let mut buffer = ShaderBuffer::new();
        let camera = Camera::new(ProjectionType::Perspective);
        let mut lights = vec![light_at("p", LightType::Point, 3.0)];
        let rotation_before = lights[0].transform.rotation();
        buffer.setup(&camera, &mut lights, 320, 240);
        assert_eq!(lights[0].transform.rotation(), rotation_before);
        assert!(buffer.point_index.is_some());
        // six distinct cube-face matrices
        assert_ne!(buffer.point_matrices[0], buffer.point_matrices[1]);
        assert_ne!(buffer.point_matrices[4], buffer.point_matrices[5]);
    }

    #[test]
    fn test_shadow_maps_cleared_on_setup() {
        let mut buffer = ShaderBuffer::new();
        let camera = Camera::new(ProjectionType::Perspective);
        buffer.directional_shadow_map.set_pixel(3, 3, 42);
        let mut lights = vec![light_at("d", LightType::Directional, 5.0)];
        buffer.setup(&camera, &mut lights, 320, 240);
        assert_eq!(buffer.directional_shadow_map.get_pixel(3, 3), i32::MAX);
    }
}
