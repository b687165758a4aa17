//! End-to-end pipeline tests: culling silence, degenerate safety, depth
//! ordering, shadow classification, projection round trips, lighting
//! saturation and attenuation behavior.

use flint_engine::math::fixed::{from_int, to_fixed, FP_ONE};
use flint_engine::math::screenport;
use flint_engine::{
    color, Camera, Face, FaceCull, FixedVec3, FlatRasterizer, Frustum, Light, LightType,
    Material, Mesh, Model, ProjectionType, Renderer, Scene, Vertex,
};

fn ported_frustum() -> Frustum {
    let mut frustum = Frustum::default();
    frustum.port_to(320, 240);
    frustum
}

fn v(x: i32, y: i32, z: i32) -> FixedVec3 {
    FixedVec3::new(x, y, z)
}

#[test]
fn fully_outside_triangle_invokes_no_fragments() {
    let mut rasterizer = FlatRasterizer::new();
    rasterizer.set_face_cull(FaceCull::None);
    let frustum = ported_frustum();
    let z = FP_ONE / 2;
    let mut fragments = 0;
    // outside on each axis/side in turn
    let cases = [
        [v(-60, 10, z), v(-10, 20, z), v(-30, 70, z)],
        [v(340, 10, z), v(390, 20, z), v(360, 70, z)],
        [v(10, -50, z), v(60, -40, z), v(30, -5, z)],
        [v(10, 245, z), v(60, 250, z), v(30, 290, z)],
        [v(10, 10, -z), v(60, 20, -z), v(30, 70, -z)],
    ];
    for locations in cases {
        rasterizer.draw(locations, &frustum, |_| fragments += 1);
    }
    assert_eq!(fragments, 0);
}

#[test]
fn degenerate_triangles_terminate_safely() {
    let mut rasterizer = FlatRasterizer::new();
    rasterizer.set_face_cull(FaceCull::None);
    let frustum = ported_frustum();
    let z = FP_ONE / 2;
    let degenerates = [
        [v(10, 10, z), v(10, 10, z), v(10, 10, z)],
        [v(10, 10, z), v(40, 10, z), v(25, 10, z)],
        [v(10, 10, z), v(10, 40, z), v(10, 25, z)],
    ];
    for locations in degenerates {
        rasterizer.draw(locations, &frustum, |fragment| {
            assert!(fragment.x >= 0 && fragment.x < 320);
            assert!(fragment.y >= 0 && fragment.y < 240);
        });
    }
}

fn directional_light(name: &str, shadow: bool) -> Light {
    let mut light = Light::new(name);
    light.set_light_type(LightType::Directional);
    light
        .transform
        .set_location(FixedVec3::from_floats(0.0, 0.0, 8.0));
    light.has_shadow = shadow;
    light
}

fn facing_triangle(z: f32, material: Material) -> Model {
    let normal = FixedVec3::new(0, 0, FP_ONE);
    let positions = [(-1.5, -1.5, z), (1.5, -1.5, z), (0.0, 1.5, z)];
    let vertices = positions
        .iter()
        .enumerate()
        .map(|(i, &(x, y, z))| Vertex::new(i, FixedVec3::from_floats(x, y, z), normal, 0))
        .collect();
    let faces = vec![Face::new(0, 1, 2, 0).with_normal(normal)];
    Model::new("tri", Mesh::new(vertices, faces), vec![material])
}

fn head_on_camera() -> Camera {
    let mut camera = Camera::new(ProjectionType::Perspective);
    camera
        .transform
        .set_location(FixedVec3::from_floats(0.0, 0.0, 5.0));
    camera
}

#[test]
fn nearer_triangle_wins_every_covered_pixel() {
    let mut scene = Scene::new(head_on_camera());
    let near_material = Material::new("near").with_color(color::pack(250, 10, 10));
    let far_material = Material::new("far").with_color(color::pack(10, 240, 10));
    scene.add_model(facing_triangle(1.0, near_material));
    scene.add_model(facing_triangle(-1.0, far_material));
    scene.add_light(directional_light("sun", false));

    let mut renderer = Renderer::new(160, 120);
    renderer.render(&mut scene);

    // wherever both triangles cover, red (nearer) must have won; green can
    // only appear where red does not reach
    let buffer = &renderer.frame_buffer.color_buffer;
    let center = buffer.get_pixel(80, 60);
    assert!(color::red(center) > 100);
    assert!(color::green(center) < 100);
}

#[test]
fn saturated_directional_light_reproduces_material_color() {
    // intensity one, dot(N,L) = 1, diffuse one, specular zero: the light
    // factor saturates and the pixel shows the unshaded material color
    let mut material = Material::new("plain").with_color(color::pack(200, 100, 50));
    material.specular_intensity = 0;
    let mut scene = Scene::new(head_on_camera());
    scene.add_model(facing_triangle(0.0, material));
    scene.add_light(directional_light("sun", false));

    let mut renderer = Renderer::new(160, 120);
    renderer.render(&mut scene);
    let center = renderer.frame_buffer.color_buffer.get_pixel(80, 60);
    assert!((color::red(center) - 200).abs() <= 2);
    assert!((color::green(center) - 100).abs() <= 2);
    assert!((color::blue(center) - 50).abs() <= 2);
}

#[test]
fn view_matrix_round_trips_camera_location() {
    let mut camera = Camera::new(ProjectionType::Perspective);
    camera
        .transform
        .set_location(FixedVec3::from_floats(3.0, -1.0, 7.0));
    camera
        .transform
        .set_rotation(FixedVec3::new(from_int(20), from_int(-40), 0));
    let origin = camera.view_matrix().multiply_point(camera.transform.location());
    assert!(origin.x.abs() < 16);
    assert!(origin.y.abs() < 16);
    assert!(origin.z.abs() < 16);
}

#[test]
fn optical_axis_point_lands_at_render_target_center() {
    let mut camera = Camera::new(ProjectionType::Perspective);
    camera.frustum.port_to(320, 240);
    // on the optical axis at the near plane, for a symmetric frustum
    let near_point = FixedVec3::new(0, 0, -camera.frustum.near);
    let viewed = camera.view_matrix().multiply_point(near_point);
    let projected = camera.projection_matrix().multiply_point(viewed);
    let screen = screenport(projected, &camera.frustum);
    assert_eq!(screen.x, 160);
    assert_eq!(screen.y, 120);
}

#[test]
fn point_light_attenuation_never_increases_with_distance() {
    // render the same head-on triangle with the point light stepped away;
    // center brightness must be non-increasing
    let mut previous = i32::MAX;
    for step in 1..6 {
        let mut material = Material::new("plain").with_color(color::pack(255, 255, 255));
        material.specular_intensity = 0;
        let mut scene = Scene::new(head_on_camera());
        scene.add_model(facing_triangle(0.0, material));
        let mut lamp = Light::new("lamp");
        lamp.set_light_type(LightType::Point);
        lamp.transform
            .set_location(FixedVec3::from_floats(0.0, 0.0, step as f32 * 3.0));
        lamp.has_shadow = false;
        scene.add_light(lamp);

        let mut renderer = Renderer::new(160, 120);
        renderer.render(&mut scene);
        let center = renderer.frame_buffer.color_buffer.get_pixel(80, 60);
        let brightness = color::red(center) + color::green(center) + color::blue(center);
        assert!(brightness <= previous);
        previous = brightness;
    }
}

#[test]
fn shadowed_fragments_blend_toward_shadow_color() {
    // ground plane below an occluder, sun shining straight down; rendering
    // with and without shadows must differ, and the shadowed pixels must
    // take on the sun's red shadow color
    fn build_scene(with_shadow: bool) -> Scene {
        let mut camera = Camera::new(ProjectionType::Perspective);
        camera
            .transform
            .set_location(FixedVec3::from_floats(0.0, 6.0, 14.0));
        camera
            .transform
            .set_rotation(FixedVec3::new(from_int(-20), 0, 0));
        let mut scene = Scene::new(camera);

        let mut sun = Light::new("sun");
        sun.set_light_type(LightType::Directional);
        sun.transform
            .set_location(FixedVec3::from_floats(0.0, 8.0, 0.0));
        sun.transform
            .set_rotation(FixedVec3::new(from_int(-90), 0, 0));
        sun.shadow_color = color::pack(200, 0, 0);
        sun.has_shadow = with_shadow;
        sun.is_main = true;
        scene.add_light(sun);

        // fill light keeps shadowed pixels from going fully black
        let mut fill = Light::new("fill");
        fill.set_light_type(LightType::Directional);
        fill.transform
            .set_location(FixedVec3::from_floats(0.0, 4.0, 10.0));
        fill.transform
            .set_rotation(FixedVec3::new(from_int(-45), 0, 0));
        fill.intensity = to_fixed(0.4);
        fill.has_shadow = false;
        scene.add_light(fill);

        // ground quad on the XZ axes, facing up; small enough that its
        // screen bounding box stays under the size guard
        let up = FixedVec3::new(0, FP_ONE, 0);
        let e = 4.0;
        let corners = [[-e, 0.0, e], [e, 0.0, e], [e, 0.0, -e], [-e, 0.0, -e]];
        let vertices: Vec<Vertex> = corners
            .iter()
            .enumerate()
            .map(|(i, c)| Vertex::new(i, FixedVec3::from_floats(c[0], c[1], c[2]), up, 0))
            .collect();
        let faces = vec![
            Face::new(0, 1, 2, 0).with_normal(up),
            Face::new(0, 2, 3, 0).with_normal(up),
        ];
        let ground_material = Material::new("ground").with_color(color::pack(220, 220, 220));
        scene.add_model(Model::new(
            "ground",
            Mesh::new(vertices, faces),
            vec![ground_material],
        ));

        // occluder above the ground center, wound to present its back to
        // the light so the depth pass keeps it
        let o = 1.5;
        let occluder_corners = [[-o, 2.0, o], [o, 2.0, o], [o, 2.0, -o], [-o, 2.0, -o]];
        let occluder_vertices: Vec<Vertex> = occluder_corners
            .iter()
            .enumerate()
            .map(|(i, c)| Vertex::new(i, FixedVec3::from_floats(c[0], c[1], c[2]), up, 0))
            .collect();
        let occluder_faces = vec![
            Face::new(2, 1, 0, 0).with_normal(up),
            Face::new(3, 2, 0, 0).with_normal(up),
        ];
        let occluder_material = Material::new("occluder").with_color(color::pack(220, 220, 220));
        scene.add_model(Model::new(
            "occluder",
            Mesh::new(occluder_vertices, occluder_faces),
            vec![occluder_material],
        ));
        scene
    }

    let mut lit_scene = build_scene(false);
    let mut shadow_scene = build_scene(true);
    let mut lit_renderer = Renderer::new(160, 120);
    let mut shadow_renderer = Renderer::new(160, 120);
    lit_renderer.render(&mut lit_scene);
    shadow_renderer.render(&mut shadow_scene);

    let mut darkened = 0;
    let mut reddened = 0;
    for y in 0..120 {
        for x in 0..160 {
            let lit = lit_renderer.frame_buffer.color_buffer.get_pixel(x, y);
            let shadowed = shadow_renderer.frame_buffer.color_buffer.get_pixel(x, y);
            let lit_sum = color::red(lit) + color::green(lit) + color::blue(lit);
            let shadow_sum =
                color::red(shadowed) + color::green(shadowed) + color::blue(shadowed);
            if shadow_sum + 30 < lit_sum {
                darkened += 1;
            }
            if color::red(shadowed) > color::green(shadowed) + 10 {
                reddened += 1;
            }
        }
    }
    assert!(darkened > 0, "no pixels darkened by the shadow pass");
    assert!(reddened > 0, "no pixels took on the shadow color");
}
