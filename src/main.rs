//! Flint Engine demo: renders a small scene headlessly and writes a PNG
//!
//! Usage:
//!   flint-engine [scene.ron] [output.png]
//!
//! Without arguments a built-in scene is rendered: a textured cube above a
//! ground plane, lit by a shadow-casting directional light plus a spot and
//! a point light.

use std::env;
use std::process;

use log::info;

use flint_engine::math::fixed::{from_int, to_fixed};
use flint_engine::{
    color, load_scene, Camera, Face, FixedVec3, FrameBuffer, Light, LightType, Material, Mesh,
    Model, ProjectionType, Renderer, Scene, Texture, Vertex, HEIGHT, WIDTH,
};

fn main() {
    env_logger::init();
    let args: Vec<String> = env::args().collect();

    let mut scene = if args.len() > 1 {
        match load_scene(&args[1]) {
            Ok(scene) => scene,
            Err(error) => {
                eprintln!("Failed to load scene {}: {}", args[1], error);
                process::exit(1);
            }
        }
    } else {
        build_demo_scene()
    };
    let output = args.get(2).map(String::as_str).unwrap_or("out.png");

    let mut renderer = Renderer::new(WIDTH, HEIGHT);
    renderer.render(&mut scene);
    info!("rendered {}x{} frame", WIDTH, HEIGHT);

    if let Err(error) = save_png(&renderer.frame_buffer, output) {
        eprintln!("Failed to write {}: {}", output, error);
        process::exit(1);
    }
    println!("Wrote {}", output);
}

/// Cube above a ground plane, three light types, shadow-casting sun
fn build_demo_scene() -> Scene {
    let mut camera = Camera::new(ProjectionType::Perspective);
    camera
        .transform
        .set_location(FixedVec3::from_floats(0.0, 3.0, 10.0));
    camera
        .transform
        .set_rotation(FixedVec3::new(from_int(-15), 0, 0));
    let mut scene = Scene::new(camera);

    let mut sun = Light::new("sun");
    sun.set_light_type(LightType::Directional);
    sun.transform
        .set_location(FixedVec3::from_floats(0.0, 6.0, 10.0));
    sun.transform
        .set_rotation(FixedVec3::new(from_int(-25), 0, 0));
    sun.is_main = true;
    scene.add_light(sun);

    let mut lamp = Light::new("lamp");
    lamp.set_light_type(LightType::Point);
    lamp.transform
        .set_location(FixedVec3::from_floats(3.0, 2.0, 2.0));
    lamp.color = color::pack(255, 220, 160);
    lamp.has_shadow = false;
    scene.add_light(lamp);

    let mut beam = Light::new("beam");
    beam.set_light_type(LightType::Spot);
    beam.transform
        .set_location(FixedVec3::from_floats(-2.0, 4.0, 4.0));
    beam.transform
        .set_rotation(FixedVec3::new(from_int(-30), 0, 0));
    beam.color = color::pack(180, 200, 255);
    scene.add_light(beam);

    let checker = Texture::checkerboard(
        32,
        32,
        color::pack(230, 230, 230),
        color::pack(120, 40, 40),
    );
    let cube_material = Material::new("checker").with_texture(checker);
    let mut cube = Model::new("cube", build_cube_mesh(), vec![cube_material]);
    cube.transform
        .set_location(FixedVec3::from_floats(0.0, 1.0, 0.0));
    cube.transform
        .set_rotation(FixedVec3::new(0, from_int(30), 0));
    scene.add_model(cube);

    // small enough that the ground's screen bounding box stays under the
    // rasterizer's size guard from this camera
    let ground_material = Material::new("ground").with_color(color::pack(90, 110, 90));
    let ground = Model::new("ground", build_ground_mesh(3.5), vec![ground_material]);
    scene.add_model(ground);

    scene
}

/// Unit cube, four vertices and two triangles per side
fn build_cube_mesh() -> Mesh {
    let sides: [([f32; 3], [[f32; 3]; 4]); 6] = [
        // +Z
        (
            [0.0, 0.0, 1.0],
            [
                [-1.0, -1.0, 1.0],
                [1.0, -1.0, 1.0],
                [1.0, 1.0, 1.0],
                [-1.0, 1.0, 1.0],
            ],
        ),
        // -Z
        (
            [0.0, 0.0, -1.0],
            [
                [1.0, -1.0, -1.0],
                [-1.0, -1.0, -1.0],
                [-1.0, 1.0, -1.0],
                [1.0, 1.0, -1.0],
            ],
        ),
        // +X
        (
            [1.0, 0.0, 0.0],
            [
                [1.0, -1.0, 1.0],
                [1.0, -1.0, -1.0],
                [1.0, 1.0, -1.0],
                [1.0, 1.0, 1.0],
            ],
        ),
        // -X
        (
            [-1.0, 0.0, 0.0],
            [
                [-1.0, -1.0, -1.0],
                [-1.0, -1.0, 1.0],
                [-1.0, 1.0, 1.0],
                [-1.0, 1.0, -1.0],
            ],
        ),
        // +Y
        (
            [0.0, 1.0, 0.0],
            [
                [-1.0, 1.0, 1.0],
                [1.0, 1.0, 1.0],
                [1.0, 1.0, -1.0],
                [-1.0, 1.0, -1.0],
            ],
        ),
        // -Y
        (
            [0.0, -1.0, 0.0],
            [
                [-1.0, -1.0, -1.0],
                [1.0, -1.0, -1.0],
                [1.0, -1.0, 1.0],
                [-1.0, -1.0, 1.0],
            ],
        ),
    ];

    let corner_uvs = [
        [to_fixed(0.0), to_fixed(0.0)],
        [to_fixed(1.0), to_fixed(0.0)],
        [to_fixed(1.0), to_fixed(1.0)],
        [to_fixed(0.0), to_fixed(1.0)],
    ];

    let mut vertices = Vec::new();
    let mut faces = Vec::new();
    for (normal, corners) in &sides {
        let base = vertices.len();
        let normal = FixedVec3::from_floats(normal[0], normal[1], normal[2]);
        for corner in corners {
            vertices.push(Vertex::new(
                vertices.len(),
                FixedVec3::from_floats(corner[0], corner[1], corner[2]),
                normal,
                0,
            ));
        }
        faces.push(
            Face::new(base, base + 1, base + 2, 0)
                .with_uvs([corner_uvs[0], corner_uvs[1], corner_uvs[2]])
                .with_normal(normal),
        );
        faces.push(
            Face::new(base, base + 2, base + 3, 0)
                .with_uvs([corner_uvs[0], corner_uvs[2], corner_uvs[3]])
                .with_normal(normal),
        );
    }
    Mesh::new(vertices, faces)
}

/// Square plane on the XZ axes facing up
fn build_ground_mesh(half_extent: f32) -> Mesh {
    let e = half_extent;
    let normal = FixedVec3::from_floats(0.0, 1.0, 0.0);
    let corners = [[-e, 0.0, e], [e, 0.0, e], [e, 0.0, -e], [-e, 0.0, -e]];
    let vertices: Vec<Vertex> = corners
        .iter()
        .enumerate()
        .map(|(i, c)| Vertex::new(i, FixedVec3::from_floats(c[0], c[1], c[2]), normal, 0))
        .collect();
    let faces = vec![
        Face::new(0, 1, 2, 0).with_normal(normal),
        Face::new(0, 2, 3, 0).with_normal(normal),
    ];
    Mesh::new(vertices, faces)
}

/// Write the color buffer as a PNG
fn save_png(frame_buffer: &FrameBuffer, path: &str) -> Result<(), String> {
    let width = frame_buffer.width() as u32;
    let height = frame_buffer.height() as u32;
    let image = image::RgbaImage::from_fn(width, height, |x, y| {
        let pixel = frame_buffer.color_buffer.get_pixel(x as i32, y as i32);
        image::Rgba([
            color::red(pixel) as u8,
            color::green(pixel) as u8,
            color::blue(pixel) as u8,
            255,
        ])
    });
    image.save(path).map_err(|e| e.to_string())
}
