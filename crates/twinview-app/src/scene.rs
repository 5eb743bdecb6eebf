//! 3D scene: one camera per viewport, lights, world axes and the markers
//! for the target node and the live tool.

use bevy::camera::visibility::RenderLayers;
use bevy::camera::{ClearColorConfig, Viewport};
use bevy::ecs::hierarchy::ChildSpawnerCommands;
use bevy::prelude::*;
use bevy::window::PrimaryWindow;
use twinview_core::camera::DEFAULT_EYE;
use twinview_core::{MotionSystem, ViewportId, CAMERA_UP};

use crate::app::{FrameSet, OperatorLoop, ViewSettings};

/// Render layer seen only by the sim camera (target handle)
pub const SIM_LAYER: usize = 1;
/// Render layer seen only by the real camera (live tool)
pub const REAL_LAYER: usize = 2;

const WORLD_AXIS_LENGTH: f32 = 300.0;
const WORLD_AXIS_THICKNESS: f32 = 3.0;
const MARKER_AXIS_LENGTH: f32 = 60.0;
const MARKER_AXIS_THICKNESS: f32 = 2.5;

pub struct ScenePlugin;

impl Plugin for ScenePlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, setup_scene)
            .add_systems(
                Update,
                (sync_cameras, sync_target_marker, sync_live_marker).in_set(FrameSet::Sync),
            );
    }
}

/// Bevy camera rendering one of the two viewports
#[derive(Component)]
pub struct ViewportCamera(pub ViewportId);

/// Axis triad following the target node (sim view)
#[derive(Component)]
pub struct TargetMarker;

/// Axis triad following the live tool transform (real view)
#[derive(Component)]
pub struct LiveToolMarker;

/// Unlit red/green/blue materials for X/Y/Z axes
struct AxisMaterials {
    x: Handle<StandardMaterial>,
    y: Handle<StandardMaterial>,
    z: Handle<StandardMaterial>,
}

impl AxisMaterials {
    fn new(materials: &mut Assets<StandardMaterial>) -> Self {
        let unlit = |color: Color| StandardMaterial {
            base_color: color,
            unlit: true,
            ..default()
        };
        Self {
            x: materials.add(unlit(Color::srgb(0.9, 0.2, 0.2))),
            y: materials.add(unlit(Color::srgb(0.2, 0.9, 0.2))),
            z: materials.add(unlit(Color::srgb(0.2, 0.2, 0.9))),
        }
    }
}

fn setup_scene(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    view: Res<ViewSettings>,
) {
    let projection = || {
        Projection::Perspective(PerspectiveProjection {
            fov: view.fov_y,
            near: 1.0,
            far: 50_000.0,
            ..default()
        })
    };

    // Sim camera clears the whole window; the real camera draws over it
    commands.spawn((
        Camera3d::default(),
        Camera {
            order: 0,
            ..default()
        },
        projection(),
        Transform::from_translation(DEFAULT_EYE).looking_at(Vec3::ZERO, CAMERA_UP),
        RenderLayers::from_layers(&[0, SIM_LAYER]),
        ViewportCamera(ViewportId::Sim),
    ));
    commands.spawn((
        Camera3d::default(),
        Camera {
            order: 1,
            clear_color: ClearColorConfig::None,
            ..default()
        },
        projection(),
        Transform::from_translation(DEFAULT_EYE).looking_at(Vec3::ZERO, CAMERA_UP),
        RenderLayers::from_layers(&[0, REAL_LAYER]),
        ViewportCamera(ViewportId::Real),
    ));

    commands.spawn((
        DirectionalLight {
            illuminance: 5000.0,
            shadows_enabled: false,
            ..default()
        },
        Transform::from_xyz(2000.0, 2000.0, 4000.0).looking_at(Vec3::ZERO, CAMERA_UP),
        RenderLayers::from_layers(&[0, SIM_LAYER, REAL_LAYER]),
    ));

    let axis_materials = AxisMaterials::new(&mut materials);

    // World axes, visible in both views
    commands
        .spawn((Transform::default(), Visibility::Visible))
        .with_children(|parent| {
            spawn_axis_triad(
                parent,
                &mut meshes,
                &axis_materials,
                WORLD_AXIS_LENGTH,
                WORLD_AXIS_THICKNESS,
                RenderLayers::layer(0),
            );
        });

    // Ground grid on the X-Y plane
    let grid_material = materials.add(StandardMaterial {
        base_color: Color::srgba(0.4, 0.4, 0.4, 0.5),
        unlit: true,
        alpha_mode: AlphaMode::Blend,
        ..default()
    });
    let grid_size = 10;
    let grid_spacing = 200.0;
    let grid_extent = grid_size as f32 * grid_spacing;
    let line_x = meshes.add(Cuboid::new(grid_extent * 2.0, 1.0, 1.0));
    let line_y = meshes.add(Cuboid::new(1.0, grid_extent * 2.0, 1.0));
    for i in -grid_size..=grid_size {
        let offset = i as f32 * grid_spacing;
        commands.spawn((
            Mesh3d(line_x.clone()),
            MeshMaterial3d(grid_material.clone()),
            Transform::from_xyz(0.0, offset, 0.0),
        ));
        commands.spawn((
            Mesh3d(line_y.clone()),
            MeshMaterial3d(grid_material.clone()),
            Transform::from_xyz(offset, 0.0, 0.0),
        ));
    }

    // Target node and its grab sphere, sim view only
    let handle_material = materials.add(StandardMaterial {
        base_color: Color::srgba(1.0, 0.8, 0.2, 0.6),
        unlit: true,
        alpha_mode: AlphaMode::Blend,
        ..default()
    });
    commands
        .spawn((
            Transform::from_xyz(500.0, 500.0, 500.0),
            Visibility::Visible,
            TargetMarker,
        ))
        .with_children(|parent| {
            parent.spawn((
                Mesh3d(meshes.add(Sphere::new(MARKER_AXIS_THICKNESS * 4.0))),
                MeshMaterial3d(handle_material),
                RenderLayers::layer(SIM_LAYER),
            ));
            spawn_axis_triad(
                parent,
                &mut meshes,
                &axis_materials,
                MARKER_AXIS_LENGTH,
                MARKER_AXIS_THICKNESS,
                RenderLayers::layer(SIM_LAYER),
            );
        });

    // Live tool, real view only; hidden until the motion system reports one
    let live_material = materials.add(StandardMaterial {
        base_color: Color::srgb(0.3, 0.8, 0.8),
        unlit: true,
        ..default()
    });
    commands
        .spawn((Transform::default(), Visibility::Hidden, LiveToolMarker))
        .with_children(|parent| {
            parent.spawn((
                Mesh3d(meshes.add(Sphere::new(MARKER_AXIS_THICKNESS * 4.0))),
                MeshMaterial3d(live_material),
                RenderLayers::layer(REAL_LAYER),
            ));
            spawn_axis_triad(
                parent,
                &mut meshes,
                &axis_materials,
                MARKER_AXIS_LENGTH,
                MARKER_AXIS_THICKNESS,
                RenderLayers::layer(REAL_LAYER),
            );
        });
}

/// Cylinder + cone per axis, Z up. Cylinders are Y-aligned by default.
fn spawn_axis_triad(
    parent: &mut ChildSpawnerCommands,
    meshes: &mut Assets<Mesh>,
    materials: &AxisMaterials,
    length: f32,
    thickness: f32,
    layers: RenderLayers,
) {
    let shaft = meshes.add(Cylinder::new(thickness, length));
    let cone_height = thickness * 4.0;
    let tip = meshes.add(Cone::new(thickness * 2.5, cone_height));

    let axes = [
        (Vec3::X, Quat::from_rotation_z(-std::f32::consts::FRAC_PI_2), &materials.x),
        (Vec3::Y, Quat::IDENTITY, &materials.y),
        (Vec3::Z, Quat::from_rotation_x(std::f32::consts::FRAC_PI_2), &materials.z),
    ];
    for (dir, rotation, material) in axes {
        parent.spawn((
            Mesh3d(shaft.clone()),
            MeshMaterial3d(material.clone()),
            Transform::from_translation(dir * length / 2.0).with_rotation(rotation),
            layers.clone(),
        ));
        parent.spawn((
            Mesh3d(tip.clone()),
            MeshMaterial3d(material.clone()),
            Transform::from_translation(dir * (length + cone_height / 2.0)).with_rotation(rotation),
            layers.clone(),
        ));
    }
}

/// Copy each core camera onto its Bevy camera and fit the viewport rectangle
/// (logical pixels) into the window's physical size.
fn sync_cameras(
    operator: Res<OperatorLoop>,
    windows: Query<&Window, With<PrimaryWindow>>,
    mut cameras: Query<(&ViewportCamera, &mut Camera, &mut Transform)>,
) {
    let Ok(window) = windows.single() else {
        return;
    };
    let scale = window.scale_factor();
    let window_size = UVec2::new(window.physical_width(), window.physical_height());
    let console = operator.console();
    let layout = console.arbitrator.layout();

    for (viewport_camera, mut camera, mut transform) in &mut cameras {
        let id = viewport_camera.0;
        let rig = console.arbitrator.camera(id);
        transform.translation = rig.position;
        transform.rotation = rig.orientation;

        let rect = layout.rect(id);
        let position = (rect.min() * scale).as_uvec2().min(window_size);
        let size = (rect.size() * scale).as_uvec2().min(window_size - position);
        if size.x == 0 || size.y == 0 {
            camera.is_active = false;
            continue;
        }
        camera.is_active = true;
        camera.viewport = Some(Viewport {
            physical_position: position,
            physical_size: size,
            ..default()
        });
    }
}

fn sync_target_marker(
    operator: Res<OperatorLoop>,
    mut markers: Query<(&mut Transform, &mut Visibility), With<TargetMarker>>,
) {
    let handle = &operator.console().handle;
    let target = handle.target();
    for (mut transform, mut visibility) in &mut markers {
        transform.translation = target.position;
        transform.rotation = target.orientation;
        transform.scale = handle.scale() * handle.display_scale();
        *visibility = if handle.is_visible() {
            Visibility::Visible
        } else {
            Visibility::Hidden
        };
    }
}

fn sync_live_marker(
    operator: Res<OperatorLoop>,
    mut markers: Query<(&mut Transform, &mut Visibility), With<LiveToolMarker>>,
) {
    let live = operator.motion().live_transform();
    for (mut transform, mut visibility) in &mut markers {
        match live {
            Some(tool) => {
                transform.translation = tool.position;
                transform.rotation = tool.orientation;
                *visibility = Visibility::Visible;
            }
            None => *visibility = Visibility::Hidden,
        }
    }
}
