use cgmath::{Deg, InnerSpace, Matrix4, Point3, Rad, Vector3, Vector4};
use instant::Duration;
use scene_sandbox::camera::{
    Camera, CameraController, CameraUniform, MAX_FOVY, MIN_FOVY, PITCH_LIMIT, Projection,
};
use winit::{event::ElementState, keyboard::KeyCode};

fn close(a: Vector3<f32>, b: Vector3<f32>) -> bool {
    (a - b).magnitude() < 1e-4
}

#[test]
fn default_camera_looks_down_negative_z() {
    let camera = Camera::default();
    assert_eq!(camera.position, Point3::new(0.0, 50.0, 100.0));
    assert!(close(camera.front(), -Vector3::unit_z()));
    assert!(close(camera.up(), Vector3::unit_y()));
}

#[test]
fn look_at_points_front_at_the_target() {
    let mut camera = Camera::new((10.0, 0.0, 0.0), Deg(0.0), Deg(0.0));
    camera.look_at(Point3::new(10.0, 5.0, 5.0));
    let expected = Vector3::new(0.0, 5.0, 5.0).normalize();
    assert!(close(camera.front(), expected));
}

#[test]
fn look_at_straight_up_is_clamped() {
    let mut camera = Camera::default();
    camera.look_at(camera.position + Vector3::new(0.0, 10.0, 0.0));
    let limit: Rad<f32> = PITCH_LIMIT.into();
    assert!((camera.pitch.0 - limit.0).abs() < 1e-6);
}

#[test]
fn look_at_own_position_is_ignored() {
    let mut camera = Camera::default();
    let before = (camera.yaw, camera.pitch);
    camera.look_at(camera.position);
    assert_eq!((camera.yaw, camera.pitch), before);
}

#[test]
fn zoom_is_clamped_to_the_fov_limits() {
    let mut projection = Projection::new(800, 600, Deg(45.0), 0.1, 1000.0);
    projection.zoom(-10.0);
    let fovy: Deg<f32> = projection.fovy.into();
    assert!((fovy.0 - MAX_FOVY.0).abs() < 1e-4);

    projection.zoom(100.0);
    let fovy: Deg<f32> = projection.fovy.into();
    assert!((fovy.0 - MIN_FOVY.0).abs() < 1e-4);
}

#[test]
fn resize_to_zero_keeps_the_aspect() {
    let mut projection = Projection::new(800, 600, Deg(45.0), 0.1, 1000.0);
    projection.resize(0, 0);
    assert!((projection.aspect - 800.0 / 600.0).abs() < 1e-6);
    projection.resize(1000, 500);
    assert_eq!(projection.aspect, 2.0);
}

#[test]
fn held_key_moves_at_speed_per_second() {
    let mut camera = Camera::default();
    let mut projection = Projection::new(800, 600, Deg(45.0), 0.1, 1000.0);
    let mut controller = CameraController::new(10.0, 0.1);

    assert!(controller.handle_key(KeyCode::KeyW, ElementState::Pressed));
    controller.update(&mut camera, &mut projection, Duration::from_secs(1));
    assert!((camera.position.z - 90.0).abs() < 1e-3);

    controller.handle_key(KeyCode::KeyW, ElementState::Released);
    controller.handle_key(KeyCode::KeyE, ElementState::Pressed);
    controller.update(&mut camera, &mut projection, Duration::from_millis(500));
    assert!((camera.position.y - 55.0).abs() < 1e-3);
}

#[test]
fn vertical_keys_follow_the_camera_up_vector() {
    let mut camera = Camera::new((0.0, 0.0, 0.0), Deg(-90.0), Deg(-45.0));
    let mut projection = Projection::new(800, 600, Deg(45.0), 0.1, 1000.0);
    let mut controller = CameraController::new(10.0, 0.1);
    let up = camera.up();
    assert!(up.z < -0.5);

    controller.handle_key(KeyCode::KeyQ, ElementState::Pressed);
    controller.update(&mut camera, &mut projection, Duration::from_secs(1));
    assert!(close(camera.position - Point3::new(0.0, 0.0, 0.0), -up * 10.0));
}

#[test]
fn unrelated_keys_are_not_consumed() {
    let mut controller = CameraController::new(10.0, 0.1);
    assert!(!controller.handle_key(KeyCode::KeyZ, ElementState::Pressed));
}

#[test]
fn mouse_look_cannot_flip_the_camera() {
    let mut camera = Camera::default();
    let mut projection = Projection::new(800, 600, Deg(45.0), 0.1, 1000.0);
    let mut controller = CameraController::new(10.0, 0.1);
    controller.handle_mouse(0.0, -100_000.0);
    controller.update(&mut camera, &mut projection, Duration::from_millis(16));
    let limit: Rad<f32> = PITCH_LIMIT.into();
    assert!(camera.pitch.0 <= limit.0 + 1e-6);
}

#[test]
fn reset_drops_movement_but_keeps_auto_rotate() {
    let mut camera = Camera::default();
    let mut projection = Projection::new(800, 600, Deg(45.0), 0.1, 1000.0);
    let mut controller = CameraController::new(10.0, 0.1);
    controller.auto_rotate = true;
    controller.handle_key(KeyCode::KeyW, ElementState::Pressed);
    controller.reset();
    assert!(controller.auto_rotate);

    let start = camera.position;
    let yaw = camera.yaw;
    controller.update(&mut camera, &mut projection, Duration::from_secs(1));
    assert_eq!(camera.position, start);
    let turned: Deg<f32> = (camera.yaw - yaw).into();
    assert!((turned.0 - 20.0).abs() < 1e-3);
}

#[test]
fn sky_matrix_ignores_camera_translation() {
    let projection = Projection::new(800, 600, Deg(45.0), 0.1, 1000.0);
    let mut near = Camera::default();
    near.position = Point3::new(0.0, 0.0, 0.0);
    let far = Camera::default();

    let mut a = CameraUniform::new();
    a.update_view_proj(&near, &projection);
    let mut b = CameraUniform::new();
    b.update_view_proj(&far, &projection);

    assert_eq!(a.sky_view_proj, b.sky_view_proj);
    assert_ne!(a.view_proj, b.view_proj);
    assert_eq!(b.view_position, [0.0, 50.0, 100.0, 1.0]);

    // a point straight ahead ends up in the middle of the screen
    let view_proj: Matrix4<f32> = b.view_proj.into();
    let clip = view_proj * Vector4::new(0.0, 50.0, 0.0, 1.0);
    assert!((clip.x / clip.w).abs() < 1e-4);
    assert!((clip.y / clip.w).abs() < 1e-4);
}
