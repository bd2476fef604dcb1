use bevy::prelude::*;

/// Where the left button or a finger went down this frame, in window coordinates.
/// Mouse wins when both happen in the same frame.
pub fn just_pressed_screen_position(
    button_input: &Res<ButtonInput<MouseButton>>,
    touch_input: &Res<Touches>,
    windows: &Query<&Window>,
) -> Option<Vec2> {
    if button_input.just_pressed(MouseButton::Left) {
        return windows.get_single().ok()?.cursor_position();
    }
    touch_input
        .iter_just_pressed()
        .next()
        .map(bevy::input::touch::Touch::position)
}

/// [`just_pressed_screen_position`], projected through the 2D camera.
pub fn just_pressed_world_position(
    button_input: &Res<ButtonInput<MouseButton>>,
    touch_input: &Res<Touches>,
    windows: &Query<&Window>,
    camera: &Query<(&Camera, &GlobalTransform)>,
) -> Option<Vec2> {
    let position = just_pressed_screen_position(button_input, touch_input, windows)?;
    let (camera, camera_transform) = camera.get_single().ok()?;

    camera
        .viewport_to_world_2d(camera_transform, position)
        .ok()
}
