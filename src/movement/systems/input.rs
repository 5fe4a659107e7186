//! Movement domain: input sampling, control-scheme detection, and dispatch
//! to the controlled character.

use avian2d::prelude::*;
use bevy::ecs::message::{MessageReader, MessageWriter};
use bevy::input::mouse::AccumulatedMouseMotion;
use bevy::prelude::*;
use bevy::window::PrimaryWindow;

use crate::abilities::{AbilityInput, AbilityStateMachine, AimSample, Trigger};
use crate::movement::systems::queries::AvianQueries;
use crate::movement::{
    CharacterIndex, ControlScheme, ControlState, Player, PlayerInput, PointerWorld,
};

const STICK_DEADZONE: f32 = 0.2;

pub(crate) fn stick(raw: Vec2) -> Vec2 {
    if raw.length() < STICK_DEADZONE {
        Vec2::ZERO
    } else {
        raw.clamp_length_max(1.0)
    }
}

fn trigger(button: &ButtonInput<KeyCode>, key: KeyCode) -> Option<Trigger> {
    if button.just_pressed(key) {
        Some(Trigger::Pressed)
    } else if button.just_released(key) {
        Some(Trigger::Released)
    } else {
        None
    }
}

fn pad_trigger(gamepad: &Gamepad, button: GamepadButton) -> Option<Trigger> {
    if gamepad.just_pressed(button) {
        Some(Trigger::Pressed)
    } else if gamepad.just_released(button) {
        Some(Trigger::Released)
    } else {
        None
    }
}

/// Switch schemes on the first input from the other device.
pub(crate) fn detect_control_scheme(
    keyboard: Res<ButtonInput<KeyCode>>,
    mouse_buttons: Res<ButtonInput<MouseButton>>,
    mouse_motion: Res<AccumulatedMouseMotion>,
    gamepads: Query<&Gamepad>,
    mut control: ResMut<ControlState>,
) {
    let pad_active = gamepads.iter().any(|gamepad| {
        stick(gamepad.left_stick()) != Vec2::ZERO
            || stick(gamepad.right_stick()) != Vec2::ZERO
            || gamepad.digital().get_just_pressed().next().is_some()
    });
    let desktop_active = keyboard.get_just_pressed().next().is_some()
        || mouse_buttons.get_just_pressed().next().is_some()
        || mouse_motion.delta != Vec2::ZERO;

    let scheme = if pad_active {
        ControlScheme::Gamepad
    } else if desktop_active {
        ControlScheme::KeyboardMouse
    } else {
        return;
    };

    if control.scheme != scheme {
        info!("Control scheme: {:?}", scheme);
        control.scheme = scheme;
    }
}

pub(crate) fn update_pointer_world(
    windows: Query<&Window, With<PrimaryWindow>>,
    cameras: Query<(&Camera, &GlobalTransform), With<Camera2d>>,
    mut pointer: ResMut<PointerWorld>,
) {
    let (Ok(window), Ok((camera, camera_transform))) = (windows.single(), cameras.single()) else {
        pointer.0 = None;
        return;
    };
    pointer.0 = window
        .cursor_position()
        .and_then(|cursor| camera.viewport_to_world_2d(camera_transform, cursor).ok());
}

/// WASD moves, mouse aims. Shift sprints, Space dashes, Q and E charge
/// teleport and bounce, right mouse fires the grapple on release, F steadies,
/// R links.
pub(crate) fn keyboard_mouse_input(
    keyboard: Res<ButtonInput<KeyCode>>,
    mouse_buttons: Res<ButtonInput<MouseButton>>,
    mouse_motion: Res<AccumulatedMouseMotion>,
    pointer: Res<PointerWorld>,
    control: Res<ControlState>,
    mut inputs: MessageWriter<PlayerInput>,
) {
    if control.scheme != ControlScheme::KeyboardMouse {
        return;
    }

    let mut axis = Vec2::ZERO;
    if keyboard.pressed(KeyCode::KeyA) || keyboard.pressed(KeyCode::ArrowLeft) {
        axis.x -= 1.0;
    }
    if keyboard.pressed(KeyCode::KeyD) || keyboard.pressed(KeyCode::ArrowRight) {
        axis.x += 1.0;
    }
    if keyboard.pressed(KeyCode::KeyS) || keyboard.pressed(KeyCode::ArrowDown) {
        axis.y -= 1.0;
    }
    if keyboard.pressed(KeyCode::KeyW) || keyboard.pressed(KeyCode::ArrowUp) {
        axis.y += 1.0;
    }
    inputs.write(PlayerInput(AbilityInput::Move(axis)));

    if let Some(point) = pointer.0.filter(|_| mouse_motion.delta != Vec2::ZERO) {
        inputs.write(PlayerInput(AbilityInput::Aim(AimSample::Pointer(point))));
    }

    if let Some(t) = trigger(&keyboard, KeyCode::ShiftLeft) {
        inputs.write(PlayerInput(AbilityInput::Sprint(t)));
    }
    if keyboard.just_pressed(KeyCode::Space) {
        inputs.write(PlayerInput(AbilityInput::Dash));
    }
    if let Some(t) = trigger(&keyboard, KeyCode::KeyQ) {
        inputs.write(PlayerInput(AbilityInput::Teleport(t)));
    }
    if let Some(t) = trigger(&keyboard, KeyCode::KeyE) {
        inputs.write(PlayerInput(AbilityInput::Bounce(t)));
    }
    if mouse_buttons.just_released(MouseButton::Right) {
        inputs.write(PlayerInput(AbilityInput::Grapple));
    }
    if keyboard.just_pressed(KeyCode::KeyF) {
        inputs.write(PlayerInput(AbilityInput::Steady));
    }
    if keyboard.just_pressed(KeyCode::KeyR) {
        inputs.write(PlayerInput(AbilityInput::Link));
    }
}

/// Left stick moves, right stick aims. Left bumper sprints, South dashes,
/// West and East charge teleport and bounce, right trigger fires the grapple
/// on release, North steadies, left trigger links.
pub(crate) fn gamepad_input(
    gamepads: Query<&Gamepad>,
    control: Res<ControlState>,
    mut inputs: MessageWriter<PlayerInput>,
) {
    if control.scheme != ControlScheme::Gamepad {
        return;
    }

    for gamepad in gamepads.iter() {
        inputs.write(PlayerInput(AbilityInput::Move(stick(gamepad.left_stick()))));

        let aim = stick(gamepad.right_stick());
        if aim != Vec2::ZERO {
            inputs.write(PlayerInput(AbilityInput::Aim(AimSample::Stick(aim))));
        }

        if let Some(t) = pad_trigger(gamepad, GamepadButton::LeftTrigger) {
            inputs.write(PlayerInput(AbilityInput::Sprint(t)));
        }
        if gamepad.just_pressed(GamepadButton::South) {
            inputs.write(PlayerInput(AbilityInput::Dash));
        }
        if let Some(t) = pad_trigger(gamepad, GamepadButton::West) {
            inputs.write(PlayerInput(AbilityInput::Teleport(t)));
        }
        if let Some(t) = pad_trigger(gamepad, GamepadButton::East) {
            inputs.write(PlayerInput(AbilityInput::Bounce(t)));
        }
        if gamepad.just_released(GamepadButton::RightTrigger2) {
            inputs.write(PlayerInput(AbilityInput::Grapple));
        }
        if gamepad.just_pressed(GamepadButton::North) {
            inputs.write(PlayerInput(AbilityInput::Steady));
        }
        if gamepad.just_pressed(GamepadButton::LeftTrigger2) {
            inputs.write(PlayerInput(AbilityInput::Link));
        }
    }
}

/// Feed sampled input to the controlled character's state machine.
pub(crate) fn apply_player_input(
    mut inputs: MessageReader<PlayerInput>,
    spatial: SpatialQuery,
    index: Res<CharacterIndex>,
    mut players: Query<(Entity, &mut AbilityStateMachine), With<Player>>,
) {
    let Ok((entity, mut machine)) = players.single_mut() else {
        return;
    };
    let world = AvianQueries {
        spatial: &spatial,
        index: &index,
        exclude: entity,
    };

    for PlayerInput(input) in inputs.read() {
        // Held keys resend the same move every frame.
        if let AbilityInput::Move(axis) = input {
            if machine.intent().move_direction == axis.clamp_length_max(1.0) {
                continue;
            }
        }
        machine.handle_input(*input, &world);
    }
}
