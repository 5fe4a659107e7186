//! Movement domain: system modules for input, ability ticks, and physics glue.

pub(crate) mod collisions;
pub(crate) mod input;
pub(crate) mod motion;
pub(crate) mod queries;
pub(crate) mod visuals;

pub(crate) use collisions::{detect_hazard_entry, detect_wall_contacts};
pub(crate) use input::{
    apply_player_input, detect_control_scheme, gamepad_input, keyboard_mouse_input,
    update_pointer_world,
};
pub(crate) use motion::{settle_dead_bodies, sync_characters, tick_abilities, write_back_motion};
pub(crate) use visuals::{update_aim_cursors, update_tethers};
