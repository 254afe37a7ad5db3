//! Android key codes and meta-state flags for
//! [`key_event`](crate::driver::AndroidDeviceActionShortcuts::key_event).
//!
//! Values follow `android.view.KeyEvent`.

pub const KEYCODE_HOME: i32 = 3;
pub const KEYCODE_BACK: i32 = 4;
pub const KEYCODE_CALL: i32 = 5;
pub const KEYCODE_ENDCALL: i32 = 6;
pub const KEYCODE_DPAD_UP: i32 = 19;
pub const KEYCODE_DPAD_DOWN: i32 = 20;
pub const KEYCODE_DPAD_LEFT: i32 = 21;
pub const KEYCODE_DPAD_RIGHT: i32 = 22;
pub const KEYCODE_DPAD_CENTER: i32 = 23;
pub const KEYCODE_VOLUME_UP: i32 = 24;
pub const KEYCODE_VOLUME_DOWN: i32 = 25;
pub const KEYCODE_POWER: i32 = 26;
pub const KEYCODE_CAMERA: i32 = 27;
pub const KEYCODE_TAB: i32 = 61;
pub const KEYCODE_SPACE: i32 = 62;
pub const KEYCODE_ENTER: i32 = 66;
pub const KEYCODE_DEL: i32 = 67;
pub const KEYCODE_MENU: i32 = 82;
pub const KEYCODE_SEARCH: i32 = 84;
pub const KEYCODE_APP_SWITCH: i32 = 187;

/// No modifier keys pressed.
pub const META_NONE: i32 = 0;
pub const META_SHIFT_ON: i32 = 0x1;
pub const META_ALT_ON: i32 = 0x2;
pub const META_SYM_ON: i32 = 0x4;
pub const META_FUNCTION_ON: i32 = 0x8;
pub const META_CTRL_ON: i32 = 0x1000;
pub const META_META_ON: i32 = 0x10000;
pub const META_CAPS_LOCK_ON: i32 = 0x100000;
pub const META_NUM_LOCK_ON: i32 = 0x200000;

/// Looks up a key code by its short name (`home`, `back`, `enter`, ...).
///
/// Names are case-insensitive and may carry the `KEYCODE_` prefix.
pub fn keycode_by_name(name: &str) -> Option<i32> {
    let upper = name.trim().to_ascii_uppercase();
    let short = upper.strip_prefix("KEYCODE_").unwrap_or(&upper);
    let code = match short {
        "HOME" => KEYCODE_HOME,
        "BACK" => KEYCODE_BACK,
        "CALL" => KEYCODE_CALL,
        "ENDCALL" => KEYCODE_ENDCALL,
        "DPAD_UP" => KEYCODE_DPAD_UP,
        "DPAD_DOWN" => KEYCODE_DPAD_DOWN,
        "DPAD_LEFT" => KEYCODE_DPAD_LEFT,
        "DPAD_RIGHT" => KEYCODE_DPAD_RIGHT,
        "DPAD_CENTER" => KEYCODE_DPAD_CENTER,
        "VOLUME_UP" => KEYCODE_VOLUME_UP,
        "VOLUME_DOWN" => KEYCODE_VOLUME_DOWN,
        "POWER" => KEYCODE_POWER,
        "CAMERA" => KEYCODE_CAMERA,
        "TAB" => KEYCODE_TAB,
        "SPACE" => KEYCODE_SPACE,
        "ENTER" => KEYCODE_ENTER,
        "DEL" => KEYCODE_DEL,
        "MENU" => KEYCODE_MENU,
        "SEARCH" => KEYCODE_SEARCH,
        "APP_SWITCH" => KEYCODE_APP_SWITCH,
        _ => return None,
    };
    Some(code)
}
