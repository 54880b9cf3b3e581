use holdfast::backends::virtual_input::{Registration, VirtualPlatform, VirtualWindow};
use holdfast::platform::{DeviceFamily, HidUsage, LegacyMessage, RawKeyboard, RegistrationFlags};
use holdfast::{
    BindPhase, DeviceId, HidCaps, InputError, InputKind, Key, KeyState, Manager, RawHandle, RawMessage, RawPayload,
    WindowHandle,
};
use std::sync::Arc;

const VK_CONTROL: u16 = 0x11;
const VK_F4: u16 = 0x73;

fn key(handle: isize, raw: RawKeyboard) -> RawMessage {
    RawMessage::new(RawHandle(handle), RawPayload::Keyboard(raw))
}

fn setup() -> (VirtualPlatform, Manager, Arc<VirtualWindow>) {
    let platform = VirtualPlatform::new();
    let manager = Manager::new(platform.dispatcher());
    (platform, manager, Arc::new(VirtualWindow::new(42)))
}

#[test]
fn left_control_down_then_up() {
    let (platform, mut manager, window) = setup();
    let kb = manager.add_keyboard(RawHandle(1), "kb");
    assert!(manager.bind(kb, window).unwrap());
    assert_eq!(
        platform.registrations(),
        vec![Registration {
            usage: HidUsage::KEYBOARD,
            flags: RegistrationFlags::empty(),
            window: Some(WindowHandle(42)),
        }]
    );

    manager.dispatch(&key(1, RawKeyboard::down(VK_CONTROL, 0x1D)));
    assert_eq!(manager.key_state(kb, Key::LControlKey).unwrap(), KeyState::Down);
    assert_eq!(manager.key_state(kb, Key::ControlKey).unwrap(), KeyState::Down);
    assert_eq!(manager.key_state(kb, Key::RControlKey).unwrap(), KeyState::Up);

    manager.dispatch(&key(1, RawKeyboard::up(VK_CONTROL, 0x1D)));
    assert_eq!(manager.key_state(kb, Key::LControlKey).unwrap(), KeyState::Up);
    assert_eq!(manager.key_state(kb, Key::ControlKey).unwrap(), KeyState::Up);

    let kinds: Vec<_> = manager.drain_events().into_iter().map(|e| e.kind).collect();
    assert!(matches!(kinds[0], InputKind::KeyDown { key: Key::LControlKey, scan_code: 0x1D, .. }));
    assert!(matches!(kinds[1], InputKind::KeyUp { key: Key::LControlKey, scan_code: 0x1D, .. }));
}

#[test]
fn autorepeat_downs_are_not_filtered() {
    let (_platform, mut manager, window) = setup();
    let kb = manager.add_keyboard(RawHandle(1), "kb");
    manager.bind(kb, window).unwrap();
    for _ in 0..3 {
        manager.dispatch(&key(1, RawKeyboard::down(0x41, 0x1E)));
    }
    assert_eq!(manager.drain_events().len(), 3);
}

#[test]
fn exclusive_device_recaptures_after_focus_returns() {
    let (_platform, mut manager, window) = setup();
    let kb = manager.add_keyboard(RawHandle(1), "kb");
    manager.set_exclusive(kb, true).unwrap();
    manager.bind(kb, window.clone()).unwrap();
    assert!(manager.is_acquired(kb).unwrap());

    manager.dispatch(&key(1, RawKeyboard::down(0x41, 0x1E)));
    window.set_focused(false);
    manager.on_focus_changed(WindowHandle(42), false);
    assert!(!manager.is_acquired(kb).unwrap());
    // ResetAll is the default: held keys are released on focus loss.
    assert_eq!(manager.key_state(kb, Key::A).unwrap(), KeyState::Up);

    // Input while unfocused is dropped.
    manager.dispatch(&key(1, RawKeyboard::down(0x42, 0x30)));
    assert_eq!(manager.key_state(kb, Key::B).unwrap(), KeyState::Up);

    window.set_focused(true);
    manager.on_focus_changed(WindowHandle(42), true);
    assert!(!manager.is_acquired(kb).unwrap());
    manager.dispatch(&key(1, RawKeyboard::down(0x42, 0x30)));
    assert!(manager.is_acquired(kb).unwrap());
    assert_eq!(manager.key_state(kb, Key::B).unwrap(), KeyState::Down);

    let changes: Vec<bool> = manager
        .drain_events()
        .into_iter()
        .filter_map(|e| match e.kind {
            InputKind::AcquisitionChanged { acquired } => Some(acquired),
            _ => None,
        })
        .collect();
    assert_eq!(changes, vec![false, true]);
}

#[test]
fn unbind_twice_is_harmless() {
    let (platform, mut manager, window) = setup();
    let kb = manager.add_keyboard(RawHandle(1), "kb");
    manager.bind(kb, window).unwrap();

    manager.unbind(kb).unwrap();
    manager.unbind(kb).unwrap();
    assert!(!manager.is_acquired(kb).unwrap());
    assert_eq!(manager.device(kb).unwrap().binding().phase(), BindPhase::Unbound);

    let regs = platform.registrations();
    assert_eq!(regs.len(), 2);
    assert_eq!(regs[1].flags, RegistrationFlags::REMOVE);
    assert_eq!(regs[1].window, None);
    assert_eq!(
        platform.filter_log(),
        vec![(DeviceFamily::Keyboard, true), (DeviceFamily::Keyboard, false)]
    );
}

#[test]
fn unbound_device_drops_input() {
    let (_platform, mut manager, window) = setup();
    let kb = manager.add_keyboard(RawHandle(1), "kb");
    manager.bind(kb, window).unwrap();
    manager.unbind(kb).unwrap();
    assert_eq!(manager.dispatch(&key(1, RawKeyboard::down(0x41, 0x1E))), 0);
    assert_eq!(manager.key_state(kb, Key::A).unwrap(), KeyState::Up);
}

#[test]
fn events_for_other_handles_are_discarded() {
    let (_platform, mut manager, window) = setup();
    let kb = manager.add_keyboard(RawHandle(1), "kb");
    manager.bind(kb, window).unwrap();
    assert_eq!(manager.dispatch(&key(2, RawKeyboard::down(0x41, 0x1E))), 0);
    assert_eq!(manager.key_state(kb, Key::A).unwrap(), KeyState::Up);
}

#[test]
fn disposing_window_discards_events() {
    let (_platform, mut manager, window) = setup();
    let kb = manager.add_keyboard(RawHandle(1), "kb");
    manager.bind(kb, window.clone()).unwrap();
    window.set_disposing(true);
    manager.dispatch(&key(1, RawKeyboard::down(0x41, 0x1E)));
    assert_eq!(manager.key_state(kb, Key::A).unwrap(), KeyState::Up);
    assert!(!manager.is_acquired(kb).unwrap());
}

#[test]
fn rebinding_one_device_keeps_sibling_filter() {
    let (platform, mut manager, window) = setup();
    let a = manager.add_keyboard(RawHandle(1), "a");
    let b = manager.add_keyboard(RawHandle(2), "b");
    manager.bind(a, window.clone()).unwrap();
    manager.bind(b, window.clone()).unwrap();

    let other = Arc::new(VirtualWindow::new(7));
    manager.bind(a, other).unwrap();
    manager.unbind(a).unwrap();

    assert!(platform.filter_installed(DeviceFamily::Keyboard));
    assert_eq!(manager.dispatcher().subscriptions().count(DeviceFamily::Keyboard), 1);
    // `b` still owns the usage, so no removal was issued for it.
    assert!(platform
        .registrations()
        .iter()
        .all(|r| !r.flags.contains(RegistrationFlags::REMOVE)));

    manager.dispatch(&key(2, RawKeyboard::down(0x41, 0x1E)));
    assert_eq!(manager.key_state(b, Key::A).unwrap(), KeyState::Down);

    manager.unbind(b).unwrap();
    assert!(!platform.filter_installed(DeviceFamily::Keyboard));
    assert_eq!(platform.registrations().last().unwrap().flags, RegistrationFlags::REMOVE);
}

#[test]
fn re_adding_a_bound_device_releases_its_registration() {
    let (platform, mut manager, window) = setup();
    let kb = manager.add_keyboard(RawHandle(1), "kb");
    manager.bind(kb, window).unwrap();

    // Hot-plug rediscovery under the same handle.
    assert_eq!(manager.add_keyboard(RawHandle(1), "kb"), kb);
    assert!(!platform.filter_installed(DeviceFamily::Keyboard));
    assert_eq!(manager.dispatcher().subscriptions().count(DeviceFamily::Keyboard), 0);
    assert_eq!(platform.registrations().last().unwrap().flags, RegistrationFlags::REMOVE);
    assert_eq!(manager.device(kb).unwrap().binding().phase(), BindPhase::Unbound);

    assert!(manager.remove(kb));
    assert!(!platform.filter_installed(DeviceFamily::Keyboard));
    assert_eq!(platform.registrations().len(), 2);
}

#[test]
fn rejected_registration_rolls_back_subscription() {
    let (platform, mut manager, window) = setup();
    let kb = manager.add_keyboard(RawHandle(1), "kb");
    platform.reject_registrations(true);

    let err = manager.bind(kb, window).unwrap_err();
    assert!(matches!(err, InputError::Driver { device, .. } if device == kb));
    assert!(!platform.filter_installed(DeviceFamily::Keyboard));
    assert_eq!(manager.dispatcher().subscriptions().count(DeviceFamily::Keyboard), 0);
    assert_eq!(manager.device(kb).unwrap().binding().phase(), BindPhase::Unbound);
}

#[test]
fn changing_flags_rebinds_with_new_registration() {
    let (platform, mut manager, window) = setup();
    let kb = manager.add_keyboard(RawHandle(1), "kb");
    manager.bind(kb, window).unwrap();
    manager.set_allow_background(kb, true).unwrap();

    let regs = platform.registrations();
    assert_eq!(regs.len(), 3);
    assert_eq!(regs[1].flags, RegistrationFlags::REMOVE);
    assert_eq!(regs[2].flags, RegistrationFlags::INPUT_SINK);
    assert!(manager.is_acquired(kb).unwrap());
}

#[test]
fn exclusive_keyboard_suppresses_legacy_keys_except_alt_f4() {
    let (_platform, mut manager, window) = setup();
    let kb = manager.add_keyboard(RawHandle(1), "kb");
    manager.set_exclusive(kb, true).unwrap();
    assert!(!manager.should_suppress(LegacyMessage::KeyDown));

    manager.bind(kb, window).unwrap();
    assert!(manager.should_suppress(LegacyMessage::KeyDown));
    assert!(manager.should_suppress(LegacyMessage::Char));
    assert!(manager.should_suppress(LegacyMessage::SysKeyDown(0x41)));
    assert!(!manager.should_suppress(LegacyMessage::SysKeyDown(VK_F4)));
    assert!(!manager.should_suppress(LegacyMessage::MouseMove));
}

#[test]
fn hid_payload_is_replaced_wholesale() {
    let (platform, mut manager, window) = setup();
    let caps = HidCaps {
        vendor_id: 0x1234,
        product_id: 0x5678,
        usage_page: 0xFF00,
        usage: 0x01,
    };
    let hid = manager.add_hid(RawHandle(9), "pad", caps);
    manager.bind(hid, window).unwrap();
    assert_eq!(
        platform.registrations()[0].usage,
        HidUsage {
            page: 0xFF00,
            usage: 0x01
        }
    );

    manager.dispatch(&RawMessage::new(RawHandle(9), RawPayload::Hid(vec![1, 2, 3, 4])));
    manager.dispatch(&RawMessage::new(RawHandle(9), RawPayload::Hid(vec![9])));
    assert_eq!(manager.binary_data(hid).unwrap(), &[9]);
    assert!(matches!(
        manager.binary_data(DeviceId::Raw(RawHandle(404))),
        Err(InputError::DeviceNotFound(_))
    ));
}

#[test]
fn snapshot_serializes_to_json() {
    let (_platform, mut manager, window) = setup();
    let kb = manager.add_keyboard(RawHandle(0x1f), "kb");
    manager.bind(kb, window).unwrap();
    manager.dispatch(&key(0x1f, RawKeyboard::down(0x41, 0x1E)));

    let snap = manager.snapshot();
    assert!(snap.get(kb).unwrap().acquired);
    let json = snap.to_json().unwrap();
    assert!(json.contains("\"raw:0x1f\""));
    assert!(json.contains("\"A\""));
}
