//! End-to-end scan view scenarios against the simulated platform
//!
//! Each test drives a view the way a host would: materialize, let the
//! platform post events, pump them on the "UI thread", inspect what the
//! platform was asked to do.

use barcode_scanner::config::{ARG_GRAVITY, ARG_WINDOW_INSET, CreationArgs};
use barcode_scanner::error::{CaptureError, ContactParseError};
use barcode_scanner::models::{
    CaptureFormat, DetectedSymbol, PermissionState, Rect, Rotation, Size, Symbology, VideoGravity,
};
use barcode_scanner::session::map_to_capture_space;
use barcode_scanner::tools::sim::SimPlatform;
use barcode_scanner::view::{ScanViewController, ScanViewFactory, ViewPhase};

const FRAME: Rect = Rect {
    x: 0.0,
    y: 0.0,
    width: 390.0,
    height: 844.0,
};

fn open_view(platform: &SimPlatform) -> ScanViewController {
    let mut view = ScanViewFactory::default()
        .create(FRAME, 42, &CreationArgs::new(), platform.services())
        .expect("default config is valid");
    view.view();
    view
}

fn qr(text: &str) -> DetectedSymbol {
    DetectedSymbol::new(Symbology::Qr, text)
}

#[test]
fn capture_starts_only_when_authorized() {
    for status in [
        PermissionState::Authorized,
        PermissionState::Denied,
        PermissionState::Unknown,
    ] {
        let platform = SimPlatform::new(status);
        let view = open_view(&platform);
        assert_eq!(
            view.is_capturing(),
            status == PermissionState::Authorized,
            "{status:?}"
        );
        assert_eq!(
            platform.camera.state().start_calls,
            usize::from(status == PermissionState::Authorized)
        );
    }
}

#[test]
fn denied_shows_settings_prompt_and_deep_link() {
    let platform = SimPlatform::new(PermissionState::Denied);
    let mut view = open_view(&platform);
    assert_eq!(view.phase(), ViewPhase::PermissionRequired);
    assert_eq!(platform.ui.log().settings_prompts, vec!["Go to Settings".to_string()]);
    assert_eq!(platform.permissions.state().requests, 0);

    view.event_sender()
        .post(barcode_scanner::session::ScanEvent::SettingsRequested);
    view.pump();
    assert_eq!(platform.settings.opened(), 1);
    assert_eq!(platform.camera.state().sessions_created, 0);
}

#[test]
fn denial_is_requeried_on_restart() {
    let platform = SimPlatform::new(PermissionState::Denied);
    let mut view = open_view(&platform);
    assert!(!view.is_capturing());

    platform.permissions.set_status(PermissionState::Authorized);
    assert!(view.restart());
    assert_eq!(view.phase(), ViewPhase::Scanning);
    assert!(view.is_capturing());
}

#[test]
fn unknown_then_granted_starts_capture_automatically() {
    let platform = SimPlatform::new(PermissionState::Unknown);
    let mut view = open_view(&platform);
    assert_eq!(view.phase(), ViewPhase::AwaitingPermission);
    assert!(!view.is_capturing());

    // A second materialization or restart must not prompt again.
    view.view();
    view.restart();
    assert_eq!(platform.permissions.state().requests, 1);

    assert!(platform.permissions.answer(true));
    view.pump();
    assert_eq!(view.phase(), ViewPhase::Scanning);
    assert!(view.is_capturing());
}

#[test]
fn late_refusal_after_settings_grant_is_ignored() {
    let platform = SimPlatform::new(PermissionState::Unknown);
    let mut view = open_view(&platform);
    assert_eq!(view.phase(), ViewPhase::AwaitingPermission);

    // Access granted in the settings app while the prompt is still up.
    platform.permissions.set_status(PermissionState::Authorized);
    assert!(view.restart());
    assert_eq!(view.phase(), ViewPhase::Scanning);
    assert!(view.is_capturing());

    assert!(platform.permissions.answer(false));
    view.pump();
    assert_eq!(view.phase(), ViewPhase::Scanning);
    assert!(view.is_capturing());
    assert!(platform.ui.log().settings_prompts.is_empty());
}

#[test]
fn unknown_then_refused_remediates() {
    let platform = SimPlatform::new(PermissionState::Unknown);
    let mut view = open_view(&platform);
    platform.permissions.answer(false);
    view.pump();
    assert_eq!(view.phase(), ViewPhase::PermissionRequired);
    assert!(!view.is_capturing());
    assert_eq!(platform.ui.log().settings_prompts.len(), 1);
}

#[test]
fn missing_settings_handler_is_not_fatal() {
    let mut platform = SimPlatform::new(PermissionState::Denied);
    platform.settings = barcode_scanner::tools::sim::SimSettings::new(false);
    let mut view = open_view(&platform);
    view.handle_event(barcode_scanner::session::ScanEvent::SettingsRequested);
    assert_eq!(platform.settings.opened(), 0);
    assert_eq!(view.phase(), ViewPhase::PermissionRequired);
}

#[test]
fn stop_twice_leaves_capture_stopped() {
    let platform = SimPlatform::new(PermissionState::Authorized);
    let mut view = open_view(&platform);
    view.event_sender()
        .post(barcode_scanner::session::ScanEvent::SymbolsDetected(vec![qr("a")]));
    view.pump();
    view.dispose();
    view.dispose();
    assert!(!view.is_capturing());
    assert!(!platform.camera.state().running);
    assert_eq!(platform.camera.state().stop_calls, 1);
}

#[test]
fn every_format_change_is_freshly_mapped() {
    let platform = SimPlatform::new(PermissionState::Authorized);
    let mut view = open_view(&platform);
    let formats = [
        CaptureFormat::new(1920.0, 1080.0, Rotation::Deg90),
        CaptureFormat::new(1280.0, 720.0, Rotation::Deg90),
        CaptureFormat::new(1440.0, 1080.0, Rotation::Deg0),
        CaptureFormat::new(1920.0, 1080.0, Rotation::Deg90),
    ];
    for format in formats {
        assert!(platform.camera.emit_format(format));
        view.pump();
        let expected = map_to_capture_space(
            view.handle().scan_window,
            &format,
            Size::new(FRAME.width, FRAME.height),
            VideoGravity::ResizeAspectFill,
        )
        .unwrap();
        assert_eq!(platform.camera.last_rect_of_interest(), Some(expected));
    }
    assert_eq!(platform.camera.state().rects_of_interest.len(), 4);
    assert_eq!(view.lifecycle().mapper().remap_count(), 4);
}

#[test]
fn creation_args_shape_the_mapping() {
    let platform = SimPlatform::new(PermissionState::Authorized);
    let mut args = CreationArgs::new();
    args.insert(ARG_GRAVITY.into(), "aspect".into());
    args.insert(ARG_WINDOW_INSET.into(), "0.1".into());
    let mut view = ScanViewFactory::default()
        .create(FRAME, 3, &args, platform.services())
        .unwrap();
    view.view();
    let window = view.handle().scan_window;
    assert!(window.approx_eq(&Rect::new(39.0, 39.0, 312.0, 766.0), 1e-3));

    let format = CaptureFormat::new(1920.0, 1080.0, Rotation::Deg90);
    platform.camera.emit_format(format);
    view.pump();
    let expected = map_to_capture_space(
        window,
        &format,
        Size::new(FRAME.width, FRAME.height),
        VideoGravity::ResizeAspect,
    )
    .unwrap();
    assert_eq!(platform.camera.last_rect_of_interest(), Some(expected));
}

#[test]
fn first_hit_stops_capture_and_later_hits_are_ignored() {
    let platform = SimPlatform::new(PermissionState::Authorized);
    let mut view = open_view(&platform);

    // Two frames queued before the UI thread gets to them.
    assert!(platform.camera.emit_symbols(vec![
        DetectedSymbol::new(Symbology::Ean13, "4006381333931"),
        qr("first"),
        qr("second"),
    ]));
    assert!(platform.camera.emit_symbols(vec![qr("third")]));
    view.pump();

    assert!(!view.is_capturing());
    assert_eq!(view.phase(), ViewPhase::Stopped);
    assert_eq!(platform.listener.log().raw, vec!["first".to_string()]);
    assert!(!platform.camera.emit_symbols(vec![qr("fourth")]));
}

#[test]
fn vcard_opens_contact_editor() {
    let platform = SimPlatform::new(PermissionState::Authorized);
    let mut view = open_view(&platform);
    platform.camera.emit_symbols(vec![qr(
        "BEGIN:VCARD\r\nVERSION:3.0\r\nN:Doe;Jane;;;\r\nFN:Jane Doe\r\nTEL;TYPE=CELL:+1 555 0100\r\nEMAIL:jane@example.com\r\nEND:VCARD\r\n",
    )]);
    view.pump();

    let ui = platform.ui.log();
    assert_eq!(ui.editors.len(), 1);
    assert!(ui.editor_open);
    let record = &ui.editors[0];
    assert_eq!(record.formatted_name.as_deref(), Some("Jane Doe"));
    assert_eq!(record.name.as_ref().unwrap().given, "Jane");
    assert_eq!(record.phones[0].value, "+1 555 0100");
    assert!(record.phones[0].has_label("cell"));
    assert_eq!(record.emails[0].value, "jane@example.com");
    assert!(platform.listener.log().raw.is_empty());
}

#[test]
fn malformed_vcard_is_logged_not_shown() {
    // Parse failures never reach the user; only the listener hears about them.
    let platform = SimPlatform::new(PermissionState::Authorized);
    let mut view = open_view(&platform);
    platform
        .camera
        .emit_symbols(vec![qr("BEGIN:VCARD\nVERSION:3.0\nFN Jane Doe\nEND:VCARD")]);
    view.pump();

    assert!(platform.ui.log().editors.is_empty());
    assert!(platform.ui.log().notices.is_empty());
    assert_eq!(
        platform.listener.log().parse_failures,
        vec![ContactParseError::MalformedLine { line: 3 }]
    );
    assert!(view.restart());
}

#[test]
fn format_change_after_detach_is_ignored() {
    let platform = SimPlatform::new(PermissionState::Authorized);
    let mut view = open_view(&platform);
    let format = CaptureFormat::new(1920.0, 1080.0, Rotation::Deg90);

    // Queued before dispose, delivered after.
    assert!(platform.camera.emit_format(format));
    let sender = view.event_sender();
    view.dispose();
    sender.post(barcode_scanner::session::ScanEvent::FormatChanged(format));
    view.pump();

    assert!(!platform.camera.emit_format(format));
    assert!(platform.camera.state().rects_of_interest.is_empty());
    assert_eq!(platform.camera.state().format_observers, 0);
}

#[test]
fn no_camera_shows_notice_and_clears_session() {
    let platform = SimPlatform::without_camera(PermissionState::Authorized);
    let view = open_view(&platform);

    assert_eq!(view.phase(), ViewPhase::Unsupported);
    assert!(!view.lifecycle().has_session());
    assert!(!view.lifecycle().is_observing());
    let ui = platform.ui.log();
    assert_eq!(ui.notices.len(), 1);
    assert_eq!(ui.notices[0].title, "Scanning not supported");
}

#[test]
fn rejected_input_releases_everything() {
    let platform = SimPlatform::new(PermissionState::Authorized);
    platform.camera.state_mut().reject_input = Some("device in use".into());
    let view = open_view(&platform);

    assert_eq!(view.phase(), ViewPhase::Unsupported);
    assert!(!view.lifecycle().has_session());
    let camera = platform.camera.state();
    assert_eq!(camera.sessions_created, 1);
    assert_eq!(camera.live_sessions, 0);
    assert!(!camera.running);
    assert_eq!(platform.ui.log().notices.len(), 1);
}

#[test]
fn capture_error_messages() {
    assert_eq!(
        CaptureError::InputRejected("device in use".into()).to_string(),
        "capture session rejected the camera input: device in use"
    );
}

#[test]
fn dropping_the_view_stops_capture() {
    let platform = SimPlatform::new(PermissionState::Authorized);
    {
        let view = open_view(&platform);
        assert!(view.is_capturing());
    }
    let camera = platform.camera.state();
    assert!(!camera.running);
    assert_eq!(camera.live_sessions, 0);
    assert_eq!(camera.format_observers, 0);
}
