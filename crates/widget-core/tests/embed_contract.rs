//! Integration tests for the embed contract.
//!
//! These tests go through the public API the way the loader does: script
//! attributes → `WidgetConfig` → frame URL / `FrameSpec`, and inbound
//! payloads → `FrameMessage` → policy decision.

use serde_json::json;
use widget_core::{
    build_frame_url, classify_navigation, decide_resize, is_allowed_target, parse_frame_message,
    FrameLayout, FrameMessage, FrameSpec, MobileBreakpoint, NavigationDecision, ResizeDecision,
    ScriptAttributes, Viewport, WidgetConfig,
};

const ALLOWED: &[&str] = &["https://chat.steno.ai", "https://devchat.steno.ai"];

fn tag(pairs: &[(&str, &str)]) -> ScriptAttributes {
    pairs.iter().copied().collect()
}

#[test]
fn test_script_tag_to_frame_url() {
    // Arrange: a typical embed on a tenant site
    let attrs = tag(&[
        ("data-id", "acme"),
        ("data-position", "left"),
        ("data-url", "https://devchat.steno.ai"),
        ("data-backend", ""),
    ]);

    // Act
    let cfg = WidgetConfig::from_attributes(&attrs);
    let target = cfg.target_url("https://chat.steno.ai");
    assert!(is_allowed_target(target, ALLOWED));
    let url = build_frame_url(target, "/chat", &cfg, false).expect("frame URL must build");

    // Assert
    assert_eq!(
        url.as_str(),
        "https://devchat.steno.ai/chat?id=acme&position=left&mobile=false"
    );
}

#[test]
fn test_disallowed_data_url_is_caught_before_frame_construction() {
    let cfg = WidgetConfig::from_attributes(&tag(&[("data-url", "https://phish.example")]));
    assert!(!is_allowed_target(cfg.target_url("https://chat.steno.ai"), ALLOWED));
}

#[test]
fn test_frame_spec_uses_z_index_from_tag() {
    let cfg = WidgetConfig::from_attributes(&tag(&[("data-z-index", "2147483647")]));
    let url = build_frame_url("https://chat.steno.ai", "/chat", &cfg, false).unwrap();
    let spec = FrameSpec::new("chat-iframe", url, "Steno Chat Support Widget", FrameLayout::Docked, &cfg);
    assert_eq!(spec.style_value("z-index"), Some("2147483647"));
    assert_eq!(spec.id, "chat-iframe");
}

#[test]
fn test_navigate_payload_through_policy() {
    let allowed = ["https", "tel", "mailto"];
    let cases = [
        ("javascript:alert(1)", "rejected"),
        ("tel:+1555", "current"),
        ("https://x.com", "new"),
    ];

    for (raw, expected) in cases {
        let msg = parse_frame_message(&json!({"action": "navigate", "url": raw})).unwrap();
        let FrameMessage::Navigate { url: Some(url) } = msg else {
            panic!("expected navigate with url for {raw}");
        };
        let got = match classify_navigation(&url, &allowed) {
            NavigationDecision::Rejected(_) => "rejected",
            NavigationDecision::NavigateCurrent(_) => "current",
            NavigationDecision::OpenNewContext(_) => "new",
        };
        assert_eq!(got, expected, "navigation of {raw}");
    }
}

#[test]
fn test_resize_payload_through_policy_on_phone() {
    let msg = parse_frame_message(&json!({"action": "resize", "width": "300px", "height": "500px"})).unwrap();
    let FrameMessage::Resize { width, height } = msg else {
        panic!("expected resize");
    };
    let decision = decide_resize(
        false,
        width.as_deref(),
        height.as_deref(),
        Viewport::new(375, 667),
        MobileBreakpoint::default(),
    );
    assert_eq!(
        decision,
        ResizeDecision::Apply {
            width: "100%".into(),
            height: "100%".into()
        }
    );
}
