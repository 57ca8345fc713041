//! Pointer coordinate translation for navigation events
//!
//! Events arrive in output (scaled) coordinates and travel upstream, so
//! pointer positions are mapped back into input coordinates.

use crate::types::Resolution;

/// Navigation event travelling upstream through the scaler
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NavigationEvent {
    /// Event name, such as `mouse-move` or `key-press`
    pub kind: String,
    pub pointer_x: Option<f64>,
    pub pointer_y: Option<f64>,
    pub button: Option<u32>,
    pub key: Option<String>,
}

impl NavigationEvent {
    pub fn pointer(kind: impl Into<String>, x: f64, y: f64) -> Self {
        Self {
            kind: kind.into(),
            pointer_x: Some(x),
            pointer_y: Some(y),
            ..Default::default()
        }
    }
}

/// Map the pointer of `event` from `dst` (output) to `src` (input)
/// coordinates; fields other than the pointer are left untouched
pub fn rescale_pointer(
    mut event: NavigationEvent,
    src: Resolution,
    dst: Resolution,
) -> NavigationEvent {
    if let Some(x) = event.pointer_x.as_mut() {
        *x *= src.width as f64 / dst.width as f64;
    }
    if let Some(y) = event.pointer_y.as_mut() {
        *y *= src.height as f64 / dst.height as f64;
    }
    event
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rescale_pointer() {
        let event = NavigationEvent::pointer("mouse-move", 100.0, 50.0);
        let out = rescale_pointer(event, Resolution::new(640, 480), Resolution::new(320, 240));
        assert_eq!(out.pointer_x, Some(200.0));
        assert_eq!(out.pointer_y, Some(100.0));
        assert_eq!(out.kind, "mouse-move");
    }

    #[test]
    fn test_non_pointer_fields_untouched() {
        let event = NavigationEvent {
            kind: "key-press".into(),
            key: Some("a".into()),
            ..Default::default()
        };
        let (src, dst) = (Resolution::new(10, 10), Resolution::new(20, 20));
        let out = rescale_pointer(event.clone(), src, dst);
        assert_eq!(out, event);
    }

    #[test]
    fn test_axes_scale_independently() {
        let event = NavigationEvent::pointer("mouse-button-press", 30.0, 30.0);
        let out = rescale_pointer(event, Resolution::new(100, 300), Resolution::new(300, 100));
        assert_eq!(out.pointer_x, Some(10.0));
        assert_eq!(out.pointer_y, Some(90.0));
    }
}
