//! Survey-line ordering of detected photos.
//!
//! The sort key encodes the physical layout of the survey lines, so bucket
//! order does not follow numeric order: the 1-9 line runs first, then the
//! lettered cross line (A41, B11..J19), then 45, then 21-29, then 43, then
//! 31-38. Unplaceable markers sort last in their original relative order.

use crate::models::{DetectedImage, Marker};

/// (bucket, key) sort pair for one marker.
pub fn sort_key(marker: &Marker) -> (u8, i32) {
    match marker {
        Marker::Numeric(n) => match n {
            1..=9 => (1, *n as i32),
            21..=29 => (4, *n as i32),
            31..=38 => (6, *n as i32),
            45 => (3, 20),
            43 => (5, 30),
            _ => (99, 0),
        },
        Marker::LetterPaired {
            letter: 'A',
            number: 41,
            ..
        } => (2, 10),
        // Only three-character markers (a printed digit pair) sit on the
        // lettered line; B maps to 11, C to 12, and so on.
        Marker::LetterPaired {
            letter, digits: 2, ..
        } => (2, *letter as i32 - 'B' as i32 + 11),
        _ => (99, 0),
    }
}

/// Total order over detections; stable, so equal keys keep input order.
pub fn order_detections(mut detections: Vec<DetectedImage>) -> Vec<DetectedImage> {
    detections.sort_by_key(|item| sort_key(&item.marker));
    detections
}
