use serde::{Deserialize, Serialize};

/// A sample location on the image grid.
///
/// `in_stain` starts out `false` and is set once by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Point {
    pub x: u32,
    pub y: u32,
    pub in_stain: bool,
}

impl Point {
    pub fn unclassified(x: u32, y: u32) -> Self {
        Self {
            x,
            y,
            in_stain: false,
        }
    }

    pub(crate) fn with_classification(self, in_stain: bool) -> Self {
        Self { in_stain, ..self }
    }
}
