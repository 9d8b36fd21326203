use crate::models::Acceptability;

/// Emerald-500
pub const EXCELLENT_COLOR: &str = "#10b981";
/// Amber-500
pub const ACCEPTABLE_COLOR: &str = "#f59e0b";
/// Red-500
pub const BAD_COLOR: &str = "#ef4444";
/// Gray-500, used for anything without an acceptability (invalid results).
pub const NEUTRAL_COLOR: &str = "#6b7280";

const BACKGROUND_ALPHA: f32 = 0.2;

fn rgb(acceptability: Option<Acceptability>) -> (u8, u8, u8) {
    match acceptability {
        Some(Acceptability::Excellent) => (16, 185, 129),
        Some(Acceptability::Acceptable) => (245, 158, 11),
        Some(Acceptability::Bad) => (239, 68, 68),
        None => (107, 114, 128),
    }
}

pub fn color_for(acceptability: Option<Acceptability>) -> &'static str {
    match acceptability {
        Some(Acceptability::Excellent) => EXCELLENT_COLOR,
        Some(Acceptability::Acceptable) => ACCEPTABLE_COLOR,
        Some(Acceptability::Bad) => BAD_COLOR,
        None => NEUTRAL_COLOR,
    }
}

/// Translucent variant for target range shading.
pub fn background_color_for(acceptability: Option<Acceptability>) -> String {
    let (r, g, b) = rgb(acceptability);
    format!("rgba({}, {}, {}, {})", r, g, b, BACKGROUND_ALPHA)
}

impl Acceptability {
    pub fn color(&self) -> &'static str {
        color_for(Some(*self))
    }

    pub fn background_color(&self) -> String {
        background_color_for(Some(*self))
    }
}
