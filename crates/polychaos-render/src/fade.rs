use polychaos_core::RenderSettings;

/// `1 - min(1, age / window)`. A zero window disables fading.
pub fn fade_alpha(age: u32, window: u32) -> f32 {
    if window == 0 {
        return 1.0;
    }
    1.0 - (age as f32 / window as f32).min(1.0)
}

/// Fade curve plus the floor a fully faded point keeps.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FadeStyle {
    pub window: u32,
    pub residual: f32,
}

impl FadeStyle {
    pub fn from_settings(settings: &RenderSettings) -> Self {
        Self {
            window: settings.fade_window,
            residual: settings.residual_alpha.clamp(0.0, 1.0),
        }
    }

    pub fn alpha(&self, age: u32) -> f32 {
        fade_alpha(age, self.window).max(self.residual)
    }
}
