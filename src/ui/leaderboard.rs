use crate::ui::{Color, Rect, UiButton, UiElement};

/// Declarative binding for the leaderboard panel: the two interactive button
/// references a containing framework wires up. No behavior lives here.
#[derive(Debug, Clone)]
pub struct LeaderboardPanel {
    pub close_button: UiButton,
    pub shadow_close_button: UiButton,
}

impl Default for LeaderboardPanel {
    fn default() -> Self {
        let panel = Rect {
            x: 312.0,
            y: 80.0,
            width: 400.0,
            height: 480.0,
        };
        Self {
            close_button: UiButton {
                label: "Close".to_string(),
                rect: Rect {
                    x: panel.x + panel.width - 56.0,
                    y: panel.y + 16.0,
                    width: 40.0,
                    height: 40.0,
                },
                background: Color::rgba(0.62, 0.36, 0.94, 0.92),
            },
            // Dimmed catch area behind the panel; tapping it also closes.
            shadow_close_button: UiButton {
                label: String::new(),
                rect: Rect {
                    x: 0.0,
                    y: 0.0,
                    width: 1024.0,
                    height: 640.0,
                },
                background: Color::rgba(0.0, 0.0, 0.0, 0.55),
            },
        }
    }
}

impl LeaderboardPanel {
    /// Elements in draw order, shadow first so the panel button sits on top.
    pub fn elements(&self) -> Vec<UiElement> {
        vec![
            UiElement::Button(self.shadow_close_button.clone()),
            UiElement::Button(self.close_button.clone()),
        ]
    }
}
