use serde::{Deserialize, Serialize};

fn default_diagram_width() -> u16 {
    26
}

fn default_diagram_height() -> u16 {
    13
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct UiConfig {
    /// Diagram pane width in terminal cells
    #[serde(default = "default_diagram_width")]
    pub diagram_width: u16,
    /// Diagram pane height in terminal cells
    #[serde(default = "default_diagram_height")]
    pub diagram_height: u16,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            diagram_width: default_diagram_width(),
            diagram_height: default_diagram_height(),
        }
    }
}
