use super::{Editor, GetCssOptions};

impl Editor {
    /// The document loaded into the editing frame: base CSS, page CSS and body.
    #[must_use]
    pub fn canvas_html(&self) -> String {
        format!(
            "<!DOCTYPE html><html><head><meta charset=\"utf-8\"><style>{}</style><style>{}</style></head>{}</html>",
            self.config.base_css,
            self.get_css(&GetCssOptions::default()),
            self.get_html()
        )
    }

    /// Width of the frame for the selected device, if it is constrained.
    #[must_use]
    pub fn canvas_width(&self) -> Option<&str> {
        self.devices.get(self.devices.selected())?.width.as_deref()
    }
}
