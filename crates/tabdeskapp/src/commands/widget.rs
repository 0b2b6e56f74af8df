use crate::commands::{recover, CmdMessage, CmdResult, WidgetView};
use crate::error::{DeskError, Result};
use crate::layout::WidgetLayout;
use crate::model::{Position, Size};
use crate::store::StorageBackend;
use serde_json::Value;

fn view<B: StorageBackend>(layout: &WidgetLayout<B>, widget: &str) -> Result<WidgetView> {
    Ok(WidgetView {
        widget: widget.to_string(),
        position: layout.position(widget)?,
        size: layout.size(widget)?,
        style: layout.style(widget)?,
    })
}

fn finish<B: StorageBackend>(
    layout: &WidgetLayout<B>,
    widget: &str,
    mut result: CmdResult,
) -> Result<CmdResult> {
    result.widget = Some(view(layout, widget)?);
    Ok(result)
}

pub fn show<B: StorageBackend>(layout: &WidgetLayout<B>, widget: &str) -> Result<CmdResult> {
    let mut result = CmdResult::default();
    let shown = view(layout, widget)?;
    if shown.position.is_none() && shown.size.is_none() && shown.style.is_none() {
        result.add_message(CmdMessage::info(format!(
            "{} uses its default placement.",
            widget
        )));
    }
    result.widget = Some(shown);
    Ok(result)
}

pub fn move_to<B: StorageBackend>(
    layout: &mut WidgetLayout<B>,
    widget: &str,
    position: Position,
) -> Result<CmdResult> {
    let mut result = CmdResult::default();
    match layout.set_position(widget, position) {
        Ok(()) => result.add_message(CmdMessage::success(format!(
            "Moved {} to ({}, {}).",
            widget, position.x, position.y
        ))),
        Err(e) => recover(&mut result, e, "Widget")?,
    }
    finish(layout, widget, result)
}

pub fn resize<B: StorageBackend>(
    layout: &mut WidgetLayout<B>,
    widget: &str,
    size: Size,
) -> Result<CmdResult> {
    if size.width <= 0.0 || size.height <= 0.0 {
        return Err(DeskError::InvalidInput(
            "width and height must be positive".to_string(),
        ));
    }
    let mut result = CmdResult::default();
    match layout.set_size(widget, size) {
        Ok(()) => result.add_message(CmdMessage::success(format!(
            "Resized {} to {}x{}.",
            widget, size.width, size.height
        ))),
        Err(e) => recover(&mut result, e, "Widget")?,
    }
    finish(layout, widget, result)
}

/// Replace a widget's style. The style must be a JSON object.
pub fn style<B: StorageBackend>(
    layout: &mut WidgetLayout<B>,
    widget: &str,
    raw: &str,
) -> Result<CmdResult> {
    let value: Value = serde_json::from_str(raw)
        .map_err(|e| DeskError::InvalidInput(format!("style is not valid JSON: {}", e)))?;
    if !value.is_object() {
        return Err(DeskError::InvalidInput(
            "style must be a JSON object".to_string(),
        ));
    }
    let mut result = CmdResult::default();
    match layout.set_style(widget, &value) {
        Ok(()) => result.add_message(CmdMessage::success(format!("Updated {} style.", widget))),
        Err(e) => recover(&mut result, e, "Widget")?,
    }
    finish(layout, widget, result)
}

/// Forget a widget's style, or with `everything` its placement too.
pub fn reset<B: StorageBackend>(
    layout: &mut WidgetLayout<B>,
    widget: &str,
    everything: bool,
) -> Result<CmdResult> {
    let mut result = CmdResult::default();
    let outcome = if everything {
        layout.reset(widget)
    } else {
        layout.reset_style(widget)
    };
    match outcome {
        Ok(()) if everything => {
            result.add_message(CmdMessage::success(format!("Reset {} layout.", widget)))
        }
        Ok(()) => result.add_message(CmdMessage::success(format!("Reset {} style.", widget))),
        Err(e) => recover(&mut result, e, "Widget")?,
    }
    finish(layout, widget, result)
}
