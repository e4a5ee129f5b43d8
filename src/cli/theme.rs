//! Theme commands.

use serde::Serialize;

use crate::error::Result;
use crate::output::{emit_success, HumanOutput};
use crate::prefs::Theme;

use super::Context;

#[derive(Serialize)]
struct ThemeOutput {
    theme: Theme,
}

pub fn run_show(ctx: &Context) -> Result<()> {
    let theme = ctx.prefs().load()?.theme;
    emit(ctx, "theme show", theme)
}

pub fn run_toggle(ctx: &Context) -> Result<()> {
    let prefs = ctx.prefs().modify(|prefs| prefs.theme = prefs.theme.toggled())?;
    tracing::info!(theme = %prefs.theme, "theme toggled");
    emit(ctx, "theme toggle", prefs.theme)
}

pub fn run_set(ctx: &Context, value: &str) -> Result<()> {
    let theme = value.parse::<Theme>()?;
    ctx.prefs().modify(|prefs| prefs.theme = theme)?;
    emit(ctx, "theme set", theme)
}

fn emit(ctx: &Context, command: &str, theme: Theme) -> Result<()> {
    let human = HumanOutput::new(format!("Theme: {theme}"));
    emit_success(ctx.output(), command, &ThemeOutput { theme }, Some(&human))
}
