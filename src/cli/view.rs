//! View configuration commands.

use serde::Serialize;

use crate::error::Result;
use crate::output::{emit_success, HumanOutput};
use crate::task::TaskStatus;
use crate::view::{ViewConfig, ViewState};

use super::Context;

#[derive(Serialize)]
struct ViewChangeOutput {
    view: TaskStatus,
    config: ViewConfig,
}

pub fn run_show(ctx: &Context) -> Result<()> {
    let views = ctx.prefs().load()?.views;

    let mut human = HumanOutput::new("View sorting");
    push_sort_field(&mut human, TaskStatus::Active, &views.active);
    push_sort_field(&mut human, TaskStatus::Completed, &views.completed);

    emit_success(ctx.output(), "view show", &views, Some(&human))
}

pub fn run_toggle_sort_type(ctx: &Context, view: TaskStatus) -> Result<()> {
    change(ctx, "view sort-type", view, |views| views.toggle_sort_type(view))
}

pub fn run_toggle_direction(ctx: &Context, view: TaskStatus) -> Result<()> {
    change(ctx, "view direction", view, |views| views.toggle_direction(view))
}

fn change(
    ctx: &Context,
    command: &str,
    view: TaskStatus,
    apply: impl FnOnce(&mut ViewState),
) -> Result<()> {
    let prefs = ctx.prefs().modify(|prefs| apply(&mut prefs.views))?;
    let config = *prefs.views.config(view);
    tracing::info!(%view, sort_type = %config.sort_type, direction = %config.sort_direction, "view changed");

    let mut human = HumanOutput::new(format!("Sorting {view} tasks"));
    push_sort_field(&mut human, view, &config);

    emit_success(ctx.output(), command, &ViewChangeOutput { view, config }, Some(&human))
}

fn push_sort_field(human: &mut HumanOutput, view: TaskStatus, config: &ViewConfig) {
    human.push_field(
        view.to_string(),
        format!("{} {}", config.sort_type, config.sort_direction),
    );
}
