//! Render tools.
//!
//! Rendering is unbounded work, so it is split into two bounded calls: one
//! that starts the job and returns a tracking token, one that polls status.
//! A single blocking "render" tool would wedge the execution gate for the
//! whole render.

use serde_json::{json, Value};

use crate::engine::Engine;
use crate::error::CoreResult;
use crate::tools::{handler_fn, ParamKind, ParamSpec, ToolContext, ToolRegistry, ToolSpec, ValidatedArgs};

pub fn register(registry: &mut ToolRegistry) -> CoreResult<()> {
    registry.register(render_start_spec(), handler_fn(render_start))?;
    registry.register(render_status_spec(), handler_fn(render_status))?;
    Ok(())
}

fn render_start_spec() -> ToolSpec {
    ToolSpec::new(
        "render_start",
        "Start rendering the current scene. Returns a job id to poll with render_status.",
        vec![
            ParamSpec::optional(
                "engine",
                "Render engine",
                ParamKind::enumeration(&["eevee", "cycles"]),
                json!("eevee"),
            ),
            ParamSpec::optional("samples", "Samples per pixel", ParamKind::integer_range(1, 4096), json!(64)),
            ParamSpec::optional(
                "resolution_x",
                "Output width in pixels",
                ParamKind::integer_range(4, 16384),
                json!(1920),
            ),
            ParamSpec::optional(
                "resolution_y",
                "Output height in pixels",
                ParamKind::integer_range(4, 16384),
                json!(1080),
            ),
        ],
    )
}

async fn render_start(args: ValidatedArgs, context: ToolContext) -> CoreResult<Value> {
    let job = context.engine.start_render(args.to_value()).await?;
    let message = match job.get("job_id").and_then(Value::as_str) {
        Some(job_id) => format!("Render started (job {job_id})"),
        None => "Render started".to_string(),
    };
    Ok(json!({ "message": message, "job": job }))
}

fn render_status_spec() -> ToolSpec {
    ToolSpec::new(
        "render_status",
        "Poll the status of a render job.",
        vec![ParamSpec::required("job_id", "Job id returned by render_start", ParamKind::string(1, 128))],
    )
}

async fn render_status(args: ValidatedArgs, context: ToolContext) -> CoreResult<Value> {
    let job_id = args.require_str("job_id")?;
    let status = context.engine.render_status(job_id).await?;
    let message = match status.get("status").and_then(Value::as_str) {
        Some(state) => format!("Render job {job_id}: {state}"),
        None => format!("Render job {job_id}"),
    };
    Ok(json!({ "message": message, "job": status }))
}
