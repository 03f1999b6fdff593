// SPDX-License-Identifier: MIT
// Copyright (c) 2026 TGDK Labs

//! Operations backed by the numeric evaluators.

use serde_json::{json, Value};

use mb_core::TelemetryEvent;
use mb_eval::{curves, Env};
use mb_pool::Lane;

use crate::registry::{OpError, OpRegistry};

use super::{obj, opt_bool, opt_f64, opt_str, opt_usize, req_f64, req_str};

pub(super) fn register(registry: &OpRegistry) {
    register_curves(registry);
    register_scooty(registry);
    register_telem(registry);
    register_loader(registry);
    register_fold(registry);
    register_recover(registry);
    register_jitter(registry);

    registry.register("compound.get", |ctx, args| {
        let name = req_str(args, "name")?;
        match ctx.compound.get(name) {
            Some(value) => Ok(json!({ "ok": true, "result": value })),
            None => Err(OpError::exception(format!("unknown compound entity '{name}'"))),
        }
    });

    registry.register("impound.check", |ctx, args| {
        let name = req_str(args, "name")?;
        Ok(json!({ "ok": true, "result": ctx.impound.is_impounded(name) }))
    });

    registry.register("impound.add", |ctx, args| {
        let item = opt_str(args, "item", "")?;
        let rule = opt_str(args, "rule", "")?;
        if item.is_empty() && rule.is_empty() {
            return Err(OpError::bad_args("provide 'item' or 'rule'"));
        }
        let mut added = 0u32;
        if !item.is_empty() && ctx.impound.insert_item(item) {
            added += 1;
        }
        if !rule.is_empty() && ctx.impound.insert_rule(rule) {
            added += 1;
        }
        Ok(json!({ "added": added }))
    });

    registry.register("impound.snapshot", |ctx, _args| Ok(ctx.impound.snapshot()));

    registry.register("volphi.get", |ctx, _args| {
        serde_json::to_value(ctx.volphi.live()).map_err(|e| OpError::exception(e.to_string()))
    });

    registry.register("volphi.set", |ctx, args| {
        let update = serde_json::from_value(args.clone())
            .map_err(|e| OpError::bad_args(e.to_string()))?;
        ctx.volphi.configure(&update);
        ctx.volphi.apply();
        let live = serde_json::to_value(ctx.volphi.live())
            .map_err(|e| OpError::exception(e.to_string()))?;
        Ok(json!({ "applied": true, "params": live }))
    });
}

fn register_curves(registry: &OpRegistry) {
    registry.register("figure8.evalLissajous12", |_ctx, args| {
        let t = req_f64(args, "t")?;
        let ax = opt_f64(args, "ax", 1.0)?;
        let ay = opt_f64(args, "ay", 1.0)?;
        let nx = opt_f64(args, "nx", 1.0)?;
        let ny = opt_f64(args, "ny", 2.0)?;
        let phase = opt_f64(args, "phase", 0.0)?;
        let (x, y) = curves::lissajous(t, ax, ay, nx, ny, phase);
        Ok(json!({ "x": x, "y": y }))
    });

    registry.register("figure8.evalBernoulli", |_ctx, args| {
        let t = req_f64(args, "t")?;
        let a = opt_f64(args, "a", 1.0)?;
        let (x, y) = curves::bernoulli(t, a);
        Ok(json!({ "x": x, "y": y }))
    });
}

fn register_scooty(registry: &OpRegistry) {
    registry.register("scooty.bump", |ctx, args| {
        let v = req_f64(args, "v")?;
        // Deferred bumps go through the IO lane; the reply does not wait.
        if opt_bool(args, "defer", false)? && ctx.pool.is_running() {
            let ring = ctx.scooty.clone();
            let queued = ctx.pool.enqueue(Lane::Io, move || ring.push(v));
            return Ok(json!({ "queued": queued }));
        }
        ctx.scooty.push(v);
        Ok(json!({ "count": ctx.scooty.len() }))
    });

    registry.register("scooty.samples", |ctx, args| {
        let n = opt_usize(args, "n", 16)?;
        let samples = ctx.scooty.snapshot(n);
        let mut text = format!("{:>5}  {:>14}\n", "idx", "value");
        for (idx, v) in samples.iter().enumerate() {
            text.push_str(&format!("{idx:>5}  {v:>14.6}\n"));
        }
        Ok(json!({ "text": text, "count": samples.len() }))
    });

    registry.register("scooty.snapshot", |ctx, _args| {
        serde_json::to_value(ctx.scooty.stats()).map_err(|e| OpError::exception(e.to_string()))
    });
}

fn register_telem(registry: &OpRegistry) {
    registry.register("telem.push", |ctx, args| {
        let event = TelemetryEvent {
            at_us: ctx.now_us(),
            name: req_str(args, "name")?.to_string(),
            a: opt_f64(args, "a", 0.0)?,
            b: opt_f64(args, "b", 0.0)?,
            c: opt_f64(args, "c", 0.0)?,
            tag: opt_str(args, "tag", "")?.to_string(),
        };
        ctx.telemetry.push(event);
        Ok(json!({ "count": ctx.telemetry.len() }))
    });

    registry.register("telem.snapshot", |ctx, args| {
        let max = opt_usize(args, "max", 32)?;
        Ok(json!({ "events": ctx.telemetry.snapshot(max) }))
    });

    registry.register("telem.table", |ctx, args| {
        let max = opt_usize(args, "max", 16)?;
        let title = opt_str(args, "title", "telemetry")?;
        let events = ctx.telemetry.snapshot(max);
        let mut text = format!("== {title} ==\n");
        text.push_str(&format!(
            "{:>16}  {:<20} {:>12} {:>12} {:>12}  {}\n",
            "at_us", "name", "a", "b", "c", "tag"
        ));
        for e in &events {
            text.push_str(&format!(
                "{:>16}  {:<20} {:>12.4} {:>12.4} {:>12.4}  {}\n",
                e.at_us, e.name, e.a, e.b, e.c, e.tag
            ));
        }
        Ok(json!({ "text": text, "count": events.len() }))
    });
}

fn register_loader(registry: &OpRegistry) {
    registry.register("loader.load", |ctx, args| {
        let config = obj(args)?
            .get("config")
            .ok_or_else(|| OpError::bad_args("missing 'config'"))?;
        let env = parse_env(args)?;
        let loaded = ctx
            .compound
            .load(config, &env)
            .map_err(|e| OpError::exception(e.to_string()))?;
        Ok(json!({ "loaded": loaded }))
    });

    registry.register("loader.loadFile", |ctx, args| {
        let path = req_str(args, "path")?;
        let env = parse_env(args)?;
        let loaded = ctx
            .compound
            .load_file(std::path::Path::new(path), &env)
            .map_err(|e| OpError::exception(e.to_string()))?;
        Ok(json!({ "loaded": loaded }))
    });

    registry.register("loader.snapshot", |ctx, _args| {
        Ok(json!({ "entities": ctx.compound.snapshot() }))
    });
}

fn register_fold(registry: &OpRegistry) {
    registry.register("fold.configure", |ctx, args| {
        ctx.fold
            .configure(args)
            .map_err(|e| OpError::bad_args(e.to_string()))?;
        Ok(json!({ "creases": ctx.fold.crease_count() }))
    });

    registry.register("fold.snapshot", |ctx, _args| Ok(ctx.fold.snapshot()));

    registry.register("fold.eval", |ctx, args| {
        let x = req_f64(args, "x")?;
        Ok(json!({ "y": ctx.fold.evaluate(x) }))
    });

    registry.register("fold.evalMany", |ctx, args| {
        let xs = obj(args)?
            .get("xs")
            .and_then(Value::as_array)
            .ok_or_else(|| OpError::bad_args("missing or non-array 'xs'"))?;
        let xs: Vec<f64> = xs
            .iter()
            .map(|v| v.as_f64().ok_or_else(|| OpError::bad_args("'xs' must hold numbers")))
            .collect::<Result<_, _>>()?;
        Ok(json!({ "ys": ctx.fold.evaluate_many(&xs) }))
    });

    registry.register("fold.derivative", |ctx, args| {
        let x = req_f64(args, "x")?;
        Ok(json!({ "dy": ctx.fold.derivative(x) }))
    });
}

fn register_recover(registry: &OpRegistry) {
    registry.register("recover.step", |ctx, args| {
        let dt = req_f64(args, "dt")?;
        let x = req_f64(args, "x")?;
        Ok(json!({ "y": ctx.smoother.step(dt, x) }))
    });

    registry.register("recover.peek", |ctx, args| {
        let dt = req_f64(args, "dt")?;
        let x = req_f64(args, "x")?;
        Ok(json!({ "y": ctx.smoother.peek_next(dt, x) }))
    });

    registry.register("recover.configure", |ctx, args| {
        let params = serde_json::from_value(args.clone())
            .map_err(|e| OpError::bad_args(e.to_string()))?;
        ctx.smoother.set_params(params);
        Ok(json!({ "configured": true }))
    });

    registry.register("recover.reset", |ctx, _args| {
        ctx.smoother.reset();
        Ok(json!({ "reset": true }))
    });
}

fn register_jitter(registry: &OpRegistry) {
    registry.register("jitter.advance", |ctx, args| {
        let dt = opt_f64(args, "dt", 0.0)?;
        ctx.jitter.advance(dt);
        let (x, y) = ctx.jitter.current_jitter();
        Ok(json!({ "x": x, "y": y, "index": ctx.jitter.index() }))
    });

    registry.register("jitter.get", |ctx, _args| {
        let (x, y) = ctx.jitter.current_jitter();
        Ok(json!({ "x": x, "y": y, "index": ctx.jitter.index() }))
    });

    registry.register("jitter.strength", |ctx, args| {
        let strength = req_f64(args, "strength")?;
        ctx.jitter.set_strength(strength);
        Ok(json!({ "strength": ctx.jitter.strength() }))
    });
}

/// Optional `env` argument: an object of numeric bindings.
fn parse_env(args: &Value) -> Result<Env, OpError> {
    match obj(args)?.get("env") {
        None | Some(Value::Null) => Ok(Env::new()),
        Some(Value::Object(map)) => {
            let mut env = Env::new();
            for (key, value) in map {
                let v = value
                    .as_f64()
                    .ok_or_else(|| OpError::bad_args(format!("env '{key}' must be numeric")))?;
                env.insert(key.clone(), v);
            }
            Ok(env)
        }
        Some(_) => Err(OpError::bad_args("'env' must be an object")),
    }
}

#[cfg(test)]
#[path = "evalops_tests.rs"]
mod tests;
